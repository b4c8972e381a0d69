//! Shared test utilities for the E2E tests.
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let temp = TempDir::new().unwrap();
//!     write_manifest(&temp, manifests::INCLUDE_ONLY);
//! }
//! ```

use assert_fs::prelude::*;
use assert_fs::TempDir;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::manifests;
    #[allow(unused_imports)]
    pub use super::write_manifest;
}

/// Manifest snippets used across tests.
#[allow(dead_code)]
pub mod manifests {
    /// Two include entries, one per platform group.
    pub const INCLUDE_ONLY: &str = "\
# local modules
all    include  lib   trunk
win    include  sdk   trunk
";

    /// Entries split by build mode.
    pub const BUILD_MODES: &str = "\
all               include  core     trunk
all,buildonly     include  tools    trunk
all,runtimeonly   include  plugins  trunk
";

    /// A scheme gism does not know how to check out.
    pub const UNKNOWN_SCHEME: &str = "all ftp://files.example.com/lib lib trunk\n";

    /// Variable references resolved from --vars.
    pub const WITH_VARS: &str = "all ${SERVER}/lib/${BRANCH} lib trunk\n";
}

/// Write `content` to `modules.txt` in `temp`.
#[allow(dead_code)]
pub fn write_manifest(temp: &TempDir, content: &str) {
    temp.child("modules.txt").write_str(content).unwrap();
}
