//! Default values for gism runs.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Manifest file name read at every directory level.
pub const MANIFEST_FILE: &str = "modules.txt";

/// Suffix appended to a manifest path to find its seeding template.
pub const TEMPLATE_SUFFIX: &str = ".template";

/// How long the reachability probe waits for an answer.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Returns the default cache root directory.
///
/// Used when `--cache` is given without a path. Uses the platform-appropriate
/// cache directory:
/// - Linux: `~/.cache/gism` (XDG Base Directory)
/// - macOS: `~/Library/Caches/gism`
/// - Windows: `{FOLDERID_LocalAppData}\gism`
///
/// Falls back to `.gism-cache` in the current directory if the platform
/// cache directory cannot be determined.
pub fn default_cache_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".gism-cache"))
        .join("gism")
}

/// Template looked up next to a manifest when no `--template` is given.
pub fn template_for(manifest: &Path) -> PathBuf {
    let mut name = manifest.as_os_str().to_os_string();
    name.push(TEMPLATE_SUFFIX);
    PathBuf::from(name)
}
