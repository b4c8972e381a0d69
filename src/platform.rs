//! Host operating system detection and manifest platform tags

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Operating systems a manifest entry can be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostOs {
    Linux,
    Windows,
    MacOs,
}

impl HostOs {
    /// Detect the OS this binary was built for.
    pub fn detect() -> Result<Self> {
        Self::from_target(std::env::consts::OS)
    }

    /// Map a Rust target OS name to a host tag.
    ///
    /// Cygwin counts as Windows: the checkouts land on an NTFS tree and the
    /// cache copy needs the Windows code path.
    pub fn from_target(os: &str) -> Result<Self> {
        match os {
            "linux" => Ok(HostOs::Linux),
            "windows" | "cygwin" => Ok(HostOs::Windows),
            "macos" => Ok(HostOs::MacOs),
            other => Err(Error::UnsupportedOs {
                os: other.to_string(),
            }),
        }
    }

    /// The tag used for this OS in the first manifest column.
    pub fn tag(self) -> &'static str {
        match self {
            HostOs::Linux => "linux",
            HostOs::Windows => "win",
            HostOs::MacOs => "osx",
        }
    }

    pub fn is_windows(self) -> bool {
        self == HostOs::Windows
    }

    /// Default bootstrap script looked up in a destination when recursing.
    pub fn bootstrap_script(self) -> &'static str {
        match self {
            HostOs::Windows => "bootstrap.bat",
            HostOs::Linux | HostOs::MacOs => "bootstrap.sh",
        }
    }
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for HostOs {
    type Err = Error;

    /// Accepts either a manifest tag (`win`) or a target name (`windows`).
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "linux" => Ok(HostOs::Linux),
            "win" | "windows" | "cygwin" => Ok(HostOs::Windows),
            "osx" | "macos" | "darwin" => Ok(HostOs::MacOs),
            other => Err(Error::UnsupportedOs {
                os: other.to_string(),
            }),
        }
    }
}
