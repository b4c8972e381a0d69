//! # Error Handling
//!
//! This module defines the centralized error type for the `gism` library. It
//! uses `thiserror` to build a single `Error` enum covering every failure
//! mode of a checkout run, each variant carrying enough context (file, line,
//! URL, command) to tell the user what to fix.
//!
//! ## Key Components
//!
//! - **`Error`**: every failure that can occur while loading a manifest,
//!   running a version-control command, staging the cache or recursing into
//!   a nested manifest.
//! - **`Result<T>`**: alias for `std::result::Result<T, Error>`.
//!
//! Failures of external commands are split in two: `CommandSpawn` when the
//! binary could not be started at all (usually missing from `PATH`) and
//! `CommandFailed` when it ran and exited non-zero. The checkout adapters
//! decide which of those trigger a fallback.

use thiserror::Error;

/// Main error type for gism operations
#[derive(Error, Debug)]
pub enum Error {
    /// The manifest file does not exist and there was no template to seed it.
    #[error("Manifest not found: {path}{}", template.as_ref().map(|t| format!(" (no template at {})", t)).unwrap_or_default())]
    ManifestNotFound {
        path: String,
        /// Template location that was looked up, if any
        template: Option<String>,
    },

    /// A manifest line could not be parsed.
    #[error("Manifest parsing error at {path}:{line}: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ManifestParse {
        path: String,
        line: usize,
        message: String,
        /// Optional hint for how to fix the manifest line
        hint: Option<String>,
    },

    /// `${VAR}` substitution failed.
    #[error("Variable substitution error: {message}{}", variable.as_ref().map(|v| format!(" (variable: {})", v)).unwrap_or_default())]
    Template {
        message: String,
        /// The variable that caused the error, if applicable
        variable: Option<String>,
    },

    /// The host operating system has no manifest tag.
    #[error("Unsupported host operating system: {os}")]
    UnsupportedOs { os: String },

    /// An external command could not be started.
    #[error("Failed to run `{command}`: {message}")]
    CommandSpawn { command: String, message: String },

    /// An external command ran and exited unsuccessfully.
    #[error("Command `{command}` failed with {}", code.map(|c| format!("exit code {}", c)).unwrap_or_else(|| "no exit code (terminated by signal)".to_string()))]
    CommandFailed { command: String, code: Option<i32> },

    /// The recorded URL of a Subversion working copy could not be read.
    #[error("Could not read svn info for {path}: {message}")]
    SvnInfo { path: String, message: String },

    /// The clean checkout attempted after a failed update also failed.
    #[error("Fallback checkout of {url} into {destination} failed: {message}")]
    FallbackFailed {
        url: String,
        destination: String,
        message: String,
    },

    /// An error occurred while staging or publishing a cached checkout.
    #[error("Cache operation error: {message}")]
    Cache { message: String },

    /// A required tool is missing or unusable.
    #[error("Tool validation error: {tool} - {message}")]
    ToolValidation { tool: String, message: String },

    /// The URL did not answer the reachability probe.
    #[error("Unreachable URL: {url} - {message}")]
    Unreachable { url: String, message: String },

    /// Recursion would re-enter a directory already being processed.
    #[error("Cycle detected in nested manifests: {cycle}")]
    CycleDetected { cycle: String },

    /// The run was stopped after the first failing entry.
    #[error("Aborted after failure of {destination}: {source}")]
    Aborted {
        destination: String,
        #[source]
        source: Box<Error>,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON parsing error, wrapped from `serde_json::Error`.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// An XML parsing error, wrapped from `quick_xml::Error`.
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
