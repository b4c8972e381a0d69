//! # gism Library
//!
//! This library checks out and updates the modules listed in a manifest. It
//! is designed to be used by the `gism` command-line tool but the pieces are
//! usable on their own, for example to parse and filter a manifest.
//!
//! ## Quick Example
//!
//! ```
//! use std::path::Path;
//! use gism::dispatch::{self, Scheme};
//! use gism::manifest;
//! use gism::options::{BuildMode, Variables};
//! use gism::platform::HostOs;
//!
//! let mut vars = Variables::new();
//! vars.insert("SVN", "http://svn.example.com");
//!
//! let entries = manifest::parse(
//!     "# module list\n\
//!      all   ${SVN}/lib/trunk  lib  trunk\n\
//!      win   ${SVN}/sdk/trunk  sdk  1234\n\
//!      all,buildonly ${SVN}/gen/trunk gen trunk\n",
//!     &vars,
//!     Path::new("modules.txt"),
//! )
//! .unwrap();
//!
//! let selected: Vec<_> = entries
//!     .iter()
//!     .filter(|e| dispatch::select(e, HostOs::Linux, BuildMode::RuntimeOnly).is_selected())
//!     .collect();
//! assert_eq!(selected.len(), 1);
//! assert_eq!(Scheme::detect(&selected[0].url), Scheme::Subversion);
//! ```
//!
//! ## Core Concepts
//!
//! - **Manifest (`manifest`)**: the line-oriented module list, `${VAR}`
//!   substitution, and seeding from a template.
//! - **Dispatch (`dispatch`)**: host OS and build-mode filtering, URL scheme
//!   routing.
//! - **Adapters (`svn`, `git`)**: reconcile one destination with its URL and
//!   revision by running the VCS binary through a `process::CommandRunner`.
//! - **Cache (`cache`)**: stages initial svn checkouts in a shared directory
//!   and hard-link-copies them into place.
//! - **Orchestrator (`orchestrator`)**: walks the manifest, applies the
//!   failure policy, and recurses into nested manifests.
//!
//! ## Execution Flow
//!
//! 1. Load the manifest (seeding it from a template if it is missing).
//! 2. For each entry, check platform tags and build mode.
//! 3. Probe http(s) URLs and route the entry to its adapter.
//! 4. On success, optionally enter the destination and run its bootstrap
//!    script or process its manifest.
//! 5. Report processed, skipped, unreachable and failed entries.

pub mod cache;
pub mod defaults;
pub mod dispatch;
pub mod error;
pub mod git;
pub mod manifest;
pub mod options;
pub mod orchestrator;
pub mod output;
pub mod platform;
pub mod probe;
pub mod process;
pub mod suggestions;
pub mod svn;

#[cfg(test)]
mod manifest_proptest;
