//! # Git Adapter
//!
//! Brings one manifest entry's destination in line with its URL and
//! revision using the `git` binary.
//!
//! - no clone at the destination: `git clone`, then `git checkout <rev>`
//!   for a pinned revision
//! - existing clone: `git fetch --all --tags`, optional `reset --hard` and
//!   `clean -fdx`, `git checkout <rev>`, then `git pull --rebase` when a
//!   branch is checked out (a detached tag or commit has nothing to pull)
//!
//! Both paths finish with `git submodule update --init --recursive`. There
//! is no fallback: a failing command fails the entry.

use std::path::Path;

use log::info;

use crate::error::Result;
use crate::manifest::ManifestEntry;
use crate::options::RunOptions;
use crate::process::{CommandRunner, CommandSpec};

/// Directory (or file, for worktrees and submodules) marking a git checkout.
pub const GIT_MARKER: &str = ".git";

/// What the adapter did for an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitAction {
    Clone,
    Update,
}

pub fn is_git_checkout(path: &Path) -> bool {
    path.join(GIT_MARKER).exists()
}

/// Clone or update git entries using the system git command.
///
/// Using the binary rather than a library means SSH keys, credential helpers
/// and everything in `~/.gitconfig` work exactly as they do for the user.
pub struct GitAdapter<'a> {
    runner: &'a dyn CommandRunner,
    options: &'a RunOptions,
}

impl<'a> GitAdapter<'a> {
    pub fn new(runner: &'a dyn CommandRunner, options: &'a RunOptions) -> Self {
        Self { runner, options }
    }

    /// Clone `entry` below `root`, or bring an existing clone up to date.
    pub fn sync(&self, root: &Path, entry: &ManifestEntry) -> Result<GitAction> {
        let destination = root.join(&entry.destination);

        if !is_git_checkout(&destination) {
            info!(
                "git clone: {} (rev {}) -> {}",
                entry.url, entry.revision, entry.destination
            );
            let clone = CommandSpec::new("git", root)
                .arg("clone")
                .args(self.options.git_options.iter().cloned())
                .args([entry.url.as_str(), entry.destination.as_str()]);
            self.run(&clone)?;

            if let Some(rev) = entry.revision.pinned() {
                self.run(&CommandSpec::new("git", &destination).args(["checkout", rev]))?;
            }
            self.update_submodules(&destination)?;
            return Ok(GitAction::Clone);
        }

        info!(
            "git update: {} (rev {}) -> {}",
            entry.url, entry.revision, entry.destination
        );
        self.run(&CommandSpec::new("git", &destination).args(["fetch", "--all", "--tags"]))?;

        if self.options.reset {
            let upstream = match entry.revision.pinned() {
                Some(rev) => format!("origin/{}", rev),
                None => "origin/HEAD".to_string(),
            };
            self.run(&CommandSpec::new("git", &destination).args(["reset", "--hard", &upstream]))?;
        }
        if self.options.clean {
            self.run(&CommandSpec::new("git", &destination).args(["clean", "-fdx"]))?;
        }
        if let Some(rev) = entry.revision.pinned() {
            self.run(&CommandSpec::new("git", &destination).args(["checkout", rev]))?;
        }

        // Tags and commits leave HEAD detached; there is nothing to pull.
        let on_branch = CommandSpec::new("git", &destination).args(["symbolic-ref", "-q", "HEAD"]);
        if self.runner.capture(&on_branch)?.is_success() {
            let pull = CommandSpec::new("git", &destination)
                .args(["pull", "--rebase"])
                .args(self.options.git_options.iter().cloned());
            self.run(&pull)?;
        }

        self.update_submodules(&destination)?;
        Ok(GitAction::Update)
    }

    fn update_submodules(&self, checkout: &Path) -> Result<()> {
        self.run(
            &CommandSpec::new("git", checkout).args(["submodule", "update", "--init", "--recursive"]),
        )
    }

    fn run(&self, spec: &CommandSpec) -> Result<()> {
        self.runner.run(spec)?.check(spec)?;
        Ok(())
    }
}
