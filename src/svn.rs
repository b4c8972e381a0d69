//! # Subversion Adapter
//!
//! Brings one manifest entry's destination in line with its URL and
//! revision using the `svn` binary.
//!
//! The work happens on a *target* directory: normally the destination
//! itself, or the cache staging directory when a cache is configured and the
//! destination is not a working copy yet.
//!
//! - no working copy at the target: `svn checkout`
//! - working copy recorded at another URL: `svn switch`
//! - working copy at the same URL: `svn update --force`
//!
//! If any of those exits non-zero, the target is renamed aside with a
//! timestamp suffix and a clean checkout is tried once. The renamed copy is
//! left in place for the user to inspect or delete.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::{info, warn};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::cache::CacheRelay;
use crate::error::{Error, Result};
use crate::manifest::ManifestEntry;
use crate::options::RunOptions;
use crate::process::{CommandRunner, CommandSpec};

/// Directory that marks a Subversion working copy root.
pub const SVN_MARKER: &str = ".svn";

/// What the adapter ended up doing for an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SvnAction {
    Checkout,
    Update,
    Switch,
}

/// Outcome of a successful sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvnReport {
    pub action: SvnAction,
    /// Where the broken working copy was moved when the fallback ran
    pub backup: Option<PathBuf>,
    /// Whether the checkout was staged through the cache
    pub cached: bool,
}

pub fn is_working_copy(path: &Path) -> bool {
    path.join(SVN_MARKER).is_dir()
}

/// Extract the `<url>` of the first entry from `svn info --xml` output.
pub fn parse_info_url(xml: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut in_url = false;
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"url" => in_url = true,
            Event::Text(text) if in_url => return Ok(Some(text.unescape()?.into_owned())),
            Event::End(_) => in_url = false,
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

/// Compare a recorded working-copy URL with a manifest URL.
pub fn same_url(recorded: &str, wanted: &str) -> bool {
    recorded.trim_end_matches('/') == wanted.trim_end_matches('/')
}

/// Name for moving `path` aside: `<name>.bak.<YYYYmmddHHMMSS>`.
///
/// A `-N` counter is appended when a backup from the same second exists,
/// so the result never collides with the destination or older backups.
pub fn backup_path(path: &Path, now: DateTime<Local>) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "checkout".to_string());
    let base = format!("{}.bak.{}", name, now.format("%Y%m%d%H%M%S"));

    let mut candidate = path.with_file_name(&base);
    let mut counter = 1;
    while candidate.exists() {
        candidate = path.with_file_name(format!("{}-{}", base, counter));
        counter += 1;
    }
    candidate
}

fn url_at_revision(entry: &ManifestEntry) -> String {
    match entry.revision.pinned() {
        Some(rev) => format!("{}@{}", entry.url, rev),
        None => entry.url.clone(),
    }
}

/// Checkout/update handler for `svn` URLs.
pub struct SvnAdapter<'a> {
    runner: &'a dyn CommandRunner,
    options: &'a RunOptions,
    cache: Option<&'a CacheRelay>,
}

impl<'a> SvnAdapter<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        options: &'a RunOptions,
        cache: Option<&'a CacheRelay>,
    ) -> Self {
        Self {
            runner,
            options,
            cache,
        }
    }

    /// Check out or update `entry` below `root`.
    pub fn sync(&self, root: &Path, entry: &ManifestEntry) -> Result<SvnReport> {
        let destination = root.join(&entry.destination);

        let staging = match self.cache {
            Some(relay) if !is_working_copy(&destination) => {
                Some(relay.prepare(self.runner, &entry.destination)?)
            }
            Some(_) => {
                info!("Will not use cache, {} is already a working copy", entry.destination);
                None
            }
            None => None,
        };

        let (target_arg, target) = match &staging {
            Some(path) => (path.display().to_string(), path.clone()),
            None => (entry.destination.clone(), destination.clone()),
        };

        let (action, backup) = match self.primary(root, entry, &target_arg, &target) {
            Ok(action) => (action, None),
            Err(e @ (Error::CommandFailed { .. } | Error::SvnInfo { .. })) => {
                warn!("Error updating {}: {}, will use fallback", entry.destination, e);
                let backup = self.fallback(root, entry, &target_arg, &target)?;
                (SvnAction::Checkout, backup)
            }
            Err(e) => return Err(e),
        };

        if let (Some(relay), Some(staging)) = (self.cache, &staging) {
            relay.publish(self.runner, staging, &destination)?;
        }

        Ok(SvnReport {
            action,
            backup,
            cached: staging.is_some(),
        })
    }

    fn primary(
        &self,
        root: &Path,
        entry: &ManifestEntry,
        target_arg: &str,
        target: &Path,
    ) -> Result<SvnAction> {
        if !is_working_copy(target) {
            info!(
                "svn checkout: {} (rev {}) -> {}",
                entry.url, entry.revision, target_arg
            );
            self.checkout(root, entry, target_arg)?;
            return Ok(SvnAction::Checkout);
        }

        // Recover from an interrupted previous run; a failure here shows up
        // again in the update below.
        let cleanup = CommandSpec::new("svn", root).args(["cleanup", target_arg]);
        self.runner.run(&cleanup)?;

        let recorded = self.recorded_url(root, target_arg)?;

        if self.options.reset {
            let revert = CommandSpec::new("svn", root).args(["revert", "-R", target_arg]);
            self.runner.run(&revert)?.check(&revert)?;
        }
        if self.options.clean {
            let purge =
                CommandSpec::new("svn", root).args(["cleanup", "--remove-unversioned", target_arg]);
            self.runner.run(&purge)?.check(&purge)?;
        }

        if same_url(&recorded, &entry.url) {
            info!(
                "svn update: {} (rev {}) -> {}",
                entry.url, entry.revision, target_arg
            );
            let mut spec = CommandSpec::new("svn", root).args(["update", "--force"]);
            if let Some(rev) = entry.revision.pinned() {
                spec = spec.args(["-r", rev]);
            }
            let spec = spec
                .args(self.options.svn_options.iter().cloned())
                .arg(target_arg);
            self.runner.run(&spec)?.check(&spec)?;
            Ok(SvnAction::Update)
        } else {
            info!(
                "svn switch: {} -> {} (rev {}) in {}",
                recorded, entry.url, entry.revision, target_arg
            );
            let spec = CommandSpec::new("svn", root)
                .args(["switch", "--ignore-ancestry"])
                .args(self.options.svn_options.iter().cloned())
                .arg(url_at_revision(entry))
                .arg(target_arg);
            self.runner.run(&spec)?.check(&spec)?;
            Ok(SvnAction::Switch)
        }
    }

    fn checkout(&self, root: &Path, entry: &ManifestEntry, target_arg: &str) -> Result<()> {
        let spec = CommandSpec::new("svn", root)
            .arg("checkout")
            .args(self.options.svn_options.iter().cloned())
            .arg(url_at_revision(entry))
            .arg(target_arg);
        self.runner.run(&spec)?.check(&spec)?;
        Ok(())
    }

    fn recorded_url(&self, root: &Path, target_arg: &str) -> Result<String> {
        let spec = CommandSpec::new("svn", root).args(["info", "--xml", target_arg]);
        let output = self.runner.capture(&spec)?.check(&spec)?;
        parse_info_url(&output.stdout)
            .map_err(|e| Error::SvnInfo {
                path: target_arg.to_string(),
                message: e.to_string(),
            })?
            .ok_or_else(|| Error::SvnInfo {
                path: target_arg.to_string(),
                message: "no <url> element in svn info output".to_string(),
            })
    }

    /// Move the broken target aside and check out from scratch.
    fn fallback(
        &self,
        root: &Path,
        entry: &ManifestEntry,
        target_arg: &str,
        target: &Path,
    ) -> Result<Option<PathBuf>> {
        let backup = if target.exists() {
            let backup = backup_path(target, Local::now());
            fs::rename(target, &backup)?;
            warn!("Moved {} aside to {}", target.display(), backup.display());
            Some(backup)
        } else {
            None
        };

        self.checkout(root, entry, target_arg)
            .map_err(|e| Error::FallbackFailed {
                url: entry.url.clone(),
                destination: entry.destination.clone(),
                message: e.to_string(),
            })?;
        Ok(backup)
    }
}
