//! # Run Orchestrator
//!
//! Drives a whole run: loads the top-level manifest, walks its entries in
//! order, hands each selected entry to the adapter for its scheme, and
//! (when recursion is on) descends into each finished destination to run
//! its bootstrap script or process its own manifest.
//!
//! ## Failure policy
//!
//! A failing entry is logged and tallied, its recursion is skipped, and the
//! run moves on to the next entry. With `fail_fast` the first failure ends
//! the run instead. Unreachable URLs are always tallied and skipped, never
//! fatal on their own. The caller decides the exit status from the
//! returned `RunReport`.
//!
//! ## Working directories
//!
//! Each level carries its root directory explicitly and passes it to every
//! command it runs. The process working directory is never changed, so
//! returning from a nested level needs no restore step.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use crate::cache::CacheRelay;
use crate::dispatch::{self, Scheme};
use crate::error::{Error, Result};
use crate::git::GitAdapter;
use crate::manifest::{self, ManifestEntry};
use crate::options::RunOptions;
use crate::platform::HostOs;
use crate::probe::Reachability;
use crate::process::{CommandRunner, CommandSpec};
use crate::svn::SvnAdapter;

/// An entry that could not be brought up to date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFailure {
    pub manifest: PathBuf,
    pub line: usize,
    pub destination: String,
    pub message: String,
}

/// Tally of a run across all manifest levels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Entries checked out, updated, or included
    pub processed: usize,
    /// Entries filtered out or with an unsupported scheme
    pub skipped: usize,
    pub unreachable: Vec<String>,
    pub failures: Vec<EntryFailure>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.unreachable.is_empty()
    }
}

enum EntryOutcome {
    Done,
    Unsupported,
}

/// Processes manifests with a fixed set of options.
pub struct Orchestrator<'a> {
    options: &'a RunOptions,
    runner: &'a dyn CommandRunner,
    probe: &'a dyn Reachability,
    os: HostOs,
    cache: Option<CacheRelay>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        options: &'a RunOptions,
        runner: &'a dyn CommandRunner,
        probe: &'a dyn Reachability,
        os: HostOs,
    ) -> Self {
        let cache = options
            .cache
            .as_ref()
            .map(|root| CacheRelay::new(root.clone(), os));
        Self {
            options,
            runner,
            probe,
            os,
            cache,
        }
    }

    /// Process `manifest` with `root` as the directory destinations are
    /// relative to.
    ///
    /// Errors returned here are run-level: the manifest could not be loaded
    /// or `fail_fast` stopped the run. Per-entry failures are in the report.
    pub fn run(&self, manifest: &Path, root: &Path) -> Result<RunReport> {
        let entries = manifest::load(
            manifest,
            self.options.template.as_deref(),
            &self.options.variables,
        )?;
        fs::create_dir_all(root)?;

        let mut report = RunReport::default();
        let mut visiting = vec![root.canonicalize()?];
        self.process_entries(manifest, &entries, root, &mut report, &mut visiting)?;
        Ok(report)
    }

    fn process_entries(
        &self,
        manifest: &Path,
        entries: &[ManifestEntry],
        root: &Path,
        report: &mut RunReport,
        visiting: &mut Vec<PathBuf>,
    ) -> Result<()> {
        for entry in entries {
            let selection = dispatch::select(entry, self.os, self.options.build_mode);
            if !selection.is_selected() {
                debug!(
                    "skip {} ({}): {}",
                    entry.destination,
                    entry.platforms,
                    selection.describe()
                );
                report.skipped += 1;
                continue;
            }

            match self.process_entry(root, entry) {
                Ok(EntryOutcome::Done) => {
                    let entered = if self.options.recursive {
                        self.recurse(manifest, root, entry, report, visiting)?
                    } else {
                        true
                    };
                    if entered {
                        report.processed += 1;
                    }
                }
                Ok(EntryOutcome::Unsupported) => {
                    warn!(
                        "Unsupported URL scheme for {} at {}:{}: {}",
                        entry.destination,
                        manifest.display(),
                        entry.line,
                        entry.url
                    );
                    report.skipped += 1;
                }
                Err(Error::Unreachable { url, message }) => {
                    warn!("Skipping {}: {} is unreachable ({})", entry.destination, url, message);
                    report.unreachable.push(url);
                }
                Err(e) => self.record_failure(manifest, entry, e, report)?,
            }
        }
        Ok(())
    }

    fn process_entry(&self, root: &Path, entry: &ManifestEntry) -> Result<EntryOutcome> {
        match Scheme::detect(&entry.url) {
            Scheme::Include => {
                info!("include: {}", entry.destination);
                Ok(EntryOutcome::Done)
            }
            Scheme::Unknown => Ok(EntryOutcome::Unsupported),
            Scheme::Subversion => {
                self.probe.check(&entry.url)?;
                SvnAdapter::new(self.runner, self.options, self.cache.as_ref())
                    .sync(root, entry)
                    .inspect_err(|_| {
                        info!("hint: to log in to svn, ask your administrator for credentials")
                    })?;
                Ok(EntryOutcome::Done)
            }
            Scheme::Git => {
                self.probe.check(&entry.url)?;
                GitAdapter::new(self.runner, self.options).sync(root, entry)?;
                Ok(EntryOutcome::Done)
            }
        }
    }

    /// Tally a failed entry, or stop the run when `fail_fast` is set.
    fn record_failure(
        &self,
        manifest: &Path,
        entry: &ManifestEntry,
        e: Error,
        report: &mut RunReport,
    ) -> Result<()> {
        error!(
            "{} ({}:{}) failed: {}",
            entry.destination,
            manifest.display(),
            entry.line,
            e
        );
        if self.options.fail_fast {
            return Err(Error::Aborted {
                destination: entry.destination.clone(),
                source: Box::new(e),
            });
        }
        report.failures.push(EntryFailure {
            manifest: manifest.to_path_buf(),
            line: entry.line,
            destination: entry.destination.clone(),
            message: e.to_string(),
        });
        Ok(())
    }

    fn bootstrap_name(&self) -> &str {
        self.options
            .bootstrap
            .as_deref()
            .unwrap_or_else(|| self.os.bootstrap_script())
    }

    fn bootstrap_command(&self, dir: &Path, script: &str) -> CommandSpec {
        if self.os.is_windows() {
            CommandSpec::new("cmd", dir).args(["/C", script])
        } else {
            CommandSpec::new("sh", dir).arg(script)
        }
    }

    /// Enter a finished destination: bootstrap script first, nested
    /// manifest otherwise.
    ///
    /// Returns `false` when the entry itself failed (its bootstrap script or
    /// nested manifest), in which case it is already in `report.failures`.
    /// Failures of nested entries are theirs, not the parent's.
    fn recurse(
        &self,
        manifest: &Path,
        root: &Path,
        entry: &ManifestEntry,
        report: &mut RunReport,
        visiting: &mut Vec<PathBuf>,
    ) -> Result<bool> {
        let dir = root.join(&entry.destination);
        if !dir.is_dir() {
            return Ok(true);
        }
        let canonical = dir.canonicalize()?;
        if visiting.contains(&canonical) {
            let cycle = visiting
                .iter()
                .chain(std::iter::once(&canonical))
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(" -> ");
            warn!("{}", Error::CycleDetected { cycle });
            return Ok(true);
        }

        let script = self.bootstrap_name();
        if dir.join(script).is_file() {
            info!("bootstrap: {} in {}", script, entry.destination);
            let spec = self.bootstrap_command(&dir, script);
            let outcome = self.runner.run(&spec).and_then(|out| out.check(&spec));
            return match outcome {
                Ok(_) => Ok(true),
                Err(e) => self.record_failure(manifest, entry, e, report).map(|()| false),
            };
        }

        let nested = dir.join(&self.options.manifest_name);
        if !nested.is_file() {
            return Ok(true);
        }
        info!("entering {}", nested.display());
        let entries = match fs::read_to_string(&nested)
            .map_err(Error::from)
            .and_then(|content| manifest::parse(&content, &self.options.variables, &nested))
        {
            Ok(entries) => entries,
            Err(e) => return self.record_failure(manifest, entry, e, report).map(|()| false),
        };

        visiting.push(canonical);
        let result = self.process_entries(&nested, &entries, &dir, report, visiting);
        visiting.pop();
        result.map(|()| true)
    }
}
