//! # Checkout Cache
//!
//! Continuous-integration machines build many branches of the same tree.
//! An initial svn checkout of a large module is slow, so when a cache root
//! is configured the first checkout of a destination goes into a staging
//! directory under the cache (keyed by the destination path), is brought up
//! to date there, and is then hard-link-copied into the real destination.
//! The next fresh build finds the staged working copy and only needs an
//! update.
//!
//! Only initial checkouts use the cache. Once the destination is a working
//! copy it is updated in place.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use log::{debug, info};
use regex::Regex;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::platform::HostOs;
use crate::process::{CommandRunner, CommandSpec};

static DRIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]):").expect("drive pattern is valid"));
static SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[/\\]+").expect("separator pattern is valid"));

/// Staging directory for `destination` under `cache_root`.
///
/// Parent (`..`), root and current-dir components are dropped so that
/// `../libs/foo` and `libs/foo` share a slot and nothing escapes the cache.
pub fn staging_path(cache_root: &Path, destination: &str) -> PathBuf {
    let mut path = cache_root.to_path_buf();
    for component in Path::new(destination).components() {
        if let Component::Normal(part) = component {
            path.push(part);
        }
    }
    path
}

/// Mirror the tree at `src` into `dst`, hard-linking every file.
///
/// Directories are recreated, existing files in `dst` are replaced. When a
/// hard link cannot be made (different filesystem) the file is copied.
/// Returns the number of files linked or copied.
pub fn hardlink_tree(src: &Path, dst: &Path) -> Result<usize> {
    fs::create_dir_all(dst)?;
    let mut files = 0;

    for entry in WalkDir::new(src).min_depth(1).follow_links(false) {
        let entry = entry.map_err(|e| Error::Cache {
            message: format!("walking {}: {}", src.display(), e),
        })?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| Error::Cache {
                message: format!("{}: {}", entry.path().display(), e),
            })?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }

        match fs::symlink_metadata(&target) {
            Ok(meta) if meta.is_dir() => fs::remove_dir_all(&target)?,
            Ok(_) => fs::remove_file(&target)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        if entry.file_type().is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else if let Err(e) = fs::hard_link(entry.path(), &target) {
            debug!(
                "hard link {} failed ({}), copying instead",
                target.display(),
                e
            );
            fs::copy(entry.path(), &target)?;
        }
        files += 1;
    }

    Ok(files)
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    let link = fs::read_link(src)?;
    std::os::unix::fs::symlink(link, dst)?;
    Ok(())
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst)?;
    Ok(())
}

/// Convert a Windows path to the form cygwin's rsync understands
/// (`C:\ci\cache` becomes `/cygdrive/C/ci/cache`).
pub fn cygwin_path(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let with_drive = DRIVE_RE.replace(&raw, "/cygdrive/$1");
    SEPARATOR_RE.replace_all(&with_drive, "/").into_owned()
}

/// Stages initial svn checkouts under a shared cache root.
#[derive(Debug, Clone)]
pub struct CacheRelay {
    root: PathBuf,
    os: HostOs,
}

impl CacheRelay {
    pub fn new(root: PathBuf, os: HostOs) -> Self {
        Self { root, os }
    }

    /// Create and return the staging directory for `destination`.
    ///
    /// On Windows the final copy needs rsync, so its absence is reported
    /// here, before any checkout work is done.
    pub fn prepare(&self, runner: &dyn CommandRunner, destination: &str) -> Result<PathBuf> {
        if self.os.is_windows() && !runner.is_available("rsync") {
            return Err(Error::ToolValidation {
                tool: "rsync".to_string(),
                message: "rsync must be on the PATH to use the cache".to_string(),
            });
        }
        let staging = staging_path(&self.root, destination);
        fs::create_dir_all(&staging)?;
        info!(
            "Using cache {} for initial checkout of {}",
            staging.display(),
            destination
        );
        Ok(staging)
    }

    /// Copy the staged working copy into `destination` (absolute).
    pub fn publish(
        &self,
        runner: &dyn CommandRunner,
        staging: &Path,
        destination: &Path,
    ) -> Result<()> {
        info!(
            "Copy the cache {} to {}",
            staging.display(),
            destination.display()
        );
        if self.os.is_windows() {
            fs::create_dir_all(destination)?;
            let cwd = destination.parent().unwrap_or(destination);
            let spec = CommandSpec::new("rsync", cwd)
                .args(["-avW", "--no-compress", "--chmod=ug=rwX"])
                .arg(format!("{}/", cygwin_path(staging)))
                .arg(format!("{}/", cygwin_path(destination)));
            runner.run(&spec)?.check(&spec)?;
        } else {
            let files = hardlink_tree(staging, destination)?;
            debug!("linked {} files into {}", files, destination.display());
        }
        Ok(())
    }
}
