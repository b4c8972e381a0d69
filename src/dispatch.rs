//! Entry selection and scheme routing
//!
//! Decides, for each manifest entry, whether this run touches it at all
//! (host OS and build mode) and which adapter handles it (URL scheme).

use std::fmt;

use crate::manifest::ManifestEntry;
use crate::options::BuildMode;
use crate::platform::HostOs;

/// URL value marking an entry that only exists to be recursed into.
pub const INCLUDE: &str = "include";

/// Which adapter handles an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Subversion,
    Git,
    /// No checkout; the destination already exists in the tree
    Include,
    Unknown,
}

impl Scheme {
    /// Route a manifest URL by its prefix.
    ///
    /// A `.git` suffix wins over the transport so that `https://` and
    /// `file://` git remotes are not mistaken for svn repositories.
    pub fn detect(url: &str) -> Self {
        if url == INCLUDE {
            return Scheme::Include;
        }
        if url.trim_end_matches('/').ends_with(".git")
            || url.starts_with("ssh://")
            || url.starts_with("git://")
            || url.starts_with("git@")
        {
            return Scheme::Git;
        }
        if url.starts_with("http://")
            || url.starts_with("https://")
            || url.starts_with("svn://")
            || url.starts_with("svn+ssh://")
            || url.starts_with("file://")
        {
            return Scheme::Subversion;
        }
        Scheme::Unknown
    }

    pub fn name(self) -> &'static str {
        match self {
            Scheme::Subversion => "svn",
            Scheme::Git => "git",
            Scheme::Include => "include",
            Scheme::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why an entry is or is not part of this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Selected,
    /// Neither the host tag nor `all` is listed
    OtherPlatform,
    /// Tagged `runtimeonly` in a build-only run, or `buildonly` in a
    /// runtime-only run
    ExcludedByMode,
}

impl Selection {
    pub fn is_selected(self) -> bool {
        self == Selection::Selected
    }

    pub fn describe(self) -> &'static str {
        match self {
            Selection::Selected => "selected",
            Selection::OtherPlatform => "other platform",
            Selection::ExcludedByMode => "excluded by build mode",
        }
    }
}

/// Decide whether `entry` is processed on `os` in `mode`.
pub fn select(entry: &ManifestEntry, os: HostOs, mode: BuildMode) -> Selection {
    if !entry.platforms.matches_os(os) {
        return Selection::OtherPlatform;
    }
    let excluded = match mode {
        BuildMode::BuildOnly => entry.platforms.is_runtime_only(),
        BuildMode::RuntimeOnly => entry.platforms.is_build_only(),
    };
    if excluded {
        Selection::ExcludedByMode
    } else {
        Selection::Selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{PlatformFilter, Revision};

    fn entry(tags: &str) -> ManifestEntry {
        ManifestEntry {
            platforms: PlatformFilter::parse(tags),
            url: "http://svn.example.com/lib/trunk".to_string(),
            destination: "lib".to_string(),
            revision: Revision::Trunk,
            line: 1,
        }
    }

    #[test]
    fn test_detect_subversion_urls() {
        assert_eq!(Scheme::detect("http://svn/repo/trunk"), Scheme::Subversion);
        assert_eq!(Scheme::detect("https://svn/repo/trunk"), Scheme::Subversion);
        assert_eq!(Scheme::detect("svn://svn/repo"), Scheme::Subversion);
        assert_eq!(Scheme::detect("svn+ssh://svn/repo"), Scheme::Subversion);
        assert_eq!(Scheme::detect("file:///srv/svn/repo"), Scheme::Subversion);
    }

    #[test]
    fn test_detect_git_urls() {
        assert_eq!(Scheme::detect("ssh://git.example.com/tools"), Scheme::Git);
        assert_eq!(Scheme::detect("git://git.example.com/tools"), Scheme::Git);
        assert_eq!(Scheme::detect("git@github.com:org/tools"), Scheme::Git);
        assert_eq!(Scheme::detect("https://github.com/org/tools.git"), Scheme::Git);
        assert_eq!(Scheme::detect("file:///srv/git/tools.git/"), Scheme::Git);
    }

    #[test]
    fn test_detect_include_and_unknown() {
        assert_eq!(Scheme::detect("include"), Scheme::Include);
        assert_eq!(Scheme::detect("ftp://mirror/lib.tar.gz"), Scheme::Unknown);
        assert_eq!(Scheme::detect("includes"), Scheme::Unknown);
    }

    #[test]
    fn test_select_other_platform_is_never_processed() {
        let e = entry("win");
        for mode in [BuildMode::BuildOnly, BuildMode::RuntimeOnly] {
            assert_eq!(select(&e, HostOs::Linux, mode), Selection::OtherPlatform);
        }
    }

    #[test]
    fn test_select_all_matches_every_os() {
        let e = entry("all");
        for os in [HostOs::Linux, HostOs::Windows, HostOs::MacOs] {
            assert!(select(&e, os, BuildMode::default()).is_selected());
        }
    }

    #[test]
    fn test_select_build_mode_table() {
        let build = entry("all,buildonly");
        let runtime = entry("all,runtimeonly");
        let plain = entry("all");

        assert!(select(&build, HostOs::Linux, BuildMode::BuildOnly).is_selected());
        assert_eq!(
            select(&runtime, HostOs::Linux, BuildMode::BuildOnly),
            Selection::ExcludedByMode
        );

        assert_eq!(
            select(&build, HostOs::Linux, BuildMode::RuntimeOnly),
            Selection::ExcludedByMode
        );
        assert!(select(&runtime, HostOs::Linux, BuildMode::RuntimeOnly).is_selected());

        for mode in [BuildMode::BuildOnly, BuildMode::RuntimeOnly] {
            assert!(select(&plain, HostOs::Linux, mode).is_selected());
        }
    }

    #[test]
    fn test_select_tags_joined_by_underscore() {
        let e = entry("linux_win");
        assert!(select(&e, HostOs::Linux, BuildMode::default()).is_selected());
        assert!(select(&e, HostOs::Windows, BuildMode::default()).is_selected());
        assert_eq!(
            select(&e, HostOs::MacOs, BuildMode::default()),
            Selection::OtherPlatform
        );
    }

    #[test]
    fn test_default_mode_skips_build_only_entries() {
        let mode = BuildMode::from_flags(false, false).unwrap();
        assert_eq!(
            select(&entry("all,buildonly"), HostOs::Linux, mode),
            Selection::ExcludedByMode
        );
        assert!(select(&entry("all,runtimeonly"), HostOs::Linux, mode).is_selected());
        assert!(select(&entry("linux"), HostOs::Linux, mode).is_selected());
    }

    #[test]
    fn test_platform_checked_before_mode() {
        let e = entry("win,runtimeonly");
        assert_eq!(
            select(&e, HostOs::Linux, BuildMode::BuildOnly),
            Selection::OtherPlatform
        );
    }
}
