//! # Manifest Parsing
//!
//! A manifest is a plain text file with one module per line:
//!
//! ```text
//! # tags            url                                   destination  revision
//! all               http://svn.example.com/libfoo/trunk   libfoo       trunk
//! linux,buildonly   ssh://git.example.com/tools.git       ../tools     v2.1
//! win               http://svn.example.com/sdk/trunk      sdk          18342
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. `${NAME}` references
//! are substituted from the run's variables before the line is split, so a
//! variable may expand into part of a field but never changes the field
//! count unless its value contains whitespace.
//!
//! When the manifest is missing, a template can seed it: the template is
//! copied into place once and the copy is what gets parsed (and what the
//! user edits afterwards).

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use log::{info, warn};
use regex::Regex;

use crate::error::{Error, Result};
use crate::options::Variables;
use crate::platform::HostOs;

/// Revision string meaning "whatever the URL currently points at".
pub const TRUNK: &str = "trunk";

/// Platform tag matching every host.
pub const TAG_ALL: &str = "all";
pub const TAG_BUILD_ONLY: &str = "buildonly";
pub const TAG_RUNTIME_ONLY: &str = "runtimeonly";

/// Every tag the dispatcher looks at.
const KNOWN_TAGS: [&str; 6] = [
    TAG_ALL,
    TAG_BUILD_ONLY,
    TAG_RUNTIME_ONLY,
    "linux",
    "win",
    "osx",
];

static VARIABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("variable pattern is valid")
});

/// The revision column of a manifest line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    Trunk,
    Pinned(String),
}

impl Revision {
    pub fn parse(raw: &str) -> Self {
        if raw == TRUNK {
            Revision::Trunk
        } else {
            Revision::Pinned(raw.to_string())
        }
    }

    /// The explicit revision, or `None` for trunk.
    pub fn pinned(&self) -> Option<&str> {
        match self {
            Revision::Trunk => None,
            Revision::Pinned(rev) => Some(rev),
        }
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Revision::Trunk => f.write_str(TRUNK),
            Revision::Pinned(rev) => f.write_str(rev),
        }
    }
}

/// The tag set from the first manifest column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformFilter {
    tags: BTreeSet<String>,
}

impl PlatformFilter {
    /// Any character other than an ASCII letter or digit separates tags, so
    /// `linux,win`, `all|buildonly` and `linux_win` all work.
    pub fn parse(field: &str) -> Self {
        let tags = field
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_ascii_lowercase)
            .collect();
        Self { tags }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// True when the entry applies to `os`, either by name or through `all`.
    pub fn matches_os(&self, os: HostOs) -> bool {
        self.contains(TAG_ALL) || self.contains(os.tag())
    }

    pub fn is_build_only(&self) -> bool {
        self.contains(TAG_BUILD_ONLY)
    }

    pub fn is_runtime_only(&self) -> bool {
        self.contains(TAG_RUNTIME_ONLY)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Tags that no host or build mode will ever match.
    pub fn unknown_tags(&self) -> impl Iterator<Item = &str> {
        self.tags().filter(|t| !KNOWN_TAGS.contains(t))
    }
}

impl fmt::Display for PlatformFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.tags().collect();
        f.write_str(&joined.join(","))
    }
}

/// One module line of a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub platforms: PlatformFilter,
    pub url: String,
    /// Path relative to the directory the manifest is processed in
    pub destination: String,
    pub revision: Revision,
    /// 1-based line number in the manifest
    pub line: usize,
}

/// Replace every `${NAME}` in `line` with its value.
///
/// Unknown names are an error: a literal `${NAME}` left in a URL or path
/// would only fail later, far from its cause.
pub fn substitute(line: &str, vars: &Variables) -> Result<String> {
    let mut out = String::with_capacity(line.len());
    let mut last = 0;
    for caps in VARIABLE_RE.captures_iter(line) {
        let whole = caps.get(0).expect("capture group 0 always matches");
        let name = &caps[1];
        let value = vars.get(name).ok_or_else(|| Error::Template {
            message: format!("undefined variable in `{}`", line.trim()),
            variable: Some(name.to_string()),
        })?;
        out.push_str(&line[last..whole.start()]);
        out.push_str(value);
        last = whole.end();
    }
    out.push_str(&line[last..]);
    Ok(out)
}

fn is_comment(line: &str) -> bool {
    line.starts_with('#')
}

/// Parse manifest text. `source` only names the file in error messages.
pub fn parse(content: &str, vars: &Variables, source: &Path) -> Result<Vec<ManifestEntry>> {
    let mut entries = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || is_comment(trimmed) {
            continue;
        }

        let expanded = substitute(trimmed, vars).map_err(|e| match e {
            Error::Template { message, variable } => Error::Template {
                message: format!("{} at {}:{}", message, source.display(), line_no),
                variable,
            },
            other => other,
        })?;

        let fields: Vec<&str> = expanded.split_whitespace().collect();
        let &[platforms, url, destination, revision] = fields.as_slice() else {
            return Err(Error::ManifestParse {
                path: source.display().to_string(),
                line: line_no,
                message: format!("expected 4 fields, found {}", fields.len()),
                hint: Some(
                    "lines are `<platforms> <url> <destination> <revision>`, use 'trunk' for the latest revision"
                        .to_string(),
                ),
            });
        };

        let filter = PlatformFilter::parse(platforms);
        for tag in filter.unknown_tags() {
            warn!(
                "{}:{}: unknown platform tag `{}` in `{}`",
                source.display(),
                line_no,
                tag,
                platforms
            );
        }

        entries.push(ManifestEntry {
            platforms: filter,
            url: url.to_string(),
            destination: destination.to_string(),
            revision: Revision::parse(revision),
            line: line_no,
        });
    }

    Ok(entries)
}

/// Copy `template` to `manifest` if the manifest does not exist yet.
///
/// Returns `true` when the manifest was seeded.
pub fn seed_from_template(manifest: &Path, template: &Path) -> Result<bool> {
    if manifest.exists() || !template.is_file() {
        return Ok(false);
    }
    if let Some(parent) = manifest.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::copy(template, manifest)?;
    info!(
        "Seeded {} from template {}",
        manifest.display(),
        template.display()
    );
    Ok(true)
}

/// Load a manifest, seeding it from `template` first when it is missing.
///
/// Missing manifest with no usable template is an error.
pub fn load(path: &Path, template: Option<&Path>, vars: &Variables) -> Result<Vec<ManifestEntry>> {
    if !path.exists() {
        let template: PathBuf = template
            .map(Path::to_path_buf)
            .unwrap_or_else(|| crate::defaults::template_for(path));
        if !seed_from_template(path, &template)? {
            return Err(Error::ManifestNotFound {
                path: path.display().to_string(),
                template: Some(template.display().to_string()),
            });
        }
    }

    let content = fs::read_to_string(path)?;
    parse(&content, vars, path)
}
