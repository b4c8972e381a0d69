//! # Run Options
//!
//! Everything that controls one invocation: where the cache lives, which
//! entries the build/runtime mode keeps, whether to recurse, how hard to
//! reset existing working copies, and the variables substituted into the
//! manifest. A `RunOptions` is built once by the CLI and never mutated
//! during the run.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;

use crate::defaults;
use crate::error::{Error, Result};

/// Which dependency classes a run checks out.
///
/// A plain run is a runtime run: `buildonly` entries are only fetched when
/// asked for with `--buildonly`, which in turn drops `runtimeonly` ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    /// Skip entries tagged `runtimeonly`.
    BuildOnly,
    /// Skip entries tagged `buildonly`.
    #[default]
    RuntimeOnly,
}

impl BuildMode {
    /// Resolve the two CLI switches into a mode.
    ///
    /// `--runtimeonly` spells out the default. Passing both is contradictory
    /// and rejected.
    pub fn from_flags(build_only: bool, runtime_only: bool) -> Result<Self> {
        match (build_only, runtime_only) {
            (false, _) => Ok(BuildMode::RuntimeOnly),
            (true, false) => Ok(BuildMode::BuildOnly),
            (true, true) => Err(Error::ToolValidation {
                tool: "gism".to_string(),
                message: "--buildonly and --runtimeonly are mutually exclusive".to_string(),
            }),
        }
    }
}

/// Values substituted for `${NAME}` in manifest lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables(BTreeMap<String, String>);

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object such as `{"BRANCH": "1.2", "PORT": 8080}`.
    ///
    /// Strings are taken verbatim, numbers and booleans use their JSON
    /// spelling. Nested values are rejected since they have no sensible
    /// single-token form in a manifest line.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        let Value::Object(map) = value else {
            return Err(Error::Template {
                message: "variables must be a JSON object".to_string(),
                variable: None,
            });
        };

        let mut vars = BTreeMap::new();
        for (name, value) in map {
            let text = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null | Value::Array(_) | Value::Object(_) => {
                    return Err(Error::Template {
                        message: "variable values must be strings, numbers or booleans"
                            .to_string(),
                        variable: Some(name),
                    });
                }
            };
            vars.insert(name, text);
        }
        Ok(Self(vars))
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Options for one checkout run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Shared directory for staging initial svn checkouts
    pub cache: Option<PathBuf>,
    pub build_mode: BuildMode,
    /// Process nested manifests and bootstrap scripts
    pub recursive: bool,
    /// Discard local modifications before updating
    pub reset: bool,
    /// Remove unversioned files before updating
    pub clean: bool,
    pub variables: Variables,
    /// Extra arguments appended to svn checkout/update/switch
    pub svn_options: Vec<String>,
    /// Extra arguments appended to git clone/pull
    pub git_options: Vec<String>,
    /// File name of manifests looked up when recursing
    pub manifest_name: String,
    /// Template used to seed the top-level manifest when it is missing
    pub template: Option<PathBuf>,
    /// Bootstrap script name; `None` uses the host default
    pub bootstrap: Option<String>,
    /// Stop at the first failing entry
    pub fail_fast: bool,
    /// Probe http(s) URLs before running any VCS command
    pub probe: bool,
    pub probe_timeout: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            cache: None,
            build_mode: BuildMode::RuntimeOnly,
            recursive: false,
            reset: false,
            clean: false,
            variables: Variables::new(),
            svn_options: Vec::new(),
            git_options: Vec::new(),
            manifest_name: defaults::MANIFEST_FILE.to_string(),
            template: None,
            bootstrap: None,
            fail_fast: false,
            probe: true,
            probe_timeout: defaults::PROBE_TIMEOUT,
        }
    }
}

/// Split a free-form option string (`--svn-opts "--non-interactive -q"`).
pub fn split_options(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| s.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}
