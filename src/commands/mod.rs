//! # CLI Command Implementations
//!
//! Each subcommand of `gism` lives in its own file with an `Args` struct
//! (derived with `clap`) and an `execute` function that calls into the
//! `gism` library.
//!
//! Options shared by commands that read a manifest are collected in
//! `ManifestArgs` and flattened into each command's arguments.

pub mod completions;
pub mod list;
pub mod update;

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use gism::defaults;
use gism::error::Error;
use gism::options::{BuildMode, Variables};
use gism::platform::HostOs;
use gism::suggestions;

/// Manifest selection options shared by `update` and `list`
#[derive(Args, Debug)]
pub struct ManifestArgs {
    /// Manifest file to read
    #[arg(long, value_name = "PATH", env = "GISM_MODULES", default_value = defaults::MANIFEST_FILE)]
    pub modules: PathBuf,

    /// Template copied to the manifest path when the manifest is missing
    /// (defaults to `<manifest>.template`)
    #[arg(long, value_name = "PATH")]
    pub template: Option<PathBuf>,

    /// JSON object of values substituted for ${NAME} in the manifest
    #[arg(long, value_name = "JSON")]
    pub vars: Option<String>,

    /// Do not check out runtime-only dependencies
    #[arg(long, conflicts_with = "runtimeonly")]
    pub buildonly: bool,

    /// Do not check out build-only dependencies
    #[arg(long)]
    pub runtimeonly: bool,

    /// Select entries for another platform tag (linux, win, osx)
    #[arg(long, value_name = "OS", value_parser = parse_platform)]
    pub platform: Option<HostOs>,
}

impl ManifestArgs {
    pub fn variables(&self) -> Result<Variables> {
        match &self.vars {
            Some(raw) => {
                Variables::from_json(raw).map_err(|e| suggestions::invalid_variables(raw, &e))
            }
            None => Ok(Variables::new()),
        }
    }

    pub fn build_mode(&self) -> Result<BuildMode> {
        Ok(BuildMode::from_flags(self.buildonly, self.runtimeonly)?)
    }

    pub fn host_os(&self) -> Result<HostOs> {
        Ok(match self.platform {
            Some(os) => os,
            None => HostOs::detect()?,
        })
    }

    /// File name looked up in destinations when recursing.
    pub fn manifest_name(&self) -> String {
        self.modules
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| defaults::MANIFEST_FILE.to_string())
    }

    /// The template path that applies to this manifest.
    pub fn effective_template(&self) -> PathBuf {
        self.template
            .clone()
            .unwrap_or_else(|| defaults::template_for(&self.modules))
    }
}

fn parse_platform(value: &str) -> std::result::Result<HostOs, String> {
    value
        .parse()
        .map_err(|_| format!("expected one of linux, win, osx (got `{value}`)"))
}

/// Attach CLI hints to library errors that have an obvious fix.
pub fn with_hints(error: Error, args: &ManifestArgs) -> anyhow::Error {
    match error {
        Error::ManifestNotFound { .. } => {
            let template = args.effective_template();
            suggestions::manifest_not_found(&args.modules, Some(&template.display().to_string()))
        }
        other => other.into(),
    }
}
