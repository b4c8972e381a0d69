//! Update command implementation
//!
//! Runs the checkout/update pass over the manifest:
//! 1. Load the manifest, seeding it from a template if missing
//! 2. Filter entries by platform and build mode
//! 3. Check out, switch or update each selected entry
//! 4. Optionally recurse into bootstrap scripts and nested manifests
//! 5. Print a summary and fail if any entry failed or was unreachable

use std::path::{self, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Args;

use super::{with_hints, ManifestArgs};
use gism::defaults;
use gism::options::{split_options, RunOptions};
use gism::orchestrator::Orchestrator;
use gism::output::{emoji, OutputConfig, Tone};
use gism::probe::{HttpProbe, NoProbe, Reachability};
use gism::process::SystemRunner;
use gism::suggestions;

/// Arguments for the update command
#[derive(Args, Debug)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,

    /// Stage initial svn checkouts in a shared cache directory
    /// (without a value, the platform cache directory is used)
    #[arg(long, value_name = "PATH", env = "GISM_CACHE", num_args = 0..=1)]
    pub cache: Option<Option<PathBuf>>,

    /// Directory the manifest destinations are relative to
    #[arg(long, value_name = "PATH", default_value = ".")]
    pub dest: PathBuf,

    /// Run bootstrap scripts and process nested manifests
    #[arg(short, long)]
    pub recursive: bool,

    /// Discard local modifications before updating
    #[arg(long)]
    pub reset: bool,

    /// Remove unversioned files before updating
    #[arg(long)]
    pub clean: bool,

    /// Extra options for svn checkout, update and switch
    #[arg(long, value_name = "OPTS", allow_hyphen_values = true)]
    pub svn_opts: Option<String>,

    /// Extra options for git clone and pull
    #[arg(long, value_name = "OPTS", allow_hyphen_values = true)]
    pub git_opts: Option<String>,

    /// Bootstrap script name looked up when recursing
    /// (bootstrap.sh, or bootstrap.bat on Windows)
    #[arg(long, value_name = "NAME")]
    pub bootstrap: Option<String>,

    /// Stop at the first failing entry
    #[arg(long)]
    pub fail_fast: bool,

    /// Do not probe http(s) URLs before checking them out
    #[arg(long)]
    pub no_probe: bool,

    /// Seconds to wait for the reachability probe
    #[arg(long, value_name = "SECS", default_value_t = defaults::PROBE_TIMEOUT.as_secs())]
    pub probe_timeout: u64,
}

impl UpdateArgs {
    fn run_options(&self) -> Result<RunOptions> {
        let cache = match &self.cache {
            Some(Some(path)) => Some(path.clone()),
            Some(None) => Some(defaults::default_cache_root()),
            None => None,
        };
        let cache = cache
            .map(|p| path::absolute(&p).with_context(|| format!("Invalid cache path: {}", p.display())))
            .transpose()?;

        Ok(RunOptions {
            cache,
            build_mode: self.manifest.build_mode()?,
            recursive: self.recursive,
            reset: self.reset,
            clean: self.clean,
            variables: self.manifest.variables()?,
            svn_options: split_options(self.svn_opts.as_deref()),
            git_options: split_options(self.git_opts.as_deref()),
            manifest_name: self.manifest.manifest_name(),
            template: self.manifest.template.clone(),
            bootstrap: self.bootstrap.clone(),
            fail_fast: self.fail_fast,
            probe: !self.no_probe,
            probe_timeout: Duration::from_secs(self.probe_timeout),
        })
    }
}

/// Execute the update command
pub fn execute(args: UpdateArgs, output: &OutputConfig) -> Result<()> {
    let start_time = Instant::now();
    let options = args.run_options()?;
    let os = args.manifest.host_os()?;
    let dest = path::absolute(&args.dest)
        .with_context(|| format!("Invalid destination: {}", args.dest.display()))?;

    log::info!("Detected {} host", os);
    if let Some(cache) = &options.cache {
        log::info!("Cache root: {}", cache.display());
    }

    let runner = SystemRunner;
    let http_probe;
    let probe: &dyn Reachability = if options.probe {
        http_probe = HttpProbe::new(options.probe_timeout);
        &http_probe
    } else {
        &NoProbe
    };

    let report = Orchestrator::new(&options, &runner, probe, os)
        .run(&args.manifest.modules, &dest)
        .map_err(|e| with_hints(e, &args.manifest))?;

    let duration = start_time.elapsed();
    let summary = format!(
        "{} processed, {} skipped, {} unreachable, {} failed in {:.2}s",
        report.processed,
        report.skipped,
        report.unreachable.len(),
        report.failures.len(),
        duration.as_secs_f64()
    );

    if report.is_success() {
        println!(
            "{} {}",
            emoji(output, "✅", "[OK]"),
            output.paint(Tone::Good, &summary)
        );
        Ok(())
    } else {
        println!(
            "{} {}",
            emoji(output, "❌", "[FAILED]"),
            output.paint(Tone::Bad, &summary)
        );
        Err(suggestions::run_incomplete(&report))
    }
}
