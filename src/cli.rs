//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::{Env, WriteStyle};

use crate::commands;
use gism::output::OutputConfig;

/// gism - Check out and update the modules listed in a manifest
#[derive(Parser, Debug)]
#[command(name = "gism")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check out or update every module in the manifest
    Update(commands::update::UpdateArgs),

    /// Show manifest entries and whether this host would process them
    List(commands::list::ListArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        let output = OutputConfig::from_env_and_flag(&self.color);
        init_logging(&self.log_level, &output);

        match self.command {
            Commands::Update(args) => commands::update::execute(args, &output),
            Commands::List(args) => commands::list::execute(args, &output),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// `RUST_LOG` wins over `--log-level` when set.
fn init_logging(level: &str, output: &OutputConfig) {
    let style = if output.use_color {
        WriteStyle::Always
    } else {
        WriteStyle::Never
    };
    // try_init: a second call (tests driving execute twice) is not an error
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .write_style(style)
        .try_init();
}
