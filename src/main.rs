//! # gism CLI
//!
//! This is the binary entry point for the `gism` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Setting up logging and color output.
//! - Executing the selected command and turning its errors into a non-zero
//!   exit status.
//!
//! The checkout logic lives in the `gism` library crate; the binary is a thin
//! wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
