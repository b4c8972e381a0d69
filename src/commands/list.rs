//! List command implementation
//!
//! Prints every manifest entry with its scheme and whether this host (or
//! the `--platform` override) would process it. No VCS command is run and
//! a missing manifest is never seeded.

use std::fs;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::{with_hints, ManifestArgs};
use gism::dispatch::{self, Scheme};
use gism::error::Error;
use gism::manifest;
use gism::options::BuildMode;
use gism::output::{OutputConfig, Tone};

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,

    /// Print entries as a JSON array
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct Row {
    line: usize,
    platforms: String,
    scheme: &'static str,
    url: String,
    destination: String,
    revision: String,
    selected: bool,
    reason: &'static str,
}

/// Execute the list command
pub fn execute(args: ListArgs, output: &OutputConfig) -> Result<()> {
    let path = &args.manifest.modules;
    let vars = args.manifest.variables()?;
    let mode = args.manifest.build_mode()?;
    let os = args.manifest.host_os()?;

    if !path.exists() {
        let missing = Error::ManifestNotFound {
            path: path.display().to_string(),
            template: None,
        };
        return Err(with_hints(missing, &args.manifest));
    }
    let content = fs::read_to_string(path)?;
    let entries = manifest::parse(&content, &vars, path)?;

    let rows: Vec<Row> = entries
        .iter()
        .map(|entry| {
            let selection = dispatch::select(entry, os, mode);
            Row {
                line: entry.line,
                platforms: entry.platforms.to_string(),
                scheme: Scheme::detect(&entry.url).name(),
                url: entry.url.clone(),
                destination: entry.destination.clone(),
                revision: entry.revision.to_string(),
                selected: selection.is_selected(),
                reason: selection.describe(),
            }
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No entries in {}", path.display());
        return Ok(());
    }

    for row in &rows {
        let text = format!(
            "{:>4}  {:<12} {:<8} {:<24} {} @ {}",
            row.line, row.platforms, row.scheme, row.destination, row.url, row.revision
        );
        if row.selected {
            println!("{}", output.paint(Tone::Good, &text));
        } else {
            println!(
                "{}  ({})",
                output.paint(Tone::Muted, &text),
                row.reason
            );
        }
    }

    let selected = rows.iter().filter(|r| r.selected).count();
    println!(
        "\n{} of {} entries selected for {} ({})",
        selected,
        rows.len(),
        os,
        mode_label(mode)
    );
    Ok(())
}

fn mode_label(mode: BuildMode) -> &'static str {
    match mode {
        BuildMode::BuildOnly => "build only",
        BuildMode::RuntimeOnly => "runtime only",
    }
}
