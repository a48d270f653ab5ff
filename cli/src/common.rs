//! Pieces shared by the officemd binaries: logging, base directory, progress and summaries.

#![allow(dead_code)]

use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use officemd::batch::{BatchReport, FileOutcome, Outcome};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Installs a stderr subscriber; `RUST_LOG` wins over `-v`.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// The given directory, or the one holding the executable.
pub fn base_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    let exe = std::env::current_exe().context("cannot locate the executable")?;
    exe.parent()
        .map(Path::to_path_buf)
        .context("executable has no parent directory")
}

/// Progress bar over `len` files; hidden for JSON output.
pub fn progress_bar(len: usize, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    pb
}

/// Prints one outcome above the progress bar.
pub fn print_outcome(pb: &ProgressBar, outcome: &FileOutcome) {
    let name = display_name(&outcome.path);
    let line = match &outcome.outcome {
        Outcome::Converted { output, method } => format!(
            "{} {} → {} ({})",
            "✓".green().bold(),
            name,
            display_name(output),
            method
        ),
        Outcome::Skipped { reason } => format!("{} {} ({})", "-".yellow().bold(), name, reason),
        Outcome::Failed { error } => format!("{} {}: {}", "✗".red().bold(), name, error),
    };
    pb.println(line);
}

/// Prints the end-of-run counts.
pub fn print_summary(report: &BatchReport, with_skipped: bool) {
    println!("\n{}", "Conversion Results".cyan().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Converted".bold(), report.converted);
    if with_skipped {
        println!("{}: {}", "Skipped".bold(), report.skipped);
    }
    println!("{}: {}", "Failed".bold(), report.failed);
    println!("{}: {}", "Output".bold(), report.output_dir.display());
}

/// Prints the report as pretty JSON.
pub fn print_json(report: &BatchReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
