//! xl-indexer - adds a hyperlinked Index sheet to Excel workbooks.

mod common;

use clap::Parser;
use colored::*;
use officemd::xlsx::{add_index_sheet, IndexOptions, Workbook, DEFAULT_INDEX_SHEET};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Index sheet generator for .xlsx workbooks
#[derive(Parser)]
#[command(
    name = "xl-indexer",
    author = "iyulab",
    version,
    about = "Add an Index sheet linking to every other sheet",
    long_about = "xl-indexer - writes an Index sheet at the front of each workbook.\n\n\
                  Column A lists every other sheet with a hyperlink to its cell A1.\n\
                  An existing Index sheet is cleared and rewritten. Files are saved in place."
)]
struct Cli {
    /// Workbook files to index
    #[arg(required = true, value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Name of the index sheet
    #[arg(long, default_value = DEFAULT_INDEX_SHEET)]
    sheet_name: String,

    /// Quote sheet names that need it in link targets ('My Sheet'!A1)
    #[arg(long)]
    quote_sheet_names: bool,

    /// List the current index rows without modifying the files
    #[arg(long)]
    check: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    common::init_tracing(cli.verbose);

    let options = IndexOptions::new()
        .with_sheet_name(cli.sheet_name.clone())
        .with_quoted_targets(cli.quote_sheet_names);

    debug!(files = cli.files.len(), sheet = %options.sheet_name, check = cli.check, "starting");
    for path in &cli.files {
        let result = if cli.check {
            check(path, &options)
        } else {
            add_index_sheet(path, &options).map(|summary| {
                println!(
                    "{}: {} sheet created ({} entries)",
                    path.display(),
                    summary.sheet_name,
                    summary.entries
                );
            })
        };

        if let Err(e) = result {
            println!("{}: {}: {}", "ERROR".red().bold(), path.display(), e);
        }
    }
}

fn check(path: &Path, options: &IndexOptions) -> officemd::Result<()> {
    let mut workbook = Workbook::open(path)?;
    let names = workbook.sheet_names();
    println!("{}: {}", path.display().to_string().bold(), names.join(", "));

    if !names.contains(&options.sheet_name) {
        println!("  {} no {} sheet", "-".yellow().bold(), options.sheet_name);
        return Ok(());
    }

    for entry in workbook.index_entries(&options.sheet_name)? {
        let link = entry.location.as_deref().unwrap_or("(no link)");
        println!("  {:>3}  {} → {}", entry.row, entry.text, link);
    }
    Ok(())
}
