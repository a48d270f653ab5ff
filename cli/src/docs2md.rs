//! docs2md - converts every document under `docs/` to Markdown in `docs_output/`.

mod common;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use officemd::batch::{convert_documents, docs_folder_sources, BatchReport, DOCS_DIR, OUTPUT_DIR};
use officemd::ConvertOptions;
use std::path::PathBuf;

/// Batch document to Markdown conversion
#[derive(Parser)]
#[command(
    name = "docs2md",
    author = "iyulab",
    version,
    about = "Convert documents in docs/ to Markdown files in docs_output/",
    long_about = "docs2md - batch conversion of office documents to Markdown.\n\n\
                  Reads every file below <base>/docs recursively and writes <name>.md\n\
                  files to <base>/docs_output. Supported: pdf, docx, doc, pptx, ppt,\n\
                  xlsx, xls, txt, html, htm."
)]
struct Cli {
    /// Directory holding docs/ (default: the executable's directory)
    #[arg(long, value_name = "DIR", env = "OFFICEMD_BASE_DIR")]
    base_dir: Option<PathBuf>,

    /// Print the batch report as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    common::init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let base = common::base_dir(cli.base_dir)?;
    let input = base.join(DOCS_DIR);
    let output = base.join(OUTPUT_DIR);

    let sources = docs_folder_sources(&base)
        .with_context(|| format!("cannot read {}", input.display()))?;
    let Some(sources) = sources else {
        if cli.json {
            let report = BatchReport {
                output_dir: output,
                ..BatchReport::default()
            };
            return common::print_json(&report);
        }
        println!("{} docs folder not found: {}", "✗".red().bold(), input.display());
        println!("Create the docs folder and put the files to convert in it.");
        return Ok(());
    };

    if !cli.json {
        println!("{}: {}", "Input".bold(), input.display());
    }

    let pb = common::progress_bar(sources.len(), cli.json);
    let options = ConvertOptions::default();

    let report = convert_documents(&sources, &output, &options, |outcome| {
        if !cli.json {
            common::print_outcome(&pb, outcome);
        }
        pb.inc(1);
    })
    .with_context(|| format!("cannot write to {}", output.display()))?;
    pb.finish_and_clear();

    if cli.json {
        common::print_json(&report)
    } else {
        common::print_summary(&report, true);
        Ok(())
    }
}
