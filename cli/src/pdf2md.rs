//! pdf2md - converts the PDFs of the base directory and `docs/` to Markdown.

mod common;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use officemd::batch::{convert_pdfs, pdf_sources, OUTPUT_DIR};
use officemd::pdf::default_extractors;
use std::path::PathBuf;

/// PDF to Markdown conversion with extractor fallback
#[derive(Parser)]
#[command(
    name = "pdf2md",
    author = "iyulab",
    version,
    about = "Convert PDF files to Markdown files in docs_output/",
    long_about = "pdf2md - PDF to Markdown conversion.\n\n\
                  Scans <base> and <base>/docs (not recursive) for .pdf files. Each file\n\
                  is read with the table-aware extractor first and the text-only one\n\
                  if that fails."
)]
struct Cli {
    /// Directory to scan (default: the executable's directory)
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
    let output = base.join(OUTPUT_DIR);

    let sources = pdf_sources(&base).with_context(|| format!("cannot scan {}", base.display()))?;
    if !cli.json {
        println!("{}: {} PDF file(s) in {}", "Found".bold(), sources.len(), base.display());
    }

    let extractors = default_extractors();
    let pb = common::progress_bar(sources.len(), cli.json);

    let report = convert_pdfs(&sources, &output, &extractors, |outcome| {
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
        common::print_summary(&report, false);
        Ok(())
    }
}
