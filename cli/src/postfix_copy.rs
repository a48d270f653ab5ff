//! postfix-copy - copies files under a name with a postfix before the extension.

mod common;

use clap::Parser;
use colored::*;
use officemd::rename::copy_with_postfix;
use std::path::PathBuf;

/// Copy files as <stem><POSTFIX><ext>
#[derive(Parser)]
#[command(name = "postfix-copy", author = "iyulab", version)]
struct Cli {
    /// Files to copy followed by the postfix
    #[arg(value_name = "FILES... POSTFIX", num_args = 0.., allow_hyphen_values = true)]
    args: Vec<String>,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    common::init_tracing(cli.verbose);

    let Some((postfix, files)) = split_args(&cli.args) else {
        println!("{}: pass one or more files followed by the postfix", "ERROR".red().bold());
        std::process::exit(1);
    };

    for file in files {
        let path = PathBuf::from(file);
        match copy_with_postfix(&path, postfix) {
            Ok(target) => println!("{} → {}", file, common::display_name(&target)),
            Err(e) => println!("{}: {}: {}", "ERROR".red().bold(), file, e),
        }
    }
}

/// Last argument is the postfix; at least one file must precede it.
fn split_args(args: &[String]) -> Option<(&str, &[String])> {
    match args.split_last() {
        Some((postfix, files)) if !files.is_empty() => Some((postfix.as_str(), files)),
        _ => None,
    }
}
