//! Mapping Diff CLI
//!
//! Compares two mappings documents by flattened content, so key order does
//! not matter.
//!
//! Exit codes: 0 equal, 1 different, 2 error.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use es_mappings::compare::{compare, render_diff};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "es-mapping-diff")]
#[command(about = "Compare two mappings documents independent of key order")]
struct Cli {
    /// Expected document
    expected: PathBuf,

    /// Actual document
    actual: PathBuf,

    /// Compare array elements individually instead of whole arrays
    #[arg(long)]
    flatten_arrays: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(2);
        }
    }
}

/// Returns whether the documents are equal
fn run(cli: Cli) -> anyhow::Result<bool> {
    let expected = read_json(&cli.expected)?;
    let actual = read_json(&cli.actual)?;

    let comparison = compare(&expected, &actual, cli.flatten_arrays)?;

    match cli.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&comparison)?);
        }
        _ => {
            if !comparison.is_equal() {
                print!("{}", render_diff(&expected, &actual, cli.flatten_arrays)?);
            }
            println!("{}", comparison.summary);
        }
    }

    Ok(comparison.is_equal())
}

fn read_json(path: &Path) -> anyhow::Result<serde_json::Value> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse JSON in {}", path.display()))
}
