//! Mappings Generator CLI
//!
//! Generates an Elasticsearch mappings document for each input descriptor
//! file or package directory.
//!
//! Usage:
//!   es-mappings feed.types.json
//!   es-mappings --all --nofmt ./tests
//!   es-mappings --type FeedItem --output-filename mapping.json feed.types.json

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use es_mappings::{generate_to_file, GenerateOptions, MapperConfig, OutputFormat};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "es-mappings")]
#[command(about = "Generate Elasticsearch mappings from tagged type descriptors")]
#[command(version)]
struct Cli {
    /// Descriptor files or package directories
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Generate mappings for all types in a file, not only annotated ones
    #[arg(long)]
    all: bool,

    /// Generate mappings for the named types only (repeatable)
    #[arg(long = "type", value_name = "NAME")]
    types: Vec<String>,

    /// Specify the filename of the output
    #[arg(long)]
    output_filename: Option<PathBuf>,

    /// Process the whole package instead of just the given file
    #[arg(long)]
    pkg: bool,

    /// Skip final formatting of the json file
    #[arg(long)]
    nofmt: bool,

    /// Trace types and generated fragments to stderr
    #[arg(long)]
    debug: bool,

    /// Config file (defaults to es-mappings.toml lookup)
    #[arg(short, long)]
    config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("es_mappings=debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = MapperConfig::load_from(cli.config.as_deref()).context("Failed to load configuration")?;
    if cli.all {
        config.input.all_types = true;
    }
    if cli.nofmt {
        config.compiler.format = OutputFormat::Compact;
    }

    let options = GenerateOptions {
        types: cli.types,
        package: cli.pkg,
        output_filename: cli.output_filename,
    };

    for input in &cli.inputs {
        let generated = generate_to_file(input, &options, &config)
            .with_context(|| format!("Error generating mappings for {}", input.display()))?;
        tracing::info!(
            input = %input.display(),
            output = %generated.output.display(),
            types = generated.type_count,
            "done"
        );
    }

    Ok(())
}
