//! Generation pipeline
//!
//! Load descriptors, pick the types, compile them and work out where the
//! result goes. Writing is left to the caller so the bytes can be inspected.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::compiler::SchemaCompiler;
use crate::config::MapperConfig;
use crate::error::Result;
use crate::loader::{load_path, LoadConfig};
use crate::output::{output_path, write_document};

/// Per-invocation options
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Compile only these types (by name); empty means annotated or all
    pub types: Vec<String>,
    /// Treat a file input as its whole package directory
    pub package: bool,
    /// Override the derived output path
    pub output_filename: Option<PathBuf>,
}

/// Output of one generation
#[derive(Debug, Clone)]
pub struct Generated {
    /// Where the document should be written
    pub output: PathBuf,
    /// The mappings document
    pub bytes: Vec<u8>,
    /// Number of top-level types compiled
    pub type_count: usize,
}

/// Generate the mappings document for one input path
pub fn generate(input: &Path, options: &GenerateOptions, config: &MapperConfig) -> Result<Generated> {
    let input = package_input(input, options.package);
    let load = LoadConfig::from(&config.input);

    let package = load_path(&input, &load)?;
    let selected = package.select(&options.types, config.input.all_types)?;
    info!(package = %package.name, types = selected.len(), "generating mappings");

    let mut compiler = SchemaCompiler::new(&package.types, config.compiler.clone());
    for id in &selected {
        compiler.request_type(id.clone());
    }
    let bytes = compiler.run()?;

    let output = match &options.output_filename {
        Some(path) => path.clone(),
        None => output_path(&input, &package.name, &load, &config.output)?,
    };

    Ok(Generated {
        output,
        bytes,
        type_count: selected.len(),
    })
}

/// Generate and write the document, returning what was written
pub fn generate_to_file(input: &Path, options: &GenerateOptions, config: &MapperConfig) -> Result<Generated> {
    let generated = generate(input, options, config)?;
    write_document(&generated.output, &generated.bytes)?;
    Ok(generated)
}

fn package_input(input: &Path, package: bool) -> PathBuf {
    if package && !input.is_dir() {
        match input.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    } else {
        input.to_path_buf()
    }
}
