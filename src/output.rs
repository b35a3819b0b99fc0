//! Output files
//!
//! `dir/` writes `dir/<package>_es_mapper.json`; `dir/feed.types.json` writes
//! `dir/feed_es_mapper.json`. An explicit output filename overrides both.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::OutputConfig;
use crate::error::{MappingError, Result};
use crate::loader::LoadConfig;

/// Derive the output path for an input file or package directory
pub fn output_path(
    input: &Path,
    package_name: &str,
    load: &LoadConfig,
    output: &OutputConfig,
) -> Result<PathBuf> {
    if input.is_dir() {
        return Ok(input.join(format!("{}{}", package_name, output.file_suffix)));
    }

    let stem = load.stem(input).ok_or_else(|| MappingError::InvalidDescriptor {
        path: input.to_path_buf(),
        reason: format!("file name must end in '.{}'", load.extension),
    })?;
    Ok(input.with_file_name(format!("{}{}", stem, output.file_suffix)))
}

/// Write a generated document, creating parent directories as needed
pub fn write_document(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "wrote mappings");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("feed.types.json");
        std::fs::write(&input, "{}").unwrap();

        let path = output_path(&input, "tests", &LoadConfig::default(), &OutputConfig::default()).unwrap();
        assert_eq!(path, dir.path().join("feed_es_mapper.json"));
    }

    #[test]
    fn test_package_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = output_path(dir.path(), "tests", &LoadConfig::default(), &OutputConfig::default()).unwrap();
        assert_eq!(path, dir.path().join("tests_es_mapper.json"));
    }

    #[test]
    fn test_bad_extension() {
        let result = output_path(
            Path::new("feed.go"),
            "tests",
            &LoadConfig::default(),
            &OutputConfig::default(),
        );
        assert!(matches!(result, Err(MappingError::InvalidDescriptor { .. })));
    }

    #[test]
    fn test_write_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/nested/mapping.json");
        write_document(&path, b"{}").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"{}");
    }
}
