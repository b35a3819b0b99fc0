//! Descriptor Loading
//!
//! Reads descriptor files written by the type extractor and builds the
//! [`TypeSet`] the compiler walks. A directory is one package: every
//! descriptor file directly inside it is loaded. A single file is loaded
//! together with its sibling files, so references to types declared
//! elsewhere in the package resolve, but only the file's own types are
//! offered for compilation.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::InputConfig;
use crate::descriptor::{TypeDescriptor, TypeId, TypeSet};
use crate::error::{MappingError, Result};

/// On-disk format of one extractor output file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DescriptorFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(default)]
    pub types: Vec<TypeDescriptor>,
}

/// Configuration for descriptor loading
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Descriptor file extension, without the leading dot
    pub extension: String,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self::from(&InputConfig::default())
    }
}

impl From<&InputConfig> for LoadConfig {
    fn from(input: &InputConfig) -> Self {
        Self {
            extension: input.extension.clone(),
        }
    }
}

impl LoadConfig {
    /// File name without the descriptor extension, if it has it
    pub fn stem<'p>(&self, path: &'p Path) -> Option<&'p str> {
        let name = path.file_name()?.to_str()?;
        let stem = name.strip_suffix(&self.extension)?.strip_suffix('.')?;
        (!stem.is_empty()).then_some(stem)
    }

    fn is_descriptor(&self, path: &Path) -> bool {
        path.is_file() && self.stem(path).is_some()
    }
}

/// A loaded package
#[derive(Debug, Clone)]
pub struct LoadedPackage {
    /// Package name (from the descriptors, else the directory name)
    pub name: String,
    /// Every type in the package
    pub types: TypeSet,
    /// Types declared by the requested input, in declaration order
    pub roots: Vec<TypeId>,
}

impl LoadedPackage {
    /// Pick the types to compile: the named ones if any, else every root
    /// with `all`, else the annotated roots.
    pub fn select(&self, names: &[String], all: bool) -> Result<Vec<TypeId>> {
        if !names.is_empty() {
            return names
                .iter()
                .map(|name| {
                    self.roots
                        .iter()
                        .find(|id| self.types.get(id).map_or(false, |t| &t.name == name))
                        .cloned()
                        .ok_or_else(|| MappingError::UnknownType(TypeId::from(name.as_str())))
                })
                .collect();
        }

        Ok(self
            .roots
            .iter()
            .filter(|id| all || self.types.get(id).map_or(false, |t| t.annotated))
            .cloned()
            .collect())
    }
}

/// Load a descriptor file or a package directory
pub fn load_path(path: &Path, config: &LoadConfig) -> Result<LoadedPackage> {
    let metadata = fs::metadata(path).map_err(|source| MappingError::InputAccess {
        path: path.to_path_buf(),
        source,
    })?;

    if metadata.is_dir() {
        load_directory(path, config)
    } else {
        load_file(path, config)
    }
}

/// Load every descriptor file directly inside `dir`
pub fn load_directory(dir: &Path, config: &LoadConfig) -> Result<LoadedPackage> {
    let files = descriptor_files(dir, config)?;
    info!(dir = %dir.display(), files = files.len(), "loading package");

    let parsed = files
        .iter()
        .map(|file| read_descriptor(file))
        .collect::<Result<Vec<_>>>()?;
    let declared = declared_package(&parsed)?;

    let mut package = empty_package(dir, declared.as_deref());
    for (file, descriptor) in parsed {
        let ids = insert_types(&file, descriptor, declared.as_deref(), &mut package)?;
        package.roots.extend(ids);
    }
    Ok(package)
}

/// Load one descriptor file, resolving references against its siblings
pub fn load_file(path: &Path, config: &LoadConfig) -> Result<LoadedPackage> {
    if config.stem(path).is_none() {
        return Err(MappingError::InvalidDescriptor {
            path: path.to_path_buf(),
            reason: format!("file name must end in '.{}'", config.extension),
        });
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut parsed = Vec::new();
    for file in descriptor_files(&dir, config)? {
        if !same_file(&file, path) {
            parsed.push(read_descriptor(&file)?);
        }
    }
    parsed.push(read_descriptor(path)?);
    let declared = declared_package(&parsed)?;

    let mut package = empty_package(&dir, declared.as_deref());
    let mut roots = Vec::new();
    for (file, descriptor) in parsed {
        roots = insert_types(&file, descriptor, declared.as_deref(), &mut package)?;
    }
    // The requested file was read last
    package.roots = roots;

    info!(file = %path.display(), types = package.roots.len(), "loaded descriptor file");
    Ok(package)
}

fn empty_package(dir: &Path, declared: Option<&str>) -> LoadedPackage {
    let name = match declared {
        Some(name) => name.to_string(),
        None => dir
            .canonicalize()
            .ok()
            .as_deref()
            .and_then(Path::file_name)
            .or_else(|| dir.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
    };

    LoadedPackage {
        name,
        types: TypeSet::new(),
        roots: Vec::new(),
    }
}

/// Descriptor files directly inside `dir`, sorted by name
fn descriptor_files(dir: &Path, config: &LoadConfig) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| MappingError::InputAccess {
            path: dir.to_path_buf(),
            source: e.into(),
        })?;
        if config.is_descriptor(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn read_descriptor(path: &Path) -> Result<(PathBuf, DescriptorFile)> {
    let content = fs::read_to_string(path).map_err(|source| MappingError::InputAccess {
        path: path.to_path_buf(),
        source,
    })?;

    let file = serde_json::from_str(&content).map_err(|e| MappingError::InvalidDescriptor {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok((path.to_path_buf(), file))
}

/// The package the files declare. Files that declare none join it; files
/// that declare a different one are rejected.
fn declared_package(files: &[(PathBuf, DescriptorFile)]) -> Result<Option<String>> {
    let mut declared: Option<&String> = None;
    for (path, file) in files {
        let Some(pkg) = &file.package else {
            continue;
        };
        match declared {
            None => declared = Some(pkg),
            Some(first) if first != pkg => {
                return Err(MappingError::InvalidDescriptor {
                    path: path.clone(),
                    reason: format!("package {:?} does not match {:?}", pkg, first),
                });
            }
            Some(_) => {}
        }
    }
    Ok(declared.cloned())
}

/// Add the file's types to `package`, returning the ids it declared
fn insert_types(
    path: &Path,
    file: DescriptorFile,
    declared: Option<&str>,
    package: &mut LoadedPackage,
) -> Result<Vec<TypeId>> {
    let mut ids = Vec::with_capacity(file.types.len());
    for mut descriptor in file.types {
        if descriptor.package.is_none() {
            descriptor.package = declared.map(str::to_string);
        }
        let id = package.types.insert(descriptor)?;
        debug!(type_id = %id, file = %path.display(), "type discovered");
        ids.push(id);
    }
    Ok(ids)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FieldType;

    const FEED: &str = r#"{
        "package": "tests",
        "types": [
            {"name": "FeedItem", "annotated": true, "fields": [
                {"name": "ID", "type": {"scalar": "string"}, "tags": {"es-mapping": "_id,text"}},
                {"name": "B", "type": {"struct": "Test"}, "tags": {"es-mapping": "b,object"}}
            ]},
            {"name": "Unmarked", "fields": []}
        ]
    }"#;

    const TEST: &str = r#"{
        "package": "tests",
        "types": [
            {"name": "Test", "fields": [
                {"name": "C", "type": {"scalar": "string"}, "tags": {"es-mapping": "c,keyword"}}
            ]}
        ]
    }"#;

    fn package_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("feed.types.json"), FEED).unwrap();
        fs::write(dir.path().join("test.types.json"), TEST).unwrap();
        fs::write(dir.path().join("feed_es_mapper.json"), "{}").unwrap();
        dir
    }

    #[test]
    fn test_stem() {
        let config = LoadConfig::default();
        assert_eq!(config.stem(Path::new("a/feed.types.json")), Some("feed"));
        assert_eq!(config.stem(Path::new("feed_es_mapper.json")), None);
        assert_eq!(config.stem(Path::new(".types.json")), None);
    }

    #[test]
    fn test_load_directory() {
        let dir = package_dir();
        let package = load_path(dir.path(), &LoadConfig::default()).unwrap();

        assert_eq!(package.name, "tests");
        assert_eq!(package.types.len(), 3);
        let roots: Vec<&str> = package.roots.iter().map(TypeId::as_str).collect();
        assert_eq!(roots, vec!["tests.FeedItem", "tests.Unmarked", "tests.Test"]);
    }

    #[test]
    fn test_load_file_resolves_siblings() {
        let dir = package_dir();
        let package = load_path(&dir.path().join("feed.types.json"), &LoadConfig::default()).unwrap();

        assert_eq!(package.roots.len(), 2);
        assert!(package.types.get(&TypeId::from("tests.Test")).is_some());
    }

    #[test]
    fn test_select() {
        let dir = package_dir();
        let package = load_path(&dir.path().join("feed.types.json"), &LoadConfig::default()).unwrap();

        let annotated = package.select(&[], false).unwrap();
        assert_eq!(annotated, vec![TypeId::from("tests.FeedItem")]);

        let all = package.select(&[], true).unwrap();
        assert_eq!(all.len(), 2);

        let named = package.select(&["Unmarked".to_string()], false).unwrap();
        assert_eq!(named, vec![TypeId::from("tests.Unmarked")]);

        // Declared in a sibling file, not in the requested one
        assert!(matches!(
            package.select(&["Test".to_string()], false),
            Err(MappingError::UnknownType(_))
        ));
    }

    #[test]
    fn test_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_path(&dir.path().join("nope.types.json"), &LoadConfig::default()).unwrap_err();
        assert!(matches!(err, MappingError::InputAccess { .. }));
    }

    #[test]
    fn test_wrong_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.json");
        fs::write(&path, FEED).unwrap();
        assert!(matches!(
            load_path(&path, &LoadConfig::default()),
            Err(MappingError::InvalidDescriptor { .. })
        ));
    }

    #[test]
    fn test_package_less_files_join_declared_package() {
        // The undeclared file sorts first in one layout and last in the other
        for undeclared in ["a.types.json", "z.types.json"] {
            let dir = tempfile::tempdir().unwrap();
            fs::write(
                dir.path().join(undeclared),
                r#"{"types": [{"name": "A", "fields": [
                    {"name": "B", "type": {"struct": "B"}, "tags": {"es-mapping": "b,object"}}
                ]}]}"#,
            )
            .unwrap();
            fs::write(
                dir.path().join("b.types.json"),
                r#"{"package": "tests", "types": [{"name": "B"}]}"#,
            )
            .unwrap();

            let package = load_path(dir.path(), &LoadConfig::default()).unwrap();
            assert_eq!(package.name, "tests");

            let a = package.types.get(&TypeId::from("tests.A")).unwrap();
            assert_eq!(a.fields[0].ty, FieldType::Struct(TypeId::from("tests.B")));
            assert!(package.types.get(&TypeId::from("tests.B")).is_some());

            let file = load_path(&dir.path().join(undeclared), &LoadConfig::default()).unwrap();
            assert_eq!(file.roots, vec![TypeId::from("tests.A")]);
        }
    }

    #[test]
    fn test_package_falls_back_to_directory_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.types.json"), r#"{"types": [{"name": "A"}]}"#).unwrap();

        let package = load_path(dir.path(), &LoadConfig::default()).unwrap();
        let dir_name = dir.path().file_name().unwrap().to_string_lossy().to_string();
        assert_eq!(package.name, dir_name);
        assert_eq!(package.roots, vec![TypeId::from("A")]);
    }

    #[test]
    fn test_package_mismatch() {
        let dir = package_dir();
        fs::write(dir.path().join("other.types.json"), r#"{"package": "other", "types": [{"name": "X"}]}"#).unwrap();
        assert!(matches!(
            load_path(dir.path(), &LoadConfig::default()),
            Err(MappingError::InvalidDescriptor { .. })
        ));
    }
}
