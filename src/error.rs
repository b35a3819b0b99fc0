//! Error types for mapping generation

use std::path::PathBuf;

use thiserror::Error;

use crate::descriptor::TypeId;

/// Result type for mapping operations
pub type Result<T> = std::result::Result<T, MappingError>;

/// Mapping generation errors
#[derive(Error, Debug)]
pub enum MappingError {
    #[error("{type_name}.{field}: es-mapping tags must specify a name and a type, e.g. `_id,keyword` (got {tag:?})")]
    TagFormat {
        type_name: String,
        field: String,
        tag: String,
    },

    #[error("{path}: map key is not a string: {key}")]
    NonStringKey { path: String, key: String },

    #[error("Only a mapping can be flattened, got {0}")]
    NotAMapping(&'static str),

    #[error("Cannot access {}: {source}", path.display())]
    InputAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to format mappings document: {0}")]
    Formatting(#[source] serde_json::Error),

    #[error("Unknown type: {0}")]
    UnknownType(TypeId),

    #[error("Recursive type cannot be expanded inline: {}", chain.join(" -> "))]
    RecursiveType { chain: Vec<String> },

    #[error("Duplicate mapping {name:?} in {scope}")]
    DuplicateMapping { scope: String, name: String },

    #[error("Invalid descriptor file {}: {reason}", path.display())]
    InvalidDescriptor { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}
