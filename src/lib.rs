//! Elasticsearch Mappings Generator
//!
//! Compiles tagged struct descriptors into an Elasticsearch `mappings`
//! document, and flattens JSON documents for order-insensitive comparison.
//!
//! ## Features
//!
//! - **Tag-Driven**: Fields tagged `es-mapping:"name,kind"` become properties
//! - **Inline Nesting**: Struct-typed fields expand into nested `properties`
//! - **Worklist Compilation**: Each requested type is compiled exactly once
//! - **Acronym-Aware Names**: `HTTPServer` maps to `http_server`
//! - **Flattening**: Compare documents by content, not key order
//!
//! ## Pipeline
//!
//! ```text
//! feed.types.json ──► loader ──► TypeSet ──► SchemaCompiler ──► format ──► feed_es_mapper.json
//!   (extractor)                               │
//!                                   tag + names per field
//! ```

pub mod compare;
pub mod compiler;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod flatten;
pub mod format;
pub mod generate;
pub mod loader;
pub mod names;
pub mod output;
pub mod tag;

pub use compare::{compare, Comparison};
pub use compiler::{MappingsDocument, PropertyEntry, SchemaCompiler, SchemaNode};
pub use config::{CompilerConfig, MapperConfig, OutputFormat};
pub use descriptor::{FieldDescriptor, FieldType, TypeDescriptor, TypeDescriptorProvider, TypeId, TypeSet};
pub use error::{MappingError, Result};
pub use flatten::{flatten, flatten_json, FlatMap, Tree};
pub use generate::{generate, generate_to_file, GenerateOptions, Generated};
pub use tag::MappingTag;
