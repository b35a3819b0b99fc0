//! Mapping tag grammar
//!
//! A mapping tag has the form `name,kind`, e.g. `es-mapping:"_id,keyword"`.
//! The name may be empty (`",object"`), in which case the field name is
//! normalized and used instead. The kind is copied as written, even when
//! empty.

use crate::error::{MappingError, Result};
use crate::names::camel_to_snake;

/// Default tag key fields are annotated under
pub const DEFAULT_TAG_KEY: &str = "es-mapping";

/// A parsed mapping tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingTag {
    /// Index field name
    pub name: String,
    /// Index field type (`keyword`, `text`, `object`, ...)
    pub kind: String,
}

impl MappingTag {
    /// Parse a raw tag. `fallback_name` is the declared field name.
    ///
    /// `type_name` is only used to report where a malformed tag was found.
    pub fn parse(raw: &str, fallback_name: &str, type_name: &str) -> Result<Self> {
        let malformed = || MappingError::TagFormat {
            type_name: type_name.to_string(),
            field: fallback_name.to_string(),
            tag: raw.to_string(),
        };

        let mut parts = raw.split(',');
        let name = parts.next().ok_or_else(malformed)?;
        let kind = parts.next().ok_or_else(malformed)?;

        let name = if name.is_empty() {
            camel_to_snake(fallback_name)
        } else {
            name.to_string()
        };

        Ok(Self {
            name,
            kind: kind.to_string(),
        })
    }
}
