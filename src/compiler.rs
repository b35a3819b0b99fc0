//! Mappings Compiler
//!
//! Compiles requested types into a single mappings document:
//!
//! ```text
//! {"mappings":{
//!   "<type_name>":{"properties":{
//!     "<mapping_name>":{"type":"<kind>"[,"properties":{...}]},
//!   }},
//! }}
//! ```
//!
//! Top-level types are drained from a worklist, each at most once. Fields
//! whose type is itself a struct are expanded inline under `properties`
//! instead of going through the worklist.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{CompilerConfig, OutputFormat};
use crate::descriptor::{FieldDescriptor, FieldType, TypeDescriptor, TypeDescriptorProvider, TypeId};
use crate::error::{MappingError, Result};
use crate::format;
use crate::names::camel_to_snake;
use crate::tag::MappingTag;

/// Ordered `mapping name -> property` map
pub type SchemaNode = IndexMap<String, PropertyEntry>;

/// One mapped property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyEntry {
    #[serde(rename = "type")]
    pub kind: String,
    /// Present only for struct-typed fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<SchemaNode>,
}

impl PropertyEntry {
    pub fn scalar(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            properties: None,
        }
    }

    pub fn object(kind: impl Into<String>, properties: SchemaNode) -> Self {
        Self {
            kind: kind.into(),
            properties: Some(properties),
        }
    }
}

/// Mapping of a single top-level type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMapping {
    pub properties: SchemaNode,
}

/// The whole output document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingsDocument {
    pub mappings: IndexMap<String, TypeMapping>,
}

/// Worklist-driven mappings compiler.
///
/// Not meant to be shared: `request_type` and `run` mutate the worklist in
/// place.
pub struct SchemaCompiler<'a, P: TypeDescriptorProvider + ?Sized> {
    provider: &'a P,
    config: CompilerConfig,

    /// Types already compiled
    seen: HashSet<TypeId>,

    /// Types requested but not compiled yet; compiled last-in first-out
    pending: Vec<TypeId>,
}

impl<'a, P: TypeDescriptorProvider + ?Sized> SchemaCompiler<'a, P> {
    pub fn new(provider: &'a P, config: CompilerConfig) -> Self {
        Self {
            provider,
            config,
            seen: HashSet::new(),
            pending: Vec::new(),
        }
    }

    /// Request mappings for a type. Requests for types already compiled or
    /// already pending are ignored.
    pub fn request_type(&mut self, id: impl Into<TypeId>) {
        let id = id.into();
        if self.seen.contains(&id) || self.pending.contains(&id) {
            return;
        }
        self.pending.push(id);
    }

    /// Types waiting to be compiled, oldest request first
    pub fn pending(&self) -> &[TypeId] {
        &self.pending
    }

    pub fn is_seen(&self, id: &TypeId) -> bool {
        self.seen.contains(id)
    }

    /// Drain the worklist and serialize the document.
    ///
    /// Any error aborts the whole run; no partial document is returned.
    pub fn run(&mut self) -> Result<Vec<u8>> {
        let document = self.build_document()?;
        let compact = serde_json::to_vec(&document)?;

        match self.config.format {
            OutputFormat::Pretty => {
                debug!("formatting output");
                format::indent(&compact)
            }
            OutputFormat::Compact => Ok(compact),
        }
    }

    /// Drain the worklist into a document without serializing it
    pub fn build_document(&mut self) -> Result<MappingsDocument> {
        debug!(pending = ?self.pending, "types requested");

        let mut document = MappingsDocument::default();

        while let Some(id) = self.pending.pop() {
            self.seen.insert(id.clone());

            let descriptor = self.lookup(&id)?;
            let name = camel_to_snake(&descriptor.name);
            debug!(type_id = %id, mapping = %name, "generating mappings");

            let properties = self.compile_type(&id)?;

            if document.mappings.contains_key(&name) {
                return Err(MappingError::DuplicateMapping {
                    scope: "mappings".to_string(),
                    name,
                });
            }
            document.mappings.insert(name, TypeMapping { properties });
        }

        Ok(document)
    }

    /// Compile the properties of one type, expanding struct fields inline.
    pub fn compile_type(&self, id: &TypeId) -> Result<SchemaNode> {
        let mut expanding = Vec::new();
        self.expand(id, &mut expanding)
    }

    fn lookup(&self, id: &TypeId) -> Result<&'a TypeDescriptor> {
        self.provider
            .descriptor(id)
            .ok_or_else(|| MappingError::UnknownType(id.clone()))
    }

    /// `expanding` holds the chain of named types currently being expanded;
    /// meeting one of them again means the type graph has a cycle.
    fn expand(&self, id: &TypeId, expanding: &mut Vec<TypeId>) -> Result<SchemaNode> {
        if expanding.contains(id) {
            let chain = expanding
                .iter()
                .chain(std::iter::once(id))
                .map(ToString::to_string)
                .collect();
            return Err(MappingError::RecursiveType { chain });
        }

        let descriptor = self.lookup(id)?;

        expanding.push(id.clone());
        let node = self.compile_fields(&descriptor.name, &descriptor.fields, expanding);
        expanding.pop();

        node
    }

    fn compile_fields(
        &self,
        owner: &str,
        fields: &[FieldDescriptor],
        expanding: &mut Vec<TypeId>,
    ) -> Result<SchemaNode> {
        let mut node = SchemaNode::with_capacity(fields.len());

        for field in fields {
            let Some(raw) = field.tag(&self.config.tag_key) else {
                continue;
            };
            let tag = MappingTag::parse(raw, &field.name, owner)?;

            let entry = match &field.ty {
                FieldType::Scalar(_) => PropertyEntry::scalar(tag.kind),
                FieldType::Struct(nested) => PropertyEntry::object(tag.kind, self.expand(nested, expanding)?),
                FieldType::Inline(nested) => {
                    let scope = format!("{}.{}", owner, field.name);
                    PropertyEntry::object(tag.kind, self.compile_fields(&scope, nested, expanding)?)
                }
            };

            if node.contains_key(&tag.name) {
                return Err(MappingError::DuplicateMapping {
                    scope: owner.to_string(),
                    name: tag.name,
                });
            }

            debug!(owner, field = %field.name, mapping = %tag.name, kind = %entry.kind, "property");
            node.insert(tag.name, entry);
        }

        Ok(node)
    }
}
