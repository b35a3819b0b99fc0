//! Type descriptors
//!
//! The compiler never inspects source code. It walks an explicit graph of
//! [`TypeDescriptor`]s handed over by a type extractor and looked up through a
//! [`TypeDescriptorProvider`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MappingError, Result};

/// Stable identity of a type: `package.Name`, or `Name` outside any package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(String);

impl TypeId {
    pub fn new(package: Option<&str>, name: &str) -> Self {
        match package {
            Some(pkg) if !pkg.is_empty() => Self(format!("{}.{}", pkg, name)),
            _ => Self(name.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_qualified(&self) -> bool {
        self.0.contains('.')
    }

    /// Qualify a bare reference with `package`; qualified ids are returned as is.
    pub fn qualify(&self, package: Option<&str>) -> Self {
        if self.is_qualified() {
            self.clone()
        } else {
            Self::new(package, &self.0)
        }
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TypeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TypeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Declared type of a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Scalar type, by its source name (`string`, `int64`, `time.Time`, ...)
    Scalar(String),
    /// Named struct type
    Struct(TypeId),
    /// Anonymous struct declared in place
    Inline(Vec<FieldDescriptor>),
}

impl FieldType {
    pub fn is_composite(&self) -> bool {
        !matches!(self, FieldType::Scalar(_))
    }
}

/// A single struct field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name as declared (e.g. "ID", "TestThing")
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub ty: FieldType,
    /// Raw tag strings by tag key
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            tags: BTreeMap::new(),
        }
    }

    /// Builder-style helper to attach a tag
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Raw tag under `key`. An empty tag counts as no tag.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .get(key)
            .map(String::as_str)
            .filter(|tag| !tag.is_empty())
    }
}

/// A struct type as reported by the extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// Whether the declaration carries the generation marker
    #[serde(default)]
    pub annotated: bool,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: None,
            annotated: false,
            fields: Vec::new(),
        }
    }

    pub fn in_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn annotated(mut self) -> Self {
        self.annotated = true;
        self
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn id(&self) -> TypeId {
        TypeId::new(self.package.as_deref(), &self.name)
    }
}

/// Lookup capability the compiler is driven by
pub trait TypeDescriptorProvider {
    /// Get the descriptor for a type, if known
    fn descriptor(&self, id: &TypeId) -> Option<&TypeDescriptor>;
}

/// In-memory, insertion-ordered set of descriptors
#[derive(Debug, Default, Clone)]
pub struct TypeSet {
    types: Vec<TypeDescriptor>,
    by_id: HashMap<TypeId, usize>,
}

impl TypeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor. Bare struct references in its fields are qualified
    /// with the descriptor's package.
    pub fn insert(&mut self, mut descriptor: TypeDescriptor) -> Result<TypeId> {
        let id = descriptor.id();
        if self.by_id.contains_key(&id) {
            return Err(MappingError::DuplicateMapping {
                scope: "type set".to_string(),
                name: id.to_string(),
            });
        }

        let package = descriptor.package.clone();
        qualify_fields(&mut descriptor.fields, package.as_deref());

        self.by_id.insert(id.clone(), self.types.len());
        self.types.push(descriptor);
        Ok(id)
    }

    pub fn get(&self, id: &TypeId) -> Option<&TypeDescriptor> {
        self.by_id.get(id).map(|&idx| &self.types[idx])
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeDescriptorProvider for TypeSet {
    fn descriptor(&self, id: &TypeId) -> Option<&TypeDescriptor> {
        self.get(id)
    }
}

fn qualify_fields(fields: &mut [FieldDescriptor], package: Option<&str>) {
    for field in fields {
        match &mut field.ty {
            FieldType::Struct(id) => *id = id.qualify(package),
            FieldType::Inline(nested) => qualify_fields(nested, package),
            FieldType::Scalar(_) => {}
        }
    }
}
