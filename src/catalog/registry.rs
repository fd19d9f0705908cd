// Wed Oct 14 2026 - Alex

use crate::catalog::schema::{builtin_schema, SchemaFile};
use crate::catalog::{CatalogError, StructureDescriptor};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

static BUILTIN_CATALOG: Lazy<Arc<StructureCatalog>> =
    Lazy::new(|| Arc::new(StructureCatalog::from_schema(&builtin_schema())));

/// Structure metadata for the dumped VM, looked up by structure name.
#[derive(Debug, Clone, Default)]
pub struct StructureCatalog {
    structures: HashMap<String, StructureDescriptor>,
}

impl StructureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Arc<StructureCatalog> {
        Arc::clone(&BUILTIN_CATALOG)
    }

    pub fn from_schema(schema: &SchemaFile) -> Self {
        let mut catalog = Self::new();
        for structure in &schema.structures {
            catalog.insert(structure.to_descriptor());
        }
        catalog
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let schema: SchemaFile = serde_json::from_str(json)?;
        Ok(Self::from_schema(&schema))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn insert(&mut self, descriptor: StructureDescriptor) {
        self.structures.insert(descriptor.name().to_string(), descriptor);
    }

    pub fn len(&self) -> usize {
        self.structures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    pub fn structure(&self, name: &str) -> Result<&StructureDescriptor, CatalogError> {
        self.structures
            .get(name)
            .ok_or_else(|| CatalogError::StructureNotFound(name.to_string()))
    }

    pub fn size_of(&self, structure: &str) -> Result<u64, CatalogError> {
        Ok(self.structure(structure)?.size())
    }

    pub fn field_offset(&self, structure: &str, field: &str) -> Result<u64, CatalogError> {
        self.structure(structure)?
            .field(field)
            .map(|f| f.offset)
            .ok_or_else(|| CatalogError::FieldNotFound {
                structure: structure.to_string(),
                field: field.to_string(),
            })
    }

    /// True when `structure` is known and declares `field`. Older VM levels omit
    /// some fields.
    pub fn has_field(&self, structure: &str, field: &str) -> bool {
        self.structures
            .get(structure)
            .is_some_and(|s| s.field(field).is_some())
    }
}
