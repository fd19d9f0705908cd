// Tue Oct 13 2026 - Alex

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub offset: u64,
    #[serde(rename = "type")]
    pub type_name: String,
}

impl FieldDescriptor {
    pub fn new(name: &str, offset: u64, type_name: &str) -> Self {
        Self {
            name: name.to_string(),
            offset,
            type_name: type_name.to_string(),
        }
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ 0x{:x}: {}", self.name, self.offset, self.type_name)
    }
}

/// Field layout of one VM structure. Fields keep declaration order.
#[derive(Debug, Clone)]
pub struct StructureDescriptor {
    name: String,
    size: u64,
    fields: IndexMap<String, FieldDescriptor>,
}

impl StructureDescriptor {
    pub fn new(name: &str, size: u64) -> Self {
        Self {
            name: name.to_string(),
            size,
            fields: IndexMap::new(),
        }
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.add_field(field);
        self
    }

    pub fn add_field(&mut self, field: FieldDescriptor) {
        self.fields.insert(field.name.clone(), field);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}
