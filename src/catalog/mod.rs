// Tue Oct 13 2026 - Alex

pub mod descriptor;
pub mod error;
pub mod registry;
pub mod schema;
pub mod type_map;

pub use descriptor::{FieldDescriptor, StructureDescriptor};
pub use error::CatalogError;
pub use registry::StructureCatalog;
pub use schema::{SchemaFile, StructureSchema};
pub use type_map::{resolve_field_type, ResolvedField};
