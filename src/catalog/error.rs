// Tue Oct 13 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Structure not found: {0}")]
    StructureNotFound(String),
    #[error("Field not found: {structure}.{field}")]
    FieldNotFound { structure: String, field: String },
    #[error("Unknown field type '{type_name}' for {structure}.{field}")]
    UnknownFieldType {
        structure: String,
        field: String,
        type_name: String,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Schema parse error: {0}")]
    Json(#[from] serde_json::Error),
}
