// Wed Oct 14 2026 - Alex

use crate::catalog::CatalogError;
use crate::memory::MemoryError;
use crate::walker::SlotType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalkError {
    #[error("Metadata error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),
    #[error("Corrupt data: {0}")]
    CorruptData(String),
}

impl WalkError {
    pub fn is_structure_not_found(&self) -> bool {
        matches!(self, WalkError::Catalog(CatalogError::StructureNotFound(_)))
    }
}

/// Turns an unreadable image word into `None` so the walk can drop the part
/// that depends on it. Metadata and corrupt-data errors still propagate.
pub trait SkipUnreadable<T> {
    fn or_skip(self, what: &str) -> Result<Option<T>, WalkError>;
}

impl<T, E: Into<WalkError>> SkipUnreadable<T> for Result<T, E> {
    fn or_skip(self, what: &str) -> Result<Option<T>, WalkError> {
        match self.map_err(Into::into) {
            Ok(value) => Ok(Some(value)),
            Err(WalkError::Memory(err)) => {
                log::debug!("skipping {}: {}", what, err);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

/// Why a single slot could not be recorded.
#[derive(Error, Debug)]
pub enum FieldFault {
    #[error("slot memory unreadable: {0}")]
    Memory(#[from] MemoryError),
    #[error("metadata lookup failed: {0}")]
    Catalog(#[from] CatalogError),
    #[error("slot kind {0} cannot be reported as a slot")]
    UnsupportedKind(SlotType),
}
