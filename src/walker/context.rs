// Wed Oct 14 2026 - Alex

use crate::catalog::{resolve_field_type, StructureCatalog};
use crate::memory::{Address, MemoryReader};
use crate::walker::constant_pool::ShapeEncoding;
use crate::walker::{ClassOwner, ClassWalkCallbacks, FieldFault, SlotType, WalkError};
use std::sync::Arc;

/// Image and metadata shared by the walkers.
#[derive(Clone)]
pub struct WalkContext {
    reader: Arc<dyn MemoryReader>,
    catalog: Arc<StructureCatalog>,
    shape_encoding: ShapeEncoding,
}

impl WalkContext {
    pub fn new(reader: Arc<dyn MemoryReader>, catalog: Arc<StructureCatalog>) -> Self {
        Self {
            reader,
            catalog,
            shape_encoding: ShapeEncoding::default(),
        }
    }

    pub fn with_shape_encoding(mut self, encoding: ShapeEncoding) -> Self {
        self.shape_encoding = encoding;
        self
    }

    pub fn shape_encoding(&self) -> ShapeEncoding {
        self.shape_encoding
    }

    pub fn reader(&self) -> &dyn MemoryReader {
        self.reader.as_ref()
    }

    pub fn shared_reader(&self) -> Arc<dyn MemoryReader> {
        Arc::clone(&self.reader)
    }

    pub fn catalog(&self) -> &StructureCatalog {
        &self.catalog
    }

    pub fn shared_catalog(&self) -> Arc<StructureCatalog> {
        Arc::clone(&self.catalog)
    }

    pub fn pointer_size(&self) -> u64 {
        self.reader.pointer_size() as u64
    }

    pub fn size_of(&self, structure: &str) -> Result<u64, WalkError> {
        Ok(self.catalog.size_of(structure)?)
    }

    pub fn field(&self, structure: &str, base: Address, field: &str) -> Result<Address, WalkError> {
        Ok(base + self.catalog.field_offset(structure, field)?)
    }

    pub fn read_u16_field(&self, structure: &str, base: Address, field: &str) -> Result<u16, WalkError> {
        Ok(self.reader.read_u16(self.field(structure, base, field)?)?)
    }

    pub fn read_u32_field(&self, structure: &str, base: Address, field: &str) -> Result<u32, WalkError> {
        Ok(self.reader.read_u32(self.field(structure, base, field)?)?)
    }

    pub fn read_udata_field(&self, structure: &str, base: Address, field: &str) -> Result<u64, WalkError> {
        Ok(self.reader.read_udata(self.field(structure, base, field)?)?)
    }

    pub fn read_ptr_field(&self, structure: &str, base: Address, field: &str) -> Result<Address, WalkError> {
        Ok(self.reader.read_ptr(self.field(structure, base, field)?)?)
    }

    pub fn read_srp_field(&self, structure: &str, base: Address, field: &str) -> Result<Option<Address>, WalkError> {
        Ok(self.reader.read_srp(self.field(structure, base, field)?)?)
    }

    pub fn read_wsrp_field(&self, structure: &str, base: Address, field: &str) -> Result<Option<Address>, WalkError> {
        Ok(self.reader.read_wsrp(self.field(structure, base, field)?)?)
    }

    pub fn read_utf8_at_srp(&self, structure: &str, base: Address, field: &str) -> Result<String, WalkError> {
        match self.read_srp_field(structure, base, field)? {
            Some(target) => Ok(self.reader.read_utf8(target)?),
            None => Err(WalkError::CorruptData(format!("{}.{} at {} is null", structure, field, base))),
        }
    }
}

/// Walk-scoped handle on the collector. Slot faults are logged and skipped;
/// metadata faults end the walk.
pub struct Emitter<'a> {
    owner: &'a ClassOwner,
    callbacks: &'a mut dyn ClassWalkCallbacks,
}

impl<'a> Emitter<'a> {
    pub fn new(owner: &'a ClassOwner, callbacks: &'a mut dyn ClassWalkCallbacks) -> Self {
        Self { owner, callbacks }
    }

    pub fn owner(&self) -> &ClassOwner {
        self.owner
    }

    pub fn slot(&mut self, kind: SlotType, location: Address, name: &str) -> Result<(), WalkError> {
        self.slot_with_info(kind, location, name, None)
    }

    pub fn slot_with_info(
        &mut self,
        kind: SlotType,
        location: Address,
        name: &str,
        extra_info: Option<&str>,
    ) -> Result<(), WalkError> {
        match self.callbacks.add_slot(self.owner, kind, location, name, extra_info) {
            Ok(()) => Ok(()),
            Err(FieldFault::Catalog(err)) => Err(err.into()),
            Err(fault) => {
                log::debug!("skipping {} slot '{}' at {}: {}", kind, name, location, fault);
                Ok(())
            }
        }
    }

    pub fn section(&mut self, start: Address, length: u64, name: &str, compute_padding: bool) {
        self.callbacks.add_section(self.owner, start, length, name, compute_padding);
    }
}

/// Emits one slot per catalog field of `structure` located at `base`.
pub fn add_object_as_slots(
    cx: &WalkContext,
    out: &mut Emitter<'_>,
    structure: &str,
    base: Address,
) -> Result<(), WalkError> {
    let descriptor = cx.catalog().structure(structure)?;
    for field in descriptor.fields() {
        let resolved = resolve_field_type(structure, field)?;
        out.slot_with_info(resolved.kind, base + field.offset, &field.name, resolved.hint.as_deref())?;
    }
    Ok(())
}
