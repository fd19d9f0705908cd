// Wed Oct 14 2026 - Alex

use crate::memory::{Address, MemoryRange};
use crate::walker::FieldFault;
use std::fmt;

/// Kind of a layout region. Declaration order is the tie-break precedence used
/// when regions share an address, so section ends come first and section starts
/// second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SlotType {
    SectionEnd,
    SectionStart,
    U8,
    U16,
    U32,
    U64,
    I32,
    I64,
    Udata,
    Idata,
    Srp,
    Wsrp,
    /// Walker input: a relative pointer to a string. Stored as `SrpUtf8`.
    RomUtf8,
    SrpUtf8,
    SrpNas,
    Utf8,
    IntermediateClassData,
    Padding,
}

impl SlotType {
    pub fn fixed_size(self, pointer_size: usize) -> Option<u64> {
        let size = match self {
            SlotType::U8 => 1,
            SlotType::U16 => 2,
            SlotType::U32 | SlotType::I32 => 4,
            SlotType::U64 | SlotType::I64 => 8,
            SlotType::Udata | SlotType::Idata | SlotType::Wsrp => pointer_size as u64,
            SlotType::Srp | SlotType::RomUtf8 | SlotType::SrpUtf8 | SlotType::SrpNas => 4,
            _ => return None,
        };
        Some(size)
    }

    pub fn is_section(self) -> bool {
        matches!(self, SlotType::SectionStart | SlotType::SectionEnd)
    }

    pub fn name(self) -> &'static str {
        match self {
            SlotType::SectionEnd => "J9_SECTION_END",
            SlotType::SectionStart => "J9_SECTION_START",
            SlotType::U8 => "J9_U8",
            SlotType::U16 => "J9_U16",
            SlotType::U32 => "J9_U32",
            SlotType::U64 => "J9_U64",
            SlotType::I32 => "J9_I32",
            SlotType::I64 => "J9_I64",
            SlotType::Udata => "J9_UDATA",
            SlotType::Idata => "J9_IDATA",
            SlotType::Srp => "J9_SRP",
            SlotType::Wsrp => "J9_WSRP",
            SlotType::RomUtf8 => "J9_ROM_UTF8",
            SlotType::SrpUtf8 => "J9_SRP_UTF8",
            SlotType::SrpNas => "J9_SRPNAS",
            SlotType::Utf8 => "J9_UTF8",
            SlotType::IntermediateClassData => "J9_IntermediateClassData",
            SlotType::Padding => "J9_Padding",
        }
    }
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Rom,
    Ram,
}

/// The class structure being walked. ROM classes declare their total size and
/// the length of their intermediate class data blob; RAM classes do not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassOwner {
    kind: ClassKind,
    address: Address,
    length: Option<u64>,
    intermediate_data_length: u64,
}

impl ClassOwner {
    pub fn rom(address: Address, length: u64, intermediate_data_length: u64) -> Self {
        Self {
            kind: ClassKind::Rom,
            address,
            length: Some(length),
            intermediate_data_length,
        }
    }

    pub fn ram(address: Address) -> Self {
        Self {
            kind: ClassKind::Ram,
            address,
            length: None,
            intermediate_data_length: 0,
        }
    }

    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn length(&self) -> Option<u64> {
        self.length
    }

    pub fn intermediate_data_length(&self) -> u64 {
        self.intermediate_data_length
    }

    pub fn range(&self) -> Option<MemoryRange> {
        self.length.map(|len| MemoryRange::from_start_size(self.address, len))
    }

    pub fn end(&self) -> Option<Address> {
        self.range().map(|r| r.end())
    }

    /// True only when the class declares a size and `[start, start + len)` lies
    /// inside it.
    pub fn contains(&self, start: Address, len: u64) -> bool {
        self.range().is_some_and(|r| r.contains_range(start, len))
    }

    pub fn offset_of(&self, location: Address) -> i64 {
        location.distance(self.address)
    }
}

/// Receiver for everything a class walker discovers.
pub trait ClassWalkCallbacks {
    /// Reports one typed slot. A fault means the slot could not be recorded; the
    /// walker decides whether to continue.
    fn add_slot(
        &mut self,
        owner: &ClassOwner,
        kind: SlotType,
        location: Address,
        name: &str,
        extra_info: Option<&str>,
    ) -> Result<(), FieldFault>;

    /// Reports a named byte range that groups the slots inside it.
    fn add_section(&mut self, owner: &ClassOwner, start: Address, length: u64, name: &str, compute_padding: bool);
}
