// Wed Oct 14 2026 - Alex

use crate::memory::{Address, MemoryError, MemoryReader};

/// J9CPTYPE codes as stored in the shape description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CpType {
    Unused,
    Class,
    String,
    Int,
    Float,
    Long,
    Double,
    Field,
    Unused8,
    InstanceMethod,
    StaticMethod,
    HandleMethod,
    InterfaceMethod,
    MethodType,
    MethodHandle,
    AnnotationUtf8,
    ConstantDynamic,
    InterfaceStaticMethod,
    InterfaceInstanceMethod,
}

impl CpType {
    pub fn from_code(code: u32) -> Option<Self> {
        let cp_type = match code {
            0 => CpType::Unused,
            1 => CpType::Class,
            2 => CpType::String,
            3 => CpType::Int,
            4 => CpType::Float,
            5 => CpType::Long,
            6 => CpType::Double,
            7 => CpType::Field,
            8 => CpType::Unused8,
            9 => CpType::InstanceMethod,
            10 => CpType::StaticMethod,
            11 => CpType::HandleMethod,
            12 => CpType::InterfaceMethod,
            13 => CpType::MethodType,
            14 => CpType::MethodHandle,
            15 => CpType::AnnotationUtf8,
            17 => CpType::ConstantDynamic,
            18 => CpType::InterfaceStaticMethod,
            19 => CpType::InterfaceInstanceMethod,
            _ => return None,
        };
        Some(cp_type)
    }

    pub fn code(self) -> u32 {
        match self {
            CpType::Unused => 0,
            CpType::Class => 1,
            CpType::String => 2,
            CpType::Int => 3,
            CpType::Float => 4,
            CpType::Long => 5,
            CpType::Double => 6,
            CpType::Field => 7,
            CpType::Unused8 => 8,
            CpType::InstanceMethod => 9,
            CpType::StaticMethod => 10,
            CpType::HandleMethod => 11,
            CpType::InterfaceMethod => 12,
            CpType::MethodType => 13,
            CpType::MethodHandle => 14,
            CpType::AnnotationUtf8 => 15,
            CpType::ConstantDynamic => 17,
            CpType::InterfaceStaticMethod => 18,
            CpType::InterfaceInstanceMethod => 19,
        }
    }
}

/// Width of one entry's description in the shape bitstream. Descriptions are
/// packed low bits first into little-endian u32 words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeEncoding {
    bits: u64,
}

impl ShapeEncoding {
    pub const NIBBLE: Self = Self { bits: 4 };
    pub const BYTE: Self = Self { bits: 8 };

    pub fn from_bits(bits: u64) -> Option<Self> {
        match bits {
            4 => Some(Self::NIBBLE),
            8 => Some(Self::BYTE),
            _ => None,
        }
    }

    pub fn bits(self) -> u64 {
        self.bits
    }

    pub fn descriptions_per_u32(self) -> u64 {
        32 / self.bits
    }

    fn mask(self) -> u32 {
        (1u32 << self.bits) - 1
    }

    /// Number of u32 words in a shape description covering `cp_count` entries.
    pub fn words(self, cp_count: u64) -> u64 {
        cp_count.div_ceil(self.descriptions_per_u32())
    }

    /// Raw type code of entry `index`.
    pub fn type_code(self, reader: &dyn MemoryReader, shape: Address, index: u64) -> Result<u32, MemoryError> {
        let per_word = self.descriptions_per_u32();
        let word = reader.read_u32(shape + (index / per_word) * 4)?;
        let shift = (index % per_word) * self.bits;
        Ok((word >> shift) & self.mask())
    }

    /// Packs `code` for entry `index` into `words`.
    pub fn pack(self, words: &mut [u32], index: u64, code: u32) {
        let per_word = self.descriptions_per_u32();
        let shift = (index % per_word) * self.bits;
        if let Some(word) = words.get_mut((index / per_word) as usize) {
            *word |= (code & self.mask()) << shift;
        }
    }
}

impl Default for ShapeEncoding {
    fn default() -> Self {
        Self::NIBBLE
    }
}
