// Wed Oct 14 2026 - Alex

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClassModifiers: u32 {
        const INTERFACE = 0x0000_0200;
        const ABSTRACT = 0x0000_0400;
        const ARRAY = 0x0001_0000;
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MethodModifiers: u32 {
        const HAS_METHOD_ANNOTATIONS = 0x0001_0000;
        const HAS_EXCEPTION_INFO = 0x0002_0000;
        const HAS_DEBUG_INFO = 0x0004_0000;
        const HAS_STACK_MAP = 0x0008_0000;
        const HAS_METHOD_PARAMETERS = 0x0010_0000;
        const HAS_DEFAULT_ANNOTATION = 0x0020_0000;
        const HAS_PARAMETER_ANNOTATIONS = 0x0040_0000;
        const HAS_EXTENDED_MODIFIERS = 0x0080_0000;
        const HAS_GENERIC_SIGNATURE = 0x0200_0000;
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ExtendedMethodModifiers: u32 {
        const HAS_METHOD_TYPE_ANNOTATIONS = 0x0000_0001;
        const HAS_CODE_TYPE_ANNOTATIONS = 0x0000_0002;
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FieldModifiers: u32 {
        const SIZE_DOUBLE = 0x0004_0000;
        const CONSTANT = 0x0040_0000;
        const HAS_ANNOTATIONS = 0x2000_0000;
        const HAS_GENERIC_SIGNATURE = 0x4000_0000;
    }

    /// `J9ROMClass.optionalFlags`. Each set bit with a word in the optional
    /// info block adds one word, in the order `OPTIONAL_INFO_WORDS` lists.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OptionalFlags: u32 {
        const SOURCE_FILE_NAME = 0x0000_0001;
        const GENERIC_SIGNATURE = 0x0000_0002;
        const SOURCE_DEBUG_EXTENSION = 0x0000_0004;
        const TYPE_TABLE = 0x0000_0020;
        const ENCLOSING_METHOD = 0x0000_0040;
        const SIMPLE_NAME = 0x0000_0080;
        const LOCAL = 0x0000_1000;
        const REMOTE = 0x0000_2000;
        const VERIFY_EXCLUDE = 0x0000_4000;
        const CLASS_ANNOTATION_INFO = 0x0000_8000;
        const VARIABLE_TABLE_HAS_GENERIC = 0x0001_0000;
        const PRELOAD_ATTRIBUTE = 0x0002_0000;
        const IMPLICIT_CREATION_ATTRIBUTE = 0x0004_0000;
        const TYPE_ANNOTATION_INFO = 0x0040_0000;
        const RECORD_ATTRIBUTE = 0x0080_0000;
        const PERMITTED_SUBCLASSES_ATTRIBUTE = 0x0100_0000;
        const INJECTED_INTERFACE_INFO = 0x0200_0000;
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RecordComponentFlags: u32 {
        const HAS_GENERIC_SIGNATURE = 0x0000_0001;
        const HAS_ANNOTATIONS = 0x0000_0002;
        const HAS_TYPE_ANNOTATIONS = 0x0000_0004;
    }
}

/// Optional info words in block order.
pub const OPTIONAL_INFO_WORDS: [OptionalFlags; 13] = [
    OptionalFlags::SOURCE_FILE_NAME,
    OptionalFlags::GENERIC_SIGNATURE,
    OptionalFlags::SOURCE_DEBUG_EXTENSION,
    OptionalFlags::ENCLOSING_METHOD,
    OptionalFlags::SIMPLE_NAME,
    OptionalFlags::VERIFY_EXCLUDE,
    OptionalFlags::CLASS_ANNOTATION_INFO,
    OptionalFlags::TYPE_ANNOTATION_INFO,
    OptionalFlags::RECORD_ATTRIBUTE,
    OptionalFlags::PERMITTED_SUBCLASSES_ATTRIBUTE,
    OptionalFlags::INJECTED_INTERFACE_INFO,
    OptionalFlags::PRELOAD_ATTRIBUTE,
    OptionalFlags::IMPLICIT_CREATION_ATTRIBUTE,
];

impl OptionalFlags {
    /// Number of optional info words these flags account for. Flags such as
    /// `TYPE_TABLE` or `LOCAL` describe the class and own no word.
    pub fn word_count(self) -> u64 {
        OPTIONAL_INFO_WORDS.iter().filter(|flag| self.contains(**flag)).count() as u64
    }
}
