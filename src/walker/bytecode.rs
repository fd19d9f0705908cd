// Thu Oct 15 2026 - Alex

use crate::memory::{Address, MemoryReader};
use crate::walker::{Emitter, SlotType, WalkError};

// 0x00 - 0xC9 follow the class-file numbering; 0xCA and up are VM-internal.
pub const JB_BIPUSH: u8 = 0x10;
pub const JB_SIPUSH: u8 = 0x11;
pub const JB_LDC: u8 = 0x12;
pub const JB_LDCW: u8 = 0x13;
pub const JB_LDC2LW: u8 = 0x14;
pub const JB_ILOAD: u8 = 0x15;
pub const JB_LLOAD: u8 = 0x16;
pub const JB_FLOAD: u8 = 0x17;
pub const JB_DLOAD: u8 = 0x18;
pub const JB_ALOAD: u8 = 0x19;
pub const JB_ALOAD0: u8 = 0x2a;
pub const JB_ISTORE: u8 = 0x36;
pub const JB_LSTORE: u8 = 0x37;
pub const JB_FSTORE: u8 = 0x38;
pub const JB_DSTORE: u8 = 0x39;
pub const JB_ASTORE: u8 = 0x3a;
pub const JB_IINC: u8 = 0x84;
pub const JB_IFEQ: u8 = 0x99;
pub const JB_IFACMPNE: u8 = 0xa6;
pub const JB_GOTO: u8 = 0xa7;
pub const JB_TABLESWITCH: u8 = 0xaa;
pub const JB_LOOKUPSWITCH: u8 = 0xab;
pub const JB_IRETURN: u8 = 0xac;
pub const JB_RETURN: u8 = 0xb1;
pub const JB_GETSTATIC: u8 = 0xb2;
pub const JB_PUTFIELD: u8 = 0xb5;
pub const JB_INVOKEVIRTUAL: u8 = 0xb6;
pub const JB_INVOKESPECIAL: u8 = 0xb7;
pub const JB_INVOKESTATIC: u8 = 0xb8;
pub const JB_INVOKEINTERFACE: u8 = 0xb9;
pub const JB_INVOKEDYNAMIC: u8 = 0xba;
pub const JB_NEW: u8 = 0xbb;
pub const JB_NEWARRAY: u8 = 0xbc;
pub const JB_ANEWARRAY: u8 = 0xbd;
pub const JB_CHECKCAST: u8 = 0xc0;
pub const JB_INSTANCEOF: u8 = 0xc1;
pub const JB_MULTIANEWARRAY: u8 = 0xc5;
pub const JB_IFNULL: u8 = 0xc6;
pub const JB_IFNONNULL: u8 = 0xc7;
pub const JB_GOTOW: u8 = 0xc8;
pub const JB_ILOADW: u8 = 0xcb;
pub const JB_ALOADW: u8 = 0xcf;
pub const JB_ISTOREW: u8 = 0xd0;
pub const JB_ASTOREW: u8 = 0xd4;
pub const JB_IINCW: u8 = 0xd5;
pub const JB_NEWDUP: u8 = 0xd7;
pub const JB_INVOKEINTERFACE2: u8 = 0xd8;
pub const JB_INVOKEHANDLE: u8 = 0xd9;
pub const JB_INVOKEHANDLEGENERIC: u8 = 0xda;
pub const JB_INVOKESTATICSPLIT: u8 = 0xdb;
pub const JB_INVOKESPECIALSPLIT: u8 = 0xdc;
pub const JB_LDC2DW: u8 = 0xe5;

static OPCODE_NAMES: [&str; 230] = [
    "JBnop", "JBaconstnull", "JBiconstm1", "JBiconst0", "JBiconst1", "JBiconst2", "JBiconst3", "JBiconst4",
    "JBiconst5", "JBlconst0", "JBlconst1", "JBfconst0", "JBfconst1", "JBfconst2", "JBdconst0", "JBdconst1",
    "JBbipush", "JBsipush", "JBldc", "JBldcw", "JBldc2lw", "JBiload", "JBlload", "JBfload",
    "JBdload", "JBaload", "JBiload0", "JBiload1", "JBiload2", "JBiload3", "JBlload0", "JBlload1",
    "JBlload2", "JBlload3", "JBfload0", "JBfload1", "JBfload2", "JBfload3", "JBdload0", "JBdload1",
    "JBdload2", "JBdload3", "JBaload0", "JBaload1", "JBaload2", "JBaload3", "JBiaload", "JBlaload",
    "JBfaload", "JBdaload", "JBaaload", "JBbaload", "JBcaload", "JBsaload", "JBistore", "JBlstore",
    "JBfstore", "JBdstore", "JBastore", "JBistore0", "JBistore1", "JBistore2", "JBistore3", "JBlstore0",
    "JBlstore1", "JBlstore2", "JBlstore3", "JBfstore0", "JBfstore1", "JBfstore2", "JBfstore3", "JBdstore0",
    "JBdstore1", "JBdstore2", "JBdstore3", "JBastore0", "JBastore1", "JBastore2", "JBastore3", "JBiastore",
    "JBlastore", "JBfastore", "JBdastore", "JBaastore", "JBbastore", "JBcastore", "JBsastore", "JBpop",
    "JBpop2", "JBdup", "JBdupx1", "JBdupx2", "JBdup2", "JBdup2x1", "JBdup2x2", "JBswap",
    "JBiadd", "JBladd", "JBfadd", "JBdadd", "JBisub", "JBlsub", "JBfsub", "JBdsub",
    "JBimul", "JBlmul", "JBfmul", "JBdmul", "JBidiv", "JBldiv", "JBfdiv", "JBddiv",
    "JBirem", "JBlrem", "JBfrem", "JBdrem", "JBineg", "JBlneg", "JBfneg", "JBdneg",
    "JBishl", "JBlshl", "JBishr", "JBlshr", "JBiushr", "JBlushr", "JBiand", "JBland",
    "JBior", "JBlor", "JBixor", "JBlxor", "JBiinc", "JBi2l", "JBi2f", "JBi2d",
    "JBl2i", "JBl2f", "JBl2d", "JBf2i", "JBf2l", "JBf2d", "JBd2i", "JBd2l",
    "JBd2f", "JBi2b", "JBi2c", "JBi2s", "JBlcmp", "JBfcmpl", "JBfcmpg", "JBdcmpl",
    "JBdcmpg", "JBifeq", "JBifne", "JBiflt", "JBifge", "JBifgt", "JBifle", "JBificmpeq",
    "JBificmpne", "JBificmplt", "JBificmpge", "JBificmpgt", "JBificmple", "JBifacmpeq", "JBifacmpne", "JBgoto",
    "JBjsr", "JBret", "JBtableswitch", "JBlookupswitch", "JBireturn", "JBlreturn", "JBfreturn", "JBdreturn",
    "JBareturn", "JBreturn", "JBgetstatic", "JBputstatic", "JBgetfield", "JBputfield", "JBinvokevirtual", "JBinvokespecial",
    "JBinvokestatic", "JBinvokeinterface", "JBinvokedynamic", "JBnew", "JBnewarray", "JBanewarray", "JBarraylength", "JBathrow",
    "JBcheckcast", "JBinstanceof", "JBmonitorenter", "JBmonitorexit", "JBwide", "JBmultianewarray", "JBifnull", "JBifnonnull",
    "JBgotow", "JBjsrw", "JBbreakpoint", "JBiloadw", "JBlloadw", "JBfloadw", "JBdloadw", "JBaloadw",
    "JBistorew", "JBlstorew", "JBfstorew", "JBdstorew", "JBastorew", "JBiincw", "JBaload0getfield", "JBnewdup",
    "JBinvokeinterface2", "JBinvokehandle", "JBinvokehandlegeneric", "JBinvokestaticsplit", "JBinvokespecialsplit", "JBreturn0", "JBreturn1", "JBreturn2",
    "JBsyncReturn0", "JBsyncReturn1", "JBsyncReturn2", "JBreturnFromConstructor", "JBgenericReturn", "JBldc2dw",
];

pub fn opcode_name(opcode: u8) -> &'static str {
    match opcode {
        0xfe => "JBimpdep1",
        0xff => "JBimpdep2",
        _ => OPCODE_NAMES.get(opcode as usize).copied().unwrap_or("JBunknown"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operands {
    None,
    Fixed(&'static [u64]),
    TableSwitch,
    LookupSwitch,
}

pub fn operands_of(opcode: u8) -> Operands {
    match opcode {
        JB_BIPUSH | JB_LDC | JB_ILOAD | JB_LLOAD | JB_FLOAD | JB_DLOAD | JB_ALOAD | JB_ISTORE | JB_LSTORE
        | JB_FSTORE | JB_DSTORE | JB_ASTORE | JB_NEWARRAY => Operands::Fixed(&[1]),
        JB_INVOKEINTERFACE2 => Operands::Fixed(&[1, 1, 2]),
        JB_SIPUSH | JB_LDCW | JB_LDC2DW | JB_LDC2LW | JB_ILOADW..=JB_ALOADW | JB_ISTOREW..=JB_ASTOREW
        | JB_IFEQ..=JB_IFACMPNE | JB_GOTO | JB_IFNULL | JB_IFNONNULL | JB_GETSTATIC..=JB_PUTFIELD
        | JB_INVOKEVIRTUAL..=JB_INVOKEDYNAMIC | JB_INVOKEHANDLE | JB_INVOKEHANDLEGENERIC | JB_NEW | JB_NEWDUP
        | JB_ANEWARRAY | JB_CHECKCAST | JB_INSTANCEOF | JB_INVOKESTATICSPLIT | JB_INVOKESPECIALSPLIT => {
            Operands::Fixed(&[2])
        }
        JB_IINC => Operands::Fixed(&[1, 1]),
        JB_IINCW => Operands::Fixed(&[2, 2]),
        JB_MULTIANEWARRAY => Operands::Fixed(&[2, 1]),
        JB_GOTOW => Operands::Fixed(&[4]),
        JB_TABLESWITCH => Operands::TableSwitch,
        JB_LOOKUPSWITCH => Operands::LookupSwitch,
        _ => Operands::None,
    }
}

fn operand_slot(width: u64) -> (SlotType, &'static str) {
    match width {
        1 => (SlotType::U8, "bcArg8"),
        2 => (SlotType::U16, "bcArg16"),
        _ => (SlotType::U32, "bcArg32"),
    }
}

/// Size in bytes of the bytecode array, which is stored split across two fields.
pub fn bytecode_length(size_low: u16, size_high: u8) -> u64 {
    ((size_high as u64) << 16) | size_low as u64
}

pub fn rounded_bytecode_length(length: u64) -> u64 {
    (length + 3) & !3
}

struct BytecodeCursor<'r, 'o, 'e> {
    reader: &'r dyn MemoryReader,
    out: &'o mut Emitter<'e>,
    start: Address,
    end: Address,
    pc: Address,
}

impl BytecodeCursor<'_, '_, '_> {
    fn emit(&mut self, kind: SlotType, name: &str, width: u64) -> Result<(), WalkError> {
        self.out.slot(kind, self.pc, name)?;
        self.pc = self.pc + width;
        Ok(())
    }

    fn emit_u32_table(&mut self, count: u64) -> Result<(), WalkError> {
        for _ in 0..count {
            if self.pc >= self.end {
                log::warn!("switch table runs past the end of the bytecodes at {}", self.pc);
                break;
            }
            self.emit(SlotType::U32, "bcArg32", 4)?;
        }
        Ok(())
    }

    fn switch_padding(&mut self, opcode_at: Address) -> Result<(), WalkError> {
        let pad = 3 - (self.start.bytes_until(opcode_at) % 4);
        for _ in 0..pad {
            self.emit(SlotType::U8, "bcArg8", 1)?;
        }
        Ok(())
    }

    fn instruction(&mut self) -> Result<(), WalkError> {
        let opcode_at = self.pc;
        let opcode = self.reader.read_u8(opcode_at)?;
        self.emit(SlotType::U8, opcode_name(opcode), 1)?;

        match operands_of(opcode) {
            Operands::None => {}
            Operands::Fixed(widths) => {
                for &width in widths {
                    let (kind, name) = operand_slot(width);
                    self.emit(kind, name, width)?;
                }
            }
            Operands::TableSwitch => {
                self.switch_padding(opcode_at)?;
                self.emit(SlotType::U32, "bcArg32", 4)?;
                let low = self.reader.read_i32(self.pc)? as i64;
                self.emit(SlotType::U32, "bcArg32", 4)?;
                let high = self.reader.read_i32(self.pc)? as i64;
                self.emit(SlotType::U32, "bcArg32", 4)?;
                let count = (high - low + 1).max(0) as u64;
                self.emit_u32_table(count)?;
            }
            Operands::LookupSwitch => {
                self.switch_padding(opcode_at)?;
                self.emit(SlotType::U32, "bcArg32", 4)?;
                let pairs = self.reader.read_u32(self.pc)? as u64;
                self.emit(SlotType::U32, "bcArg32", 4)?;
                self.emit_u32_table(pairs * 2)?;
            }
        }
        Ok(())
    }
}

/// Emits one slot per opcode and operand of a method's bytecodes, then the
/// alignment padding and the enclosing `methodBytecodes` section.
pub fn all_slots_in_bytecodes_do(
    reader: &dyn MemoryReader,
    out: &mut Emitter<'_>,
    bytecodes: Address,
    length: u64,
) -> Result<(), WalkError> {
    if length == 0 {
        return Ok(());
    }

    let mut cursor = BytecodeCursor {
        reader,
        out,
        start: bytecodes,
        end: bytecodes + length,
        pc: bytecodes,
    };
    while cursor.pc < cursor.end {
        cursor.instruction()?;
    }

    let padding = rounded_bytecode_length(length) - length;
    for _ in 0..padding {
        cursor.emit(SlotType::U8, "bcSectionPadding", 1)?;
    }

    let walked = bytecodes.bytes_until(cursor.pc);
    cursor.out.section(bytecodes, walked, "methodBytecodes", true);
    Ok(())
}
