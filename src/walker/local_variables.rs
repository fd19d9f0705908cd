// Sun Oct 18 2026 - Alex

use crate::walker::flags::OptionalFlags;

/// Set in an entry's length when a generic signature SRP follows the
/// signature SRP.
const HAS_GENERIC: u32 = OptionalFlags::VARIABLE_TABLE_HAS_GENERIC.bits();

/// Longest encoded entry header: a tag byte and three i32 deltas.
pub const MAX_ENCODED_LEN: usize = 13;

/// Differences from the previous entry of a local variable table. The first
/// entry is relative to all zeroes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LocalVariableDelta {
    pub index: i32,
    pub start_pc: i32,
    pub length: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalVariable {
    pub index: u32,
    pub start_pc: u32,
    pub length: u32,
    pub has_generic_signature: bool,
}

fn sign_extend(value: u8, bits: u32) -> i32 {
    ((value as i32) << (32 - bits)) >> (32 - bits)
}

fn fits(value: i32, bits: u32) -> bool {
    let limit = 1i32 << (bits - 1);
    (-limit..limit).contains(&value)
}

/// Header length announced by the first byte, or `None` for a reserved tag.
///
/// ```text
/// 0ppppppp                       index +0, pc +p (7 bits), length +0
/// 10iiiiii pppppppp              index +i (6 bits), pc +p (i8), length +0
/// 110iiiii p:i16 l:i16           index +i (5 bits), pc +p, length +l
/// 11110000 i:i32 p:i32 l:i32     anything else
/// ```
pub fn encoded_len(first: u8) -> Option<usize> {
    match first {
        0x00..=0x7f => Some(1),
        0x80..=0xbf => Some(2),
        0xc0..=0xdf => Some(5),
        0xf0 => Some(MAX_ENCODED_LEN),
        _ => None,
    }
}

pub fn decode_delta(bytes: &[u8]) -> Option<LocalVariableDelta> {
    let first = *bytes.first()?;
    if bytes.len() != encoded_len(first)? {
        return None;
    }
    let i16_at = |at: usize| i16::from_le_bytes([bytes[at], bytes[at + 1]]) as i32;
    let i32_at = |at: usize| i32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);

    let delta = match bytes.len() {
        1 => LocalVariableDelta {
            start_pc: sign_extend(first & 0x7f, 7),
            ..Default::default()
        },
        2 => LocalVariableDelta {
            index: sign_extend(first & 0x3f, 6),
            start_pc: bytes[1] as i8 as i32,
            length: 0,
        },
        5 => LocalVariableDelta {
            index: sign_extend(first & 0x1f, 5),
            start_pc: i16_at(1),
            length: i16_at(3),
        },
        _ => LocalVariableDelta {
            index: i32_at(1),
            start_pc: i32_at(5),
            length: i32_at(9),
        },
    };
    Some(delta)
}

/// Appends the shortest encoding of `delta` to `buffer`.
pub fn encode_delta(delta: LocalVariableDelta, buffer: &mut Vec<u8>) {
    let LocalVariableDelta { index, start_pc, length } = delta;
    if index == 0 && length == 0 && fits(start_pc, 7) {
        buffer.push(start_pc as u8 & 0x7f);
    } else if length == 0 && fits(index, 6) && fits(start_pc, 8) {
        buffer.push(0x80 | (index as u8 & 0x3f));
        buffer.push(start_pc as i8 as u8);
    } else if fits(index, 5) && fits(start_pc, 16) && fits(length, 16) {
        buffer.push(0xc0 | (index as u8 & 0x1f));
        buffer.extend_from_slice(&(start_pc as i16).to_le_bytes());
        buffer.extend_from_slice(&(length as i16).to_le_bytes());
    } else {
        buffer.push(0xf0);
        for value in [index, start_pc, length] {
            buffer.extend_from_slice(&value.to_le_bytes());
        }
    }
}

/// Running state of a table walk. The stored length never carries the
/// generic-signature bit.
#[derive(Debug, Default)]
pub struct LocalVariableTable {
    last_index: u32,
    last_start_pc: u32,
    last_length: u32,
}

impl LocalVariableTable {
    pub fn apply(&mut self, delta: LocalVariableDelta) -> LocalVariable {
        let raw_length = self.last_length.wrapping_add(delta.length as u32);
        self.last_index = self.last_index.wrapping_add(delta.index as u32);
        self.last_start_pc = self.last_start_pc.wrapping_add(delta.start_pc as u32);
        self.last_length = raw_length & !HAS_GENERIC;
        LocalVariable {
            index: self.last_index,
            start_pc: self.last_start_pc,
            length: self.last_length,
            has_generic_signature: raw_length & HAS_GENERIC != 0,
        }
    }

    pub fn delta_to(&mut self, variable: &LocalVariable) -> LocalVariableDelta {
        let mut length = variable.length;
        if variable.has_generic_signature {
            length |= HAS_GENERIC;
        }
        let delta = LocalVariableDelta {
            index: variable.index.wrapping_sub(self.last_index) as i32,
            start_pc: variable.start_pc.wrapping_sub(self.last_start_pc) as i32,
            length: length.wrapping_sub(self.last_length) as i32,
        };
        self.last_index = variable.index;
        self.last_start_pc = variable.start_pc;
        self.last_length = variable.length;
        delta
    }
}
