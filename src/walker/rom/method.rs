// Thu Oct 15 2026 - Alex

use super::RomClassWalker;
use crate::memory::Address;
use crate::walker::bytecode::{all_slots_in_bytecodes_do, bytecode_length, rounded_bytecode_length};
use crate::walker::flags::{ExtendedMethodModifiers, MethodModifiers};
use crate::walker::local_variables::{decode_delta, encoded_len, LocalVariableTable};
use crate::walker::{add_object_as_slots, Emitter, SkipUnreadable, SlotType, WalkError};

const ROM_METHOD: &str = "J9ROMMethod";
const DEBUG_INFO: &str = "J9MethodDebugInfo";

// Verification type tags at or above this carry a u16 operand.
const VERIFICATION_TAG_WITH_OPERAND: u8 = 7;

enum FrameShape {
    Same,
    SameLocalsOneStack,
    Reserved,
    SameLocalsOneStackExtended,
    ChopOrSameExtended,
    Append(u64),
    Full,
}

fn frame_shape(frame_type: u8) -> FrameShape {
    match frame_type {
        0..=63 => FrameShape::Same,
        64..=127 => FrameShape::SameLocalsOneStack,
        128..=246 => FrameShape::Reserved,
        247 => FrameShape::SameLocalsOneStackExtended,
        248..=251 => FrameShape::ChopOrSameExtended,
        252..=254 => FrameShape::Append(frame_type as u64 - 251),
        255 => FrameShape::Full,
    }
}

impl RomClassWalker {
    pub(super) fn all_slots_in_rom_methods_section_do(&self, out: &mut Emitter<'_>) -> Result<(), WalkError> {
        let Some(count) = self.u32_field("romMethodCount").or_skip("romMethodCount")? else {
            return Ok(());
        };
        if count == 0 {
            return Ok(());
        }
        let first = match self.srp_field("romMethods").or_skip("romMethods")? {
            None => return Ok(()),
            Some(None) => return Err(WalkError::CorruptData(format!("{} methods but null romMethods", count))),
            Some(Some(first)) => first,
        };

        let mut cursor = first;
        for index in 0..count {
            // The next method starts where this one ends, so an unreadable
            // method ends the walk.
            let Some(next) = self.all_slots_in_rom_method_do(out, cursor).or_skip("method")? else {
                log::debug!("stopping the method walk at method {} of {}", index, count);
                break;
            };
            out.section(cursor, cursor.bytes_until(next), "method", true);
            cursor = next;
        }
        out.section(first, first.bytes_until(cursor), "methods", true);
        Ok(())
    }

    /// Walks one method and returns the address of the method that follows it.
    fn all_slots_in_rom_method_do(&self, out: &mut Emitter<'_>, method: Address) -> Result<Address, WalkError> {
        let cx = &self.cx;
        add_object_as_slots(cx, out, ROM_METHOD, method)?;

        let modifiers = MethodModifiers::from_bits_retain(cx.read_u32_field(ROM_METHOD, method, "modifiers")?);
        let size_low = cx.read_u16_field(ROM_METHOD, method, "bytecodeSizeLow")?;
        let size_high = self.reader().read_u8(cx.field(ROM_METHOD, method, "bytecodeSizeHigh")?)?;
        let length = bytecode_length(size_low, size_high);

        let bytecodes = method + cx.size_of(ROM_METHOD)?;
        all_slots_in_bytecodes_do(self.reader(), out, bytecodes, length)?;
        let mut cursor = bytecodes + rounded_bytecode_length(length);

        let mut extended = ExtendedMethodModifiers::empty();
        if modifiers.contains(MethodModifiers::HAS_EXTENDED_MODIFIERS) {
            extended = ExtendedMethodModifiers::from_bits_retain(self.reader().read_u32(cursor)?);
            out.slot(SlotType::U32, cursor, "extendedModifiers")?;
            cursor = cursor + 4;
        }
        if modifiers.contains(MethodModifiers::HAS_GENERIC_SIGNATURE) {
            out.slot(SlotType::RomUtf8, cursor, "methodUTF8")?;
            cursor = cursor + 4;
        }
        if modifiers.contains(MethodModifiers::HAS_EXCEPTION_INFO) {
            cursor = cursor + self.all_slots_in_exception_info_do(out, cursor)?;
        }

        let annotations = [
            (modifiers.contains(MethodModifiers::HAS_METHOD_ANNOTATIONS), "methodAnnotation"),
            (modifiers.contains(MethodModifiers::HAS_PARAMETER_ANNOTATIONS), "parameterAnnotations"),
            (extended.contains(ExtendedMethodModifiers::HAS_METHOD_TYPE_ANNOTATIONS), "method typeAnnotations"),
            (extended.contains(ExtendedMethodModifiers::HAS_CODE_TYPE_ANNOTATIONS), "code typeAnnotations"),
            (modifiers.contains(MethodModifiers::HAS_DEFAULT_ANNOTATION), "defaultAnnotation"),
        ];
        for (present, section) in annotations {
            if present {
                cursor = cursor + self.all_slots_in_annotation_do(out, cursor, section)? * 4;
            }
        }

        if modifiers.contains(MethodModifiers::HAS_DEBUG_INFO) {
            cursor = cursor + self.all_slots_in_method_debug_info_do(out, cursor)? * 4;
        }
        if modifiers.contains(MethodModifiers::HAS_STACK_MAP) {
            let size = self.reader().read_u32(cursor)? as u64;
            out.section(cursor, size, "stackMap", true);
            out.slot(SlotType::U32, cursor, "stackMapSize")?;
            self.all_slots_in_stack_map_do(out, cursor + 4)?;
            cursor = cursor + size;
        }
        if modifiers.contains(MethodModifiers::HAS_METHOD_PARAMETERS) {
            cursor = cursor + self.all_slots_in_method_parameters_data_do(out, cursor)? * 4;
        }
        Ok(cursor)
    }

    /// Returns the byte size of the exception table.
    fn all_slots_in_exception_info_do(&self, out: &mut Emitter<'_>, info: Address) -> Result<u64, WalkError> {
        let cx = &self.cx;
        let catch_count = cx.read_u16_field("J9ExceptionInfo", info, "catchCount")? as u64;
        let throw_count = cx.read_u16_field("J9ExceptionInfo", info, "throwCount")? as u64;
        out.slot(SlotType::U16, cx.field("J9ExceptionInfo", info, "catchCount")?, "catchCount")?;
        out.slot(SlotType::U16, cx.field("J9ExceptionInfo", info, "throwCount")?, "throwCount")?;

        let handler_size = cx.size_of("J9ExceptionHandler")?;
        let mut handler = info + cx.size_of("J9ExceptionInfo")?;
        for _ in 0..catch_count {
            for field in ["startPC", "endPC", "handlerPC", "exceptionClassIndex"] {
                out.slot(SlotType::U32, cx.field("J9ExceptionHandler", handler, field)?, field)?;
            }
            handler = handler + handler_size;
        }
        for index in 0..throw_count {
            out.slot(SlotType::RomUtf8, handler + index * 4, "throwNameUTF8")?;
        }

        let size = info.bytes_until(handler) + throw_count * 4;
        out.section(info, size, "exceptionInfo", true);
        Ok(size)
    }

    /// Debug info is either stored inline, tagged by the low bit of its first
    /// word, or reached through a relative pointer. Returns the u32 words it
    /// occupies inside the method.
    fn all_slots_in_method_debug_info_do(&self, out: &mut Emitter<'_>, cursor: Address) -> Result<u64, WalkError> {
        let first = self.reader().read_u32(cursor)?;
        if first & 1 == 1 {
            let size = (first & !1) as u64;
            self.all_slots_in_debug_info_body_do(out, cursor, true)?;
            out.section(cursor, size, "methodDebugInfo Inline", true);
            return Ok(size / 4);
        }

        out.slot(SlotType::Srp, cursor, "SRP to DebugInfo")?;
        out.section(cursor, 4, "methodDebugInfo out of line", true);
        if let Some(debug_info) = self.reader().read_srp(cursor)? {
            let end = self.all_slots_in_debug_info_body_do(out, debug_info, false)?;
            out.section(debug_info, debug_info.bytes_until(end.align_up(2)), "methodDebugInfo", false);
        }
        Ok(1)
    }

    /// Walks the debug info header, compressed line table and variable table.
    /// Returns the end of the line table, or of the variable table when it
    /// is stored inline.
    fn all_slots_in_debug_info_body_do(&self, out: &mut Emitter<'_>, debug_info: Address, inline: bool) -> Result<Address, WalkError> {
        let cx = &self.cx;
        let first_word = cx.field(DEBUG_INFO, debug_info, "srpToVarInfo")?;
        if inline {
            out.slot(SlotType::U32, first_word, "SizeOfDebugInfo(low tagged)")?;
        } else {
            out.slot(SlotType::Srp, first_word, "srpToVarInfo")?;
        }
        out.slot(SlotType::U32, cx.field(DEBUG_INFO, debug_info, "lineNumberCount")?, "lineNumberCount(encoded)")?;
        out.slot(SlotType::U32, cx.field(DEBUG_INFO, debug_info, "varInfoCount")?, "varInfoCount")?;

        let encoded = cx.read_u32_field(DEBUG_INFO, debug_info, "lineNumberCount")?;
        let var_count = cx.read_u32_field(DEBUG_INFO, debug_info, "varInfoCount")? as u64;

        let mut table = debug_info + cx.size_of(DEBUG_INFO)?;
        let compressed_size = if encoded & 1 == 1 {
            out.slot(SlotType::U32, table, "compressed line number size")?;
            let size = self.reader().read_u32(table)? as u64;
            table = table + 4;
            size
        } else {
            (encoded >> 16) as u64
        };
        for index in 0..compressed_size {
            out.slot(SlotType::U8, table + index, "pc, lineNumber compressed")?;
        }
        let line_end = table + compressed_size;

        if inline {
            if var_count == 0 {
                return Ok(line_end);
            }
            let size = self.all_slots_in_variable_table_do(out, line_end, var_count, true)?;
            return Ok(line_end + size);
        }
        if var_count > 0 {
            match self.reader().read_srp(first_word)? {
                Some(variables) => {
                    self.all_slots_in_variable_table_do(out, variables, var_count, false)?;
                }
                None => log::warn!("{} local variables but null srpToVarInfo at {}", var_count, first_word),
            }
        }
        Ok(line_end)
    }

    /// Walks a compressed local variable table. Each entry is a delta header
    /// followed by name and signature SRPs, plus a generic signature SRP when
    /// the decoded length carries the generic bit. Returns the bytes consumed.
    fn all_slots_in_variable_table_do(&self, out: &mut Emitter<'_>, table: Address, count: u64, inline: bool) -> Result<u64, WalkError> {
        let mut state = LocalVariableTable::default();
        let mut cursor = table;
        for index in 0..count {
            let first = self.reader().read_u8(cursor)?;
            let Some(width) = encoded_len(first) else {
                log::warn!("bad local variable entry {} of {} at {} (tag {:#04x})", index, count, cursor, first);
                break;
            };
            let Some(delta) = decode_delta(&self.reader().read_bytes(cursor, width)?) else {
                break;
            };
            let width = width as u64;
            for offset in 0..width {
                out.slot(SlotType::U8, cursor + offset, "variableInfo compressed")?;
            }
            let variable = state.apply(delta);
            cursor = cursor + width;

            out.slot(SlotType::RomUtf8, cursor, "name")?;
            out.slot(SlotType::RomUtf8, cursor + 4, "signature")?;
            cursor = cursor + 8;
            if variable.has_generic_signature {
                out.slot(SlotType::RomUtf8, cursor, "genericSignature")?;
                cursor = cursor + 4;
            }
            log::trace!("local {} slot {} pc {}+{}", index, variable.index, variable.start_pc, variable.length);
        }

        let size = table.bytes_until(cursor);
        let name = if inline { "variableInfo Inline" } else { "variableInfo" };
        out.section(table, size, name, inline);
        Ok(size)
    }

    fn all_slots_in_stack_map_do(&self, out: &mut Emitter<'_>, stack_map: Address) -> Result<(), WalkError> {
        out.slot(SlotType::U16, stack_map, "stackMapFrameCount")?;
        let frame_count = self.reader().read_u16_be(stack_map)?;
        let mut cursor = stack_map + 2;

        for _ in 0..frame_count {
            let frame_type = self.reader().read_u8(cursor)?;
            out.slot(SlotType::U8, cursor, "stackMapFrameType")?;
            cursor = cursor + 1;

            match frame_shape(frame_type) {
                FrameShape::Same => {}
                FrameShape::SameLocalsOneStack => {
                    cursor = cursor + self.all_slots_in_verification_type_info_do(out, cursor)?;
                }
                FrameShape::Reserved => {
                    log::debug!("reserved stack map frame type {} at {}", frame_type, cursor);
                }
                FrameShape::SameLocalsOneStackExtended => {
                    out.slot(SlotType::U16, cursor, "stackMapFrameOffset")?;
                    cursor = cursor + 2;
                    cursor = cursor + self.all_slots_in_verification_type_info_do(out, cursor)?;
                }
                FrameShape::ChopOrSameExtended => {
                    out.slot(SlotType::U16, cursor, "stackMapFrameOffset")?;
                    cursor = cursor + 2;
                }
                FrameShape::Append(locals) => {
                    out.slot(SlotType::U16, cursor, "stackMapFrameOffset")?;
                    cursor = cursor + 2;
                    for _ in 0..locals {
                        cursor = cursor + self.all_slots_in_verification_type_info_do(out, cursor)?;
                    }
                }
                FrameShape::Full => {
                    out.slot(SlotType::U16, cursor, "stackMapFrameOffset")?;
                    cursor = cursor + 2;
                    for name in ["locals_count", "stack_items_count"] {
                        let count = self.reader().read_u16_be(cursor)?;
                        out.slot(SlotType::U16, cursor, name)?;
                        cursor = cursor + 2;
                        for _ in 0..count {
                            cursor = cursor + self.all_slots_in_verification_type_info_do(out, cursor)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn all_slots_in_verification_type_info_do(&self, out: &mut Emitter<'_>, cursor: Address) -> Result<u64, WalkError> {
        let tag = self.reader().read_u8(cursor)?;
        out.slot(SlotType::U8, cursor, "typeInfoTag")?;
        if tag < VERIFICATION_TAG_WITH_OPERAND {
            return Ok(1);
        }
        out.slot(SlotType::U16, cursor + 1, "typeInfoU16")?;
        Ok(3)
    }

    /// Returns the u32 words occupied by the parameter table and its padding.
    fn all_slots_in_method_parameters_data_do(&self, out: &mut Emitter<'_>, data: Address) -> Result<u64, WalkError> {
        let cx = &self.cx;
        let count = self.reader().read_u8(cx.field("J9MethodParametersData", data, "parameterCount")?)? as u64;
        out.slot(SlotType::U8, data, "parameterCount")?;

        let parameter_size = cx.size_of("J9MethodParameter")?;
        let mut parameter = data + cx.size_of("J9MethodParametersData")?;
        for _ in 0..count {
            out.slot(SlotType::RomUtf8, cx.field("J9MethodParameter", parameter, "name")?, "methodParameterName")?;
            out.slot(SlotType::U16, cx.field("J9MethodParameter", parameter, "flags")?, "methodParameterFlag")?;
            parameter = parameter + parameter_size;
        }

        let size = data.bytes_until(parameter);
        let padding = (4 - size % 4) % 4;
        for index in 0..padding {
            out.slot(SlotType::U8, parameter + index, "MethodParameters padding")?;
        }
        out.section(data, size + padding, "Method Parameters", true);
        Ok((size + padding) / 4)
    }
}
