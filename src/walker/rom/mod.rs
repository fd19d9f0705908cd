// Thu Oct 15 2026 - Alex

mod method;
mod optional;

use crate::memory::Address;
use crate::walker::constant_pool::CpType;
use crate::walker::flags::{ClassModifiers, FieldModifiers};
use crate::walker::{
    add_object_as_slots, ClassOwner, ClassWalkCallbacks, Emitter, SkipUnreadable, SlotType, WalkContext, WalkError,
};

pub(crate) const ROM_CLASS: &str = "J9ROMClass";
pub(crate) const ROM_ARRAY_CLASS: &str = "J9ROMArrayClass";

// (count field, srp field, section name, slot name)
const SRP_BLOCKS: [(&str, &str, &str, &str); 3] = [
    ("interfaceCount", "interfaces", "interfacesSRPs", "interfaceUTF8"),
    ("innerClassCount", "innerClasses", "innerClassesSRPs", "innerClassNameUTF8"),
    (
        "enclosedInnerClassCount",
        "enclosedInnerClasses",
        "enclosedInnerClassesSRPs",
        "enclosedInnerClassesNameUTF8",
    ),
];

/// Walks a ROM class: the immutable, self-relative class image produced by the
/// class loader.
pub struct RomClassWalker {
    cx: WalkContext,
    address: Address,
}

impl RomClassWalker {
    pub fn new(cx: WalkContext, address: Address) -> Self {
        Self { cx, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn context(&self) -> &WalkContext {
        &self.cx
    }

    pub fn owner(&self) -> Result<ClassOwner, WalkError> {
        let rom_size = self.u32_field("romSize")?;
        let blob_length = self
            .u32_field("intermediateClassDataLength")
            .or_skip("intermediate class data length")?
            .unwrap_or(0);
        Ok(ClassOwner::rom(self.address, rom_size as u64, blob_length as u64))
    }

    pub fn class_name(&self) -> Result<String, WalkError> {
        self.cx.read_utf8_at_srp(ROM_CLASS, self.address, "className")
    }

    pub fn is_array(&self) -> Result<bool, WalkError> {
        let modifiers = ClassModifiers::from_bits_retain(self.u32_field("modifiers")?);
        Ok(modifiers.contains(ClassModifiers::ARRAY))
    }

    pub fn all_slots_in_object_do(&self, callbacks: &mut dyn ClassWalkCallbacks) -> Result<(), WalkError> {
        let owner = self.owner()?;
        let mut out = Emitter::new(&owner, callbacks);
        log::debug!("walking ROM class at {} ({} bytes)", self.address, owner.length().unwrap_or(0));

        // An unreadable count or table ends only the part that needs it; the
        // bytes it would have covered become padding.
        if !self.all_slots_in_rom_header_do(&mut out)? {
            return Ok(());
        }
        self.all_slots_in_constant_pool_do(&mut out).or_skip("constant pool")?;
        self.all_slots_in_rom_methods_section_do(&mut out).or_skip("methods")?;
        self.all_slots_in_rom_fields_section_do(&mut out).or_skip("fields")?;
        self.all_slots_in_cp_shape_description_do(&mut out).or_skip("constant pool shape")?;
        self.all_slots_in_optional_info_do(&mut out).or_skip("optional info")?;
        self.all_slots_in_intermediate_class_data_do(&mut out).or_skip("intermediate class data")?;
        self.all_slots_in_var_handle_method_type_lookup_table_do(&mut out)
            .or_skip("var handle method types")?;
        for (count_field, table_field) in [
            ("staticSplitMethodRefCount", "staticSplitMethodRefIndexes"),
            ("specialSplitMethodRefCount", "specialSplitMethodRefIndexes"),
        ] {
            self.all_slots_in_split_method_ref_indexes_do(&mut out, count_field, table_field, table_field)
                .or_skip(table_field)?;
        }
        Ok(())
    }

    fn u32_field(&self, field: &str) -> Result<u32, WalkError> {
        self.cx.read_u32_field(ROM_CLASS, self.address, field)
    }

    fn srp_field(&self, field: &str) -> Result<Option<Address>, WalkError> {
        self.cx.read_srp_field(ROM_CLASS, self.address, field)
    }

    fn reader(&self) -> &dyn crate::memory::MemoryReader {
        self.cx.reader()
    }

    /// Header slots plus the SRP blocks that follow the constant pool. Returns
    /// false for array classes, which carry nothing past their header.
    fn all_slots_in_rom_header_do(&self, out: &mut Emitter<'_>) -> Result<bool, WalkError> {
        let is_array = match self.is_array().or_skip("class modifiers")? {
            Some(is_array) => is_array,
            None => {
                log::debug!("modifiers of {} unreadable, walking it as a non-array class", self.address);
                false
            }
        };
        let header = if is_array { ROM_ARRAY_CLASS } else { ROM_CLASS };
        out.section(self.address, self.cx.size_of(header)?, "romHeader", true);
        add_object_as_slots(&self.cx, out, header, self.address)?;
        if is_array {
            return Ok(false);
        }

        let mut cursor = None;
        for (count_field, srp_field, section, slot) in SRP_BLOCKS {
            if !self.cx.catalog().has_field(ROM_CLASS, count_field) {
                log::debug!("{}.{} not present, skipping {}", ROM_CLASS, count_field, section);
                continue;
            }
            let Some(count) = self.u32_field(count_field).or_skip(count_field)? else {
                continue;
            };
            let count = count as u64;
            let Some(start) = self.srp_field(srp_field).or_skip(srp_field)? else {
                continue;
            };
            let Some(start) = start else {
                if count > 0 {
                    return Err(WalkError::CorruptData(format!("{} entries but null {}", count, srp_field)));
                }
                continue;
            };
            out.section(start, count * 4, section, true);
            for index in 0..count {
                out.slot(SlotType::RomUtf8, start + index * 4, slot)?;
            }
            cursor = Some(start + count * 4);
        }

        // The name-and-signature pairs are reached through the constant pool,
        // so the block itself only gets a section.
        let first_method = self.srp_field("romMethods").or_skip("romMethods")?.flatten();
        if let (Some(cursor), Some(first_method)) = (cursor, first_method) {
            out.section(cursor, cursor.bytes_until(first_method), "cpNamesAndSignaturesSRPs", true);
        }
        Ok(true)
    }

    fn all_slots_in_constant_pool_do(&self, out: &mut Emitter<'_>) -> Result<(), WalkError> {
        let Some(shape) = self.srp_field("cpShapeDescription")? else {
            return Ok(());
        };
        let count = self.u32_field("romConstantPoolCount")? as u64;
        let item_size = self.cx.size_of("J9ROMConstantPoolItem")?;
        let pool = self.address + self.cx.size_of(ROM_CLASS)?;
        let encoding = self.cx.shape_encoding();
        out.section(pool, count * item_size, "constantPool", true);

        for index in 0..count {
            let entry = pool + index * item_size;
            let code = encoding.type_code(self.reader(), shape, index)?;
            let cp_type = CpType::from_code(code).ok_or_else(|| {
                WalkError::CorruptData(format!("constant pool entry {} has unknown type {}", index, code))
            })?;
            self.all_slots_in_cp_entry_do(out, entry, cp_type)?;
        }
        Ok(())
    }

    fn all_slots_in_cp_entry_do(&self, out: &mut Emitter<'_>, entry: Address, cp_type: CpType) -> Result<(), WalkError> {
        let cx = &self.cx;
        match cp_type {
            CpType::Unused | CpType::Unused8 => {
                out.slot(SlotType::I64, cx.field("J9ROMConstantPoolItem", entry, "slot1")?, "cpFieldUnused")?;
            }
            CpType::Class | CpType::String | CpType::AnnotationUtf8 => {
                out.slot(SlotType::RomUtf8, cx.field("J9ROMStringRef", entry, "utf8Data")?, "cpFieldUtf8")?;
                out.slot(SlotType::U32, cx.field("J9ROMStringRef", entry, "cpType")?, "cpFieldType")?;
            }
            CpType::Int | CpType::Float => {
                out.slot(SlotType::U32, cx.field("J9ROMSingleSlotConstantRef", entry, "data")?, "cpFieldInt")?;
                out.slot(SlotType::U32, cx.field("J9ROMSingleSlotConstantRef", entry, "cpType")?, "cpFieldType")?;
            }
            CpType::Long | CpType::Double => {
                out.slot(SlotType::I64, cx.field("J9ROMConstantRef", entry, "slot1")?, "cpField8")?;
            }
            CpType::Field
            | CpType::InstanceMethod
            | CpType::HandleMethod
            | CpType::StaticMethod
            | CpType::InterfaceMethod
            | CpType::InterfaceStaticMethod
            | CpType::InterfaceInstanceMethod => {
                out.slot(SlotType::SrpNas, cx.field("J9ROMFieldRef", entry, "nameAndSignature")?, "cpFieldNAS")?;
                out.slot(SlotType::U32, cx.field("J9ROMFieldRef", entry, "classRefCPIndex")?, "cpFieldClassRef")?;
            }
            CpType::MethodType => {
                out.slot(SlotType::RomUtf8, cx.field("J9ROMMethodTypeRef", entry, "signature")?, "methodTypeSignature")?;
                out.slot(SlotType::U32, cx.field("J9ROMMethodTypeRef", entry, "cpType")?, "cpFieldType")?;
            }
            CpType::MethodHandle => {
                let structure = "J9ROMMethodHandleRef";
                out.slot(SlotType::U32, cx.field(structure, entry, "methodOrFieldRefIndex")?, "methodOrFieldRefIndex")?;
                out.slot(SlotType::U32, cx.field(structure, entry, "handleTypeAndCpType")?, "handleTypeAndCpType")?;
            }
            CpType::ConstantDynamic => {
                let structure = "J9ROMConstantDynamicRef";
                out.slot(SlotType::SrpNas, cx.field(structure, entry, "nameAndSignature")?, "constantDynamicNAS")?;
                out.slot(SlotType::U32, cx.field(structure, entry, "bsmIndexAndCpType")?, "bsmIndexAndCpType")?;
            }
        }
        Ok(())
    }

    fn all_slots_in_rom_fields_section_do(&self, out: &mut Emitter<'_>) -> Result<(), WalkError> {
        let Some(count) = self.u32_field("romFieldCount").or_skip("romFieldCount")? else {
            return Ok(());
        };
        let Some(first) = self.srp_field("romFields")? else {
            return Ok(());
        };
        let mut cursor = first;
        for index in 0..count {
            // Fields are variable length; an unreadable one hides the rest.
            let Some(length) = self.all_slots_in_rom_field_do(out, cursor).or_skip("field shape")? else {
                log::debug!("stopping the field walk at field {} of {}", index, count);
                break;
            };
            cursor = cursor + length;
        }
        out.section(first, first.bytes_until(cursor), "fields", true);
        Ok(())
    }

    fn all_slots_in_rom_field_do(&self, out: &mut Emitter<'_>, field: Address) -> Result<u64, WalkError> {
        const SHAPE: &str = "J9ROMFieldShape";
        out.slot(SlotType::RomUtf8, self.cx.field(SHAPE, field, "name")?, "name")?;
        out.slot(SlotType::RomUtf8, self.cx.field(SHAPE, field, "signature")?, "signature")?;
        out.slot(SlotType::U32, self.cx.field(SHAPE, field, "modifiers")?, "modifiers")?;

        let modifiers = FieldModifiers::from_bits_retain(self.cx.read_u32_field(SHAPE, field, "modifiers")?);
        let mut cursor = field + self.cx.size_of(SHAPE)?;

        if modifiers.contains(FieldModifiers::CONSTANT) {
            if modifiers.contains(FieldModifiers::SIZE_DOUBLE) {
                out.slot(SlotType::I64, cursor, "fieldInitialValue")?;
                cursor = cursor + 8;
            } else {
                out.slot(SlotType::I32, cursor, "fieldInitialValue")?;
                cursor = cursor + 4;
            }
        }
        if modifiers.contains(FieldModifiers::HAS_GENERIC_SIGNATURE) {
            out.slot(SlotType::RomUtf8, cursor, "fieldGenSigUTF8")?;
            cursor = cursor + 4;
        }
        if modifiers.contains(FieldModifiers::HAS_ANNOTATIONS) {
            cursor = cursor + self.all_slots_in_annotation_do(out, cursor, "fieldAnnotation")? * 4;
        }

        let length = field.bytes_until(cursor);
        out.section(field, length, "field", true);
        Ok(length)
    }

    fn all_slots_in_cp_shape_description_do(&self, out: &mut Emitter<'_>) -> Result<(), WalkError> {
        let Some(shape) = self.srp_field("cpShapeDescription")? else {
            return Ok(());
        };
        let words = self.cx.shape_encoding().words(self.u32_field("romConstantPoolCount")? as u64);
        out.section(shape, words * 4, "cpShapeDescription", true);
        for index in 0..words {
            out.slot(SlotType::U32, shape + index * 4, "cpShapeDescriptionU32")?;
        }
        Ok(())
    }

    /// Length-prefixed annotation blob padded to 4 bytes. Returns its size in u32 words.
    fn all_slots_in_annotation_do(&self, out: &mut Emitter<'_>, annotation: Address, section: &str) -> Result<u64, WalkError> {
        let length = self.reader().read_u32(annotation)? as u64;
        let padding = (4 - length % 4) % 4;
        out.slot(SlotType::U32, annotation, "annotation length")?;

        let data = annotation + 4;
        for index in 0..length {
            out.slot(SlotType::U8, data + index, "annotation data")?;
        }
        for index in 0..padding {
            out.slot(SlotType::U8, data + length + index, "annotation padding")?;
        }

        let words = 1 + (length + padding) / 4;
        out.section(annotation, words * 4, section, true);
        Ok(words)
    }

    fn all_slots_in_intermediate_class_data_do(&self, out: &mut Emitter<'_>) -> Result<(), WalkError> {
        let length = self.u32_field("intermediateClassDataLength")? as u64;
        if length == 0 {
            return Ok(());
        }
        let Some(data) = self.cx.read_wsrp_field(ROM_CLASS, self.address, "intermediateClassData")? else {
            return Ok(());
        };
        if !out.owner().contains(data, length) {
            log::debug!("intermediate class data at {} lies outside the ROM class", data);
            return Ok(());
        }
        let command = format!("!j9x 0x{:x},0x{:x}", data, length);
        out.slot_with_info(SlotType::IntermediateClassData, data, "intermediateClassData", Some(&command))?;
        out.section(data, length, "intermediateClassDataSection", true);
        Ok(())
    }

    fn all_slots_in_var_handle_method_type_lookup_table_do(&self, out: &mut Emitter<'_>) -> Result<(), WalkError> {
        let count = self.u32_field("varHandleMethodTypeCount")? as u64;
        if count == 0 {
            return Ok(());
        }
        let Some(table) = self.srp_field("varHandleMethodTypeLookupTable")? else {
            return Ok(());
        };
        out.section(table, count * 2, "varHandleMethodTypeLookupTable", true);
        for index in 0..count {
            out.slot(SlotType::U16, table + index * 2, "cpIndex")?;
        }
        Ok(())
    }

    fn all_slots_in_split_method_ref_indexes_do(
        &self,
        out: &mut Emitter<'_>,
        count_field: &str,
        table_field: &str,
        section: &str,
    ) -> Result<(), WalkError> {
        let count = self.cx.read_u16_field(ROM_CLASS, self.address, count_field)? as u64;
        if count == 0 {
            return Ok(());
        }
        let Some(table) = self.srp_field(table_field)? else {
            return Ok(());
        };
        out.section(table, count * 2, section, true);
        for index in 0..count {
            out.slot(SlotType::U16, table + index * 2, "cpIndex")?;
        }
        Ok(())
    }
}
