// Fri Oct 16 2026 - Alex

use super::RomClassWalker;
use crate::memory::Address;
use crate::walker::flags::{OptionalFlags, RecordComponentFlags};
use crate::walker::{Emitter, SkipUnreadable, SlotType, WalkError};

const RECORD_COMPONENT: &str = "J9ROMRecordComponentShape";

impl RomClassWalker {
    /// The optional info block holds one word per present optional flag, in
    /// `OPTIONAL_INFO_WORDS` order. Some words point at further out-of-line
    /// structures.
    pub(super) fn all_slots_in_optional_info_do(&self, out: &mut Emitter<'_>) -> Result<(), WalkError> {
        let Some(flags) = self.u32_field("optionalFlags").or_skip("optionalFlags")? else {
            return Ok(());
        };
        let flags = OptionalFlags::from_bits_retain(flags);
        let Some(info) = self.srp_field("optionalInfo")? else {
            return Ok(());
        };
        let mut cursor = info;

        if flags.contains(OptionalFlags::SOURCE_FILE_NAME) {
            out.slot(SlotType::RomUtf8, cursor, "optionalFileNameUTF8")?;
            cursor = cursor + 4;
        }
        if flags.contains(OptionalFlags::GENERIC_SIGNATURE) {
            out.slot(SlotType::RomUtf8, cursor, "optionalGenSigUTF8")?;
            cursor = cursor + 4;
        }
        if flags.contains(OptionalFlags::SOURCE_DEBUG_EXTENSION) {
            out.slot(SlotType::Srp, cursor, "optionalSourceDebugExtSRP")?;
            if let Some(extension) = self.optional_target(cursor, "source debug extension")? {
                self.all_slots_in_source_debug_extension_do(out, extension).or_skip("source debug extension")?;
            }
            cursor = cursor + 4;
        }
        if flags.contains(OptionalFlags::ENCLOSING_METHOD) {
            out.slot(SlotType::Srp, cursor, "optionalEnclosingMethodSRP")?;
            if let Some(enclosing) = self.optional_target(cursor, "enclosing method")? {
                self.all_slots_in_enclosing_object_do(out, enclosing).or_skip("enclosing method")?;
            }
            cursor = cursor + 4;
        }
        if flags.contains(OptionalFlags::SIMPLE_NAME) {
            out.slot(SlotType::RomUtf8, cursor, "optionalSimpleNameUTF8")?;
            cursor = cursor + 4;
        }
        if flags.contains(OptionalFlags::VERIFY_EXCLUDE) {
            out.slot(SlotType::U32, cursor, "optionalVerifyExclude")?;
            cursor = cursor + 4;
        }
        for (flag, srp_name, section) in [
            (OptionalFlags::CLASS_ANNOTATION_INFO, "classAnnotationsSRP", "classAnnotations"),
            (OptionalFlags::TYPE_ANNOTATION_INFO, "classTypeAnnotationsSRP", "classTypeAnnotations"),
        ] {
            if flags.contains(flag) {
                out.slot(SlotType::Srp, cursor, srp_name)?;
                if let Some(annotation) = self.optional_target(cursor, section)? {
                    self.all_slots_in_annotation_do(out, annotation, section).or_skip(section)?;
                }
                cursor = cursor + 4;
            }
        }
        if flags.contains(OptionalFlags::RECORD_ATTRIBUTE) {
            out.slot(SlotType::Srp, cursor, "recordSRP")?;
            if let Some(record) = self.optional_target(cursor, "record")? {
                self.all_slots_in_record_do(out, record).or_skip("record components")?;
            }
            cursor = cursor + 4;
        }
        if flags.contains(OptionalFlags::PERMITTED_SUBCLASSES_ATTRIBUTE) {
            out.slot(SlotType::Srp, cursor, "permittedSubclassesAttributeSRP")?;
            if let Some(permitted) = self.optional_target(cursor, "permitted subclasses")? {
                self.all_slots_in_permitted_subclasses_do(out, permitted).or_skip("permitted subclasses")?;
            }
            cursor = cursor + 4;
        }
        if flags.contains(OptionalFlags::INJECTED_INTERFACE_INFO) {
            out.slot(SlotType::Srp, cursor, "optionalInjectedInterfaces")?;
            cursor = cursor + 4;
        }
        if flags.contains(OptionalFlags::PRELOAD_ATTRIBUTE) {
            out.slot(SlotType::Srp, cursor, "loadableDescriptorsAttributeSRP")?;
            if let Some(descriptors) = self.optional_target(cursor, "loadable descriptors")? {
                self.all_slots_in_loadable_descriptors_do(out, descriptors).or_skip("loadable descriptors")?;
            }
            cursor = cursor + 4;
        }
        if flags.contains(OptionalFlags::IMPLICIT_CREATION_ATTRIBUTE) {
            out.slot(SlotType::Srp, cursor, "implicitCreationAttributeSRP")?;
            if let Some(implicit) = self.optional_target(cursor, "implicit creation")? {
                out.slot(SlotType::U32, implicit, "implicitCreationFlags")?;
                out.section(implicit, 4, "implicitCreationAttribute", true);
            }
            cursor = cursor + 4;
        }

        out.section(info, info.bytes_until(cursor), "optionalInfo", true);
        Ok(())
    }

    /// Target of an optional info word, or `None` when the word is null or
    /// unreadable.
    fn optional_target(&self, word: Address, what: &str) -> Result<Option<Address>, WalkError> {
        Ok(self.reader().read_srp(word).or_skip(what)?.flatten())
    }

    fn all_slots_in_source_debug_extension_do(&self, out: &mut Emitter<'_>, extension: Address) -> Result<(), WalkError> {
        let size = self.cx.read_u32_field("J9SourceDebugExtension", extension, "size")? as u64;
        out.slot(SlotType::U32, extension, "optionalSourceDebugExtSize")?;

        let data = extension + self.cx.size_of("J9SourceDebugExtension")?;
        for index in 0..size {
            out.slot(SlotType::U8, data + index, "optionalSourceDebugExtData")?;
        }
        let padding = (4 - size % 4) % 4;
        for index in 0..padding {
            out.slot(SlotType::U8, data + size + index, "optionalSourceDebugExtPadding")?;
        }
        out.section(extension, extension.bytes_until(data) + size + padding, "optionalSourceDebugExt", true);
        Ok(())
    }

    fn all_slots_in_enclosing_object_do(&self, out: &mut Emitter<'_>, enclosing: Address) -> Result<(), WalkError> {
        let cx = &self.cx;
        out.slot(SlotType::U32, cx.field("J9EnclosingObject", enclosing, "classRefCPIndex")?, "classRefCPIndex")?;
        out.slot(SlotType::SrpNas, cx.field("J9EnclosingObject", enclosing, "nameAndSignature")?, "nameAndSignature")?;
        out.section(enclosing, cx.size_of("J9EnclosingObject")?, "enclosingObject", true);
        Ok(())
    }

    fn all_slots_in_record_do(&self, out: &mut Emitter<'_>, record: Address) -> Result<(), WalkError> {
        let cx = &self.cx;
        let count = self.reader().read_u32(record)?;
        out.slot(SlotType::U32, record, "recordComponentCount")?;

        let shape_size = cx.size_of(RECORD_COMPONENT)?;
        let mut component = record + 4;
        for _ in 0..count {
            out.slot(SlotType::RomUtf8, cx.field(RECORD_COMPONENT, component, "name")?, "recordComponentName")?;
            out.slot(SlotType::RomUtf8, cx.field(RECORD_COMPONENT, component, "signature")?, "recordComponentSignature")?;
            out.slot(SlotType::U32, cx.field(RECORD_COMPONENT, component, "attributeFlags")?, "recordComponentAttributeFlags")?;
            let flags = RecordComponentFlags::from_bits_retain(cx.read_u32_field(RECORD_COMPONENT, component, "attributeFlags")?);

            let mut cursor = component + shape_size;
            if flags.contains(RecordComponentFlags::HAS_GENERIC_SIGNATURE) {
                out.slot(SlotType::RomUtf8, cursor, "recordComponentGenericSignature")?;
                cursor = cursor + 4;
            }
            if flags.contains(RecordComponentFlags::HAS_ANNOTATIONS) {
                cursor = cursor + self.all_slots_in_annotation_do(out, cursor, "recordComponentAnnotations")? * 4;
            }
            if flags.contains(RecordComponentFlags::HAS_TYPE_ANNOTATIONS) {
                cursor = cursor + self.all_slots_in_annotation_do(out, cursor, "recordComponentTypeAnnotations")? * 4;
            }
            out.section(component, component.bytes_until(cursor), "recordComponentShape", true);
            component = cursor;
        }

        out.section(record, record.bytes_until(component), "recordComponent", true);
        Ok(())
    }

    fn all_slots_in_permitted_subclasses_do(&self, out: &mut Emitter<'_>, permitted: Address) -> Result<(), WalkError> {
        let count = self.reader().read_u32(permitted)? as u64;
        out.slot(SlotType::U32, permitted, "numberPermittedSubclasses")?;
        for index in 0..count {
            out.slot(SlotType::RomUtf8, permitted + 4 + index * 4, "permittedSubclassesNameUTF8")?;
        }
        out.section(permitted, 4 + count * 4, "permittedSubclass", true);
        Ok(())
    }

    fn all_slots_in_loadable_descriptors_do(&self, out: &mut Emitter<'_>, descriptors: Address) -> Result<(), WalkError> {
        let count = self.reader().read_u32(descriptors)? as u64;
        out.slot(SlotType::U32, descriptors, "numberLoadableDescriptors")?;
        for index in 0..count {
            out.slot(SlotType::RomUtf8, descriptors + 4 + index * 4, "loadableDescriptorName")?;
        }
        out.section(descriptors, 4 + count * 4, "loadableDescriptorsAttribute", true);
        Ok(())
    }
}
