// Fri Oct 16 2026 - Alex

use crate::memory::{Address, MemoryReader};
use crate::walker::constant_pool::CpType;
use crate::walker::flags::ClassModifiers;
use crate::walker::{
    add_object_as_slots, ClassOwner, ClassWalkCallbacks, Emitter, SkipUnreadable, SlotType, WalkContext, WalkError,
};

const RAM_CLASS: &str = "J9Class";
const ROM_CLASS: &str = "J9ROMClass";
const ITABLE: &str = "J9ITable";
const CLASS_DEPTH_MASK: u64 = 0xFFFF;
const MAX_ITABLE_CHAIN: usize = 4096;

fn ram_cp_structure(cp_type: CpType) -> &'static str {
    match cp_type {
        CpType::Class => "J9RAMClassRef",
        CpType::String | CpType::AnnotationUtf8 => "J9RAMStringRef",
        CpType::Int | CpType::Float | CpType::Long | CpType::Double => "J9RAMConstantRef",
        CpType::Field => "J9RAMFieldRef",
        CpType::StaticMethod | CpType::InterfaceStaticMethod => "J9RAMStaticMethodRef",
        CpType::InstanceMethod => "J9RAMVirtualMethodRef",
        CpType::HandleMethod | CpType::InterfaceInstanceMethod => "J9RAMSpecialMethodRef",
        CpType::InterfaceMethod => "J9RAMInterfaceMethodRef",
        CpType::MethodType => "J9RAMMethodTypeRef",
        CpType::MethodHandle => "J9RAMMethodHandleRef",
        CpType::ConstantDynamic => "J9RAMConstantDynamicRef",
        CpType::Unused | CpType::Unused8 => "J9RAMConstantPoolItem",
    }
}

/// Walks a RAM class: the runtime class structure and the tables hanging off
/// it. Most of these tables live in separate allocations, so RAM classes carry
/// no declared size.
pub struct RamClassWalker {
    cx: WalkContext,
    address: Address,
}

impl RamClassWalker {
    pub fn new(cx: WalkContext, address: Address) -> Self {
        Self { cx, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Result<ClassOwner, WalkError> {
        Ok(ClassOwner::ram(self.address))
    }

    pub fn rom_class(&self) -> Result<Address, WalkError> {
        let rom_class = self.cx.read_ptr_field(RAM_CLASS, self.address, "romClass")?;
        if rom_class.is_null() {
            return Err(WalkError::CorruptData(format!("J9Class at {} has no ROM class", self.address)));
        }
        Ok(rom_class)
    }

    pub fn class_name(&self) -> Result<String, WalkError> {
        self.cx.read_utf8_at_srp(ROM_CLASS, self.rom_class()?, "className")
    }

    pub fn all_slots_in_object_do(&self, callbacks: &mut dyn ClassWalkCallbacks) -> Result<(), WalkError> {
        let owner = self.owner()?;
        let mut out = Emitter::new(&owner, callbacks);
        let rom_class = self.rom_class()?;
        log::debug!("walking RAM class at {} (ROM class {})", self.address, rom_class);

        // An unreadable table drops only that table.
        self.all_slots_in_ram_header_do(&mut out).or_skip("RAM class header")?;
        self.all_slots_in_superclasses_do(&mut out).or_skip("superclasses")?;
        self.all_slots_in_vtable_do(&mut out).or_skip("vTable")?;
        self.all_slots_in_ram_methods_do(&mut out, rom_class).or_skip("RAM methods")?;
        self.all_slots_in_ram_statics_do(&mut out, rom_class).or_skip("statics")?;
        self.all_slots_in_constant_pool_do(&mut out, rom_class).or_skip("RAM constant pool")?;
        let object_tables = [
            ("callSites", "callSiteCount", "callSite"),
            ("methodTypes", "methodTypeCount", "methodType"),
            ("varHandleMethodTypes", "varHandleMethodTypeCount", "varHandleMethodType"),
        ];
        for (table, count, slot) in object_tables {
            self.all_slots_in_object_table_do(&mut out, rom_class, table, count, slot).or_skip(table)?;
        }
        for (table, count) in [
            ("staticSplitMethodTable", "staticSplitMethodRefCount"),
            ("specialSplitMethodTable", "specialSplitMethodRefCount"),
        ] {
            self.all_slots_in_split_table_do(&mut out, rom_class, table, count).or_skip(table)?;
        }
        self.all_slots_in_itable_do(&mut out, rom_class).or_skip("iTable")?;
        Ok(())
    }

    fn reader(&self) -> &dyn MemoryReader {
        self.cx.reader()
    }

    fn rom_u32(&self, rom_class: Address, field: &str) -> Result<u64, WalkError> {
        Ok(self.cx.read_u32_field(ROM_CLASS, rom_class, field)? as u64)
    }

    fn class_depth(&self, class: Address) -> Result<u64, WalkError> {
        Ok(self.cx.read_udata_field(RAM_CLASS, class, "classDepthAndFlags")? & CLASS_DEPTH_MASK)
    }

    fn all_slots_in_ram_header_do(&self, out: &mut Emitter<'_>) -> Result<(), WalkError> {
        out.section(self.address, self.cx.size_of(RAM_CLASS)?, "ramHeader", true);
        add_object_as_slots(&self.cx, out, RAM_CLASS, self.address)
    }

    fn all_slots_in_superclasses_do(&self, out: &mut Emitter<'_>) -> Result<(), WalkError> {
        let depth = self.class_depth(self.address)?;
        let superclasses = self.cx.read_ptr_field(RAM_CLASS, self.address, "superclasses")?;
        if depth == 0 || superclasses.is_null() {
            return Ok(());
        }
        let word = self.cx.pointer_size();
        out.section(superclasses, depth * word, "superclasses", true);
        for index in 0..depth {
            out.slot_with_info(SlotType::Udata, superclasses + index * word, "superclass", Some("!j9class"))?;
        }
        Ok(())
    }

    fn all_slots_in_vtable_do(&self, out: &mut Emitter<'_>) -> Result<(), WalkError> {
        let header = self.address + self.cx.size_of(RAM_CLASS)?;
        let size = self.cx.read_udata_field("J9VTableHeader", header, "size")?;
        add_object_as_slots(&self.cx, out, "J9VTableHeader", header)?;

        let word = self.cx.pointer_size();
        let entries = header + self.cx.size_of("J9VTableHeader")?;
        for index in 0..size {
            out.slot_with_info(SlotType::Udata, entries + index * word, "vTableMethod", Some("!j9method"))?;
        }
        out.section(header, header.bytes_until(entries) + size * word, "vTable", true);
        Ok(())
    }

    fn all_slots_in_ram_methods_do(&self, out: &mut Emitter<'_>, rom_class: Address) -> Result<(), WalkError> {
        let count = self.rom_u32(rom_class, "romMethodCount")?;
        let methods = self.cx.read_ptr_field(RAM_CLASS, self.address, "ramMethods")?;
        if count == 0 || methods.is_null() {
            return Ok(());
        }
        let method_size = self.cx.size_of("J9Method")?;
        out.section(methods, count * method_size, "ramMethods", true);
        for index in 0..count {
            add_object_as_slots(&self.cx, out, "J9Method", methods + index * method_size)?;
        }
        Ok(())
    }

    fn all_slots_in_ram_statics_do(&self, out: &mut Emitter<'_>, rom_class: Address) -> Result<(), WalkError> {
        let statics = self.cx.read_ptr_field(RAM_CLASS, self.address, "ramStatics")?;
        if statics.is_null() {
            return Ok(());
        }
        let word = self.cx.pointer_size();
        let groups = [
            (self.rom_u32(rom_class, "objectStaticCount")?, 1, "objectStatic", Some("!j9object")),
            (self.rom_u32(rom_class, "singleScalarStaticCount")?, 1, "singleScalarStatic", None),
            (self.rom_u32(rom_class, "doubleScalarStaticCount")?, 8 / word, "doubleScalarStatic", None),
        ];

        let mut cursor = statics;
        for (count, words_each, name, hint) in groups {
            for _ in 0..count * words_each {
                out.slot_with_info(SlotType::Udata, cursor, name, hint)?;
                cursor = cursor + word;
            }
        }
        out.section(statics, statics.bytes_until(cursor), "ramStatics", true);
        Ok(())
    }

    fn all_slots_in_constant_pool_do(&self, out: &mut Emitter<'_>, rom_class: Address) -> Result<(), WalkError> {
        let pool = self.cx.read_ptr_field(RAM_CLASS, self.address, "ramConstantPool")?;
        let count = self.rom_u32(rom_class, "ramConstantPoolCount")?;
        let Some(shape) = self.cx.read_srp_field(ROM_CLASS, rom_class, "cpShapeDescription")? else {
            return Ok(());
        };
        if pool.is_null() || count == 0 {
            return Ok(());
        }

        let item_size = self.cx.size_of("J9RAMConstantPoolItem")?;
        let encoding = self.cx.shape_encoding();
        out.section(pool, count * item_size, "ramConstantPool", true);
        for index in 0..count {
            let code = encoding.type_code(self.reader(), shape, index)?;
            let cp_type = CpType::from_code(code).ok_or_else(|| {
                WalkError::CorruptData(format!("constant pool entry {} has unknown type {}", index, code))
            })?;
            add_object_as_slots(&self.cx, out, ram_cp_structure(cp_type), pool + index * item_size)?;
        }
        Ok(())
    }

    fn all_slots_in_object_table_do(
        &self,
        out: &mut Emitter<'_>,
        rom_class: Address,
        table_field: &str,
        count_field: &str,
        slot: &str,
    ) -> Result<(), WalkError> {
        let count = self.rom_u32(rom_class, count_field)?;
        let table = self.cx.read_ptr_field(RAM_CLASS, self.address, table_field)?;
        if count == 0 || table.is_null() {
            return Ok(());
        }
        let word = self.cx.pointer_size();
        out.section(table, count * word, table_field, true);
        for index in 0..count {
            out.slot_with_info(SlotType::Udata, table + index * word, slot, Some("!j9object"))?;
        }
        Ok(())
    }

    fn all_slots_in_split_table_do(
        &self,
        out: &mut Emitter<'_>,
        rom_class: Address,
        table_field: &str,
        count_field: &str,
    ) -> Result<(), WalkError> {
        let count = self.cx.read_u16_field(ROM_CLASS, rom_class, count_field)? as u64;
        let table = self.cx.read_ptr_field(RAM_CLASS, self.address, table_field)?;
        if count == 0 || table.is_null() {
            return Ok(());
        }
        let word = self.cx.pointer_size();
        out.section(table, count * word, table_field, true);
        for index in 0..count {
            out.slot_with_info(SlotType::Udata, table + index * word, "splitMethod", Some("!j9method"))?;
        }
        Ok(())
    }

    /// Interface tables chain from this class down to the superclass's first
    /// table. Concrete classes carry one method slot per interface method.
    fn all_slots_in_itable_do(&self, out: &mut Emitter<'_>, rom_class: Address) -> Result<(), WalkError> {
        let head = self.cx.read_ptr_field(RAM_CLASS, self.address, "iTable")?;
        if head.is_null() {
            return Ok(());
        }

        let depth = self.class_depth(self.address)?;
        let superclass_itable = if depth == 0 {
            Address::null()
        } else {
            let superclasses = self.cx.read_ptr_field(RAM_CLASS, self.address, "superclasses")?;
            let superclass = self.reader().read_ptr(superclasses + (depth - 1) * self.cx.pointer_size())?;
            if superclass.is_null() {
                Address::null()
            } else {
                self.cx.read_ptr_field(RAM_CLASS, superclass, "iTable")?
            }
        };

        let modifiers = ClassModifiers::from_bits_retain(self.cx.read_u32_field(ROM_CLASS, rom_class, "modifiers")?);
        let is_interface = modifiers.contains(ClassModifiers::INTERFACE);
        let word = self.cx.pointer_size();
        let entry_size = self.cx.size_of(ITABLE)?;

        let mut itable = head;
        let mut total = 0;
        let mut visited = 0;
        while !itable.is_null() && itable != superclass_itable {
            visited += 1;
            if visited > MAX_ITABLE_CHAIN {
                log::warn!("iTable chain of class {} does not terminate", self.address);
                break;
            }
            out.slot_with_info(SlotType::Udata, self.cx.field(ITABLE, itable, "interfaceClass")?, "interfaceClass", Some("!j9class"))?;
            out.slot(SlotType::Udata, self.cx.field(ITABLE, itable, "depth")?, "depth")?;
            out.slot_with_info(SlotType::Udata, self.cx.field(ITABLE, itable, "next")?, "next", Some("!j9itable"))?;
            total += entry_size;

            if !is_interface {
                let interface = self.cx.read_ptr_field(ITABLE, itable, "interfaceClass")?;
                let interface_rom = self.cx.read_ptr_field(RAM_CLASS, interface, "romClass")?;
                let methods = self.rom_u32(interface_rom, "romMethodCount")?;
                let first = itable + entry_size;
                for index in 0..methods {
                    out.slot_with_info(SlotType::Udata, first + index * word, "method", Some("!j9method"))?;
                }
                total += methods * word;
            }
            itable = self.cx.read_ptr_field(ITABLE, itable, "next")?;
        }

        out.section(head, total, "iTable", true);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::{RamClassFixture, RecordingCallbacks};

    fn walk() -> (RecordingCallbacks, RamClassFixture) {
        let fixture = RamClassFixture::build();
        let walker = RamClassWalker::new(fixture.context(), fixture.class);
        let mut recorder = RecordingCallbacks::default();
        walker.all_slots_in_object_do(&mut recorder).unwrap();
        (recorder, fixture)
    }

    #[test]
    fn test_header_uses_catalog_fields() {
        let (recorder, fixture) = walk();
        assert_eq!(recorder.section("ramHeader").unwrap().length, 232);
        let rom = recorder.slot("romClass").unwrap();
        assert_eq!(rom.location, fixture.class + 8);
        assert_eq!(rom.extra_info.as_deref(), Some("!j9romclass"));
        assert_eq!(
            RamClassWalker::new(fixture.context(), fixture.class).class_name().unwrap(),
            "demo/Widget"
        );
    }

    #[test]
    fn test_vtable_follows_class() {
        let (recorder, fixture) = walk();
        let vtable = recorder.section("vTable").unwrap();
        assert_eq!(vtable.start, fixture.class + 232);
        assert_eq!(vtable.length, 24 + 2 * 8);
        assert_eq!(recorder.slots_named("vTableMethod").len(), 2);
    }

    #[test]
    fn test_superclasses_and_statics() {
        let (recorder, _) = walk();
        assert_eq!(recorder.section("superclasses").unwrap().length, 8);
        let statics = recorder.section("ramStatics").unwrap();
        assert_eq!(statics.length, 3 * 8);
        assert_eq!(recorder.slots_named("objectStatic").len(), 1);
        assert_eq!(recorder.slots_named("doubleScalarStatic").len(), 1);
    }

    #[test]
    fn test_constant_pool_typed_by_rom_shape() {
        let (recorder, _) = walk();
        let pool = recorder.section("ramConstantPool").unwrap();
        assert_eq!(pool.length, 4 * 16);
        assert!(recorder.has_slot("value", SlotType::Udata, pool.start + 16));
        assert!(recorder.has_slot("valueOffset", SlotType::Udata, pool.start + 48));
        assert!(recorder.has_slot("flagsAndClass", SlotType::Idata, pool.start + 56));
    }

    #[test]
    fn test_interface_method_codes_use_method_ref_records() {
        assert_eq!(ram_cp_structure(CpType::InterfaceStaticMethod), ram_cp_structure(CpType::StaticMethod));
        assert_eq!(ram_cp_structure(CpType::InterfaceInstanceMethod), "J9RAMSpecialMethodRef");
        assert_eq!(ram_cp_structure(CpType::Unused8), ram_cp_structure(CpType::Unused));
        let catalog = crate::catalog::StructureCatalog::builtin();
        for code in 0..32 {
            if let Some(cp_type) = CpType::from_code(code) {
                assert!(catalog.structure(ram_cp_structure(cp_type)).is_ok(), "{:?}", cp_type);
            }
        }
    }

    #[test]
    fn test_itable_stops_at_superclass_table() {
        let (recorder, _) = walk();
        let itable = recorder.section("iTable").unwrap();
        // one entry for the interface plus its single method slot
        assert_eq!(itable.length, 24 + 8);
        assert_eq!(recorder.slots_named("interfaceClass").len(), 1);
        assert_eq!(recorder.slots_named("method").len(), 1);
    }

    #[test]
    fn test_ram_methods() {
        let (recorder, _) = walk();
        let methods = recorder.section("ramMethods").unwrap();
        assert_eq!(methods.length, 2 * 32);
        assert_eq!(recorder.slots_named("bytecodes").len(), 2);
    }

    #[test]
    fn test_owner_has_no_length() {
        let fixture = RamClassFixture::build();
        let walker = RamClassWalker::new(fixture.context(), fixture.class);
        assert_eq!(walker.owner().unwrap().length(), None);
    }
}
