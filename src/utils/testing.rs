// Sat Oct 17 2026 - Alex

use crate::catalog::StructureCatalog;
use crate::memory::{Address, ImageMemory, MemoryRange, MemoryReader};
use crate::walker::constant_pool::ShapeEncoding;
use crate::walker::flags::{ClassModifiers, FieldModifiers, MethodModifiers, OptionalFlags, RecordComponentFlags};
use crate::walker::local_variables::{encode_delta, LocalVariable, LocalVariableTable};
use crate::walker::{ClassOwner, ClassWalkCallbacks, FieldFault, SlotType, WalkContext};
use std::collections::HashMap;
use std::sync::Arc;

pub const ROM_BASE: u64 = 0x10_0000;
pub const INTERFACE_ROM_BASE: u64 = 0x11_0000;
pub const RAM_BASE: u64 = 0x20_0000;

/// Little-endian byte buffer for one image segment. String references are
/// resolved when the strings are placed at the end of the segment.
pub struct ImageBuilder {
    base: u64,
    bytes: Vec<u8>,
    string_refs: Vec<(u64, String)>,
}

impl ImageBuilder {
    pub fn new(base: u64) -> Self {
        Self {
            base,
            bytes: Vec::new(),
            string_refs: Vec::new(),
        }
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn address(&self, offset: u64) -> Address {
        Address::new(self.base + offset)
    }

    pub fn reserve(&mut self, size: u64) -> u64 {
        let at = self.len();
        self.bytes.resize((at + size) as usize, 0);
        at
    }

    pub fn align(&mut self, alignment: u64) {
        while self.len() % alignment != 0 {
            self.bytes.push(0);
        }
    }

    pub fn put_bytes(&mut self, at: u64, data: &[u8]) {
        let end = at as usize + data.len();
        if self.bytes.len() < end {
            self.bytes.resize(end, 0);
        }
        self.bytes[at as usize..end].copy_from_slice(data);
    }

    pub fn put_u8(&mut self, at: u64, value: u8) {
        self.put_bytes(at, &[value]);
    }

    pub fn put_u16(&mut self, at: u64, value: u16) {
        self.put_bytes(at, &value.to_le_bytes());
    }

    pub fn put_u16_be(&mut self, at: u64, value: u16) {
        self.put_bytes(at, &value.to_be_bytes());
    }

    pub fn put_u32(&mut self, at: u64, value: u32) {
        self.put_bytes(at, &value.to_le_bytes());
    }

    pub fn put_u64(&mut self, at: u64, value: u64) {
        self.put_bytes(at, &value.to_le_bytes());
    }

    pub fn put_srp(&mut self, at: u64, target: u64) {
        self.put_u32(at, (target as i64 - at as i64) as i32 as u32);
    }

    pub fn put_wsrp(&mut self, at: u64, target: u64) {
        self.put_u64(at, (target as i64 - at as i64) as u64);
    }

    pub fn put_string_ref(&mut self, at: u64, value: &str) {
        self.string_refs.push((at, value.to_string()));
    }

    /// Writes every referenced string once, in first-reference order, and
    /// patches the references. Returns the byte range the strings occupy.
    pub fn place_strings(&mut self) -> Option<(u64, u64)> {
        let refs = std::mem::take(&mut self.string_refs);
        let mut placed: HashMap<String, u64> = HashMap::new();
        let mut first = None;
        for (at, value) in refs {
            let target = match placed.get(&value) {
                Some(&target) => target,
                None => {
                    self.align(2);
                    let target = self.reserve(2 + value.len() as u64);
                    self.put_u16(target, value.len() as u16);
                    self.put_bytes(target + 2, value.as_bytes());
                    self.align(2);
                    placed.insert(value, target);
                    first.get_or_insert(target);
                    target
                }
            };
            self.put_srp(at, target);
        }
        first.map(|start| (start, self.len()))
    }

    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

#[derive(Debug, Clone)]
pub struct DebugInfoSpec {
    inline: bool,
    compressed: u64,
    variables: u64,
}

impl DebugInfoSpec {
    pub fn inline(compressed: u64, variables: u64) -> Self {
        Self { inline: true, compressed, variables }
    }

    pub fn out_of_line(compressed: u64, variables: u64) -> Self {
        Self { inline: false, compressed, variables }
    }

    fn size(&self) -> u64 {
        if self.inline {
            (12 + self.compressed + variable_table_size(self.variables) + 3) & !3
        } else {
            12 + self.compressed
        }
    }
}

struct SampleLocal {
    index: u32,
    start_pc: u32,
    length: u32,
    name: &'static str,
    signature: &'static str,
    generic: Option<&'static str>,
}

// Chosen so the first four entries use the 5, 13, 2 and 1 byte headers.
static SAMPLE_LOCALS: [SampleLocal; 4] = [
    SampleLocal { index: 0, start_pc: 0, length: 6, name: "this", signature: "Ldemo/Widget;", generic: None },
    SampleLocal {
        index: 1,
        start_pc: 2,
        length: 4,
        name: "items",
        signature: "Ljava/util/List;",
        generic: Some("Ljava/util/List<TT;>;"),
    },
    SampleLocal { index: 2, start_pc: 4, length: 4, name: "i", signature: "I", generic: None },
    SampleLocal { index: 2, start_pc: 5, length: 4, name: "j", signature: "I", generic: None },
];

fn encode_sample_locals(count: u64) -> Vec<(Vec<u8>, &'static SampleLocal)> {
    let mut table = LocalVariableTable::default();
    SAMPLE_LOCALS
        .iter()
        .cycle()
        .take(count as usize)
        .map(|local| {
            let delta = table.delta_to(&LocalVariable {
                index: local.index,
                start_pc: local.start_pc,
                length: local.length,
                has_generic_signature: local.generic.is_some(),
            });
            let mut header = Vec::new();
            encode_delta(delta, &mut header);
            (header, local)
        })
        .collect()
}

fn variable_table_size(count: u64) -> u64 {
    encode_sample_locals(count)
        .iter()
        .map(|(header, local)| header.len() as u64 + 8 + if local.generic.is_some() { 4 } else { 0 })
        .sum()
}

fn write_variable_table(seg: &mut ImageBuilder, at: u64, count: u64) {
    let mut cursor = at;
    for (header, local) in encode_sample_locals(count) {
        seg.put_bytes(cursor, &header);
        cursor += header.len() as u64;
        seg.put_string_ref(cursor, local.name);
        seg.put_string_ref(cursor + 4, local.signature);
        cursor += 8;
        if let Some(generic) = local.generic {
            seg.put_string_ref(cursor, generic);
            cursor += 4;
        }
    }
}

#[derive(Debug, Clone)]
pub struct MethodSpec {
    name: String,
    signature: String,
    bytecodes: Vec<u8>,
    generic_signature: Option<String>,
    exception_info: Option<(u16, Vec<String>)>,
    annotation: Option<Vec<u8>>,
    debug_info: Option<DebugInfoSpec>,
    stack_map: bool,
    parameters: Vec<String>,
}

impl MethodSpec {
    pub fn new(name: &str, signature: &str, bytecodes: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            signature: signature.to_string(),
            bytecodes,
            generic_signature: None,
            exception_info: None,
            annotation: None,
            debug_info: None,
            stack_map: false,
            parameters: Vec::new(),
        }
    }

    pub fn with_generic_signature(mut self, signature: &str) -> Self {
        self.generic_signature = Some(signature.to_string());
        self
    }

    pub fn with_exception_info(mut self, catches: u16, throws: Vec<&str>) -> Self {
        self.exception_info = Some((catches, throws.into_iter().map(String::from).collect()));
        self
    }

    pub fn with_annotation(mut self, data: Vec<u8>) -> Self {
        self.annotation = Some(data);
        self
    }

    pub fn with_debug_info(mut self, debug_info: DebugInfoSpec) -> Self {
        self.debug_info = Some(debug_info);
        self
    }

    pub fn with_sample_stack_map(mut self) -> Self {
        self.stack_map = true;
        self
    }

    pub fn with_parameters(mut self, names: Vec<&str>) -> Self {
        self.parameters = names.into_iter().map(String::from).collect();
        self
    }

    fn modifiers(&self) -> u32 {
        let mut modifiers = MethodModifiers::from_bits_retain(0x0001);
        modifiers.set(MethodModifiers::HAS_GENERIC_SIGNATURE, self.generic_signature.is_some());
        modifiers.set(MethodModifiers::HAS_EXCEPTION_INFO, self.exception_info.is_some());
        modifiers.set(MethodModifiers::HAS_METHOD_ANNOTATIONS, self.annotation.is_some());
        modifiers.set(MethodModifiers::HAS_DEBUG_INFO, self.debug_info.is_some());
        modifiers.set(MethodModifiers::HAS_STACK_MAP, self.stack_map);
        modifiers.set(MethodModifiers::HAS_METHOD_PARAMETERS, !self.parameters.is_empty());
        modifiers.bits()
    }
}

#[derive(Debug, Clone)]
pub enum CpEntrySpec {
    Unused,
    Class(String),
    Int(u32),
    Field { class_index: u32, name: String, signature: String },
}

impl CpEntrySpec {
    fn code(&self) -> u32 {
        match self {
            CpEntrySpec::Unused => 0,
            CpEntrySpec::Class(_) => 1,
            CpEntrySpec::Int(_) => 3,
            CpEntrySpec::Field { .. } => 7,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: String,
    signature: String,
    constant: Option<u32>,
}

fn table_switch_bytecodes() -> Vec<u8> {
    let mut code = vec![0x03, 0xaa, 0x00, 0x00];
    for value in [28i32, 0, 3, 28, 28, 28, 28] {
        code.extend_from_slice(&value.to_le_bytes());
    }
    code.push(0xb1);
    code
}

fn sample_stack_map() -> Vec<u8> {
    let mut map = 20u32.to_le_bytes().to_vec();
    map.extend_from_slice(&[0x00, 0x03]);
    map.extend_from_slice(&[10]);
    map.extend_from_slice(&[70, 7, 0x00, 0x01]);
    map.extend_from_slice(&[255, 0x00, 0x02, 0x00, 0x01, 1, 0x00, 0x00]);
    map.push(0);
    map
}

/// Describes a ROM class image to lay out for tests.
#[derive(Debug, Clone)]
pub struct RomClassSpec {
    class_name: String,
    superclass_name: String,
    modifiers: u32,
    interfaces: Vec<String>,
    constant_pool: Vec<CpEntrySpec>,
    methods: Vec<MethodSpec>,
    fields: Vec<FieldSpec>,
    source_file: Option<String>,
    source_debug_extension: Option<Vec<u8>>,
    enclosing_method: Option<(String, String)>,
    simple_name: Option<String>,
    record_components: Vec<(String, String, Option<String>)>,
    permitted_subclasses: Vec<String>,
    class_annotation: Option<Vec<u8>>,
    class_type_annotation: Option<Vec<u8>>,
    injected_interfaces: Option<u32>,
    loadable_descriptors: Vec<String>,
    implicit_creation: Option<u32>,
    static_split_indexes: Vec<u16>,
    intermediate_data: u64,
    static_counts: (u32, u32, u32),
    faults: Vec<(u64, u64)>,
}

pub struct LaidOutRomClass {
    pub bytes: Vec<u8>,
    pub rom_size: u64,
    pub strings: Option<(u64, u64)>,
}

impl RomClassSpec {
    pub fn sample() -> Self {
        Self {
            class_name: "demo/Widget".to_string(),
            superclass_name: "java/lang/Object".to_string(),
            modifiers: 0x0001,
            interfaces: vec!["java/lang/Runnable".to_string()],
            constant_pool: vec![
                CpEntrySpec::Unused,
                CpEntrySpec::Class("java/lang/Object".to_string()),
                CpEntrySpec::Int(42),
                CpEntrySpec::Field {
                    class_index: 1,
                    name: "count".to_string(),
                    signature: "I".to_string(),
                },
            ],
            methods: vec![
                MethodSpec::new("<init>", "()V", vec![0x2a, 0xb7, 0x01, 0x00, 0xb1]),
                MethodSpec::new("run", "()V", table_switch_bytecodes()),
            ],
            fields: vec![
                FieldSpec {
                    name: "count".to_string(),
                    signature: "I".to_string(),
                    constant: Some(42),
                },
                FieldSpec {
                    name: "name".to_string(),
                    signature: "Ljava/lang/String;".to_string(),
                    constant: None,
                },
            ],
            source_file: Some("Widget.java".to_string()),
            source_debug_extension: None,
            enclosing_method: None,
            simple_name: None,
            record_components: Vec::new(),
            permitted_subclasses: Vec::new(),
            class_annotation: None,
            class_type_annotation: None,
            injected_interfaces: None,
            loadable_descriptors: Vec::new(),
            implicit_creation: None,
            static_split_indexes: vec![1],
            intermediate_data: 0,
            static_counts: (1, 1, 1),
            faults: Vec::new(),
        }
    }

    pub fn array() -> Self {
        Self {
            class_name: "[I".to_string(),
            modifiers: ClassModifiers::ARRAY.bits() | 0x0001,
            interfaces: Vec::new(),
            constant_pool: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            source_file: None,
            static_split_indexes: Vec::new(),
            static_counts: (0, 0, 0),
            ..Self::sample()
        }
    }

    pub fn interface(name: &str) -> Self {
        Self {
            class_name: name.to_string(),
            modifiers: ClassModifiers::INTERFACE.bits() | ClassModifiers::ABSTRACT.bits() | 0x0001,
            interfaces: Vec::new(),
            constant_pool: vec![CpEntrySpec::Unused],
            methods: vec![MethodSpec::new("run", "()V", Vec::new())],
            fields: Vec::new(),
            source_file: None,
            static_split_indexes: Vec::new(),
            static_counts: (0, 0, 0),
            ..Self::sample()
        }
    }

    pub fn with_methods(mut self, methods: Vec<MethodSpec>) -> Self {
        self.methods = methods;
        self
    }

    pub fn with_intermediate_data(mut self, length: u64) -> Self {
        self.intermediate_data = length;
        self
    }

    pub fn with_source_debug_extension(mut self, data: Vec<u8>) -> Self {
        self.source_debug_extension = Some(data);
        self
    }

    pub fn with_enclosing_method(mut self, name: &str, signature: &str) -> Self {
        self.enclosing_method = Some((name.to_string(), signature.to_string()));
        self
    }

    pub fn with_simple_name(mut self, name: &str) -> Self {
        self.simple_name = Some(name.to_string());
        self
    }

    pub fn with_record_components(mut self, components: Vec<(&str, &str, Option<&str>)>) -> Self {
        self.record_components = components
            .into_iter()
            .map(|(name, signature, generic)| (name.to_string(), signature.to_string(), generic.map(String::from)))
            .collect();
        self
    }

    pub fn with_permitted_subclasses(mut self, names: Vec<&str>) -> Self {
        self.permitted_subclasses = names.into_iter().map(String::from).collect();
        self
    }

    pub fn with_class_annotation(mut self, data: Vec<u8>) -> Self {
        self.class_annotation = Some(data);
        self
    }

    pub fn with_class_type_annotation(mut self, data: Vec<u8>) -> Self {
        self.class_type_annotation = Some(data);
        self
    }

    pub fn with_injected_interfaces(mut self, count: u32) -> Self {
        self.injected_interfaces = Some(count);
        self
    }

    pub fn with_loadable_descriptors(mut self, names: Vec<&str>) -> Self {
        self.loadable_descriptors = names.into_iter().map(String::from).collect();
        self
    }

    pub fn with_implicit_creation(mut self, flags: u32) -> Self {
        self.implicit_creation = Some(flags);
        self
    }

    /// Marks `[offset, offset + length)` of the class as unreadable.
    pub fn with_fault(mut self, offset: u64, length: u64) -> Self {
        self.faults.push((offset, length));
        self
    }

    fn optional_flags(&self) -> OptionalFlags {
        let mut flags = OptionalFlags::empty();
        flags.set(OptionalFlags::SOURCE_FILE_NAME, self.source_file.is_some());
        flags.set(OptionalFlags::SOURCE_DEBUG_EXTENSION, self.source_debug_extension.is_some());
        flags.set(OptionalFlags::ENCLOSING_METHOD, self.enclosing_method.is_some());
        flags.set(OptionalFlags::SIMPLE_NAME, self.simple_name.is_some());
        flags.set(OptionalFlags::RECORD_ATTRIBUTE, !self.record_components.is_empty());
        flags.set(OptionalFlags::CLASS_ANNOTATION_INFO, self.class_annotation.is_some());
        flags.set(OptionalFlags::TYPE_ANNOTATION_INFO, self.class_type_annotation.is_some());
        flags.set(OptionalFlags::PERMITTED_SUBCLASSES_ATTRIBUTE, !self.permitted_subclasses.is_empty());
        flags.set(OptionalFlags::INJECTED_INTERFACE_INFO, self.injected_interfaces.is_some());
        flags.set(OptionalFlags::PRELOAD_ATTRIBUTE, !self.loadable_descriptors.is_empty());
        flags.set(OptionalFlags::IMPLICIT_CREATION_ATTRIBUTE, self.implicit_creation.is_some());
        flags
    }

    pub fn build(&self) -> RomClassFixture {
        let laid_out = self.lay_out(ROM_BASE);
        let mut image = ImageMemory::new();
        image.add_segment(Address::new(ROM_BASE), laid_out.bytes);
        for (offset, length) in &self.faults {
            image.add_fault(MemoryRange::from_start_size(Address::new(ROM_BASE + offset), *length));
        }
        RomClassFixture {
            image: Arc::new(image),
            catalog: StructureCatalog::builtin(),
            address: Address::new(ROM_BASE),
            rom_size: laid_out.rom_size,
            strings: laid_out
                .strings
                .map(|(start, end)| (Address::new(ROM_BASE + start), Address::new(ROM_BASE + end))),
        }
    }

    pub fn lay_out(&self, base: u64) -> LaidOutRomClass {
        let mut seg = ImageBuilder::new(base);
        let is_array = self.modifiers & ClassModifiers::ARRAY.bits() != 0;
        let header = seg.reserve(if is_array { 88 } else { 168 });

        seg.put_string_ref(header + 8, &self.class_name);
        seg.put_string_ref(header + 12, &self.superclass_name);
        seg.put_u32(header + 16, self.modifiers);

        if is_array {
            seg.put_u32(header + 80, 1);
            let strings = seg.place_strings();
            seg.align(8);
            let rom_size = seg.len();
            seg.put_u32(header, rom_size as u32);
            return LaidOutRomClass { bytes: seg.finish(), rom_size, strings };
        }

        let (object_statics, single_statics, double_statics) = self.static_counts;
        seg.put_u32(header + 4, single_statics);
        seg.put_u32(header + 48, object_statics);
        seg.put_u32(header + 52, double_statics);
        seg.put_u32(header + 56, self.constant_pool.len() as u32);
        seg.put_u32(header + 60, self.constant_pool.len() as u32);
        seg.put_u16(header + 108, 61);

        let pool = seg.reserve(self.constant_pool.len() as u64 * 8);

        let interfaces = seg.reserve(self.interfaces.len() as u64 * 4);
        for (index, name) in self.interfaces.iter().enumerate() {
            seg.put_string_ref(interfaces + index as u64 * 4, name);
        }
        seg.put_u32(header + 24, self.interfaces.len() as u32);
        seg.put_srp(header + 28, interfaces);
        let inner = seg.len();
        seg.put_srp(header + 96, inner);
        seg.put_srp(header + 104, inner);

        let mut nas_entries = HashMap::new();
        let mut nas_pairs: Vec<(String, String)> = self
            .constant_pool
            .iter()
            .filter_map(|entry| match entry {
                CpEntrySpec::Field { name, signature, .. } => Some((name.clone(), signature.clone())),
                _ => None,
            })
            .collect();
        nas_pairs.extend(self.enclosing_method.clone());
        for (name, signature) in nas_pairs {
            let nas = seg.reserve(8);
            seg.put_string_ref(nas, &name);
            seg.put_string_ref(nas + 4, &signature);
            nas_entries.insert((name, signature), nas);
        }

        for (index, entry) in self.constant_pool.iter().enumerate() {
            let at = pool + index as u64 * 8;
            match entry {
                CpEntrySpec::Unused => {}
                CpEntrySpec::Class(name) => {
                    seg.put_string_ref(at, name);
                    seg.put_u32(at + 4, entry.code());
                }
                CpEntrySpec::Int(value) => {
                    seg.put_u32(at, *value);
                    seg.put_u32(at + 4, entry.code());
                }
                CpEntrySpec::Field { class_index, name, signature } => {
                    seg.put_u32(at, *class_index);
                    if let Some(&nas) = nas_entries.get(&(name.clone(), signature.clone())) {
                        seg.put_srp(at + 4, nas);
                    }
                }
            }
        }

        let methods = seg.len();
        seg.put_u32(header + 32, self.methods.len() as u32);
        seg.put_srp(header + 36, methods);
        let mut deferred_debug = Vec::new();
        for method in &self.methods {
            write_method(&mut seg, method, &mut deferred_debug);
        }
        // Out-of-line debug info blocks sit together, followed by their
        // variable tables.
        let mut deferred_tables = Vec::new();
        for (srp_at, debug_info) in deferred_debug {
            let at = write_debug_info(&mut seg, &debug_info);
            seg.put_srp(srp_at, at);
            if debug_info.variables > 0 {
                deferred_tables.push((at, debug_info.variables));
            }
        }
        for (debug_at, count) in deferred_tables {
            let table = seg.reserve(variable_table_size(count));
            write_variable_table(&mut seg, table, count);
            seg.put_srp(debug_at, table);
        }
        seg.align(4);

        let fields = seg.len();
        seg.put_u32(header + 40, self.fields.len() as u32);
        seg.put_srp(header + 44, fields);
        for field in &self.fields {
            let at = seg.reserve(12);
            seg.put_string_ref(at, &field.name);
            seg.put_string_ref(at + 4, &field.signature);
            let mut modifiers = FieldModifiers::from_bits_retain(0x0002);
            if let Some(value) = field.constant {
                modifiers |= FieldModifiers::CONSTANT;
                let value_at = seg.reserve(4);
                seg.put_u32(value_at, value);
            }
            seg.put_u32(at + 8, modifiers.bits());
        }

        let encoding = ShapeEncoding::NIBBLE;
        let mut shape_words = vec![0u32; encoding.words(self.constant_pool.len() as u64) as usize];
        for (index, entry) in self.constant_pool.iter().enumerate() {
            encoding.pack(&mut shape_words, index as u64, entry.code());
        }
        let shape = seg.reserve(shape_words.len() as u64 * 4);
        for (index, word) in shape_words.iter().enumerate() {
            seg.put_u32(shape + index as u64 * 4, *word);
        }
        if !self.constant_pool.is_empty() {
            seg.put_srp(header + 80, shape);
        }

        self.write_optional_info(&mut seg, header, &nas_entries);

        if !self.static_split_indexes.is_empty() {
            let table = seg.reserve(self.static_split_indexes.len() as u64 * 2);
            for (index, cp_index) in self.static_split_indexes.iter().enumerate() {
                seg.put_u16(table + index as u64 * 2, *cp_index);
            }
            seg.put_u16(header + 148, self.static_split_indexes.len() as u16);
            seg.put_srp(header + 152, table);
            seg.align(4);
        }

        if self.intermediate_data > 0 {
            let data = seg.reserve(self.intermediate_data);
            seg.put_bytes(data, &vec![0xab; self.intermediate_data as usize]);
            seg.put_wsrp(header + 64, data);
            seg.put_u32(header + 72, self.intermediate_data as u32);
            seg.align(4);
        }

        let strings = seg.place_strings();
        seg.align(8);
        let rom_size = seg.len();
        seg.put_u32(header, rom_size as u32);
        LaidOutRomClass { bytes: seg.finish(), rom_size, strings }
    }

    fn write_optional_info(&self, seg: &mut ImageBuilder, header: u64, nas_entries: &HashMap<(String, String), u64>) {
        let flags = self.optional_flags();
        if flags.is_empty() {
            return;
        }
        seg.put_u32(header + 112, flags.bits());
        let info = seg.reserve(flags.word_count() * 4);
        seg.put_srp(header + 116, info);

        let mut word = info;
        if let Some(name) = &self.source_file {
            seg.put_string_ref(word, name);
            word += 4;
        }
        if let Some(data) = &self.source_debug_extension {
            let padded = (data.len() as u64 + 3) & !3;
            let extension = seg.reserve(4 + padded);
            seg.put_u32(extension, data.len() as u32);
            seg.put_bytes(extension + 4, data);
            seg.put_srp(word, extension);
            word += 4;
        }
        if let Some((name, signature)) = &self.enclosing_method {
            let enclosing = seg.reserve(8);
            seg.put_u32(enclosing, 1);
            if let Some(&nas) = nas_entries.get(&(name.clone(), signature.clone())) {
                seg.put_srp(enclosing + 4, nas);
            }
            seg.put_srp(word, enclosing);
            word += 4;
        }
        if let Some(name) = &self.simple_name {
            seg.put_string_ref(word, name);
            word += 4;
        }
        for annotation in [&self.class_annotation, &self.class_type_annotation].into_iter().flatten() {
            let padded = (annotation.len() as u64 + 3) & !3;
            let at = seg.reserve(4 + padded);
            seg.put_u32(at, annotation.len() as u32);
            seg.put_bytes(at + 4, annotation);
            seg.put_srp(word, at);
            word += 4;
        }
        if !self.record_components.is_empty() {
            let record = seg.reserve(4);
            seg.put_u32(record, self.record_components.len() as u32);
            for (name, signature, generic) in &self.record_components {
                let component = seg.reserve(12);
                seg.put_string_ref(component, name);
                seg.put_string_ref(component + 4, signature);
                let mut flags = RecordComponentFlags::empty();
                if let Some(generic) = generic {
                    flags |= RecordComponentFlags::HAS_GENERIC_SIGNATURE;
                    let at = seg.reserve(4);
                    seg.put_string_ref(at, generic);
                }
                seg.put_u32(component + 8, flags.bits());
            }
            seg.put_srp(word, record);
            word += 4;
        }
        if !self.permitted_subclasses.is_empty() {
            let permitted = seg.reserve(4 + self.permitted_subclasses.len() as u64 * 4);
            seg.put_u32(permitted, self.permitted_subclasses.len() as u32);
            for (index, name) in self.permitted_subclasses.iter().enumerate() {
                seg.put_string_ref(permitted + 4 + index as u64 * 4, name);
            }
            seg.put_srp(word, permitted);
            word += 4;
        }
        if let Some(count) = self.injected_interfaces {
            let injected = seg.reserve(4);
            seg.put_u32(injected, count);
            seg.put_srp(word, injected);
            word += 4;
        }
        if !self.loadable_descriptors.is_empty() {
            let descriptors = seg.reserve(4 + self.loadable_descriptors.len() as u64 * 4);
            seg.put_u32(descriptors, self.loadable_descriptors.len() as u32);
            for (index, name) in self.loadable_descriptors.iter().enumerate() {
                seg.put_string_ref(descriptors + 4 + index as u64 * 4, name);
            }
            seg.put_srp(word, descriptors);
            word += 4;
        }
        if let Some(flags) = self.implicit_creation {
            let implicit = seg.reserve(4);
            seg.put_u32(implicit, flags);
            seg.put_srp(word, implicit);
        }
    }
}

fn write_method(seg: &mut ImageBuilder, method: &MethodSpec, deferred_debug: &mut Vec<(u64, DebugInfoSpec)>) {
    let at = seg.reserve(20);
    let length = method.bytecodes.len() as u64;
    seg.put_string_ref(at, &method.name);
    seg.put_string_ref(at + 4, &method.signature);
    seg.put_u32(at + 8, method.modifiers());
    seg.put_u16(at + 12, 2);
    seg.put_u16(at + 14, (length & 0xffff) as u16);
    seg.put_u8(at + 16, (length >> 16) as u8);
    seg.put_u8(at + 17, 1);

    let bytecodes = seg.reserve((length + 3) & !3);
    seg.put_bytes(bytecodes, &method.bytecodes);

    if let Some(signature) = &method.generic_signature {
        let at = seg.reserve(4);
        seg.put_string_ref(at, signature);
    }
    if let Some((catches, throws)) = &method.exception_info {
        let info = seg.reserve(4 + *catches as u64 * 16 + throws.len() as u64 * 4);
        seg.put_u16(info, *catches);
        seg.put_u16(info + 2, throws.len() as u16);
        for index in 0..*catches as u64 {
            let handler = info + 4 + index * 16;
            seg.put_u32(handler + 4, length as u32);
            seg.put_u32(handler + 12, 1);
        }
        let throws_at = info + 4 + *catches as u64 * 16;
        for (index, name) in throws.iter().enumerate() {
            seg.put_string_ref(throws_at + index as u64 * 4, name);
        }
    }
    if let Some(data) = &method.annotation {
        let padded = (data.len() as u64 + 3) & !3;
        let annotation = seg.reserve(4 + padded);
        seg.put_u32(annotation, data.len() as u32);
        seg.put_bytes(annotation + 4, data);
    }
    if let Some(debug_info) = &method.debug_info {
        if debug_info.inline {
            write_debug_info(seg, debug_info);
        } else {
            let srp_at = seg.reserve(4);
            deferred_debug.push((srp_at, debug_info.clone()));
        }
    }
    if method.stack_map {
        let map = sample_stack_map();
        let at = seg.reserve(map.len() as u64);
        seg.put_bytes(at, &map);
    }
    if !method.parameters.is_empty() {
        let size = 1 + method.parameters.len() as u64 * 6;
        let data = seg.reserve((size + 3) & !3);
        seg.put_u8(data, method.parameters.len() as u8);
        for (index, name) in method.parameters.iter().enumerate() {
            seg.put_string_ref(data + 1 + index as u64 * 6, name);
        }
    }
}

/// Inline debug info carries its variable table and is tagged with its size.
/// Out-of-line info leaves `srpToVarInfo` for the caller to point at a table
/// placed elsewhere.
fn write_debug_info(seg: &mut ImageBuilder, debug_info: &DebugInfoSpec) -> u64 {
    seg.align(if debug_info.inline { 4 } else { 2 });
    let size = debug_info.size();
    let at = seg.reserve(size);
    if debug_info.inline {
        seg.put_u32(at, size as u32 | 1);
    }
    seg.put_u32(at + 4, ((debug_info.compressed as u32) << 16) | (2 << 1));
    seg.put_u32(at + 8, debug_info.variables as u32);
    for index in 0..debug_info.compressed {
        seg.put_u8(at + 12 + index, (index + 1) as u8);
    }
    if debug_info.inline {
        write_variable_table(seg, at + 12 + debug_info.compressed, debug_info.variables);
    } else {
        seg.align(2);
    }
    at
}

pub struct RomClassFixture {
    pub image: Arc<ImageMemory>,
    pub catalog: Arc<StructureCatalog>,
    pub address: Address,
    pub rom_size: u64,
    pub strings: Option<(Address, Address)>,
}

impl RomClassFixture {
    pub fn reader(&self) -> Arc<dyn MemoryReader> {
        self.image.clone()
    }

    pub fn context(&self) -> WalkContext {
        WalkContext::new(self.reader(), Arc::clone(&self.catalog))
    }

    pub fn contains(&self, addr: Address) -> bool {
        addr >= self.address && addr < self.address + self.rom_size
    }

    pub fn owner(&self) -> ClassOwner {
        ClassOwner::rom(self.address, self.rom_size, 0)
    }
}

/// A RAM class for the sample ROM class, with one superclass and one
/// implemented interface whose iTable entry precedes the superclass's.
pub struct RamClassFixture {
    pub image: Arc<ImageMemory>,
    pub catalog: Arc<StructureCatalog>,
    pub class: Address,
    pub rom_class: Address,
}

impl RamClassFixture {
    pub fn build() -> Self {
        let rom = RomClassSpec::sample().lay_out(ROM_BASE);
        let interface_rom = RomClassSpec::interface("demo/Runnable").lay_out(INTERFACE_ROM_BASE);

        let mut seg = ImageBuilder::new(RAM_BASE);
        let class = seg.reserve(232);
        let vtable = seg.reserve(24 + 16);
        let superclass = seg.reserve(232);
        let interface = seg.reserve(232);
        let superclasses = seg.reserve(8);
        let methods = seg.reserve(2 * 32);
        let statics = seg.reserve(3 * 8);
        let pool = seg.reserve(4 * 16);
        let itable = seg.reserve(24 + 8);
        let super_itable = seg.reserve(24);

        let at = |offset: u64| RAM_BASE + offset;
        seg.put_u64(class, 0x9966_9966);
        seg.put_u64(class + 8, ROM_BASE);
        seg.put_u64(class + 16, at(superclasses));
        seg.put_u64(class + 24, 1);
        seg.put_u64(class + 56, at(methods));
        seg.put_u64(class + 64, at(statics));
        seg.put_u64(class + 120, at(itable));
        seg.put_u64(class + 160, at(pool));

        seg.put_u64(vtable, 2);
        seg.put_u64(vtable + 24, at(methods));
        seg.put_u64(vtable + 32, at(methods + 32));

        seg.put_u64(superclass + 120, at(super_itable));
        seg.put_u64(interface + 8, INTERFACE_ROM_BASE);
        seg.put_u64(superclasses, at(superclass));

        seg.put_u64(methods, ROM_BASE + 0x200);
        seg.put_u64(methods + 32, ROM_BASE + 0x220);

        seg.put_u64(pool + 16, at(superclass));
        seg.put_u64(pool + 48, 16);

        seg.put_u64(itable, at(interface));
        seg.put_u64(itable + 8, 1);
        seg.put_u64(itable + 16, at(super_itable));
        seg.put_u64(itable + 24, at(methods));
        seg.put_u64(super_itable, at(interface));

        let mut image = ImageMemory::new();
        image.add_segment(Address::new(ROM_BASE), rom.bytes);
        image.add_segment(Address::new(INTERFACE_ROM_BASE), interface_rom.bytes);
        image.add_segment(Address::new(RAM_BASE), seg.finish());

        Self {
            image: Arc::new(image),
            catalog: StructureCatalog::builtin(),
            class: Address::new(RAM_BASE + class),
            rom_class: Address::new(ROM_BASE),
        }
    }

    pub fn reader(&self) -> Arc<dyn MemoryReader> {
        self.image.clone()
    }

    pub fn context(&self) -> WalkContext {
        WalkContext::new(self.reader(), Arc::clone(&self.catalog))
    }
}

#[derive(Debug, Clone)]
pub struct RecordedSlot {
    pub kind: SlotType,
    pub location: Address,
    pub name: String,
    pub extra_info: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RecordedSection {
    pub start: Address,
    pub length: u64,
    pub name: String,
    pub compute_padding: bool,
}

/// Collector that records every callback verbatim.
#[derive(Debug, Default)]
pub struct RecordingCallbacks {
    pub slots: Vec<RecordedSlot>,
    pub sections: Vec<RecordedSection>,
}

impl RecordingCallbacks {
    pub fn section(&self, name: &str) -> Option<&RecordedSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn sections_named(&self, name: &str) -> Vec<&RecordedSection> {
        self.sections.iter().filter(|s| s.name == name).collect()
    }

    pub fn slot(&self, name: &str) -> Option<&RecordedSlot> {
        self.slots.iter().find(|s| s.name == name)
    }

    pub fn slots_named(&self, name: &str) -> Vec<&RecordedSlot> {
        self.slots.iter().filter(|s| s.name == name).collect()
    }

    pub fn has_slot(&self, name: &str, kind: SlotType, location: Address) -> bool {
        self.slots
            .iter()
            .any(|s| s.name == name && s.kind == kind && s.location == location)
    }
}

impl ClassWalkCallbacks for RecordingCallbacks {
    fn add_slot(
        &mut self,
        _owner: &ClassOwner,
        kind: SlotType,
        location: Address,
        name: &str,
        extra_info: Option<&str>,
    ) -> Result<(), FieldFault> {
        self.slots.push(RecordedSlot {
            kind,
            location,
            name: name.to_string(),
            extra_info: extra_info.map(String::from),
        });
        Ok(())
    }

    fn add_section(&mut self, _owner: &ClassOwner, start: Address, length: u64, name: &str, compute_padding: bool) {
        self.sections.push(RecordedSection {
            start,
            length,
            name: name.to_string(),
            compute_padding,
        });
    }
}
