// Tue Oct 13 2026 - Alex

use crate::catalog::{FieldDescriptor, StructureDescriptor};
use serde::{Deserialize, Serialize};

/// On-disk form of a structure catalog, as exported next to a core file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaFile {
    pub structures: Vec<StructureSchema>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureSchema {
    pub name: String,
    pub size: u64,
    pub fields: Vec<FieldDescriptor>,
}

impl StructureSchema {
    pub fn to_descriptor(&self) -> StructureDescriptor {
        let mut descriptor = StructureDescriptor::new(&self.name, self.size);
        for field in &self.fields {
            descriptor.add_field(field.clone());
        }
        descriptor
    }
}

type FieldRow = (&'static str, u64, &'static str);

// Layouts for a 64-bit little-endian VM with compressed self-relative pointers.
static BUILTIN_STRUCTURES: &[(&str, u64, &[FieldRow])] = &[
    (
        "J9ROMClass",
        168,
        &[
            ("romSize", 0, "U32"),
            ("singleScalarStaticCount", 4, "U32"),
            ("className", 8, "J9SRP(J9UTF8)"),
            ("superclassName", 12, "J9SRP(J9UTF8)"),
            ("modifiers", 16, "U32"),
            ("extraModifiers", 20, "U32"),
            ("interfaceCount", 24, "U32"),
            ("interfaces", 28, "J9SRP(J9SRP(J9UTF8))"),
            ("romMethodCount", 32, "U32"),
            ("romMethods", 36, "J9SRP(J9ROMMethod)"),
            ("romFieldCount", 40, "U32"),
            ("romFields", 44, "J9SRP(J9ROMFieldShape)"),
            ("objectStaticCount", 48, "U32"),
            ("doubleScalarStaticCount", 52, "U32"),
            ("ramConstantPoolCount", 56, "U32"),
            ("romConstantPoolCount", 60, "U32"),
            ("intermediateClassData", 64, "J9WSRP(U8)"),
            ("intermediateClassDataLength", 72, "U32"),
            ("instanceShape", 76, "U32"),
            ("cpShapeDescription", 80, "J9SRP(U32)"),
            ("outerClassName", 84, "J9SRP(J9UTF8)"),
            ("memberAccessFlags", 88, "U32"),
            ("innerClassCount", 92, "U32"),
            ("innerClasses", 96, "J9SRP(J9SRP(J9UTF8))"),
            ("enclosedInnerClassCount", 100, "U32"),
            ("enclosedInnerClasses", 104, "J9SRP(J9SRP(J9UTF8))"),
            ("majorVersion", 108, "U16"),
            ("minorVersion", 110, "U16"),
            ("optionalFlags", 112, "U32"),
            ("optionalInfo", 116, "J9SRP(U32)"),
            ("maxBranchCount", 120, "U32"),
            ("invokeCacheCount", 124, "U32"),
            ("methodTypeCount", 128, "U32"),
            ("varHandleMethodTypeCount", 132, "U32"),
            ("bsmCount", 136, "U32"),
            ("callSiteCount", 140, "U32"),
            ("callSiteData", 144, "J9SRP(U8)"),
            ("staticSplitMethodRefCount", 148, "U16"),
            ("specialSplitMethodRefCount", 150, "U16"),
            ("staticSplitMethodRefIndexes", 152, "J9SRP(U16)"),
            ("specialSplitMethodRefIndexes", 156, "J9SRP(U16)"),
            ("varHandleMethodTypeLookupTable", 160, "J9SRP(U16)"),
        ],
    ),
    (
        "J9ROMArrayClass",
        88,
        &[
            ("romSize", 0, "U32"),
            ("singleScalarStaticCount", 4, "U32"),
            ("className", 8, "J9SRP(J9UTF8)"),
            ("superclassName", 12, "J9SRP(J9UTF8)"),
            ("modifiers", 16, "U32"),
            ("extraModifiers", 20, "U32"),
            ("interfaceCount", 24, "U32"),
            ("interfaces", 28, "J9SRP(J9SRP(J9UTF8))"),
            ("romMethodCount", 32, "U32"),
            ("romMethods", 36, "J9SRP(J9ROMMethod)"),
            ("romFieldCount", 40, "U32"),
            ("romFields", 44, "J9SRP(J9ROMFieldShape)"),
            ("objectStaticCount", 48, "U32"),
            ("doubleScalarStaticCount", 52, "U32"),
            ("ramConstantPoolCount", 56, "U32"),
            ("romConstantPoolCount", 60, "U32"),
            ("intermediateClassData", 64, "J9WSRP(U8)"),
            ("intermediateClassDataLength", 72, "U32"),
            ("instanceShape", 76, "U32"),
            ("arrayShape", 80, "U32"),
        ],
    ),
    (
        "J9ROMMethod",
        20,
        &[
            ("name", 0, "J9SRP(J9UTF8)"),
            ("signature", 4, "J9SRP(J9UTF8)"),
            ("modifiers", 8, "U32"),
            ("maxStack", 12, "U16"),
            ("bytecodeSizeLow", 14, "U16"),
            ("bytecodeSizeHigh", 16, "U8"),
            ("argCount", 17, "U8"),
            ("tempCount", 18, "U16"),
        ],
    ),
    (
        "J9ROMFieldShape",
        12,
        &[
            ("name", 0, "J9SRP(J9UTF8)"),
            ("signature", 4, "J9SRP(J9UTF8)"),
            ("modifiers", 8, "U32"),
        ],
    ),
    (
        "J9ROMNameAndSignature",
        8,
        &[("name", 0, "J9SRP(J9UTF8)"), ("signature", 4, "J9SRP(J9UTF8)")],
    ),
    (
        "J9ExceptionInfo",
        4,
        &[("catchCount", 0, "U16"), ("throwCount", 2, "U16")],
    ),
    (
        "J9ExceptionHandler",
        16,
        &[
            ("startPC", 0, "U32"),
            ("endPC", 4, "U32"),
            ("handlerPC", 8, "U32"),
            ("exceptionClassIndex", 12, "U32"),
        ],
    ),
    (
        "J9MethodDebugInfo",
        12,
        &[
            ("srpToVarInfo", 0, "U32"),
            ("lineNumberCount", 4, "U32"),
            ("varInfoCount", 8, "U32"),
        ],
    ),
    (
        "J9EnclosingObject",
        8,
        &[
            ("classRefCPIndex", 0, "U32"),
            ("nameAndSignature", 4, "J9SRP(J9ROMNameAndSignature)"),
        ],
    ),
    ("J9SourceDebugExtension", 4, &[("size", 0, "U32")]),
    (
        "J9ROMRecordComponentShape",
        12,
        &[
            ("name", 0, "J9SRP(J9UTF8)"),
            ("signature", 4, "J9SRP(J9UTF8)"),
            ("attributeFlags", 8, "U32"),
        ],
    ),
    ("J9MethodParametersData", 1, &[("parameterCount", 0, "U8")]),
    (
        "J9MethodParameter",
        6,
        &[("name", 0, "J9SRP(J9UTF8)"), ("flags", 4, "U16")],
    ),
    (
        "J9ROMConstantPoolItem",
        8,
        &[("slot1", 0, "U32"), ("slot2", 4, "U32")],
    ),
    (
        "J9ROMStringRef",
        8,
        &[("utf8Data", 0, "J9SRP(J9UTF8)"), ("cpType", 4, "U32")],
    ),
    (
        "J9ROMSingleSlotConstantRef",
        8,
        &[("data", 0, "U32"), ("cpType", 4, "U32")],
    ),
    (
        "J9ROMConstantRef",
        8,
        &[("slot1", 0, "U32"), ("slot2", 4, "U32")],
    ),
    (
        "J9ROMFieldRef",
        8,
        &[
            ("classRefCPIndex", 0, "U32"),
            ("nameAndSignature", 4, "J9SRP(J9ROMNameAndSignature)"),
        ],
    ),
    (
        "J9ROMMethodRef",
        8,
        &[
            ("classRefCPIndex", 0, "U32"),
            ("nameAndSignature", 4, "J9SRP(J9ROMNameAndSignature)"),
        ],
    ),
    (
        "J9ROMMethodTypeRef",
        8,
        &[("signature", 0, "J9SRP(J9UTF8)"), ("cpType", 4, "U32")],
    ),
    (
        "J9ROMMethodHandleRef",
        8,
        &[
            ("methodOrFieldRefIndex", 0, "U32"),
            ("handleTypeAndCpType", 4, "U32"),
        ],
    ),
    (
        "J9ROMConstantDynamicRef",
        8,
        &[
            ("nameAndSignature", 0, "J9SRP(J9ROMNameAndSignature)"),
            ("bsmIndexAndCpType", 4, "U32"),
        ],
    ),
    (
        "J9Class",
        232,
        &[
            ("eyecatcher", 0, "UDATA"),
            ("romClass", 8, "J9ROMClass*"),
            ("superclasses", 16, "J9Class**"),
            ("classDepthAndFlags", 24, "UDATA"),
            ("classLoader", 32, "J9ClassLoader*"),
            ("classObject", 40, "j9object_t"),
            ("initializeStatus", 48, "UDATA"),
            ("ramMethods", 56, "J9Method*"),
            ("ramStatics", 64, "UDATA*"),
            ("arrayClass", 72, "J9Class*"),
            ("totalInstanceSize", 80, "UDATA"),
            ("instanceDescription", 88, "UDATA*"),
            ("packageID", 96, "UDATA"),
            ("subclassTraversalLink", 104, "J9Class*"),
            ("subclassTraversalReverseLink", 112, "J9Class*"),
            ("iTable", 120, "J9ITable*"),
            ("castClassCache", 128, "UDATA"),
            ("instanceofClassCache", 136, "UDATA"),
            ("initializerCache", 144, "J9Method*"),
            ("lastITable", 152, "J9ITable*"),
            ("ramConstantPool", 160, "UDATA*"),
            ("callSites", 168, "j9object_t*"),
            ("methodTypes", 176, "j9object_t*"),
            ("varHandleMethodTypes", 184, "j9object_t*"),
            ("staticSplitMethodTable", 192, "J9Method**"),
            ("specialSplitMethodTable", 200, "J9Method**"),
            ("replacedClass", 208, "J9Class*"),
            ("hostClass", 216, "J9Class*"),
            ("classFlags", 224, "U32"),
        ],
    ),
    (
        "J9VTableHeader",
        24,
        &[
            ("size", 0, "UDATA"),
            ("initialVirtualMethod", 8, "J9Method*"),
            ("invokePrivateMethod", 16, "J9Method*"),
        ],
    ),
    (
        "J9Method",
        32,
        &[
            ("bytecodes", 0, "U8*"),
            ("constantPool", 8, "J9ConstantPool*"),
            ("methodRunAddress", 16, "void*"),
            ("extra", 24, "void*"),
        ],
    ),
    (
        "J9ITable",
        24,
        &[
            ("interfaceClass", 0, "J9Class*"),
            ("depth", 8, "UDATA"),
            ("next", 16, "J9ITable*"),
        ],
    ),
    (
        "J9RAMConstantPoolItem",
        16,
        &[("slot1", 0, "UDATA"), ("slot2", 8, "UDATA")],
    ),
    (
        "J9RAMClassRef",
        16,
        &[("value", 0, "J9Class*"), ("modifiers", 8, "UDATA")],
    ),
    (
        "J9RAMStringRef",
        16,
        &[("stringObject", 0, "j9object_t"), ("unused", 8, "UDATA")],
    ),
    (
        "J9RAMConstantRef",
        16,
        &[("slot1", 0, "UDATA"), ("slot2", 8, "UDATA")],
    ),
    (
        "J9RAMFieldRef",
        16,
        &[("valueOffset", 0, "UDATA"), ("flagsAndClass", 8, "IDATA")],
    ),
    (
        "J9RAMStaticMethodRef",
        16,
        &[("method", 0, "J9Method*"), ("methodIndexAndArgCount", 8, "UDATA")],
    ),
    (
        "J9RAMSpecialMethodRef",
        16,
        &[("method", 0, "J9Method*"), ("methodIndexAndArgCount", 8, "UDATA")],
    ),
    (
        "J9RAMVirtualMethodRef",
        16,
        &[("methodIndexAndArgCount", 0, "UDATA"), ("method", 8, "J9Method*")],
    ),
    (
        "J9RAMInterfaceMethodRef",
        16,
        &[("methodIndexAndArgCount", 0, "UDATA"), ("interfaceClass", 8, "J9Class*")],
    ),
    (
        "J9RAMMethodTypeRef",
        16,
        &[("type", 0, "j9object_t"), ("slotCount", 8, "UDATA")],
    ),
    (
        "J9RAMMethodHandleRef",
        16,
        &[("methodHandle", 0, "j9object_t"), ("unused", 8, "UDATA")],
    ),
    (
        "J9RAMConstantDynamicRef",
        16,
        &[("value", 0, "j9object_t"), ("exception", 8, "j9object_t")],
    ),
];

pub fn builtin_schema() -> SchemaFile {
    let structures = BUILTIN_STRUCTURES
        .iter()
        .map(|(name, size, fields)| StructureSchema {
            name: name.to_string(),
            size: *size,
            fields: fields
                .iter()
                .map(|(field, offset, type_name)| FieldDescriptor::new(field, *offset, type_name))
                .collect(),
        })
        .collect();
    SchemaFile { structures }
}
