// Wed Oct 14 2026 - Alex

use crate::catalog::{CatalogError, FieldDescriptor};
use crate::walker::SlotType;

/// How a catalog field is emitted as a slot: its kind plus an optional
/// debugger-command hint for pointer fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    pub kind: SlotType,
    pub hint: Option<String>,
}

impl ResolvedField {
    fn plain(kind: SlotType) -> Self {
        Self { kind, hint: None }
    }
}

fn scalar_kind(type_name: &str) -> Option<SlotType> {
    let kind = match type_name {
        "U8" | "I8" | "bool" => SlotType::U8,
        "U16" | "I16" => SlotType::U16,
        "U32" => SlotType::U32,
        "I32" => SlotType::I32,
        "U64" => SlotType::U64,
        "I64" => SlotType::I64,
        "UDATA" => SlotType::Udata,
        "IDATA" => SlotType::Idata,
        _ => return None,
    };
    Some(kind)
}

fn pointer_hint(pointee: &str, depth: usize) -> Option<String> {
    if depth == 0 && pointee == "j9object_t" {
        return Some("!j9object".to_string());
    }
    (depth == 1 && pointee.starts_with("J9")).then(|| format!("!{}", pointee.to_lowercase()))
}

/// Maps a catalog type string onto a slot kind.
///
/// `J9SRP(J9UTF8)` becomes a string reference, `J9SRP(J9ROMNameAndSignature)` a
/// name-and-signature reference, other `J9SRP(..)`/`J9WSRP(..)` plain relative
/// pointers, and every `T*` or `j9object_t` a pointer-sized word.
pub fn resolve_field_type(structure: &str, field: &FieldDescriptor) -> Result<ResolvedField, CatalogError> {
    let type_name = field.type_name.trim();

    if let Some(kind) = scalar_kind(type_name) {
        return Ok(ResolvedField::plain(kind));
    }

    if let Some(inner) = type_name.strip_prefix("J9SRP(").and_then(|t| t.strip_suffix(')')) {
        let kind = match inner {
            "J9UTF8" => SlotType::RomUtf8,
            "J9ROMNameAndSignature" => SlotType::SrpNas,
            _ => SlotType::Srp,
        };
        return Ok(ResolvedField::plain(kind));
    }

    if type_name.starts_with("J9WSRP(") && type_name.ends_with(')') {
        return Ok(ResolvedField::plain(SlotType::Wsrp));
    }

    let pointee = type_name.trim_end_matches('*').trim();
    let depth = type_name.len() - type_name.trim_end_matches('*').len();
    if depth > 0 || pointee == "j9object_t" {
        return Ok(ResolvedField {
            kind: SlotType::Udata,
            hint: pointer_hint(pointee, depth),
        });
    }

    Err(CatalogError::UnknownFieldType {
        structure: structure.to_string(),
        field: field.name.clone(),
        type_name: field.type_name.clone(),
    })
}
