// Sat Oct 17 2026 - Alex

use crate::dumper::format::{detail_line, section_end_banner, section_start_banner};
use crate::dumper::region::{Region, RegionNode};
use crate::memory::{Address, MemoryError};
use crate::walker::{RamClassWalker, RomClassWalker, SlotType, WalkContext};
use std::fmt::Write;

const UNREADABLE: &str = "<unreadable>";

fn pointer_arrow(target: Option<Address>) -> String {
    match target {
        Some(target) => format!("-> 0x{:x}", target),
        None => "NULL".to_string(),
    }
}

/// Prints a region tree as a listing. Sections above the nesting threshold get
/// start and end banners with their contents indented below them; deeper
/// sections are printed as a single line.
pub struct RegionPrinter {
    cx: WalkContext,
    nesting_threshold: usize,
}

impl RegionPrinter {
    pub fn new(cx: WalkContext) -> Self {
        Self { cx, nesting_threshold: 1 }
    }

    pub fn with_nesting_threshold(mut self, nesting_threshold: usize) -> Self {
        self.nesting_threshold = nesting_threshold;
        self
    }

    pub fn render(&self, root: &RegionNode) -> String {
        let mut out = String::new();
        self.render_children(root, 0, &mut out);
        out
    }

    fn render_children(&self, node: &RegionNode, depth: usize, out: &mut String) {
        for child in node.children() {
            let Some(region) = child.region() else {
                continue;
            };
            if region.kind() == SlotType::SectionStart && depth < self.nesting_threshold && !child.children().is_empty() {
                let _ = writeln!(out, "{}", section_start_banner(region.name(), region.length()));
                self.render_children(child, depth + 1, out);
                let _ = writeln!(out, "{}", section_end_banner(region.name()));
            } else {
                let _ = writeln!(out, "{}", self.line(region));
            }
        }
    }

    pub fn line(&self, region: &Region) -> String {
        match region.address() {
            Some(start) => detail_line(
                start,
                start + region.length(),
                &self.value(region, start),
                region.name(),
                &self.detail(region, start),
            ),
            None => format!("{} [ {} ]", UNREADABLE, region.name()),
        }
    }

    fn value(&self, region: &Region, at: Address) -> String {
        let reader = self.cx.reader();
        let value: Result<String, MemoryError> = match region.kind() {
            SlotType::SectionStart | SlotType::SectionEnd | SlotType::Padding | SlotType::IntermediateClassData => {
                Ok(format!("{} bytes", region.length()))
            }
            SlotType::U8 => reader.read_u8(at).map(|v| format!("0x{:x}", v)),
            SlotType::U16 => reader.read_u16(at).map(|v| format!("0x{:x}", v)),
            SlotType::U32 => reader.read_u32(at).map(|v| format!("0x{:x}", v)),
            SlotType::U64 => reader.read_u64(at).map(|v| format!("0x{:x}", v)),
            SlotType::Udata => reader.read_udata(at).map(|v| format!("0x{:x}", v)),
            SlotType::I32 => reader.read_i32(at).map(|v| v.to_string()),
            SlotType::I64 => reader.read_i64(at).map(|v| v.to_string()),
            SlotType::Idata => reader.read_idata(at).map(|v| v.to_string()),
            SlotType::Srp | SlotType::RomUtf8 | SlotType::SrpUtf8 | SlotType::SrpNas => {
                reader.read_srp(at).map(pointer_arrow)
            }
            SlotType::Wsrp => reader.read_wsrp(at).map(pointer_arrow),
            SlotType::Utf8 => reader.read_utf8(at),
        };
        value.unwrap_or_else(|_| UNREADABLE.to_string())
    }

    fn detail(&self, region: &Region, at: Address) -> String {
        let reader = self.cx.reader();
        match region.kind() {
            SlotType::SrpUtf8 | SlotType::RomUtf8 => reader
                .read_srp(at)
                .ok()
                .flatten()
                .and_then(|target| reader.read_utf8(target).ok())
                .unwrap_or_default(),
            SlotType::SrpNas => {
                let Ok(Some(nas)) = reader.read_srp(at) else {
                    return String::new();
                };
                let part = |offset: u64| {
                    reader
                        .read_srp(nas + offset)
                        .ok()
                        .flatten()
                        .and_then(|target| reader.read_utf8(target).ok())
                        .unwrap_or_default()
                };
                format!("{} {}", part(0), part(4))
            }
            SlotType::Udata => match region.extra_info() {
                Some(hint) if hint.starts_with('!') => self.resolve_hint(hint, at),
                Some(info) => info.to_string(),
                None => String::new(),
            },
            _ => region.extra_info().unwrap_or_default().to_string(),
        }
    }

    /// Renders a `!j9...` cross-reference, naming the class when the pointer
    /// leads to one.
    fn resolve_hint(&self, hint: &str, at: Address) -> String {
        let target = match self.cx.reader().read_ptr(at) {
            Ok(target) if !target.is_null() => target,
            _ => return String::new(),
        };
        let name = match hint {
            "!j9class" => RamClassWalker::new(self.cx.clone(), target).class_name().ok(),
            "!j9romclass" => RomClassWalker::new(self.cx.clone(), target).class_name().ok(),
            _ => None,
        };
        match name {
            Some(name) => format!("{} 0x{:x} // {}", hint, target, name),
            None => format!("{} 0x{:x}", hint, target),
        }
    }
}
