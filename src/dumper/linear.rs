// Sat Oct 17 2026 - Alex

use crate::dumper::region::{layout_order, Region, RegionNode};
use crate::memory::{Address, MemoryReader};
use crate::walker::{ClassOwner, ClassWalkCallbacks, ClassWalker, FieldFault, SlotType, WalkError};
use std::sync::Arc;

pub const STRINGS_SECTION: &str = "UTF8";

struct OpenSection {
    node: RegionNode,
    end: Address,
    compute_padding: bool,
}

impl OpenSection {
    fn closes_with(&self, end: &Region) -> bool {
        self.node.region().is_some_and(|start| start.name() == end.name()) && Some(self.end) == end.address()
    }
}

/// Collects the slots and sections of one class walk and arranges them into a
/// padded region tree.
pub struct LinearDumper {
    reader: Arc<dyn MemoryReader>,
    grouped_sections: Vec<String>,
    regions: Vec<Region>,
    string_span: Option<(Address, Address)>,
}

impl LinearDumper {
    pub fn new(reader: Arc<dyn MemoryReader>) -> Self {
        Self {
            reader,
            grouped_sections: Vec::new(),
            regions: Vec::new(),
            string_span: None,
        }
    }

    pub fn with_grouped_sections(mut self, names: Vec<String>) -> Self {
        self.grouped_sections = names;
        self
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Lowest and highest address covered by strings seen so far.
    pub fn string_span(&self) -> Option<(Address, Address)> {
        self.string_span
    }

    /// Walks the class and returns its region tree. Collected state from any
    /// earlier walk is discarded first.
    pub fn gather_layout_info(&mut self, walker: &ClassWalker) -> Result<RegionNode, WalkError> {
        self.regions.clear();
        self.string_span = None;

        let owner = walker.owner()?;
        walker.all_slots_in_object_do(self)?;

        if let Some((start, end)) = self.string_span {
            self.add_section(&owner, start, start.bytes_until(end), STRINGS_SECTION, true);
        }
        self.group_sections(&owner);

        log::debug!("collected {} regions for class at {}", self.regions.len(), owner.address());
        Ok(self.build_tree(&owner))
    }

    fn push(&mut self, region: Region) {
        log::trace!("region {} '{}' at {:?} ({} bytes)", region.kind(), region.name(), region.address(), region.length());
        self.regions.push(region);
    }

    /// Checks that the string at `string` is readable and returns its padded
    /// size, or `None` when it lies outside the class.
    fn resolve_utf8(&self, owner: &ClassOwner, string: Address, name: &str) -> Result<Option<u64>, FieldFault> {
        let length = self.reader.read_u16(string)? as u64;
        let size = (2 + length + 1) & !1;
        if !owner.contains(string, size) {
            log::trace!("string '{}' at {} lies outside the class", name, string);
            return Ok(None);
        }
        self.reader.read_bytes(string, size as usize)?;
        Ok(Some(size))
    }

    fn record_utf8(&mut self, owner: &ClassOwner, string: Address, size: u64, name: &str) {
        let end = string + size;
        self.string_span = Some(match self.string_span {
            Some((low, high)) => (low.min(string), high.max(end)),
            None => (string, end),
        });
        self.push(Region::new(Some(string), SlotType::Utf8, name, None, size, owner.offset_of(string), true));
    }

    /// Resolves the string an SRP at `location` points to, without recording it.
    fn resolve_srp_utf8(&self, owner: &ClassOwner, location: Address, name: &str) -> Result<Option<(Address, u64)>, FieldFault> {
        let Some(string) = self.reader.read_srp(location)? else {
            return Ok(None);
        };
        Ok(self.resolve_utf8(owner, string, name)?.map(|size| (string, size)))
    }

    /// Wraps every run of a repeated section into one enclosing section named
    /// after it. Skipped when the wrapper would cut across another section.
    fn group_sections(&mut self, owner: &ClassOwner) {
        for name in self.grouped_sections.clone() {
            let members: Vec<(Address, Address)> = self
                .regions
                .iter()
                .filter(|r| r.kind() == SlotType::SectionStart && r.name() == name)
                .filter_map(|r| Some((r.address()?, r.end()?)))
                .collect();
            let (Some(start), Some(end)) = (
                members.iter().map(|&(s, _)| s).min(),
                members.iter().map(|&(_, e)| e).max(),
            ) else {
                continue;
            };

            let crosses = self
                .regions
                .iter()
                .filter(|r| r.kind() == SlotType::SectionStart && r.name() != name)
                .filter_map(|r| Some((r.address()?, r.end()?)))
                .any(|(s, e)| {
                    let overlaps = s < end && start < e;
                    let nested = (s <= start && end <= e) || (start <= s && e <= end);
                    overlaps && !nested
                });
            if crosses {
                log::debug!("not grouping '{}' sections: span {}-{} crosses another section", name, start, end);
                continue;
            }
            self.add_section(owner, start, start.bytes_until(end), &format!("{}s", name), true);
        }
    }

    /// Sorts the collected regions and drops a slot that covers the same bytes
    /// as the slot kept just before it. Sections are always kept.
    fn sorted_regions(&self) -> Vec<Region> {
        let mut sorted = self.regions.clone();
        sorted.sort_by(layout_order);

        let mut kept: Vec<Region> = Vec::with_capacity(sorted.len());
        let mut last_slot: Option<usize> = None;
        for region in sorted {
            if !region.is_section() {
                if let Some(previous) = last_slot.map(|i| &kept[i]) {
                    if previous.is_same_region(&region) {
                        log::trace!("dropping '{}', same bytes as '{}'", region.name(), previous.name());
                        continue;
                    }
                }
                last_slot = Some(kept.len());
            }
            kept.push(region);
        }
        kept
    }

    fn build_tree(&self, owner: &ClassOwner) -> RegionNode {
        let regions = self.sorted_regions();
        let root_pads = owner.length().is_some();

        let mut root = RegionNode::root();
        let mut open: Vec<OpenSection> = Vec::new();
        let mut cursor = regions
            .first()
            .and_then(Region::address)
            .map_or(owner.address(), |first| first.min(owner.address()));

        for region in regions {
            let Some(address) = region.address() else {
                log::warn!("skipping region '{}' with unreadable address", region.name());
                continue;
            };

            match region.kind() {
                SlotType::SectionStart => {
                    pad_gap(owner, &mut open, &mut root, root_pads, cursor, &region);
                    cursor = cursor.max(address);
                    open.push(OpenSection {
                        end: address + region.length(),
                        compute_padding: region.compute_padding(),
                        node: RegionNode::new(region),
                    });
                }
                SlotType::SectionEnd => {
                    let Some(depth) = open.iter().rposition(|s| s.closes_with(&region)) else {
                        log::warn!("section end '{}' at {} has no open start", region.name(), address);
                        continue;
                    };
                    while open.len() > depth + 1 {
                        if let Some(section) = open.pop() {
                            let name = section.node.region().map(|r| r.name().to_string()).unwrap_or_default();
                            log::warn!("section '{}' overlaps '{}', closing it early", name, region.name());
                            attach(&mut open, &mut root, section.node);
                        }
                    }
                    if let Some(mut section) = open.pop() {
                        if section.compute_padding && cursor < section.end {
                            section
                                .node
                                .push(RegionNode::new(Region::padding(cursor, cursor.bytes_until(section.end), owner.offset_of(cursor))));
                        }
                        cursor = cursor.max(section.end);
                        attach(&mut open, &mut root, section.node);
                    }
                }
                _ => {
                    pad_gap(owner, &mut open, &mut root, root_pads, cursor, &region);
                    if address < cursor {
                        log::warn!("slot '{}' at {} overlaps the previous region", region.name(), address);
                    }
                    if let Some(end) = region.end() {
                        cursor = cursor.max(end);
                    }
                    attach(&mut open, &mut root, RegionNode::new(region));
                }
            }
        }

        while let Some(section) = open.pop() {
            let name = section.node.region().map(|r| r.name().to_string()).unwrap_or_default();
            log::warn!("section '{}' was never closed", name);
            attach(&mut open, &mut root, section.node);
        }

        if let Some(end) = owner.end() {
            if cursor < end {
                let padding = Region::padding(cursor, cursor.bytes_until(end), owner.offset_of(cursor));
                let out_of_order = root
                    .children()
                    .last()
                    .and_then(|last| last.region())
                    .and_then(Region::address)
                    .is_some_and(|last| last > cursor);
                root.push(RegionNode::new(padding));
                if out_of_order {
                    root.sort_children();
                }
            }
        }
        root
    }
}

fn attach(open: &mut [OpenSection], root: &mut RegionNode, node: RegionNode) {
    match open.last_mut() {
        Some(parent) => parent.node.push(node),
        None => root.push(node),
    }
}

/// Inserts padding between `cursor` and the start of `region` when both the
/// enclosing container and the region ask for it.
fn pad_gap(
    owner: &ClassOwner,
    open: &mut [OpenSection],
    root: &mut RegionNode,
    root_pads: bool,
    cursor: Address,
    region: &Region,
) {
    let Some(address) = region.address() else {
        return;
    };
    let container_pads = open.last().map_or(root_pads, |s| s.compute_padding);
    if cursor < address && container_pads && region.compute_padding() {
        let padding = Region::padding(cursor, cursor.bytes_until(address), owner.offset_of(cursor));
        attach(open, root, RegionNode::new(padding));
    }
}

impl ClassWalkCallbacks for LinearDumper {
    fn add_slot(
        &mut self,
        owner: &ClassOwner,
        kind: SlotType,
        location: Address,
        name: &str,
        extra_info: Option<&str>,
    ) -> Result<(), FieldFault> {
        let offset = owner.offset_of(location);
        match kind {
            SlotType::RomUtf8 | SlotType::SrpUtf8 => {
                let string = self.resolve_srp_utf8(owner, location, name)?;
                self.push(Region::new(Some(location), SlotType::SrpUtf8, name, extra_info, 4, offset, true));
                if let Some((string, size)) = string {
                    self.record_utf8(owner, string, size, name);
                }
            }
            SlotType::SrpNas => {
                // Both strings must resolve before any region is recorded.
                let mut strings = Vec::with_capacity(2);
                if let Some(nas) = self.reader.read_srp(location)? {
                    for (word, label) in [(nas, "name"), (nas + 4, "signature")] {
                        if let Some((string, size)) = self.resolve_srp_utf8(owner, word, label)? {
                            strings.push((string, size, label));
                        }
                    }
                }
                for (string, size, label) in strings {
                    self.record_utf8(owner, string, size, label);
                }
                self.push(Region::new(Some(location), kind, name, extra_info, 4, offset, true));
            }
            SlotType::IntermediateClassData => {
                let length = owner.intermediate_data_length();
                self.reader.read_bytes(location, length as usize)?;
                self.push(Region::new(Some(location), kind, name, extra_info, length, offset, true));
            }
            SlotType::SectionStart | SlotType::SectionEnd | SlotType::Padding | SlotType::Utf8 => {
                return Err(FieldFault::UnsupportedKind(kind));
            }
            _ => {
                let length = kind
                    .fixed_size(self.reader.pointer_size())
                    .ok_or(FieldFault::UnsupportedKind(kind))?;
                self.reader.read_bytes(location, length as usize)?;
                self.push(Region::new(Some(location), kind, name, extra_info, length, offset, true));
            }
        }
        Ok(())
    }

    fn add_section(&mut self, owner: &ClassOwner, start: Address, length: u64, name: &str, compute_padding: bool) {
        if length == 0 {
            return;
        }
        let offset = owner.offset_of(start);
        self.push(Region::new(Some(start), SlotType::SectionStart, name, None, length, offset, compute_padding));
        self.push(Region::new(
            Some(start + length),
            SlotType::SectionEnd,
            name,
            None,
            length,
            offset + length as i64,
            compute_padding,
        ));
    }
}
