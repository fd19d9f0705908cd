// Sat Oct 17 2026 - Alex

use crate::memory::Address;
use crate::walker::SlotType;
use std::cmp::Ordering;

pub const PADDING_NAME: &str = "padding";

/// One reportable piece of a class layout: a typed slot, one end of a named
/// section, or synthesized padding. A region whose address could not be
/// determined is corrupt and has no address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    address: Option<Address>,
    kind: SlotType,
    name: String,
    extra_info: Option<String>,
    length: u64,
    offset: i64,
    compute_padding: bool,
}

impl Region {
    pub fn new(
        address: Option<Address>,
        kind: SlotType,
        name: &str,
        extra_info: Option<&str>,
        length: u64,
        offset: i64,
        compute_padding: bool,
    ) -> Self {
        Self {
            address,
            kind,
            name: name.to_string(),
            extra_info: extra_info.map(String::from),
            length,
            offset,
            compute_padding,
        }
    }

    pub fn padding(address: Address, length: u64, offset: i64) -> Self {
        Self::new(Some(address), SlotType::Padding, PADDING_NAME, None, length, offset, true)
    }

    pub fn address(&self) -> Option<Address> {
        self.address
    }

    pub fn kind(&self) -> SlotType {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn extra_info(&self) -> Option<&str> {
        self.extra_info.as_deref()
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn compute_padding(&self) -> bool {
        self.compute_padding
    }

    pub fn end(&self) -> Option<Address> {
        self.address.map(|a| a + self.length)
    }

    pub fn is_section(&self) -> bool {
        self.kind.is_section()
    }

    pub fn is_corrupt(&self) -> bool {
        self.address.is_none()
    }

    /// Two regions cover the same bytes when offset and length agree. The kind
    /// is deliberately ignored.
    pub fn is_same_region(&self, other: &Region) -> bool {
        self.offset == other.offset && self.length == other.length
    }
}

/// Total order used before building the region tree: address, then kind
/// precedence, then for section markers the nesting tie-breaks. Outer sections
/// open first and close last. Corrupt regions sort after everything else.
pub fn layout_order(a: &Region, b: &Region) -> Ordering {
    let by_address = match (a.address, b.address) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_address.then_with(|| a.kind.cmp(&b.kind)).then_with(|| match (a.kind, b.kind) {
        (SlotType::SectionStart, SlotType::SectionStart) => b
            .length
            .cmp(&a.length)
            .then_with(|| b.name.len().cmp(&a.name.len())),
        (SlotType::SectionEnd, SlotType::SectionEnd) => a
            .length
            .cmp(&b.length)
            .then_with(|| a.name.len().cmp(&b.name.len())),
        _ => Ordering::Equal,
    })
}

/// A node of the region tree. The root carries no region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionNode {
    region: Option<Region>,
    children: Vec<RegionNode>,
}

impl RegionNode {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(region: Region) -> Self {
        Self {
            region: Some(region),
            children: Vec::new(),
        }
    }

    pub fn region(&self) -> Option<&Region> {
        self.region.as_ref()
    }

    pub fn children(&self) -> &[RegionNode] {
        &self.children
    }

    pub fn push(&mut self, child: RegionNode) {
        self.children.push(child);
    }

    pub fn is_section(&self) -> bool {
        self.region.as_ref().is_some_and(Region::is_section)
    }

    pub fn sort_children(&mut self) {
        self.children.sort_by(|a, b| match (&a.region, &b.region) {
            (Some(x), Some(y)) => layout_order(x, y),
            _ => Ordering::Equal,
        });
    }

    /// Leaf regions below this node, in tree order.
    pub fn leaves(&self) -> Vec<&Region> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a Region>) {
        for child in &self.children {
            match &child.region {
                Some(region) if !region.is_section() => leaves.push(region),
                _ => child.collect_leaves(leaves),
            }
        }
    }
}
