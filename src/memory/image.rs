// Tue Oct 13 2026 - Alex

use crate::memory::{Address, MemoryError, MemoryRange, MemoryReader};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

enum SegmentData {
    Owned(Vec<u8>),
    Mapped(Arc<Mmap>),
}

impl SegmentData {
    fn bytes(&self) -> &[u8] {
        match self {
            SegmentData::Owned(data) => data,
            SegmentData::Mapped(mmap) => mmap.as_ref(),
        }
    }
}

pub struct Segment {
    range: MemoryRange,
    data: SegmentData,
}

impl Segment {
    pub fn range(&self) -> MemoryRange {
        self.range
    }

    fn slice(&self, addr: Address, len: usize) -> Option<&[u8]> {
        if !self.range.contains_range(addr, len as u64) {
            return None;
        }
        let start = self.range.start().bytes_until(addr) as usize;
        self.data.bytes().get(start..start + len)
    }
}

/// Sparse memory image assembled from dumped segments. Address ranges marked as
/// faulting reject every read that touches them.
pub struct ImageMemory {
    segments: Vec<Segment>,
    faults: Vec<MemoryRange>,
    pointer_size: usize,
}

impl ImageMemory {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
            faults: Vec::new(),
            pointer_size: 8,
        }
    }

    pub fn with_pointer_size(mut self, pointer_size: usize) -> Self {
        self.pointer_size = pointer_size;
        self
    }

    pub fn map_file<P: AsRef<Path>>(path: P, base: Address) -> Result<Self, MemoryError> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file) }?;
        let mut image = Self::new();
        image.push_segment(base, SegmentData::Mapped(Arc::new(mmap)));
        Ok(image)
    }

    pub fn add_segment(&mut self, base: Address, data: Vec<u8>) {
        self.push_segment(base, SegmentData::Owned(data));
    }

    pub fn add_fault(&mut self, range: MemoryRange) {
        self.faults.push(range);
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    fn push_segment(&mut self, base: Address, data: SegmentData) {
        let range = MemoryRange::from_start_size(base, data.bytes().len() as u64);
        log::debug!("mapped segment {} ({} bytes)", range, range.size());
        self.segments.push(Segment { range, data });
    }
}

impl Default for ImageMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryReader for ImageMemory {
    fn read_bytes(&self, addr: Address, len: usize) -> Result<Vec<u8>, MemoryError> {
        let wanted = MemoryRange::from_start_size(addr, len.max(1) as u64);
        if self.faults.iter().any(|fault| fault.overlaps(&wanted)) {
            return Err(MemoryError::Fault(addr.as_u64()));
        }
        self.segments
            .iter()
            .find_map(|segment| segment.slice(addr, len))
            .map(|bytes| bytes.to_vec())
            .ok_or(MemoryError::ReadFailed(addr.as_u64()))
    }

    fn pointer_size(&self) -> usize {
        self.pointer_size
    }
}
