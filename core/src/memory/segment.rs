/// Index of a handler registered with a [`MemoryMapBuilder`](super::MemoryMapBuilder).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandlerId(pub usize);

/// Index of a segment in map order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SegmentId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentKind {
    Ram,
    Rom,
    Device(HandlerId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemorySegment {
    pub base: u16,
    pub length: usize,
    pub kind: SegmentKind,
}

impl MemorySegment {
    pub fn new(base: u16, length: usize, kind: SegmentKind) -> Self {
        Self { base, length, kind }
    }

    /// One past the last address, as a `usize` so 0x10000 is representable.
    pub fn end(&self) -> usize {
        self.base as usize + self.length
    }

    pub fn contains(&self, addr: u16) -> bool {
        (addr as usize) >= self.base as usize && (addr as usize) < self.end()
    }

    pub fn is_writeable(&self) -> bool {
        !matches!(self.kind, SegmentKind::Rom)
    }
}
