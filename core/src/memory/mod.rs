//! 64K address-space classification.
//!
//! A [`MemoryMap`] is an ordered list of segments, each RAM, ROM or a device
//! handler. Every single byte access looks its segment up again, so a
//! segment reclassified with [`MemoryMap::set_kind`] takes effect between
//! the two halves of a word access.

mod segment;

pub use segment::{HandlerId, MemorySegment, SegmentId, SegmentKind};

use thiserror::Error;
use tracing::debug;

use crate::core::bus::{self, Bus, Endian};
use crate::device::DeviceHandler;

/// Size of the address space every map covers.
pub const ADDRESS_SPACE: usize = 0x1_0000;

const UNMAPPED: u32 = u32::MAX;

/// Configuration errors, reported before any CPU runs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("segment at {base:#06x} has zero length")]
    Empty { base: u16 },

    #[error("segment at {base:#06x} with length {length:#x} extends past the 64K address space")]
    OutOfRange { base: u16, length: usize },

    #[error("segment at {base:#06x} overlaps segment at {other:#06x}")]
    Overlap { base: u16, other: u16 },

    #[error("segment at {base:#06x} refers to unregistered device handler {handler}")]
    UnknownHandler { base: u16, handler: usize },

    #[error("no segment with index {0}")]
    NoSuchSegment(usize),
}

/// Collects segments and handlers, then validates them in [`build`](Self::build).
#[derive(Default)]
pub struct MemoryMapBuilder {
    segments: Vec<MemorySegment>,
    handlers: Vec<Box<dyn DeviceHandler>>,
    io: Option<Box<dyn DeviceHandler>>,
}

impl MemoryMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ram(&mut self, base: u16, length: usize) -> &mut Self {
        self.segment(MemorySegment::new(base, length, SegmentKind::Ram))
    }

    pub fn rom(&mut self, base: u16, length: usize) -> &mut Self {
        self.segment(MemorySegment::new(base, length, SegmentKind::Rom))
    }

    pub fn device(&mut self, base: u16, length: usize, handler: HandlerId) -> &mut Self {
        self.segment(MemorySegment::new(base, length, SegmentKind::Device(handler)))
    }

    pub fn segment(&mut self, segment: MemorySegment) -> &mut Self {
        self.segments.push(segment);
        self
    }

    /// Register a device handler; map it with [`device`](Self::device).
    pub fn handler(&mut self, handler: impl DeviceHandler + 'static) -> HandlerId {
        self.handlers.push(Box::new(handler));
        HandlerId(self.handlers.len() - 1)
    }

    /// Handler for the separate Z80 I/O port space.
    pub fn io_handler(&mut self, handler: impl DeviceHandler + 'static) -> &mut Self {
        self.io = Some(Box::new(handler));
        self
    }

    pub fn build(self) -> Result<MemoryMap, MemoryError> {
        let mut lookup = vec![UNMAPPED; ADDRESS_SPACE].into_boxed_slice();
        for (i, seg) in self.segments.iter().enumerate() {
            if seg.length == 0 {
                return Err(MemoryError::Empty { base: seg.base });
            }
            if seg.end() > ADDRESS_SPACE {
                return Err(MemoryError::OutOfRange {
                    base: seg.base,
                    length: seg.length,
                });
            }
            if let SegmentKind::Device(HandlerId(h)) = seg.kind
                && h >= self.handlers.len()
            {
                return Err(MemoryError::UnknownHandler {
                    base: seg.base,
                    handler: h,
                });
            }
            let range = &mut lookup[seg.base as usize..seg.end()];
            if let Some(&taken) = range.iter().find(|&&slot| slot != UNMAPPED) {
                return Err(MemoryError::Overlap {
                    base: seg.base,
                    other: self.segments[taken as usize].base,
                });
            }
            range.fill(i as u32);
        }

        debug!(
            segments = self.segments.len(),
            handlers = self.handlers.len(),
            "memory map built"
        );

        Ok(MemoryMap {
            segments: self.segments,
            lookup,
            storage: vec![0; ADDRESS_SPACE].into_boxed_slice(),
            handlers: self.handlers,
            io: self.io,
            dirty: false,
        })
    }
}

/// Byte-addressable 64K space routed to RAM, ROM or device handlers.
pub struct MemoryMap {
    segments: Vec<MemorySegment>,
    lookup: Box<[u32]>,
    storage: Box<[u8]>,
    handlers: Vec<Box<dyn DeviceHandler>>,
    io: Option<Box<dyn DeviceHandler>>,
    dirty: bool,
}

impl MemoryMap {
    pub fn builder() -> MemoryMapBuilder {
        MemoryMapBuilder::new()
    }

    /// One writeable segment covering the whole address space.
    pub fn flat_ram() -> Self {
        let mut builder = MemoryMapBuilder::new();
        builder.ram(0, ADDRESS_SPACE);
        match builder.build() {
            Ok(map) => map,
            Err(e) => unreachable!("full-range RAM segment is always valid: {e}"),
        }
    }

    #[inline]
    fn resolve(&self, addr: u16) -> Option<usize> {
        match self.lookup[addr as usize] {
            UNMAPPED => None,
            i => Some(i as usize),
        }
    }

    pub fn read_byte(&mut self, addr: u16) -> u8 {
        let Some(i) = self.resolve(addr) else {
            return 0;
        };
        match self.segments[i].kind {
            SegmentKind::Ram | SegmentKind::Rom => self.storage[addr as usize],
            SegmentKind::Device(HandlerId(h)) => self.handlers[h].read(addr),
        }
    }

    pub fn write_byte(&mut self, addr: u16, data: u8) {
        let Some(i) = self.resolve(addr) else {
            return;
        };
        match self.segments[i].kind {
            SegmentKind::Ram => {
                self.storage[addr as usize] = data;
                self.dirty = true;
            }
            SegmentKind::Rom => {}
            SegmentKind::Device(HandlerId(h)) => self.handlers[h].write(addr, data),
        }
    }

    pub fn read_word(&mut self, addr: u16, endian: Endian) -> u16 {
        bus::read_word(self, addr, endian)
    }

    pub fn write_word(&mut self, addr: u16, data: u16, endian: Endian) {
        bus::write_word(self, addr, data, endian)
    }

    /// Read without device side effects.
    pub fn peek(&self, addr: u16) -> u8 {
        let Some(i) = self.resolve(addr) else {
            return 0;
        };
        match self.segments[i].kind {
            SegmentKind::Ram | SegmentKind::Rom => self.storage[addr as usize],
            SegmentKind::Device(HandlerId(h)) => self.handlers[h].peek(addr),
        }
    }

    /// Copy an image into backing storage, ignoring segment kinds.
    /// Addresses wrap at the top of memory.
    pub fn load(&mut self, addr: u16, data: &[u8]) {
        for (i, &byte) in data.iter().enumerate() {
            let a = addr.wrapping_add(i as u16) as usize;
            self.storage[a] = byte;
        }
    }

    pub fn segments(&self) -> &[MemorySegment] {
        &self.segments
    }

    pub fn segment_at(&self, addr: u16) -> Option<SegmentId> {
        self.resolve(addr).map(SegmentId)
    }

    pub fn segment(&self, id: SegmentId) -> Option<&MemorySegment> {
        self.segments.get(id.0)
    }

    /// Reclassify a segment. Device kinds must name a registered handler.
    pub fn set_kind(&mut self, id: SegmentId, kind: SegmentKind) -> Result<(), MemoryError> {
        let handlers = self.handlers.len();
        let seg = self
            .segments
            .get_mut(id.0)
            .ok_or(MemoryError::NoSuchSegment(id.0))?;
        if let SegmentKind::Device(HandlerId(h)) = kind
            && h >= handlers
        {
            return Err(MemoryError::UnknownHandler {
                base: seg.base,
                handler: h,
            });
        }
        seg.kind = kind;
        Ok(())
    }

    /// Backing bytes of a RAM or ROM segment; `None` for devices.
    pub fn segment_bytes(&self, id: SegmentId) -> Option<&[u8]> {
        let seg = self.segments.get(id.0)?;
        match seg.kind {
            SegmentKind::Ram | SegmentKind::Rom => Some(&self.storage[seg.base as usize..seg.end()]),
            SegmentKind::Device(_) => None,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}

impl Bus for MemoryMap {
    type Address = u16;
    type Data = u8;

    fn read(&mut self, addr: u16) -> u8 {
        self.read_byte(addr)
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.write_byte(addr, data)
    }

    fn io_read(&mut self, port: u16) -> u8 {
        match self.io.as_mut() {
            Some(io) => io.read(port),
            None => 0xFF,
        }
    }

    fn io_write(&mut self, port: u16, data: u8) {
        if let Some(io) = self.io.as_mut() {
            io.write(port, data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::from_fns;

    #[test]
    fn flat_ram_round_trips() {
        let mut map = MemoryMap::flat_ram();
        map.write_byte(0x1234, 0x56);
        assert_eq!(map.read_byte(0x1234), 0x56);
        assert!(map.is_dirty());
    }

    #[test]
    fn lookup_honours_first_segment() {
        let mut b = MemoryMap::builder();
        b.ram(0x0000, 0x100).rom(0x100, 0x100);
        let map = b.build().unwrap();
        assert_eq!(map.segment_at(0x00FF), Some(SegmentId(0)));
        assert_eq!(map.segment_at(0x0100), Some(SegmentId(1)));
        assert_eq!(map.segment_at(0x0200), None);
    }

    #[test]
    fn io_without_handler_floats_high() {
        let mut map = MemoryMap::flat_ram();
        assert_eq!(map.io_read(0x10), 0xFF);
        map.io_write(0x10, 0x00);
    }

    #[test]
    fn io_handler_receives_port_accesses() {
        let mut b = MemoryMap::builder();
        b.ram(0, ADDRESS_SPACE)
            .io_handler(from_fns(|port| port as u8 ^ 0xFF, |_, _| {}));
        let mut map = b.build().unwrap();
        assert_eq!(map.io_read(0x0F), 0xF0);
    }
}
