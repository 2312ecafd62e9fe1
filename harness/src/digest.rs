use std::fmt::Write;

use eightbit_core::memory::{MemoryMap, SegmentId};
use sha1::{Digest, Sha1};

/// SHA-1 over the backing bytes of every RAM and ROM segment in map order,
/// as lower-case hex. Device segments contribute nothing.
pub fn memory_digest(map: &MemoryMap) -> String {
    let mut hasher = Sha1::new();
    for i in 0..map.segments().len() {
        if let Some(bytes) = map.segment_bytes(SegmentId(i)) {
            hasher.update(bytes);
        }
    }
    to_hex(&hasher.finalize())
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use eightbit_core::device::from_fns;

    #[test]
    fn empty_input_digest() {
        let map = MemoryMap::builder().build().unwrap();
        assert_eq!(memory_digest(&map), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    }

    #[test]
    fn digest_tracks_contents() {
        let mut map = MemoryMap::flat_ram();
        let before = memory_digest(&map);
        map.write_byte(0x8000, 1);
        let after = memory_digest(&map);
        assert_ne!(before, after);
        assert_eq!(after.len(), 40);
        assert!(after.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        map.write_byte(0x8000, 0);
        assert_eq!(memory_digest(&map), before);
    }

    #[test]
    fn devices_are_not_hashed() {
        let mut with_device = MemoryMap::builder();
        let h = with_device.handler(from_fns(|_| 0x55, |_, _| {}));
        with_device.ram(0, 0x100).device(0x100, 0x10, h);
        let with_device = with_device.build().unwrap();

        let mut plain = MemoryMap::builder();
        plain.ram(0, 0x100);
        let plain = plain.build().unwrap();

        assert_eq!(memory_digest(&with_device), memory_digest(&plain));
    }
}
