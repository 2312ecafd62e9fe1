use super::{nz8, with};
use crate::cpu::m6800::CcFlag;

/// N, Z, C from the shifted value; V = N XOR C after the shift.
#[inline]
fn shifted(result: u8, carry: bool, cc: u8) -> u8 {
    let cc = with(nz8(cc, result), CcFlag::C, carry);
    with(cc, CcFlag::V, (result & 0x80 != 0) ^ carry)
}

/// ASL: bit 7 → C, 0 → bit 0.
pub fn asl(val: u8, cc: u8) -> (u8, u8) {
    let r = val << 1;
    (r, shifted(r, val & 0x80 != 0, cc))
}

/// ASR: bit 7 kept, bit 0 → C.
pub fn asr(val: u8, cc: u8) -> (u8, u8) {
    let r = (val & 0x80) | (val >> 1);
    (r, shifted(r, val & 0x01 != 0, cc))
}

/// LSR: 0 → bit 7, bit 0 → C. N is always clear so V ends up equal to C.
pub fn lsr(val: u8, cc: u8) -> (u8, u8) {
    let r = val >> 1;
    (r, shifted(r, val & 0x01 != 0, cc))
}

/// ROL: old C → bit 0, bit 7 → C.
pub fn rol(val: u8, cc: u8) -> (u8, u8) {
    let r = (val << 1) | (cc & CcFlag::C as u8);
    (r, shifted(r, val & 0x80 != 0, cc))
}

/// ROR: old C → bit 7, bit 0 → C.
pub fn ror(val: u8, cc: u8) -> (u8, u8) {
    let r = (val >> 1) | ((cc & CcFlag::C as u8) << 7);
    (r, shifted(r, val & 0x01 != 0, cc))
}
