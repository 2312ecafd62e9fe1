//! 6809 flag primitives.
//!
//! The add/subtract/logic family and ASL/ROL behave exactly as on the
//! 6800 and are re-exported from there. The right shifts leave V alone,
//! TST leaves C alone, and MUL/SEX are new.

use super::CcFlag;
use crate::cpu::m6800::alu::{nz8, nz16};

pub use crate::cpu::m6800::alu::{
    adc, add, add16, and, asl, bit, clr, cmp, com, daa, dec, eor, inc, logic8, logic16, neg, or, rol, sbc, sub,
    sub16,
};

#[inline]
fn with(cc: u8, flag: CcFlag, set: bool) -> u8 {
    if set { cc | flag as u8 } else { cc & !(flag as u8) }
}

/// LSR: 0 → bit 7, bit 0 → C. N always clear, V untouched.
pub fn lsr(val: u8, cc: u8) -> (u8, u8) {
    let r = val >> 1;
    (r, with(nz8(cc, r), CcFlag::C, val & 0x01 != 0))
}

/// ASR: bit 7 kept, bit 0 → C. V untouched.
pub fn asr(val: u8, cc: u8) -> (u8, u8) {
    let r = (val & 0x80) | (val >> 1);
    (r, with(nz8(cc, r), CcFlag::C, val & 0x01 != 0))
}

/// ROR: old C → bit 7, bit 0 → C. V untouched.
pub fn ror(val: u8, cc: u8) -> (u8, u8) {
    let r = (val >> 1) | ((cc & CcFlag::C as u8) << 7);
    (r, with(nz8(cc, r), CcFlag::C, val & 0x01 != 0))
}

/// TST: N, Z from the value, V cleared, C untouched.
pub fn tst(val: u8, cc: u8) -> u8 {
    logic8(val, cc)
}

/// MUL: unsigned A * B. Z from the product, C from bit 7 so that
/// rounding into A is an ADCA #0.
pub fn mul(a: u8, b: u8, cc: u8) -> (u16, u8) {
    let r = a as u16 * b as u16;
    let cc = with(cc, CcFlag::Z, r == 0);
    (r, with(cc, CcFlag::C, r & 0x80 != 0))
}

/// SEX: sign-extend B into A. Returns the new A; N, Z from D.
pub fn sex(b: u8, cc: u8) -> (u8, u8) {
    let a = if b & 0x80 != 0 { 0xFF } else { 0x00 };
    (a, nz16(cc, u16::from_be_bytes([a, b])))
}
