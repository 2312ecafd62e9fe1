use super::{logic8, nz16, nz8, with};
use crate::cpu::m6800::CcFlag;

// --- Carry/overflow derivations on the widened result ---

/// 8-bit overflow: bit 7 of `a ^ b ^ r ^ (r >> 1)` where `r` keeps the
/// carry/borrow in bit 8.
#[inline]
pub fn overflow8(a: u16, b: u16, r: u16) -> bool {
    (a ^ b ^ r ^ (r >> 1)) & 0x80 != 0
}

#[inline]
pub fn overflow16(a: u32, b: u32, r: u32) -> bool {
    (a ^ b ^ r ^ (r >> 1)) & 0x8000 != 0
}

#[inline]
fn sum8(a: u8, b: u8, carry: u16, cc: u8) -> (u8, u8) {
    let (a16, b16) = (a as u16, b as u16);
    let r = a16 + b16 + carry;
    let cc = with(cc, CcFlag::H, (a16 ^ b16 ^ r) & 0x10 != 0);
    let cc = with(cc, CcFlag::V, overflow8(a16, b16, r));
    let cc = with(cc, CcFlag::C, r & 0x100 != 0);
    (r as u8, nz8(cc, r as u8))
}

#[inline]
fn diff8(a: u8, b: u8, borrow: u16, cc: u8) -> (u8, u8) {
    let (a16, b16) = (a as u16, b as u16);
    let r = a16.wrapping_sub(b16).wrapping_sub(borrow);
    let cc = with(cc, CcFlag::V, overflow8(a16, b16, r));
    let cc = with(cc, CcFlag::C, r & 0x100 != 0);
    (r as u8, nz8(cc, r as u8))
}

#[inline]
fn carry_in(cc: u8) -> u16 {
    (cc & CcFlag::C as u8) as u16
}

/// ADD: H, N, Z, V, C.
pub fn add(a: u8, b: u8, cc: u8) -> (u8, u8) {
    sum8(a, b, 0, cc)
}

/// ADC: H, N, Z, V, C with carry in.
pub fn adc(a: u8, b: u8, cc: u8) -> (u8, u8) {
    sum8(a, b, carry_in(cc), cc)
}

/// SUB: N, Z, V, C (C = borrow). H untouched.
pub fn sub(a: u8, b: u8, cc: u8) -> (u8, u8) {
    diff8(a, b, 0, cc)
}

pub fn sbc(a: u8, b: u8, cc: u8) -> (u8, u8) {
    diff8(a, b, carry_in(cc), cc)
}

/// CMP: flags of `a - b`, result discarded.
pub fn cmp(a: u8, b: u8, cc: u8) -> u8 {
    diff8(a, b, 0, cc).1
}

pub fn and(a: u8, b: u8, cc: u8) -> (u8, u8) {
    let r = a & b;
    (r, logic8(r, cc))
}

/// BIT: flags of `a & b`, result discarded.
pub fn bit(a: u8, b: u8, cc: u8) -> u8 {
    logic8(a & b, cc)
}

pub fn or(a: u8, b: u8, cc: u8) -> (u8, u8) {
    let r = a | b;
    (r, logic8(r, cc))
}

pub fn eor(a: u8, b: u8, cc: u8) -> (u8, u8) {
    let r = a ^ b;
    (r, logic8(r, cc))
}

// --- 16-bit ---

/// 16-bit add: N, Z, V, C.
pub fn add16(a: u16, b: u16, cc: u8) -> (u16, u8) {
    let (a32, b32) = (a as u32, b as u32);
    let r = a32 + b32;
    let cc = with(cc, CcFlag::V, overflow16(a32, b32, r));
    let cc = with(cc, CcFlag::C, r & 0x1_0000 != 0);
    (r as u16, nz16(cc, r as u16))
}

/// 16-bit subtract: N, Z, V, C.
pub fn sub16(a: u16, b: u16, cc: u8) -> (u16, u8) {
    let (a32, b32) = (a as u32, b as u32);
    let r = a32.wrapping_sub(b32);
    let cc = with(cc, CcFlag::V, overflow16(a32, b32, r));
    let cc = with(cc, CcFlag::C, r & 0x1_0000 != 0);
    (r as u16, nz16(cc, r as u16))
}

/// 6800 CPX: N, Z, V of `x - m`; C is not affected.
pub fn cpx(x: u16, m: u16, cc: u8) -> u8 {
    let carry = cc & CcFlag::C as u8;
    let (_, flags) = sub16(x, m, cc);
    (flags & !(CcFlag::C as u8)) | carry
}
