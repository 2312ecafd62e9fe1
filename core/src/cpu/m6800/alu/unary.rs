use super::{logic8, nz8, with};
use crate::cpu::m6800::CcFlag;

/// NEG: `0 - val`. V when the result is 0x80, C unless the result is 0.
pub fn neg(val: u8, cc: u8) -> (u8, u8) {
    let r = 0u8.wrapping_sub(val);
    let cc = with(cc, CcFlag::V, r == 0x80);
    let cc = with(cc, CcFlag::C, r != 0);
    (r, nz8(cc, r))
}

/// COM: one's complement. V cleared, C set.
pub fn com(val: u8, cc: u8) -> (u8, u8) {
    let r = !val;
    (r, with(logic8(r, cc), CcFlag::C, true))
}

/// CLR: N=0 Z=1 V=0 C=0.
pub fn clr(cc: u8) -> (u8, u8) {
    let cc = cc & !super::NZVC;
    (0, cc | CcFlag::Z as u8)
}

/// INC: V when the result is 0x80. C untouched.
pub fn inc(val: u8, cc: u8) -> (u8, u8) {
    let r = val.wrapping_add(1);
    (r, with(nz8(cc, r), CcFlag::V, r == 0x80))
}

/// DEC: V when the result is 0x7F. C untouched.
pub fn dec(val: u8, cc: u8) -> (u8, u8) {
    let r = val.wrapping_sub(1);
    (r, with(nz8(cc, r), CcFlag::V, r == 0x7F))
}

/// 6800 TST: N, Z from the value, V and C cleared.
pub fn tst(val: u8, cc: u8) -> u8 {
    with(logic8(val, cc), CcFlag::C, false)
}

/// DAA: BCD-correct A after an add using H and C from that add.
///
/// C is only ever set here, never cleared; V is cleared.
pub fn daa(a: u8, cc: u8) -> (u8, u8) {
    let msn = a & 0xF0;
    let lsn = a & 0x0F;
    let mut correction = 0u16;
    if lsn > 0x09 || cc & CcFlag::H as u8 != 0 {
        correction |= 0x06;
    }
    if msn > 0x80 && lsn > 0x09 {
        correction |= 0x60;
    }
    if msn > 0x90 || cc & CcFlag::C as u8 != 0 {
        correction |= 0x60;
    }
    let t = correction + a as u16;
    let r = t as u8;
    let cc = with(logic8(r, cc), CcFlag::C, cc & CcFlag::C as u8 != 0 || t & 0x100 != 0);
    (r, cc)
}
