//! Status-flag arithmetic for the 6502. Every function takes the operands
//! and the current P register and returns the result together with the
//! new P; nothing here touches the CPU or the bus.

use super::StatusFlag;

const N: u8 = StatusFlag::N as u8;
const V: u8 = StatusFlag::V as u8;
const D: u8 = StatusFlag::D as u8;
const Z: u8 = StatusFlag::Z as u8;
const C: u8 = StatusFlag::C as u8;

#[inline]
fn with(p: u8, flag: u8, set: bool) -> u8 {
    if set { p | flag } else { p & !flag }
}

/// Set N and Z from `value`, leaving every other bit.
#[inline]
pub fn nz(value: u8, p: u8) -> u8 {
    with(with(p, N, value & 0x80 != 0), Z, value == 0)
}

// ---- Arithmetic ----

/// ADC. Binary mode sets N Z V C from the sum. Decimal mode follows the
/// NMOS part: N and V come from the intermediate sum before the high
/// nibble is corrected, Z from the plain binary sum, C from the BCD result.
pub fn adc(a: u8, m: u8, p: u8) -> (u8, u8) {
    let carry = (p & C) as u16;

    if p & D != 0 {
        let mut lo = (a & 0x0F) as u16 + (m & 0x0F) as u16 + carry;
        if lo >= 0x0A {
            lo = ((lo + 0x06) & 0x0F) + 0x10;
        }
        let mut sum = (a as u16 & 0xF0) + (m as u16 & 0xF0) + lo;

        let mut p = with(p, N, sum & 0x80 != 0);
        p = with(p, V, (!(a as u16 ^ m as u16) & (a as u16 ^ sum)) & 0x80 != 0);
        if sum >= 0xA0 {
            sum += 0x60;
        }
        p = with(p, C, sum >= 0x100);
        let binary = a as u16 + m as u16 + carry;
        p = with(p, Z, binary & 0xFF == 0);
        (sum as u8, p)
    } else {
        let sum = a as u16 + m as u16 + carry;
        let result = sum as u8;
        let mut p = with(p, C, sum > 0xFF);
        p = with(p, V, (!(a ^ m) & (a ^ result)) & 0x80 != 0);
        (result, nz(result, p))
    }
}

/// SBC, computed as A + !M + C. Flags always come from the binary
/// difference; decimal mode only corrects the accumulator.
pub fn sbc(a: u8, m: u8, p: u8) -> (u8, u8) {
    let carry = p & C;
    let diff = a as u16 + (m ^ 0xFF) as u16 + carry as u16;
    let binary = diff as u8;

    let mut flags = with(p, C, diff > 0xFF);
    flags = with(flags, V, ((a ^ m) & (a ^ binary)) & 0x80 != 0);
    flags = nz(binary, flags);

    if p & D == 0 {
        return (binary, flags);
    }

    let borrow = (1 - carry) as i16;
    let mut lo = (a & 0x0F) as i16 - (m & 0x0F) as i16 - borrow;
    let lo_borrow = lo < 0;
    if lo_borrow {
        lo -= 6;
    }
    let mut hi = (a >> 4) as i16 - (m >> 4) as i16 - lo_borrow as i16;
    if hi < 0 {
        hi -= 6;
    }
    (((hi as u8 & 0x0F) << 4) | (lo as u8 & 0x0F), flags)
}

/// CMP/CPX/CPY: C is set when `reg >= m` (no borrow). V is untouched.
pub fn compare(reg: u8, m: u8, p: u8) -> u8 {
    nz(reg.wrapping_sub(m), with(p, C, reg >= m))
}

// ---- Logic ----

pub fn and(a: u8, m: u8, p: u8) -> (u8, u8) {
    let r = a & m;
    (r, nz(r, p))
}

pub fn ora(a: u8, m: u8, p: u8) -> (u8, u8) {
    let r = a | m;
    (r, nz(r, p))
}

pub fn eor(a: u8, m: u8, p: u8) -> (u8, u8) {
    let r = a ^ m;
    (r, nz(r, p))
}

/// BIT: N and V copied from bits 7 and 6 of memory, Z from `A & M`.
pub fn bit(a: u8, m: u8, p: u8) -> u8 {
    let p = with(p, N, m & 0x80 != 0);
    let p = with(p, V, m & 0x40 != 0);
    with(p, Z, a & m == 0)
}

// ---- Shifts (N Z C) ----

pub fn asl(v: u8, p: u8) -> (u8, u8) {
    let r = v << 1;
    (r, nz(r, with(p, C, v & 0x80 != 0)))
}

pub fn lsr(v: u8, p: u8) -> (u8, u8) {
    let r = v >> 1;
    (r, nz(r, with(p, C, v & 0x01 != 0)))
}

pub fn rol(v: u8, p: u8) -> (u8, u8) {
    let r = (v << 1) | (p & C);
    (r, nz(r, with(p, C, v & 0x80 != 0)))
}

pub fn ror(v: u8, p: u8) -> (u8, u8) {
    let r = (v >> 1) | ((p & C) << 7);
    (r, nz(r, with(p, C, v & 0x01 != 0)))
}

// ---- Increment / decrement (N Z) ----

pub fn inc(v: u8, p: u8) -> (u8, u8) {
    let r = v.wrapping_add(1);
    (r, nz(r, p))
}

pub fn dec(v: u8, p: u8) -> (u8, u8) {
    let r = v.wrapping_sub(1);
    (r, nz(r, p))
}
