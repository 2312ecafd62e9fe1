//! Z80 flag arithmetic as pure functions over `(operands, F)`.
//!
//! Bits 3 and 5 of F (X and Y) are undocumented copies of result bits and
//! are reproduced here the way real silicon produces them, except where
//! they depend on the hidden MEMPTR register, which is not modeled.

use super::{Flag, Z80};
use crate::core::Bus;

const C: u8 = Flag::C as u8;
const N: u8 = Flag::N as u8;
const PV: u8 = Flag::PV as u8;
const X: u8 = Flag::X as u8;
const H: u8 = Flag::H as u8;
const Y: u8 = Flag::Y as u8;
const Z: u8 = Flag::Z as u8;
const S: u8 = Flag::S as u8;
const XY: u8 = X | Y;

#[inline]
fn parity(v: u8) -> bool {
    v.count_ones() % 2 == 0
}

/// S, Z, X, Y from the value.
#[inline]
pub fn sz_xy(v: u8) -> u8 {
    let mut f = v & (S | XY);
    if v == 0 {
        f |= Z;
    }
    f
}

/// S, Z, X, Y and even parity into PV.
#[inline]
pub fn szp(v: u8) -> u8 {
    sz_xy(v) | if parity(v) { PV } else { 0 }
}

// ---- 8-bit arithmetic ----

pub fn add8(a: u8, v: u8, carry: u8) -> (u8, u8) {
    let wide = a as u16 + v as u16 + carry as u16;
    let r = wide as u8;
    let mut f = sz_xy(r);
    if (a & 0x0F) + (v & 0x0F) + carry > 0x0F {
        f |= H;
    }
    if (a ^ r) & (v ^ r) & 0x80 != 0 {
        f |= PV;
    }
    if wide > 0xFF {
        f |= C;
    }
    (r, f)
}

pub fn sub8(a: u8, v: u8, carry: u8) -> (u8, u8) {
    let wide = (a as u16).wrapping_sub(v as u16).wrapping_sub(carry as u16);
    let r = wide as u8;
    let mut f = sz_xy(r) | N;
    if (a & 0x0F) < (v & 0x0F) + carry {
        f |= H;
    }
    if (a ^ v) & (a ^ r) & 0x80 != 0 {
        f |= PV;
    }
    if wide > 0xFF {
        f |= C;
    }
    (r, f)
}

/// CP: a subtraction that only keeps the flags. X and Y come from the
/// operand rather than the difference.
pub fn cp(a: u8, v: u8) -> u8 {
    let (_, f) = sub8(a, v, 0);
    (f & !XY) | (v & XY)
}

pub fn and(a: u8, v: u8) -> (u8, u8) {
    let r = a & v;
    (r, szp(r) | H)
}

pub fn xor(a: u8, v: u8) -> (u8, u8) {
    let r = a ^ v;
    (r, szp(r))
}

pub fn or(a: u8, v: u8) -> (u8, u8) {
    let r = a | v;
    (r, szp(r))
}

/// INC r: C is preserved; PV signals 0x7F -> 0x80.
pub fn inc8(v: u8, f: u8) -> (u8, u8) {
    let r = v.wrapping_add(1);
    let mut nf = sz_xy(r) | (f & C);
    if v & 0x0F == 0x0F {
        nf |= H;
    }
    if r == 0x80 {
        nf |= PV;
    }
    (r, nf)
}

/// DEC r: C is preserved; PV signals 0x80 -> 0x7F.
pub fn dec8(v: u8, f: u8) -> (u8, u8) {
    let r = v.wrapping_sub(1);
    let mut nf = sz_xy(r) | (f & C) | N;
    if v & 0x0F == 0x00 {
        nf |= H;
    }
    if r == 0x7F {
        nf |= PV;
    }
    (r, nf)
}

pub fn neg(a: u8) -> (u8, u8) {
    sub8(0, a, 0)
}

pub fn daa(a: u8, f: u8) -> (u8, u8) {
    let mut correction = 0u8;
    let mut carry = f & C;
    if f & H != 0 || a & 0x0F > 9 {
        correction |= 0x06;
    }
    if carry != 0 || a > 0x99 {
        correction |= 0x60;
        carry = C;
    }
    let (r, half) = if f & N != 0 {
        (a.wrapping_sub(correction), f & H != 0 && a & 0x0F < 6)
    } else {
        (a.wrapping_add(correction), a & 0x0F > 9)
    };
    let mut nf = szp(r) | (f & N) | carry;
    if half {
        nf |= H;
    }
    (r, nf)
}

pub fn cpl(a: u8, f: u8) -> (u8, u8) {
    let r = !a;
    (r, (f & (S | Z | PV | C)) | H | N | (r & XY))
}

pub fn scf(a: u8, f: u8) -> u8 {
    (f & (S | Z | PV)) | C | (a & XY)
}

/// CCF: H takes the old carry.
pub fn ccf(a: u8, f: u8) -> u8 {
    let half = if f & C != 0 { H } else { 0 };
    ((f & (S | Z | PV | C)) ^ C) | half | (a & XY)
}

// ---- 16-bit arithmetic ----

/// ADD HL,rp: S, Z and PV are preserved; H is the carry out of bit 11.
pub fn add16(hl: u16, v: u16, f: u8) -> (u16, u8) {
    let wide = hl as u32 + v as u32;
    let r = wide as u16;
    let mut nf = (f & (S | Z | PV)) | ((r >> 8) as u8 & XY);
    if (hl & 0x0FFF) + (v & 0x0FFF) > 0x0FFF {
        nf |= H;
    }
    if wide > 0xFFFF {
        nf |= C;
    }
    (r, nf)
}

pub fn adc16(hl: u16, v: u16, f: u8) -> (u16, u8) {
    let carry = (f & C) as u32;
    let wide = hl as u32 + v as u32 + carry;
    let r = wide as u16;
    let mut nf = ((r >> 8) as u8) & (S | XY);
    if r == 0 {
        nf |= Z;
    }
    if (hl & 0x0FFF) as u32 + (v & 0x0FFF) as u32 + carry > 0x0FFF {
        nf |= H;
    }
    if (hl ^ r) & (v ^ r) & 0x8000 != 0 {
        nf |= PV;
    }
    if wide > 0xFFFF {
        nf |= C;
    }
    (r, nf)
}

pub fn sbc16(hl: u16, v: u16, f: u8) -> (u16, u8) {
    let carry = (f & C) as u32;
    let wide = (hl as u32).wrapping_sub(v as u32).wrapping_sub(carry);
    let r = wide as u16;
    let mut nf = (((r >> 8) as u8) & (S | XY)) | N;
    if r == 0 {
        nf |= Z;
    }
    if ((hl & 0x0FFF) as u32) < (v & 0x0FFF) as u32 + carry {
        nf |= H;
    }
    if (hl ^ v) & (hl ^ r) & 0x8000 != 0 {
        nf |= PV;
    }
    if wide > 0xFFFF {
        nf |= C;
    }
    (r, nf)
}

// ---- Accumulator rotates (S Z PV preserved) ----

fn rotate_a(r: u8, carry: bool, f: u8) -> (u8, u8) {
    let mut nf = (f & (S | Z | PV)) | (r & XY);
    if carry {
        nf |= C;
    }
    (r, nf)
}

pub fn rlca(a: u8, f: u8) -> (u8, u8) {
    rotate_a(a.rotate_left(1), a & 0x80 != 0, f)
}

pub fn rrca(a: u8, f: u8) -> (u8, u8) {
    rotate_a(a.rotate_right(1), a & 0x01 != 0, f)
}

pub fn rla(a: u8, f: u8) -> (u8, u8) {
    rotate_a((a << 1) | (f & C), a & 0x80 != 0, f)
}

pub fn rra(a: u8, f: u8) -> (u8, u8) {
    rotate_a((a >> 1) | ((f & C) << 7), a & 0x01 != 0, f)
}

// ---- CB-group shifts (S Z P from the result, H and N cleared) ----

fn shifted(r: u8, carry: bool) -> (u8, u8) {
    (r, szp(r) | if carry { C } else { 0 })
}

/// Rotate/shift selected by bits 3-5 of a CB opcode: RLC RRC RL RR SLA
/// SRA SLL SRL. SLL is the undocumented shift that feeds a 1 into bit 0.
pub fn rot(op: u8, v: u8, f: u8) -> (u8, u8) {
    let cin = f & C;
    match op & 0x07 {
        0 => shifted(v.rotate_left(1), v & 0x80 != 0),
        1 => shifted(v.rotate_right(1), v & 0x01 != 0),
        2 => shifted((v << 1) | cin, v & 0x80 != 0),
        3 => shifted((v >> 1) | (cin << 7), v & 0x01 != 0),
        4 => shifted(v << 1, v & 0x80 != 0),
        5 => shifted((v >> 1) | (v & 0x80), v & 0x01 != 0),
        6 => shifted((v << 1) | 0x01, v & 0x80 != 0),
        _ => shifted(v >> 1, v & 0x01 != 0),
    }
}

/// BIT n: Z and PV set when the bit is clear, S only for bit 7, H set,
/// C preserved. X and Y come from the tested value.
pub fn bit(n: u8, v: u8, f: u8) -> u8 {
    let tested = v & (1 << n);
    let mut nf = (f & C) | H | (v & XY);
    if tested == 0 {
        nf |= Z | PV;
    }
    if tested & 0x80 != 0 {
        nf |= S;
    }
    nf
}

impl Z80 {
    /// ADD ADC SUB SBC AND XOR OR CP, selected by bits 3-5 of the opcode.
    pub(crate) fn alu_a(&mut self, op: u8, v: u8) {
        let carry = self.f & C;
        let (a, f) = match op & 0x07 {
            0 => add8(self.a, v, 0),
            1 => add8(self.a, v, carry),
            2 => sub8(self.a, v, 0),
            3 => sub8(self.a, v, carry),
            4 => and(self.a, v),
            5 => xor(self.a, v),
            6 => or(self.a, v),
            _ => (self.a, cp(self.a, v)),
        };
        self.a = a;
        self.f = f;
    }

    /// RRD (ED 67) and RLD (ED 6F): rotate BCD digits between A and (HL).
    pub(crate) fn op_rxd<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, left: bool) {
        let addr = self.get_hl();
        let m = bus.read(addr);
        let (a, m) = if left {
            ((self.a & 0xF0) | (m >> 4), (m << 4) | (self.a & 0x0F))
        } else {
            ((self.a & 0xF0) | (m & 0x0F), (self.a << 4) | (m >> 4))
        };
        bus.write(addr, m);
        self.a = a;
        self.f = szp(a) | (self.f & C);
    }
}
