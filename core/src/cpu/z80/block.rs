//! ED A0-BB: block transfer, search and I/O.
//!
//! Bit 3 of the opcode picks the direction (clear increments HL), bit 4
//! makes the instruction repeat. A repeating instruction that has not
//! finished rewinds PC onto its own ED prefix so the next step runs it
//! again, which keeps every pass interruptible.

use crate::core::Bus;
use crate::cpu::z80::{Flag, Z80, alu};

const C: u8 = Flag::C as u8;
const N: u8 = Flag::N as u8;
const PV: u8 = Flag::PV as u8;
const X: u8 = Flag::X as u8;
const H: u8 = Flag::H as u8;
const Y: u8 = Flag::Y as u8;
const Z: u8 = Flag::Z as u8;
const S: u8 = Flag::S as u8;

/// T-states added for a pass that loops.
const REPEAT_CYCLES: u32 = 5;

impl Z80 {
    pub(crate) fn execute_block<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, op: u8, bus: &mut B) -> u32 {
        let step: u16 = if op & 0x08 == 0 { 1 } else { 0xFFFF };
        let repeat = op & 0x10 != 0;

        let again = match op & 0x03 {
            0 => self.block_ld(bus, step),
            1 => self.block_cp(bus, step),
            2 => self.block_in(bus, step),
            _ => self.block_out(bus, step),
        };

        if repeat && again {
            self.pc = self.pc.wrapping_sub(2);
            REPEAT_CYCLES
        } else {
            0
        }
    }

    /// LDI/LDD. Loops while BC is non-zero.
    fn block_ld<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, step: u16) -> bool {
        let v = bus.read(self.get_hl());
        bus.write(self.get_de(), v);
        self.set_hl(self.get_hl().wrapping_add(step));
        self.set_de(self.get_de().wrapping_add(step));
        let bc = self.get_bc().wrapping_sub(1);
        self.set_bc(bc);

        let n = v.wrapping_add(self.a);
        let mut f = (self.f & (S | Z | C)) | (n & X) | ((n << 4) & Y);
        if bc != 0 {
            f |= PV;
        }
        self.f = f;
        bc != 0
    }

    /// CPI/CPD. Loops while BC is non-zero and no match was found.
    fn block_cp<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, step: u16) -> bool {
        let v = bus.read(self.get_hl());
        self.set_hl(self.get_hl().wrapping_add(step));
        let bc = self.get_bc().wrapping_sub(1);
        self.set_bc(bc);

        let cmp = alu::cp(self.a, v);
        let half = cmp & H != 0;
        let n = self.a.wrapping_sub(v).wrapping_sub(half as u8);
        let mut f = (cmp & (S | Z | H)) | N | (self.f & C) | (n & X) | ((n << 4) & Y);
        if bc != 0 {
            f |= PV;
        }
        self.f = f;
        bc != 0 && cmp & Z == 0
    }

    /// INI/IND. B counts down; loops while it is non-zero.
    fn block_in<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, step: u16) -> bool {
        let v = bus.io_read(self.get_bc());
        bus.write(self.get_hl(), v);
        self.set_hl(self.get_hl().wrapping_add(step));
        self.b = self.b.wrapping_sub(1);
        let k = v as u16 + self.c.wrapping_add(step as u8) as u16;
        self.f = io_flags(self.b, v, k);
        self.b != 0
    }

    /// OUTI/OUTD. B is decremented before it forms the port address.
    fn block_out<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, step: u16) -> bool {
        let v = bus.read(self.get_hl());
        self.b = self.b.wrapping_sub(1);
        bus.io_write(self.get_bc(), v);
        self.set_hl(self.get_hl().wrapping_add(step));
        let k = v as u16 + self.l as u16;
        self.f = io_flags(self.b, v, k);
        self.b != 0
    }
}

/// Flags after a block I/O step: S Z X Y from B, N from bit 7 of the
/// transferred byte, H and C from the carry of `k`, PV from parity.
fn io_flags(b: u8, v: u8, k: u16) -> u8 {
    let mut f = alu::sz_xy(b);
    if v & 0x80 != 0 {
        f |= N;
    }
    if k > 0xFF {
        f |= H | C;
    }
    if (((k as u8) & 0x07) ^ b).count_ones() % 2 == 0 {
        f |= PV;
    }
    f
}
