use tracing::trace;

use crate::core::Bus;
use crate::cpu::InterruptMode;
use crate::cpu::z80::{Flag, Z80, alu};

const C: u8 = Flag::C as u8;
const PV: u8 = Flag::PV as u8;

impl Z80 {
    /// ED-prefixed opcode with a defined behaviour (ED_CYCLES non-zero).
    /// Returns T-states beyond the table cost.
    pub(crate) fn execute_ed<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, op: u8, bus: &mut B) -> u32 {
        if op >= 0xA0 {
            return self.execute_block(op, bus);
        }

        let y = (op >> 3) & 0x07;
        let p = y >> 1;
        let q = y & 0x01;

        match op & 0x07 {
            0 => {
                // IN r,(C); y=6 only sets flags
                let v = bus.io_read(self.get_bc());
                if y != 6 {
                    self.set_reg8(y, v);
                }
                self.f = alu::szp(v) | (self.f & C);
            }
            1 => {
                // OUT (C),r; y=6 drives zero on an NMOS part
                let v = if y == 6 { 0 } else { self.get_reg8(y) };
                bus.io_write(self.get_bc(), v);
            }
            2 => {
                let (r, f) = if q == 0 {
                    alu::sbc16(self.get_hl(), self.get_rp(p), self.f)
                } else {
                    alu::adc16(self.get_hl(), self.get_rp(p), self.f)
                };
                self.set_hl(r);
                self.f = f;
            }
            3 => {
                let nn = self.fetch_word(bus);
                if q == 0 {
                    self.write_word(bus, nn, self.get_rp(p));
                } else {
                    let v = self.read_word(bus, nn);
                    self.set_rp(p, v);
                }
            }
            4 => (self.a, self.f) = alu::neg(self.a),
            5 => {
                // RETN and RETI both restore IFF1 from IFF2
                self.pc = self.pop_word(bus);
                self.iff1 = self.iff2;
                trace!("z80 return from interrupt -> {:#06X}", self.pc);
            }
            6 => {
                self.im = match y & 0x03 {
                    2 => InterruptMode::Im1,
                    3 => InterruptMode::Im2,
                    _ => InterruptMode::Im0,
                };
            }
            _ => match y {
                0 => self.i = self.a,
                1 => self.r = self.a,
                2 => self.a = self.ld_a_special(self.i),
                3 => self.a = self.ld_a_special(self.r),
                4 => self.op_rxd(bus, false),
                5 => self.op_rxd(bus, true),
                _ => {}
            },
        }
        0
    }

    /// LD A,I / LD A,R: PV reports IFF2.
    fn ld_a_special(&mut self, v: u8) -> u8 {
        let mut f = alu::sz_xy(v) | (self.f & C);
        if self.iff2 {
            f |= PV;
        }
        self.f = f;
        v
    }
}
