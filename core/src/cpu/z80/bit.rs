use crate::core::Bus;
use crate::cpu::z80::{Z80, alu};

impl Z80 {
    /// CB-prefixed opcode, already fetched. Returns T-states including the
    /// CB byte: 8 on a register, 15 on (HL), 12 for BIT n,(HL).
    pub(crate) fn execute_cb<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, op: u8, bus: &mut B) -> u32 {
        let z = op & 0x07;
        let y = (op >> 3) & 0x07;

        if z != 6 {
            let v = self.get_reg8(z);
            if let Some(r) = self.cb_apply(op, y, v) {
                self.set_reg8(z, r);
            }
            return 8;
        }

        let addr = self.get_hl();
        let v = bus.read(addr);
        match self.cb_apply(op, y, v) {
            Some(r) => {
                bus.write(addr, r);
                15
            }
            None => 12,
        }
    }

    /// DD CB d op / FD CB d op. The displacement comes before the opcode
    /// and neither byte is an M1 fetch. Returns T-states including one
    /// prefix byte.
    pub(crate) fn execute_index_cb<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u32 {
        let d = self.fetch_byte(bus) as i8;
        let op = self.fetch_byte(bus);
        let addr = self.get_index().wrapping_add(d as u16);
        let z = op & 0x07;
        let y = (op >> 3) & 0x07;

        let v = bus.read(addr);
        match self.cb_apply(op, y, v) {
            Some(r) => {
                bus.write(addr, r);
                // Undocumented: the result is also copied to r[z].
                if z != 6 {
                    self.set_reg8(z, r);
                }
                23
            }
            None => 20,
        }
    }

    /// Rotate/shift, BIT, RES or SET on `v`. BIT only updates flags and
    /// yields `None`.
    fn cb_apply(&mut self, op: u8, y: u8, v: u8) -> Option<u8> {
        match op >> 6 {
            0 => {
                let (r, f) = alu::rot(y, v, self.f);
                self.f = f;
                Some(r)
            }
            1 => {
                self.f = alu::bit(y, v, self.f);
                None
            }
            2 => Some(v & !(1 << y)),
            _ => Some(v | (1 << y)),
        }
    }
}
