use super::{CcFlag, M6800};
use crate::core::Bus;

impl M6800 {
    /// Condition for the relative branches 0x20-0x2F. `None` for 0x21,
    /// which has no meaning on the 6800.
    pub(crate) fn branch_condition(&self, opcode: u8) -> Option<bool> {
        let c = self.cc & CcFlag::C as u8 != 0;
        let v = self.cc & CcFlag::V as u8 != 0;
        let z = self.cc & CcFlag::Z as u8 != 0;
        let n = self.cc & CcFlag::N as u8 != 0;
        let taken = match opcode {
            0x20 => true,         // BRA
            0x22 => !(c || z),    // BHI
            0x23 => c || z,       // BLS
            0x24 => !c,           // BCC
            0x25 => c,            // BCS
            0x26 => !z,           // BNE
            0x27 => z,            // BEQ
            0x28 => !v,           // BVC
            0x29 => v,            // BVS
            0x2A => !n,           // BPL
            0x2B => n,            // BMI
            0x2C => n == v,       // BGE
            0x2D => n != v,       // BLT
            0x2E => !z && n == v, // BGT
            0x2F => z || n != v,  // BLE
            _ => return None,
        };
        Some(taken)
    }

    /// Relative branch: the offset byte is always fetched, taken or not.
    pub(crate) fn op_branch<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, taken: bool) {
        let offset = self.fetch_byte(bus) as i8;
        if taken {
            self.pc = self.pc.wrapping_add(offset as u16);
        }
    }

    /// BSR (0x8D): push return address, branch relative.
    pub(crate) fn op_bsr<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        let offset = self.fetch_byte(bus) as i8;
        self.push_word(bus, self.pc);
        self.pc = self.pc.wrapping_add(offset as u16);
    }

    /// JSR to an already resolved address.
    pub(crate) fn op_jsr<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, target: u16) {
        self.push_word(bus, self.pc);
        self.pc = target;
    }

    /// RTS (0x39)
    pub(crate) fn op_rts<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        self.pc = self.pull_word(bus);
    }
}
