use super::stack::Stack;
use super::{CcFlag, M6809};
use crate::core::Bus;

impl M6809 {
    /// Condition selected by the low nibble of a branch opcode, shared by
    /// the short (0x2x) and long (0x10 0x2x) forms.
    pub(crate) fn branch_condition(&self, condition: u8) -> bool {
        let c = self.cc & CcFlag::C as u8 != 0;
        let v = self.cc & CcFlag::V as u8 != 0;
        let z = self.cc & CcFlag::Z as u8 != 0;
        let n = self.cc & CcFlag::N as u8 != 0;
        match condition & 0x0F {
            0x0 => true,           // BRA
            0x1 => false,          // BRN
            0x2 => !(c || z),      // BHI
            0x3 => c || z,         // BLS
            0x4 => !c,             // BCC
            0x5 => c,              // BCS
            0x6 => !z,             // BNE
            0x7 => z,              // BEQ
            0x8 => !v,             // BVC
            0x9 => v,              // BVS
            0xA => !n,             // BPL
            0xB => n,              // BMI
            0xC => n == v,         // BGE
            0xD => n != v,         // BLT
            0xE => !z && n == v,   // BGT
            _ => z || n != v,      // BLE
        }
    }

    /// 8-bit relative branch; the offset is fetched either way.
    pub(crate) fn op_branch<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, taken: bool) {
        let offset = self.fetch_byte(bus) as i8;
        if taken {
            self.pc = self.pc.wrapping_add(offset as u16);
        }
    }

    /// 16-bit relative branch (LBRA and the 0x10 page).
    pub(crate) fn op_long_branch<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, taken: bool) {
        let offset = self.fetch_word(bus);
        if taken {
            self.pc = self.pc.wrapping_add(offset);
        }
    }

    /// BSR (0x8D)
    pub(crate) fn op_bsr<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        let offset = self.fetch_byte(bus) as i8;
        self.push_word(bus, Stack::S, self.pc);
        self.pc = self.pc.wrapping_add(offset as u16);
    }

    /// LBSR (0x17)
    pub(crate) fn op_lbsr<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        let offset = self.fetch_word(bus);
        self.push_word(bus, Stack::S, self.pc);
        self.pc = self.pc.wrapping_add(offset);
    }

    /// JSR to an already resolved address.
    pub(crate) fn op_jsr<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, target: u16) {
        self.push_word(bus, Stack::S, self.pc);
        self.pc = target;
    }
}
