use super::{M6502, StatusFlag};
use crate::core::Bus;

impl M6502 {
    /// Condition for the eight relative branches (opcodes xxx10000).
    /// Bits 6-7 pick the flag, bit 5 the value it must have.
    pub(crate) fn branch_condition(&self, opcode: u8) -> bool {
        let flag = match opcode >> 6 {
            0 => StatusFlag::N,
            1 => StatusFlag::V,
            2 => StatusFlag::C,
            _ => StatusFlag::Z,
        };
        let set = self.p & flag as u8 != 0;
        set == (opcode & 0x20 != 0)
    }

    /// Relative branch. Returns the extra cycles: one when taken, one more
    /// when the target is in a different page.
    pub(crate) fn op_branch<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, taken: bool) -> u32 {
        let offset = self.fetch_byte(bus) as i8;
        if !taken {
            return 0;
        }
        let target = self.pc.wrapping_add(offset as u16);
        let crossed = (self.pc ^ target) & 0xFF00 != 0;
        self.pc = target;
        1 + crossed as u32
    }
}
