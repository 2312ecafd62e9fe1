use crate::core::Bus;
use crate::cpu::z80::{Flag, Z80};

/// Extra T-states when a conditional instruction takes its branch.
const JR_TAKEN: u32 = 5;
const CALL_TAKEN: u32 = 7;
const RET_TAKEN: u32 = 6;

impl Z80 {
    /// cc field: NZ Z NC C PO PE P M.
    pub(crate) fn condition(&self, cc: u8) -> bool {
        let flag = match cc >> 1 {
            0 => Flag::Z,
            1 => Flag::C,
            2 => Flag::PV,
            _ => Flag::S,
        };
        let set = self.f & flag as u8 != 0;
        set == (cc & 0x01 != 0)
    }

    /// x=0, z=0: NOP, EX AF,AF', DJNZ, JR and JR cc.
    pub(crate) fn execute_relative<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, y: u8, bus: &mut B) -> u32 {
        match y {
            0 => 0,
            1 => {
                self.ex_af();
                0
            }
            2 => {
                let d = self.fetch_byte(bus) as i8;
                self.b = self.b.wrapping_sub(1);
                if self.b != 0 {
                    self.pc = self.pc.wrapping_add(d as u16);
                    JR_TAKEN
                } else {
                    0
                }
            }
            3 => {
                let d = self.fetch_byte(bus) as i8;
                self.pc = self.pc.wrapping_add(d as u16);
                0
            }
            _ => {
                let d = self.fetch_byte(bus) as i8;
                if self.condition(y - 4) {
                    self.pc = self.pc.wrapping_add(d as u16);
                    JR_TAKEN
                } else {
                    0
                }
            }
        }
    }

    /// JP cc,nn: the address is always fetched.
    pub(crate) fn op_jp_cc<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, cc: u8, bus: &mut B) {
        let target = self.fetch_word(bus);
        if self.condition(cc) {
            self.pc = target;
        }
    }

    pub(crate) fn op_call_cc<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, cc: u8, bus: &mut B) -> u32 {
        let target = self.fetch_word(bus);
        if !self.condition(cc) {
            return 0;
        }
        self.push_word(bus, self.pc);
        self.pc = target;
        CALL_TAKEN
    }

    pub(crate) fn op_ret_cc<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, cc: u8, bus: &mut B) -> u32 {
        if !self.condition(cc) {
            return 0;
        }
        self.pc = self.pop_word(bus);
        RET_TAKEN
    }
}
