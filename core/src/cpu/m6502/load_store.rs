use super::M6502;
use crate::core::bus::{self, Bus, Endian};

/// Operand addressing for the 6502's memory instructions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Mode {
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    /// (zp,X)
    IndirectX,
    /// (zp),Y
    IndirectY,
}

impl Mode {
    /// Mode for the cc=01 group (ORA AND EOR ADC STA LDA CMP SBC),
    /// selected by bits 2-4.
    pub(crate) fn of_group_one(opcode: u8) -> Mode {
        match (opcode >> 2) & 0x07 {
            0 => Mode::IndirectX,
            1 => Mode::ZeroPage,
            2 => Mode::Immediate,
            3 => Mode::Absolute,
            4 => Mode::IndirectY,
            5 => Mode::ZeroPageX,
            6 => Mode::AbsoluteY,
            _ => Mode::AbsoluteX,
        }
    }

    /// Mode for the cc=00 and cc=10 groups. STX and LDX index with Y
    /// where the others use X.
    pub(crate) fn of_group_other(opcode: u8) -> Mode {
        let uses_y = matches!(opcode, 0x96 | 0xB6 | 0xBE);
        match (opcode >> 2) & 0x07 {
            0 => Mode::Immediate,
            1 => Mode::ZeroPage,
            3 => Mode::Absolute,
            5 if uses_y => Mode::ZeroPageY,
            5 => Mode::ZeroPageX,
            7 if uses_y => Mode::AbsoluteY,
            _ => Mode::AbsoluteX,
        }
    }
}

impl M6502 {
    #[inline]
    pub(crate) fn fetch_byte<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u8 {
        let data = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        data
    }

    #[inline]
    pub(crate) fn fetch_word<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let word = bus::read_word(bus, self.pc, Endian::Little);
        self.pc = self.pc.wrapping_add(2);
        word
    }

    /// Pointer read that stays inside page zero.
    fn zero_page_word<B: Bus<Address = u16, Data = u8> + ?Sized>(bus: &mut B, ptr: u8) -> u16 {
        let lo = bus.read(ptr as u16);
        let hi = bus.read(ptr.wrapping_add(1) as u16);
        u16::from_le_bytes([lo, hi])
    }

    /// Resolve the effective address, consuming operand bytes. The flag is
    /// true when indexing carried into the high byte.
    pub(crate) fn effective_address<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
    ) -> (u16, bool) {
        match mode {
            Mode::Immediate => {
                let addr = self.pc;
                self.pc = self.pc.wrapping_add(1);
                (addr, false)
            }
            Mode::ZeroPage => (self.fetch_byte(bus) as u16, false),
            Mode::ZeroPageX => (self.fetch_byte(bus).wrapping_add(self.x) as u16, false),
            Mode::ZeroPageY => (self.fetch_byte(bus).wrapping_add(self.y) as u16, false),
            Mode::Absolute => (self.fetch_word(bus), false),
            Mode::AbsoluteX => {
                let base = self.fetch_word(bus);
                indexed(base, self.x)
            }
            Mode::AbsoluteY => {
                let base = self.fetch_word(bus);
                indexed(base, self.y)
            }
            Mode::IndirectX => {
                let ptr = self.fetch_byte(bus).wrapping_add(self.x);
                (Self::zero_page_word(bus, ptr), false)
            }
            Mode::IndirectY => {
                let ptr = self.fetch_byte(bus);
                let base = Self::zero_page_word(bus, ptr);
                indexed(base, self.y)
            }
        }
    }

    /// Read an operand. Returns the extra cycle owed for a page crossing.
    pub(crate) fn read_operand<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
    ) -> (u8, u32) {
        let (ea, crossed) = self.effective_address(bus, mode);
        (bus.read(ea), crossed as u32)
    }

    /// Stores never pay the page-crossing penalty; it is already in the
    /// base cost.
    pub(crate) fn store<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, mode: Mode, value: u8) {
        let (ea, _) = self.effective_address(bus, mode);
        bus.write(ea, value);
    }

    /// Read-modify-write on memory (ASL LSR ROL ROR INC DEC).
    pub(crate) fn modify<B: Bus<Address = u16, Data = u8> + ?Sized, F>(&mut self, bus: &mut B, mode: Mode, op: F)
    where
        F: FnOnce(u8, u8) -> (u8, u8),
    {
        let (ea, _) = self.effective_address(bus, mode);
        let value = bus.read(ea);
        let (result, p) = op(value, self.p);
        self.p = p;
        bus.write(ea, result);
    }

    /// JMP (ind). The high byte of the target is fetched without carrying
    /// into the pointer's page, so `JMP ($10FF)` reads $10FF and $1000.
    pub(crate) fn indirect_target<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let ptr = self.fetch_word(bus);
        let lo = bus.read(ptr);
        let hi = bus.read((ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF));
        u16::from_le_bytes([lo, hi])
    }
}

#[inline]
fn indexed(base: u16, index: u8) -> (u16, bool) {
    let ea = base.wrapping_add(index as u16);
    (ea, (base ^ ea) & 0xFF00 != 0)
}
