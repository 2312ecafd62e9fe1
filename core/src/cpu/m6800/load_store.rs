use super::M6800;
use super::alu;
use crate::core::bus::{self, Bus, Endian};

/// Operand location for the 0x60-0xFF opcode rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Mode {
    Immediate,
    Direct,
    Indexed,
    Extended,
}

impl Mode {
    /// Bits 4-5 of an accumulator opcode (0x80-0xFF) select the mode.
    pub(crate) fn of_accumulator_op(opcode: u8) -> Mode {
        match opcode & 0x30 {
            0x00 => Mode::Immediate,
            0x10 => Mode::Direct,
            0x20 => Mode::Indexed,
            _ => Mode::Extended,
        }
    }

    /// Memory read-modify-write rows: 0x60-0x6F indexed, 0x70-0x7F extended.
    pub(crate) fn of_memory_op(opcode: u8) -> Mode {
        if opcode & 0x10 == 0 { Mode::Indexed } else { Mode::Extended }
    }
}

impl M6800 {
    // --- Fetch (read at PC, then advance) ---

    #[inline]
    pub(crate) fn fetch_byte<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u8 {
        let data = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        data
    }

    #[inline]
    pub(crate) fn fetch_word<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let hi = self.fetch_byte(bus);
        let lo = self.fetch_byte(bus);
        u16::from_be_bytes([hi, lo])
    }

    #[inline]
    pub(crate) fn read_word<B: Bus<Address = u16, Data = u8> + ?Sized>(&self, bus: &mut B, addr: u16) -> u16 {
        bus::read_word(bus, addr, Endian::Big)
    }

    #[inline]
    pub(crate) fn write_word<B: Bus<Address = u16, Data = u8> + ?Sized>(&self, bus: &mut B, addr: u16, data: u16) {
        bus::write_word(bus, addr, data, Endian::Big)
    }

    /// Effective address for a non-immediate mode, consuming operand bytes.
    pub(crate) fn effective_address<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
    ) -> u16 {
        match mode {
            Mode::Direct => self.fetch_byte(bus) as u16,
            Mode::Indexed => {
                let offset = self.fetch_byte(bus) as u16;
                self.x.wrapping_add(offset)
            }
            Mode::Extended => self.fetch_word(bus),
            Mode::Immediate => {
                // Immediate operands live at PC; callers that need the
                // operand itself use read_operand instead.
                let addr = self.pc;
                self.pc = self.pc.wrapping_add(1);
                addr
            }
        }
    }

    /// 8-bit operand for any mode.
    pub(crate) fn read_operand<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, mode: Mode) -> u8 {
        match mode {
            Mode::Immediate => self.fetch_byte(bus),
            _ => {
                let ea = self.effective_address(bus, mode);
                bus.read(ea)
            }
        }
    }

    /// 16-bit operand for any mode (LDX, LDS, CPX).
    pub(crate) fn read_operand16<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
    ) -> u16 {
        match mode {
            Mode::Immediate => self.fetch_word(bus),
            _ => {
                let ea = self.effective_address(bus, mode);
                self.read_word(bus, ea)
            }
        }
    }

    // --- Loads and stores ---

    /// STAA/STAB: N, Z from the value, V cleared.
    pub(crate) fn store8<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, mode: Mode, value: u8) {
        let ea = self.effective_address(bus, mode);
        bus.write(ea, value);
        self.cc = alu::logic8(value, self.cc);
    }

    /// STX/STS: N, Z from the word, V cleared.
    pub(crate) fn store16<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, mode: Mode, value: u16) {
        let ea = self.effective_address(bus, mode);
        self.write_word(bus, ea, value);
        self.cc = alu::logic16(value, self.cc);
    }

    /// LDX/LDS
    pub(crate) fn load16<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, mode: Mode) -> u16 {
        let value = self.read_operand16(bus, mode);
        self.cc = alu::logic16(value, self.cc);
        value
    }

    /// Read-modify-write on memory (NEG, COM, LSR, ... in rows 0x60/0x70).
    pub(crate) fn modify<B: Bus<Address = u16, Data = u8> + ?Sized, F>(&mut self, bus: &mut B, mode: Mode, op: F)
    where
        F: FnOnce(u8, u8) -> (u8, u8),
    {
        let ea = self.effective_address(bus, mode);
        let value = bus.read(ea);
        let (result, cc) = op(value, self.cc);
        self.cc = cc;
        bus.write(ea, result);
    }
}
