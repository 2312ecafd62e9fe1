use super::{CcFlag, M6809, alu};
use crate::core::bus::{self, Bus, Endian};

/// Indexed postbyte that selects no addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BadPostbyte;

pub(crate) type Exec = Result<(), BadPostbyte>;

/// Operand location for memory and accumulator opcodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Mode {
    Immediate,
    Direct,
    Indexed,
    Extended,
}

impl Mode {
    /// Bits 4-5 of an accumulator opcode (0x80-0xFF, any page) select the mode.
    pub(crate) fn of_accumulator_op(opcode: u8) -> Mode {
        match opcode & 0x30 {
            0x00 => Mode::Immediate,
            0x10 => Mode::Direct,
            0x20 => Mode::Indexed,
            _ => Mode::Extended,
        }
    }

    /// Memory read-modify-write rows: 0x00 direct, 0x60 indexed, 0x70 extended.
    pub(crate) fn of_memory_op(opcode: u8) -> Mode {
        match opcode & 0xF0 {
            0x00 => Mode::Direct,
            0x60 => Mode::Indexed,
            _ => Mode::Extended,
        }
    }
}

impl M6809 {
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

    // --- Addressing ---

    /// Effective address for any mode, consuming operand bytes. Immediate
    /// yields the address of the operand itself, one byte wide.
    pub(crate) fn effective_address<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
    ) -> Result<u16, BadPostbyte> {
        Ok(match mode {
            Mode::Direct => {
                let lo = self.fetch_byte(bus);
                u16::from_be_bytes([self.dp, lo])
            }
            Mode::Indexed => self.indexed(bus)?,
            Mode::Extended => self.fetch_word(bus),
            Mode::Immediate => {
                let addr = self.pc;
                self.pc = self.pc.wrapping_add(1);
                addr
            }
        })
    }

    fn index_register(&self, select: u8) -> u16 {
        match select & 0x03 {
            0 => self.x,
            1 => self.y,
            2 => self.u,
            _ => self.s,
        }
    }

    fn set_index_register(&mut self, select: u8, value: u16) {
        match select & 0x03 {
            0 => self.x = value,
            1 => self.y = value,
            2 => self.u = value,
            _ => self.s = value,
        }
    }

    /// Decode an indexed postbyte and return the effective address.
    ///
    /// ```text
    /// 0RRnnnnn        5-bit signed offset from R
    /// 1RRi0000  ,R+   1RRi0001  ,R++   1RRi0010  ,-R    1RRi0011  ,--R
    /// 1RRi0100  ,R    1RRi0101  B,R    1RRi0110  A,R    1RRi1000  n8,R
    /// 1RRi1001  n16,R 1RRi1011  D,R    1RRi1100  n8,PC  1RRi1101  n16,PC
    /// 1xx11111  [n16]
    /// ```
    ///
    /// RR picks X, Y, U or S; `i` adds a level of indirection. Single
    /// auto-increment/decrement has no indirect form.
    pub(crate) fn indexed<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> Result<u16, BadPostbyte> {
        let post = self.fetch_byte(bus);
        let select = post >> 5;
        let base = self.index_register(select);

        if post & 0x80 == 0 {
            let offset = ((post << 3) as i8 >> 3) as u16;
            self.extra += 1;
            return Ok(base.wrapping_add(offset));
        }

        let indirect = post & 0x10 != 0;
        let (ea, extra) = match post & 0x0F {
            0x0 if !indirect => {
                self.set_index_register(select, base.wrapping_add(1));
                (base, 2)
            }
            0x1 => {
                self.set_index_register(select, base.wrapping_add(2));
                (base, 3)
            }
            0x2 if !indirect => {
                let ea = base.wrapping_sub(1);
                self.set_index_register(select, ea);
                (ea, 2)
            }
            0x3 => {
                let ea = base.wrapping_sub(2);
                self.set_index_register(select, ea);
                (ea, 3)
            }
            0x4 => (base, 0),
            0x5 => (base.wrapping_add(self.b as i8 as u16), 1),
            0x6 => (base.wrapping_add(self.a as i8 as u16), 1),
            0x8 => {
                let offset = self.fetch_byte(bus) as i8;
                (base.wrapping_add(offset as u16), 1)
            }
            0x9 => {
                let offset = self.fetch_word(bus);
                (base.wrapping_add(offset), 4)
            }
            0xB => (base.wrapping_add(self.get_d()), 4),
            0xC => {
                let offset = self.fetch_byte(bus) as i8;
                (self.pc.wrapping_add(offset as u16), 1)
            }
            0xD => {
                let offset = self.fetch_word(bus);
                (self.pc.wrapping_add(offset), 5)
            }
            0xF if indirect => (self.fetch_word(bus), 2),
            _ => return Err(BadPostbyte),
        };

        self.extra += extra;
        if indirect {
            self.extra += 3;
            Ok(self.read_word(bus, ea))
        } else {
            Ok(ea)
        }
    }

    /// 8-bit operand for any mode.
    pub(crate) fn read_operand<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
    ) -> Result<u8, BadPostbyte> {
        match mode {
            Mode::Immediate => Ok(self.fetch_byte(bus)),
            _ => {
                let ea = self.effective_address(bus, mode)?;
                Ok(bus.read(ea))
            }
        }
    }

    /// 16-bit operand for any mode.
    pub(crate) fn read_operand16<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
    ) -> Result<u16, BadPostbyte> {
        match mode {
            Mode::Immediate => Ok(self.fetch_word(bus)),
            _ => {
                let ea = self.effective_address(bus, mode)?;
                Ok(self.read_word(bus, ea))
            }
        }
    }

    // --- Loads, stores, compares ---

    /// STA/STB: N, Z from the value, V cleared.
    pub(crate) fn store8<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, mode: Mode, value: u8) -> Exec {
        let ea = self.effective_address(bus, mode)?;
        bus.write(ea, value);
        self.cc = alu::logic8(value, self.cc);
        Ok(())
    }

    pub(crate) fn store16<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
        value: u16,
    ) -> Exec {
        let ea = self.effective_address(bus, mode)?;
        self.write_word(bus, ea, value);
        self.cc = alu::logic16(value, self.cc);
        Ok(())
    }

    pub(crate) fn load16<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
    ) -> Result<u16, BadPostbyte> {
        let value = self.read_operand16(bus, mode)?;
        self.cc = alu::logic16(value, self.cc);
        Ok(value)
    }

    /// CMPD/CMPX/CMPY/CMPU/CMPS: N, Z, V, C of `reg - m`.
    pub(crate) fn compare16<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
        reg: u16,
    ) -> Exec {
        let m = self.read_operand16(bus, mode)?;
        (_, self.cc) = alu::sub16(reg, m, self.cc);
        Ok(())
    }

    /// Read-modify-write on memory.
    pub(crate) fn modify<B: Bus<Address = u16, Data = u8> + ?Sized, F>(&mut self, bus: &mut B, mode: Mode, op: F) -> Exec
    where
        F: FnOnce(u8, u8) -> (u8, u8),
    {
        let ea = self.effective_address(bus, mode)?;
        let value = bus.read(ea);
        let (result, cc) = op(value, self.cc);
        self.cc = cc;
        bus.write(ea, result);
        Ok(())
    }

    /// LEAX/LEAY set Z from the address; LEAS/LEAU touch no flags.
    pub(crate) fn op_lea<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> Exec {
        let ea = self.indexed(bus)?;
        match opcode {
            0x30 => {
                self.x = ea;
                self.set_flag(CcFlag::Z, ea == 0);
            }
            0x31 => {
                self.y = ea;
                self.set_flag(CcFlag::Z, ea == 0);
            }
            0x32 => self.s = ea,
            _ => self.u = ea,
        }
        Ok(())
    }
}
