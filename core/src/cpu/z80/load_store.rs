use crate::core::bus::{self, Bus, Endian};
use crate::cpu::z80::{IndexMode, Z80};

impl Z80 {
    #[inline]
    pub(crate) fn fetch_byte<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u8 {
        let data = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        data
    }

    #[inline]
    pub(crate) fn fetch_word<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let word = self.read_word(bus, self.pc);
        self.pc = self.pc.wrapping_add(2);
        word
    }

    #[inline]
    pub(crate) fn read_word<B: Bus<Address = u16, Data = u8> + ?Sized>(&self, bus: &mut B, addr: u16) -> u16 {
        bus::read_word(bus, addr, Endian::Little)
    }

    #[inline]
    pub(crate) fn write_word<B: Bus<Address = u16, Data = u8> + ?Sized>(&self, bus: &mut B, addr: u16, data: u16) {
        bus::write_word(bus, addr, data, Endian::Little)
    }

    /// Address of the memory operand: (HL), or (IX+d)/(IY+d) with the
    /// signed displacement fetched from the instruction stream.
    pub(crate) fn operand_addr<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u16 {
        match self.index_mode {
            IndexMode::HL => self.get_hl(),
            _ => {
                let d = self.fetch_byte(bus) as i8;
                self.get_index().wrapping_add(d as u16)
            }
        }
    }

    /// Read r[idx], where 6 is the memory operand.
    pub(crate) fn read_r<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, idx: u8, bus: &mut B) -> u8 {
        if idx == 6 {
            let addr = self.operand_addr(bus);
            bus.read(addr)
        } else {
            self.get_reg8_ix(idx)
        }
    }

    /// Read-modify-write of r[idx] (INC r, DEC r).
    pub(crate) fn modify_r<B: Bus<Address = u16, Data = u8> + ?Sized, F>(&mut self, idx: u8, bus: &mut B, op: F)
    where
        F: FnOnce(u8, u8) -> (u8, u8),
    {
        if idx == 6 {
            let addr = self.operand_addr(bus);
            let (v, f) = op(bus.read(addr), self.f);
            self.f = f;
            bus.write(addr, v);
        } else {
            let (v, f) = op(self.get_reg8_ix(idx), self.f);
            self.f = f;
            self.set_reg8_ix(idx, v);
        }
    }

    /// LD r,n. With an index prefix, `LD (IX+d),n` has the displacement
    /// before the immediate.
    pub(crate) fn op_ld_r_n<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, y: u8, bus: &mut B) {
        if y == 6 {
            let addr = self.operand_addr(bus);
            let n = self.fetch_byte(bus);
            bus.write(addr, n);
        } else {
            let n = self.fetch_byte(bus);
            self.set_reg8_ix(y, n);
        }
    }

    /// LD r,r'. When one side is the memory operand the other names a
    /// plain register even under a prefix: `LD H,(IX+d)` loads H.
    pub(crate) fn op_ld_r_r<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, y: u8, z: u8, bus: &mut B) {
        if z == 6 {
            let addr = self.operand_addr(bus);
            let v = bus.read(addr);
            self.set_reg8(y, v);
        } else if y == 6 {
            let addr = self.operand_addr(bus);
            bus.write(addr, self.get_reg8(z));
        } else {
            let v = self.get_reg8_ix(z);
            self.set_reg8_ix(y, v);
        }
    }

    /// x=0, z=2: accumulator loads/stores through BC, DE or nn, and
    /// LD (nn),HL / LD HL,(nn).
    pub(crate) fn op_ld_indirect<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, p: u8, q: u8, bus: &mut B) {
        match (q, p) {
            (0, 0) => bus.write(self.get_bc(), self.a),
            (0, 1) => bus.write(self.get_de(), self.a),
            (0, 2) => {
                let nn = self.fetch_word(bus);
                self.write_word(bus, nn, self.get_index());
            }
            (0, _) => {
                let nn = self.fetch_word(bus);
                bus.write(nn, self.a);
            }
            (_, 0) => self.a = bus.read(self.get_bc()),
            (_, 1) => self.a = bus.read(self.get_de()),
            (_, 2) => {
                let nn = self.fetch_word(bus);
                let v = self.read_word(bus, nn);
                self.set_index(v);
            }
            _ => {
                let nn = self.fetch_word(bus);
                self.a = bus.read(nn);
            }
        }
    }

    /// EX (SP),HL
    pub(crate) fn op_ex_sp<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        let top = self.read_word(bus, self.sp);
        self.write_word(bus, self.sp, self.get_index());
        self.set_index(top);
    }
}
