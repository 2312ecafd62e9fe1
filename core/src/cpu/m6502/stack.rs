use tracing::trace;

use super::{M6502, StatusFlag};
use crate::core::bus::{self, Bus, Endian};
use crate::core::PendingInterrupts;

pub(crate) const VECTOR_NMI: u16 = 0xFFFA;
pub(crate) const VECTOR_RESET: u16 = 0xFFFC;
pub(crate) const VECTOR_IRQ: u16 = 0xFFFE;

const INTERRUPT_CYCLES: u32 = 7;

impl M6502 {
    // The stack is fixed to page one.

    pub(crate) fn push_byte<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, data: u8) {
        bus.write(0x0100 | self.sp as u16, data);
        self.sp = self.sp.wrapping_sub(1);
    }

    pub(crate) fn pull_byte<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        bus.read(0x0100 | self.sp as u16)
    }

    /// High byte first, leaving the word little-endian in memory.
    pub(crate) fn push_word<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, data: u16) {
        self.push_byte(bus, (data >> 8) as u8);
        self.push_byte(bus, data as u8);
    }

    pub(crate) fn pull_word<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let lo = self.pull_byte(bus);
        let hi = self.pull_byte(bus);
        u16::from_le_bytes([lo, hi])
    }

    /// P as it appears on the stack: U always set, B set only for BRK/PHP.
    fn stacked_p(&self, brk: bool) -> u8 {
        let p = self.p | StatusFlag::U as u8;
        if brk { p | StatusFlag::B as u8 } else { p & !(StatusFlag::B as u8) }
    }

    /// Shared tail of BRK, IRQ and NMI.
    fn enter_handler<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, vector: u16, brk: bool) {
        self.push_word(bus, self.pc);
        let p = self.stacked_p(brk);
        self.push_byte(bus, p);
        self.set_flag(StatusFlag::I, true);
        self.pc = bus::read_word(bus, vector, Endian::Little);
    }

    /// PHP: B and U are set in the pushed copy.
    pub(crate) fn op_php<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        let p = self.stacked_p(true);
        self.push_byte(bus, p);
    }

    /// PLP / the first half of RTI: B does not exist in the register.
    pub(crate) fn op_plp<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        let p = self.pull_byte(bus);
        self.p = (p & !(StatusFlag::B as u8)) | StatusFlag::U as u8;
    }

    /// BRK skips the padding byte after the opcode.
    pub(crate) fn op_brk<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        self.pc = self.pc.wrapping_add(1);
        self.enter_handler(bus, VECTOR_IRQ, true);
    }

    pub(crate) fn op_rti<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        self.op_plp(bus);
        self.pc = self.pull_word(bus);
    }

    /// JSR pushes the address of its own last byte.
    pub(crate) fn op_jsr<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        let target = self.fetch_word(bus);
        self.push_word(bus, self.pc.wrapping_sub(1));
        self.pc = target;
    }

    pub(crate) fn op_rts<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        self.pc = self.pull_word(bus).wrapping_add(1);
    }

    /// NMI first, then IRQ unless I is set.
    pub(crate) fn service_interrupts<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        pending: &mut PendingInterrupts,
    ) -> Option<u32> {
        let vector = if pending.nmi {
            pending.nmi = false;
            VECTOR_NMI
        } else if pending.irq && self.p & StatusFlag::I as u8 == 0 {
            pending.irq = false;
            VECTOR_IRQ
        } else {
            return None;
        };
        self.enter_handler(bus, vector, false);
        trace!("6502 interrupt via {vector:#06X} -> {:#06X}", self.pc);
        Some(INTERRUPT_CYCLES)
    }
}
