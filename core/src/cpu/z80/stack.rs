use tracing::trace;

use crate::core::{Bus, PendingInterrupts};
use crate::cpu::InterruptMode;
use crate::cpu::z80::Z80;

const NMI_VECTOR: u16 = 0x0066;

const NMI_CYCLES: u32 = 11;
/// IM 0 (restart on the bus) and IM 1.
const RESTART_CYCLES: u32 = 13;
const IM2_CYCLES: u32 = 19;

impl Z80 {
    /// PUSH: high byte at SP-1, low byte at SP-2.
    pub(crate) fn push_word<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, val: u16) {
        self.sp = self.sp.wrapping_sub(1);
        bus.write(self.sp, (val >> 8) as u8);
        self.sp = self.sp.wrapping_sub(1);
        bus.write(self.sp, val as u8);
    }

    pub(crate) fn pop_word<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let lo = bus.read(self.sp);
        self.sp = self.sp.wrapping_add(1);
        let hi = bus.read(self.sp);
        self.sp = self.sp.wrapping_add(1);
        u16::from_le_bytes([lo, hi])
    }

    /// Leave HALT: the return address is the instruction after it.
    fn wake(&mut self) {
        if self.halted {
            self.halted = false;
            self.pc = self.pc.wrapping_add(1);
        }
    }

    fn irq_serviceable(&self, pending: &PendingInterrupts) -> bool {
        pending.irq && self.iff1 && !self.ei_delay
    }

    /// Instruction-boundary interrupt check. NMI is always taken; IRQ needs
    /// IFF1 and is held off for one instruction after EI.
    pub(crate) fn service_interrupts<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        pending: &mut PendingInterrupts,
    ) -> Option<u32> {
        let irq = self.irq_serviceable(pending);
        self.ei_delay = false;

        if pending.nmi {
            pending.nmi = false;
            self.wake();
            self.r = (self.r & 0x80) | (self.r.wrapping_add(1) & 0x7F);
            self.push_word(bus, self.pc);
            self.iff2 = self.iff1;
            self.iff1 = false;
            self.pc = NMI_VECTOR;
            trace!("z80 nmi -> {:#06X}", self.pc);
            return Some(NMI_CYCLES);
        }
        if !irq {
            return None;
        }

        pending.irq = false;
        self.wake();
        self.r = (self.r & 0x80) | (self.r.wrapping_add(1) & 0x7F);
        self.iff1 = false;
        self.iff2 = false;
        self.push_word(bus, self.pc);
        let cycles = match self.im {
            InterruptMode::Im0 => {
                // Only a restart opcode on the data bus is honoured; anything
                // else behaves as the 0xFF (RST 38h) of an idle bus.
                let opcode = pending.irq_vector;
                self.pc = if opcode & 0xC7 == 0xC7 { (opcode & 0x38) as u16 } else { 0x0038 };
                RESTART_CYCLES
            }
            InterruptMode::Im1 => {
                self.pc = 0x0038;
                RESTART_CYCLES
            }
            InterruptMode::Im2 => {
                let table = u16::from_be_bytes([self.i, pending.irq_vector]);
                self.pc = self.read_word(bus, table);
                IM2_CYCLES
            }
        };
        trace!("z80 irq ({:?}) -> {:#06X}", self.im, self.pc);
        Some(cycles)
    }

    /// HALT: park with PC on the opcode until an interrupt is serviceable.
    /// Returns the acknowledge cost when one can be taken immediately.
    pub(crate) fn op_halt<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        pending: &mut PendingInterrupts,
        opcode_pc: u16,
    ) -> Option<u32> {
        self.pc = opcode_pc;
        self.halted = true;
        self.service_interrupts(bus, pending)
    }
}
