use tracing::trace;

use super::{CcFlag, M6800};
use crate::core::{Bus, PendingInterrupts};

pub(crate) const VECTOR_IRQ: u16 = 0xFFF8;
pub(crate) const VECTOR_SWI: u16 = 0xFFFA;
pub(crate) const VECTOR_NMI: u16 = 0xFFFC;
pub(crate) const VECTOR_RESET: u16 = 0xFFFE;

/// Cycles to stack the machine state and fetch a vector.
const INTERRUPT_CYCLES: u32 = 12;
/// Cycles to leave WAI: registers are already stacked, only the vector is fetched.
const WAI_EXIT_CYCLES: u32 = 4;

impl M6800 {
    // --- Byte stack: write at SP then decrement, increment then read ---

    pub(crate) fn push_byte<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, data: u8) {
        bus.write(self.sp, data);
        self.sp = self.sp.wrapping_sub(1);
    }

    pub(crate) fn pull_byte<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        bus.read(self.sp)
    }

    /// Low byte first, so the word sits big-endian in memory.
    pub(crate) fn push_word<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, data: u16) {
        self.push_byte(bus, data as u8);
        self.push_byte(bus, (data >> 8) as u8);
    }

    pub(crate) fn pull_word<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let hi = self.pull_byte(bus);
        let lo = self.pull_byte(bus);
        u16::from_be_bytes([hi, lo])
    }

    /// Stack PC, X, A, B, CC (7 bytes), as for SWI, WAI and hardware interrupts.
    pub(crate) fn push_machine_state<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        self.push_word(bus, self.pc);
        self.push_word(bus, self.x);
        self.push_byte(bus, self.a);
        self.push_byte(bus, self.b);
        self.push_byte(bus, self.cc);
    }

    /// RTI: pull CC, B, A, X, PC.
    pub(crate) fn op_rti<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        self.cc = self.pull_byte(bus);
        self.b = self.pull_byte(bus);
        self.a = self.pull_byte(bus);
        self.x = self.pull_word(bus);
        self.pc = self.pull_word(bus);
    }

    /// SWI: stack everything, mask IRQ, jump through 0xFFFA.
    pub(crate) fn op_swi<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        self.push_machine_state(bus);
        self.set_flag(CcFlag::I, true);
        self.pc = self.read_word(bus, VECTOR_SWI);
    }

    /// Vector for the highest-priority serviceable request, clearing its
    /// pending bit. IRQ is skipped while I is set; NMI never is.
    fn take_pending(&self, pending: &mut PendingInterrupts) -> Option<u16> {
        if pending.nmi {
            pending.nmi = false;
            return Some(VECTOR_NMI);
        }
        if pending.irq && self.cc & CcFlag::I as u8 == 0 {
            pending.irq = false;
            return Some(VECTOR_IRQ);
        }
        None
    }

    /// Instruction-boundary interrupt check. Returns the acknowledge cost
    /// if an interrupt was taken.
    pub(crate) fn service_interrupts<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        pending: &mut PendingInterrupts,
    ) -> Option<u32> {
        let vector = self.take_pending(pending)?;
        let cycles = if self.wai {
            // WAI already stacked the registers with PC past the WAI opcode.
            self.wai = false;
            WAI_EXIT_CYCLES
        } else {
            self.push_machine_state(bus);
            INTERRUPT_CYCLES
        };
        self.set_flag(CcFlag::I, true);
        self.pc = self.read_word(bus, vector);
        trace!("6800 interrupt via {vector:#06X} -> {:#06X}", self.pc);
        Some(cycles)
    }

    /// WAI: stack the machine state and park on the WAI opcode. Anything
    /// serviceable was already taken before the fetch, so WAI always parks.
    pub(crate) fn op_wai<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, opcode_pc: u16) {
        self.push_machine_state(bus);
        self.wai = true;
        self.pc = opcode_pc;
    }
}
