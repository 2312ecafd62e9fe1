use tracing::trace;

use super::{CcFlag, M6809};
use crate::core::{Bus, PendingInterrupts};

pub(crate) const VECTOR_SWI3: u16 = 0xFFF2;
pub(crate) const VECTOR_SWI2: u16 = 0xFFF4;
pub(crate) const VECTOR_FIRQ: u16 = 0xFFF6;
pub(crate) const VECTOR_IRQ: u16 = 0xFFF8;
pub(crate) const VECTOR_SWI: u16 = 0xFFFA;
pub(crate) const VECTOR_NMI: u16 = 0xFFFC;
pub(crate) const VECTOR_RESET: u16 = 0xFFFE;

/// NMI/IRQ acknowledge: stack all twelve bytes and fetch a vector.
const ENTIRE_CYCLES: u32 = 19;
/// FIRQ acknowledge: stack PC and CC only.
const FIRQ_CYCLES: u32 = 10;
/// Leaving CWAI: the frame is already stacked.
const CWAI_EXIT_CYCLES: u32 = 7;

/// Postbyte selecting every register in a PSH/PUL.
const ALL: u8 = 0xFF;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Stack {
    S,
    U,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Line {
    Nmi,
    Firq,
    Irq,
}

impl M6809 {
    fn stack_pointer(&mut self, stack: Stack) -> &mut u16 {
        match stack {
            Stack::S => &mut self.s,
            Stack::U => &mut self.u,
        }
    }

    // --- Byte stack: decrement then write, read then increment ---

    pub(crate) fn push_byte<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, stack: Stack, data: u8) {
        let sp = self.stack_pointer(stack);
        *sp = sp.wrapping_sub(1);
        bus.write(*sp, data);
    }

    pub(crate) fn pull_byte<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, stack: Stack) -> u8 {
        let sp = self.stack_pointer(stack);
        let data = bus.read(*sp);
        *sp = sp.wrapping_add(1);
        data
    }

    /// Low byte first, so the word sits big-endian in memory.
    pub(crate) fn push_word<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, stack: Stack, data: u16) {
        self.push_byte(bus, stack, data as u8);
        self.push_byte(bus, stack, (data >> 8) as u8);
    }

    pub(crate) fn pull_word<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, stack: Stack) -> u16 {
        let hi = self.pull_byte(bus, stack);
        let lo = self.pull_byte(bus, stack);
        u16::from_be_bytes([hi, lo])
    }

    /// Push the registers named by a PSH postbyte, PC (bit 7) first and
    /// CC (bit 0) last. Bit 6 names the other stack pointer. Returns the
    /// number of bytes written.
    pub(crate) fn push_registers<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        stack: Stack,
        mask: u8,
    ) -> u32 {
        let other = match stack {
            Stack::S => self.u,
            Stack::U => self.s,
        };
        let mut bytes = 0;
        for (bit, value, wide) in [
            (0x80, self.pc, true),
            (0x40, other, true),
            (0x20, self.y, true),
            (0x10, self.x, true),
            (0x08, self.dp as u16, false),
            (0x04, self.b as u16, false),
            (0x02, self.a as u16, false),
            (0x01, self.cc as u16, false),
        ] {
            if mask & bit == 0 {
                continue;
            }
            if wide {
                self.push_word(bus, stack, value);
                bytes += 2;
            } else {
                self.push_byte(bus, stack, value as u8);
                bytes += 1;
            }
        }
        bytes
    }

    /// Pull in the reverse of push order: CC first, PC last.
    pub(crate) fn pull_registers<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        stack: Stack,
        mask: u8,
    ) -> u32 {
        let mut bytes = 0;
        if mask & 0x01 != 0 {
            self.cc = self.pull_byte(bus, stack);
            bytes += 1;
        }
        if mask & 0x02 != 0 {
            self.a = self.pull_byte(bus, stack);
            bytes += 1;
        }
        if mask & 0x04 != 0 {
            self.b = self.pull_byte(bus, stack);
            bytes += 1;
        }
        if mask & 0x08 != 0 {
            self.dp = self.pull_byte(bus, stack);
            bytes += 1;
        }
        if mask & 0x10 != 0 {
            self.x = self.pull_word(bus, stack);
            bytes += 2;
        }
        if mask & 0x20 != 0 {
            self.y = self.pull_word(bus, stack);
            bytes += 2;
        }
        if mask & 0x40 != 0 {
            let other = self.pull_word(bus, stack);
            match stack {
                Stack::S => self.u = other,
                Stack::U => self.s = other,
            }
            bytes += 2;
        }
        if mask & 0x80 != 0 {
            self.pc = self.pull_word(bus, stack);
            bytes += 2;
        }
        bytes
    }

    /// PSHS/PSHU: one extra cycle per byte.
    pub(crate) fn op_push<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, stack: Stack) {
        let mask = self.fetch_byte(bus);
        let bytes = self.push_registers(bus, stack, mask);
        self.extra += bytes;
    }

    /// PULS/PULU: one extra cycle per byte.
    pub(crate) fn op_pull<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, stack: Stack) {
        let mask = self.fetch_byte(bus);
        let bytes = self.pull_registers(bus, stack, mask);
        self.extra += bytes;
    }

    /// Stack the entire machine state on S with E set.
    fn push_entire<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        self.set_flag(CcFlag::E, true);
        self.push_registers(bus, Stack::S, ALL);
    }

    /// RTI: CC first; E decides whether the rest of the frame follows PC.
    pub(crate) fn op_rti<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) {
        self.cc = self.pull_byte(bus, Stack::S);
        if self.cc & CcFlag::E as u8 != 0 {
            self.pull_registers(bus, Stack::S, ALL & !0x01);
            self.extra += 9;
        } else {
            self.pc = self.pull_word(bus, Stack::S);
        }
        trace!("6809 return from interrupt -> {:#06X}", self.pc);
    }

    /// SWI masks IRQ and FIRQ; SWI2 and SWI3 mask nothing.
    pub(crate) fn op_swi<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B, vector: u16) {
        self.push_entire(bus);
        if vector == VECTOR_SWI {
            self.cc |= CcFlag::I as u8 | CcFlag::F as u8;
        }
        self.pc = self.read_word(bus, vector);
    }

    /// Highest-priority serviceable line, with its pending bit cleared.
    fn take_pending(&self, pending: &mut PendingInterrupts) -> Option<Line> {
        if pending.nmi {
            pending.nmi = false;
            return Some(Line::Nmi);
        }
        if pending.firq && self.cc & CcFlag::F as u8 == 0 {
            pending.firq = false;
            return Some(Line::Firq);
        }
        if pending.irq && self.cc & CcFlag::I as u8 == 0 {
            pending.irq = false;
            return Some(Line::Irq);
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
        let line = self.take_pending(pending)?;
        let cycles = if self.cwai {
            self.cwai = false;
            CWAI_EXIT_CYCLES
        } else if line == Line::Firq {
            self.set_flag(CcFlag::E, false);
            self.push_registers(bus, Stack::S, 0x81);
            FIRQ_CYCLES
        } else {
            self.push_entire(bus);
            ENTIRE_CYCLES
        };

        let (vector, mask) = match line {
            Line::Nmi => (VECTOR_NMI, CcFlag::I as u8 | CcFlag::F as u8),
            Line::Firq => (VECTOR_FIRQ, CcFlag::I as u8 | CcFlag::F as u8),
            Line::Irq => (VECTOR_IRQ, CcFlag::I as u8),
        };
        self.cc |= mask;
        self.pc = self.read_word(bus, vector);
        trace!("6809 {line:?} via {vector:#06X} -> {:#06X}", self.pc);
        Some(cycles)
    }

    /// CWAI: AND CC with the immediate, stack everything with E set, then
    /// park until NMI or an unmasked FIRQ/IRQ. PC stays on the opcode
    /// while parked.
    pub(crate) fn op_cwai<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        pending: &mut PendingInterrupts,
        opcode_pc: u16,
    ) -> Option<u32> {
        let mask = self.fetch_byte(bus);
        self.cc &= mask;
        self.push_entire(bus);
        self.cwai = true;
        match self.service_interrupts(bus, pending) {
            Some(cycles) => Some(cycles),
            None => {
                self.pc = opcode_pc;
                None
            }
        }
    }

    /// SYNC: finishes at once if any line is already asserted, otherwise
    /// parks on the opcode. Returns true when it finished.
    pub(crate) fn op_sync(&mut self, pending: &PendingInterrupts, opcode_pc: u16) -> bool {
        if pending.any() {
            return true;
        }
        self.sync = true;
        self.pc = opcode_pc;
        false
    }
}
