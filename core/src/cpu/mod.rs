use std::fmt;

use tracing::{debug, warn};

use crate::core::{Bus, PendingInterrupts};

/// Uniform interface over every instruction-set interpreter.
///
/// Implementations own their registers; memory and pending interrupts are
/// passed in on each call so nothing is shared between CPU values.
pub trait Cpu {
    type Registers: Clone + PartialEq + fmt::Debug;

    /// Load PC from the reset vector and put the flags in their power-on state.
    fn reset<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> Self::Registers;

    fn registers(&self) -> Self::Registers;

    /// Load a register file. Wait states are not part of the register file,
    /// so this also leaves WAI/CWAI/SYNC/HALT and drops a pending EI delay:
    /// a CPU restored from a snapshot of a parked one runs on its next step.
    fn set_registers(&mut self, regs: &Self::Registers);

    /// Run until `budget` cycles are spent, an illegal opcode is fetched,
    /// or the CPU waits for an interrupt that is not pending.
    fn step<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        pending: &mut PendingInterrupts,
        budget: i32,
    ) -> StepResult;

    /// True while parked in WAI/CWAI/SYNC/HALT.
    fn is_sleeping(&self) -> bool;
}

/// Why a call to [`Cpu::step`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Exit {
    BudgetSpent,
    /// `pc` is the address of the offending opcode byte.
    Illegal { pc: u16, opcode: u8 },
    /// Parked on a wait instruction with nothing serviceable pending.
    Waiting,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepResult {
    /// Documented cycle cost of everything executed, interrupts included.
    pub cycles: i32,
    /// Budget left over; zero after an illegal opcode or a wait, negative
    /// when the last instruction overshot.
    pub remaining: i32,
    pub exit: Exit,
}

/// Outcome of one trip through a dispatcher: an interrupt acknowledge or a
/// single instruction.
pub(crate) enum Progress {
    Ran(u32),
    Illegal { pc: u16, opcode: u8 },
    Wait(u32),
}

/// Shared budget loop. `next` services an interrupt or executes one
/// instruction per call.
pub(crate) fn run_budget<F>(budget: i32, mut next: F) -> StepResult
where
    F: FnMut() -> Progress,
{
    let mut remaining = budget;
    let mut cycles = 0i32;

    while remaining > 0 {
        match next() {
            Progress::Ran(cost) => {
                remaining -= cost as i32;
                cycles += cost as i32;
            }
            Progress::Illegal { pc, opcode } => {
                warn!("illegal opcode {opcode:#04X} at {pc:#06X}");
                return StepResult {
                    cycles,
                    remaining: 0,
                    exit: Exit::Illegal { pc, opcode },
                };
            }
            Progress::Wait(cost) => {
                debug!("waiting for interrupt");
                return StepResult {
                    cycles: cycles + cost as i32,
                    remaining: 0,
                    exit: Exit::Waiting,
                };
            }
        }
    }

    StepResult {
        cycles,
        remaining,
        exit: Exit::BudgetSpent,
    }
}

pub mod state;
pub use state::{InterruptMode, M6502State, M6800State, M6809State, Z80State};

pub mod m6800;
pub use m6800::M6800;

pub mod m6502;
pub use m6502::M6502;

pub mod z80;
pub use z80::Z80;

pub mod m6809;
pub use m6809::M6809;
