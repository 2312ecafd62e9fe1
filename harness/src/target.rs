use eightbit_core::core::PendingInterrupts;
use eightbit_core::cpu::{Cpu, StepResult};
use eightbit_core::memory::MemoryMap;

use crate::error::HarnessError;
use crate::snapshot::Snapshot;

/// Object-safe view of a CPU that the harness drives one instruction at a
/// time over a [`MemoryMap`]. Registers travel as run-log JSON.
pub trait Target {
    /// Start from the CPU's power-on registers, or the reset vector when it
    /// has none.
    fn power_on(&mut self, mem: &mut MemoryMap);

    fn registers(&self) -> Result<serde_json::Value, HarnessError>;

    fn set_registers(&mut self, regs: &serde_json::Value) -> Result<(), HarnessError>;

    /// Compare the live registers with a logged set.
    fn registers_match(&self, regs: &serde_json::Value) -> Result<bool, HarnessError>;

    fn pc(&self) -> u16;

    /// Execute exactly one instruction with no interrupt lines asserted.
    fn step_instruction(&mut self, mem: &mut MemoryMap) -> StepResult;
}

/// Adapter from a core [`Cpu`] to [`Target`].
#[derive(Default)]
pub struct Session<C> {
    cpu: C,
}

impl<C: Default> Session<C> {
    pub fn new() -> Self {
        Self { cpu: C::default() }
    }
}

impl<C> Session<C>
where
    C: Cpu,
    C::Registers: Snapshot,
{
    fn decode(regs: &serde_json::Value) -> Result<C::Registers, HarnessError> {
        let json = serde_json::from_value(regs.clone())?;
        <C::Registers as Snapshot>::from_json(json)
    }
}

impl<C> Target for Session<C>
where
    C: Cpu,
    C::Registers: Snapshot,
{
    fn power_on(&mut self, mem: &mut MemoryMap) {
        match <C::Registers as Snapshot>::power_on() {
            Some(regs) => self.cpu.set_registers(&regs),
            None => {
                self.cpu.reset(mem);
            }
        }
    }

    fn registers(&self) -> Result<serde_json::Value, HarnessError> {
        Ok(serde_json::to_value(self.cpu.registers().to_json())?)
    }

    fn set_registers(&mut self, regs: &serde_json::Value) -> Result<(), HarnessError> {
        let regs = Self::decode(regs)?;
        self.cpu.set_registers(&regs);
        Ok(())
    }

    fn registers_match(&self, regs: &serde_json::Value) -> Result<bool, HarnessError> {
        Ok(Self::decode(regs)? == self.cpu.registers())
    }

    fn pc(&self) -> u16 {
        self.cpu.registers().pc()
    }

    fn step_instruction(&mut self, mem: &mut MemoryMap) -> StepResult {
        // A budget of one always admits exactly one instruction.
        self.cpu.step(mem, &mut PendingInterrupts::none(), 1)
    }
}
