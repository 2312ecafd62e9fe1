#![allow(dead_code)]

use eightbit_core::core::{Bus, PendingInterrupts};
use eightbit_core::cpu::{Cpu, StepResult};

/// Minimal bus for testing: flat 64KB read/write memory, no peripherals.
/// Port accesses go to a separate 256-byte array.
pub struct TestBus {
    pub memory: [u8; 0x10000],
    pub ports: [u8; 0x100],
    pub port_writes: Vec<(u16, u8)>,
}

impl TestBus {
    pub fn new() -> Self {
        Self {
            memory: [0; 0x10000],
            ports: [0xFF; 0x100],
            port_writes: Vec::new(),
        }
    }

    pub fn load(&mut self, addr: u16, data: &[u8]) {
        let start = addr as usize;
        self.memory[start..start + data.len()].copy_from_slice(data);
    }

    pub fn word_be(&self, addr: u16) -> u16 {
        u16::from_be_bytes([self.memory[addr as usize], self.memory[addr as usize + 1]])
    }

    pub fn word_le(&self, addr: u16) -> u16 {
        u16::from_le_bytes([self.memory[addr as usize], self.memory[addr as usize + 1]])
    }
}

impl Bus for TestBus {
    type Address = u16;
    type Data = u8;

    fn read(&mut self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.memory[addr as usize] = data;
    }

    fn io_read(&mut self, port: u16) -> u8 {
        self.ports[(port & 0xFF) as usize]
    }

    fn io_write(&mut self, port: u16, data: u8) {
        self.port_writes.push((port, data));
    }
}

/// Step with nothing pending.
pub fn run<C: Cpu>(cpu: &mut C, bus: &mut TestBus, budget: i32) -> StepResult {
    let mut pending = PendingInterrupts::none();
    cpu.step(bus, &mut pending, budget)
}

/// Execute exactly one instruction: a budget of 1 stops after the first
/// instruction whatever its cost.
pub fn step_one<C: Cpu>(cpu: &mut C, bus: &mut TestBus) -> StepResult {
    run(cpu, bus, 1)
}
