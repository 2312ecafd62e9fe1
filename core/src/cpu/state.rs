//! Register files exchanged through [`Cpu::registers`](super::Cpu::registers)
//! and [`Cpu::set_registers`](super::Cpu::set_registers).

/// M6800 register file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct M6800State {
    pub a: u8,   // Accumulator A
    pub b: u8,   // Accumulator B
    pub x: u16,  // Index register X
    pub sp: u16, // Stack pointer
    pub pc: u16, // Program counter
    pub cc: u8,  // Condition codes (--HINZVC)
}

/// M6502 register file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct M6502State {
    pub a: u8,   // Accumulator
    pub x: u8,   // X index register
    pub y: u8,   // Y index register
    pub pc: u16, // Program counter
    pub sp: u8,  // Stack pointer (page 1)
    pub p: u8,   // Status register (NV-BDIZC)
}

/// Z80 interrupt acknowledge mode, selected by `IM 0/1/2`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InterruptMode {
    /// Execute the byte on the data bus as an instruction.
    #[default]
    Im0,
    /// Restart at 0x0038.
    Im1,
    /// Jump through the vector table at `I * 256 + data byte`.
    Im2,
}

impl InterruptMode {
    pub fn as_u8(self) -> u8 {
        match self {
            InterruptMode::Im0 => 0,
            InterruptMode::Im1 => 1,
            InterruptMode::Im2 => 2,
        }
    }

    /// Modes outside 0..=2 have no meaning and are rejected.
    pub fn from_u8(mode: u8) -> Option<Self> {
        match mode {
            0 => Some(InterruptMode::Im0),
            1 => Some(InterruptMode::Im1),
            2 => Some(InterruptMode::Im2),
            _ => None,
        }
    }
}

/// Z80 register file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Z80State {
    pub a: u8,       // Accumulator
    pub f: u8,       // Flags register
    pub b: u8,       // Register B
    pub c: u8,       // Register C
    pub d: u8,       // Register D
    pub e: u8,       // Register E
    pub h: u8,       // Register H
    pub l: u8,       // Register L
    pub a_prime: u8, // Shadow accumulator
    pub f_prime: u8, // Shadow flags
    pub b_prime: u8, // Shadow B
    pub c_prime: u8, // Shadow C
    pub d_prime: u8, // Shadow D
    pub e_prime: u8, // Shadow E
    pub h_prime: u8, // Shadow H
    pub l_prime: u8, // Shadow L
    pub ix: u16,     // Index register X
    pub iy: u16,     // Index register Y
    pub sp: u16,     // Stack pointer
    pub pc: u16,     // Program counter
    pub i: u8,       // Interrupt vector register
    pub r: u8,       // Memory refresh register
    pub iff1: bool,  // Interrupt flip-flop 1
    pub iff2: bool,  // Interrupt flip-flop 2
    pub im: InterruptMode,
}

/// M6809 register file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct M6809State {
    pub a: u8,   // Accumulator A
    pub b: u8,   // Accumulator B
    pub dp: u8,  // Direct Page register
    pub x: u16,  // Index register X
    pub y: u16,  // Index register Y
    pub u: u16,  // User stack pointer
    pub s: u16,  // Hardware stack pointer
    pub pc: u16, // Program counter
    pub cc: u8,  // Condition codes (EFHINZVC)
}

impl M6809State {
    /// A:B as the 16-bit D accumulator.
    pub fn d(&self) -> u16 {
        u16::from_be_bytes([self.a, self.b])
    }
}
