pub mod alu;
mod branch;
mod load_store;
mod stack;

use load_store::Mode;

use crate::core::bus::{self, Bus, Endian, PendingInterrupts};
use crate::cpu::{Cpu, Progress, StepResult, run_budget, state::M6502State};

#[repr(u8)]
#[derive(Copy, Clone, Debug)]
pub enum StatusFlag {
    C = 0x01, // Carry
    Z = 0x02, // Zero
    I = 0x04, // Interrupt Disable
    D = 0x08, // Decimal
    B = 0x10, // Break
    U = 0x20, // Unused (always 1)
    V = 0x40, // Overflow
    N = 0x80, // Negative
}

/// NMOS base cycle costs. Page-crossing and taken-branch penalties are
/// added by the dispatcher. Zero marks an undocumented opcode.
#[rustfmt::skip]
pub const CYCLES: [u8; 256] = [
 // 0  1  2  3  4  5  6  7  8  9  A  B  C  D  E  F
    7, 6, 0, 0, 0, 3, 5, 0, 3, 2, 2, 0, 0, 4, 6, 0, // 0
    2, 5, 0, 0, 0, 4, 6, 0, 2, 4, 0, 0, 0, 4, 7, 0, // 1
    6, 6, 0, 0, 3, 3, 5, 0, 4, 2, 2, 0, 4, 4, 6, 0, // 2
    2, 5, 0, 0, 0, 4, 6, 0, 2, 4, 0, 0, 0, 4, 7, 0, // 3
    6, 6, 0, 0, 0, 3, 5, 0, 3, 2, 2, 0, 3, 4, 6, 0, // 4
    2, 5, 0, 0, 0, 4, 6, 0, 2, 4, 0, 0, 0, 4, 7, 0, // 5
    6, 6, 0, 0, 0, 3, 5, 0, 4, 2, 2, 0, 5, 4, 6, 0, // 6
    2, 5, 0, 0, 0, 4, 6, 0, 2, 4, 0, 0, 0, 4, 7, 0, // 7
    0, 6, 0, 0, 3, 3, 3, 0, 2, 0, 2, 0, 4, 4, 4, 0, // 8
    2, 6, 0, 0, 4, 4, 4, 0, 2, 5, 2, 0, 0, 5, 0, 0, // 9
    2, 6, 2, 0, 3, 3, 3, 0, 2, 2, 2, 0, 4, 4, 4, 0, // A
    2, 5, 0, 0, 4, 4, 4, 0, 2, 4, 2, 0, 4, 4, 4, 0, // B
    2, 6, 0, 0, 3, 3, 5, 0, 2, 2, 2, 0, 4, 4, 6, 0, // C
    2, 5, 0, 0, 0, 4, 6, 0, 2, 4, 0, 0, 0, 4, 7, 0, // D
    2, 6, 0, 0, 3, 3, 5, 0, 2, 2, 2, 0, 4, 4, 6, 0, // E
    2, 5, 0, 0, 0, 4, 6, 0, 2, 4, 0, 0, 0, 4, 7, 0, // F
];

pub struct M6502 {
    // Registers
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub pc: u16,
    pub sp: u8,
    pub p: u8,
}

impl Default for M6502 {
    fn default() -> Self {
        Self::new()
    }
}

impl M6502 {
    pub fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            pc: 0,
            sp: 0xFD,
            p: 0x24, // I=1, U=1
        }
    }

    #[inline]
    pub(crate) fn set_flag(&mut self, flag: StatusFlag, set: bool) {
        if set {
            self.p |= flag as u8;
        } else {
            self.p &= !(flag as u8);
        }
    }

    fn next<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        pending: &mut PendingInterrupts,
    ) -> Progress {
        if let Some(cycles) = self.service_interrupts(bus, pending) {
            return Progress::Ran(cycles);
        }

        let opcode_pc = self.pc;
        let opcode = self.fetch_byte(bus);
        let cycles = CYCLES[opcode as usize] as u32;
        if cycles == 0 {
            return Progress::Illegal {
                pc: opcode_pc,
                opcode,
            };
        }
        Progress::Ran(cycles + self.execute(opcode, bus))
    }

    /// Execute one decoded opcode, returning any cycles beyond the table
    /// cost.
    fn execute<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> u32 {
        match opcode {
            // Control flow
            0x00 => self.op_brk(bus),
            0x20 => self.op_jsr(bus),
            0x40 => self.op_rti(bus),
            0x60 => self.op_rts(bus),
            0x4C => self.pc = self.fetch_word(bus),
            0x6C => self.pc = self.indirect_target(bus),
            op if op & 0x1F == 0x10 => {
                let taken = self.branch_condition(op);
                return self.op_branch(bus, taken);
            }

            // Stack
            0x08 => self.op_php(bus),
            0x28 => self.op_plp(bus),
            0x48 => self.push_byte(bus, self.a),
            0x68 => {
                self.a = self.pull_byte(bus);
                self.p = alu::nz(self.a, self.p);
            }

            // Flags
            0x18 => self.set_flag(StatusFlag::C, false), // CLC
            0x38 => self.set_flag(StatusFlag::C, true),  // SEC
            0x58 => self.set_flag(StatusFlag::I, false), // CLI
            0x78 => self.set_flag(StatusFlag::I, true),  // SEI
            0xB8 => self.set_flag(StatusFlag::V, false), // CLV
            0xD8 => self.set_flag(StatusFlag::D, false), // CLD
            0xF8 => self.set_flag(StatusFlag::D, true),  // SED

            // Register transfers and steps
            0xAA => self.x = self.transfer(self.a), // TAX
            0x8A => self.a = self.transfer(self.x), // TXA
            0xA8 => self.y = self.transfer(self.a), // TAY
            0x98 => self.a = self.transfer(self.y), // TYA
            0xBA => self.x = self.transfer(self.sp), // TSX
            0x9A => self.sp = self.x,               // TXS: flags untouched
            0xE8 => (self.x, self.p) = alu::inc(self.x, self.p), // INX
            0xCA => (self.x, self.p) = alu::dec(self.x, self.p), // DEX
            0xC8 => (self.y, self.p) = alu::inc(self.y, self.p), // INY
            0x88 => (self.y, self.p) = alu::dec(self.y, self.p), // DEY
            0xEA => {}                                           // NOP

            // Accumulator shifts
            0x0A => (self.a, self.p) = alu::asl(self.a, self.p),
            0x4A => (self.a, self.p) = alu::lsr(self.a, self.p),
            0x2A => (self.a, self.p) = alu::rol(self.a, self.p),
            0x6A => (self.a, self.p) = alu::ror(self.a, self.p),

            op => return match op & 0x03 {
                0x01 => self.execute_group_one(op, bus),
                _ => self.execute_group_other(op, bus),
            },
        }
        0
    }

    fn transfer(&mut self, value: u8) -> u8 {
        self.p = alu::nz(value, self.p);
        value
    }

    /// ORA AND EOR ADC STA LDA CMP SBC: operation in bits 5-7.
    fn execute_group_one<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> u32 {
        let mode = Mode::of_group_one(opcode);
        if opcode >> 5 == 4 {
            self.store(bus, mode, self.a); // STA
            return 0;
        }

        let (m, penalty) = self.read_operand(bus, mode);
        match opcode >> 5 {
            0 => (self.a, self.p) = alu::ora(self.a, m, self.p),
            1 => (self.a, self.p) = alu::and(self.a, m, self.p),
            2 => (self.a, self.p) = alu::eor(self.a, m, self.p),
            3 => (self.a, self.p) = alu::adc(self.a, m, self.p),
            5 => {
                self.a = m; // LDA
                self.p = alu::nz(m, self.p);
            }
            6 => self.p = alu::compare(self.a, m, self.p),
            _ => (self.a, self.p) = alu::sbc(self.a, m, self.p),
        }
        penalty
    }

    /// The read-modify-write group (cc=10) and the X/Y loads, stores and
    /// compares that share its addressing layout.
    fn execute_group_other<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> u32 {
        let mode = Mode::of_group_other(opcode);
        match opcode {
            0x24 | 0x2C => {
                let (m, _) = self.read_operand(bus, mode);
                self.p = alu::bit(self.a, m, self.p);
            }
            0x84 | 0x8C | 0x94 => self.store(bus, mode, self.y), // STY
            0x86 | 0x8E | 0x96 => self.store(bus, mode, self.x), // STX
            0xA0 | 0xA4 | 0xAC | 0xB4 | 0xBC => {
                let (m, penalty) = self.read_operand(bus, mode);
                self.y = self.transfer(m); // LDY
                return penalty;
            }
            0xA2 | 0xA6 | 0xAE | 0xB6 | 0xBE => {
                let (m, penalty) = self.read_operand(bus, mode);
                self.x = self.transfer(m); // LDX
                return penalty;
            }
            0xC0 | 0xC4 | 0xCC => {
                let (m, _) = self.read_operand(bus, mode);
                self.p = alu::compare(self.y, m, self.p); // CPY
            }
            0xE0 | 0xE4 | 0xEC => {
                let (m, _) = self.read_operand(bus, mode);
                self.p = alu::compare(self.x, m, self.p); // CPX
            }
            op => match op >> 5 {
                0 => self.modify(bus, mode, alu::asl),
                1 => self.modify(bus, mode, alu::rol),
                2 => self.modify(bus, mode, alu::lsr),
                3 => self.modify(bus, mode, alu::ror),
                6 => self.modify(bus, mode, alu::dec),
                _ => self.modify(bus, mode, alu::inc),
            },
        }
        0
    }
}

impl Cpu for M6502 {
    type Registers = M6502State;

    fn reset<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> M6502State {
        self.sp = 0xFD;
        self.p = StatusFlag::I as u8 | StatusFlag::U as u8;
        self.pc = bus::read_word(bus, stack::VECTOR_RESET, Endian::Little);
        self.registers()
    }

    fn registers(&self) -> M6502State {
        M6502State {
            a: self.a,
            x: self.x,
            y: self.y,
            pc: self.pc,
            sp: self.sp,
            p: self.p,
        }
    }

    fn set_registers(&mut self, regs: &M6502State) {
        self.a = regs.a;
        self.x = regs.x;
        self.y = regs.y;
        self.pc = regs.pc;
        self.sp = regs.sp;
        self.p = regs.p;
    }

    fn step<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        pending: &mut PendingInterrupts,
        budget: i32,
    ) -> StepResult {
        run_budget(budget, || self.next(bus, pending))
    }

    /// The NMOS 6502 has no wait instruction.
    fn is_sleeping(&self) -> bool {
        false
    }
}
