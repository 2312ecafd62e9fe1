pub mod alu;
mod branch;
mod load_store;
mod stack;

use load_store::Mode;

use crate::core::{Bus, PendingInterrupts};
use crate::cpu::{Cpu, Progress, StepResult, run_budget, state::M6800State};

#[repr(u8)]
#[derive(Copy, Clone, Debug)]
pub enum CcFlag {
    C = 0x01, // Carry
    V = 0x02, // Overflow
    Z = 0x04, // Zero
    N = 0x08, // Negative
    I = 0x10, // IRQ mask
    H = 0x20, // Half carry
}

/// Base cycle cost per opcode. Zero marks an opcode the 6800 does not
/// implement.
#[rustfmt::skip]
pub const CYCLES: [u8; 256] = [
 // 0  1  2  3  4  5  6  7  8  9  A  B  C  D  E  F
    0, 2, 0, 0, 0, 0, 2, 2, 4, 4, 2, 2, 2, 2, 2, 2, // 0
    2, 2, 0, 0, 0, 0, 2, 2, 0, 2, 0, 2, 0, 0, 0, 0, // 1
    4, 0, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, // 2
    4, 4, 4, 4, 4, 4, 4, 4, 0, 5, 0,10, 0, 0, 9,12, // 3
    2, 0, 0, 2, 2, 0, 2, 2, 2, 2, 2, 0, 2, 2, 0, 2, // 4
    2, 0, 0, 2, 2, 0, 2, 2, 2, 2, 2, 0, 2, 2, 0, 2, // 5
    7, 0, 0, 7, 7, 0, 7, 7, 7, 7, 7, 0, 7, 7, 4, 7, // 6
    6, 0, 0, 6, 6, 0, 6, 6, 6, 6, 6, 0, 6, 6, 3, 6, // 7
    2, 2, 2, 0, 2, 2, 2, 0, 2, 2, 2, 2, 3, 8, 3, 0, // 8
    3, 3, 3, 0, 3, 3, 3, 4, 3, 3, 3, 3, 4, 0, 4, 5, // 9
    5, 5, 5, 0, 5, 5, 5, 6, 5, 5, 5, 5, 6, 8, 6, 7, // A
    4, 4, 4, 0, 4, 4, 4, 5, 4, 4, 4, 4, 5, 9, 5, 6, // B
    2, 2, 2, 0, 2, 2, 2, 0, 2, 2, 2, 2, 0, 0, 3, 0, // C
    3, 3, 3, 0, 3, 3, 3, 4, 3, 3, 3, 3, 0, 0, 4, 5, // D
    5, 5, 5, 0, 5, 5, 5, 6, 5, 5, 5, 5, 0, 0, 6, 7, // E
    4, 4, 4, 0, 4, 4, 4, 5, 4, 4, 4, 4, 0, 0, 5, 6, // F
];

pub struct M6800 {
    // Registers
    pub a: u8,
    pub b: u8,
    pub x: u16,
    pub sp: u16,
    pub pc: u16,
    pub cc: u8,

    /// Registers stacked by WAI; waiting for NMI or an unmasked IRQ.
    pub(crate) wai: bool,
}

impl Default for M6800 {
    fn default() -> Self {
        Self::new()
    }
}

impl M6800 {
    pub fn new() -> Self {
        Self {
            a: 0,
            b: 0,
            x: 0,
            sp: 0,
            pc: 0,
            cc: 0,
            wai: false,
        }
    }

    #[inline]
    pub(crate) fn set_flag(&mut self, flag: CcFlag, set: bool) {
        if set {
            self.cc |= flag as u8
        } else {
            self.cc &= !(flag as u8)
        }
    }

    /// One interrupt acknowledge or one instruction.
    fn next<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        pending: &mut PendingInterrupts,
    ) -> Progress {
        if let Some(cycles) = self.service_interrupts(bus, pending) {
            return Progress::Ran(cycles);
        }
        if self.wai {
            return Progress::Wait(0);
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

        match opcode {
            0x3E => {
                self.op_wai(bus, opcode_pc);
                Progress::Wait(cycles)
            }
            0x00..=0x5F => {
                self.execute_inherent(opcode, bus);
                Progress::Ran(cycles)
            }
            0x60..=0x7F => {
                self.execute_memory(opcode, bus);
                Progress::Ran(cycles)
            }
            _ => {
                self.execute_accumulator(opcode, bus);
                Progress::Ran(cycles)
            }
        }
    }

    /// Rows 0x00-0x5F: inherent, branch, stack and register-only opcodes.
    fn execute_inherent<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        match opcode {
            0x01 => {}                                         // NOP
            0x06 => self.cc = self.a & 0x3F,                   // TAP
            0x07 => self.a = self.cc | 0xC0,                   // TPA
            0x08 => {
                // INX: Z only
                self.x = self.x.wrapping_add(1);
                self.set_flag(CcFlag::Z, self.x == 0);
            }
            0x09 => {
                // DEX: Z only
                self.x = self.x.wrapping_sub(1);
                self.set_flag(CcFlag::Z, self.x == 0);
            }
            0x0A => self.set_flag(CcFlag::V, false), // CLV
            0x0B => self.set_flag(CcFlag::V, true),  // SEV
            0x0C => self.set_flag(CcFlag::C, false), // CLC
            0x0D => self.set_flag(CcFlag::C, true),  // SEC
            0x0E => self.set_flag(CcFlag::I, false), // CLI
            0x0F => self.set_flag(CcFlag::I, true),  // SEI

            0x10 => (self.a, self.cc) = alu::sub(self.a, self.b, self.cc), // SBA
            0x11 => self.cc = alu::cmp(self.a, self.b, self.cc),           // CBA
            0x16 => {
                // TAB
                self.b = self.a;
                self.cc = alu::logic8(self.b, self.cc);
            }
            0x17 => {
                // TBA
                self.a = self.b;
                self.cc = alu::logic8(self.a, self.cc);
            }
            0x19 => (self.a, self.cc) = alu::daa(self.a, self.cc), // DAA
            0x1B => (self.a, self.cc) = alu::add(self.a, self.b, self.cc), // ABA

            0x20..=0x2F => {
                let taken = self.branch_condition(opcode).unwrap_or(false);
                self.op_branch(bus, taken);
            }

            0x30 => self.x = self.sp.wrapping_add(1), // TSX
            0x31 => self.sp = self.sp.wrapping_add(1), // INS
            0x32 => self.a = self.pull_byte(bus),     // PULA
            0x33 => self.b = self.pull_byte(bus),     // PULB
            0x34 => self.sp = self.sp.wrapping_sub(1), // DES
            0x35 => self.sp = self.x.wrapping_sub(1), // TXS
            0x36 => self.push_byte(bus, self.a),      // PSHA
            0x37 => self.push_byte(bus, self.b),      // PSHB
            0x39 => self.op_rts(bus),
            0x3B => self.op_rti(bus),
            0x3F => self.op_swi(bus),

            0x40..=0x4F => self.a = self.unary(opcode, self.a),
            0x50..=0x5F => self.b = self.unary(opcode, self.b),

            _ => {}
        }
    }

    /// Accumulator forms of the unary group (rows 0x40 and 0x50).
    fn unary(&mut self, opcode: u8, value: u8) -> u8 {
        let (result, cc) = match opcode & 0x0F {
            0x0 => alu::neg(value, self.cc),
            0x3 => alu::com(value, self.cc),
            0x4 => alu::lsr(value, self.cc),
            0x6 => alu::ror(value, self.cc),
            0x7 => alu::asr(value, self.cc),
            0x8 => alu::asl(value, self.cc),
            0x9 => alu::rol(value, self.cc),
            0xA => alu::dec(value, self.cc),
            0xC => alu::inc(value, self.cc),
            0xD => (value, alu::tst(value, self.cc)),
            0xF => alu::clr(self.cc),
            _ => (value, self.cc),
        };
        self.cc = cc;
        result
    }

    /// Rows 0x60-0x7F: read-modify-write on memory, JMP, TST, CLR.
    fn execute_memory<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let mode = Mode::of_memory_op(opcode);
        match opcode & 0x0F {
            0x0 => self.modify(bus, mode, alu::neg),
            0x3 => self.modify(bus, mode, alu::com),
            0x4 => self.modify(bus, mode, alu::lsr),
            0x6 => self.modify(bus, mode, alu::ror),
            0x7 => self.modify(bus, mode, alu::asr),
            0x8 => self.modify(bus, mode, alu::asl),
            0x9 => self.modify(bus, mode, alu::rol),
            0xA => self.modify(bus, mode, alu::dec),
            0xC => self.modify(bus, mode, alu::inc),
            0xD => {
                // TST: read only
                let value = self.read_operand(bus, mode);
                self.cc = alu::tst(value, self.cc);
            }
            0xE => self.pc = self.effective_address(bus, mode), // JMP
            0xF => {
                // CLR: write without reading
                let ea = self.effective_address(bus, mode);
                let (zero, cc) = alu::clr(self.cc);
                self.cc = cc;
                bus.write(ea, zero);
            }
            _ => {}
        }
    }

    /// Rows 0x80-0xFF: accumulator A (0x80-0xBF) and B (0xC0-0xFF) ops,
    /// plus the 16-bit X/SP loads, stores and compares.
    fn execute_accumulator<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        let mode = Mode::of_accumulator_op(opcode);
        let use_b = opcode & 0x40 != 0;
        let acc = if use_b { self.b } else { self.a };

        let result = match opcode & 0x0F {
            0x0 => Some(alu::sub(acc, self.read_operand(bus, mode), self.cc)), // SUB
            0x1 => Some((acc, alu::cmp(acc, self.read_operand(bus, mode), self.cc))), // CMP
            0x2 => Some(alu::sbc(acc, self.read_operand(bus, mode), self.cc)), // SBC
            0x4 => Some(alu::and(acc, self.read_operand(bus, mode), self.cc)), // AND
            0x5 => Some((acc, alu::bit(acc, self.read_operand(bus, mode), self.cc))), // BIT
            0x6 => {
                // LDA
                let value = self.read_operand(bus, mode);
                Some((value, alu::logic8(value, self.cc)))
            }
            0x7 => {
                self.store8(bus, mode, acc); // STA
                None
            }
            0x8 => Some(alu::eor(acc, self.read_operand(bus, mode), self.cc)), // EOR
            0x9 => Some(alu::adc(acc, self.read_operand(bus, mode), self.cc)), // ADC
            0xA => Some(alu::or(acc, self.read_operand(bus, mode), self.cc)),  // ORA
            0xB => Some(alu::add(acc, self.read_operand(bus, mode), self.cc)), // ADD
            0xC => {
                // CPX
                let m = self.read_operand16(bus, mode);
                self.cc = alu::cpx(self.x, m, self.cc);
                None
            }
            0xD => {
                // BSR (0x8D) / JSR
                if mode == Mode::Immediate {
                    self.op_bsr(bus);
                } else {
                    let target = self.effective_address(bus, mode);
                    self.op_jsr(bus, target);
                }
                None
            }
            0xE => {
                // LDS (A side) / LDX (B side)
                let value = self.load16(bus, mode);
                if use_b {
                    self.x = value;
                } else {
                    self.sp = value;
                }
                None
            }
            0xF => {
                // STS (A side) / STX (B side)
                let value = if use_b { self.x } else { self.sp };
                self.store16(bus, mode, value);
                None
            }
            _ => None,
        };

        if let Some((value, cc)) = result {
            self.cc = cc;
            if use_b {
                self.b = value;
            } else {
                self.a = value;
            }
        }
    }
}

impl Cpu for M6800 {
    type Registers = M6800State;

    fn reset<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> M6800State {
        self.wai = false;
        self.cc = CcFlag::I as u8; // IRQ masked
        self.pc = self.read_word(bus, stack::VECTOR_RESET);
        self.registers()
    }

    fn registers(&self) -> M6800State {
        M6800State {
            a: self.a,
            b: self.b,
            x: self.x,
            sp: self.sp,
            pc: self.pc,
            cc: self.cc,
        }
    }

    fn set_registers(&mut self, regs: &M6800State) {
        self.a = regs.a;
        self.b = regs.b;
        self.x = regs.x;
        self.sp = regs.sp;
        self.pc = regs.pc;
        self.cc = regs.cc;
        self.wai = false;
    }

    fn step<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        pending: &mut PendingInterrupts,
        budget: i32,
    ) -> StepResult {
        run_budget(budget, || self.next(bus, pending))
    }

    fn is_sleeping(&self) -> bool {
        self.wai
    }
}
