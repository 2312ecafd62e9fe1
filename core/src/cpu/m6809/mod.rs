pub mod alu;
mod branch;
mod load_store;
mod stack;
mod transfer;

use load_store::{Exec, Mode};
use stack::Stack;

use crate::core::{Bus, PendingInterrupts};
use crate::cpu::{Cpu, Progress, StepResult, run_budget, state::M6809State};

#[repr(u8)]
#[derive(Copy, Clone, Debug)]
pub enum CcFlag {
    C = 0x01, // Carry
    V = 0x02, // Overflow
    Z = 0x04, // Zero
    N = 0x08, // Negative
    I = 0x10, // IRQ mask
    H = 0x20, // Half carry
    F = 0x40, // FIRQ mask
    E = 0x80, // Entire state stacked
}

/// Base cycle cost for unprefixed opcodes. Indexed forms list the cost
/// with a `,R` postbyte; the postbyte adds the rest. Zero marks an opcode
/// with no defined behaviour (0x10 and 0x11 are page prefixes).
#[rustfmt::skip]
pub const CYCLES: [u8; 256] = [
 // 0  1  2  3  4  5  6  7  8  9  A  B  C  D  E  F
    6, 0, 0, 6, 6, 0, 6, 6, 6, 6, 6, 0, 6, 6, 3, 6, // 0
    0, 0, 2, 4, 0, 0, 5, 9, 0, 2, 3, 0, 3, 2, 8, 6, // 1
    3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, // 2
    4, 4, 4, 4, 5, 5, 5, 5, 0, 5, 3, 6,20,11, 0,19, // 3
    2, 0, 0, 2, 2, 0, 2, 2, 2, 2, 2, 0, 2, 2, 0, 2, // 4
    2, 0, 0, 2, 2, 0, 2, 2, 2, 2, 2, 0, 2, 2, 0, 2, // 5
    6, 0, 0, 6, 6, 0, 6, 6, 6, 6, 6, 0, 6, 6, 3, 6, // 6
    7, 0, 0, 7, 7, 0, 7, 7, 7, 7, 7, 0, 7, 7, 4, 7, // 7
    2, 2, 2, 4, 2, 2, 2, 0, 2, 2, 2, 2, 4, 7, 3, 0, // 8
    4, 4, 4, 6, 4, 4, 4, 4, 4, 4, 4, 4, 6, 7, 5, 5, // 9
    4, 4, 4, 6, 4, 4, 4, 4, 4, 4, 4, 4, 6, 7, 5, 5, // A
    5, 5, 5, 7, 5, 5, 5, 5, 5, 5, 5, 5, 7, 8, 6, 6, // B
    2, 2, 2, 4, 2, 2, 2, 0, 2, 2, 2, 2, 3, 0, 3, 0, // C
    4, 4, 4, 6, 4, 4, 4, 4, 4, 4, 4, 4, 5, 5, 5, 5, // D
    4, 4, 4, 6, 4, 4, 4, 4, 4, 4, 4, 4, 5, 5, 5, 5, // E
    5, 5, 5, 7, 5, 5, 5, 5, 5, 5, 5, 5, 6, 6, 6, 6, // F
];

/// Page 2 (0x10 prefix): long conditional branches, SWI2, CMPD, CMPY,
/// LDY/STY, LDS/STS. Costs include the prefix byte.
#[rustfmt::skip]
pub const PAGE2_CYCLES: [u8; 256] = [
 // 0  1  2  3  4  5  6  7  8  9  A  B  C  D  E  F
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // 0
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // 1
    0, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, // 2
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,20, // 3
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // 4
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // 5
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // 6
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // 7
    0, 0, 0, 5, 0, 0, 0, 0, 0, 0, 0, 0, 5, 0, 4, 0, // 8
    0, 0, 0, 7, 0, 0, 0, 0, 0, 0, 0, 0, 7, 0, 6, 6, // 9
    0, 0, 0, 7, 0, 0, 0, 0, 0, 0, 0, 0, 7, 0, 6, 6, // A
    0, 0, 0, 8, 0, 0, 0, 0, 0, 0, 0, 0, 8, 0, 7, 7, // B
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 4, 0, // C
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 6, 6, // D
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 6, 6, // E
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 7, 7, // F
];

/// Page 3 (0x11 prefix): SWI3, CMPU, CMPS.
#[rustfmt::skip]
pub const PAGE3_CYCLES: [u8; 256] = [
 // 0  1  2  3  4  5  6  7  8  9  A  B  C  D  E  F
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // 0
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // 1
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // 2
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,20, // 3
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // 4
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // 5
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // 6
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // 7
    0, 0, 0, 5, 0, 0, 0, 0, 0, 0, 0, 0, 5, 0, 0, 0, // 8
    0, 0, 0, 7, 0, 0, 0, 0, 0, 0, 0, 0, 7, 0, 0, 0, // 9
    0, 0, 0, 7, 0, 0, 0, 0, 0, 0, 0, 0, 7, 0, 0, 0, // A
    0, 0, 0, 8, 0, 0, 0, 0, 0, 0, 0, 0, 8, 0, 0, 0, // B
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // C
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // D
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // E
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // F
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Page {
    One,
    Two,
    Three,
}

pub struct M6809 {
    // Registers
    pub a: u8,
    pub b: u8,
    pub dp: u8,
    pub x: u16,
    pub y: u16,
    pub u: u16,
    pub s: u16,
    pub pc: u16,
    pub cc: u8,

    /// CWAI has stacked the entire state; waiting for a serviceable interrupt.
    pub(crate) cwai: bool,
    /// SYNC: waiting for any interrupt line, masked or not.
    pub(crate) sync: bool,
    /// Cycles beyond the table cost run up by the current instruction.
    pub(crate) extra: u32,
}

impl Default for M6809 {
    fn default() -> Self {
        Self::new()
    }
}

impl M6809 {
    pub fn new() -> Self {
        Self {
            a: 0,
            b: 0,
            dp: 0,
            x: 0,
            y: 0,
            u: 0,
            s: 0,
            pc: 0,
            cc: 0,
            cwai: false,
            sync: false,
            extra: 0,
        }
    }

    pub(crate) fn get_d(&self) -> u16 {
        u16::from_be_bytes([self.a, self.b])
    }

    pub(crate) fn set_d(&mut self, val: u16) {
        [self.a, self.b] = val.to_be_bytes();
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
        if self.sync {
            if !pending.any() {
                return Progress::Wait(0);
            }
            // Any line ends SYNC; a masked one just resumes after it.
            self.sync = false;
            self.pc = self.pc.wrapping_add(1);
        }
        if let Some(cycles) = self.service_interrupts(bus, pending) {
            return Progress::Ran(cycles);
        }
        if self.cwai {
            return Progress::Wait(0);
        }

        let opcode_pc = self.pc;
        let first = self.fetch_byte(bus);
        let (page, opcode) = match first {
            0x10 => (Page::Two, self.fetch_byte(bus)),
            0x11 => (Page::Three, self.fetch_byte(bus)),
            _ => (Page::One, first),
        };
        let table = match page {
            Page::One => &CYCLES,
            Page::Two => &PAGE2_CYCLES,
            Page::Three => &PAGE3_CYCLES,
        };
        let cycles = table[opcode as usize] as u32;
        if cycles == 0 {
            return Progress::Illegal { pc: opcode_pc, opcode };
        }

        self.extra = 0;
        let outcome = match (page, opcode) {
            (Page::One, 0x13) => {
                return if self.op_sync(pending, opcode_pc) {
                    Progress::Ran(cycles)
                } else {
                    Progress::Wait(cycles)
                };
            }
            (Page::One, 0x3C) => {
                return match self.op_cwai(bus, pending, opcode_pc) {
                    Some(ack) => Progress::Ran(cycles + ack),
                    None => Progress::Wait(cycles),
                };
            }
            (Page::One, _) => self.execute(opcode, bus),
            (Page::Two, _) => self.execute_page2(opcode, bus),
            (Page::Three, _) => self.execute_page3(opcode, bus),
        };

        match outcome {
            Ok(()) => Progress::Ran(cycles + self.extra),
            Err(_) => Progress::Illegal { pc: opcode_pc, opcode },
        }
    }

    fn execute<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> Exec {
        match opcode {
            0x00..=0x0F | 0x60..=0x7F => self.execute_memory(opcode, bus)?,
            0x12 => {} // NOP
            0x16 => self.op_long_branch(bus, true), // LBRA
            0x17 => self.op_lbsr(bus),
            0x19 => (self.a, self.cc) = alu::daa(self.a, self.cc),
            0x1A => {
                let mask = self.fetch_byte(bus);
                self.cc |= mask; // ORCC
            }
            0x1C => {
                let mask = self.fetch_byte(bus);
                self.cc &= mask; // ANDCC
            }
            0x1D => (self.a, self.cc) = alu::sex(self.b, self.cc),
            0x1E => self.op_exg(bus),
            0x1F => self.op_tfr(bus),

            0x20..=0x2F => {
                let taken = self.branch_condition(opcode & 0x0F);
                self.op_branch(bus, taken);
            }

            0x30..=0x33 => self.op_lea(opcode, bus)?,
            0x34 => self.op_push(bus, Stack::S),
            0x35 => self.op_pull(bus, Stack::S),
            0x36 => self.op_push(bus, Stack::U),
            0x37 => self.op_pull(bus, Stack::U),
            0x39 => self.pc = self.pull_word(bus, Stack::S), // RTS
            0x3A => self.x = self.x.wrapping_add(self.b as u16), // ABX
            0x3B => self.op_rti(bus),
            0x3D => {
                let (d, cc) = alu::mul(self.a, self.b, self.cc);
                self.set_d(d);
                self.cc = cc;
            }
            0x3F => self.op_swi(bus, stack::VECTOR_SWI),

            0x40..=0x4F => self.a = self.unary(opcode, self.a),
            0x50..=0x5F => self.b = self.unary(opcode, self.b),

            _ => self.execute_accumulator(opcode, bus)?,
        }
        Ok(())
    }

    /// Inherent forms of the unary group (rows 0x40 and 0x50).
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

    /// Rows 0x00 (direct), 0x60 (indexed) and 0x70 (extended):
    /// read-modify-write on memory, JMP, TST, CLR.
    fn execute_memory<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> Exec {
        let mode = Mode::of_memory_op(opcode);
        match opcode & 0x0F {
            0x0 => self.modify(bus, mode, alu::neg)?,
            0x3 => self.modify(bus, mode, alu::com)?,
            0x4 => self.modify(bus, mode, alu::lsr)?,
            0x6 => self.modify(bus, mode, alu::ror)?,
            0x7 => self.modify(bus, mode, alu::asr)?,
            0x8 => self.modify(bus, mode, alu::asl)?,
            0x9 => self.modify(bus, mode, alu::rol)?,
            0xA => self.modify(bus, mode, alu::dec)?,
            0xC => self.modify(bus, mode, alu::inc)?,
            0xD => {
                let value = self.read_operand(bus, mode)?;
                self.cc = alu::tst(value, self.cc);
            }
            0xE => self.pc = self.effective_address(bus, mode)?, // JMP
            0xF => {
                let ea = self.effective_address(bus, mode)?;
                let (zero, cc) = alu::clr(self.cc);
                self.cc = cc;
                bus.write(ea, zero);
            }
            _ => {}
        }
        Ok(())
    }

    /// Rows 0x80-0xFF: accumulator A (0x80-0xBF) and B (0xC0-0xFF) ops,
    /// plus D, X and U loads, stores and arithmetic.
    fn execute_accumulator<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> Exec {
        let mode = Mode::of_accumulator_op(opcode);
        let use_b = opcode & 0x40 != 0;
        let acc = if use_b { self.b } else { self.a };

        let result = match opcode & 0x0F {
            0x0 => Some(alu::sub(acc, self.read_operand(bus, mode)?, self.cc)),
            0x1 => Some((acc, alu::cmp(acc, self.read_operand(bus, mode)?, self.cc))),
            0x2 => Some(alu::sbc(acc, self.read_operand(bus, mode)?, self.cc)),
            0x3 => {
                // SUBD (A side) / ADDD (B side)
                let m = self.read_operand16(bus, mode)?;
                let (d, cc) = if use_b {
                    alu::add16(self.get_d(), m, self.cc)
                } else {
                    alu::sub16(self.get_d(), m, self.cc)
                };
                self.set_d(d);
                self.cc = cc;
                None
            }
            0x4 => Some(alu::and(acc, self.read_operand(bus, mode)?, self.cc)),
            0x5 => Some((acc, alu::bit(acc, self.read_operand(bus, mode)?, self.cc))),
            0x6 => {
                let value = self.read_operand(bus, mode)?;
                Some((value, alu::logic8(value, self.cc)))
            }
            0x7 => {
                self.store8(bus, mode, acc)?; // STA/STB
                None
            }
            0x8 => Some(alu::eor(acc, self.read_operand(bus, mode)?, self.cc)),
            0x9 => Some(alu::adc(acc, self.read_operand(bus, mode)?, self.cc)),
            0xA => Some(alu::or(acc, self.read_operand(bus, mode)?, self.cc)),
            0xB => Some(alu::add(acc, self.read_operand(bus, mode)?, self.cc)),
            0xC => {
                if use_b {
                    let d = self.load16(bus, mode)?; // LDD
                    self.set_d(d);
                } else {
                    self.compare16(bus, mode, self.x)?; // CMPX
                }
                None
            }
            0xD => {
                if use_b {
                    self.store16(bus, mode, self.get_d())?; // STD
                } else if mode == Mode::Immediate {
                    self.op_bsr(bus);
                } else {
                    let target = self.effective_address(bus, mode)?;
                    self.op_jsr(bus, target);
                }
                None
            }
            0xE => {
                // LDX (A side) / LDU (B side)
                let value = self.load16(bus, mode)?;
                if use_b {
                    self.u = value;
                } else {
                    self.x = value;
                }
                None
            }
            _ => {
                // STX (A side) / STU (B side)
                let value = if use_b { self.u } else { self.x };
                self.store16(bus, mode, value)?;
                None
            }
        };

        if let Some((value, cc)) = result {
            self.cc = cc;
            if use_b {
                self.b = value;
            } else {
                self.a = value;
            }
        }
        Ok(())
    }

    /// 0x10 page. Every entry reaching here has a table cost.
    fn execute_page2<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> Exec {
        if opcode == 0x3F {
            self.op_swi(bus, stack::VECTOR_SWI2);
            return Ok(());
        }
        if (0x21..=0x2F).contains(&opcode) {
            let taken = self.branch_condition(opcode & 0x0F);
            self.op_long_branch(bus, taken);
            if taken {
                self.extra += 1;
            }
            return Ok(());
        }

        let mode = Mode::of_accumulator_op(opcode);
        match opcode & 0x4F {
            0x03 => self.compare16(bus, mode, self.get_d())?, // CMPD
            0x0C => self.compare16(bus, mode, self.y)?,       // CMPY
            0x0E => self.y = self.load16(bus, mode)?,         // LDY
            0x0F => self.store16(bus, mode, self.y)?,         // STY
            0x4E => self.s = self.load16(bus, mode)?,         // LDS
            _ => self.store16(bus, mode, self.s)?,            // STS
        }
        Ok(())
    }

    /// 0x11 page.
    fn execute_page3<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> Exec {
        if opcode == 0x3F {
            self.op_swi(bus, stack::VECTOR_SWI3);
            return Ok(());
        }
        let mode = Mode::of_accumulator_op(opcode);
        if opcode & 0x0F == 0x03 {
            self.compare16(bus, mode, self.u) // CMPU
        } else {
            self.compare16(bus, mode, self.s) // CMPS
        }
    }
}

impl Cpu for M6809 {
    type Registers = M6809State;

    fn reset<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> M6809State {
        self.cwai = false;
        self.sync = false;
        self.dp = 0;
        self.cc = CcFlag::I as u8 | CcFlag::F as u8;
        self.pc = self.read_word(bus, stack::VECTOR_RESET);
        self.registers()
    }

    fn registers(&self) -> M6809State {
        M6809State {
            a: self.a,
            b: self.b,
            dp: self.dp,
            x: self.x,
            y: self.y,
            u: self.u,
            s: self.s,
            pc: self.pc,
            cc: self.cc,
        }
    }

    fn set_registers(&mut self, regs: &M6809State) {
        self.a = regs.a;
        self.b = regs.b;
        self.dp = regs.dp;
        self.x = regs.x;
        self.y = regs.y;
        self.u = regs.u;
        self.s = regs.s;
        self.pc = regs.pc;
        self.cc = regs.cc;
        self.cwai = false;
        self.sync = false;
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
        self.cwai || self.sync
    }
}
