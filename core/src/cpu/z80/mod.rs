pub mod alu;
mod bit;
mod block;
mod branch;
mod extended;
mod load_store;
mod stack;

use crate::core::{Bus, PendingInterrupts};
use crate::cpu::{Cpu, InterruptMode, Progress, StepResult, run_budget, state::Z80State};

#[repr(u8)]
#[derive(Copy, Clone, Debug)]
pub enum Flag {
    C = 0x01,  // Carry
    N = 0x02,  // Add/Subtract
    PV = 0x04, // Parity/Overflow
    X = 0x08,  // Unused (copy of bit 3)
    H = 0x10,  // Half Carry
    Y = 0x20,  // Unused (copy of bit 5)
    Z = 0x40,  // Zero
    S = 0x80,  // Sign
}

/// T-states for unprefixed opcodes. Conditional jumps, calls and returns
/// list the not-taken cost; the prefixes CB DD ED FD are zero here and
/// costed by their own tables.
#[rustfmt::skip]
pub const CYCLES: [u8; 256] = [
 // 0   1   2   3   4   5   6   7   8   9   A   B   C   D   E   F
    4, 10,  7,  6,  4,  4,  7,  4,  4, 11,  7,  6,  4,  4,  7,  4, // 0
    8, 10,  7,  6,  4,  4,  7,  4, 12, 11,  7,  6,  4,  4,  7,  4, // 1
    7, 10, 16,  6,  4,  4,  7,  4,  7, 11, 16,  6,  4,  4,  7,  4, // 2
    7, 10, 13,  6, 11, 11, 10,  4,  7, 11, 13,  6,  4,  4,  7,  4, // 3
    4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 4
    4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 5
    4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 6
    7,  7,  7,  7,  7,  7,  4,  7,  4,  4,  4,  4,  4,  4,  7,  4, // 7
    4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 8
    4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 9
    4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // A
    4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // B
    5, 10, 10, 10, 10, 11,  7, 11,  5, 10, 10,  0, 10, 17,  7, 11, // C
    5, 10, 10, 11, 10, 11,  7, 11,  5,  4, 10, 11, 10,  0,  7, 11, // D
    5, 10, 10, 19, 10, 11,  7, 11,  5,  4, 10,  4, 10,  0,  7, 11, // E
    5, 10, 10,  4, 10, 11,  7, 11,  5,  6, 10,  4, 10,  0,  7, 11, // F
];

/// T-states for ED-prefixed opcodes, prefix included. Zero marks an
/// opcode with no defined behaviour. Repeating block instructions add 5
/// for each pass that loops.
#[rustfmt::skip]
pub const ED_CYCLES: [u8; 256] = [
 // 0   1   2   3   4   5   6   7   8   9   A   B   C   D   E   F
    0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0, // 0
    0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0, // 1
    0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0, // 2
    0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0, // 3
   12, 12, 15, 20,  8, 14,  8,  9, 12, 12, 15, 20,  8, 14,  8,  9, // 4
   12, 12, 15, 20,  8, 14,  8,  9, 12, 12, 15, 20,  8, 14,  8,  9, // 5
   12, 12, 15, 20,  8, 14,  8, 18, 12, 12, 15, 20,  8, 14,  8, 18, // 6
   12, 12, 15, 20,  8, 14,  8,  8, 12, 12, 15, 20,  8, 14,  8,  8, // 7
    0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0, // 8
    0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0, // 9
   16, 16, 16, 16,  0,  0,  0,  0, 16, 16, 16, 16,  0,  0,  0,  0, // A
   16, 16, 16, 16,  0,  0,  0,  0, 16, 16, 16, 16,  0,  0,  0,  0, // B
    0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0, // C
    0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0, // D
    0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0, // E
    0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0, // F
];

/// Which register a DD/FD prefix substitutes for HL in the next opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexMode {
    HL,
    IX,
    IY,
}

pub struct Z80 {
    // Registers
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    // Shadow Registers
    pub a_prime: u8,
    pub f_prime: u8,
    pub b_prime: u8,
    pub c_prime: u8,
    pub d_prime: u8,
    pub e_prime: u8,
    pub h_prime: u8,
    pub l_prime: u8,
    // Index & Special Registers
    pub ix: u16,
    pub iy: u16,
    pub i: u8,
    pub r: u8,
    pub sp: u16,
    pub pc: u16,

    pub iff1: bool,
    pub iff2: bool,
    pub im: InterruptMode,

    /// Parked on HALT with PC on the HALT opcode.
    pub(crate) halted: bool,
    /// Set by EI: maskable interrupts wait one more instruction.
    pub(crate) ei_delay: bool,
    /// Prefix state for the instruction being executed.
    pub(crate) index_mode: IndexMode,
}

impl Default for Z80 {
    fn default() -> Self {
        Self::new()
    }
}

impl Z80 {
    pub fn new() -> Self {
        Self {
            a: 0xFF,
            f: 0xFF,
            b: 0,
            c: 0,
            d: 0,
            e: 0,
            h: 0,
            l: 0,
            a_prime: 0,
            f_prime: 0,
            b_prime: 0,
            c_prime: 0,
            d_prime: 0,
            e_prime: 0,
            h_prime: 0,
            l_prime: 0,
            ix: 0,
            iy: 0,
            i: 0,
            r: 0,
            sp: 0xFFFF,
            pc: 0x0000,
            iff1: false,
            iff2: false,
            im: InterruptMode::Im0,
            halted: false,
            ei_delay: false,
            index_mode: IndexMode::HL,
        }
    }

    // Helpers for 16-bit register access
    pub fn get_bc(&self) -> u16 { u16::from_be_bytes([self.b, self.c]) }
    pub fn set_bc(&mut self, val: u16) { [self.b, self.c] = val.to_be_bytes(); }

    pub fn get_de(&self) -> u16 { u16::from_be_bytes([self.d, self.e]) }
    pub fn set_de(&mut self, val: u16) { [self.d, self.e] = val.to_be_bytes(); }

    pub fn get_hl(&self) -> u16 { u16::from_be_bytes([self.h, self.l]) }
    pub fn set_hl(&mut self, val: u16) { [self.h, self.l] = val.to_be_bytes(); }

    pub fn get_af(&self) -> u16 { u16::from_be_bytes([self.a, self.f]) }
    pub fn set_af(&mut self, val: u16) { [self.a, self.f] = val.to_be_bytes(); }

    /// HL, IX or IY depending on the active prefix.
    pub(crate) fn get_index(&self) -> u16 {
        match self.index_mode {
            IndexMode::HL => self.get_hl(),
            IndexMode::IX => self.ix,
            IndexMode::IY => self.iy,
        }
    }

    pub(crate) fn set_index(&mut self, val: u16) {
        match self.index_mode {
            IndexMode::HL => self.set_hl(val),
            IndexMode::IX => self.ix = val,
            IndexMode::IY => self.iy = val,
        }
    }

    /// Register pair by index (0=BC, 1=DE, 2=HL/IX/IY, 3=SP).
    pub(crate) fn get_rp(&self, index: u8) -> u16 {
        match index & 0x03 {
            0 => self.get_bc(),
            1 => self.get_de(),
            2 => self.get_index(),
            _ => self.sp,
        }
    }

    pub(crate) fn set_rp(&mut self, index: u8, val: u16) {
        match index & 0x03 {
            0 => self.set_bc(val),
            1 => self.set_de(val),
            2 => self.set_index(val),
            _ => self.sp = val,
        }
    }

    /// Register pair for PUSH/POP (0=BC, 1=DE, 2=HL/IX/IY, 3=AF).
    pub(crate) fn get_rp_af(&self, index: u8) -> u16 {
        match index & 0x03 {
            3 => self.get_af(),
            i => self.get_rp(i),
        }
    }

    pub(crate) fn set_rp_af(&mut self, index: u8, val: u16) {
        match index & 0x03 {
            3 => self.set_af(val),
            i => self.set_rp(i, val),
        }
    }

    /// 8-bit register by opcode field (0=B 1=C 2=D 3=E 4=H 5=L 7=A).
    /// Index 6 is the memory operand and is handled by the caller; it
    /// reads as F here so the match stays total.
    pub fn get_reg8(&self, index: u8) -> u8 {
        match index & 0x07 {
            0 => self.b,
            1 => self.c,
            2 => self.d,
            3 => self.e,
            4 => self.h,
            5 => self.l,
            6 => self.f,
            _ => self.a,
        }
    }

    pub fn set_reg8(&mut self, index: u8, val: u8) {
        match index & 0x07 {
            0 => self.b = val,
            1 => self.c = val,
            2 => self.d = val,
            3 => self.e = val,
            4 => self.h = val,
            5 => self.l = val,
            6 => self.f = val,
            _ => self.a = val,
        }
    }

    /// As [`get_reg8`](Self::get_reg8), but H and L become the halves of
    /// IX/IY under a prefix (undocumented IXH/IXL/IYH/IYL).
    pub fn get_reg8_ix(&self, index: u8) -> u8 {
        match (index, self.index_mode) {
            (4, IndexMode::IX) => (self.ix >> 8) as u8,
            (5, IndexMode::IX) => self.ix as u8,
            (4, IndexMode::IY) => (self.iy >> 8) as u8,
            (5, IndexMode::IY) => self.iy as u8,
            _ => self.get_reg8(index),
        }
    }

    pub fn set_reg8_ix(&mut self, index: u8, val: u8) {
        match (index, self.index_mode) {
            (4, IndexMode::IX) => self.ix = (self.ix & 0x00FF) | ((val as u16) << 8),
            (5, IndexMode::IX) => self.ix = (self.ix & 0xFF00) | val as u16,
            (4, IndexMode::IY) => self.iy = (self.iy & 0x00FF) | ((val as u16) << 8),
            (5, IndexMode::IY) => self.iy = (self.iy & 0xFF00) | val as u16,
            _ => self.set_reg8(index, val),
        }
    }

    /// M1 fetch: read at PC and bump the low seven bits of R.
    pub(crate) fn fetch_opcode<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u8 {
        self.r = (self.r & 0x80) | (self.r.wrapping_add(1) & 0x7F);
        self.fetch_byte(bus)
    }

    fn next<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        pending: &mut PendingInterrupts,
    ) -> Progress {
        if let Some(cycles) = self.service_interrupts(bus, pending) {
            return Progress::Ran(cycles);
        }
        if self.halted {
            return Progress::Wait(0);
        }

        let opcode_pc = self.pc;
        self.index_mode = IndexMode::HL;
        let mut prefix_cycles = 0;
        let mut opcode = self.fetch_opcode(bus);

        if opcode == 0xDD || opcode == 0xFD {
            // A prefix followed by another prefix is a 4 T-state NOP, with
            // PC left on the next prefix and IRQ held off until it runs.
            if matches!(bus.read(self.pc), 0xDD | 0xFD) {
                self.ei_delay = true;
                return Progress::Ran(4);
            }
            self.index_mode = if opcode == 0xDD { IndexMode::IX } else { IndexMode::IY };
            prefix_cycles = 4;
            opcode = self.fetch_opcode(bus);
        }

        match opcode {
            0xCB if self.index_mode == IndexMode::HL => {
                let op = self.fetch_opcode(bus);
                Progress::Ran(self.execute_cb(op, bus))
            }
            0xCB => {
                let cycles = self.execute_index_cb(bus);
                Progress::Ran(prefix_cycles - 4 + cycles)
            }
            0xED => {
                // ED cancels any index prefix; the DD/FD bytes cost 4 each.
                self.index_mode = IndexMode::HL;
                let op = self.fetch_opcode(bus);
                let cycles = ED_CYCLES[op as usize] as u32;
                if cycles == 0 {
                    return Progress::Illegal { pc: opcode_pc, opcode: op };
                }
                Progress::Ran(prefix_cycles + cycles + self.execute_ed(op, bus))
            }
            0x76 => match self.op_halt(bus, pending, self.pc.wrapping_sub(1)) {
                Some(ack) => Progress::Ran(prefix_cycles + CYCLES[0x76] as u32 + ack),
                None => Progress::Wait(prefix_cycles + CYCLES[0x76] as u32),
            },
            _ => {
                let base = if self.index_mode == IndexMode::HL {
                    CYCLES[opcode as usize] as u32
                } else {
                    prefix_cycles - 4 + indexed_cycles(opcode)
                };
                let extra = self.execute_main(opcode, bus);
                if opcode == 0xFB {
                    self.ei_delay = true;
                }
                Progress::Ran(base + extra)
            }
        }
    }

    /// Unprefixed and DD/FD-prefixed opcodes. Returns cycles beyond the
    /// table cost (taken branches, calls, returns).
    fn execute_main<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> u32 {
        let x = opcode >> 6;
        let y = (opcode >> 3) & 0x07;
        let z = opcode & 0x07;
        let p = y >> 1;
        let q = y & 0x01;

        match (x, z) {
            (0, 0) => return self.execute_relative(y, bus),
            (0, 1) if q == 0 => {
                let nn = self.fetch_word(bus);
                self.set_rp(p, nn);
            }
            (0, 1) => {
                let (r, f) = alu::add16(self.get_index(), self.get_rp(p), self.f);
                self.set_index(r);
                self.f = f;
            }
            (0, 2) => self.op_ld_indirect(p, q, bus),
            (0, 3) if q == 0 => self.set_rp(p, self.get_rp(p).wrapping_add(1)),
            (0, 3) => self.set_rp(p, self.get_rp(p).wrapping_sub(1)),
            (0, 4) => self.modify_r(y, bus, alu::inc8),
            (0, 5) => self.modify_r(y, bus, alu::dec8),
            (0, 6) => self.op_ld_r_n(y, bus),
            (0, _) => self.execute_accumulator(y),
            (1, _) => self.op_ld_r_r(y, z, bus),
            (2, _) => {
                let v = self.read_r(z, bus);
                self.alu_a(y, v);
            }
            (_, 6) => {
                let n = self.fetch_byte(bus);
                self.alu_a(y, n);
            }
            _ => return self.execute_control(y, z, bus),
        }
        0
    }

    /// x=0, z=7: RLCA RRCA RLA RRA DAA CPL SCF CCF.
    fn execute_accumulator(&mut self, y: u8) {
        match y {
            0 => (self.a, self.f) = alu::rlca(self.a, self.f),
            1 => (self.a, self.f) = alu::rrca(self.a, self.f),
            2 => (self.a, self.f) = alu::rla(self.a, self.f),
            3 => (self.a, self.f) = alu::rra(self.a, self.f),
            4 => (self.a, self.f) = alu::daa(self.a, self.f),
            5 => (self.a, self.f) = alu::cpl(self.a, self.f),
            6 => self.f = alu::scf(self.a, self.f),
            _ => self.f = alu::ccf(self.a, self.f),
        }
    }

    /// x=3 except the immediate ALU row: returns, jumps, calls, stack,
    /// exchanges, port I/O and interrupt enables.
    fn execute_control<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, y: u8, z: u8, bus: &mut B) -> u32 {
        let p = y >> 1;
        let q = y & 0x01;
        match z {
            0 => return self.op_ret_cc(y, bus),
            1 if q == 0 => {
                let v = self.pop_word(bus);
                self.set_rp_af(p, v);
            }
            1 => match p {
                0 => self.pc = self.pop_word(bus), // RET
                1 => self.exx(),
                2 => self.pc = self.get_index(), // JP (HL)
                _ => self.sp = self.get_index(), // LD SP,HL
            },
            2 => self.op_jp_cc(y, bus),
            3 => match y {
                0 => self.pc = self.fetch_word(bus),
                2 => {
                    // OUT (n),A
                    let n = self.fetch_byte(bus);
                    bus.io_write(u16::from_be_bytes([self.a, n]), self.a);
                }
                3 => {
                    // IN A,(n): flags untouched
                    let n = self.fetch_byte(bus);
                    self.a = bus.io_read(u16::from_be_bytes([self.a, n]));
                }
                4 => self.op_ex_sp(bus),
                5 => {
                    // EX DE,HL ignores the index prefix
                    let de = self.get_de();
                    self.set_de(self.get_hl());
                    self.set_hl(de);
                }
                6 => {
                    self.iff1 = false;
                    self.iff2 = false;
                }
                7 => {
                    self.iff1 = true;
                    self.iff2 = true;
                }
                // y=1 is the CB prefix, dispatched before we get here.
                _ => {}
            },
            4 => return self.op_call_cc(y, bus),
            5 if q == 0 => {
                let v = self.get_rp_af(p);
                self.push_word(bus, v);
            }
            5 => {
                // p=0 CALL nn; the other slots are prefixes handled in next()
                let target = self.fetch_word(bus);
                self.push_word(bus, self.pc);
                self.pc = target;
            }
            _ => {
                // RST
                self.push_word(bus, self.pc);
                self.pc = (y as u16) * 8;
            }
        }
        0
    }

    /// EX AF,AF' lives with the relative jumps in x=0, z=0; EXX is here.
    fn exx(&mut self) {
        std::mem::swap(&mut self.b, &mut self.b_prime);
        std::mem::swap(&mut self.c, &mut self.c_prime);
        std::mem::swap(&mut self.d, &mut self.d_prime);
        std::mem::swap(&mut self.e, &mut self.e_prime);
        std::mem::swap(&mut self.h, &mut self.h_prime);
        std::mem::swap(&mut self.l, &mut self.l_prime);
    }

    pub(crate) fn ex_af(&mut self) {
        std::mem::swap(&mut self.a, &mut self.a_prime);
        std::mem::swap(&mut self.f, &mut self.f_prime);
    }
}

/// Cost of a DD/FD-prefixed opcode including one prefix byte. Opcodes that
/// touch (HL) become (IX+d) and pay for the displacement; the rest cost
/// four more than unprefixed.
fn indexed_cycles(opcode: u8) -> u32 {
    let base = CYCLES[opcode as usize] as u32;
    match opcode {
        0x36 => 19,
        0x34 | 0x35 => 23,
        0x46 | 0x4E | 0x56 | 0x5E | 0x66 | 0x6E | 0x7E => 19,
        0x70..=0x75 | 0x77 => 19,
        op if op & 0xC7 == 0x86 => 19,
        _ => base + 4,
    }
}

impl Cpu for Z80 {
    type Registers = Z80State;

    /// PC=0, SP=0xFFFF, A=F=0xFF, IM 0 and interrupts disabled.
    fn reset<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, _bus: &mut B) -> Z80State {
        self.pc = 0;
        self.sp = 0xFFFF;
        self.a = 0xFF;
        self.f = 0xFF;
        self.i = 0;
        self.r = 0;
        self.iff1 = false;
        self.iff2 = false;
        self.im = InterruptMode::Im0;
        self.halted = false;
        self.ei_delay = false;
        self.registers()
    }

    fn registers(&self) -> Z80State {
        Z80State {
            a: self.a,
            f: self.f,
            b: self.b,
            c: self.c,
            d: self.d,
            e: self.e,
            h: self.h,
            l: self.l,
            a_prime: self.a_prime,
            f_prime: self.f_prime,
            b_prime: self.b_prime,
            c_prime: self.c_prime,
            d_prime: self.d_prime,
            e_prime: self.e_prime,
            h_prime: self.h_prime,
            l_prime: self.l_prime,
            ix: self.ix,
            iy: self.iy,
            sp: self.sp,
            pc: self.pc,
            i: self.i,
            r: self.r,
            iff1: self.iff1,
            iff2: self.iff2,
            im: self.im,
        }
    }

    fn set_registers(&mut self, regs: &Z80State) {
        self.a = regs.a;
        self.f = regs.f;
        self.b = regs.b;
        self.c = regs.c;
        self.d = regs.d;
        self.e = regs.e;
        self.h = regs.h;
        self.l = regs.l;
        self.a_prime = regs.a_prime;
        self.f_prime = regs.f_prime;
        self.b_prime = regs.b_prime;
        self.c_prime = regs.c_prime;
        self.d_prime = regs.d_prime;
        self.e_prime = regs.e_prime;
        self.h_prime = regs.h_prime;
        self.l_prime = regs.l_prime;
        self.ix = regs.ix;
        self.iy = regs.iy;
        self.sp = regs.sp;
        self.pc = regs.pc;
        self.i = regs.i;
        self.r = regs.r;
        self.iff1 = regs.iff1;
        self.iff2 = regs.iff2;
        self.im = regs.im;
        self.halted = false;
        self.ei_delay = false;
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
        self.halted
    }
}
