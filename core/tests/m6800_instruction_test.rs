use eightbit_core::cpu::m6800::{CcFlag, M6800};
use eightbit_core::cpu::{Cpu, Exit, M6800State};
mod common;
use common::{TestBus, run, step_one};

fn setup(program: &[u8]) -> (M6800, TestBus) {
    let mut cpu = M6800::new();
    let mut bus = TestBus::new();
    bus.load(0x0100, program);
    cpu.pc = 0x0100;
    cpu.sp = 0x01FF;
    (cpu, bus)
}

// =============================================================================
// Loads and addressing modes
// =============================================================================

#[test]
fn test_ldaa_immediate() {
    let (mut cpu, mut bus) = setup(&[0x86, 0x42]);
    cpu.cc = CcFlag::V as u8;
    let result = step_one(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0x42);
    assert_eq!(cpu.pc, 0x0102);
    assert_eq!(result.cycles, 2);
    assert_eq!(cpu.cc & CcFlag::V as u8, 0);
}

#[test]
fn test_ldaa_direct_sets_negative() {
    let (mut cpu, mut bus) = setup(&[0x96, 0x10]);
    bus.memory[0x0010] = 0x80;
    let result = step_one(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0x80);
    assert_eq!(cpu.cc & CcFlag::N as u8, CcFlag::N as u8);
    assert_eq!(result.cycles, 3);
}

#[test]
fn test_ldaa_indexed_sets_zero() {
    let (mut cpu, mut bus) = setup(&[0xA6, 0x05]);
    cpu.x = 0x2000;
    cpu.a = 0xFF;
    let result = step_one(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0x00);
    assert_eq!(cpu.cc & CcFlag::Z as u8, CcFlag::Z as u8);
    assert_eq!(result.cycles, 5);
}

#[test]
fn test_ldaa_extended() {
    let (mut cpu, mut bus) = setup(&[0xB6, 0x30, 0x00]);
    bus.memory[0x3000] = 0x7F;
    let result = step_one(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0x7F);
    assert_eq!(cpu.pc, 0x0103);
    assert_eq!(result.cycles, 4);
}

#[test]
fn test_ldab_immediate() {
    let (mut cpu, mut bus) = setup(&[0xC6, 0x01]);
    step_one(&mut cpu, &mut bus);
    assert_eq!(cpu.b, 0x01);
    assert_eq!(cpu.a, 0x00);
}

#[test]
fn test_staa_extended() {
    let (mut cpu, mut bus) = setup(&[0xB7, 0x40, 0x00]);
    cpu.a = 0x99;
    let result = step_one(&mut cpu, &mut bus);
    assert_eq!(bus.memory[0x4000], 0x99);
    assert_eq!(cpu.cc & CcFlag::N as u8, CcFlag::N as u8);
    assert_eq!(result.cycles, 5);
}

#[test]
fn test_ldx_stx() {
    let (mut cpu, mut bus) = setup(&[0xCE, 0x12, 0x34, 0xDF, 0x40]);
    let result = step_one(&mut cpu, &mut bus);
    assert_eq!(cpu.x, 0x1234);
    assert_eq!(result.cycles, 3);
    let result = step_one(&mut cpu, &mut bus);
    assert_eq!(bus.memory[0x0040], 0x12);
    assert_eq!(bus.memory[0x0041], 0x34);
    assert_eq!(result.cycles, 5);
}

#[test]
fn test_lds_immediate() {
    let (mut cpu, mut bus) = setup(&[0x8E, 0x80, 0x00]);
    step_one(&mut cpu, &mut bus);
    assert_eq!(cpu.sp, 0x8000);
    assert_eq!(cpu.cc & CcFlag::N as u8, CcFlag::N as u8);
}

// =============================================================================
// Arithmetic through the dispatcher
// =============================================================================

#[test]
fn test_adda_overflow() {
    let (mut cpu, mut bus) = setup(&[0x8B, 0x01]);
    cpu.a = 0x7F;
    step_one(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0x80);
    assert_eq!(cpu.cc & CcFlag::V as u8, CcFlag::V as u8);
    assert_eq!(cpu.cc & CcFlag::N as u8, CcFlag::N as u8);
    assert_eq!(cpu.cc & CcFlag::C as u8, 0);
}

#[test]
fn test_subb_direct() {
    let (mut cpu, mut bus) = setup(&[0xD0, 0x20]);
    cpu.b = 0x05;
    bus.memory[0x0020] = 0x06;
    step_one(&mut cpu, &mut bus);
    assert_eq!(cpu.b, 0xFF);
    assert_eq!(cpu.cc & CcFlag::C as u8, CcFlag::C as u8);
}

#[test]
fn test_cmpa_leaves_accumulator() {
    let (mut cpu, mut bus) = setup(&[0x81, 0x10]);
    cpu.a = 0x10;
    step_one(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0x10);
    assert_eq!(cpu.cc & CcFlag::Z as u8, CcFlag::Z as u8);
}

#[test]
fn test_cpx_immediate() {
    let (mut cpu, mut bus) = setup(&[0x8C, 0x12, 0x34]);
    cpu.x = 0x1234;
    let result = step_one(&mut cpu, &mut bus);
    assert_eq!(cpu.cc & CcFlag::Z as u8, CcFlag::Z as u8);
    assert_eq!(result.cycles, 3);
}

#[test]
fn test_aba_sba_cba() {
    let (mut cpu, mut bus) = setup(&[0x1B, 0x10, 0x11]);
    cpu.a = 0x10;
    cpu.b = 0x20;
    step_one(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0x30);
    step_one(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0x10);
    step_one(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0x10);
    assert_eq!(cpu.cc & CcFlag::C as u8, CcFlag::C as u8);
}

#[test]
fn test_decimal_adjust_sequence() {
    // LDAA #$19 ; ADDA #$28 ; DAA
    let (mut cpu, mut bus) = setup(&[0x86, 0x19, 0x8B, 0x28, 0x19]);
    let result = run(&mut cpu, &mut bus, 6);
    assert_eq!(cpu.a, 0x47);
    assert_eq!(result.cycles, 6);
}

#[test]
fn test_decb_accumulator_form() {
    let (mut cpu, mut bus) = setup(&[0x5A]);
    step_one(&mut cpu, &mut bus);
    assert_eq!(cpu.b, 0xFF);
    assert_eq!(cpu.cc & CcFlag::N as u8, CcFlag::N as u8);
}

// =============================================================================
// Memory read-modify-write
// =============================================================================

#[test]
fn test_inc_indexed() {
    let (mut cpu, mut bus) = setup(&[0x6C, 0x00]);
    cpu.x = 0x0050;
    bus.memory[0x0050] = 0x7F;
    let result = step_one(&mut cpu, &mut bus);
    assert_eq!(bus.memory[0x0050], 0x80);
    assert_eq!(cpu.cc & CcFlag::V as u8, CcFlag::V as u8);
    assert_eq!(result.cycles, 7);
}

#[test]
fn test_clr_extended() {
    let (mut cpu, mut bus) = setup(&[0x7F, 0x30, 0x00]);
    bus.memory[0x3000] = 0xAA;
    cpu.cc = CcFlag::C as u8 | CcFlag::N as u8;
    let result = step_one(&mut cpu, &mut bus);
    assert_eq!(bus.memory[0x3000], 0x00);
    assert_eq!(cpu.cc, CcFlag::Z as u8);
    assert_eq!(result.cycles, 6);
}

#[test]
fn test_tst_extended_reads_only() {
    let (mut cpu, mut bus) = setup(&[0x7D, 0x30, 0x00]);
    bus.memory[0x3000] = 0x80;
    cpu.cc = CcFlag::C as u8;
    step_one(&mut cpu, &mut bus);
    assert_eq!(bus.memory[0x3000], 0x80);
    assert_eq!(cpu.cc, CcFlag::N as u8);
}

#[test]
fn test_jmp_indexed() {
    let (mut cpu, mut bus) = setup(&[0x6E, 0x04]);
    cpu.x = 0x3000;
    let result = step_one(&mut cpu, &mut bus);
    assert_eq!(cpu.pc, 0x3004);
    assert_eq!(result.cycles, 4);
}

// =============================================================================
// Branches, subroutines, stack
// =============================================================================

#[test]
fn test_beq_taken_and_not_taken() {
    let (mut cpu, mut bus) = setup(&[0x27, 0x10]);
    cpu.cc = CcFlag::Z as u8;
    let result = step_one(&mut cpu, &mut bus);
    assert_eq!(cpu.pc, 0x0112);
    assert_eq!(result.cycles, 4);

    let (mut cpu, mut bus) = setup(&[0x27, 0x10]);
    let result = step_one(&mut cpu, &mut bus);
    assert_eq!(cpu.pc, 0x0102);
    assert_eq!(result.cycles, 4);
}

#[test]
fn test_bra_backward() {
    let (mut cpu, mut bus) = setup(&[0x20, 0xFE]);
    step_one(&mut cpu, &mut bus);
    assert_eq!(cpu.pc, 0x0100);
}

#[test]
fn test_signed_branches() {
    // BLT with N set, V clear
    let (mut cpu, mut bus) = setup(&[0x2D, 0x02]);
    cpu.cc = CcFlag::N as u8;
    step_one(&mut cpu, &mut bus);
    assert_eq!(cpu.pc, 0x0104);

    // BGT with N and V both set
    let (mut cpu, mut bus) = setup(&[0x2E, 0x02]);
    cpu.cc = CcFlag::N as u8 | CcFlag::V as u8;
    step_one(&mut cpu, &mut bus);
    assert_eq!(cpu.pc, 0x0104);
}

#[test]
fn test_bsr_pushes_return_address() {
    let (mut cpu, mut bus) = setup(&[0x8D, 0x10]);
    let result = step_one(&mut cpu, &mut bus);
    assert_eq!(cpu.pc, 0x0112);
    assert_eq!(cpu.sp, 0x01FD);
    assert_eq!(bus.word_be(0x01FE), 0x0102);
    assert_eq!(result.cycles, 8);
}

#[test]
fn test_jsr_rts_round_trip() {
    let (mut cpu, mut bus) = setup(&[0xBD, 0x20, 0x00]);
    bus.memory[0x2000] = 0x39; // RTS
    let result = step_one(&mut cpu, &mut bus);
    assert_eq!(cpu.pc, 0x2000);
    assert_eq!(result.cycles, 9);
    let result = step_one(&mut cpu, &mut bus);
    assert_eq!(cpu.pc, 0x0103);
    assert_eq!(cpu.sp, 0x01FF);
    assert_eq!(result.cycles, 5);
}

#[test]
fn test_jsr_indexed() {
    let (mut cpu, mut bus) = setup(&[0xAD, 0x10]);
    cpu.x = 0x2000;
    let result = step_one(&mut cpu, &mut bus);
    assert_eq!(cpu.pc, 0x2010);
    assert_eq!(bus.word_be(0x01FE), 0x0102);
    assert_eq!(result.cycles, 8);
}

#[test]
fn test_psha_pulb() {
    let (mut cpu, mut bus) = setup(&[0x36, 0x33]);
    cpu.a = 0x5A;
    step_one(&mut cpu, &mut bus);
    assert_eq!(bus.memory[0x01FF], 0x5A);
    assert_eq!(cpu.sp, 0x01FE);
    step_one(&mut cpu, &mut bus);
    assert_eq!(cpu.b, 0x5A);
    assert_eq!(cpu.sp, 0x01FF);
}

#[test]
fn test_tsx_txs_offset_by_one() {
    let (mut cpu, mut bus) = setup(&[0x30, 0x35]);
    step_one(&mut cpu, &mut bus);
    assert_eq!(cpu.x, 0x0200);
    cpu.x = 0x0300;
    step_one(&mut cpu, &mut bus);
    assert_eq!(cpu.sp, 0x02FF);
}

#[test]
fn test_inx_affects_only_zero() {
    let (mut cpu, mut bus) = setup(&[0x08]);
    cpu.x = 0xFFFF;
    cpu.cc = CcFlag::N as u8;
    step_one(&mut cpu, &mut bus);
    assert_eq!(cpu.x, 0x0000);
    assert_eq!(cpu.cc, CcFlag::N as u8 | CcFlag::Z as u8);
}

#[test]
fn test_tap_tpa() {
    let (mut cpu, mut bus) = setup(&[0x06, 0x07]);
    cpu.a = 0xFF;
    step_one(&mut cpu, &mut bus);
    assert_eq!(cpu.cc, 0x3F);
    cpu.cc = 0x05;
    step_one(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0xC5);
}

// =============================================================================
// Budget accounting
// =============================================================================

#[test]
fn test_budget_exactly_spent() {
    // LDAA #1 ; ADDA #2 ; STAA $20 ; NOP
    let (mut cpu, mut bus) = setup(&[0x86, 0x01, 0x8B, 0x02, 0x97, 0x20, 0x01]);
    let result = run(&mut cpu, &mut bus, 10);
    assert_eq!(result.cycles, 10);
    assert_eq!(result.remaining, 0);
    assert_eq!(result.exit, Exit::BudgetSpent);
    assert_eq!(bus.memory[0x0020], 0x03);
    assert_eq!(cpu.pc, 0x0107);
}

#[test]
fn test_budget_overshoot_goes_negative() {
    let (mut cpu, mut bus) = setup(&[0x86, 0x01, 0x86, 0x02]);
    let result = run(&mut cpu, &mut bus, 3);
    assert_eq!(cpu.a, 0x02);
    assert_eq!(result.cycles, 4);
    assert_eq!(result.remaining, -1);
}

#[test]
fn test_zero_budget_executes_nothing() {
    let (mut cpu, mut bus) = setup(&[0x86, 0x01]);
    let result = run(&mut cpu, &mut bus, 0);
    assert_eq!(result.cycles, 0);
    assert_eq!(result.exit, Exit::BudgetSpent);
    assert_eq!(cpu.pc, 0x0100);
    assert_eq!(cpu.a, 0x00);
}

// =============================================================================
// Illegal opcodes
// =============================================================================

#[test]
fn test_illegal_opcode_stops_run() {
    let (mut cpu, mut bus) = setup(&[0x01, 0x02]);
    let result = run(&mut cpu, &mut bus, 100);
    assert_eq!(
        result.exit,
        Exit::Illegal {
            pc: 0x0101,
            opcode: 0x02
        }
    );
    assert_eq!(result.cycles, 2);
    assert_eq!(result.remaining, 0);
    assert_eq!(cpu.pc, 0x0102);
}

#[test]
fn test_opcode_0x21_is_illegal() {
    let (mut cpu, mut bus) = setup(&[0x21, 0x00]);
    let result = step_one(&mut cpu, &mut bus);
    assert_eq!(
        result.exit,
        Exit::Illegal {
            pc: 0x0100,
            opcode: 0x21
        }
    );
}

// =============================================================================
// Register access and determinism
// =============================================================================

#[test]
fn test_set_registers_round_trip() {
    let mut cpu = M6800::new();
    let regs = M6800State {
        a: 1,
        b: 2,
        x: 0x0304,
        sp: 0x0506,
        pc: 0x0708,
        cc: 0x09,
    };
    cpu.set_registers(&regs);
    assert_eq!(cpu.registers(), regs);
}

#[test]
fn test_same_program_same_outcome() {
    let program = [
        0xCE, 0x00, 0x40, // LDX #$0040
        0x86, 0x05, // LDAA #5
        0xA7, 0x00, // STAA 0,X
        0x08, // INX
        0x4A, // DECA
        0x26, 0xFA, // BNE back to STAA
        0x01, // NOP
    ];
    let (mut cpu1, mut bus1) = setup(&program);
    let (mut cpu2, mut bus2) = setup(&program);
    let r1 = run(&mut cpu1, &mut bus1, 200);
    let r2 = run(&mut cpu2, &mut bus2, 200);
    assert_eq!(r1, r2);
    assert_eq!(cpu1.registers(), cpu2.registers());
    assert_eq!(bus1.memory[..], bus2.memory[..]);
    assert_eq!(&bus1.memory[0x40..0x45], &[5, 4, 3, 2, 1]);
}
