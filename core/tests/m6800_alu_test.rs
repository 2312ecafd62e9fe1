/// Truth-table checks for the 6800 flag primitives, independent of the
/// dispatcher.
use eightbit_core::cpu::m6800::{CcFlag, alu};
use rand::Rng;

const C: u8 = CcFlag::C as u8;
const V: u8 = CcFlag::V as u8;
const Z: u8 = CcFlag::Z as u8;
const N: u8 = CcFlag::N as u8;
const H: u8 = CcFlag::H as u8;
const I: u8 = CcFlag::I as u8;

// =============================================================================
// ADD / ADC
// =============================================================================

#[test]
fn test_add_positive_overflow() {
    let (r, cc) = alu::add(0x7F, 0x01, 0);
    assert_eq!(r, 0x80);
    assert_eq!(cc & V, V);
    assert_eq!(cc & N, N);
    assert_eq!(cc & C, 0);
    assert_eq!(cc & Z, 0);
    assert_eq!(cc & H, H); // 0xF + 0x1 carries out of bit 3
}

#[test]
fn test_add_carry_to_zero() {
    let (r, cc) = alu::add(0xFF, 0x01, 0);
    assert_eq!(r, 0x00);
    assert_eq!(cc, Z | C | H);
}

#[test]
fn test_add_negative_overflow() {
    let (r, cc) = alu::add(0x80, 0x80, 0);
    assert_eq!(r, 0x00);
    assert_eq!(cc, Z | V | C);
}

#[test]
fn test_add_preserves_interrupt_mask() {
    let (_, cc) = alu::add(0x01, 0x01, I);
    assert_eq!(cc, I);
}

#[test]
fn test_adc_uses_carry_in() {
    let (r, cc) = alu::adc(0x00, 0x00, C);
    assert_eq!(r, 0x01);
    assert_eq!(cc & C, 0);

    let (r, cc) = alu::adc(0x7F, 0x00, C);
    assert_eq!(r, 0x80);
    assert_eq!(cc & V, V);
}

// =============================================================================
// SUB / SBC / CMP
// =============================================================================

#[test]
fn test_sub_borrow() {
    let (r, cc) = alu::sub(0x00, 0x01, 0);
    assert_eq!(r, 0xFF);
    assert_eq!(cc, N | C);
}

#[test]
fn test_sub_overflow() {
    let (r, cc) = alu::sub(0x80, 0x01, 0);
    assert_eq!(r, 0x7F);
    assert_eq!(cc, V);
}

#[test]
fn test_sbc_with_borrow_in() {
    let (r, cc) = alu::sbc(0x00, 0x00, C);
    assert_eq!(r, 0xFF);
    assert_eq!(cc, N | C);
}

#[test]
fn test_cmp_sets_borrow_when_lower() {
    // Motorola compare: C is the borrow, the opposite polarity to the 6502.
    let cc = alu::cmp(0x10, 0x20, 0);
    assert_eq!(cc, N | C);
    let cc = alu::cmp(0x20, 0x20, 0);
    assert_eq!(cc, Z);
}

// =============================================================================
// Logic
// =============================================================================

#[test]
fn test_logic_clears_overflow_keeps_carry() {
    let (r, cc) = alu::and(0xF0, 0x0F, V | C);
    assert_eq!(r, 0);
    assert_eq!(cc, Z | C);

    let (r, cc) = alu::or(0x80, 0x01, V);
    assert_eq!(r, 0x81);
    assert_eq!(cc, N);

    let (r, cc) = alu::eor(0xFF, 0xFF, 0);
    assert_eq!(r, 0);
    assert_eq!(cc, Z);

    assert_eq!(alu::bit(0x80, 0xC0, 0), N);
}

// =============================================================================
// Shifts: V = N xor C after the shift
// =============================================================================

#[test]
fn test_asl_overflow_rule() {
    assert_eq!(alu::asl(0x80, 0), (0x00, Z | C | V));
    assert_eq!(alu::asl(0x40, 0), (0x80, N | V));
    assert_eq!(alu::asl(0xC0, 0), (0x80, N | C));
}

#[test]
fn test_right_shifts() {
    assert_eq!(alu::lsr(0x01, 0), (0x00, Z | C | V));
    assert_eq!(alu::lsr(0x02, N), (0x01, 0));
    assert_eq!(alu::asr(0x81, 0), (0xC0, N | C));
    assert_eq!(alu::asr(0x80, 0), (0xC0, N | V));
}

#[test]
fn test_rotates_through_carry() {
    assert_eq!(alu::ror(0x01, C), (0x80, N | C));
    assert_eq!(alu::ror(0x00, C), (0x80, N | V));
    assert_eq!(alu::rol(0x80, 0), (0x00, Z | C | V));
    assert_eq!(alu::rol(0x00, C), (0x01, 0));
}

// =============================================================================
// Unary
// =============================================================================

#[test]
fn test_neg() {
    assert_eq!(alu::neg(0x80, 0), (0x80, N | V | C));
    assert_eq!(alu::neg(0x00, C), (0x00, Z));
    assert_eq!(alu::neg(0x01, 0), (0xFF, N | C));
}

#[test]
fn test_inc_dec_leave_carry() {
    assert_eq!(alu::inc(0x7F, 0), (0x80, N | V));
    assert_eq!(alu::inc(0xFF, C), (0x00, Z | C));
    assert_eq!(alu::dec(0x80, 0), (0x7F, V));
    assert_eq!(alu::dec(0x00, C), (0xFF, N | C));
}

#[test]
fn test_com_clr_tst() {
    assert_eq!(alu::com(0x00, V), (0xFF, N | C));
    assert_eq!(alu::clr(0x3F), (0x00, H | I | Z));
    assert_eq!(alu::tst(0x80, V | C), N);
    assert_eq!(alu::tst(0x00, 0), Z);
}

#[test]
fn test_daa_after_half_carry() {
    // 19 + 28 = 47 in BCD
    let (sum, cc) = alu::add(0x19, 0x28, 0);
    assert_eq!(sum, 0x41);
    assert_eq!(cc & H, H);
    let (r, cc) = alu::daa(sum, cc);
    assert_eq!(r, 0x47);
    assert_eq!(cc & C, 0);
}

#[test]
fn test_daa_decimal_carry_out() {
    // 99 + 01 = 100: A becomes 00 with C set
    let (sum, cc) = alu::add(0x99, 0x01, 0);
    let (r, cc) = alu::daa(sum, cc);
    assert_eq!(r, 0x00);
    assert_eq!(cc & (C | Z), C | Z);
    assert_eq!(cc & V, 0);
}

#[test]
fn test_daa_keeps_incoming_carry() {
    let (r, cc) = alu::daa(0x05, C);
    assert_eq!(r, 0x65);
    assert_eq!(cc & C, C);
}

// =============================================================================
// 16-bit
// =============================================================================

#[test]
fn test_word_arithmetic() {
    assert_eq!(alu::add16(0x7FFF, 0x0001, 0), (0x8000, N | V));
    assert_eq!(alu::add16(0xFFFF, 0x0001, 0), (0x0000, Z | C));
    assert_eq!(alu::sub16(0x0000, 0x0001, 0), (0xFFFF, N | C));
    assert_eq!(alu::sub16(0x8000, 0x0001, 0), (0x7FFF, V));
}

#[test]
fn test_cpx_leaves_carry_alone() {
    assert_eq!(alu::cpx(0x1234, 0x1234, C), Z | C);
    assert_eq!(alu::cpx(0x0000, 0x0001, 0), N);
}

// =============================================================================
// Representative and randomized operands against a signed/unsigned model
// =============================================================================

fn check_add(a: u8, b: u8) {
    let (r, cc) = alu::add(a, b, 0);
    let wide = a as u16 + b as u16;
    let signed = a as i8 as i16 + b as i8 as i16;
    assert_eq!(r, wide as u8, "{a:#04x}+{b:#04x}");
    assert_eq!(cc & C != 0, wide > 0xFF, "C {a:#04x}+{b:#04x}");
    assert_eq!(cc & V != 0, !(-128..=127).contains(&signed), "V {a:#04x}+{b:#04x}");
    assert_eq!(cc & N != 0, r & 0x80 != 0);
    assert_eq!(cc & Z != 0, r == 0);
    assert_eq!(cc & H != 0, (a & 0x0F) + (b & 0x0F) > 0x0F);
}

fn check_sub(a: u8, b: u8) {
    let (r, cc) = alu::sub(a, b, 0);
    let signed = a as i8 as i16 - b as i8 as i16;
    assert_eq!(r, a.wrapping_sub(b));
    assert_eq!(cc & C != 0, a < b, "C {a:#04x}-{b:#04x}");
    assert_eq!(cc & V != 0, !(-128..=127).contains(&signed), "V {a:#04x}-{b:#04x}");
}

#[test]
fn test_representative_operands() {
    let samples = [0x00u8, 0x01, 0x7F, 0x80, 0xFF];
    for &a in &samples {
        for &b in &samples {
            check_add(a, b);
            check_sub(a, b);
        }
    }
}

#[test]
fn test_randomized_operands() {
    let mut rng = rand::thread_rng();
    for _ in 0..2000 {
        let a: u8 = rng.r#gen();
        let b: u8 = rng.r#gen();
        check_add(a, b);
        check_sub(a, b);
    }
}
