use eightbit_core::cpu::m6809::{CcFlag, alu};
use rand::Rng;

const C: u8 = CcFlag::C as u8;
const V: u8 = CcFlag::V as u8;
const Z: u8 = CcFlag::Z as u8;
const N: u8 = CcFlag::N as u8;
const H: u8 = CcFlag::H as u8;

// =============================================================================
// Shifts: right shifts leave V alone, left shifts compute it
// =============================================================================

#[test]
fn test_lsr_keeps_overflow() {
    assert_eq!(alu::lsr(0x01, V), (0x00, Z | C | V));
    assert_eq!(alu::lsr(0x80, N), (0x40, 0));
}

#[test]
fn test_asr_keeps_sign() {
    assert_eq!(alu::asr(0x81, 0), (0xC0, N | C));
}

#[test]
fn test_ror_through_carry() {
    assert_eq!(alu::ror(0x01, C), (0x80, N | C));
    assert_eq!(alu::ror(0x02, V), (0x01, V));
}

#[test]
fn test_asl_sets_overflow_on_sign_change() {
    assert_eq!(alu::asl(0x40, 0), (0x80, N | V));
}

#[test]
fn test_rol_out_of_bit7() {
    assert_eq!(alu::rol(0x80, 0), (0x00, Z | V | C));
}

#[test]
fn test_tst_keeps_carry() {
    assert_eq!(alu::tst(0x80, C | V), N | C);
    assert_eq!(alu::tst(0x00, 0), Z);
}

// =============================================================================
// MUL, SEX, DAA
// =============================================================================

#[test]
fn test_mul_carry_from_bit7() {
    assert_eq!(alu::mul(0x0C, 0x64, 0), (0x04B0, C));
    assert_eq!(alu::mul(0xFF, 0xFF, 0), (0xFE01, 0));
}

#[test]
fn test_mul_zero() {
    assert_eq!(alu::mul(0x00, 0x05, C), (0x0000, Z));
}

#[test]
fn test_sex() {
    assert_eq!(alu::sex(0x80, 0), (0xFF, N));
    assert_eq!(alu::sex(0x00, N | V), (0x00, Z | V));
    assert_eq!(alu::sex(0x7F, 0), (0x00, 0));
}

#[test]
fn test_daa_after_adda() {
    let (sum, cc) = alu::add(0x19, 0x28, 0);
    assert_eq!(sum, 0x41);
    assert_eq!(cc & H, H);
    assert_eq!(alu::daa(sum, cc).0, 0x47);
}

#[test]
fn test_daa_decimal_carry() {
    let (sum, cc) = alu::add(0x99, 0x01, 0);
    let (r, cc) = alu::daa(sum, cc);
    assert_eq!(r, 0x00);
    assert_eq!(cc & (Z | C), Z | C);
}

// =============================================================================
// 16-bit arithmetic
// =============================================================================

#[test]
fn test_add16_overflow() {
    assert_eq!(alu::add16(0x7FFF, 0x0001, 0), (0x8000, N | V));
}

#[test]
fn test_sub16_borrow() {
    assert_eq!(alu::sub16(0x0000, 0x0001, 0), (0xFFFF, N | C));
    assert_eq!(alu::sub16(0x1234, 0x1234, N | C), (0x0000, Z));
}

#[test]
fn test_logic16_clears_overflow() {
    assert_eq!(alu::logic16(0x8000, V | C), N | C);
}

#[test]
fn test_randomized_add16_sub16() {
    let mut rng = rand::thread_rng();
    for _ in 0..2000 {
        let a: u16 = rng.r#gen();
        let b: u16 = rng.r#gen();

        let (r, cc) = alu::add16(a, b, 0);
        let wide = a as u32 + b as u32;
        let signed = a as i16 as i32 + b as i16 as i32;
        assert_eq!(r, wide as u16);
        assert_eq!(cc & C != 0, wide > 0xFFFF, "add {a:#06X}+{b:#06X}");
        assert_eq!(cc & V != 0, !(-32768..=32767).contains(&signed));
        assert_eq!(cc & N != 0, r & 0x8000 != 0);

        let (r, cc) = alu::sub16(a, b, 0);
        let signed = a as i16 as i32 - b as i16 as i32;
        assert_eq!(r, a.wrapping_sub(b));
        assert_eq!(cc & C != 0, a < b, "sub {a:#06X}-{b:#06X}");
        assert_eq!(cc & V != 0, !(-32768..=32767).contains(&signed));
        assert_eq!(cc & Z != 0, a == b);
    }
}
