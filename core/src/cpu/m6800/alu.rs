//! Condition-code primitives for the 6800 family.
//!
//! Every function takes its operands and the prior CC byte and returns
//! `(result, new_cc)`. The low six CC bits (H I N Z V C) have the same
//! layout on the 6809, which reuses the 8-bit primitives from here.

use super::CcFlag;

mod binary;
mod shift;
mod unary;

pub use binary::*;
pub use shift::*;
pub use unary::*;

pub(crate) const NZVC: u8 =
    CcFlag::N as u8 | CcFlag::Z as u8 | CcFlag::V as u8 | CcFlag::C as u8;

#[inline]
pub(crate) fn with(cc: u8, flag: CcFlag, set: bool) -> u8 {
    if set { cc | flag as u8 } else { cc & !(flag as u8) }
}

/// N and Z from an 8-bit result, everything else untouched.
#[inline]
pub(crate) fn nz8(cc: u8, result: u8) -> u8 {
    let cc = with(cc, CcFlag::N, result & 0x80 != 0);
    with(cc, CcFlag::Z, result == 0)
}

#[inline]
pub(crate) fn nz16(cc: u8, result: u16) -> u8 {
    let cc = with(cc, CcFlag::N, result & 0x8000 != 0);
    with(cc, CcFlag::Z, result == 0)
}

/// N, Z from the result; V cleared. Used by loads, stores and logic ops.
#[inline]
pub fn logic8(result: u8, cc: u8) -> u8 {
    with(nz8(cc, result), CcFlag::V, false)
}

#[inline]
pub fn logic16(result: u16, cc: u8) -> u8 {
    with(nz16(cc, result), CcFlag::V, false)
}
