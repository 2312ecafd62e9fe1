//! Register files as they appear in a run log.
//!
//! Every CPU stores its flags byte under `flags.bits`. Missing fields read
//! as zero so a config can name only the registers it cares about.

use eightbit_core::cpu::{InterruptMode, M6502State, M6800State, M6809State, Z80State};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

/// Conversion between a core register file and its JSON shape.
pub trait Snapshot: Sized {
    type Json: Serialize + DeserializeOwned;

    fn to_json(&self) -> Self::Json;
    fn from_json(json: Self::Json) -> Result<Self, HarnessError>;
    fn pc(&self) -> u16;

    /// Registers a run starts from when its configuration names none.
    /// `None` means take them from the reset vector.
    fn power_on() -> Option<Self> {
        None
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags {
    pub bits: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct M6800Json {
    pub a: u8,
    pub b: u8,
    pub x: u16,
    pub sp: u16,
    pub pc: u16,
    pub flags: Flags,
}

impl Snapshot for M6800State {
    type Json = M6800Json;

    fn to_json(&self) -> M6800Json {
        M6800Json {
            a: self.a,
            b: self.b,
            x: self.x,
            sp: self.sp,
            pc: self.pc,
            flags: Flags { bits: self.cc },
        }
    }

    fn from_json(j: M6800Json) -> Result<Self, HarnessError> {
        Ok(M6800State {
            a: j.a,
            b: j.b,
            x: j.x,
            sp: j.sp,
            pc: j.pc,
            cc: j.flags.bits,
        })
    }

    fn pc(&self) -> u16 {
        self.pc
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct M6502Json {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub flags: Flags,
}

impl Snapshot for M6502State {
    type Json = M6502Json;

    fn to_json(&self) -> M6502Json {
        M6502Json {
            a: self.a,
            x: self.x,
            y: self.y,
            sp: self.sp,
            pc: self.pc,
            flags: Flags { bits: self.p },
        }
    }

    fn from_json(j: M6502Json) -> Result<Self, HarnessError> {
        Ok(M6502State {
            a: j.a,
            x: j.x,
            y: j.y,
            sp: j.sp,
            pc: j.pc,
            p: j.flags.bits,
        })
    }

    fn pc(&self) -> u16 {
        self.pc
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Z80Json {
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub a_prime: u8,
    pub f_prime: u8,
    pub b_prime: u8,
    pub c_prime: u8,
    pub d_prime: u8,
    pub e_prime: u8,
    pub h_prime: u8,
    pub l_prime: u8,
    pub ix: u16,
    pub iy: u16,
    pub sp: u16,
    pub pc: u16,
    pub i: u8,
    pub r: u8,
    pub iff1: bool,
    pub iff2: bool,
    pub im: u8,
    pub flags: Flags,
}

impl Snapshot for Z80State {
    type Json = Z80Json;

    fn to_json(&self) -> Z80Json {
        Z80Json {
            a: self.a,
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
            im: self.im.as_u8(),
            flags: Flags { bits: self.f },
        }
    }

    fn from_json(j: Z80Json) -> Result<Self, HarnessError> {
        let im = InterruptMode::from_u8(j.im)
            .ok_or_else(|| HarnessError::Registers(format!("interrupt mode {} is not 0, 1 or 2", j.im)))?;
        Ok(Z80State {
            a: j.a,
            f: j.flags.bits,
            b: j.b,
            c: j.c,
            d: j.d,
            e: j.e,
            h: j.h,
            l: j.l,
            a_prime: j.a_prime,
            f_prime: j.f_prime,
            b_prime: j.b_prime,
            c_prime: j.c_prime,
            d_prime: j.d_prime,
            e_prime: j.e_prime,
            h_prime: j.h_prime,
            l_prime: j.l_prime,
            ix: j.ix,
            iy: j.iy,
            sp: j.sp,
            pc: j.pc,
            i: j.i,
            r: j.r,
            iff1: j.iff1,
            iff2: j.iff2,
            im,
        })
    }

    fn pc(&self) -> u16 {
        self.pc
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct M6809Json {
    pub a: u8,
    pub b: u8,
    pub dp: u8,
    pub x: u16,
    pub y: u16,
    pub s: u16,
    pub u: u16,
    pub pc: u16,
    pub flags: Flags,
}

impl Snapshot for M6809State {
    type Json = M6809Json;

    fn to_json(&self) -> M6809Json {
        M6809Json {
            a: self.a,
            b: self.b,
            dp: self.dp,
            x: self.x,
            y: self.y,
            s: self.s,
            u: self.u,
            pc: self.pc,
            flags: Flags { bits: self.cc },
        }
    }

    fn from_json(j: M6809Json) -> Result<Self, HarnessError> {
        Ok(M6809State {
            a: j.a,
            b: j.b,
            dp: j.dp,
            x: j.x,
            y: j.y,
            u: j.u,
            s: j.s,
            pc: j.pc,
            cc: j.flags.bits,
        })
    }

    fn pc(&self) -> u16 {
        self.pc
    }

    /// The reference run: program loaded at 0x1000.
    fn power_on() -> Option<Self> {
        Some(M6809State {
            a: 0x00,
            b: 0x44,
            dp: 0x00,
            x: 0xABAB,
            y: 0x02E0,
            u: 0x02E0,
            s: 0x7F34,
            pc: 0x1000,
            cc: 0x84,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn m6809_json_layout() {
        let regs = M6809State::power_on().unwrap();
        let value = serde_json::to_value(regs.to_json()).unwrap();
        assert_eq!(value["flags"]["bits"], 0x84);
        assert_eq!(value["s"], 0x7F34);
        assert_eq!(value["dp"], 0);
        assert!(value.get("cc").is_none());
    }

    #[test]
    fn missing_fields_read_as_zero() {
        let j: M6502Json = serde_json::from_str(r#"{"pc": 512}"#).unwrap();
        let regs = M6502State::from_json(j).unwrap();
        assert_eq!(regs.pc, 0x0200);
        assert_eq!(regs.p, 0);
    }

    #[test]
    fn z80_interrupt_mode_is_numeric() {
        let regs = Z80State {
            im: InterruptMode::Im2,
            f: 0xC5,
            ..Z80State::default()
        };
        let value = serde_json::to_value(regs.to_json()).unwrap();
        assert_eq!(value["im"], 2);
        assert_eq!(value["flags"]["bits"], 0xC5);
        assert!(value.get("f").is_none());
    }

    #[test]
    fn z80_rejects_unknown_interrupt_mode() {
        let j = Z80Json {
            im: 3,
            ..Z80Json::default()
        };
        assert!(matches!(Z80State::from_json(j), Err(HarnessError::Registers(_))));
    }

    #[test]
    fn only_6809_has_a_power_on_state() {
        assert!(M6800State::power_on().is_none());
        assert!(M6502State::power_on().is_none());
        assert!(Z80State::power_on().is_none());
    }
}
