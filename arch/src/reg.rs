use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use strum::Display;

/// Number of interchangeable general purpose registers (`r0` .. `r15`).
pub const GPR_COUNT: usize = 16;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    TryFromPrimitive,
    IntoPrimitive,
    Display,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Reg {
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
    R8,
    R9,
    R10,
    R11,
    R12,
    R13,
    R14,
    R15,
    SF, // frame pointer
    SP, // stack pointer
    RV, // return value
}

impl Reg {
    /// General purpose register by index
    pub fn gpr(idx: usize) -> Option<Self> {
        if idx < GPR_COUNT {
            Reg::try_from(idx as u8).ok()
        } else {
            None
        }
    }

    pub fn is_gpr(self) -> bool {
        (u8::from(self) as usize) < GPR_COUNT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(Reg::R0.to_string(), "r0");
        assert_eq!(Reg::R15.to_string(), "r15");
        assert_eq!(Reg::SF.to_string(), "sf");
        assert_eq!(Reg::SP.to_string(), "sp");
        assert_eq!(Reg::RV.to_string(), "rv");
    }

    #[test]
    fn gpr() {
        assert_eq!(Reg::gpr(0), Some(Reg::R0));
        assert_eq!(Reg::gpr(15), Some(Reg::R15));
        assert_eq!(Reg::gpr(16), None);
        assert!(Reg::R7.is_gpr());
        assert!(!Reg::RV.is_gpr());
    }
}
