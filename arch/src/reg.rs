use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum::{Display, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    TryFromPrimitive,
    IntoPrimitive,
    EnumString,
    Display,
)]
#[repr(u8)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
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
    #[strum(to_string = "sp", serialize = "r13")]
    SP,
    #[strum(to_string = "fp", serialize = "r14")]
    FP,
    #[strum(to_string = "pc", serialize = "r15")]
    PC,
}

impl Reg {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.parse::<Self>() {
            Ok(reg) => Ok(reg),
            Err(_) => Err(format!("Unknown reg name: {s}")),
        }
    }

    pub fn num(self) -> u8 {
        self.into()
    }
}
