use strum::Display;

/// Operand shape of a source line. The discriminant is the format number
/// used by the instruction table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[repr(u8)]
pub enum Format {
    /// Label only, no opcode.
    #[strum(to_string = "format 0")]
    Label = 0,
    #[strum(to_string = "format 1")]
    Op = 1,
    #[strum(to_string = "format 2")]
    Addr = 2,
    #[strum(to_string = "format 3")]
    Reg = 3,
    #[strum(to_string = "format 4")]
    RegConst = 4,
    #[strum(to_string = "format 5")]
    RegAddr = 5,
    #[strum(to_string = "format 6")]
    RegReg = 6,
    #[strum(to_string = "format 7")]
    RegRegOffset = 7,
    #[strum(to_string = "format 8")]
    RegRegAddr = 8,
    /// `word` and `alloc`.
    #[strum(to_string = "format 9")]
    Data = 9,
}
