use color_print::cformat;

use crate::{op::Mnemonic, reg::Reg};

// ----------------------------------------------------------------------------
// Field layout (low -> high)
//
//   [ 7: 0] opcode
//   [11: 8] reg / reg1
//   [15:12] reg2                 (formats 6, 7, 8)
//   [31:12] 20-bit field          (formats 2, 4, 5)
//   [31:16] 16-bit field          (formats 7, 8)

pub const WIDE: u32 = 20;
pub const NARROW: u32 = 16;

/// Whether `value` is representable as a signed `bits`-wide field.
pub fn fits(value: i32, bits: u32) -> bool {
    let limit = 1i64 << (bits - 1);
    let value = value as i64;
    -limit <= value && value < limit
}

fn field(value: i32, bits: u32) -> u32 {
    (value as u32) & ((1u32 << bits) - 1)
}

fn enc(opcode: u8, reg1: u8, reg2: u8) -> u32 {
    (opcode as u32) | ((reg1 as u32) << 8) | ((reg2 as u32) << 12)
}

// ----------------------------------------------------------------------------

/// A fully resolved program word. Symbol operands are already turned into
/// pc-relative displacements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Word {
    Op(Mnemonic),
    Addr(Mnemonic, i32),
    Reg(Mnemonic, Reg),
    RegConst(Mnemonic, Reg, i32),
    RegAddr(Mnemonic, Reg, i32),
    RegReg(Mnemonic, Reg, Reg),
    RegRegOffset(Mnemonic, Reg, Reg, i32),
    RegRegAddr(Mnemonic, Reg, Reg, i32),
    Data(i32),
}

impl Word {
    /// Packs the word. Out-of-range fields are truncated to their width;
    /// range checking is the caller's job.
    pub fn to_bin(&self) -> u32 {
        match *self {
            Word::Op(m) => enc(m.opcode(), 0, 0),
            Word::Addr(m, disp) => enc(m.opcode(), 0, 0) | field(disp, WIDE) << 12,
            Word::Reg(m, r) => enc(m.opcode(), r.num(), 0),
            Word::RegConst(m, r, c) => enc(m.opcode(), r.num(), 0) | field(c, WIDE) << 12,
            Word::RegAddr(m, r, disp) => enc(m.opcode(), r.num(), 0) | field(disp, WIDE) << 12,
            Word::RegReg(m, r1, r2) => enc(m.opcode(), r1.num(), r2.num()),
            Word::RegRegOffset(m, r1, r2, off) => {
                enc(m.opcode(), r1.num(), r2.num()) | field(off, NARROW) << 16
            }
            Word::RegRegAddr(m, r1, r2, disp) => {
                enc(m.opcode(), r1.num(), r2.num()) | field(disp, NARROW) << 16
            }
            Word::Data(c) => c as u32,
        }
    }
}

impl Word {
    pub fn cformat(&self) -> String {
        macro_rules! op {
            ($name:expr, $a:expr, $b:expr, $c:expr) => {
                cformat!("<r>{:<8}</><b>{:<4} {:<4}</> <y>{}</>", $name, $a, $b, $c)
            };
        }
        match self {
            Word::Op(m) => op!(m, "", "", ""),
            Word::Addr(m, disp) => op!(m, "", "", format!("{:+}", disp)),
            Word::Reg(m, r) => op!(m, r, "", ""),
            Word::RegConst(m, r, c) => op!(m, r, "", c),
            Word::RegAddr(m, r, disp) => op!(m, r, "", format!("{:+}", disp)),
            Word::RegReg(m, r1, r2) => op!(m, r1, r2, ""),
            Word::RegRegOffset(m, r1, r2, off) => op!(m, r1, r2, off),
            Word::RegRegAddr(m, r1, r2, disp) => op!(m, r1, r2, format!("{:+}", disp)),
            Word::Data(c) => op!("word", "", "", c),
        }
    }
}
