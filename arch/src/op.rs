use std::fmt::Display;

use bimap::BiMap;
use once_cell::sync::Lazy;

use crate::format::Format;

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Mnemonic {
    Halt,
    Load,
    Store,
    Ldimm,
    Ldaddr,
    Ldind,
    Stind,
    Addf,
    Subf,
    Divf,
    Mulf,
    Addi,
    Subi,
    Divi,
    Muli,
    Call,
    Ret,
    Blt,
    Bgt,
    Beq,
    Jmp,
    Cmpxchg,
    Getpid,
    Getpn,
    Push,
    Pop,

    // Directives
    Word,
    Alloc,
    Import,
    Export,
}

/// (mnemonic, name, opcode, required format), in declaration order of `Mnemonic`.
/// Directives carry opcode 0; they never reach the encoder as instructions.
pub const TABLE: [(Mnemonic, &str, u8, Format); 30] = [
    (Mnemonic::Halt, "halt", 0x00, Format::Op),
    (Mnemonic::Load, "load", 0x01, Format::RegAddr),
    (Mnemonic::Store, "store", 0x02, Format::RegAddr),
    (Mnemonic::Ldimm, "ldimm", 0x03, Format::RegConst),
    (Mnemonic::Ldaddr, "ldaddr", 0x04, Format::RegAddr),
    (Mnemonic::Ldind, "ldind", 0x05, Format::RegRegOffset),
    (Mnemonic::Stind, "stind", 0x06, Format::RegRegOffset),
    (Mnemonic::Addf, "addf", 0x07, Format::RegReg),
    (Mnemonic::Subf, "subf", 0x08, Format::RegReg),
    (Mnemonic::Divf, "divf", 0x09, Format::RegReg),
    (Mnemonic::Mulf, "mulf", 0x0A, Format::RegReg),
    (Mnemonic::Addi, "addi", 0x0B, Format::RegReg),
    (Mnemonic::Subi, "subi", 0x0C, Format::RegReg),
    (Mnemonic::Divi, "divi", 0x0D, Format::RegReg),
    (Mnemonic::Muli, "muli", 0x0E, Format::RegReg),
    (Mnemonic::Call, "call", 0x0F, Format::Addr),
    (Mnemonic::Ret, "ret", 0x10, Format::Op),
    (Mnemonic::Blt, "blt", 0x11, Format::RegRegAddr),
    (Mnemonic::Bgt, "bgt", 0x12, Format::RegRegAddr),
    (Mnemonic::Beq, "beq", 0x13, Format::RegRegAddr),
    (Mnemonic::Jmp, "jmp", 0x14, Format::Addr),
    (Mnemonic::Cmpxchg, "cmpxchg", 0x15, Format::RegRegAddr),
    (Mnemonic::Getpid, "getpid", 0x16, Format::Reg),
    (Mnemonic::Getpn, "getpn", 0x17, Format::Reg),
    (Mnemonic::Push, "push", 0x18, Format::Reg),
    (Mnemonic::Pop, "pop", 0x19, Format::Reg),
    (Mnemonic::Word, "word", 0x00, Format::Data),
    (Mnemonic::Alloc, "alloc", 0x00, Format::Data),
    (Mnemonic::Import, "import", 0x00, Format::Addr),
    (Mnemonic::Export, "export", 0x00, Format::Addr),
];

static NAMES: Lazy<BiMap<Mnemonic, &'static str>> =
    Lazy::new(|| TABLE.iter().map(|&(m, name, _, _)| (m, name)).collect());

impl Mnemonic {
    pub fn lookup(s: &str) -> Option<Mnemonic> {
        NAMES.get_by_right(s).copied()
    }

    pub fn name(self) -> &'static str {
        TABLE[self as usize].1
    }

    pub fn opcode(self) -> u8 {
        TABLE[self as usize].2
    }

    pub fn format(self) -> Format {
        TABLE[self as usize].3
    }

    pub fn is_directive(self) -> bool {
        matches!(
            self,
            Mnemonic::Word | Mnemonic::Alloc | Mnemonic::Import | Mnemonic::Export
        )
    }
}

impl Display for Mnemonic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.name())
    }
}
