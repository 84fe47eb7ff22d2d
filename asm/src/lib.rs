//! Back end of a two-pass assembler for the VM520.
//!
//! Lines come in through [`parser::parse_line`] (or are built directly as
//! [`instr::Line`]s), go through [`assemble::Assembler`] twice, and leave as
//! a relocatable object file (see [`object`]).

pub mod assemble;
pub mod dump;
pub mod error;
pub mod instr;
pub mod msg;
pub mod object;
pub mod parser;
pub mod symbol;
pub mod symtab;

pub use assemble::{run, Assembler, Config, Pass};
pub use error::{AsmError, Diagnostic, Error, ErrorKind, ParseError};
pub use instr::{Instruction, Line, Operands};
