//! Source line syntax:
//!
//! ```text
//! [label:] [opcode [operand {, operand}]] [# comment | ; comment]
//! ```
//!
//! Operands are registers (`r0`..`r15`, `sp`, `fp`, `pc`), integers
//! (decimal, `0x`, `0b`, `0o`, optionally signed), symbol names, or
//! `offset(reg)`. The operand shape picks the instruction format; whether
//! the opcode accepts that format is left to the assembler.

use arch::reg::Reg;

use crate::{
    error::ParseError,
    instr::{Instruction, Line, Operands},
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Reg(Reg),
    Int(i32),
    Sym(String),
    Indexed(i32, Reg),
}

impl Token {
    fn parse(s: &str) -> Result<Token, ParseError> {
        if let Ok(reg) = Reg::parse(s) {
            return Ok(Token::Reg(reg));
        }
        if let Some(inner) = s.strip_suffix(')') {
            let (offset, reg) = inner
                .split_once('(')
                .ok_or_else(|| ParseError::ParseArgument(s.to_string(), "operand"))?;
            let offset = match offset.trim() {
                "" => 0,
                text => parse_with_prefix(text)
                    .ok_or_else(|| ParseError::ParseArgument(text.to_string(), "offset"))?,
            };
            let reg = Reg::parse(reg.trim())
                .map_err(|_| ParseError::ParseArgument(reg.to_string(), "register"))?;
            return Ok(Token::Indexed(offset, reg));
        }
        if let Some(value) = parse_with_prefix(s) {
            return Ok(Token::Int(value));
        }
        if is_ident(s) {
            return Ok(Token::Sym(s.to_string()));
        }
        Err(ParseError::ParseArgument(s.to_string(), "operand"))
    }
}

/// Parses one source line. Blank and comment-only lines give `None`.
pub fn parse_line(number: usize, raw: &str) -> Result<Option<Line>, ParseError> {
    let code = match raw.find(['#', ';']) {
        Some(pos) => &raw[..pos],
        None => raw,
    }
    .trim();
    if code.is_empty() {
        return Ok(None);
    }

    let (label, rest) = match code.split_once(':') {
        Some((label, rest)) => {
            let label = label.trim();
            if !is_ident(label) {
                return Err(ParseError::InvalidLabel(label.to_string()));
            }
            (Some(label), rest.trim())
        }
        None => (None, code),
    };

    if rest.is_empty() {
        return Ok(Some(Line::new(label, Instruction::Label).at(number)));
    }

    let (opcode, args) = match rest.split_once(char::is_whitespace) {
        Some((opcode, args)) => (opcode, args.trim()),
        None => (rest, ""),
    };
    if !is_ident(opcode) {
        return Err(ParseError::Syntax(rest.to_string()));
    }

    let tokens = if args.is_empty() {
        vec![]
    } else {
        args.split(',')
            .map(|arg| Token::parse(arg.trim()))
            .collect::<Result<Vec<_>, _>>()?
    };
    let operands = shape(tokens).ok_or_else(|| ParseError::InvalidOperands(args.to_string()))?;

    Ok(Some(Line::new(label, Instruction::op(opcode, operands)).at(number)))
}

/// Maps an operand list onto its format.
fn shape(tokens: Vec<Token>) -> Option<Operands> {
    let operands = match tokens.as_slice() {
        [] => Operands::None,
        [Token::Sym(s)] => Operands::Addr(s.clone()),
        [Token::Reg(r)] => Operands::Reg(*r),
        [Token::Int(n)] => Operands::Const(*n),
        [Token::Reg(r), Token::Int(n)] => Operands::RegConst(*r, *n),
        [Token::Reg(r), Token::Sym(s)] => Operands::RegAddr(*r, s.clone()),
        [Token::Reg(r1), Token::Reg(r2)] => Operands::RegReg(*r1, *r2),
        [Token::Reg(r1), Token::Reg(r2), Token::Int(n)] => Operands::RegRegOffset(*r1, *r2, *n),
        [Token::Reg(r1), Token::Indexed(n, r2)] => Operands::RegRegOffset(*r1, *r2, *n),
        [Token::Reg(r1), Token::Reg(r2), Token::Sym(s)] => {
            Operands::RegRegAddr(*r1, *r2, s.clone())
        }
        _ => return None,
    };
    Some(operands)
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(head) if head.is_ascii_alphabetic() || head == '_' || head == '.' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '$')
}

/// Integers up to 32 bits. Unsigned values above `i32::MAX` wrap, so
/// `0xFFFFFFFF` is -1.
fn parse_with_prefix(s: &str) -> Option<i32> {
    let (negative, body) = match s.strip_prefix('-') {
        Some(body) => (true, body),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (radix, digits) = match body.get(..2) {
        Some("0x" | "0X") => (16, &body[2..]),
        Some("0b" | "0B") => (2, &body[2..]),
        Some("0o" | "0O") => (8, &body[2..]),
        _ => (10, body),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let value = i64::from_str_radix(digits, radix).ok()?;
    let value = if negative { -value } else { value };
    match i32::try_from(value) {
        Ok(value) => Some(value),
        Err(_) if !negative && value <= u32::MAX as i64 => Some(value as u32 as i32),
        Err(_) => None,
    }
}
