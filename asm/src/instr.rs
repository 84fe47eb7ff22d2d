use arch::{format::Format, reg::Reg};

/// Operands of one instruction, one variant per operand format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operands {
    /// format 1
    None,
    /// format 2
    Addr(String),
    /// format 3
    Reg(Reg),
    /// format 4
    RegConst(Reg, i32),
    /// format 5
    RegAddr(Reg, String),
    /// format 6
    RegReg(Reg, Reg),
    /// format 7
    RegRegOffset(Reg, Reg, i32),
    /// format 8
    RegRegAddr(Reg, Reg, String),
    /// format 9
    Const(i32),
}

impl Operands {
    pub fn format(&self) -> Format {
        match self {
            Operands::None => Format::Op,
            Operands::Addr(_) => Format::Addr,
            Operands::Reg(_) => Format::Reg,
            Operands::RegConst(..) => Format::RegConst,
            Operands::RegAddr(..) => Format::RegAddr,
            Operands::RegReg(..) => Format::RegReg,
            Operands::RegRegOffset(..) => Format::RegRegOffset,
            Operands::RegRegAddr(..) => Format::RegRegAddr,
            Operands::Const(_) => Format::Data,
        }
    }

    /// The symbol this operand list names, if any.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Operands::Addr(s) | Operands::RegAddr(_, s) | Operands::RegRegAddr(_, _, s) => {
                Some(s.as_str())
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Nothing but a label on the line (format 0).
    Label,
    /// Opcode as written in the source, plus its operands.
    Op(String, Operands),
}

impl Instruction {
    pub fn op(opcode: &str, operands: Operands) -> Self {
        Instruction::Op(opcode.to_string(), operands)
    }

    pub fn format(&self) -> Format {
        match self {
            Instruction::Label => Format::Label,
            Instruction::Op(_, operands) => operands.format(),
        }
    }

    pub fn opcode(&self) -> Option<&str> {
        match self {
            Instruction::Label => None,
            Instruction::Op(opcode, _) => Some(opcode.as_str()),
        }
    }

    /// Number of program words the line occupies. Both passes advance their
    /// location counter by exactly this amount.
    pub fn footprint(&self) -> i32 {
        match self {
            Instruction::Label => 0,
            Instruction::Op(opcode, operands) => match (opcode.as_str(), operands) {
                ("import" | "export", _) => 0,
                ("alloc", Operands::Const(n)) => (*n).max(0),
                _ => 1,
            },
        }
    }
}

/// One source line as handed over by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub number: usize,
    pub label: Option<String>,
    pub instr: Instruction,
}

impl Line {
    pub fn new(label: Option<&str>, instr: Instruction) -> Self {
        Line {
            number: 0,
            label: label.map(str::to_string),
            instr,
        }
    }

    pub fn at(mut self, number: usize) -> Self {
        self.number = number;
        self
    }
}
