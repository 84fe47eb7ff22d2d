use arch::format::Format;
use strum::EnumDiscriminants;
use thiserror::Error;

use crate::msg::Level;

/// Failures that stop the run.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Out of memory while allocating {0}")]
    OutOfMemory(&'static str),

    #[error("`{0}` called out of phase")]
    OutOfPhase(&'static str),

    #[error("Assembler bug: {0}")]
    Bug(String),

    #[error("Malformed object file: {0}")]
    Malformed(&'static str),

    #[error("Failed to open file: {0}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("Failed to read line")]
    FileRead(#[source] std::io::Error),

    #[error("Failed to create file: {0}")]
    FileCreate(String, #[source] std::io::Error),

    #[error("Failed to write file: {0}")]
    FileWrite(String, #[source] std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode symbol map: {0}")]
    Map(#[from] serde_yaml::Error),
}

/// Semantic errors in the assembled program. These are reported and counted;
/// assembly carries on so every problem in a file shows up in one run.
#[derive(Error, Debug, Clone, PartialEq, Eq, EnumDiscriminants)]
#[strum_discriminants(name(ErrorKind), derive(Hash, strum::Display))]
pub enum AsmError {
    #[error("Program consumes more than 2^20 words")]
    ProgramTooLarge,

    #[error("Label {0} already defined")]
    DuplicateLabel(String),

    #[error("Unknown opcode {0}")]
    UnknownOpcode(String),

    #[error("Opcode {0} does not match the given operands ({1})")]
    OperandFormatMismatch(String, Format),

    #[error("Constant must be greater than zero: {0}")]
    ConstantMustBePositive(i32),

    #[error("Constant {0} will not fit into 20 bits")]
    ConstantInvalid(i32),

    #[error("Offset {0} will not fit into 16 bits")]
    OffsetInvalid(i32),

    #[error("Symbol {0} exported more than once")]
    MultipleExport(String),

    #[error("Symbol {0} imported more than once")]
    MultipleImport(String),

    #[error("Label {0} is referenced but not defined or imported")]
    UndefinedReference(String),

    #[error("Symbol {0} is both imported and exported")]
    ImportExport(String),

    #[error("Symbol {0} is both imported and defined")]
    ImportDefined(String),

    #[error("Symbol {0} is imported but not referenced")]
    ImportNoReference(String),

    #[error("Symbol {0} is exported but not defined")]
    ExportNoDefinition(String),

    #[error("Reference to label {0} at address {1} won't fit in 16 bits")]
    LabelTooLarge16(String, i32),

    #[error("Reference to label {0} at address {1} won't fit in 20 bits")]
    LabelTooLarge20(String, i32),

    #[error("Symbol {0} is longer than 16 characters and will be truncated")]
    NameTruncated(String),
}

impl AsmError {
    pub fn level(&self) -> Level {
        match self {
            AsmError::NameTruncated(_) => Level::Warn,
            _ => Level::Error,
        }
    }

    /// After one of these the symbol table cannot be trusted for the
    /// consistency sweep.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            AsmError::OperandFormatMismatch(..)
                | AsmError::ConstantInvalid(_)
                | AsmError::UnknownOpcode(_)
                | AsmError::ProgramTooLarge
        )
    }
}

/// A reported error together with the 1-based source line it belongs to
/// (0 when it concerns the program as a whole).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub error: AsmError,
}

impl Diagnostic {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::from(&self.error)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Syntax Error: Cannot parse `{0}`")]
    Syntax(String),

    #[error("Invalid label: `{0}`")]
    InvalidLabel(String),

    #[error("Cannot parse `{0}` as {1}")]
    ParseArgument(String, &'static str),

    #[error("Operands do not match any instruction format: `{0}`")]
    InvalidOperands(String),
}
