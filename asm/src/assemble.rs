//! The two-pass engine.
//!
//! The caller feeds the same line sequence twice. Pass one builds the symbol
//! table and checks every line; [`Assembler::between_passes`] then checks the
//! table as a whole and writes the object header and symbol tables. Pass two
//! resolves operands and encodes the program, which the second
//! `between_passes` call writes out.
//!
//! ```text
//! Assembler::new ─▶ assemble(One)* ─▶ between_passes ─▶ assemble(Two)* ─▶ between_passes
//! ```

use std::io::Write;

use arch::{
    op::Mnemonic,
    word::{fits, Word, NARROW, WIDE},
    MAX_WORDS,
};
use indexmap::IndexMap;
use log::{debug, log_enabled, trace};

use crate::{
    dump::describe,
    error::{AsmError, Diagnostic, Error, ErrorKind},
    instr::{Instruction, Line, Operands},
    msg::Level,
    object::{self, Entry, Header, ENTRY_SIZE, NAME_LEN},
    symbol::SymbolInfo,
    symtab::SymbolTable,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    One,
    Two,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    One,
    Two,
    Done,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Bucket count of the symbol table.
    pub table_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config { table_size: 100 }
    }
}

/// One emitting line of pass two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listed {
    pub line: usize,
    pub pc: i32,
    pub len: i32,
    pub word: Option<Word>,
}

pub struct Assembler {
    symtab: SymbolTable<SymbolInfo>,
    pc: i32,
    pc2: i32,
    phase: Phase,
    errors: u32,
    counts: IndexMap<ErrorKind, u32>,
    diagnostics: Vec<Diagnostic>,
    // Set by errors that leave the table unfit for the sweep.
    unsound: bool,
    overflowed: bool,
    header: Header,
    program: Vec<u32>,
    listing: Vec<Listed>,
}

impl Assembler {
    pub fn new(config: &Config) -> Result<Self, Error> {
        Ok(Assembler {
            symtab: SymbolTable::create(config.table_size)?,
            pc: 0,
            pc2: 0,
            phase: Phase::One,
            errors: 0,
            counts: IndexMap::new(),
            diagnostics: Vec::new(),
            unsound: false,
            overflowed: false,
            header: Header::default(),
            program: Vec::new(),
            listing: Vec::new(),
        })
    }

    /// Processes one line. Pass two is only accepted after a clean
    /// `between_passes`.
    pub fn assemble(&mut self, pass: Pass, line: &Line) -> Result<(), Error> {
        match (pass, self.phase) {
            (Pass::One, Phase::One) => self.first(line),
            (Pass::Two, Phase::Two) => self.second(line),
            (Pass::One, _) => Err(Error::OutOfPhase("assemble (pass one)")),
            (Pass::Two, _) => Err(Error::OutOfPhase("assemble (pass two)")),
        }
    }

    /// Closes the current pass and returns the number of errors so far.
    ///
    /// After pass one: checks the symbol table, and if there are no errors
    /// writes the header and both symbol tables to `out` and opens pass two.
    /// A non-zero return ends the run. After pass two: writes the program.
    pub fn between_passes<W: Write>(&mut self, out: &mut W) -> Result<u32, Error> {
        match self.phase {
            Phase::One => self.close_first(out),
            Phase::Two => self.close_second(out),
            Phase::Done => Err(Error::OutOfPhase("between_passes")),
        }
    }

    fn report(&mut self, line: usize, error: AsmError) {
        if error.level() == Level::Error {
            self.errors += 1;
            *self.counts.entry(ErrorKind::from(&error)).or_insert(0) += 1;
            self.unsound |= error.is_structural();
        }
        debug!("line {}: {}", line, error);
        self.diagnostics.push(Diagnostic { line, error });
    }
}

// ----------------------------------------------------------------------------
// Pass one

impl Assembler {
    fn first(&mut self, line: &Line) -> Result<(), Error> {
        let at = line.number;
        let pc = self.pc;
        trace!("pass 1 [{:04}] {:?}", pc, line);

        let mut sound = true;
        let mnemonic = match &line.instr {
            Instruction::Label => None,
            Instruction::Op(opcode, operands) => match Mnemonic::lookup(opcode) {
                None => {
                    self.report(at, AsmError::UnknownOpcode(opcode.clone()));
                    sound = false;
                    None
                }
                Some(m) => {
                    if m.format() != operands.format() {
                        let error = AsmError::OperandFormatMismatch(opcode.clone(), operands.format());
                        self.report(at, error);
                        sound = false;
                    }
                    Some(m)
                }
            },
        };

        if let Some(label) = &line.label {
            self.define(label, pc, at)?;
        }

        // Symbol operands of an illegal line are not recorded.
        if let (true, Instruction::Op(_, operands)) = (sound, &line.instr) {
            match (mnemonic, operands) {
                (Some(Mnemonic::Export), Operands::Addr(name)) => self.export(name, at)?,
                (Some(Mnemonic::Import), Operands::Addr(name)) => self.import(name, at)?,
                _ => {
                    if let Some(name) = operands.symbol() {
                        self.reference(name, pc, at)?;
                    }
                }
            }
        }

        if let Instruction::Op(opcode, Operands::Const(n)) = &line.instr {
            if opcode == "alloc" && *n <= 0 {
                self.report(at, AsmError::ConstantMustBePositive(*n));
            }
        }
        self.pc = self.pc.saturating_add(line.instr.footprint());
        if self.pc > MAX_WORDS && !self.overflowed {
            self.overflowed = true;
            self.report(at, AsmError::ProgramTooLarge);
        }

        if let Instruction::Op(_, operands) = &line.instr {
            match operands {
                Operands::RegRegOffset(_, _, offset) if !fits(*offset, NARROW) => {
                    self.report(at, AsmError::OffsetInvalid(*offset))
                }
                Operands::RegConst(_, constant) if !fits(*constant, WIDE) => {
                    self.report(at, AsmError::ConstantInvalid(*constant))
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn define(&mut self, label: &str, pc: i32, at: usize) -> Result<(), Error> {
        let duplicate = match self.symtab.lookup_mut(label) {
            None => {
                self.symtab.install(label, SymbolInfo::defined_at(pc, at))?;
                false
            }
            // The first definition stays.
            Some(info) if info.address.is_some() => true,
            Some(info) => {
                info.define(pc);
                false
            }
        };
        if duplicate {
            self.report(at, AsmError::DuplicateLabel(label.to_string()));
        }
        Ok(())
    }

    fn export(&mut self, name: &str, at: usize) -> Result<(), Error> {
        let repeated = match self.symtab.lookup_mut(name) {
            None => {
                self.symtab.install(name, SymbolInfo::exported_at(at))?;
                false
            }
            Some(info) => {
                info.exported = true;
                info.export_count += 1;
                info.export_count > 1
            }
        };
        if repeated {
            self.report(at, AsmError::MultipleExport(name.to_string()));
        }
        Ok(())
    }

    fn import(&mut self, name: &str, at: usize) -> Result<(), Error> {
        match self.symtab.lookup_mut(name) {
            None => self.symtab.install(name, SymbolInfo::imported_at(at))?,
            Some(info) => {
                info.imported = true;
                info.import_count += 1;
            }
        }
        Ok(())
    }

    fn reference(&mut self, name: &str, pc: i32, at: usize) -> Result<(), Error> {
        match self.symtab.lookup_mut(name) {
            Some(info) => {
                info.referenced = true;
                info.add_reference(pc);
            }
            None => {
                let mut info = SymbolInfo::referenced_at(at);
                info.add_reference(pc);
                self.symtab.install(name, info)?;
            }
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Between passes

impl Assembler {
    fn close_first<W: Write>(&mut self, out: &mut W) -> Result<u32, Error> {
        if self.unsound {
            debug!("symbol checks skipped: the table is not trustworthy");
        } else {
            self.sweep();
        }
        if log_enabled!(log::Level::Debug) {
            for (name, info) in &self.symtab.ordered() {
                debug!("{}", describe(name, info));
            }
        }
        if self.errors > 0 {
            self.phase = Phase::Done;
            return Ok(self.errors);
        }

        let (exports, imports, references) = self.tables();
        if references as usize != imports.len() {
            return Err(Error::Bug(format!(
                "{} import references counted, {} recorded",
                references,
                imports.len()
            )));
        }
        self.header = Header {
            export_size: exports.len() as u32 * ENTRY_SIZE,
            import_size: references * ENTRY_SIZE,
            program_words: self.pc as u32,
        };
        debug!("header {:?}", self.header);
        object::write_header(out, &self.header)?;
        object::write_entries(out, &exports)?;
        object::write_entries(out, &imports)?;

        self.pc2 = 0;
        self.phase = Phase::Two;
        Ok(0)
    }

    /// Whole-table consistency checks, in name order.
    fn sweep(&mut self) {
        let mut found = Vec::new();
        for (name, info) in &self.symtab.ordered() {
            let mut push = |error: AsmError| found.push((info.line, error));
            if info.imported && info.exported {
                push(AsmError::ImportExport(name.to_string()));
            }
            if info.defined && info.imported {
                push(AsmError::ImportDefined(name.to_string()));
            }
            if info.import_count > 1 {
                push(AsmError::MultipleImport(name.to_string()));
            }
            if info.imported && !info.referenced {
                push(AsmError::ImportNoReference(name.to_string()));
            }
            if info.referenced && !info.defined && !info.imported {
                push(AsmError::UndefinedReference(name.to_string()));
            }
            if info.exported && !info.defined {
                push(AsmError::ExportNoDefinition(name.to_string()));
            }
            if (info.exported || info.imported) && name.len() > NAME_LEN {
                push(AsmError::NameTruncated(name.to_string()));
            }
        }
        for (line, error) in found {
            self.report(line, error);
        }
    }

    /// Export entries, import entries (one per reference site) and the
    /// summed reference count of imported symbols, as the first
    /// `between_passes` writes them.
    pub fn tables(&self) -> (Vec<Entry>, Vec<Entry>, u32) {
        let mut exports = Vec::new();
        let mut imports = Vec::new();
        let mut references = 0;
        for (name, info) in &self.symtab.ordered() {
            if info.exported {
                exports.push(Entry::new(name, info.address.unwrap_or(-1)));
            }
            if info.imported {
                references += info.import_reference_count;
                imports.extend(info.reference_sites.iter().map(|&site| Entry::new(name, site)));
            }
        }
        (exports, imports, references)
    }

    fn close_second<W: Write>(&mut self, out: &mut W) -> Result<u32, Error> {
        if self.pc2 != self.pc || self.program.len() != self.pc as usize {
            return Err(Error::Bug(format!(
                "location counters diverged: pass one reached {}, pass two reached {}",
                self.pc, self.pc2
            )));
        }
        object::write_words(out, &self.program)?;
        out.flush()?;
        self.phase = Phase::Done;
        Ok(self.errors)
    }
}

// ----------------------------------------------------------------------------
// Pass two

impl Assembler {
    fn second(&mut self, line: &Line) -> Result<(), Error> {
        let at = line.number;
        let pc = self.pc2;
        trace!("pass 2 [{:04}] {:?}", pc, line);

        if let Instruction::Op(opcode, operands) = &line.instr {
            let m = Mnemonic::lookup(opcode)
                .ok_or_else(|| Error::Bug(format!("unknown opcode `{}` in pass two", opcode)))?;
            let word = match operands {
                Operands::None => Some(Word::Op(m)),
                Operands::Addr(_) if m.is_directive() => None,
                Operands::Addr(name) => Some(Word::Addr(m, self.displacement(name, WIDE, at)?)),
                Operands::Reg(r) => Some(Word::Reg(m, *r)),
                Operands::RegConst(r, c) => Some(Word::RegConst(m, *r, *c)),
                Operands::RegAddr(r, name) => {
                    Some(Word::RegAddr(m, *r, self.displacement(name, WIDE, at)?))
                }
                Operands::RegReg(r1, r2) => Some(Word::RegReg(m, *r1, *r2)),
                Operands::RegRegOffset(r1, r2, offset) => {
                    Some(Word::RegRegOffset(m, *r1, *r2, *offset))
                }
                Operands::RegRegAddr(r1, r2, name) => Some(Word::RegRegAddr(
                    m,
                    *r1,
                    *r2,
                    self.displacement(name, NARROW, at)?,
                )),
                Operands::Const(n) if m == Mnemonic::Alloc => {
                    let len = self.program.len() + *n as usize;
                    self.program.resize(len, 0);
                    None
                }
                Operands::Const(n) => Some(Word::Data(*n)),
            };
            if let Some(word) = &word {
                self.program.push(word.to_bin());
            }
            self.listing.push(Listed {
                line: at,
                pc,
                len: line.instr.footprint(),
                word,
            });
        }

        self.pc2 += line.instr.footprint();
        if self.program.len() != self.pc2 as usize {
            return Err(Error::Bug(format!(
                "line {} left {} words emitted at location {}",
                at,
                self.program.len(),
                self.pc2
            )));
        }
        Ok(())
    }

    /// pc-relative displacement to `name`. Imported symbols encode 0; the
    /// linker patches them from the import table.
    fn displacement(&mut self, name: &str, bits: u32, at: usize) -> Result<i32, Error> {
        let info = self
            .symtab
            .lookup(name)
            .ok_or_else(|| Error::Bug(format!("symbol `{}` unknown in pass two", name)))?;
        if info.imported {
            return Ok(0);
        }
        let target = info
            .address
            .ok_or_else(|| Error::Bug(format!("symbol `{}` has no address in pass two", name)))?;

        let disp = target - (self.pc2 + 1);
        if !fits(disp, bits) {
            let error = if bits == NARROW {
                AsmError::LabelTooLarge16(name.to_string(), target)
            } else {
                AsmError::LabelTooLarge20(name.to_string(), target)
            };
            self.report(at, error);
        }
        Ok(disp)
    }
}

// ----------------------------------------------------------------------------

impl Assembler {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Pass-one location counter.
    pub fn pc(&self) -> i32 {
        self.pc
    }

    /// Pass-two location counter.
    pub fn pc2(&self) -> i32 {
        self.pc2
    }

    pub fn error_count(&self) -> u32 {
        self.errors
    }

    pub fn count(&self, kind: ErrorKind) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &IndexMap<ErrorKind, u32> {
        &self.counts
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn symbols(&self) -> &SymbolTable<SymbolInfo> {
        &self.symtab
    }

    pub fn symbol(&self, name: &str) -> Option<&SymbolInfo> {
        self.symtab.lookup(name)
    }

    pub fn header(&self) -> Header {
        self.header
    }

    pub fn program(&self) -> &[u32] {
        &self.program
    }

    pub fn listing(&self) -> &[Listed] {
        &self.listing
    }
}

/// Runs both passes over `lines`, writing the object to `out`. Stops after
/// pass one when it found errors; inspect the returned assembler for them.
pub fn run<W: Write>(lines: &[Line], out: &mut W, config: &Config) -> Result<Assembler, Error> {
    let mut asm = Assembler::new(config)?;
    for line in lines {
        asm.assemble(Pass::One, line)?;
    }
    if asm.between_passes(out)? > 0 {
        return Ok(asm);
    }
    for line in lines {
        asm.assemble(Pass::Two, line)?;
    }
    asm.between_passes(out)?;
    Ok(asm)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn halt() -> Line {
        Line::new(None, Instruction::op("halt", Operands::None))
    }

    #[test]
    fn pass_two_needs_a_clean_barrier() {
        let mut asm = Assembler::new(&Config::default()).unwrap();
        assert!(matches!(
            asm.assemble(Pass::Two, &halt()),
            Err(Error::OutOfPhase(_))
        ));
        asm.assemble(Pass::One, &halt()).unwrap();
        assert_eq!(asm.between_passes(&mut Vec::new()).unwrap(), 0);
        assert_eq!(asm.phase(), Phase::Two);
        assert!(matches!(
            asm.assemble(Pass::One, &halt()),
            Err(Error::OutOfPhase(_))
        ));
    }

    #[test]
    fn no_pass_two_after_errors() {
        let mut asm = Assembler::new(&Config::default()).unwrap();
        asm.assemble(Pass::One, &Line::new(None, Instruction::op("nope", Operands::None)))
            .unwrap();
        assert_eq!(asm.between_passes(&mut Vec::new()).unwrap(), 1);
        assert_eq!(asm.phase(), Phase::Done);
        assert!(asm.assemble(Pass::Two, &halt()).is_err());
        assert!(asm.between_passes(&mut Vec::new()).is_err());
    }

    #[test]
    fn diverging_second_pass_is_a_bug() {
        let mut asm = Assembler::new(&Config::default()).unwrap();
        asm.assemble(Pass::One, &halt()).unwrap();
        asm.assemble(Pass::One, &halt()).unwrap();
        let mut out = Vec::new();
        asm.between_passes(&mut out).unwrap();
        asm.assemble(Pass::Two, &halt()).unwrap();
        assert!(matches!(asm.between_passes(&mut out), Err(Error::Bug(_))));
    }
}
