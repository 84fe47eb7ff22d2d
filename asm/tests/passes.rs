use arch::reg::Reg;
use asx::{
    assemble::Phase,
    object::{Entry, Header, ObjectFile},
    run, AsmError, Assembler, Config, Error, ErrorKind, Instruction, Line, Operands, Pass,
};

fn op(label: Option<&str>, opcode: &str, operands: Operands) -> Line {
    Line::new(label, Instruction::op(opcode, operands))
}

fn addr(name: &str) -> Operands {
    Operands::Addr(name.to_string())
}

fn number(lines: Vec<Line>) -> Vec<Line> {
    lines
        .into_iter()
        .enumerate()
        .map(|(idx, line)| line.at(idx + 1))
        .collect()
}

fn assemble(lines: Vec<Line>) -> (Assembler, Vec<u8>) {
    let mut out = Vec::new();
    let asm = run(&number(lines), &mut out, &Config::default()).unwrap();
    (asm, out)
}

#[test]
fn exported_entry_point() {
    let (asm, out) = assemble(vec![
        op(None, "export", addr("start")),
        op(Some("start"), "halt", Operands::None),
    ]);
    assert_eq!(asm.error_count(), 0);
    assert_eq!(out.len(), 12 + 20 + 4);

    let object = ObjectFile::read(&out).unwrap();
    assert_eq!(
        object.header,
        Header {
            export_size: 20,
            import_size: 0,
            program_words: 1,
        }
    );
    assert_eq!(object.exports, vec![Entry::new("start", 0)]);
    assert!(object.imports.is_empty());
    assert_eq!(object.program, vec![0]);
}

#[test]
fn passes_stay_in_lock_step() {
    let (asm, _) = assemble(vec![
        op(Some("top"), "ldimm", Operands::RegConst(Reg::R1, 10)),
        op(None, "alloc", Operands::Const(3)),
        op(None, "export", addr("top")),
        Line::new(Some("mid"), Instruction::Label),
        op(None, "word", Operands::Const(5)),
        op(None, "jmp", addr("top")),
        op(None, "halt", Operands::None),
    ]);
    assert_eq!(asm.error_count(), 0);
    assert_eq!(asm.phase(), Phase::Done);
    assert_eq!(asm.pc(), 7);
    assert_eq!(asm.pc2(), asm.pc());
    assert_eq!(asm.program().len(), 7);
    assert_eq!(asm.symbol("mid").and_then(|s| s.address), Some(4));
}

#[test]
fn duplicate_label_keeps_first_address() {
    let (asm, out) = assemble(vec![
        op(Some("a"), "halt", Operands::None),
        op(Some("a"), "halt", Operands::None),
        op(None, "jmp", addr("a")),
    ]);
    assert_eq!(asm.count(ErrorKind::DuplicateLabel), 1);
    assert_eq!(asm.error_count(), 1);
    assert_eq!(asm.symbol("a").and_then(|s| s.address), Some(0));
    assert_eq!(asm.diagnostics()[0].line, 2);
    assert!(out.is_empty());
}

#[test]
fn undefined_reference_emits_nothing() {
    let (asm, out) = assemble(vec![
        op(None, "halt", Operands::None),
        op(None, "jmp", addr("nowhere")),
    ]);
    assert_eq!(asm.count(ErrorKind::UndefinedReference), 1);
    assert_eq!(asm.error_count(), 1);
    assert_eq!(asm.diagnostics()[0].line, 2);
    assert!(out.is_empty());
    assert!(asm.program().is_empty());
    assert_eq!(asm.phase(), Phase::Done);
}

#[test]
fn import_and_export_conflict() {
    let (asm, _) = assemble(vec![
        op(None, "import", addr("x")),
        op(None, "export", addr("x")),
        op(None, "jmp", addr("x")),
    ]);
    assert_eq!(asm.count(ErrorKind::ImportExport), 1);
    assert_eq!(asm.count(ErrorKind::ExportNoDefinition), 1);
}

#[test]
fn alloc_needs_a_positive_count() {
    let (asm, _) = assemble(vec![
        op(None, "alloc", Operands::Const(0)),
        op(None, "alloc", Operands::Const(-3)),
    ]);
    assert_eq!(asm.count(ErrorKind::ConstantMustBePositive), 2);
    assert_eq!(asm.pc(), 0);
}

#[test]
fn alloc_reserves_zero_words() {
    let (asm, out) = assemble(vec![
        op(None, "alloc", Operands::Const(3)),
        op(None, "halt", Operands::None),
    ]);
    assert_eq!(asm.error_count(), 0);
    let object = ObjectFile::read(&out).unwrap();
    assert_eq!(object.program, vec![0, 0, 0, 0]);
}

#[test]
fn forward_jump_displacement() {
    let (asm, out) = assemble(vec![
        op(None, "jmp", addr("target")),
        op(None, "halt", Operands::None),
        op(Some("target"), "halt", Operands::None),
    ]);
    assert_eq!(asm.error_count(), 0);
    assert_eq!(ObjectFile::read(&out).unwrap().program, vec![0x1014, 0, 0]);
}

#[test]
fn backward_call_displacement() {
    let (_, out) = assemble(vec![op(Some("loop"), "call", addr("loop"))]);
    assert_eq!(ObjectFile::read(&out).unwrap().program, vec![0xFFFF_F00F]);
}

#[test]
fn offset_out_of_range() {
    let (asm, out) = assemble(vec![op(
        None,
        "stind",
        Operands::RegRegOffset(Reg::R1, Reg::R2, 40000),
    )]);
    assert_eq!(asm.count(ErrorKind::OffsetInvalid), 1);
    assert_eq!(asm.error_count(), 1);
    assert!(out.is_empty());
}

#[test]
fn constant_out_of_range_skips_symbol_checks() {
    let (asm, _) = assemble(vec![
        op(None, "ldimm", Operands::RegConst(Reg::R1, 0x80000)),
        op(None, "jmp", addr("nowhere")),
    ]);
    assert_eq!(asm.count(ErrorKind::ConstantInvalid), 1);
    assert_eq!(asm.count(ErrorKind::UndefinedReference), 0);
    assert_eq!(asm.error_count(), 1);
}

#[test]
fn repeated_export() {
    let (asm, _) = assemble(vec![
        op(None, "export", addr("main")),
        op(None, "export", addr("main")),
        op(Some("main"), "halt", Operands::None),
    ]);
    assert_eq!(asm.count(ErrorKind::MultipleExport), 1);
    assert_eq!(asm.error_count(), 1);
    let info = asm.symbol("main").unwrap();
    assert_eq!(info.export_count, 2);
    assert!(info.exported && info.defined);
    let (exports, _, _) = asm.tables();
    assert_eq!(exports, vec![Entry::new("main", 0)]);
}

#[test]
fn repeated_import_is_reported_once() {
    let (asm, _) = assemble(vec![
        op(None, "import", addr("x")),
        op(None, "import", addr("x")),
        op(None, "import", addr("x")),
        op(None, "jmp", addr("x")),
    ]);
    assert_eq!(asm.count(ErrorKind::MultipleImport), 1);
    assert_eq!(asm.symbol("x").unwrap().import_count, 3);
}

#[test]
fn imports_relocate_every_use() {
    let (asm, out) = assemble(vec![
        op(None, "import", addr("print")),
        op(None, "call", addr("print")),
        op(None, "halt", Operands::None),
        op(None, "call", addr("print")),
    ]);
    assert_eq!(asm.error_count(), 0);
    let object = ObjectFile::read(&out).unwrap();
    assert_eq!(
        object.header,
        Header {
            export_size: 0,
            import_size: 40,
            program_words: 3,
        }
    );
    assert_eq!(
        object.imports,
        vec![Entry::new("print", 0), Entry::new("print", 2)]
    );
    assert_eq!(object.program, vec![0x0F, 0, 0x0F]);
}

#[test]
fn import_misuse() {
    let (asm, _) = assemble(vec![
        op(None, "import", addr("unused")),
        op(None, "import", addr("x")),
        op(Some("x"), "halt", Operands::None),
        op(None, "jmp", addr("x")),
    ]);
    assert_eq!(asm.count(ErrorKind::ImportNoReference), 1);
    assert_eq!(asm.count(ErrorKind::ImportDefined), 1);
    assert_eq!(asm.error_count(), 2);
}

#[test]
fn unknown_opcode_still_defines_label() {
    let (asm, _) = assemble(vec![
        op(Some("here"), "frob", Operands::Reg(Reg::R1)),
        op(None, "halt", Operands::None),
    ]);
    assert_eq!(asm.count(ErrorKind::UnknownOpcode), 1);
    assert_eq!(asm.symbol("here").and_then(|s| s.address), Some(0));
    assert_eq!(asm.pc(), 2);
}

#[test]
fn format_mismatch_skips_operand_symbols() {
    let (asm, _) = assemble(vec![op(None, "halt", addr("somewhere"))]);
    assert_eq!(asm.count(ErrorKind::OperandFormatMismatch), 1);
    assert!(asm.symbol("somewhere").is_none());
    assert_eq!(
        asm.diagnostics()[0].error,
        AsmError::OperandFormatMismatch("halt".into(), arch::format::Format::Addr)
    );
}

#[test]
fn far_branch_is_reported_and_truncated() {
    let (asm, _) = assemble(vec![
        op(None, "beq", Operands::RegRegAddr(Reg::R1, Reg::R2, "far".into())),
        op(None, "alloc", Operands::Const(40000)),
        op(Some("far"), "halt", Operands::None),
    ]);
    assert_eq!(asm.count(ErrorKind::LabelTooLarge16), 1);
    assert_eq!(asm.program().len(), 40002);
    assert_eq!(asm.program()[0], 0x9C40_2113);
}

#[test]
fn far_jump_is_reported_and_truncated() {
    let (asm, _) = assemble(vec![
        op(None, "jmp", addr("far")),
        op(None, "alloc", Operands::Const(600000)),
        op(Some("far"), "halt", Operands::None),
    ]);
    assert_eq!(asm.count(ErrorKind::LabelTooLarge20), 1);
    assert_eq!(asm.error_count(), 1);
    assert_eq!(asm.program().len(), 600002);
    assert_eq!(asm.program()[0], 0x927C_0014);
}

#[test]
fn far_load_is_reported_and_truncated() {
    let (asm, _) = assemble(vec![
        op(None, "load", Operands::RegAddr(Reg::R1, "far".into())),
        op(None, "alloc", Operands::Const(600000)),
        op(Some("far"), "halt", Operands::None),
    ]);
    assert_eq!(asm.count(ErrorKind::LabelTooLarge20), 1);
    assert_eq!(asm.count(ErrorKind::LabelTooLarge16), 0);
    assert_eq!(asm.program().len(), 600002);
    assert_eq!(asm.program()[0], 0x927C_0101);
}

#[test]
fn program_too_large_is_reported_once() {
    let (asm, _) = assemble(vec![
        op(None, "alloc", Operands::Const(1 << 20)),
        op(None, "halt", Operands::None),
        op(None, "halt", Operands::None),
    ]);
    assert_eq!(asm.count(ErrorKind::ProgramTooLarge), 1);
    assert_eq!(asm.diagnostics()[0].line, 2);
}

#[test]
fn long_names_are_truncated_with_a_warning() {
    let name = "a_very_long_symbol_name";
    let (asm, out) = assemble(vec![
        op(None, "export", addr(name)),
        op(Some(name), "halt", Operands::None),
    ]);
    assert_eq!(asm.error_count(), 0);
    assert_eq!(asm.diagnostics().len(), 1);
    assert_eq!(asm.diagnostics()[0].kind(), ErrorKind::NameTruncated);
    let object = ObjectFile::read(&out).unwrap();
    assert_eq!(object.exports, vec![Entry::new("a_very_long_symb", 0)]);
}

#[test]
fn exports_are_written_in_name_order() {
    let (_, out) = assemble(vec![
        op(None, "export", addr("zed")),
        op(None, "export", addr("alpha")),
        op(Some("zed"), "halt", Operands::None),
        op(Some("alpha"), "ret", Operands::None),
    ]);
    let object = ObjectFile::read(&out).unwrap();
    assert_eq!(
        object.exports,
        vec![Entry::new("alpha", 1), Entry::new("zed", 0)]
    );
}

#[test]
fn table_size_does_not_change_output() {
    let lines = number(vec![
        op(None, "export", addr("b")),
        op(Some("a"), "jmp", addr("b")),
        op(Some("b"), "call", addr("a")),
        op(Some("c"), "halt", Operands::None),
    ]);
    let mut small = Vec::new();
    let mut large = Vec::new();
    run(&lines, &mut small, &Config { table_size: 1 }).unwrap();
    run(&lines, &mut large, &Config::default()).unwrap();
    assert_eq!(small, large);
}

#[test]
fn out_of_phase_calls() {
    let halt = op(None, "halt", Operands::None);
    let mut asm = Assembler::new(&Config::default()).unwrap();
    assert!(matches!(
        asm.assemble(Pass::Two, &halt),
        Err(Error::OutOfPhase(_))
    ));
    asm.assemble(Pass::One, &halt).unwrap();
    let mut out = Vec::new();
    assert_eq!(asm.between_passes(&mut out).unwrap(), 0);
    asm.assemble(Pass::Two, &halt).unwrap();
    assert_eq!(asm.between_passes(&mut out).unwrap(), 0);
    assert!(matches!(
        asm.between_passes(&mut out),
        Err(Error::OutOfPhase(_))
    ));
}
