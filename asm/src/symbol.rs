use serde::Serialize;

/// What the assembler knows about one symbol name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SymbolInfo {
    /// Location counter at the definition; `None` until defined.
    pub address: Option<i32>,
    pub defined: bool,
    pub exported: bool,
    pub imported: bool,
    pub referenced: bool,
    pub export_count: u32,
    pub import_count: u32,
    pub import_reference_count: u32,
    /// Every location that used the symbol as an operand. Becomes one
    /// relocation entry each when the symbol is imported.
    pub reference_sites: Vec<i32>,
    /// Source line where the name first appeared.
    #[serde(skip)]
    pub line: usize,
}

impl SymbolInfo {
    pub fn defined_at(pc: i32, line: usize) -> Self {
        SymbolInfo {
            address: Some(pc),
            defined: true,
            line,
            ..Default::default()
        }
    }

    pub fn exported_at(line: usize) -> Self {
        SymbolInfo {
            exported: true,
            export_count: 1,
            line,
            ..Default::default()
        }
    }

    pub fn imported_at(line: usize) -> Self {
        SymbolInfo {
            imported: true,
            import_count: 1,
            line,
            ..Default::default()
        }
    }

    pub fn referenced_at(line: usize) -> Self {
        SymbolInfo {
            referenced: true,
            line,
            ..Default::default()
        }
    }

    pub fn add_reference(&mut self, pc: i32) {
        self.reference_sites.push(pc);
        self.import_reference_count += 1;
    }

    /// Defines a symbol that so far was only referenced or named by a directive.
    pub fn define(&mut self, pc: i32) {
        self.address = Some(pc);
        self.defined = true;
        self.add_reference(pc);
    }
}
