use std::io::Write;

use color_print::cformat;
use indexmap::IndexMap;

use crate::{assemble::Listed, error::Error, symbol::SymbolInfo, symtab::SymbolTable};

const RULE: &str = "---------------+-----------------------------------------------------";

/// `name address referenced exported imported`, flags only when set.
pub fn describe(name: &str, info: &SymbolInfo) -> String {
    let mut text = name.to_string();
    if let Some(address) = info.address {
        text += &format!(" {}", address);
    }
    for (set, flag) in [
        (info.referenced, "referenced"),
        (info.exported, "exported"),
        (info.imported, "imported"),
    ] {
        if set {
            text += " ";
            text += flag;
        }
    }
    text
}

/// One row per emitting line: location, encoded word, source line.
pub fn listing(listed: &[Listed], raw: &[String]) -> Vec<String> {
    listed
        .iter()
        .filter(|row| row.len > 0)
        .map(|row| {
            let bin = match &row.word {
                Some(word) => {
                    let bin = word.to_bin();
                    format!(
                        "{:02X} {:02X} {:02X} {:02X}",
                        (bin >> 24) & 0xFF,
                        (bin >> 16) & 0xFF,
                        (bin >> 8) & 0xFF,
                        bin & 0xFF
                    )
                }
                None => cformat!("<dim>00 x {:<6}</>", row.len),
            };
            let body = match &row.word {
                Some(word) => word.cformat(),
                None => raw
                    .get(row.line.wrapping_sub(1))
                    .map(|s| s.trim().to_string())
                    .unwrap_or_default(),
            };
            format!("[{:05X}] {} | {:>4}:   {}", row.pc, bin, row.line, body)
        })
        .collect()
}

pub fn print_dump(listed: &[Listed], symtab: &SymbolTable<SymbolInfo>, raw: &[String]) {
    println!("{}", RULE);
    for row in listing(listed, raw) {
        println!("{}", row);
    }
    println!("{}", RULE);
    for (name, info) in &symtab.ordered() {
        let flags = describe(name, info);
        let rest = flags.get(name.len()..).unwrap_or("");
        match info.address {
            Some(_) => println!("{}", cformat!("<g>{}</>{}", name, rest)),
            None => println!("{}", cformat!("<y>{}</>{}", name, rest)),
        }
    }
    println!("{}", RULE);
}

/// Every symbol, in name order.
pub fn symbol_map(symtab: &SymbolTable<SymbolInfo>) -> IndexMap<&str, &SymbolInfo> {
    symtab.ordered().iter().collect()
}

pub fn write_map<W: Write>(out: &mut W, symtab: &SymbolTable<SymbolInfo>) -> Result<(), Error> {
    serde_yaml::to_writer(out, &symbol_map(symtab))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_flags() {
        let mut info = SymbolInfo::defined_at(4, 1);
        info.exported = true;
        assert_eq!(describe("main", &info), "main 4 exported");
        let info = SymbolInfo::imported_at(1);
        assert_eq!(describe("puts", &info), "puts imported");
    }

    #[test]
    fn map_is_sorted() {
        let mut symtab = SymbolTable::create(3).unwrap();
        for (pc, name) in ["zeta", "alpha", "mid"].into_iter().enumerate() {
            symtab.install(name, SymbolInfo::defined_at(pc as i32, 1)).unwrap();
        }
        let keys: Vec<_> = symbol_map(&symtab).keys().copied().collect();
        assert_eq!(keys, ["alpha", "mid", "zeta"]);

        let mut out = Vec::new();
        write_map(&mut out, &symtab).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("alpha:"));
        assert!(text.contains("address: 1"));
    }
}
