use color_print::ceprintln;

use crate::error::{Diagnostic, ParseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
    Warn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Msg {
    pub level: Level,
    pub line: usize,
    pub text: String,
}

impl From<&Diagnostic> for Msg {
    fn from(diag: &Diagnostic) -> Self {
        Msg {
            level: diag.error.level(),
            line: diag.line,
            text: diag.error.to_string(),
        }
    }
}

impl Msg {
    pub fn parse(line: usize, err: &ParseError) -> Self {
        Msg {
            level: Level::Error,
            line,
            text: err.to_string(),
        }
    }

    /// `raw` holds the source lines; `line` indexes it 1-based.
    pub fn print(&self, file: &str, raw: &[String]) {
        match self.level {
            Level::Error => ceprintln!("<red,bold>error</>: {}", self.text),
            Level::Warn => ceprintln!("<yellow,bold>warn</>: {}", self.text),
        }
        if self.line == 0 {
            ceprintln!("     <blue>--></> <underline>{}</>", file);
            return;
        }
        let content = raw.get(self.line - 1).map(String::as_str).unwrap_or("");
        ceprintln!("     <blue>--></> <underline>{}:{}</>", file, self.line);
        ceprintln!("      <blue>|</>");
        ceprintln!(" <blue>{:>4} |</> {}", self.line, content);
        ceprintln!("      <blue>|</>");
    }
}

pub fn dump(msgs: &[Msg], file: &str, raw: &[String]) {
    for msg in msgs {
        msg.print(file, raw);
    }
}

pub fn has_error(msgs: &[Msg]) -> bool {
    msgs.iter().any(|msg| msg.level == Level::Error)
}
