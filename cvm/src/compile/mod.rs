mod codegen;
pub mod regs;
pub mod symbols;

pub use codegen::generate;

use arch::inst::Inst;
use color_print::cformat;
use serde::Serialize;
use std::fmt;

/// One line of the output listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Line {
    Label(String),   // .name:
    Inst(Inst),      // \tmnemonic operands
    Reserve(usize),  // \tres <bytes>
    Str(String),     // \tstr "<text>"
}

/// Generated assembly for one compilation unit
#[derive(Debug, Clone, Serialize)]
pub struct Code {
    pub source: String,
    pub lines: Vec<Line>,
}

impl Code {
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|line| match line {
            Line::Label(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

impl Line {
    pub fn cformat(&self) -> String {
        match self {
            Line::Label(name) => cformat!("<g>.{}:</>", name),
            Line::Inst(inst) => format!("    {}", inst.cformat()),
            Line::Reserve(bytes) => cformat!("    <r>{:<5}</><b>{}</>", "res", bytes),
            Line::Str(text) => cformat!("    <r>{:<5}</><y>\"{}\"</>", "str", text),
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::Label(name) => write!(f, ".{}:", name),
            Line::Inst(inst) => write!(f, "\t{}", inst),
            Line::Reserve(bytes) => write!(f, "\tres {}", bytes),
            Line::Str(text) => write!(f, "\tstr \"{}\"", text),
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.source)?;
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
