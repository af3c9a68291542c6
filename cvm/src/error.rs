use crate::grammer::token::Pos;
use color_print::ceprintln;
use std::fmt;
use thiserror::Error;

// Position without lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loc {
    pub file: String,
    pub row: usize,
    pub col: usize,
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.row, self.col)
    }
}

impl<'a> From<Pos<'a>> for Loc {
    fn from(pos: Pos<'a>) -> Self {
        Loc {
            file: pos.file.to_string(),
            row: pos.row,
            col: pos.col,
        }
    }
}

impl<'a> From<&Pos<'a>> for Loc {
    fn from(pos: &Pos<'a>) -> Self {
        Loc::from(*pos)
    }
}

// Unified error type for CVM
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // Lexical errors
    #[error("Unexpected character: `{1}`")]
    UnexpectedChar(Loc, char),

    #[error("Unterminated {1} literal")]
    UnterminatedLiteral(Loc, &'static str),

    #[error("Invalid number literal: `{1}`")]
    InvalidNumber(Loc, String),

    #[error("Invalid character literal: '{1}'")]
    InvalidChar(Loc, String),

    // Parse errors
    #[error("Expected {2}, found `{1}`")]
    UnexpectedToken(Loc, String, String),

    #[error("Unexpected end of file, expected {1}")]
    UnexpectedEOF(Loc, String),

    #[error("Variable `{1}` cannot be void")]
    VoidVariable(Loc, String),

    #[error("Array `{1}` cannot have void elements")]
    VoidArray(Loc, String),

    #[error("Array `{1}` cannot have an initializer")]
    ArrayInitializer(Loc, String),

    #[error("Parameter `{1}` cannot be void")]
    VoidParameter(Loc, String),

    #[error("Parameter `{1}` cannot be an array, pass a pointer instead")]
    ArrayParameter(Loc, String),

    #[error("Unsupported type: {1}")]
    UnsupportedType(Loc, String),

    #[error("Invalid array size for `{1}`")]
    InvalidArraySize(Loc, String),

    // Code generation errors
    #[error("Invalid assignment target")]
    InvalidLValue(Loc),

    #[error("Undefined identifier: `{1}`")]
    UndefinedVariable(Loc, String),

    #[error("Register exhausted: all 16 registers are in use")]
    RegisterExhausted(Loc),

    #[error("Redeclaration of `{1}`")]
    Redeclared(Loc, String),

    #[error("Cannot assign to const `{1}`")]
    AssignToConst(Loc, String),

    #[error("Return outside of function")]
    ReturnOutsideFunction(Loc),

    #[error("Function `{1}` cannot be defined inside another function")]
    NestedFunction(Loc, String),

    #[error("`{1}` is reserved for generated labels")]
    ReservedName(Loc, String),

    #[error("Locals of `{1}` exceed the 32768-byte frame limit")]
    FrameTooLarge(Loc, String),
}

impl Error {
    pub fn loc(&self) -> Option<&Loc> {
        match self {
            Error::Io(_) | Error::Yaml(_) => None,
            Error::UnexpectedChar(loc, _)
            | Error::UnterminatedLiteral(loc, _)
            | Error::InvalidNumber(loc, _)
            | Error::InvalidChar(loc, _)
            | Error::UnexpectedToken(loc, _, _)
            | Error::UnexpectedEOF(loc, _)
            | Error::VoidVariable(loc, _)
            | Error::VoidArray(loc, _)
            | Error::ArrayInitializer(loc, _)
            | Error::VoidParameter(loc, _)
            | Error::ArrayParameter(loc, _)
            | Error::UnsupportedType(loc, _)
            | Error::InvalidArraySize(loc, _)
            | Error::InvalidLValue(loc)
            | Error::UndefinedVariable(loc, _)
            | Error::RegisterExhausted(loc)
            | Error::Redeclared(loc, _)
            | Error::AssignToConst(loc, _)
            | Error::ReturnOutsideFunction(loc)
            | Error::NestedFunction(loc, _)
            | Error::ReservedName(loc, _)
            | Error::FrameTooLarge(loc, _) => Some(loc),
        }
    }

    /// Print error with diagnostic information showing file location and line content
    pub fn print_diag(&self, source: &str) {
        ceprintln!("<red,bold>error</>: {}", self);

        let Some(loc) = self.loc() else {
            return;
        };
        ceprintln!("     <blue>--></> <underline>{}</>", loc);
        ceprintln!("      <blue>|</>");

        let line = source.lines().nth(loc.row.saturating_sub(1)).unwrap_or("");
        ceprintln!(" <blue>{:>4} |</> {}", loc.row, line);
        ceprintln!(
            "      <blue>|</> {}<red,bold>^</>",
            " ".repeat(loc.col.saturating_sub(1))
        );
    }
}
