use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: String,
    pub pos: Pos<'a>,
}

impl<'a> Token<'a> {
    /// Bare identifiers are reclassified into keywords by their text.
    pub fn new(kind: TokenKind, text: String, pos: Pos<'a>) -> Self {
        let kind = match kind {
            TokenKind::Ident => keyword(&text).unwrap_or(TokenKind::Ident),
            kind => kind,
        };
        Token { kind, text, pos }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TokenKind {
    // Double character tokens
    PipePipe,    // '||'
    AmpasandAmp, // '&&'
    ExclEqual,   // '!='
    EqualEqual,  // '=='
    RAngleEqual, // '>='
    LAngleEqual, // '<='

    // Single character tokens
    Semicolon, // ';'
    Star,      // '*'
    Comma,     // ','
    LParen,    // '('
    RParen,    // ')'
    LBracket,  // '['
    RBracket,  // ']'
    LCurly,    // '{'
    RCurly,    // '}'
    Period,    // '.'
    LAngle,    // '<'
    RAngle,    // '>'
    Question,  // '?'
    Plus,      // '+'
    Minus,     // '-'
    Slash,     // '/'
    Pipe,      // '|'
    Ampasand,  // '&'
    Excl,      // '!'
    Equal,     // '='

    // Keywords
    KwReturn, // "return"
    KwInt,    // "int"
    KwChar,   // "char"
    KwVoid,   // "void"
    KwIf,     // "if"
    KwWhile,  // "while"
    KwFor,    // "for"
    KwConst,  // "const"
    KwTrue,   // "true"
    KwFalse,  // "false"
    KwElse,   // "else"

    // Identifier
    Ident,

    // Literals
    Number(u16),
    Text,
    Char(u16),
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident => write!(f, "identifier"),
            TokenKind::Number(_) => write!(f, "number"),
            TokenKind::Text => write!(f, "string literal"),
            TokenKind::Char(_) => write!(f, "character literal"),
            kind => write!(f, "{:?}", kind),
        }
    }
}

pub fn keyword(s: &str) -> Option<TokenKind> {
    match s {
        "return" => Some(TokenKind::KwReturn),
        "int" => Some(TokenKind::KwInt),
        "char" => Some(TokenKind::KwChar),
        "void" => Some(TokenKind::KwVoid),
        "if" => Some(TokenKind::KwIf),
        "while" => Some(TokenKind::KwWhile),
        "for" => Some(TokenKind::KwFor),
        "const" => Some(TokenKind::KwConst),
        "true" => Some(TokenKind::KwTrue),
        "false" => Some(TokenKind::KwFalse),
        "else" => Some(TokenKind::KwElse),
        _ => None,
    }
}

/// Source position (1-based row and column)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pos<'a> {
    pub file: &'a str,
    pub row: usize,
    pub col: usize,
}

impl fmt::Display for Pos<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.row, self.col)
    }
}
