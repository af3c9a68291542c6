use super::token::{Token, TokenKind};
use crate::error::{Error, Loc};

pub struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    cursor: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token<'a>>) -> Self {
        Parser { tokens, cursor: 0 }
    }
}

impl<'a> Parser<'a> {
    /// Peek : Watch next token without consuming it
    pub fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.cursor)
    }

    /// Peek the n-th token ahead without consuming anything
    pub fn peek_nth(&self, n: usize) -> Option<&Token<'a>> {
        self.tokens.get(self.cursor + n)
    }

    /// Next : Consume next token and return it
    pub fn next(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.cursor).cloned()?;
        self.cursor += 1;
        Some(token)
    }

    pub fn is_eof(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    /// Peek and check next token is match with condition
    pub fn check_if<F: Fn(&Token) -> bool>(&self, cond: F) -> bool {
        match self.peek() {
            Some(token) => cond(token),
            None => false,
        }
    }

    /// Consume if next token is match with condition
    pub fn consume_if<F: Fn(&Token) -> bool>(&mut self, cond: F) -> Option<Token<'a>> {
        if self.check_if(cond) {
            self.next()
        } else {
            None
        }
    }

    /// Next token must be match with condition
    pub fn expect_tobe<F: Fn(&Token) -> bool>(
        &mut self,
        cond: F,
        expected: &str,
    ) -> Result<Token<'a>, Error> {
        let token = match self.peek() {
            Some(token) => token.clone(),
            None => return Err(self.eof(expected)),
        };
        if cond(&token) {
            self.cursor += 1;
            Ok(token)
        } else {
            Err(self.unexpected(&token, expected))
        }
    }

    pub fn unexpected(&self, token: &Token<'a>, expected: &str) -> Error {
        Error::UnexpectedToken(token.pos.into(), token.text.clone(), expected.to_string())
    }

    /// End of input is reported at the last token
    pub fn eof(&self, expected: &str) -> Error {
        let loc = match self.tokens.last() {
            Some(token) => token.pos.into(),
            None => Loc {
                file: String::new(),
                row: 1,
                col: 1,
            },
        };
        Error::UnexpectedEOF(loc, expected.to_string())
    }

    pub fn is_type(kind: &TokenKind) -> bool {
        matches!(
            kind,
            TokenKind::KwInt | TokenKind::KwChar | TokenKind::KwVoid | TokenKind::KwConst
        )
    }
}

#[macro_export]
macro_rules! check {
    ($parser:expr, $kind:pat) => {
        $parser.check_if(|token| matches!(&token.kind, $kind))
    };
}

#[macro_export]
macro_rules! expect {
    ($parser:expr, $kind:pat) => {
        $parser.expect_tobe(|token| matches!(&token.kind, $kind), stringify!($kind))
    };
    ($parser:expr, $kind:pat, $expected:expr) => {
        $parser.expect_tobe(|token| matches!(&token.kind, $kind), $expected)
    };
}

#[macro_export]
macro_rules! optional {
    ($parser:expr, $trigger:pat, $following:expr) => {
        if $crate::check!($parser, $trigger) {
            $crate::expect!($parser, $trigger)?;
            Some($following)
        } else {
            None
        }
    };
    ($parser:expr, $trigger:pat) => {
        $parser.consume_if(|token| matches!(&token.kind, $trigger))
    };
}

/// Parse repeated elements with optional delimiters
/// 3 args: { element } terminal (no delimiter)
/// 4 args: [ element { delimiter element } ] terminal (with delimiter)
#[macro_export]
macro_rules! repeat {
    // Without delimiter: { element } terminal
    ($parser:expr, $elem:expr, $terminal:pat) => {{
        let mut items = Vec::new();
        while !$crate::check!($parser, $terminal) {
            if $parser.is_eof() {
                return Err($parser.eof(stringify!($terminal)));
            }
            items.push($elem?);
        }
        items
    }};

    // With delimiter: [ element { delimiter element } ] terminal
    ($parser:expr, $elem:expr, $delimiter:pat, $terminal:pat) => {{
        let mut items = Vec::new();
        if !$crate::check!($parser, $terminal) {
            items.push($elem?);
            while $crate::check!($parser, $delimiter) {
                $crate::expect!($parser, $delimiter)?;
                items.push($elem?);
            }
        }
        items
    }};
}
