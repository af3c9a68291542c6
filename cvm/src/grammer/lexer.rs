use super::token::{Pos, Token, TokenKind};
use crate::error::Error;
use std::iter::Peekable;
use std::str::Chars;

pub struct Lexer<'a> {
    file: &'a str,
    iter: Peekable<Chars<'a>>,
    row: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(file: &'a str, code: &'a str) -> Self {
        Self {
            file,
            iter: code.chars().peekable(),
            row: 0,
            col: 0,
        }
    }
}

// ----------------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------------

impl<'a> Lexer<'a> {
    fn peek_nth(&self, n: usize) -> Option<char> {
        self.iter.clone().nth(n)
    }

    fn consume(&mut self) -> Option<char> {
        let ch = self.iter.next()?;
        if ch == '\n' {
            self.row += 1;
            self.col = 0;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn consume_while<F: Fn(char) -> bool>(&mut self, cond: F) -> String {
        let mut lexeme = String::new();
        while let Some(ch) = self.peek_nth(0) {
            if !cond(ch) {
                break;
            }
            self.consume();
            lexeme.push(ch);
        }
        lexeme
    }

    fn pos(&self) -> Pos<'a> {
        Pos {
            file: self.file,
            row: self.row + 1,
            col: self.col + 1,
        }
    }
}

// ----------------------------------------------------------------------------
// Lexer
// ----------------------------------------------------------------------------

impl<'a> Lexer<'a> {
    pub fn parse(mut self) -> Result<Vec<Token<'a>>, Error> {
        let mut tokens = Vec::new();
        while let Some(ch0) = self.peek_nth(0) {
            let pos = self.pos();

            // 1. Double character token
            if let Some(ch1) = self.peek_nth(1) {
                if let Some(kind) = double_char_token(ch0, ch1) {
                    self.consume();
                    self.consume();
                    tokens.push(Token::new(kind, format!("{ch0}{ch1}"), pos));
                    continue;
                }

                // Comment
                if ch0 == '/' && ch1 == '/' {
                    self.consume_while(|ch| ch != '\n');
                    continue;
                }
            }

            // 2. Preprocessor directive
            if ch0 == '#' {
                self.consume_while(|ch| ch != '\n');
                continue;
            }

            // 3. Single character token
            if let Some(kind) = single_char_token(ch0) {
                self.consume();
                tokens.push(Token::new(kind, ch0.to_string(), pos));
                continue;
            }

            // 4. Skip whitespaces
            if ch0.is_whitespace() {
                self.consume();
                continue;
            }

            // 5. Identifier or keyword
            if ch0.is_ascii_alphabetic() {
                let lexeme = self.consume_while(|ch| ch.is_ascii_alphanumeric() || ch == '_');
                tokens.push(Token::new(TokenKind::Ident, lexeme, pos));
                continue;
            }

            // 6. String literal
            if ch0 == '"' {
                let text = self.parse_quoted('"', "string", pos)?;
                tokens.push(Token::new(TokenKind::Text, text, pos));
                continue;
            }

            // 7. Char literal
            if ch0 == '\'' {
                let text = self.parse_quoted('\'', "character", pos)?;
                let mut chars = text.chars();
                let value = match (chars.next(), chars.next()) {
                    (Some(ch), None) => u16::try_from(ch as u32).ok(),
                    _ => None,
                };
                match value {
                    Some(value) => tokens.push(Token::new(TokenKind::Char(value), text, pos)),
                    None => return Err(Error::InvalidChar(pos.into(), text)),
                }
                continue;
            }

            // 8. Number literal
            if ch0.is_ascii_digit() {
                let lexeme = self.consume_while(|ch| ch.is_ascii_hexdigit() || ch == 'x');
                match number_value(&lexeme) {
                    Some(value) => tokens.push(Token::new(TokenKind::Number(value), lexeme, pos)),
                    None => return Err(Error::InvalidNumber(pos.into(), lexeme)),
                }
                continue;
            }

            return Err(Error::UnexpectedChar(pos.into(), ch0));
        }
        Ok(tokens)
    }

    // Quoted: "hoge" or 'c', taken verbatim, closed on the same line
    fn parse_quoted(
        &mut self,
        quote: char,
        what: &'static str,
        pos: Pos<'a>,
    ) -> Result<String, Error> {
        self.consume();
        let text = self.consume_while(|ch| ch != quote && ch != '\n');
        match self.peek_nth(0) {
            Some(ch) if ch == quote => {
                self.consume();
                Ok(text)
            }
            _ => Err(Error::UnterminatedLiteral(pos.into(), what)),
        }
    }
}

/// `0x` hex, `0b` binary or plain decimal, fitting in one word
fn number_value(lexeme: &str) -> Option<u16> {
    if let Some(hex) = lexeme.strip_prefix("0x") {
        u16::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = lexeme.strip_prefix("0b") {
        u16::from_str_radix(bin, 2).ok()
    } else if lexeme.chars().all(|ch| ch.is_ascii_digit()) {
        lexeme.parse::<u16>().ok()
    } else {
        None
    }
}

fn double_char_token(ch0: char, ch1: char) -> Option<TokenKind> {
    match (ch0, ch1) {
        ('|', '|') => Some(TokenKind::PipePipe),
        ('&', '&') => Some(TokenKind::AmpasandAmp),
        ('!', '=') => Some(TokenKind::ExclEqual),
        ('=', '=') => Some(TokenKind::EqualEqual),
        ('>', '=') => Some(TokenKind::RAngleEqual),
        ('<', '=') => Some(TokenKind::LAngleEqual),
        _ => None,
    }
}

fn single_char_token(ch: char) -> Option<TokenKind> {
    match ch {
        ';' => Some(TokenKind::Semicolon),
        '*' => Some(TokenKind::Star),
        ',' => Some(TokenKind::Comma),
        '(' => Some(TokenKind::LParen),
        ')' => Some(TokenKind::RParen),
        '[' => Some(TokenKind::LBracket),
        ']' => Some(TokenKind::RBracket),
        '{' => Some(TokenKind::LCurly),
        '}' => Some(TokenKind::RCurly),
        '.' => Some(TokenKind::Period),
        '<' => Some(TokenKind::LAngle),
        '>' => Some(TokenKind::RAngle),
        '?' => Some(TokenKind::Question),
        '+' => Some(TokenKind::Plus),
        '-' => Some(TokenKind::Minus),
        '/' => Some(TokenKind::Slash),
        '|' => Some(TokenKind::Pipe),
        '&' => Some(TokenKind::Ampasand),
        '!' => Some(TokenKind::Excl),
        '=' => Some(TokenKind::Equal),
        _ => None,
    }
}
