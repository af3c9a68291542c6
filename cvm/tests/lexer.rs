use cvm::grammer::token::{Token, TokenKind, TokenKind::*};
use cvm::{Error, Lexer};

fn lex(code: &str) -> Result<Vec<Token>, Error> {
    Lexer::new("test.c", code).parse()
}

fn assert(code: &str, expects: Vec<TokenKind>) {
    let tokens = lex(code).unwrap();

    println!(" {code}");
    for (idx, token) in tokens.iter().enumerate() {
        println!("{:>2}: {:?} `{}` @ {}", idx, token.kind, token.text, token.pos);
    }

    let kinds: Vec<TokenKind> = tokens.into_iter().map(|token| token.kind).collect();
    assert_eq!(kinds, expects);
}

macro_rules! case {
    ($name:ident, $code:expr, $expects:expr) => {
        #[test]
        fn $name() {
            assert($code, $expects);
        }
    };
}

case!(
    sample,
    "int main() { return \"ABC\"; } // sample comment",
    vec![
        KwInt, Ident, LParen, RParen, LCurly, KwReturn, Text, Semicolon, RCurly,
    ]
);
case!(
    double_chars,
    "|| && != == >= <=",
    vec![PipePipe, AmpasandAmp, ExclEqual, EqualEqual, RAngleEqual, LAngleEqual]
);
case!(
    single_chars,
    "; * , ( ) [ ] { } . < > ? + - / | & ! =",
    vec![
        Semicolon, Star, Comma, LParen, RParen, LBracket, RBracket, LCurly, RCurly, Period,
        LAngle, RAngle, Question, Plus, Minus, Slash, Pipe, Ampasand, Excl, Equal,
    ]
);
case!(
    keywords,
    "return int char void if while for const true false else",
    vec![
        KwReturn, KwInt, KwChar, KwVoid, KwIf, KwWhile, KwFor, KwConst, KwTrue, KwFalse, KwElse,
    ]
);
case!(
    keyword_prefix,
    "intx if_ returned",
    vec![Ident, Ident, Ident]
);
case!(
    numbers,
    "0 42 0x1F 0xff 0b101 65535",
    vec![
        Number(0),
        Number(42),
        Number(31),
        Number(255),
        Number(5),
        Number(65535),
    ]
);
case!(char_literal, "'a' 'Z'", vec![Char(97), Char(90)]);
case!(directive, "#include <stdio.h>\nint x;", vec![KwInt, Ident, Semicolon]);
case!(slash_not_comment, "a / b", vec![Ident, Slash, Ident]);
case!(comment_to_eol, "a // b c\nd", vec![Ident, Ident]);
case!(no_space, "x=y+1;", vec![Ident, Equal, Ident, Plus, Number(1), Semicolon]);
case!(less_then_assign, "a<=b<c", vec![Ident, LAngleEqual, Ident, LAngle, Ident]);

#[test]
fn string_text_is_verbatim() {
    let tokens = lex("\"a // b # c\"").unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, Text);
    assert_eq!(tokens[0].text, "a // b # c");
}

#[test]
fn locations() {
    let tokens = lex("int x;\n  x = 1;\n\n\tret").unwrap();
    let locs: Vec<(usize, usize)> = tokens.iter().map(|t| (t.pos.row, t.pos.col)).collect();
    assert_eq!(
        locs,
        vec![(1, 1), (1, 5), (1, 6), (2, 3), (2, 5), (2, 7), (2, 8), (4, 2)]
    );
    assert!(tokens.iter().all(|t| t.pos.file == "test.c"));
}

#[test]
fn relex_keeps_kind() {
    let code = "const int main(void) { char *s = \"hi\"; if (a <= 'b' || !c) return 0x10; }";
    for token in lex(code).unwrap() {
        let text = match token.kind {
            Text => format!("\"{}\"", token.text),
            Char(_) => format!("'{}'", token.text),
            _ => token.text.clone(),
        };
        let relexed = lex(&text).unwrap();
        assert_eq!(relexed.len(), 1, "{text}");
        assert_eq!(relexed[0].kind, token.kind, "{text}");
    }
}

#[test]
fn unexpected_char() {
    match lex("int x = 1 @ 2;") {
        Err(Error::UnexpectedChar(loc, ch)) => {
            assert_eq!(ch, '@');
            assert_eq!((loc.row, loc.col), (1, 11));
        }
        other => panic!("expected UnexpectedChar, got {:?}", other),
    }
}

#[test]
fn unterminated_literal() {
    match lex("x = \"abc;\n") {
        Err(Error::UnterminatedLiteral(loc, what)) => {
            assert_eq!(what, "string");
            assert_eq!((loc.row, loc.col), (1, 5));
        }
        other => panic!("expected UnterminatedLiteral, got {:?}", other),
    }
    assert!(matches!(lex("'a"), Err(Error::UnterminatedLiteral(_, "character"))));
}

#[test]
fn literal_spanning_lines() {
    match lex("s = \"ab\ncd\";") {
        Err(Error::UnterminatedLiteral(loc, what)) => {
            assert_eq!(what, "string");
            assert_eq!((loc.row, loc.col), (1, 5));
        }
        other => panic!("expected UnterminatedLiteral, got {:?}", other),
    }
    assert!(matches!(lex("'\n'"), Err(Error::UnterminatedLiteral(_, "character"))));
}

#[test]
fn invalid_number() {
    for code in ["0b102", "0x", "70000", "12ab", "0xfffff"] {
        match lex(code) {
            Err(Error::InvalidNumber(_, text)) => assert_eq!(text, code),
            other => panic!("{code}: expected InvalidNumber, got {:?}", other),
        }
    }
}

#[test]
fn invalid_char() {
    assert!(matches!(lex("'ab'"), Err(Error::InvalidChar(_, text)) if text == "ab"));
    assert!(matches!(lex("''"), Err(Error::InvalidChar(_, _))));
}
