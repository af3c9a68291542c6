pub mod compile;
pub mod error;
pub mod grammer;

pub use compile::{Code, Line};
pub use error::Error;
pub use grammer::lexer::Lexer;
pub use grammer::parsercore::Parser;

/// Lex, parse and generate one source unit
pub fn compile(file: &str, source: &str) -> Result<Code, Error> {
    let tokens = Lexer::new(file, source).parse()?;
    let ast = Parser::new(tokens).parse()?;
    compile::generate(file, &ast)
}
