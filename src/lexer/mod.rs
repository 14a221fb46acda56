mod lexer;
mod token;

pub use lexer::{LexError, Lexer};
pub use token::{Token, TokenKind};

pub fn tokenize(line: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(line).tokenize()
}
