pub mod default;
pub mod validate;

use thiserror::Error;
use crate::ast::Command;
use crate::lexer::Token;

pub use default::DefaultParser;
pub use validate::{validate, ValidationError};

pub trait Parser {
    fn parse(&mut self) -> Result<Vec<Command>, ParseError>;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid pipe: empty command before '|' at position {pos}")]
    EmptyPipeSegment { pos: usize },
    #[error("Missing filename for redirection '{operator}' at position {pos}")]
    MissingRedirectionTarget { operator: String, pos: usize },
    #[error("Invalid command structure: {0}")]
    InvalidCommandStructure(#[source] ValidationError),
}

pub fn parse(tokens: &[Token]) -> Result<Vec<Command>, ParseError> {
    DefaultParser::new(tokens).parse()
}
