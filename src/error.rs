use std::io;
use std::path::PathBuf;
use std::str::Utf8Error;
use thiserror::Error;
use crate::config::ConfigError;
use crate::executor::{BuiltinError, ExecError};
use crate::lexer::LexError;
use crate::parser::ParseError;

/// Problems that stop the interpreter before any input is read.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Cannot open file {}: {source}", .path.display())]
    Script { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Exec(#[from] ExecError),
    #[error(transparent)]
    Builtin(#[from] BuiltinError),
    #[error("Input line is not valid UTF-8: {0}")]
    Encoding(#[from] Utf8Error),
    #[error(transparent)]
    Startup(#[from] StartupError),
}

impl ShellError {
    /// Only startup problems end the process; everything else is reported
    /// and the next line is read.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ShellError::Startup(_))
    }
}
