pub mod ast;
pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod executor;
pub mod lexer;
pub mod logging;
pub mod parser;
pub mod prompt;
pub mod repl;
pub mod shell;
