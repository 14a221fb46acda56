use std::path::PathBuf;
use clap::Parser;

/// A small line-oriented command interpreter.
#[derive(Debug, Parser, PartialEq)]
#[command(name = "mish", version, about)]
pub struct Cli {
    /// Show the current working directory in the prompt
    #[arg(short = 'p')]
    pub show_path: bool,

    /// Script to run line by line instead of reading commands interactively
    pub script: Option<PathBuf>,
}
