use thiserror::Error;
use crate::ast::Command;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Cannot combine output redirection with pipe output")]
    OutputRedirectWithPipe,
    #[error("Cannot combine input redirection with pipe input")]
    InputRedirectWithPipe,
    #[error("Missing output file name")]
    MissingOutputFile,
    #[error("Missing input file name")]
    MissingInputFile,
    #[error("Empty command")]
    EmptyCommand,
}

/// Each of stdin and stdout gets exactly one source or sink: a file or a
/// pipe, never both.
pub fn validate(cmd: &Command) -> Result<(), ValidationError> {
    if cmd.redirect_output.is_some() && cmd.is_pipe_start {
        return Err(ValidationError::OutputRedirectWithPipe);
    }
    if cmd.redirect_input.is_some() && cmd.is_pipe_end {
        return Err(ValidationError::InputRedirectWithPipe);
    }
    if cmd.redirect_output.as_ref().is_some_and(|r| r.path.is_empty()) {
        return Err(ValidationError::MissingOutputFile);
    }
    if cmd.redirect_input.as_ref().is_some_and(|r| r.path.is_empty()) {
        return Err(ValidationError::MissingInputFile);
    }
    if cmd.tokens.is_empty() {
        return Err(ValidationError::EmptyCommand);
    }
    Ok(())
}
