use std::collections::HashMap;
use std::io;
use thiserror::Error;
use tracing::debug;
use crate::environment::Environment;

#[derive(Debug, Error)]
pub enum BuiltinError {
    #[error("{0}")]
    ArgumentError(String),
    #[error("cd failed: {path}: {source}")]
    DirectoryChangeError { path: String, source: io::Error },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinStatus {
    Continue,
    Exit,
}

/// A command that runs inside the interpreter's own process.
/// `tokens` is the full argument list, program name included.
pub trait BuiltinCommand {
    fn name(&self) -> &'static str;
    fn run(&self, tokens: &[String], env: &mut Environment) -> Result<BuiltinStatus, BuiltinError>;
}

pub struct BuiltinManager {
    commands: HashMap<&'static str, Box<dyn BuiltinCommand>>,
    assign: AssignCommand,
}

impl Default for BuiltinManager {
    fn default() -> Self {
        Self::new()
    }
}

impl BuiltinManager {
    pub fn new() -> Self {
        let mut mgr = BuiltinManager {
            commands: HashMap::new(),
            assign: AssignCommand,
        };
        mgr.register(Box::new(CdCommand));
        mgr.register(Box::new(ExitCommand));
        mgr
    }

    pub fn register(&mut self, cmd: Box<dyn BuiltinCommand>) {
        self.commands.insert(cmd.name(), cmd);
    }

    /// Any first word containing `=` is an assignment, whatever else it holds.
    pub fn lookup(&self, first_token: &str) -> Option<&dyn BuiltinCommand> {
        if first_token.contains('=') {
            return Some(&self.assign as &dyn BuiltinCommand);
        }
        self.commands.get(first_token).map(|cmd| cmd.as_ref())
    }

    pub fn is_builtin(&self, first_token: &str) -> bool {
        self.lookup(first_token).is_some()
    }

    pub fn execute(&self, tokens: &[String], env: &mut Environment) -> Option<Result<BuiltinStatus, BuiltinError>> {
        let cmd = self.lookup(tokens.first()?)?;
        debug!(builtin = cmd.name(), args = ?&tokens[1..], "running builtin");
        Some(cmd.run(tokens, env))
    }
}

pub struct CdCommand;

impl BuiltinCommand for CdCommand {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn run(&self, tokens: &[String], _env: &mut Environment) -> Result<BuiltinStatus, BuiltinError> {
        let [_, target] = tokens else {
            return Err(BuiltinError::ArgumentError(
                "cd command requires exactly one argument".to_string(),
            ));
        };
        std::env::set_current_dir(target).map_err(|source| BuiltinError::DirectoryChangeError {
            path: target.clone(),
            source,
        })?;
        Ok(BuiltinStatus::Continue)
    }
}

pub struct ExitCommand;

impl BuiltinCommand for ExitCommand {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn run(&self, tokens: &[String], _env: &mut Environment) -> Result<BuiltinStatus, BuiltinError> {
        if tokens.len() > 1 {
            return Err(BuiltinError::ArgumentError(
                "exit command takes no arguments".to_string(),
            ));
        }
        Ok(BuiltinStatus::Exit)
    }
}

/// `NAME=VALUE` sets, `NAME=` unsets. Only the first word is looked at.
pub struct AssignCommand;

impl BuiltinCommand for AssignCommand {
    fn name(&self) -> &'static str {
        "="
    }

    fn run(&self, tokens: &[String], env: &mut Environment) -> Result<BuiltinStatus, BuiltinError> {
        let Some((name, value)) = tokens.first().and_then(|t| t.split_once('=')) else {
            return Err(BuiltinError::ArgumentError("expected NAME=VALUE".to_string()));
        };
        if name.is_empty() {
            return Err(BuiltinError::ArgumentError(format!(
                "invalid assignment '{}': missing variable name",
                tokens[0]
            )));
        }
        if value.is_empty() {
            env.unset(name);
        } else {
            env.set(name, value);
        }
        Ok(BuiltinStatus::Continue)
    }
}
