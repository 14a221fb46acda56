use std::{fmt, io};
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;
use nix::errno::Errno;
use thiserror::Error;
use crate::ast::Pipeline;
use crate::environment::Environment;
use super::job::JobNotice;

pub type ExecStatus = Result<PipelineStatus, ExecError>;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Failed to create pipe: {0}")]
    PipeCreation(#[source] Errno),
    #[error("Empty command")]
    EmptyCommand,
    #[error("Command not found: {0}")]
    CommandNotFound(String),
    #[error("Failed to execute command: {program}: {source}")]
    Exec { program: String, source: io::Error },
    #[error("Failed to spawn {program}: {source}")]
    Spawn { program: String, source: io::Error },
    #[error("Error opening redirection file {path}: {source}")]
    Redirection { path: String, source: io::Error },
    #[error("Failed to wait for {program}: {source}")]
    Wait { program: String, source: io::Error },
}

impl ExecError {
    /// Classifies a spawn failure. Errors raised while replacing the process
    /// image are exec failures, anything else is a failure to create the
    /// process.
    pub fn from_spawn(program: &str, source: io::Error) -> Self {
        let program = program.to_string();
        let exec_failed = matches!(
            source.kind(),
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
        ) || source.raw_os_error() == Some(Errno::ENOEXEC as i32);
        if exec_failed {
            ExecError::Exec { program, source }
        } else {
            ExecError::Spawn { program, source }
        }
    }
}

/// Final state of one foreground stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageStatus {
    pub program: String,
    pub pid: u32,
    pub status: ExitStatus,
}

impl StageStatus {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.status.code(), self.status.signal()) {
            (Some(code), _) => write!(f, "Command exited with status: {}", code),
            (None, Some(signal)) => write!(f, "Command terminated by signal {}", signal),
            (None, None) => write!(f, "Command ended with {}", self.status),
        }
    }
}

#[derive(Debug, Default)]
pub struct PipelineStatus {
    pub stages: Vec<StageStatus>,   // Waited-for stages, in spawn order
    pub failures: Vec<ExecError>,   // Stages that never started or could not be waited for
    pub job: Option<JobNotice>,     // Set when the pipeline was detached
}

impl PipelineStatus {
    pub fn success(&self) -> bool {
        self.failures.is_empty() && self.stages.iter().all(StageStatus::success)
    }
}

pub trait Executor {
    fn exec(&mut self, pipeline: &Pipeline, env: &Environment) -> ExecStatus;

    /// Collects background jobs that have finished since the last call.
    fn reap(&mut self) -> Vec<JobNotice> {
        Vec::new()
    }
}
