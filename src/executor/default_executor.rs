use std::fs::{File, OpenOptions};
use std::os::fd::OwnedFd;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::process::CommandExt;
use std::process::{Child, Command as Process, Stdio};
use nix::fcntl::OFlag;
use nix::unistd::pipe2;
use tracing::{debug, trace};
use crate::ast::{Command, Pipeline, Redirect, RedirectMode};
use crate::environment::Environment;
use super::executor::{ExecError, ExecStatus, Executor, PipelineStatus, StageStatus};
use super::job::{JobNotice, JobTable};
use super::path_resolver::PathResolver;

/// Permission bits for files created by output redirection (before umask).
const REDIRECT_FILE_MODE: u32 = 0o644;

/// Runs pipelines as one OS process per stage.
///
/// All inter-stage pipes are created with `O_CLOEXEC`, so each stage only
/// keeps the two ends it was explicitly given as stdin/stdout; every other
/// pipe descriptor is closed when the stage execs.
#[derive(Debug, Default)]
pub struct DefaultExecutor {
    jobs: JobTable,
}

impl DefaultExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn jobs(&self) -> &JobTable {
        &self.jobs
    }

    fn prepare(
        &self,
        cmd: &Command,
        env: &Environment,
        stdin: Option<OwnedFd>,
        stdout: Option<OwnedFd>,
    ) -> Result<Process, ExecError> {
        let program = cmd.program().ok_or(ExecError::EmptyCommand)?;
        let path = PathResolver
            .resolve(program, env.get("PATH"))
            .ok_or_else(|| ExecError::CommandNotFound(program.to_string()))?;

        let mut process = Process::new(path);
        process
            .arg0(program)
            .args(cmd.args())
            .env_clear()
            .envs(env.iter());

        if let Some(fd) = stdin {
            process.stdin(Stdio::from(fd));
        }
        if let Some(fd) = stdout {
            process.stdout(Stdio::from(fd));
        }
        if let Some(redirect) = &cmd.redirect_input {
            process.stdin(open_redirect(redirect)?);
        }
        if let Some(redirect) = &cmd.redirect_output {
            process.stdout(open_redirect(redirect)?);
        }
        Ok(process)
    }
}

impl Executor for DefaultExecutor {
    fn exec(&mut self, pipeline: &Pipeline, env: &Environment) -> ExecStatus {
        let n = pipeline.len();
        let mut status = PipelineStatus::default();
        if n == 0 {
            return Ok(status);
        }

        // 1. Every pipe exists before the first stage is spawned
        let (mut readers, mut writers) = open_pipes(n - 1)?;

        // 2. Wire each stage. A stage that cannot be prepared is skipped and
        //    its pipe ends are dropped, so its neighbours see EOF/EPIPE.
        let mut prepared = Vec::with_capacity(n);
        for (i, cmd) in pipeline.commands.iter().enumerate() {
            let stdin = if i > 0 { readers[i - 1].take() } else { None };
            let stdout = if i + 1 < n { writers[i].take() } else { None };
            match self.prepare(cmd, env, stdin, stdout) {
                Ok(process) => prepared.push((cmd.program().unwrap_or_default(), process)),
                Err(e) => status.failures.push(e),
            }
        }

        // 3. Spawn everything, then let the parent's copies of the pipe ends go
        let mut children: Vec<(String, Child)> = Vec::with_capacity(prepared.len());
        let mut pgid: Option<u32> = None;
        for (program, process) in prepared.iter_mut() {
            let program: &str = program;
            if pipeline.background {
                // The first stage leads a new process group, later stages join it
                process.process_group(pgid.map_or(0, |id| id as i32));
            }
            match process.spawn() {
                Ok(child) => {
                    debug!(pid = child.id(), program = %program, background = pipeline.background, "spawned stage");
                    pgid.get_or_insert(child.id());
                    children.push((program.to_string(), child));
                }
                Err(e) => status.failures.push(ExecError::from_spawn(program, e)),
            }
        }
        drop(prepared);

        // 4. Foreground: wait for every stage in spawn order
        if !pipeline.background {
            for (program, mut child) in children {
                let pid = child.id();
                match child.wait() {
                    Ok(exit) => {
                        trace!(pid, program = %program, status = %exit, "stage exited");
                        status.stages.push(StageStatus { program, pid, status: exit });
                    }
                    Err(source) => status.failures.push(ExecError::Wait { program, source }),
                }
            }
            return Ok(status);
        }

        // 5. Background: hand the children to the job table and move on
        let children = children.into_iter().map(|(_, child)| child).collect();
        status.job = self.jobs.register(pipeline, children);
        Ok(status)
    }

    fn reap(&mut self) -> Vec<JobNotice> {
        self.jobs.reap()
    }
}

fn open_pipes(count: usize) -> Result<(Vec<Option<OwnedFd>>, Vec<Option<OwnedFd>>), ExecError> {
    let mut readers = Vec::with_capacity(count);
    let mut writers = Vec::with_capacity(count);
    for _ in 0..count {
        let (read, write) = pipe2(OFlag::O_CLOEXEC).map_err(ExecError::PipeCreation)?;
        readers.push(Some(read));
        writers.push(Some(write));
    }
    Ok((readers, writers))
}

fn open_redirect(redirect: &Redirect) -> Result<File, ExecError> {
    let mut options = OpenOptions::new();
    match redirect.mode {
        RedirectMode::Read => options.read(true),
        RedirectMode::Truncate => options.write(true).create(true).truncate(true).mode(REDIRECT_FILE_MODE),
        RedirectMode::Append => options.append(true).create(true).mode(REDIRECT_FILE_MODE),
    };
    options.open(&redirect.path).map_err(|source| ExecError::Redirection {
        path: redirect.path.clone(),
        source,
    })
}
