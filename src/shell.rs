use tracing::{debug, trace};
use crate::ast::{Command, Pipeline};
use crate::environment::Environment;
use crate::error::ShellError;
use crate::executor::{
    BuiltinManager, BuiltinStatus, DefaultExecutor, Executor, JobNotice, StageStatus,
};
use crate::lexer::tokenize;
use crate::parser::parse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Things worth telling the user about while a line runs.
#[derive(Debug)]
pub enum Event {
    Started(JobNotice),
    Builtin { name: String, background: bool },
    NonZeroExit(StageStatus),
    Error(ShellError),
}

/// Owns the interpreter state and runs one input line at a time.
pub struct Shell<E: Executor = DefaultExecutor> {
    env: Environment,
    builtins: BuiltinManager,
    executor: E,
}

impl Shell<DefaultExecutor> {
    pub fn new(env: Environment) -> Self {
        Shell::with_executor(env, DefaultExecutor::new())
    }
}

impl<E: Executor> Shell<E> {
    pub fn with_executor(env: Environment, executor: E) -> Self {
        Shell {
            env,
            builtins: BuiltinManager::new(),
            executor,
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Lexing and parsing errors reject the whole line. Anything that goes
    /// wrong afterwards is reported through `on_event` and the rest of the
    /// line still runs.
    pub fn run_line(&mut self, line: &str, on_event: &mut dyn FnMut(Event)) -> Result<Flow, ShellError> {
        let tokens = tokenize(line)?;
        trace!(?tokens, "tokenized");
        let commands = parse(&tokens)?;
        debug!(count = commands.len(), "parsed line");

        for pipeline in Pipeline::group(commands) {
            if self.run_pipeline(pipeline, on_event) == Flow::Exit {
                return Ok(Flow::Exit);
            }
        }
        Ok(Flow::Continue)
    }

    /// Collects finished background jobs without blocking.
    pub fn reap(&mut self) -> Vec<JobNotice> {
        self.executor.reap()
    }

    fn run_pipeline(&mut self, pipeline: Pipeline, on_event: &mut dyn FnMut(Event)) -> Flow {
        let background = pipeline.background;
        let mut external: Vec<Command> = Vec::with_capacity(pipeline.len());

        // Builtins run here, in order, and drop out of the chain
        for cmd in pipeline.commands {
            match self.builtins.execute(&cmd.tokens, &mut self.env) {
                None => external.push(cmd),
                Some(result) => {
                    if cmd.is_background {
                        let name = cmd.program().unwrap_or_default().to_string();
                        on_event(Event::Builtin { name, background: true });
                    }
                    match result {
                        Ok(BuiltinStatus::Exit) => return Flow::Exit,
                        Ok(BuiltinStatus::Continue) => {}
                        Err(e) => on_event(Event::Error(e.into())),
                    }
                }
            }
        }
        if external.is_empty() {
            return Flow::Continue;
        }

        let pipeline = Pipeline { commands: external, background };
        match self.executor.exec(&pipeline, &self.env) {
            Ok(status) => {
                for failure in status.failures {
                    on_event(Event::Error(failure.into()));
                }
                if let Some(job) = status.job {
                    on_event(Event::Started(job));
                }
                for stage in status.stages.into_iter().filter(|s| !s.success()) {
                    on_event(Event::NonZeroExit(stage));
                }
            }
            Err(e) => on_event(Event::Error(e.into())),
        }
        Flow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;
    use std::process::ExitStatus;
    use pretty_assertions::assert_eq;
    use crate::executor::{ExecError, ExecStatus, PipelineStatus};

    #[derive(Default)]
    struct TestExecutor {
        log: Vec<(Vec<String>, bool)>,
        exit_code: i32,
    }

    impl Executor for TestExecutor {
        fn exec(&mut self, pipeline: &Pipeline, _env: &Environment) -> ExecStatus {
            let programs: Vec<String> = pipeline
                .commands
                .iter()
                .filter_map(|c| c.program().map(str::to_string))
                .collect();
            self.log.push((programs, pipeline.background));

            let mut status = PipelineStatus::default();
            if pipeline.commands.iter().any(|c| c.program() == Some("missing")) {
                status.failures.push(ExecError::CommandNotFound("missing".into()));
            }
            if pipeline.background {
                status.job = Some(JobNotice { pid: 42, label: pipeline.label().to_string() });
            } else {
                status.stages.push(StageStatus {
                    program: pipeline.label().to_string(),
                    pid: 7,
                    status: ExitStatus::from_raw(self.exit_code << 8),
                });
            }
            Ok(status)
        }
    }

    fn shell() -> Shell<TestExecutor> {
        Shell::with_executor(Environment::empty(), TestExecutor::default())
    }

    fn run(shell: &mut Shell<TestExecutor>, line: &str) -> (Result<Flow, ShellError>, Vec<Event>) {
        let mut events = Vec::new();
        let flow = shell.run_line(line, &mut |e| events.push(e));
        (flow, events)
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_pipelines_reach_the_executor_in_order() {
        let mut sh = shell();
        let (flow, events) = run(&mut sh, "ls | wc -l ; echo done");
        assert_eq!(flow.unwrap(), Flow::Continue);
        assert!(events.is_empty());
        assert_eq!(
            sh.executor().log,
            vec![(names(&["ls", "wc"]), false), (names(&["echo"]), false)]
        );
    }

    #[test]
    fn test_assignment_updates_environment() {
        let mut sh = shell();
        run(&mut sh, "VAR=hello").0.unwrap();
        assert_eq!(sh.env().get("VAR"), Some("hello"));
        run(&mut sh, "VAR=").0.unwrap();
        assert_eq!(sh.env().get("VAR"), None);
        assert!(sh.executor().log.is_empty());
    }

    #[test]
    fn test_builtin_in_pipe_chain_runs_in_process() {
        let mut sh = shell();
        run(&mut sh, "A=1 | cat").0.unwrap();
        assert_eq!(sh.env().get("A"), Some("1"));
        assert_eq!(sh.executor().log, vec![(names(&["cat"]), false)]);
    }

    #[test]
    fn test_background_builtin_is_announced() {
        let mut sh = shell();
        let (_, events) = run(&mut sh, "B=2 &");
        assert!(matches!(
            events.as_slice(),
            [Event::Builtin { name, background: true }] if name == "B=2"
        ));
        assert_eq!(sh.env().get("B"), Some("2"));
    }

    #[test]
    fn test_background_pipeline_reports_job() {
        let mut sh = shell();
        let (_, events) = run(&mut sh, "echo first ; sleep 1 | cat &");
        assert_eq!(
            sh.executor().log,
            vec![(names(&["echo"]), false), (names(&["sleep", "cat"]), true)]
        );
        assert!(matches!(
            events.as_slice(),
            [Event::Started(JobNotice { pid: 42, label })] if label == "cat"
        ));
    }

    #[test]
    fn test_exit_stops_the_line() {
        let mut sh = shell();
        let (flow, _) = run(&mut sh, "echo a ; exit ; echo b");
        assert_eq!(flow.unwrap(), Flow::Exit);
        assert_eq!(sh.executor().log, vec![(names(&["echo"]), false)]);
    }

    #[test]
    fn test_errors_do_not_stop_later_pipelines() {
        let mut sh = shell();
        let (flow, events) = run(&mut sh, "cd ; missing ; echo after");
        assert_eq!(flow.unwrap(), Flow::Continue);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Event::Error(ShellError::Builtin(_))));
        assert!(matches!(events[1], Event::Error(ShellError::Exec(ExecError::CommandNotFound(_)))));
        assert_eq!(sh.executor().log.len(), 2);
    }

    #[test]
    fn test_non_zero_exit_is_an_event() {
        let mut sh = Shell::with_executor(
            Environment::empty(),
            TestExecutor { exit_code: 3, ..TestExecutor::default() },
        );
        let (flow, events) = run(&mut sh, "false");
        assert_eq!(flow.unwrap(), Flow::Continue);
        match events.as_slice() {
            [Event::NonZeroExit(stage)] => assert_eq!(stage.to_string(), "Command exited with status: 3"),
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn test_lex_and_parse_errors_reject_the_line() {
        let mut sh = shell();
        assert!(matches!(run(&mut sh, "echo \"open").0, Err(ShellError::Lex(_))));
        assert!(matches!(run(&mut sh, "| wc").0, Err(ShellError::Parse(_))));
        assert!(sh.executor().log.is_empty());
    }
}
