use std::process::ExitCode;
use clap::Parser;
use clap::error::ErrorKind;
use mish::cli::Cli;
use mish::config::ConfigLoader;
use mish::environment::Environment;
use mish::error::{ShellError, StartupError};
use mish::prompt::ShellPrompt;
use mish::shell::Shell;
use mish::{logging, repl};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    let config = match ConfigLoader::discover() {
        Ok(config) => config,
        Err(e) => return fatal(StartupError::from(e).into()),
    };
    logging::init(&config.log_level);
    tracing::debug!(?cli, "starting");

    let mut env = Environment::new();
    env.extend(config.env_vars.clone());
    let mut shell = Shell::new(env);

    if let Some(script) = &cli.script {
        return match repl::run_script(&mut shell, script, config.banner) {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => fatal(e.into()),
        };
    }

    let prompt = ShellPrompt::new(config.prompt.as_str(), cli.show_path || config.show_cwd);
    repl::run_interactive(&mut shell, &prompt, config.banner);
    ExitCode::SUCCESS
}

fn fatal(err: ShellError) -> ExitCode {
    debug_assert!(err.is_fatal());
    eprintln!("Error: {}", err);
    ExitCode::FAILURE
}
