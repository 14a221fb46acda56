use std::io::{self, IsTerminal};
use std::path::Path;
use tracing::{debug, warn};
use crate::error::{ShellError, StartupError};
use crate::executor::Executor;
use crate::prompt::ShellPrompt;
use crate::shell::{Event, Flow, Shell};

pub const BANNER: &str = "WELCOME TO MISH";
pub const SCRIPT_BANNER: &str = "YOUR SCRIPT IS RUNNING";

pub fn banner(script: bool) -> String {
    if script {
        format!("{}\n{}", BANNER, SCRIPT_BANNER)
    } else {
        BANNER.to_string()
    }
}

fn decode_line(raw: &[u8]) -> Result<&str, ShellError> {
    Ok(std::str::from_utf8(raw)?)
}

/// Outcome of running a script: how many lines failed and whether `exit`
/// ended it early.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScriptReport {
    pub lines_run: usize,
    pub failed_lines: Vec<usize>,
    pub exited: bool,
}

// Prints one event. Returns true if it was an error.
fn report(event: Event, line_no: Option<usize>) -> bool {
    let prefix = line_no.map(|n| format!("Line {}: ", n)).unwrap_or_default();
    match event {
        Event::Started(job) => {
            println!("[{}] {} &", job.pid, job.label);
            false
        }
        Event::Builtin { name, .. } => {
            println!("[builtin] {} &", name);
            false
        }
        Event::NonZeroExit(stage) => {
            eprintln!("{}", stage);
            false
        }
        Event::Error(e) => {
            eprintln!("Error: {}{}", prefix, e);
            true
        }
    }
}

pub fn run_interactive<E: Executor>(shell: &mut Shell<E>, prompt: &ShellPrompt, show_banner: bool) {
    if show_banner && io::stdin().is_terminal() {
        println!("{}", banner(false));
    }

    loop {
        for job in shell.reap() {
            println!("[{}] Done {}", job.pid, job.label);
        }
        if let Err(e) = prompt.show_prompt() {
            warn!(error = %e, "failed to write prompt");
        }

        let raw = match prompt.read_line() {
            Ok(Some(raw)) => raw,
            Ok(None) => break,
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        };
        let line = match decode_line(&raw) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => line,
            Err(e) => {
                eprintln!("Error: {}", e);
                continue;
            }
        };

        match shell.run_line(line, &mut |event| {
            report(event, None);
        }) {
            Ok(Flow::Exit) => break,
            Ok(Flow::Continue) => {}
            Err(e) => eprintln!("Error: {}", e),
        }
    }
}

/// Runs each line of the file as if it had been typed. A bad line is
/// reported with its number and the script carries on.
pub fn run_script<E: Executor>(
    shell: &mut Shell<E>,
    path: &Path,
    show_banner: bool,
) -> Result<ScriptReport, StartupError> {
    let src = std::fs::read(path).map_err(|source| StartupError::Script {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "running script");
    if show_banner && io::stdout().is_terminal() {
        println!("{}", banner(true));
    }

    let mut summary = ScriptReport::default();
    for (idx, raw) in src.split(|&b| b == b'\n').enumerate() {
        let line_no = idx + 1;
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let trimmed = raw.trim_ascii();
        if trimmed.is_empty() || trimmed.starts_with(b"#") {
            continue;
        }
        shell.reap();
        summary.lines_run += 1;

        let mut failed = false;
        let flow = match decode_line(raw) {
            Ok(line) => shell.run_line(line, &mut |event| {
                failed |= report(event, Some(line_no));
            }),
            Err(e) => Err(e),
        };
        match flow {
            Ok(Flow::Exit) => {
                summary.exited = true;
                break;
            }
            Ok(Flow::Continue) => {}
            Err(e) => {
                eprintln!("Error: Line {}: {}", line_no, e);
                failed = true;
            }
        }
        if failed {
            summary.failed_lines.push(line_no);
        }
    }
    shell.reap();
    Ok(summary)
}
