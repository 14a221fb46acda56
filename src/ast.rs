#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectMode {
    Read,
    Truncate,
    Append,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub path: String,
    pub mode: RedirectMode,
}

impl Redirect {
    pub fn input(path: impl Into<String>) -> Self {
        Redirect { path: path.into(), mode: RedirectMode::Read }
    }

    pub fn output(path: impl Into<String>, append: bool) -> Self {
        let mode = if append { RedirectMode::Append } else { RedirectMode::Truncate };
        Redirect { path: path.into(), mode }
    }
}

/// One executable step of a line.
///
/// `is_pipe_start` means the command's stdout feeds the next command,
/// `is_pipe_end` means its stdin is fed by the previous one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    pub tokens: Vec<String>,
    pub redirect_input: Option<Redirect>,
    pub redirect_output: Option<Redirect>,
    pub is_pipe_start: bool,
    pub is_pipe_end: bool,
    pub is_background: bool,
}

impl Command {
    pub fn new<S: Into<String>>(tokens: impl IntoIterator<Item = S>) -> Self {
        Command {
            tokens: tokens.into_iter().map(Into::into).collect(),
            ..Command::default()
        }
    }

    pub fn program(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    pub fn args(&self) -> &[String] {
        self.tokens.get(1..).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty() && self.redirect_input.is_none() && self.redirect_output.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    pub commands: Vec<Command>,
    pub background: bool,
}

impl Pipeline {
    pub fn new(commands: Vec<Command>) -> Self {
        let background = commands.last().is_some_and(|c| c.is_background);
        Pipeline { commands, background }
    }

    /// Groups parsed commands into pipe-linked runs. A run continues only
    /// while the next command reads from a pipe.
    pub fn group(commands: Vec<Command>) -> Vec<Pipeline> {
        let mut pipelines = Vec::new();
        let mut current = Vec::new();
        let mut iter = commands.into_iter().peekable();
        while let Some(cmd) = iter.next() {
            current.push(cmd);
            if !iter.peek().is_some_and(|next| next.is_pipe_end) {
                pipelines.push(Pipeline::new(std::mem::take(&mut current)));
            }
        }
        pipelines
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Program name of the final stage, used to label jobs.
    pub fn label(&self) -> &str {
        self.commands.last().and_then(Command::program).unwrap_or("")
    }
}
