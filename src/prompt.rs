use std::io::{self, BufRead, Write};
use std::path::Path;

pub struct ShellPrompt {
    name: String,
    show_cwd: bool,
}

impl ShellPrompt {
    pub fn new(name: impl Into<String>, show_cwd: bool) -> Self {
        ShellPrompt {
            name: name.into(),
            show_cwd,
        }
    }

    /// `<name>> `, or `<name>:<cwd>> ` when the working directory is shown
    /// and can be determined.
    pub fn render(&self, cwd: Option<&Path>) -> String {
        match cwd {
            Some(dir) if self.show_cwd => format!("{}:{}> ", self.name, dir.display()),
            _ => format!("{}> ", self.name),
        }
    }

    pub fn show_prompt(&self) -> io::Result<()> {
        let cwd = if self.show_cwd { std::env::current_dir().ok() } else { None };
        let mut out = io::stdout().lock();
        out.write_all(self.render(cwd.as_deref()).as_bytes())?;
        out.flush()
    }

    /// Reads one raw line from stdin without its line terminator. `None`
    /// means end of input. Decoding is left to the caller so a bad byte
    /// only spoils its own line.
    pub fn read_line(&self) -> io::Result<Option<Vec<u8>>> {
        let mut buf = Vec::new();
        let bytes_read = io::stdin().lock().read_until(b'\n', &mut buf)?;
        if bytes_read == 0 {
            // EOF (e.g., Ctrl-D)
            println!();
            return Ok(None);
        }
        Ok(Some(strip_terminator(&buf).to_vec()))
    }
}

/// Drops a trailing `\n` and then a trailing `\r`.
pub fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
