use crate::ui::messages::warning;
use crate::utils::path::expand_tilde;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Interactive questions the schedule may need to ask the operator.
/// `None` means the operator declined.
pub trait Prompt {
    fn ask_directory(&mut self, title: &str) -> Option<PathBuf>;
    fn ask_file(&mut self, title: &str, start_dir: Option<&Path>) -> Option<PathBuf>;
}

/// Reads answers from a line-oriented input (stdin by default).
pub struct StdinPrompt<R> {
    input: R,
}

impl StdinPrompt<io::StdinLock<'static>> {
    pub fn new() -> Self {
        Self {
            input: io::stdin().lock(),
        }
    }
}

impl Default for StdinPrompt<io::StdinLock<'static>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: BufRead> StdinPrompt<R> {
    pub fn from_reader(input: R) -> Self {
        Self { input }
    }

    /// Enter means yes; `q`, `n` or end of input mean no.
    pub fn confirm(&mut self, question: &str) -> bool {
        print!("{question} ");
        io::stdout().flush().ok();

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => !matches!(answer.trim().to_ascii_lowercase().as_str(), "q" | "n" | "no"),
        }
    }

    fn ask(&mut self, question: &str) -> Option<String> {
        print!("{question}: ");
        io::stdout().flush().ok();

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                let trimmed = answer.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
        }
    }
}

impl<R: BufRead> Prompt for StdinPrompt<R> {
    fn ask_directory(&mut self, title: &str) -> Option<PathBuf> {
        let answer = self.ask(&format!("{title} directory (empty to cancel)"))?;
        let dir = expand_tilde(&answer);
        if dir.is_dir() {
            Some(dir)
        } else {
            warning(format!("'{}' is not a directory.", dir.display()));
            None
        }
    }

    fn ask_file(&mut self, title: &str, start_dir: Option<&Path>) -> Option<PathBuf> {
        let hint = start_dir
            .map(|d| format!(" [relative to {}]", d.display()))
            .unwrap_or_default();
        let answer = self.ask(&format!("{title}{hint}"))?;

        let path = expand_tilde(&answer);
        let path = match start_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path,
        };
        if path.is_file() {
            Some(path)
        } else {
            warning(format!("'{}' is not a file.", path.display()));
            None
        }
    }
}
