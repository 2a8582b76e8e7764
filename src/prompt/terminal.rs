use std::io::{self, BufRead, BufReader};

use console::Term;

use super::Prompter;
use crate::errors::OpsError;

enum Input {
    /// Interactive terminal. Secrets are read without echo.
    Terminal(Term),
    /// Piped or redirected input, one answer per line.
    Lines(Box<dyn BufRead + Send>),
}

/// Prompts the operator on the console.
///
/// Prompts go to stderr, or to stdout when only stdout is a terminal, so
/// redirecting the log does not take input away. With no terminal at all,
/// answers are read line by line from stdin.
pub struct ConsolePrompter {
    input: Input,
    output: Term,
}

impl ConsolePrompter {
    pub fn new() -> Self {
        match [Term::stderr(), Term::stdout()].into_iter().find(|term| term.is_term()) {
            Some(term) => Self {
                output: term.clone(),
                input: Input::Terminal(term),
            },
            None => Self::from_reader(BufReader::new(io::stdin())),
        }
    }

    /// Answer prompts from `reader` instead of a terminal.
    pub fn from_reader(reader: impl BufRead + Send + 'static) -> Self {
        Self {
            input: Input::Lines(Box::new(reader)),
            output: Term::stderr(),
        }
    }

    fn read(&mut self, prompt: &str, secret: bool) -> Result<String, OpsError> {
        self.output
            .write_str(prompt)
            .map_err(|e| OpsError::Prompt(format!("Failed to show prompt: {}", e)))?;

        let line = match &mut self.input {
            Input::Terminal(term) if secret => term.read_secure_line(),
            Input::Terminal(term) => term.read_line(),
            Input::Lines(reader) => return read_piped_line(reader),
        };
        line.map_err(|e| OpsError::Prompt(format!("Failed to read input: {}", e)))
    }
}

impl Default for ConsolePrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for ConsolePrompter {
    fn read_line(&mut self, prompt: &str) -> Result<String, OpsError> {
        self.read(prompt, false)
    }

    fn read_secret(&mut self, prompt: &str) -> Result<String, OpsError> {
        self.read(prompt, true)
    }

    fn say(&mut self, line: &str) {
        let _ = self.output.write_line(line);
    }
}

/// One answer from non-terminal input. End of input is an error so retry
/// loops stop instead of spinning on empty answers.
fn read_piped_line<R: BufRead + ?Sized>(reader: &mut R) -> Result<String, OpsError> {
    let mut line = String::new();
    let read = reader
        .read_line(&mut line)
        .map_err(|e| OpsError::Prompt(format!("Failed to read input: {}", e)))?;
    if read == 0 {
        return Err(OpsError::Prompt("Input ended before an answer was given".into()));
    }
    Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
}
