use std::collections::VecDeque;

use super::Prompter;
use crate::errors::OpsError;

/// Non-interactive prompter answering from a fixed script. Everything shown to
/// the "operator" (prompts and context lines) is kept in a transcript.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    transcript: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            transcript: Vec::new(),
        }
    }

    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    pub fn is_exhausted(&self) -> bool {
        self.answers.is_empty()
    }

    fn next_answer(&mut self, prompt: &str) -> Result<String, OpsError> {
        self.transcript.push(prompt.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| OpsError::Prompt(format!("No scripted answer for prompt '{}'", prompt.trim())))
    }
}

impl Prompter for ScriptedPrompter {
    fn read_line(&mut self, prompt: &str) -> Result<String, OpsError> {
        self.next_answer(prompt)
    }

    fn read_secret(&mut self, prompt: &str) -> Result<String, OpsError> {
        self.next_answer(prompt)
    }

    fn say(&mut self, line: &str) {
        self.transcript.push(line.to_string());
    }
}
