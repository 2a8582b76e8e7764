//! Operator interaction: line and secret input behind a trait so the
//! credential flows can run against a real terminal or a fixed script.

pub mod terminal;
pub mod scripted;

pub use terminal::ConsolePrompter;
pub use scripted::ScriptedPrompter;

use crate::errors::{retry_until, OpsError, RetryPolicy};

pub trait Prompter {
    /// Read one line of visible input.
    fn read_line(&mut self, prompt: &str) -> Result<String, OpsError>;

    /// Read one line without echoing it.
    fn read_secret(&mut self, prompt: &str) -> Result<String, OpsError>;

    /// Show a line of context to the operator.
    fn say(&mut self, line: &str);
}

/// Ask for a secret twice until both entries match and are non-empty.
///
/// The first entry is trimmed before comparison. Every rejected pair costs one
/// attempt from `policy`.
pub fn prompt_confirmed_secret(
    prompter: &mut dyn Prompter,
    prompt: &str,
    confirm_prompt: &str,
    policy: &RetryPolicy,
) -> Result<String, OpsError> {
    retry_until("confirm secret", policy, |_| {
        let secret = prompter.read_secret(prompt)?.trim().to_string();
        let confirmation = prompter.read_secret(confirm_prompt)?;
        prompter.say("");

        if secret.is_empty() {
            prompter.say("ERROR: Password cannot be empty");
            return Ok(None);
        }
        if secret != confirmation.trim() {
            prompter.say("ERROR: Passwords do not match");
            return Ok(None);
        }
        Ok(Some(secret))
    })
}

/// Ask for a line until `valid` accepts it.
pub fn prompt_validated<F>(
    prompter: &mut dyn Prompter,
    prompt: &str,
    invalid_message: &str,
    policy: &RetryPolicy,
    valid: F,
) -> Result<String, OpsError>
where
    F: Fn(&str) -> bool,
{
    retry_until(prompt.trim_end_matches(&[':', ' '][..]), policy, |_| {
        let value = prompter.read_line(prompt)?.trim().to_string();
        if valid(&value) {
            Ok(Some(value))
        } else {
            prompter.say(invalid_message);
            Ok(None)
        }
    })
}

/// Yes/no question; only `y` and `yes` (any case) count as yes.
pub fn confirm(prompter: &mut dyn Prompter, question: &str) -> Result<bool, OpsError> {
    let answer = prompter.read_line(question)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
