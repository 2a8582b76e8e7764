//! Splits a flat argument vector into a global segment and one segment per
//! subcommand keyword, so several subcommands can be given in one call.

use std::fmt;

use crate::errors::OpsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateCommand {
    SetPasswords,
    ConfigureServer,
    SetScanPolicy,
}

impl UpdateCommand {
    pub const ALL: [UpdateCommand; 3] = [
        UpdateCommand::SetPasswords,
        UpdateCommand::ConfigureServer,
        UpdateCommand::SetScanPolicy,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            UpdateCommand::SetPasswords => "setpasswords",
            UpdateCommand::ConfigureServer => "configureserver",
            UpdateCommand::SetScanPolicy => "setscanpolicy",
        }
    }

    pub fn from_keyword(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.keyword() == token)
    }
}

impl fmt::Display for UpdateCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Tokens grouped by the segment they belong to. Command segments keep the
/// order the keywords appeared in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLine {
    pub global: Vec<String>,
    pub commands: Vec<(UpdateCommand, Vec<String>)>,
}

impl CommandLine {
    pub fn segment(&self, command: UpdateCommand) -> Option<&[String]> {
        self.commands
            .iter()
            .find(|(c, _)| *c == command)
            .map(|(_, tokens)| tokens.as_slice())
    }

    /// Fails unless at least one command keyword was given.
    pub fn require_command(self) -> Result<Self, OpsError> {
        if self.commands.is_empty() {
            return Err(OpsError::Usage("No Command Specified".into()));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy)]
enum State {
    Global,
    Command(usize),
}

/// Group `tokens` by keyword without checking that any command is present.
///
/// Every token up to the first keyword is global. Each keyword opens a new
/// segment that collects tokens until the next keyword. A keyword seen twice
/// is rejected.
pub fn segment_tokens<I, S>(tokens: I) -> Result<CommandLine, OpsError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut line = CommandLine::default();
    let mut state = State::Global;

    for token in tokens {
        let token = token.into();
        if let Some(command) = UpdateCommand::from_keyword(&token) {
            if line.segment(command).is_some() {
                return Err(OpsError::Usage(format!("Duplicate command found: \"{}\"", token)));
            }
            line.commands.push((command, Vec::new()));
            state = State::Command(line.commands.len() - 1);
            continue;
        }
        match state {
            State::Global => line.global.push(token),
            State::Command(index) => line.commands[index].1.push(token),
        }
    }
    Ok(line)
}
