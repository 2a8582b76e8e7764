use std::path::PathBuf;

use clap::{ArgGroup, Parser};

use super::grammar::{segment_tokens, UpdateCommand};
use crate::cli::commands::LONG_VERSION;
use crate::config::PLACEHOLDER;
use crate::errors::OpsError;

const COMMANDS_HELP: &str = "\
Commands (any combination, each at most once, after the global options):
  setpasswords [--password_placeholder STR]
      Prompt for every policy credential password equal to STR (default: all)
  configureserver [-H HOST] [-P PORT] (-p | -k)
      Set the scanner address and its login (-p password, -k API keys)
  setscanpolicy POLICYXML
      Point the selected policies at another exported policy file";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "nessus-policy-update",
    version,
    long_version = LONG_VERSION,
    about = "Update the policies and server login of a Nessus JSON configuration",
    after_help = COMMANDS_HELP,
    group(ArgGroup::new("output").required(true).args(["overwrite", "outfile"]))
)]
pub struct GlobalArgs {
    /// JSON Nessus configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Names of the policies to update ("*" for all)
    #[arg(long, value_name = "NAME", num_args = 1.., default_value = PLACEHOLDER)]
    pub policies: Vec<String>,

    /// Rewrite CONFIG in place
    #[arg(long)]
    pub overwrite: bool,

    /// Write the updated config to this file instead
    #[arg(short, long, value_name = "OUTFILE")]
    pub outfile: Option<PathBuf>,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl GlobalArgs {
    pub fn output_path(&self) -> PathBuf {
        match &self.outfile {
            Some(path) if !self.overwrite => path.clone(),
            _ => self.config.clone(),
        }
    }

    pub fn all_policies(&self) -> bool {
        self.policies.iter().any(|p| p == PLACEHOLDER)
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "setpasswords", about = "Replace placeholder passwords in policy credentials")]
pub struct SetPasswordsArgs {
    /// Password value to replace ("*" replaces every password)
    #[arg(long = "password_placeholder", value_name = "STR", default_value = PLACEHOLDER)]
    pub password_placeholder: String,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "configureserver",
    about = "Set the scanner address and login",
    group(ArgGroup::new("login").required(true).args(["usepassword", "usekeys"]))
)]
pub struct ConfigureServerArgs {
    /// IP/hostname of the Nessus instance
    #[arg(short = 'H', long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port of the Nessus instance
    #[arg(short = 'P', long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Log in with a username and password
    #[arg(short = 'p', long)]
    pub usepassword: bool,

    /// Log in with an API access/secret key pair
    #[arg(short = 'k', long)]
    pub usekeys: bool,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "setscanpolicy", about = "Point policies at a different policy file")]
pub struct SetScanPolicyArgs {
    /// Exported .nessus policy file
    #[arg(value_name = "POLICYXML")]
    pub policy: PathBuf,
}

#[derive(Debug, Clone)]
pub enum CommandArgs {
    SetPasswords(SetPasswordsArgs),
    ConfigureServer(ConfigureServerArgs),
    SetScanPolicy(SetScanPolicyArgs),
}

/// A fully parsed update invocation. Commands keep the order they were given.
#[derive(Debug, Clone)]
pub struct ParsedUpdate {
    pub global: GlobalArgs,
    pub commands: Vec<CommandArgs>,
}

impl ParsedUpdate {
    pub fn configure_server(&self) -> Option<&ConfigureServerArgs> {
        self.commands.iter().find_map(|c| match c {
            CommandArgs::ConfigureServer(args) => Some(args),
            _ => None,
        })
    }
}

/// Parse the arguments that follow the program name.
///
/// The global segment is parsed first so `--help` and `--version` work
/// without a command. Each command segment is then parsed by its own schema.
pub fn parse_update_args<I, S>(tokens: I) -> Result<ParsedUpdate, OpsError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let line = segment_tokens(tokens)?;

    let global = GlobalArgs::try_parse_from(
        std::iter::once("nessus-policy-update".to_string()).chain(line.global.iter().cloned()),
    )?;
    let line = line.require_command()?;

    let mut commands = Vec::with_capacity(line.commands.len());
    for (command, segment) in &line.commands {
        let argv = std::iter::once(command.keyword().to_string()).chain(segment.iter().cloned());
        let parsed = match command {
            UpdateCommand::SetPasswords => CommandArgs::SetPasswords(SetPasswordsArgs::try_parse_from(argv)?),
            UpdateCommand::ConfigureServer => CommandArgs::ConfigureServer(ConfigureServerArgs::try_parse_from(argv)?),
            UpdateCommand::SetScanPolicy => CommandArgs::SetScanPolicy(SetScanPolicyArgs::try_parse_from(argv)?),
        };
        commands.push(parsed);
    }

    Ok(ParsedUpdate { global, commands })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_schemas_are_consistent() {
        GlobalArgs::command().debug_assert();
        SetPasswordsArgs::command().debug_assert();
        ConfigureServerArgs::command().debug_assert();
        SetScanPolicyArgs::command().debug_assert();
    }

    #[test]
    fn test_setpasswords_defaults() {
        let parsed = parse_update_args(["nessus.json", "--overwrite", "setpasswords"]).unwrap();
        assert_eq!(parsed.global.policies, vec!["*"]);
        assert!(parsed.global.all_policies());
        assert_eq!(parsed.global.output_path(), PathBuf::from("nessus.json"));
        match &parsed.commands[..] {
            [CommandArgs::SetPasswords(args)] => assert_eq!(args.password_placeholder, "*"),
            other => panic!("unexpected commands {:?}", other),
        }
    }

    #[test]
    fn test_outfile_and_policy_names() {
        let parsed = parse_update_args([
            "nessus.json", "--policies", "Linux Audit", "Windows", "-o", "out.json",
            "setpasswords", "--password_placeholder", "CHANGEME",
            "setscanpolicy", "audit.nessus",
        ])
        .unwrap();
        assert_eq!(parsed.global.policies, vec!["Linux Audit", "Windows"]);
        assert!(!parsed.global.all_policies());
        assert_eq!(parsed.global.output_path(), PathBuf::from("out.json"));
        assert_eq!(parsed.commands.len(), 2);
        match &parsed.commands[1] {
            CommandArgs::SetScanPolicy(args) => assert_eq!(args.policy, PathBuf::from("audit.nessus")),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_output_mode_required_and_exclusive() {
        let missing = parse_update_args(["nessus.json", "setpasswords"]).unwrap_err();
        assert!(matches!(missing, OpsError::Cli(_)));

        let both = parse_update_args(["nessus.json", "--overwrite", "-o", "x.json", "setpasswords"]).unwrap_err();
        assert!(matches!(both, OpsError::Cli(_)));
    }

    #[test]
    fn test_configureserver_needs_exactly_one_login_mode() {
        let parsed = parse_update_args(["c.json", "--overwrite", "configureserver", "-H", "10.0.0.5", "-P", "8835", "-k"]).unwrap();
        let server = parsed.configure_server().unwrap();
        assert_eq!(server.host.as_deref(), Some("10.0.0.5"));
        assert_eq!(server.port, Some(8835));
        assert!(server.usekeys && !server.usepassword);

        assert!(parse_update_args(["c.json", "--overwrite", "configureserver"]).is_err());
        assert!(parse_update_args(["c.json", "--overwrite", "configureserver", "-p", "-k"]).is_err());
    }

    #[test]
    fn test_no_command_is_usage_error() {
        let err = parse_update_args(["c.json", "--overwrite"]).unwrap_err();
        assert!(matches!(err, OpsError::Usage(_)));
    }

    #[test]
    fn test_help_without_command_is_clap_display() {
        let err = parse_update_args(["--help"]).unwrap_err();
        match err {
            OpsError::Cli(e) => assert_eq!(e.kind(), clap::error::ErrorKind::DisplayHelp),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_setscanpolicy_requires_path() {
        assert!(parse_update_args(["c.json", "--overwrite", "setscanpolicy"]).is_err());
    }
}
