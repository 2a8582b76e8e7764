use reqwest::Method;
use serde_json::Value;

/// Commands understood by the interactive session.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Folders,
    Policies,
    Templates,
    Scans { folder: Option<String> },
    Raw { method: Method, path: String, body: Option<Value> },
    Version,
    Help { command: Option<String> },
    Exit,
}

/// Description of a command for help display.
pub struct CommandHelp {
    pub name: &'static str,
    pub usage: &'static str,
    pub description: &'static str,
}

pub static COMMAND_HELP: &[CommandHelp] = &[
    CommandHelp {
        name: "folders",
        usage: "folders",
        description: "List scan folders",
    },
    CommandHelp {
        name: "policies",
        usage: "policies",
        description: "List saved policies",
    },
    CommandHelp {
        name: "templates",
        usage: "templates",
        description: "List policy templates",
    },
    CommandHelp {
        name: "scans",
        usage: "scans [FOLDER]",
        description: "List scans, optionally only those in one folder",
    },
    CommandHelp {
        name: "get",
        usage: "get PATH",
        description: "GET an API path and print the response",
    },
    CommandHelp {
        name: "delete",
        usage: "delete PATH",
        description: "DELETE an API path",
    },
    CommandHelp {
        name: "post",
        usage: "post PATH [JSON]",
        description: "POST an optional JSON body to an API path",
    },
    CommandHelp {
        name: "put",
        usage: "put PATH [JSON]",
        description: "PUT an optional JSON body to an API path",
    },
    CommandHelp {
        name: "version",
        usage: "version",
        description: "Show version and build info",
    },
    CommandHelp {
        name: "help",
        usage: "help [command]",
        description: "Show help for all or a specific command",
    },
    CommandHelp {
        name: "exit",
        usage: "exit",
        description: "Log out and quit",
    },
];

/// All command names for tab completion.
pub static COMMAND_NAMES: &[&str] = &[
    "folders", "policies", "templates", "scans", "get", "delete", "post", "put", "version", "help", "exit", "quit",
];

/// Parse a raw input line into a command, or return an error message.
pub fn parse_command(input: &str) -> Result<ReplCommand, String> {
    let input = input.trim();
    let (cmd, rest) = match input.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (input, ""),
    };
    let cmd = cmd.trim_start_matches('/');

    match cmd {
        "" => Err("Empty command".into()),
        "folders" => Ok(ReplCommand::Folders),
        "policies" => Ok(ReplCommand::Policies),
        "templates" => Ok(ReplCommand::Templates),
        "scans" => Ok(ReplCommand::Scans {
            folder: (!rest.is_empty()).then(|| rest.to_string()),
        }),
        "get" => parse_raw(Method::GET, rest, false),
        "delete" => parse_raw(Method::DELETE, rest, false),
        "post" => parse_raw(Method::POST, rest, true),
        "put" => parse_raw(Method::PUT, rest, true),
        "version" => Ok(ReplCommand::Version),
        "help" => Ok(ReplCommand::Help {
            command: rest.split_whitespace().next().map(str::to_string),
        }),
        "exit" | "quit" | "q" => Ok(ReplCommand::Exit),
        other => Err(format!("Unknown command: {}. Type help for available commands.", other)),
    }
}

fn parse_raw(method: Method, rest: &str, accepts_body: bool) -> Result<ReplCommand, String> {
    let (path, body) = match rest.split_once(char::is_whitespace) {
        Some((path, body)) => (path, body.trim()),
        None => (rest, ""),
    };
    if path.is_empty() {
        return Err(format!("{} needs an API path, e.g. /scans", method.as_str().to_lowercase()));
    }
    if !body.is_empty() && !accepts_body {
        return Err(format!("{} does not take a body", method.as_str().to_lowercase()));
    }

    let body = if body.is_empty() {
        None
    } else {
        Some(serde_json::from_str(body).map_err(|e| format!("Invalid JSON body: {}", e))?)
    };
    let path = if path.starts_with('/') { path.to_string() } else { format!("/{}", path) };
    Ok(ReplCommand::Raw { method, path, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_listing_commands() {
        assert_eq!(parse_command("folders").unwrap(), ReplCommand::Folders);
        assert_eq!(parse_command("  /policies ").unwrap(), ReplCommand::Policies);
        assert_eq!(parse_command("scans").unwrap(), ReplCommand::Scans { folder: None });
        assert_eq!(
            parse_command("scans Weekly Audits").unwrap(),
            ReplCommand::Scans { folder: Some("Weekly Audits".into()) }
        );
    }

    #[test]
    fn test_parse_raw_request_with_body() {
        let cmd = parse_command(r#"post scans/12/launch {"alt_targets": ["10.0.0.9"]}"#).unwrap();
        assert_eq!(
            cmd,
            ReplCommand::Raw {
                method: Method::POST,
                path: "/scans/12/launch".into(),
                body: Some(json!({"alt_targets": ["10.0.0.9"]})),
            }
        );
    }

    #[test]
    fn test_parse_raw_errors() {
        assert!(parse_command("get").is_err());
        assert!(parse_command("get /scans {}").is_err());
        assert!(parse_command("put /policies/3 {not json").is_err());
    }

    #[test]
    fn test_exit_aliases() {
        for input in ["exit", "quit", "q", "/exit"] {
            assert_eq!(parse_command(input).unwrap(), ReplCommand::Exit);
        }
    }

    #[test]
    fn test_unknown_command() {
        let err = parse_command("launch 12").unwrap_err();
        assert!(err.contains("Unknown command: launch"));
    }

    #[test]
    fn test_every_command_has_help() {
        for name in COMMAND_NAMES.iter().filter(|n| **n != "quit") {
            assert!(COMMAND_HELP.iter().any(|c| c.name == *name), "missing help for {}", name);
        }
    }
}
