use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::args::{CommandArgs, ConfigureServerArgs, GlobalArgs, ParsedUpdate};
use crate::config::{replace_passwords, ConfigDocument};
use crate::errors::{retry_until, OpsError, RetryPolicy};
use crate::prompt::{confirm, prompt_confirmed_secret, prompt_validated, Prompter};

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_-]*[a-zA-Z]").expect("username pattern compiles"));

/// 3 to 20 characters, starting with a letter and with a letter-ended prefix.
pub fn is_username_valid(username: &str) -> bool {
    (3..=20).contains(&username.len()) && USERNAME_RE.is_match(username)
}

/// Apply every command in `update` to the config and write the result.
/// Returns the path written.
pub async fn run_update(
    update: &ParsedUpdate,
    prompter: &mut dyn Prompter,
    retry: &RetryPolicy,
) -> Result<PathBuf, OpsError> {
    let global = &update.global;
    let mut doc = ConfigDocument::load(&global.config).await?;

    if let Some(args) = update.configure_server() {
        configure_server(&mut doc, args, prompter, retry)?;
    }

    let per_policy: Vec<&CommandArgs> = update
        .commands
        .iter()
        .filter(|c| !matches!(c, CommandArgs::ConfigureServer(_)))
        .collect();

    if !per_policy.is_empty() {
        let selected = select_policies(&mut doc, global)?;
        for command in per_policy {
            match command {
                CommandArgs::SetPasswords(args) => {
                    let entries = doc.policy_entries_mut()?;
                    for &index in &selected {
                        set_passwords(&mut entries[index], &args.password_placeholder, prompter, retry)?;
                    }
                }
                CommandArgs::SetScanPolicy(args) => {
                    let Some(file) = policy_file_value(&args.policy, prompter)? else {
                        prompter.say("Policy not updated.");
                        continue;
                    };
                    let entries = doc.policy_entries_mut()?;
                    for &index in &selected {
                        if let Some(entry) = entries[index].as_object_mut() {
                            entry.insert("file".to_string(), Value::String(file.clone()));
                        }
                    }
                    info!(file = %file, policies = selected.len(), "Policy file updated");
                }
                CommandArgs::ConfigureServer(_) => {}
            }
        }
    }

    let output = global.output_path();
    doc.save(&output).await?;
    Ok(output)
}

/// Indices of the policies the update applies to. Every requested name must
/// exist unless the wildcard is used.
fn select_policies(doc: &mut ConfigDocument, global: &GlobalArgs) -> Result<Vec<usize>, OpsError> {
    let entries = doc.policy_entries_mut()?;
    if global.all_policies() {
        return Ok((0..entries.len()).collect());
    }

    let names: Vec<Option<&str>> = entries
        .iter()
        .map(|entry| entry.get("name").and_then(Value::as_str))
        .collect();
    for wanted in &global.policies {
        if !names.iter().any(|name| *name == Some(wanted.as_str())) {
            return Err(OpsError::Config(format!("Invalid policy name used: '{}'", wanted)));
        }
    }
    Ok(names
        .iter()
        .enumerate()
        .filter(|(_, name)| name.is_some_and(|n| global.policies.iter().any(|w| w == n)))
        .map(|(index, _)| index)
        .collect())
}

fn set_passwords(
    entry: &mut Value,
    placeholder: &str,
    prompter: &mut dyn Prompter,
    retry: &RetryPolicy,
) -> Result<(), OpsError> {
    let name = entry.get("name").and_then(Value::as_str).unwrap_or_default().to_string();
    let Some(credentials) = entry.get_mut("credentials") else {
        debug!(policy = %name, "Policy has no credentials");
        return Ok(());
    };
    let replaced = replace_passwords(credentials, placeholder, prompter, retry)?;
    info!(policy = %name, replaced, "Policy passwords updated");
    Ok(())
}

/// The value to store as a policy's `file`. Existing files are stored as
/// absolute paths; a missing file needs the operator's go-ahead.
fn policy_file_value(path: &Path, prompter: &mut dyn Prompter) -> Result<Option<String>, OpsError> {
    if let Ok(absolute) = std::fs::canonicalize(path) {
        return Ok(Some(absolute.display().to_string()));
    }
    prompter.say(&format!("Cannot find policy file: \"{}\"", path.display()));
    if confirm(prompter, "Update anyways? [y/N]: ")? {
        Ok(Some(path.display().to_string()))
    } else {
        Ok(None)
    }
}

fn configure_server(
    doc: &mut ConfigDocument,
    args: &ConfigureServerArgs,
    prompter: &mut dyn Prompter,
    retry: &RetryPolicy,
) -> Result<(), OpsError> {
    // Prompt before touching the document so a failed prompt changes nothing.
    let login = if args.usepassword {
        let username = prompt_validated(
            prompter,
            "Server Username: ",
            "ERROR: Username must be 3-20 characters and start and end with a letter",
            retry,
            is_username_valid,
        )?;
        let password = prompt_confirmed_secret(prompter, "Server Password: ", "Server Password [Confirm]: ", retry)?;
        Login::Password { username, password }
    } else {
        let access_key = prompt_validated(prompter, "Access Key: ", "ERROR: Access key cannot be empty", retry, |v| {
            !v.is_empty()
        })?;
        let secret_key = retry_until("Secret Key", retry, |_| {
            let secret = prompter.read_secret("Secret Key: ")?.trim().to_string();
            if secret.is_empty() {
                prompter.say("ERROR: Secret key cannot be empty");
                return Ok(None);
            }
            Ok(Some(secret))
        })?;
        Login::Keys { access_key, secret_key }
    };

    let server = doc.server_mut()?;
    if let Some(host) = &args.host {
        server.insert("host".to_string(), json!(host));
    }
    if let Some(port) = args.port {
        server.insert("port".to_string(), json!(port));
    }
    match login {
        Login::Password { username, password } => {
            server.insert(
                "credentials".to_string(),
                json!({"type": "password", "username": username, "password": password}),
            );
            server.shift_remove("tokens");
            info!(user = %username, "Server password login configured");
        }
        Login::Keys { access_key, secret_key } => {
            server.insert(
                "tokens".to_string(),
                json!({"access_key": access_key, "secret_key": secret_key}),
            );
            info!("Server API keys configured");
        }
    }
    Ok(())
}

enum Login {
    Password { username: String, password: String },
    Keys { access_key: String, secret_key: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(is_username_valid("admin"));
        assert!(is_username_valid("scan_ops-a"));
        assert!(is_username_valid("ab1"));
        assert!(!is_username_valid("ab"));
        assert!(!is_username_valid("1admin"));
        assert!(!is_username_valid("_admin"));
        assert!(!is_username_valid("a1"));
        assert!(!is_username_valid("a23456789012345678901"));
        assert!(!is_username_valid(""));
    }
}
