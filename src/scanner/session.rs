use tracing::debug;

use super::client::NessusClient;
use crate::config::ServerConfig;
use crate::errors::OpsError;
use crate::prompt::Prompter;

/// Build a client for `server` and authenticate it.
///
/// API tokens win over credentials. Usernames and passwords left as the
/// placeholder (or absent) are asked for interactively. With neither tokens
/// nor credentials this fails before touching the network.
pub async fn connect(server: &ServerConfig, prompter: &mut dyn Prompter) -> Result<NessusClient, OpsError> {
    if server.tokens.is_none() && server.credentials.is_none() {
        return Err(OpsError::Config(
            "Credentials or Token not provided or missing in config file".into(),
        ));
    }

    let mut client = NessusClient::new(server)?;

    if let Some(tokens) = &server.tokens {
        client.use_api_keys(tokens);
        return Ok(client);
    }

    if let Some(credentials) = &server.credentials {
        let username = match credentials.known_username() {
            Some(user) => user,
            None => prompter.read_line("Username: ")?.trim().to_string(),
        };
        let password = match credentials.known_password() {
            Some(password) => password,
            None => prompter.read_secret("Password: ")?,
        };
        debug!(user = %username, host = %server.host, "Logging in with password");
        client.login(&username, &password).await?;
    }

    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;

    #[tokio::test]
    async fn test_connect_without_login_info_fails_before_network() {
        let server = ServerConfig::new("scanner.invalid", 8834);
        let mut prompter = ScriptedPrompter::default();
        let result = connect(&server, &mut prompter).await;
        assert!(matches!(result, Err(OpsError::Config(_))));
        assert!(prompter.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_connect_with_tokens_needs_no_prompt() {
        let mut server = ServerConfig::new("scanner.invalid", 8834);
        server.tokens = Some(crate::config::ApiTokens {
            access_key: "ak".into(),
            secret_key: "sk".into(),
        });
        let mut prompter = ScriptedPrompter::default();
        let client = connect(&server, &mut prompter).await.unwrap();
        assert_eq!(client.base_url(), "https://scanner.invalid:8834");
        assert!(prompter.transcript().is_empty());
    }
}
