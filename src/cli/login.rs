use tracing::{debug, info};

use crate::cli::commands::{Cli, Commands};
use crate::config::{ConfigDocument, LoginCredentials, ServerConfig, DEFAULT_PORT};
use crate::errors::OpsError;

/// What the primary tool connects to, and the document it works from.
#[derive(Debug)]
pub struct Target {
    pub server: ServerConfig,
    pub config: Option<ConfigDocument>,
}

/// Work out the scanner and login details from the flags and the optional
/// config file. Nothing here touches the network.
///
/// `--user` replaces whatever login the config carries with that user; the
/// password is then asked for at login.
pub async fn resolve_target(cli: &Cli) -> Result<Target, OpsError> {
    if cli.config.is_none() && (cli.user.is_none() || cli.host.is_none()) {
        return Err(OpsError::Usage(
            "Either --config or both --user and --host are required".into(),
        ));
    }
    if matches!(cli.command, Commands::Init(_)) && cli.config.is_none() {
        return Err(OpsError::Usage("init requires a --config file".into()));
    }

    let config = match &cli.config {
        Some(path) => Some(ConfigDocument::load(path).await?),
        None => None,
    };

    let mut server = match &config {
        Some(doc) => doc.server()?,
        None => ServerConfig::new(String::new(), DEFAULT_PORT),
    };
    if let Some(host) = &cli.host {
        server.host = host.clone();
    }
    if let Some(port) = cli.port {
        server.port = port;
    }
    if server.host.is_empty() {
        return Err(OpsError::Config("No Nessus host given in config or on the command line".into()));
    }

    if let Some(user) = &cli.user {
        // Password left unknown so login asks for it.
        server.credentials = Some(LoginCredentials {
            password: None,
            ..LoginCredentials::password(user.clone(), String::new())
        });
        server.tokens = None;
        debug!(user = %user, "Login overridden from the command line");
    }

    info!(host = %server.host, port = server.port, "Target resolved");
    Ok(Target { server, config })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["nessus-configure"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[tokio::test]
    async fn test_requires_config_or_user_and_host() {
        let result = resolve_target(&cli(&["-H", "scanner", "interact"])).await;
        assert!(matches!(result, Err(OpsError::Usage(_))));
    }

    #[tokio::test]
    async fn test_init_requires_config() {
        let result = resolve_target(&cli(&["-H", "scanner", "-U", "admin", "init"])).await;
        assert!(matches!(result, Err(OpsError::Usage(_))));
    }

    #[tokio::test]
    async fn test_missing_config_file_is_config_error() {
        let result = resolve_target(&cli(&["-c", "/nonexistent/nessus.json", "interact"])).await;
        assert!(matches!(result, Err(OpsError::Config(_))));
    }

    #[tokio::test]
    async fn test_user_and_host_leave_password_for_login() {
        let target = resolve_target(&cli(&["-H", "scanner", "-U", "admin", "-p", "9000", "interact"]))
            .await
            .unwrap();

        assert_eq!(target.server.host, "scanner");
        assert_eq!(target.server.port, 9000);
        let creds = target.server.credentials.unwrap();
        assert_eq!(creds.known_username().as_deref(), Some("admin"));
        assert!(creds.known_password().is_none());
        assert!(target.config.is_none());
    }

    #[tokio::test]
    async fn test_user_flag_replaces_config_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nessus.json");
        std::fs::write(
            &path,
            r#"{"server": {"host": "from-config", "port": "8835", "tokens": {"access_key": "a", "secret_key": "s"}}}"#,
        )
        .unwrap();

        let path_arg = path.display().to_string();
        let target = resolve_target(&cli(&["-c", &path_arg, "-U", "ops", "interact"]))
            .await
            .unwrap();

        assert_eq!(target.server.host, "from-config");
        assert_eq!(target.server.port, 8835);
        assert!(target.server.tokens.is_none());
        assert!(target.server.credentials.is_some());
        assert!(target.config.is_some());
    }
}
