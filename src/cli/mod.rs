pub mod commands;
pub mod exec;
pub mod export;
pub mod init;
pub mod interact;
pub mod login;
pub mod update;

pub use commands::{Cli, Commands};
pub use login::{resolve_target, Target};

use tracing::warn;

use crate::config::ConfigDocument;
use crate::errors::OpsError;
use crate::provision::ScpKeyFetcher;
use crate::scanner::ScannerApi;

/// Run one command and then close the scanner session, whether or not the
/// command succeeded. A failed logout is logged and never replaces the
/// command's own result.
pub async fn run_session(
    api: &dyn ScannerApi,
    command: &Commands,
    config: Option<&ConfigDocument>,
) -> Result<(), OpsError> {
    let result = dispatch(api, command, config).await;

    if let Err(e) = api.logout().await {
        warn!(error = %e, "Logout failed");
    }
    result
}

/// Run one primary-tool command against an authenticated scanner.
pub async fn dispatch(
    api: &dyn ScannerApi,
    command: &Commands,
    config: Option<&ConfigDocument>,
) -> Result<(), OpsError> {
    match command {
        Commands::Export(args) => export::handle_export(api, args).await,
        Commands::Init(args) => {
            let config = config.ok_or_else(|| OpsError::Usage("init requires a --config file".into()))?;
            init::handle_init(api, config, args, &ScpKeyFetcher).await
        }
        Commands::Exec(args) => exec::handle_exec(api, args).await,
        Commands::Interact => interact::handle_interact(api).await,
    }
}
