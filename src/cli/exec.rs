use console::style;
use tracing::info;

use crate::cli::commands::ExecArgs;
use crate::errors::OpsError;
use crate::provision;
use crate::scanner::ScannerApi;

pub async fn handle_exec(api: &dyn ScannerApi, args: &ExecArgs) -> Result<(), OpsError> {
    if args.folder.is_none() && args.scans.is_empty() {
        return Err(OpsError::Usage("exec needs --folder, --scan or both".into()));
    }

    let scans = provision::select_scans(api, args.folder.as_deref(), &args.scans).await?;
    info!(count = scans.len(), "Launching scans");

    let (launched, failed) = provision::launch_scans(api, &scans).await;
    println!("Launched {} scan(s)", launched.len());
    for (name, error) in &failed {
        println!("  {} {}: {}", style("✗").red(), name, error);
    }

    if !failed.is_empty() {
        return Err(OpsError::Incomplete(format!("{} scan(s) failed to launch", failed.len())));
    }
    Ok(())
}
