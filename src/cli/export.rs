use console::style;
use tracing::info;

use crate::cli::commands::ExportArgs;
use crate::errors::OpsError;
use crate::export;
use crate::scanner::ScannerApi;

pub async fn handle_export(api: &dyn ScannerApi, args: &ExportArgs) -> Result<(), OpsError> {
    info!(outdir = %args.outdir.display(), folder = ?args.scan_folder, "Exporting scans");

    let written = export::export_all(api, &args.outdir, args.scan_folder.as_deref(), &args.formats).await?;

    if written.is_empty() {
        println!("No completed scans to export.");
        return Ok(());
    }
    for path in &written {
        println!("  {} {}", style("✓").green(), path.display());
    }
    println!("{} file(s) written to {}", written.len(), args.outdir.display());
    Ok(())
}
