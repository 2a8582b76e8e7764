use console::style;
use tracing::info;

use crate::cli::commands::InitArgs;
use crate::config::ConfigDocument;
use crate::errors::OpsError;
use crate::provision::{self, KeyFetcher, ProvisionReport};
use crate::scanner::{ScanSummary, ScannerApi};

pub async fn handle_init(
    api: &dyn ScannerApi,
    config: &ConfigDocument,
    args: &InitArgs,
    fetcher: &dyn KeyFetcher,
) -> Result<(), OpsError> {
    info!(config = %config.path().display(), exec = args.exec, "Initializing scanner from config");

    let report = provision::provision(api, config, fetcher).await?;
    print_report(&report);

    let mut launch_failures = 0;
    if args.exec {
        let created: Vec<ScanSummary> = report
            .outcomes
            .iter()
            .filter(|o| o.kind == provision::ItemKind::Scan)
            .filter_map(|o| {
                o.id.map(|id| ScanSummary {
                    id,
                    name: o.name.clone(),
                    status: String::new(),
                    folder_id: None,
                })
            })
            .collect();
        let (launched, failed) = provision::launch_scans(api, &created).await;
        println!("Launched {} scan(s)", launched.len());
        for (name, error) in &failed {
            println!("  {} {}: {}", style("✗").red(), name, error);
        }
        launch_failures = failed.len();
    }

    let failures = report.failures().count() + launch_failures;
    if failures > 0 {
        return Err(OpsError::Incomplete(format!("{} item(s) failed during init", failures)));
    }
    Ok(())
}

fn print_report(report: &ProvisionReport) {
    for outcome in &report.outcomes {
        match &outcome.error {
            None => println!(
                "  {} {} {}",
                style("✓").green(),
                outcome.kind,
                style(&outcome.name).bold()
            ),
            Some(error) => println!(
                "  {} {} {}: {}",
                style("✗").red(),
                outcome.kind,
                style(&outcome.name).bold(),
                error
            ),
        }
    }
}
