use clap::Parser;
use tracing::info;

use nessus_ops::cli::{self, Cli};
use nessus_ops::errors::OpsError;
use nessus_ops::logging;
use nessus_ops::prompt::ConsolePrompter;
use nessus_ops::scanner;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.no_color, cli.log_json);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), OpsError> {
    let target = cli::resolve_target(&cli).await?;

    let mut prompter = ConsolePrompter::new();
    let client = scanner::connect(&target.server, &mut prompter).await?;
    info!(url = %client.base_url(), "Connected to Nessus");

    cli::run_session(&client, &cli.command, target.config.as_ref()).await
}
