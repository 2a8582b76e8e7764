use nessus_ops::cli::update::{parse_update_args, run_update};
use nessus_ops::errors::{OpsError, RetryPolicy};
use nessus_ops::logging;
use nessus_ops::prompt::ConsolePrompter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let parsed = match parse_update_args(std::env::args().skip(1)) {
        Ok(parsed) => parsed,
        // clap renders its own usage, help and version output
        Err(OpsError::Cli(e)) => e.exit(),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    };
    logging::init(parsed.global.verbose, parsed.global.no_color, false);

    let mut prompter = ConsolePrompter::new();
    match run_update(&parsed, &mut prompter, &RetryPolicy::default()).await {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "Config written");
            println!("Config updated successfully.");
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}
