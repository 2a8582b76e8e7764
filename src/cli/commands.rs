use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::export::ExportFormat;

pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    ", built ",
    env!("BUILD_TIMESTAMP"),
    ")"
);

#[derive(Parser, Debug)]
#[command(
    name = "nessus-configure",
    version,
    long_version = LONG_VERSION,
    about = "Initialize and export a Nessus instance from a JSON configuration, or interact with its API"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// JSON Nessus credential/policy/scan configuration file
    #[arg(short, long, value_name = "CONFIG", help_heading = "Connection Info")]
    pub config: Option<PathBuf>,

    /// User to authenticate to Nessus
    #[arg(short = 'U', long, value_name = "USERNAME", help_heading = "Connection Info")]
    pub user: Option<String>,

    /// IP/hostname of the Nessus instance
    #[arg(short = 'H', long, value_name = "HOST", help_heading = "Connection Info")]
    pub host: Option<String>,

    /// Port to connect to Nessus
    #[arg(short, long, value_name = "PORT", help_heading = "Connection Info")]
    pub port: Option<u16>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export Nessus scans to a directory
    Export(ExportArgs),
    /// Initialize Nessus policies/credentials and scans from the config
    Init(InitArgs),
    /// Launch existing scans
    Exec(ExecArgs),
    /// Open an interactive session against the Nessus API
    Interact,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Directory to export scan results to
    #[arg(short, long, value_name = "OUTPUT_DIR")]
    pub outdir: PathBuf,

    /// Formats for scan exports
    #[arg(
        short,
        long = "format",
        value_name = "FMT",
        value_enum,
        ignore_case = true,
        num_args = 1..,
        default_values_t = [ExportFormat::Nessus]
    )]
    pub formats: Vec<ExportFormat>,

    /// Export only the scans from this Nessus folder
    #[arg(long = "scan_folder", value_name = "FOLDER")]
    pub scan_folder: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct InitArgs {
    /// Launch the created scans once initialization finishes
    #[arg(short, long)]
    pub exec: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ExecArgs {
    /// Launch every scan in this folder
    #[arg(short, long, value_name = "SCAN_FOLDER")]
    pub folder: Option<String>,

    /// Launch the scans with these names
    #[arg(short, long = "scan", value_name = "SCAN_NAME", num_args = 1..)]
    pub scans: Vec<String>,
}
