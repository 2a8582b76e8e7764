use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `-v` raises the level once per repeat and
/// `RUST_LOG` overrides it. Logs go to stderr so command output stays on
/// stdout.
pub fn init(verbose: u8, no_color: bool, json: bool) {
    let log_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr);

    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
