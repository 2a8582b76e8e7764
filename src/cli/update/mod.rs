//! The `nessus-policy-update` tool: offline edits to a configuration file.

pub mod apply;
pub mod args;
pub mod grammar;

pub use apply::{is_username_valid, run_update};
pub use args::{parse_update_args, CommandArgs, ParsedUpdate};
pub use grammar::{segment_tokens, CommandLine, UpdateCommand};
