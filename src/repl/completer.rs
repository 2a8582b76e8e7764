use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::repl::commands::COMMAND_NAMES;

/// Common API paths offered after a raw request verb.
const API_PATHS: &[&str] = &[
    "/folders",
    "/policies",
    "/editor/policy/templates",
    "/scans",
    "/server/properties",
    "/server/status",
    "/session",
];

#[derive(Default)]
pub struct ReplHelper;

impl Helper for ReplHelper {}
impl Validator for ReplHelper {}
impl Highlighter for ReplHelper {}

impl Hinter for ReplHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.contains(' ') {
            return None;
        }
        COMMAND_NAMES
            .iter()
            .find(|name| name.starts_with(trimmed) && **name != trimmed)
            .map(|name| name[trimmed.len()..].to_string())
    }
}

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let prefix = &line[..pos];
        let trimmed = prefix.trim_start();

        // Past the command name: complete API paths for raw requests
        if let Some(space_idx) = trimmed.find(' ') {
            let cmd = &trimmed[..space_idx];
            let arg_prefix = trimmed[space_idx..].trim_start();
            if arg_prefix.contains(' ') || !matches!(cmd, "get" | "delete" | "post" | "put") {
                return Ok((pos, vec![]));
            }
            let arg_start = pos - arg_prefix.len();
            return Ok((arg_start, candidates(API_PATHS, arg_prefix)));
        }

        let start = pos - trimmed.len();
        Ok((start, candidates(COMMAND_NAMES, trimmed)))
    }
}

fn candidates(options: &[&str], prefix: &str) -> Vec<Pair> {
    options
        .iter()
        .filter(|option| option.starts_with(prefix))
        .map(|option| Pair {
            display: option.to_string(),
            replacement: option.to_string(),
        })
        .collect()
}
