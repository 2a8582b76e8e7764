use console::style;
use serde_json::Value;

use crate::repl::commands::{CommandHelp, COMMAND_HELP};
use crate::scanner::{Folder, SavedPolicy, ScanSummary, Template};

/// Render the help listing for all commands.
pub fn render_help(specific_command: Option<&str>) -> String {
    if let Some(cmd_name) = specific_command {
        return match COMMAND_HELP.iter().find(|c| c.name == cmd_name) {
            Some(cmd) => format_command_detail(cmd),
            None => format!("{} Unknown command: {}", style("✗").red(), cmd_name),
        };
    }

    let mut out = String::new();
    out.push_str(&format!("\n{}\n\n", style("Available commands:").white().bold()));
    for cmd in COMMAND_HELP {
        out.push_str(&format!(
            "  {:<20} {}\n",
            style(cmd.usage).cyan().bold(),
            style(cmd.description).dim(),
        ));
    }
    out
}

fn format_command_detail(cmd: &CommandHelp) -> String {
    format!(
        "\n{}\n  {}\n\n  {}\n",
        style(cmd.name).cyan().bold(),
        style(cmd.description).dim(),
        style(cmd.usage).white(),
    )
}

/// Render the version info.
pub fn render_version() -> String {
    format!(
        "\n  {} {}\n  {} {}\n  {} {}\n",
        style("Version:").dim(),
        style(env!("CARGO_PKG_VERSION")).white().bold(),
        style("Commit:").dim(),
        style(env!("GIT_HASH")).white(),
        style("Built:").dim(),
        style(env!("BUILD_TIMESTAMP")).white(),
    )
}

pub fn render_folders(folders: &[Folder]) -> String {
    let rows = folders
        .iter()
        .map(|f| format!("  {:>6}  {}  {}", f.id, f.name, style(f.kind.as_deref().unwrap_or("")).dim()));
    render_table("Folders", rows)
}

pub fn render_policies(policies: &[SavedPolicy]) -> String {
    let rows = policies
        .iter()
        .map(|p| format!("  {:>6}  {}  {}", p.id, p.name, style(&p.template_uuid).dim()));
    render_table("Policies", rows)
}

pub fn render_templates(templates: &[Template]) -> String {
    let rows = templates
        .iter()
        .map(|t| format!("  {:<28} {}  {}", t.name, t.title, style(&t.uuid).dim()));
    render_table("Templates", rows)
}

pub fn render_scans(scans: &[ScanSummary]) -> String {
    let rows = scans.iter().map(|s| {
        let status = match s.status.as_str() {
            "completed" | "imported" => style(s.status.as_str()).green(),
            "running" | "pending" => style(s.status.as_str()).yellow(),
            "canceled" | "aborted" => style(s.status.as_str()).red(),
            other => style(other).dim(),
        };
        format!("  {:>6}  {:<40} {}", s.id, s.name, status)
    });
    render_table("Scans", rows)
}

fn render_table(title: &str, rows: impl Iterator<Item = String>) -> String {
    let rows: Vec<String> = rows.collect();
    if rows.is_empty() {
        return render_info(&format!("No {}.", title.to_lowercase()));
    }
    format!(
        "\n{} {}\n{}\n",
        style(title).white().bold(),
        style(format!("({})", rows.len())).dim(),
        rows.join("\n")
    )
}

/// Pretty-print an API response.
pub fn render_json(value: &Value) -> String {
    match value {
        Value::Null => render_info("(empty response)"),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// Print an error message.
pub fn render_error(msg: &str) -> String {
    format!("{} {}", style("✗").red(), style(msg).red())
}

/// Print an informational message.
pub fn render_info(msg: &str) -> String {
    format!("{}", style(msg).dim())
}
