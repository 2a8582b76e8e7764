use console::style;
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};
use tracing::debug;

use crate::errors::OpsError;
use crate::provision::find_folder_id;
use crate::repl::commands::{self, ReplCommand};
use crate::repl::completer::ReplHelper;
use crate::repl::renderer;
use crate::scanner::ScannerApi;

/// What the loop does after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue(String),
    Exit,
}

/// Interactive session over an authenticated scanner. Logging out is left to
/// whoever opened the session.
pub struct ReplSession<'a> {
    api: &'a dyn ScannerApi,
}

impl<'a> ReplSession<'a> {
    pub fn new(api: &'a dyn ScannerApi) -> Self {
        Self { api }
    }

    pub async fn run(self) -> Result<(), OpsError> {
        println!(
            "{} {}",
            style("Connected.").green().bold(),
            renderer::render_info("Type help for available commands.")
        );

        let config = Config::builder().auto_add_history(true).build();
        let mut editor = Editor::with_config(config)
            .map_err(|e| OpsError::Internal(format!("Failed to initialize REPL: {}", e)))?;
        editor.set_helper(Some(ReplHelper));

        loop {
            // rustyline is blocking, so use spawn_blocking
            let (returned, readline) = tokio::task::spawn_blocking(move || {
                let prompt = format!("{} ", style("nessus>").cyan().bold());
                let result = editor.readline(&prompt);
                (editor, result)
            })
            .await
            .map_err(|e| OpsError::Internal(format!("Readline task failed: {}", e)))?;
            editor = returned;

            match readline {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let command = match commands::parse_command(trimmed) {
                        Ok(command) => command,
                        Err(msg) => {
                            println!("{}", renderer::render_error(&msg));
                            continue;
                        }
                    };
                    match self.execute(command).await {
                        Ok(Flow::Continue(output)) => println!("{}", output),
                        Ok(Flow::Exit) => break,
                        Err(e) => println!("{}", renderer::render_error(&e.to_string())),
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    println!("{}", renderer::render_error(&format!("Input error: {}", err)));
                    break;
                }
            }
        }

        println!("{}", renderer::render_info("Goodbye."));
        Ok(())
    }

    /// Run one command and return what to print.
    pub async fn execute(&self, command: ReplCommand) -> Result<Flow, OpsError> {
        let output = match command {
            ReplCommand::Exit => return Ok(Flow::Exit),
            ReplCommand::Help { command } => renderer::render_help(command.as_deref()),
            ReplCommand::Version => renderer::render_version(),
            ReplCommand::Folders => renderer::render_folders(&self.api.list_folders().await?),
            ReplCommand::Policies => renderer::render_policies(&self.api.list_policies().await?),
            ReplCommand::Templates => renderer::render_templates(&self.api.list_templates().await?),
            ReplCommand::Scans { folder } => {
                let folder_id = match folder {
                    Some(name) => Some(find_folder_id(self.api, &name).await?),
                    None => None,
                };
                renderer::render_scans(&self.api.list_scans(folder_id).await?.scans)
            }
            ReplCommand::Raw { method, path, body } => {
                debug!(method = %method, path = %path, "Raw API request");
                renderer::render_json(&self.api.request(method, &path, body).await?)
            }
        };
        Ok(Flow::Continue(output))
    }
}
