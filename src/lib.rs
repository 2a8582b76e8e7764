pub mod cli;
pub mod config;
pub mod errors;
pub mod export;
pub mod logging;
pub mod prompt;
pub mod provision;
pub mod repl;
pub mod scanner;
