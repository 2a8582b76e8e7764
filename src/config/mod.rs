pub mod credentials;
pub mod parser;
pub mod redactor;
pub mod schema;
pub mod types;

pub use types::*;
pub use parser::{to_ascii_pretty_json, ConfigDocument};
pub use redactor::replace_passwords;
