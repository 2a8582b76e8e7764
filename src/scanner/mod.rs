pub mod api;
pub mod client;
pub mod session;
pub mod types;

pub use api::ScannerApi;
pub use client::{ExportPolling, NessusClient};
pub use session::connect;
pub use types::*;
