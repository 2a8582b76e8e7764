pub mod types;
pub mod classification;
pub mod retry;

pub use types::OpsError;
pub use classification::ErrorClassification;
pub use retry::{RetryPolicy, retry_until};
