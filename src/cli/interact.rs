use crate::errors::OpsError;
use crate::repl::ReplSession;
use crate::scanner::ScannerApi;

pub async fn handle_interact(api: &dyn ScannerApi) -> Result<(), OpsError> {
    ReplSession::new(api).run().await
}
