use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use super::types::{ExportRequest, Folder, SavedPolicy, ScanList, Template};
use crate::errors::OpsError;

/// Operations the tool needs from a scanner's management API.
#[async_trait]
pub trait ScannerApi: Send + Sync {
    async fn list_folders(&self) -> Result<Vec<Folder>, OpsError>;

    /// Create a folder and return its id.
    async fn create_folder(&self, name: &str) -> Result<u64, OpsError>;

    /// Saved (operator-defined) policies.
    async fn list_policies(&self) -> Result<Vec<SavedPolicy>, OpsError>;

    /// Built-in policy templates.
    async fn list_templates(&self) -> Result<Vec<Template>, OpsError>;

    async fn list_scans(&self, folder_id: Option<u64>) -> Result<ScanList, OpsError>;

    /// Create a scan from a template/policy uuid. Returns the created scan.
    async fn create_scan(&self, uuid: &str, settings: Value) -> Result<Value, OpsError>;

    /// Start a scan. Returns the run uuid.
    async fn launch_scan(&self, scan_id: u64) -> Result<String, OpsError>;

    /// Upload a file to the scanner's file store. Returns the stored handle.
    async fn upload_file(&self, name: &str, contents: Vec<u8>) -> Result<String, OpsError>;

    /// Import an uploaded policy file. Returns the new policy id.
    async fn import_policy(&self, file_handle: &str) -> Result<u64, OpsError>;

    async fn policy_details(&self, policy_id: u64) -> Result<Value, OpsError>;

    async fn edit_policy(&self, policy_id: u64, body: &Value) -> Result<(), OpsError>;

    /// Attach a `{"credentials": {"add": ...}}` payload to a saved policy.
    async fn add_policy_credentials(&self, policy_id: u64, policy_uuid: &str, payload: &Value) -> Result<(), OpsError>;

    /// Export a scan and return the file contents.
    async fn export_scan(&self, scan_id: u64, request: &ExportRequest) -> Result<Vec<u8>, OpsError>;

    /// Raw authenticated call, for manual exploration.
    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, OpsError>;

    async fn logout(&self) -> Result<(), OpsError>;
}
