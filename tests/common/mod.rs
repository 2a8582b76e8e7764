#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use nessus_ops::errors::OpsError;
use nessus_ops::scanner::{ExportRequest, Folder, SavedPolicy, ScanList, ScanSummary, ScannerApi, Template};
use reqwest::Method;
use serde_json::{json, Value};

/// In-memory scanner that records every call made through [`ScannerApi`].
#[derive(Default)]
pub struct FakeScanner {
    state: Mutex<FakeState>,
}

#[derive(Default)]
pub struct FakeState {
    pub next_id: u64,
    pub folders: Vec<Folder>,
    pub policies: Vec<SavedPolicy>,
    pub policy_details: HashMap<u64, Value>,
    pub templates: Vec<Template>,
    pub scans: Vec<ScanSummary>,

    pub uploads: Vec<(String, Vec<u8>)>,
    pub created_folders: Vec<String>,
    pub created_scans: Vec<(String, Value)>,
    pub policy_edits: Vec<(u64, Value)>,
    pub credential_payloads: Vec<(u64, String, Value)>,
    pub exports: Vec<(u64, ExportRequest)>,
    pub launched: Vec<u64>,
    pub raw_requests: Vec<(Method, String, Option<Value>)>,
    pub logged_out: bool,

    pub fail_launch: HashSet<u64>,
    pub fail_export: HashSet<u64>,
    pub fail_logout: bool,
}

impl FakeState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        100 + self.next_id
    }
}

fn not_found(what: &str) -> OpsError {
    OpsError::Http {
        status: 404,
        url: format!("fake://{}", what),
        message: "The requested file was not found".into(),
    }
}

impl FakeScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_folder(self, id: u64, name: &str) -> Self {
        self.state().folders.push(Folder { id, name: name.into(), kind: Some("custom".into()) });
        self
    }

    pub fn with_template(self, uuid: &str, name: &str, title: &str) -> Self {
        self.state().templates.push(Template { uuid: uuid.into(), name: name.into(), title: title.into() });
        self
    }

    pub fn with_policy(self, id: u64, name: &str, template_uuid: &str) -> Self {
        self.state().policies.push(SavedPolicy { id, name: name.into(), template_uuid: template_uuid.into() });
        self
    }

    pub fn with_scan(self, id: u64, name: &str, status: &str, folder_id: u64) -> Self {
        self.state().scans.push(ScanSummary {
            id,
            name: name.into(),
            status: status.into(),
            folder_id: Some(folder_id),
        });
        self
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }
}

#[async_trait]
impl ScannerApi for FakeScanner {
    async fn list_folders(&self) -> Result<Vec<Folder>, OpsError> {
        Ok(self.state().folders.clone())
    }

    async fn create_folder(&self, name: &str) -> Result<u64, OpsError> {
        let mut state = self.state();
        let id = state.next_id();
        state.folders.push(Folder { id, name: name.into(), kind: Some("custom".into()) });
        state.created_folders.push(name.into());
        Ok(id)
    }

    async fn list_policies(&self) -> Result<Vec<SavedPolicy>, OpsError> {
        Ok(self.state().policies.clone())
    }

    async fn list_templates(&self) -> Result<Vec<Template>, OpsError> {
        Ok(self.state().templates.clone())
    }

    async fn list_scans(&self, folder_id: Option<u64>) -> Result<ScanList, OpsError> {
        let state = self.state();
        let scans = state
            .scans
            .iter()
            .filter(|scan| folder_id.is_none() || scan.folder_id == folder_id)
            .cloned()
            .collect();
        Ok(ScanList { scans, folders: state.folders.clone() })
    }

    async fn create_scan(&self, uuid: &str, settings: Value) -> Result<Value, OpsError> {
        let mut state = self.state();
        let id = state.next_id();
        let name = settings["name"].as_str().unwrap_or_default().to_string();
        state.scans.push(ScanSummary {
            id,
            name: name.clone(),
            status: "empty".into(),
            folder_id: settings["folder_id"].as_u64(),
        });
        state.created_scans.push((uuid.into(), settings));
        Ok(json!({"id": id, "name": name, "uuid": format!("template-{}", uuid)}))
    }

    async fn launch_scan(&self, scan_id: u64) -> Result<String, OpsError> {
        let mut state = self.state();
        if state.fail_launch.contains(&scan_id) {
            return Err(OpsError::Http {
                status: 409,
                url: format!("fake:///scans/{}/launch", scan_id),
                message: "Scan is already running".into(),
            });
        }
        state.launched.push(scan_id);
        Ok(format!("run-{}", scan_id))
    }

    async fn upload_file(&self, name: &str, contents: Vec<u8>) -> Result<String, OpsError> {
        self.state().uploads.push((name.into(), contents));
        Ok(format!("stored-{}", name))
    }

    async fn import_policy(&self, file_handle: &str) -> Result<u64, OpsError> {
        let mut state = self.state();
        let id = state.next_id();
        let name = format!("Imported from {}", file_handle);
        state.policies.push(SavedPolicy { id, name: name.clone(), template_uuid: "tmpl-advanced".into() });
        state.policy_details.insert(
            id,
            json!({"uuid": "tmpl-advanced", "settings": {"name": name, "description": "imported"}}),
        );
        Ok(id)
    }

    async fn policy_details(&self, policy_id: u64) -> Result<Value, OpsError> {
        self.state()
            .policy_details
            .get(&policy_id)
            .cloned()
            .ok_or_else(|| not_found(&format!("policies/{}", policy_id)))
    }

    async fn edit_policy(&self, policy_id: u64, body: &Value) -> Result<(), OpsError> {
        let mut state = self.state();
        if let Some(name) = body["settings"]["name"].as_str() {
            let name = name.to_string();
            if let Some(policy) = state.policies.iter_mut().find(|p| p.id == policy_id) {
                policy.name = name;
            }
        }
        state.policy_details.insert(policy_id, body.clone());
        state.policy_edits.push((policy_id, body.clone()));
        Ok(())
    }

    async fn add_policy_credentials(&self, policy_id: u64, policy_uuid: &str, payload: &Value) -> Result<(), OpsError> {
        self.state()
            .credential_payloads
            .push((policy_id, policy_uuid.into(), payload.clone()));
        Ok(())
    }

    async fn export_scan(&self, scan_id: u64, request: &ExportRequest) -> Result<Vec<u8>, OpsError> {
        let mut state = self.state();
        if state.fail_export.contains(&scan_id) {
            return Err(OpsError::Export(format!("Scan {} export failed", scan_id)));
        }
        state.exports.push((scan_id, request.clone()));
        Ok(format!("scan {} as {}", scan_id, request.format).into_bytes())
    }

    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, OpsError> {
        self.state().raw_requests.push((method.clone(), path.into(), body));
        Ok(json!({"method": method.as_str(), "path": path}))
    }

    async fn logout(&self) -> Result<(), OpsError> {
        let mut state = self.state();
        if state.fail_logout {
            return Err(OpsError::Network("fake scanner unreachable".into()));
        }
        state.logged_out = true;
        Ok(())
    }
}
