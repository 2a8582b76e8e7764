use std::collections::HashMap;

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::resolver::{PolicyResolver, ResolvedPolicy};
use crate::config::ScanSpec;
use crate::errors::OpsError;
use crate::scanner::{ScanSummary, ScannerApi};

/// Folder names to ids, extended as folders are created.
#[derive(Debug, Clone, Default)]
pub struct FolderIndex {
    by_name: HashMap<String, u64>,
}

impl FolderIndex {
    pub async fn fetch(api: &dyn ScannerApi) -> Result<Self, OpsError> {
        let by_name = api
            .list_folders()
            .await?
            .into_iter()
            .map(|folder| (folder.name, folder.id))
            .collect();
        Ok(Self { by_name })
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.by_name.get(name).copied()
    }

    /// Id of `name`, creating the folder when the scanner has none by that name.
    pub async fn ensure(&mut self, api: &dyn ScannerApi, name: &str) -> Result<u64, OpsError> {
        if let Some(id) = self.get(name) {
            return Ok(id);
        }
        let id = api.create_folder(name).await?;
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }
}

/// Settings body for scan creation.
pub fn scan_settings(spec: &ScanSpec, resolved: &ResolvedPolicy, folder_id: u64) -> Value {
    let mut settings = json!({
        "name": spec.name,
        "enabled": spec.enabled,
        "text_targets": spec.text_targets(),
    });
    if let Some(policy_id) = resolved.policy_id() {
        settings["policy_id"] = json!(policy_id);
    }
    settings["folder_id"] = json!(folder_id);
    settings
}

/// Create one scan. The policy is resolved before the folder so an unknown
/// policy never leaves an empty folder behind.
pub async fn create_scan(
    api: &dyn ScannerApi,
    spec: &ScanSpec,
    resolver: &PolicyResolver,
    folders: &mut FolderIndex,
) -> Result<Value, OpsError> {
    let resolved = resolver.resolve(&spec.policy)?;
    let folder_id = folders.ensure(api, &spec.folder).await?;

    let settings = scan_settings(spec, &resolved, folder_id);
    let created = api.create_scan(resolved.scan_uuid(), settings).await?;
    info!(
        scan = %spec.name,
        policy = %spec.policy,
        kind = resolved.kind(),
        folder_id,
        "Scan created"
    );
    Ok(created)
}

/// Scans in `folder` (all scans when `None`), narrowed to `names` when any
/// are given. Unknown folder names are operator errors.
pub async fn select_scans(
    api: &dyn ScannerApi,
    folder: Option<&str>,
    names: &[String],
) -> Result<Vec<ScanSummary>, OpsError> {
    let folder_id = match folder {
        Some(name) => Some(find_folder_id(api, name).await?),
        None => None,
    };

    let scans = api.list_scans(folder_id).await?.scans;
    if names.is_empty() {
        return Ok(scans);
    }

    for name in names {
        if !scans.iter().any(|scan| &scan.name == name) {
            return Err(OpsError::Config(format!("No scan named '{}'", name)));
        }
    }
    Ok(scans.into_iter().filter(|scan| names.contains(&scan.name)).collect())
}

pub async fn find_folder_id(api: &dyn ScannerApi, name: &str) -> Result<u64, OpsError> {
    api.list_folders()
        .await?
        .into_iter()
        .find(|folder| folder.name == name)
        .map(|folder| folder.id)
        .ok_or_else(|| OpsError::Config(format!("No scan folder named '{}'", name)))
}

/// Launch each scan, continuing past failures. Returns the ids that started.
pub async fn launch_scans(api: &dyn ScannerApi, scans: &[ScanSummary]) -> (Vec<u64>, Vec<(String, OpsError)>) {
    let mut launched = Vec::new();
    let mut failed = Vec::new();

    for scan in scans {
        match api.launch_scan(scan.id).await {
            Ok(run_uuid) => {
                info!(scan = %scan.name, scan_id = scan.id, run = %run_uuid, "Scan launched");
                launched.push(scan.id);
            }
            Err(e) => {
                warn!(scan = %scan.name, scan_id = scan.id, error = %e, "Scan launch failed");
                failed.push((scan.name.clone(), e));
            }
        }
    }
    debug!(launched = launched.len(), failed = failed.len(), "Launch pass finished");
    (launched, failed)
}
