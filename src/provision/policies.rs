use serde_json::Value;
use tracing::{debug, info};

use super::sshkeys::{credentials_payload, stage_ssh_keys, KeyFetcher};
use crate::config::PolicySpec;
use crate::errors::OpsError;
use crate::scanner::ScannerApi;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedPolicy {
    pub id: u64,
    pub uuid: String,
    pub name: String,
}

/// Import a policy file and rename it to the spec's name. Credentials are
/// attached last, once the imported policy exists under its final name.
pub async fn import_policy(
    api: &dyn ScannerApi,
    spec: &PolicySpec,
    fetcher: &dyn KeyFetcher,
) -> Result<ImportedPolicy, OpsError> {
    let contents = tokio::fs::read(&spec.file)
        .await
        .map_err(|e| OpsError::Config(format!("Cannot read policy file {}: {}", spec.file.display(), e)))?;
    let file_name = spec
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "policy.nessus".to_string());

    let handle = api.upload_file(&file_name, contents).await?;
    let policy_id = api.import_policy(&handle).await?;
    debug!(policy = %spec.name, policy_id, "Policy file imported");

    let mut details = api.policy_details(policy_id).await?;
    rename_policy(&mut details, &spec.name)?;
    api.edit_policy(policy_id, &details).await?;

    let uuid = details
        .get("uuid")
        .and_then(Value::as_str)
        .ok_or_else(|| OpsError::Network(format!("Imported policy {} has no uuid", policy_id)))?
        .to_string();

    if has_credentials(&spec.credentials) {
        let mut credentials = spec.credentials.clone();
        let keys = stage_ssh_keys(api, &mut credentials, fetcher).await?;
        api.add_policy_credentials(policy_id, &uuid, &credentials_payload(credentials))
            .await?;
        debug!(policy = %spec.name, staged_keys = keys, "Credentials attached");
    }

    info!(policy = %spec.name, policy_id, "Policy imported");
    Ok(ImportedPolicy { id: policy_id, uuid, name: spec.name.clone() })
}

fn rename_policy(details: &mut Value, name: &str) -> Result<(), OpsError> {
    let root = details
        .as_object_mut()
        .ok_or_else(|| OpsError::Network("Policy details are not an object".into()))?;
    let settings = root
        .entry("settings")
        .or_insert_with(|| Value::Object(Default::default()));
    let settings = settings
        .as_object_mut()
        .ok_or_else(|| OpsError::Network("Policy settings are not an object".into()))?;
    settings.insert("name".to_string(), Value::String(name.to_string()));
    Ok(())
}

fn has_credentials(credentials: &Value) -> bool {
    match credentials {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}
