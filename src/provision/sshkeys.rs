use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::errors::OpsError;
use crate::scanner::ScannerApi;

/// A private key living on another machine, written `host:path` in config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteKey {
    pub host: String,
    pub path: String,
    pub username: String,
    /// One-time password for fetching the key. Never submitted to the scanner.
    pub password: Option<String>,
}

impl RemoteKey {
    /// `None` when `spec` names a local file.
    pub fn parse(spec: &str, username: &str, password: Option<String>) -> Option<Self> {
        let (host, path) = spec.split_once(':')?;
        if host.is_empty() || path.is_empty() || path.contains(':') || host.contains('/') {
            return None;
        }
        Some(Self {
            host: host.to_string(),
            path: path.to_string(),
            username: username.to_string(),
            password,
        })
    }

    fn scratch_name(&self) -> String {
        format!("{}_{}_id_rsa", self.host, self.username)
    }
}

/// Copies a remote private key to a local path.
#[async_trait]
pub trait KeyFetcher: Send + Sync {
    async fn fetch(&self, key: &RemoteKey, destination: &Path) -> Result<(), OpsError>;
}

/// Fetches keys with `scp`, feeding the one-time password through `sshpass`
/// when one is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScpKeyFetcher;

#[async_trait]
impl KeyFetcher for ScpKeyFetcher {
    async fn fetch(&self, key: &RemoteKey, destination: &Path) -> Result<(), OpsError> {
        let source = format!("{}@{}:{}", key.username, key.host, key.path);
        let scp_args = [
            "-q".to_string(),
            "-o".to_string(),
            "StrictHostKeyChecking=no".to_string(),
            source.clone(),
            destination.display().to_string(),
        ];

        let mut command = match &key.password {
            Some(password) => {
                let mut cmd = tokio::process::Command::new("sshpass");
                cmd.arg("-e").arg("scp").args(&scp_args).env("SSHPASS", password);
                cmd
            }
            None => {
                let mut cmd = tokio::process::Command::new("scp");
                cmd.args(&scp_args);
                cmd
            }
        };

        debug!(source = %source, "Fetching SSH private key");
        let output = command
            .output()
            .await
            .map_err(|e| OpsError::KeyStaging(format!("Could not run scp for {}: {}", source, e)))?;

        if !output.status.success() {
            return Err(OpsError::KeyStaging(format!(
                "Could not download SSH private key from {}: {}",
                source,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

/// Replace every public-key SSH entry's `private_key` path with a handle in
/// the scanner's file store. Remote keys pass through a private scratch
/// directory that is removed before returning, and their fetch password is
/// dropped from the entry. Returns the number of keys uploaded.
pub async fn stage_ssh_keys(
    api: &dyn ScannerApi,
    credentials: &mut Value,
    fetcher: &dyn KeyFetcher,
) -> Result<usize, OpsError> {
    let Some(entries) = credentials
        .get_mut("Host")
        .and_then(|host| host.get_mut("SSH"))
        .and_then(Value::as_array_mut)
    else {
        return Ok(0);
    };

    let mut staged = 0;
    for (index, entry) in entries.iter_mut().enumerate() {
        let Some(entry) = entry.as_object_mut() else { continue };
        if entry.get("auth_method").and_then(Value::as_str) != Some("public_key") {
            continue;
        }
        let Some(key_spec) = entry.get("private_key").and_then(Value::as_str).map(str::to_string) else {
            continue;
        };

        let (file_name, contents) = read_key(entry, &key_spec, fetcher).await?;
        let handle = api.upload_file(&file_name, contents).await?;
        info!(entry = index, "Uploaded SSH private key");
        entry.insert("private_key".to_string(), Value::String(handle));
        staged += 1;
    }
    Ok(staged)
}

async fn read_key(
    entry: &mut Map<String, Value>,
    key_spec: &str,
    fetcher: &dyn KeyFetcher,
) -> Result<(String, Vec<u8>), OpsError> {
    let username = entry.get("username").and_then(Value::as_str).unwrap_or_default().to_string();

    if RemoteKey::parse(key_spec, &username, None).is_none() {
        let path = PathBuf::from(key_spec);
        let contents = tokio::fs::read(&path)
            .await
            .map_err(|e| OpsError::KeyStaging(format!("Cannot read SSH private key {}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "id_rsa".to_string());
        return Ok((file_name, contents));
    }

    // The fetch password is only for scp; it must not reach the scanner.
    let password = entry.shift_remove("password").and_then(|v| v.as_str().map(str::to_string));
    let key = RemoteKey::parse(key_spec, &username, password)
        .ok_or_else(|| OpsError::Internal(format!("Remote key spec '{}' stopped parsing", key_spec)))?;

    let scratch = tempfile::tempdir()?;
    let destination = scratch.path().join(key.scratch_name());
    fetcher.fetch(&key, &destination).await?;

    let contents = tokio::fs::read(&destination)
        .await
        .map_err(|e| OpsError::KeyStaging(format!("Fetched key {} is unreadable: {}", destination.display(), e)))?;
    tokio::fs::remove_file(&destination).await?;
    debug!(host = %key.host, "Removed scratch copy of SSH key");

    Ok((key.scratch_name(), contents))
}

/// Body attaching `credentials` to a saved policy.
pub fn credentials_payload(credentials: Value) -> Value {
    json!({ "credentials": { "add": credentials } })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_remote_key() {
        let key = RemoteKey::parse("jump01:/home/svc/.ssh/id_rsa", "svc", Some("pw".into())).unwrap();
        assert_eq!(key.host, "jump01");
        assert_eq!(key.path, "/home/svc/.ssh/id_rsa");
        assert_eq!(key.scratch_name(), "jump01_svc_id_rsa");
    }

    #[test]
    fn test_local_paths_are_not_remote() {
        assert!(RemoteKey::parse("/keys/id_rsa", "svc", None).is_none());
        assert!(RemoteKey::parse("keys/id_rsa", "svc", None).is_none());
        assert!(RemoteKey::parse(":/keys/id_rsa", "svc", None).is_none());
        assert!(RemoteKey::parse("a:b:c", "svc", None).is_none());
        assert!(RemoteKey::parse("./dir/x:y", "svc", None).is_none());
    }

    #[test]
    fn test_credentials_payload_shape() {
        let payload = credentials_payload(json!({"Host": {"SSH": []}}));
        assert_eq!(payload, json!({"credentials": {"add": {"Host": {"SSH": []}}}}));
    }
}
