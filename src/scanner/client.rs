use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::api::ScannerApi;
use super::types::{ExportRequest, Folder, FolderList, PolicyList, SavedPolicy, ScanList, Template, TemplateList};
use crate::config::{ApiTokens, ServerConfig};
use crate::errors::OpsError;

const REQUEST_TIMEOUT_SECS: u64 = 120;

/// How long to wait for the scanner to prepare an export.
#[derive(Debug, Clone)]
pub struct ExportPolling {
    pub interval: Duration,
    pub max_polls: u32,
}

impl Default for ExportPolling {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_polls: 300,
        }
    }
}

#[derive(Clone)]
enum Auth {
    Anonymous,
    Session(String),
    ApiKeys { access_key: String, secret_key: String },
}

/// Client for the Nessus REST API.
pub struct NessusClient {
    client: Client,
    base_url: String,
    auth: Auth,
    polling: ExportPolling,
}

impl NessusClient {
    pub fn new(server: &ServerConfig) -> Result<Self, OpsError> {
        Self::with_base_url(server.base_url(), server.verify_tls)
    }

    pub fn with_base_url(base_url: impl Into<String>, verify_tls: bool) -> Result<Self, OpsError> {
        if !verify_tls {
            debug!("TLS certificate validation disabled for scanner connection");
        }

        let client = Client::builder()
            .danger_accept_invalid_certs(!verify_tls)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("nessus-ops/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| OpsError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth: Auth::Anonymous,
            polling: ExportPolling::default(),
        })
    }

    pub fn with_export_polling(mut self, polling: ExportPolling) -> Self {
        self.polling = polling;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Open a session with username and password.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), OpsError> {
        let url = self.url("/session");
        let resp = self
            .client
            .post(&url)
            .json(&json!({"username": username, "password": password}))
            .send()
            .await
            .map_err(|e| OpsError::Network(format!("Failed to reach scanner at {}: {}", self.base_url, e)))?;

        let status = resp.status();
        if status == 401 || status == 403 {
            return Err(OpsError::Authentication(format!("Scanner rejected credentials for user '{}'", username)));
        }

        let body: Value = check_status(resp, &url)
            .await?
            .json()
            .await
            .map_err(|e| OpsError::Authentication(format!("Unexpected login response: {}", e)))?;

        let token = body["token"]
            .as_str()
            .ok_or_else(|| OpsError::Authentication("Login response carried no session token".into()))?;

        self.auth = Auth::Session(token.to_string());
        info!(user = %username, host = %self.base_url, "Authenticated to scanner");
        Ok(())
    }

    /// Authenticate every request with API keys instead of a session.
    pub fn use_api_keys(&mut self, tokens: &ApiTokens) {
        self.auth = Auth::ApiKeys {
            access_key: tokens.access_key.clone(),
            secret_key: tokens.secret_key.clone(),
        };
        info!(host = %self.base_url, "Using API keys for scanner access");
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Auth::Anonymous => builder,
            Auth::Session(token) => builder.header("X-Cookie", format!("token={}", token)),
            Auth::ApiKeys { access_key, secret_key } => {
                builder.header("X-ApiKeys", format!("accessKey={}; secretKey={}", access_key, secret_key))
            }
        }
    }

    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Response, OpsError> {
        let url = self.url(path);
        debug!(method = %method, path, "Scanner request");

        let mut builder = self.authorize(self.client.request(method, &url));
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| OpsError::Network(format!("Request to {} failed: {}", url, e)))?;
        check_status(resp, &url).await
    }

    async fn call<T: DeserializeOwned>(&self, method: Method, path: &str, body: Option<&Value>) -> Result<T, OpsError> {
        self.send(method, path, body)
            .await?
            .json::<T>()
            .await
            .map_err(|e| OpsError::Network(format!("Unexpected response from {}: {}", path, e)))
    }
}

/// Turn a non-2xx response into [`OpsError::Http`], preferring the scanner's
/// own `error` message over the raw body.
async fn check_status(resp: Response, url: &str) -> Result<Response, OpsError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|v| v["error"].as_str().map(str::to_string))
        .unwrap_or(text);

    Err(OpsError::Http {
        status: status.as_u16(),
        url: url.to_string(),
        message,
    })
}

/// Ids come back as numbers from most endpoints and as strings from a few.
fn id_field(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

#[async_trait]
impl ScannerApi for NessusClient {
    async fn list_folders(&self) -> Result<Vec<Folder>, OpsError> {
        let list: FolderList = self.call(Method::GET, "/folders", None).await?;
        Ok(list.folders)
    }

    async fn create_folder(&self, name: &str) -> Result<u64, OpsError> {
        let body: Value = self.call(Method::POST, "/folders", Some(&json!({"name": name}))).await?;
        let id = body["id"]
            .as_u64()
            .ok_or_else(|| OpsError::Network(format!("Folder '{}' created without an id", name)))?;
        info!(folder = %name, folder_id = id, "Created folder");
        Ok(id)
    }

    async fn list_policies(&self) -> Result<Vec<SavedPolicy>, OpsError> {
        let list: PolicyList = self.call(Method::GET, "/policies", None).await?;
        Ok(list.policies)
    }

    async fn list_templates(&self) -> Result<Vec<Template>, OpsError> {
        let list: TemplateList = self.call(Method::GET, "/editor/policy/templates", None).await?;
        Ok(list.templates)
    }

    async fn list_scans(&self, folder_id: Option<u64>) -> Result<ScanList, OpsError> {
        let path = match folder_id {
            Some(id) => format!("/scans?folder_id={}", id),
            None => "/scans".to_string(),
        };
        self.call(Method::GET, &path, None).await
    }

    async fn create_scan(&self, uuid: &str, settings: Value) -> Result<Value, OpsError> {
        let body = json!({"uuid": uuid, "settings": settings});
        let mut created: Value = self.call(Method::POST, "/scans", Some(&body)).await?;
        Ok(match created.get_mut("scan") {
            Some(scan) => scan.take(),
            None => created,
        })
    }

    async fn launch_scan(&self, scan_id: u64) -> Result<String, OpsError> {
        let body: Value = self.call(Method::POST, &format!("/scans/{}/launch", scan_id), None).await?;
        Ok(body["scan_uuid"].as_str().unwrap_or_default().to_string())
    }

    async fn upload_file(&self, name: &str, contents: Vec<u8>) -> Result<String, OpsError> {
        let url = self.url("/file/upload");
        debug!(file = %name, bytes = contents.len(), "Uploading file");

        let form = Form::new().part("Filedata", Part::bytes(contents).file_name(name.to_string()));
        let resp = self
            .authorize(self.client.post(&url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| OpsError::Network(format!("Upload of {} failed: {}", name, e)))?;

        let body: Value = check_status(resp, &url)
            .await?
            .json()
            .await
            .map_err(|e| OpsError::Network(format!("Unexpected upload response: {}", e)))?;

        body["fileuploaded"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| OpsError::Network(format!("Upload of {} returned no file handle", name)))
    }

    async fn import_policy(&self, file_handle: &str) -> Result<u64, OpsError> {
        let body: Value = self
            .call(Method::POST, "/policies/import", Some(&json!({"file": file_handle})))
            .await?;
        body["id"]
            .as_u64()
            .ok_or_else(|| OpsError::Network("Policy import returned no policy id".into()))
    }

    async fn policy_details(&self, policy_id: u64) -> Result<Value, OpsError> {
        self.call(Method::GET, &format!("/policies/{}", policy_id), None).await
    }

    async fn edit_policy(&self, policy_id: u64, body: &Value) -> Result<(), OpsError> {
        self.send(Method::PUT, &format!("/policies/{}", policy_id), Some(body)).await?;
        Ok(())
    }

    async fn add_policy_credentials(&self, policy_id: u64, policy_uuid: &str, payload: &Value) -> Result<(), OpsError> {
        let mut body = json!({"uuid": policy_uuid});
        if let (Some(target), Some(extra)) = (body.as_object_mut(), payload.as_object()) {
            for (key, value) in extra {
                target.insert(key.clone(), value.clone());
            }
        }
        self.send(Method::PUT, &format!("/policies/{}", policy_id), Some(&body)).await?;
        Ok(())
    }

    async fn export_scan(&self, scan_id: u64, request: &ExportRequest) -> Result<Vec<u8>, OpsError> {
        let body = serde_json::to_value(request)?;
        let started: Value = self
            .call(Method::POST, &format!("/scans/{}/export", scan_id), Some(&body))
            .await?;
        let file = id_field(&started["file"])
            .ok_or_else(|| OpsError::Export(format!("Scan {} export returned no file id", scan_id)))?;

        for poll in 0..self.polling.max_polls {
            let status: Value = self
                .call(Method::GET, &format!("/scans/{}/export/{}/status", scan_id, file), None)
                .await?;

            if status["status"].as_str() == Some("ready") {
                let resp = self
                    .send(Method::GET, &format!("/scans/{}/export/{}/download", scan_id, file), None)
                    .await?;
                let bytes = resp
                    .bytes()
                    .await
                    .map_err(|e| OpsError::Network(format!("Export download for scan {} failed: {}", scan_id, e)))?;
                debug!(scan_id, format = %request.format, polls = poll + 1, "Export downloaded");
                return Ok(bytes.to_vec());
            }

            tokio::time::sleep(self.polling.interval).await;
        }

        Err(OpsError::Export(format!(
            "Scan {} export in format '{}' was not ready after {} checks",
            scan_id, request.format, self.polling.max_polls
        )))
    }

    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, OpsError> {
        let resp = self.send(method, path, body.as_ref()).await?;
        let text = resp
            .text()
            .await
            .map_err(|e| OpsError::Network(format!("Failed to read response from {}: {}", path, e)))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }

    async fn logout(&self) -> Result<(), OpsError> {
        match self.auth {
            Auth::Session(_) => {
                self.send(Method::DELETE, "/session", None).await?;
                info!(host = %self.base_url, "Logged out of scanner");
            }
            Auth::ApiKeys { .. } => debug!("API key access has no session to close"),
            Auth::Anonymous => warn!("Logout requested without an authenticated session"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_paths() {
        let client = NessusClient::with_base_url("https://scanner:8834/", false).unwrap();
        assert_eq!(client.base_url(), "https://scanner:8834");
        assert_eq!(client.url("/scans"), "https://scanner:8834/scans");
        assert_eq!(client.url("folders"), "https://scanner:8834/folders");
    }

    #[test]
    fn test_id_field_accepts_numbers_and_strings() {
        assert_eq!(id_field(&json!(42)).as_deref(), Some("42"));
        assert_eq!(id_field(&json!("1337")).as_deref(), Some("1337"));
        assert_eq!(id_field(&json!(null)), None);
        assert_eq!(id_field(&json!("")), None);
    }
}
