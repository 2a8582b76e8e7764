use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::credentials::resolve_credential;

/// Port the scanner's management API listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 8834;

/// Value marking a secret that must be supplied interactively.
pub const PLACEHOLDER: &str = "*";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    #[serde(default = "default_port", deserialize_with = "deserialize_port")]
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<LoginCredentials>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<ApiTokens>,
    /// Scanners ship with self-signed certificates, so validation is opt-in.
    #[serde(default)]
    pub verify_tls: bool,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            credentials: None,
            tokens: None,
            verify_tls: false,
        }
    }

    pub fn base_url(&self) -> String {
        format!("https://{}:{}", self.host, self.port)
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Ports show up both as numbers and as strings in hand-edited configs.
fn deserialize_port<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PortValue {
        Number(u16),
        Text(String),
    }

    match PortValue::deserialize(deserializer)? {
        PortValue::Number(port) => Ok(port),
        PortValue::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid port '{}'", text))),
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LoginCredentials {
    #[serde(rename = "type", default = "default_credential_type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

fn default_credential_type() -> String {
    "password".to_string()
}

impl LoginCredentials {
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            kind: default_credential_type(),
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    /// Configured username, or `None` when it must be prompted for.
    pub fn known_username(&self) -> Option<String> {
        known_value(self.username.as_deref())
    }

    /// Configured password (after `$VAR` expansion), or `None` when it must
    /// be prompted for.
    pub fn known_password(&self) -> Option<String> {
        known_value(self.password.as_deref())
    }
}

fn known_value(value: Option<&str>) -> Option<String> {
    match value {
        None | Some(PLACEHOLDER) | Some("") => None,
        Some(v) => Some(resolve_credential(v)),
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ApiTokens {
    pub access_key: String,
    pub secret_key: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PolicySpec {
    pub name: String,
    pub file: PathBuf,
    #[serde(default)]
    pub credentials: Value,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanSpec {
    pub name: String,
    pub policy: String,
    pub folder: String,
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(default)]
    pub enabled: bool,
}

impl ScanSpec {
    /// Target list in the comma-separated form the scan API expects.
    pub fn text_targets(&self) -> String {
        self.targets.join(", ")
    }
}
