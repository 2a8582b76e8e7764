use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::schema::validate_schema;
use super::types::{PolicySpec, ScanSpec, ServerConfig};
use crate::errors::OpsError;

const MAX_CONFIG_BYTES: u64 = 1_048_576;

/// The operator's configuration, kept as a JSON tree so keys this tool does
/// not model survive a rewrite. Typed views are produced on demand.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    path: PathBuf,
    root: Value,
}

impl ConfigDocument {
    pub async fn load(path: &Path) -> Result<Self, OpsError> {
        if !path.exists() {
            return Err(OpsError::Config(format!("Config file not found: {}", path.display())));
        }

        let metadata = tokio::fs::metadata(path).await?;
        if metadata.len() > MAX_CONFIG_BYTES {
            return Err(OpsError::Config("Config file exceeds 1MB limit".into()));
        }

        let content = tokio::fs::read_to_string(path).await?;
        let root: Value = serde_json::from_str(&content)
            .map_err(|e| OpsError::Config(format!("Invalid JSON in {}: {}", path.display(), e)))?;

        let document = Self::from_value(path, root)?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(document)
    }

    pub fn from_value(path: impl Into<PathBuf>, root: Value) -> Result<Self, OpsError> {
        if !root.is_object() {
            return Err(OpsError::Config("Config root must be a JSON object".into()));
        }
        validate_schema(&root);
        Ok(Self { path: path.into(), root })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn server(&self) -> Result<ServerConfig, OpsError> {
        let server = self
            .root
            .get("server")
            .ok_or_else(|| OpsError::Config("Config is missing the 'server' section".into()))?;
        view("server", server)
    }

    /// Policy specs in document order. A missing section means no policies.
    pub fn policies(&self) -> Result<Vec<PolicySpec>, OpsError> {
        self.list_section("policies")
    }

    /// Scan specs in document order. A missing section means no scans.
    pub fn scans(&self) -> Result<Vec<ScanSpec>, OpsError> {
        self.list_section("scans")
    }

    /// The raw server section, created empty when the document has none.
    pub fn server_mut(&mut self) -> Result<&mut Map<String, Value>, OpsError> {
        let root = self
            .root
            .as_object_mut()
            .ok_or_else(|| OpsError::Internal("Config root is not an object".into()))?;
        root.entry("server")
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .ok_or_else(|| OpsError::Config("'server' must be an object".into()))
    }

    /// Raw policy entries, for in-place edits that must keep unmodelled keys.
    pub fn policy_entries_mut(&mut self) -> Result<&mut Vec<Value>, OpsError> {
        self.root
            .get_mut("policies")
            .and_then(Value::as_array_mut)
            .ok_or_else(|| OpsError::Config("Config is missing the 'policies' list".into()))
    }

    pub async fn save(&self, path: &Path) -> Result<(), OpsError> {
        let text = to_ascii_pretty_json(&self.root)?;
        tokio::fs::write(path, text).await?;
        info!(path = %path.display(), "Configuration written");
        Ok(())
    }

    fn list_section<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, OpsError> {
        match self.root.get(key) {
            None | Some(Value::Null) => {
                debug!(section = key, "Section absent, treating as empty");
                Ok(Vec::new())
            }
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| view(&format!("{}[{}]", key, i), item))
                .collect(),
            Some(_) => Err(OpsError::Config(format!("'{}' must be a list", key))),
        }
    }
}

fn view<T: DeserializeOwned>(location: &str, value: &Value) -> Result<T, OpsError> {
    T::deserialize(value).map_err(|e| OpsError::Config(format!("Invalid '{}': {}", location, e)))
}

/// Pretty-print with a 4-space indent and escape everything outside ASCII,
/// so rewritten configs stay plain ASCII files.
pub fn to_ascii_pretty_json(value: &Value) -> Result<String, OpsError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    let text = String::from_utf8(buf).map_err(|e| OpsError::Internal(format!("Serializer produced invalid UTF-8: {}", e)))?;

    // Non-ASCII characters can only occur inside string literals here.
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii() {
            escaped.push(ch);
        } else {
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                escaped.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    Ok(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "server": {"host": "nessus.local", "port": 8834, "credentials": {"type": "password", "username": "*", "password": "*"}},
            "policies": [{"name": "Linux Audit", "file": "policies/linux.nessus", "credentials": {}}],
            "scans": [{"name": "Weekly", "policy": "Linux Audit", "folder": "Audits", "targets": ["10.0.0.1"], "enabled": true}]
        })
    }

    #[test]
    fn test_typed_views() {
        let doc = ConfigDocument::from_value("c.json", sample()).unwrap();
        assert_eq!(doc.server().unwrap().host, "nessus.local");
        assert_eq!(doc.policies().unwrap()[0].name, "Linux Audit");
        assert!(doc.scans().unwrap()[0].enabled);
    }

    #[test]
    fn test_missing_server_is_config_error() {
        let doc = ConfigDocument::from_value("c.json", json!({"policies": []})).unwrap();
        assert!(matches!(doc.server(), Err(OpsError::Config(_))));
    }

    #[test]
    fn test_missing_lists_are_empty() {
        let doc = ConfigDocument::from_value("c.json", json!({"server": {"host": "h"}})).unwrap();
        assert!(doc.policies().unwrap().is_empty());
        assert!(doc.scans().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_scan_entry_names_location() {
        let doc = ConfigDocument::from_value("c.json", json!({"scans": [{"name": "x"}]})).unwrap();
        let err = doc.scans().unwrap_err().to_string();
        assert!(err.contains("scans[0]"), "{}", err);
    }

    #[test]
    fn test_non_object_root_rejected() {
        assert!(ConfigDocument::from_value("c.json", json!([1, 2])).is_err());
    }

    #[test]
    fn test_ascii_output_escapes_unicode() {
        let text = to_ascii_pretty_json(&json!({"name": "Caf\u{e9} \u{1F512}"})).unwrap();
        assert!(text.is_ascii());
        assert!(text.contains("Caf\\u00e9 \\ud83d\\udd12"));
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back["name"], "Caf\u{e9} \u{1F512}");
    }

    #[test]
    fn test_four_space_indent_and_key_order() {
        let text = to_ascii_pretty_json(&json!({"zeta": 1, "alpha": {"b": 2}})).unwrap();
        assert_eq!(text, "{\n    \"zeta\": 1,\n    \"alpha\": {\n        \"b\": 2\n    }\n}");
    }
}
