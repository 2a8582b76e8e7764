use serde_json::{json, Value};
use std::sync::LazyLock;
use tracing::warn;

pub static CONFIG_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "properties": {
            "server": {
                "type": "object",
                "required": ["host"],
                "properties": {
                    "host": { "type": "string" },
                    "port": { "type": ["integer", "string"] },
                    "verify_tls": { "type": "boolean" },
                    "credentials": {
                        "type": "object",
                        "properties": {
                            "type": { "type": "string" },
                            "username": { "type": "string" },
                            "password": { "type": "string" }
                        }
                    },
                    "tokens": {
                        "type": "object",
                        "required": ["access_key", "secret_key"],
                        "properties": {
                            "access_key": { "type": "string" },
                            "secret_key": { "type": "string" }
                        }
                    }
                }
            },
            "policies": {
                "type": "array",
                "items": { "$ref": "#/$defs/policy" }
            },
            "scans": {
                "type": "array",
                "items": { "$ref": "#/$defs/scan" }
            }
        },
        "$defs": {
            "policy": {
                "type": "object",
                "required": ["name", "file"],
                "properties": {
                    "name": { "type": "string" },
                    "file": { "type": "string" },
                    "credentials": { "type": "object" }
                }
            },
            "scan": {
                "type": "object",
                "required": ["name", "policy", "folder", "targets"],
                "properties": {
                    "name": { "type": "string" },
                    "policy": { "type": "string" },
                    "folder": { "type": "string" },
                    "targets": { "type": "array", "items": { "type": "string" } },
                    "enabled": { "type": "boolean" }
                }
            }
        }
    })
});

/// Check the document against [`CONFIG_SCHEMA`]. Violations are advisory:
/// they are logged and returned, and consumers still decide what is fatal.
pub fn validate_schema(document: &Value) -> Vec<String> {
    let compiled = match jsonschema::JSONSchema::compile(&CONFIG_SCHEMA) {
        Ok(compiled) => compiled,
        Err(e) => {
            warn!(error = %e, "Schema compilation error");
            return Vec::new();
        }
    };

    let mut messages = Vec::new();
    if let Err(errors) = compiled.validate(document) {
        for e in errors {
            messages.push(format!("{} at {}", e, e.instance_path));
        }
    }
    for msg in &messages {
        warn!(validation_error = %msg, "Config schema warning");
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_document_has_no_warnings() {
        let doc = json!({
            "server": {"host": "scanner", "port": "8834"},
            "policies": [{"name": "p", "file": "p.nessus", "credentials": {}}],
            "scans": [{"name": "s", "policy": "p", "folder": "f", "targets": ["10.0.0.1"]}]
        });
        assert!(validate_schema(&doc).is_empty());
    }

    #[test]
    fn test_missing_required_fields_reported() {
        let doc = json!({"scans": [{"name": "s"}]});
        let warnings = validate_schema(&doc);
        assert!(!warnings.is_empty());
        assert!(warnings.iter().any(|w| w.contains("/scans/0")));
    }
}
