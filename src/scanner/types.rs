use serde::{Deserialize, Deserializer, Serialize};

/// The scanner reports empty collections as `null`.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Folder {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct SavedPolicy {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub template_uuid: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Template {
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ScanSummary {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub folder_id: Option<u64>,
}

impl ScanSummary {
    /// Only finished or imported scans have results worth exporting.
    pub fn is_exportable(&self) -> bool {
        matches!(self.status.as_str(), "completed" | "imported")
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScanList {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub scans: Vec<ScanSummary>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub folders: Vec<Folder>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FolderList {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub folders: Vec<Folder>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PolicyList {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub policies: Vec<SavedPolicy>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TemplateList {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub templates: Vec<Template>,
}

/// Body of an export request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRequest {
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapters: Option<String>,
}

impl ExportRequest {
    pub fn new(format: impl Into<String>) -> Self {
        Self { format: format.into(), template_id: None, chapters: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_scan_list() {
        let list: ScanList = serde_json::from_value(json!({"scans": null, "folders": [{"id": 3, "name": "My Scans", "type": "main"}]})).unwrap();
        assert!(list.scans.is_empty());
        assert_eq!(list.folders[0].kind.as_deref(), Some("main"));
    }

    #[test]
    fn test_exportable_statuses() {
        let mut scan = ScanSummary { id: 1, name: "s".into(), status: "completed".into(), folder_id: None };
        assert!(scan.is_exportable());
        scan.status = "imported".into();
        assert!(scan.is_exportable());
        scan.status = "running".into();
        assert!(!scan.is_exportable());
        scan.status = "complete".into();
        assert!(!scan.is_exportable());
    }

    #[test]
    fn test_export_request_omits_unset_fields() {
        let body = serde_json::to_value(ExportRequest::new("nessus")).unwrap();
        assert_eq!(body, json!({"format": "nessus"}));
    }
}
