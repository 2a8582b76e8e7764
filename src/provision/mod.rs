//! Pushes a configuration's policies and scans to the scanner.
//!
//! Nothing here is transactional: items are processed in document order and
//! a failure is recorded against its item before moving on to the next.

pub mod policies;
pub mod resolver;
pub mod scans;
pub mod sshkeys;

pub use policies::{import_policy, ImportedPolicy};
pub use resolver::{resolve_policy, PolicyResolver, ResolvedPolicy};
pub use scans::{create_scan, find_folder_id, launch_scans, select_scans, FolderIndex};
pub use sshkeys::{KeyFetcher, RemoteKey, ScpKeyFetcher};

use std::fmt;

use serde_json::Value;
use tracing::{error, info};

use crate::config::ConfigDocument;
use crate::errors::OpsError;
use crate::scanner::ScannerApi;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Policy,
    Scan,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Policy => write!(f, "policy"),
            ItemKind::Scan => write!(f, "scan"),
        }
    }
}

#[derive(Debug)]
pub struct ItemOutcome {
    pub kind: ItemKind,
    pub name: String,
    /// Scanner id of the created object.
    pub id: Option<u64>,
    pub error: Option<OpsError>,
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Default)]
pub struct ProvisionReport {
    pub outcomes: Vec<ItemOutcome>,
}

impl ProvisionReport {
    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    /// Ids of scans created by this run, in creation order.
    pub fn created_scan_ids(&self) -> Vec<u64> {
        self.outcomes
            .iter()
            .filter(|o| o.kind == ItemKind::Scan && o.is_success())
            .filter_map(|o| o.id)
            .collect()
    }

    fn record(&mut self, kind: ItemKind, name: &str, result: Result<Option<u64>, OpsError>) {
        let outcome = match result {
            Ok(id) => ItemOutcome { kind, name: name.to_string(), id, error: None },
            Err(e) => {
                error!(kind = %kind, name = %name, error = %e, "Provisioning item failed");
                ItemOutcome { kind, name: name.to_string(), id: None, error: Some(e) }
            }
        };
        self.outcomes.push(outcome);
    }
}

/// Import every policy, then create every scan.
///
/// Malformed specs and failures to list scanner state abort the run; errors
/// tied to a single policy or scan are recorded in the report.
pub async fn provision(
    api: &dyn ScannerApi,
    config: &ConfigDocument,
    fetcher: &dyn KeyFetcher,
) -> Result<ProvisionReport, OpsError> {
    let policies = config.policies()?;
    let scans = config.scans()?;
    let mut report = ProvisionReport::default();

    for spec in &policies {
        let result = import_policy(api, spec, fetcher).await.map(|p| Some(p.id));
        report.record(ItemKind::Policy, &spec.name, result);
    }

    if !scans.is_empty() {
        // Listed after the imports so freshly imported policies resolve.
        let resolver = PolicyResolver::fetch(api).await?;
        let mut folders = FolderIndex::fetch(api).await?;

        for spec in &scans {
            let result = create_scan(api, spec, &resolver, &mut folders)
                .await
                .map(|created| created.get("id").and_then(Value::as_u64));
            report.record(ItemKind::Scan, &spec.name, result);
        }
    }

    info!(
        items = report.outcomes.len(),
        failed = report.failures().count(),
        "Provisioning finished"
    );
    Ok(report)
}
