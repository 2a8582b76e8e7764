use tracing::debug;

use crate::errors::OpsError;
use crate::scanner::{SavedPolicy, ScannerApi, Template};

/// What a scan's policy name refers to on the scanner.
///
/// The variant decides which identifiers scan creation uses: templates are
/// referenced by their `uuid`, saved policies by `template_uuid` plus `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedPolicy {
    Policy(SavedPolicy),
    Template(Template),
}

impl ResolvedPolicy {
    pub fn kind(&self) -> &'static str {
        match self {
            ResolvedPolicy::Policy(_) => "policy",
            ResolvedPolicy::Template(_) => "template",
        }
    }

    /// Uuid submitted with scan creation.
    pub fn scan_uuid(&self) -> &str {
        match self {
            ResolvedPolicy::Policy(policy) => &policy.template_uuid,
            ResolvedPolicy::Template(template) => &template.uuid,
        }
    }

    /// Saved-policy id, absent for templates.
    pub fn policy_id(&self) -> Option<u64> {
        match self {
            ResolvedPolicy::Policy(policy) => Some(policy.id),
            ResolvedPolicy::Template(_) => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ResolvedPolicy::Policy(policy) => &policy.name,
            ResolvedPolicy::Template(template) => &template.name,
        }
    }
}

/// Saved policies match on exact name and always win. Otherwise the first
/// template whose name or title contains `name` is used.
pub fn resolve_policy(name: &str, policies: &[SavedPolicy], templates: &[Template]) -> Result<ResolvedPolicy, OpsError> {
    if name.is_empty() {
        return Err(OpsError::Resolution("empty policy name".into()));
    }

    if let Some(policy) = policies.iter().find(|p| p.name == name) {
        debug!(policy = %name, policy_id = policy.id, "Resolved to saved policy");
        return Ok(ResolvedPolicy::Policy(policy.clone()));
    }

    if let Some(template) = templates.iter().find(|t| t.name.contains(name) || t.title.contains(name)) {
        debug!(policy = %name, template = %template.name, "Resolved to built-in template");
        return Ok(ResolvedPolicy::Template(template.clone()));
    }

    Err(OpsError::Resolution(format!("no policy or template matches name '{}'", name)))
}

/// Policy and template listings fetched once and reused across a batch of
/// scans.
#[derive(Debug, Clone, Default)]
pub struct PolicyResolver {
    policies: Vec<SavedPolicy>,
    templates: Vec<Template>,
}

impl PolicyResolver {
    pub fn new(policies: Vec<SavedPolicy>, templates: Vec<Template>) -> Self {
        Self { policies, templates }
    }

    pub async fn fetch(api: &dyn ScannerApi) -> Result<Self, OpsError> {
        let policies = api.list_policies().await?;
        let templates = api.list_templates().await?;
        debug!(policies = policies.len(), templates = templates.len(), "Fetched policy listings");
        Ok(Self { policies, templates })
    }

    pub fn resolve(&self, name: &str) -> Result<ResolvedPolicy, OpsError> {
        resolve_policy(name, &self.policies, &self.templates)
    }
}
