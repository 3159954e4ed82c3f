use std::collections::{BTreeMap, BTreeSet};

use repairhub_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::JobRole;

/// Actions granted on one resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGrant {
    /// Granted action ids.
    #[serde(default)]
    pub actions: BTreeSet<String>,
}

/// Resources granted to one job role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRoleGrants {
    /// Grants keyed by resource id.
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceGrant>,
}

/// Job-role keyed resource/action matrix, stored as one serialized record.
///
/// Serialized shape: `{"tecnico": {"resources": {"patio": {"actions": ["read"]}}}}`.
/// Job role keys are kept as strings so that roles introduced by newer admin
/// tooling do not make the whole record unreadable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GranularPermissionConfig {
    job_roles: BTreeMap<String, JobRoleGrants>,
}

impl GranularPermissionConfig {
    /// Creates an empty matrix.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants actions on a resource to a job role.
    #[must_use]
    pub fn with_grant<I, S>(
        mut self,
        job_role: JobRole,
        resource: impl Into<String>,
        actions: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.job_roles
            .entry(job_role.as_str().to_owned())
            .or_default()
            .resources
            .entry(resource.into())
            .or_default()
            .actions
            .extend(actions.into_iter().map(Into::into));
        self
    }

    /// Parses the stored JSON record.
    pub fn from_json(value: Value) -> AppResult<Self> {
        serde_json::from_value(value).map_err(|error| {
            AppError::Validation(format!("invalid granular permission config: {error}"))
        })
    }

    /// Returns whether the job role is granted the action on the resource.
    #[must_use]
    pub fn allows(&self, job_role: JobRole, resource: &str, action: &str) -> bool {
        self.job_roles
            .get(job_role.as_str())
            .and_then(|grants| grants.resources.get(resource))
            .is_some_and(|grant| grant.actions.contains(action))
    }

    /// Returns whether no job role has any grant.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.job_roles.is_empty()
    }
}
