//! Access profiles and module tiers.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use repairhub_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::{CustomRoleId, JobRole, PermissionKey, ProfileId, is_read_action};

/// Audience a profile is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileType {
    /// Workshop staff.
    #[default]
    Internal,
    /// Partners and customers given limited access.
    External,
}

impl ProfileType {
    /// Returns a stable storage value for this profile type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::External => "external",
        }
    }
}

impl FromStr for ProfileType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "internal" => Ok(Self::Internal),
            "external" => Ok(Self::External),
            _ => Err(AppError::Validation(format!(
                "unknown profile type value '{value}'"
            ))),
        }
    }
}

/// How the admin tooling intends the profile to be edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfilePermissionType {
    /// Edited through coarse keys and custom roles.
    #[default]
    RoleBased,
    /// Edited through the job-role matrix.
    JobRoleBased,
}

impl ProfilePermissionType {
    /// Returns a stable storage value for this permission type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoleBased => "role_based",
            Self::JobRoleBased => "job_role_based",
        }
    }
}

impl FromStr for ProfilePermissionType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "role_based" => Ok(Self::RoleBased),
            "job_role_based" => Ok(Self::JobRoleBased),
            _ => Err(AppError::Validation(format!(
                "unknown profile permission type value '{value}'"
            ))),
        }
    }
}

/// Ordered per-module capability: `Blocked < View < Total`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ModuleTier {
    /// Nothing is permitted.
    #[default]
    Blocked,
    /// Read-only actions are permitted.
    View,
    /// Every action is permitted.
    Total,
}

impl ModuleTier {
    /// Returns a stable storage value for this tier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blocked => "blocked",
            Self::View => "view",
            Self::Total => "total",
        }
    }

    /// Returns whether this tier permits the granular action.
    #[must_use]
    pub fn permits(&self, action: &str) -> bool {
        match self {
            Self::Total => true,
            Self::View => is_read_action(action),
            Self::Blocked => false,
        }
    }
}

impl FromStr for ModuleTier {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "blocked" => Ok(Self::Blocked),
            "view" => Ok(Self::View),
            "total" => Ok(Self::Total),
            _ => Err(AppError::Validation(format!(
                "unknown module tier value '{value}'"
            ))),
        }
    }
}

/// One append-only audit line recorded by admin tooling on a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileAuditEntry {
    /// When the change happened.
    pub recorded_at: DateTime<Utc>,
    /// Who made the change.
    pub actor: String,
    /// Stable action name, e.g. `module_tier.changed`.
    pub action: String,
    /// Free-form detail.
    pub detail: Option<String>,
}

/// Profile exactly as read from storage, before structural validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileRecord {
    /// Record id. Records without one are structurally invalid.
    pub id: Option<String>,
    /// Display name.
    pub name: String,
    /// Intended audience.
    pub profile_type: ProfileType,
    /// Editing mode.
    pub permission_type: ProfilePermissionType,
    /// Legacy flat permission keys.
    pub coarse_permissions: BTreeSet<PermissionKey>,
    /// Tier per module id.
    pub module_tiers: BTreeMap<String, ModuleTier>,
    /// Referenced custom roles.
    pub custom_role_refs: Vec<CustomRoleId>,
    /// Job roles consulted in the granular matrix.
    pub job_roles: BTreeSet<JobRole>,
    /// Append-only change history.
    pub audit_log: Vec<ProfileAuditEntry>,
}

/// Structurally valid access profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    id: ProfileId,
    name: String,
    profile_type: ProfileType,
    permission_type: ProfilePermissionType,
    coarse_permissions: BTreeSet<PermissionKey>,
    module_tiers: BTreeMap<String, ModuleTier>,
    custom_role_refs: Vec<CustomRoleId>,
    job_roles: BTreeSet<JobRole>,
    audit_log: Vec<ProfileAuditEntry>,
}

impl Profile {
    /// Creates an empty internal, role-based profile.
    #[must_use]
    pub fn new(id: ProfileId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            profile_type: ProfileType::default(),
            permission_type: ProfilePermissionType::default(),
            coarse_permissions: BTreeSet::new(),
            module_tiers: BTreeMap::new(),
            custom_role_refs: Vec::new(),
            job_roles: BTreeSet::new(),
            audit_log: Vec::new(),
        }
    }

    /// Sets the intended audience.
    #[must_use]
    pub fn with_profile_type(mut self, profile_type: ProfileType) -> Self {
        self.profile_type = profile_type;
        self
    }

    /// Sets the editing mode.
    #[must_use]
    pub fn with_permission_type(mut self, permission_type: ProfilePermissionType) -> Self {
        self.permission_type = permission_type;
        self
    }

    /// Adds a legacy coarse permission key.
    #[must_use]
    pub fn with_coarse_permission(mut self, key: PermissionKey) -> Self {
        self.coarse_permissions.insert(key);
        self
    }

    /// Sets the tier of one module.
    #[must_use]
    pub fn with_module_tier(mut self, module_id: impl Into<String>, tier: ModuleTier) -> Self {
        self.module_tiers.insert(module_id.into(), tier);
        self
    }

    /// Appends a custom role reference.
    #[must_use]
    pub fn with_custom_role(mut self, role_id: CustomRoleId) -> Self {
        self.custom_role_refs.push(role_id);
        self
    }

    /// Adds a job role.
    #[must_use]
    pub fn with_job_role(mut self, job_role: JobRole) -> Self {
        self.job_roles.insert(job_role);
        self
    }

    /// Appends an audit entry.
    #[must_use]
    pub fn with_audit_entry(mut self, entry: ProfileAuditEntry) -> Self {
        self.audit_log.push(entry);
        self
    }

    /// Returns the profile id.
    #[must_use]
    pub fn id(&self) -> &ProfileId {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the intended audience.
    #[must_use]
    pub fn profile_type(&self) -> ProfileType {
        self.profile_type
    }

    /// Returns the editing mode.
    #[must_use]
    pub fn permission_type(&self) -> ProfilePermissionType {
        self.permission_type
    }

    /// Returns the legacy flat permission keys.
    #[must_use]
    pub fn coarse_permissions(&self) -> &BTreeSet<PermissionKey> {
        &self.coarse_permissions
    }

    /// Returns all module tiers.
    #[must_use]
    pub fn module_tiers(&self) -> &BTreeMap<String, ModuleTier> {
        &self.module_tiers
    }

    /// Returns the tier of one module. Unlisted modules are blocked.
    #[must_use]
    pub fn module_tier(&self, module_id: &str) -> ModuleTier {
        self.module_tiers
            .get(module_id)
            .copied()
            .unwrap_or(ModuleTier::Blocked)
    }

    /// Returns custom role references in stored order.
    #[must_use]
    pub fn custom_role_refs(&self) -> &[CustomRoleId] {
        self.custom_role_refs.as_slice()
    }

    /// Returns job roles consulted in the granular matrix.
    #[must_use]
    pub fn job_roles(&self) -> &BTreeSet<JobRole> {
        &self.job_roles
    }

    /// Returns the change history, oldest first.
    #[must_use]
    pub fn audit_log(&self) -> &[ProfileAuditEntry] {
        self.audit_log.as_slice()
    }

    /// Converts the profile back into its storage shape.
    #[must_use]
    pub fn into_record(self) -> ProfileRecord {
        ProfileRecord {
            id: Some(self.id.to_string()),
            name: self.name,
            profile_type: self.profile_type,
            permission_type: self.permission_type,
            coarse_permissions: self.coarse_permissions,
            module_tiers: self.module_tiers,
            custom_role_refs: self.custom_role_refs,
            job_roles: self.job_roles,
            audit_log: self.audit_log,
        }
    }
}

impl TryFrom<ProfileRecord> for Profile {
    type Error = AppError;

    fn try_from(record: ProfileRecord) -> AppResult<Self> {
        let Some(raw_id) = record.id else {
            return Err(AppError::Validation(
                "profile record has no id".to_owned(),
            ));
        };

        Ok(Self {
            id: ProfileId::new(raw_id)?,
            name: record.name,
            profile_type: record.profile_type,
            permission_type: record.permission_type,
            coarse_permissions: record.coarse_permissions,
            module_tiers: record.module_tiers,
            custom_role_refs: record.custom_role_refs,
            job_roles: record.job_roles,
            audit_log: record.audit_log,
        })
    }
}
