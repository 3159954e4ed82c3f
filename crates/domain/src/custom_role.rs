use std::collections::BTreeSet;
use std::str::FromStr;

use repairhub_core::AppError;
use serde::{Deserialize, Serialize};

use crate::{CustomRoleId, PermissionKey};

/// Whether a custom role is offered to admins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomRoleStatus {
    /// Assignable.
    #[default]
    Active,
    /// Retired. Existing references may still point at it.
    Inactive,
}

impl CustomRoleStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl FromStr for CustomRoleStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(AppError::Validation(format!(
                "unknown custom role status value '{value}'"
            ))),
        }
    }
}

/// Named, reusable set of coarse permission keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRole {
    /// Role id.
    pub id: CustomRoleId,
    /// Display name.
    pub name: String,
    /// Keys granted by this role.
    pub system_roles: BTreeSet<PermissionKey>,
    /// Lifecycle state.
    pub status: CustomRoleStatus,
}

impl CustomRole {
    /// Returns whether the role is currently assignable.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == CustomRoleStatus::Active
    }
}
