use std::str::FromStr;

use repairhub_core::AppError;
use serde::{Deserialize, Serialize};

use crate::{CustomRoleId, PrincipalId};

/// Coarse platform role carried by every principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemRole {
    /// Ordinary workshop user, governed by profiles and roles.
    #[default]
    User,
    /// Platform super-admin with universal access.
    Admin,
}

impl SystemRole {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for SystemRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(AppError::Validation(format!(
                "unknown system role value '{value}'"
            ))),
        }
    }
}

/// Authenticated identity as supplied by the identity source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    id: PrincipalId,
    email: String,
    system_role: SystemRole,
    legacy_custom_role: Option<CustomRoleId>,
}

impl Principal {
    /// Creates a principal from identity data.
    #[must_use]
    pub fn new(id: PrincipalId, email: impl Into<String>, system_role: SystemRole) -> Self {
        Self {
            id,
            email: email.into(),
            system_role,
            legacy_custom_role: None,
        }
    }

    /// Attaches the legacy single custom-role link.
    #[must_use]
    pub fn with_legacy_custom_role(mut self, role_id: CustomRoleId) -> Self {
        self.legacy_custom_role = Some(role_id);
        self
    }

    /// Returns the principal identifier.
    #[must_use]
    pub fn id(&self) -> &PrincipalId {
        &self.id
    }

    /// Returns the login email.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Returns the coarse platform role.
    #[must_use]
    pub fn system_role(&self) -> SystemRole {
        self.system_role
    }

    /// Returns the legacy single custom-role link, if any.
    #[must_use]
    pub fn legacy_custom_role(&self) -> Option<&CustomRoleId> {
        self.legacy_custom_role.as_ref()
    }

    /// Returns whether this principal bypasses every other access rule.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.system_role == SystemRole::Admin
    }
}
