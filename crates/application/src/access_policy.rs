use std::str::FromStr;

use repairhub_core::AppError;
use repairhub_domain::{DEFAULT_PAGE_ACCESS, PageAccessMap, PageAccessPolicy};

/// Whether inactive custom roles still contribute their keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InactiveRolePolicy {
    /// Inactive roles contribute like active ones.
    Include,
    /// Inactive roles contribute nothing.
    Exclude,
}

impl InactiveRolePolicy {
    /// Returns a stable configuration value for this policy.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Include => "include",
            Self::Exclude => "exclude",
        }
    }
}

impl FromStr for InactiveRolePolicy {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "include" => Ok(Self::Include),
            "exclude" => Ok(Self::Exclude),
            _ => Err(AppError::Validation(format!(
                "unknown inactive role policy value '{value}'"
            ))),
        }
    }
}

/// Default treatment of inactive custom roles.
///
/// Profiles that still reference a retired role keep its keys until an admin
/// removes the reference.
pub const INACTIVE_CUSTOM_ROLE_POLICY: InactiveRolePolicy = InactiveRolePolicy::Include;

/// Security-relevant knobs of an access session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicyConfig {
    /// Page to permission mapping.
    pub page_access_map: PageAccessMap,
    /// Verdict for pages missing from the map.
    pub default_page_access: PageAccessPolicy,
    /// Treatment of inactive custom roles.
    pub inactive_custom_roles: InactiveRolePolicy,
}

impl AccessPolicyConfig {
    /// Creates a config with the default policies.
    #[must_use]
    pub fn new(page_access_map: PageAccessMap) -> Self {
        Self {
            page_access_map,
            default_page_access: DEFAULT_PAGE_ACCESS,
            inactive_custom_roles: INACTIVE_CUSTOM_ROLE_POLICY,
        }
    }

    /// Overrides the verdict for unmapped pages.
    #[must_use]
    pub fn with_default_page_access(mut self, policy: PageAccessPolicy) -> Self {
        self.default_page_access = policy;
        self
    }

    /// Overrides the treatment of inactive custom roles.
    #[must_use]
    pub fn with_inactive_custom_roles(mut self, policy: InactiveRolePolicy) -> Self {
        self.inactive_custom_roles = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use repairhub_domain::{PageAccessMap, PageAccessPolicy};

    use super::{AccessPolicyConfig, InactiveRolePolicy};

    #[test]
    fn defaults_are_fail_open_pages_and_included_roles() {
        let config = AccessPolicyConfig::new(PageAccessMap::new());
        assert_eq!(config.default_page_access, PageAccessPolicy::Allow);
        assert_eq!(config.inactive_custom_roles, InactiveRolePolicy::Include);
    }

    #[test]
    fn inactive_role_policy_parses_configuration_values() {
        assert_eq!(
            InactiveRolePolicy::from_str("exclude").ok(),
            Some(InactiveRolePolicy::Exclude)
        );
        assert!(InactiveRolePolicy::from_str("sometimes").is_err());
    }
}
