use std::borrow::Borrow;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use repairhub_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Flat named capability checked by set membership.
///
/// Keys are dotted lower-case paths such as `dashboard.view`. Unknown keys are
/// valid: admin tooling can introduce keys the engine has never seen.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionKey(String);

impl PermissionKey {
    /// Creates a validated permission key.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "permission key must not be empty".to_owned(),
            ));
        }

        if trimmed.chars().any(char::is_whitespace) {
            return Err(AppError::Validation(format!(
                "permission key '{trimmed}' must not contain whitespace"
            )));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for PermissionKey {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

impl TryFrom<String> for PermissionKey {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PermissionKey> for String {
    fn from(value: PermissionKey) -> Self {
        value.0
    }
}

impl Borrow<str> for PermissionKey {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for PermissionKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Action id treated as read-only by module tiers.
pub const READ_ACTION: &str = "read";

/// Returns whether the granular action only reads data.
#[must_use]
pub fn is_read_action(action: &str) -> bool {
    action == READ_ACTION
}

/// Well-known coarse permission keys used by the workshop page map.
pub mod keys {
    /// View the workshop dashboard.
    pub const DASHBOARD_VIEW: &str = "dashboard.view";
    /// View customer records.
    pub const CUSTOMERS_VIEW: &str = "customers.view";
    /// View registered vehicles.
    pub const VEHICLES_VIEW: &str = "vehicles.view";
    /// View and open service orders.
    pub const SERVICE_ORDERS_VIEW: &str = "service_orders.view";
    /// View the yard (vehicles currently on site).
    pub const YARD_VIEW: &str = "yard.view";
    /// Run and read vehicle diagnostics.
    pub const DIAGNOSTICS_VIEW: &str = "diagnostics.view";
    /// Access the training catalogue.
    pub const TRAINING_VIEW: &str = "training.view";
    /// View the sales funnel.
    pub const SALES_FUNNEL_VIEW: &str = "sales_funnel.view";
    /// View invoices and billing.
    pub const BILLING_VIEW: &str = "billing.view";
    /// View HR records.
    pub const HR_VIEW: &str = "hr.view";
    /// View management reports.
    pub const REPORTS_VIEW: &str = "reports.view";
    /// Change workshop settings.
    pub const SETTINGS_MANAGE: &str = "settings.manage";
    /// Manage employees, profiles and custom roles.
    pub const USERS_MANAGE: &str = "admin.users.manage";
}
