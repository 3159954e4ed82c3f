//! Static page to permission mapping.

use std::collections::BTreeMap;
use std::str::FromStr;

use repairhub_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::{PermissionKey, keys};

/// Verdict applied to pages that have no entry in the page map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageAccessPolicy {
    /// Unmapped pages are reachable by everyone.
    Allow,
    /// Unmapped pages are denied to everyone but admins.
    Deny,
}

impl PageAccessPolicy {
    /// Returns a stable configuration value for this policy.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
        }
    }
}

impl FromStr for PageAccessPolicy {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "allow" => Ok(Self::Allow),
            "deny" => Ok(Self::Deny),
            _ => Err(AppError::Validation(format!(
                "unknown page access policy value '{value}'"
            ))),
        }
    }
}

/// Verdict for unmapped pages.
///
/// Fail-open. Flipping this to `Deny` hides every page nobody registered in
/// the map, so review the map before changing it.
pub const DEFAULT_PAGE_ACCESS: PageAccessPolicy = PageAccessPolicy::Allow;

/// What a page requires from the principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequirement {
    /// Mapped to `null`: reachable without any permission.
    Public,
    /// Mapped to a coarse permission key.
    Requires(PermissionKey),
    /// Not present in the map.
    Unmapped,
}

/// Static mapping `page_id -> permission_key | null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageAccessMap {
    pages: BTreeMap<String, Option<PermissionKey>>,
}

impl PageAccessMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a page reachable without any permission.
    #[must_use]
    pub fn with_public_page(mut self, page_id: impl Into<String>) -> Self {
        self.pages.insert(page_id.into(), None);
        self
    }

    /// Registers a page gated by a permission key.
    #[must_use]
    pub fn with_gated_page(mut self, page_id: impl Into<String>, key: PermissionKey) -> Self {
        self.pages.insert(page_id.into(), Some(key));
        self
    }

    /// Returns the page map shipped with the workshop application.
    pub fn workshop_default() -> AppResult<Self> {
        let gated = [
            ("dashboard", keys::DASHBOARD_VIEW),
            ("customers", keys::CUSTOMERS_VIEW),
            ("vehicles", keys::VEHICLES_VIEW),
            ("service_orders", keys::SERVICE_ORDERS_VIEW),
            ("yard", keys::YARD_VIEW),
            ("diagnostics", keys::DIAGNOSTICS_VIEW),
            ("training", keys::TRAINING_VIEW),
            ("sales_funnel", keys::SALES_FUNNEL_VIEW),
            ("billing", keys::BILLING_VIEW),
            ("hr", keys::HR_VIEW),
            ("reports", keys::REPORTS_VIEW),
            ("settings", keys::SETTINGS_MANAGE),
            ("user_management", keys::USERS_MANAGE),
        ];

        let mut map = Self::new()
            .with_public_page("login")
            .with_public_page("pending_approval")
            .with_public_page("profile_request");
        for (page_id, key) in gated {
            map = map.with_gated_page(page_id, PermissionKey::new(key)?);
        }

        Ok(map)
    }

    /// Looks up what a page requires.
    ///
    /// Fails for blank page ids, which never name a real page.
    pub fn requirement(&self, page_id: &str) -> AppResult<PageRequirement> {
        if page_id.trim().is_empty() {
            return Err(AppError::Validation(
                "page id must not be empty".to_owned(),
            ));
        }

        Ok(match self.pages.get(page_id) {
            Some(None) => PageRequirement::Public,
            Some(Some(key)) => PageRequirement::Requires(key.clone()),
            None => PageRequirement::Unmapped,
        })
    }

    /// Returns every mapped page id in lexical order.
    pub fn page_ids(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }
}
