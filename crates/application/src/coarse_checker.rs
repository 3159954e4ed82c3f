use std::sync::Arc;

use repairhub_domain::{PageAccessMap, PageAccessPolicy, PageRequirement};

use crate::{AccessEvent, AccessEventSink, ResolvedAccess};

/// Synchronous page checks against the aggregated coarse set.
#[derive(Clone)]
pub struct CoarsePermissionChecker {
    page_access_map: PageAccessMap,
    default_page_access: PageAccessPolicy,
    events: Arc<dyn AccessEventSink>,
}

impl CoarsePermissionChecker {
    /// Creates a checker over a page map.
    #[must_use]
    pub fn new(
        page_access_map: PageAccessMap,
        default_page_access: PageAccessPolicy,
        events: Arc<dyn AccessEventSink>,
    ) -> Self {
        Self {
            page_access_map,
            default_page_access,
            events,
        }
    }

    /// Returns the page map in use.
    #[must_use]
    pub fn page_access_map(&self) -> &PageAccessMap {
        &self.page_access_map
    }

    /// Returns whether the resolved principal may open a page.
    ///
    /// Public pages are always reachable. Unmapped pages follow the configured
    /// default policy, admins excepted. A failed lookup admits admins only.
    #[must_use]
    pub fn can_access_page(&self, access: &ResolvedAccess, page_id: &str) -> bool {
        match self.page_access_map.requirement(page_id) {
            Ok(PageRequirement::Public) => true,
            Ok(PageRequirement::Requires(key)) => access.has_permission(key.as_str()),
            Ok(PageRequirement::Unmapped) => match self.default_page_access {
                PageAccessPolicy::Allow => true,
                PageAccessPolicy::Deny => access.is_admin(),
            },
            Err(error) => {
                self.events.record(AccessEvent::PageLookupFailed {
                    page_id: page_id.to_owned(),
                    error: error.to_string(),
                });
                access.is_admin()
            }
        }
    }

    /// Returns every mapped page the principal may open.
    #[must_use]
    pub fn accessible_pages(&self, access: &ResolvedAccess) -> Vec<String> {
        self.page_access_map
            .page_ids()
            .filter(|page_id| self.can_access_page(access, page_id))
            .map(str::to_owned)
            .collect()
    }
}
