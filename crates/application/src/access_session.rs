use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use repairhub_core::AppResult;
use tokio::sync::watch;

use crate::{
    AccessEvent, AccessEventSink, AccessPolicyConfig, AccessPorts, CheckOptions,
    CoarsePermissionChecker, EmployeeLinkResolver, GranularPermissionCheck,
    GranularPermissionResolver, IdentitySource, PermissionAggregator, PermissionCheckCache,
    ProfileLoader, ResolvedAccess,
};

#[derive(Debug, Clone)]
enum ResolutionState {
    Idle,
    Resolving { generation: u64 },
    Ready { access: Arc<ResolvedAccess> },
}

/// Per-session access façade used by view code.
///
/// Resolution runs identity, employee, profile and aggregation in order and
/// publishes one immutable [`ResolvedAccess`]. Every run is numbered; a run
/// that finishes after a newer run or a sign-out started is discarded.
/// Coarse checks read the published value synchronously and deny while
/// nothing is published. Granular checks wait for the published value.
pub struct AccessSession {
    identity: Arc<dyn IdentitySource>,
    employee_links: EmployeeLinkResolver,
    profile_loader: ProfileLoader,
    aggregator: PermissionAggregator,
    granular: GranularPermissionResolver,
    coarse: CoarsePermissionChecker,
    cache: PermissionCheckCache,
    events: Arc<dyn AccessEventSink>,
    generation: AtomicU64,
    state: watch::Sender<ResolutionState>,
}

impl AccessSession {
    /// Creates an unresolved session.
    #[must_use]
    pub fn new(
        ports: AccessPorts,
        policy: AccessPolicyConfig,
        events: Arc<dyn AccessEventSink>,
    ) -> Self {
        let (state, _) = watch::channel(ResolutionState::Idle);

        Self {
            identity: ports.identity,
            employee_links: EmployeeLinkResolver::new(ports.employees.clone(), events.clone()),
            profile_loader: ProfileLoader::new(ports.profiles, ports.employees, events.clone()),
            aggregator: PermissionAggregator::new(
                ports.custom_roles,
                events.clone(),
                policy.inactive_custom_roles,
            ),
            granular: GranularPermissionResolver::new(ports.granular_config, events.clone()),
            coarse: CoarsePermissionChecker::new(
                policy.page_access_map,
                policy.default_page_access,
                events.clone(),
            ),
            cache: PermissionCheckCache::new(),
            events,
            generation: AtomicU64::new(0),
            state,
        }
    }

    /// Runs a new resolution and publishes it unless it was superseded.
    ///
    /// Returns the published access, or `None` when the result was discarded.
    /// Failures never escape: they publish anonymous (denied) access.
    pub async fn refresh(&self) -> Option<Arc<ResolvedAccess>> {
        let mut generation = 0;
        self.state.send_modify(|state| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            self.cache.invalidate();
            *state = ResolutionState::Resolving { generation };
        });
        let mut guard = PendingResolutionGuard {
            state: &self.state,
            generation,
            armed: true,
        };

        let access = match self.resolve_access().await {
            Ok(access) => access,
            Err(error) => {
                self.events.record(AccessEvent::ResolutionFailed {
                    generation,
                    error: error.to_string(),
                });
                ResolvedAccess::anonymous()
            }
        };
        guard.armed = false;

        let access = Arc::new(access);
        let applied = self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            self.cache.invalidate();
            *state = ResolutionState::Ready {
                access: access.clone(),
            };
            true
        });

        if !applied {
            self.events.record(AccessEvent::StaleResolutionDiscarded {
                generation,
                current_generation: self.generation.load(Ordering::SeqCst),
            });
            return None;
        }

        self.cache.purge_stale().await;
        self.events.record(AccessEvent::ResolutionCompleted {
            generation,
            principal_id: access.principal().map(|principal| principal.id().to_string()),
            permission_count: access.permissions().len(),
        });

        Some(access)
    }

    /// Forgets the current principal and every cached verdict.
    ///
    /// Resolutions still in flight are discarded when they finish.
    pub async fn sign_out(&self) {
        self.state.send_modify(|state| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            self.cache.invalidate();
            *state = ResolutionState::Ready {
                access: Arc::new(ResolvedAccess::anonymous()),
            };
        });
        self.cache.purge_stale().await;
    }

    /// Returns the published access, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<ResolvedAccess>> {
        match &*self.state.borrow() {
            ResolutionState::Ready { access } => Some(access.clone()),
            ResolutionState::Idle | ResolutionState::Resolving { .. } => None,
        }
    }

    /// Returns whether the principal holds a coarse permission.
    #[must_use]
    pub fn has_permission(&self, key: &str) -> bool {
        self.snapshot()
            .is_some_and(|access| access.has_permission(key))
    }

    /// Returns whether the principal may open a page.
    #[must_use]
    pub fn can_access_page(&self, page_id: &str) -> bool {
        let access = self
            .snapshot()
            .unwrap_or_else(|| Arc::new(ResolvedAccess::anonymous()));
        self.coarse.can_access_page(&access, page_id)
    }

    /// Returns every mapped page the principal may open.
    #[must_use]
    pub fn accessible_pages(&self) -> Vec<String> {
        let access = self
            .snapshot()
            .unwrap_or_else(|| Arc::new(ResolvedAccess::anonymous()));
        self.coarse.accessible_pages(&access)
    }

    /// Returns whether the principal is workshop staff.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.snapshot().is_some_and(|access| access.is_internal())
    }

    /// Cached granular check.
    ///
    /// Verdicts are cached against the access published when the check
    /// started; a refresh or sign-out in the meantime keeps them out.
    pub async fn check_permission(
        &self,
        resource: &str,
        action: &str,
        options: CheckOptions,
    ) -> bool {
        self.resolved().await;
        self.cache
            .check_permission(self, resource, action, options)
            .await
    }

    /// Drops every cached granular verdict.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    /// Waits for published access, starting a resolution when none is running.
    pub async fn resolved(&self) -> Arc<ResolvedAccess> {
        let mut receiver = self.state.subscribe();

        loop {
            let current = receiver.borrow_and_update().clone();
            match current {
                ResolutionState::Ready { access } => return access,
                ResolutionState::Idle => {
                    if let Some(access) = self.refresh().await {
                        return access;
                    }
                }
                ResolutionState::Resolving { .. } => {
                    if receiver.changed().await.is_err() {
                        return Arc::new(ResolvedAccess::anonymous());
                    }
                }
            }
        }
    }

    async fn resolve_access(&self) -> AppResult<ResolvedAccess> {
        let Some(principal) = self.identity.current_principal().await? else {
            self.events.record(AccessEvent::PrincipalMissing);
            return Ok(ResolvedAccess::anonymous());
        };

        if principal.is_admin() {
            return Ok(ResolvedAccess::admin(principal));
        }

        // Without an employee only the principal's own legacy role applies.
        let Some(employee) = self.employee_links.resolve(&principal).await? else {
            let permissions = self.aggregator.aggregate(&principal, None).await;
            return Ok(ResolvedAccess::new(principal, None, None, permissions));
        };

        let profile = self.profile_loader.load_for_employee(&employee).await?;
        let employee = match profile {
            Some(_) => employee,
            None => employee.without_profile(),
        };
        let permissions = self.aggregator.aggregate(&principal, profile.as_ref()).await;

        Ok(ResolvedAccess::new(
            principal,
            Some(employee),
            profile,
            permissions,
        ))
    }
}

#[async_trait]
impl GranularPermissionCheck for AccessSession {
    async fn has_granular_permission(&self, resource: &str, action: &str) -> bool {
        let access = self.resolved().await;
        self.granular.resolve(&access, resource, action).await
    }
}

/// Returns the session to `Idle` when a resolution future is dropped before
/// it finishes, so waiters start a new one instead of waiting forever.
struct PendingResolutionGuard<'a> {
    state: &'a watch::Sender<ResolutionState>,
    generation: u64,
    armed: bool,
}

impl Drop for PendingResolutionGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let generation = self.generation;
        self.state.send_if_modified(|state| {
            let superseded = !matches!(
                state,
                ResolutionState::Resolving { generation: current } if *current == generation
            );
            if superseded {
                return false;
            }
            *state = ResolutionState::Idle;
            true
        });
    }
}
