//! Structured events emitted while resolving access.
//!
//! Resolution code never logs directly. It reports what happened to an
//! [`AccessEventSink`]; the default sink forwards to `tracing`.

use tracing::{debug, info, warn};

/// Something noteworthy that happened during access resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessEvent {
    /// No principal is signed in.
    PrincipalMissing,
    /// The principal has no employee record (pending approval or platform admin).
    EmployeeUnlinked {
        /// Principal id.
        principal_id: String,
    },
    /// The employee was matched through its contact email rather than its principal link.
    EmployeeMatchedByEmail {
        /// Principal id.
        principal_id: String,
        /// Employee id.
        employee_id: String,
    },
    /// An employee's profile reference points at a missing or malformed profile.
    ProfileReferenceBroken {
        /// Employee id.
        employee_id: String,
        /// Dangling profile id.
        profile_id: String,
        /// Why the profile could not be used.
        reason: String,
    },
    /// The dangling profile reference was cleared.
    ProfileReferenceCleared {
        /// Employee id.
        employee_id: String,
        /// Former profile id.
        profile_id: String,
    },
    /// Clearing the dangling profile reference failed.
    SelfHealFailed {
        /// Employee id.
        employee_id: String,
        /// Dangling profile id.
        profile_id: String,
        /// Storage error.
        error: String,
    },
    /// A custom role reference could not be resolved and was skipped.
    CustomRoleSkipped {
        /// Role id.
        custom_role_id: String,
        /// Why the role was skipped.
        reason: String,
    },
    /// An inactive custom role was left out of the aggregated set.
    InactiveCustomRoleExcluded {
        /// Role id.
        custom_role_id: String,
    },
    /// A resolution finished and was published.
    ResolutionCompleted {
        /// Resolution generation.
        generation: u64,
        /// Principal id, if any.
        principal_id: Option<String>,
        /// Size of the aggregated coarse set.
        permission_count: usize,
    },
    /// A resolution failed and the session fell back to denied state.
    ResolutionFailed {
        /// Resolution generation.
        generation: u64,
        /// Error message.
        error: String,
    },
    /// A resolution finished after it was superseded and was dropped.
    StaleResolutionDiscarded {
        /// Generation of the dropped result.
        generation: u64,
        /// Generation current when it arrived.
        current_generation: u64,
    },
    /// The granular matrix record is missing.
    GranularConfigUnavailable {
        /// Requested resource.
        resource: String,
        /// Requested action.
        action: String,
    },
    /// A granular check failed and was denied.
    GranularCheckFailed {
        /// Requested resource.
        resource: String,
        /// Requested action.
        action: String,
        /// Error message.
        error: String,
    },
    /// A page lookup failed and access was restricted to admins.
    PageLookupFailed {
        /// Requested page.
        page_id: String,
        /// Error message.
        error: String,
    },
}

/// Receiver of access resolution events.
pub trait AccessEventSink: Send + Sync {
    /// Records one event. Must not fail or block.
    fn record(&self, event: AccessEvent);
}

/// Sink forwarding events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAccessEventSink;

impl AccessEventSink for TracingAccessEventSink {
    fn record(&self, event: AccessEvent) {
        match event {
            AccessEvent::PrincipalMissing => {
                debug!("no principal signed in; only public pages are reachable");
            }
            AccessEvent::EmployeeUnlinked { principal_id } => {
                info!(principal_id = %principal_id, "principal has no employee record");
            }
            AccessEvent::EmployeeMatchedByEmail {
                principal_id,
                employee_id,
            } => {
                debug!(
                    principal_id = %principal_id,
                    employee_id = %employee_id,
                    "employee matched by email"
                );
            }
            AccessEvent::ProfileReferenceBroken {
                employee_id,
                profile_id,
                reason,
            } => {
                warn!(
                    employee_id = %employee_id,
                    profile_id = %profile_id,
                    reason = %reason,
                    "employee references an unusable profile"
                );
            }
            AccessEvent::ProfileReferenceCleared {
                employee_id,
                profile_id,
            } => {
                info!(
                    employee_id = %employee_id,
                    profile_id = %profile_id,
                    "cleared dangling profile reference"
                );
            }
            AccessEvent::SelfHealFailed {
                employee_id,
                profile_id,
                error,
            } => {
                warn!(
                    employee_id = %employee_id,
                    profile_id = %profile_id,
                    error = %error,
                    "failed to clear dangling profile reference"
                );
            }
            AccessEvent::CustomRoleSkipped {
                custom_role_id,
                reason,
            } => {
                warn!(
                    custom_role_id = %custom_role_id,
                    reason = %reason,
                    "skipped unresolvable custom role"
                );
            }
            AccessEvent::InactiveCustomRoleExcluded { custom_role_id } => {
                debug!(custom_role_id = %custom_role_id, "excluded inactive custom role");
            }
            AccessEvent::ResolutionCompleted {
                generation,
                principal_id,
                permission_count,
            } => {
                debug!(
                    generation,
                    principal_id = principal_id.as_deref().unwrap_or("<none>"),
                    permission_count,
                    "access resolved"
                );
            }
            AccessEvent::ResolutionFailed { generation, error } => {
                warn!(generation, error = %error, "access resolution failed; denying");
            }
            AccessEvent::StaleResolutionDiscarded {
                generation,
                current_generation,
            } => {
                debug!(
                    generation,
                    current_generation, "discarded superseded access resolution"
                );
            }
            AccessEvent::GranularConfigUnavailable { resource, action } => {
                warn!(
                    resource = %resource,
                    action = %action,
                    "granular permission config unavailable; denying"
                );
            }
            AccessEvent::GranularCheckFailed {
                resource,
                action,
                error,
            } => {
                warn!(
                    resource = %resource,
                    action = %action,
                    error = %error,
                    "granular permission check failed; denying"
                );
            }
            AccessEvent::PageLookupFailed { page_id, error } => {
                warn!(
                    page_id = %page_id,
                    error = %error,
                    "page access lookup failed; restricting to admins"
                );
            }
        }
    }
}
