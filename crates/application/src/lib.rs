//! Access resolution services and ports.

#![forbid(unsafe_code)]

mod access_events;
mod access_policy;
mod access_ports;
mod access_session;
mod coarse_checker;
mod employee_link_resolver;
mod granular_resolver;
mod permission_aggregator;
mod permission_cache;
mod profile_loader;
mod resolved_access;

#[cfg(test)]
mod test_support;

pub use access_events::{AccessEvent, AccessEventSink, TracingAccessEventSink};
pub use access_policy::{AccessPolicyConfig, INACTIVE_CUSTOM_ROLE_POLICY, InactiveRolePolicy};
pub use access_ports::{
    AccessPorts, CustomRoleRepository, EmployeeDirectory, GranularConfigRepository,
    IdentitySource, ProfileRepository,
};
pub use access_session::AccessSession;
pub use coarse_checker::CoarsePermissionChecker;
pub use employee_link_resolver::EmployeeLinkResolver;
pub use granular_resolver::{GranularPermissionCheck, GranularPermissionResolver};
pub use permission_aggregator::{PermissionAggregator, PermissionSource, aggregate_permissions};
pub use permission_cache::{CheckOptions, DeniedCheck, PermissionCheckCache};
pub use profile_loader::{ProfileLoader, ProfileLookup, SelfHealOutcome};
pub use resolved_access::ResolvedAccess;
