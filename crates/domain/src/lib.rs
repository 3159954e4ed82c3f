//! Domain entities and invariants of workshop access control.

#![forbid(unsafe_code)]

mod custom_role;
mod employee;
mod granular;
mod ids;
mod page_access;
mod permission;
mod principal;
mod profile;

pub use custom_role::{CustomRole, CustomRoleStatus};
pub use employee::{Employee, EmployeeStatus, JobRole};
pub use granular::{GranularPermissionConfig, JobRoleGrants, ResourceGrant};
pub use ids::{CustomRoleId, EmployeeId, PrincipalId, ProfileId};
pub use page_access::{DEFAULT_PAGE_ACCESS, PageAccessMap, PageAccessPolicy, PageRequirement};
pub use permission::{PermissionKey, READ_ACTION, is_read_action, keys};
pub use principal::{Principal, SystemRole};
pub use profile::{
    ModuleTier, Profile, ProfileAuditEntry, ProfilePermissionType, ProfileRecord, ProfileType,
};
