use std::sync::Arc;

use async_trait::async_trait;
use repairhub_core::AppResult;
use repairhub_domain::{
    CustomRole, CustomRoleId, Employee, EmployeeId, GranularPermissionConfig, Principal,
    PrincipalId, ProfileId, ProfileRecord,
};

/// Port supplying the currently authenticated principal.
#[async_trait]
pub trait IdentitySource: Send + Sync {
    /// Returns the signed-in principal, or `None` when nobody is signed in.
    async fn current_principal(&self) -> AppResult<Option<Principal>>;
}

/// Port for employee lookups and the single write the engine performs.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// Finds the employee linked to a principal id.
    async fn find_employee_by_principal(
        &self,
        principal_id: &PrincipalId,
    ) -> AppResult<Option<Employee>>;

    /// Finds an employee by contact email, compared case-insensitively.
    async fn find_employee_by_email(&self, email: &str) -> AppResult<Option<Employee>>;

    /// Clears the employee's profile reference. Used only to repair dangling
    /// references; clearing an already-empty reference is a no-op.
    async fn clear_profile_ref(&self, employee_id: &EmployeeId) -> AppResult<()>;
}

/// Port for access profile lookups.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Returns the raw profile record, or `None` when it does not exist.
    async fn find_profile(&self, profile_id: &ProfileId) -> AppResult<Option<ProfileRecord>>;
}

/// Port for custom role lookups.
#[async_trait]
pub trait CustomRoleRepository: Send + Sync {
    /// Returns the custom role, or `None` when it does not exist.
    async fn find_custom_role(&self, role_id: &CustomRoleId) -> AppResult<Option<CustomRole>>;
}

/// Port for the job-role resource/action matrix.
#[async_trait]
pub trait GranularConfigRepository: Send + Sync {
    /// Returns the matrix, or `None` when the record was never written.
    async fn load_granular_config(&self) -> AppResult<Option<GranularPermissionConfig>>;
}

/// Every port an access session reads from.
#[derive(Clone)]
pub struct AccessPorts {
    /// Current principal.
    pub identity: Arc<dyn IdentitySource>,
    /// Employee records and the self-heal write.
    pub employees: Arc<dyn EmployeeDirectory>,
    /// Access profiles.
    pub profiles: Arc<dyn ProfileRepository>,
    /// Custom roles.
    pub custom_roles: Arc<dyn CustomRoleRepository>,
    /// Job-role matrix.
    pub granular_config: Arc<dyn GranularConfigRepository>,
}
