use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use repairhub_application::{
    CustomRoleRepository, EmployeeDirectory, GranularConfigRepository, ProfileRepository,
};
use repairhub_core::{AppError, AppResult};
use repairhub_domain::{
    CustomRole, CustomRoleId, Employee, EmployeeId, GranularPermissionConfig, PrincipalId,
    Profile, ProfileId, ProfileRecord,
};
use tokio::sync::RwLock;

/// In-memory access repository for tests and local development.
#[derive(Debug, Default)]
pub struct InMemoryAccessRepository {
    employees: RwLock<HashMap<EmployeeId, Employee>>,
    profiles: RwLock<HashMap<ProfileId, ProfileRecord>>,
    custom_roles: RwLock<HashMap<CustomRoleId, CustomRole>>,
    granular_config: RwLock<Option<GranularPermissionConfig>>,
    profile_ref_clears: AtomicUsize,
}

impl InMemoryAccessRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an employee.
    ///
    /// Fails when the employee's principal is already linked to another
    /// employee.
    pub async fn save_employee(&self, employee: Employee) -> AppResult<()> {
        let mut employees = self.employees.write().await;

        if let Some(principal_id) = employee.principal_id.as_ref()
            && let Some(linked) = find_linked(&employees, principal_id)
            && linked.id != employee.id
        {
            return Err(AppError::Conflict(format!(
                "principal '{principal_id}' is already linked to employee '{}'",
                linked.id
            )));
        }

        employees.insert(employee.id.clone(), employee);
        Ok(())
    }

    /// Returns a stored employee.
    pub async fn employee(&self, employee_id: &EmployeeId) -> Option<Employee> {
        self.employees.read().await.get(employee_id).cloned()
    }

    /// Inserts or replaces a profile.
    pub async fn save_profile(&self, profile: Profile) {
        self.profiles
            .write()
            .await
            .insert(profile.id().clone(), profile.into_record());
    }

    /// Stores a raw record under an id, valid or not.
    pub async fn save_profile_record(&self, profile_id: ProfileId, record: ProfileRecord) {
        self.profiles.write().await.insert(profile_id, record);
    }

    /// Deletes a profile without touching employees that reference it.
    pub async fn delete_profile(&self, profile_id: &ProfileId) -> bool {
        self.profiles.write().await.remove(profile_id).is_some()
    }

    /// Inserts or replaces a custom role.
    pub async fn save_custom_role(&self, role: CustomRole) {
        self.custom_roles
            .write()
            .await
            .insert(role.id.clone(), role);
    }

    /// Replaces the job-role matrix. `None` removes the record.
    pub async fn set_granular_config(&self, config: Option<GranularPermissionConfig>) {
        *self.granular_config.write().await = config;
    }

    /// Number of profile references actually cleared by self-heal.
    #[must_use]
    pub fn profile_ref_clears(&self) -> usize {
        self.profile_ref_clears.load(Ordering::SeqCst)
    }
}

fn find_linked<'a>(
    employees: &'a HashMap<EmployeeId, Employee>,
    principal_id: &PrincipalId,
) -> Option<&'a Employee> {
    employees
        .values()
        .find(|employee| employee.principal_id.as_ref() == Some(principal_id))
}

#[async_trait]
impl EmployeeDirectory for InMemoryAccessRepository {
    async fn find_employee_by_principal(
        &self,
        principal_id: &PrincipalId,
    ) -> AppResult<Option<Employee>> {
        Ok(find_linked(&*self.employees.read().await, principal_id).cloned())
    }

    async fn find_employee_by_email(&self, email: &str) -> AppResult<Option<Employee>> {
        let email = email.trim();
        let employees = self.employees.read().await;

        let mut matches: Vec<&Employee> = employees
            .values()
            .filter(|employee| {
                employee
                    .email
                    .as_deref()
                    .is_some_and(|stored| stored.trim().eq_ignore_ascii_case(email))
            })
            .collect();
        matches.sort_by(|left, right| left.id.cmp(&right.id));

        Ok(matches.first().map(|employee| (*employee).clone()))
    }

    async fn clear_profile_ref(&self, employee_id: &EmployeeId) -> AppResult<()> {
        let mut employees = self.employees.write().await;
        let Some(employee) = employees.get_mut(employee_id) else {
            return Err(AppError::NotFound(format!(
                "employee '{employee_id}' not found"
            )));
        };

        if employee.profile_id.take().is_some() {
            self.profile_ref_clears.fetch_add(1, Ordering::SeqCst);
        }

        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for InMemoryAccessRepository {
    async fn find_profile(&self, profile_id: &ProfileId) -> AppResult<Option<ProfileRecord>> {
        Ok(self.profiles.read().await.get(profile_id).cloned())
    }
}

#[async_trait]
impl CustomRoleRepository for InMemoryAccessRepository {
    async fn find_custom_role(&self, role_id: &CustomRoleId) -> AppResult<Option<CustomRole>> {
        Ok(self.custom_roles.read().await.get(role_id).cloned())
    }
}

#[async_trait]
impl GranularConfigRepository for InMemoryAccessRepository {
    async fn load_granular_config(&self) -> AppResult<Option<GranularPermissionConfig>> {
        Ok(self.granular_config.read().await.clone())
    }
}
