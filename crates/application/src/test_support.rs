//! Port fakes shared by the unit tests of this crate.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use repairhub_core::{AppError, AppResult, WorkshopId};
use repairhub_domain::{
    CustomRole, CustomRoleId, CustomRoleStatus, Employee, EmployeeId, EmployeeStatus,
    GranularPermissionConfig, JobRole, PermissionKey, Principal, PrincipalId, Profile, ProfileId,
    ProfileRecord,
};
use tokio::sync::{Mutex as AsyncMutex, Notify};

use crate::{
    AccessEvent, AccessEventSink, CustomRoleRepository, EmployeeDirectory,
    GranularConfigRepository, IdentitySource, ProfileRepository,
};

pub(crate) fn employee(id: &str, profile_id: Option<&str>) -> Employee {
    let id = match EmployeeId::new(id) {
        Ok(id) => id,
        Err(error) => panic!("invalid employee id in test: {error}"),
    };

    Employee {
        id,
        principal_id: None,
        email: None,
        workshop_id: WorkshopId::new(),
        profile_id: profile_id.and_then(|value| ProfileId::new(value).ok()),
        job_role: JobRole::Tecnico,
        status: EmployeeStatus::Active,
    }
}

pub(crate) fn profile(id: &str) -> Profile {
    match ProfileId::new(id) {
        Ok(id) => Profile::new(id, "Oficina"),
        Err(error) => panic!("invalid profile id in test: {error}"),
    }
}

pub(crate) fn custom_role(id: &str, keys: &[&str], status: CustomRoleStatus) -> CustomRole {
    let id = match CustomRoleId::new(id) {
        Ok(id) => id,
        Err(error) => panic!("invalid role id in test: {error}"),
    };

    CustomRole {
        name: id.to_string(),
        id,
        system_roles: key_set(keys),
        status,
    }
}

pub(crate) fn key_set(keys: &[&str]) -> BTreeSet<PermissionKey> {
    keys.iter()
        .map(|key| match PermissionKey::new(*key) {
            Ok(key) => key,
            Err(error) => panic!("invalid permission key in test: {error}"),
        })
        .collect()
}

#[derive(Default)]
pub(crate) struct RecordingEventSink {
    events: Mutex<Vec<AccessEvent>>,
}

impl RecordingEventSink {
    pub(crate) fn events(&self) -> Vec<AccessEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub(crate) fn contains(&self, predicate: impl Fn(&AccessEvent) -> bool) -> bool {
        self.events().iter().any(predicate)
    }

    pub(crate) fn count(&self, predicate: impl Fn(&AccessEvent) -> bool) -> usize {
        self.events().iter().filter(|event| predicate(event)).count()
    }
}

impl AccessEventSink for RecordingEventSink {
    fn record(&self, event: AccessEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// Identity source that can be held open to simulate a slow backend.
#[derive(Default)]
pub(crate) struct FakeIdentitySource {
    principal: AsyncMutex<Option<Principal>>,
    fail: bool,
    gate: Option<(Notify, Notify)>,
    calls: AsyncMutex<usize>,
}

impl FakeIdentitySource {
    pub(crate) fn signed_in(principal: Principal) -> Self {
        Self {
            principal: AsyncMutex::new(Some(principal)),
            ..Self::default()
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Blocks every lookup until [`FakeIdentitySource::release`] is called.
    pub(crate) fn gated(principal: Principal) -> Self {
        Self {
            principal: AsyncMutex::new(Some(principal)),
            gate: Some((Notify::new(), Notify::new())),
            ..Self::default()
        }
    }

    pub(crate) async fn entered(&self) {
        if let Some((entered, _)) = &self.gate {
            entered.notified().await;
        }
    }

    pub(crate) fn release(&self) {
        if let Some((_, release)) = &self.gate {
            release.notify_one();
        }
    }

    pub(crate) async fn set_principal(&self, principal: Option<Principal>) {
        *self.principal.lock().await = principal;
    }

    pub(crate) async fn call_count(&self) -> usize {
        *self.calls.lock().await
    }
}

#[async_trait]
impl IdentitySource for FakeIdentitySource {
    async fn current_principal(&self) -> AppResult<Option<Principal>> {
        *self.calls.lock().await += 1;

        if let Some((entered, release)) = &self.gate {
            entered.notify_one();
            release.notified().await;
        }

        if self.fail {
            return Err(AppError::Internal("identity backend unreachable".to_owned()));
        }

        Ok(self.principal.lock().await.clone())
    }
}

#[derive(Default)]
pub(crate) struct FakeEmployeeDirectory {
    employees: AsyncMutex<HashMap<EmployeeId, Employee>>,
    clears: AsyncMutex<usize>,
    fail_writes: bool,
    fail_reads: bool,
}

impl FakeEmployeeDirectory {
    pub(crate) fn with_employees(employees: impl IntoIterator<Item = Employee>) -> Self {
        Self {
            employees: AsyncMutex::new(
                employees
                    .into_iter()
                    .map(|employee| (employee.id.clone(), employee))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    pub(crate) fn failing_writes(employees: impl IntoIterator<Item = Employee>) -> Self {
        Self {
            fail_writes: true,
            ..Self::with_employees(employees)
        }
    }

    pub(crate) fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    pub(crate) async fn clear_count(&self) -> usize {
        *self.clears.lock().await
    }

    pub(crate) async fn profile_ref_of(&self, employee_id: &str) -> Option<String> {
        self.employees
            .lock()
            .await
            .values()
            .find(|employee| employee.id.as_str() == employee_id)
            .and_then(|employee| employee.profile_id.as_ref().map(ToString::to_string))
    }
}

#[async_trait]
impl EmployeeDirectory for FakeEmployeeDirectory {
    async fn find_employee_by_principal(
        &self,
        principal_id: &PrincipalId,
    ) -> AppResult<Option<Employee>> {
        if self.fail_reads {
            return Err(AppError::Internal("employee store unreachable".to_owned()));
        }

        Ok(self
            .employees
            .lock()
            .await
            .values()
            .find(|employee| employee.principal_id.as_ref() == Some(principal_id))
            .cloned())
    }

    async fn find_employee_by_email(&self, email: &str) -> AppResult<Option<Employee>> {
        if self.fail_reads {
            return Err(AppError::Internal("employee store unreachable".to_owned()));
        }

        Ok(self
            .employees
            .lock()
            .await
            .values()
            .find(|employee| {
                employee
                    .email
                    .as_deref()
                    .is_some_and(|stored| stored.eq_ignore_ascii_case(email))
            })
            .cloned())
    }

    async fn clear_profile_ref(&self, employee_id: &EmployeeId) -> AppResult<()> {
        if self.fail_writes {
            return Err(AppError::Internal("employee store is read-only".to_owned()));
        }

        if let Some(employee) = self.employees.lock().await.get_mut(employee_id)
            && employee.profile_id.take().is_some()
        {
            *self.clears.lock().await += 1;
        }

        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeProfileRepository {
    records: AsyncMutex<HashMap<ProfileId, ProfileRecord>>,
    lookups: AsyncMutex<usize>,
}

impl FakeProfileRepository {
    pub(crate) fn with_profiles(profiles: impl IntoIterator<Item = Profile>) -> Self {
        Self {
            records: AsyncMutex::new(
                profiles
                    .into_iter()
                    .map(|profile| (profile.id().clone(), profile.into_record()))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    pub(crate) async fn insert_record(&self, profile_id: ProfileId, record: ProfileRecord) {
        self.records.lock().await.insert(profile_id, record);
    }

    pub(crate) async fn remove(&self, profile_id: &str) {
        self.records
            .lock()
            .await
            .retain(|stored_id, _| stored_id.as_str() != profile_id);
    }

    pub(crate) async fn lookup_count(&self) -> usize {
        *self.lookups.lock().await
    }
}

#[async_trait]
impl ProfileRepository for FakeProfileRepository {
    async fn find_profile(&self, profile_id: &ProfileId) -> AppResult<Option<ProfileRecord>> {
        *self.lookups.lock().await += 1;
        Ok(self.records.lock().await.get(profile_id).cloned())
    }
}

#[derive(Default)]
pub(crate) struct FakeCustomRoleRepository {
    roles: AsyncMutex<HashMap<CustomRoleId, CustomRole>>,
    lookups: AsyncMutex<usize>,
}

impl FakeCustomRoleRepository {
    pub(crate) fn with_roles(roles: impl IntoIterator<Item = CustomRole>) -> Self {
        Self {
            roles: AsyncMutex::new(
                roles
                    .into_iter()
                    .map(|role| (role.id.clone(), role))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    pub(crate) async fn lookup_count(&self) -> usize {
        *self.lookups.lock().await
    }
}

#[async_trait]
impl CustomRoleRepository for FakeCustomRoleRepository {
    async fn find_custom_role(&self, role_id: &CustomRoleId) -> AppResult<Option<CustomRole>> {
        *self.lookups.lock().await += 1;
        Ok(self.roles.lock().await.get(role_id).cloned())
    }
}

#[derive(Default)]
pub(crate) struct FakeGranularConfigRepository {
    config: AsyncMutex<Option<GranularPermissionConfig>>,
    fail: bool,
    gate: Option<(Notify, Notify)>,
    loads: AsyncMutex<usize>,
}

impl FakeGranularConfigRepository {
    pub(crate) fn with_config(config: GranularPermissionConfig) -> Self {
        Self {
            config: AsyncMutex::new(Some(config)),
            ..Self::default()
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Blocks every load until [`FakeGranularConfigRepository::release`] is called.
    pub(crate) fn gated(config: GranularPermissionConfig) -> Self {
        Self {
            config: AsyncMutex::new(Some(config)),
            gate: Some((Notify::new(), Notify::new())),
            ..Self::default()
        }
    }

    pub(crate) async fn entered(&self) {
        if let Some((entered, _)) = &self.gate {
            entered.notified().await;
        }
    }

    pub(crate) fn release(&self) {
        if let Some((_, release)) = &self.gate {
            release.notify_one();
        }
    }

    pub(crate) async fn replace(&self, config: Option<GranularPermissionConfig>) {
        *self.config.lock().await = config;
    }

    pub(crate) async fn load_count(&self) -> usize {
        *self.loads.lock().await
    }
}

#[async_trait]
impl GranularConfigRepository for FakeGranularConfigRepository {
    async fn load_granular_config(&self) -> AppResult<Option<GranularPermissionConfig>> {
        *self.loads.lock().await += 1;

        if let Some((entered, release)) = &self.gate {
            entered.notify_one();
            release.notified().await;
        }

        if self.fail {
            return Err(AppError::Internal(
                "granular config record is corrupt".to_owned(),
            ));
        }

        Ok(self.config.lock().await.clone())
    }
}
