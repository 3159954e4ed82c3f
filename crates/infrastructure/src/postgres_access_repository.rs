use std::collections::BTreeMap;
use std::fmt::Debug;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::warn;

use repairhub_application::{
    CustomRoleRepository, EmployeeDirectory, GranularConfigRepository, ProfileRepository,
};
use repairhub_core::{AppError, AppResult, WorkshopId};
use repairhub_domain::{
    CustomRole, CustomRoleId, CustomRoleStatus, Employee, EmployeeId, EmployeeStatus,
    GranularPermissionConfig, JobRole, ModuleTier, PermissionKey, Principal, PrincipalId,
    ProfileAuditEntry, ProfileId, ProfilePermissionType, ProfileRecord, ProfileType, SystemRole,
};

mod custom_roles;
mod employees;
mod granular_config;
mod principals;
mod profiles;

/// Settings key of the job-role matrix record.
pub const GRANULAR_PERMISSIONS_KEY: &str = "granular_permissions";

/// PostgreSQL-backed repository for every access-resolution port.
#[derive(Clone)]
pub struct PostgresAccessRepository {
    pool: PgPool,
}

impl PostgresAccessRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads a principal by id.
    pub async fn find_principal(&self, principal_id: &PrincipalId) -> AppResult<Option<Principal>> {
        self.find_principal_impl(principal_id).await
    }
}

#[derive(Debug, FromRow)]
struct PrincipalRow {
    id: String,
    email: String,
    system_role: String,
    legacy_custom_role_id: Option<String>,
}

#[derive(Debug, FromRow)]
struct EmployeeRow {
    id: String,
    principal_id: Option<String>,
    email: Option<String>,
    workshop_id: uuid::Uuid,
    profile_id: Option<String>,
    job_role: String,
    status: String,
}

#[derive(Debug, FromRow)]
struct ProfileRow {
    id: String,
    name: String,
    profile_type: String,
    permission_type: String,
    coarse_permissions: Vec<String>,
    module_tiers: Json<serde_json::Value>,
    custom_role_ids: Vec<String>,
    job_roles: Vec<String>,
    audit_log: Json<serde_json::Value>,
}

#[derive(Debug, FromRow)]
struct CustomRoleRow {
    id: String,
    name: String,
    system_roles: Vec<String>,
    status: String,
}

fn decode_column<T>(table: &str, row_id: &str, column: &str, value: &str) -> AppResult<T>
where
    T: FromStr<Err = AppError>,
{
    T::from_str(value).map_err(|error| {
        AppError::Internal(format!(
            "invalid {column} '{value}' on {table} row '{row_id}': {error}"
        ))
    })
}

/// Decodes an enumerated column, falling back when the stored value is unknown.
fn decode_or<T>(table: &str, row_id: &str, column: &str, value: &str, fallback: T) -> T
where
    T: FromStr<Err = AppError> + Debug,
{
    T::from_str(value).unwrap_or_else(|error| {
        warn!(
            table,
            row_id,
            column,
            value,
            fallback = ?fallback,
            %error,
            "undecodable column value replaced"
        );
        fallback
    })
}

fn decode_optional<T>(table: &str, row_id: &str, column: &str, value: Option<&str>) -> Option<T>
where
    T: FromStr<Err = AppError>,
{
    let value = value?;
    T::from_str(value)
        .inspect_err(|error| {
            warn!(table, row_id, column, value, %error, "undecodable reference ignored");
        })
        .ok()
}

/// Decodes every array element that can be decoded and skips the rest.
fn decode_each<T>(table: &str, row_id: &str, column: &str, values: &[String]) -> Vec<T>
where
    T: FromStr<Err = AppError>,
{
    values
        .iter()
        .filter_map(|value| {
            T::from_str(value)
                .inspect_err(|error| {
                    warn!(
                        table,
                        row_id,
                        column,
                        value = value.as_str(),
                        %error,
                        "undecodable array element skipped"
                    );
                })
                .ok()
        })
        .collect()
}

fn decode_module_tiers(row_id: &str, value: &serde_json::Value) -> BTreeMap<String, ModuleTier> {
    let Some(entries) = value.as_object() else {
        if !value.is_null() {
            warn!(row_id, "module_tiers is not an object, ignoring it");
        }
        return BTreeMap::new();
    };

    entries
        .iter()
        .filter_map(|(module, tier)| {
            let decoded = tier
                .as_str()
                .and_then(|tier| ModuleTier::from_str(tier).ok());
            if decoded.is_none() {
                warn!(
                    row_id,
                    module = module.as_str(),
                    tier = %tier,
                    "unknown module tier skipped"
                );
            }
            decoded.map(|tier| (module.clone(), tier))
        })
        .collect()
}

fn decode_audit_log(row_id: &str, value: serde_json::Value) -> Vec<ProfileAuditEntry> {
    let serde_json::Value::Array(entries) = value else {
        if !value.is_null() {
            warn!(row_id, "audit_log is not an array, ignoring it");
        }
        return Vec::new();
    };

    entries
        .into_iter()
        .filter_map(|entry| {
            serde_json::from_value(entry)
                .inspect_err(|error| {
                    warn!(row_id, %error, "undecodable audit entry skipped");
                })
                .ok()
        })
        .collect()
}

#[async_trait]
impl EmployeeDirectory for PostgresAccessRepository {
    async fn find_employee_by_principal(
        &self,
        principal_id: &PrincipalId,
    ) -> AppResult<Option<Employee>> {
        self.find_employee_by_principal_impl(principal_id).await
    }

    async fn find_employee_by_email(&self, email: &str) -> AppResult<Option<Employee>> {
        self.find_employee_by_email_impl(email).await
    }

    async fn clear_profile_ref(&self, employee_id: &EmployeeId) -> AppResult<()> {
        self.clear_profile_ref_impl(employee_id).await
    }
}

#[async_trait]
impl ProfileRepository for PostgresAccessRepository {
    async fn find_profile(&self, profile_id: &ProfileId) -> AppResult<Option<ProfileRecord>> {
        self.find_profile_impl(profile_id).await
    }
}

#[async_trait]
impl CustomRoleRepository for PostgresAccessRepository {
    async fn find_custom_role(&self, role_id: &CustomRoleId) -> AppResult<Option<CustomRole>> {
        self.find_custom_role_impl(role_id).await
    }
}

#[async_trait]
impl GranularConfigRepository for PostgresAccessRepository {
    async fn load_granular_config(&self) -> AppResult<Option<GranularPermissionConfig>> {
        self.load_granular_config_impl().await
    }
}
