use super::*;

impl PostgresAccessRepository {
    pub(super) async fn find_profile_impl(
        &self,
        profile_id: &ProfileId,
    ) -> AppResult<Option<ProfileRecord>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT
                id,
                name,
                profile_type,
                permission_type,
                coarse_permissions,
                module_tiers,
                custom_role_ids,
                job_roles,
                audit_log
            FROM access_profiles
            WHERE id = $1
            "#,
        )
        .bind(profile_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load profile '{profile_id}': {error}"))
        })?;

        row.map(record_from_row).transpose()
    }
}

// Blank ids are passed through; the domain rejects them as structurally invalid.
// Unknown values inside the record are dropped so one bad entry does not
// lock the employee out of everything else the profile grants.
fn record_from_row(row: ProfileRow) -> AppResult<ProfileRecord> {
    let table = "access_profiles";

    Ok(ProfileRecord {
        profile_type: decode_or(
            table,
            &row.id,
            "profile_type",
            &row.profile_type,
            ProfileType::External,
        ),
        permission_type: decode_or(
            table,
            &row.id,
            "permission_type",
            &row.permission_type,
            ProfilePermissionType::RoleBased,
        ),
        coarse_permissions: decode_each::<PermissionKey>(
            table,
            &row.id,
            "coarse_permissions",
            &row.coarse_permissions,
        )
        .into_iter()
        .collect(),
        module_tiers: decode_module_tiers(&row.id, &row.module_tiers.0),
        custom_role_refs: decode_each(table, &row.id, "custom_role_ids", &row.custom_role_ids),
        job_roles: decode_each::<JobRole>(table, &row.id, "job_roles", &row.job_roles)
            .into_iter()
            .collect(),
        audit_log: decode_audit_log(&row.id, row.audit_log.0),
        name: row.name,
        id: Some(row.id),
    })
}
