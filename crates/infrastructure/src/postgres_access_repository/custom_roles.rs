use super::*;

impl PostgresAccessRepository {
    pub(super) async fn find_custom_role_impl(
        &self,
        role_id: &CustomRoleId,
    ) -> AppResult<Option<CustomRole>> {
        let row = sqlx::query_as::<_, CustomRoleRow>(
            r#"
            SELECT id, name, system_roles, status
            FROM access_custom_roles
            WHERE id = $1
            "#,
        )
        .bind(role_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load custom role '{role_id}': {error}"))
        })?;

        row.map(custom_role_from_row).transpose()
    }
}

fn custom_role_from_row(row: CustomRoleRow) -> AppResult<CustomRole> {
    let table = "access_custom_roles";

    Ok(CustomRole {
        id: decode_column(table, &row.id, "id", &row.id)?,
        system_roles: decode_each::<PermissionKey>(
            table,
            &row.id,
            "system_roles",
            &row.system_roles,
        )
        .into_iter()
        .collect(),
        status: decode_or(
            table,
            &row.id,
            "status",
            &row.status,
            CustomRoleStatus::Inactive,
        ),
        name: row.name,
    })
}
