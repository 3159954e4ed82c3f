use super::*;

impl PostgresAccessRepository {
    pub(super) async fn find_principal_impl(
        &self,
        principal_id: &PrincipalId,
    ) -> AppResult<Option<Principal>> {
        let row = sqlx::query_as::<_, PrincipalRow>(
            r#"
            SELECT id, email, system_role, legacy_custom_role_id
            FROM principals
            WHERE id = $1
            "#,
        )
        .bind(principal_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load principal '{principal_id}': {error}"
            ))
        })?;

        row.map(principal_from_row).transpose()
    }
}

fn principal_from_row(row: PrincipalRow) -> AppResult<Principal> {
    let table = "principals";
    let system_role = decode_or(table, &row.id, "system_role", &row.system_role, SystemRole::User);
    let legacy_role = decode_optional::<CustomRoleId>(
        table,
        &row.id,
        "legacy_custom_role_id",
        row.legacy_custom_role_id.as_deref(),
    );
    let id = decode_column::<PrincipalId>(table, &row.id, "id", &row.id)?;
    let principal = Principal::new(id, row.email, system_role);

    Ok(match legacy_role {
        Some(role_id) => principal.with_legacy_custom_role(role_id),
        None => principal,
    })
}
