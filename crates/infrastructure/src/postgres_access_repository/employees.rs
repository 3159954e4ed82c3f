use super::*;

impl PostgresAccessRepository {
    pub(super) async fn find_employee_by_principal_impl(
        &self,
        principal_id: &PrincipalId,
    ) -> AppResult<Option<Employee>> {
        let row = sqlx::query_as::<_, EmployeeRow>(
            r#"
            SELECT id, principal_id, email, workshop_id, profile_id, job_role, status
            FROM employees
            WHERE principal_id = $1
            "#,
        )
        .bind(principal_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to find employee for principal '{principal_id}': {error}"
            ))
        })?;

        row.map(employee_from_row).transpose()
    }

    pub(super) async fn find_employee_by_email_impl(
        &self,
        email: &str,
    ) -> AppResult<Option<Employee>> {
        let row = sqlx::query_as::<_, EmployeeRow>(
            r#"
            SELECT id, principal_id, email, workshop_id, profile_id, job_role, status
            FROM employees
            WHERE lower(email) = lower($1)
            ORDER BY created_at, id
            LIMIT 1
            "#,
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find employee by email: {error}"))
        })?;

        row.map(employee_from_row).transpose()
    }

    pub(super) async fn clear_profile_ref_impl(&self, employee_id: &EmployeeId) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE employees
            SET profile_id = NULL
            WHERE id = $1
              AND profile_id IS NOT NULL
            "#,
        )
        .bind(employee_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to clear profile reference of employee '{employee_id}': {error}"
            ))
        })?;

        Ok(())
    }
}

fn employee_from_row(row: EmployeeRow) -> AppResult<Employee> {
    let table = "employees";

    Ok(Employee {
        id: decode_column(table, &row.id, "id", &row.id)?,
        principal_id: decode_optional(table, &row.id, "principal_id", row.principal_id.as_deref()),
        email: row.email,
        workshop_id: WorkshopId::from_uuid(row.workshop_id),
        profile_id: decode_optional(table, &row.id, "profile_id", row.profile_id.as_deref()),
        job_role: decode_or(table, &row.id, "job_role", &row.job_role, JobRole::Outros),
        status: decode_or(
            table,
            &row.id,
            "status",
            &row.status,
            EmployeeStatus::PendingApproval,
        ),
    })
}
