use super::*;

impl PostgresAccessRepository {
    pub(super) async fn load_granular_config_impl(
        &self,
    ) -> AppResult<Option<GranularPermissionConfig>> {
        let stored = sqlx::query_scalar::<_, serde_json::Value>(
            r#"
            SELECT value
            FROM access_settings
            WHERE key = $1
            "#,
        )
        .bind(GRANULAR_PERMISSIONS_KEY)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load granular permission config: {error}"
            ))
        })?;

        stored.map(GranularPermissionConfig::from_json).transpose()
    }

    /// Replaces the job-role matrix record.
    pub async fn save_granular_config(&self, config: &GranularPermissionConfig) -> AppResult<()> {
        let value = serde_json::to_value(config).map_err(|error| {
            AppError::Internal(format!(
                "failed to serialize granular permission config: {error}"
            ))
        })?;

        sqlx::query(
            r#"
            INSERT INTO access_settings (key, value, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value,
                updated_at = now()
            "#,
        )
        .bind(GRANULAR_PERMISSIONS_KEY)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to save granular permission config: {error}"
            ))
        })?;

        Ok(())
    }
}
