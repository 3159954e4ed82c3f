//! RepairHub access inspector: resolves one principal and logs what it may do.

#![forbid(unsafe_code)]

mod config;

use std::sync::Arc;

use repairhub_application::{
    AccessPolicyConfig, AccessPorts, AccessSession, CheckOptions, TracingAccessEventSink,
};
use repairhub_core::{AppError, AppResult};
use repairhub_domain::PageAccessMap;
use repairhub_infrastructure::{PostgresAccessRepository, StaticIdentitySource};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::InspectorConfig;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = InspectorConfig::load()?;
    let pool = connect_pool(&config).await?;
    let repository = Arc::new(PostgresAccessRepository::new(pool));

    let identity = Arc::new(StaticIdentitySource::new());
    match repository.find_principal(&config.principal_id).await? {
        Some(principal) => identity.sign_in(principal).await,
        None => warn!(
            principal_id = %config.principal_id,
            "principal not found, inspecting anonymous access"
        ),
    }

    let policy = AccessPolicyConfig::new(PageAccessMap::workshop_default()?)
        .with_default_page_access(config.default_page_access)
        .with_inactive_custom_roles(config.inactive_custom_roles);
    let session = AccessSession::new(
        AccessPorts {
            identity,
            employees: repository.clone(),
            profiles: repository.clone(),
            custom_roles: repository.clone(),
            granular_config: repository,
        },
        policy,
        Arc::new(TracingAccessEventSink),
    );

    let access = session.resolved().await;
    let permissions = access
        .permissions()
        .iter()
        .map(|key| key.as_str())
        .collect::<Vec<_>>()
        .join(",");

    info!(
        principal_id = %config.principal_id,
        is_admin = access.is_admin(),
        is_internal = session.is_internal(),
        employee_id = ?access.employee().map(|employee| employee.id.to_string()),
        profile_id = ?access.profile().map(|profile| profile.id().to_string()),
        permissions = %permissions,
        "resolved access"
    );
    info!(
        pages = %session.accessible_pages().join(","),
        "accessible pages"
    );

    for check in &config.granular_checks {
        let allowed = session
            .check_permission(
                check.resource.as_str(),
                check.action.as_str(),
                CheckOptions::default(),
            )
            .await;
        info!(
            resource = %check.resource,
            action = %check.action,
            allowed,
            "granular check"
        );
    }

    Ok(())
}

async fn connect_pool(config: &InspectorConfig) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(config.database_url.as_str())
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
