use std::sync::Arc;

use async_trait::async_trait;
use repairhub_core::AppResult;

use crate::{AccessEvent, AccessEventSink, GranularConfigRepository, ResolvedAccess};

/// Resource/action check used behind the permission cache.
#[async_trait]
pub trait GranularPermissionCheck: Send + Sync {
    /// Returns whether the action is permitted on the resource. Never fails:
    /// errors resolve to `false`.
    async fn has_granular_permission(&self, resource: &str, action: &str) -> bool;
}

/// Resolves resource/action checks from the job-role matrix and module tiers.
///
/// The two models are consulted in a fixed order: any of the profile's job
/// roles granting the action wins; otherwise the module tier of the resource
/// decides. A missing matrix denies without consulting tiers.
#[derive(Clone)]
pub struct GranularPermissionResolver {
    config: Arc<dyn GranularConfigRepository>,
    events: Arc<dyn AccessEventSink>,
}

impl GranularPermissionResolver {
    /// Creates a resolver.
    #[must_use]
    pub fn new(
        config: Arc<dyn GranularConfigRepository>,
        events: Arc<dyn AccessEventSink>,
    ) -> Self {
        Self { config, events }
    }

    /// Checks an action against resolved access. Fail-closed.
    pub async fn resolve(&self, access: &ResolvedAccess, resource: &str, action: &str) -> bool {
        if access.is_admin() {
            return true;
        }

        match self.evaluate(access, resource, action).await {
            Ok(allowed) => allowed,
            Err(error) => {
                self.events.record(AccessEvent::GranularCheckFailed {
                    resource: resource.to_owned(),
                    action: action.to_owned(),
                    error: error.to_string(),
                });
                false
            }
        }
    }

    async fn evaluate(
        &self,
        access: &ResolvedAccess,
        resource: &str,
        action: &str,
    ) -> AppResult<bool> {
        // Without a profile there are neither job roles nor tiers to consult.
        let Some(profile) = access.profile() else {
            return Ok(false);
        };

        let Some(config) = self.config.load_granular_config().await? else {
            self.events.record(AccessEvent::GranularConfigUnavailable {
                resource: resource.to_owned(),
                action: action.to_owned(),
            });
            return Ok(false);
        };

        if profile
            .job_roles()
            .iter()
            .any(|job_role| config.allows(*job_role, resource, action))
        {
            return Ok(true);
        }

        Ok(profile.module_tier(resource).permits(action))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use repairhub_domain::{
        GranularPermissionConfig, JobRole, ModuleTier, Principal, PrincipalId, Profile,
        SystemRole,
    };

    use super::GranularPermissionResolver;
    use crate::test_support::{FakeGranularConfigRepository, RecordingEventSink, key_set, profile};
    use crate::{AccessEvent, ResolvedAccess};

    fn user_access(profile: Option<Profile>) -> ResolvedAccess {
        match PrincipalId::new("u-1") {
            Ok(id) => ResolvedAccess::new(
                Principal::new(id, "ana@oficina.com", SystemRole::User),
                None,
                profile,
                key_set(&[]),
            ),
            Err(error) => panic!("invalid principal id in test: {error}"),
        }
    }

    fn admin_access() -> ResolvedAccess {
        match PrincipalId::new("root") {
            Ok(id) => ResolvedAccess::admin(Principal::new(
                id,
                "root@repairhub.app",
                SystemRole::Admin,
            )),
            Err(error) => panic!("invalid principal id in test: {error}"),
        }
    }

    #[tokio::test]
    async fn view_tier_permits_read_only() {
        let config = FakeGranularConfigRepository::with_config(GranularPermissionConfig::new());
        let resolver = GranularPermissionResolver::new(
            Arc::new(config),
            Arc::new(RecordingEventSink::default()),
        );
        let access = user_access(Some(
            profile("p-1")
                .with_job_role(JobRole::Tecnico)
                .with_module_tier("patio", ModuleTier::View),
        ));

        assert!(resolver.resolve(&access, "patio", "read").await);
        assert!(!resolver.resolve(&access, "patio", "write").await);
    }

    #[tokio::test]
    async fn tier_monotonicity_holds_for_read_and_write() {
        let resolver = GranularPermissionResolver::new(
            Arc::new(FakeGranularConfigRepository::with_config(
                GranularPermissionConfig::new(),
            )),
            Arc::new(RecordingEventSink::default()),
        );

        let cases = [
            (ModuleTier::Total, true, true),
            (ModuleTier::View, true, false),
            (ModuleTier::Blocked, false, false),
        ];
        for (tier, read, write) in cases {
            let access = user_access(Some(profile("p-1").with_module_tier("estoque", tier)));
            assert_eq!(resolver.resolve(&access, "estoque", "read").await, read);
            assert_eq!(resolver.resolve(&access, "estoque", "write").await, write);
        }
    }

    #[tokio::test]
    async fn job_role_matrix_wins_over_blocked_tier() {
        let config = GranularPermissionConfig::new().with_grant(
            JobRole::Gerente,
            "billing",
            ["approve"],
        );
        let resolver = GranularPermissionResolver::new(
            Arc::new(FakeGranularConfigRepository::with_config(config)),
            Arc::new(RecordingEventSink::default()),
        );
        let access = user_access(Some(
            profile("p-1")
                .with_job_role(JobRole::Tecnico)
                .with_job_role(JobRole::Gerente)
                .with_module_tier("billing", ModuleTier::Blocked),
        ));

        assert!(resolver.resolve(&access, "billing", "approve").await);
        assert!(!resolver.resolve(&access, "billing", "read").await);
    }

    #[tokio::test]
    async fn missing_config_denies_and_reports() {
        let events = Arc::new(RecordingEventSink::default());
        let resolver = GranularPermissionResolver::new(
            Arc::new(FakeGranularConfigRepository::default()),
            events.clone(),
        );
        let access = user_access(Some(
            profile("p-1").with_module_tier("patio", ModuleTier::Total),
        ));

        assert!(!resolver.resolve(&access, "patio", "read").await);
        assert!(events.contains(|event| matches!(
            event,
            AccessEvent::GranularConfigUnavailable { .. }
        )));
    }

    #[tokio::test]
    async fn storage_failure_denies_and_reports() {
        let events = Arc::new(RecordingEventSink::default());
        let resolver = GranularPermissionResolver::new(
            Arc::new(FakeGranularConfigRepository::failing()),
            events.clone(),
        );
        let access = user_access(Some(
            profile("p-1").with_module_tier("patio", ModuleTier::Total),
        ));

        assert!(!resolver.resolve(&access, "patio", "read").await);
        assert!(events.contains(|event| matches!(event, AccessEvent::GranularCheckFailed { .. })));
    }

    #[tokio::test]
    async fn admin_is_granted_without_loading_config() {
        let config = Arc::new(FakeGranularConfigRepository::failing());
        let resolver = GranularPermissionResolver::new(
            config.clone(),
            Arc::new(RecordingEventSink::default()),
        );

        assert!(resolver.resolve(&admin_access(), "anything", "delete").await);
        assert_eq!(config.load_count().await, 0);
    }

    #[tokio::test]
    async fn no_profile_denies() {
        let resolver = GranularPermissionResolver::new(
            Arc::new(FakeGranularConfigRepository::with_config(
                GranularPermissionConfig::new(),
            )),
            Arc::new(RecordingEventSink::default()),
        );

        assert!(!resolver.resolve(&user_access(None), "patio", "read").await);
        assert!(!resolver.resolve(&ResolvedAccess::anonymous(), "patio", "read").await);
    }
}
