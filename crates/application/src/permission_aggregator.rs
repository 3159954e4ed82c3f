use std::collections::BTreeSet;
use std::sync::Arc;

use repairhub_domain::{CustomRole, CustomRoleId, PermissionKey, Principal, Profile};

use crate::{AccessEvent, AccessEventSink, CustomRoleRepository, InactiveRolePolicy};

/// One independently edited source of coarse permission keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionSource {
    /// Flat keys stored on the profile.
    ProfileKeys(BTreeSet<PermissionKey>),
    /// A custom role referenced by the profile.
    CustomRole(CustomRole),
    /// The legacy single custom role linked on the principal.
    LegacyCustomRole(CustomRole),
}

impl PermissionSource {
    fn keys(&self, inactive_roles: InactiveRolePolicy) -> Option<&BTreeSet<PermissionKey>> {
        match self {
            Self::ProfileKeys(keys) => Some(keys),
            Self::CustomRole(role) | Self::LegacyCustomRole(role) => {
                (role.is_active() || inactive_roles == InactiveRolePolicy::Include)
                    .then_some(&role.system_roles)
            }
        }
    }
}

/// Merges permission sources into one deduplicated set.
///
/// Pure set union: neither source order nor duplicates affect the result.
#[must_use]
pub fn aggregate_permissions(
    sources: &[PermissionSource],
    inactive_roles: InactiveRolePolicy,
) -> BTreeSet<PermissionKey> {
    sources
        .iter()
        .filter_map(|source| source.keys(inactive_roles))
        .flatten()
        .cloned()
        .collect()
}

/// Collects the permission sources of a principal and aggregates them.
#[derive(Clone)]
pub struct PermissionAggregator {
    custom_roles: Arc<dyn CustomRoleRepository>,
    events: Arc<dyn AccessEventSink>,
    inactive_roles: InactiveRolePolicy,
}

impl PermissionAggregator {
    /// Creates an aggregator.
    #[must_use]
    pub fn new(
        custom_roles: Arc<dyn CustomRoleRepository>,
        events: Arc<dyn AccessEventSink>,
        inactive_roles: InactiveRolePolicy,
    ) -> Self {
        Self {
            custom_roles,
            events,
            inactive_roles,
        }
    }

    /// Gathers every source that applies to the principal.
    ///
    /// Unresolvable custom role references are skipped, never fatal.
    pub async fn collect_sources(
        &self,
        principal: &Principal,
        profile: Option<&Profile>,
    ) -> Vec<PermissionSource> {
        let mut sources = Vec::new();

        if let Some(profile) = profile {
            sources.push(PermissionSource::ProfileKeys(
                profile.coarse_permissions().clone(),
            ));

            let role_ids: BTreeSet<&CustomRoleId> = profile.custom_role_refs().iter().collect();
            for role_id in role_ids {
                if let Some(role) = self.resolve_role(role_id).await {
                    sources.push(PermissionSource::CustomRole(role));
                }
            }
        }

        if let Some(role_id) = principal.legacy_custom_role()
            && let Some(role) = self.resolve_role(role_id).await
        {
            sources.push(PermissionSource::LegacyCustomRole(role));
        }

        sources
    }

    /// Returns the principal's effective coarse permission set.
    pub async fn aggregate(
        &self,
        principal: &Principal,
        profile: Option<&Profile>,
    ) -> BTreeSet<PermissionKey> {
        let sources = self.collect_sources(principal, profile).await;

        if self.inactive_roles == InactiveRolePolicy::Exclude {
            for source in &sources {
                if let PermissionSource::CustomRole(role)
                | PermissionSource::LegacyCustomRole(role) = source
                    && !role.is_active()
                {
                    self.events.record(AccessEvent::InactiveCustomRoleExcluded {
                        custom_role_id: role.id.to_string(),
                    });
                }
            }
        }

        aggregate_permissions(&sources, self.inactive_roles)
    }

    async fn resolve_role(&self, role_id: &CustomRoleId) -> Option<CustomRole> {
        let reason = match self.custom_roles.find_custom_role(role_id).await {
            Ok(Some(role)) => return Some(role),
            Ok(None) => "custom role does not exist".to_owned(),
            Err(error) => error.to_string(),
        };

        self.events.record(AccessEvent::CustomRoleSkipped {
            custom_role_id: role_id.to_string(),
            reason,
        });
        None
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use proptest::prelude::*;
    use repairhub_domain::{
        CustomRole, CustomRoleId, CustomRoleStatus, PermissionKey, Principal, PrincipalId,
        Profile, SystemRole,
    };

    use super::{PermissionAggregator, PermissionSource, aggregate_permissions};
    use crate::test_support::{
        FakeCustomRoleRepository, RecordingEventSink, custom_role, key_set, profile,
    };
    use crate::{AccessEvent, InactiveRolePolicy};

    fn principal() -> Principal {
        match PrincipalId::new("u-1") {
            Ok(id) => Principal::new(id, "ana@oficina.com", SystemRole::User),
            Err(error) => panic!("invalid principal id in test: {error}"),
        }
    }

    fn role_id(value: &str) -> CustomRoleId {
        match CustomRoleId::new(value) {
            Ok(id) => id,
            Err(error) => panic!("invalid role id in test: {error}"),
        }
    }

    fn profile_with_roles(refs: &[&str]) -> Profile {
        refs.iter()
            .fold(profile("p-1"), |profile, id| profile.with_custom_role(role_id(id)))
    }

    fn scenario_roles() -> FakeCustomRoleRepository {
        FakeCustomRoleRepository::with_roles([
            custom_role("r1", &["a", "b"], CustomRoleStatus::Active),
            custom_role("r2", &["c"], CustomRoleStatus::Inactive),
        ])
    }

    #[tokio::test]
    async fn inactive_role_keys_are_included_by_default() {
        let aggregator = PermissionAggregator::new(
            Arc::new(scenario_roles()),
            Arc::new(RecordingEventSink::default()),
            crate::INACTIVE_CUSTOM_ROLE_POLICY,
        );

        let permissions = aggregator
            .aggregate(&principal(), Some(&profile_with_roles(&["r1", "r2"])))
            .await;
        assert_eq!(permissions, key_set(&["a", "b", "c"]));
    }

    #[tokio::test]
    async fn inactive_role_keys_are_dropped_when_excluded() {
        let events = Arc::new(RecordingEventSink::default());
        let aggregator = PermissionAggregator::new(
            Arc::new(scenario_roles()),
            events.clone(),
            InactiveRolePolicy::Exclude,
        );

        let permissions = aggregator
            .aggregate(&principal(), Some(&profile_with_roles(&["r1", "r2"])))
            .await;
        assert_eq!(permissions, key_set(&["a", "b"]));
        assert!(events.contains(|event| matches!(
            event,
            AccessEvent::InactiveCustomRoleExcluded { .. }
        )));
    }

    #[tokio::test]
    async fn missing_role_is_skipped_and_rest_aggregated() {
        let events = Arc::new(RecordingEventSink::default());
        let aggregator = PermissionAggregator::new(
            Arc::new(scenario_roles()),
            events.clone(),
            InactiveRolePolicy::Include,
        );

        let profile = profile_with_roles(&["ghost", "r1"]).with_coarse_permission(
            match PermissionKey::new("dashboard.view") {
                Ok(key) => key,
                Err(error) => panic!("invalid key in test: {error}"),
            },
        );
        let permissions = aggregator.aggregate(&principal(), Some(&profile)).await;
        assert_eq!(permissions, key_set(&["a", "b", "dashboard.view"]));
        assert!(events.contains(|event| matches!(
            event,
            AccessEvent::CustomRoleSkipped { custom_role_id, .. } if custom_role_id == "ghost"
        )));
    }

    #[tokio::test]
    async fn legacy_role_is_additive_without_profile() {
        let aggregator = PermissionAggregator::new(
            Arc::new(scenario_roles()),
            Arc::new(RecordingEventSink::default()),
            InactiveRolePolicy::Include,
        );

        let principal = principal().with_legacy_custom_role(role_id("r1"));
        assert_eq!(
            aggregator.aggregate(&principal, None).await,
            key_set(&["a", "b"])
        );
        assert_eq!(
            aggregator
                .aggregate(&principal, Some(&profile_with_roles(&["r2"])))
                .await,
            key_set(&["a", "b", "c"])
        );
    }

    #[tokio::test]
    async fn duplicate_references_are_fetched_once() {
        let roles = Arc::new(scenario_roles());
        let aggregator = PermissionAggregator::new(
            roles.clone(),
            Arc::new(RecordingEventSink::default()),
            InactiveRolePolicy::Include,
        );

        let permissions = aggregator
            .aggregate(&principal(), Some(&profile_with_roles(&["r1", "r1", "r1"])))
            .await;
        assert_eq!(permissions, key_set(&["a", "b"]));
        assert_eq!(roles.lookup_count().await, 1);
    }

    fn role_strategy() -> impl Strategy<Value = CustomRole> {
        (
            "[a-z]{1,6}",
            proptest::collection::btree_set("[a-z]{1,4}\\.[a-z]{1,4}", 0..4),
            any::<bool>(),
        )
            .prop_map(|(id, keys, active)| CustomRole {
                id: role_id(id.as_str()),
                name: id,
                system_roles: keys
                    .into_iter()
                    .filter_map(|key| PermissionKey::new(key).ok())
                    .collect(),
                status: if active {
                    CustomRoleStatus::Active
                } else {
                    CustomRoleStatus::Inactive
                },
            })
    }

    fn roles_and_permutation() -> impl Strategy<Value = (Vec<CustomRole>, Vec<CustomRole>)> {
        proptest::collection::vec(role_strategy(), 0..6)
            .prop_flat_map(|roles| (Just(roles.clone()), Just(roles).prop_shuffle()))
    }

    proptest! {
        #[test]
        fn aggregation_is_order_independent(
            (roles, permuted) in roles_and_permutation(),
            exclude in any::<bool>(),
        ) {
            let policy = if exclude {
                InactiveRolePolicy::Exclude
            } else {
                InactiveRolePolicy::Include
            };
            let sources: Vec<PermissionSource> =
                roles.into_iter().map(PermissionSource::CustomRole).collect();
            let permuted: Vec<PermissionSource> =
                permuted.into_iter().map(PermissionSource::CustomRole).collect();

            let expected: BTreeSet<PermissionKey> = aggregate_permissions(&sources, policy);
            prop_assert_eq!(aggregate_permissions(&permuted, policy), expected);
        }
    }
}
