use std::collections::BTreeSet;

use repairhub_domain::{Employee, PermissionKey, Principal, Profile, ProfileType};

/// Everything one resolution learned about the signed-in principal.
///
/// Immutable once built; a new resolution publishes a new value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedAccess {
    principal: Option<Principal>,
    employee: Option<Employee>,
    profile: Option<Profile>,
    permissions: BTreeSet<PermissionKey>,
}

impl ResolvedAccess {
    /// Access of a session with nobody signed in.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Access of a platform admin. Nothing else is loaded for admins.
    #[must_use]
    pub fn admin(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
            ..Self::default()
        }
    }

    /// Access of an ordinary principal.
    #[must_use]
    pub fn new(
        principal: Principal,
        employee: Option<Employee>,
        profile: Option<Profile>,
        permissions: BTreeSet<PermissionKey>,
    ) -> Self {
        Self {
            principal: Some(principal),
            employee,
            profile,
            permissions,
        }
    }

    /// Returns the signed-in principal.
    #[must_use]
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Returns the linked employee record.
    #[must_use]
    pub fn employee(&self) -> Option<&Employee> {
        self.employee.as_ref()
    }

    /// Returns the employee's access profile.
    #[must_use]
    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// Returns the aggregated coarse permission set. Empty for admins.
    #[must_use]
    pub fn permissions(&self) -> &BTreeSet<PermissionKey> {
        &self.permissions
    }

    /// Returns whether the principal is a platform admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.principal.as_ref().is_some_and(Principal::is_admin)
    }

    /// Returns whether the principal holds a coarse permission.
    #[must_use]
    pub fn has_permission(&self, key: &str) -> bool {
        match &self.principal {
            None => false,
            Some(principal) if principal.is_admin() => true,
            Some(_) => self.permissions.contains(key),
        }
    }

    /// Returns whether the principal is workshop staff.
    ///
    /// Admins count as internal.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.is_admin()
            || self
                .profile
                .as_ref()
                .is_some_and(|profile| profile.profile_type() == ProfileType::Internal)
    }
}

#[cfg(test)]
mod tests {
    use repairhub_domain::{Principal, PrincipalId, ProfileType, SystemRole};

    use super::ResolvedAccess;
    use crate::test_support::{key_set, profile};

    fn principal(role: SystemRole) -> Principal {
        match PrincipalId::new("u-1") {
            Ok(id) => Principal::new(id, "ana@oficina.com", role),
            Err(error) => panic!("invalid principal id in test: {error}"),
        }
    }

    #[test]
    fn anonymous_holds_nothing() {
        let access = ResolvedAccess::anonymous();
        assert!(!access.has_permission("dashboard.view"));
        assert!(!access.is_internal());
        assert!(!access.is_admin());
    }

    #[test]
    fn admin_holds_everything_without_a_profile() {
        let access = ResolvedAccess::admin(principal(SystemRole::Admin));
        assert!(access.has_permission("dashboard.view"));
        assert!(access.has_permission("anything.at.all"));
        assert!(access.is_internal());
    }

    #[test]
    fn user_permissions_are_set_membership() {
        let access = ResolvedAccess::new(
            principal(SystemRole::User),
            None,
            None,
            key_set(&["dashboard.view"]),
        );
        assert!(access.has_permission("dashboard.view"));
        assert!(!access.has_permission("billing.view"));
    }

    #[test]
    fn external_profile_is_not_internal() {
        let access = ResolvedAccess::new(
            principal(SystemRole::User),
            None,
            Some(profile("p-1").with_profile_type(ProfileType::External)),
            key_set(&[]),
        );
        assert!(!access.is_internal());
    }
}
