use std::sync::Arc;

use repairhub_core::AppResult;
use repairhub_domain::{Employee, Profile, ProfileId};

use crate::{AccessEvent, AccessEventSink, EmployeeDirectory, ProfileRepository};

/// Outcome of looking up one profile reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileLookup {
    /// The profile exists and is structurally valid.
    Found(Profile),
    /// No profile exists under the reference.
    Missing,
    /// A record exists but cannot be used.
    Invalid(String),
}

/// Outcome of repairing a dangling profile reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelfHealOutcome {
    /// The reference was cleared.
    Cleared,
    /// Clearing failed; the next resolution will try again.
    Failed(String),
}

/// Loads employee profiles and repairs references to unusable ones.
#[derive(Clone)]
pub struct ProfileLoader {
    profiles: Arc<dyn ProfileRepository>,
    employees: Arc<dyn EmployeeDirectory>,
    events: Arc<dyn AccessEventSink>,
}

impl ProfileLoader {
    /// Creates a loader.
    #[must_use]
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        employees: Arc<dyn EmployeeDirectory>,
        events: Arc<dyn AccessEventSink>,
    ) -> Self {
        Self {
            profiles,
            employees,
            events,
        }
    }

    /// Looks up a profile and validates its structure.
    pub async fn lookup(&self, profile_id: &ProfileId) -> AppResult<ProfileLookup> {
        let Some(record) = self.profiles.find_profile(profile_id).await? else {
            return Ok(ProfileLookup::Missing);
        };

        Ok(match Profile::try_from(record) {
            Ok(profile) => ProfileLookup::Found(profile),
            Err(error) => ProfileLookup::Invalid(error.to_string()),
        })
    }

    /// Returns the employee's profile, or `None` when it has none.
    ///
    /// A reference to a missing or malformed profile is treated as no profile
    /// and repaired through [`ProfileLoader::heal_dangling_reference`]. Storage
    /// errors during the lookup itself are returned to the caller.
    pub async fn load_for_employee(&self, employee: &Employee) -> AppResult<Option<Profile>> {
        let Some(profile_id) = employee.profile_id.as_ref() else {
            return Ok(None);
        };

        let reason = match self.lookup(profile_id).await? {
            ProfileLookup::Found(profile) => return Ok(Some(profile)),
            ProfileLookup::Missing => "profile does not exist".to_owned(),
            ProfileLookup::Invalid(reason) => reason,
        };

        self.events.record(AccessEvent::ProfileReferenceBroken {
            employee_id: employee.id.to_string(),
            profile_id: profile_id.to_string(),
            reason,
        });
        self.heal_dangling_reference(employee, profile_id).await;

        Ok(None)
    }

    /// Clears a dangling profile reference. Best-effort: failures are reported
    /// as events and never returned as errors.
    pub async fn heal_dangling_reference(
        &self,
        employee: &Employee,
        profile_id: &ProfileId,
    ) -> SelfHealOutcome {
        match self.employees.clear_profile_ref(&employee.id).await {
            Ok(()) => {
                self.events.record(AccessEvent::ProfileReferenceCleared {
                    employee_id: employee.id.to_string(),
                    profile_id: profile_id.to_string(),
                });
                SelfHealOutcome::Cleared
            }
            Err(error) => {
                self.events.record(AccessEvent::SelfHealFailed {
                    employee_id: employee.id.to_string(),
                    profile_id: profile_id.to_string(),
                    error: error.to_string(),
                });
                SelfHealOutcome::Failed(error.to_string())
            }
        }
    }
}
