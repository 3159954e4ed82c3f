use std::sync::Arc;

use repairhub_core::AppResult;
use repairhub_domain::{Employee, Principal};

use crate::{AccessEvent, AccessEventSink, EmployeeDirectory};

/// Maps a principal to its employee record.
#[derive(Clone)]
pub struct EmployeeLinkResolver {
    employees: Arc<dyn EmployeeDirectory>,
    events: Arc<dyn AccessEventSink>,
}

impl EmployeeLinkResolver {
    /// Creates a resolver over an employee directory.
    #[must_use]
    pub fn new(employees: Arc<dyn EmployeeDirectory>, events: Arc<dyn AccessEventSink>) -> Self {
        Self { employees, events }
    }

    /// Returns the principal's employee record, or `None` when there is none.
    ///
    /// Matches on the principal link first, then on email. An email match is
    /// only accepted when the employee is not linked to a different principal.
    pub async fn resolve(&self, principal: &Principal) -> AppResult<Option<Employee>> {
        if let Some(employee) = self
            .employees
            .find_employee_by_principal(principal.id())
            .await?
        {
            return Ok(Some(employee));
        }

        let by_email = if principal.email().trim().is_empty() {
            None
        } else {
            self.employees
                .find_employee_by_email(principal.email())
                .await?
                .filter(|employee| {
                    employee
                        .principal_id
                        .as_ref()
                        .is_none_or(|linked| linked == principal.id())
                })
        };

        match by_email {
            Some(employee) => {
                self.events.record(AccessEvent::EmployeeMatchedByEmail {
                    principal_id: principal.id().to_string(),
                    employee_id: employee.id.to_string(),
                });
                Ok(Some(employee))
            }
            None => {
                self.events.record(AccessEvent::EmployeeUnlinked {
                    principal_id: principal.id().to_string(),
                });
                Ok(None)
            }
        }
    }
}
