use std::str::FromStr;

use repairhub_core::{AppError, WorkshopId};
use serde::{Deserialize, Serialize};

use crate::{EmployeeId, PrincipalId, ProfileId};

/// Job role held inside a workshop. Keys the granular permission matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobRole {
    /// Mechanic / technician.
    Tecnico,
    /// Workshop manager.
    Gerente,
    /// Sales.
    Comercial,
    /// Finance.
    Financeiro,
    /// Back office.
    Administrativo,
    /// Service advisor.
    Consultor,
    /// Parts and stock.
    Estoque,
    /// Driver / valet.
    Motorista,
    /// Anything not covered above.
    Outros,
}

impl JobRole {
    /// Returns a stable storage value for this job role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tecnico => "tecnico",
            Self::Gerente => "gerente",
            Self::Comercial => "comercial",
            Self::Financeiro => "financeiro",
            Self::Administrativo => "administrativo",
            Self::Consultor => "consultor",
            Self::Estoque => "estoque",
            Self::Motorista => "motorista",
            Self::Outros => "outros",
        }
    }

    /// Returns all known job roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[JobRole] = &[
            JobRole::Tecnico,
            JobRole::Gerente,
            JobRole::Comercial,
            JobRole::Financeiro,
            JobRole::Administrativo,
            JobRole::Consultor,
            JobRole::Estoque,
            JobRole::Motorista,
            JobRole::Outros,
        ];

        ALL
    }
}

impl FromStr for JobRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|role| role.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown job role value '{value}'")))
    }
}

/// Lifecycle state of an employee record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    /// Working member of the workshop.
    #[default]
    Active,
    /// Disabled; kept for history.
    Inactive,
    /// Invited, waiting for an administrator to approve the link.
    PendingApproval,
}

impl EmployeeStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::PendingApproval => "pending_approval",
        }
    }
}

impl FromStr for EmployeeStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "pending_approval" => Ok(Self::PendingApproval),
            _ => Err(AppError::Validation(format!(
                "unknown employee status value '{value}'"
            ))),
        }
    }
}

/// Organizational record binding a principal to a workshop and a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Employee identifier.
    pub id: EmployeeId,
    /// Linked principal; `None` while the employee has no login.
    pub principal_id: Option<PrincipalId>,
    /// Contact email, also used to match principals that were never linked by id.
    pub email: Option<String>,
    /// Workshop the employee belongs to.
    pub workshop_id: WorkshopId,
    /// Assigned access profile. Must reference an existing profile when set.
    pub profile_id: Option<ProfileId>,
    /// Job role inside the workshop.
    pub job_role: JobRole,
    /// Lifecycle state.
    pub status: EmployeeStatus,
}

impl Employee {
    /// Returns a copy of this record with the profile reference removed.
    #[must_use]
    pub fn without_profile(&self) -> Self {
        Self {
            profile_id: None,
            ..self.clone()
        }
    }
}
