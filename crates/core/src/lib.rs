//! Shared primitives for all RepairHub access crates.

#![forbid(unsafe_code)]

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Result type used across RepairHub crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string with surrounding whitespace removed.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for NonEmptyString {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl Display for NonEmptyString {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Workshop identifier used as the tenant partition key for employee records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkshopId(Uuid);

impl WorkshopId {
    /// Creates a random workshop identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a workshop identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for WorkshopId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for WorkshopId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Error categories shared by ports, adapters and the access engine.
///
/// The engine never surfaces these to view code; they become deny verdicts.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed identifier, key or configuration value.
    #[error("validation error: {0}")]
    Validation(String),

    /// A record the caller expected is gone.
    #[error("not found: {0}")]
    NotFound(String),

    /// A write would break a uniqueness rule, e.g. double employee links.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Nobody is signed in.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Signed in but not allowed.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Storage or backend failure.
    #[error("internal error: {0}")]
    Internal(String),
}
