use std::fmt::{Display, Formatter};
use std::str::FromStr;

use repairhub_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(NonEmptyString);

        impl $name {
            /// Creates an identifier from a backend-issued value.
            pub fn new(value: impl Into<String>) -> AppResult<Self> {
                NonEmptyString::new(value).map(Self)
            }

            /// Creates a random identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self(generated_value())
            }

            /// Returns the identifier as stored by the backend.
            #[must_use]
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl Display for $name {
            fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
                formatter.write_str(self.0.as_str())
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Self::new(value)
            }
        }
    };
}

fn generated_value() -> NonEmptyString {
    // A v4 UUID rendering is never blank.
    match NonEmptyString::new(Uuid::new_v4().to_string()) {
        Ok(value) => value,
        Err(_) => unreachable!("uuid rendering is non-empty"),
    }
}

string_id!(
    /// Identifier of an authenticated principal.
    PrincipalId
);
string_id!(
    /// Identifier of an employee record.
    EmployeeId
);
string_id!(
    /// Identifier of an access profile.
    ProfileId
);
string_id!(
    /// Identifier of a reusable custom role.
    CustomRoleId
);
