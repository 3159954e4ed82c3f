use std::env;
use std::str::FromStr;

use repairhub_application::{INACTIVE_CUSTOM_ROLE_POLICY, InactiveRolePolicy};
use repairhub_core::{AppError, AppResult};
use repairhub_domain::{DEFAULT_PAGE_ACCESS, PageAccessPolicy, PrincipalId};

/// One `resource:action` pair to evaluate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GranularCheck {
    pub resource: String,
    pub action: String,
}

#[derive(Debug, Clone)]
pub struct InspectorConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub principal_id: PrincipalId,
    pub granular_checks: Vec<GranularCheck>,
    pub default_page_access: PageAccessPolicy,
    pub inactive_custom_roles: InactiveRolePolicy,
}

impl InspectorConfig {
    pub fn load() -> AppResult<Self> {
        let database_url = required_env("DATABASE_URL")?;
        let principal_id = PrincipalId::new(required_env("INSPECT_PRINCIPAL_ID")?)?;
        let database_max_connections = parse_env_u32("DATABASE_MAX_CONNECTIONS", 5)?;
        let raw_checks = env::var("INSPECT_GRANULAR_CHECKS").unwrap_or_default();
        let granular_checks = parse_granular_checks(raw_checks.as_str())?;
        let default_page_access = parse_policy(
            "ACCESS_DEFAULT_PAGE_POLICY",
            env::var("ACCESS_DEFAULT_PAGE_POLICY").ok(),
            DEFAULT_PAGE_ACCESS,
        )?;
        let inactive_custom_roles = parse_policy(
            "ACCESS_INACTIVE_ROLE_POLICY",
            env::var("ACCESS_INACTIVE_ROLE_POLICY").ok(),
            INACTIVE_CUSTOM_ROLE_POLICY,
        )?;

        if database_max_connections == 0 {
            return Err(AppError::Validation(
                "DATABASE_MAX_CONNECTIONS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            database_url,
            database_max_connections,
            principal_id,
            granular_checks,
            default_page_access,
            inactive_custom_roles,
        })
    }
}

fn required_env(name: &str) -> AppResult<String> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn parse_env_u32(name: &str, default: u32) -> AppResult<u32> {
    match env::var(name) {
        Ok(value) => value.parse::<u32>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}

fn parse_policy<T>(name: &str, value: Option<String>, default: T) -> AppResult<T>
where
    T: FromStr<Err = AppError>,
{
    let Some(value) = value.filter(|value| !value.trim().is_empty()) else {
        return Ok(default);
    };

    T::from_str(value.trim().to_ascii_lowercase().as_str())
        .map_err(|error| AppError::Validation(format!("invalid {name} value: {error}")))
}

/// Parses a comma-separated `resource:action` list. Blank entries are skipped.
fn parse_granular_checks(raw: &str) -> AppResult<Vec<GranularCheck>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once(':') {
            Some((resource, action))
                if !resource.trim().is_empty() && !action.trim().is_empty() =>
            {
                Ok(GranularCheck {
                    resource: resource.trim().to_owned(),
                    action: action.trim().to_owned(),
                })
            }
            _ => Err(AppError::Validation(format!(
                "invalid INSPECT_GRANULAR_CHECKS entry '{entry}', expected resource:action"
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use repairhub_application::InactiveRolePolicy;
    use repairhub_domain::PageAccessPolicy;

    use super::{GranularCheck, parse_granular_checks, parse_policy};

    #[test]
    fn granular_checks_are_split_and_trimmed() {
        let checks = parse_granular_checks(" patio:read, estoque : write ,,");

        assert_eq!(
            checks.ok(),
            Some(vec![
                GranularCheck {
                    resource: "patio".to_owned(),
                    action: "read".to_owned(),
                },
                GranularCheck {
                    resource: "estoque".to_owned(),
                    action: "write".to_owned(),
                },
            ])
        );
    }

    #[test]
    fn granular_check_without_action_is_rejected() {
        assert!(parse_granular_checks("patio").is_err());
        assert!(parse_granular_checks("patio:").is_err());
        assert!(parse_granular_checks("").is_ok_and(|checks| checks.is_empty()));
    }

    #[test]
    fn policies_fall_back_to_defaults_and_reject_unknown_values() {
        assert_eq!(
            parse_policy("P", None, PageAccessPolicy::Allow).ok(),
            Some(PageAccessPolicy::Allow)
        );
        assert_eq!(
            parse_policy("P", Some(" DENY ".to_owned()), PageAccessPolicy::Allow).ok(),
            Some(PageAccessPolicy::Deny)
        );
        assert_eq!(
            parse_policy("P", Some("exclude".to_owned()), InactiveRolePolicy::Include).ok(),
            Some(InactiveRolePolicy::Exclude)
        );
        assert!(parse_policy("P", Some("maybe".to_owned()), InactiveRolePolicy::Include).is_err());
    }
}
