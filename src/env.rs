//! Environment variable resolution.

use tracing::trace;

use crate::error::AppConfigError;
use crate::property::PropertyList;
use crate::schema::Settings;

/// Write every property whose environment variable is set into `target`.
///
/// The variable name comes from [`PropertyList::env_variable`]. A variable
/// that is set counts even when empty. Values are parsed according to the
/// property's kind.
///
/// Takes a lookup function so tests can pass synthetic data instead of the
/// process environment.
pub(crate) fn apply_env<T: Settings>(
    properties: &PropertyList,
    lookup: impl Fn(&str) -> Option<String>,
    target: &mut T,
) -> Result<(), AppConfigError> {
    for property in properties {
        let variable = properties.env_variable(property);
        if variable.is_empty() {
            continue;
        }
        let Some(raw) = lookup(&variable) else {
            continue;
        };

        let invalid = |reason: String| AppConfigError::InvalidEnvironment {
            variable: variable.clone(),
            value: raw.clone(),
            expected: property.kind(),
            reason,
        };
        let value = property.kind().parse(&raw).map_err(|e| invalid(e.reason))?;
        trace!(%variable, field = property.name(), "applying environment variable");
        properties.write(target, property, value, invalid)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{Database, Deep, TestConfig};
    use crate::schema::Kind;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    fn apply(pairs: &[(&str, &str)], target: &mut TestConfig) -> Result<(), AppConfigError> {
        let properties = PropertyList::of::<TestConfig>()?;
        apply_env(&properties, vars(pairs), target)
    }

    #[test]
    fn explicit_and_derived_names() {
        let mut config = TestConfig::default();
        apply(
            &[
                ("APP_HOST", "example.org"),
                ("PORT", "9000"),
                ("DEBUG", "true"),
                ("RATIO", "0.25"),
                ("DATABASE_URL", "pg://db"),
                ("DATABASE_POOL_SIZE", "16"),
            ],
            &mut config,
        )
        .unwrap();
        assert_eq!(config.host, "example.org");
        assert_eq!(config.port, 9000);
        assert!(config.debug);
        assert_eq!(config.ratio, 0.25);
        assert_eq!(config.database.url.as_deref(), Some("pg://db"));
        assert_eq!(config.database.pool_size, 16);
    }

    #[test]
    fn tagged_field_ignores_derived_name() {
        let mut config = TestConfig::default();
        apply(&[("HOST", "ignored")], &mut config).unwrap();
        assert_eq!(config.host, "localhost");
    }

    #[test]
    fn unset_variables_leave_fields_alone() {
        let mut config = TestConfig {
            port: 1234,
            ..TestConfig::default()
        };
        apply(&[], &mut config).unwrap();
        assert_eq!(config.port, 1234);
    }

    #[test]
    fn empty_value_counts_for_strings() {
        let mut config = TestConfig::default();
        apply(&[("APP_HOST", "")], &mut config).unwrap();
        assert_eq!(config.host, "");
    }

    #[test]
    fn empty_value_is_invalid_for_numbers() {
        let mut config = TestConfig::default();
        let err = apply(&[("PORT", "")], &mut config).unwrap_err();
        assert!(matches!(err, AppConfigError::InvalidEnvironment { .. }));
    }

    #[test]
    fn nested_names_two_levels_deep() {
        let properties = PropertyList::of::<Deep>().unwrap();
        let mut deep = Deep::default();
        apply_env(
            &properties,
            vars(&[("OUTER_INNER_LOG_LEVEL", "debug")]),
            &mut deep,
        )
        .unwrap();
        assert_eq!(deep.Outer.Inner.logLevel, "debug");
    }

    #[test]
    fn conversion_error_names_variable() {
        let mut config = TestConfig::default();
        let err = apply(&[("PORT", "eighty")], &mut config).unwrap_err();
        match &err {
            AppConfigError::InvalidEnvironment {
                variable,
                value,
                expected,
                ..
            } => {
                assert_eq!(variable, "PORT");
                assert_eq!(value, "eighty");
                assert_eq!(*expected, Kind::Uint);
            }
            other => panic!("Expected InvalidEnvironment, got {other:?}"),
        }
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn narrowing_overflow_is_invalid() {
        let mut config = TestConfig::default();
        let err = apply(&[("PORT", "70000")], &mut config).unwrap_err();
        assert!(matches!(err, AppConfigError::InvalidEnvironment { .. }));
    }

    #[test]
    fn absent_option_is_unaddressable() {
        let mut config = TestConfig::default();
        let err = apply(&[("STANDBY_URL", "pg://standby")], &mut config).unwrap_err();
        match err {
            AppConfigError::Unaddressable { field } => assert_eq!(field, "replica.url"),
            other => panic!("Expected Unaddressable, got {other:?}"),
        }
    }

    #[test]
    fn present_option_is_written() {
        let mut config = TestConfig {
            replica: Some(Database::default()),
            ..TestConfig::default()
        };
        apply(&[("STANDBY_URL", "pg://standby")], &mut config).unwrap();
        assert_eq!(
            config.replica.unwrap().url.as_deref(),
            Some("pg://standby")
        );
    }
}
