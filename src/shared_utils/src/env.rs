//! Typed access to process environment variables.

use std::{fmt::Display, str::FromStr};

use crate::config::ConfigError;

/// Reads an environment variable, returning a structured error if it's missing.
///
/// Empty values are treated as missing so that `DATABASE_URL=` in a shell
/// profile does not silently open a database named "".
pub fn get_env_var(name: &str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingEnvVar(name.to_string())),
    }
}

/// Reads an environment variable, falling back to `default` when unset or empty.
pub fn get_env_var_or(name: &str, default: &str) -> String {
    get_env_var(name).unwrap_or_else(|_| default.to_string())
}

/// Reads and parses an optional environment variable.
///
/// Returns `Ok(None)` when the variable is unset, and an
/// [`ConfigError::InvalidEnvVar`] when it is set to something `T` rejects.
pub fn parse_env_var<T>(name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    let Ok(raw) = get_env_var(name) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|e| ConfigError::InvalidEnvVar {
            name: name.to_string(),
            value: raw.clone(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own variable name; the process environment is shared.

    #[test]
    fn missing_variable_is_reported_by_name() {
        let err = get_env_var("SHARED_UTILS_TEST_SURELY_UNSET").unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingEnvVar("SHARED_UTILS_TEST_SURELY_UNSET".into())
        );
    }

    #[test]
    fn default_used_when_unset() {
        assert_eq!(get_env_var_or("SHARED_UTILS_TEST_DEFAULTED", "info"), "info");
    }

    #[test]
    fn parse_reports_invalid_values() {
        unsafe { std::env::set_var("SHARED_UTILS_TEST_BATCH", "lots") };
        let err = parse_env_var::<usize>("SHARED_UTILS_TEST_BATCH").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnvVar { ref name, .. } if name == "SHARED_UTILS_TEST_BATCH"
        ));

        unsafe { std::env::set_var("SHARED_UTILS_TEST_BATCH_OK", " 250 ") };
        assert_eq!(parse_env_var::<usize>("SHARED_UTILS_TEST_BATCH_OK").unwrap(), Some(250));

        assert_eq!(parse_env_var::<usize>("SHARED_UTILS_TEST_BATCH_UNSET").unwrap(), None);
    }
}
