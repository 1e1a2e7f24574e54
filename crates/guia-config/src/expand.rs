//! Environment variable expansion for configuration strings.
//!
//! - `${VAR}` expands to the value of VAR and fails if it is unset
//! - `${VAR:-default}` falls back to `default` when VAR is unset
//!
//! Values without any `${` are returned untouched, bare `$` included. Once a
//! value contains `${`, the whole value is expanded and a bare `$VAR` in it
//! is expanded (and required) as well.

use crate::ConfigError;

/// Expand `${...}` references in `value`. `field` names the config key in errors.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var).map(Some).map_err(|_| UnsetVar(var.to_owned()))
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

/// Expand an optional value in place.
pub(crate) fn expand_opt(value: &mut Option<String>, field: &str) -> Result<(), ConfigError> {
    if let Some(inner) = value {
        *inner = expand_env(inner, field)?;
    }
    Ok(())
}

/// Name of a variable that was referenced but not set.
struct UnsetVar(String);
