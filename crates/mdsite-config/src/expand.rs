//! Environment variable expansion for configuration strings.

use std::borrow::Cow;

use crate::ConfigError;

/// Marker of a braced variable reference.
const VAR_OPEN: &str = "${";

/// Expand `${VAR}` and `${VAR:-default}` references in a config value.
///
/// Values without `${` are returned unchanged, so a bare `$name` in a path
/// stays literal. `field` names the config key and is only used for error
/// messages.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains(VAR_OPEN) {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, lookup_var)
        .map(Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
}

/// Unset variable referenced without a default.
struct UnsetVar;

fn lookup_var(name: &str) -> Result<Option<String>, UnsetVar> {
    std::env::var(name).map(Some).map_err(|_| UnsetVar)
}
