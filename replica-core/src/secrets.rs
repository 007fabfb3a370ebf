//! Platform tokens, collected once at process start.

use std::fmt;

use crate::error::ConfigError;
use crate::types::Platform;

/// An API token. `Debug` and `Display` never print the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Turn an environment lookup result into the token for `platform`.
///
/// Absent or blank values are `ConfigError::MissingSecret`.
pub fn require_token(platform: Platform, value: Option<String>) -> Result<Secret, ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(Secret(v.trim().to_string())),
        _ => Err(ConfigError::MissingSecret {
            key: platform.token_env_key(),
        }),
    }
}

/// Read the token for `platform` from the process environment.
pub fn token_from_env(platform: Platform) -> Result<Secret, ConfigError> {
    require_token(platform, std::env::var(platform.token_env_key()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_is_redacted() {
        let secret = Secret::new("glpat-abcdef");
        assert_eq!(format!("{secret:?}"), "Secret(***)");
        assert_eq!(secret.to_string(), "***");
        assert_eq!(secret.expose(), "glpat-abcdef");
    }

    #[test]
    fn blank_token_is_missing() {
        let err = require_token(Platform::GitHub, Some("   ".to_string())).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret { key: "GITHUB_TOKEN" }));
    }

    #[test]
    fn absent_token_names_the_variable() {
        let err = require_token(Platform::GitLab, None).unwrap_err();
        assert!(err.to_string().contains("GITLAB_TOKEN"));
    }
}
