//! Error types for replica-core.

use std::path::PathBuf;

use thiserror::Error;

/// Missing or invalid local configuration or secrets.
///
/// Every variant is raised before the first remote call of a run.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file does not exist at the expected path.
    #[error("configuration file '{}' not found", .path.display())]
    NotFound { path: PathBuf },

    /// Underlying I/O failure while reading the configuration file.
    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error, including file path and line context from serde_yaml.
    #[error("failed to parse configuration at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A required top-level section is absent.
    #[error("section '{0}' missing from the configuration file")]
    MissingSection(&'static str),

    /// One or more agency fields are absent or empty.
    #[error(
        "agency_config must define and populate: short_name_template, category_id, agency_ipa_code. Missing: {}",
        .missing.join(", ")
    )]
    MissingAgencyFields { missing: Vec<&'static str> },

    /// A platform-specific `project_config` key is absent or empty.
    #[error("'{0}' missing from the configuration file")]
    MissingField(&'static str),

    /// The `users` section is absent or not a mapping.
    #[error("users section missing or invalid")]
    InvalidUsers,

    /// `users.number` is absent, non-numeric, or not positive.
    #[error("users.number must be greater than 0")]
    InvalidUserCount,

    /// `users.userN` is absent or has an empty `name`.
    #[error("missing data for '{key}' or empty name field")]
    MissingUser { key: String },

    /// A platform token was not provided through the environment.
    #[error("environment variable '{key}' not set; set it as a secret and retry")]
    MissingSecret { key: &'static str },
}

/// The origin project name lacks the trailing `AAA-BB` style suffix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("origin project '{name}' does not end with a suffix like AAA-BB")]
pub struct NamePatternError {
    pub name: String,
}
