//! `config.yml`: the structured document driving a run.
//!
//! # Layout
//!
//! ```text
//! agency_config:      (required) short_name_template, category_id, agency_ipa_code
//! project_config:     (required) platform addressing + origin name + tuning
//! users:              (optional) number + user1..userN
//! register_config:    (optional) default_privacy_template
//! protocol_config:    (optional) AOO / UO sections
//! ```
//!
//! # API pattern
//!
//! - `load_config_at(path)`: explicit path; used by tests with `TempDir`
//! - `load_config_str(text, path)`: parse an in-memory document
//!
//! Loading only checks that the two required sections exist. Field-level
//! validation (`AgencyConfig::validate`, `ReplicaConfig::users`,
//! `ProjectConfig::require_for`) runs in the workflow before any remote call.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde_yaml::Value;

use crate::error::ConfigError;
use crate::types::{Platform, UserEntry};

pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_IMPORT_TIMEOUT_SECS: u64 = 180;
pub const DEFAULT_IMPORT_POLL_SECS: u64 = 5;

// ---------------------------------------------------------------------------
// 1. Root document
// ---------------------------------------------------------------------------

/// Validated-on-load root of `config.yml`.
#[derive(Debug, Clone)]
pub struct ReplicaConfig {
    pub agency: AgencyConfig,
    pub project: ProjectConfig,
    /// Raw `users` section; interpreted by [`ReplicaConfig::users`].
    pub users: Option<Value>,
    pub register: RegisterConfig,
    pub protocol: ProtocolConfig,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    agency_config: Option<AgencyConfig>,
    project_config: Option<ProjectConfig>,
    users: Option<Value>,
    register_config: Option<Value>,
    protocol_config: Option<Value>,
}

impl ReplicaConfig {
    /// Positional user list: `users.number` must be positive and every
    /// `user1..userN` entry must carry a non-empty `name`.
    pub fn users(&self) -> Result<Vec<UserEntry>, ConfigError> {
        let section = match &self.users {
            Some(Value::Mapping(map)) => map,
            _ => return Err(ConfigError::InvalidUsers),
        };

        let count = section
            .get("number")
            .map(lenient_count)
            .unwrap_or(0);
        if count <= 0 {
            return Err(ConfigError::InvalidUserCount);
        }

        let mut users = Vec::new();
        for index in 1..=count as usize {
            let key = format!("user{index}");
            let name = section
                .get(key.as_str())
                .and_then(|entry| entry.get("name"))
                .map(scalar_to_string)
                .unwrap_or_default();
            if name.trim().is_empty() {
                return Err(ConfigError::MissingUser { key });
            }
            users.push(UserEntry { index, name });
        }
        Ok(users)
    }
}

/// Load and parse the configuration file at `path`.
///
/// Returns `ConfigError::NotFound` if absent, `ConfigError::Parse` (with
/// path + line context) if malformed, and `ConfigError::MissingSection` if
/// `agency_config` or `project_config` is absent.
pub fn load_config_at(path: &Path) -> Result<ReplicaConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_config_str(&contents, path)
}

/// Parse an in-memory configuration document; `path` is only used for
/// error context.
pub fn load_config_str(contents: &str, path: &Path) -> Result<ReplicaConfig, ConfigError> {
    // An empty document is an empty mapping, not a parse error.
    let raw: RawConfig = if contents.trim().is_empty() {
        RawConfig::default()
    } else {
        serde_yaml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?
    };

    let agency = raw
        .agency_config
        .ok_or(ConfigError::MissingSection("agency_config"))?;
    let project = raw
        .project_config
        .ok_or(ConfigError::MissingSection("project_config"))?;

    Ok(ReplicaConfig {
        agency,
        project,
        users: raw.users,
        register: RegisterConfig::from_value(raw.register_config),
        protocol: ProtocolConfig::from_value(raw.protocol_config),
    })
}

// ---------------------------------------------------------------------------
// 2. agency_config
// ---------------------------------------------------------------------------

/// Agency identity interpolated into every generated artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AgencyConfig {
    /// Replacement suffix, e.g. `AAA-BB`.
    #[serde(default, deserialize_with = "de_scalar_string")]
    pub short_name_template: String,
    #[serde(default, deserialize_with = "de_lenient_int")]
    pub category_id: Option<i64>,
    #[serde(default, deserialize_with = "de_scalar_string")]
    pub agency_ipa_code: String,
}

impl AgencyConfig {
    /// All three fields must be populated; a `category_id` of `0` counts as
    /// missing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut missing = Vec::new();
        if self.short_name_template.trim().is_empty() {
            missing.push("short_name_template");
        }
        if matches!(self.category_id, None | Some(0)) {
            missing.push("category_id");
        }
        if self.agency_ipa_code.trim().is_empty() {
            missing.push("agency_ipa_code");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingAgencyFields { missing })
        }
    }
}

// ---------------------------------------------------------------------------
// 3. project_config
// ---------------------------------------------------------------------------

/// A GitLab group addressed by numeric id or by full path.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum GroupRef {
    Id(u64),
    Path(String),
}

impl fmt::Display for GroupRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupRef::Id(id) => write!(f, "{id}"),
            GroupRef::Path(path) => f.write_str(path),
        }
    }
}

/// Visibility requested for the destination project.
///
/// Anything other than `public` or `internal` is treated as `private`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum Visibility {
    #[default]
    Private,
    Internal,
    Public,
}

impl From<String> for Visibility {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Visibility::Public,
            "internal" => Visibility::Internal,
            _ => Visibility::Private,
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Private => write!(f, "private"),
            Visibility::Internal => write!(f, "internal"),
            Visibility::Public => write!(f, "public"),
        }
    }
}

/// Hosting-specific addressing for both platforms.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub gitlab_group_id: Option<GroupRef>,
    #[serde(default)]
    pub gitlab_url: Option<String>,
    #[serde(default)]
    pub gitlab_username: Option<String>,
    /// Origin project name; used on both platforms.
    #[serde(default)]
    pub gitlab_origin_remote_name: Option<String>,
    #[serde(default = "default_branch")]
    pub git_default_branch: String,
    #[serde(default)]
    pub gitlab_visibility: Visibility,
    #[serde(default)]
    pub github_owner: Option<String>,
    #[serde(default)]
    pub github_visibility: Visibility,
    #[serde(default = "default_github_api_url")]
    pub github_api_url: String,
    #[serde(default = "default_import_timeout_secs")]
    pub import_timeout_secs: u64,
    #[serde(default = "default_import_poll_secs")]
    pub import_poll_secs: u64,
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

fn default_github_api_url() -> String {
    DEFAULT_GITHUB_API_URL.to_string()
}

fn default_import_timeout_secs() -> u64 {
    DEFAULT_IMPORT_TIMEOUT_SECS
}

fn default_import_poll_secs() -> u64 {
    DEFAULT_IMPORT_POLL_SECS
}

impl ProjectConfig {
    /// Trimmed origin project name.
    pub fn origin_name(&self) -> Result<&str, ConfigError> {
        non_empty(
            self.gitlab_origin_remote_name.as_deref(),
            "project_config.gitlab_origin_remote_name",
        )
    }

    /// Check the keys `platform` needs before any remote call.
    pub fn require_for(&self, platform: Platform) -> Result<(), ConfigError> {
        match platform {
            Platform::GitLab => {
                non_empty(self.gitlab_url.as_deref(), "project_config.gitlab_url")?;
                non_empty(
                    self.gitlab_username.as_deref(),
                    "project_config.gitlab_username",
                )?;
                self.gitlab_group()?;
            }
            Platform::GitHub => {
                self.github_owner()?;
            }
        }
        Ok(())
    }

    pub fn gitlab_group(&self) -> Result<&GroupRef, ConfigError> {
        match &self.gitlab_group_id {
            Some(GroupRef::Path(path)) if path.trim().is_empty() => {
                Err(ConfigError::MissingField("project_config.gitlab_group_id"))
            }
            Some(group) => Ok(group),
            None => Err(ConfigError::MissingField("project_config.gitlab_group_id")),
        }
    }

    pub fn github_owner(&self) -> Result<&str, ConfigError> {
        non_empty(self.github_owner.as_deref(), "project_config.github_owner")
    }

    /// Trimmed default branch; falls back to `main` when blank.
    pub fn default_branch(&self) -> &str {
        match self.git_default_branch.trim() {
            "" => DEFAULT_BRANCH,
            branch => branch,
        }
    }

    pub fn import_timeout(&self) -> Duration {
        Duration::from_secs(self.import_timeout_secs)
    }

    pub fn import_poll_interval(&self) -> Duration {
        Duration::from_secs(self.import_poll_secs)
    }
}

fn non_empty<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, ConfigError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::MissingField(field)),
    }
}

// ---------------------------------------------------------------------------
// 4. register_config
// ---------------------------------------------------------------------------

/// `register_config.default_privacy_template`: flat field → value map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterConfig {
    pub template: BTreeMap<String, Value>,
}

impl RegisterConfig {
    fn from_value(value: Option<Value>) -> Self {
        let template = value
            .as_ref()
            .and_then(|v| v.get("default_privacy_template"))
            .and_then(Value::as_mapping)
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| k.as_str().map(|k| (k.to_string(), v.clone())))
                    .collect()
            })
            .unwrap_or_default();
        Self { template }
    }

    /// Field value as text; absent or null renders as the empty string.
    pub fn field(&self, key: &str) -> String {
        self.template.get(key).map(scalar_to_string).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// 5. protocol_config
// ---------------------------------------------------------------------------

/// `protocol_config`: the AOO and UO sections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProtocolConfig {
    pub aoo: ProtocolSection,
    pub uo: ProtocolSection,
}

impl ProtocolConfig {
    fn from_value(value: Option<Value>) -> Self {
        let section = |name: &str| {
            value
                .as_ref()
                .and_then(|v| v.get(name))
                .and_then(Value::as_mapping)
                .map(|map| ProtocolSection {
                    number: map.get("number").cloned(),
                    entries: map
                        .iter()
                        .filter_map(|(k, v)| k.as_str().map(|k| (k.to_string(), v.clone())))
                        .collect(),
                })
                .unwrap_or_default()
        };
        Self {
            aoo: section("AOO"),
            uo: section("UO"),
        }
    }
}

/// One positionally-keyed section (`AOO1..AOOn` or `UO1..UOn`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProtocolSection {
    number: Option<Value>,
    entries: BTreeMap<String, Value>,
}

impl ProtocolSection {
    /// Declared row count; absent, null, non-numeric, or negative is zero.
    pub fn count(&self) -> usize {
        self.number
            .as_ref()
            .map(lenient_count)
            .unwrap_or(0)
            .max(0) as usize
    }

    /// Value of `field` inside entry `entry`; absent or null is empty.
    pub fn field(&self, entry: &str, field: &str) -> String {
        self.entries
            .get(entry)
            .and_then(|e| e.get(field))
            .map(scalar_to_string)
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Scalar coercion
// ---------------------------------------------------------------------------

/// Render a YAML scalar as text. Null and non-scalars become empty.
pub fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => String::new(),
    }
}

/// Integer from a number or numeric string; anything else is `0`.
fn lenient_count(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn de_scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_to_string(&value))
}

fn de_lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        Value::String(ref s) if s.trim().is_empty() => None,
        Value::Number(_) | Value::String(_) => Some(lenient_count(&value)),
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const MINIMAL: &str = r#"
agency_config:
  short_name_template: "ZZ-99"
  category_id: 4
  agency_ipa_code: "c_h501"
project_config:
  gitlab_group_id: 123
  gitlab_url: "https://gitlab.example.com"
  gitlab_username: "deployer"
  gitlab_origin_remote_name: "etl-agency-AAA-BB"
"#;

    fn parse(text: &str) -> Result<ReplicaConfig, ConfigError> {
        load_config_str(text, &PathBuf::from("config.yml"))
    }

    #[test]
    fn minimal_document_applies_defaults() {
        let cfg = parse(MINIMAL).expect("parse");
        assert_eq!(cfg.project.default_branch(), "main");
        assert_eq!(cfg.project.github_api_url, DEFAULT_GITHUB_API_URL);
        assert_eq!(cfg.project.import_timeout(), Duration::from_secs(180));
        assert_eq!(cfg.project.import_poll_interval(), Duration::from_secs(5));
        assert_eq!(cfg.project.gitlab_group_id, Some(GroupRef::Id(123)));
        assert_eq!(cfg.project.github_visibility, Visibility::Private);
        assert_eq!(cfg.agency.category_id, Some(4));
    }

    #[test]
    fn missing_agency_section_is_reported() {
        let err = parse("project_config: {}\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection("agency_config")));
    }

    #[test]
    fn empty_document_reports_missing_section() {
        let err = parse("").unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection("agency_config")));
    }

    #[test]
    fn agency_validation_lists_every_missing_field() {
        let agency = AgencyConfig {
            short_name_template: "  ".to_string(),
            category_id: Some(0),
            agency_ipa_code: "c_h501".to_string(),
        };
        let err = agency.validate().unwrap_err();
        match err {
            ConfigError::MissingAgencyFields { missing } => {
                assert_eq!(missing, vec!["short_name_template", "category_id"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn category_id_accepts_numeric_string() {
        let text = MINIMAL.replace("category_id: 4", "category_id: \"12\"");
        let cfg = parse(&text).expect("parse");
        assert_eq!(cfg.agency.category_id, Some(12));
    }

    #[test]
    fn group_path_is_accepted() {
        let text = MINIMAL.replace("gitlab_group_id: 123", "gitlab_group_id: \"agencies/etl\"");
        let cfg = parse(&text).expect("parse");
        assert_eq!(
            cfg.project.gitlab_group().expect("group"),
            &GroupRef::Path("agencies/etl".to_string())
        );
    }

    #[test]
    fn github_requires_owner() {
        let cfg = parse(MINIMAL).expect("parse");
        let err = cfg.project.require_for(Platform::GitHub).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("project_config.github_owner")));
        cfg.project.require_for(Platform::GitLab).expect("gitlab keys present");
    }

    #[test]
    fn users_are_returned_in_index_order() {
        let text = format!(
            "{MINIMAL}users:\n  number: 2\n  user1:\n    name: alice\n  user2:\n    name: bob\n"
        );
        let users = parse(&text).expect("parse").users().expect("users");
        let names: Vec<_> = users.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob"]);
        assert_eq!(users[1].index, 2);
    }

    #[test]
    fn users_gap_is_rejected() {
        let text = format!("{MINIMAL}users:\n  number: 2\n  user1:\n    name: alice\n");
        let err = parse(&text).expect("parse").users().unwrap_err();
        assert!(matches!(err, ConfigError::MissingUser { ref key } if key == "user2"));
    }

    #[test]
    fn oversized_user_count_reports_first_missing_user() {
        let text = format!(
            "{MINIMAL}users:\n  number: 9223372036854775807\n  user1:\n    name: alice\n"
        );
        let err = parse(&text).expect("parse").users().unwrap_err();
        assert!(matches!(err, ConfigError::MissingUser { ref key } if key == "user2"));
    }

    #[test]
    fn huge_import_timeout_is_kept_as_configured() {
        let text = MINIMAL.replace(
            "gitlab_username",
            "import_timeout_secs: 18446744073709551615\n  gitlab_username",
        );
        let cfg = parse(&text).expect("parse");
        assert_eq!(cfg.project.import_timeout(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn users_non_numeric_count_is_rejected() {
        let text = format!("{MINIMAL}users:\n  number: many\n");
        let err = parse(&text).expect("parse").users().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUserCount));
    }

    #[test]
    fn users_absent_is_invalid() {
        let err = parse(MINIMAL).expect("parse").users().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUsers));
    }

    #[test]
    fn register_fields_coerce_scalars() {
        let text = format!(
            "{MINIMAL}register_config:\n  default_privacy_template:\n    profileName: Studio\n    vatNumber: 12345\n    picture: ~\n"
        );
        let cfg = parse(&text).expect("parse");
        assert_eq!(cfg.register.field("profileName"), "Studio");
        assert_eq!(cfg.register.field("vatNumber"), "12345");
        assert_eq!(cfg.register.field("picture"), "");
        assert_eq!(cfg.register.field("gender"), "");
    }

    #[test]
    fn protocol_sections_default_to_zero_rows() {
        let cfg = parse(MINIMAL).expect("parse");
        assert_eq!(cfg.protocol.aoo.count(), 0);
        assert_eq!(cfg.protocol.uo.count(), 0);
    }

    #[test]
    fn protocol_section_reads_entry_fields() {
        let text = format!(
            "{MINIMAL}protocol_config:\n  AOO:\n    number: 1\n    AOO1:\n      aoo1_name: Protocollo\n  UO:\n    number: 0\n"
        );
        let cfg = parse(&text).expect("parse");
        assert_eq!(cfg.protocol.aoo.count(), 1);
        assert_eq!(cfg.protocol.aoo.field("AOO1", "aoo1_name"), "Protocollo");
        assert_eq!(cfg.protocol.aoo.field("AOO1", "aoo1_unicode"), "");
        assert_eq!(cfg.protocol.uo.count(), 0);
    }
}
