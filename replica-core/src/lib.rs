//! Replica core library: domain types, configuration document, errors, and
//! destination-name derivation.
//!
//! Public API surface:
//! - [`types`]: newtypes, platform/profile enums, remote project records
//! - [`config`]: `config.yml` loading and validation
//! - [`secrets`]: platform tokens collected once at process start
//! - [`naming`]: [`derive_name`]
//! - [`error`]: [`ConfigError`], [`NamePatternError`]

pub mod config;
pub mod error;
pub mod naming;
pub mod secrets;
pub mod types;

pub use config::{
    AgencyConfig, GroupRef, ProjectConfig, ProtocolConfig, ProtocolSection, RegisterConfig,
    ReplicaConfig, Visibility,
};
pub use error::{ConfigError, NamePatternError};
pub use naming::derive_name;
pub use secrets::Secret;
pub use types::{
    ArtifactProfile, ImportStatus, Platform, ProjectName, RemoteProject, UserEntry,
};
