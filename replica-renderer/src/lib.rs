//! # replica-renderer
//!
//! Pure generators for the artifacts materialized into a freshly replicated
//! project: one tera-rendered settings file per user, and semicolon-delimited
//! CSV registries for the `register` and `protocol` profiles.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use replica_core::AgencyConfig;
//! use replica_renderer::ArtifactGenerator;
//!
//! fn render(agency: &AgencyConfig) {
//!     if let Ok(generator) = ArtifactGenerator::new() {
//!         if let Ok(artifact) = generator.user_settings(agency, "alice") {
//!             println!("{}: {} bytes", artifact.path, artifact.content.len());
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod tables;

pub use context::SettingsContext;
pub use engine::{Artifact, ArtifactGenerator, ArtifactKind, ProtocolArtifacts};
pub use error::RenderError;
