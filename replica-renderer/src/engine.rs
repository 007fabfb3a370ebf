//! Artifact generation: [`ArtifactKind`] and [`ArtifactGenerator`].
//!
//! # Path mapping (relative to the project root)
//!
//! | Artifact         | Output path                              | Produced when            |
//! |------------------|------------------------------------------|--------------------------|
//! | UserSettings     | `settings/<username>_etlSetting.yml`     | once per configured user |
//! | PrivacyTemplate  | `settings/privacy_default_template.csv`  | `register` profile       |
//! | Aoo              | `settings/AOO.csv`                       | `protocol`, AOO rows > 0 |
//! | Uo               | `settings/UO.csv`                        | `protocol`, UO rows > 0  |

use tera::Tera;

use replica_core::{AgencyConfig, ProtocolConfig, RegisterConfig};

use crate::context::SettingsContext;
use crate::error::RenderError;
use crate::tables::{self, REGISTER_HEADERS};

/// Directory (relative to the project root) receiving every artifact.
pub const SETTINGS_DIR: &str = "settings";

const SETTINGS_TEMPLATE: &str = "settings/etl_setting.yml.tera";

const TPLS: &[(&str, &str)] = &[(
    SETTINGS_TEMPLATE,
    include_str!("templates/etl_setting.yml.tera"),
)];

// ---------------------------------------------------------------------------
// ArtifactKind
// ---------------------------------------------------------------------------

/// Every file the generator can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    UserSettings,
    PrivacyTemplate,
    Aoo,
    Uo,
}

impl ArtifactKind {
    /// Commit message used when this artifact is written remotely.
    pub fn commit_message(&self) -> &'static str {
        match self {
            ArtifactKind::UserSettings => "Aggiungi configurazioni utente",
            ArtifactKind::PrivacyTemplate => "Aggiungi template privacy",
            ArtifactKind::Aoo => "Aggiungi CSV AOO",
            ArtifactKind::Uo => "Aggiungi CSV UO",
        }
    }

    /// File name inside [`SETTINGS_DIR`]. `username` is only used by
    /// [`ArtifactKind::UserSettings`].
    pub fn file_name(&self, username: &str) -> String {
        match self {
            ArtifactKind::UserSettings => format!("{username}_etlSetting.yml"),
            ArtifactKind::PrivacyTemplate => "privacy_default_template.csv".to_string(),
            ArtifactKind::Aoo => "AOO.csv".to_string(),
            ArtifactKind::Uo => "UO.csv".to_string(),
        }
    }
}

/// Path of `file_name` under [`SETTINGS_DIR`], always `/`-separated.
pub fn settings_path(file_name: &str) -> String {
    format!("{SETTINGS_DIR}/{file_name}")
}

// ---------------------------------------------------------------------------
// Artifact
// ---------------------------------------------------------------------------

/// One generated file: stable path plus exact content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    /// Repository-relative path, `/`-separated.
    pub path: String,
    pub content: String,
}

impl Artifact {
    pub fn commit_message(&self) -> &'static str {
        self.kind.commit_message()
    }
}

/// Output of the `protocol` profile; a section with no rows yields `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtocolArtifacts {
    pub aoo: Option<Artifact>,
    pub uo: Option<Artifact>,
}

impl ProtocolArtifacts {
    /// Present artifacts in write order (AOO before UO).
    pub fn into_vec(self) -> Vec<Artifact> {
        self.aoo.into_iter().chain(self.uo).collect()
    }
}

// ---------------------------------------------------------------------------
// ArtifactGenerator
// ---------------------------------------------------------------------------

/// Deterministic builder for every artifact. Holds only the compiled
/// embedded templates; all methods are pure.
pub struct ArtifactGenerator {
    tera: Tera,
}

impl ArtifactGenerator {
    /// Construct a generator with the embedded templates compiled.
    pub fn new() -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TPLS.iter().copied())?;
        Ok(Self { tera })
    }

    /// `settings/<username>_etlSetting.yml` for one user.
    ///
    /// Keys are emitted in a fixed order; the database placeholders are
    /// always empty.
    pub fn user_settings(
        &self,
        agency: &AgencyConfig,
        username: &str,
    ) -> Result<Artifact, RenderError> {
        let ctx = SettingsContext::from_agency(agency).to_tera_context()?;
        let content = self
            .tera
            .render(SETTINGS_TEMPLATE, &ctx)?
            .replace("\r\n", "\n");
        let kind = ArtifactKind::UserSettings;
        Ok(Artifact {
            kind,
            path: settings_path(&kind.file_name(username)),
            content,
        })
    }

    /// `settings/privacy_default_template.csv`: header plus exactly one row.
    pub fn register_csv(&self, register: &RegisterConfig) -> Result<Artifact, RenderError> {
        let row = tables::register_row(register);
        let content = tables::write_csv(REGISTER_HEADERS, &[row])?;
        let kind = ArtifactKind::PrivacyTemplate;
        Ok(Artifact {
            kind,
            path: settings_path(&kind.file_name("")),
            content,
        })
    }

    /// `settings/AOO.csv` and `settings/UO.csv`, each only when its section
    /// declares at least one row.
    pub fn protocol_csvs(&self, protocol: &ProtocolConfig) -> Result<ProtocolArtifacts, RenderError> {
        Ok(ProtocolArtifacts {
            aoo: section_artifact(ArtifactKind::Aoo, &protocol.aoo, tables::AOO_SCHEMA)?,
            uo: section_artifact(ArtifactKind::Uo, &protocol.uo, tables::UO_SCHEMA)?,
        })
    }
}

fn section_artifact(
    kind: ArtifactKind,
    section: &replica_core::ProtocolSection,
    schema: tables::SectionSchema,
) -> Result<Option<Artifact>, RenderError> {
    let rows = tables::section_rows(section, schema);
    if rows.is_empty() {
        return Ok(None);
    }
    let content = tables::write_csv(schema.headers, &rows)?;
    Ok(Some(Artifact {
        kind,
        path: settings_path(&kind.file_name("")),
        content,
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn agency() -> AgencyConfig {
        AgencyConfig {
            short_name_template: "ZZ-99".to_string(),
            category_id: Some(4),
            agency_ipa_code: "c_h501".to_string(),
        }
    }

    #[test]
    fn generator_new_succeeds() {
        ArtifactGenerator::new().expect("embedded templates compile");
    }

    #[test]
    fn user_settings_exact_content() {
        let generator = ArtifactGenerator::new().unwrap();
        let artifact = generator.user_settings(&agency(), "alice").unwrap();
        assert_eq!(artifact.path, "settings/alice_etlSetting.yml");
        assert_eq!(
            artifact.content,
            "agency_ipa_code: 'c_h501'\n\
             db_host_name: ''\n\
             db_name: ''\n\
             db_port_number: ''\n\
             db_pwd: ''\n\
             db_username: ''\n\
             delay_write_and_read_table_procedure: 150\n\
             professional_category_id: 4\n\
             root_path_global_common_transformation: ''\n\
             root_path_unioncol: ''\n\
             root_prj_folder: ''\n\
             short_name: 'ZZ-99'\n"
        );
    }

    #[test]
    fn commit_messages_match_kind() {
        assert_eq!(ArtifactKind::Aoo.commit_message(), "Aggiungi CSV AOO");
        assert_eq!(
            ArtifactKind::UserSettings.commit_message(),
            "Aggiungi configurazioni utente"
        );
    }

    #[test]
    fn protocol_into_vec_keeps_aoo_first() {
        let aoo = Artifact {
            kind: ArtifactKind::Aoo,
            path: settings_path("AOO.csv"),
            content: String::new(),
        };
        let uo = Artifact {
            kind: ArtifactKind::Uo,
            path: settings_path("UO.csv"),
            content: String::new(),
        };
        let all = ProtocolArtifacts { aoo: Some(aoo), uo: Some(uo) }.into_vec();
        let kinds: Vec<_> = all.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![ArtifactKind::Aoo, ArtifactKind::Uo]);
    }

    #[test]
    fn register_path_is_fixed() {
        let generator = ArtifactGenerator::new().unwrap();
        let artifact = generator.register_csv(&RegisterConfig::default()).unwrap();
        assert_eq!(artifact.path, "settings/privacy_default_template.csv");
    }
}
