//! Template context: serializable rendering payload built from [`AgencyConfig`].

use serde::{Deserialize, Serialize};

use replica_core::AgencyConfig;

use crate::error::RenderError;

/// Delay written into every settings file; not configurable.
pub const DELAY_WRITE_AND_READ_TABLE_PROCEDURE: u32 = 150;

/// Values interpolated into `etl_setting.yml.tera`.
///
/// String fields are pre-escaped for a single-quoted YAML scalar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsContext {
    pub agency_ipa_code: String,
    pub professional_category_id: i64,
    pub short_name: String,
    pub delay_write_and_read_table_procedure: u32,
}

impl SettingsContext {
    /// Build the context for one user's settings file.
    ///
    /// `agency` is expected to have passed [`AgencyConfig::validate`]; an
    /// absent `category_id` renders as `0`.
    pub fn from_agency(agency: &AgencyConfig) -> Self {
        Self {
            agency_ipa_code: single_quoted(&agency.agency_ipa_code),
            professional_category_id: agency.category_id.unwrap_or_default(),
            short_name: single_quoted(&agency.short_name_template),
            delay_write_and_read_table_procedure: DELAY_WRITE_AND_READ_TABLE_PROCEDURE,
        }
    }

    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}

/// Escape for the inside of a YAML single-quoted scalar.
fn single_quoted(value: &str) -> String {
    value.replace('\'', "''")
}
