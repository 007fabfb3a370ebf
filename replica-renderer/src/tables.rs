//! Fixed CSV schemas and the semicolon-delimited writer.
//!
//! Every field is double-quoted, rows end with `\n`, and absent values are
//! written as `""` so the column count always equals the header width.

use csv::{QuoteStyle, Terminator, WriterBuilder};

use replica_core::{ProtocolSection, RegisterConfig};

use crate::error::RenderError;

/// Columns of `privacy_default_template.csv`, in file order.
pub const REGISTER_HEADERS: &[&str] = &[
    "profileName",
    "picture",
    "fiscalCode",
    "vatNumber",
    "birthDate",
    "gender",
    "studioAddress",
    "studioEmail",
    "studioPec",
    "studioPecReginde",
    "studioPhone",
    "studioFax",
    "residenceAddress",
    "residenceEmail",
    "residencePec",
    "residencePecReginde",
    "residencePhone",
    "residenceFax",
    "professionalDomicileAddress",
    "professionalDomicileEmail",
    "professionalDomicilePec",
    "professionalDomicilePecReginde",
    "professionalDomicilePhone",
    "professionalDomicileFax",
    "taxDomicileAddress",
    "taxDomicileEmail",
    "taxDomicilePec",
    "taxDomicilePecReginde",
    "taxDomicilePhone",
    "taxDomicileFax",
    "mailingAddressAddress",
    "mailingAddressEmail",
    "mailingAddressPec",
    "mailingAddressPecReginde",
    "mailingAddressPhone",
    "mailingAddressFax",
    "studioMobilePhone",
    "residenceMobilePhone",
    "professionalDomicileMobilePhone",
    "taxDomicileMobilePhone",
    "mailingAddressMobilePhone",
];

/// Columns of `AOO.csv`. Entry `AOOi` stores column `c` under `aooi_c`.
pub const AOO_HEADERS: &[&str] = &[
    "accountable_email",
    "accountable_first_name",
    "accountable_last_name",
    "accountable_phone_number",
    "alboclassic_aoo_id",
    "date_creation",
    "name",
    "unicode",
];

/// Columns of `UO.csv`. Entry `UOi` stores column `c` under `uoi_c`.
pub const UO_HEADERS: &[&str] = &[
    "accountable_first_name",
    "accountable_second_name",
    "alboclassic_uo_id",
    "albosmart_uo_id",
    "date_creation",
    "isDefault",
    "name",
    "unicode",
];

/// Key layout of a positionally-keyed protocol section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSchema {
    /// Entry key prefix: `AOO` → `AOO1`, `AOO2`, …
    pub entry_prefix: &'static str,
    /// Field key prefix: `aoo` → `aoo1_name`, …
    pub field_prefix: &'static str,
    pub headers: &'static [&'static str],
}

pub const AOO_SCHEMA: SectionSchema = SectionSchema {
    entry_prefix: "AOO",
    field_prefix: "aoo",
    headers: AOO_HEADERS,
};

pub const UO_SCHEMA: SectionSchema = SectionSchema {
    entry_prefix: "UO",
    field_prefix: "uo",
    headers: UO_HEADERS,
};

/// The single data row of the privacy template, in header order.
pub fn register_row(register: &RegisterConfig) -> Vec<String> {
    REGISTER_HEADERS.iter().map(|h| register.field(h)).collect()
}

/// Data rows for indices `1..=section.count()`, in index order.
pub fn section_rows(section: &ProtocolSection, schema: SectionSchema) -> Vec<Vec<String>> {
    (1..=section.count())
        .map(|i| {
            let entry = format!("{}{i}", schema.entry_prefix);
            schema
                .headers
                .iter()
                .map(|column| section.field(&entry, &format!("{}{i}_{column}", schema.field_prefix)))
                .collect()
        })
        .collect()
}

/// Write `headers` followed by `rows` as `;`-delimited, always-quoted CSV.
pub fn write_csv(headers: &[&str], rows: &[Vec<String>]) -> Result<String, RenderError> {
    let mut writer = WriterBuilder::new()
        .delimiter(b';')
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(headers)?;
    for row in rows {
        debug_assert_eq!(row.len(), headers.len(), "row width must match header width");
        writer.write_record(row)?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}
