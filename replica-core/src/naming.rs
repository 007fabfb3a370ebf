//! Destination-name derivation.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::NamePatternError;

static TRAILING_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z0-9]+)-([A-Za-z0-9]+)$").expect("static regex"));

/// Replace the trailing `X-Y` suffix of `origin_name` with `suffix_template`
/// upper-cased, keeping everything before the suffix byte-for-byte.
///
/// When the whole name is a single `X-Y` pair there is no prefix to keep, so
/// the stem `X` and its hyphen are retained and only `Y` is replaced:
/// `AGENCY-XY` + `zz-99` → `AGENCY-ZZ-99`.
pub fn derive_name(origin_name: &str, suffix_template: &str) -> Result<String, NamePatternError> {
    let caps = TRAILING_SUFFIX
        .captures(origin_name)
        .ok_or_else(|| NamePatternError {
            name: origin_name.to_string(),
        })?;
    let whole = caps.get(0).ok_or_else(|| NamePatternError {
        name: origin_name.to_string(),
    })?;

    let keep_until = if whole.start() == 0 {
        caps.get(2).map_or(whole.start(), |tail| tail.start())
    } else {
        whole.start()
    };

    Ok(format!(
        "{}{}",
        &origin_name[..keep_until],
        suffix_template.to_uppercase()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("etl-agency-AAA-BB", "zz-99", "etl-agency-ZZ-99")]
    #[case("etl_agency_AAA-BB", "ZZ-99", "etl_agency_ZZ-99")]
    #[case("tenant.template-x1-y2", "abc-de", "tenant.template-ABC-DE")]
    #[case("a-b-c-d", "q-r", "a-b-Q-R")]
    #[case("AGENCY-XY", "ZZ-99", "AGENCY-ZZ-99")]
    fn replaces_trailing_suffix(#[case] origin: &str, #[case] suffix: &str, #[case] expected: &str) {
        assert_eq!(derive_name(origin, suffix).expect("derive"), expected);
    }

    #[rstest]
    #[case("template")]
    #[case("template-")]
    #[case("template-AAA-")]
    #[case("")]
    #[case("etl-agency-AAA_BB!")]
    fn rejects_names_without_suffix(#[case] origin: &str) {
        let err = derive_name(origin, "ZZ-99").unwrap_err();
        assert_eq!(err.name, origin);
    }

    #[test]
    fn prefix_is_preserved_verbatim() {
        let origin = "Ünïcode prefix/etl-AAA-BB";
        let derived = derive_name(origin, "xx-1").expect("derive");
        assert!(derived.starts_with("Ünïcode prefix/etl-"));
        assert!(derived.ends_with("XX-1"));
    }
}
