//! Locale code validation and normalization.
//!
//! Locale codes in the catalog are either a bare language (`"es"`) or a
//! language plus region (`"es-MX"`). Comparison is always done on the
//! lowercase form; the canonical form (`lang` lowercase, `REGION` uppercase)
//! is what gets displayed.

use regex::Regex;
use std::sync::OnceLock;

// Regex patterns (cached for performance)
static LOCALE_CODE_REGEX: OnceLock<Regex> = OnceLock::new();
static PATH_SEGMENT_REGEX: OnceLock<Regex> = OnceLock::new();
static LANGUAGE_TAG_REGEX: OnceLock<Regex> = OnceLock::new();

/// Check that a code parses as `lang` or `lang-REGION`.
pub fn is_valid_locale_code(code: &str) -> bool {
    let regex = LOCALE_CODE_REGEX
        .get_or_init(|| Regex::new(r"^[A-Za-z]{2,3}(-[A-Za-z]{2})?$").unwrap());
    regex.is_match(code)
}

/// Check that a URL path segment looks like a locale (`es`, `en-us`, `PT-BR`).
pub fn is_path_locale_segment(segment: &str) -> bool {
    let regex =
        PATH_SEGMENT_REGEX.get_or_init(|| Regex::new(r"(?i)^[a-z]{2}(-[a-z]{2})?$").unwrap());
    regex.is_match(segment)
}

/// Structural check for a language range taken from an Accept-Language header.
///
/// This is looser than [`is_valid_locale_code`]: it accepts any BCP 47 shaped
/// tag (`zh-Hant-TW`, `es-419`) so that the base language can still be tried.
pub fn is_language_tag(tag: &str) -> bool {
    let regex = LANGUAGE_TAG_REGEX
        .get_or_init(|| Regex::new(r"^[A-Za-z]{1,8}(-[A-Za-z0-9]{1,8})*$").unwrap());
    regex.is_match(tag)
}

/// Normalize a code for lookups: trimmed, lowercase, `_` replaced by `-`.
pub fn normalize(code: &str) -> String {
    code.trim().replace('_', "-").to_ascii_lowercase()
}

/// The language portion of a code (`"es-MX"` -> `"es"`).
pub fn base_language(code: &str) -> &str {
    code.split('-').next().unwrap_or(code)
}

/// Canonical display casing (`"ES-mx"` -> `"es-MX"`).
///
/// Returns `None` when the code is not a valid locale code.
pub fn canonicalize(code: &str) -> Option<String> {
    let normalized = normalize(code);
    if !is_valid_locale_code(&normalized) {
        return None;
    }

    match normalized.split_once('-') {
        Some((lang, region)) => Some(format!("{}-{}", lang, region.to_ascii_uppercase())),
        None => Some(normalized),
    }
}
