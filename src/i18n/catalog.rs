//! Language catalog: single source of truth for every locale the site is
//! published in.
//!
//! The catalog is an immutable value built once at startup and shared by
//! reference (or behind an `Arc`). Lookups are case-insensitive; entries keep
//! their canonical casing (`es-MX`) for display and URLs.

use crate::i18n::code;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

/// Code of the built-in default locale.
pub const DEFAULT_LOCALE: &str = "en";

/// Metadata for one supported locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocaleEntry {
    /// Canonical locale code (e.g., "es-MX")
    pub code: String,

    /// Language portion of the code (e.g., "es")
    pub base_language: String,

    /// English name (e.g., "Spanish (Mexico)")
    pub display_name: String,

    /// Name in the language itself (e.g., "Español (México)")
    pub native_name: String,

    /// Region portion of the code, if any (e.g., "MX")
    pub region: Option<String>,

    /// ISO 4217 currency shown to visitors of this locale
    pub currency_code: String,

    /// Whether the script is written right-to-left
    pub is_rtl: bool,
}

impl LocaleEntry {
    /// Create an entry, deriving `base_language` and `region` from `code`.
    pub fn new(code: &str, display_name: &str, native_name: &str, currency_code: &str) -> Self {
        let canonical = code::canonicalize(code).unwrap_or_else(|| code.to_string());
        let base_language = code::base_language(&canonical).to_string();
        let region = canonical.split_once('-').map(|(_, region)| region.to_string());

        Self {
            code: canonical,
            base_language,
            display_name: display_name.to_string(),
            native_name: native_name.to_string(),
            region,
            currency_code: currency_code.to_ascii_uppercase(),
            is_rtl: false,
        }
    }

    /// Mark the entry as a right-to-left locale.
    pub fn rtl(mut self) -> Self {
        self.is_rtl = true;
        self
    }
}

/// Errors raised while building or querying a catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unknown locale code: '{0}'")]
    NotFound(String),

    #[error("invalid locale code: '{0}' (expected `lang` or `lang-REGION`)")]
    InvalidCode(String),

    #[error("duplicate locale code: '{0}'")]
    DuplicateCode(String),

    #[error("default locale '{0}' is not in the catalog")]
    MissingDefault(String),

    #[error("catalog must contain at least one locale")]
    Empty,
}

/// Ordered registry of supported locales.
#[derive(Debug, Clone)]
pub struct LanguageCatalog {
    locales: Vec<LocaleEntry>,
    /// Lowercase code -> position in `locales`
    index: HashMap<String, usize>,
    default_index: usize,
}

impl LanguageCatalog {
    /// Build a catalog from entries in display order.
    ///
    /// Every code must parse as `lang` or `lang-REGION` and be unique
    /// (case-insensitively), and `default_code` must be one of them.
    pub fn new(locales: Vec<LocaleEntry>, default_code: &str) -> Result<Self, CatalogError> {
        if locales.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut validated = Vec::with_capacity(locales.len());
        let mut index = HashMap::with_capacity(locales.len());

        for mut entry in locales {
            let canonical = code::canonicalize(&entry.code)
                .ok_or_else(|| CatalogError::InvalidCode(entry.code.clone()))?;

            let key = code::normalize(&canonical);
            if index.contains_key(&key) {
                return Err(CatalogError::DuplicateCode(canonical));
            }

            // Re-derive so the base language invariant holds for hand-built entries
            entry.base_language = code::base_language(&canonical).to_string();
            entry.region = canonical.split_once('-').map(|(_, r)| r.to_string());
            entry.code = canonical;

            index.insert(key, validated.len());
            validated.push(entry);
        }

        let default_index = *index
            .get(&code::normalize(default_code))
            .ok_or_else(|| CatalogError::MissingDefault(default_code.to_string()))?;

        Ok(Self {
            locales: validated,
            index,
            default_index,
        })
    }

    /// The built-in catalog of 38 locales with `en` as default.
    ///
    /// # Panics
    /// Never in practice: the built-in table is validated by the tests below.
    pub fn builtin() -> Self {
        Self::new(builtin_locales(), DEFAULT_LOCALE).expect("built-in catalog should be valid")
    }

    /// The built-in locales with a configured default.
    pub fn builtin_with_default(default_code: &str) -> Result<Self, CatalogError> {
        Self::new(builtin_locales(), default_code)
    }

    /// All locales in catalog-declared order.
    pub fn all_locales(&self) -> &[LocaleEntry] {
        &self.locales
    }

    /// Number of locales in the catalog.
    pub fn len(&self) -> usize {
        self.locales.len()
    }

    /// Always false: construction rejects empty catalogs.
    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }

    /// Check whether a code is supported (case-insensitive).
    pub fn is_supported(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    /// Look up a locale by code (case-insensitive).
    pub fn get(&self, code: &str) -> Option<&LocaleEntry> {
        self.index
            .get(&code::normalize(code))
            .map(|&position| &self.locales[position])
    }

    /// Look up a locale by code, reporting a miss as [`CatalogError::NotFound`].
    pub fn lookup(&self, code: &str) -> Result<&LocaleEntry, CatalogError> {
        self.get(code)
            .ok_or_else(|| CatalogError::NotFound(code.to_string()))
    }

    /// The configured default locale.
    pub fn default_locale(&self) -> &LocaleEntry {
        &self.locales[self.default_index]
    }

    /// Locales grouped by base language, groups and members in catalog order.
    pub fn locales_grouped_by_base(&self) -> IndexMap<&str, Vec<&LocaleEntry>> {
        let mut grouped: IndexMap<&str, Vec<&LocaleEntry>> = IndexMap::new();
        for entry in &self.locales {
            grouped
                .entry(entry.base_language.as_str())
                .or_default()
                .push(entry);
        }
        grouped
    }
}

/// Built-in locale table.
fn builtin_locales() -> Vec<LocaleEntry> {
    vec![
        // English variants
        LocaleEntry::new("en", "English", "English", "USD"),
        LocaleEntry::new("en-US", "English (US)", "English (US)", "USD"),
        LocaleEntry::new("en-GB", "English (UK)", "English (UK)", "GBP"),
        LocaleEntry::new("en-AU", "English (Australia)", "English (AU)", "AUD"),
        LocaleEntry::new("en-CA", "English (Canada)", "English (CA)", "CAD"),
        // Spanish variants
        LocaleEntry::new("es", "Spanish", "Español", "EUR"),
        LocaleEntry::new("es-ES", "Spanish (Spain)", "Español (España)", "EUR"),
        LocaleEntry::new("es-MX", "Spanish (Mexico)", "Español (México)", "MXN"),
        LocaleEntry::new("es-AR", "Spanish (Argentina)", "Español (Argentina)", "ARS"),
        // French variants
        LocaleEntry::new("fr", "French", "Français", "EUR"),
        LocaleEntry::new("fr-FR", "French (France)", "Français (France)", "EUR"),
        LocaleEntry::new("fr-CA", "French (Canada)", "Français (Canada)", "CAD"),
        // German
        LocaleEntry::new("de", "German", "Deutsch", "EUR"),
        LocaleEntry::new("de-DE", "German (Germany)", "Deutsch (Deutschland)", "EUR"),
        LocaleEntry::new("de-AT", "German (Austria)", "Deutsch (Österreich)", "EUR"),
        // Portuguese
        LocaleEntry::new("pt", "Portuguese", "Português", "EUR"),
        LocaleEntry::new("pt-BR", "Portuguese (Brazil)", "Português (Brasil)", "BRL"),
        LocaleEntry::new("pt-PT", "Portuguese (Portugal)", "Português (Portugal)", "EUR"),
        // Italian
        LocaleEntry::new("it", "Italian", "Italiano", "EUR"),
        LocaleEntry::new("it-IT", "Italian (Italy)", "Italiano (Italia)", "EUR"),
        // Arabic
        LocaleEntry::new("ar", "Arabic", "العربية", "USD").rtl(),
        LocaleEntry::new("ar-SA", "Arabic (Saudi Arabia)", "العربية (السعودية)", "SAR").rtl(),
        LocaleEntry::new("ar-AE", "Arabic (UAE)", "العربية (الإمارات)", "AED").rtl(),
        // Chinese
        LocaleEntry::new("zh", "Chinese", "中文", "CNY"),
        LocaleEntry::new("zh-CN", "Chinese (Simplified)", "中文(简体)", "CNY"),
        LocaleEntry::new("zh-TW", "Chinese (Traditional)", "中文(繁體)", "TWD"),
        // Japanese
        LocaleEntry::new("ja", "Japanese", "日本語", "JPY"),
        LocaleEntry::new("ja-JP", "Japanese (Japan)", "日本語 (日本)", "JPY"),
        // Korean
        LocaleEntry::new("ko", "Korean", "한국어", "KRW"),
        LocaleEntry::new("ko-KR", "Korean (South Korea)", "한국어 (대한민국)", "KRW"),
        // Dutch
        LocaleEntry::new("nl", "Dutch", "Nederlands", "EUR"),
        LocaleEntry::new("nl-NL", "Dutch (Netherlands)", "Nederlands (Nederland)", "EUR"),
        // Russian
        LocaleEntry::new("ru", "Russian", "Русский", "RUB"),
        LocaleEntry::new("ru-RU", "Russian (Russia)", "Русский (Россия)", "RUB"),
        // Hindi
        LocaleEntry::new("hi", "Hindi", "हिन्दी", "INR"),
        LocaleEntry::new("hi-IN", "Hindi (India)", "हिन्दी (भारत)", "INR"),
        // Urdu
        LocaleEntry::new("ur", "Urdu", "اردو", "PKR").rtl(),
        LocaleEntry::new("ur-PK", "Urdu (Pakistan)", "اردو (پاکستان)", "PKR").rtl(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_catalog() -> LanguageCatalog {
        LanguageCatalog::new(
            vec![
                LocaleEntry::new("en", "English", "English", "USD"),
                LocaleEntry::new("es", "Spanish", "Español", "EUR"),
                LocaleEntry::new("es-MX", "Spanish (Mexico)", "Español (México)", "MXN"),
            ],
            "en",
        )
        .expect("Should build")
    }

    // ==================== Built-in Catalog Tests ====================

    #[test]
    fn test_builtin_catalog_size() {
        let catalog = LanguageCatalog::builtin();
        assert_eq!(catalog.len(), 38);
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_builtin_default_is_english() {
        let catalog = LanguageCatalog::builtin();
        assert_eq!(catalog.default_locale().code, "en");
    }

    #[test]
    fn test_builtin_rtl_flags() {
        let catalog = LanguageCatalog::builtin();
        let rtl: Vec<_> = catalog
            .all_locales()
            .iter()
            .filter(|l| l.is_rtl)
            .map(|l| l.code.as_str())
            .collect();
        assert_eq!(rtl, vec!["ar", "ar-SA", "ar-AE", "ur", "ur-PK"]);
    }

    #[test]
    fn test_lookup_roundtrips_every_code() {
        let catalog = LanguageCatalog::builtin();
        for entry in catalog.all_locales() {
            let found = catalog.lookup(&entry.code).expect("Should find");
            assert_eq!(found.code, entry.code);

            let found_lower = catalog
                .lookup(&entry.code.to_lowercase())
                .expect("Should find lowercase");
            assert_eq!(found_lower.code, entry.code);

            let found_upper = catalog
                .lookup(&entry.code.to_uppercase())
                .expect("Should find uppercase");
            assert_eq!(found_upper.code, entry.code);
        }
    }

    #[test]
    fn test_base_language_invariant() {
        let catalog = LanguageCatalog::builtin();
        for entry in catalog.all_locales() {
            assert_eq!(entry.base_language, entry.code.split('-').next().unwrap());
        }
    }

    // ==================== Lookup Tests ====================

    #[test]
    fn test_lookup_preserves_canonical_casing() {
        let catalog = small_catalog();
        let entry = catalog.lookup("ES-mx").expect("Should find");
        assert_eq!(entry.code, "es-MX");
        assert_eq!(entry.region.as_deref(), Some("MX"));
        assert_eq!(entry.base_language, "es");
    }

    #[test]
    fn test_lookup_miss() {
        let catalog = small_catalog();
        let result = catalog.lookup("fr");
        assert_eq!(result, Err(CatalogError::NotFound("fr".to_string())));
    }

    #[test]
    fn test_is_supported() {
        let catalog = small_catalog();
        assert!(catalog.is_supported("es"));
        assert!(catalog.is_supported("es-mx"));
        assert!(!catalog.is_supported("es-AR"));
        assert!(!catalog.is_supported(""));
    }

    // ==================== Grouping Tests ====================

    #[test]
    fn test_grouped_by_base_keeps_order() {
        let catalog = small_catalog();
        let grouped = catalog.locales_grouped_by_base();

        let keys: Vec<_> = grouped.keys().copied().collect();
        assert_eq!(keys, vec!["en", "es"]);

        let spanish: Vec<_> = grouped["es"].iter().map(|l| l.code.as_str()).collect();
        assert_eq!(spanish, vec!["es", "es-MX"]);
    }

    #[test]
    fn test_builtin_grouping_has_fourteen_languages() {
        let catalog = LanguageCatalog::builtin();
        let grouped = catalog.locales_grouped_by_base();
        assert_eq!(grouped.len(), 14);
        assert_eq!(grouped["en"].len(), 5);
    }

    // ==================== Construction Error Tests ====================

    #[test]
    fn test_rejects_empty_catalog() {
        let result = LanguageCatalog::new(vec![], "en");
        assert!(matches!(result, Err(CatalogError::Empty)));
    }

    #[test]
    fn test_rejects_invalid_code() {
        let result = LanguageCatalog::new(
            vec![LocaleEntry::new("english", "English", "English", "USD")],
            "english",
        );
        assert!(matches!(result, Err(CatalogError::InvalidCode(_))));
    }

    #[test]
    fn test_rejects_duplicate_code() {
        let result = LanguageCatalog::new(
            vec![
                LocaleEntry::new("en-US", "English", "English", "USD"),
                LocaleEntry::new("en-us", "English", "English", "USD"),
            ],
            "en-US",
        );
        assert_eq!(result.unwrap_err(), CatalogError::DuplicateCode("en-US".to_string()));
    }

    #[test]
    fn test_rejects_missing_default() {
        let result = LanguageCatalog::new(
            vec![LocaleEntry::new("es", "Spanish", "Español", "EUR")],
            "en",
        );
        assert_eq!(result.unwrap_err(), CatalogError::MissingDefault("en".to_string()));
    }

    #[test]
    fn test_error_messages() {
        let err = CatalogError::NotFound("xx".to_string());
        assert!(err.to_string().contains("unknown locale code"));
    }
}
