use crate::i18n::LocaleEntry;
use crate::sitemap::escape_xml;
use crate::url_strategy::UrlStrategy;
use serde::Serialize;
use std::sync::Arc;

/// hreflang value of the fallback entry.
pub const X_DEFAULT: &str = "x-default";

/// One `<link rel="alternate" hreflang=".." href="..">`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HreflangEntry {
    pub hreflang: String,
    pub href: String,
}

impl HreflangEntry {
    pub fn rel(&self) -> &'static str {
        "alternate"
    }

    pub fn is_x_default(&self) -> bool {
        self.hreflang == X_DEFAULT
    }
}

/// Every alternate URL of one page: `x-default` first, then each locale in
/// catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HreflangSet {
    pub path: String,
    pub entries: Vec<HreflangEntry>,
}

impl HreflangSet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn x_default(&self) -> Option<&HreflangEntry> {
        self.entries.iter().find(|e| e.is_x_default())
    }

    /// URL for a specific locale code (case-insensitive).
    pub fn href_for(&self, locale_code: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| !e.is_x_default() && e.hreflang.eq_ignore_ascii_case(locale_code))
            .map(|e| e.href.as_str())
    }

    /// `<link>` tags for an HTML `<head>`, one per line.
    pub fn to_html_links(&self) -> String {
        self.entries
            .iter()
            .map(|e| {
                format!(
                    r#"<link rel="{}" hreflang="{}" href="{}" />"#,
                    e.rel(),
                    escape_xml(&e.hreflang),
                    escape_xml(&e.href)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Builds [`HreflangSet`]s through whichever [`UrlStrategy`] is deployed.
#[derive(Clone)]
pub struct HreflangSetBuilder {
    strategy: Arc<dyn UrlStrategy>,
    default_code: String,
}

impl HreflangSetBuilder {
    pub fn new(strategy: Arc<dyn UrlStrategy>, default_code: &str) -> Self {
        Self {
            strategy,
            default_code: default_code.to_string(),
        }
    }

    pub fn strategy(&self) -> &dyn UrlStrategy {
        self.strategy.as_ref()
    }

    pub fn default_code(&self) -> &str {
        &self.default_code
    }

    /// URL of `path` in `locale_code`.
    pub fn url_for(&self, locale_code: &str, path: &str) -> String {
        self.strategy.url_for(locale_code, path)
    }

    /// Always `locales.len() + 1` entries, `x-default` first.
    pub fn build(&self, path: &str, locales: &[LocaleEntry]) -> HreflangSet {
        let mut entries = Vec::with_capacity(locales.len() + 1);

        entries.push(HreflangEntry {
            hreflang: X_DEFAULT.to_string(),
            href: self.strategy.url_for(&self.default_code, path),
        });

        entries.extend(locales.iter().map(|locale| HreflangEntry {
            hreflang: locale.code.clone(),
            href: self.strategy.url_for(&locale.code, path),
        }));

        HreflangSet {
            path: path.to_string(),
            entries,
        }
    }
}
