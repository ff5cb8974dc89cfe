use crate::i18n::code;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Maps a locale and a site path onto a public URL.
pub trait UrlStrategy: Send + Sync {
    /// Absolute URL of `path` in `locale_code`.
    fn url_for(&self, locale_code: &str, path: &str) -> String;
}

/// Make sure a path starts with `/`; the empty path stays empty.
fn normalize_path(path: &str) -> String {
    let path = path.trim();
    if path.is_empty() || path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

fn is_default(locale_code: &str, default_code: &str) -> bool {
    code::normalize(locale_code) == code::normalize(default_code)
}

/// `{base}/{locale}{path}`, bare `{base}{path}` for the default locale.
#[derive(Debug, Clone)]
pub struct SubdirectoryStrategy {
    base_url: String,
    default_code: String,
}

impl SubdirectoryStrategy {
    pub fn new(base_url: &str, default_code: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            default_code: default_code.to_string(),
        }
    }
}

impl UrlStrategy for SubdirectoryStrategy {
    fn url_for(&self, locale_code: &str, path: &str) -> String {
        let path = normalize_path(path);
        if is_default(locale_code, &self.default_code) {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}{}", self.base_url, code::normalize(locale_code), path)
        }
    }
}

/// `https://{locale}.{domain}{path}`, `https://www.{domain}{path}` for the default.
#[derive(Debug, Clone)]
pub struct SubdomainStrategy {
    domain: String,
    default_code: String,
}

impl SubdomainStrategy {
    pub fn new(domain: &str, default_code: &str) -> Self {
        Self {
            domain: domain.trim().trim_end_matches('/').to_string(),
            default_code: default_code.to_string(),
        }
    }
}

impl UrlStrategy for SubdomainStrategy {
    fn url_for(&self, locale_code: &str, path: &str) -> String {
        let path = normalize_path(path);
        let host = if is_default(locale_code, &self.default_code) {
            "www".to_string()
        } else {
            code::normalize(locale_code)
        };
        format!("https://{}.{}{}", host, self.domain, path)
    }
}

/// `https://{brand}.{tld}{path}` where the TLD is chosen by base language.
#[derive(Debug, Clone)]
pub struct CcTldStrategy {
    brand: String,
    tlds: HashMap<&'static str, &'static str>,
    fallback_tld: &'static str,
}

impl CcTldStrategy {
    pub fn new(brand: &str) -> Self {
        let tlds = HashMap::from([
            ("en", "com"),
            ("es", "es"),
            ("fr", "fr"),
            ("de", "de"),
            ("it", "it"),
            ("pt", "pt"),
            ("nl", "nl"),
            ("ru", "ru"),
            ("ja", "jp"),
            ("zh", "cn"),
            ("ko", "kr"),
        ]);

        Self {
            brand: brand.trim().to_string(),
            tlds,
            fallback_tld: "com",
        }
    }
}

impl UrlStrategy for CcTldStrategy {
    fn url_for(&self, locale_code: &str, path: &str) -> String {
        let normalized = code::normalize(locale_code);
        let tld = self
            .tlds
            .get(code::base_language(&normalized))
            .copied()
            .unwrap_or(self.fallback_tld);
        format!("https://{}.{}{}", self.brand, tld, normalize_path(path))
    }
}

/// Which scheme the site is deployed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UrlStrategyKind {
    #[default]
    Subdirectory,
    Subdomain,
    CcTld,
}

impl FromStr for UrlStrategyKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "subdirectory" => Ok(Self::Subdirectory),
            "subdomain" => Ok(Self::Subdomain),
            "cctld" => Ok(Self::CcTld),
            other => anyhow::bail!(
                "Invalid URL strategy '{}'. Expected one of: subdirectory, subdomain, cctld",
                other
            ),
        }
    }
}

impl fmt::Display for UrlStrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Subdirectory => "subdirectory",
            Self::Subdomain => "subdomain",
            Self::CcTld => "cctld",
        };
        f.write_str(name)
    }
}

/// Site identity the strategies are built from.
#[derive(Debug, Clone)]
pub struct SiteUrls {
    pub base_url: String,
    pub domain: String,
    pub brand: String,
    pub default_locale: String,
}

impl UrlStrategyKind {
    pub fn build(self, site: &SiteUrls) -> Arc<dyn UrlStrategy> {
        match self {
            Self::Subdirectory => Arc::new(SubdirectoryStrategy::new(
                &site.base_url,
                &site.default_locale,
            )),
            Self::Subdomain => Arc::new(SubdomainStrategy::new(&site.domain, &site.default_locale)),
            Self::CcTld => Arc::new(CcTldStrategy::new(&site.brand)),
        }
    }
}
