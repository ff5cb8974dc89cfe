use crate::clock::Clock;
use crate::hreflang::HreflangSetBuilder;
use crate::i18n::LocaleEntry;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";
const IMAGE_NS: &str = "http://www.google.com/schemas/sitemap-image/1.1";

pub const INDEX_FILE: &str = "sitemap.xml";
pub const MAIN_FILE: &str = "sitemap-main.xml";
pub const IMAGES_FILE: &str = "sitemap-images.xml";
pub const ROBOTS_FILE: &str = "robots.txt";

/// Escape the five XML special characters. Nothing else is touched.
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// File name of a locale's sitemap.
pub fn locale_file_name(locale_code: &str) -> String {
    format!("sitemap-{}.xml", locale_code)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Never => "never",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageImage {
    /// Site-relative path, e.g. `/assets/logo.png`
    pub path: String,
    pub title: String,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub path: String,
    pub priority: f32,
    pub changefreq: ChangeFrequency,
    pub translatable: bool,
    pub images: Vec<PageImage>,
}

impl Page {
    /// A translatable page with no images.
    pub fn new(path: &str, priority: f32, changefreq: ChangeFrequency) -> Self {
        Self {
            path: path.to_string(),
            priority,
            changefreq,
            translatable: true,
            images: Vec::new(),
        }
    }

    /// Mark the page as published in the default locale only.
    pub fn untranslated(mut self) -> Self {
        self.translatable = false;
        self
    }

    pub fn with_image(mut self, path: &str, title: &str, caption: Option<&str>) -> Self {
        self.images.push(PageImage {
            path: path.to_string(),
            title: title.to_string(),
            caption: caption.map(str::to_string),
        });
        self
    }
}

/// Pages of the marketing site.
pub fn default_pages() -> Vec<Page> {
    use ChangeFrequency::*;

    vec![
        Page::new("/", 1.0, Daily)
            .with_image(
                "/assets/logo.png",
                "Zynstro Logo",
                Some("AI-Powered Business Name Generator"),
            )
            .with_image("/assets/hero-image.png", "Business Name Generation", None),
        Page::new("/about", 0.8, Monthly),
        Page::new("/pricing", 0.9, Weekly),
        Page::new("/features", 0.8, Weekly),
        Page::new("/faq", 0.7, Monthly),
        Page::new("/contact", 0.6, Monthly),
        Page::new("/blog", 0.7, Daily),
        Page::new("/privacy", 0.5, Yearly),
        Page::new("/terms", 0.5, Yearly),
    ]
}

/// One rendered output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapFile {
    pub name: String,
    pub contents: String,
}

pub struct SitemapEmitter {
    base_url: String,
    hreflang: HreflangSetBuilder,
    clock: Arc<dyn Clock>,
}

impl SitemapEmitter {
    pub fn new(base_url: &str, hreflang: HreflangSetBuilder, clock: Arc<dyn Clock>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            hreflang,
            clock,
        }
    }

    /// `YYYY-MM-DD` from the injected clock.
    fn today(&self) -> String {
        self.clock.now().format("%Y-%m-%d").to_string()
    }

    /// `<url>` elements for the main sitemap, in page order then locale order.
    ///
    /// The date is read once per call, so one document never straddles midnight.
    pub fn emit_url_entries(&self, pages: &[Page], locales: &[LocaleEntry]) -> Vec<String> {
        self.url_entries(pages, locales, &self.today())
    }

    fn url_entries(&self, pages: &[Page], locales: &[LocaleEntry], lastmod: &str) -> Vec<String> {
        let mut entries = Vec::new();
        for page in pages {
            if page.translatable {
                for locale in locales {
                    entries.push(self.url_entry(page, &locale.code, locales, lastmod));
                }
            } else {
                entries.push(self.url_entry(page, self.hreflang.default_code(), locales, lastmod));
            }
        }
        entries
    }

    fn url_entry(
        &self,
        page: &Page,
        locale_code: &str,
        locales: &[LocaleEntry],
        lastmod: &str,
    ) -> String {
        let url = self.hreflang.url_for(locale_code, &page.path);

        let mut xml = String::from("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&url)));
        xml.push_str(&format!("    <lastmod>{}</lastmod>\n", lastmod));
        xml.push_str(&format!("    <changefreq>{}</changefreq>\n", page.changefreq.as_str()));
        xml.push_str(&format!("    <priority>{:.1}</priority>\n", page.priority));

        if page.translatable {
            for link in &self.hreflang.build(&page.path, locales).entries {
                xml.push_str(&format!(
                    "    <xhtml:link rel=\"alternate\" hreflang=\"{}\" href=\"{}\" />\n",
                    escape_xml(&link.hreflang),
                    escape_xml(&link.href)
                ));
            }
        }

        xml.push_str("  </url>\n");
        xml
    }

    fn urlset(entries: impl IntoIterator<Item = String>) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str(&format!("<urlset xmlns=\"{}\"\n", SITEMAP_NS));
        xml.push_str(&format!("        xmlns:xhtml=\"{}\">\n", XHTML_NS));
        for entry in entries {
            xml.push_str(&entry);
        }
        xml.push_str("</urlset>\n");
        xml
    }

    pub fn main_sitemap(&self, pages: &[Page], locales: &[LocaleEntry]) -> String {
        self.main_sitemap_at(pages, locales, &self.today())
    }

    fn main_sitemap_at(&self, pages: &[Page], locales: &[LocaleEntry], lastmod: &str) -> String {
        Self::urlset(self.url_entries(pages, locales, lastmod))
    }

    /// Pages in a single locale. Untranslated pages appear only in the
    /// default locale's sitemap.
    pub fn locale_sitemap(&self, pages: &[Page], locale: &LocaleEntry, locales: &[LocaleEntry]) -> String {
        self.locale_sitemap_at(pages, locale, locales, &self.today())
    }

    fn locale_sitemap_at(
        &self,
        pages: &[Page],
        locale: &LocaleEntry,
        locales: &[LocaleEntry],
        lastmod: &str,
    ) -> String {
        let is_default = locale.code.eq_ignore_ascii_case(self.hreflang.default_code());
        let entries = pages
            .iter()
            .filter(|page| page.translatable || is_default)
            .map(|page| self.url_entry(page, &locale.code, locales, lastmod));
        Self::urlset(entries)
    }

    pub fn sitemap_index(&self, locales: &[LocaleEntry]) -> String {
        self.sitemap_index_at(locales, &self.today())
    }

    fn sitemap_index_at(&self, locales: &[LocaleEntry], lastmod: &str) -> String {
        let mut names = vec![MAIN_FILE.to_string()];
        names.extend(locales.iter().map(|l| locale_file_name(&l.code)));
        names.push(IMAGES_FILE.to_string());

        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str(&format!("<sitemapindex xmlns=\"{}\">\n", SITEMAP_NS));
        for name in names {
            xml.push_str("  <sitemap>\n");
            let loc = format!("{}/{}", self.base_url, name);
            xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&loc)));
            xml.push_str(&format!("    <lastmod>{}</lastmod>\n", lastmod));
            xml.push_str("  </sitemap>\n");
        }
        xml.push_str("</sitemapindex>\n");
        xml
    }

    /// Images of every page that has any, listed under the default-locale URL.
    pub fn image_sitemap(&self, pages: &[Page]) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str(&format!("<urlset xmlns=\"{}\"\n", SITEMAP_NS));
        xml.push_str(&format!("        xmlns:image=\"{}\">\n", IMAGE_NS));

        for page in pages.iter().filter(|p| !p.images.is_empty()) {
            let url = self.hreflang.url_for(self.hreflang.default_code(), &page.path);
            xml.push_str("  <url>\n");
            xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&url)));
            for image in &page.images {
                xml.push_str("    <image:image>\n");
                let loc = format!("{}{}", self.base_url, image.path);
                xml.push_str(&format!("      <image:loc>{}</image:loc>\n", escape_xml(&loc)));
                xml.push_str(&format!("      <image:title>{}</image:title>\n", escape_xml(&image.title)));
                if let Some(caption) = &image.caption {
                    xml.push_str(&format!("      <image:caption>{}</image:caption>\n", escape_xml(caption)));
                }
                xml.push_str("    </image:image>\n");
            }
            xml.push_str("  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }

    pub fn robots_txt(&self, locales: &[LocaleEntry]) -> String {
        let mut txt = String::from("# Robots.txt for international SEO\n\n");
        txt.push_str("User-agent: *\n");
        txt.push_str("Allow: /\n");
        txt.push_str("Disallow: /admin/\n");
        txt.push_str("Disallow: /api/\n");
        txt.push_str("Disallow: /private/\n");
        txt.push_str("Disallow: /*.json$\n\n");
        txt.push_str("Crawl-delay: 1\n\n");

        txt.push_str("# Sitemaps\n");
        txt.push_str(&format!("Sitemap: {}/{}\n", self.base_url, INDEX_FILE));
        txt.push_str(&format!("Sitemap: {}/{}\n", self.base_url, MAIN_FILE));
        for locale in locales {
            let name = locale_file_name(&locale.code);
            txt.push_str(&format!("Sitemap: {}/{}\n", self.base_url, name));
        }
        txt.push_str(&format!("Sitemap: {}/{}\n", self.base_url, IMAGES_FILE));
        txt.push('\n');

        for agent in ["Googlebot", "Bingbot"] {
            txt.push_str(&format!("User-agent: {}\n", agent));
            txt.push_str("Allow: /\n");
            txt.push_str("Disallow: /admin/\n\n");
        }
        txt
    }

    /// Render one file by name, or `None` if no such file is published.
    pub fn render_file(&self, name: &str, pages: &[Page], locales: &[LocaleEntry]) -> Option<String> {
        let lastmod = self.today();
        match name {
            INDEX_FILE => Some(self.sitemap_index_at(locales, &lastmod)),
            MAIN_FILE => Some(self.main_sitemap_at(pages, locales, &lastmod)),
            IMAGES_FILE => Some(self.image_sitemap(pages)),
            ROBOTS_FILE => Some(self.robots_txt(locales)),
            _ => {
                let code = name.strip_prefix("sitemap-")?.strip_suffix(".xml")?;
                let locale = locales.iter().find(|l| l.code.eq_ignore_ascii_case(code))?;
                Some(self.locale_sitemap_at(pages, locale, locales, &lastmod))
            }
        }
    }

    /// Every published file, sharing one `lastmod` date.
    pub fn render_all(&self, pages: &[Page], locales: &[LocaleEntry]) -> Vec<SitemapFile> {
        let lastmod = self.today();
        let file = |name: String, contents: String| SitemapFile { name, contents };

        let mut files = vec![
            file(INDEX_FILE.to_string(), self.sitemap_index_at(locales, &lastmod)),
            file(MAIN_FILE.to_string(), self.main_sitemap_at(pages, locales, &lastmod)),
        ];
        files.extend(locales.iter().map(|locale| {
            file(
                locale_file_name(&locale.code),
                self.locale_sitemap_at(pages, locale, locales, &lastmod),
            )
        }));
        files.push(file(IMAGES_FILE.to_string(), self.image_sitemap(pages)));
        files.push(file(ROBOTS_FILE.to_string(), self.robots_txt(locales)));
        files
    }

    /// Render everything into `dir`, creating it if needed.
    pub fn write_all(&self, dir: &Path, pages: &[Page], locales: &[LocaleEntry]) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

        let mut written = Vec::new();
        for file in self.render_all(pages, locales) {
            let path = dir.join(&file.name);
            std::fs::write(&path, &file.contents)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            written.push(path);
        }

        info!("✓ Wrote {} sitemap files to {}", written.len(), dir.display());
        Ok(written)
    }
}
