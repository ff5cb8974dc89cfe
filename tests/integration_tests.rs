//! Integration tests for the locale service
//!
//! These tests run the HTTP service on a random local port, with the
//! exchange-rate feed mocked by wiremock and time pinned by a fixed clock.

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use site_locale::clock::{Clock, FixedClock};
use site_locale::config::Config;
use site_locale::currency::{CurrencyConverter, HttpRateFeed, RateSource};
use site_locale::hreflang::HreflangSetBuilder;
use site_locale::i18n::{GeoLocaleMap, LanguageCatalog, LocaleResolver, LocaleSource, RequestContext};
use site_locale::retry::RetryConfig;
use site_locale::server::{self, AppState};
use site_locale::sitemap::{default_pages, SitemapEmitter};
use site_locale::url_strategy::{SubdirectoryStrategy, UrlStrategyKind};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

// ==================== Test Helpers ====================

const API_KEY: &str = "test-api-key";

/// Create a test config pointing the rate feed at `feed_url`
fn create_test_config(feed_url: &str) -> Config {
    Config {
        site_base_url: "https://zynstro.com".to_string(),
        site_domain: "zynstro.com".to_string(),
        site_brand: "zynstro".to_string(),
        url_strategy: UrlStrategyKind::Subdirectory,
        default_locale: "en".to_string(),
        locale_cookie_name: "lang_pref".to_string(),
        locale_cookie_max_age_days: 365,
        rate_feed_url: feed_url.to_string(),
        rate_refresh_schedule: "0 0 3 * * *".to_string(),
        api_key: Some(API_KEY.to_string()),
        sitemap_output_dir: PathBuf::from("public"),
        port: 0,
    }
}

fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 7, 15, 9, 30, 0).unwrap(),
    ))
}

struct TestApp {
    base_url: String,
    client: reqwest::Client,
    converter: Arc<CurrencyConverter>,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.expect("Request failed")
    }
}

/// Start the service on 127.0.0.1 with a random port
async fn spawn_app(feed_url: &str) -> TestApp {
    let config = create_test_config(feed_url);
    let clock = fixed_clock();
    let converter = Arc::new(CurrencyConverter::with_snapshot(clock.clone()));
    let feed = Arc::new(
        HttpRateFeed::new(&config.rate_feed_url)
            .unwrap()
            .with_retry(RetryConfig::new(1, Duration::ZERO)),
    );

    let state = Arc::new(AppState::new(config, Arc::clone(&converter), feed, clock).unwrap());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, server::router(state)).await.unwrap();
    });

    TestApp {
        base_url: format!("http://{}", addr),
        client: reqwest::Client::new(),
        converter,
    }
}

fn header<'a>(response: &'a reqwest::Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

// ==================== Health Tests ====================

#[tokio::test]
async fn test_health() {
    let app = spawn_app("http://127.0.0.1:9/unused").await;
    let response = app.get("/health").await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["locales"], 38);
    let currencies = body["currencies"].as_array().unwrap();
    assert_eq!(currencies.len(), 38);
    assert_eq!(currencies[0], "AED");
    assert!(currencies.iter().any(|c| c == "JPY"));
}

// ==================== Locale Detection Tests ====================

#[tokio::test]
async fn test_detect_locale_cookie_wins() {
    let app = spawn_app("http://127.0.0.1:9/unused").await;
    let response = app
        .client
        .get(app.url("/api/locale?path=/fr/about"))
        .header("Cookie", "theme=dark; lang_pref=ja")
        .header("CF-IPCountry", "MX")
        .header("Accept-Language", "de-DE,de;q=0.9")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(header(&response, "x-detected-language"), Some("ja"));
    assert_eq!(header(&response, "x-locale-source"), Some("cookie"));
    assert_eq!(header(&response, "x-visitor-country"), Some("MX"));
}

#[tokio::test]
async fn test_detect_locale_path_beats_geo_and_header() {
    let app = spawn_app("http://127.0.0.1:9/unused").await;
    let response = app
        .client
        .get(app.url("/api/locale?path=/fr/about"))
        .header("CF-IPCountry", "MX")
        .header("Accept-Language", "de")
        .send()
        .await
        .unwrap();

    assert_eq!(header(&response, "x-detected-language"), Some("fr"));
    assert_eq!(header(&response, "x-locale-source"), Some("path"));
    // Already on a localized page: no suggestion
    assert_eq!(header(&response, "x-suggested-language"), None);
}

#[tokio::test]
async fn test_detect_locale_geo_suggests_without_redirect() {
    let app = spawn_app("http://127.0.0.1:9/unused").await;
    let response = app
        .client
        .get(app.url("/api/locale?path=/pricing"))
        .header("CF-IPCountry", "mx")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(header(&response, "x-detected-language"), Some("es-MX"));
    assert_eq!(header(&response, "x-locale-source"), Some("geo"));
    assert_eq!(header(&response, "x-suggested-language"), Some("es-MX"));

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["locale"]["currency_code"], "MXN");
    assert_eq!(body["suggested"], "es-MX");
}

#[tokio::test]
async fn test_detect_locale_header_base_language() {
    let app = spawn_app("http://127.0.0.1:9/unused").await;
    let response = app
        .client
        .get(app.url("/api/locale"))
        .header("Accept-Language", "sw;q=0.9, it-CH;q=0.8")
        .send()
        .await
        .unwrap();

    assert_eq!(header(&response, "x-detected-language"), Some("it"));
    assert_eq!(header(&response, "x-locale-source"), Some("header"));
}

#[tokio::test]
async fn test_detect_locale_default() {
    let app = spawn_app("http://127.0.0.1:9/unused").await;
    let response = app.get("/api/locale").await;

    assert_eq!(header(&response, "x-detected-language"), Some("en"));
    assert_eq!(header(&response, "x-locale-source"), Some("default"));
    assert_eq!(header(&response, "x-visitor-country"), None);
}

#[tokio::test]
async fn test_metrics_count_sources() {
    let app = spawn_app("http://127.0.0.1:9/unused").await;
    app.get("/api/locale").await;
    app.get("/api/locale?path=/de/faq").await;
    app.get("/api/locale?path=/nl").await;

    let report: Value = app.get("/api/metrics").await.json().await.unwrap();
    assert_eq!(report["path"], 2);
    assert_eq!(report["default"], 1);
    assert_eq!(report["total"], 3);
}

// ==================== Locale Preference Tests ====================

#[tokio::test]
async fn test_set_locale_sets_cookie() {
    let app = spawn_app("http://127.0.0.1:9/unused").await;
    let response = app
        .client
        .post(app.url("/api/locale"))
        .json(&json!({"locale": "pt-br"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(
        header(&response, "set-cookie"),
        Some("lang_pref=pt-BR; Max-Age=31536000; Path=/; SameSite=Lax")
    );
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "pt-BR");
}

#[tokio::test]
async fn test_set_locale_rejects_unsupported() {
    let app = spawn_app("http://127.0.0.1:9/unused").await;
    let response = app
        .client
        .post(app.url("/api/locale"))
        .json(&json!({"locale": "tlh"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    assert!(header(&response, "set-cookie").is_none());
}

// ==================== Hreflang Tests ====================

#[tokio::test]
async fn test_hreflang_endpoint() {
    let app = spawn_app("http://127.0.0.1:9/unused").await;
    let body: Value = app.get("/api/hreflang?path=/pricing").await.json().await.unwrap();

    let entries = body["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 39);
    assert_eq!(entries[0]["hreflang"], "x-default");
    assert_eq!(entries[0]["href"], "https://zynstro.com/pricing");
    assert_eq!(entries[1]["hreflang"], "en");
    assert_eq!(
        entries.iter().filter(|e| e["hreflang"] == "x-default").count(),
        1
    );
}

// ==================== Pricing Tests ====================

#[tokio::test]
async fn test_pricing_for_explicit_locale() {
    let app = spawn_app("http://127.0.0.1:9/unused").await;
    let body: Value = app.get("/api/pricing?locale=es").await.json().await.unwrap();

    assert_eq!(body["locale"], "es");
    assert_eq!(body["currency"], "EUR");
    let starter = &body["plans"][1];
    assert_eq!(starter["id"], "starter");
    assert_eq!(starter["display_price"], "9,19\u{a0}€");
    assert_eq!(body["plans"][0]["display_price"], "Gratis");
}

#[tokio::test]
async fn test_pricing_currency_override() {
    let app = spawn_app("http://127.0.0.1:9/unused").await;
    let body: Value = app
        .get("/api/pricing?locale=en&currency=GBP")
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(body["currency"], "GBP");
    assert_eq!(body["plans"][1]["display_price"], "£7.89");
}

#[tokio::test]
async fn test_pricing_resolves_locale_from_request() {
    let app = spawn_app("http://127.0.0.1:9/unused").await;
    let body: Value = app
        .client
        .get(app.url("/api/pricing"))
        .header("CF-IPCountry", "JP")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["locale"], "ja-JP");
    assert_eq!(body["currency"], "JPY");
}

#[tokio::test]
async fn test_pricing_unknown_locale() {
    let app = spawn_app("http://127.0.0.1:9/unused").await;
    assert_eq!(app.get("/api/pricing?locale=xx-YY").await.status(), 400);
}

// ==================== SEO File Tests ====================

#[tokio::test]
async fn test_sitemap_index_served_with_cache_headers() {
    let app = spawn_app("http://127.0.0.1:9/unused").await;
    let response = app.get("/sitemap.xml").await;

    assert_eq!(response.status(), 200);
    assert_eq!(header(&response, "cache-control"), Some("public, max-age=86400"));
    assert!(header(&response, "content-type").unwrap().starts_with("application/xml"));

    let body = response.text().await.unwrap();
    assert_eq!(body.matches("<sitemap>").count(), 40);
    assert!(body.contains("<lastmod>2024-07-15</lastmod>"));
}

#[tokio::test]
async fn test_locale_sitemap_and_robots() {
    let app = spawn_app("http://127.0.0.1:9/unused").await;

    let locale = app.get("/sitemap-es-MX.xml").await;
    assert_eq!(locale.status(), 200);
    assert!(locale
        .text()
        .await
        .unwrap()
        .contains("<loc>https://zynstro.com/es-mx/pricing</loc>"));

    let robots = app.get("/robots.txt").await;
    assert!(header(&robots, "content-type").unwrap().starts_with("text/plain"));
    assert!(robots.text().await.unwrap().contains("Crawl-delay: 1"));
}

#[tokio::test]
async fn test_unknown_seo_file_is_404() {
    let app = spawn_app("http://127.0.0.1:9/unused").await;
    assert_eq!(app.get("/sitemap-xx.xml").await.status(), 404);
    assert_eq!(app.get("/favicon.ico").await.status(), 404);
}

// ==================== Rate Refresh Tests ====================

#[tokio::test]
async fn test_admin_refresh_requires_api_key() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rates": {"EUR": 0.5}})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let app = spawn_app(&mock_server.uri()).await;

    let missing = app.client.post(app.url("/admin/rates/refresh")).send().await.unwrap();
    assert_eq!(missing.status(), 401);

    let wrong = app
        .client
        .post(app.url("/admin/rates/refresh"))
        .header("X-API-Key", "nope")
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status(), 401);
}

#[tokio::test]
async fn test_admin_refresh_swaps_rates() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/latest/USD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "base": "USD",
            "rates": {"USD": 1, "EUR": 0.5, "GBP": 0.8}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = spawn_app(&format!("{}/v4/latest/USD", mock_server.uri())).await;
    let response = app
        .client
        .post(app.url("/admin/rates/refresh"))
        .header("X-API-Key", API_KEY)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let status: Value = response.json().await.unwrap();
    assert_eq!(status["last_outcome"], true);
    assert_eq!(status["currencies"], 3);

    assert_eq!(app.converter.convert(10.0, "USD", "EUR"), 5.0);
    let pricing: Value = app.get("/api/pricing?locale=es").await.json().await.unwrap();
    assert_eq!(pricing["plans"][1]["monthly_price"], 5.0);
}

#[tokio::test]
async fn test_admin_refresh_failure_keeps_previous_rates() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&mock_server)
        .await;

    let app = spawn_app(&mock_server.uri()).await;
    let response = app
        .client
        .post(app.url("/admin/rates/refresh"))
        .header("X-API-Key", API_KEY)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 502);
    assert_eq!(app.converter.convert(9.99, "USD", "EUR"), 9.19);
}

#[tokio::test]
async fn test_gated_refresh_calls_feed_once_per_day() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rates": {"EUR": 0.9}})))
        .expect(2)
        .mount(&mock_server)
        .await;

    let clock = fixed_clock();
    let converter = CurrencyConverter::with_snapshot(clock.clone());
    let feed = HttpRateFeed::new(&mock_server.uri())
        .unwrap()
        .with_retry(RetryConfig::new(1, Duration::ZERO));

    assert!(converter.refresh_rates(&feed).await);
    clock.advance(chrono::Duration::hours(12));
    assert!(converter.refresh_rates(&feed).await);
    clock.advance(chrono::Duration::hours(12));
    assert!(converter.refresh_rates(&feed).await);

    assert_eq!(converter.table().as_of(), clock.now());
}

#[tokio::test]
async fn test_feed_name_is_url() {
    let feed = HttpRateFeed::new("https://rates.example.com/latest").unwrap();
    assert_eq!(feed.name(), "https://rates.example.com/latest");
}

// ==================== Resolver + Sitemap Wiring Tests ====================

#[test]
fn test_resolver_priority_end_to_end() {
    let resolver = LocaleResolver::new(Arc::new(LanguageCatalog::builtin()), GeoLocaleMap::builtin());

    let ctx = RequestContext::new()
        .with_cookie("unsupported")
        .with_path("/ko/pricing")
        .with_geo("DE");
    let resolved = resolver.resolve(&ctx);

    assert_eq!(resolved.locale.code, "ko");
    assert_eq!(resolved.source, LocaleSource::Path);
}

#[test]
fn test_write_all_full_catalog() {
    let catalog = LanguageCatalog::builtin();
    let builder = HreflangSetBuilder::new(
        Arc::new(SubdirectoryStrategy::new("https://zynstro.com", "en")),
        "en",
    );
    let emitter = SitemapEmitter::new("https://zynstro.com", builder, fixed_clock());
    let dir = tempfile::tempdir().unwrap();

    let written = emitter
        .write_all(dir.path(), &default_pages(), catalog.all_locales())
        .unwrap();

    // index + main + images + robots + one per locale
    assert_eq!(written.len(), catalog.len() + 4);
    assert!(dir.path().join("sitemap-zh-TW.xml").exists());

    let main = std::fs::read_to_string(dir.path().join("sitemap-main.xml")).unwrap();
    assert_eq!(main.matches("<url>").count(), default_pages().len() * catalog.len());
    assert_eq!(
        main.matches("<xhtml:link").count(),
        default_pages().len() * catalog.len() * (catalog.len() + 1)
    );
}
