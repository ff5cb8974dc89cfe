use crate::clock::Clock;
use crate::config::Config;
use crate::currency::{CurrencyConverter, HttpRateFeed};
use crate::hreflang::HreflangSetBuilder;
use crate::i18n::{GeoLocaleMap, LanguageCatalog, LocaleEntry, LocaleResolver, RequestContext, TextCatalog};
use crate::pricing::PricingCatalog;
use crate::security;
use crate::sitemap::{default_pages, Page, SitemapEmitter};
use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Country header set by the edge network.
pub const GEO_COUNTRY_HEADER: &str = "cf-ipcountry";

const SEO_CACHE_CONTROL: &str = "public, max-age=86400";

pub struct AppState {
    pub config: Config,
    pub resolver: LocaleResolver,
    pub hreflang: HreflangSetBuilder,
    pub sitemaps: SitemapEmitter,
    pub pages: Vec<Page>,
    pub converter: Arc<CurrencyConverter>,
    pub rate_feed: Arc<HttpRateFeed>,
    pub pricing: PricingCatalog,
    pub texts: TextCatalog,
}

impl AppState {
    /// Wire every component from configuration.
    pub fn new(
        config: Config,
        converter: Arc<CurrencyConverter>,
        rate_feed: Arc<HttpRateFeed>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let catalog = Arc::new(
            LanguageCatalog::builtin_with_default(&config.default_locale)
                .context("DEFAULT_LOCALE is not a supported locale")?,
        );
        let default_code = catalog.default_locale().code.clone();

        let strategy = config.url_strategy.build(&config.site_urls());
        let hreflang = HreflangSetBuilder::new(strategy, &default_code);
        let sitemaps = SitemapEmitter::new(&config.site_base_url, hreflang.clone(), clock);

        Ok(Self {
            resolver: LocaleResolver::new(catalog, GeoLocaleMap::builtin()),
            hreflang,
            sitemaps,
            pages: default_pages(),
            converter,
            rate_feed,
            pricing: PricingCatalog::builtin(),
            texts: TextCatalog::builtin(),
            config,
        })
    }

    fn locales(&self) -> &[LocaleEntry] {
        self.resolver.catalog().all_locales()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/locale", get(detect_locale).post(set_locale))
        .route("/api/hreflang", get(hreflang_set))
        .route("/api/pricing", get(pricing))
        .route("/api/metrics", get(metrics))
        .route("/admin/rates/refresh", post(refresh_rates))
        .route("/:file", get(seo_file))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `0.0.0.0:{port}` and serve until the process exits.
pub async fn serve(state: Arc<AppState>) -> Result<()> {
    let addr = format!("0.0.0.0:{}", state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("✓ Listening on {}", addr);
    axum::serve(listener, router(state))
        .await
        .context("HTTP server error")
}

// ==================== Request Context ====================

/// Value of cookie `name` from the `Cookie` header(s).
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
}

fn header_str(headers: &HeaderMap, name: impl axum::http::header::AsHeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Country code from the edge header, if it is two ASCII letters.
fn visitor_country(headers: &HeaderMap) -> Option<String> {
    header_str(headers, GEO_COUNTRY_HEADER)
        .map(|c| c.trim().to_ascii_uppercase())
        .filter(|c| c.len() == 2 && c.bytes().all(|b| b.is_ascii_alphabetic()))
}

pub fn context_from_headers(headers: &HeaderMap, cookie_name: &str, path: Option<&str>) -> RequestContext {
    RequestContext {
        cookie_value: cookie_value(headers, cookie_name),
        url_path: path.map(str::to_string),
        geo_country_code: visitor_country(headers),
        accept_language: header_str(headers, header::ACCEPT_LANGUAGE),
    }
}

fn insert_header(headers: &mut HeaderMap, name: &'static str, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(HeaderName::from_static(name), value);
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

// ==================== Handlers ====================

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let table = state.converter.table();
    Json(json!({
        "status": "ok",
        "locales": state.resolver.catalog().len(),
        "currencies": table.currencies(),
        "rates_as_of": table.as_of(),
    }))
}

#[derive(Debug, Deserialize)]
struct PathQuery {
    path: Option<String>,
}

#[derive(Debug, Serialize)]
struct DetectedLocale<'a> {
    locale: &'a LocaleEntry,
    source: &'static str,
    suggested: Option<&'a str>,
}

async fn detect_locale(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PathQuery>,
    headers: HeaderMap,
) -> Response {
    let ctx = context_from_headers(&headers, &state.config.locale_cookie_name, query.path.as_deref());
    let resolved = state.resolver.resolve(&ctx);
    let suggested = state.resolver.suggest(&ctx).map(|l| l.code.as_str());

    let mut response_headers = HeaderMap::new();
    insert_header(&mut response_headers, "x-detected-language", &resolved.locale.code);
    insert_header(&mut response_headers, "x-locale-source", resolved.source.as_str());
    if let Some(country) = &ctx.geo_country_code {
        insert_header(&mut response_headers, "x-visitor-country", country);
    }
    if let Some(code) = suggested {
        insert_header(&mut response_headers, "x-suggested-language", code);
    }
    response_headers.insert(
        header::VARY,
        HeaderValue::from_static("Accept-Language, Cookie, CF-IPCountry"),
    );

    let body = DetectedLocale {
        locale: &resolved.locale,
        source: resolved.source.as_str(),
        suggested,
    };
    (response_headers, Json(body)).into_response()
}

#[derive(Debug, Deserialize)]
struct SetLocaleRequest {
    locale: String,
}

async fn set_locale(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SetLocaleRequest>,
) -> Response {
    let entry = match state.resolver.catalog().lookup(&request.locale) {
        Ok(entry) => entry,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let cookie = format!(
        "{}={}; Max-Age={}; Path=/; SameSite=Lax",
        state.config.locale_cookie_name,
        entry.code,
        state.config.locale_cookie_max_age_secs()
    );

    let mut headers = HeaderMap::new();
    insert_header(&mut headers, "set-cookie", &cookie);
    (StatusCode::OK, headers, Json(entry)).into_response()
}

async fn hreflang_set(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PathQuery>,
) -> impl IntoResponse {
    let path = query.path.unwrap_or_else(|| "/".to_string());
    Json(state.hreflang.build(&path, state.locales()))
}

#[derive(Debug, Deserialize)]
struct PricingQuery {
    locale: Option<String>,
    currency: Option<String>,
}

async fn pricing(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PricingQuery>,
    headers: HeaderMap,
) -> Response {
    let catalog = state.resolver.catalog();
    let locale = match query.locale.as_deref().filter(|l| !l.trim().is_empty()) {
        Some(code) => match catalog.lookup(code) {
            Ok(entry) => entry.clone(),
            Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
        },
        None => {
            let ctx = context_from_headers(&headers, &state.config.locale_cookie_name, None);
            state.resolver.resolve(&ctx).locale
        }
    };

    let plans = state.pricing.localize(
        &locale,
        query.currency.as_deref(),
        &state.converter,
        &state.texts,
    );
    let currency = plans
        .first()
        .map(|p| p.currency.clone())
        .unwrap_or_else(|| state.converter.currency_for_locale(&locale).to_string());

    Json(json!({
        "locale": locale.code,
        "currency": currency,
        "rates_as_of": state.converter.table().as_of(),
        "plans": plans,
    }))
    .into_response()
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.resolver.metrics().report())
}

async fn refresh_rates(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if !security::is_authorized(&headers, state.config.api_key.as_deref()) {
        warn!("Rejected rate refresh with missing or invalid API key");
        return error_response(StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    let refreshed = state.converter.force_refresh(state.rate_feed.as_ref()).await;
    let status = state.converter.status().await;

    let code = if refreshed {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    (code, Json(status)).into_response()
}

async fn seo_file(State(state): State<Arc<AppState>>, Path(file): Path<String>) -> Response {
    let Some(contents) = state.sitemaps.render_file(&file, &state.pages, state.locales()) else {
        return error_response(StatusCode::NOT_FOUND, format!("Not found: {}", file));
    };

    let content_type = if file.ends_with(".xml") {
        "application/xml; charset=utf-8"
    } else {
        "text/plain; charset=utf-8"
    };

    (
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, SEO_CACHE_CONTROL),
        ],
        contents,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(HeaderName::from_static(name), HeaderValue::from_static(value));
        }
        map
    }

    // ==================== Cookie Tests ====================

    #[test]
    fn test_cookie_value_found() {
        let h = headers(&[("cookie", "theme=dark; lang_pref=es-MX; other=1")]);
        assert_eq!(cookie_value(&h, "lang_pref").as_deref(), Some("es-MX"));
    }

    #[test]
    fn test_cookie_value_across_headers() {
        let h = headers(&[("cookie", "a=1"), ("cookie", "lang_pref=fr")]);
        assert_eq!(cookie_value(&h, "lang_pref").as_deref(), Some("fr"));
    }

    #[test]
    fn test_cookie_value_requires_exact_name() {
        let h = headers(&[("cookie", "xlang_pref=de; lang=it")]);
        assert_eq!(cookie_value(&h, "lang_pref"), None);
    }

    // ==================== Context Tests ====================

    #[test]
    fn test_context_from_headers() {
        let h = headers(&[
            ("cookie", "lang_pref=ja"),
            ("cf-ipcountry", "mx"),
            ("accept-language", "de-DE,de;q=0.9"),
        ]);
        let ctx = context_from_headers(&h, "lang_pref", Some("/es/pricing"));

        assert_eq!(ctx.cookie_value.as_deref(), Some("ja"));
        assert_eq!(ctx.url_path.as_deref(), Some("/es/pricing"));
        assert_eq!(ctx.geo_country_code.as_deref(), Some("MX"));
        assert_eq!(ctx.accept_language.as_deref(), Some("de-DE,de;q=0.9"));
    }

    #[test]
    fn test_context_ignores_unknown_country_markers() {
        // T1 marks Tor traffic
        let h = headers(&[("cf-ipcountry", "T1")]);
        assert_eq!(context_from_headers(&h, "lang_pref", None).geo_country_code, None);
    }
}
