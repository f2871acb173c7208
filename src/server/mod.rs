//! HTTP server with lazily generated, periodically revalidated pages

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use cookie::Cookie;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use url::Url;

use crate::cache::{Lookup, PageCache};
use crate::content::DetailPage;
use crate::generator::{Generator, ListingMode};
use crate::helpers::{post_path, EXIT_PREVIEW_PATH, HOME_PATH, LOAD_MORE_PATH};
use crate::prismic::{ContentSource, PrismicClient, PREVIEW_COOKIE};
use crate::site::Site;
use crate::templates::{PostCard, STYLESHEET};
use crate::Blog;

/// Route entering preview mode
pub const PREVIEW_PATH: &str = "/api/preview";

/// Shared server state
pub struct AppState<S> {
    pub site: Site<S>,
    pub generator: Generator,
    pub cache: PageCache,
}

/// A page the server knows how to build
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Listing,
    Post(String),
}

impl Target {
    fn key(&self) -> String {
        match self {
            Target::Listing => HOME_PATH.to_string(),
            Target::Post(slug) => post_path(slug),
        }
    }
}

impl<S: ContentSource> AppState<S> {
    pub fn new(site: Site<S>, generator: Generator) -> Self {
        let cache = PageCache::new(site.config().revalidate());
        Self {
            site,
            generator,
            cache,
        }
    }

    /// Render a page, `None` when its post does not exist
    async fn render(&self, target: &Target, preview: Option<&str>) -> crate::Result<Option<String>> {
        match target {
            Target::Listing => {
                let listing = self.site.listing(preview).await?;
                self.generator
                    .render_listing(&listing, ListingMode::Served, preview.is_some())
                    .map(Some)
            }
            Target::Post(slug) => match DetailPage::from(self.site.post(slug, preview).await?) {
                DetailPage::NotFound => Ok(None),
                page => self
                    .generator
                    .render_detail(&page, preview.is_some())
                    .map(Some),
            },
        }
    }

    /// Render the listing and the posts of its first page into the cache
    pub async fn warm(&self) -> crate::Result<usize> {
        let listing = self.site.listing(None).await?;
        let html = self
            .generator
            .render_listing(&listing, ListingMode::Served, false)?;
        self.cache.insert(HOME_PATH, html).await;

        for summary in listing.posts() {
            let target = Target::Post(summary.slug.clone());
            if let Some(html) = self.render(&target, None).await? {
                self.cache.insert(&target.key(), html).await;
            }
        }
        Ok(self.cache.len().await)
    }

    /// Re-render a stale page; the stale copy stays when this fails
    async fn revalidate(&self, target: Target) {
        let key = target.key();
        let Some(generation) = self.cache.begin(&key) else {
            return;
        };

        match self.render(&target, None).await {
            Ok(Some(html)) => {
                generation.finish(html).await;
                tracing::info!("Revalidated {}", key);
            }
            Ok(None) => {
                tracing::info!("{} no longer exists, evicting", key);
                generation.discard().await;
            }
            Err(e) => {
                tracing::warn!("Revalidating {} failed, keeping stale page: {}", key, e);
                generation.postpone().await;
            }
        }
    }

    fn loading(&self, target: &Target) -> Response {
        let page = match target {
            Target::Listing => self.generator.render_listing_loading(),
            Target::Post(_) => self.generator.render_detail(&DetailPage::Loading, false),
        };
        match page {
            Ok(html) => ([(header::CACHE_CONTROL, "no-store")], Html(html)).into_response(),
            Err(e) => e.into_response(),
        }
    }

    fn not_found(&self, preview: bool) -> Response {
        match self.generator.render_detail(&DetailPage::NotFound, preview) {
            Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
            Err(e) => e.into_response(),
        }
    }
}

/// Build the application router
pub fn router<S: ContentSource + 'static>(state: Arc<AppState<S>>, public_dir: PathBuf) -> Router {
    Router::new()
        .route(HOME_PATH, get(index::<S>))
        .route("/post/:slug", get(post::<S>))
        .route(LOAD_MORE_PATH, get(load_more::<S>))
        .route(PREVIEW_PATH, get(enter_preview::<S>))
        .route(EXIT_PREVIEW_PATH, get(exit_preview))
        .route("/styles.css", get(stylesheet))
        .fallback_service(ServeDir::new(public_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(blog: &Blog, ip: &str, port: u16) -> Result<()> {
    let site = Site::new(PrismicClient::new(&blog.config)?, blog.config.clone());
    let state = Arc::new(AppState::new(site, blog.generator()?));

    let pages = state.warm().await?;
    tracing::info!("Pre-rendered {} pages", pages);

    let app = router(state, blog.public_dir.clone());

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn index<S: ContentSource + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Response {
    serve(state, Target::Listing, preview_ref(&headers)).await
}

async fn post<S: ContentSource + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Response {
    serve(state, Target::Post(slug), preview_ref(&headers)).await
}

/// Serve a page from the cache, generating it on first access
async fn serve<S: ContentSource + 'static>(
    state: Arc<AppState<S>>,
    target: Target,
    preview: Option<String>,
) -> Response {
    if let Some(preview) = preview.as_deref() {
        return match state.render(&target, Some(preview)).await {
            Ok(Some(html)) => ([(header::CACHE_CONTROL, "no-store")], Html(html)).into_response(),
            Ok(None) => state.not_found(true),
            Err(e) => e.into_response(),
        };
    }

    let key = target.key();
    match state.cache.lookup(&key).await {
        Lookup::Fresh(html) => Html(html).into_response(),
        Lookup::Stale(html) => {
            let background = Arc::clone(&state);
            tokio::spawn(async move { background.revalidate(target).await });
            Html(html).into_response()
        }
        Lookup::Missing => {
            let Some(generation) = state.cache.begin(&key) else {
                return state.loading(&target);
            };
            match state.render(&target, None).await {
                Ok(Some(html)) => {
                    generation.finish(html.clone()).await;
                    Html(html).into_response()
                }
                Ok(None) => state.not_found(false),
                Err(e) => e.into_response(),
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct LoadMoreParams {
    cursor: String,
}

/// A further page of the listing
#[derive(Debug, Serialize)]
pub struct LoadMoreResponse {
    pub results: Vec<PostCard>,
    pub next_page: Option<String>,
}

async fn load_more<S: ContentSource + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<LoadMoreParams>,
) -> crate::Result<Json<LoadMoreResponse>> {
    check_cursor(&state.site.config().api_endpoint, &params.cursor)?;

    let page = state.site.next_page(&params.cursor).await?;
    Ok(Json(LoadMoreResponse {
        results: page
            .results
            .iter()
            .map(|p| state.generator.post_card(p))
            .collect(),
        next_page: page.next_page,
    }))
}

/// Only follow cursors pointing at the configured content API
fn check_cursor(api_endpoint: &str, cursor: &str) -> crate::Result<()> {
    let foreign = || crate::Error::ForeignCursor(cursor.to_string());
    let api = Url::parse(api_endpoint)?;
    let target = Url::parse(cursor).map_err(|_| foreign())?;

    if target.scheme() == api.scheme()
        && target.host_str() == api.host_str()
        && target.port_or_known_default() == api.port_or_known_default()
    {
        Ok(())
    } else {
        Err(foreign())
    }
}

#[derive(Debug, Deserialize)]
struct PreviewParams {
    token: String,
    #[serde(rename = "documentId")]
    document_id: Option<String>,
}

async fn enter_preview<S: ContentSource + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<PreviewParams>,
) -> crate::Result<Response> {
    let location = match params.document_id.as_deref() {
        Some(id) => state.site.preview_location(&params.token, id).await?,
        None => HOME_PATH.to_string(),
    };
    tracing::info!("Entering preview, redirecting to {}", location);

    let cookie = Cookie::build((PREVIEW_COOKIE, params.token))
        .path("/")
        .http_only(true)
        .build();
    Ok((
        [(header::SET_COOKIE, cookie.encoded().to_string())],
        Redirect::temporary(&location),
    )
        .into_response())
}

async fn exit_preview() -> Response {
    let mut cookie = Cookie::build((PREVIEW_COOKIE, "")).path("/").build();
    cookie.make_removal();
    (
        [(header::SET_COOKIE, cookie.to_string())],
        Redirect::temporary(HOME_PATH),
    )
        .into_response()
}

async fn stylesheet() -> Response {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLESHEET).into_response()
}

/// The preview ref carried by the request, if any
fn preview_ref(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse_encoded)
        .filter_map(|cookie| cookie.ok())
        .find(|cookie| cookie.name() == PREVIEW_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

/// Error body for the JSON endpoints
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub errors: Vec<String>,
}

impl IntoResponse for crate::Error {
    fn into_response(self) -> Response {
        let status = match &self {
            crate::Error::ForeignCursor(_) => StatusCode::BAD_REQUEST,
            e if e.is_upstream() => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::error!("{}: {}", status, self);

        let errors = match status {
            StatusCode::BAD_REQUEST => vec![self.to_string()],
            _ => Vec::new(),
        };
        (
            status,
            Json(ErrorResponse {
                success: false,
                errors,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::prismic::memory::{self, MemorySource};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::time::Duration;
    use tower::ServiceExt;

    fn config(revalidate_secs: u64) -> SiteConfig {
        SiteConfig {
            api_endpoint: memory::ENDPOINT.to_string(),
            revalidate_secs,
            ..Default::default()
        }
    }

    fn state_with(source: MemorySource, revalidate_secs: u64) -> Arc<AppState<MemorySource>> {
        let config = config(revalidate_secs);
        let generator = Generator::new(&config).unwrap();
        Arc::new(AppState::new(Site::new(source, config), generator))
    }

    fn state() -> Arc<AppState<MemorySource>> {
        state_with(
            MemorySource::new(vec![
                memory::post("A", "first", "First", 1, 10),
                memory::post("B", "second", "Second", 2, 10),
                memory::post("C", "third", "Third", 3, 10),
            ]),
            60,
        )
    }

    fn app(state: &Arc<AppState<MemorySource>>) -> Router {
        router(Arc::clone(state), std::env::temp_dir().join("spacetraveling-none"))
    }

    async fn get(app: Router, uri: &str, cookie: Option<&str>) -> (StatusCode, HeaderMap, String) {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let response = app
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_listing_page() {
        let state = state();
        let (status, _, body) = get(app(&state), "/", None).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"id="post-third""#));
        assert!(body.contains("Load more posts"));
    }

    #[tokio::test]
    async fn test_pages_are_cached() {
        let state = state();
        get(app(&state), "/post/second", None).await;
        let searches = state.site.source().searches().len();

        let (status, _, body) = get(app(&state), "/post/second", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Second"));
        assert_eq!(state.site.source().searches().len(), searches);
    }

    #[tokio::test]
    async fn test_unknown_slug_is_404_and_not_cached() {
        let state = state();
        let (status, _, body) = get(app(&state), "/post/missing", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Post not found"));
        assert!(state.cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_loading_page_while_generating() {
        let state = state();
        let _generation = state.cache.begin("/post/second").unwrap();

        let (status, headers, body) = get(app(&state), "/post/second", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CACHE_CONTROL], "no-store");
        assert!(body.contains("Loading..."));
        assert!(body.contains(r#"http-equiv="refresh""#));
        assert!(state.site.source().searches().is_empty());
    }

    #[tokio::test]
    async fn test_listing_loading_page_has_home_title() {
        let state = state();
        let _generation = state.cache.begin(HOME_PATH).unwrap();

        let (status, headers, body) = get(app(&state), "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CACHE_CONTROL], "no-store");
        assert!(body.contains("<title>Home | spacetraveling.</title>"));
        assert!(!body.contains("<title>Post |"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_revalidation_waits_a_full_interval() {
        let state = state();
        let (_, _, first) = get(app(&state), "/post/first", None).await;

        tokio::time::advance(Duration::from_secs(61)).await;
        state.site.source().set_failing(true);
        let attempts = state.site.source().attempts();

        for _ in 0..5 {
            let (status, _, body) = get(app(&state), "/post/first", None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, first);
            // let the spawned revalidation run
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(state.site.source().attempts(), attempts + 1);
        assert!(matches!(state.cache.lookup("/post/first").await, Lookup::Fresh(_)));
        assert!(!state.cache.is_generating("/post/first"));
    }

    #[tokio::test]
    async fn test_stale_page_survives_failed_revalidation() {
        let state = state_with(
            MemorySource::new(vec![memory::post("A", "first", "First", 1, 10)]),
            0,
        );
        let (_, _, first) = get(app(&state), "/post/first", None).await;

        state.site.source().set_failing(true);
        let (status, _, second) = get(app(&state), "/post/first", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first, second);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(matches!(state.cache.lookup("/post/first").await, Lookup::Stale(_)));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_bad_gateway() {
        let state = state_with(MemorySource::failing(), 60);
        let (status, _, _) = get(app(&state), "/", None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(!state.cache.is_generating("/"));
    }

    #[tokio::test]
    async fn test_load_more_json() {
        let state = state();
        let listing = state.site.listing(None).await.unwrap();
        let cursor = listing.next_page().unwrap().to_string();

        let uri = format!(
            "/api/posts?cursor={}",
            percent_encoding::utf8_percent_encode(&cursor, percent_encoding::NON_ALPHANUMERIC)
        );
        let (status, _, body) = get(app(&state), &uri, None).await;
        assert_eq!(status, StatusCode::OK);

        let page: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(page["results"][0]["slug"], "second");
        assert_eq!(page["results"][0]["url"], "/post/second");
        assert_eq!(page["results"][0]["date"], "2 Mar 2021");
        assert!(page["next_page"].is_string());
    }

    #[tokio::test]
    async fn test_load_more_rejects_foreign_cursor() {
        let state = state();
        let (status, _, body) = get(
            app(&state),
            "/api/posts?cursor=http%3A%2F%2F169.254.169.254%2Flatest",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains(r#""success":false"#));
        assert!(state.site.source().searches().is_empty());
    }

    #[test]
    fn test_check_cursor() {
        let api = "https://blog.cdn.prismic.io/api/v2";
        assert!(check_cursor(api, "https://blog.cdn.prismic.io/api/v2/documents/search?page=2").is_ok());
        assert!(check_cursor(api, "http://blog.cdn.prismic.io/api/v2/documents/search").is_err());
        assert!(check_cursor(api, "https://evil.example/api/v2/documents/search").is_err());
        assert!(check_cursor(api, "not a url").is_err());
    }

    #[tokio::test]
    async fn test_enter_preview_sets_cookie_and_redirects() {
        let state = state();
        let (status, headers, _) = get(
            app(&state),
            "/api/preview?token=https%3A%2F%2Fblog.prismic.io%2Fpreviews%2Fabc&documentId=B",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(headers[header::LOCATION], "/post/second");
        let cookie = headers[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("io.prismic.preview="));
        assert!(cookie.contains("Path=/"));
    }

    #[tokio::test]
    async fn test_preview_bypasses_cache() {
        let mut source = MemorySource::new(vec![memory::post("B", "second", "Second", 2, 10)]);
        source.previews.insert(
            "draft".to_string(),
            vec![memory::post("B", "second", "Second draft", 2, 10)],
        );
        let state = state_with(source, 60);

        let (_, _, body) = get(app(&state), "/post/second", Some("io.prismic.preview=draft")).await;
        assert!(body.contains("Second draft"));
        assert!(body.contains("Exit preview mode"));
        assert!(state.cache.is_empty().await);

        let (_, _, body) = get(app(&state), "/post/second", None).await;
        assert!(!body.contains("Second draft"));
        assert!(!body.contains("Exit preview mode"));
    }

    #[tokio::test]
    async fn test_exit_preview_clears_cookie() {
        let state = state();
        let (status, headers, _) = get(app(&state), "/api/exit-preview", None).await;

        assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(headers[header::LOCATION], "/");
        let cookie = headers[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("io.prismic.preview=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_stylesheet() {
        let state = state();
        let (status, headers, body) = get(app(&state), "/styles.css", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "text/css; charset=utf-8");
        assert_eq!(body, STYLESHEET);
    }

    #[tokio::test]
    async fn test_warm_renders_first_listing_page() {
        let state = state();
        assert_eq!(state.warm().await.unwrap(), 2);
        assert!(matches!(state.cache.lookup("/").await, Lookup::Fresh(_)));
        assert!(matches!(state.cache.lookup("/post/third").await, Lookup::Fresh(_)));
        assert_eq!(state.cache.lookup("/post/first").await, Lookup::Missing);
    }
}
