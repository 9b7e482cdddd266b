//! JSON API server over an in-memory content snapshot, rebuilt on change.

use super::site::{load_config, load_site};
use crate::agent;
use anyhow::{Context, Result};
use axum::{
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use quire_core::{
    Config, ContentRepository, Route, RouteTarget, SearchEngine, Strictness, Visibility,
};
use serde::Deserialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
struct AppState {
    data: Arc<RwLock<SiteData>>,
    visibility: Visibility,
}

struct SiteData {
    config: Config,
    repo: ContentRepository,
    engine: SearchEngine,
    /// Message of the last failed rebuild, cleared by a successful one
    last_error: Option<String>,
}

fn build_site_data(config_path: &Path, visibility: Visibility) -> Result<SiteData> {
    let config = load_config(config_path)?;
    let repo = load_site(&config, visibility, Strictness::Lenient)?;
    let engine = repo.search_engine();
    Ok(SiteData {
        config,
        repo,
        engine,
        last_error: None,
    })
}

/// Start the API server with file watching
pub async fn serve(config_path: &Path, port: Option<u16>, visibility: Visibility) -> Result<()> {
    let site_data = build_site_data(config_path, visibility).context("Failed to load site")?;
    let content_dir = site_data.config.content_dir();
    let port = port.unwrap_or(site_data.config.server.port);
    let config_path_buf: PathBuf = config_path.to_path_buf();
    let shared_data = Arc::new(RwLock::new(site_data));

    tracing::info!("Starting server on http://localhost:{}", port);
    println!("\n🚀 Serving API at http://localhost:{}/api/posts", port);
    println!("   Press Ctrl+C to stop\n");

    // Set up file watching for live rebuilds
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut _watcher = RecommendedWatcher::new(
        move |res| {
            let _ = tx.send(res);
        },
        notify::Config::default(),
    )
    .context("Failed to initialize file watcher")?;

    _watcher
        .watch(&content_dir, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {:?}", content_dir))?;

    tokio::spawn({
        let data_handle = shared_data.clone();
        async move {
            while let Some(event) = rx.recv().await {
                match event {
                    Ok(_ev) => {
                        // Debounce a bit by draining pending events
                        while rx.try_recv().is_ok() {}
                        tracing::info!("Change detected, reloading content...");
                        reload(&data_handle, &config_path_buf, visibility).await;
                    }
                    Err(err) => tracing::warn!("Watcher error: {}", err),
                }
            }
        }
    });

    let app = router(AppState {
        data: shared_data,
        visibility,
    });

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Rebuild the snapshot off the async runtime and swap it in.
///
/// On failure the previous snapshot keeps serving and the error is recorded
/// for `/api/status`.
async fn reload(data: &RwLock<SiteData>, config_path: &Path, visibility: Visibility) {
    let res = tokio::task::spawn_blocking({
        let config_path = config_path.to_path_buf();
        move || build_site_data(&config_path, visibility)
    })
    .await;

    match res {
        Ok(Ok(fresh)) => {
            let mut data = data.write().await;
            *data = fresh;
            tracing::info!("Reload complete: {} documents", data.repo.len());
        }
        Ok(Err(e)) => {
            tracing::error!("Reload failed: {:?}", e);
            data.write().await.last_error = Some(format!("{:#}", e));
        }
        Err(e) => tracing::error!("Reload task panicked: {}", e),
    }
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/posts", get(api_posts))
        .route("/api/tags", get(api_tags))
        .route("/api/tag/{tag}", get(api_tag))
        .route("/api/post/{slug}", get(api_post))
        .route("/api/search", get(api_search))
        .route("/api/route", get(api_route))
        .route("/api/status", get(api_status))
        .fallback(api_not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---- API handlers ----

#[derive(Deserialize)]
struct PageParams {
    page: Option<usize>,
}

#[derive(Deserialize)]
struct SearchParams {
    q: Option<String>,
    limit: Option<usize>,
    typeahead: Option<bool>,
}

#[derive(Deserialize)]
struct RouteParams {
    path: Option<String>,
}

fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "not found", None)
}

fn error_response(
    status: StatusCode,
    message: &str,
    detail: Option<&dyn std::fmt::Display>,
) -> Response {
    (status, Json(agent::error_payload(message, detail))).into_response()
}

impl AppState {
    /// Raw error text is only shown when drafts are, i.e. in development.
    fn development(&self) -> bool {
        self.visibility == Visibility::All
    }
}

async fn api_not_found() -> Response {
    not_found()
}

async fn api_posts(State(state): State<AppState>, Query(params): Query<PageParams>) -> Response {
    let route = Route::Listing(params.page.unwrap_or(1));
    resolve(&state, &route).await
}

async fn api_tags(State(state): State<AppState>) -> Response {
    let data = state.data.read().await;
    Json(agent::envelope("tags.list", data.repo.tag_buckets())).into_response()
}

async fn api_tag(
    AxumPath(tag): AxumPath<String>,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Response {
    let route = Route::Tag {
        tag,
        page: params.page.unwrap_or(1),
    };
    resolve(&state, &route).await
}

async fn api_post(AxumPath(slug): AxumPath<String>, State(state): State<AppState>) -> Response {
    let data = state.data.read().await;
    match data.repo.get_document(&slug) {
        Some(doc) => {
            let payload = agent::document_payload(&data.config, doc);
            Json(agent::envelope("document.full", payload)).into_response()
        }
        None => not_found(),
    }
}

async fn api_search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    let query = params.q.unwrap_or_default();
    let data = state.data.read().await;

    let mut options = if params.typeahead.unwrap_or(false) {
        data.config.search.typeahead_options()
    } else {
        data.config.search.options()
    };
    if let Some(limit) = params.limit {
        options.limit = limit;
    }

    let results = data.engine.search(&query, &options);
    let payload = agent::envelope(
        "search.results",
        agent::SearchData {
            query,
            limit: options.limit,
            total: results.len(),
            results: results
                .iter()
                .map(|r| agent::search_hit(&data.config, r))
                .collect(),
        },
    );
    Json(payload).into_response()
}

async fn api_route(State(state): State<AppState>, Query(params): Query<RouteParams>) -> Response {
    let raw = params.path.unwrap_or_else(|| "/".to_string());
    match Route::parse(&raw) {
        Some(route) => resolve(&state, &route).await,
        None if state.development() => {
            let detail = format!("'{}' is not a site path", raw);
            error_response(StatusCode::NOT_FOUND, "not found", Some(&detail))
        }
        None => not_found(),
    }
}

async fn resolve(state: &AppState, route: &Route) -> Response {
    let data = state.data.read().await;
    let payload = match data.repo.resolve_route(route, data.config.page_size) {
        RouteTarget::Listing(mut page) => {
            data.config.rebase_posts(&mut page.posts);
            json!({ "kind": "listing", "listing": page })
        }
        RouteTarget::Document(doc) => {
            json!({ "kind": "document", "document": agent::document_payload(&data.config, doc) })
        }
        RouteTarget::Tags(tags) => json!({ "kind": "tags", "tags": tags }),
        RouteTarget::Tag(mut page) => {
            data.config.rebase_posts(&mut page.posts);
            json!({ "kind": "tag", "tag": page })
        }
        RouteTarget::Search { query } => {
            let results = data.engine.search(&query, &data.config.search.options());
            let hits: Vec<_> = results
                .iter()
                .map(|r| agent::search_hit(&data.config, r))
                .collect();
            json!({ "kind": "search", "query": query, "results": hits })
        }
        RouteTarget::NotFound => return not_found(),
    };
    Json(agent::envelope("route.resolved", payload)).into_response()
}

/// Load health. Failure messages are only exposed in development.
async fn api_status(State(state): State<AppState>) -> Response {
    let data = state.data.read().await;

    if let Some(error) = &data.last_error {
        let detail = state.development().then_some(error as &dyn std::fmt::Display);
        return error_response(StatusCode::SERVICE_UNAVAILABLE, "content reload failed", detail);
    }

    let failures = data.repo.failures();
    let mut payload = json!({
        "documents": data.repo.len(),
        "failures": failures.len(),
        "healthy": true,
    });
    if state.development() {
        payload["details"] = json!(failures);
    }
    Json(agent::envelope("site.status", payload)).into_response()
}
