use crate::infra::{AppState, StaticAssets};
use axum::extract::Request;
use axum::http::{header, HeaderValue, Method, StatusCode, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum::Json;
use portfolio_board::workflows::board::{
    board_router, BoardSimulationService, DecisionLedger, ScoreProvider,
};
use portfolio_board::workflows::portfolio::{portfolio_router, PortfolioRepository};
use serde_json::json;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

const ALLOWED_ORIGIN: &str = "*";
const ALLOWED_HEADERS: &str = "Origin, X-Requested-With, Content-Type, Accept";
const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";

pub(crate) fn with_board_routes<P, L, R>(
    service: Arc<BoardSimulationService<P, L>>,
    portfolio: Arc<R>,
) -> axum::Router
where
    P: ScoreProvider + ?Sized + 'static,
    L: DecisionLedger + ?Sized + 'static,
    R: PortfolioRepository + ?Sized + 'static,
{
    board_router(service)
        .merge(portfolio_router(portfolio))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .fallback(spa_fallback)
        .layer(axum::middleware::from_fn(cors))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Permissive CORS on every response; API preflights are answered here with 204.
pub(crate) async fn cors(request: Request, next: Next) -> Response {
    let preflight = request.method() == Method::OPTIONS && is_api_path(request.uri().path());
    let mut response = if preflight {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOWED_ORIGIN),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    response
}

/// Unknown API paths get a JSON 404; everything else is served from the dashboard bundle with
/// `index.html` as the client-side routing fallback.
pub(crate) async fn spa_fallback(
    Extension(assets): Extension<StaticAssets>,
    method: Method,
    uri: Uri,
) -> Response {
    if is_api_path(uri.path()) {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "API route not found" })),
        )
            .into_response();
    }

    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    if let Some(path) = asset_path(&assets.root, uri.path()) {
        if let Ok(bytes) = tokio::fs::read(&path).await {
            return file_response(&path, bytes);
        }
    }

    let index = assets.root.join("index.html");
    match tokio::fs::read(&index).await {
        Ok(bytes) => file_response(&index, bytes),
        Err(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "dashboard bundle not found" })),
        )
            .into_response(),
    }
}

fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

/// Maps a request path onto the asset root, refusing anything that would escape it.
fn asset_path(root: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = Path::new(request_path.trim_start_matches('/'));
    if relative.as_os_str().is_empty() {
        return None;
    }
    if relative
        .components()
        .any(|component| !matches!(component, Component::Normal(_)))
    {
        return None;
    }
    Some(root.join(relative))
}

fn file_response(path: &Path, bytes: Vec<u8>) -> Response {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, mime.essence_str().to_string())],
        bytes,
    )
        .into_response()
}
