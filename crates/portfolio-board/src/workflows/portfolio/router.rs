use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::{PortfolioInitiative, PortfolioRepository, PortfolioSummary, DEFAULT_PORTFOLIO_LIMIT};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PortfolioQuery {
    pub limit: Option<usize>,
}

/// Router builder exposing the portfolio query, including the dashboard's legacy endpoint.
pub fn portfolio_router<R>(repository: Arc<R>) -> Router
where
    R: PortfolioRepository + ?Sized + 'static,
{
    Router::new()
        .route("/api/v1/portfolio/initiatives", get(initiatives_handler::<R>))
        .route("/api/queryPortfolio", post(legacy_query_handler::<R>))
        .route("/api/proxy/queryPortfolio", post(legacy_query_handler::<R>))
        .with_state(repository)
}

pub(crate) async fn initiatives_handler<R>(
    State(repository): State<Arc<R>>,
    Query(query): Query<PortfolioQuery>,
) -> Response
where
    R: PortfolioRepository + ?Sized + 'static,
{
    let limit = query.limit.unwrap_or(DEFAULT_PORTFOLIO_LIMIT);
    match repository.initiatives(limit) {
        Ok(rows) => {
            let payload = json!({
                "summary": PortfolioSummary::from_rows(&rows),
                "initiatives": rows,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => failure(error.to_string()),
    }
}

pub(crate) async fn legacy_query_handler<R>(State(repository): State<Arc<R>>) -> Response
where
    R: PortfolioRepository + ?Sized + 'static,
{
    match repository.initiatives(DEFAULT_PORTFOLIO_LIMIT) {
        Ok(rows) => (StatusCode::OK, axum::Json::<Vec<PortfolioInitiative>>(rows)).into_response(),
        Err(error) => failure(error.to_string()),
    }
}

fn failure(message: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        axum::Json(json!({ "error": message })),
    )
        .into_response()
}
