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

use super::domain::DecisionDraft;
use super::evaluation::EvaluationError;
use super::monitoring::MonitoringSnapshot;
use super::oracle::ScoreProvider;
use super::repository::DecisionLedger;
use super::service::{
    BoardServiceError, BoardSimulationService, EvaluationRequest, SimulationRequest,
};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DecisionQuery {
    pub limit: Option<usize>,
}

/// Router builder exposing the funding model, simulations, and the decision ledger.
pub fn board_router<P, L>(service: Arc<BoardSimulationService<P, L>>) -> Router
where
    P: ScoreProvider + ?Sized + 'static,
    L: DecisionLedger + ?Sized + 'static,
{
    Router::new()
        .route("/api/v1/board/evaluations", post(evaluate_handler::<P, L>))
        .route(
            "/api/v1/board/evaluations/batch",
            post(batch_handler::<P, L>),
        )
        .route("/api/v1/board/simulations", post(simulate_handler::<P, L>))
        .route(
            "/api/v1/board/decisions",
            get(list_decisions_handler::<P, L>).post(record_handler::<P, L>),
        )
        .route("/api/v1/board/framework", get(framework_handler::<P, L>))
        .route("/api/v1/board/monitoring/review", post(monitoring_handler))
        .route("/api/writeBoardDecision", post(legacy_write_handler::<P, L>))
        .route(
            "/api/proxy/writeBoardDecision",
            post(legacy_write_handler::<P, L>),
        )
        .route("/api/getBoardDecisions", post(legacy_list_handler::<P, L>))
        .route(
            "/api/proxy/getBoardDecisions",
            post(legacy_list_handler::<P, L>),
        )
        .with_state(service)
}

pub(crate) async fn evaluate_handler<P, L>(
    State(service): State<Arc<BoardSimulationService<P, L>>>,
    axum::Json(request): axum::Json<EvaluationRequest>,
) -> Response
where
    P: ScoreProvider + ?Sized + 'static,
    L: DecisionLedger + ?Sized + 'static,
{
    match service.evaluate(request) {
        Ok(evaluation) => (StatusCode::OK, axum::Json(evaluation)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn batch_handler<P, L>(
    State(service): State<Arc<BoardSimulationService<P, L>>>,
    body: String,
) -> Response
where
    P: ScoreProvider + ?Sized + 'static,
    L: DecisionLedger + ?Sized + 'static,
{
    match service.evaluate_batch(body.as_bytes()) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn simulate_handler<P, L>(
    State(service): State<Arc<BoardSimulationService<P, L>>>,
    axum::Json(request): axum::Json<SimulationRequest>,
) -> Response
where
    P: ScoreProvider + ?Sized + 'static,
    L: DecisionLedger + ?Sized + 'static,
{
    match service.simulate(request).await {
        Ok(report) => {
            let status = if report.decision.is_some() {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (status, axum::Json(report)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn record_handler<P, L>(
    State(service): State<Arc<BoardSimulationService<P, L>>>,
    axum::Json(draft): axum::Json<DecisionDraft>,
) -> Response
where
    P: ScoreProvider + ?Sized + 'static,
    L: DecisionLedger + ?Sized + 'static,
{
    match service.record(draft) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_decisions_handler<P, L>(
    State(service): State<Arc<BoardSimulationService<P, L>>>,
    Query(query): Query<DecisionQuery>,
) -> Response
where
    P: ScoreProvider + ?Sized + 'static,
    L: DecisionLedger + ?Sized + 'static,
{
    match service.decisions(query.limit) {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn framework_handler<P, L>(
    State(service): State<Arc<BoardSimulationService<P, L>>>,
) -> Response
where
    P: ScoreProvider + ?Sized + 'static,
    L: DecisionLedger + ?Sized + 'static,
{
    (StatusCode::OK, axum::Json(service.framework())).into_response()
}

pub(crate) async fn monitoring_handler(
    axum::Json(snapshot): axum::Json<MonitoringSnapshot>,
) -> Response {
    (StatusCode::OK, axum::Json(snapshot.review())).into_response()
}

/// Dashboard write endpoint: same validation as the v1 route, legacy `{"status":"saved"}` body.
pub(crate) async fn legacy_write_handler<P, L>(
    State(service): State<Arc<BoardSimulationService<P, L>>>,
    axum::Json(draft): axum::Json<DecisionDraft>,
) -> Response
where
    P: ScoreProvider + ?Sized + 'static,
    L: DecisionLedger + ?Sized + 'static,
{
    match service.record(draft) {
        Ok(_) => (StatusCode::OK, axum::Json(json!({ "status": "saved" }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn legacy_list_handler<P, L>(
    State(service): State<Arc<BoardSimulationService<P, L>>>,
) -> Response
where
    P: ScoreProvider + ?Sized + 'static,
    L: DecisionLedger + ?Sized + 'static,
{
    match service.decisions(None) {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: BoardServiceError) -> Response {
    let status = error.status_code();
    let payload = match &error {
        BoardServiceError::Evaluation(EvaluationError::Validation(validation)) => json!({
            "error": error.to_string(),
            "criterion": validation.criterion().map(|criterion| criterion.key()),
        }),
        _ => json!({
            "error": error.to_string(),
        }),
    };
    (status, axum::Json(payload)).into_response()
}
