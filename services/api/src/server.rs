use crate::cli::ServeArgs;
use crate::infra::{score_provider, AppState, StaticAssets};
use crate::routes::with_board_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use portfolio_board::config::AppConfig;
use portfolio_board::error::AppError;
use portfolio_board::storage::SqliteStore;
use portfolio_board::telemetry;
use portfolio_board::workflows::board::{BoardServiceError, BoardSimulationService, WeightVector};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(database) = args.database.take() {
        config.storage.database_path = database;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(SqliteStore::open(&config.storage.database_path)?);
    let provider = score_provider(&config.oracle).map_err(BoardServiceError::from)?;
    let board_service = Arc::new(BoardSimulationService::new(
        provider,
        store.clone(),
        WeightVector::STANDARD,
    ));

    let app = with_board_routes(board_service, store)
        .layer(Extension(app_state))
        .layer(Extension(StaticAssets {
            root: config.server.static_dir.clone(),
        }))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        database = %config.storage.database_path.display(),
        "portfolio board service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
