use metrics_exporter_prometheus::PrometheusHandle;
use portfolio_board::config::OracleConfig;
use portfolio_board::workflows::board::{
    Criterion, GenerativeScoreProvider, OracleError, ScoreProvider, UnconfiguredScoreProvider,
    WeightVector,
};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Root of the built dashboard bundle served for non-API paths.
#[derive(Clone, Debug)]
pub(crate) struct StaticAssets {
    pub(crate) root: PathBuf,
}

/// Generative provider when an API key is configured, otherwise a provider that refuses every
/// simulation so the rest of the API keeps working.
pub(crate) fn score_provider(config: &OracleConfig) -> Result<Arc<dyn ScoreProvider>, OracleError> {
    match GenerativeScoreProvider::from_config(config)? {
        Some(provider) => {
            info!(model = %config.model, "board simulations enabled");
            Ok(Arc::new(provider))
        }
        None => {
            warn!("GEMINI_API_KEY not set; board simulations are disabled");
            Ok(Arc::new(UnconfiguredScoreProvider))
        }
    }
}

/// Parses `--weights`: either six comma-separated numbers in criterion order or
/// `criterion=weight` pairs naming every criterion.
pub(crate) fn parse_weights(raw: &str) -> Result<WeightVector, String> {
    let parts: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

    if parts.iter().any(|part| part.contains('=')) {
        let mut entries = Vec::with_capacity(parts.len());
        for part in parts {
            let (name, value) = part
                .split_once('=')
                .ok_or_else(|| format!("expected criterion=weight, found '{part}'"))?;
            let value = value
                .trim()
                .parse::<f64>()
                .map_err(|err| format!("weight for '{}' is not a number ({err})", name.trim()))?;
            entries.push((name.trim().to_string(), value));
        }
        return WeightVector::from_entries(entries).map_err(|err| err.to_string());
    }

    if parts.len() != Criterion::ALL.len() {
        return Err(format!(
            "expected {} weights in criterion order, found {}",
            Criterion::ALL.len(),
            parts.len()
        ));
    }

    let mut weights = [0.0; 6];
    for (slot, part) in weights.iter_mut().zip(parts) {
        *slot = part
            .parse::<f64>()
            .map_err(|err| format!("'{part}' is not a number ({err})"))?;
    }
    WeightVector::try_new(weights).map_err(|err| err.to_string())
}
