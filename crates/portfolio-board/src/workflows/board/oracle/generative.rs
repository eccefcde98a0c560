use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use super::prompt::{response_schema, system_instruction, user_prompt};
use super::{OracleError, ScoreAssessment, ScoreProvider};
use crate::config::OracleConfig;
use crate::workflows::board::domain::Initiative;
use crate::workflows::board::evaluation::CriterionScores;
use crate::workflows::board::framework::GovernanceFramework;

/// Score provider backed by a hosted generative model answering with a fixed JSON schema.
pub struct GenerativeScoreProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    instruction: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Deserialize)]
struct SimulationPayload {
    scoring_breakdown: BTreeMap<String, f64>,
    #[serde(default)]
    weighted_composite_score: Option<f64>,
    #[serde(default)]
    decision_outcome: Option<String>,
    #[serde(default)]
    board_rationale_summary: String,
    #[serde(default)]
    identified_conditions_or_risk_mitigations: Vec<String>,
    #[serde(default)]
    executive_action_recommendation: String,
}

impl GenerativeScoreProvider {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| OracleError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
            instruction: system_instruction(&GovernanceFramework::standard()),
        })
    }

    /// `Ok(None)` when no API key is configured.
    pub fn from_config(config: &OracleConfig) -> Result<Option<Self>, OracleError> {
        match &config.api_key {
            Some(key) => Self::new(
                key.clone(),
                config.model.clone(),
                config.endpoint.clone(),
                config.timeout,
            )
            .map(Some),
            None => Ok(None),
        }
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    fn request_body(&self, initiative: &Initiative) -> serde_json::Value {
        json!({
            "systemInstruction": { "parts": [{ "text": self.instruction }] },
            "contents": [{ "role": "user", "parts": [{ "text": user_prompt(initiative) }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema(),
            }
        })
    }
}

#[async_trait]
impl ScoreProvider for GenerativeScoreProvider {
    async fn assess(&self, initiative: &Initiative) -> Result<ScoreAssessment, OracleError> {
        let started = Instant::now();
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(initiative))
            .send()
            .await
            .map_err(|err| OracleError::Transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| OracleError::Transport(err.to_string()))?;

        if !status.is_success() {
            warn!(
                model = %self.model,
                status = status.as_u16(),
                "board simulation request rejected"
            );
            return Err(OracleError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let assessment = parse_generate_response(&body)?;
        info!(
            model = %self.model,
            initiative_id = %initiative.reference(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "board simulation scores received"
        );
        Ok(assessment)
    }
}

pub(crate) fn parse_generate_response(body: &str) -> Result<ScoreAssessment, OracleError> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|err| OracleError::Malformed(err.to_string()))?;

    let text = response
        .candidates
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .flat_map(|content| content.parts)
        .filter_map(|part| part.text)
        .collect::<String>();
    if text.trim().is_empty() {
        return Err(OracleError::EmptyResponse);
    }

    parse_simulation_payload(&text)
}

fn parse_simulation_payload(text: &str) -> Result<ScoreAssessment, OracleError> {
    let payload: SimulationPayload =
        serde_json::from_str(text.trim()).map_err(|err| OracleError::Malformed(err.to_string()))?;
    let scores = CriterionScores::from_entries(payload.scoring_breakdown)?;

    Ok(ScoreAssessment {
        scores,
        rationale: payload.board_rationale_summary,
        conditions: payload.identified_conditions_or_risk_mitigations,
        recommendation: payload.executive_action_recommendation,
        reported_composite: payload.weighted_composite_score,
        reported_outcome: payload.decision_outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::board::evaluation::{Criterion, ValidationError};

    fn wrap(text: &str) -> String {
        json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
        })
        .to_string()
    }

    fn payload(regulatory: f64) -> String {
        json!({
            "initiative_name": "Claims Renewal",
            "scoring_breakdown": {
                "strategic_alignment_score": 5,
                "expected_benefit_value_score": 4,
                "delivery_risk_score": 3,
                "dependency_complexity_score": 4,
                "capacity_availability_score": 3,
                "regulatory_impact_score": regulatory
            },
            "weighted_composite_score": 4.15,
            "decision_outcome": "Approve",
            "board_rationale_summary": "Strong strategic fit.",
            "identified_conditions_or_risk_mitigations": ["Stage-gate vendor onboarding"],
            "executive_action_recommendation": "Fund in Q3."
        })
        .to_string()
    }

    #[test]
    fn parses_structured_simulation_response() {
        let assessment = parse_generate_response(&wrap(&payload(5.0))).expect("parses");
        assert_eq!(assessment.scores.get(Criterion::BenefitValue), 4);
        assert_eq!(assessment.scores.get(Criterion::RegulatoryImpact), 5);
        assert_eq!(assessment.reported_composite, Some(4.15));
        assert_eq!(assessment.reported_outcome.as_deref(), Some("Approve"));
        assert_eq!(assessment.conditions.len(), 1);
        assert_eq!(assessment.recommendation, "Fund in Q3.");
    }

    #[test]
    fn out_of_range_model_scores_are_rejected() {
        match parse_generate_response(&wrap(&payload(6.0))) {
            Err(OracleError::InvalidScores(ValidationError::ScoreOutOfRange {
                criterion, ..
            })) => assert_eq!(criterion, Criterion::RegulatoryImpact),
            other => panic!("expected invalid scores, got {other:?}"),
        }
    }

    #[test]
    fn empty_candidates_are_reported() {
        let result = parse_generate_response(r#"{"candidates": []}"#);
        assert!(matches!(result, Err(OracleError::EmptyResponse)));
    }

    #[test]
    fn non_json_text_is_malformed() {
        let result = parse_generate_response(&wrap("I think this initiative is great"));
        assert!(matches!(result, Err(OracleError::Malformed(_))));
    }

    #[test]
    fn builds_generate_content_request() {
        let provider = GenerativeScoreProvider::new(
            "key",
            "gemini-flash-latest",
            "https://example.test/v1beta/",
            Duration::from_secs(5),
        )
        .expect("client builds");
        assert_eq!(
            provider.url(),
            "https://example.test/v1beta/models/gemini-flash-latest:generateContent"
        );

        let body = provider.request_body(&Initiative::named("INIT-1", "Claims Renewal"));
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert!(body["contents"][0]["parts"][0]["text"]
            .as_str()
            .expect("prompt text")
            .contains("Claims Renewal"));
    }

    #[test]
    fn missing_api_key_disables_provider() {
        let config = OracleConfig {
            api_key: None,
            model: "gemini-flash-latest".to_string(),
            endpoint: "https://example.test".to_string(),
            timeout: Duration::from_secs(5),
        };
        assert!(GenerativeScoreProvider::from_config(&config)
            .expect("no error")
            .is_none());
    }
}
