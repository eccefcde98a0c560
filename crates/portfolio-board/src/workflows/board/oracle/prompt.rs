use serde_json::{json, Value};

use super::super::domain::Initiative;
use super::super::framework::GovernanceFramework;

/// Instruction block sent with every simulation request. Weights and thresholds come from the
/// framework so the prompt can never drift from the local classifier.
pub fn system_instruction(framework: &GovernanceFramework) -> String {
    let weights: serde_json::Map<String, Value> = framework
        .funding_algorithm
        .criteria
        .iter()
        .map(|entry| (entry.criterion.key().to_string(), json!(entry.weight)))
        .collect();

    format!(
        "ROLE: {role}\n\
         MANDATE: {mandate}\n\
         EVALUATION STANDARD: {standard}\n\n\
         FUNDING ALGORITHM WEIGHTS:\n{weights}\n\n\
         RATING SCALE: {scale}\n\n\
         DECISION THRESHOLDS:\n{thresholds}\n\n\
         INSTRUCTIONS:\n\
         1. Analyze the initiative details objectively.\n\
         2. Score each of the 6 criteria with a whole number from 1 to 5.\n\
         3. Calculate the weighted composite score using the provided weights.\n\
         4. Determine the decision outcome based on the thresholds.\n\
         5. Provide a professional board rationale and executive recommendations.\n\
         6. Return ONLY a valid JSON object matching the schema.",
        role = framework.role,
        mandate = framework.mandate,
        standard = framework.evaluation_standard,
        weights = Value::Object(weights),
        scale = framework.funding_algorithm.scale,
        thresholds = framework.threshold_lines().join("\n"),
    )
}

pub(crate) fn user_prompt(initiative: &Initiative) -> String {
    let details = json!({
        "initiative_name": initiative.name,
        "strategic_objective_alignment_description": initiative.strategic_alignment,
        "expected_financial_benefit": initiative.financial_benefit,
        "expected_non_financial_benefit": initiative.non_financial_benefit,
        "delivery_risk_assessment": initiative.delivery_risk,
        "cross_program_dependencies": initiative.dependencies,
        "resource_capacity_impact": initiative.capacity,
        "regulatory_or_compliance_impact": initiative.regulatory,
        "timeline_estimate": initiative.timeline,
        "investment_size_estimate": initiative.investment_size,
    });
    format!("Evaluate this transformation initiative based on the provided details: {details}")
}

/// JSON schema the model must answer with.
pub(crate) fn response_schema() -> Value {
    let number = json!({ "type": "NUMBER" });
    let string = json!({ "type": "STRING" });
    let score_fields = [
        "strategic_alignment_score",
        "expected_benefit_value_score",
        "delivery_risk_score",
        "dependency_complexity_score",
        "capacity_availability_score",
        "regulatory_impact_score",
    ];
    let breakdown: serde_json::Map<String, Value> = score_fields
        .iter()
        .map(|field| (field.to_string(), number.clone()))
        .collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "initiative_name": string,
            "scoring_breakdown": {
                "type": "OBJECT",
                "properties": breakdown,
                "required": score_fields,
            },
            "weighted_composite_score": number,
            "decision_outcome": string,
            "board_rationale_summary": string,
            "identified_conditions_or_risk_mitigations": {
                "type": "ARRAY",
                "items": string,
            },
            "executive_action_recommendation": string,
        },
        "required": [
            "initiative_name",
            "scoring_breakdown",
            "weighted_composite_score",
            "decision_outcome",
            "board_rationale_summary",
            "executive_action_recommendation"
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_embeds_weights_and_thresholds() {
        let instruction = system_instruction(&GovernanceFramework::standard());
        assert!(instruction.contains("\"strategic_alignment\":0.3"));
        assert!(instruction.contains("Approve: >= 4.0"));
        assert!(instruction.contains("Defer: >= 2.5 and < 3.2"));
    }

    #[test]
    fn user_prompt_uses_dashboard_field_names() {
        let mut initiative = Initiative::named("INIT-4", "Claims Renewal");
        initiative.regulatory = "Solvency II reporting".to_string();
        let prompt = user_prompt(&initiative);
        assert!(prompt.contains("\"initiative_name\":\"Claims Renewal\""));
        assert!(prompt.contains("\"regulatory_or_compliance_impact\":\"Solvency II reporting\""));
    }

    #[test]
    fn schema_requires_every_score() {
        let schema = response_schema();
        let required = schema["properties"]["scoring_breakdown"]["required"]
            .as_array()
            .expect("required list");
        assert_eq!(required.len(), 6);
    }
}
