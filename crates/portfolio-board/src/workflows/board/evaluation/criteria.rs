use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use super::error::ValidationError;

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 5;

/// The six fixed evaluation dimensions of the funding model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    StrategicAlignment,
    BenefitValue,
    DeliveryRisk,
    DependencyComplexity,
    CapacityAvailability,
    RegulatoryImpact,
}

impl Criterion {
    pub const ALL: [Criterion; 6] = [
        Criterion::StrategicAlignment,
        Criterion::BenefitValue,
        Criterion::DeliveryRisk,
        Criterion::DependencyComplexity,
        Criterion::CapacityAvailability,
        Criterion::RegulatoryImpact,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            Criterion::StrategicAlignment => "strategic_alignment",
            Criterion::BenefitValue => "benefit_value",
            Criterion::DeliveryRisk => "delivery_risk",
            Criterion::DependencyComplexity => "dependency_complexity",
            Criterion::CapacityAvailability => "capacity_availability",
            Criterion::RegulatoryImpact => "regulatory_impact",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Criterion::StrategicAlignment => "Strategic alignment",
            Criterion::BenefitValue => "Expected benefit value",
            Criterion::DeliveryRisk => "Delivery risk",
            Criterion::DependencyComplexity => "Dependency complexity",
            Criterion::CapacityAvailability => "Capacity availability",
            Criterion::RegulatoryImpact => "Regulatory impact",
        }
    }

    /// Accepts the canonical keys plus the `expected_benefit_value` spelling and the
    /// `_score` suffix used by the simulation response schema.
    pub fn from_key(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        let key = normalized.strip_suffix("_score").unwrap_or(&normalized);
        match key {
            "strategic_alignment" => Some(Criterion::StrategicAlignment),
            "benefit_value" | "expected_benefit_value" => Some(Criterion::BenefitValue),
            "delivery_risk" => Some(Criterion::DeliveryRisk),
            "dependency_complexity" => Some(Criterion::DependencyComplexity),
            "capacity_availability" => Some(Criterion::CapacityAvailability),
            "regulatory_impact" => Some(Criterion::RegulatoryImpact),
            _ => None,
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One validated 1-5 rating per criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>")]
pub struct CriterionScores {
    values: [u8; 6],
}

impl CriterionScores {
    pub fn new(
        strategic_alignment: u8,
        benefit_value: u8,
        delivery_risk: u8,
        dependency_complexity: u8,
        capacity_availability: u8,
        regulatory_impact: u8,
    ) -> Result<Self, ValidationError> {
        let values = [
            strategic_alignment,
            benefit_value,
            delivery_risk,
            dependency_complexity,
            capacity_availability,
            regulatory_impact,
        ];
        for criterion in Criterion::ALL {
            check_score(criterion, f64::from(values[criterion.index()]))?;
        }
        Ok(Self { values })
    }

    pub fn uniform(score: u8) -> Result<Self, ValidationError> {
        Self::new(score, score, score, score, score, score)
    }

    /// Builds a score set from named entries. Every criterion must appear exactly once.
    pub fn from_entries<I, K>(entries: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let mut slots: [Option<u8>; 6] = [None; 6];

        for (name, value) in entries {
            let name = name.as_ref();
            let criterion =
                Criterion::from_key(name).ok_or_else(|| ValidationError::UnknownCriterion {
                    name: name.to_string(),
                })?;
            let slot = &mut slots[criterion.index()];
            if slot.is_some() {
                return Err(ValidationError::DuplicateCriterion { criterion });
            }
            *slot = Some(check_score(criterion, value)?);
        }

        let mut values = [0u8; 6];
        for criterion in Criterion::ALL {
            values[criterion.index()] =
                slots[criterion.index()].ok_or(ValidationError::MissingCriterion { criterion })?;
        }
        Ok(Self { values })
    }

    pub fn get(&self, criterion: Criterion) -> u8 {
        self.values[criterion.index()]
    }

    /// Copy with one rating replaced; the new rating is validated like any other.
    pub fn with_score(mut self, criterion: Criterion, score: u8) -> Result<Self, ValidationError> {
        self.values[criterion.index()] = check_score(criterion, f64::from(score))?;
        Ok(self)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Criterion, u8)> + '_ {
        Criterion::ALL
            .into_iter()
            .map(|criterion| (criterion, self.get(criterion)))
    }
}

impl TryFrom<BTreeMap<String, f64>> for CriterionScores {
    type Error = ValidationError;

    fn try_from(value: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        Self::from_entries(value)
    }
}

impl Serialize for CriterionScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Criterion::ALL.len()))?;
        for (criterion, score) in self.iter() {
            map.serialize_entry(criterion.key(), &score)?;
        }
        map.end()
    }
}

fn check_score(criterion: Criterion, value: f64) -> Result<u8, ValidationError> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(ValidationError::NonIntegerScore { criterion, value });
    }
    if value < f64::from(MIN_SCORE) || value > f64::from(MAX_SCORE) {
        return Err(ValidationError::ScoreOutOfRange { criterion, value });
    }
    Ok(value as u8)
}
