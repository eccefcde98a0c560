use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use super::criteria::Criterion;
use super::error::ValidationError;

/// Allowed drift of a weight vector's sum from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Immutable per-criterion weights. Callers pass this explicitly into the aggregator; there is
/// no process-wide weight configuration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>")]
pub struct WeightVector {
    weights: [f64; 6],
}

impl WeightVector {
    /// Investment board weights: alignment 0.30, benefit 0.25, delivery risk 0.15, and 0.10 for
    /// dependencies, capacity, and regulatory impact.
    pub const STANDARD: WeightVector = WeightVector {
        weights: [0.30, 0.25, 0.15, 0.10, 0.10, 0.10],
    };

    /// Weights are indexed in `Criterion::ALL` order. Never normalises: a vector that does not
    /// already sum to 1.0 is rejected.
    pub fn try_new(weights: [f64; 6]) -> Result<Self, ValidationError> {
        for criterion in Criterion::ALL {
            let weight = weights[criterion.index()];
            if !weight.is_finite() || weight < 0.0 {
                return Err(ValidationError::InvalidWeight { criterion, weight });
            }
        }

        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ValidationError::WeightSum { sum });
        }

        Ok(Self { weights })
    }

    pub fn from_entries<I, K>(entries: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let mut slots: [Option<f64>; 6] = [None; 6];

        for (name, weight) in entries {
            let name = name.as_ref();
            let criterion =
                Criterion::from_key(name).ok_or_else(|| ValidationError::UnknownCriterion {
                    name: name.to_string(),
                })?;
            let slot = &mut slots[criterion.index()];
            if slot.is_some() {
                return Err(ValidationError::DuplicateCriterion { criterion });
            }
            *slot = Some(weight);
        }

        let mut weights = [0.0; 6];
        for criterion in Criterion::ALL {
            weights[criterion.index()] =
                slots[criterion.index()].ok_or(ValidationError::MissingWeight { criterion })?;
        }
        Self::try_new(weights)
    }

    pub fn get(&self, criterion: Criterion) -> f64 {
        self.weights[criterion.index()]
    }

    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Criterion, f64)> + '_ {
        Criterion::ALL
            .into_iter()
            .map(|criterion| (criterion, self.get(criterion)))
    }
}

impl Default for WeightVector {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl TryFrom<BTreeMap<String, f64>> for WeightVector {
    type Error = ValidationError;

    fn try_from(value: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        Self::from_entries(value)
    }
}

impl Serialize for WeightVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Criterion::ALL.len()))?;
        for (criterion, weight) in self.iter() {
            map.serialize_entry(criterion.key(), &weight)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_weights_sum_to_one() {
        let weights = WeightVector::STANDARD;
        assert!((weights.sum() - 1.0).abs() <= WEIGHT_SUM_TOLERANCE);
        assert_eq!(weights.get(Criterion::StrategicAlignment), 0.30);
        assert_eq!(weights.get(Criterion::BenefitValue), 0.25);
        assert_eq!(weights.get(Criterion::DeliveryRisk), 0.15);
        assert_eq!(weights.get(Criterion::RegulatoryImpact), 0.10);
        assert!(WeightVector::try_new([0.30, 0.25, 0.15, 0.10, 0.10, 0.10]).is_ok());
    }

    #[test]
    fn rejects_vectors_that_do_not_sum_to_one() {
        match WeightVector::try_new([0.30, 0.30, 0.15, 0.10, 0.10, 0.10]) {
            Err(ValidationError::WeightSum { sum }) => assert!((sum - 1.05).abs() < 1e-9),
            other => panic!("expected weight sum error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_sum_within_tolerance() {
        let weights = WeightVector::try_new([0.3000004, 0.25, 0.15, 0.10, 0.10, 0.10])
            .expect("within tolerance");
        assert!(weights.sum() > 1.0);
    }

    #[test]
    fn rejects_negative_and_non_finite_weights() {
        let err = WeightVector::try_new([0.5, 0.5, 0.2, -0.2, 0.0, 0.0]).expect_err("negative");
        assert_eq!(err.criterion(), Some(Criterion::DependencyComplexity));

        let err =
            WeightVector::try_new([f64::INFINITY, 0.0, 0.0, 0.0, 0.0, 0.0]).expect_err("infinite");
        assert_eq!(err.criterion(), Some(Criterion::StrategicAlignment));
    }

    #[test]
    fn from_entries_requires_every_weight() {
        let err = WeightVector::from_entries([
            ("strategic_alignment", 0.5),
            ("benefit_value", 0.5),
        ])
        .expect_err("incomplete");
        assert_eq!(
            err,
            ValidationError::MissingWeight {
                criterion: Criterion::DeliveryRisk
            }
        );
    }

    #[test]
    fn deserializes_from_named_map() {
        let weights: WeightVector = serde_json::from_value(serde_json::json!({
            "strategic_alignment": 0.5,
            "expected_benefit_value": 0.1,
            "delivery_risk": 0.1,
            "dependency_complexity": 0.1,
            "capacity_availability": 0.1,
            "regulatory_impact": 0.1
        }))
        .expect("weights parse");
        assert_eq!(weights.get(Criterion::StrategicAlignment), 0.5);

        let rejected = serde_json::from_value::<WeightVector>(serde_json::json!({
            "strategic_alignment": 0.9,
            "benefit_value": 0.9,
            "delivery_risk": 0.0,
            "dependency_complexity": 0.0,
            "capacity_availability": 0.0,
            "regulatory_impact": 0.0
        }));
        assert!(rejected.is_err());
    }
}
