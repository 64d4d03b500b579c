use serde::{Deserialize, Serialize};
use thiserror::Error;

const WEIGHT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    #[error("weight for {name} must be a finite, non-negative number (got {value})")]
    InvalidWeight { name: &'static str, value: f64 },
    #[error("score weights must sum to 1.0 (got {total:.6})")]
    WeightSum { total: f64 },
    #[error("expected {expected} score weights, got {actual}")]
    WeightCount { expected: usize, actual: usize },
    #[error("{name} must lie within 0-100 (got {value})")]
    OutOfRange { name: &'static str, value: u8 },
}

/// Relative importance of each sub-score in the composite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoreWeights {
    pub relevance: f64,
    pub novelty: f64,
    pub difficulty: f64,
    pub financial_potential: f64,
    pub competition_level: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            relevance: 0.30,
            novelty: 0.20,
            difficulty: 0.10,
            financial_potential: 0.30,
            competition_level: 0.10,
        }
    }
}

impl ScoreWeights {
    pub const COUNT: usize = 5;

    /// Builds weights from a list ordered relevance, novelty, difficulty,
    /// financial potential, competition level.
    pub fn from_slice(values: &[f64]) -> Result<Self, PolicyError> {
        let [relevance, novelty, difficulty, financial_potential, competition_level] = values
        else {
            return Err(PolicyError::WeightCount {
                expected: Self::COUNT,
                actual: values.len(),
            });
        };

        let weights = Self {
            relevance: *relevance,
            novelty: *novelty,
            difficulty: *difficulty,
            financial_potential: *financial_potential,
            competition_level: *competition_level,
        };
        weights.validate()?;
        Ok(weights)
    }

    fn named(&self) -> [(&'static str, f64); 5] {
        [
            ("relevance", self.relevance),
            ("novelty", self.novelty),
            ("difficulty", self.difficulty),
            ("financialPotential", self.financial_potential),
            ("competitionLevel", self.competition_level),
        ]
    }

    pub fn total(&self) -> f64 {
        self.named().iter().map(|(_, weight)| weight).sum()
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        for (name, value) in self.named() {
            if !value.is_finite() || value < 0.0 {
                return Err(PolicyError::InvalidWeight { name, value });
            }
        }

        let total = self.total();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(PolicyError::WeightSum { total });
        }

        Ok(())
    }
}

/// Exclusive bounds for the uncontested-market label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlueOceanThresholds {
    /// Competition must be strictly below this level.
    pub max_competition_level: u8,
    /// Financial potential must be strictly above this level.
    pub min_financial_potential: u8,
}

impl Default for BlueOceanThresholds {
    fn default() -> Self {
        Self {
            max_competition_level: 40,
            min_financial_potential: 70,
        }
    }
}

/// Product constants governing scoring and classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoringPolicy {
    pub weights: ScoreWeights,
    /// Value used for any sub-score the generator omitted.
    pub default_sub_score: u8,
    pub blue_ocean: BlueOceanThresholds,
    pub high_priority_threshold: u8,
    pub trending_threshold: u8,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            default_sub_score: 70,
            blue_ocean: BlueOceanThresholds::default(),
            high_priority_threshold: 80,
            trending_threshold: 80,
        }
    }
}

impl ScoringPolicy {
    pub fn validate(&self) -> Result<(), PolicyError> {
        self.weights.validate()?;

        let bounded = [
            ("defaultSubScore", self.default_sub_score),
            (
                "blueOcean.maxCompetitionLevel",
                self.blue_ocean.max_competition_level,
            ),
            (
                "blueOcean.minFinancialPotential",
                self.blue_ocean.min_financial_potential,
            ),
            ("highPriorityThreshold", self.high_priority_threshold),
            ("trendingThreshold", self.trending_threshold),
        ];
        for (name, value) in bounded {
            if value > 100 {
                return Err(PolicyError::OutOfRange { name, value });
            }
        }

        Ok(())
    }
}
