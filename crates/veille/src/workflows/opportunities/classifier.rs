use super::domain::{OpportunityScores, TagSet};
use super::policy::ScoringPolicy;

pub const BLUE_OCEAN_TAG: &str = "blue-ocean";
pub const HIGH_PRIORITY_TAG: &str = "high-priority";
pub const TRENDING_TAG: &str = "trending";

/// Labels derived purely from the final scores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub is_uncontested_market: bool,
    pub derived_tags: Vec<&'static str>,
}

impl Classification {
    /// Adds the derived tags after any existing ones.
    pub fn apply_to(&self, tags: &mut TagSet) {
        for tag in &self.derived_tags {
            tags.insert(*tag);
        }
    }
}

pub fn classify(scores: &OpportunityScores, policy: &ScoringPolicy) -> Classification {
    let is_uncontested_market = scores.competition_level < policy.blue_ocean.max_competition_level
        && scores.financial_potential > policy.blue_ocean.min_financial_potential;

    let mut derived_tags = Vec::new();
    if is_uncontested_market {
        derived_tags.push(BLUE_OCEAN_TAG);
    }
    if scores.composite >= policy.high_priority_threshold {
        derived_tags.push(HIGH_PRIORITY_TAG);
    }
    if scores.novelty >= policy.trending_threshold {
        derived_tags.push(TRENDING_TAG);
    }

    Classification {
        is_uncontested_market,
        derived_tags,
    }
}
