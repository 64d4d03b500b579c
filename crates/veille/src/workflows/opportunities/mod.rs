mod classifier;
mod domain;
pub mod export;
mod mapping;
mod metrics;
mod normalizer;
mod parser;
mod policy;
mod ranking;
mod scoring;

pub use classifier::{
    classify, Classification, BLUE_OCEAN_TAG, HIGH_PRIORITY_TAG, TRENDING_TAG,
};
pub use domain::{
    BatchContext, BatchMetrics, NormalizedOpportunity, OpportunityBatch, OpportunityScores,
    TagSet, FALLBACK_ACTIONS, UNSPECIFIED,
};
pub use metrics::{summarize, MAX_TOP_SECTORS};
pub use parser::{parse_batch, parse_str, RawCandidate, RawScores};
pub use policy::{BlueOceanThresholds, PolicyError, ScoreWeights, ScoringPolicy};
pub use ranking::rank;
pub use scoring::score;

use normalizer::NormalizedCandidate;
use serde_json::Value;
use tracing::{debug, info};

/// Stateless pipeline turning generated candidates into a ranked batch.
///
/// Every stage is total: malformed input is repaired, never rejected.
#[derive(Debug, Clone, Default)]
pub struct OpportunityEngine {
    policy: ScoringPolicy,
}

impl OpportunityEngine {
    pub fn new(policy: ScoringPolicy) -> Result<Self, PolicyError> {
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    pub fn process(&self, raw: &[RawCandidate], ctx: &BatchContext) -> OpportunityBatch {
        let scored = normalizer::normalize_batch(raw, ctx)
            .into_iter()
            .map(|candidate| self.materialize(candidate))
            .collect();

        let opportunities = rank(scored);
        let metrics = summarize(&opportunities);

        info!(
            opportunities = opportunities.len(),
            uncontested = metrics.uncontested_market_count,
            average_composite = metrics.average_composite_score,
            detection_date = %ctx.detection_date(),
            "opportunity batch processed"
        );

        OpportunityBatch {
            opportunities,
            metrics,
        }
    }

    /// Runs the pipeline on an already decoded generator response.
    pub fn process_value(&self, value: &Value, ctx: &BatchContext) -> OpportunityBatch {
        self.process(&parse_batch(value), ctx)
    }

    /// Runs the pipeline on raw generator text.
    pub fn process_str(&self, payload: &str, ctx: &BatchContext) -> OpportunityBatch {
        self.process(&parse_str(payload), ctx)
    }

    fn materialize(&self, candidate: NormalizedCandidate) -> NormalizedOpportunity {
        let scores = score(&candidate.raw_scores, &self.policy);
        let classification = classify(&scores, &self.policy);

        if let Some(claimed) = candidate.claimed_composite {
            if (claimed - f64::from(scores.composite)).abs() >= 1.0 {
                debug!(
                    opportunity = %candidate.id,
                    claimed,
                    computed = scores.composite,
                    "ignored generator composite score"
                );
            }
        }
        if let Some(claimed) = candidate.claimed_uncontested {
            if claimed != classification.is_uncontested_market {
                debug!(
                    opportunity = %candidate.id,
                    claimed,
                    derived = classification.is_uncontested_market,
                    "overrode generator uncontested-market flag"
                );
            }
        }

        let mut tags = candidate.tags;
        classification.apply_to(&mut tags);

        NormalizedOpportunity {
            id: candidate.id,
            title: candidate.title,
            description: candidate.description,
            sector: candidate.sector,
            channel: candidate.channel,
            scores,
            is_uncontested_market: classification.is_uncontested_market,
            detection_date: candidate.detection_date,
            tags,
            recommended_actions: candidate.recommended_actions,
            reference_link: candidate.reference_link,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn context() -> BatchContext {
        BatchContext::new(
            Utc.with_ymd_and_hms(2025, 9, 24, 10, 0, 0)
                .single()
                .expect("valid instant"),
        )
    }

    #[test]
    fn generator_flags_and_composites_are_never_trusted() {
        let batch = OpportunityEngine::default().process_value(
            &json!([{
                "title": "Claims everything",
                "scoreGlobal": 99,
                "isUncontestedMarket": true,
                "competitionLevel": 80,
                "financialPotential": 90
            }]),
            &context(),
        );

        let opportunity = &batch.opportunities[0];
        assert!(!opportunity.is_uncontested_market);
        assert!(!opportunity.tags.contains(BLUE_OCEAN_TAG));
        // 21 + 14 + 7 + 27 + 8
        assert_eq!(opportunity.scores.composite, 77);
    }

    #[test]
    fn invalid_policy_is_rejected() {
        let mut policy = ScoringPolicy::default();
        policy.weights.relevance = 0.9;
        assert!(matches!(
            OpportunityEngine::new(policy),
            Err(PolicyError::WeightSum { .. })
        ));
    }

    #[test]
    fn custom_thresholds_change_classification() {
        let mut policy = ScoringPolicy::default();
        policy.blue_ocean.max_competition_level = 60;
        let engine = OpportunityEngine::new(policy).expect("valid policy");

        let batch = engine.process_value(
            &json!([{ "competitionLevel": 50, "financialPotential": 85 }]),
            &context(),
        );

        assert!(batch.opportunities[0].is_uncontested_market);
        assert_eq!(batch.metrics.uncontested_market_count, 1);
    }

    #[test]
    fn output_serializes_with_camel_case_keys() {
        let batch = OpportunityEngine::default().process(&[RawCandidate::default()], &context());
        let json = serde_json::to_value(&batch).expect("serialize batch");

        assert!(json["opportunities"][0]["recommendedActions"].is_array());
        assert_eq!(json["metrics"]["averageCompositeScore"], 70);
        assert_eq!(json["metrics"]["uncontestedMarketCount"], 0);
        assert_eq!(json["metrics"]["topSectors"], json!([UNSPECIFIED]));
    }
}
