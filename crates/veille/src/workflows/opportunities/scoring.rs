use super::domain::OpportunityScores;
use super::parser::RawScores;
use super::policy::{ScoreWeights, ScoringPolicy};

// Absorbs binary representation error so that x.5 always rounds up.
const ROUNDING_TOLERANCE: f64 = 1e-9;

/// Clamps the raw sub-scores and derives the weighted composite.
pub fn score(raw: &RawScores, policy: &ScoringPolicy) -> OpportunityScores {
    let fallback = policy.default_sub_score.min(100);

    let relevance = sub_score(raw.relevance, fallback);
    let novelty = sub_score(raw.novelty, fallback);
    let difficulty = sub_score(raw.difficulty, fallback);
    let financial_potential = sub_score(raw.financial_potential, fallback);
    let competition_level = sub_score(raw.competition_level, fallback);

    let composite = composite(
        &policy.weights,
        [
            relevance,
            novelty,
            difficulty,
            financial_potential,
            competition_level,
        ],
    );

    OpportunityScores {
        relevance,
        novelty,
        difficulty,
        financial_potential,
        competition_level,
        composite,
    }
}

/// Present values are clamped into 0-100; absent ones take the fallback.
pub(crate) fn sub_score(raw: Option<f64>, fallback: u8) -> u8 {
    match raw {
        Some(value) if value.is_finite() => round_half_up(value.clamp(0.0, 100.0)) as u8,
        _ => fallback,
    }
}

/// Sub-scores ordered relevance, novelty, difficulty, financial potential,
/// competition level.
pub(crate) fn composite(weights: &ScoreWeights, scores: [u8; 5]) -> u8 {
    let [relevance, novelty, difficulty, financial_potential, competition_level] =
        scores.map(f64::from);

    let weighted = relevance * weights.relevance
        + novelty * weights.novelty
        + difficulty * weights.difficulty
        + financial_potential * weights.financial_potential
        + competition_level * weights.competition_level;

    round_half_up(weighted).clamp(0.0, 100.0) as u8
}

pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5 + ROUNDING_TOLERANCE).floor()
}
