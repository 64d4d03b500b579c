use super::domain::{BatchContext, TagSet, FALLBACK_ACTIONS, UNSPECIFIED};
use super::parser::{RawCandidate, RawScores};
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::debug;

/// Candidate with every descriptive field repaired; scores are still raw.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NormalizedCandidate {
    pub id: String,
    pub title: String,
    pub description: String,
    pub sector: String,
    pub channel: String,
    pub detection_date: NaiveDate,
    pub tags: TagSet,
    pub recommended_actions: Vec<String>,
    pub reference_link: Option<String>,
    pub raw_scores: RawScores,
    pub claimed_composite: Option<f64>,
    pub claimed_uncontested: Option<bool>,
}

pub(crate) fn normalize_batch(
    raw: &[RawCandidate],
    ctx: &BatchContext,
) -> Vec<NormalizedCandidate> {
    let ids = assign_ids(raw, ctx.batch_timestamp());
    let detection_date = ctx.detection_date();

    raw.iter()
        .zip(ids)
        .map(|(candidate, id)| normalize_candidate(candidate, id, detection_date))
        .collect()
}

fn normalize_candidate(
    raw: &RawCandidate,
    id: String,
    detection_date: NaiveDate,
) -> NormalizedCandidate {
    let mut repaired: Vec<&'static str> = Vec::new();

    let mut text = |value: &Option<String>, field: &'static str| {
        match value.as_deref().and_then(clean) {
            Some(text) => text.to_string(),
            None => {
                repaired.push(field);
                UNSPECIFIED.to_string()
            }
        }
    };

    let title = text(&raw.title, "title");
    let description = text(&raw.description, "description");
    let sector = text(&raw.sector, "sector");
    let channel = text(&raw.channel, "channel");

    let actions: Vec<String> = raw
        .recommended_actions
        .iter()
        .flatten()
        .filter_map(|action| clean(action))
        .map(str::to_string)
        .collect();
    let recommended_actions = if actions.is_empty() {
        repaired.push("recommendedActions");
        FALLBACK_ACTIONS.iter().map(|action| action.to_string()).collect()
    } else {
        actions
    };

    let tags = raw
        .tags
        .iter()
        .filter_map(|tag| clean(tag))
        .collect::<TagSet>();

    if !repaired.is_empty() {
        debug!(opportunity = %id, fields = ?repaired, "defaulted missing opportunity fields");
    }

    NormalizedCandidate {
        id,
        title,
        description,
        sector,
        channel,
        detection_date,
        tags,
        recommended_actions,
        reference_link: raw
            .reference_link
            .as_deref()
            .and_then(clean)
            .map(str::to_string),
        raw_scores: raw.scores,
        claimed_composite: raw.claimed_composite,
        claimed_uncontested: raw.claimed_uncontested,
    }
}

/// Keeps usable raw ids and synthesizes `opp-<batchTimestamp>-<index>` for
/// the rest. Collisions with any raw id or earlier assignment get a suffix.
fn assign_ids(raw: &[RawCandidate], batch_timestamp: i64) -> Vec<String> {
    let reserved: HashSet<&str> = raw
        .iter()
        .filter_map(|candidate| candidate.id.as_deref().and_then(clean))
        .collect();
    let mut taken: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut ids = Vec::with_capacity(raw.len());

    for (index, candidate) in raw.iter().enumerate() {
        let id = match candidate.id.as_deref().and_then(clean) {
            Some(id) if !taken.contains(id) => id.to_string(),
            Some(duplicate) => unique_variant(duplicate, &reserved, &taken),
            None => {
                let synthesized = format!("opp-{batch_timestamp}-{index}");
                if reserved.contains(synthesized.as_str()) || taken.contains(&synthesized) {
                    unique_variant(&synthesized, &reserved, &taken)
                } else {
                    synthesized
                }
            }
        };

        taken.insert(id.clone());
        ids.push(id);
    }

    ids
}

fn unique_variant(base: &str, reserved: &HashSet<&str>, taken: &HashSet<String>) -> String {
    let mut suffix = 1usize;
    loop {
        let candidate = format!("{base}-{suffix}");
        if !reserved.contains(candidate.as_str()) && !taken.contains(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

fn clean(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
