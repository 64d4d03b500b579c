use super::mapping::{self, CandidateField};
use serde_json::{Map, Value};

/// Sub-scores as the generator supplied them; `None` means absent or unusable.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawScores {
    pub relevance: Option<f64>,
    pub novelty: Option<f64>,
    pub difficulty: Option<f64>,
    pub financial_potential: Option<f64>,
    pub competition_level: Option<f64>,
}

impl RawScores {
    fn slot(&mut self, field: CandidateField) -> Option<&mut Option<f64>> {
        match field {
            CandidateField::Relevance => Some(&mut self.relevance),
            CandidateField::Novelty => Some(&mut self.novelty),
            CandidateField::Difficulty => Some(&mut self.difficulty),
            CandidateField::FinancialPotential => Some(&mut self.financial_potential),
            CandidateField::CompetitionLevel => Some(&mut self.competition_level),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Values present in `nested` replace flat ones.
    fn overlay(&mut self, nested: RawScores) {
        self.relevance = nested.relevance.or(self.relevance);
        self.novelty = nested.novelty.or(self.novelty);
        self.difficulty = nested.difficulty.or(self.difficulty);
        self.financial_potential = nested.financial_potential.or(self.financial_potential);
        self.competition_level = nested.competition_level.or(self.competition_level);
    }
}

/// Untrusted candidate as received from the generator, after type coercion.
///
/// Every attribute is optional; the normalizer decides the defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCandidate {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub sector: Option<String>,
    pub channel: Option<String>,
    pub scores: RawScores,
    /// Composite claimed by the generator. Never used for ranking.
    pub claimed_composite: Option<f64>,
    /// `Some(vec![])` when the field was present but unusable.
    pub recommended_actions: Option<Vec<String>>,
    pub reference_link: Option<String>,
    pub tags: Vec<String>,
    /// Uncontested-market flag claimed by the generator. Never trusted.
    pub claimed_uncontested: Option<bool>,
}

impl RawCandidate {
    /// Reads one list element. Non-object values yield an empty candidate.
    ///
    /// When several keys resolve to one field, the most canonical key with a
    /// usable value wins, whatever the object's key order.
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };

        let mut candidate = Self::default();
        let mut nested_scores: Option<&Map<String, Value>> = None;

        for (field, value) in ranked_fields(object) {
            match field {
                CandidateField::Id => fill(&mut candidate.id, id_value(value)),
                CandidateField::Title => fill(&mut candidate.title, string_value(value)),
                CandidateField::Description => {
                    fill(&mut candidate.description, string_value(value))
                }
                CandidateField::Sector => fill(&mut candidate.sector, string_value(value)),
                CandidateField::Channel => fill(&mut candidate.channel, string_value(value)),
                CandidateField::Scores => {
                    if nested_scores.is_none() {
                        nested_scores = value.as_object();
                    }
                }
                CandidateField::Composite => {
                    fill(&mut candidate.claimed_composite, number_value(value))
                }
                CandidateField::RecommendedActions => {
                    fill(&mut candidate.recommended_actions, actions_value(value))
                }
                CandidateField::ReferenceLink => {
                    fill(&mut candidate.reference_link, string_value(value))
                }
                CandidateField::Tags => candidate.tags.extend(tags_value(value)),
                CandidateField::UncontestedMarket => {
                    fill(&mut candidate.claimed_uncontested, bool_value(value))
                }
                score_field => {
                    if let Some(slot) = candidate.scores.slot(score_field) {
                        fill(slot, number_value(value));
                    }
                }
            }
        }

        // A nested `scores` object is more specific than flat keys.
        if let Some(scores) = nested_scores {
            let mut nested = RawScores::default();
            for (field, value) in ranked_fields(scores) {
                if field == CandidateField::Composite {
                    fill(&mut candidate.claimed_composite, number_value(value));
                } else if let Some(slot) = nested.slot(field) {
                    fill(slot, number_value(value));
                }
            }
            candidate.scores.overlay(nested);
        }

        candidate
    }
}

/// Recognized keys of an object, most canonical first.
fn ranked_fields(object: &Map<String, Value>) -> Vec<(CandidateField, &Value)> {
    let mut fields: Vec<_> = object
        .iter()
        .filter_map(|(key, value)| mapping::resolve_key(key).map(|resolved| (resolved, value)))
        .collect();
    fields.sort_by_key(|(resolved, _)| resolved.rank);

    fields
        .into_iter()
        .map(|(resolved, value)| (resolved.field, value))
        .collect()
}

/// Extracts the candidate list from a decoded generator response.
///
/// Objects are searched for the best-ranked list key holding an array;
/// arrays are the list itself; anything else is an empty batch.
pub fn parse_batch(value: &Value) -> Vec<RawCandidate> {
    let items = match value {
        Value::Array(items) => Some(items),
        Value::Object(object) => object
            .iter()
            .filter_map(|(key, value)| Some((mapping::batch_key_rank(key)?, value.as_array()?)))
            .min_by_key(|(rank, _)| *rank)
            .map(|(_, items)| items),
        _ => None,
    };

    items
        .map(|items| items.iter().map(RawCandidate::from_value).collect())
        .unwrap_or_default()
}

/// Parses raw generator text, tolerating code fences and surrounding prose.
pub fn parse_str(payload: &str) -> Vec<RawCandidate> {
    extract_json(payload)
        .map(|value| parse_batch(&value))
        .unwrap_or_default()
}

fn extract_json(payload: &str) -> Option<Value> {
    let trimmed = payload.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Some(value);
    }

    let start = trimmed.find(['{', '['])?;
    let end = trimmed.rfind(['}', ']'])?;
    if end <= start {
        return None;
    }

    serde_json::from_str(trimmed.get(start..=end)?).ok()
}

fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
    if slot.is_none() {
        *slot = value;
    }
}

fn string_value(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn id_value(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn number_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().trim_end_matches('%').trim_end().parse().ok(),
        _ => None,
    };
    number.filter(|number: &f64| number.is_finite())
}

fn bool_value(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::String(text) => match text.trim().to_lowercase().as_str() {
            "true" | "yes" | "oui" | "vrai" => Some(true),
            "false" | "no" | "non" | "faux" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn actions_value(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Null => None,
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
        ),
        Value::String(action) => Some(vec![action.clone()]),
        _ => Some(Vec::new()),
    }
}

fn tags_value(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Value::String(joined) => joined.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    }
}
