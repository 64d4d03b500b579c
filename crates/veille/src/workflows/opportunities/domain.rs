use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Placeholder written into any descriptive field the generator left out.
pub const UNSPECIFIED: &str = "Non spécifié";

/// Actions substituted when a candidate arrives without usable recommendations.
pub const FALLBACK_ACTIONS: [&str; 3] = [
    "Analyser le marché cible",
    "Développer un MVP",
    "Identifier des partenaires clés",
];

/// Processing clock for one batch, injected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchContext {
    processed_at: DateTime<Utc>,
}

impl BatchContext {
    pub fn new(processed_at: DateTime<Utc>) -> Self {
        Self { processed_at }
    }

    pub fn now() -> Self {
        Self::new(Utc::now())
    }

    pub fn processed_at(&self) -> DateTime<Utc> {
        self.processed_at
    }

    /// Epoch milliseconds, used as the stem of synthesized identifiers.
    pub fn batch_timestamp(&self) -> i64 {
        self.processed_at.timestamp_millis()
    }

    pub fn detection_date(&self) -> NaiveDate {
        self.processed_at.date_naive()
    }
}

/// Ordered set of labels; the first insertion of a value fixes its position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagSet(Vec<String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the tag was already present.
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.contains(&tag) {
            return false;
        }
        self.0.push(tag);
        true
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|existing| existing == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut tags = TagSet::new();
        for tag in iter {
            tags.insert(tag);
        }
        tags
    }
}

/// Five clamped sub-scores and the weighted composite, all within 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityScores {
    pub relevance: u8,
    pub novelty: u8,
    pub difficulty: u8,
    pub financial_potential: u8,
    pub competition_level: u8,
    pub composite: u8,
}

/// Fully repaired, scored and classified opportunity handed to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedOpportunity {
    pub id: String,
    pub title: String,
    pub description: String,
    pub sector: String,
    pub channel: String,
    pub scores: OpportunityScores,
    pub is_uncontested_market: bool,
    pub detection_date: NaiveDate,
    pub tags: TagSet,
    pub recommended_actions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchMetrics {
    pub uncontested_market_count: usize,
    pub average_composite_score: u8,
    pub top_sectors: Vec<String>,
}

/// Engine output: ranked opportunities plus batch-level metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OpportunityBatch {
    pub opportunities: Vec<NormalizedOpportunity>,
    pub metrics: BatchMetrics,
}

impl OpportunityBatch {
    pub fn is_empty(&self) -> bool {
        self.opportunities.is_empty()
    }
}
