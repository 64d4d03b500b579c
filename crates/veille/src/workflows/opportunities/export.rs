use super::domain::OpportunityBatch;
use serde::Serialize;
use std::io::Write;
use thiserror::Error;

const LIST_SEPARATOR: &str = "|";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write opportunity CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush opportunity CSV: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
struct OpportunityRow<'a> {
    id: &'a str,
    title: &'a str,
    sector: &'a str,
    channel: &'a str,
    relevance: u8,
    novelty: u8,
    difficulty: u8,
    financial_potential: u8,
    competition_level: u8,
    composite: u8,
    uncontested_market: bool,
    detection_date: String,
    tags: String,
    recommended_actions: String,
    reference_link: &'a str,
}

/// Writes the ranked opportunities as CSV, one row per opportunity.
pub fn write_csv<W: Write>(batch: &OpportunityBatch, writer: W) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for opportunity in &batch.opportunities {
        let scores = &opportunity.scores;
        csv_writer.serialize(OpportunityRow {
            id: &opportunity.id,
            title: &opportunity.title,
            sector: &opportunity.sector,
            channel: &opportunity.channel,
            relevance: scores.relevance,
            novelty: scores.novelty,
            difficulty: scores.difficulty,
            financial_potential: scores.financial_potential,
            competition_level: scores.competition_level,
            composite: scores.composite,
            uncontested_market: opportunity.is_uncontested_market,
            detection_date: opportunity.detection_date.format("%Y-%m-%d").to_string(),
            tags: opportunity.tags.as_slice().join(LIST_SEPARATOR),
            recommended_actions: opportunity.recommended_actions.join(LIST_SEPARATOR),
            reference_link: opportunity.reference_link.as_deref().unwrap_or_default(),
        })?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::opportunities::{BatchContext, OpportunityEngine};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn writes_header_and_ranked_rows() {
        let ctx = BatchContext::new(
            Utc.with_ymd_and_hms(2025, 5, 20, 8, 0, 0)
                .single()
                .expect("valid instant"),
        );
        let batch = OpportunityEngine::default().process_value(
            &json!({
                "opportunities": [
                    { "id": "b", "title": "Second", "relevance": 10 },
                    {
                        "id": "a",
                        "title": "First",
                        "sector": "Agritech",
                        "relevance": 100,
                        "novelty": 100,
                        "difficulty": 0,
                        "financialPotential": 100,
                        "competitionLevel": 0,
                        "tags": ["drone"],
                        "recommendedActions": ["Prototype", "Pilot"],
                        "referenceLink": "https://example.org/a"
                    }
                ]
            }),
            &ctx,
        );

        let mut buffer = Vec::new();
        write_csv(&batch, &mut buffer).expect("csv written");
        let output = String::from_utf8(buffer).expect("utf8 output");
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("id,title,sector,channel,relevance"));
        assert_eq!(
            lines[1],
            "a,First,Agritech,Non spécifié,100,100,0,100,0,80,true,2025-05-20,drone|blue-ocean|high-priority|trending,Prototype|Pilot,https://example.org/a"
        );
        assert!(lines[2].starts_with("b,Second,"));
    }

    #[test]
    fn empty_batch_writes_nothing() {
        let mut buffer = Vec::new();
        write_csv(&OpportunityBatch::default(), &mut buffer).expect("csv written");
        assert!(buffer.is_empty());
    }
}
