use super::domain::{BatchMetrics, NormalizedOpportunity};
use std::collections::HashMap;

pub const MAX_TOP_SECTORS: usize = 3;

/// Batch statistics over the final ranked list.
///
/// Must run after ranking: the sector tie-break depends on rank order.
pub fn summarize(ranked: &[NormalizedOpportunity]) -> BatchMetrics {
    if ranked.is_empty() {
        return BatchMetrics::default();
    }

    let uncontested_market_count = ranked
        .iter()
        .filter(|opportunity| opportunity.is_uncontested_market)
        .count();

    BatchMetrics {
        uncontested_market_count,
        average_composite_score: average_composite(ranked),
        top_sectors: top_sectors(ranked, MAX_TOP_SECTORS),
    }
}

/// Mean composite rounded half-up, computed in integers.
fn average_composite(ranked: &[NormalizedOpportunity]) -> u8 {
    let count = ranked.len() as u64;
    if count == 0 {
        return 0;
    }

    let total: u64 = ranked
        .iter()
        .map(|opportunity| u64::from(opportunity.scores.composite))
        .sum();

    ((2 * total + count) / (2 * count)).min(100) as u8
}

/// Most frequent sectors; ties go to the sector seen first in rank order.
fn top_sectors(ranked: &[NormalizedOpportunity], limit: usize) -> Vec<String> {
    let mut tallies: Vec<(&str, usize)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for opportunity in ranked {
        let sector = opportunity.sector.as_str();
        match positions.get(sector) {
            Some(&position) => {
                if let Some((_, count)) = tallies.get_mut(position) {
                    *count += 1;
                }
            }
            None => {
                positions.insert(sector, tallies.len());
                tallies.push((sector, 1));
            }
        }
    }

    // Stable: equal counts stay in first-seen order.
    tallies.sort_by(|left, right| right.1.cmp(&left.1));
    tallies
        .into_iter()
        .take(limit)
        .map(|(sector, _)| sector.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::opportunities::domain::{OpportunityScores, TagSet};
    use chrono::NaiveDate;

    fn opportunity(sector: &str, composite: u8, uncontested: bool) -> NormalizedOpportunity {
        NormalizedOpportunity {
            id: format!("{sector}-{composite}"),
            title: "Opportunity".to_string(),
            description: "Description".to_string(),
            sector: sector.to_string(),
            channel: "web".to_string(),
            scores: OpportunityScores {
                relevance: composite,
                novelty: composite,
                difficulty: composite,
                financial_potential: composite,
                competition_level: composite,
                composite,
            },
            is_uncontested_market: uncontested,
            detection_date: NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date"),
            tags: TagSet::new(),
            recommended_actions: vec!["Act".to_string()],
            reference_link: None,
        }
    }

    #[test]
    fn empty_list_yields_zeroed_metrics() {
        assert_eq!(
            summarize(&[]),
            BatchMetrics {
                uncontested_market_count: 0,
                average_composite_score: 0,
                top_sectors: Vec::new(),
            }
        );
    }

    #[test]
    fn counts_uncontested_markets_and_rounds_the_mean() {
        let ranked = vec![
            opportunity("A", 81, true),
            opportunity("B", 70, false),
            opportunity("C", 70, true),
            opportunity("D", 70, false),
        ];

        let metrics = summarize(&ranked);
        assert_eq!(metrics.uncontested_market_count, 2);
        // 291 / 4 = 72.75
        assert_eq!(metrics.average_composite_score, 73);
    }

    #[test]
    fn mean_rounds_half_up() {
        let ranked = vec![opportunity("A", 71, false), opportunity("B", 70, false)];
        assert_eq!(summarize(&ranked).average_composite_score, 71);
    }

    #[test]
    fn sector_ties_break_on_first_appearance() {
        let ranked = vec![
            opportunity("A", 90, false),
            opportunity("B", 80, false),
            opportunity("A", 70, false),
            opportunity("B", 60, false),
        ];
        assert_eq!(summarize(&ranked).top_sectors, vec!["A", "B"]);
    }

    #[test]
    fn frequency_outranks_first_appearance_and_list_is_capped() {
        let ranked = vec![
            opportunity("Retail", 95, false),
            opportunity("Health", 90, false),
            opportunity("Energy", 85, false),
            opportunity("Health", 80, false),
            opportunity("Fintech", 75, false),
            opportunity("Energy", 70, false),
            opportunity("Health", 65, false),
        ];

        assert_eq!(
            summarize(&ranked).top_sectors,
            vec!["Health", "Energy", "Retail"]
        );
    }
}
