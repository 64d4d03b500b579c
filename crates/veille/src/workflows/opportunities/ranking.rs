use super::domain::NormalizedOpportunity;
use std::cmp::Reverse;

/// Orders by composite descending. The sort is stable, so equal composites
/// keep their batch order.
pub fn rank(mut opportunities: Vec<NormalizedOpportunity>) -> Vec<NormalizedOpportunity> {
    opportunities.sort_by_key(|opportunity| Reverse(opportunity.scores.composite));
    opportunities
}
