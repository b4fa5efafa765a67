//! Query classification and pattern learning.
//!
//! Every research attempt is logged as a [`PatternRecord`] tagged with a
//! [`QueryType`]. Successful `(query_type, method)` pairs that keep showing up
//! become learned patterns, and the same history drives method suggestions
//! for new queries.
//!
//! The classifier is the one piece of shared vocabulary between recording
//! and suggesting: both sides call [`classify`], so a query is always looked
//! up under the same bucket it would have been recorded under.

mod patterns;

pub use patterns::*;

use crate::types::QueryType;

/// Keyword sets, checked in priority order. First match wins.
const KEYWORD_RULES: [(&[&str], QueryType); 4] = [
    (
        &["landscape", "comprehensive", "analyze", "comparison"],
        QueryType::ComprehensiveAnalysis,
    ),
    (
        &["how to", "implement", "code", "example"],
        QueryType::TechnicalImplementation,
    ),
    (
        &["what is", "define", "explain"],
        QueryType::ConceptualExplanation,
    ),
    (
        &["best", "recommend", "should"],
        QueryType::Recommendation,
    ),
];

/// Classify a query by case-insensitive keyword membership.
pub fn classify(query: &str) -> QueryType {
    let lower = query.to_lowercase();

    KEYWORD_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, query_type)| *query_type)
        .unwrap_or(QueryType::GeneralResearch)
}
