//! Shared types for deepthink-core.
//!
//! These types are persisted in the durable stores and passed between the
//! memory layer, the router and the CLI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Query Classification
// ─────────────────────────────────────────────────────────────────────────────

/// Closed set of buckets a research query can fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    /// Landscape surveys, comparisons, in-depth analysis
    ComprehensiveAnalysis,
    /// How-to questions, implementation and code examples
    TechnicalImplementation,
    /// Definitions and explanations
    ConceptualExplanation,
    /// Asking for the best option or a recommendation
    Recommendation,
    /// Anything else
    GeneralResearch,
}

impl QueryType {
    /// Every query type, in classifier priority order.
    pub const ALL: [QueryType; 5] = [
        QueryType::ComprehensiveAnalysis,
        QueryType::TechnicalImplementation,
        QueryType::ConceptualExplanation,
        QueryType::Recommendation,
        QueryType::GeneralResearch,
    ];

    /// Convert to string for storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::ComprehensiveAnalysis => "comprehensive_analysis",
            QueryType::TechnicalImplementation => "technical_implementation",
            QueryType::ConceptualExplanation => "conceptual_explanation",
            QueryType::Recommendation => "recommendation",
            QueryType::GeneralResearch => "general_research",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Research Methods
// ─────────────────────────────────────────────────────────────────────────────

/// Research methods the router can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchMethod {
    /// OpenAI Agents orchestration - fast technical queries
    OpenaiAgents,
    /// Deep Research API - comprehensive analysis
    DeepResearchApi,
    /// Let memory (or the routing heuristic) decide
    Auto,
}

impl ResearchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResearchMethod::OpenaiAgents => "openai_agents",
            ResearchMethod::DeepResearchApi => "deep_research_api",
            ResearchMethod::Auto => "auto",
        }
    }
}

impl fmt::Display for ResearchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResearchMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai_agents" => Ok(ResearchMethod::OpenaiAgents),
            "deep_research_api" => Ok(ResearchMethod::DeepResearchApi),
            "auto" => Ok(ResearchMethod::Auto),
            other => Err(Error::UnknownMethod(other.to_string())),
        }
    }
}

/// Method identifier recorded for attempts whose backend call failed.
pub const FAILED_METHOD: &str = "failed";

// ─────────────────────────────────────────────────────────────────────────────
// Memory Records
// ─────────────────────────────────────────────────────────────────────────────

/// One logged outcome of a past query. Append-only once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRecord {
    pub query: String,
    pub query_type: QueryType,
    pub method: String,
    pub success: bool,
    /// Elapsed seconds
    pub response_time: f64,
    pub citations_count: u32,
    pub timestamp: DateTime<Utc>,
}

/// Running counters persisted next to the pattern log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub total_queries: u64,
    pub cache_hits: u64,
    pub patterns_learned: u64,
    pub avg_response_time: f64,
}

impl MemoryStats {
    /// Count a query and fold its response time into the running mean.
    pub fn record_query(&mut self, response_time: f64) {
        self.total_queries += 1;
        let n = self.total_queries as f64;
        self.avg_response_time = (self.avg_response_time * (n - 1.0) + response_time) / n;
    }

    /// Cache hits per recorded query; `total_queries` is floored at 1.
    pub fn cache_hit_rate(&self) -> f64 {
        self.cache_hits as f64 / self.total_queries.max(1) as f64
    }
}

/// A cached research result, addressed by the fingerprint of its query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub query: String,
    pub result: serde_json::Value,
    /// Stored as epoch milliseconds
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    pub hit_count: u64,
}

impl CacheEntry {
    /// Age of the entry in (fractional) seconds relative to `now`.
    pub fn age_secs(&self, now: DateTime<Utc>) -> f64 {
        (now - self.created_at).num_milliseconds() as f64 / 1000.0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Research Results
// ─────────────────────────────────────────────────────────────────────────────

/// Result produced by a research backend (or a failure placeholder).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchResult {
    pub query: String,
    pub method_used: String,
    pub result: String,
    #[serde(default)]
    pub citations_count: u32,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl ResearchResult {
    /// Placeholder recorded when the backend call fails.
    pub fn failed(query: &str, error: &str) -> Self {
        let mut metadata = serde_json::Map::new();
        metadata.insert("error".to_string(), serde_json::Value::String(error.to_string()));
        Self {
            query: query.to_string(),
            method_used: FAILED_METHOD.to_string(),
            result: format!("Research failed: {}", error),
            citations_count: 0,
            metadata,
        }
    }
}
