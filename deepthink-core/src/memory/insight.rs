//! Read-only insight reports over the pattern log.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{MemoryStats, PatternRecord, QueryType};

/// Number of combinations kept in [`InsightReport::best_combinations`].
pub const BEST_COMBINATIONS: usize = 3;

/// Success tally for one `(query_type, method)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationStat {
    pub query_type: QueryType,
    pub method: String,
    pub count: usize,
    pub avg_response_time: f64,
}

impl CombinationStat {
    /// Display label, e.g. `technical_implementation → openai_agents`.
    pub fn label(&self) -> String {
        format!("{} → {}", self.query_type, self.method)
    }
}

/// Summary of what memory has learned so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightReport {
    pub total_patterns: usize,
    pub patterns_learned: u64,
    /// Cache hits per recorded query (0.0 - n)
    pub cache_hit_rate: f64,
    /// Query type distribution over all records
    pub query_types: BTreeMap<String, usize>,
    /// Method distribution over successful records
    pub method_preferences: BTreeMap<String, usize>,
    pub best_combinations: Vec<CombinationStat>,
    pub avg_response_time: f64,
}

impl InsightReport {
    pub fn build(patterns: &[PatternRecord], stats: &MemoryStats) -> Self {
        let mut query_types = BTreeMap::new();
        let mut method_preferences = BTreeMap::new();

        for pattern in patterns {
            *query_types
                .entry(pattern.query_type.as_str().to_string())
                .or_insert(0) += 1;
            if pattern.success {
                *method_preferences.entry(pattern.method.clone()).or_insert(0) += 1;
            }
        }

        Self {
            total_patterns: patterns.len(),
            patterns_learned: stats.patterns_learned,
            cache_hit_rate: stats.cache_hit_rate(),
            query_types,
            method_preferences,
            best_combinations: top_combinations(patterns, BEST_COMBINATIONS),
            avg_response_time: stats.avg_response_time,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_patterns == 0
    }

    /// Method with the most successes (first in name order on ties).
    pub fn preferred_method(&self) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;
        for (method, count) in &self.method_preferences {
            if best.is_none_or(|(_, c)| *count > c) {
                best = Some((method, *count));
            }
        }
        best.map(|(m, _)| m)
    }
}

/// Most frequent successful `(query_type, method)` pairs.
///
/// Sorted by count, descending; ties keep first-seen order.
pub fn top_combinations(patterns: &[PatternRecord], limit: usize) -> Vec<CombinationStat> {
    let mut combos: Vec<(QueryType, &str, usize, f64)> = Vec::new();

    for pattern in patterns.iter().filter(|p| p.success) {
        match combos
            .iter_mut()
            .find(|(qt, m, _, _)| *qt == pattern.query_type && *m == pattern.method)
        {
            Some((_, _, count, total_time)) => {
                *count += 1;
                *total_time += pattern.response_time;
            }
            None => combos.push((pattern.query_type, &pattern.method, 1, pattern.response_time)),
        }
    }

    // stable sort
    combos.sort_by(|a, b| b.2.cmp(&a.2));
    combos
        .into_iter()
        .take(limit)
        .map(|(query_type, method, count, total_time)| CombinationStat {
            query_type,
            method: method.to_string(),
            count,
            avg_response_time: total_time / count as f64,
        })
        .collect()
}

/// Query types ranked by how often they were asked, most frequent first.
pub fn ranked_query_types(patterns: &[PatternRecord]) -> Vec<(QueryType, usize)> {
    let mut counts: Vec<(QueryType, usize)> = Vec::new();
    for pattern in patterns {
        match counts.iter_mut().find(|(qt, _)| *qt == pattern.query_type) {
            Some((_, count)) => *count += 1,
            None => counts.push((pattern.query_type, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
