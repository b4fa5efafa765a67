//! Append-only pattern log with learning and method suggestion.

use chrono::Utc;
use tracing::debug;

use super::classify;
use crate::types::{PatternRecord, QueryType};

/// Per-method tally used when ranking suggestions.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodScore {
    pub method: String,
    pub count: usize,
    pub avg_response_time: f64,
}

/// A method suggestion derived from past successes.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub method: String,
    pub query_type: QueryType,
    /// Fraction of same-type successful records that used `method`.
    pub confidence: f64,
    pub avg_response_time: f64,
}

/// Signal emitted when a `(query_type, method)` pair has enough successes.
#[derive(Debug, Clone, PartialEq)]
pub struct LearnedPattern {
    pub query_type: QueryType,
    pub method: String,
    pub successes: usize,
    /// Share of the whole log this pair accounts for.
    pub share: f64,
}

/// Ordered history of past research attempts.
#[derive(Debug, Clone, Default)]
pub struct PatternLog {
    records: Vec<PatternRecord>,
}

impl PatternLog {
    /// Wrap records loaded from durable storage.
    pub fn new(records: Vec<PatternRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[PatternRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Classify and append a new record stamped with the current time.
    pub fn append(
        &mut self,
        query: &str,
        method: &str,
        success: bool,
        response_time: f64,
        citations_count: u32,
    ) -> &PatternRecord {
        let record = PatternRecord {
            query: query.to_string(),
            query_type: classify(query),
            method: method.to_string(),
            success,
            response_time: response_time.max(0.0),
            citations_count,
            timestamp: Utc::now(),
        };
        debug!(
            query_type = %record.query_type,
            method = %record.method,
            success,
            "Appending pattern record"
        );
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    /// Count successful records for a `(query_type, method)` pair.
    pub fn successes_for(&self, query_type: QueryType, method: &str) -> usize {
        self.records
            .iter()
            .filter(|p| p.success && p.query_type == query_type && p.method == method)
            .count()
    }

    /// Check whether a successful record's pair has crossed `threshold`.
    ///
    /// Fires on every call while the pair stays at or above the threshold;
    /// callers that want one signal per pair must deduplicate themselves.
    pub fn learn(&self, record: &PatternRecord, threshold: usize) -> Option<LearnedPattern> {
        if !record.success {
            return None;
        }

        let successes = self.successes_for(record.query_type, &record.method);
        if successes < threshold {
            return None;
        }

        Some(LearnedPattern {
            query_type: record.query_type,
            method: record.method.clone(),
            successes,
            share: successes as f64 / self.records.len().max(1) as f64,
        })
    }

    /// Tally successful records of one query type by method, in encounter order.
    pub fn method_scores(&self, query_type: QueryType) -> Vec<MethodScore> {
        let mut scores: Vec<(String, usize, f64)> = Vec::new();

        for pattern in self
            .records
            .iter()
            .filter(|p| p.success && p.query_type == query_type)
        {
            match scores.iter_mut().find(|(m, _, _)| *m == pattern.method) {
                Some((_, count, total_time)) => {
                    *count += 1;
                    *total_time += pattern.response_time;
                }
                None => scores.push((pattern.method.clone(), 1, pattern.response_time)),
            }
        }

        scores
            .into_iter()
            .map(|(method, count, total_time)| MethodScore {
                method,
                count,
                avg_response_time: total_time / count as f64,
            })
            .collect()
    }

    /// Suggest a method for `query` by majority vote over past successes.
    ///
    /// Returns `None` unless the winning method's share strictly exceeds
    /// `min_confidence`.
    pub fn suggest(&self, query: &str, min_confidence: f64) -> Option<Suggestion> {
        if self.is_empty() {
            return None;
        }

        let query_type = classify(query);
        let scores = self.method_scores(query_type);
        let total: usize = scores.iter().map(|s| s.count).sum();
        if total == 0 {
            return None;
        }

        // Strict `>` keeps the first method to reach the max on ties
        let mut best = &scores[0];
        for score in &scores[1..] {
            if score.count > best.count {
                best = score;
            }
        }

        let confidence = best.count as f64 / total as f64;
        if confidence > min_confidence {
            Some(Suggestion {
                method: best.method.clone(),
                query_type,
                confidence,
                avg_response_time: best.avg_response_time,
            })
        } else {
            None
        }
    }
}
