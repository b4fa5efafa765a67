//! Memory statistics.

use std::collections::BTreeMap;

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use deepthink_core::types::{MemoryStats, PatternRecord};

use super::open_memory;
use crate::config::Config;

#[derive(Debug, Serialize)]
pub struct StatsReport {
    pub total_queries: u64,
    pub avg_response_time: f64,
    pub cache_hits: u64,
    pub cache_hit_rate: f64,
    pub patterns_learned: u64,
    pub total_patterns: usize,
    /// Uses per method over every record, failures included
    pub method_distribution: BTreeMap<String, usize>,
}

impl StatsReport {
    pub fn build(patterns: &[PatternRecord], stats: &MemoryStats) -> Self {
        let mut method_distribution = BTreeMap::new();
        for pattern in patterns {
            *method_distribution.entry(pattern.method.clone()).or_insert(0) += 1;
        }

        Self {
            total_queries: stats.total_queries,
            avg_response_time: stats.avg_response_time,
            cache_hits: stats.cache_hits,
            cache_hit_rate: stats.cache_hit_rate(),
            patterns_learned: stats.patterns_learned,
            total_patterns: patterns.len(),
            method_distribution,
        }
    }
}

pub async fn execute(json: bool, config: &Config) -> Result<()> {
    let memory = open_memory(config)?;
    let report = StatsReport::build(memory.patterns(), memory.stats());

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "📊 DeepThink Statistics".cyan().bold());
    println!("{}", "─".repeat(50));

    if report.total_queries == 0 && report.total_patterns == 0 {
        println!("{}", "No statistics available yet. Start making queries!".yellow());
        return Ok(());
    }

    println!("  Total queries:         {}", report.total_queries);
    println!("  Average response time: {:.1}s", report.avg_response_time);
    println!(
        "  Cache hits:            {} ({:.1}%)",
        report.cache_hits,
        report.cache_hit_rate * 100.0
    );
    println!("  Patterns learned:      {}", report.patterns_learned);

    if !report.method_distribution.is_empty() {
        println!();
        println!("{}", "Method distribution:".bold());
        for (method, count) in &report.method_distribution {
            println!("  • {}: {} uses", method.cyan(), count);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepthink_core::learning::PatternLog;

    #[test]
    fn test_distribution_counts_failures() {
        let mut log = PatternLog::default();
        log.append("What is RAG?", "openai_agents", true, 10.0, 3);
        log.append("Analyze AI chips", "deep_research_api", true, 120.0, 30);
        log.append("Analyze AI chips", "failed", false, 2.0, 0);
        log.append("How to write a lexer", "openai_agents", true, 20.0, 4);

        let stats = MemoryStats {
            total_queries: 4,
            cache_hits: 1,
            patterns_learned: 0,
            avg_response_time: 38.0,
        };
        let report = StatsReport::build(log.records(), &stats);

        assert_eq!(report.total_patterns, 4);
        assert_eq!(report.method_distribution["openai_agents"], 2);
        assert_eq!(report.method_distribution["failed"], 1);
        assert_eq!(report.cache_hit_rate, 0.25);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["method_distribution"]["deep_research_api"], 1);
    }
}
