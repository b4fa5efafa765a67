//! Learned-pattern insights.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use deepthink_core::memory::{CombinationStat, ranked_query_types, top_combinations};
use deepthink_core::types::PatternRecord;
use deepthink_core::QueryType;

use super::open_memory;
use crate::config::Config;

/// Combinations shown by the insights command.
const TOP_PATTERNS: usize = 5;

#[derive(Debug, Serialize)]
pub struct QueryTypeCount {
    pub query_type: QueryType,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct InsightsView {
    pub query_types: Vec<QueryTypeCount>,
    pub successful_patterns: Vec<CombinationStat>,
    /// Mean response time over every recorded pattern
    pub avg_response_time: f64,
    pub total_patterns: usize,
}

impl InsightsView {
    pub fn build(patterns: &[PatternRecord]) -> Self {
        let total_time: f64 = patterns.iter().map(|p| p.response_time).sum();
        let avg_response_time = if patterns.is_empty() {
            0.0
        } else {
            total_time / patterns.len() as f64
        };

        Self {
            query_types: ranked_query_types(patterns)
                .into_iter()
                .map(|(query_type, count)| QueryTypeCount { query_type, count })
                .collect(),
            successful_patterns: top_combinations(patterns, TOP_PATTERNS),
            avg_response_time,
            total_patterns: patterns.len(),
        }
    }
}

pub async fn execute(json: bool, config: &Config) -> Result<()> {
    let memory = open_memory(config)?;
    let view = InsightsView::build(memory.patterns());

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("{}", "🧠 DeepThink Insights".cyan().bold());
    println!("{}", "─".repeat(50));

    if view.total_patterns == 0 {
        println!("{}", "No patterns learned yet. Start making queries!".yellow());
        return Ok(());
    }

    println!("{}", "Query types processed:".bold());
    for entry in &view.query_types {
        println!("  • {}: {}", entry.query_type, entry.count);
    }

    println!();
    println!("{}", "Successful patterns:".bold());
    for combo in &view.successful_patterns {
        println!(
            "  • {}: {} successes (avg {:.1}s)",
            combo.label().green(),
            combo.count,
            combo.avg_response_time
        );
    }

    println!();
    println!("{}", "Performance:".bold());
    println!("  • Average response: {:.1}s", view.avg_response_time);
    println!("  • Total patterns: {}", view.total_patterns);

    Ok(())
}
