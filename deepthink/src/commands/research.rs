//! Research command.
//!
//! Without `--simulate` this is a dry run: it shows what memory would do for
//! the query (suggested method, cache status). With `--simulate` the query
//! goes through the full router with the offline backend and the outcome is
//! recorded in memory.

use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use deepthink_core::{EvolutionLog, ResearchMemory, ResearchMethod, ResearchOutcome, Router};

use super::open_memory;
use crate::backend::SimulatedBackend;
use crate::cli::ResearchCommand;
use crate::config::Config;
use crate::personality::AgentProfile;

pub async fn execute(cmd: ResearchCommand, config: &Config) -> Result<()> {
    let query = cmd.query_text();
    let requested = cmd.method.map(ResearchMethod::from);

    println!("{} {}", "🔍 Research Query:".cyan().bold(), query);
    println!("{}", "─".repeat(50));
    println!("{}", AgentProfile::load(config)?.quick_intro());
    println!();

    let mut memory = open_memory(config)?;

    if cmd.simulate {
        run(&mut memory, &query, requested, config).await?;
        memory.flush().context("Failed to save memory")?;
    } else {
        preview(&memory, &query, requested)?;
    }
    Ok(())
}

/// Dry run: report suggestion and cache status without touching memory.
fn preview(memory: &ResearchMemory, query: &str, requested: Option<ResearchMethod>) -> Result<()> {
    match requested {
        Some(method) if method != ResearchMethod::Auto => {
            println!("🎯 Method forced: {}", method.as_str().cyan());
        }
        _ => match memory.suggestion(query) {
            Some(s) => println!(
                "📚 Memory suggests: {} ({:.0}% of {} successes)",
                s.method.cyan(),
                s.confidence * 100.0,
                s.query_type
            ),
            None => println!("🤔 No pattern match - will use auto-routing"),
        },
    }

    if memory.has_cached_result(query)? {
        println!("{}", "⚡ Found in cache! A cached result would be returned.".green());
    } else {
        println!("🔬 Would execute research using the selected method");
    }

    println!();
    println!(
        "{}",
        "Dry run only. Pass --simulate to run the query through the router.".dimmed()
    );
    Ok(())
}

async fn run(
    memory: &mut ResearchMemory,
    query: &str,
    requested: Option<ResearchMethod>,
    config: &Config,
) -> Result<()> {
    let evolution = EvolutionLog::open(config.evolution_dir())
        .context("Failed to open evolution directory")?;
    let router = Router::new(SimulatedBackend, config.router_config()).with_evolution(evolution);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner:.cyan} {msg}")?);
    spinner.set_message("Researching...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let outcome = router.research(memory, query, requested).await;
    spinner.finish_and_clear();

    print_outcome(&outcome?);
    Ok(())
}

fn print_outcome(outcome: &ResearchOutcome) {
    if outcome.from_cache {
        println!("{}", "⚡ Served from cache".green());
    } else if let Some(method) = outcome.method {
        match &outcome.suggestion {
            Some(_) => println!("📚 Method (from memory): {}", method.as_str().cyan()),
            None => println!("🧭 Method: {}", method.as_str().cyan()),
        }
    }

    if outcome.success {
        println!(
            "{} {} citations in {:.2}s",
            "✓".green(),
            outcome.result.citations_count,
            outcome.elapsed_secs
        );
    } else {
        println!("{} research failed", "✗".red());
    }

    println!();
    println!("{}", outcome.result.result);
}
