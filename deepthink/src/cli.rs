//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use deepthink_core::ResearchMethod;

/// DeepThink - research agent with memory
///
/// Learns which research method works for which kind of question,
/// caches results and reports what it has learned.
#[derive(Parser, Debug)]
#[command(name = "deepthink")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Agent state directory (memory, evolution, version.json)
    #[arg(long, global = true, env = "DEEPTHINK_AGET_DIR")]
    pub aget_dir: Option<PathBuf>,

    /// Workspace directory (result cache lives under memory/cache)
    #[arg(long, global = true, env = "DEEPTHINK_WORKSPACE_DIR")]
    pub workspace_dir: Option<PathBuf>,

    /// Command to run; shows the wake-up sequence when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Full wake-up sequence
    #[command(alias = "wake-up")]
    Wake,

    /// Quick introduction
    Intro,

    /// Show memory statistics
    Stats {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show learned patterns and insights
    Insights {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Research a topic
    Research(ResearchCommand),

    /// Remove old entries from the durable result cache
    Cleanup {
        /// Maximum entry age in hours (defaults to config)
        #[arg(long)]
        max_age_hours: Option<u64>,
    },

    /// Flush memory and end the session
    WindDown,

    /// Show version
    Version,
}

// ─────────────────────────────────────────────────────────────────────────────
// Research Command
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct ResearchCommand {
    /// The research question
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Force a research method instead of letting memory decide
    #[arg(short, long, value_enum)]
    pub method: Option<MethodArg>,

    /// Run the query through the router with the simulated backend
    #[arg(long)]
    pub simulate: bool,
}

impl ResearchCommand {
    pub fn query_text(&self) -> String {
        self.query.join(" ")
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodArg {
    #[value(name = "openai_agents")]
    OpenaiAgents,
    #[value(name = "deep_research_api")]
    DeepResearchApi,
    Auto,
}

impl From<MethodArg> for ResearchMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::OpenaiAgents => ResearchMethod::OpenaiAgents,
            MethodArg::DeepResearchApi => ResearchMethod::DeepResearchApi,
            MethodArg::Auto => ResearchMethod::Auto,
        }
    }
}
