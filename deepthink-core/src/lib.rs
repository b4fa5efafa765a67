//! deepthink-core - research memory for the DeepThink agent
//!
//! This crate provides everything below the CLI:
//!
//! - **learning**: query classification, pattern log, method suggestions
//! - **memory**: persistent patterns/stats, two-tier result cache, insights
//! - **router**: memory-aware routing in front of a research backend
//! - **evolution**: dated learning-milestone files

pub mod error;
pub mod evolution;
pub mod learning;
pub mod memory;
pub mod router;
pub mod types;

// Re-export commonly used types
pub use error::{Error, Result};
pub use evolution::EvolutionLog;
pub use learning::classify;
pub use memory::{MemoryConfig, MemoryPaths, ResearchMemory};
pub use router::{ResearchBackend, ResearchOutcome, Router, RouterConfig};
pub use types::{QueryType, ResearchMethod, ResearchResult};
