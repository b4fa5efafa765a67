//! Offline research backend.
//!
//! Stands in for the OpenAI Agents system and the Deep Research API so the
//! full memory-aware flow can be exercised without network access.

use async_trait::async_trait;
use deepthink_core::{ResearchBackend, ResearchMethod, ResearchResult, Result};

#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedBackend;

impl SimulatedBackend {
    fn citations_for(method: ResearchMethod) -> u32 {
        match method {
            ResearchMethod::DeepResearchApi => 25,
            _ => 5,
        }
    }
}

#[async_trait]
impl ResearchBackend for SimulatedBackend {
    async fn research(&self, query: &str, method: ResearchMethod) -> Result<ResearchResult> {
        tracing::debug!(method = %method, "Simulating research");

        let mut metadata = serde_json::Map::new();
        metadata.insert("simulated".into(), true.into());

        Ok(ResearchResult {
            query: query.to_string(),
            method_used: method.as_str().to_string(),
            result: format!("[simulated {}] findings for: {}", method, query),
            citations_count: Self::citations_for(method),
            metadata,
        })
    }
}
