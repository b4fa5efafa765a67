//! Memory-aware research routing.
//!
//! The router wraps a [`ResearchBackend`] with the research memory:
//!
//! 1. serve a fresh cached result when there is one
//! 2. pick a method: explicit choice, else memory's suggestion, else the
//!    query-type heuristic
//! 3. run the backend; failures become `success = false` records with a
//!    placeholder result instead of errors
//! 4. remember the outcome, cache successes
//! 5. every `milestone_every` patterns, append a milestone to the evolution log

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::evolution::EvolutionLog;
use crate::learning::classify;
use crate::memory::ResearchMemory;
use crate::types::{QueryType, ResearchMethod, ResearchResult};

/// Something that can actually carry out research.
#[async_trait]
pub trait ResearchBackend: Send + Sync {
    /// Research `query` with a concrete (non-`Auto`) method.
    async fn research(&self, query: &str, method: ResearchMethod) -> Result<ResearchResult>;
}

/// Fallback routing when memory has nothing to say.
pub fn auto_route(query: &str) -> ResearchMethod {
    match classify(query) {
        QueryType::ComprehensiveAnalysis => ResearchMethod::DeepResearchApi,
        _ => ResearchMethod::OpenaiAgents,
    }
}

/// Router settings.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Agent name stamped into result metadata
    pub agent_name: String,
    /// Agent version stamped into result metadata
    pub agent_version: String,
    /// Record a learning milestone every N patterns (0 disables).
    pub milestone_every: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            agent_name: "DeepThink".to_string(),
            agent_version: env!("CARGO_PKG_VERSION").to_string(),
            milestone_every: 10,
        }
    }
}

/// What happened for one routed query.
#[derive(Debug, Clone)]
pub struct ResearchOutcome {
    pub result: ResearchResult,
    pub from_cache: bool,
    pub success: bool,
    /// Method handed to the backend (`None` for cache hits).
    pub method: Option<ResearchMethod>,
    /// Memory's suggestion, if it was consulted and confident.
    pub suggestion: Option<String>,
    pub elapsed_secs: f64,
}

pub struct Router<B> {
    backend: B,
    evolution: Option<EvolutionLog>,
    config: RouterConfig,
}

impl<B: ResearchBackend> Router<B> {
    pub fn new(backend: B, config: RouterConfig) -> Self {
        Self {
            backend,
            evolution: None,
            config,
        }
    }

    /// Record learning milestones in `log`.
    pub fn with_evolution(mut self, log: EvolutionLog) -> Self {
        self.evolution = Some(log);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn agent_label(&self) -> String {
        format!("{} v{}", self.config.agent_name, self.config.agent_version)
    }

    /// Choose the method for `query`.
    ///
    /// An explicit, non-`Auto` method wins. Otherwise memory's suggestion is
    /// mapped onto [`ResearchMethod`]; an identifier that does not map fails
    /// with [`crate::Error::UnknownMethod`].
    pub fn resolve_method(
        &self,
        memory: &ResearchMemory,
        query: &str,
        requested: Option<ResearchMethod>,
    ) -> Result<(ResearchMethod, Option<String>)> {
        if let Some(method) = requested.filter(|m| *m != ResearchMethod::Auto) {
            return Ok((method, None));
        }

        let Some(suggested) = memory.suggest(query) else {
            let method = auto_route(query);
            debug!(method = %method, "No pattern match, auto-routing");
            return Ok((method, None));
        };

        let method = match suggested.parse::<ResearchMethod>()? {
            ResearchMethod::Auto => auto_route(query),
            method => method,
        };
        Ok((method, Some(suggested)))
    }

    /// Route one query through cache, memory and backend.
    pub async fn research(
        &self,
        memory: &mut ResearchMemory,
        query: &str,
        requested: Option<ResearchMethod>,
    ) -> Result<ResearchOutcome> {
        let start = Instant::now();

        if let Some(cached) = memory.get_cached_result(query)? {
            match serde_json::from_value::<ResearchResult>(cached) {
                Ok(result) => {
                    return Ok(ResearchOutcome {
                        result,
                        from_cache: true,
                        success: true,
                        method: None,
                        suggestion: None,
                        elapsed_secs: start.elapsed().as_secs_f64(),
                    });
                }
                Err(e) => warn!("Ignoring cached payload that is not a research result: {}", e),
            }
        }

        let (method, suggestion) = self.resolve_method(memory, query, requested)?;

        let (mut result, success) = match self.backend.research(query, method).await {
            Ok(result) => (result, true),
            Err(e) => {
                warn!("Research failed: {}", e);
                (ResearchResult::failed(query, &e.to_string()), false)
            }
        };
        let elapsed_secs = start.elapsed().as_secs_f64();

        memory.remember_query(
            query,
            &result.method_used,
            success,
            elapsed_secs,
            result.citations_count,
        )?;

        let metadata = &mut result.metadata;
        metadata.insert("agent".into(), self.config.agent_name.clone().into());
        metadata.insert("version".into(), self.config.agent_version.clone().into());
        metadata.insert("elapsed_time".into(), elapsed_secs.into());
        metadata.insert("memory_active".into(), true.into());

        if success {
            memory.cache_result(query, &result)?;
        }

        let every = self.config.milestone_every;
        if let Some(log) = &self.evolution {
            if every > 0 && memory.patterns().len() % every == 0 {
                log.record_milestone(&memory.get_insights(), &self.agent_label())?;
            }
        }

        info!(
            method = %method,
            success,
            elapsed_secs,
            "Research complete"
        );

        Ok(ResearchOutcome {
            result,
            from_cache: false,
            success,
            method: Some(method),
            suggestion,
            elapsed_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::memory::{InMemoryCacheBackend, MemoryConfig};
    use chrono::Utc;
    use std::sync::Mutex;
    use tempfile::{TempDir, tempdir};

    #[derive(Default)]
    struct FakeBackend {
        calls: Mutex<Vec<ResearchMethod>>,
        fail: bool,
    }

    impl FakeBackend {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<ResearchMethod> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ResearchBackend for FakeBackend {
        async fn research(&self, query: &str, method: ResearchMethod) -> Result<ResearchResult> {
            self.calls.lock().unwrap().push(method);
            if self.fail {
                return Err(Error::backend("quota exceeded"));
            }
            Ok(ResearchResult {
                query: query.to_string(),
                method_used: method.as_str().to_string(),
                result: format!("findings for {}", query),
                citations_count: 7,
                metadata: Default::default(),
            })
        }
    }

    fn memory() -> (TempDir, ResearchMemory) {
        let temp = tempdir().unwrap();
        let memory = ResearchMemory::with_cache_backend(
            temp.path().join("memory"),
            Box::new(InMemoryCacheBackend::new()),
            MemoryConfig::default(),
        )
        .unwrap();
        (temp, memory)
    }

    #[test]
    fn test_auto_route() {
        assert_eq!(auto_route("Comprehensive analysis of LLM frameworks"), ResearchMethod::DeepResearchApi);
        assert_eq!(auto_route("How to handle exceptions in JavaScript?"), ResearchMethod::OpenaiAgents);
        assert_eq!(auto_route("Tell me about otters"), ResearchMethod::OpenaiAgents);
    }

    #[tokio::test]
    async fn test_success_is_remembered_and_cached() {
        let (_temp, mut memory) = memory();
        let router = Router::new(FakeBackend::default(), RouterConfig::default());

        let outcome = router
            .research(&mut memory, "What is a transformer?", Some(ResearchMethod::OpenaiAgents))
            .await
            .unwrap();
        assert!(outcome.success);
        assert!(!outcome.from_cache);
        assert_eq!(outcome.result.metadata["agent"], "DeepThink");
        assert_eq!(outcome.result.metadata["memory_active"], true);

        let record = &memory.patterns()[0];
        assert_eq!(record.method, "openai_agents");
        assert_eq!(record.citations_count, 7);
        assert!(record.success);

        let again = router
            .research(&mut memory, "What is a transformer?", None)
            .await
            .unwrap();
        assert!(again.from_cache);
        assert_eq!(again.result, outcome.result);
        assert_eq!(router.backend().calls().len(), 1);
        assert_eq!(memory.stats().cache_hits, 1);
    }

    #[tokio::test]
    async fn test_failure_recorded_not_cached() {
        let (_temp, mut memory) = memory();
        let router = Router::new(FakeBackend::failing(), RouterConfig::default());

        let outcome = router
            .research(&mut memory, "Best vector database?", None)
            .await
            .unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.result.method_used, "failed");
        assert!(outcome.result.result.contains("quota exceeded"));

        let record = &memory.patterns()[0];
        assert!(!record.success);
        assert_eq!(record.method, "failed");
        assert!(memory.get_cached_result("Best vector database?").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_suggestion_drives_method() {
        let (_temp, mut memory) = memory();
        for topic in ["parsers", "lexers", "allocators"] {
            memory
                .remember_query(&format!("How to implement {}", topic), "deep_research_api", true, 100.0, 50)
                .unwrap();
        }
        let router = Router::new(FakeBackend::default(), RouterConfig::default());

        let outcome = router
            .research(&mut memory, "How to implement a GC?", Some(ResearchMethod::Auto))
            .await
            .unwrap();
        assert_eq!(outcome.method, Some(ResearchMethod::DeepResearchApi));
        assert_eq!(outcome.suggestion.as_deref(), Some("deep_research_api"));
        assert_eq!(router.backend().calls(), vec![ResearchMethod::DeepResearchApi]);
    }

    #[tokio::test]
    async fn test_unknown_suggested_method_fails() {
        let (_temp, mut memory) = memory();
        for _ in 0..3 {
            memory.remember_query("Explain gossip protocols", "carrier_pigeon", true, 1.0, 0).unwrap();
        }
        let router = Router::new(FakeBackend::default(), RouterConfig::default());

        let err = router
            .research(&mut memory, "Explain Raft", None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnknownMethod(ref m) if m == "carrier_pigeon"));
        assert!(router.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn test_heuristic_when_memory_is_silent() {
        let (_temp, mut memory) = memory();
        let router = Router::new(FakeBackend::default(), RouterConfig::default());

        router
            .research(&mut memory, "Analyze the competitive landscape of AI tools", None)
            .await
            .unwrap();
        router.research(&mut memory, "Rust for embedded", None).await.unwrap();

        assert_eq!(
            router.backend().calls(),
            vec![ResearchMethod::DeepResearchApi, ResearchMethod::OpenaiAgents]
        );
    }

    #[test]
    fn test_milestones_recorded_on_schedule() {
        let (temp, mut memory) = memory();
        let log = EvolutionLog::open(temp.path().join("evolution")).unwrap();
        let config = RouterConfig {
            milestone_every: 2,
            ..RouterConfig::default()
        };
        let router = Router::new(FakeBackend::default(), config).with_evolution(log.clone());

        tokio_test::block_on(async {
            for query in ["first topic", "second topic", "third topic"] {
                router.research(&mut memory, query, None).await.unwrap();
            }
        });

        let milestones = log.milestones_on(Utc::now()).unwrap();
        assert_eq!(milestones.len(), 1);
        assert_eq!(milestones[0].total_patterns, 2);
    }
}
