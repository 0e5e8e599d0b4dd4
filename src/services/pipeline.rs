use anyhow::Result;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::time::Duration;
use crate::types::models::{DeployerStats, Token};
use super::filter::{filter, EmptyFilterPolicy, FilterCriteria};
use super::normalize::{normalize, UNKNOWN_DEPLOYER};
use super::rank::{rank, SortKey};
use super::reputation::ReputationEnricher;
use super::source::SourceFetcher;
use super::token::TokenEnricher;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub criteria: FilterCriteria,
    pub sort_key: SortKey,
    pub top_n: usize,
    /// Only the first `enrich_limit` records get per-token lookups.
    pub enrich_limit: usize,
    pub enrich_delay: Duration,
    pub on_empty: EmptyFilterPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            criteria: FilterCriteria::default(),
            sort_key: SortKey::Holders,
            top_n: 10,
            enrich_limit: 10,
            enrich_delay: Duration::from_millis(150),
            on_empty: EmptyFilterPolicy::Empty,
        }
    }
}

/// fetch → normalize → enrich → filter → rank, for one view.
pub struct RankingPipeline {
    source: Arc<dyn SourceFetcher>,
    reputation: Option<Arc<dyn ReputationEnricher>>,
    enrichers: Vec<Arc<dyn TokenEnricher>>,
    config: PipelineConfig,
}

impl RankingPipeline {
    pub fn new(source: Arc<dyn SourceFetcher>, config: PipelineConfig) -> Self {
        Self {
            source,
            reputation: None,
            enrichers: Vec::new(),
            config,
        }
    }

    pub fn with_reputation(mut self, reputation: Arc<dyn ReputationEnricher>) -> Self {
        self.reputation = Some(reputation);
        self
    }

    pub fn with_enricher(mut self, enricher: Arc<dyn TokenEnricher>) -> Self {
        self.enrichers.push(enricher);
        self
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    pub async fn run(&self) -> Result<Vec<Token>> {
        self.run_at(Utc::now().timestamp_millis()).await
    }

    pub async fn run_at(&self, now_ms: i64) -> Result<Vec<Token>> {
        let started = std::time::Instant::now();

        let raw = self.source.fetch().await?;
        let mut tokens = dedupe(raw.iter().map(normalize).collect());
        tracing::info!("{}: {} unique tokens from {} records", self.source.name(), tokens.len(), raw.len());

        self.enrich_tokens(&mut tokens).await;
        self.apply_reputation(&mut tokens).await;

        let passed = filter(&tokens, &self.config.criteria, now_ms);
        tracing::info!("{}: {} of {} tokens passed filters", self.source.name(), passed.len(), tokens.len());

        let ranked = if passed.is_empty() && self.config.on_empty == EmptyFilterPolicy::Fallback {
            tracing::info!("{}: nothing passed, falling back to top holders", self.source.name());
            rank(tokens, &SortKey::Holders, self.config.top_n)
        } else {
            rank(passed, &self.config.sort_key, self.config.top_n)
        };

        tracing::info!("{}: ranked {} tokens in {:?}", self.source.name(), ranked.len(), started.elapsed());
        Ok(ranked)
    }

    async fn enrich_tokens(&self, tokens: &mut [Token]) {
        if self.enrichers.is_empty() {
            return;
        }

        let limit = self.config.enrich_limit.min(tokens.len());
        for (i, token) in tokens.iter_mut().take(limit).enumerate() {
            if i > 0 && !self.config.enrich_delay.is_zero() {
                tokio::time::sleep(self.config.enrich_delay).await;
            }
            for enricher in &self.enrichers {
                if let Err(e) = enricher.enrich_token(token).await {
                    tracing::warn!("{} lookup failed for {}: {}", enricher.name(), token.mint, e);
                }
            }
        }
        tracing::debug!("Enriched {} of {} tokens", limit, tokens.len());
    }

    async fn apply_reputation(&self, tokens: &mut [Token]) {
        let Some(reputation) = &self.reputation else {
            return;
        };

        // Memo lives for this run only
        let mut seen: HashMap<String, DeployerStats> = HashMap::new();
        for token in tokens.iter_mut() {
            if token.deployer == UNKNOWN_DEPLOYER {
                continue;
            }
            if !seen.contains_key(&token.deployer) {
                let stats = reputation.enrich(&token.deployer).await;
                seen.insert(token.deployer.clone(), stats);
            }
            token.bonding_rate = seen.get(&token.deployer).map(|stats| stats.bonding_rate);
        }
        tracing::debug!("Looked up {} distinct deployers", seen.len());
    }
}

/// First record wins; records without a mint cannot be told apart and are
/// dropped.
fn dedupe(tokens: Vec<Token>) -> Vec<Token> {
    let mut seen = HashSet::new();
    tokens
        .into_iter()
        .filter(|token| !token.mint.is_empty() && seen.insert(token.mint.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use crate::services::reputation::SyntheticReputationEnricher;
    use crate::types::models::RawRecord;

    const NOW: i64 = 1_700_000_000_000;

    struct StubSource {
        records: Vec<RawRecord>,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn new(records: Vec<serde_json::Value>) -> Self {
            Self {
                records: records.into_iter().filter_map(|r| r.as_object().cloned()).collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SourceFetcher for StubSource {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn fetch(&self) -> Result<Vec<RawRecord>, anyhow::Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.records.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl SourceFetcher for FailingSource {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn fetch(&self) -> Result<Vec<RawRecord>, anyhow::Error> {
            Err(anyhow::anyhow!("connection reset"))
        }
    }

    struct FixedReputation {
        rate: f64,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ReputationEnricher for FixedReputation {
        async fn enrich(&self, address: &str) -> DeployerStats {
            self.calls.fetch_add(1, Ordering::SeqCst);
            DeployerStats {
                address: address.to_string(),
                total_tokens: 10,
                bonded_tokens: (self.rate / 10.0) as u32,
                bonding_rate: self.rate,
            }
        }
    }

    struct CountingEnricher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TokenEnricher for CountingEnricher {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn enrich_token(&self, token: &mut Token) -> Result<(), anyhow::Error> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n == 1 {
                return Err(anyhow::anyhow!("rate limited"));
            }
            token.market_cap += 1.0;
            Ok(())
        }
    }

    fn pump_records(holders: &[u64]) -> Vec<serde_json::Value> {
        holders
            .iter()
            .enumerate()
            .map(|(i, h)| {
                json!({
                    "mint": format!("mint{}", i),
                    "symbol": format!("SYM{}", i),
                    "usd_market_cap": 6000.0 + i as f64,
                    "creator": format!("deployer{}", i % 2),
                    "holders": h,
                    "created_timestamp": NOW - 60_000
                })
            })
            .collect()
    }

    fn pump_config() -> PipelineConfig {
        PipelineConfig {
            criteria: FilterCriteria::pump_default(),
            sort_key: SortKey::Holders,
            top_n: 10,
            enrich_delay: Duration::ZERO,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_ranks_all_qualifying_tokens() {
        let source = Arc::new(StubSource::new(pump_records(&[55, 100, 40, 85, 70])));
        let reputation = Arc::new(FixedReputation { rate: 60.0, calls: AtomicUsize::new(0) });
        let pipeline = RankingPipeline::new(source.clone(), pump_config()).with_reputation(reputation.clone());

        let ranked = pipeline.run_at(NOW).await.unwrap();
        let symbols: Vec<_> = ranked.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["SYM1", "SYM3", "SYM4", "SYM0", "SYM2"]);
        let ranks: Vec<_> = ranked.iter().map(|t| t.rank.unwrap()).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
        assert!(ranked.iter().all(|t| t.bonding_rate == Some(60.0)));

        // two distinct deployers, one lookup each
        assert_eq!(reputation.calls.load(Ordering::SeqCst), 2);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_below_threshold_yields_empty() {
        let source = Arc::new(StubSource::new(pump_records(&[10])));
        let reputation = Arc::new(FixedReputation { rate: 60.0, calls: AtomicUsize::new(0) });
        let pipeline = RankingPipeline::new(source, pump_config()).with_reputation(reputation);

        assert!(pipeline.run_at(NOW).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fallback_ranks_unfiltered_by_holders() {
        let source = Arc::new(StubSource::new(pump_records(&[10, 3, 12])));
        let config = PipelineConfig {
            on_empty: EmptyFilterPolicy::Fallback,
            top_n: 2,
            ..pump_config()
        };
        let pipeline = RankingPipeline::new(source, config)
            .with_reputation(Arc::new(SyntheticReputationEnricher));

        let ranked = pipeline.run_at(NOW).await.unwrap();
        let mints: Vec<_> = ranked.iter().map(|t| t.mint.as_str()).collect();
        assert_eq!(mints, vec!["mint2", "mint0"]);
        assert_eq!(ranked[1].rank, Some(2));
    }

    #[tokio::test]
    async fn test_failing_source_propagates() {
        let pipeline = RankingPipeline::new(Arc::new(FailingSource), pump_config());
        assert!(pipeline.run_at(NOW).await.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_mints_collapse() {
        let mut records = pump_records(&[100, 90]);
        records.push(json!({ "mint": "mint0", "symbol": "DUP", "holders": 500 }));
        records.push(json!({ "symbol": "NOMINT", "holders": 900 }));
        let pipeline = RankingPipeline::new(Arc::new(StubSource::new(records)), PipelineConfig::default());

        let ranked = pipeline.run_at(NOW).await.unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].symbol, "SYM0");
    }

    #[tokio::test]
    async fn test_enrichment_bounded_and_failures_tolerated() {
        let source = Arc::new(StubSource::new(pump_records(&[1, 2, 3, 4, 5])));
        let enricher = Arc::new(CountingEnricher { calls: AtomicUsize::new(0) });
        let config = PipelineConfig {
            enrich_limit: 3,
            enrich_delay: Duration::from_millis(1),
            sort_key: SortKey::Holders,
            ..Default::default()
        };
        let pipeline = RankingPipeline::new(source, config).with_enricher(enricher.clone());

        let ranked = pipeline.run_at(NOW).await.unwrap();
        assert_eq!(enricher.calls.load(Ordering::SeqCst), 3);

        let market_cap = |mint: &str| ranked.iter().find(|t| t.mint == mint).unwrap().market_cap;
        assert_eq!(market_cap("mint0"), 6001.0);
        // second lookup failed, token left as fetched
        assert_eq!(market_cap("mint1"), 6001.0);
        assert_eq!(market_cap("mint2"), 6003.0);
        assert_eq!(market_cap("mint4"), 6004.0);
    }
}
