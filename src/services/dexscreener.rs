use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::sync::Arc;
use crate::types::models::{RawRecord, Token};
use super::source::{get_json, records_from, send_json, SourceFetcher};
use super::token::TokenEnricher;
use super::Limiter;

pub const DEFAULT_DEXSCREENER_API: &str = "https://api.dexscreener.com";

/// Free-text pair search, one request per query, run concurrently.
pub struct DexScreenerSource {
    client: Client,
    base_url: String,
    queries: Vec<String>,
    chain_id: String,
}

impl DexScreenerSource {
    pub fn new(client: Client, base_url: &str, queries: Vec<String>, chain_id: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            queries,
            chain_id: chain_id.to_string(),
        }
    }

    fn search_request(&self, query: &str) -> RequestBuilder {
        self.client
            .get(format!("{}/latest/dex/search", self.base_url))
            .query(&[("q", query)])
    }

    async fn search(&self, query: &str) -> Vec<RawRecord> {
        match send_json(self.search_request(query)).await {
            Ok(body) => pairs_on_chain(body, &self.chain_id),
            Err(e) => {
                tracing::warn!("Pair search for '{}' failed: {}", query, e);
                Vec::new()
            }
        }
    }
}

fn pairs_on_chain(body: Value, chain_id: &str) -> Vec<RawRecord> {
    records_from(body, "pairs")
        .into_iter()
        .filter(|pair| pair.get("chainId").and_then(Value::as_str) == Some(chain_id))
        .collect()
}

#[async_trait]
impl SourceFetcher for DexScreenerSource {
    fn name(&self) -> &'static str {
        "dexscreener"
    }

    async fn fetch(&self) -> Result<Vec<RawRecord>, anyhow::Error> {
        let searches: Vec<_> = self.queries.iter().map(|query| self.search(query)).collect();
        let pairs: Vec<RawRecord> = futures::future::join_all(searches)
            .await
            .into_iter()
            .flatten()
            .collect();

        tracing::info!(
            "Pair search returned {} {} pairs across {} queries",
            pairs.len(),
            self.chain_id,
            self.queries.len()
        );
        Ok(pairs)
    }
}

/// Fills in market cap and price from the token's most liquid listed pair.
pub struct DexMarketCapEnricher {
    client: Client,
    base_url: String,
    rate_limiter: Arc<Limiter>,
}

impl DexMarketCapEnricher {
    pub fn new(client: Client, base_url: &str, rate_limiter: Arc<Limiter>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limiter,
        }
    }
}

/// Picks the pair with the deepest liquidity and reads `fdv`, then
/// `marketCap`.
fn market_cap_from_pairs(body: Value) -> Option<(f64, Option<f64>)> {
    let liquidity = |pair: &RawRecord| {
        pair.get("liquidity")
            .and_then(|l| l.get("usd"))
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    };

    let pairs = records_from(body, "pairs");
    let best = pairs
        .iter()
        .max_by(|a, b| liquidity(*a).total_cmp(&liquidity(*b)))?;

    let market_cap = best
        .get("fdv")
        .and_then(Value::as_f64)
        .or_else(|| best.get("marketCap").and_then(Value::as_f64))?;
    let price = best
        .get("priceUsd")
        .and_then(Value::as_str)
        .and_then(|p| p.parse::<f64>().ok());

    Some((market_cap, price))
}

#[async_trait]
impl TokenEnricher for DexMarketCapEnricher {
    fn name(&self) -> &'static str {
        "dex-market-cap"
    }

    async fn enrich_token(&self, token: &mut Token) -> Result<(), anyhow::Error> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/latest/dex/tokens/{}", self.base_url, token.mint);
        let body = get_json(&self.client, &url).await?;
        let (market_cap, price) = market_cap_from_pairs(body)
            .ok_or_else(|| anyhow::anyhow!("no priced pairs for {}", token.mint))?;

        token.market_cap = market_cap.max(0.0);
        if price.is_some() {
            token.activity.price_usd = price;
        }
        Ok(())
    }
}
