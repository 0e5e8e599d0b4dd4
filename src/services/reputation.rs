use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use crate::types::models::DeployerStats;
use super::Limiter;

#[async_trait]
pub trait ReputationEnricher: Send + Sync {
    async fn enrich(&self, address: &str) -> DeployerStats;
}

/// Placeholder reputation derived from the address text alone.
///
/// The hash is the sum of the address's UTF-16 code units, so the numbers
/// match what a browser computes with `charCodeAt` for the same string.
pub struct SyntheticReputationEnricher;

impl SyntheticReputationEnricher {
    pub fn stats_for(address: &str) -> DeployerStats {
        let hash: u64 = address.encode_utf16().map(u64::from).sum();
        let total_tokens = 5 + (hash % 15) as u32;
        let bonding_rate = 50 + (hash % 40) as u32;
        let bonded_tokens = total_tokens * bonding_rate / 100;

        DeployerStats {
            address: address.to_string(),
            total_tokens,
            bonded_tokens,
            bonding_rate: bonding_rate as f64,
        }
    }
}

#[async_trait]
impl ReputationEnricher for SyntheticReputationEnricher {
    async fn enrich(&self, address: &str) -> DeployerStats {
        Self::stats_for(address)
    }
}

#[derive(Deserialize)]
struct CreatedCoin {
    #[serde(default)]
    complete: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CreatedCoins {
    List(Vec<CreatedCoin>),
    Wrapped { coins: Vec<CreatedCoin> },
}

/// Counts a deployer's previous launches on the launch platform; a coin
/// that completed its bonding curve counts as bonded.
pub struct LiveReputationEnricher {
    client: Client,
    base_url: String,
    rate_limiter: Arc<Limiter>,
}

impl LiveReputationEnricher {
    pub fn new(client: Client, base_url: &str, rate_limiter: Arc<Limiter>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limiter,
        }
    }

    async fn fetch_counts(&self, address: &str) -> Result<(u32, u32), anyhow::Error> {
        self.rate_limiter.until_ready().await;

        let url = format!(
            "{}/coins/user-created-coins/{}?offset=0&limit=50&includeNsfw=false",
            self.base_url, address
        );
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let coins = match response.json::<CreatedCoins>().await? {
            CreatedCoins::List(coins) => coins,
            CreatedCoins::Wrapped { coins } => coins,
        };

        let bonded = coins.iter().filter(|coin| coin.complete).count();
        Ok((coins.len() as u32, bonded as u32))
    }
}

#[async_trait]
impl ReputationEnricher for LiveReputationEnricher {
    async fn enrich(&self, address: &str) -> DeployerStats {
        match self.fetch_counts(address).await {
            Ok((total, bonded)) => {
                tracing::debug!("Deployer {} launched {} coins, {} bonded", address, total, bonded);
                DeployerStats::from_counts(address, total, bonded)
            }
            Err(e) => {
                tracing::warn!("Reputation lookup failed for {}: {}", address, e);
                DeployerStats::from_counts(address, 0, 0)
            }
        }
    }
}
