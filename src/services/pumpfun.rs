use async_trait::async_trait;
use reqwest::Client;
use crate::types::models::RawRecord;
use super::source::{get_json, records_from, SourceFetcher};

pub const DEFAULT_PUMPFUN_API: &str = "https://frontend-api.pump.fun";

/// Most recently created coins on the launch platform.
pub struct PumpFunSource {
    client: Client,
    base_url: String,
    limit: usize,
}

impl PumpFunSource {
    pub fn new(client: Client, base_url: &str, limit: usize) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            limit,
        }
    }

    pub fn recent_coins_url(&self) -> String {
        format!(
            "{}/coins?offset=0&limit={}&sort=created_timestamp&order=DESC&includeNsfw=false",
            self.base_url, self.limit
        )
    }
}

#[async_trait]
impl SourceFetcher for PumpFunSource {
    fn name(&self) -> &'static str {
        "pumpfun"
    }

    async fn fetch(&self) -> Result<Vec<RawRecord>, anyhow::Error> {
        let url = self.recent_coins_url();
        tracing::info!("Fetching recent coins from {}", url);

        match get_json(&self.client, &url).await {
            Ok(body) => {
                let coins = records_from(body, "coins");
                tracing::info!("Launch platform returned {} coins", coins.len());
                Ok(coins)
            }
            Err(e) => {
                tracing::warn!("Launch platform request failed: {}", e);
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_coins_url() {
        let source = PumpFunSource::new(Client::new(), "https://frontend-api.pump.fun/", 50);
        assert_eq!(
            source.recent_coins_url(),
            "https://frontend-api.pump.fun/coins?offset=0&limit=50&sort=created_timestamp&order=DESC&includeNsfw=false"
        );
    }

    #[tokio::test]
    async fn test_unreachable_platform_yields_empty() {
        let source = PumpFunSource::new(Client::new(), "http://127.0.0.1:1", 10);
        assert!(source.fetch().await.unwrap().is_empty());
    }
}
