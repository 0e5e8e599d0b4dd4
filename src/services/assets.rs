use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use crate::types::models::RawRecord;
use super::source::SourceFetcher;
use super::Limiter;

pub fn helius_rpc_url(api_key: &str) -> String {
    format!("https://rpc.helius.xyz/?api-key={}", api_key)
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<Value>,
}

/// Asset metadata for a fixed watchlist via the DAS `getAsset` call.
pub struct RpcAssetSource {
    client: Client,
    rpc_url: Option<String>,
    mints: Vec<String>,
    rate_limiter: Arc<Limiter>,
}

impl RpcAssetSource {
    /// `rpc_url` is `None` when no API key is configured; the source then
    /// stays silent instead of failing.
    pub fn new(client: Client, rpc_url: Option<String>, mints: Vec<String>, rate_limiter: Arc<Limiter>) -> Self {
        Self {
            client,
            rpc_url,
            mints,
            rate_limiter,
        }
    }

    async fn get_asset(&self, rpc_url: &str, mint: &str) -> Result<RawRecord, anyhow::Error> {
        self.rate_limiter.until_ready().await;

        let body = json!({
            "jsonrpc": "2.0",
            "id": "memeboard",
            "method": "getAsset",
            "params": { "id": mint }
        });
        let response: RpcResponse = self
            .client
            .post(rpc_url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(anyhow::anyhow!("getAsset error: {}", error));
        }
        match response.result {
            Some(Value::Object(asset)) => Ok(asset),
            _ => Err(anyhow::anyhow!("getAsset returned no asset for {}", mint)),
        }
    }
}

#[async_trait]
impl SourceFetcher for RpcAssetSource {
    fn name(&self) -> &'static str {
        "rpc"
    }

    async fn fetch(&self) -> Result<Vec<RawRecord>, anyhow::Error> {
        let Some(rpc_url) = self.rpc_url.as_deref() else {
            tracing::warn!("No RPC API key configured, skipping asset lookups");
            return Ok(Vec::new());
        };

        let mut assets = Vec::with_capacity(self.mints.len());
        for mint in &self.mints {
            match self.get_asset(rpc_url, mint).await {
                Ok(asset) => assets.push(asset),
                Err(e) => tracing::warn!("Asset lookup failed for {}: {}", mint, e),
            }
        }

        tracing::info!("Resolved {}/{} watchlist assets", assets.len(), self.mints.len());
        Ok(assets)
    }
}
