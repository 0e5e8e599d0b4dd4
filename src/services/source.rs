use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use crate::types::models::RawRecord;

/// An upstream that yields loosely-typed token records.
///
/// Concrete sources swallow their own transport and decoding failures and
/// hand back an empty list; an `Err` from `fetch` is reserved for failures
/// the caller has to report.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self) -> Result<Vec<RawRecord>, anyhow::Error>;
}

/// Pulls the record objects out of either a bare array or `{ <key>: [...] }`.
pub fn records_from(value: Value, wrapper_key: &str) -> Vec<RawRecord> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove(wrapper_key) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(record) => Some(record),
            _ => None,
        })
        .collect()
}

pub(crate) async fn get_json(client: &Client, url: &str) -> Result<Value, anyhow::Error> {
    send_json(client.get(url)).await
}

pub(crate) async fn send_json(request: RequestBuilder) -> Result<Value, anyhow::Error> {
    let response = request.send().await?;
    if !response.status().is_success() {
        return Err(anyhow::anyhow!("{} returned {}", response.url(), response.status()));
    }
    Ok(response.json::<Value>().await?)
}

/// Another deployment, or anything else that serves `{ "tokens": [...] }`.
/// Without a target it returns nothing and makes no request.
pub struct ProxySource {
    client: Client,
    base_url: Option<String>,
}

impl ProxySource {
    pub fn new(client: Client, base_url: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.map(|url| url.trim_end_matches('/').to_string()),
        }
    }
}

#[async_trait]
impl SourceFetcher for ProxySource {
    fn name(&self) -> &'static str {
        "proxy"
    }

    async fn fetch(&self) -> Result<Vec<RawRecord>, anyhow::Error> {
        let Some(base_url) = self.base_url.as_deref() else {
            return Ok(Vec::new());
        };

        let url = format!("{}/tokens", base_url);
        match get_json(&self.client, &url).await {
            Ok(body) => {
                let records = records_from(body, "tokens");
                tracing::info!("Proxy backend returned {} tokens", records.len());
                Ok(records)
            }
            Err(e) => {
                tracing::warn!("Proxy backend unavailable: {}", e);
                Ok(Vec::new())
            }
        }
    }
}

const MOCK_DEPLOYERS: &[&str] = &[
    "7GCihgDB8fe6KNjn2MYtkzZcRjQy3t9GHdC8uHYmW2hr",
    "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263",
    "EKpQGSJtjMFqKZ9KQanSqYXRcF8fBopzLHYxdM65zcjm",
    "HeLp6NuQkmYB4pYWo2zYs22mESHXPQYzXbB8n4V98jwC",
];

/// Offline stand-in for a launch platform, reproducible for a given seed.
pub struct MockSource {
    seed: u64,
    count: usize,
}

impl MockSource {
    pub fn new(seed: u64, count: usize) -> Self {
        Self { seed, count }
    }

    pub fn generate(&self, now_ms: i64) -> Vec<RawRecord> {
        let mut rng = StdRng::seed_from_u64(self.seed);

        (0..self.count)
            .filter_map(|i| {
                let buys: u64 = rng.gen_range(0..400);
                let sells: u64 = rng.gen_range(0..400);
                let record = json!({
                    "mint": format!("MockMint{:03}pump", i),
                    "name": format!("Mock Coin {}", i),
                    "symbol": format!("MOCK{}", i),
                    "image_uri": format!("https://example.invalid/mock/{}.png", i),
                    "usd_market_cap": rng.gen_range(1_000.0..80_000.0),
                    "creator": MOCK_DEPLOYERS[rng.gen_range(0..MOCK_DEPLOYERS.len())],
                    "holders": rng.gen_range(0..300u64),
                    "created_timestamp": now_ms - rng.gen_range(0..3_600_000i64),
                    "priceUsd": format!("{:.8}", rng.gen_range(0.000001..0.01)),
                    "priceChange": { "h1": rng.gen_range(-60.0..120.0), "h24": rng.gen_range(-90.0..400.0) },
                    "volume": { "h1": rng.gen_range(0.0..25_000.0), "h24": rng.gen_range(0.0..250_000.0) },
                    "txns": {
                        "h1": { "buys": buys, "sells": sells },
                        "h24": { "buys": buys * 12, "sells": sells * 12 }
                    },
                    "pairAddress": format!("MockPair{:03}", i),
                    "url": format!("https://dexscreener.com/solana/mockpair{:03}", i)
                });
                match record {
                    Value::Object(map) => Some(map),
                    _ => None,
                }
            })
            .collect()
    }
}

#[async_trait]
impl SourceFetcher for MockSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch(&self) -> Result<Vec<RawRecord>, anyhow::Error> {
        Ok(self.generate(Utc::now().timestamp_millis()))
    }
}
