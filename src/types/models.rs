use serde::Serialize;
use serde_json::{Map, Value};

/// Whatever an upstream API hands back for one coin or pair.
pub type RawRecord = Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub mint: String,
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub market_cap: f64,
    pub deployer: String,
    /// Some sources only expose a transaction count here.
    pub holders: u64,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonding_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<usize>,
    #[serde(flatten)]
    pub activity: MarketActivity,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketActivity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_usd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_change_1h: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_change_24h: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_1h: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_24h: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub txns_1h: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buys_1h: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sells_1h: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liquidity_usd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pair_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployerStats {
    pub address: String,
    pub total_tokens: u32,
    pub bonded_tokens: u32,
    pub bonding_rate: f64,
}

impl DeployerStats {
    pub fn from_counts(address: &str, total_tokens: u32, bonded_tokens: u32) -> Self {
        let bonding_rate = if total_tokens == 0 {
            0.0
        } else {
            bonded_tokens as f64 / total_tokens as f64 * 100.0
        };

        Self {
            address: address.to_string(),
            total_tokens,
            bonded_tokens,
            bonding_rate,
        }
    }
}

/// Row shape for the trending and volume views.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingToken {
    pub rank: usize,
    pub symbol: String,
    pub name: String,
    pub volume1h: f64,
    pub volume24h: f64,
    pub price_usd: f64,
    pub price_change1h: f64,
    pub price_change24h: f64,
    pub market_cap: f64,
    pub txns1h: u64,
    pub buys1h: u64,
    pub sells1h: u64,
    pub url: String,
    pub pair_address: String,
}

impl From<&Token> for TrendingToken {
    fn from(token: &Token) -> Self {
        let activity = &token.activity;
        Self {
            rank: token.rank.unwrap_or(0),
            symbol: token.symbol.clone(),
            name: token.name.clone(),
            volume1h: activity.volume_1h.unwrap_or(0.0),
            volume24h: activity.volume_24h.unwrap_or(0.0),
            price_usd: activity.price_usd.unwrap_or(0.0),
            price_change1h: activity.price_change_1h.unwrap_or(0.0),
            price_change24h: activity.price_change_24h.unwrap_or(0.0),
            market_cap: token.market_cap,
            txns1h: activity.txns_1h.unwrap_or(0),
            buys1h: activity.buys_1h.unwrap_or(0),
            sells1h: activity.sells_1h.unwrap_or(0),
            url: activity.url.clone().unwrap_or_default(),
            pair_address: activity.pair_address.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokensResponse<T: Serialize> {
    pub success: bool,
    pub tokens: Vec<T>,
    pub last_updated: i64,
    pub next_update: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
