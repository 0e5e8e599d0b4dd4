use serde_json::Value;
use crate::types::models::{MarketActivity, RawRecord, Token};

pub const UNKNOWN_NAME: &str = "Unknown";
pub const UNKNOWN_SYMBOL: &str = "UNKNOWN";
pub const UNKNOWN_DEPLOYER: &str = "unknown";

// Anything below this is a seconds timestamp.
const MILLIS_CUTOFF: i64 = 1_000_000_000_000;

const MINT_KEYS: &[&str] = &["mint", "address", "id", "baseToken.address", "tokenAddress"];
const NAME_KEYS: &[&str] = &["name", "baseToken.name", "content.metadata.name"];
const SYMBOL_KEYS: &[&str] = &["symbol", "baseToken.symbol", "content.metadata.symbol"];
const URI_KEYS: &[&str] = &["image_uri", "uri", "image", "info.imageUrl", "content.links.image", "url"];
const MARKET_CAP_KEYS: &[&str] = &["fdv", "marketCap", "usd_market_cap", "market_cap", "liquidity.usd"];
const DEPLOYER_KEYS: &[&str] = &["creator", "deployer", "authorities.0.address"];
const HOLDER_KEYS: &[&str] = &["holders", "holder_count", "reply_count"];
const CREATED_KEYS: &[&str] = &["created_timestamp", "createdAt", "pairCreatedAt"];

/// Maps one upstream record onto the canonical token shape.
pub fn normalize(raw: &RawRecord) -> Token {
    let holders = first_u64(raw, HOLDER_KEYS).unwrap_or_else(|| {
        // DEX pairs carry no holder data, so daily trade count stands in
        let buys = lookup_u64(raw, "txns.h24.buys").unwrap_or(0);
        let sells = lookup_u64(raw, "txns.h24.sells").unwrap_or(0);
        buys + sells
    });

    let created_at = first_f64(raw, CREATED_KEYS)
        .map(|ts| (ts as i64).max(0))
        .map(|ts| if ts < MILLIS_CUTOFF { ts * 1000 } else { ts })
        .unwrap_or(0);

    Token {
        mint: first_str(raw, MINT_KEYS).unwrap_or_default(),
        name: first_str(raw, NAME_KEYS).unwrap_or_else(|| UNKNOWN_NAME.to_string()),
        symbol: first_str(raw, SYMBOL_KEYS).unwrap_or_else(|| UNKNOWN_SYMBOL.to_string()),
        uri: first_str(raw, URI_KEYS).unwrap_or_default(),
        market_cap: first_f64(raw, MARKET_CAP_KEYS).unwrap_or(0.0).max(0.0),
        deployer: first_str(raw, DEPLOYER_KEYS).unwrap_or_else(|| UNKNOWN_DEPLOYER.to_string()),
        holders,
        created_at,
        bonding_rate: None,
        rank: None,
        activity: normalize_activity(raw),
    }
}

fn normalize_activity(raw: &RawRecord) -> MarketActivity {
    let buys_1h = lookup_u64(raw, "txns.h1.buys");
    let sells_1h = lookup_u64(raw, "txns.h1.sells");
    let txns_1h = match (buys_1h, sells_1h) {
        (None, None) => None,
        (buys, sells) => Some(buys.unwrap_or(0) + sells.unwrap_or(0)),
    };

    MarketActivity {
        price_usd: lookup_f64(raw, "priceUsd"),
        price_change_1h: lookup_f64(raw, "priceChange.h1"),
        price_change_24h: lookup_f64(raw, "priceChange.h24"),
        volume_1h: lookup_f64(raw, "volume.h1").map(|v| v.max(0.0)),
        volume_24h: lookup_f64(raw, "volume.h24").map(|v| v.max(0.0)),
        txns_1h,
        buys_1h,
        sells_1h,
        liquidity_usd: lookup_f64(raw, "liquidity.usd"),
        url: lookup(raw, "url").and_then(as_string),
        pair_address: lookup(raw, "pairAddress").and_then(as_string),
    }
}

/// Walks a dotted path; numeric segments index into arrays.
fn lookup<'a>(raw: &'a RawRecord, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = raw.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn lookup_f64(raw: &RawRecord, path: &str) -> Option<f64> {
    lookup(raw, path).and_then(as_f64)
}

fn lookup_u64(raw: &RawRecord, path: &str) -> Option<u64> {
    lookup_f64(raw, path).map(|v| v.max(0.0) as u64)
}

fn first_str(raw: &RawRecord, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| lookup(raw, key).and_then(as_string))
}

fn first_f64(raw: &RawRecord, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| lookup_f64(raw, key))
}

fn first_u64(raw: &RawRecord, keys: &[&str]) -> Option<u64> {
    first_f64(raw, keys).map(|v| v.max(0.0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_pump_coin_fields() {
        let raw = record(json!({
            "mint": "9xQe",
            "name": "Pepe Sol",
            "symbol": "PEPES",
            "image_uri": "https://ipfs.io/pepe.png",
            "usd_market_cap": 8123.5,
            "creator": "Dep1oyer",
            "reply_count": 42,
            "created_timestamp": 1_700_000_000_000i64
        }));

        let token = normalize(&raw);
        assert_eq!(token.mint, "9xQe");
        assert_eq!(token.symbol, "PEPES");
        assert_eq!(token.uri, "https://ipfs.io/pepe.png");
        assert_eq!(token.market_cap, 8123.5);
        assert_eq!(token.deployer, "Dep1oyer");
        assert_eq!(token.holders, 42);
        assert_eq!(token.created_at, 1_700_000_000_000);
        assert!(token.bonding_rate.is_none());
        assert!(token.rank.is_none());
    }

    #[test]
    fn test_missing_fields_default() {
        let token = normalize(&RawRecord::new());
        assert_eq!(token.mint, "");
        assert_eq!(token.name, UNKNOWN_NAME);
        assert_eq!(token.symbol, UNKNOWN_SYMBOL);
        assert_eq!(token.deployer, UNKNOWN_DEPLOYER);
        assert_eq!(token.market_cap, 0.0);
        assert_eq!(token.holders, 0);
        assert_eq!(token.created_at, 0);
        assert_eq!(token.activity, MarketActivity::default());
    }

    #[test]
    fn test_market_cap_precedence() {
        let all = record(json!({ "fdv": 1.0, "marketCap": 2.0, "liquidity": { "usd": 3.0 } }));
        assert_eq!(normalize(&all).market_cap, 1.0);

        let no_fdv = record(json!({ "marketCap": 2.0, "liquidity": { "usd": 3.0 } }));
        assert_eq!(normalize(&no_fdv).market_cap, 2.0);

        let liquidity_only = record(json!({ "liquidity": { "usd": 3.0 } }));
        assert_eq!(normalize(&liquidity_only).market_cap, 3.0);
    }

    #[test]
    fn test_dex_pair_shape() {
        let raw = record(json!({
            "chainId": "solana",
            "url": "https://dexscreener.com/solana/pair1",
            "pairAddress": "pair1",
            "baseToken": { "address": "mintA", "name": "Alpha", "symbol": "ALP" },
            "priceUsd": "0.00123",
            "txns": { "h1": { "buys": 30, "sells": 10 }, "h24": { "buys": 300, "sells": 200 } },
            "volume": { "h1": 1500.0, "h24": 22000.0 },
            "priceChange": { "h1": -12.5, "h24": 40.0 },
            "fdv": 65000,
            "pairCreatedAt": 1_700_000_000_000i64
        }));

        let token = normalize(&raw);
        assert_eq!(token.mint, "mintA");
        assert_eq!(token.symbol, "ALP");
        assert_eq!(token.holders, 500);
        assert_eq!(token.market_cap, 65000.0);
        assert_eq!(token.uri, "https://dexscreener.com/solana/pair1");
        assert_eq!(token.activity.price_usd, Some(0.00123));
        assert_eq!(token.activity.txns_1h, Some(40));
        assert_eq!(token.activity.buys_1h, Some(30));
        assert_eq!(token.activity.price_change_1h, Some(-12.5));
        assert_eq!(token.activity.volume_24h, Some(22000.0));
        assert_eq!(token.activity.pair_address.as_deref(), Some("pair1"));
    }

    #[test]
    fn test_das_asset_shape() {
        let raw = record(json!({
            "id": "assetMint",
            "content": {
                "metadata": { "name": "Bonk", "symbol": "BONK" },
                "links": { "image": "https://img/bonk.png" }
            },
            "authorities": [{ "address": "authAddr", "scopes": ["full"] }]
        }));

        let token = normalize(&raw);
        assert_eq!(token.mint, "assetMint");
        assert_eq!(token.name, "Bonk");
        assert_eq!(token.uri, "https://img/bonk.png");
        assert_eq!(token.deployer, "authAddr");
    }

    #[test]
    fn test_seconds_timestamp_scaled() {
        let raw = record(json!({ "created_timestamp": 1_700_000_000i64 }));
        assert_eq!(normalize(&raw).created_at, 1_700_000_000_000);
    }

    #[test]
    fn test_negative_timestamp_clamped() {
        let raw = record(json!({ "created_timestamp": -1e19 }));
        assert_eq!(normalize(&raw).created_at, 0);

        let raw = record(json!({ "createdAt": "-5" }));
        assert_eq!(normalize(&raw).created_at, 0);
    }

    #[test]
    fn test_normalize_is_pure() {
        let raw = record(json!({ "mint": "x", "marketCap": "6000.5", "holders": 17 }));
        assert_eq!(normalize(&raw), normalize(&raw));
        assert_eq!(normalize(&raw).market_cap, 6000.5);
    }
}
