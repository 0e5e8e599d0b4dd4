use std::env;
use std::str::FromStr;
use crate::services::dexscreener::DEFAULT_DEXSCREENER_API;
use crate::services::filter::{EmptyFilterPolicy, FilterCriteria};
use crate::services::pumpfun::DEFAULT_PUMPFUN_API;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    PumpFun,
    DexScreener,
    Rpc,
    Proxy,
    Mock,
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pumpfun" | "pump" => Ok(SourceKind::PumpFun),
            "dexscreener" | "dex" => Ok(SourceKind::DexScreener),
            "rpc" => Ok(SourceKind::Rpc),
            "proxy" | "backend" => Ok(SourceKind::Proxy),
            "mock" => Ok(SourceKind::Mock),
            other => Err(format!("unknown token source '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReputationKind {
    Synthetic,
    Live,
}

impl FromStr for ReputationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "synthetic" => Ok(ReputationKind::Synthetic),
            "live" => Ok(ReputationKind::Live),
            other => Err(format!("unknown reputation mode '{}'", other)),
        }
    }
}

/// Named threshold sets for the default view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPreset {
    Pump,
    Established,
}

impl FilterPreset {
    pub fn criteria(self) -> FilterCriteria {
        match self {
            FilterPreset::Pump => FilterCriteria::pump_default(),
            FilterPreset::Established => FilterCriteria::established(),
        }
    }
}

impl FromStr for FilterPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pump" | "default" => Ok(FilterPreset::Pump),
            "established" => Ok(FilterPreset::Established),
            other => Err(format!("unknown filter preset '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_port: u16,
    pub frontend_port: u16,
    pub backend_url: String,
    pub proxy_source_url: Option<String>,
    pub helius_api_key: Option<String>,
    pub source: SourceKind,
    pub reputation: ReputationKind,
    pub pumpfun_api_url: String,
    pub dexscreener_api_url: String,
    pub dex_queries: Vec<String>,
    pub dex_chain: String,
    pub watchlist_mints: Vec<String>,
    pub top_n: usize,
    pub enrich_limit: usize,
    pub enrich_delay_ms: u64,
    pub enrich_rate_per_sec: u32,
    pub enrich_market_cap: bool,
    pub filter_preset: FilterPreset,
    pub max_age_secs: Option<u64>,
    pub empty_filter_policy: EmptyFilterPolicy,
    pub min_volume_24h: f64,
    pub default_ttl_secs: u64,
    pub trending_ttl_secs: u64,
    pub volume_ttl_secs: u64,
    pub http_timeout_secs: u64,
    pub warm_caches: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_port: 8000,
            frontend_port: 3000,
            backend_url: "http://localhost:8000".to_string(),
            proxy_source_url: None,
            helius_api_key: None,
            source: SourceKind::PumpFun,
            reputation: ReputationKind::Synthetic,
            pumpfun_api_url: DEFAULT_PUMPFUN_API.to_string(),
            dexscreener_api_url: DEFAULT_DEXSCREENER_API.to_string(),
            dex_queries: vec!["pump".to_string(), "solana".to_string()],
            dex_chain: "solana".to_string(),
            watchlist_mints: Vec::new(),
            top_n: 10,
            enrich_limit: 10,
            enrich_delay_ms: 150,
            enrich_rate_per_sec: 5,
            enrich_market_cap: false,
            filter_preset: FilterPreset::Pump,
            max_age_secs: None,
            empty_filter_policy: EmptyFilterPolicy::Empty,
            min_volume_24h: 10_000.0,
            default_ttl_secs: 30,
            trending_ttl_secs: 60,
            volume_ttl_secs: 300,
            http_timeout_secs: 10,
            warm_caches: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset or unparseable values
    /// keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            api_port: parsed(&get, "API_PORT", defaults.api_port),
            frontend_port: parsed(&get, "FRONTEND_PORT", defaults.frontend_port),
            backend_url: get("BACKEND_URL").unwrap_or(defaults.backend_url),
            proxy_source_url: get("PROXY_SOURCE_URL"),
            helius_api_key: get("HELIUS_API_KEY"),
            source: parsed(&get, "TOKEN_SOURCE", defaults.source),
            reputation: parsed(&get, "REPUTATION", defaults.reputation),
            pumpfun_api_url: get("PUMPFUN_API_URL").unwrap_or(defaults.pumpfun_api_url),
            dexscreener_api_url: get("DEXSCREENER_API_URL").unwrap_or(defaults.dexscreener_api_url),
            dex_queries: get("DEX_QUERIES").map(|v| split_list(&v)).unwrap_or(defaults.dex_queries),
            dex_chain: get("DEX_CHAIN").unwrap_or(defaults.dex_chain),
            watchlist_mints: get("WATCHLIST_MINTS").map(|v| split_list(&v)).unwrap_or_default(),
            top_n: parsed(&get, "TOP_N", defaults.top_n),
            enrich_limit: parsed(&get, "ENRICH_LIMIT", defaults.enrich_limit),
            enrich_delay_ms: parsed(&get, "ENRICH_DELAY_MS", defaults.enrich_delay_ms),
            enrich_rate_per_sec: parsed(&get, "ENRICH_RATE_PER_SEC", defaults.enrich_rate_per_sec).max(1),
            enrich_market_cap: parsed(&get, "ENRICH_MARKET_CAP", defaults.enrich_market_cap),
            filter_preset: parsed(&get, "FILTER_PRESET", defaults.filter_preset),
            max_age_secs: get("MAX_AGE_SECS").and_then(|raw| match raw.trim().parse::<u64>() {
                Ok(secs) => Some(secs),
                Err(e) => {
                    tracing::warn!("Ignoring MAX_AGE_SECS={}: {}", raw, e);
                    None
                }
            }),
            empty_filter_policy: parsed(&get, "EMPTY_FILTER_POLICY", defaults.empty_filter_policy),
            min_volume_24h: parsed(&get, "VOLUME_MIN_24H", defaults.min_volume_24h),
            default_ttl_secs: parsed(&get, "DEFAULT_TTL_SECS", defaults.default_ttl_secs),
            trending_ttl_secs: parsed(&get, "TRENDING_TTL_SECS", defaults.trending_ttl_secs),
            volume_ttl_secs: parsed(&get, "VOLUME_TTL_SECS", defaults.volume_ttl_secs),
            http_timeout_secs: parsed(&get, "HTTP_TIMEOUT_SECS", defaults.http_timeout_secs),
            warm_caches: parsed(&get, "WARM_CACHES", defaults.warm_caches),
        }
    }

    /// Thresholds for the default view: the named preset plus the optional
    /// age cap.
    pub fn default_criteria(&self) -> FilterCriteria {
        FilterCriteria {
            max_age_ms: self
                .max_age_secs
                .map(|secs| i64::try_from(secs.saturating_mul(1000)).unwrap_or(i64::MAX)),
            ..self.filter_preset.criteria()
        }
    }

    /// Upstream for `TOKEN_SOURCE=proxy`. Refuses this process's own API,
    /// which would call itself while holding the view's refresh lock.
    pub fn proxy_target(&self) -> Option<String> {
        let Some(raw) = self.proxy_source_url.as_deref() else {
            tracing::warn!("PROXY_SOURCE_URL not set, proxy source stays empty");
            return None;
        };

        let points_at_self = reqwest::Url::parse(raw)
            .map(|url| {
                let local = matches!(
                    url.host_str(),
                    Some("localhost" | "127.0.0.1" | "0.0.0.0" | "[::1]" | "[::]")
                );
                local && url.port_or_known_default() == Some(self.api_port)
            })
            .unwrap_or(false);

        if points_at_self {
            tracing::warn!("PROXY_SOURCE_URL {} is this API, proxy source stays empty", raw);
            return None;
        }
        Some(raw.to_string())
    }
}

fn parsed<T, G>(get: &G, key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Ignoring {}={}: {}", key, raw, e);
                default
            }
        },
        None => default,
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
