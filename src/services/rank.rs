use crate::types::models::Token;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendingWeights {
    pub price_change: f64,
    pub txns_divisor: f64,
    pub log_volume: f64,
    pub buy_pressure_bonus: f64,
}

impl Default for TrendingWeights {
    fn default() -> Self {
        Self {
            price_change: 3.0,
            txns_divisor: 10.0,
            log_volume: 1.5,
            buy_pressure_bonus: 15.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortKey {
    Holders,
    BondingRate,
    MarketCap,
    Volume24h,
    Trending(TrendingWeights),
}

impl SortKey {
    pub fn value(&self, token: &Token) -> f64 {
        match self {
            SortKey::Holders => token.holders as f64,
            SortKey::BondingRate => token.bonding_rate.unwrap_or(0.0),
            SortKey::MarketCap => token.market_cap,
            SortKey::Volume24h => token.activity.volume_24h.unwrap_or(0.0),
            SortKey::Trending(weights) => trending_score(token, weights),
        }
    }
}

/// Short-window attention: price movement either way, trade count,
/// log-scaled volume, plus a bonus when buyers outnumber sellers.
pub fn trending_score(token: &Token, weights: &TrendingWeights) -> f64 {
    let activity = &token.activity;
    let price_change = activity.price_change_1h.unwrap_or(0.0).abs();
    let txns = activity.txns_1h.unwrap_or(0) as f64;
    let volume = activity.volume_1h.unwrap_or(0.0).max(0.0);
    let buy_pressure = if activity.buys_1h.unwrap_or(0) > activity.sells_1h.unwrap_or(0) {
        weights.buy_pressure_bonus
    } else {
        0.0
    };

    price_change * weights.price_change
        + txns / weights.txns_divisor
        + (volume + 1.0).ln() * weights.log_volume
        + buy_pressure
}

/// Sorts descending by `key` (ties by mint ascending), keeps `top_n`, and
/// numbers the survivors from 1.
pub fn rank(tokens: Vec<Token>, key: &SortKey, top_n: usize) -> Vec<Token> {
    let mut scored: Vec<(f64, Token)> = tokens
        .into_iter()
        .map(|token| (key.value(&token), token))
        .collect();

    scored.sort_by(|(score_a, a), (score_b, b)| {
        score_b
            .total_cmp(score_a)
            .then_with(|| a.mint.cmp(&b.mint))
    });

    scored
        .into_iter()
        .take(top_n)
        .enumerate()
        .map(|(i, (_, mut token))| {
            token.rank = Some(i + 1);
            token
        })
        .collect()
}
