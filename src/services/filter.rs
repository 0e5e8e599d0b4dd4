use std::str::FromStr;
use crate::types::models::Token;

/// Thresholds a token must meet to be ranked. `None` leaves a check off.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub min_holders: Option<u64>,
    pub min_market_cap: Option<f64>,
    /// Strict: the deployer's bonding rate must be above this value.
    pub min_bonding_rate: Option<f64>,
    pub max_age_ms: Option<i64>,
    pub min_volume_24h: Option<f64>,
}

impl FilterCriteria {
    /// Fresh launches with some traction from a deployer who usually bonds.
    pub fn pump_default() -> Self {
        Self {
            min_holders: Some(15),
            min_market_cap: Some(6000.0),
            min_bonding_rate: Some(50.0),
            ..Default::default()
        }
    }

    pub fn established() -> Self {
        Self {
            min_holders: Some(160),
            min_market_cap: Some(15000.0),
            ..Default::default()
        }
    }

    pub fn accepts(&self, token: &Token, now_ms: i64) -> bool {
        if let Some(min) = self.min_holders {
            if token.holders < min {
                return false;
            }
        }
        if let Some(min) = self.min_market_cap {
            if token.market_cap < min {
                return false;
            }
        }
        if let Some(min) = self.min_bonding_rate {
            if token.bonding_rate.unwrap_or(0.0) <= min {
                return false;
            }
        }
        if let Some(max_age) = self.max_age_ms {
            if now_ms.saturating_sub(token.created_at) > max_age {
                return false;
            }
        }
        if let Some(min) = self.min_volume_24h {
            if token.activity.volume_24h.unwrap_or(0.0) < min {
                return false;
            }
        }
        true
    }
}

/// What to serve when no token survives the filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyFilterPolicy {
    #[default]
    Empty,
    /// Rank the unfiltered set by holders instead.
    Fallback,
}

impl FromStr for EmptyFilterPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "empty" => Ok(EmptyFilterPolicy::Empty),
            "fallback" | "fallbacktopn" => Ok(EmptyFilterPolicy::Fallback),
            other => Err(format!("unknown empty filter policy '{}'", other)),
        }
    }
}

pub fn filter(tokens: &[Token], criteria: &FilterCriteria, now_ms: i64) -> Vec<Token> {
    tokens
        .iter()
        .filter(|token| criteria.accepts(token, now_ms))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::models::MarketActivity;

    const NOW: i64 = 1_700_000_000_000;

    fn token(mint: &str, holders: u64, market_cap: f64, bonding_rate: Option<f64>, age_ms: i64) -> Token {
        Token {
            mint: mint.to_string(),
            holders,
            market_cap,
            bonding_rate,
            created_at: NOW - age_ms,
            ..Default::default()
        }
    }

    fn sample() -> Vec<Token> {
        vec![
            token("a", 100, 9000.0, Some(60.0), 60_000),
            token("b", 10, 9000.0, Some(60.0), 60_000),
            token("c", 20, 5999.0, Some(70.0), 60_000),
            token("d", 20, 6000.0, Some(50.0), 60_000),
            token("e", 15, 6000.0, None, 60_000),
            token("f", 15, 6000.0, Some(50.5), 3_600_000),
        ]
    }

    #[test]
    fn test_pump_default_preset() {
        let kept = filter(&sample(), &FilterCriteria::pump_default(), NOW);
        let mints: Vec<_> = kept.iter().map(|t| t.mint.as_str()).collect();
        // d sits exactly at 50 and the bonding check is strict
        assert_eq!(mints, vec!["a", "f"]);
    }

    #[test]
    fn test_unconfigured_criteria_keep_everything() {
        let tokens = sample();
        assert_eq!(filter(&tokens, &FilterCriteria::default(), NOW), tokens);
    }

    #[test]
    fn test_max_age_window() {
        let criteria = FilterCriteria {
            max_age_ms: Some(600_000),
            ..Default::default()
        };
        let kept = filter(&sample(), &criteria, NOW);
        assert!(kept.iter().all(|t| t.mint != "f"));
        assert_eq!(kept.len(), 5);
    }

    #[test]
    fn test_min_volume() {
        let mut busy = token("v", 0, 0.0, None, 0);
        busy.activity = MarketActivity {
            volume_24h: Some(50_000.0),
            ..Default::default()
        };
        let quiet = token("q", 0, 0.0, None, 0);

        let criteria = FilterCriteria {
            min_volume_24h: Some(10_000.0),
            ..Default::default()
        };
        let kept = filter(&[busy, quiet], &criteria, NOW);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].mint, "v");
    }

    #[test]
    fn test_result_is_subset_meeting_all_thresholds() {
        let tokens = sample();
        for criteria in [FilterCriteria::pump_default(), FilterCriteria::established()] {
            let kept = filter(&tokens, &criteria, NOW);
            assert!(kept.iter().all(|t| tokens.contains(t)));
            assert!(kept.iter().all(|t| criteria.accepts(t, NOW)));
        }
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("fallback".parse::<EmptyFilterPolicy>(), Ok(EmptyFilterPolicy::Fallback));
        assert_eq!("FallbackTopN".parse::<EmptyFilterPolicy>(), Ok(EmptyFilterPolicy::Fallback));
        assert_eq!(" Empty ".parse::<EmptyFilterPolicy>(), Ok(EmptyFilterPolicy::Empty));
        assert!("sometimes".parse::<EmptyFilterPolicy>().is_err());
    }

    #[test]
    fn test_extreme_created_at_does_not_overflow() {
        let criteria = FilterCriteria {
            max_age_ms: Some(60_000),
            ..Default::default()
        };

        let ancient = Token {
            mint: "old".to_string(),
            created_at: i64::MIN,
            ..Default::default()
        };
        assert!(!criteria.accepts(&ancient, NOW));

        let future = Token {
            mint: "new".to_string(),
            created_at: i64::MAX,
            ..Default::default()
        };
        assert!(criteria.accepts(&future, NOW));
    }
}
