use std::sync::Arc;
use crate::cache::{CacheEntry, ResultCache};
use crate::services::pipeline::RankingPipeline;
use crate::types::models::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Default,
    Trending,
    Volume,
}

impl ViewKind {
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        match raw.map(str::trim) {
            None | Some("") | Some("default") => Some(ViewKind::Default),
            Some("trending") => Some(ViewKind::Trending),
            Some("volume") => Some(ViewKind::Volume),
            Some(_) => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewKind::Default => "default",
            ViewKind::Trending => "trending",
            ViewKind::Volume => "volume",
        }
    }
}

/// A pipeline together with the cache slot that remembers its last result.
pub struct TokenView {
    pub kind: ViewKind,
    pipeline: RankingPipeline,
    cache: ResultCache<Vec<Token>>,
}

impl TokenView {
    pub fn new(kind: ViewKind, pipeline: RankingPipeline, cache: ResultCache<Vec<Token>>) -> Self {
        Self { kind, pipeline, cache }
    }

    pub async fn current(&self) -> Result<CacheEntry<Vec<Token>>, anyhow::Error> {
        self.cache.get_or_refresh(|| async {
            tracing::info!("Refreshing {} view from {}", self.kind.as_str(), self.pipeline.source_name());
            self.pipeline.run().await
        })
        .await
    }

    pub fn ttl_ms(&self) -> i64 {
        self.cache.ttl_ms()
    }

    pub fn now_ms(&self) -> i64 {
        self.cache.now_ms()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub default: Arc<TokenView>,
    pub trending: Arc<TokenView>,
    pub volume: Arc<TokenView>,
}

impl AppState {
    pub fn view(&self, kind: ViewKind) -> &Arc<TokenView> {
        match kind {
            ViewKind::Default => &self.default,
            ViewKind::Trending => &self.trending,
            ViewKind::Volume => &self.volume,
        }
    }

    pub fn views(&self) -> [&Arc<TokenView>; 3] {
        [&self.default, &self.trending, &self.volume]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_kind_parse() {
        assert_eq!(ViewKind::parse(None), Some(ViewKind::Default));
        assert_eq!(ViewKind::parse(Some("")), Some(ViewKind::Default));
        assert_eq!(ViewKind::parse(Some("trending")), Some(ViewKind::Trending));
        assert_eq!(ViewKind::parse(Some("volume")), Some(ViewKind::Volume));
        assert_eq!(ViewKind::parse(Some("hot")), None);
    }
}
