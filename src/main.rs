use std::net::SocketAddr;
use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;
use solana_client::nonblocking::rpc_client::RpcClient;
use tokio::net::TcpListener;
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use solana_sdk::commitment_config::CommitmentConfig;
use std::num::NonZeroU32;
use tokio::time::Duration;
use poem::Server;
use reqwest::Client as ReqwestClient;

mod api;
mod cache;
mod config;
mod services;
mod types;

use crate::api::frontend::{create_frontend, Backend};
use crate::api::routes::create_router;
use crate::api::state::{AppState, TokenView, ViewKind};
use crate::cache::ResultCache;
use crate::config::{AppConfig, ReputationKind, SourceKind};
use crate::services::assets::{helius_rpc_url, RpcAssetSource};
use crate::services::dexscreener::{DexMarketCapEnricher, DexScreenerSource};
use crate::services::filter::FilterCriteria;
use crate::services::monitor;
use crate::services::pipeline::{PipelineConfig, RankingPipeline};
use crate::services::pumpfun::PumpFunSource;
use crate::services::rank::{SortKey, TrendingWeights};
use crate::services::reputation::{LiveReputationEnricher, ReputationEnricher, SyntheticReputationEnricher};
use crate::services::source::{MockSource, ProxySource, SourceFetcher};
use crate::services::token::RpcHolderEnricher;
use crate::services::Limiter;

const MOCK_SEED: u64 = 42;

fn build_source(config: &AppConfig, kind: SourceKind, client: &ReqwestClient, limiter: &Arc<Limiter>) -> Arc<dyn SourceFetcher> {
    match kind {
        SourceKind::PumpFun => Arc::new(PumpFunSource::new(client.clone(), &config.pumpfun_api_url, 50)),
        SourceKind::DexScreener => Arc::new(DexScreenerSource::new(
            client.clone(),
            &config.dexscreener_api_url,
            config.dex_queries.clone(),
            &config.dex_chain,
        )),
        SourceKind::Rpc => Arc::new(RpcAssetSource::new(
            client.clone(),
            config.helius_api_key.as_deref().map(helius_rpc_url),
            config.watchlist_mints.clone(),
            limiter.clone(),
        )),
        SourceKind::Proxy => Arc::new(ProxySource::new(client.clone(), config.proxy_target())),
        SourceKind::Mock => Arc::new(MockSource::new(MOCK_SEED, 40)),
    }
}

fn build_state(config: &AppConfig, client: &ReqwestClient, limiter: &Arc<Limiter>) -> AppState {
    let enrich_delay = Duration::from_millis(config.enrich_delay_ms);

    let reputation: Arc<dyn ReputationEnricher> = match config.reputation {
        ReputationKind::Synthetic => Arc::new(SyntheticReputationEnricher),
        ReputationKind::Live => Arc::new(LiveReputationEnricher::new(
            client.clone(),
            &config.pumpfun_api_url,
            limiter.clone(),
        )),
    };

    let mut default_pipeline = RankingPipeline::new(
        build_source(config, config.source, client, limiter),
        PipelineConfig {
            criteria: config.default_criteria(),
            sort_key: SortKey::Holders,
            top_n: config.top_n,
            enrich_limit: config.enrich_limit,
            enrich_delay,
            on_empty: config.empty_filter_policy,
        },
    )
    .with_reputation(reputation);

    match config.helius_api_key.as_deref() {
        Some(api_key) => {
            let rpc_client = Arc::new(RpcClient::new_with_timeout_and_commitment(
                helius_rpc_url(api_key),
                std::time::Duration::from_secs(60),
                CommitmentConfig::confirmed(),
            ));
            default_pipeline = default_pipeline
                .with_enricher(Arc::new(RpcHolderEnricher::new(rpc_client, limiter.clone())));
        }
        None => tracing::warn!("HELIUS_API_KEY not set, holder counts come from the source as-is"),
    }

    if config.enrich_market_cap {
        default_pipeline = default_pipeline.with_enricher(Arc::new(DexMarketCapEnricher::new(
            client.clone(),
            &config.dexscreener_api_url,
            limiter.clone(),
        )));
    }

    // Pair views need DEX activity fields; only the mock source also has them
    let pair_kind = if config.source == SourceKind::Mock {
        SourceKind::Mock
    } else {
        SourceKind::DexScreener
    };
    let pair_source = build_source(config, pair_kind, client, limiter);

    let trending_pipeline = RankingPipeline::new(
        pair_source.clone(),
        PipelineConfig {
            sort_key: SortKey::Trending(TrendingWeights::default()),
            top_n: config.top_n,
            enrich_delay,
            ..Default::default()
        },
    );

    let volume_pipeline = RankingPipeline::new(
        pair_source,
        PipelineConfig {
            criteria: FilterCriteria {
                min_volume_24h: Some(config.min_volume_24h),
                ..Default::default()
            },
            sort_key: SortKey::Volume24h,
            top_n: config.top_n,
            enrich_delay,
            ..Default::default()
        },
    );

    AppState {
        default: Arc::new(TokenView::new(
            ViewKind::Default,
            default_pipeline,
            ResultCache::new(Duration::from_secs(config.default_ttl_secs)),
        )),
        trending: Arc::new(TokenView::new(
            ViewKind::Trending,
            trending_pipeline,
            ResultCache::new(Duration::from_secs(config.trending_ttl_secs)),
        )),
        volume: Arc::new(TokenView::new(
            ViewKind::Volume,
            volume_pipeline,
            ResultCache::new(Duration::from_secs(config.volume_ttl_secs)),
        )),
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt::init();

    dotenv().ok();
    let config = AppConfig::from_env();
    tracing::info!(
        "Token source: {:?}, reputation: {:?}, top {}",
        config.source,
        config.reputation,
        config.top_n
    );

    let client = ReqwestClient::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()?;

    let rate = NonZeroU32::new(config.enrich_rate_per_sec).unwrap_or(nonzero!(5u32));
    let limiter = Arc::new(RateLimiter::direct(Quota::per_second(rate)));

    let state = build_state(&config, &client, &limiter);
    let app = create_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));
    tracing::info!("API listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    let warm_handle = tokio::spawn({
        let state = state.clone();
        let enabled = config.warm_caches;
        async move {
            if enabled {
                monitor::start_warming(state).await;
            } else {
                std::future::pending::<()>().await;
            }
        }
    });

    // Frontend server
    let frontend = create_frontend(Backend {
        client: client.clone(),
        base_url: config.backend_url.clone(),
    });
    let frontend_addr = format!("0.0.0.0:{}", config.frontend_port);
    tracing::info!("Dashboard listening on {}", frontend_addr);
    let frontend_server = Server::new(poem::listener::TcpListener::bind(frontend_addr)).run(frontend);

    let frontend_handle = tokio::spawn(frontend_server);

    // Run the API, the dashboard and the cache warmer concurrently
    tokio::select! {
        result = axum::serve(listener, app.into_make_service()) => {
            if let Err(e) = result {
                tracing::error!("Failed to serve API: {:?}", e);
            }
        }
        _ = warm_handle => {
            tracing::info!("Cache warming finished");
        }
        _ = frontend_handle => {
            tracing::info!("Frontend server finished");
        }
    }

    Ok(())
}
