use axum::{
    extract::{State, Query},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use crate::types::models::{Token, TokensResponse, TrendingToken};
use super::error::ApiError;
use super::state::{AppState, ViewKind};

pub const EMPTY_MESSAGE: &str = "No qualifying tokens";

#[derive(Deserialize)]
pub struct TokensParams {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

fn respond<T: Serialize>(tokens: Vec<T>, last_updated: i64, next_update: i64) -> Response {
    let message = tokens.is_empty().then(|| EMPTY_MESSAGE.to_string());
    Json(TokensResponse {
        success: true,
        tokens,
        last_updated,
        next_update,
        message,
    })
    .into_response()
}

pub async fn get_tokens(
    State(state): State<AppState>,
    Query(params): Query<TokensParams>,
) -> Result<Response, ApiError> {
    let kind = ViewKind::parse(params.kind.as_deref()).ok_or_else(|| {
        ApiError::BadRequest(format!("unknown view type '{}'", params.kind.clone().unwrap_or_default()))
    })?;

    let view = state.view(kind);
    let entry = view.current().await.map_err(|e| {
        tracing::error!("Failed to build {} view: {:?}", kind.as_str(), e);
        ApiError::Pipeline(e.to_string())
    })?;

    let next_update = entry.fetched_at_ms + view.ttl_ms();
    let response = match kind {
        ViewKind::Default => respond::<Token>(entry.value, entry.fetched_at_ms, next_update),
        ViewKind::Trending | ViewKind::Volume => {
            let rows: Vec<TrendingToken> = entry.value.iter().map(TrendingToken::from).collect();
            respond(rows, entry.fetched_at_ms, next_update)
        }
    };
    Ok(response)
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
