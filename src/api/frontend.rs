use poem::{handler, get, Route, Response, IntoResponse, EndpointExt};
use poem::http::StatusCode;
use poem::web::{Data, Query};
use reqwest::Client as ReqwestClient;
use serde::Deserialize;
use serde_json::json;

const DASHBOARD_HTML: &str = include_str!("dashboard.html");

/// Where the page's `/tokens` requests get forwarded.
#[derive(Clone)]
pub struct Backend {
    pub client: ReqwestClient,
    pub base_url: String,
}

#[derive(Deserialize)]
struct TokensQuery {
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[handler]
async fn index() -> impl IntoResponse {
    Response::builder()
        .content_type("text/html; charset=utf-8")
        .body(DASHBOARD_HTML)
}

fn json_response(status: StatusCode, body: String) -> Response {
    Response::builder()
        .status(status)
        .content_type("application/json")
        .body(body)
}

#[handler]
async fn tokens(Query(query): Query<TokensQuery>, backend: Data<&Backend>) -> Response {
    let url = format!("{}/tokens", backend.base_url.trim_end_matches('/'));
    let mut request = backend.client.get(&url);
    if let Some(kind) = query.kind.as_deref() {
        request = request.query(&[("type", kind)]);
    }

    let forwarded = match request.send().await {
        Ok(resp) => {
            let status = StatusCode::from_u16(resp.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
            resp.text().await.map(|body| (status, body))
        }
        Err(e) => Err(e),
    };

    match forwarded {
        Ok((status, body)) => json_response(status, body),
        Err(e) => {
            tracing::warn!("Backend at {} unreachable: {}", url, e);
            let body = json!({
                "success": false,
                "tokens": [],
                "error": "Failed to contact backend",
                "message": e.to_string(),
            });
            json_response(StatusCode::INTERNAL_SERVER_ERROR, body.to_string())
        }
    }
}

pub fn create_frontend(backend: Backend) -> impl poem::Endpoint<Output = Response> {
    Route::new()
        .at("/", get(index))
        .at("/tokens", get(tokens))
        .data(backend)
}
