//! In-process imitation of the price-data API.
//!
//! Every JSON body is gzip-compressed, as on the real API. Access keys map to
//! token balances; a call that costs more than the balance gets 429, an
//! unknown key gets 402 and bad parameters get 400. The `/fault/*` routes
//! return broken, slow or trickled responses on purpose and skip the key
//! check.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use flate2::{write::GzEncoder, Compression};
use futures_util::{stream, StreamExt};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

pub const REFILL_RATE: i64 = 20;
pub const REFILL_IN_MS: i64 = 60_000;
pub const PRODUCT_COST: i64 = 1;
pub const QUERY_COST: i64 = 10;

/// Token balances per access key.
#[derive(Clone, Default)]
pub struct MockState {
    accounts: Arc<RwLock<HashMap<String, i64>>>,
}

impl MockState {
    pub fn with_accounts<'a>(accounts: impl IntoIterator<Item = (&'a str, i64)>) -> Self {
        let accounts = accounts
            .into_iter()
            .map(|(key, tokens)| (key.to_string(), tokens))
            .collect();
        Self {
            accounts: Arc::new(RwLock::new(accounts)),
        }
    }

    pub async fn tokens_left(&self, key: &str) -> Option<i64> {
        self.accounts.read().await.get(key).copied()
    }

    /// Deduct `cost` tokens from `key`'s balance.
    async fn charge(&self, params: &HashMap<String, String>, cost: i64) -> Result<Meta, GzipJson> {
        let key = params.get("key").map(String::as_str).unwrap_or_default();
        let mut accounts = self.accounts.write().await;
        let Some(balance) = accounts.get_mut(key) else {
            return Err(GzipJson::error(
                StatusCode::PAYMENT_REQUIRED,
                "PAYMENT_REQUIRED",
                "Access key missing, invalid or expired.",
            ));
        };

        if *balance < cost {
            let mut body = Meta {
                tokens_left: *balance,
                tokens_consumed: 0,
            }
            .to_json();
            body["error"] = json!({
                "type": "NOT_ENOUGH_TOKEN",
                "message": format!("This call needs {cost} tokens."),
            });
            return Err(GzipJson(StatusCode::TOO_MANY_REQUESTS, body));
        }

        *balance -= cost;
        Ok(Meta {
            tokens_left: *balance,
            tokens_consumed: cost,
        })
    }
}

/// Token metadata attached to every body.
struct Meta {
    tokens_left: i64,
    tokens_consumed: i64,
}

impl Meta {
    fn to_json(&self) -> Value {
        json!({
            "timestamp": now_millis(),
            "tokensLeft": self.tokens_left,
            "refillIn": REFILL_IN_MS,
            "refillRate": REFILL_RATE,
            "tokenFlowReduction": 0.0,
            "tokensConsumed": self.tokens_consumed,
            "processingTimeInMs": 0,
        })
    }

    fn with(self, fields: Value) -> Value {
        let mut body = self.to_json();
        if let (Some(body), Value::Object(fields)) = (body.as_object_mut(), fields) {
            body.extend(fields);
        }
        body
    }
}

/// A JSON body sent gzip-compressed with `content-encoding: gzip`.
pub struct GzipJson(pub StatusCode, pub Value);

impl GzipJson {
    fn error(status: StatusCode, kind: &str, message: &str) -> Self {
        Self(
            status,
            json!({
                "timestamp": now_millis(),
                "error": {"type": kind, "message": message},
            }),
        )
    }
}

impl IntoResponse for GzipJson {
    fn into_response(self) -> axum::response::Response {
        match gzip(self.1.to_string().as_bytes()) {
            Ok(body) => (
                self.0,
                [
                    (header::CONTENT_TYPE, "application/json;charset=UTF-8"),
                    (header::CONTENT_ENCODING, "gzip"),
                ],
                body,
            )
                .into_response(),
            Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

pub fn gzip(raw: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(raw)?;
    encoder.finish()
}

pub fn app(state: MockState) -> Router {
    Router::new()
        .route("/token", get(token_status))
        .route("/product", get(product))
        .route("/query", post(product_finder))
        .route("/fault/corrupt", get(corrupt_body))
        .route("/fault/status/{code}", get(status_with_body))
        .route("/fault/plain/{code}", get(status_with_plain_body))
        .route("/fault/slow/{millis}", get(slow))
        .route("/fault/trickle/{chunks}/{millis}", get(trickle))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: MockState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}

async fn log_request(request: axum::extract::Request, next: Next) -> axum::response::Response {
    // The query string carries the access key, so only the path is logged.
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let response = next.run(request).await;
    info!(%method, %path, status = response.status().as_u16(), "handled request");
    response
}

async fn token_status(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<GzipJson, GzipJson> {
    let meta = state.charge(&params, 0).await?;
    Ok(GzipJson(StatusCode::OK, meta.to_json()))
}

async fn product(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<GzipJson, GzipJson> {
    let domain = params
        .get("domain")
        .and_then(|d| d.parse::<u8>().ok())
        .filter(|d| (1..=12).contains(d))
        .ok_or_else(|| {
            GzipJson::error(StatusCode::BAD_REQUEST, "invalidParameter", "domain must be 1 to 12")
        })?;
    let asins: Vec<&str> = params
        .get("asin")
        .map(|list| list.split(',').filter(|a| !a.is_empty()).collect())
        .unwrap_or_default();
    if asins.is_empty() {
        return Err(GzipJson::error(
            StatusCode::BAD_REQUEST,
            "invalidParameter",
            "asin is required",
        ));
    }

    let cost = PRODUCT_COST * asins.len() as i64;
    let meta = state.charge(&params, cost).await?;
    let products: Vec<Value> = asins
        .iter()
        .map(|asin| {
            json!({
                "asin": asin,
                "domainId": domain,
                "title": format!("Mock product {asin}"),
            })
        })
        .collect();
    Ok(GzipJson(StatusCode::OK, meta.with(json!({ "products": products }))))
}

async fn product_finder(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
    body: String,
) -> Result<GzipJson, GzipJson> {
    let selection: Value = serde_json::from_str(&body).map_err(|e| {
        GzipJson::error(StatusCode::BAD_REQUEST, "invalidParameter", &e.to_string())
    })?;
    let meta = state.charge(&params, QUERY_COST).await?;
    Ok(GzipJson(
        StatusCode::OK,
        meta.with(json!({
            "asinList": ["B00MOCK001", "B00MOCK002"],
            "totalResults": 2,
            "selection": selection,
        })),
    ))
}

async fn corrupt_body() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_ENCODING, "gzip")],
        b"\x1f\x8b\x08\x00this is not a deflate stream".to_vec(),
    )
}

async fn status_with_body(Path(code): Path<u16>) -> Result<GzipJson, StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    let mut body = Meta {
        tokens_left: 0,
        tokens_consumed: 0,
    }
    .to_json();
    body["error"] = json!({"type": "INJECTED", "message": format!("injected status {code}")});
    Ok(GzipJson(status, body))
}

async fn status_with_plain_body(Path(code): Path<u16>) -> Result<(StatusCode, &'static str), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, "plain text, not gzip"))
}

async fn slow(Path(millis): Path<u64>) -> GzipJson {
    tokio::time::sleep(Duration::from_millis(millis)).await;
    GzipJson(StatusCode::OK, json!({"timestamp": now_millis()}))
}

/// A 200 gzip body split into `chunks` pieces, each sent after `millis` of silence.
async fn trickle(Path((chunks, millis)): Path<(usize, u64)>) -> Result<impl IntoResponse, StatusCode> {
    let products: Vec<Value> = (0..200)
        .map(|i| json!({"asin": format!("B00TRICKLE{i:03}"), "title": format!("Trickled product {i}")}))
        .collect();
    let body = gzip(json!({"timestamp": now_millis(), "products": products}).to_string().as_bytes())
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let size = body.len().div_ceil(chunks.max(1));
    let pieces: Vec<Vec<u8>> = body.chunks(size).map(<[u8]>::to_vec).collect();
    let delayed = stream::iter(pieces).then(move |piece| async move {
        tokio::time::sleep(Duration::from_millis(millis)).await;
        Ok::<_, std::io::Error>(piece)
    });

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json;charset=UTF-8"),
            (header::CONTENT_ENCODING, "gzip"),
        ],
        Body::from_stream(delayed),
    ))
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
