//! Client for the price-data API.
//!
//! # Design
//! `KeepaClient` holds the access key, the per-instance `ClientConfig` and a
//! `ureq::Agent`; nothing in it changes after construction, so one client can
//! be cloned or shared across threads. A call is split the same way the
//! transport types are: `build_request` produces an `HttpRequest`,
//! `transport::execute` performs the round-trip, and `parse_response` turns
//! the `HttpResponse` into a `Response`.
//!
//! `try_send_request` keeps the three failure classes apart (transport,
//! undecodable 200 body, unknown status code). `send_request` is the stable
//! entry point: it folds all of them into `Response::request_failed()` and
//! always stamps `request_time`.

use std::fmt;
use std::time::Instant;

use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::decode::decode_body;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::query::{encode_component, encode_parameters};
use crate::transport;
use crate::types::{Request, Response, ResponseStatus};

const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Synchronous client for the price-data API.
#[derive(Clone)]
pub struct KeepaClient {
    access_key: String,
    config: ClientConfig,
    agent: ureq::Agent,
}

impl KeepaClient {
    /// Client for the production API with the default timeouts.
    pub fn new(access_key: &str) -> Self {
        Self::with_config(access_key, ClientConfig::default())
    }

    pub fn with_config(access_key: &str, config: ClientConfig) -> Self {
        let agent = transport::agent(&config);
        Self {
            access_key: access_key.to_string(),
            config,
            agent,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Issue `request` and return the outcome.
    ///
    /// Never fails: transport errors, undecodable 200 bodies and unknown
    /// status codes all come back as the `Fail` sentinel. If the account's
    /// tokens are depleted the status is `NotEnoughToken`.
    pub fn send_request(&self, request: &Request) -> Response {
        let started = Instant::now();
        let mut response = self.exchange(request).unwrap_or_else(|err| {
            warn!(path = %request.path(), error = %err, "request failed");
            Response::request_failed()
        });
        response.request_time = elapsed_millis(started);
        response
    }

    /// Like `send_request`, but reports why a call produced no usable answer.
    pub fn try_send_request(&self, request: &Request) -> Result<Response, ApiError> {
        let started = Instant::now();
        let mut response = self.exchange(request)?;
        response.request_time = elapsed_millis(started);
        Ok(response)
    }

    /// Build the wire request for `request`: signed URL, headers and body.
    pub fn build_request(&self, request: &Request) -> HttpRequest {
        let mut url = format!(
            "{}/{}?key={}",
            self.config.base_url,
            request.path().trim_start_matches('/'),
            encode_component(&self.access_key)
        );
        let query = encode_parameters(request.parameters());
        if !query.is_empty() {
            url.push('&');
            url.push_str(&query);
        }

        let mut headers = vec![
            ("user-agent".to_string(), self.config.user_agent.clone()),
            ("connection".to_string(), "keep-alive".to_string()),
            ("accept-encoding".to_string(), "gzip".to_string()),
        ];

        let method = match request.body() {
            Some(_) => {
                headers.push(("content-type".to_string(), JSON_CONTENT_TYPE.to_string()));
                HttpMethod::Post
            }
            None => HttpMethod::Get,
        };

        HttpRequest {
            method,
            url,
            headers,
            body: request.body().map(str::to_string),
        }
    }

    /// Decode the body and map the HTTP status.
    ///
    /// A 200 body must decode. For the known error codes decoding is best
    /// effort and an undecodable body yields empty fields; any other code is
    /// `ApiError::UnexpectedStatus`.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Response, ApiError> {
        if response.status == 200 {
            let mut decoded = decode_body(&response.body)?;
            decoded.status = ResponseStatus::Ok;
            return Ok(decoded);
        }

        let status = ResponseStatus::from_http_status(response.status).ok_or(
            ApiError::UnexpectedStatus {
                status: response.status,
            },
        )?;

        let mut decoded = decode_body(&response.body).unwrap_or_else(|err| {
            debug!(status = response.status, error = %err, "error body not decodable");
            Response::default()
        });
        decoded.status = status;
        Ok(decoded)
    }

    fn exchange(&self, request: &Request) -> Result<Response, ApiError> {
        let http_request = self.build_request(request);
        debug!(path = %request.path(), method = ?http_request.method, "sending request");

        let http_response = transport::execute(&self.agent, http_request)?;
        debug!(path = %request.path(), status = http_response.status, "response received");

        self.parse_response(http_response)
    }
}

impl fmt::Debug for KeepaClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeepaClient")
            .field("access_key", &"<redacted>")
            .field("config", &self.config)
            .finish()
    }
}

fn elapsed_millis(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
