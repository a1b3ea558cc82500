//! Request and response values for the price-data API.
//!
//! # Design
//! `Request` is built by the caller and never mutated by the client. The
//! builder methods consume `self`, so a finished request can be shared across
//! threads and sent any number of times.
//!
//! `Response` decodes the metadata the API attaches to every body (token
//! accounting, timestamps, error object) into typed fields and keeps the rest
//! of the payload as untyped JSON under `payload`. `status` and
//! `request_time` are filled in locally and are never read from the wire.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// A single call to the API: path, query parameters and optional POST body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Request {
    path: String,
    parameters: BTreeMap<String, String>,
    post_data: Option<String>,
}

impl Request {
    /// Start a request for `path`, e.g. `"product"` or `"query"`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            parameters: BTreeMap::new(),
            post_data: None,
        }
    }

    /// Add a query parameter. A second value for the same key replaces the first.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Attach a raw JSON body. Requests with a body are sent as POST.
    pub fn post_data(mut self, body: impl Into<String>) -> Self {
        self.post_data = Some(body.into());
        self
    }

    /// Serialize `body` to JSON and attach it as the POST body.
    pub fn json_body<T: Serialize>(self, body: &T) -> Result<Self, ApiError> {
        let raw = serde_json::to_string(body).map_err(ApiError::Serialization)?;
        Ok(self.post_data(raw))
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }

    pub fn body(&self) -> Option<&str> {
        self.post_data.as_deref()
    }
}

/// Outcome of a call. Exactly one value is set on every returned `Response`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    /// Freshly constructed, no call has completed yet.
    #[default]
    Pending,
    Ok,
    /// The call produced no usable answer.
    Fail,
    /// HTTP 429: the account ran out of tokens.
    NotEnoughToken,
    /// HTTP 400: malformed or invalid parameters.
    RequestRejected,
    /// HTTP 402: missing, invalid or expired access key.
    PaymentRequired,
    /// HTTP 405
    MethodNotAllowed,
    /// HTTP 500
    InternalServerError,
}

impl ResponseStatus {
    /// Map an HTTP status code the API is known to emit.
    ///
    /// Returns `None` for codes with no dedicated status; those calls end in
    /// the `Fail` sentinel.
    pub fn from_http_status(code: u16) -> Option<Self> {
        match code {
            200 => Some(Self::Ok),
            400 => Some(Self::RequestRejected),
            402 => Some(Self::PaymentRequired),
            405 => Some(Self::MethodNotAllowed),
            429 => Some(Self::NotEnoughToken),
            500 => Some(Self::InternalServerError),
            _ => None,
        }
    }

    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Ok => "OK",
            Self::Fail => "FAIL",
            Self::NotEnoughToken => "NOT_ENOUGH_TOKEN",
            Self::RequestRejected => "REQUEST_REJECTED",
            Self::PaymentRequired => "PAYMENT_REQUIRED",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error object the API embeds in rejected responses.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestError {
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// A decoded API response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Response {
    #[serde(skip)]
    pub status: ResponseStatus,

    /// Round-trip time of the call in milliseconds.
    #[serde(skip)]
    pub request_time: u64,

    /// Server time of the response, in milliseconds since the epoch.
    #[serde(deserialize_with = "null_as_default")]
    pub timestamp: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub tokens_left: i64,
    /// Milliseconds until the next token refill.
    #[serde(deserialize_with = "null_as_default")]
    pub refill_in: i64,
    /// Tokens added per minute.
    #[serde(deserialize_with = "null_as_default")]
    pub refill_rate: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub token_flow_reduction: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub tokens_consumed: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub processing_time_in_ms: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RequestError>,

    /// Every other field of the body (`products`, `categories`, ...).
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Response {
    /// The sentinel for "no usable answer".
    pub fn request_failed() -> Self {
        Self {
            status: ResponseStatus::Fail,
            ..Self::default()
        }
    }

    /// Look up an untyped payload field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.payload.get(name)
    }
}

/// An explicit `null` leaves the field at its default, same as an absent key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
