//! Synchronous client for the Keepa price-data API.
//!
//! # Overview
//! Callers describe a call as a `Request` (path, query parameters, optional
//! JSON body) and hand it to `KeepaClient::send_request`, which signs the URL
//! with the access key, performs one blocking HTTPS round-trip, gunzips and
//! decodes the JSON body and maps the HTTP status into a `ResponseStatus`.
//!
//! # Design
//! - One attempt per call. No retries, no token accounting, no caching.
//! - `send_request` never fails; every error becomes the `Fail` sentinel.
//!   `try_send_request` exposes the same call with the failure classes kept
//!   apart in `ApiError`.
//! - Building (`build_request`) and parsing (`parse_response`) are pure and
//!   exchange plain-data `HttpRequest` / `HttpResponse` values; `transport`
//!   is the only module that does I/O.
//!
//! ```no_run
//! use keepa_core::{KeepaClient, Request, ResponseStatus};
//!
//! let client = KeepaClient::new("my-access-key");
//! let request = Request::new("product").param("domain", "1").param("asin", "B00TEST");
//! let response = client.send_request(&request);
//! if response.status == ResponseStatus::Ok {
//!     println!("{} tokens left", response.tokens_left);
//! }
//! ```

pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod http;
pub mod query;
pub mod transport;
pub mod types;

pub use client::KeepaClient;
pub use config::ClientConfig;
pub use error::{ApiError, DecodeError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{Request, RequestError, Response, ResponseStatus};
