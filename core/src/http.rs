//! HTTP exchange described as plain data.
//!
//! # Design
//! `KeepaClient::build_request` produces an `HttpRequest` and
//! `KeepaClient::parse_response` consumes an `HttpResponse`; neither touches
//! the network. `transport::execute` is the single step that does. Keeping
//! the two ends pure lets the URL, header and status-mapping logic be tested
//! without a server.
//!
//! Response bodies are raw bytes: the API gzips everything, and decoding is
//! the parser's job.

/// HTTP method for a request. The API only uses these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// A fully built request: absolute URL, headers in send order, optional body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// First header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A received response: status code, headers and the undecoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}
