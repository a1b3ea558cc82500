//! Blocking HTTP transport over `ureq`.
//!
//! The read window is a socket read timeout: it bounds the silence between
//! two reads, not the whole transfer, so a large body that keeps arriving is
//! never cut off. 4xx/5xx responses come back from ureq as
//! `Error::Status` and are unwrapped into data so their bodies reach the
//! parser. Transparent decompression is compiled out of ureq; the body is
//! handed over exactly as it came off the wire.

use std::io::Read;

use ureq::{Agent, AgentBuilder};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Build the agent shared by every call of one client.
pub fn agent(config: &ClientConfig) -> Agent {
    AgentBuilder::new()
        .timeout_connect(config.connect_timeout)
        .timeout_read(config.read_timeout)
        .build()
}

/// Send `request` and read the whole response body.
pub fn execute(agent: &Agent, request: HttpRequest) -> Result<HttpResponse, ApiError> {
    let method = match request.method {
        HttpMethod::Get => "GET",
        HttpMethod::Post => "POST",
    };
    let mut builder = agent.request(method, &request.url);
    for (name, value) in &request.headers {
        builder = builder.set(name, value);
    }

    let result = match request.body {
        Some(body) => builder.send_bytes(body.as_bytes()),
        None => builder.call(),
    };
    let response = match result {
        Ok(response) => response,
        Err(ureq::Error::Status(_, response)) => response,
        Err(e) => return Err(e.into()),
    };

    let status = response.status();
    let headers = response
        .headers_names()
        .into_iter()
        .filter_map(|name| {
            let value = response.header(&name)?.to_string();
            Some((name, value))
        })
        .collect();

    let mut body = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut body)
        .map_err(|e| ApiError::Transport(e.into()))?;

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}
