//! Executing `HttpRequest` values over the network.
//!
//! # Design
//! `Transport` is the I/O seam: the core builds and parses, a transport
//! moves bytes. `UreqTransport` disables ureq's status-as-error behavior so
//! 4xx/5xx responses come back as data and the decoders decide what they
//! mean. No retries, no caching, default timeouts.

use ureq::{Agent, RequestBuilder};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub trait Transport: Send + Sync {
    /// Perform the round trip. Only transport-level failures are errors;
    /// any HTTP status is a successful `HttpResponse`.
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = request.url.as_str();
        let result = match request.method {
            HttpMethod::Get => with_headers(self.agent.get(url), &request.headers).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(url), &request.headers).call(),
            HttpMethod::Post => send(with_headers(self.agent.post(url), &request.headers), request),
            HttpMethod::Put => send(with_headers(self.agent.put(url), &request.headers), request),
            HttpMethod::Patch => send(with_headers(self.agent.patch(url), &request.headers), request),
        };
        let mut response = result.map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (key, value) in headers {
        builder = builder.header(key.as_str(), value.as_str());
    }
    builder
}

fn send(
    builder: RequestBuilder<ureq::typestate::WithBody>,
    request: &HttpRequest,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match request.body.as_deref() {
        Some(body) => builder.send(body),
        None => builder.send_empty(),
    }
}
