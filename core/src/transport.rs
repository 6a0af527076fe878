//! The seam between a materialized request and the network.
//!
//! # Design
//! A `Transport` takes an `HttpRequest` and returns an `HttpResponse` with
//! the body already drained. Status codes are data here: a 404 or a 500 is a
//! successful round-trip, and only failing to complete the exchange is an
//! error. `UreqTransport` is the default; tests swap in closures.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tracing::debug;
use ureq::http;

use crate::error::{Error, Result};
use crate::http::{HttpRequest, HttpResponse};

/// Sends one request and returns its response.
///
/// `timeout` is the time left before the request context's deadline; a
/// transport should give up once it has elapsed.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest, timeout: Option<Duration>) -> Result<HttpResponse>;
}

/// Closures see only the request. The context deadline is not passed to them,
/// so a closure that blocks is not cut short by it.
impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync,
{
    fn send(&self, request: &HttpRequest, _timeout: Option<Duration>) -> Result<HttpResponse> {
        self(request)
    }
}

/// Settings for `UreqTransport`.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Upper bound on a whole request, applied on top of any context deadline.
    pub timeout: Option<Duration>,
    /// `User-Agent` sent when the request sets none. `None` keeps ureq's.
    pub user_agent: Option<String>,
    /// Largest response body read into memory.
    pub max_body_bytes: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            user_agent: None,
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

/// `Transport` backed by a blocking `ureq::Agent`.
///
/// The agent is configured with `http_status_as_error(false)` so 4xx/5xx
/// responses are returned as data rather than `Err`. Cloning shares the
/// agent's connection pool.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    timeout: Option<Duration>,
    max_body_bytes: u64,
}

impl UreqTransport {
    pub fn new(config: TransportConfig) -> Self {
        let mut builder = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .allow_non_standard_methods(true)
            .timeout_global(config.timeout);
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }
        Self {
            agent: builder.build().new_agent(),
            timeout: config.timeout,
            max_body_bytes: config.max_body_bytes,
        }
    }

    /// Wrap an agent configured elsewhere. The agent must not treat HTTP
    /// status codes as errors, or non-2xx responses surface as transport
    /// failures.
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self {
            agent,
            timeout: None,
            max_body_bytes: TransportConfig::default().max_body_bytes,
        }
    }

    fn run<S: ureq::AsSendBody>(
        &self,
        request: http::Request<S>,
        timeout: Option<Duration>,
    ) -> Result<HttpResponse> {
        let request = match shortest(self.timeout, timeout) {
            Some(timeout) => self
                .agent
                .configure_request(request)
                .timeout_global(Some(timeout))
                .build(),
            None => request,
        };
        let mut response = self.agent.run(request).map_err(transport_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(self.max_body_bytes)
            .read_to_vec()
            .map_err(transport_error)?;

        debug!(status, bytes = body.len(), "response received");
        Ok(HttpResponse { status, headers, body })
    }
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport")
            .field("timeout", &self.timeout)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish_non_exhaustive()
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(TransportConfig::default())
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest, timeout: Option<Duration>) -> Result<HttpResponse> {
        let method = http::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|_| Error::InvalidMethod(request.method.to_string()))?;
        let mut builder = http::Request::builder().method(method).uri(request.url.as_str());
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }

        match &request.body {
            Some(body) => {
                let request = builder.body(body.as_slice()).map_err(transport_error)?;
                self.run(request, timeout)
            }
            None => {
                let request = builder.body(()).map_err(transport_error)?;
                self.run(request, timeout)
            }
        }
    }
}

fn shortest(a: Option<Duration>, b: Option<Duration>) -> Option<Duration> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn transport_error(err: impl std::fmt::Display) -> Error {
    Error::TransportError(err.to_string())
}

/// Process-wide transport used by builders that never call `transport`.
pub(crate) fn default_transport() -> Arc<dyn Transport> {
    static DEFAULT: OnceLock<Arc<UreqTransport>> = OnceLock::new();
    DEFAULT.get_or_init(|| Arc::new(UreqTransport::default())).clone()
}
