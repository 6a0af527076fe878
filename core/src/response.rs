//! Executing a built request and decoding its response.

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::builder::RequestBuilder;
use crate::codec::Decoder;
use crate::error::{Error, Result};
use crate::http::HttpResponse;

/// Outcome of [`execute`].
///
/// | outcome                 | `status` | `body`  | `error` | `original` |
/// |-------------------------|----------|---------|---------|------------|
/// | build/transport failure | 0        | `None`  | `Some`  | `None`     |
/// | non-2xx status          | set      | `None`  | `None`  | `Some`     |
/// | 2xx, decoded            | set      | `Some`  | `None`  | `Some`     |
/// | 2xx, decode failure     | set      | `None`  | `Some`  | `Some`     |
#[derive(Debug)]
pub struct Response<T> {
    pub status: u16,
    pub body: Option<T>,
    pub error: Option<Error>,
    pub original: Option<HttpResponse>,
}

impl<T> Response<T> {
    fn failed(error: Error) -> Self {
        Self {
            status: 0,
            body: None,
            error: Some(error),
            original: None,
        }
    }

    /// True for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Collapse into a `Result`, treating a non-2xx status as
    /// `Error::HttpError` with the raw body as text.
    pub fn into_result(self) -> Result<Option<T>> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if !self.is_success() {
            let body = self
                .original
                .as_ref()
                .map(|original| original.text().into_owned())
                .unwrap_or_default();
            return Err(Error::HttpError {
                status: self.status,
                body,
            });
        }
        Ok(self.body)
    }
}

/// Build the request, send it through the builder's transport and decode a
/// 2xx body with the builder's decoder.
///
/// Nothing is raised: every failure lands in `Response::error`. A non-2xx
/// status is not a failure; it comes back with the raw response and no
/// decode attempt. A transport failure after the context was cancelled or
/// ran past its deadline is reported as `Cancelled` or `DeadlineExceeded`.
pub fn execute<T, D>(builder: &RequestBuilder<D>) -> Response<T>
where
    T: DeserializeOwned + Default,
    D: Decoder,
{
    let request = match builder.build() {
        Ok(request) => request,
        Err(err) => return Response::failed(err),
    };

    let timeout = builder.context_ref().remaining();
    let response = match builder.transport_ref().send(&request, timeout) {
        Ok(response) => response,
        Err(err) => {
            warn!(method = %request.method, url = %request.url, error = %err, "request failed");
            let err = builder.context_ref().check().err().unwrap_or(err);
            return Response::failed(err);
        }
    };

    let status = response.status;
    debug!(method = %request.method, url = %request.url, status, "request completed");
    if !response.is_success() {
        return Response {
            status,
            body: None,
            error: None,
            original: Some(response),
        };
    }

    match parse_response(&response, builder.decoder_ref()) {
        Ok(body) => Response {
            status,
            body: Some(body),
            error: None,
            original: Some(response),
        },
        Err(err) => {
            warn!(url = %request.url, status, error = %err, "response body could not be decoded");
            Response {
                status,
                body: None,
                error: Some(err),
                original: Some(response),
            }
        }
    }
}

/// Decode a response body. An empty body yields `T::default()` without
/// calling the decoder.
pub fn parse_response<T, D>(response: &HttpResponse, decoder: &D) -> Result<T>
where
    T: DeserializeOwned + Default,
    D: Decoder,
{
    if response.body.is_empty() {
        return Ok(T::default());
    }
    decoder.decode(&response.body)
}
