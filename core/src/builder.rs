//! Fluent request builder.
//!
//! # Design
//! `RequestBuilder` accumulates configuration through `self`-consuming
//! methods applied in call order and does no validation until `build`.
//! `build` borrows the builder, so one builder can materialize any number of
//! identical requests. The decoder is a type parameter because decoding is
//! generic over the target type; everything else is stored type-erased.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::codec::{Decoder, Encoder, JsonCodec, Payload, XmlCodec};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::headers::{Headers, QueryParams};
use crate::http::{HttpMethod, HttpRequest};
use crate::response::{self, Response};
use crate::transport::{default_transport, Transport};

/// Bytes escaped in the path: controls, space, non-ASCII and the characters
/// that may not appear raw in a URL path. `%` passes through so already
/// escaped input is not escaped twice.
const PATH_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Start a builder for `host`. Shorthand for `RequestBuilder::new`.
pub fn new(host: impl Into<String>) -> RequestBuilder {
    RequestBuilder::new(host)
}

/// Accumulated configuration for one HTTP request.
///
/// ```no_run
/// # #[derive(serde::Deserialize, Default)] struct User;
/// let response = httprequest::new("http://my.host.com")
///     .method("PATCH")
///     .path("/users/:id")
///     .param("id", 42)
///     .query("fields", "name")
///     .header("Authorization", "Bearer token")
///     .json(serde_json::json!({ "name": "alice" }))
///     .execute::<User>();
/// ```
pub struct RequestBuilder<D = JsonCodec> {
    context: Context,
    transport: Arc<dyn Transport>,
    method: HttpMethod,
    host: String,
    path: String,
    params: BTreeMap<String, String>,
    headers: Headers,
    queries: QueryParams,
    body: Option<Box<dyn Payload>>,
    encoder: Arc<dyn Encoder>,
    decoder: D,
}

impl RequestBuilder {
    /// A `GET` to `host` with no path, JSON encoding and decoding, the
    /// background context and the process-wide default transport.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            context: Context::background(),
            transport: default_transport(),
            method: HttpMethod::Get,
            host: host.into(),
            path: String::new(),
            params: BTreeMap::new(),
            headers: Headers::new(),
            queries: QueryParams::new(),
            body: None,
            encoder: Arc::new(JsonCodec),
            decoder: JsonCodec,
        }
    }
}

impl<D> RequestBuilder<D> {
    pub fn context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    pub fn method(mut self, method: impl Into<HttpMethod>) -> Self {
        self.method = method.into();
        self
    }

    /// Path template appended to the host. `:name` marks a parameter bound
    /// with `param`:
    ///
    /// ```
    /// let req = httprequest::new("http://h")
    ///     .path("/:userId/address/:addrId")
    ///     .param("userId", 123)
    ///     .param("addrId", 2)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(req.url, "http://h/123/address/2");
    /// ```
    ///
    /// Parameters are substituted in ascending name order by plain text
    /// replacement, so a name that is a prefix of another (`:id` and
    /// `:identity`) rewrites the start of the longer token too.
    ///
    /// The substituted path is percent-escaped when the request is built.
    /// Anything after a `?` or `#` in it is dropped: the query string always
    /// comes from `query`/`queries`.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Bind one path parameter. Binding the same name again overwrites it.
    pub fn param(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// Bind several path parameters, keeping bindings made earlier.
    pub fn params<K, V, I>(mut self, params: I) -> Self
    where
        K: Into<String>,
        V: fmt::Display,
        I: IntoIterator<Item = (K, V)>,
    {
        self.params
            .extend(params.into_iter().map(|(key, value)| (key.into(), value.to_string())));
        self
    }

    /// Append a header value. The name is canonicalized, so
    /// `header("authoRIZATION", ..)` is sent as `Authorization`. Values
    /// already set under the name are kept.
    pub fn header(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.headers.append(key, value.to_string());
        self
    }

    /// Replace every header.
    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// Append a query parameter. Values already set under the key are kept.
    pub fn query(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.queries.append(key, value.to_string());
        self
    }

    /// Replace every query parameter.
    pub fn queries(mut self, queries: QueryParams) -> Self {
        self.queries = queries;
        self
    }

    /// Set the body, encoded by the current encoder when the request is built.
    pub fn body<B>(mut self, body: B) -> Self
    where
        B: Serialize + Send + Sync + 'static,
    {
        self.body = Some(Box::new(body));
        self
    }

    pub fn encoder(mut self, encoder: impl Encoder + 'static) -> Self {
        self.encoder = Arc::new(encoder);
        self
    }

    /// Send `body` verbatim. No content type is set.
    pub fn text(mut self, body: impl Into<String>) -> Self {
        let body = body.into();
        self.body = Some(Box::new(body.clone()));
        self.encoder = Arc::new(move |_: &dyn Payload| -> Result<Vec<u8>> { Ok(body.clone().into_bytes()) });
        self
    }

    /// Send `body` as JSON and append `Content-Type: application/json`.
    pub fn json<B>(mut self, body: B) -> Self
    where
        B: Serialize + Send + Sync + 'static,
    {
        self.body = Some(Box::new(body));
        self.encoder = Arc::new(JsonCodec);
        self.headers.append("Content-Type", "application/json");
        self
    }

    /// Send `body` as XML and append `Content-Type: application/xml`.
    pub fn xml<B>(mut self, body: B) -> Self
    where
        B: Serialize + Send + Sync + 'static,
    {
        self.body = Some(Box::new(body));
        self.encoder = Arc::new(XmlCodec);
        self.headers.append("Content-Type", "application/xml");
        self
    }

    /// Swap the decoder used by `execute`.
    pub fn decoder<E: Decoder>(self, decoder: E) -> RequestBuilder<E> {
        RequestBuilder {
            context: self.context,
            transport: self.transport,
            method: self.method,
            host: self.host,
            path: self.path,
            params: self.params,
            headers: self.headers,
            queries: self.queries,
            body: self.body,
            encoder: self.encoder,
            decoder,
        }
    }

    /// Materialize the request.
    ///
    /// Fails when the encoder rejects the body, the context is already done,
    /// the method is not a token, or `host + path` is not an absolute URL.
    pub fn build(&self) -> Result<HttpRequest> {
        let body = match &self.body {
            Some(body) => Some(self.encoder.encode(&**body)?),
            None => None,
        };

        self.context.check()?;
        if !self.method.is_valid() {
            return Err(Error::InvalidMethod(self.method.to_string()));
        }

        let path = substitute_params(&self.path, &self.params);
        let path = &path[..path.find(|c: char| c == '?' || c == '#').unwrap_or(path.len())];
        let mut url = format!("{}{}", self.host, utf8_percent_encode(path, PATH_ENCODE_SET));
        Url::parse(&url).map_err(|e| Error::InvalidUrl {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        if !self.queries.is_empty() {
            url.push('?');
            url.push_str(&self.queries.encode());
        }

        debug!(method = %self.method, url = %url, "request built");
        Ok(HttpRequest {
            method: self.method.clone(),
            url,
            headers: self.headers.clone(),
            body,
        })
    }

    pub(crate) fn context_ref(&self) -> &Context {
        &self.context
    }

    pub(crate) fn transport_ref(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub(crate) fn decoder_ref(&self) -> &D {
        &self.decoder
    }
}

impl<D: Decoder> RequestBuilder<D> {
    /// Build, send and decode. See [`response::execute`].
    pub fn execute<T>(&self) -> Response<T>
    where
        T: DeserializeOwned + Default,
    {
        response::execute(self)
    }
}

impl<D: fmt::Debug> fmt::Debug for RequestBuilder<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("context", &self.context)
            .field("method", &self.method)
            .field("host", &self.host)
            .field("path", &self.path)
            .field("params", &self.params)
            .field("headers", &self.headers)
            .field("queries", &self.queries)
            .field("has_body", &self.body.is_some())
            .field("decoder", &self.decoder)
            .finish_non_exhaustive()
    }
}

fn substitute_params(path: &str, params: &BTreeMap<String, String>) -> String {
    params.iter().fold(path.to_string(), |path, (key, value)| {
        path.replace(&format!(":{key}"), value)
    })
}
