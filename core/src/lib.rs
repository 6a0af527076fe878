//! Fluent builder for outbound HTTP requests.
//!
//! # Overview
//! Accumulates host, path, path parameters, query, headers and body on a
//! `RequestBuilder`, materializes them into a plain-data `HttpRequest`, sends
//! it through a pluggable `Transport` and decodes the response into a
//! caller-chosen type.
//!
//! ```no_run
//! #[derive(serde::Deserialize, Default)]
//! struct User {
//!     name: String,
//! }
//!
//! let response = httprequest::new("http://my.host.com")
//!     .path("/users/:id")
//!     .param("id", 7)
//!     .query("expand", "groups")
//!     .execute::<User>();
//!
//! match response.into_result() {
//!     Ok(Some(user)) => println!("hello {}", user.name),
//!     Ok(None) => {}
//!     Err(err) => eprintln!("{err}"),
//! }
//! ```
//!
//! # Design
//! - The builder holds no state between calls; each `build` produces one
//!   request and each `execute` one response.
//! - Encoding happens at build time, decoding at execute time. Both are
//!   pluggable (`Encoder`, `Decoder`) and default to JSON.
//! - Non-2xx responses are data, not errors. `Response` carries the raw
//!   `HttpResponse` so callers can inspect it.
//! - Cancellation is the caller's `Context`; there are no retries.

pub mod builder;
pub mod codec;
pub mod context;
pub mod error;
pub mod headers;
pub mod http;
pub mod response;
pub mod transport;

pub use builder::{new, RequestBuilder};
pub use codec::{Decoder, Encoder, JsonCodec, Payload, XmlCodec};
pub use context::Context;
pub use error::{Error, Result};
pub use headers::{Headers, QueryParams};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use response::{execute, parse_response, Response};
pub use transport::{Transport, TransportConfig, UreqTransport};
