//! Body encoders and response decoders.
//!
//! # Design
//! The builder stores the request body type-erased as `Box<dyn Payload>`, so
//! the encoder only sees the object-safe `Payload` view and is itself stored
//! as a trait object. Decoding has to produce a caller-chosen type, which
//! needs a generic method, so `Decoder` is carried as a type parameter of the
//! builder instead.

use std::any::Any;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};

/// A request body the builder can hand to an encoder.
///
/// Implemented for every `Serialize` type, so callers never implement it by
/// hand. Custom encoders that need the concrete value can go through
/// `as_any` and downcast.
pub trait Payload: Any + Send + Sync {
    fn to_json(&self) -> Result<Vec<u8>>;

    fn to_xml(&self) -> Result<Vec<u8>>;

    fn as_any(&self) -> &dyn Any;
}

impl<T> Payload for T
where
    T: Serialize + Any + Send + Sync,
{
    fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| Error::SerializationError(e.to_string()))
    }

    fn to_xml(&self) -> Result<Vec<u8>> {
        quick_xml::se::to_string(self)
            .map(String::into_bytes)
            .map_err(|e| Error::SerializationError(e.to_string()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Turns a request body into bytes.
pub trait Encoder: Send + Sync {
    fn encode(&self, body: &dyn Payload) -> Result<Vec<u8>>;
}

impl<F> Encoder for F
where
    F: Fn(&dyn Payload) -> Result<Vec<u8>> + Send + Sync,
{
    fn encode(&self, body: &dyn Payload) -> Result<Vec<u8>> {
        self(body)
    }
}

/// Turns a response body into a value of the caller's choosing.
pub trait Decoder {
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T>;
}

/// JSON via `serde_json`. The default encoder and decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Encoder for JsonCodec {
    fn encode(&self, body: &dyn Payload) -> Result<Vec<u8>> {
        body.to_json()
    }
}

impl Decoder for JsonCodec {
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes).map_err(|e| Error::DeserializationError(e.to_string()))
    }
}

/// XML via `quick-xml`. The root element is named after the serialized type.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlCodec;

impl Encoder for XmlCodec {
    fn encode(&self, body: &dyn Payload) -> Result<Vec<u8>> {
        body.to_xml()
    }
}

impl Decoder for XmlCodec {
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        let text = std::str::from_utf8(bytes).map_err(|e| Error::DeserializationError(e.to_string()))?;
        quick_xml::de::from_str(text).map_err(|e| Error::DeserializationError(e.to_string()))
    }
}
