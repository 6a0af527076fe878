//! Multi-valued header and query collections.
//!
//! Both collections keep every value appended under a key, in call order.
//! Keys are stored sorted so the encoded query string and the header dump
//! are deterministic.

use std::borrow::Cow;
use std::collections::BTreeMap;

use url::form_urlencoded;

use crate::http::is_token_byte;

/// Request headers keyed by canonical header name.
///
/// `append` canonicalizes the key, so `content-tyPE` and `Content-Type`
/// land under the same entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: BTreeMap<String, Vec<String>>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` under `key` without touching values already present.
    pub fn append(&mut self, key: &str, value: impl Into<String>) {
        self.entries
            .entry(canonical_header_key(key).into_owned())
            .or_default()
            .push(value.into());
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key).first().map(String::as_str)
    }

    /// All values stored under `key`, in insertion order.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.entries
            .get(&*canonical_header_key(key))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, key: &str) -> bool {
        !self.get_all(key).is_empty()
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every `(name, value)` pair, one item per value.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(key, values)| values.iter().map(move |value| (key.as_str(), value.as_str())))
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (key, value) in iter {
            headers.append(key.as_ref(), value);
        }
        headers
    }
}

/// Query parameters, encoded as `application/x-www-form-urlencoded`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: BTreeMap<String, Vec<String>>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.entry(key.into()).or_default().push(value.into());
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in ascending order, each key's values in insertion order.
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, values) in &self.entries {
            for value in values {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut queries = QueryParams::new();
        for (key, value) in iter {
            queries.append(key, value);
        }
        queries
    }
}

/// Canonical MIME form of a header name: the first letter and every letter
/// following a `-` upper-cased, the rest lower-cased. Keys that are not HTTP
/// tokens are returned untouched.
pub fn canonical_header_key(key: &str) -> Cow<'_, str> {
    if !key.bytes().all(is_token_byte) {
        return Cow::Borrowed(key);
    }
    let mut upper = true;
    let canonical: String = key
        .chars()
        .map(|c| {
            let mapped = if upper { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() };
            upper = c == '-';
            mapped
        })
        .collect();
    if canonical == key {
        Cow::Borrowed(key)
    } else {
        Cow::Owned(canonical)
    }
}
