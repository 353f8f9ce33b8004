//! Listing query encoding.
//!
//! Filters are a flat mapping of keys to values, encoded as
//! `application/x-www-form-urlencoded` (spaces become `+`). Entries whose value
//! is empty after trimming are omitted, so `{page: "2", keyword: ""}` and
//! `{page: "2"}` encode to the same string.

use std::collections::BTreeMap;
use url::form_urlencoded;

/// Encodes `params` into a query string, preserving iteration order.
///
/// Empty values are dropped. The result carries no leading `?`.
pub fn encode_query_params<I, K, V>(params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        if value.as_ref().trim().is_empty() {
            continue;
        }
        serializer.append_pair(key.as_ref(), value.as_ref());
    }
    serializer.finish()
}

/// Decodes a query string (with or without a leading `?`) into a mapping.
///
/// When a key repeats, the last value wins.
pub fn decode_query_params(query: &str) -> BTreeMap<String, String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

/// Builder for listing filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQuery {
    params: Vec<(String, String)>,
}

impl PostQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, page: u32) -> Self {
        self.param("page", page.to_string())
    }

    pub fn keyword(self, keyword: impl Into<String>) -> Self {
        self.param("keyword", keyword)
    }

    /// Sets `key`, replacing an earlier value for the same key in place.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.params.push((key, value)),
        }
        self
    }

    pub fn encode(&self) -> String {
        encode_query_params(self.params.iter().map(|(k, v)| (k, v)))
    }
}
