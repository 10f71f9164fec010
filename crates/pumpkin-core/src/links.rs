//! Per-number map links and the fallback URL template.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::claims::PumpkinNumber;
use crate::error::ValidationError;

pub const DEFAULT_TEMPLATE: &str = "https://wplace.live/?lat={lat}&lng={lng}&zoom=14";

const NUM_PLACEHOLDER: &str = "{num}";

/// Whether `s` parses as an absolute URL.
pub fn is_likely_url(s: &str) -> bool {
    Url::parse(s).is_ok()
}

/// Stored link for each pumpkin number.
///
/// Serializes as a JSON object with numeric string keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkTable {
    links: BTreeMap<u8, String>,
}

impl LinkTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only entries whose key is an integer in range and whose value is
    /// a URL string. Everything else is dropped without complaint.
    pub fn sanitize(raw: &serde_json::Map<String, serde_json::Value>) -> Self {
        let links = raw
            .iter()
            .filter_map(|(key, value)| {
                let n = parse_key(key)?;
                let url = value.as_str().filter(|v| is_likely_url(v))?;
                Some((n.get(), url.to_string()))
            })
            .collect();
        Self { links }
    }

    /// Parse stored JSON, falling back to an empty table.
    pub fn from_json_lenient(raw: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(serde_json::Value::Object(map)) => Self::sanitize(&map),
            _ => Self::default(),
        }
    }

    pub fn set(&mut self, n: PumpkinNumber, url: &str) -> Result<(), ValidationError> {
        if !is_likely_url(url) {
            return Err(ValidationError::InvalidUrl(url.to_string()));
        }
        self.links.insert(n.get(), url.to_string());
        Ok(())
    }

    pub fn remove(&mut self, n: PumpkinNumber) -> Option<String> {
        self.links.remove(&n.get())
    }

    pub fn get(&self, n: PumpkinNumber) -> Option<&str> {
        self.links.get(&n.get()).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.links.clear();
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &str)> {
        self.links.iter().map(|(n, url)| (*n, url.as_str()))
    }
}

/// Keys are compared numerically, so `"7"`, `" 7"` and `"7.0"` all mean 7.
fn parse_key(key: &str) -> Option<PumpkinNumber> {
    let value: f64 = key.trim().parse().ok()?;
    if !value.is_finite() || value.fract() != 0.0 {
        return None;
    }
    PumpkinNumber::new(value as i64).ok()
}

/// URL pattern used when a number has no stored link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapTemplate(String);

impl MapTemplate {
    /// An empty pattern means "use the default".
    pub fn new(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        if pattern.is_empty() {
            Self::default()
        } else {
            Self(pattern)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substitute `n` for the first `{num}` placeholder, if any.
    pub fn url_for(&self, n: PumpkinNumber) -> String {
        if self.0.contains(NUM_PLACEHOLDER) {
            self.0.replacen(NUM_PLACEHOLDER, &n.to_string(), 1)
        } else {
            self.0.clone()
        }
    }
}

impl Default for MapTemplate {
    fn default() -> Self {
        Self(DEFAULT_TEMPLATE.to_string())
    }
}
