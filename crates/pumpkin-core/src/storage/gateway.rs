//! Per-field load/save over a [`KvStore`].
//!
//! Each field lives under its own versioned key. Loading never fails: a
//! missing, unreadable or malformed value yields the field's default.
//! Saving is a single synchronous write with no retry.

use super::KvStore;
use crate::alarm::AlarmConfig;
use crate::claims::{ClaimedSet, PumpkinNumber};
use crate::codec::decode_claimed;
use crate::error::StorageError;
use crate::links::{LinkTable, MapTemplate};

/// Storage keys. Bump a suffix to migrate a field; the old key is ignored.
pub mod keys {
    pub const CLAIMED: &str = "pumpkin-claimed-v3";
    pub const TEMPLATE: &str = "pumpkin-map-template-v2";
    pub const LINKS: &str = "pumpkin-map-links-v2";
    pub const FILTER: &str = "pumpkin-only-unclaimed-v2";
    pub const AUTO_CLEAR_LINKS: &str = "pumpkin-auto-clear-links-v1";
    pub const ALARM: &str = "pumpkin-wave-alarm-v1";
}

/// Reads and writes tracker fields. Owns the store, not the state.
#[derive(Debug)]
pub struct Persistence<S: KvStore> {
    store: S,
}

impl<S: KvStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn raw(&self, key: &str) -> Option<String> {
        match self.store.kv_get(key) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key, "storage read failed, using default: {err}");
                None
            }
        }
    }

    // ── Loads ────────────────────────────────────────────────────────

    pub fn load_claimed(&self) -> ClaimedSet {
        let Some(raw) = self.raw(keys::CLAIMED) else {
            return ClaimedSet::new();
        };
        match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(value) => decode_claimed(Some(&value))
                .into_iter()
                .filter_map(|n| PumpkinNumber::new(n.into()).ok())
                .collect(),
            Err(err) => {
                tracing::warn!(key = keys::CLAIMED, "discarding malformed value: {err}");
                ClaimedSet::new()
            }
        }
    }

    pub fn load_template(&self) -> MapTemplate {
        self.raw(keys::TEMPLATE).map(MapTemplate::new).unwrap_or_default()
    }

    pub fn load_links(&self) -> LinkTable {
        self.raw(keys::LINKS)
            .map(|raw| LinkTable::from_json_lenient(&raw))
            .unwrap_or_default()
    }

    pub fn load_filter(&self) -> bool {
        self.raw(keys::FILTER).as_deref() == Some("1")
    }

    pub fn load_auto_clear_links(&self) -> bool {
        self.raw(keys::AUTO_CLEAR_LINKS).as_deref() == Some("1")
    }

    pub fn load_alarm(&self) -> AlarmConfig {
        self.load_alarm_or(AlarmConfig::default())
    }

    /// Stored alarm settings, or `fallback` when none are stored.
    pub fn load_alarm_or(&self, fallback: AlarmConfig) -> AlarmConfig {
        let Some(raw) = self.raw(keys::ALARM) else {
            return fallback;
        };
        match serde_json::from_str::<AlarmConfig>(&raw) {
            Ok(config) if config.minutes > 0 => config,
            Ok(_) => fallback,
            Err(err) => {
                tracing::warn!(key = keys::ALARM, "discarding malformed value: {err}");
                fallback
            }
        }
    }

    // ── Saves ────────────────────────────────────────────────────────

    pub fn save_claimed(&mut self, claimed: &ClaimedSet) -> Result<(), StorageError> {
        let json = serde_json::to_string(&claimed.sorted()).unwrap_or_else(|_| "[]".into());
        self.store.kv_set(keys::CLAIMED, &json)
    }

    pub fn save_template(&mut self, template: &MapTemplate) -> Result<(), StorageError> {
        self.store.kv_set(keys::TEMPLATE, template.as_str())
    }

    pub fn save_links(&mut self, links: &LinkTable) -> Result<(), StorageError> {
        let json = serde_json::to_string(links).unwrap_or_else(|_| "{}".into());
        self.store.kv_set(keys::LINKS, &json)
    }

    pub fn save_filter(&mut self, only_unclaimed: bool) -> Result<(), StorageError> {
        self.store.kv_set(keys::FILTER, flag(only_unclaimed))
    }

    pub fn save_auto_clear_links(&mut self, enabled: bool) -> Result<(), StorageError> {
        self.store.kv_set(keys::AUTO_CLEAR_LINKS, flag(enabled))
    }

    pub fn save_alarm(&mut self, config: &AlarmConfig) -> Result<(), StorageError> {
        let json = serde_json::to_string(config).unwrap_or_else(|_| "{}".into());
        self.store.kv_set(keys::ALARM, &json)
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}
