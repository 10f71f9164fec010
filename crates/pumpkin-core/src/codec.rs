//! Export/import document.
//!
//! Decoding is lenient on purpose: a document that parses as JSON always
//! decodes, with each field repaired on its own. Only text that is not JSON
//! at all is rejected.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::claims::PumpkinNumber;
use crate::links::{LinkTable, MapTemplate};

/// Everything a user can export and import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub claimed: Vec<u8>,
    pub map_template: MapTemplate,
    pub map_links: LinkTable,
    pub filter_only_unclaimed: bool,
    pub auto_clear_links_on_hour: bool,
}

/// Pretty-printed JSON with claimed numbers ascending.
pub fn encode(state: &PersistedState) -> String {
    let mut canonical = state.clone();
    canonical.claimed.sort_unstable();
    // Only plain strings, integers and bools in here.
    serde_json::to_string_pretty(&canonical).unwrap_or_default()
}

/// `None` when `text` is not JSON; otherwise a field-repaired state.
pub fn decode(text: &str) -> Option<PersistedState> {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!("import rejected: {err}");
            return None;
        }
    };
    let empty = Map::new();
    let doc = value.as_object().unwrap_or(&empty);

    Some(PersistedState {
        claimed: decode_claimed(doc.get("claimed")),
        map_template: doc
            .get("mapTemplate")
            .and_then(Value::as_str)
            .map(MapTemplate::new)
            .unwrap_or_default(),
        map_links: doc
            .get("mapLinks")
            .and_then(Value::as_object)
            .map(LinkTable::sanitize)
            .unwrap_or_default(),
        filter_only_unclaimed: doc.get("filterOnlyUnclaimed").is_some_and(truthy),
        auto_clear_links_on_hour: doc.get("autoClearLinksOnHour").is_some_and(truthy),
    })
}

/// Integers in range, in document order. Anything else is skipped.
pub(crate) fn decode_claimed(value: Option<&Value>) -> Vec<u8> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(as_whole_number)
        .filter_map(|n| PumpkinNumber::new(n).ok())
        .map(PumpkinNumber::get)
        .collect()
}

fn as_whole_number(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    (f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15).then_some(f as i64)
}

/// Loose truthiness for flags written by other tools.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
