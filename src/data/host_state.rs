use crate::calc::parse_timestamp;
use crate::data::persistence::Persistable;
use anyhow::Result;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

/// One entry of the host's state store. Attributes keep whatever JSON the
/// host wrote (`has_date: true`, `year: 2025`, ...); only string values are
/// ever read.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct EntityState {
    pub state: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
}

impl EntityState {
    pub fn new(state: &str) -> Self {
        EntityState {
            state: state.to_string(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes
            .insert(key.to_string(), Value::String(value.to_string()));
        self
    }
}

/// Snapshot of the host state store: entity id -> state. Stored as
/// `states.json`; every lookup tolerates absent entries.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct HostState {
    pub states: BTreeMap<String, EntityState>,
}

impl Persistable for HostState {
    fn filename() -> &'static str {
        "states.json"
    }
    fn is_json() -> bool {
        true
    }
}

impl HostState {
    /// Loads from the data directory; an unreadable store is treated as empty.
    pub fn load_or_default() -> Self {
        Self::degrade(Self::load())
    }

    pub fn load_from_or_default(dir: &Path) -> Self {
        Self::degrade(Self::load_from(dir))
    }

    fn degrade(loaded: Result<Self>) -> Self {
        loaded.unwrap_or_else(|e| {
            warn!(error = %format!("{e:#}"), "host state unreadable, showing no data");
            Self::default()
        })
    }

    pub fn insert(&mut self, id: &str, state: EntityState) {
        self.states.insert(id.to_string(), state);
    }

    pub fn get(&self, id: &str) -> Option<&EntityState> {
        self.states.get(id)
    }

    /// Sorted by id.
    pub fn entity_ids(&self) -> Vec<&str> {
        self.states.keys().map(String::as_str).collect()
    }

    pub fn attribute(&self, id: &str, key: &str) -> Option<&str> {
        self.get(id)
            .and_then(|s| s.attributes.get(key))
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Raw state string, or `""` when the entity is unknown.
    pub fn raw_state(&self, id: &str) -> &str {
        self.get(id).map(|s| s.state.as_str()).unwrap_or("")
    }

    /// Parsed last-event timestamp; `None` when absent or unparsable.
    pub fn last_event(&self, id: &str) -> Option<NaiveDateTime> {
        parse_timestamp(self.raw_state(id))
    }

    /// Sets the entity's state, creating the entry when missing.
    pub fn set_state(&mut self, id: &str, value: &str) {
        self.states
            .entry(id.to_string())
            .or_default()
            .state = value.to_string();
    }
}
