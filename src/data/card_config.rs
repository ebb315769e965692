use crate::data::host_state::HostState;
use crate::data::persistence::Persistable;
use crate::error::InputError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const DEFAULT_TITLE: &str = "Datetime Card";
pub const DEFAULT_HOLD_THRESHOLD_MS: u64 = 500;
pub const DEFAULT_ICON: &str = "mdi:calendar";
/// Longest period the editor accepts; keeps next-date arithmetic in range.
pub const MAX_FREQUENCY_DAYS: i64 = 36_500;

/// One recurring task. `id` keys into the host state.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct TrackedEntity {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    /// Configured period; see `calc::effective_frequency` for defaulting.
    /// Anything but a whole number in `1..=MAX_FREQUENCY_DAYS` loads as unset.
    #[serde(
        default,
        deserialize_with = "lenient_frequency",
        skip_serializing_if = "Option::is_none"
    )]
    pub frequency_days: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl TrackedEntity {
    pub fn new(id: &str) -> Self {
        TrackedEntity {
            id: id.to_string(),
            ..Default::default()
        }
    }

    /// Config override, then host attribute, then `"Unknown"`.
    pub fn display_name(&self, host: &HostState) -> String {
        self.resolved_name(host)
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// Name used in confirmation prompts; falls back to `"this item"`.
    pub fn confirmation_name(&self, host: &HostState) -> String {
        self.resolved_name(host)
            .unwrap_or_else(|| "this item".to_string())
    }

    fn resolved_name(&self, host: &HostState) -> Option<String> {
        self.friendly_name
            .clone()
            .filter(|n| !n.is_empty())
            .or_else(|| host.attribute(&self.id, "friendly_name").map(str::to_string))
    }

    pub fn icon(&self, host: &HostState) -> String {
        self.icon
            .clone()
            .filter(|i| !i.is_empty())
            .or_else(|| host.attribute(&self.id, "icon").map(str::to_string))
            .unwrap_or_else(|| DEFAULT_ICON.to_string())
    }
}

/// Card configuration, stored as `config.yaml`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct CardConfig {
    pub title: String,
    pub entities: Vec<TrackedEntity>,
    pub filter_overdue: bool,
    pub show_next_date: bool,
    pub show_months: bool,
    pub debug: bool,
    pub skip_confirmation: bool,
    pub hold_threshold_ms: u64,
}

impl Default for CardConfig {
    fn default() -> Self {
        CardConfig {
            title: DEFAULT_TITLE.to_string(),
            entities: Vec::new(),
            filter_overdue: false,
            show_next_date: true,
            show_months: false,
            debug: false,
            skip_confirmation: false,
            hold_threshold_ms: DEFAULT_HOLD_THRESHOLD_MS,
        }
    }
}

impl Persistable for CardConfig {
    fn filename() -> &'static str {
        "config.yaml"
    }
    fn is_json() -> bool {
        false
    }
}

impl CardConfig {
    /// Configured entities, or the first `input_datetime` entity the host knows.
    pub fn resolved_entities(&self, host: &HostState) -> Vec<TrackedEntity> {
        if !self.entities.is_empty() {
            return self.entities.clone();
        }
        host.entity_ids()
            .into_iter()
            .find(|id| id.starts_with("input_datetime"))
            .map(|id| vec![TrackedEntity::new(id)])
            .unwrap_or_default()
    }

    pub fn find_entity(&self, id: &str) -> Option<&TrackedEntity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Applies a typed frequency to entity `index`. Invalid input leaves the
    /// entity untouched and returns the value the field should revert to.
    pub fn set_frequency(&mut self, index: usize, input: &str) -> Result<i64, (InputError, String)> {
        let Some(entity) = self.entities.get_mut(index) else {
            return Err((InputError::InvalidFrequency(input.to_string()), String::new()));
        };
        match parse_frequency(input) {
            Ok(n) => {
                entity.frequency_days = Some(n);
                Ok(n)
            }
            Err(e) => Err((e, frequency_field_value(entity))),
        }
    }

    /// Empty input clears the override.
    pub fn set_friendly_name(&mut self, index: usize, input: &str) {
        if let Some(entity) = self.entities.get_mut(index) {
            let name = input.trim();
            entity.friendly_name = if name.is_empty() {
                None
            } else {
                Some(name.to_string())
            };
        }
    }
}

/// Accepts only a whole number of days in `1..=MAX_FREQUENCY_DAYS`.
pub fn parse_frequency(input: &str) -> Result<i64, InputError> {
    let trimmed = input.trim();
    match trimmed.parse::<i64>() {
        Ok(n) if (1..=MAX_FREQUENCY_DAYS).contains(&n) => Ok(n),
        _ => Err(InputError::InvalidFrequency(trimmed.to_string())),
    }
}

fn lenient_frequency<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(raw
        .as_i64()
        .filter(|n| (1..=MAX_FREQUENCY_DAYS).contains(n)))
}

/// Text shown in the frequency field: the stored value, or empty when unset.
pub fn frequency_field_value(entity: &TrackedEntity) -> String {
    match entity.frequency_days {
        Some(n) if n > 0 => n.to_string(),
        _ => String::new(),
    }
}
