use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Tempo as described by the user or the language model: a single value,
/// an explicit range, or something unrecognisable that falls back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TempoHint {
    Exact(f64),
    Range { min: f64, max: f64 },
    Other(serde_json::Value),
}

/// Loosely-typed playlist criteria, as produced by prompt parsing or sent by the browser
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Criteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm: Option<TempoHint>,
    #[serde(
        default,
        deserialize_with = "lenient_genres",
        skip_serializing_if = "Option::is_none"
    )]
    pub genres: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "lenient_label",
        skip_serializing_if = "Option::is_none"
    )]
    pub energy: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_label",
        skip_serializing_if = "Option::is_none"
    )]
    pub mood: Option<String>,
}

/// Accepts a list of strings or a single string; anything else is dropped.
fn lenient_genres<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(genre)) => Some(vec![genre]),
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(genre) => Some(genre),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    })
}

/// Non-string labels (numbers, objects) are treated as absent.
fn lenient_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(label)) => Some(label),
        _ => None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnergyLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl EnergyLevel {
    /// Unrecognised labels map to `Medium`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "low" => EnergyLevel::Low,
            "high" => EnergyLevel::High,
            _ => EnergyLevel::Medium,
        }
    }

    pub fn target(self) -> f64 {
        match self {
            EnergyLevel::Low => 0.3,
            EnergyLevel::Medium => 0.5,
            EnergyLevel::High => 0.8,
        }
    }
}

/// Canonical query consumed by the track aggregator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDescriptor {
    pub bpm_min: i32,
    pub bpm_max: i32,
    #[serde(default)]
    pub genres: Vec<String>,
    pub target_energy: f64,
    /// Display only, never used for filtering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
}

impl QueryDescriptor {
    pub fn from_range(bpm_min: i32, bpm_max: i32) -> Self {
        Self {
            bpm_min,
            bpm_max,
            genres: Vec::new(),
            target_energy: EnergyLevel::default().target(),
            mood: None,
        }
    }

    pub fn target_tempo(&self) -> f64 {
        (self.bpm_min as f64 + self.bpm_max as f64) / 2.0
    }
}
