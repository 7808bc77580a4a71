use crate::models::{Criteria, EnergyLevel, QueryDescriptor, TempoHint};

pub const MIN_TEMPO: i32 = 60;
pub const MAX_TEMPO: i32 = 200;
pub const TEMPO_SPREAD: i32 = 10;
pub const DEFAULT_TEMPO_RANGE: (i32, i32) = (100, 140);

/// Turn loosely-typed criteria into the canonical descriptor.
/// Never fails: unusable input falls back to defaults.
pub fn normalize(criteria: &Criteria) -> QueryDescriptor {
    let (bpm_min, bpm_max) = match &criteria.bpm {
        Some(hint) => tempo_range(hint),
        None => DEFAULT_TEMPO_RANGE,
    };

    let target_energy = criteria
        .energy
        .as_deref()
        .map(EnergyLevel::from_label)
        .unwrap_or_default()
        .target();

    QueryDescriptor {
        bpm_min,
        bpm_max,
        genres: criteria.genres.clone().unwrap_or_default(),
        target_energy,
        mood: criteria.mood.clone(),
    }
}

/// Expand a single tempo to a ±10 BPM window clamped to [60, 200].
pub fn expand_tempo(bpm: i32) -> (i32, i32) {
    (
        (bpm - TEMPO_SPREAD).clamp(MIN_TEMPO, MAX_TEMPO),
        (bpm + TEMPO_SPREAD).clamp(MIN_TEMPO, MAX_TEMPO),
    )
}

fn tempo_range(hint: &TempoHint) -> (i32, i32) {
    match hint {
        TempoHint::Exact(bpm) if bpm.is_finite() => expand_tempo(bpm.round() as i32),
        // Explicit ranges are taken as given
        TempoHint::Range { min, max } if min.is_finite() && max.is_finite() => {
            (min.round() as i32, max.round() as i32)
        }
        TempoHint::Other(serde_json::Value::String(s)) => match s.trim().parse::<f64>() {
            Ok(bpm) if bpm.is_finite() => expand_tempo(bpm.round() as i32),
            _ => DEFAULT_TEMPO_RANGE,
        },
        _ => DEFAULT_TEMPO_RANGE,
    }
}
