//! Measurement catalog
//!
//! Fixed measurement definitions (unit, valid range, slider step), the body
//! presets per gender, and the clamped measurement map the rest of the core
//! reads from.

pub mod catalog;
pub mod state;

pub use catalog::{
    definition, definitions, preset, preset_measurements, BodyPreset, Gender, MeasurementDefinition,
    MeasurementKey, MeasurementUnit, PresetDefinition, PRESET_ORDER,
};
pub use state::MeasurementState;

/// Clamp a raw value into the valid range of its definition
pub fn clamp(key: MeasurementKey, value: f64) -> f64 {
    let def = definition(key);
    value.max(def.min).min(def.max)
}

/// Round to two decimals (stored measurement precision)
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to three decimals (rig parameter precision)
pub fn round3(value: f64) -> f64 {
    // `+ 0.0` folds -0.0 into 0.0
    (value * 1000.0).round() / 1000.0 + 0.0
}
