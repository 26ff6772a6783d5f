//! Static measurement definitions and body presets

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The ten body measurements the mannequin understands
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementKey {
    Height,
    Weight,
    Shoulder,
    Chest,
    Waist,
    Hip,
    Thigh,
    Arm,
    Inseam,
    Neck,
}

impl MeasurementKey {
    /// Catalog order
    pub const ALL: [MeasurementKey; 10] = [
        MeasurementKey::Height,
        MeasurementKey::Weight,
        MeasurementKey::Shoulder,
        MeasurementKey::Chest,
        MeasurementKey::Waist,
        MeasurementKey::Hip,
        MeasurementKey::Thigh,
        MeasurementKey::Arm,
        MeasurementKey::Inseam,
        MeasurementKey::Neck,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementKey::Height => "height",
            MeasurementKey::Weight => "weight",
            MeasurementKey::Shoulder => "shoulder",
            MeasurementKey::Chest => "chest",
            MeasurementKey::Waist => "waist",
            MeasurementKey::Hip => "hip",
            MeasurementKey::Thigh => "thigh",
            MeasurementKey::Arm => "arm",
            MeasurementKey::Inseam => "inseam",
            MeasurementKey::Neck => "neck",
        }
    }

    /// Parse a key from its lowercase name
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name.trim().to_ascii_lowercase())
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for MeasurementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementUnit {
    Cm,
    Kg,
}

impl MeasurementUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementUnit::Cm => "cm",
            MeasurementUnit::Kg => "kg",
        }
    }
}

/// One measurement slider: valid range and step
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeasurementDefinition {
    pub key: MeasurementKey,
    pub label: &'static str,
    pub unit: MeasurementUnit,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl MeasurementDefinition {
    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn half_range(&self) -> f64 {
        (self.max - self.min) / 2.0
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

const fn def(
    key: MeasurementKey,
    label: &'static str,
    unit: MeasurementUnit,
    min: f64,
    max: f64,
    step: f64,
) -> MeasurementDefinition {
    MeasurementDefinition { key, label, unit, min, max, step }
}

// Indexed by `MeasurementKey as usize`; order must match `MeasurementKey::ALL`.
static DEFINITIONS: [MeasurementDefinition; 10] = [
    def(MeasurementKey::Height, "Height", MeasurementUnit::Cm, 130.0, 210.0, 1.0),
    def(MeasurementKey::Weight, "Weight", MeasurementUnit::Kg, 35.0, 150.0, 0.5),
    def(MeasurementKey::Shoulder, "Shoulder width", MeasurementUnit::Cm, 30.0, 60.0, 0.5),
    def(MeasurementKey::Chest, "Chest", MeasurementUnit::Cm, 70.0, 130.0, 0.5),
    def(MeasurementKey::Waist, "Waist", MeasurementUnit::Cm, 55.0, 120.0, 0.5),
    def(MeasurementKey::Hip, "Hip", MeasurementUnit::Cm, 75.0, 130.0, 0.5),
    def(MeasurementKey::Thigh, "Thigh", MeasurementUnit::Cm, 35.0, 75.0, 0.5),
    def(MeasurementKey::Arm, "Arm length", MeasurementUnit::Cm, 45.0, 75.0, 0.5),
    def(MeasurementKey::Inseam, "Inseam", MeasurementUnit::Cm, 55.0, 95.0, 0.5),
    def(MeasurementKey::Neck, "Neck", MeasurementUnit::Cm, 28.0, 45.0, 0.5),
];

/// All definitions in catalog order
pub fn definitions() -> &'static [MeasurementDefinition] {
    &DEFINITIONS
}

pub fn definition(key: MeasurementKey) -> &'static MeasurementDefinition {
    &DEFINITIONS[key.index()]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Female => "Female",
            Gender::Male => "Male",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "female" => Some(Gender::Female),
            "male" => Some(Gender::Male),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum BodyPreset {
    Slim,
    Standard,
    Muscular,
}

impl BodyPreset {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "slim" => Some(BodyPreset::Slim),
            "standard" => Some(BodyPreset::Standard),
            "muscular" => Some(BodyPreset::Muscular),
            _ => None,
        }
    }
}

/// Display order of the preset picker
pub const PRESET_ORDER: [BodyPreset; 3] =
    [BodyPreset::Slim, BodyPreset::Standard, BodyPreset::Muscular];

/// Canonical body for a (gender, preset) pair, values in `MeasurementKey::ALL` order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetDefinition {
    pub label: &'static str,
    pub description: &'static str,
    pub values: [f64; 10],
}

impl PresetDefinition {
    pub fn value(&self, key: MeasurementKey) -> f64 {
        self.values[key.index()]
    }
}

//                 height weight shoulder chest waist  hip  thigh  arm inseam neck
const FEMALE_SLIM: [f64; 10] = [165.0, 52.0, 38.0, 82.0, 64.0, 88.0, 50.0, 58.0, 74.0, 32.0];
const FEMALE_STANDARD: [f64; 10] = [167.0, 58.0, 39.0, 86.0, 68.0, 92.0, 53.0, 59.0, 75.0, 33.0];
const FEMALE_MUSCULAR: [f64; 10] = [168.0, 63.0, 41.0, 90.0, 70.0, 96.0, 56.0, 60.0, 76.0, 34.0];
const MALE_SLIM: [f64; 10] = [175.0, 65.0, 43.0, 90.0, 76.0, 94.0, 56.0, 63.0, 80.0, 36.0];
const MALE_STANDARD: [f64; 10] = [177.0, 72.0, 45.0, 96.0, 82.0, 98.0, 58.0, 64.0, 82.0, 37.0];
const MALE_MUSCULAR: [f64; 10] = [178.0, 80.0, 47.0, 104.0, 86.0, 102.0, 61.0, 65.0, 83.0, 39.0];

pub fn preset(gender: Gender, preset: BodyPreset) -> PresetDefinition {
    let (label, description) = match preset {
        BodyPreset::Slim => ("Slim", "Balanced slim build"),
        BodyPreset::Standard => ("Standard", "Typical body proportions"),
        BodyPreset::Muscular => ("Muscular", "Athletic, trained build"),
    };
    let values = match (gender, preset) {
        (Gender::Female, BodyPreset::Slim) => FEMALE_SLIM,
        (Gender::Female, BodyPreset::Standard) => FEMALE_STANDARD,
        (Gender::Female, BodyPreset::Muscular) => FEMALE_MUSCULAR,
        (Gender::Male, BodyPreset::Slim) => MALE_SLIM,
        (Gender::Male, BodyPreset::Standard) => MALE_STANDARD,
        (Gender::Male, BodyPreset::Muscular) => MALE_MUSCULAR,
    };
    PresetDefinition { label, description, values }
}

/// Reset baseline for a (gender, preset) pair
pub fn preset_measurements(gender: Gender, body: BodyPreset) -> super::MeasurementState {
    let table = preset(gender, body);
    super::MeasurementState::from_fn(|key| table.value(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definitions_indexed_by_key() {
        for key in MeasurementKey::ALL {
            assert_eq!(definition(key).key, key);
        }
        assert_eq!(definitions().len(), 10);
    }

    #[test]
    fn test_presets_within_ranges() {
        for gender in [Gender::Female, Gender::Male] {
            for body in PRESET_ORDER {
                let table = preset(gender, body);
                for key in MeasurementKey::ALL {
                    assert!(
                        definition(key).contains(table.value(key)),
                        "{:?}/{:?} {} out of range",
                        gender,
                        body,
                        key
                    );
                }
            }
        }
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(MeasurementKey::parse("Inseam"), Some(MeasurementKey::Inseam));
        assert_eq!(MeasurementKey::parse("elbow"), None);
        assert_eq!(Gender::parse(" Male"), Some(Gender::Male));
        assert_eq!(BodyPreset::parse("MUSCULAR"), Some(BodyPreset::Muscular));
        assert_eq!(BodyPreset::parse("athletic"), None);
    }

    #[test]
    fn test_height_midpoint() {
        assert_eq!(definition(MeasurementKey::Height).midpoint(), 170.0);
    }
}
