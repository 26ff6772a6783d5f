use super::error::SaveError;
use super::SAVE_VERSION;
use crate::fit::{FitHistoryRecorder, FitTier};
use crate::measurements::{BodyPreset, Gender, MeasurementState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted avatar state envelope
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AvatarSave {
    /// Save format version for migration
    pub version: u32,

    /// When the blob was written
    #[serde(default = "Utc::now")]
    pub saved_at: DateTime<Utc>,

    pub state: SavedState,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SavedState {
    #[serde(default)]
    pub gender: Option<Gender>,

    #[serde(default)]
    pub preset: Option<BodyPreset>,

    #[serde(default)]
    pub measurements: MeasurementState,

    #[serde(default, alias = "tier")]
    pub physics_tier: FitTier,

    /// Added in v1
    #[serde(default)]
    pub garment_selections: Vec<String>,

    /// Added in v1
    #[serde(default)]
    pub fit_history: FitHistoryRecorder,
}

impl AvatarSave {
    pub fn new(state: SavedState) -> Self {
        Self { version: SAVE_VERSION, saved_at: Utc::now(), state }
    }

    pub fn update_timestamp(&mut self) {
        self.saved_at = Utc::now();
    }
}

pub fn serialize_save(save: &AvatarSave) -> Result<String, SaveError> {
    serde_json::to_string(save).map_err(SaveError::Serialization)
}

pub fn deserialize_save(json: &str) -> Result<AvatarSave, SaveError> {
    serde_json::from_str(json).map_err(SaveError::Deserialization)
}
