//! # avatar_core - Avatar Parameter & Fit Tier Engine
//!
//! Core of an avatar try-on tool: a user picks a body preset, adjusts
//! measurements, and selects garments that are fitted onto the avatar at a
//! cheap heuristic tier (L0) or a solver tier (L1).
//!
//! ## Features
//! - Deterministic measurement → morph target / bone scale mapping
//! - Latency-budgeted fit tiers with automatic downgrade
//! - Bounded fit history and fire-and-forget telemetry
//! - Versioned, migratable persistence envelope

// Numeric casts between measurement floats and millisecond counters are intentional
#![allow(clippy::cast_possible_truncation)]

pub mod avatar;
pub mod config;
pub mod error;
pub mod fit;
pub mod garments;
pub mod measurements;
pub mod save;
pub mod state;
pub mod telemetry;

// Re-export parameter mapping
pub use avatar::{
    apply_avatar_params, AvatarParamInput, AvatarParamResult, AvatarParameters, AvatarRig,
    BoneScale, LoggingRig, MeasurementWarning, ParameterMapper, WarningKind,
};

// Re-export measurement catalog
pub use measurements::{
    definitions, preset_measurements, BodyPreset, Gender, MeasurementDefinition, MeasurementKey,
    MeasurementState,
};

// Re-export fit system
pub use fit::{
    BatchReport, FitCostModel, FitHistoryEntry, FitHistoryRecorder, FitOutcome, FitResult, FitTier,
    FitTierController, L1FitResult,
};

pub use config::EngineConfig;
pub use error::{CatalogError, ConfigError};
pub use garments::{GarmentCatalog, GarmentCategory, GarmentItem};
pub use save::{AvatarSave, FileStorage, InMemoryStorage, PersistenceAdapter, SaveError};
pub use state::{AvatarEngine, AvatarEngineState, AvatarEvent};
pub use telemetry::{LogSink, TelemetryForwarder, TelemetryRecord, TelemetrySink};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_engine_smoke() {
        let mut engine = AvatarEngine::new(
            EngineConfig::default(),
            GarmentCatalog::default(),
            InMemoryStorage::new(),
        );
        engine.dispatch(AvatarEvent::SetGender(Gender::Female));
        engine.dispatch(AvatarEvent::SetPreset(BodyPreset::Slim));
        assert!(engine.parameters().is_some());
    }
}
