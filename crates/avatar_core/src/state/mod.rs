//! Avatar Engine State
//!
//! One explicit owner for the session state: onboarding choices,
//! measurements, fit tier, garment selection and the fit history. Every
//! mutation goes through `AvatarEngine::dispatch`, which recomputes derived
//! parameters, runs a fit batch when the fit inputs changed, and persists
//! the result. Readers get a consistent snapshot through `&self` accessors.

use crate::avatar::{
    apply_avatar_params, AvatarParamInput, AvatarParamResult, AvatarParameters, AvatarRig,
    MeasurementWarning, ParameterMapper,
};
use crate::config::EngineConfig;
use crate::fit::{BatchReport, FitHistoryEntry, FitHistoryRecorder, FitTier, FitTierController};
use crate::garments::GarmentCatalog;
use crate::measurements::{
    preset_measurements, BodyPreset, Gender, MeasurementKey, MeasurementState,
};
use crate::save::format::SavedState;
use crate::save::{
    deserialize_save, migrate_save, serialize_save, AvatarSave, InMemoryStorage, PersistenceAdapter,
    SaveError,
};
use crate::telemetry::TelemetryForwarder;

/// Session state
#[derive(Debug, Clone, PartialEq)]
pub struct AvatarEngineState {
    pub gender: Option<Gender>,
    pub preset: Option<BodyPreset>,
    pub measurements: MeasurementState,
    pub tier: FitTier,
    pub garment_selections: Vec<String>,
    pub fit_history: FitHistoryRecorder,
}

impl Default for AvatarEngineState {
    fn default() -> Self {
        Self::new()
    }
}

impl AvatarEngineState {
    pub fn new() -> Self {
        Self::with_history_capacity(crate::fit::FIT_HISTORY_CAPACITY)
    }

    pub fn with_history_capacity(capacity: usize) -> Self {
        Self {
            gender: None,
            preset: None,
            measurements: MeasurementState::defaults(),
            tier: FitTier::L0,
            garment_selections: Vec::new(),
            fit_history: FitHistoryRecorder::with_capacity(capacity),
        }
    }

    /// Convert runtime state to save format
    pub fn to_save(&self) -> AvatarSave {
        AvatarSave::new(SavedState {
            gender: self.gender,
            preset: self.preset,
            measurements: self.measurements.clone(),
            physics_tier: self.tier,
            garment_selections: self.garment_selections.clone(),
            fit_history: self.fit_history.clone(),
        })
    }

    /// Restore runtime state from save data
    pub fn from_save(save: &AvatarSave) -> Self {
        let state = &save.state;
        Self {
            gender: state.gender,
            preset: state.preset,
            measurements: state.measurements.clone(),
            tier: state.physics_tier,
            garment_selections: state.garment_selections.clone(),
            fit_history: state.fit_history.clone(),
        }
    }

    /// Gender and preset both chosen
    pub fn body(&self) -> Option<(Gender, BodyPreset)> {
        self.gender.zip(self.preset)
    }

    fn fit_inputs(&self) -> FitInputs {
        FitInputs {
            selections: self.garment_selections.clone(),
            tier: self.tier,
            measurements: self.measurements.clone(),
        }
    }
}

/// Anything that changes here triggers a fit batch
#[derive(Debug, Clone, PartialEq)]
struct FitInputs {
    selections: Vec<String>,
    tier: FitTier,
    measurements: MeasurementState,
}

/// Every mutation the engine accepts
#[derive(Debug, Clone, PartialEq)]
pub enum AvatarEvent {
    SetGender(Gender),
    SetPreset(BodyPreset),
    SetMeasurement { key: MeasurementKey, value: f64 },
    ResetMeasurementsToPreset,
    ToggleTier,
    SetTier(FitTier),
    SetGarmentSelections(Vec<String>),
    AppendFitHistory(FitHistoryEntry),
    ClearFitHistory,
    ResetAll,
}

pub struct AvatarEngine<S: PersistenceAdapter = InMemoryStorage> {
    state: AvatarEngineState,
    config: EngineConfig,
    catalog: GarmentCatalog,
    storage: S,
    mapper: ParameterMapper,
    controller: FitTierController,
    telemetry: Option<TelemetryForwarder>,
    derived: Option<AvatarParamResult>,
    last_batch: Option<BatchReport>,
}

impl<S: PersistenceAdapter> AvatarEngine<S> {
    /// Create an engine, rehydrating from `storage` when a valid blob exists
    pub fn new(config: EngineConfig, catalog: GarmentCatalog, storage: S) -> Self {
        let state = match load_state(&storage, &config) {
            Ok(state) => state,
            Err(err) => {
                if !err.is_missing() {
                    log::warn!("Avatar state rehydration failed, starting fresh: {}", err);
                }
                AvatarEngineState::with_history_capacity(config.history_capacity as usize)
            }
        };

        let mut engine = Self {
            mapper: ParameterMapper::new(config.preset_deviation_ratio),
            controller: FitTierController::new(config.cost),
            state,
            config,
            catalog,
            storage,
            telemetry: None,
            derived: None,
            last_batch: None,
        };
        engine.refresh_parameters();
        engine
    }

    pub fn with_telemetry(mut self, forwarder: TelemetryForwarder) -> Self {
        self.telemetry = Some(forwarder);
        self
    }

    /// Apply one event, then recompute and persist.
    ///
    /// Returns the batch report when the fit inputs (selection, tier,
    /// measurements) changed and a batch ran.
    pub fn dispatch(&mut self, event: AvatarEvent) -> Option<BatchReport> {
        let before = self.state.fit_inputs();
        self.apply(event);
        self.refresh_parameters();

        let report = if self.state.fit_inputs() != before { Some(self.run_batch()) } else { None };

        self.persist();
        report
    }

    /// Recompute parameters and run a fit batch unconditionally
    pub fn recompute(&mut self) -> BatchReport {
        self.refresh_parameters();
        let report = self.run_batch();
        self.persist();
        report
    }

    fn apply(&mut self, event: AvatarEvent) {
        let state = &mut self.state;
        match event {
            AvatarEvent::SetGender(gender) => {
                state.gender = Some(gender);
                if let Some(preset) = state.preset {
                    state.measurements = preset_measurements(gender, preset);
                }
            }
            AvatarEvent::SetPreset(preset) => {
                state.preset = Some(preset);
                if let Some(gender) = state.gender {
                    state.measurements = preset_measurements(gender, preset);
                }
            }
            AvatarEvent::SetMeasurement { key, value } => {
                state.measurements.set(key, value);
            }
            AvatarEvent::ResetMeasurementsToPreset => {
                state.measurements = match state.body() {
                    Some((gender, preset)) => preset_measurements(gender, preset),
                    None => MeasurementState::defaults(),
                };
            }
            AvatarEvent::ToggleTier => {
                state.tier = state.tier.toggled();
                log::info!("Fit tier set to {}", state.tier);
            }
            AvatarEvent::SetTier(tier) => {
                state.tier = tier;
                log::info!("Fit tier set to {}", tier);
            }
            AvatarEvent::SetGarmentSelections(ids) => {
                state.garment_selections = ids;
            }
            AvatarEvent::AppendFitHistory(entry) => {
                state.fit_history.append(entry);
            }
            AvatarEvent::ClearFitHistory => {
                state.fit_history.clear();
            }
            AvatarEvent::ResetAll => {
                let capacity = self.config.history_capacity as usize;
                *state = AvatarEngineState::with_history_capacity(capacity);
            }
        }
    }

    fn refresh_parameters(&mut self) {
        self.derived = self.state.body().map(|(gender, preset)| {
            self.mapper.compute(AvatarParamInput {
                gender,
                preset,
                measurements: &self.state.measurements,
            })
        });
    }

    fn run_batch(&mut self) -> BatchReport {
        let garments = self.catalog.resolve(&self.state.garment_selections);
        let report = self.controller.run_batch(
            &mut self.state.tier,
            &garments,
            &mut self.state.fit_history,
            self.telemetry.as_ref(),
        );
        self.last_batch = Some(report.clone());
        report
    }

    /// Write the current state; failures are logged and ignored
    pub fn persist(&mut self) {
        let save = self.state.to_save();
        let result = serialize_save(&save).and_then(|json| {
            self.storage.set(&self.config.storage_key, &json).map_err(SaveError::from)
        });
        if let Err(err) = result {
            log::warn!("Failed to persist avatar state: {}", err);
        }
    }

    /// Drop the persisted blob (the in-memory state is untouched)
    pub fn clear_persisted(&mut self) {
        if let Err(err) = self.storage.clear(&self.config.storage_key) {
            log::warn!("Failed to clear persisted avatar state: {}", err);
        }
    }

    /// Push current parameters to a rig. False when gender or preset is unset.
    pub fn apply_to_rig(&self, rig: &mut dyn AvatarRig) -> bool {
        match self.parameters() {
            Some(params) => {
                apply_avatar_params(rig, params);
                true
            }
            None => false,
        }
    }

    pub fn state(&self) -> &AvatarEngineState {
        &self.state
    }

    pub fn snapshot(&self) -> AvatarEngineState {
        self.state.clone()
    }

    pub fn tier(&self) -> FitTier {
        self.state.tier
    }

    pub fn history(&self) -> &FitHistoryRecorder {
        &self.state.fit_history
    }

    pub fn parameters(&self) -> Option<&AvatarParameters> {
        self.derived.as_ref().map(|result| &result.params)
    }

    pub fn warnings(&self) -> &[MeasurementWarning] {
        self.derived.as_ref().map_or(&[], |result| result.warnings.as_slice())
    }

    pub fn last_batch(&self) -> Option<&BatchReport> {
        self.last_batch.as_ref()
    }

    pub fn catalog(&self) -> &GarmentCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }
}

fn load_state<S: PersistenceAdapter>(
    storage: &S,
    config: &EngineConfig,
) -> Result<AvatarEngineState, SaveError> {
    let json = storage
        .get(&config.storage_key)?
        .ok_or_else(|| SaveError::NotFound { key: config.storage_key.clone() })?;
    let save = migrate_save(deserialize_save(&json)?, config.history_capacity as usize)?;
    log::debug!("Rehydrated avatar state saved at {}", save.saved_at);
    Ok(AvatarEngineState::from_save(&save))
}
