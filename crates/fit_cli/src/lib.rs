//! Avatar Fit CLI Library
//!
//! File-driven wrappers around `avatar_core`: measurement JSON → rig
//! parameters, catalog JSON + selection → one fit batch.

use anyhow::{anyhow, bail, Context, Result};
use avatar_core::{
    preset_measurements, AvatarParamInput, AvatarParamResult, BatchReport, BodyPreset, EngineConfig,
    FitHistoryEntry, FitHistoryRecorder, FitTier, FitTierController, GarmentCatalog, Gender,
    MeasurementKey, MeasurementState, ParameterMapper,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Result of the `fit` command
#[derive(Debug, Serialize)]
pub struct FitRun {
    /// Tier after the batch (after any auto-downgrade)
    pub tier: FitTier,
    pub report: BatchReport,
    pub history: Vec<FitHistoryEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<AvatarParamResult>,
}

pub fn parse_gender(raw: &str) -> Result<Gender> {
    Gender::parse(raw).ok_or_else(|| anyhow!("Unknown gender '{}' (expected female or male)", raw))
}

pub fn parse_preset(raw: &str) -> Result<BodyPreset> {
    BodyPreset::parse(raw)
        .ok_or_else(|| anyhow!("Unknown preset '{}' (expected slim, standard or muscular)", raw))
}

pub fn parse_tier(raw: &str) -> Result<FitTier> {
    FitTier::parse(raw).ok_or_else(|| anyhow!("Unknown fit tier '{}' (expected l0 or l1)", raw))
}

/// Parse a `key=value` measurement override
pub fn parse_assignment(raw: &str) -> Result<(MeasurementKey, f64)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("Expected key=value, got '{}'", raw);
    };
    let key = MeasurementKey::parse(key.trim())
        .ok_or_else(|| anyhow!("Unknown measurement '{}'", key.trim()))?;
    let value: f64 = value
        .trim()
        .parse()
        .with_context(|| format!("Invalid number for {}: '{}'", key, value.trim()))?;
    Ok((key, value))
}

/// Load a `{key: value}` measurement file on top of the preset body.
/// Unknown keys are rejected; values are clamped like any other input.
pub fn load_measurements(path: &Path, base: MeasurementState) -> Result<MeasurementState> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read measurements file: {}", path.display()))?;
    let raw: BTreeMap<String, f64> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse measurements file: {}", path.display()))?;

    let mut state = base;
    for (name, value) in raw {
        let key = MeasurementKey::parse(&name)
            .ok_or_else(|| anyhow!("Unknown measurement '{}'", name))?;
        let stored = state.set(key, value);
        if stored != value {
            log::warn!("[measurements] {} = {} stored as {}", key, value, stored);
        }
    }
    Ok(state)
}

/// Compute rig parameters for a body
pub fn run_params(
    config: &EngineConfig,
    gender: Gender,
    preset: BodyPreset,
    measurements_file: Option<&Path>,
    overrides: &[(MeasurementKey, f64)],
) -> Result<AvatarParamResult> {
    let mut measurements = preset_measurements(gender, preset);
    if let Some(path) = measurements_file {
        measurements = load_measurements(path, measurements)?;
    }
    for &(key, value) in overrides {
        measurements.set(key, value);
    }

    let mapper = ParameterMapper::new(config.preset_deviation_ratio);
    Ok(mapper.compute(AvatarParamInput { gender, preset, measurements: &measurements }))
}

/// Run one fit batch over the selected garments of a catalog file
pub fn run_fit(
    config: &EngineConfig,
    catalog_path: &Path,
    tier: FitTier,
    garment_ids: &[String],
    body: Option<(Gender, BodyPreset)>,
) -> Result<FitRun> {
    let content = fs::read_to_string(catalog_path)
        .with_context(|| format!("Failed to read catalog: {}", catalog_path.display()))?;
    let catalog = GarmentCatalog::from_json(&content)
        .with_context(|| format!("Invalid catalog: {}", catalog_path.display()))?;

    let garments = catalog.resolve(garment_ids);
    if garments.len() != garment_ids.len() {
        log::warn!(
            "[fit] {} of {} selected garments not in catalog",
            garment_ids.len() - garments.len(),
            garment_ids.len()
        );
    }

    let controller = FitTierController::new(config.cost);
    let mut history = FitHistoryRecorder::with_capacity(config.history_capacity as usize);
    let mut tier = tier;
    let report = controller.run_batch(&mut tier, &garments, &mut history, None);

    let params = match body {
        Some((gender, preset)) => Some(run_params(config, gender, preset, None, &[])?),
        None => None,
    };

    Ok(FitRun { tier, report, history: history.to_vec(), params })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        file.write_all(content.as_bytes())?;
        Ok(file)
    }

    #[test]
    fn test_parse_assignment() -> Result<()> {
        assert_eq!(parse_assignment("chest=101.5")?, (MeasurementKey::Chest, 101.5));
        assert_eq!(parse_assignment(" Height = 180 ")?, (MeasurementKey::Height, 180.0));
        assert!(parse_assignment("chest").is_err());
        assert!(parse_assignment("elbow=3").is_err());
        assert!(parse_assignment("chest=wide").is_err());
        Ok(())
    }

    #[test]
    fn test_params_from_file_and_overrides() -> Result<()> {
        let file = write_temp(r#"{"waist": 200, "arm": 62}"#)?;
        let config = EngineConfig::default();

        let result = run_params(
            &config,
            Gender::Male,
            BodyPreset::Standard,
            Some(file.path()),
            &[(MeasurementKey::Arm, 64.0)],
        )?;

        // waist clamped to 120, far from the preset
        assert!(result.warnings.iter().any(|w| w.key == MeasurementKey::Waist));
        // arm 64 sits above the 60cm midpoint
        assert!(result.params.morph_targets["Arm_Length"] > 0.0);
        Ok(())
    }

    #[test]
    fn test_unknown_measurement_in_file() -> Result<()> {
        let file = write_temp(r#"{"elbow": 20}"#)?;
        assert!(load_measurements(file.path(), MeasurementState::defaults()).is_err());
        Ok(())
    }

    #[test]
    fn test_fit_batch_from_catalog() -> Result<()> {
        let catalog = write_temp(
            r#"[
                {"id": "tee", "category": "top", "assetUrl": "/tee.glb", "anchors": ["neck"]},
                {"id": "coat", "category": "full", "asset": "/coat.glb",
                 "anchors": ["a", "b", "c", "d", "e", "f"]}
            ]"#,
        )?;
        let config = EngineConfig::default();

        let selection = ["tee".to_string(), "coat".to_string()];
        let run = run_fit(&config, catalog.path(), FitTier::L1, &selection, None)?;

        assert_eq!(run.tier, FitTier::L0);
        assert!(run.report.downgraded());
        assert_eq!(run.history.len(), 4);
        assert!(run.params.is_none());

        let json = serde_json::to_value(&run)?;
        assert_eq!(json["tier"], "L0");
        Ok(())
    }

    #[test]
    fn test_missing_catalog_file() {
        let err = run_fit(
            &EngineConfig::default(),
            Path::new("/nonexistent/catalog.json"),
            FitTier::L0,
            &[],
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Failed to read catalog"));
    }
}
