//! Measurement -> rig parameter mapping
//!
//! Pure and deterministic. Every input is clamped before use, so there is no
//! error path; out-of-range or unusual inputs only produce advisory warnings.

use crate::measurements::{
    self, definition, definitions, preset, round3, BodyPreset, Gender, MeasurementKey,
    MeasurementState,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A measurement further than this share of its range from the preset value
/// is flagged.
pub const DEFAULT_PRESET_DEVIATION_RATIO: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoneScale {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl BoneScale {
    pub fn uniform(scale: f64) -> Self {
        Self { x: scale, y: scale, z: scale }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleParameters {
    pub height: f64,
}

/// Derived rig input. Recomputed on every measurement change, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarParameters {
    pub scale: ScaleParameters,
    pub morph_targets: BTreeMap<String, f64>,
    pub bone_scales: BTreeMap<String, BoneScale>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WarningKind {
    OutOfRange { min: f64, max: f64 },
    PresetDeviation { delta: f64, tolerance: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementWarning {
    pub key: MeasurementKey,
    pub kind: WarningKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy)]
pub struct AvatarParamInput<'a> {
    pub gender: Gender,
    pub preset: BodyPreset,
    pub measurements: &'a MeasurementState,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvatarParamResult {
    pub params: AvatarParameters,
    pub warnings: Vec<MeasurementWarning>,
}

struct MorphLink {
    key: MeasurementKey,
    target: &'static str,
    gain: f64,
}

struct BoneLink {
    key: MeasurementKey,
    bones: &'static [&'static str],
    gain: f64,
}

const MORPH_LINKS: [MorphLink; 6] = [
    MorphLink { key: MeasurementKey::Chest, target: "Torso_ChestVolume", gain: 1.2 },
    MorphLink { key: MeasurementKey::Waist, target: "Torso_WaistTaper", gain: -1.0 },
    MorphLink { key: MeasurementKey::Hip, target: "Pelvis_HipVolume", gain: 1.0 },
    MorphLink { key: MeasurementKey::Thigh, target: "Leg_ThighVolume", gain: 0.9 },
    MorphLink { key: MeasurementKey::Arm, target: "Arm_Length", gain: 0.6 },
    MorphLink { key: MeasurementKey::Neck, target: "Torso_NeckVolume", gain: 0.8 },
];

const BONE_LINKS: [BoneLink; 5] = [
    BoneLink { key: MeasurementKey::Shoulder, bones: &["Shoulder_L", "Shoulder_R"], gain: 0.18 },
    BoneLink { key: MeasurementKey::Waist, bones: &["Spine_03"], gain: 0.12 },
    BoneLink { key: MeasurementKey::Hip, bones: &["Pelvis"], gain: 0.15 },
    BoneLink { key: MeasurementKey::Inseam, bones: &["Leg_L", "Leg_R"], gain: 0.4 },
    BoneLink { key: MeasurementKey::Height, bones: &["Spine_All"], gain: 0.3 },
];

/// Measurement to avatar parameter mapper
#[derive(Debug, Clone, Copy)]
pub struct ParameterMapper {
    deviation_ratio: f64,
}

impl Default for ParameterMapper {
    fn default() -> Self {
        Self::new(DEFAULT_PRESET_DEVIATION_RATIO)
    }
}

impl ParameterMapper {
    pub fn new(deviation_ratio: f64) -> Self {
        Self { deviation_ratio }
    }

    /// Normalized offset from the range midpoint, in [-1, 1] for clamped input
    pub fn offset(key: MeasurementKey, value: f64) -> f64 {
        let def = definition(key);
        let half_range = def.half_range();
        if half_range == 0.0 {
            return 0.0;
        }
        (measurements::clamp(key, value) - def.midpoint()) / half_range
    }

    pub fn compute(&self, input: AvatarParamInput<'_>) -> AvatarParamResult {
        let params = AvatarParameters {
            scale: ScaleParameters { height: Self::height_scale(input.measurements) },
            morph_targets: Self::morph_targets(input.measurements),
            bone_scales: Self::bone_scales(input.measurements),
        };
        let warnings = self.collect_warnings(input.measurements, input.gender, input.preset);

        AvatarParamResult { params, warnings }
    }

    pub fn morph_targets(measurements: &MeasurementState) -> BTreeMap<String, f64> {
        MORPH_LINKS
            .iter()
            .map(|link| {
                let offset = Self::offset(link.key, measurements.get(link.key));
                (link.target.to_string(), round3(link.gain * offset))
            })
            .collect()
    }

    pub fn bone_scales(measurements: &MeasurementState) -> BTreeMap<String, BoneScale> {
        let mut bones = BTreeMap::new();
        for link in &BONE_LINKS {
            let offset = Self::offset(link.key, measurements.get(link.key));
            let scale = BoneScale::uniform(round3(1.0 + link.gain * offset));
            for bone in link.bones {
                bones.insert(bone.to_string(), scale);
            }
        }
        bones
    }

    pub fn height_scale(measurements: &MeasurementState) -> f64 {
        let baseline = definition(MeasurementKey::Height).midpoint();
        let raw = measurements.get(MeasurementKey::Height);
        let height = measurements::clamp(MeasurementKey::Height, raw);
        round3(height / baseline)
    }

    /// Advisory only; a key may produce both warnings.
    pub fn collect_warnings(
        &self,
        measurements: &MeasurementState,
        gender: Gender,
        body: BodyPreset,
    ) -> Vec<MeasurementWarning> {
        let table = preset(gender, body);
        let mut warnings = Vec::new();

        for def in definitions() {
            let value = measurements.get(def.key);
            let unit = def.unit.as_str();

            if !def.contains(value) {
                warnings.push(MeasurementWarning {
                    key: def.key,
                    kind: WarningKind::OutOfRange { min: def.min, max: def.max },
                    message: format!(
                        "{} is outside the recommended range ({}-{}{})",
                        def.label, def.min, def.max, unit
                    ),
                });
            }

            let delta = (value - table.value(def.key)).abs();
            let tolerance = def.range() * self.deviation_ratio;
            if delta > tolerance {
                warnings.push(MeasurementWarning {
                    key: def.key,
                    kind: WarningKind::PresetDeviation { delta, tolerance },
                    message: format!(
                        "{} differs strongly from the preset (difference {:.1}{})",
                        def.label, delta, unit
                    ),
                });
            }
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurements::preset_measurements;
    use proptest::prelude::*;

    fn midpoints() -> MeasurementState {
        MeasurementState::defaults()
    }

    #[test]
    fn test_offset_range() {
        assert_eq!(ParameterMapper::offset(MeasurementKey::Chest, 70.0), -1.0);
        assert_eq!(ParameterMapper::offset(MeasurementKey::Chest, 100.0), 0.0);
        assert_eq!(ParameterMapper::offset(MeasurementKey::Chest, 130.0), 1.0);
        // clamped before offsetting
        assert_eq!(ParameterMapper::offset(MeasurementKey::Chest, 500.0), 1.0);
    }

    #[test]
    fn test_midpoint_morphs_are_zero() {
        let morphs = ParameterMapper::morph_targets(&midpoints());
        assert_eq!(morphs.len(), 6);
        for (name, value) in &morphs {
            assert_eq!(*value, 0.0, "{} should be neutral at midpoint", name);
        }
    }

    #[test]
    fn test_midpoint_height_scale_is_one() {
        assert_eq!(ParameterMapper::height_scale(&midpoints()), 1.0);
    }

    #[test]
    fn test_midpoint_bones_are_identity() {
        let bones = ParameterMapper::bone_scales(&midpoints());
        assert_eq!(bones.len(), 7);
        for scale in bones.values() {
            assert_eq!(*scale, BoneScale::uniform(1.0));
        }
    }

    #[test]
    fn test_morph_gain_and_sign() {
        let mut m = midpoints();
        m.set(MeasurementKey::Chest, 130.0);
        m.set(MeasurementKey::Waist, 120.0);
        m.set(MeasurementKey::Arm, 52.5); // offset -0.5

        let morphs = ParameterMapper::morph_targets(&m);
        assert_eq!(morphs["Torso_ChestVolume"], 1.2);
        assert_eq!(morphs["Torso_WaistTaper"], -1.0);
        assert_eq!(morphs["Arm_Length"], -0.3);
    }

    #[test]
    fn test_bone_links_share_scale() {
        let mut m = midpoints();
        m.set(MeasurementKey::Shoulder, 60.0);
        m.set(MeasurementKey::Inseam, 55.0);

        let bones = ParameterMapper::bone_scales(&m);
        assert_eq!(bones["Shoulder_L"], BoneScale::uniform(1.18));
        assert_eq!(bones["Shoulder_R"], bones["Shoulder_L"]);
        assert_eq!(bones["Leg_L"], BoneScale::uniform(0.6));
        assert_eq!(bones["Leg_R"], BoneScale::uniform(0.6));
    }

    #[test]
    fn test_height_scale_rounds_to_three_places() {
        let mut m = midpoints();
        m.set(MeasurementKey::Height, 180.0);
        assert_eq!(ParameterMapper::height_scale(&m), 1.059);
    }

    #[test]
    fn test_preset_body_has_no_warnings() {
        let mapper = ParameterMapper::default();
        let m = preset_measurements(Gender::Male, BodyPreset::Standard);
        let result = mapper.compute(AvatarParamInput {
            gender: Gender::Male,
            preset: BodyPreset::Standard,
            measurements: &m,
        });
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_preset_deviation_warning() {
        let mapper = ParameterMapper::default();
        let mut m = preset_measurements(Gender::Female, BodyPreset::Slim);
        // range 80, tolerance 32, preset 165
        m.set(MeasurementKey::Height, 200.0);

        let warnings = mapper.collect_warnings(&m, Gender::Female, BodyPreset::Slim);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].key, MeasurementKey::Height);
        match warnings[0].kind {
            WarningKind::PresetDeviation { delta, tolerance } => {
                assert_eq!(delta, 35.0);
                assert_eq!(tolerance, 32.0);
            }
            other => panic!("unexpected warning kind {:?}", other),
        }
    }

    #[test]
    fn test_unclamped_input_warns_out_of_range_and_deviation() {
        // deserialized data bypasses `MeasurementState::set`
        let m: MeasurementState = serde_json::from_str(r#"{"height": 300.0}"#).unwrap();
        let result = ParameterMapper::default().compute(AvatarParamInput {
            gender: Gender::Male,
            preset: BodyPreset::Standard,
            measurements: &m,
        });

        let height: Vec<_> = result
            .warnings
            .iter()
            .filter(|w| w.key == MeasurementKey::Height)
            .map(|w| w.kind)
            .collect();
        assert_eq!(
            height,
            vec![
                WarningKind::OutOfRange { min: 130.0, max: 210.0 },
                WarningKind::PresetDeviation { delta: 123.0, tolerance: 32.0 },
            ]
        );

        // parameters still use the clamped value
        assert_eq!(result.params.scale.height, 1.235);
        assert_eq!(result.params.bone_scales["Spine_All"], BoneScale::uniform(1.3));
    }

    #[test]
    fn test_warnings_do_not_block_parameters() {
        let mapper = ParameterMapper::default();
        let mut m = preset_measurements(Gender::Male, BodyPreset::Slim);
        m.set(MeasurementKey::Weight, 150.0);
        m.set(MeasurementKey::Waist, 120.0);

        let result = mapper.compute(AvatarParamInput {
            gender: Gender::Male,
            preset: BodyPreset::Slim,
            measurements: &m,
        });
        assert_eq!(result.warnings.len(), 2);
        assert_eq!(result.params.morph_targets["Torso_WaistTaper"], -1.0);
    }

    #[test]
    fn test_tighter_ratio_flags_more() {
        let strict = ParameterMapper::new(0.05);
        let m = preset_measurements(Gender::Male, BodyPreset::Muscular);
        let warnings = strict.collect_warnings(&m, Gender::Male, BodyPreset::Slim);
        assert!(!warnings.is_empty());
        assert!(warnings.iter().all(|w| matches!(w.kind, WarningKind::PresetDeviation { .. })));
    }

    proptest! {
        #[test]
        fn offset_is_bounded(idx in 0usize..10, value in -500.0f64..500.0) {
            let offset = ParameterMapper::offset(MeasurementKey::ALL[idx], value);
            prop_assert!((-1.0..=1.0).contains(&offset));
        }

        #[test]
        fn bone_scales_stay_positive(height in 100.0f64..250.0, inseam in 0.0f64..200.0) {
            let mut m = MeasurementState::defaults();
            m.set(MeasurementKey::Height, height);
            m.set(MeasurementKey::Inseam, inseam);
            for scale in ParameterMapper::bone_scales(&m).values() {
                prop_assert!(scale.x > 0.0 && scale.x == scale.y && scale.y == scale.z);
            }
        }
    }
}
