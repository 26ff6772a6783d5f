//! Rig capability surface
//!
//! The rig owns the actual mesh deformation; the core only pushes numbers.

use super::params::{AvatarParameters, BoneScale};

pub trait AvatarRig {
    fn update_height(&mut self, scale: f64);
    fn update_morph_target(&mut self, name: &str, value: f64);
    fn update_bone_scale(&mut self, name: &str, scale: BoneScale);
}

/// Push parameters to a rig: height, then morph targets, then bone scales
pub fn apply_avatar_params(rig: &mut dyn AvatarRig, params: &AvatarParameters) {
    rig.update_height(params.scale.height);

    for (name, value) in &params.morph_targets {
        rig.update_morph_target(name, *value);
    }

    for (name, scale) in &params.bone_scales {
        rig.update_bone_scale(name, *scale);
    }
}

/// Stand-in rig that only logs what it receives
#[derive(Debug, Clone)]
pub struct LoggingRig {
    label: String,
}

impl Default for LoggingRig {
    fn default() -> Self {
        Self::new("AvatarRig")
    }
}

impl LoggingRig {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

impl AvatarRig for LoggingRig {
    fn update_height(&mut self, scale: f64) {
        log::debug!("[{}] height scale -> {}", self.label, scale);
    }

    fn update_morph_target(&mut self, name: &str, value: f64) {
        log::debug!("[{}] morph {} -> {}", self.label, name, value);
    }

    fn update_bone_scale(&mut self, name: &str, scale: BoneScale) {
        log::debug!("[{}] bone {} -> ({}, {}, {})", self.label, name, scale.x, scale.y, scale.z);
    }
}
