//! Avatar deformation parameters
//!
//! Maps a measurement set to height scale, morph target weights and bone
//! scales, and pushes the result onto an external rig.

pub mod params;
pub mod rig;

pub use params::{
    AvatarParamInput, AvatarParamResult, AvatarParameters, BoneScale, MeasurementWarning,
    ParameterMapper, ScaleParameters, WarningKind, DEFAULT_PRESET_DEVIATION_RATIO,
};
pub use rig::{apply_avatar_params, AvatarRig, LoggingRig};
