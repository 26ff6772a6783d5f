use super::catalog::{definition, MeasurementKey};
use super::{clamp, round2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Measurement key -> value, every value clamped into its definition range
/// and rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeasurementState {
    values: BTreeMap<MeasurementKey, f64>,
}

impl Default for MeasurementState {
    fn default() -> Self {
        Self::defaults()
    }
}

impl MeasurementState {
    /// Range midpoint for every key (no preset chosen)
    pub fn defaults() -> Self {
        Self::from_fn(|key| definition(key).midpoint())
    }

    /// Build a full state; every value passes through `set`
    pub fn from_fn(mut f: impl FnMut(MeasurementKey) -> f64) -> Self {
        let mut state = Self { values: BTreeMap::new() };
        for key in MeasurementKey::ALL {
            state.set(key, f(key));
        }
        state
    }

    pub fn get(&self, key: MeasurementKey) -> f64 {
        self.values.get(&key).copied().unwrap_or_else(|| definition(key).midpoint())
    }

    /// Store `value` clamped to the key's range, rounded to two decimals.
    /// Returns the stored value.
    pub fn set(&mut self, key: MeasurementKey, value: f64) -> f64 {
        let stored = if value.is_nan() {
            definition(key).midpoint()
        } else {
            round2(clamp(key, value))
        };
        self.values.insert(key, stored);
        stored
    }

    /// Re-apply the storage invariant to data that did not come through `set`
    /// (rehydrated blobs). Missing keys get the range midpoint.
    pub fn normalized(&self) -> Self {
        Self::from_fn(|key| self.get(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (MeasurementKey, f64)> + '_ {
        MeasurementKey::ALL.into_iter().map(move |key| (key, self.get(key)))
    }

    pub fn is_complete(&self) -> bool {
        MeasurementKey::ALL.iter().all(|key| self.values.contains_key(key))
    }
}
