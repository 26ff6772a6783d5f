//! Bounded fit audit log

use super::tier::FitTier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const FIT_HISTORY_CAPACITY: usize = 50;

/// Pseudo garment id for controller-level entries (forced downgrade)
pub const SYSTEM_GARMENT_ID: &str = "system";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitHistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub garment_id: String,
    pub tier: FitTier,
    pub message: String,
}

impl FitHistoryEntry {
    pub fn new(garment_id: impl Into<String>, tier: FitTier, message: impl Into<String>) -> Self {
        Self::at(Utc::now(), garment_id, tier, message)
    }

    pub fn at(
        timestamp: DateTime<Utc>,
        garment_id: impl Into<String>,
        tier: FitTier,
        message: impl Into<String>,
    ) -> Self {
        Self { timestamp, garment_id: garment_id.into(), tier, message: message.into() }
    }

    pub fn is_system(&self) -> bool {
        self.garment_id == SYSTEM_GARMENT_ID
    }
}

/// Insertion-ordered log, oldest entries evicted first once over capacity.
/// Serialized as a plain list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<FitHistoryEntry>", into = "Vec<FitHistoryEntry>")]
pub struct FitHistoryRecorder {
    entries: VecDeque<FitHistoryEntry>,
    capacity: usize,
}

impl Default for FitHistoryRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl FitHistoryRecorder {
    pub fn new() -> Self {
        Self::with_capacity(FIT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { entries: VecDeque::with_capacity(capacity), capacity }
    }

    pub fn append(&mut self, entry: FitHistoryEntry) {
        self.entries.push_back(entry);
        self.evict();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the cap; shrinking drops the oldest entries
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.evict();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &FitHistoryEntry> + ExactSizeIterator {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&FitHistoryEntry> {
        self.entries.back()
    }

    pub fn to_vec(&self) -> Vec<FitHistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    fn evict(&mut self) {
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }
}

/// Keeps every entry; the loader applies the configured cap afterwards
/// through `set_capacity`.
impl From<Vec<FitHistoryEntry>> for FitHistoryRecorder {
    fn from(entries: Vec<FitHistoryEntry>) -> Self {
        let capacity = entries.len().max(FIT_HISTORY_CAPACITY);
        Self { entries: entries.into(), capacity }
    }
}

impl From<FitHistoryRecorder> for Vec<FitHistoryEntry> {
    fn from(recorder: FitHistoryRecorder) -> Self {
        recorder.entries.into()
    }
}
