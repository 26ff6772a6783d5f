//! Tiered garment fitting
//!
//! Two fidelity tiers: L0 (fast heuristic anchor alignment) and L1
//! (iterative constraint solving). Geometry is done by the renderer; this
//! layer computes the cost estimate, the downgrade decision and the audit
//! trail.

pub mod controller;
pub mod cost;
pub mod history;
pub mod tier;

pub use controller::{BatchReport, FitTierController};
pub use cost::{FitCostModel, FitOutcome, FitResult, L1FitResult};
pub use history::{FitHistoryEntry, FitHistoryRecorder, FIT_HISTORY_CAPACITY, SYSTEM_GARMENT_ID};
pub use tier::FitTier;
