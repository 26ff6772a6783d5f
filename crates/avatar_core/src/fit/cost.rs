//! Fit cost model and per-garment outcomes

use super::tier::FitTier;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Static latency model for both tiers (estimates, not wall clock)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct FitCostModel {
    /// Fixed L0 cost regardless of anchor count (기본: 32)
    #[validate(range(min = 1, max = 10000))]
    pub l0_latency_ms: u32,
    /// L1 solver floor (기본: 8)
    #[validate(range(min = 1, max = 1000))]
    pub min_solver_iterations: u32,
    /// L1 iterations per anchor (기본: 3)
    #[validate(range(min = 1, max = 100))]
    pub iterations_per_anchor: u32,
    /// Cost of one L1 iteration (기본: 6)
    #[validate(range(min = 1, max = 1000))]
    pub iteration_cost_ms: u32,
    /// L1 results above this are degraded (기본: 72)
    #[validate(range(min = 1, max = 60000))]
    pub latency_budget_ms: u32,
}

impl Default for FitCostModel {
    fn default() -> Self {
        Self {
            l0_latency_ms: 32,
            min_solver_iterations: 8,
            iterations_per_anchor: 3,
            iteration_cost_ms: 6,
            latency_budget_ms: 72,
        }
    }
}

impl FitCostModel {
    pub fn solver_iterations(&self, anchor_count: usize) -> u32 {
        let anchors = u32::try_from(anchor_count).unwrap_or(u32::MAX);
        anchors.saturating_mul(self.iterations_per_anchor).max(self.min_solver_iterations)
    }

    pub fn l1_latency_ms(&self, iterations: u32) -> u32 {
        iterations.saturating_mul(self.iteration_cost_ms)
    }

    pub fn exceeds_budget(&self, latency_ms: u32) -> bool {
        latency_ms > self.latency_budget_ms
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitResult {
    pub garment_id: String,
    pub anchors_used: Vec<String>,
    pub estimated_latency_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L1FitResult {
    #[serde(flatten)]
    pub fit: FitResult,
    pub solver_iterations: u32,
    pub degraded: bool,
}

/// Result of fitting one garment at the active tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FitOutcome {
    /// L0 pass
    Heuristic(FitResult),
    /// L1 pass within budget
    Solved(L1FitResult),
    /// L1 over budget, re-fitted at L0
    Degraded { attempt: L1FitResult, fallback: FitResult },
}

impl FitOutcome {
    pub fn garment_id(&self) -> &str {
        match self {
            FitOutcome::Heuristic(result) => &result.garment_id,
            FitOutcome::Solved(result) => &result.fit.garment_id,
            FitOutcome::Degraded { attempt, .. } => &attempt.fit.garment_id,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, FitOutcome::Degraded { .. })
    }

    /// Tier that produced the placement the renderer ends up using
    pub fn effective_tier(&self) -> FitTier {
        match self {
            FitOutcome::Heuristic(_) | FitOutcome::Degraded { .. } => FitTier::L0,
            FitOutcome::Solved(_) => FitTier::L1,
        }
    }

    pub fn effective_latency_ms(&self) -> u32 {
        match self {
            FitOutcome::Heuristic(result) => result.estimated_latency_ms,
            FitOutcome::Solved(result) => result.fit.estimated_latency_ms,
            FitOutcome::Degraded { fallback, .. } => fallback.estimated_latency_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        let model = FitCostModel::default();
        assert_eq!(model.solver_iterations(0), 8);
        assert_eq!(model.solver_iterations(2), 8);
        assert_eq!(model.solver_iterations(3), 9);
        assert_eq!(model.l1_latency_ms(8), 48);
        assert!(!model.exceeds_budget(72));
        assert!(model.exceeds_budget(78));
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_zero_cost_rejected() {
        let model = FitCostModel { iteration_cost_ms: 0, ..FitCostModel::default() };
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_l1_result_flattens() {
        let result = L1FitResult {
            fit: FitResult {
                garment_id: "tee".into(),
                anchors_used: vec!["neck".into()],
                estimated_latency_ms: 48,
            },
            solver_iterations: 8,
            degraded: false,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["garmentId"], "tee");
        assert_eq!(json["solverIterations"], 8);
        assert_eq!(json["estimatedLatencyMs"], 48);
    }
}
