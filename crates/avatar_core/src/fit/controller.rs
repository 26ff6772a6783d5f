//! Fit tier state machine
//!
//! Manual tier changes go either way. The only automatic transition is
//! L1 -> L0, decided once per batch after every selected garment has been
//! fitted: one degraded garment anywhere in the batch forces the downgrade.

use super::cost::{FitCostModel, FitOutcome, FitResult, L1FitResult};
use super::history::{FitHistoryEntry, FitHistoryRecorder, SYSTEM_GARMENT_ID};
use super::tier::FitTier;
use crate::garments::GarmentItem;
use crate::telemetry::{TelemetryForwarder, TelemetryRecord};
use serde::Serialize;
use serde_json::json;

/// What a batch did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchReport {
    /// Empty selection: history wiped, nothing fitted
    Cleared,
    Completed { starting_tier: FitTier, final_tier: FitTier, outcomes: Vec<FitOutcome> },
}

impl BatchReport {
    pub fn downgraded(&self) -> bool {
        matches!(
            self,
            BatchReport::Completed { starting_tier: FitTier::L1, final_tier: FitTier::L0, .. }
        )
    }

    pub fn outcomes(&self) -> &[FitOutcome] {
        match self {
            BatchReport::Cleared => &[],
            BatchReport::Completed { outcomes, .. } => outcomes,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FitTierController {
    cost: FitCostModel,
}

impl FitTierController {
    pub fn new(cost: FitCostModel) -> Self {
        Self { cost }
    }

    /// L0: snap to each anchor. Fixed cost; anchors only feed the audit trail.
    pub fn apply_garment_l0(&self, garment: &GarmentItem) -> FitResult {
        for anchor in &garment.anchors {
            log::debug!("[L0] Aligning anchor {} for garment {}", anchor, garment.id);
        }

        FitResult {
            garment_id: garment.id.clone(),
            anchors_used: garment.anchors.clone(),
            estimated_latency_ms: self.cost.l0_latency_ms,
        }
    }

    /// L1: iterative solve, cost grows with anchor count
    pub fn apply_garment_l1(&self, garment: &GarmentItem) -> L1FitResult {
        let solver_iterations = self.cost.solver_iterations(garment.anchors.len());
        let estimated_latency_ms = self.cost.l1_latency_ms(solver_iterations);
        let degraded = self.cost.exceeds_budget(estimated_latency_ms);

        for anchor in &garment.anchors {
            log::debug!("[L1] Solving constraint for {} @ {}", garment.id, anchor);
        }
        if degraded {
            log::warn!(
                "[L1] {} exceeded latency budget ({}ms > {}ms), falling back to L0",
                garment.id,
                estimated_latency_ms,
                self.cost.latency_budget_ms
            );
        }

        L1FitResult {
            fit: FitResult {
                garment_id: garment.id.clone(),
                anchors_used: garment.anchors.clone(),
                estimated_latency_ms,
            },
            solver_iterations,
            degraded,
        }
    }

    /// Fit one garment at `tier`, falling back to L0 when L1 is over budget
    pub fn fit(&self, tier: FitTier, garment: &GarmentItem) -> FitOutcome {
        match tier {
            FitTier::L0 => FitOutcome::Heuristic(self.apply_garment_l0(garment)),
            FitTier::L1 => {
                let attempt = self.apply_garment_l1(garment);
                if attempt.degraded {
                    let fallback = self.apply_garment_l0(garment);
                    FitOutcome::Degraded { attempt, fallback }
                } else {
                    FitOutcome::Solved(attempt)
                }
            }
        }
    }

    /// Fit the whole selection in order and apply the downgrade policy.
    ///
    /// An empty selection clears the history and stops there.
    pub fn run_batch(
        &self,
        tier: &mut FitTier,
        garments: &[GarmentItem],
        history: &mut FitHistoryRecorder,
        telemetry: Option<&TelemetryForwarder>,
    ) -> BatchReport {
        // TODO: confirm with product whether deselecting everything should really wipe the log
        if garments.is_empty() {
            history.clear();
            return BatchReport::Cleared;
        }

        let starting_tier = *tier;
        let mut outcomes = Vec::with_capacity(garments.len());

        for garment in garments {
            let outcome = self.fit(starting_tier, garment);
            self.record_outcome(&outcome, history, telemetry);
            outcomes.push(outcome);
        }

        let total_ms: u32 = outcomes.iter().map(FitOutcome::effective_latency_ms).sum();
        log::debug!("Fitted {} garments at {} in {}ms", outcomes.len(), starting_tier, total_ms);

        let any_degraded = outcomes.iter().any(FitOutcome::is_degraded);
        if starting_tier == FitTier::L1 && any_degraded {
            *tier = FitTier::L0;
            log::info!("Fit tier auto-downgraded L1 -> L0 after batch of {}", garments.len());
            self.log(
                history,
                telemetry,
                FitHistoryEntry::new(
                    SYSTEM_GARMENT_ID,
                    FitTier::L0,
                    "Auto-downgraded to L0: L1 exceeded latency budget",
                ),
                TelemetryRecord {
                    tier: FitTier::L0,
                    garment_id: SYSTEM_GARMENT_ID.to_string(),
                    latency_ms: 0,
                    degraded: true,
                    details: json!({
                        "reason": "latency_budget",
                        "budgetMs": self.cost.latency_budget_ms,
                        "from": FitTier::L1,
                    }),
                },
            );
        }

        BatchReport::Completed { starting_tier, final_tier: *tier, outcomes }
    }

    fn record_outcome(
        &self,
        outcome: &FitOutcome,
        history: &mut FitHistoryRecorder,
        telemetry: Option<&TelemetryForwarder>,
    ) {
        match outcome {
            FitOutcome::Heuristic(result) => self.record_l0(result, false, history, telemetry),
            FitOutcome::Solved(result) => self.record_l1(result, history, telemetry),
            FitOutcome::Degraded { attempt, fallback } => {
                self.record_l1(attempt, history, telemetry);
                self.record_l0(fallback, true, history, telemetry);
            }
        }
    }

    fn record_l1(
        &self,
        result: &L1FitResult,
        history: &mut FitHistoryRecorder,
        telemetry: Option<&TelemetryForwarder>,
    ) {
        let fit = &result.fit;
        self.log(
            history,
            telemetry,
            FitHistoryEntry::new(
                fit.garment_id.clone(),
                FitTier::L1,
                if result.degraded {
                    format!(
                        "L1 exceeded {}ms budget: {} anchors in {} iterations ({}ms)",
                        self.cost.latency_budget_ms,
                        fit.anchors_used.len(),
                        result.solver_iterations,
                        fit.estimated_latency_ms
                    )
                } else {
                    format!(
                        "L1 solved {} anchors in {} iterations ({}ms)",
                        fit.anchors_used.len(),
                        result.solver_iterations,
                        fit.estimated_latency_ms
                    )
                },
            ),
            TelemetryRecord {
                tier: FitTier::L1,
                garment_id: fit.garment_id.clone(),
                latency_ms: fit.estimated_latency_ms,
                degraded: result.degraded,
                details: json!({
                    "anchors": fit.anchors_used,
                    "solverIterations": result.solver_iterations,
                }),
            },
        );
    }

    fn record_l0(
        &self,
        result: &FitResult,
        fallback: bool,
        history: &mut FitHistoryRecorder,
        telemetry: Option<&TelemetryForwarder>,
    ) {
        let message = if fallback {
            format!(
                "L0 fallback after L1 exceeded {}ms budget ({}ms)",
                self.cost.latency_budget_ms, result.estimated_latency_ms
            )
        } else if result.anchors_used.is_empty() {
            format!("L0 aligned 0 anchors in {}ms", result.estimated_latency_ms)
        } else {
            format!(
                "L0 aligned {} anchors ({}) in {}ms",
                result.anchors_used.len(),
                result.anchors_used.join(", "),
                result.estimated_latency_ms
            )
        };

        let mut details = json!({ "anchors": result.anchors_used });
        if fallback {
            details["fallbackFrom"] = json!(FitTier::L1);
        }

        self.log(
            history,
            telemetry,
            FitHistoryEntry::new(result.garment_id.clone(), FitTier::L0, message),
            TelemetryRecord {
                tier: FitTier::L0,
                garment_id: result.garment_id.clone(),
                latency_ms: result.estimated_latency_ms,
                degraded: fallback,
                details,
            },
        );
    }

    /// Append, then hand the record to telemetry without waiting
    fn log(
        &self,
        history: &mut FitHistoryRecorder,
        telemetry: Option<&TelemetryForwarder>,
        entry: FitHistoryEntry,
        record: TelemetryRecord,
    ) {
        history.append(entry);
        if let Some(forwarder) = telemetry {
            forwarder.forward(record);
        }
    }
}
