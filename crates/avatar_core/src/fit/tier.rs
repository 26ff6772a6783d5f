use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fit fidelity tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
pub enum FitTier {
    /// Heuristic anchor snap
    #[default]
    L0,
    /// Iterative constraint solve
    L1,
}

impl FitTier {
    pub fn toggled(self) -> Self {
        match self {
            FitTier::L0 => FitTier::L1,
            FitTier::L1 => FitTier::L0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FitTier::L0 => "L0",
            FitTier::L1 => "L1",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "L0" | "l0" => Some(FitTier::L0),
            "L1" | "l1" => Some(FitTier::L1),
            _ => None,
        }
    }
}

impl fmt::Display for FitTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
