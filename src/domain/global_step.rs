// ============================================================
// Layer 3 — Global Step
// ============================================================
// Counts applied gradient updates. Only a train operation
// advances it, exactly once per update.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GlobalStep(u64);

impl GlobalStep {
    pub fn value(self) -> u64 {
        self.0
    }

    pub fn increment(&mut self) {
        self.0 += 1;
    }
}

impl fmt::Display for GlobalStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
