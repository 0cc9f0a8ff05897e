// ============================================================
// Layer 3 — Execution Mode
// ============================================================
// Exactly one mode is active per model-function call. It is
// passed explicitly into every block and every batch-norm
// layer; nothing reads it from ambient state.
//
//   Train   → batch statistics, loss, gradient step
//   Eval    → running statistics, loss, accuracy
//   Predict → running statistics, classes + probabilities

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Train,
    Eval,
    Predict,
}

impl Mode {
    /// Whether batch normalisation should use (and update) batch statistics.
    pub fn is_training(self) -> bool {
        matches!(self, Mode::Train)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Train   => "train",
            Mode::Eval    => "eval",
            Mode::Predict => "predict",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_train_uses_batch_statistics() {
        assert!(Mode::Train.is_training());
        assert!(!Mode::Eval.is_training());
        assert!(!Mode::Predict.is_training());
    }

    #[test]
    fn test_display() {
        assert_eq!(Mode::Eval.to_string(), "eval");
    }
}
