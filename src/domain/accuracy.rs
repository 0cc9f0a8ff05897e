// ============================================================
// Layer 3 — Accuracy Metric
// ============================================================
// Running-average classification accuracy: the fraction of
// samples whose argmax class equals the label, accumulated
// across batches. Counts are kept rather than an average so
// batches of different sizes merge exactly.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accuracy {
    pub correct: usize,
    pub total:   usize,
}

impl Accuracy {
    pub fn new(correct: usize, total: usize) -> Self {
        Self { correct, total }
    }

    /// Fraction in [0.0, 1.0]; 0.0 before any sample was seen.
    pub fn value(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }

    /// Fold another batch into the running total.
    pub fn merge(&mut self, other: Accuracy) {
        self.correct += other.correct;
        self.total   += other.total;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(Accuracy::default().value(), 0.0);
    }

    #[test]
    fn test_merge_weights_by_batch_size() {
        // 1/1 and 0/3 → 1/4, not the mean of 1.0 and 0.0
        let mut acc = Accuracy::new(1, 1);
        acc.merge(Accuracy::new(0, 3));
        assert_eq!(acc, Accuracy::new(1, 4));
        assert!((acc.value() - 0.25).abs() < 1e-12);
    }
}
