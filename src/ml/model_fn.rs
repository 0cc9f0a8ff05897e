// ============================================================
// Layer 5 — Model Function
// ============================================================
// The estimator contract: features + optional labels + Mode in,
// an EstimatorSpec out. The mode is matched exactly once and
// each arm builds only its own branch:
//
//   Predict → { classes, probabilities }       labels ignored
//   Train   → { loss, train_op, accuracy }     SGD, lr = 0.001
//   Eval    → { loss, metrics: { accuracy } }  no train_op
//
// Loss is sparse softmax cross-entropy between integer labels
// and the 8,631 logits. The train op owns the gradients; running
// it applies one SGD step and advances the global step.

use anyhow::{Context, Result};
use burn::{
    nn::loss::CrossEntropyLossConfig,
    optim::{GradientsParams, Optimizer},
    prelude::*,
    tensor::{activation::softmax, backend::AutodiffBackend},
};
use serde::{Deserialize, Serialize};

use crate::domain::accuracy::Accuracy;
use crate::domain::global_step::GlobalStep;
use crate::domain::mode::Mode;
use crate::ml::model::{reshape_input, ResNet50};

/// Fixed gradient-descent step size.
pub const LEARNING_RATE: f64 = 0.001;

// ─── Outputs ──────────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct Predictions<B: Backend> {
    /// argmax class per sample — shape: [batch]
    pub classes: Tensor<B, 1, Int>,
    /// softmax over classes — shape: [batch, num_classes]
    pub probabilities: Tensor<B, 2>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalMetrics {
    pub accuracy: Accuracy,
}

/// One pending gradient-descent update.
pub struct TrainOp {
    grads:         GradientsParams,
    learning_rate: f64,
}

impl TrainOp {
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Apply the update and advance the step counter.
    pub fn run<B, O>(
        self,
        model:       ResNet50<B>,
        optim:       &mut O,
        global_step: &mut GlobalStep,
    ) -> ResNet50<B>
    where
        B: AutodiffBackend,
        O: Optimizer<ResNet50<B>, B>,
    {
        let model = optim.step(self.learning_rate, model, self.grads);
        global_step.increment();
        model
    }
}

pub enum EstimatorSpec<B: AutodiffBackend> {
    Predict {
        predictions: Predictions<B>,
    },
    Train {
        loss:     Tensor<B, 1>,
        train_op: TrainOp,
        /// Batch accuracy, recorded for observability only
        accuracy: Accuracy,
    },
    Eval {
        loss:    Tensor<B, 1>,
        metrics: EvalMetrics,
    },
}

impl<B: AutodiffBackend> EstimatorSpec<B> {
    pub fn mode(&self) -> Mode {
        match self {
            EstimatorSpec::Predict { .. } => Mode::Predict,
            EstimatorSpec::Train { .. }   => Mode::Train,
            EstimatorSpec::Eval { .. }    => Mode::Eval,
        }
    }
}

// ─── Model function ───────────────────────────────────────────────────────────
/// `features` must reshape to [N, 224, 224, 3]; `labels` are class
/// indices of shape [N] and are only read in Train and Eval mode.
pub fn resnet_model_fn<B: AutodiffBackend, const D: usize>(
    model:    &ResNet50<B>,
    features: Tensor<B, D>,
    labels:   Option<Tensor<B, 1, Int>>,
    mode:     Mode,
) -> Result<EstimatorSpec<B>> {
    let input = reshape_input(features);

    match mode {
        Mode::Predict => {
            let logits = model.forward(input, mode);
            Ok(EstimatorSpec::Predict { predictions: predictions(logits) })
        }
        Mode::Train => {
            let labels = labels.context("train mode requires integer labels")?;
            let logits = model.forward(input, mode);
            let (loss, accuracy) = loss_and_accuracy(logits, labels);

            let grads = GradientsParams::from_grads(loss.backward(), model);
            tracing::debug!("train summary: batch accuracy={:.4}", accuracy.value());

            Ok(EstimatorSpec::Train {
                loss,
                train_op: TrainOp { grads, learning_rate: LEARNING_RATE },
                accuracy,
            })
        }
        Mode::Eval => {
            let labels = labels.context("eval mode requires integer labels")?;
            let logits = model.forward(input, mode);
            let (loss, accuracy) = loss_and_accuracy(logits, labels);

            Ok(EstimatorSpec::Eval { loss, metrics: EvalMetrics { accuracy } })
        }
    }
}

/// argmax(1) returns [batch, 1]; flatten to [batch].
fn argmax_classes<B: Backend>(logits: Tensor<B, 2>) -> Tensor<B, 1, Int> {
    logits.argmax(1).flatten::<1>(0, 1)
}

pub fn predictions<B: Backend>(logits: Tensor<B, 2>) -> Predictions<B> {
    Predictions {
        classes:       argmax_classes(logits.clone()),
        probabilities: softmax(logits, 1),
    }
}

pub fn batch_accuracy<B: Backend>(classes: Tensor<B, 1, Int>, labels: Tensor<B, 1, Int>) -> Accuracy {
    let total = labels.dims()[0];
    let correct: i64 = classes
        .equal(labels)
        .int()
        .sum()
        .into_scalar()
        .elem::<i64>();
    Accuracy::new(correct as usize, total)
}

fn loss_and_accuracy<B: Backend>(
    logits: Tensor<B, 2>,
    labels: Tensor<B, 1, Int>,
) -> (Tensor<B, 1>, Accuracy) {
    let accuracy = batch_accuracy(argmax_classes(logits.clone()), labels.clone());
    let loss = CrossEntropyLossConfig::new()
        .init(&logits.device())
        .forward(logits, labels);
    (loss, accuracy)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::resnet50;
    use burn::optim::SgdConfig;
    use burn::tensor::Distribution;

    type TestBackend = burn::backend::Autodiff<burn::backend::NdArray>;

    fn image(batch: usize) -> Tensor<TestBackend, 4> {
        Tensor::random([batch, 224, 224, 3], Distribution::Default, &Default::default())
    }

    fn labels(values: &[i32]) -> Tensor<TestBackend, 1, Int> {
        Tensor::from_ints(values, &Default::default())
    }

    #[test]
    fn test_predict_outputs_without_labels() {
        let device = Default::default();
        let model  = resnet50::<TestBackend>(&device);

        let spec = resnet_model_fn(&model, image(1), None, Mode::Predict).unwrap();

        let EstimatorSpec::Predict { predictions } = spec else {
            panic!("predict mode must return predictions");
        };
        assert_eq!(predictions.classes.dims(), [1]);
        assert_eq!(predictions.probabilities.dims(), [1, 8631]);

        let class = predictions.classes.into_scalar().elem::<i64>();
        assert!((0..8631).contains(&class));

        let probs = predictions.probabilities.into_data().to_vec::<f32>().unwrap();
        let sum: f64 = probs.iter().map(|&p| p as f64).sum();
        assert!((sum - 1.0).abs() < 1e-5, "probabilities sum to {sum}");
    }

    #[test]
    fn test_predict_accepts_flat_features() {
        let device = Default::default();
        let model  = resnet50::<TestBackend>(&device);
        let flat = image(1).reshape([1, 224 * 224 * 3]);

        let spec = resnet_model_fn(&model, flat, None, Mode::Predict).unwrap();
        assert_eq!(spec.mode(), Mode::Predict);
    }

    #[test]
    fn test_train_loss_is_deterministic() {
        let device = Default::default();
        let model  = resnet50::<TestBackend>(&device);
        let x = image(1);
        let y = labels(&[17]);

        let loss_of = |spec: EstimatorSpec<TestBackend>| match spec {
            EstimatorSpec::Train { loss, train_op, .. } => {
                assert_eq!(train_op.learning_rate(), LEARNING_RATE);
                loss.into_scalar().elem::<f32>()
            }
            other => panic!("expected a train spec, got {}", other.mode()),
        };

        let first  = loss_of(resnet_model_fn(&model, x.clone(), Some(y.clone()), Mode::Train).unwrap());
        let second = loss_of(resnet_model_fn(&model, x, Some(y), Mode::Train).unwrap());

        assert!(first.is_finite());
        assert_eq!(first, second);
    }

    #[test]
    fn test_eval_returns_metrics_and_no_train_op() {
        let device = Default::default();
        let model  = resnet50::<TestBackend>(&device);

        let spec = resnet_model_fn(&model, image(2), Some(labels(&[0, 8630])), Mode::Eval).unwrap();

        match spec {
            EstimatorSpec::Eval { loss, metrics } => {
                assert!(loss.into_scalar().elem::<f32>() > 0.0);
                assert_eq!(metrics.accuracy.total, 2);
                assert!(metrics.accuracy.correct <= 2);
            }
            other => panic!("expected an eval spec, got {}", other.mode()),
        }
    }

    #[test]
    fn test_train_and_eval_require_labels() {
        let device = Default::default();
        let model  = resnet50::<TestBackend>(&device);

        for mode in [Mode::Train, Mode::Eval] {
            let err = resnet_model_fn(&model, image(1), None, mode).err();
            assert!(err.is_some(), "{mode} without labels must fail");
        }
    }

    #[test]
    fn test_train_op_advances_global_step() {
        let device = Default::default();
        let model  = resnet50::<TestBackend>(&device);
        let mut optim = SgdConfig::new().init::<TestBackend, ResNet50<TestBackend>>();
        let mut step  = GlobalStep::default();

        let spec = resnet_model_fn(&model, image(1), Some(labels(&[3])), Mode::Train).unwrap();
        let EstimatorSpec::Train { train_op, .. } = spec else {
            panic!("train mode must return a train op");
        };
        let before = model.logits.weight.val().into_data().to_vec::<f32>().unwrap();
        let model  = train_op.run(model, &mut optim, &mut step);
        let after  = model.logits.weight.val().into_data().to_vec::<f32>().unwrap();

        assert_eq!(step.value(), 1);
        assert_ne!(before, after);
    }

    #[test]
    fn test_batch_accuracy_counts_matches() {
        let device = Default::default();
        let classes = Tensor::<burn::backend::NdArray, 1, Int>::from_ints([1, 2, 3, 4], &device);
        let labels  = Tensor::<burn::backend::NdArray, 1, Int>::from_ints([1, 0, 3, 0], &device);

        assert_eq!(batch_accuracy(classes, labels), Accuracy::new(2, 4));
    }
}
