// ============================================================
// Layer 5 — Estimator
// ============================================================
// Drives the model function over batches:
//
//   train(batches)    → Mode::Train per batch, run the train op,
//                       fold batch accuracy into a running value
//   evaluate(batches) → Mode::Eval per batch, average the loss,
//                       merge accuracy across batches
//   predict(images)   → Mode::Predict, no labels
//
// The estimator owns the model, the optimiser and the global
// step; the model function owns nothing.
//
// Key Burn insight:
//   - optim.step() consumes the model and returns the updated one,
//     so the train loop hands over a clone and stores the result.
//     Module clones share tensor storage.

use anyhow::{bail, Result};
use burn::{
    optim::Optimizer,
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};

use crate::data::batcher::ImageBatch;
use crate::domain::accuracy::Accuracy;
use crate::domain::global_step::GlobalStep;
use crate::domain::mode::Mode;
use crate::ml::model::ResNet50;
use crate::ml::model_fn::{resnet_model_fn, EstimatorSpec, Predictions};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainReport {
    pub steps:       usize,
    pub mean_loss:   f64,
    pub accuracy:    Accuracy,
    pub global_step: GlobalStep,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalReport {
    pub steps:     usize,
    pub mean_loss: f64,
    pub accuracy:  Accuracy,
}

fn mean(sum: f64, count: usize) -> f64 {
    if count > 0 { sum / count as f64 } else { f64::NAN }
}

pub struct Estimator<B: AutodiffBackend, O> {
    model:       ResNet50<B>,
    optim:       O,
    global_step: GlobalStep,
}

impl<B, O> Estimator<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<ResNet50<B>, B>,
{
    pub fn new(model: ResNet50<B>, optim: O) -> Self {
        Self { model, optim, global_step: GlobalStep::default() }
    }

    pub fn global_step(&self) -> GlobalStep {
        self.global_step
    }

    /// One gradient step per batch.
    pub fn train<I>(&mut self, batches: I) -> Result<TrainReport>
    where
        I: IntoIterator<Item = ImageBatch<B>>,
    {
        let mut loss_sum = 0.0f64;
        let mut steps    = 0usize;
        let mut running  = Accuracy::default();

        for batch in batches {
            let spec = resnet_model_fn(&self.model, batch.images, Some(batch.labels), Mode::Train)?;
            let (loss, train_op, accuracy) = match spec {
                EstimatorSpec::Train { loss, train_op, accuracy } => (loss, train_op, accuracy),
                other => bail!("model function returned a {} spec in train mode", other.mode()),
            };

            let loss_val: f64 = loss.into_scalar().elem::<f64>();
            loss_sum += loss_val;
            steps    += 1;
            running.merge(accuracy);

            let lr = train_op.learning_rate();
            self.model = train_op.run(self.model.clone(), &mut self.optim, &mut self.global_step);

            tracing::info!(
                "step {:>6} | loss={:.4} | accuracy={:.1}% | lr={}",
                self.global_step.value(), loss_val, running.value() * 100.0, lr,
            );
        }

        Ok(TrainReport {
            steps,
            mean_loss:   mean(loss_sum, steps),
            accuracy:    running,
            global_step: self.global_step,
        })
    }

    /// Loss and accuracy over all batches; parameters are untouched.
    pub fn evaluate<I>(&self, batches: I) -> Result<EvalReport>
    where
        I: IntoIterator<Item = ImageBatch<B>>,
    {
        let mut loss_sum = 0.0f64;
        let mut steps    = 0usize;
        let mut accuracy = Accuracy::default();

        for batch in batches {
            let spec = resnet_model_fn(&self.model, batch.images, Some(batch.labels), Mode::Eval)?;
            let (loss, metrics) = match spec {
                EstimatorSpec::Eval { loss, metrics } => (loss, metrics),
                other => bail!("model function returned a {} spec in eval mode", other.mode()),
            };

            loss_sum += loss.into_scalar().elem::<f64>();
            steps    += 1;
            accuracy.merge(metrics.accuracy);
        }

        let report = EvalReport { steps, mean_loss: mean(loss_sum, steps), accuracy };
        tracing::info!(
            "eval | batches={} | loss={:.4} | accuracy={:.1}%",
            report.steps, report.mean_loss, report.accuracy.value() * 100.0,
        );
        Ok(report)
    }

    /// images: [N, 224, 224, 3]
    pub fn predict(&self, images: Tensor<B, 4>) -> Result<Predictions<B>> {
        match resnet_model_fn(&self.model, images, None, Mode::Predict)? {
            EstimatorSpec::Predict { predictions } => Ok(predictions),
            other => bail!("model function returned a {} spec in predict mode", other.mode()),
        }
    }
}
