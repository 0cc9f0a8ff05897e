// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates a training run in order:
//
//   Step 1: Save the run config          (Layer 6 - infra)
//   Step 2: Open the metrics log         (Layer 6 - infra)
//   Step 3: Seed and build ResNet-50     (Layer 5 - ml)
//   Step 4: Build train / eval loaders   (Layer 4 - data)
//   Step 5: Per epoch: train, evaluate,
//           log metrics                  (Layer 5 - ml)
//
// Inputs come from SyntheticDataset; there is no image
// pipeline. The optimiser is plain SGD at the fixed learning
// rate of the model function.

use anyhow::{ensure, Result};
use burn::{
    backend::wgpu::WgpuDevice,
    data::dataloader::DataLoaderBuilder,
    optim::SgdConfig,
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::data::{batcher::ImageBatcher, dataset::SyntheticDataset};
use crate::domain::topology::NUM_CLASSES;
use crate::infra::{
    config_store::ConfigStore,
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::estimator::Estimator;
use crate::ml::model::{resnet50, ResNet50};
use crate::ml::model_fn::LEARNING_RATE;

type MyBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

// ─── Run Configuration ───────────────────────────────────────────────────────
// Everything about a run except the network and the learning
// rate, which are fixed. Serialisable so a run can be repeated
// from its saved run_config.json.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub output_dir:      String,
    pub batch_size:      usize,
    pub epochs:          usize,
    pub steps_per_epoch: usize,
    pub eval_steps:      usize,
    pub seed:            u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output_dir:      "runs".to_string(),
            batch_size:      8,
            epochs:          2,
            steps_per_epoch: 16,
            eval_steps:      4,
            seed:            42,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.batch_size > 0, "batch_size must be at least 1");
        ensure!(self.epochs > 0, "epochs must be at least 1");
        ensure!(self.steps_per_epoch > 0, "steps_per_epoch must be at least 1");
        Ok(())
    }

    pub fn train_samples(&self) -> usize {
        self.steps_per_epoch * self.batch_size
    }

    pub fn eval_samples(&self) -> usize {
        self.eval_steps * self.batch_size
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: RunConfig,
}

impl TrainUseCase {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;
        cfg.validate()?;

        // ── Step 1 + 2: persist config, open metrics log ─────────────────────
        let store = ConfigStore::new(&cfg.output_dir)?;
        store.save_config(cfg)?;
        let metrics = MetricsLogger::new(&cfg.output_dir)?;

        // ── Step 3: model and optimiser ──────────────────────────────────────
        let device = WgpuDevice::default();
        tracing::info!("Using WGPU device: {:?}", device);
        MyBackend::seed(cfg.seed);

        let model = resnet50::<MyBackend>(&device);
        tracing::info!(
            "ResNet-50 ready: {} conv layers, {} classes, lr={}",
            model.layer_names().len(), model.num_classes(), LEARNING_RATE,
        );
        let optim = SgdConfig::new().init::<MyBackend, ResNet50<MyBackend>>();
        let mut estimator = Estimator::new(model, optim);

        // ── Step 4: data loaders ─────────────────────────────────────────────
        let (train_set, eval_set) = SyntheticDataset::train_eval_pair(
            cfg.train_samples(), cfg.eval_samples(), cfg.seed, NUM_CLASSES,
        );

        let train_loader = DataLoaderBuilder::new(ImageBatcher::<MyBackend>::new(device.clone()))
            .batch_size(cfg.batch_size)
            .shuffle(cfg.seed)
            .num_workers(1)
            .build(train_set);

        let eval_loader = DataLoaderBuilder::new(ImageBatcher::<MyBackend>::new(device.clone()))
            .batch_size(cfg.batch_size)
            .num_workers(1)
            .build(eval_set);

        // ── Step 5: epoch loop ───────────────────────────────────────────────
        let mut best_eval_loss = f64::INFINITY;
        for epoch in 1..=cfg.epochs {
            let train = estimator.train(train_loader.iter())?;
            let eval  = estimator.evaluate(eval_loader.iter())?;

            println!(
                "Epoch {:>3}/{} | train_loss={:.4} | train_acc={:.1}% | eval_loss={:.4} | eval_acc={:.1}% | step={}",
                epoch, cfg.epochs,
                train.mean_loss, train.accuracy.value() * 100.0,
                eval.mean_loss, eval.accuracy.value() * 100.0,
                train.global_step,
            );

            let row = EpochMetrics::new(
                epoch,
                train.mean_loss,
                train.accuracy.value(),
                eval.mean_loss,
                eval.accuracy.value(),
                train.global_step.value(),
            );
            if row.is_improvement(best_eval_loss) {
                best_eval_loss = row.eval_loss;
                tracing::info!("Epoch {} is the best so far (eval_loss={:.4})", epoch, best_eval_loss);
            }
            metrics.log(&row)?;
        }

        tracing::info!(
            "Training complete after {} steps! Metrics in '{}'",
            estimator.global_step(), metrics.csv_path().display(),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(RunConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let cfg = RunConfig { batch_size: 0, ..RunConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_sample_counts() {
        let cfg = RunConfig { batch_size: 4, steps_per_epoch: 3, eval_steps: 2, ..RunConfig::default() };
        assert_eq!(cfg.train_samples(), 12);
        assert_eq!(cfg.eval_samples(), 8);
    }
}
