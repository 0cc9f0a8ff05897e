// ============================================================
// Layer 2 — Predict Use Case
// ============================================================
// Runs the model function in predict mode on a synthetic batch:
//
//   1. Seed the backend and build ResNet-50
//   2. Draw `batch_size` images from SyntheticDataset
//   3. Estimator::predict — the model function with NO labels
//   4. Report class + probability per image
//
// Weights are freshly initialised (nothing is loaded from
// disk), so this is a smoke run of the inference path.

use anyhow::{Context, Result};
use burn::{
    backend::wgpu::WgpuDevice,
    data::{dataloader::batcher::Batcher, dataset::Dataset},
    optim::{Optimizer, SgdConfig},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::data::{batcher::ImageBatcher, dataset::SyntheticDataset};
use crate::domain::topology::NUM_CLASSES;
use crate::ml::estimator::Estimator;
use crate::ml::model::{resnet50, ResNet50};

type MyBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

/// Predicted identity for one input image.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub index:       usize,
    pub class:       usize,
    pub probability: f32,
}

pub struct PredictUseCase {
    batch_size: usize,
    seed:       u64,
}

impl PredictUseCase {
    pub fn new(batch_size: usize, seed: u64) -> Self {
        Self { batch_size, seed }
    }

    pub fn execute(&self) -> Result<Vec<Prediction>> {
        anyhow::ensure!(self.batch_size > 0, "batch_size must be at least 1");

        let device = WgpuDevice::default();
        MyBackend::seed(self.seed);
        let optim = SgdConfig::new().init::<MyBackend, ResNet50<MyBackend>>();
        let estimator = Estimator::new(resnet50::<MyBackend>(&device), optim);

        let dataset = SyntheticDataset::new(self.batch_size, self.seed, NUM_CLASSES);
        let samples = (0..dataset.len()).filter_map(|i| dataset.get(i)).collect();
        let batch   = ImageBatcher::<MyBackend>::new(device.clone()).batch(samples);

        classify(&estimator, batch.images)
    }
}

/// Predict-mode pass over `images` ([N, 224, 224, 3]); labels are never read.
pub fn classify<B, O>(estimator: &Estimator<B, O>, images: Tensor<B, 4>) -> Result<Vec<Prediction>>
where
    B: AutodiffBackend,
    O: Optimizer<ResNet50<B>, B>,
{
    let predictions = estimator.predict(images)?;
    let [_, num_classes] = predictions.probabilities.dims();

    let classes: Vec<i64> = predictions.classes
        .into_data()
        .convert::<i64>()
        .to_vec::<i64>()
        .map_err(|e| anyhow::anyhow!("Read classes: {e:?}"))?;
    let probabilities: Vec<f32> = predictions.probabilities
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| anyhow::anyhow!("Read probabilities: {e:?}"))?;

    classes
        .iter()
        .enumerate()
        .map(|(index, &class)| {
            let class = class as usize;
            let probability = *probabilities
                .get(index * num_classes + class)
                .context("probability row shorter than the class count")?;
            tracing::debug!("image {} → class {} (p={:.6})", index, class, probability);
            Ok(Prediction { index, class, probability })
        })
        .collect()
}
