// ============================================================
// Layer 4 — Image Batcher
// ============================================================
// Implements Burn's Batcher trait to stack ImageSamples into
// the tensors the model function takes:
//
//   Input:  Vec of N ImageSamples, 224·224·3 floats each
//   Output: ImageBatch { images: [N, 224, 224, 3],
//                        labels: [N] }
//
// Images stay NHWC here; the model reshapes and moves channels
// first itself, exactly as it does for any raw feature tensor.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::domain::sample::ImageSample;
use crate::domain::topology::{IMAGE_CHANNELS, IMAGE_SIZE};

// ─── ImageBatch ───────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct ImageBatch<B: Backend> {
    /// Shape: [batch_size, 224, 224, 3]
    pub images: Tensor<B, 4>,

    /// Shape: [batch_size], class indices
    pub labels: Tensor<B, 1, Int>,
}

// ─── ImageBatcher ─────────────────────────────────────────────────────────────
#[derive(Clone, Debug)]
pub struct ImageBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> ImageBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<ImageSample, ImageBatch<B>> for ImageBatcher<B> {
    fn batch(&self, items: Vec<ImageSample>) -> ImageBatch<B> {
        let batch_size = items.len();
        debug_assert!(
            items.iter().all(ImageSample::has_image_shape),
            "every sample must hold 224 × 224 × 3 pixels",
        );

        let pixels: Vec<f32> = items
            .iter()
            .flat_map(|s| s.pixels.iter().copied())
            .collect();

        let labels: Vec<i32> = items
            .iter()
            .map(|s| s.label as i32)
            .collect();

        let images = Tensor::<B, 1>::from_floats(pixels.as_slice(), &self.device)
            .reshape([batch_size, IMAGE_SIZE, IMAGE_SIZE, IMAGE_CHANNELS]);

        let labels = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        ImageBatch { images, labels }
    }
}
