// ============================================================
// Layer 3 — ImageSample Domain Type
// ============================================================
// One labelled image, stored the way the model function
// receives its features: row-major NHWC floats.

use serde::{Deserialize, Serialize};

use crate::domain::topology::PIXELS_PER_IMAGE;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSample {
    /// 224 × 224 × 3 values, height-major then width then channel
    pub pixels: Vec<f32>,

    /// Identity index in [0, NUM_CLASSES)
    pub label: usize,
}

impl ImageSample {
    pub fn new(pixels: Vec<f32>, label: usize) -> Self {
        Self { pixels, label }
    }

    /// True when the pixel buffer reshapes to (224, 224, 3).
    pub fn has_image_shape(&self) -> bool {
        self.pixels.len() == PIXELS_PER_IMAGE
    }
}
