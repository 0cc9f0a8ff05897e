// ============================================================
// Layer 2 — Summary Use Case
// ============================================================
// Lists every convolution layer of the network and the tensor
// shape after the stem and after each stage, obtained by
// running one (1, 224, 224, 3) input through the network in
// predict mode.

use burn::{backend::wgpu::WgpuDevice, prelude::*};

use crate::domain::mode::Mode;
use crate::domain::topology::{IMAGE_CHANNELS, IMAGE_SIZE, RESNET50_STAGES};
use crate::ml::model::{reshape_input, resnet50};

type MyBackend = burn::backend::Wgpu;

#[derive(Debug, Clone)]
pub struct ArchitectureSummary {
    pub layer_names:  Vec<String>,
    /// ("stem", dims), ("stage2", dims), ...
    pub stage_shapes: Vec<(String, [usize; 4])>,
    pub logits_shape: [usize; 2],
}

pub struct SummaryUseCase;

impl SummaryUseCase {
    pub fn execute(&self) -> ArchitectureSummary {
        let device = WgpuDevice::default();
        let model  = resnet50::<MyBackend>(&device);

        let features = Tensor::<MyBackend, 4>::zeros(
            [1, IMAGE_SIZE, IMAGE_SIZE, IMAGE_CHANNELS], &device,
        );
        let input   = reshape_input(features);
        let outputs = model.forward_stages(input.clone(), Mode::Predict);

        let mut stage_shapes = vec![("stem".to_string(), outputs.stem.dims())];
        for (spec, output) in RESNET50_STAGES.iter().zip(outputs.stages.iter()) {
            stage_shapes.push((format!("stage{}", spec.stage), output.dims()));
        }

        let logits_shape = model.forward(input, Mode::Predict).dims();

        ArchitectureSummary { layer_names: model.layer_names(), stage_shapes, logits_shape }
    }
}
