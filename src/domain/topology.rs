// ============================================================
// Layer 3 — ResNet-50 Topology
// ============================================================
// The network is a fixed table of four stages. Each stage
// starts with a projection block (which may downsample) and
// continues with identity blocks of the same filter sizes:
//
//   stage  filters             stride  blocks  out channels
//   2      [ 64,  64,  256]    1       3       256
//   3      [128, 128,  512]    2       4       512
//   4      [256, 256, 1024]    2       6       1024
//   5      [512, 512, 2048]    2       3       2048
//
// Block names follow the conv{stage}_{block} convention used
// by the published VGGFace2 ResNet-50 weights.
//
// Reference: He et al. (2016) Deep Residual Learning
//            Cao et al. (2018) VGGFace2

/// Number of identities the classifier separates.
pub const NUM_CLASSES: usize = 8631;

/// Input images are square, NHWC.
pub const IMAGE_SIZE: usize = 224;
pub const IMAGE_CHANNELS: usize = 3;

/// Number of floats in one input image.
pub const PIXELS_PER_IMAGE: usize = IMAGE_SIZE * IMAGE_SIZE * IMAGE_CHANNELS;

/// Output channels of the 7×7 stem convolution.
pub const STEM_FILTERS: usize = 64;

/// Name of the stem convolution layer.
pub const STEM_NAME: &str = "conv1/7x7_s2";

// ─── BlockSpec ────────────────────────────────────────────────────────────────
/// Parameterisation of one bottleneck block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpec {
    /// Filter counts of the 1×1, 3×3 and 1×1 convolutions
    pub filters: [usize; 3],
    pub stage:   usize,
    /// 1-based position inside the stage
    pub block:   usize,
    pub stride:  usize,
}

impl BlockSpec {
    pub fn new(filters: [usize; 3], stage: usize, block: usize, stride: usize) -> Self {
        Self { filters, stage, block, stride }
    }

    /// e.g. "conv3_1"
    pub fn name(&self) -> String {
        block_name(self.stage, self.block)
    }

    pub fn out_channels(&self) -> usize {
        self.filters[2]
    }
}

pub fn block_name(stage: usize, block: usize) -> String {
    format!("conv{stage}_{block}")
}

// ─── StageSpec ────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSpec {
    pub stage:   usize,
    pub filters: [usize; 3],
    /// Stride of the projection block; identity blocks always use 1
    pub stride:  usize,
    pub blocks:  usize,
}

impl StageSpec {
    pub const fn new(stage: usize, filters: [usize; 3], stride: usize, blocks: usize) -> Self {
        Self { stage, filters, stride, blocks }
    }

    /// Expand into one projection block followed by identity blocks.
    pub fn block_specs(&self) -> Vec<BlockSpec> {
        (1..=self.blocks)
            .map(|block| {
                let stride = if block == 1 { self.stride } else { 1 };
                BlockSpec::new(self.filters, self.stage, block, stride)
            })
            .collect()
    }

    pub fn out_channels(&self) -> usize {
        self.filters[2]
    }
}

pub const RESNET50_STAGES: [StageSpec; 4] = [
    StageSpec::new(2, [64, 64, 256], 1, 3),
    StageSpec::new(3, [128, 128, 512], 2, 4),
    StageSpec::new(4, [256, 256, 1024], 2, 6),
    StageSpec::new(5, [512, 512, 2048], 2, 3),
];

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sixteen_bottleneck_blocks() {
        let total: usize = RESNET50_STAGES.iter().map(|s| s.blocks).sum();
        assert_eq!(total, 16);
    }

    #[test]
    fn test_only_first_block_projects_and_strides() {
        let specs = RESNET50_STAGES[1].block_specs();
        assert_eq!(specs.len(), 4);
        assert_eq!(specs[0].block, 1);
        assert_eq!(specs[0].stride, 2);
        for spec in &specs[1..] {
            assert_ne!(spec.block, 1);
            assert_eq!(spec.stride, 1);
        }
    }

    #[test]
    fn test_stage_two_keeps_resolution() {
        let first = RESNET50_STAGES[0].block_specs()[0];
        assert_eq!(first.stride, 1);
        assert_eq!(first.filters, [64, 64, 256]);
    }

    #[test]
    fn test_stage_output_channels() {
        let channels: Vec<usize> = RESNET50_STAGES.iter().map(|s| s.out_channels()).collect();
        assert_eq!(channels, vec![256, 512, 1024, 2048]);
    }

    #[test]
    fn test_block_names() {
        let specs = RESNET50_STAGES[2].block_specs();
        assert_eq!(specs[0].name(), "conv4_1");
        assert_eq!(specs[5].name(), "conv4_6");
    }
}
