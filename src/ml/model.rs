use burn::{
    nn::{
        pool::{AvgPool2d, AvgPool2dConfig, MaxPool2d, MaxPool2dConfig},
        Initializer, Linear, LinearConfig, PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::relu,
};

use crate::domain::mode::Mode;
use crate::domain::topology::{
    StageSpec, IMAGE_CHANNELS, IMAGE_SIZE, NUM_CLASSES, RESNET50_STAGES, STEM_FILTERS,
    STEM_NAME,
};
use crate::ml::blocks::{conv2d, BlockBuilder, ConvBlock, IdentityBlock};
use crate::ml::norm::BatchNorm2d;

const STEM_KERNEL: usize = 7;
const STEM_STRIDE: usize = 2;

/// TF-style SAME padding as (before, after): the output is
/// ceil(size / stride) and any odd remainder goes after.
/// For the 224 stem this is (2, 3), not a symmetric 3.
pub fn same_padding(size: usize, kernel: usize, stride: usize) -> (usize, usize) {
    let out   = size.div_ceil(stride);
    let total = ((out - 1) * stride + kernel).saturating_sub(size);
    (total / 2, total - total / 2)
}

/// Zero-pads [N, C, H, W] for the 7×7/2 stem convolution.
pub(crate) fn pad_stem_input<B: Backend>(x: Tensor<B, 4>) -> Tensor<B, 4> {
    let [_, _, height, width] = x.dims();
    let (top, bottom) = same_padding(height, STEM_KERNEL, STEM_STRIDE);
    let (left, right) = same_padding(width, STEM_KERNEL, STEM_STRIDE);
    x.pad((left, right, top, bottom), 0.0f32.elem::<B::FloatElem>())
}

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
// The topology itself is fixed; only the head width and batch-norm
// constants are exposed.
#[derive(Config, Debug)]
pub struct ResNet50Config {
    #[config(default = 8631)]
    pub num_classes: usize,
    #[config(default = 0.99)]
    pub bn_momentum: f64,
    #[config(default = 1e-3)]
    pub bn_epsilon:  f64,
}

impl ResNet50Config {
    pub fn init<B: Backend>(&self, device: &B::Device) -> ResNet50<B> {
        let builder = BlockBuilder::new(self.bn_momentum, self.bn_epsilon);

        // padded in `stem`, see `same_padding`
        let stem_conv = conv2d(
            [IMAGE_CHANNELS, STEM_FILTERS], STEM_KERNEL, STEM_STRIDE,
            PaddingConfig2d::Valid, false, device,
        );
        let stem_bn   = builder.batch_norm(STEM_FILTERS, device);
        // valid pooling: 112 → 55
        let stem_pool = MaxPool2dConfig::new([3, 3]).with_strides([2, 2]).init();

        let mut in_channels = STEM_FILTERS;
        let stages: Vec<Stage<B>> = RESNET50_STAGES
            .iter()
            .map(|spec| {
                let stage = build_stage(&builder, spec, in_channels, device);
                in_channels = spec.out_channels();
                stage
            })
            .collect();

        // 7×7 → 1×1
        let avg_pool = AvgPool2dConfig::new([7, 7]).with_strides([1, 1]).init();
        let logits = LinearConfig::new(in_channels, self.num_classes)
            .with_initializer(Initializer::XavierUniform { gain: 1.0 })
            .init(device);

        tracing::debug!(
            "ResNet-50 built: {} stages, {} → {} classes",
            stages.len(), in_channels, self.num_classes,
        );
        ResNet50 { stem_conv, stem_bn, stem_pool, stages, avg_pool, logits }
    }
}

fn build_stage<B: Backend>(
    builder:     &BlockBuilder,
    spec:        &StageSpec,
    in_channels: usize,
    device:      &B::Device,
) -> Stage<B> {
    let blocks = spec.block_specs();
    let projection = builder.conv_block(&blocks[0], in_channels, device);
    let identities = blocks[1..]
        .iter()
        .map(|block| builder.identity_block(block, block.out_channels(), device))
        .collect();
    Stage { projection, identities }
}

// ─── Stage ────────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct Stage<B: Backend> {
    pub projection: ConvBlock<B>,
    pub identities: Vec<IdentityBlock<B>>,
}

impl<B: Backend> Stage<B> {
    pub fn forward(&self, x: Tensor<B, 4>, mode: Mode) -> Tensor<B, 4> {
        let mut x = self.projection.forward(x, mode);
        for block in &self.identities {
            x = block.forward(x, mode);
        }
        x
    }

    pub fn layer_names(&self) -> Vec<String> {
        let mut names = self.projection.layer_names();
        for block in &self.identities {
            names.extend(block.layer_names());
        }
        names
    }
}

// ─── ResNet50 ─────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct ResNet50<B: Backend> {
    pub stem_conv: burn::nn::conv::Conv2d<B>,
    pub stem_bn:   BatchNorm2d<B>,
    pub stem_pool: MaxPool2d,
    pub stages:    Vec<Stage<B>>,
    pub avg_pool:  AvgPool2d,
    pub logits:    Linear<B>,
}

/// Every intermediate activation, for shape inspection.
#[derive(Debug, Clone)]
pub struct StageOutputs<B: Backend> {
    /// After the stem max-pool: [N, 64, 55, 55] for 224 input
    pub stem:   Tensor<B, 4>,
    /// Outputs of stages 2, 3, 4 and 5, in order
    pub stages: Vec<Tensor<B, 4>>,
}

/// Raw features (any rank, NHWC order) → [N, 3, 224, 224].
pub fn reshape_input<B: Backend, const D: usize>(features: Tensor<B, D>) -> Tensor<B, 4> {
    features
        .reshape([-1, IMAGE_SIZE as i32, IMAGE_SIZE as i32, IMAGE_CHANNELS as i32])
        .permute([0, 3, 1, 2])
}

impl<B: Backend> ResNet50<B> {
    /// x: [N, 3, H, W] → [N, 64, (ceil(H/2) - 1) / 2, (ceil(W/2) - 1) / 2]
    ///
    /// The 7×7/2 convolution pads asymmetrically (SAME), then a valid
    /// 3×3/2 max pool follows: 224 → 112 → 55.
    pub fn stem(&self, x: Tensor<B, 4>, mode: Mode) -> Tensor<B, 4> {
        let x = pad_stem_input(x);
        let x = relu(self.stem_bn.forward(self.stem_conv.forward(x), mode));
        self.stem_pool.forward(x)
    }

    /// Runs the stem and every stage, keeping each output.
    pub fn forward_stages(&self, x: Tensor<B, 4>, mode: Mode) -> StageOutputs<B> {
        let stem = self.stem(x, mode);
        let mut outputs = Vec::with_capacity(self.stages.len());
        let mut x = stem.clone();
        for stage in &self.stages {
            x = stage.forward(x, mode);
            outputs.push(x.clone());
        }
        StageOutputs { stem, stages: outputs }
    }

    /// x: [N, 3, 224, 224] → logits [N, num_classes]
    pub fn forward(&self, x: Tensor<B, 4>, mode: Mode) -> Tensor<B, 2> {
        let mut x = self.stem(x, mode);
        for stage in &self.stages {
            x = stage.forward(x, mode);
        }
        let x = self.avg_pool.forward(x); // [N, 2048, 1, 1]
        let x = x.flatten::<2>(1, 3);      // [N, 2048]
        self.logits.forward(x)
    }

    pub fn num_classes(&self) -> usize {
        self.logits.weight.dims()[1]
    }

    /// Convolution layer names in construction order.
    pub fn layer_names(&self) -> Vec<String> {
        let mut names = vec![STEM_NAME.to_string()];
        for stage in &self.stages {
            names.extend(stage.layer_names());
        }
        names
    }
}

/// The fixed 8,631-way network.
pub fn resnet50<B: Backend>(device: &B::Device) -> ResNet50<B> {
    ResNet50Config::new().with_num_classes(NUM_CLASSES).init(device)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::tensor::Distribution;

    type TestBackend = burn::backend::NdArray;

    #[test]
    fn test_stage_output_channels() {
        let device = Default::default();
        let model  = resnet50::<TestBackend>(&device);
        // small spatial size keeps the test fast; channels do not depend on it
        let x = Tensor::<TestBackend, 4>::random([1, 3, 64, 64], Distribution::Default, &device);

        let out = model.forward_stages(x, Mode::Predict);

        assert_eq!(out.stem.dims(), [1, 64, 15, 15]);
        let dims: Vec<[usize; 4]> = out.stages.iter().map(|t| t.dims()).collect();
        assert_eq!(dims, vec![
            [1, 256, 15, 15],
            [1, 512, 8, 8],
            [1, 1024, 4, 4],
            [1, 2048, 2, 2],
        ]);
    }

    #[test]
    fn test_same_padding_puts_remainder_after() {
        assert_eq!(same_padding(224, 7, 2), (2, 3));
        assert_eq!(same_padding(64, 7, 2), (2, 3));
        assert_eq!(same_padding(225, 7, 2), (3, 3));
        assert_eq!(same_padding(55, 3, 1), (1, 1));
    }

    #[test]
    fn test_stem_on_full_resolution() {
        let device = Default::default();
        let model  = resnet50::<TestBackend>(&device);
        let x = Tensor::<TestBackend, 4>::random([1, 3, 224, 224], Distribution::Default, &device);

        assert_eq!(model.stem(x, Mode::Eval).dims(), [1, 64, 55, 55]);
    }

    #[test]
    fn test_stem_padding_is_asymmetric() {
        let device = Default::default();
        let mut model = resnet50::<TestBackend>(&device);
        // single tap on the kernel centre: each output samples the padded
        // input at (2·i + 3), i.e. the original pixel (2·i + 1) after
        // 2 rows/columns of leading padding
        let mut weight = vec![0.0f32; STEM_FILTERS * IMAGE_CHANNELS * 49];
        weight[3 * 7 + 3] = 1.0;
        model.stem_conv.weight = burn::module::Param::from_tensor(
            Tensor::<TestBackend, 1>::from_floats(weight.as_slice(), &device)
                .reshape([STEM_FILTERS, IMAGE_CHANNELS, 7, 7]),
        );

        let mut pixels = vec![0.0f32; 3 * 16 * 16];
        pixels[16 + 1] = 1.0; // channel 0, row 1, column 1
        let x = Tensor::<TestBackend, 1>::from_floats(pixels.as_slice(), &device)
            .reshape([1, 3, 16, 16]);

        let conv = model.stem_conv.forward(pad_stem_input(x));
        assert_eq!(conv.dims(), [1, 64, 8, 8]);
        let hit = conv.slice([0..1, 0..1, 0..1, 0..1]).into_scalar().elem::<f32>();
        assert_eq!(hit, 1.0);
    }

    #[test]
    fn test_head_width() {
        let device = Default::default();
        let model  = resnet50::<TestBackend>(&device);
        assert_eq!(model.num_classes(), 8631);
    }

    #[test]
    fn test_layer_names_follow_construction_order() {
        let device = Default::default();
        let model  = resnet50::<TestBackend>(&device);
        let names  = model.layer_names();

        // stem + 4 projection blocks × 4 convs + 12 identity blocks × 3 convs
        assert_eq!(names.len(), 1 + 16 + 36);
        assert_eq!(names[0], "conv1/7x7_s2");
        assert_eq!(names[1], "conv2_1_1x1_reduce");
        assert_eq!(names[4], "conv2_1_1x1_proj");
        assert_eq!(names.last().map(String::as_str), Some("conv5_3_1x1_increase"));
    }

    #[test]
    fn test_reshape_input_moves_channels_first() {
        let device = Default::default();
        let mut flat = vec![0.0f32; IMAGE_SIZE * IMAGE_SIZE * IMAGE_CHANNELS];
        // row 1, column 2, channel 1 in NHWC order
        flat[(IMAGE_SIZE + 2) * IMAGE_CHANNELS + 1] = 7.0;
        let features = Tensor::<TestBackend, 1>::from_floats(flat.as_slice(), &device)
            .reshape([1, IMAGE_SIZE * IMAGE_SIZE * IMAGE_CHANNELS]);

        let x = reshape_input(features);

        assert_eq!(x.dims(), [1, 3, 224, 224]);
        let value = x.slice([0..1, 1..2, 1..2, 2..3]).into_scalar().elem::<f32>();
        assert_eq!(value, 7.0);
    }
}
