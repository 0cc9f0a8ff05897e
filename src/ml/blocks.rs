// ============================================================
// Layer 5 — Residual Bottleneck Blocks
// ============================================================
// Both block kinds share the same three-convolution main path:
//
//   1×1 conv (f1, stride s) → BN → ReLU
//   3×3 conv (f2, stride 1, same padding) → BN → ReLU
//   1×1 conv (f3, stride 1) → BN
//
// ConvBlock     — first block of a stage; the shortcut is a
//                 1×1 conv (f3, stride s) → BN so that channel
//                 count and resolution match the main path.
// IdentityBlock — remaining blocks; the raw input is the
//                 shortcut, so input channels must equal f3.
//
// output = ReLU(main + shortcut)
//
// Every batch-norm call receives the active Mode.
//
// Reference: He et al. (2016) Deep Residual Learning, §4.1

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        Initializer, PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::relu,
};

use crate::domain::mode::Mode;
use crate::domain::topology::{block_name, BlockSpec};
use crate::ml::norm::{BatchNorm2d, BatchNorm2dConfig};

/// Square convolution with Glorot-uniform weights.
pub(crate) fn conv2d<B: Backend>(
    channels: [usize; 2],
    kernel:   usize,
    stride:   usize,
    padding:  PaddingConfig2d,
    bias:     bool,
    device:   &B::Device,
) -> Conv2d<B> {
    Conv2dConfig::new(channels, [kernel, kernel])
        .with_stride([stride, stride])
        .with_padding(padding)
        .with_bias(bias)
        .with_initializer(Initializer::XavierUniform { gain: 1.0 })
        .init(device)
}

// ─── BlockBuilder ─────────────────────────────────────────────────────────────
/// Builds blocks from a BlockSpec with shared batch-norm settings.
#[derive(Debug, Clone, Copy)]
pub struct BlockBuilder {
    pub bn_momentum: f64,
    pub bn_epsilon:  f64,
}

impl BlockBuilder {
    pub fn new(bn_momentum: f64, bn_epsilon: f64) -> Self {
        Self { bn_momentum, bn_epsilon }
    }

    pub(crate) fn batch_norm<B: Backend>(&self, channels: usize, device: &B::Device) -> BatchNorm2d<B> {
        BatchNorm2dConfig::new(channels)
            .with_momentum(self.bn_momentum)
            .with_epsilon(self.bn_epsilon)
            .init(device)
    }

    fn bottleneck<B: Backend>(
        &self,
        spec:        &BlockSpec,
        in_channels: usize,
        increase_bias: bool,
        device:      &B::Device,
    ) -> Bottleneck<B> {
        let [f1, f2, f3] = spec.filters;
        Bottleneck {
            reduce:      conv2d([in_channels, f1], 1, spec.stride, PaddingConfig2d::Valid, false, device),
            reduce_bn:   self.batch_norm(f1, device),
            conv3x3:     conv2d([f1, f2], 3, 1, PaddingConfig2d::Same, false, device),
            conv3x3_bn:  self.batch_norm(f2, device),
            increase:    conv2d([f2, f3], 1, 1, PaddingConfig2d::Valid, increase_bias, device),
            increase_bn: self.batch_norm(f3, device),
        }
    }

    /// Projection block. Its 1×1 increase convolution is the only
    /// convolution in the network with a bias.
    pub fn conv_block<B: Backend>(
        &self,
        spec:        &BlockSpec,
        in_channels: usize,
        device:      &B::Device,
    ) -> ConvBlock<B> {
        let f3 = spec.out_channels();
        tracing::debug!("Building {} (projection, stride {})", spec.name(), spec.stride);
        ConvBlock {
            main:    self.bottleneck(spec, in_channels, true, device),
            proj:    conv2d([in_channels, f3], 1, spec.stride, PaddingConfig2d::Valid, false, device),
            proj_bn: self.batch_norm(f3, device),
            stage:   spec.stage,
            block:   spec.block,
        }
    }

    /// Identity block. `in_channels` is whatever the caller feeds in;
    /// it only lines up with the shortcut when it equals f3.
    pub fn identity_block<B: Backend>(
        &self,
        spec:        &BlockSpec,
        in_channels: usize,
        device:      &B::Device,
    ) -> IdentityBlock<B> {
        tracing::debug!("Building {} (identity)", spec.name());
        let spec = BlockSpec { stride: 1, ..*spec };
        IdentityBlock {
            main:  self.bottleneck(&spec, in_channels, false, device),
            stage: spec.stage,
            block: spec.block,
        }
    }
}

// ─── Bottleneck (shared main path) ────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct Bottleneck<B: Backend> {
    pub reduce:      Conv2d<B>,
    pub reduce_bn:   BatchNorm2d<B>,
    pub conv3x3:     Conv2d<B>,
    pub conv3x3_bn:  BatchNorm2d<B>,
    pub increase:    Conv2d<B>,
    pub increase_bn: BatchNorm2d<B>,
}

impl<B: Backend> Bottleneck<B> {
    /// Main path up to (not including) the final rectification.
    pub fn forward(&self, x: Tensor<B, 4>, mode: Mode) -> Tensor<B, 4> {
        let x = relu(self.reduce_bn.forward(self.reduce.forward(x), mode));
        let x = relu(self.conv3x3_bn.forward(self.conv3x3.forward(x), mode));
        self.increase_bn.forward(self.increase.forward(x), mode)
    }
}

fn main_path_names(name: &str) -> Vec<String> {
    ["_1x1_reduce", "_3x3", "_1x1_increase"]
        .iter()
        .map(|suffix| format!("{name}{suffix}"))
        .collect()
}

// ─── ConvBlock ────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct ConvBlock<B: Backend> {
    pub main:    Bottleneck<B>,
    pub proj:    Conv2d<B>,
    pub proj_bn: BatchNorm2d<B>,
    pub stage:   usize,
    pub block:   usize,
}

impl<B: Backend> ConvBlock<B> {
    pub fn forward(&self, x: Tensor<B, 4>, mode: Mode) -> Tensor<B, 4> {
        let shortcut = self.proj_bn.forward(self.proj.forward(x.clone()), mode);
        relu(self.main.forward(x, mode).add(shortcut))
    }

    pub fn name(&self) -> String {
        block_name(self.stage, self.block)
    }

    pub fn layer_names(&self) -> Vec<String> {
        let name = self.name();
        let mut names = main_path_names(&name);
        names.push(format!("{name}_1x1_proj"));
        names
    }
}

// ─── IdentityBlock ────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct IdentityBlock<B: Backend> {
    pub main:  Bottleneck<B>,
    pub stage: usize,
    pub block: usize,
}

impl<B: Backend> IdentityBlock<B> {
    /// Panics (Burn shape check) when the input channel count differs from f3.
    pub fn forward(&self, x: Tensor<B, 4>, mode: Mode) -> Tensor<B, 4> {
        relu(self.main.forward(x.clone(), mode).add(x))
    }

    pub fn name(&self) -> String {
        block_name(self.stage, self.block)
    }

    pub fn layer_names(&self) -> Vec<String> {
        main_path_names(&self.name())
    }
}
