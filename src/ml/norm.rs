// ============================================================
// Layer 5 — Mode-aware Batch Normalisation
// ============================================================
// Burn's own BatchNorm picks train vs inference behaviour from
// the backend (`B::ad_enabled()`). The residual blocks need the
// choice to follow the model-function mode instead, so this
// layer takes the mode as an argument:
//
//   Mode::Train          → normalise with the batch mean/variance
//                          and fold them into the running estimates
//   Mode::Eval | Predict → normalise with the running estimates only
//
// Running estimates decay as
//   running = momentum · running + (1 − momentum) · batch
// with momentum 0.99 and epsilon 1e-3 by default.
//
// Statistics are per channel over (N, H, W) of an NCHW tensor.

use burn::{
    module::{Param, RunningState},
    prelude::*,
};

use crate::domain::mode::Mode;

#[derive(Config, Debug)]
pub struct BatchNorm2dConfig {
    pub num_features: usize,
    #[config(default = 0.99)]
    pub momentum: f64,
    #[config(default = 1e-3)]
    pub epsilon: f64,
}

impl BatchNorm2dConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> BatchNorm2d<B> {
        let n = self.num_features;
        BatchNorm2d {
            gamma:        Param::from_tensor(Tensor::ones([n], device)),
            beta:         Param::from_tensor(Tensor::zeros([n], device)),
            running_mean: RunningState::new(Tensor::zeros([n], device)),
            running_var:  RunningState::new(Tensor::ones([n], device)),
            momentum:     self.momentum,
            epsilon:      self.epsilon,
        }
    }
}

#[derive(Module, Debug)]
pub struct BatchNorm2d<B: Backend> {
    pub gamma:        Param<Tensor<B, 1>>,
    pub beta:         Param<Tensor<B, 1>>,
    pub running_mean: RunningState<Tensor<B, 1>>,
    pub running_var:  RunningState<Tensor<B, 1>>,
    pub momentum:     f64,
    pub epsilon:      f64,
}

impl<B: Backend> BatchNorm2d<B> {
    /// x: [batch, channels, height, width] → same shape
    pub fn forward(&self, x: Tensor<B, 4>, mode: Mode) -> Tensor<B, 4> {
        if mode.is_training() {
            self.forward_train(x)
        } else {
            self.forward_inference(x)
        }
    }

    fn forward_train(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let [batch, channels, height, width] = x.dims();
        let device = x.device();

        let flat = x.clone()
            .swap_dims(0, 1)
            .reshape([channels, batch * height * width]);
        let mean = flat.clone().mean_dim(1); // [C, 1]
        let var  = flat.sub(mean.clone()).powf_scalar(2.0).mean_dim(1);
        let mean = mean.reshape([channels]);
        let var  = var.reshape([channels]);

        let running_mean = self.running_mean.value_sync().to_device(&device)
            .mul_scalar(self.momentum)
            .add(mean.clone().detach().mul_scalar(1.0 - self.momentum));
        let running_var = self.running_var.value_sync().to_device(&device)
            .mul_scalar(self.momentum)
            .add(var.clone().detach().mul_scalar(1.0 - self.momentum));
        self.running_mean.update(running_mean.detach());
        self.running_var.update(running_var.detach());

        self.normalize(x, mean, var)
    }

    fn forward_inference(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let device = x.device();
        let mean = self.running_mean.value_sync().to_device(&device);
        let var  = self.running_var.value_sync().to_device(&device);
        self.normalize(x, mean, var)
    }

    fn normalize(&self, x: Tensor<B, 4>, mean: Tensor<B, 1>, var: Tensor<B, 1>) -> Tensor<B, 4> {
        let [channels] = mean.dims();
        let shape = [1, channels, 1, 1];

        let std = var.add_scalar(self.epsilon).sqrt().reshape(shape);
        let x = x.sub(mean.reshape(shape)).div(std);

        x.mul(self.gamma.val().reshape(shape))
            .add(self.beta.val().reshape(shape))
    }
}
