// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the subcommands `train`, `predict` and `summary`
// and all their configurable flags.
//
// The learning rate is deliberately absent: the model function
// fixes it at 0.001.

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::train_use_case::RunConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train ResNet-50 on synthetic batches, evaluating after every epoch
    Train(TrainArgs),

    /// Run predict mode on a synthetic batch and print the classes
    Predict(PredictArgs),

    /// Print layer names and per-stage tensor shapes
    Summary,
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// JSON run config; when given, the flags below are ignored
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory for run_config.json and metrics.csv
    #[arg(long, default_value = "runs")]
    pub output_dir: String,

    /// Images per gradient step
    #[arg(long, default_value_t = 8)]
    pub batch_size: usize,

    /// Number of train + evaluate rounds
    #[arg(long, default_value_t = 2)]
    pub epochs: usize,

    /// Gradient steps per epoch
    #[arg(long, default_value_t = 16)]
    pub steps_per_epoch: usize,

    /// Evaluation batches per epoch
    #[arg(long, default_value_t = 4)]
    pub eval_steps: usize,

    /// Seeds parameter initialisation, synthetic data and shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Convert CLI TrainArgs into the application-layer RunConfig.
impl From<TrainArgs> for RunConfig {
    fn from(a: TrainArgs) -> Self {
        RunConfig {
            output_dir:      a.output_dir,
            batch_size:      a.batch_size,
            epochs:          a.epochs,
            steps_per_epoch: a.steps_per_epoch,
            eval_steps:      a.eval_steps,
            seed:            a.seed,
        }
    }
}

/// All arguments for the `predict` command
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Number of synthetic images to classify
    #[arg(long, default_value_t = 4)]
    pub batch_size: usize,

    /// Seeds parameter initialisation and the synthetic images
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}
