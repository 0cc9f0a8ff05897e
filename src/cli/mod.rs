// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and routes each subcommand to its
// use case in Layer 2. No computation happens here.

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, PredictArgs, TrainArgs};

use crate::application::train_use_case::RunConfig;
use crate::infra::config_store::ConfigStore;

#[derive(Parser, Debug)]
#[command(
    name = "face-resnet",
    version = "0.1.0",
    about = "ResNet-50 face classifier (8,631 identities): train, predict, inspect."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => Self::run_train(args),
            Commands::Predict(args) => Self::run_predict(args),
            Commands::Summary       => Self::run_summary(),
        }
    }

    fn run_train(args: TrainArgs) -> Result<()> {
        use crate::application::train_use_case::TrainUseCase;

        let config: RunConfig = match &args.config {
            Some(path) => {
                tracing::info!("Loading run config from '{}'", path.display());
                ConfigStore::load_config(path)?
            }
            None => args.into(),
        };

        tracing::info!(
            "Starting training: {} epochs × {} steps, batch size {}",
            config.epochs, config.steps_per_epoch, config.batch_size,
        );
        TrainUseCase::new(config).execute()?;

        println!("Training complete.");
        Ok(())
    }

    fn run_predict(args: PredictArgs) -> Result<()> {
        use crate::application::predict_use_case::PredictUseCase;

        let predictions = PredictUseCase::new(args.batch_size, args.seed).execute()?;
        for p in &predictions {
            println!("image {:>3} → class {:>4} (p={:.6})", p.index, p.class, p.probability);
        }
        Ok(())
    }

    fn run_summary() -> Result<()> {
        use crate::application::summary_use_case::SummaryUseCase;

        let summary = SummaryUseCase.execute();

        println!("Layers ({}):", summary.layer_names.len());
        for name in &summary.layer_names {
            println!("  {name}");
        }
        println!("\nShapes (NCHW):");
        for (stage, dims) in &summary.stage_shapes {
            println!("  {stage:<7} {dims:?}");
        }
        println!("  logits  {:?}", summary.logits_shape);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_train_flags_map_to_run_config() {
        let cli = Cli::try_parse_from([
            "face-resnet", "train", "--batch-size", "2", "--epochs", "1", "--seed", "7",
        ]).unwrap();

        let Commands::Train(args) = cli.command else {
            panic!("expected the train subcommand");
        };
        assert!(args.config.is_none());

        let cfg: RunConfig = args.into();
        assert_eq!(cfg.batch_size, 2);
        assert_eq!(cfg.epochs, 1);
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.steps_per_epoch, 16);
    }

    #[test]
    fn test_learning_rate_is_not_a_flag() {
        let parsed = Cli::try_parse_from(["face-resnet", "train", "--lr", "0.1"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_summary_takes_no_arguments() {
        let cli = Cli::try_parse_from(["face-resnet", "summary"]).unwrap();
        assert!(matches!(cli.command, Commands::Summary));
    }
}
