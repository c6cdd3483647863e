// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Three commands are supported:
//   1. `validate` — reports problem files in the image tree
//   2. `train`    — full pipeline, ends with a saved model
//   3. `predict`  — loads the saved model and classifies an image
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use burn::tensor::backend::Backend;
use clap::Parser;
use commands::{Commands, PredictArgs, TrainArgs, ValidateArgs};

use crate::domain::traits::ImageClassifier;

#[derive(Parser, Debug)]
#[command(
    name = "signal-classifier",
    version,
    about = "Train a small CNN to tell 'signal' from 'no signal' images, then classify new ones."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Validate(args) => run_validate(args),
            Commands::Train(args)    => run_train(args),
            Commands::Predict(args)  => run_predict(args),
        }
    }
}

fn run_validate(args: ValidateArgs) -> Result<()> {
    use crate::data::validator::ImageValidator;

    let report = ImageValidator::new(&args.data_dir).run()?;
    if report.is_clean() {
        println!("All {} files look fine.", report.checked);
    } else {
        for issue in &report.issues {
            println!("{issue}");
        }
        println!("{} of {} files flagged.", report.issues.len(), report.checked);
    }
    Ok(())
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on images in: {}", args.data_dir.display());

    let outcome = TrainUseCase::new(args.into()).execute()?;

    if !outcome.validation.is_clean() {
        println!(
            "{} of {} files were flagged (run `validate` for details).",
            outcome.validation.issues.len(), outcome.validation.checked
        );
    }
    let s = &outcome.split;
    println!("Batches: {} train, {} validation, {} test", s.train, s.val, s.test);

    let h = &outcome.history;
    println!("Epochs: {}", h.len());
    println!("  accuracy:     {}", format_series(&h.accuracy()));
    println!("  val_accuracy: {}", format_series(&h.val_accuracy()));
    if let Some(last) = h.last() {
        println!("  final train_loss {:.4}, val_loss {:.4}", last.train_loss, last.val_loss);
    }
    if let Some(best) = h.best_epoch() {
        println!("  best validation accuracy {:.4} at epoch {}", best.val_acc, best.epoch);
    }

    let e = &outcome.evaluation;
    println!("Precision: {}, Recall: {}, Accuracy: {}", e.precision, e.recall, e.accuracy);
    println!(
        "Labels: 0 = '{}', 1 = '{}'",
        outcome.labels.name(0).unwrap_or_default(), outcome.labels.positive()
    );

    if let Some(demo) = &outcome.demo {
        println!("Demo image: {}", demo.image.display());
        println!("  score={:.6}  {}", demo.in_memory.score, demo.in_memory.verdict);
        println!("  reloaded score={:.6}  {}", demo.reloaded.score, demo.reloaded.verdict);
        if !demo.consistent() {
            println!("  WARNING: reloaded model disagrees with the trained one");
        }
    }

    println!("Training complete. Model saved to {}", outcome.model_path.display());
    Ok(())
}

fn format_series(values: &[f64]) -> String {
    values.iter().map(|v| format!("{v:.4}")).collect::<Vec<_>>().join(" ")
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::ml::{cpu_device, gpu_device, CpuInferBackend, InferBackend};

    if args.cpu {
        predict_with::<CpuInferBackend>(&args, &cpu_device())
    } else {
        predict_with::<InferBackend>(&args, &gpu_device())
    }
}

fn predict_with<B: Backend>(args: &PredictArgs, device: &B::Device) -> Result<()> {
    use crate::application::predict_use_case::PredictUseCase;

    let use_case   = PredictUseCase::<B>::load(&args.model_dir, device)?;
    let prediction = use_case.classify(&args.image)?;

    println!("Score: {:.6} (label 1 = '{}')", prediction.score, use_case.labels().positive());
    println!("{}", prediction.verdict);
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::TrainConfig;

    #[test]
    fn test_train_defaults_match_config_defaults() {
        let cli = Cli::try_parse_from(["signal-classifier", "train"]).unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };

        let cfg: TrainConfig = args.into();
        let def = TrainConfig::default();
        assert_eq!(cfg.data_dir,   def.data_dir);
        assert_eq!(cfg.batch_size, def.batch_size);
        assert_eq!(cfg.epochs,     def.epochs);
        assert_eq!(cfg.image_size, def.image_size);
        assert_eq!(cfg.fractions,  def.fractions);
        assert_eq!(cfg.seed,       def.seed);
        assert!(!cfg.use_cpu);
    }

    #[test]
    fn test_train_flags_override() {
        let cli = Cli::try_parse_from([
            "signal-classifier", "train",
            "--epochs", "3", "--batch-size", "4", "--image-size", "64",
            "--test-fraction", "0.2", "--demo-image", "demo.png", "--cpu",
        ])
        .unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };

        let cfg: TrainConfig = args.into();
        assert_eq!((cfg.epochs, cfg.batch_size, cfg.image_size), (3, 4, 64));
        assert_eq!(cfg.fractions.test, 0.2);
        assert_eq!(cfg.demo_image.as_deref(), Some(std::path::Path::new("demo.png")));
        assert!(cfg.use_cpu);
    }

    #[test]
    fn test_format_series() {
        assert_eq!(format_series(&[0.5, 0.25]), "0.5000 0.2500");
        assert_eq!(format_series(&[]), "");
    }

    #[test]
    fn test_predict_requires_image() {
        assert!(Cli::try_parse_from(["signal-classifier", "predict"]).is_err());
        assert!(Cli::try_parse_from(["signal-classifier", "predict", "--image", "a.png"]).is_ok());
    }
}
