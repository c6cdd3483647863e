// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands: `validate`, `train` and
// `predict`, and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, PathBuf, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;
use crate::data::splitter::SplitFractions;
use crate::domain::labels::DEFAULT_THRESHOLD;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Report unsupported or unreadable files in the image tree
    Validate(ValidateArgs),

    /// Validate, train, evaluate and save the classifier
    Train(TrainArgs),

    /// Classify one image with a saved model
    Predict(PredictArgs),
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Directory with one subfolder per class
    #[arg(long, default_value = "data/images")]
    pub data_dir: PathBuf,
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory with one subfolder per class (sorted names → labels 0, 1)
    #[arg(long, default_value = "data/images")]
    pub data_dir: PathBuf,

    /// Directory to save the model, its config and labels
    #[arg(long, default_value = "models")]
    pub model_dir: PathBuf,

    /// Directory where metrics.csv is appended
    #[arg(long, default_value = "logs")]
    pub log_dir: PathBuf,

    /// File name of the saved weights (without extension)
    #[arg(long, default_value = "imageclassifier")]
    pub model_name: String,

    /// Number of images processed together in one forward pass
    #[arg(long, default_value_t = 10)]
    pub batch_size: usize,

    /// Number of full passes through the training share
    #[arg(long, default_value_t = 20)]
    pub epochs: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Side length images are resized to (minimum 22)
    #[arg(long, default_value_t = 256)]
    pub image_size: usize,

    /// Share of batches used for training
    #[arg(long, default_value_t = 0.7)]
    pub train_fraction: f64,

    /// Share of batches used for validation (plus one batch)
    #[arg(long, default_value_t = 0.2)]
    pub val_fraction: f64,

    /// Share of batches held out for testing (plus one batch)
    #[arg(long, default_value_t = 0.1)]
    pub test_fraction: f64,

    /// Seed for the dataset shuffle
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Image to classify after training, with the fresh and the reloaded model
    #[arg(long)]
    pub demo_image: Option<PathBuf>,

    /// Run on the CPU (NdArray backend) instead of the default GPU
    #[arg(long)]
    pub cpu: bool,
}

/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir:   a.data_dir,
            model_dir:  a.model_dir,
            log_dir:    a.log_dir,
            model_name: a.model_name,
            batch_size: a.batch_size,
            epochs:     a.epochs,
            lr:         a.lr,
            image_size: a.image_size,
            fractions:  SplitFractions {
                train: a.train_fraction,
                val:   a.val_fraction,
                test:  a.test_fraction,
            },
            threshold:  DEFAULT_THRESHOLD,
            seed:       a.seed,
            demo_image: a.demo_image,
            use_cpu:    a.cpu,
        }
    }
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Image file to classify
    #[arg(long)]
    pub image: PathBuf,

    /// Directory where `train` saved the model
    #[arg(long, default_value = "models")]
    pub model_dir: PathBuf,

    /// Run on the CPU (NdArray backend) instead of the default GPU
    #[arg(long)]
    pub cpu: bool,
}
