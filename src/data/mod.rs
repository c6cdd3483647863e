// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// This layer handles everything from the image folder on disk
// all the way to device-ready tensor batches.
//
// The pipeline flows in this order:
//
//   data/images/<class>/<file>
//       │
//       ▼
//   ImageValidator     → reports unsupported / unreadable files
//       │
//       ▼
//   ImageFolderLoader  → sorted class folders → labelled records,
//       │                decoded and resized via the Preprocessor
//       ▼
//   splitter           → seeded shuffle, batch-count split
//       │
//       ▼
//   ImageDataset       → implements Burn's Dataset trait
//       │
//       ▼
//   ImageBatcher       → rescales, HWC → CHW, stacks tensors
//       │
//       ▼
//   DataLoader         → feeds batches to the training loop
//
// Each module is responsible for exactly one step.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Checks every file under the image root before training
pub mod validator;

/// Discovers class folders and decodes images into samples
pub mod loader;

/// RGB conversion, resize, rescale and channel reordering
pub mod preprocessor;

/// Implements Burn's Dataset trait for image samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Shuffles and splits data into train/validation/test by batch count
pub mod splitter;

#[cfg(test)]
pub mod fixtures;
