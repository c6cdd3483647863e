// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Handles the cross-cutting concerns that don't belong in
// any specific business layer:
//
//   checkpoint.rs — Saving and loading the trained model
//                   Uses Burn's NamedMpkFileRecorder to
//                   serialise parameters at full precision.
//                   Also saves/loads TrainConfig and the class
//                   labels as JSON so inference can rebuild
//                   the model and name its output.
//
//   metrics.rs    — Training metrics logging
//                   Writes epoch-level metrics (loss,
//                   accuracy) to a CSV file for later
//                   analysis and plotting.
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model, config and label persistence
pub mod checkpoint;

/// Training metrics CSV logger and in-memory history
pub mod metrics;
