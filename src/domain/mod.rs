// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums and traits describing what the
// classifier works with. No Burn types and no file I/O here,
// so everything in this layer is testable without a device.

// An image file on disk and its class
pub mod sample;

// Sorted class names, the decision rule and predictions
pub mod labels;

// Streaming precision / recall / accuracy counts
pub mod evaluation;

// Core abstractions (traits) that other layers implement
pub mod traits;
