// ============================================================
// Layer 2 — Application Layer
// ============================================================
// One use case per CLI command. Each use case wires the data,
// ml and infra layers together and knows nothing about clap.

/// Train + evaluate on synthetic batches, log metrics
pub mod train_use_case;

/// Predict-mode smoke run
pub mod predict_use_case;

/// Layer names and per-stage shapes
pub mod summary_use_case;
