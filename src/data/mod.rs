// ============================================================
// Layer 4 — Data
// ============================================================
// Feeds the estimator. Real image pipelines are out of scope;
// inputs are deterministic synthetic images:
//
//   SyntheticDataset  → ImageSample per index (Burn Dataset)
//       │
//       ▼
//   ImageBatcher      → ImageBatch { images NHWC, labels }
//       │
//       ▼
//   DataLoader        → batches for Estimator::train / evaluate
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Seeded synthetic images implementing Burn's Dataset trait
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
