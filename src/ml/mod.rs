// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains the Burn-specific model code.
// The domain layer stays framework-free; data/ only touches
// Burn through the Dataset and Batcher traits.
//
//   norm.rs      — batch normalisation driven by an explicit Mode
//   blocks.rs    — projection (conv) and identity bottleneck blocks
//   model.rs     — stem, four stages, average pool, 8,631-way head
//   model_fn.rs  — the train / eval / predict model function
//   estimator.rs — batch loops around the model function
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            He et al. (2016) Deep Residual Learning

/// Batch normalisation with explicit train / inference switch
pub mod norm;

/// Residual bottleneck blocks
pub mod blocks;

/// ResNet-50 architecture
pub mod model;

/// Mode dispatch: predictions, loss + train op, loss + metrics
pub mod model_fn;

/// Train / evaluate / predict drivers
pub mod estimator;
