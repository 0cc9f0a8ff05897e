// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// File-system concerns shared by the use cases:
//
//   config_store.rs — RunConfig as JSON (save per run, load
//                     from --config)
//   metrics.rs      — per-epoch loss/accuracy CSV
//
// Reference: Rust Book §9 (Error Handling with anyhow)

/// RunConfig persistence
pub mod config_store;

/// Training metrics CSV logger
pub mod metrics;
