// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types describing the network and its runs.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain structs, enums and constants
//
// The ML layer turns these descriptions into Burn modules;
// the application layer reports them.

// Execution mode (train / eval / predict)
pub mod mode;

// Stage and block specifications of the fixed ResNet-50 topology
pub mod topology;

// Running-average accuracy
pub mod accuracy;

// Optimiser step counter
pub mod global_step;

// One labelled image in NHWC layout
pub mod sample;
