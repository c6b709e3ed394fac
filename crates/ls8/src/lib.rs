//! Host-side collaborators for the LS-8 core: program loading, output and
//! paced execution.

use env_logger as _;
use serde_json as _;

/// Program image parsing and loading.
pub mod loader;
/// Output device backed by any byte writer.
pub mod output;
/// Fixed-cadence driver for single-step execution.
pub mod scheduler;
