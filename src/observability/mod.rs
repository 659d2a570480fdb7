//! Observability subsystem.
//!
//! Every run logs through `tracing`; the binary wraps the run in a span
//! carrying a run ID so interleaved logs from several deployments can be
//! told apart.

pub mod logging;

pub use logging::init_logging;
