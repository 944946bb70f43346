// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Core shared types for the NLID engine.

pub mod control;
pub mod diagnostics;
pub mod error;
pub mod execution_context;
pub mod observability;
pub mod signal;

pub use control::CancelToken;
pub use diagnostics::{DIAGNOSTICS_SCHEMA_VERSION, RunDiagnostics};
pub use error::NlidError;
pub use execution_context::ExecutionContext;
pub use observability::{ProgressSink, TelemetrySink};
pub use signal::{SignalView, min_embeddable_len};

/// Engine version string recorded in run diagnostics.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
