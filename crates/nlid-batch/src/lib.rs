// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]
//! Sliding-window batch runs of the NLID engine over many column sources.
//!
//! [`run_batch`] runs synchronously under an
//! [`ExecutionContext`](nlid_core::ExecutionContext); [`BatchWorker`] and
//! [`spawn_batch`] run the same loop on a background thread and hand back a
//! cancellable [`BatchHandle`].

pub mod config;
pub mod orchestrator;
pub mod result;
pub mod source;
pub mod worker;

pub use config::{NlidConfig, window_starts};
pub use orchestrator::{analyze_pair, run_batch};
pub use result::{BatchResult, FailureRecord, FileResult, PairAnalysis, WindowRecord};
pub use source::{ColumnPair, ColumnSource, InMemorySource};
pub use worker::{BatchHandle, BatchWorker, spawn_batch};
