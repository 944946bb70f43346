// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Phase-space reconstruction, recurrence matrices and the nonlinear
//! interdependence (NLID) coupling measure.
//!
//! Data flows one way: samples are embedded into a [`Trajectory`], the
//! trajectory's pairwise [`DistanceMatrix`] is binarized into a
//! [`RecurrenceMatrix`], and two recurrence matrices of equal size are
//! reduced to a directional [`Coupling`] pair by [`nlid`].
//! [`WindowAnalyzer`] runs the whole chain for one aligned window pair.

pub mod coupling;
pub mod distance;
pub mod embedding;
pub mod recurrence;
pub mod window;

pub use coupling::{Coupling, CouplingReport, nlid};
pub use distance::DistanceMatrix;
pub use embedding::{EmbeddingParams, Trajectory, reconstruct};
pub use recurrence::{
    DEFAULT_THRESHOLD_FRACTION, RecurrenceMatrix, RecurrenceOutput, ThresholdSpec,
    compute_recurrence,
};
pub use window::{WindowAnalysis, WindowAnalyzer, WindowResult};
