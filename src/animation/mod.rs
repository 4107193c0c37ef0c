//! Scroll-to-progress mapping and spring smoothing.
//!
//! The pipeline is: raw scroll offset → [`scroll::ScrollRegion`] → normalized
//! progress target → [`spring::Spring`] → smoothed progress →
//! [`progress::ProgressStream`] → player callbacks.

/// Explicit observer registration for a live progress value.
pub mod progress;
/// Scroll-offset to normalized-progress mapping for a tracked region.
pub mod scroll;
/// Damped spring smoothing over a scalar value.
pub mod spring;
