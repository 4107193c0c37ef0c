//! Shared primitives: progress math, surface sizing, and the crate error type.

/// Core value types and progress/index math.
pub mod core;
/// Crate-wide error and result types.
pub mod error;
