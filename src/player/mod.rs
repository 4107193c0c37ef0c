//! The sequence player: progress-driven frame selection and surface drawing.

/// Player session, operating modes, and draw statistics.
pub mod session;
