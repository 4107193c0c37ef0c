//! CPU compositing of decoded frames onto an RGBA8 surface.

/// Cover-fit transform computation.
pub mod fit;
/// Owned pixel surface and the sampling blit.
pub mod surface;
