use crate::foundation::error::{FilmstripError, FilmstripResult};

/// Device-pixel dimensions of a rendering surface.
///
/// The player recomputes this on every viewport resize from the CSS box size
/// and the device pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SurfaceSize {
    /// Width in device pixels.
    pub width: u32,
    /// Height in device pixels.
    pub height: u32,
}

impl SurfaceSize {
    /// Create a validated size with non-zero dimensions.
    pub fn new(width: u32, height: u32) -> FilmstripResult<Self> {
        if width == 0 || height == 0 {
            return Err(FilmstripError::validation(
                "SurfaceSize dimensions must be > 0",
            ));
        }
        Ok(Self { width, height })
    }

    /// Derive device-pixel dimensions from a CSS box size and pixel ratio.
    ///
    /// Rounds to the nearest device pixel; a box that rounds to zero in
    /// either dimension is rejected.
    pub fn from_css(css_width: f64, css_height: f64, device_pixel_ratio: f64) -> FilmstripResult<Self> {
        if !css_width.is_finite() || !css_height.is_finite() || !device_pixel_ratio.is_finite() {
            return Err(FilmstripError::validation(
                "SurfaceSize css dimensions must be finite",
            ));
        }
        if css_width <= 0.0 || css_height <= 0.0 || device_pixel_ratio <= 0.0 {
            return Err(FilmstripError::validation(
                "SurfaceSize css dimensions must be > 0",
            ));
        }
        let w = (css_width * device_pixel_ratio).round();
        let h = (css_height * device_pixel_ratio).round();
        Self::new(w as u32, h as u32)
    }
}

/// Clamp a playback progress scalar into `[0, 1]`.
///
/// NaN maps to `0.0` so a corrupt upstream value degrades to the first frame
/// instead of poisoning index math.
pub fn clamp_progress(progress: f64) -> f64 {
    if progress.is_nan() {
        return 0.0;
    }
    progress.clamp(0.0, 1.0)
}

/// Map a progress scalar to a discrete frame index in a sequence of `len`.
///
/// Uses floor semantics (`floor(progress * len)`) clamped to `len - 1`, so
/// `progress == 1.0` selects the last frame. Returns `None` for an empty
/// sequence.
pub fn frame_index(progress: f64, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let raw = (clamp_progress(progress) * len as f64).floor() as usize;
    Some(raw.min(len - 1))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
