use crate::foundation::core::clamp_progress;
use crate::foundation::error::{FilmstripError, FilmstripResult};

/// A scroll-tracked document region mapped to normalized progress.
///
/// Progress is 0.0 when the region's top edge meets the viewport top and 1.0
/// when the region's bottom edge meets the viewport bottom, matching the
/// `["start start", "end end"]` tracking convention of the host page. All
/// coordinates are in the same unit (CSS pixels of the document).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollRegion {
    /// Document offset of the region's top edge.
    pub top: f64,
    /// Total region height.
    pub height: f64,
    /// Viewport height.
    pub viewport_height: f64,
}

impl ScrollRegion {
    /// Create a validated region.
    pub fn new(top: f64, height: f64, viewport_height: f64) -> FilmstripResult<Self> {
        if !top.is_finite() || !height.is_finite() || !viewport_height.is_finite() {
            return Err(FilmstripError::validation(
                "ScrollRegion coordinates must be finite",
            ));
        }
        if height <= 0.0 || viewport_height <= 0.0 {
            return Err(FilmstripError::validation(
                "ScrollRegion heights must be > 0",
            ));
        }
        Ok(Self {
            top,
            height,
            viewport_height,
        })
    }

    /// Scrollable extent of the region: how far the viewport travels between
    /// progress 0 and progress 1.
    pub fn extent(&self) -> f64 {
        self.height - self.viewport_height
    }

    /// Map a document scroll offset to progress in `[0, 1]`.
    ///
    /// A region no taller than the viewport has no scrollable extent; any
    /// offset at or past its top maps to 1.0.
    pub fn progress_at(&self, scroll_y: f64) -> f64 {
        let extent = self.extent();
        if extent <= 0.0 {
            return if scroll_y >= self.top { 1.0 } else { 0.0 };
        }
        clamp_progress((scroll_y - self.top) / extent)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/scroll.rs"]
mod tests;
