use kurbo::Affine;

use crate::foundation::error::{FilmstripError, FilmstripResult};

/// Default overscan multiplier applied on top of the cover scale.
///
/// Slightly over-filling the surface avoids sub-pixel seam artifacts at the
/// edges under fractional device-pixel-ratio scaling.
pub const DEFAULT_OVERSCAN: f64 = 1.03;

/// A computed cover-fit placement: uniform scale plus centering offsets, in
/// surface pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverFit {
    /// Uniform image-to-surface scale factor.
    pub scale: f64,
    /// Horizontal offset of the scaled image's left edge.
    pub dx: f64,
    /// Vertical offset of the scaled image's top edge.
    pub dy: f64,
}

impl CoverFit {
    /// Compute the cover placement of an image inside a surface.
    ///
    /// The image is scaled uniformly by `max(sw/iw, sh/ih) * overscan` so it
    /// fully covers the surface (cropping overflow), then centered.
    pub fn compute(
        surface_width: u32,
        surface_height: u32,
        image_width: u32,
        image_height: u32,
        overscan: f64,
    ) -> FilmstripResult<Self> {
        if surface_width == 0 || surface_height == 0 {
            return Err(FilmstripError::render("cover-fit surface must be non-empty"));
        }
        if image_width == 0 || image_height == 0 {
            return Err(FilmstripError::render("cover-fit image must be non-empty"));
        }
        if !overscan.is_finite() || overscan < 1.0 {
            return Err(FilmstripError::render("cover-fit overscan must be >= 1.0"));
        }

        let sw = f64::from(surface_width);
        let sh = f64::from(surface_height);
        let iw = f64::from(image_width);
        let ih = f64::from(image_height);

        let scale = (sw / iw).max(sh / ih) * overscan;
        Ok(Self {
            scale,
            dx: (sw - iw * scale) / 2.0,
            dy: (sh - ih * scale) / 2.0,
        })
    }

    /// Image-space to surface-space affine map.
    pub fn to_affine(&self) -> Affine {
        Affine::translate((self.dx, self.dy)) * Affine::scale(self.scale)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/fit.rs"]
mod tests;
