use kurbo::Point;

use crate::assets::fetch::LoadedFrame;
use crate::foundation::core::SurfaceSize;
use crate::foundation::error::{FilmstripError, FilmstripResult};
use crate::render::fit::CoverFit;

/// An owned premultiplied-RGBA8 pixel surface.
///
/// The surface is exclusively owned and mutated by its player; it is cleared
/// before every draw so stale pixels never leak between frames.
#[derive(Clone, Debug)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Surface {
    /// Allocate a cleared surface.
    pub fn new(size: SurfaceSize) -> FilmstripResult<Self> {
        if size.width == 0 || size.height == 0 {
            return Err(FilmstripError::render("surface dimensions must be > 0"));
        }
        let len = size.width as usize * size.height as usize * 4;
        Ok(Self {
            width: size.width,
            height: size.height,
            data: vec![0; len],
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Size in pixels.
    pub fn size(&self) -> SurfaceSize {
        SurfaceSize {
            width: self.width,
            height: self.height,
        }
    }

    /// Pixel bytes, row-major premultiplied RGBA8.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Reset every pixel to transparent black.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Composite a frame under a cover-fit placement.
    ///
    /// Samples the frame with nearest filtering through the inverse of the
    /// placement transform and blends source-over. Destination pixels the
    /// scaled image does not reach are left untouched (with a cover
    /// placement there are none).
    pub fn draw_frame(&mut self, frame: &LoadedFrame, fit: CoverFit) -> FilmstripResult<()> {
        let inverse = fit.to_affine().inverse();
        let src = frame.rgba8_premul.as_slice();
        let expected = frame.width as usize * frame.height as usize * 4;
        if src.len() != expected {
            return Err(FilmstripError::render(
                "frame byte length does not match its dimensions",
            ));
        }

        for y in 0..self.height {
            let row = y as usize * self.width as usize * 4;
            for x in 0..self.width {
                let p = inverse * Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                let sx = p.x.floor();
                let sy = p.y.floor();
                if sx < 0.0 || sy < 0.0 || sx >= f64::from(frame.width) || sy >= f64::from(frame.height)
                {
                    continue;
                }
                let s = (sy as usize * frame.width as usize + sx as usize) * 4;
                let d = row + x as usize * 4;
                let out = over(
                    [
                        self.data[d],
                        self.data[d + 1],
                        self.data[d + 2],
                        self.data[d + 3],
                    ],
                    [src[s], src[s + 1], src[s + 2], src[s + 3]],
                );
                self.data[d..d + 4].copy_from_slice(&out);
            }
        }
        Ok(())
    }
}

/// Premultiplied source-over blend.
fn over(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    if src[3] == 255 {
        return src;
    }
    if src[3] == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255(u16::from(dst[i]), inv));
    }
    out
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
