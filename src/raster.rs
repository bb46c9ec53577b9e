//! Off-screen surfaces and rasterization of fitted layouts.

use thiserror::Error;

use crate::{
    color::Rgba,
    error::{RenderError, Result},
    fit::FittedLayout,
    text::TextShaper,
};

/// RGBA8 pixel buffer, straight alpha, row-major with the origin top-left.
///
/// New surfaces are fully transparent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterSurface {
    /// Allocates a transparent surface, aborting on allocation failure.
    ///
    /// Use a [`SurfaceAllocator`] where running out of memory must be handled.
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize * 4;
        Self {
            width,
            height,
            pixels: vec![0; len],
        }
    }

    /// Wraps an existing RGBA8 buffer. Returns `None` if the length does not match.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        (pixels.len() == width as usize * height as usize * 4).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.pixels
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| (y as usize * self.width as usize + x as usize) * 4)
    }

    /// Pixel at `(x, y)`; transparent outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        self.index(x, y)
            .and_then(|i| self.pixels.get(i..i + 4))
            .map(|p| Rgba::new(p[0], p[1], p[2], p[3]))
            .unwrap_or(Rgba::TRANSPARENT)
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i..i + 4].copy_from_slice(&color.to_array());
        }
    }

    /// Source-over blends `color` onto the pixel at `(x, y)`. Out-of-bounds is a no-op.
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if color.a == 0 {
            return;
        }
        let dst = self.pixel(x, y);
        self.set_pixel(x, y, color.over(dst));
    }

    pub fn fill(&mut self, color: Rgba) {
        let rgba = color.to_array();
        for pixel in self.pixels.chunks_exact_mut(4) {
            pixel.copy_from_slice(&rgba);
        }
    }

    /// `true` if every pixel has zero alpha.
    pub fn is_transparent(&self) -> bool {
        self.pixels.chunks_exact(4).all(|p| p[3] == 0)
    }

    /// Bounding box `(min_x, min_y, max_x, max_y)` of the non-transparent pixels.
    pub fn ink_bounds(&self) -> Option<(u32, u32, u32, u32)> {
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for y in 0..self.height {
            for x in 0..self.width {
                if self.pixel(x, y).a == 0 {
                    continue;
                }
                bounds = Some(match bounds {
                    None => (x, y, x, y),
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                });
            }
        }
        bounds
    }
}

/// The allocator could not provide a buffer of the requested size.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("out of memory allocating {width}x{height}")]
pub struct OutOfMemory {
    pub width: u32,
    pub height: u32,
}

/// Source of raster surfaces.
pub trait SurfaceAllocator {
    fn allocate(
        &mut self,
        width: u32,
        height: u32,
    ) -> std::result::Result<RasterSurface, OutOfMemory>;
}

/// Heap allocator that reports failure instead of aborting.
///
/// `max_bytes` caps single allocations, which lets hosts emulate a
/// constrained bitmap budget.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeapAllocator {
    pub max_bytes: Option<usize>,
}

impl HeapAllocator {
    pub fn with_limit(max_bytes: usize) -> Self {
        Self {
            max_bytes: Some(max_bytes),
        }
    }
}

impl SurfaceAllocator for HeapAllocator {
    fn allocate(
        &mut self,
        width: u32,
        height: u32,
    ) -> std::result::Result<RasterSurface, OutOfMemory> {
        let oom = OutOfMemory { width, height };
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or(oom)?;

        if self.max_bytes.is_some_and(|max| len > max) {
            return Err(oom);
        }

        let mut pixels = Vec::new();
        pixels.try_reserve_exact(len).map_err(|_| oom)?;
        pixels.resize(len, 0);

        Ok(RasterSurface {
            width,
            height,
            pixels,
        })
    }
}

/// Allocates `width`x`height`, halving both sides after each failure.
///
/// Gives up with [`RenderError::AllocationFailed`] once a 1x1 request fails
/// or `max_attempts` requests have been made.
pub fn allocate_with_fallback<A: SurfaceAllocator + ?Sized>(
    allocator: &mut A,
    width: u32,
    height: u32,
    max_attempts: u32,
) -> Result<RasterSurface> {
    let (mut w, mut h) = (width.max(1), height.max(1));
    let max_attempts = max_attempts.max(1);

    for attempt in 1..=max_attempts {
        match allocator.allocate(w, h) {
            Ok(surface) => return Ok(surface),
            Err(err) => {
                if (w, h) == (1, 1) || attempt == max_attempts {
                    log::error!("{err}; giving up after {attempt} attempts");
                    break;
                }
                let next = ((w / 2).max(1), (h / 2).max(1));
                log::warn!("{err}; retrying at {}x{}", next.0, next.1);
                (w, h) = next;
            }
        }
    }

    Err(RenderError::AllocationFailed {
        width: w,
        height: h,
    })
}

/// Draws `fitted` into `surface` in `color`, centered vertically inside a box
/// `box_height` pixels tall.
///
/// Horizontal centering is already part of the shaped lines. Glyphs outside
/// the surface are clipped, which also covers surfaces that were allocated
/// smaller than the box.
pub fn rasterize<S: TextShaper + ?Sized>(
    shaper: &mut S,
    fitted: &FittedLayout,
    surface: &mut RasterSurface,
    box_height: u32,
    color: Rgba,
) {
    let offset_y = (box_height as f32 - fitted.measured_height as f32) / 2.0;

    for glyph in fitted.lines().iter().flat_map(|line| &line.glyphs) {
        let Some(coverage) = shaper.coverage(glyph.key) else {
            continue;
        };

        let origin_x = glyph.x.floor() as i64;
        let origin_y = (glyph.y + offset_y).floor() as i64;

        for row in 0..coverage.height {
            let y = origin_y + row as i64;
            if y < 0 || y >= surface.height as i64 {
                continue;
            }

            for col in 0..coverage.width {
                let alpha = coverage.at(col, row);
                if alpha == 0 {
                    continue;
                }

                let x = origin_x + col as i64;
                if x < 0 || x >= surface.width as i64 {
                    continue;
                }

                surface.blend_pixel(x as u32, y as u32, color.with_coverage(alpha));
            }
        }
    }
}
