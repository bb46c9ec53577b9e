//! Quarter-turn placement of a rendered box onto its destination canvas.
//!
//! Text is rasterized in reading orientation into a `w`x`h` surface. The
//! destination is the transposed `h`x`w` strip, and the surface is turned
//! a quarter clockwise (left-to-right text, reads top to bottom) or three
//! quarters (right-to-left, reads bottom to top) to land on it.

use euclid::{Angle, Point2D, Transform2D, point2, vec2};

use crate::raster::RasterSurface;

/// Coordinate space of the off-screen text surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceSpace;

/// Coordinate space of the destination canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanvasSpace;

pub type SurfaceToCanvas = Transform2D<f32, SurfaceSpace, CanvasSpace>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// How far the surface is turned clockwise.
pub enum Rotation {
    /// 90°, used for left-to-right text.
    #[default]
    Quarter,
    /// 270°, used for right-to-left text.
    ThreeQuarters,
}

impl Rotation {
    pub fn for_direction(right_to_left: bool) -> Self {
        if right_to_left {
            Self::ThreeQuarters
        } else {
            Self::Quarter
        }
    }

    pub fn degrees(self) -> f32 {
        match self {
            Self::Quarter => 90.0,
            Self::ThreeQuarters => 270.0,
        }
    }

    /// Rotation about the origin followed by the translation that brings the
    /// turned surface back onto a `canvas_width`x`canvas_height` canvas.
    ///
    /// `Quarter` maps `(x, y)` to `(canvas_width - y, x)`; `ThreeQuarters`
    /// maps it to `(y, canvas_height - x)`.
    pub fn transform(self, canvas_width: f32, canvas_height: f32) -> SurfaceToCanvas {
        let rotation = Transform2D::rotation(Angle::degrees(self.degrees()));
        match self {
            Self::Quarter => rotation.then_translate(vec2(canvas_width, 0.0)),
            Self::ThreeQuarters => rotation.then_translate(vec2(0.0, canvas_height)),
        }
    }
}

/// A rendered surface plus where it goes on the destination canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct RotatedImage {
    pub surface: RasterSurface,
    pub transform: SurfaceToCanvas,
    pub canvas_width: u32,
    pub canvas_height: u32,
}

impl RotatedImage {
    pub fn new(surface: RasterSurface, rotation: Rotation) -> Self {
        // the canvas is the transposed text box
        let canvas_width = surface.height();
        let canvas_height = surface.width();
        Self::with_canvas_size(surface, rotation, canvas_width, canvas_height)
    }

    pub fn with_canvas_size(
        surface: RasterSurface,
        rotation: Rotation,
        canvas_width: u32,
        canvas_height: u32,
    ) -> Self {
        Self {
            transform: rotation.transform(canvas_width as f32, canvas_height as f32),
            surface,
            canvas_width,
            canvas_height,
        }
    }

    /// Maps a surface point to canvas coordinates.
    pub fn map_point(&self, x: f32, y: f32) -> Point2D<f32, CanvasSpace> {
        self.transform.transform_point(point2(x, y))
    }

    /// Paints the surface onto `canvas` and releases it.
    ///
    /// Every canvas pixel center is pulled back through the inverse transform
    /// and takes the nearest surface pixel, blended source-over. Parts of the
    /// canvas the surface does not cover are left untouched.
    pub fn composite_onto(self, canvas: &mut RasterSurface) {
        let Some(inverse) = self.transform.inverse() else {
            log::warn!("rotation transform is not invertible; nothing composited");
            return;
        };

        let (src_w, src_h) = (self.surface.width() as f32, self.surface.height() as f32);

        for y in 0..canvas.height() {
            for x in 0..canvas.width() {
                let src: Point2D<f32, SurfaceSpace> =
                    inverse.transform_point(point2(x as f32 + 0.5, y as f32 + 0.5));
                if src.x < 0.0 || src.y < 0.0 || src.x >= src_w || src.y >= src_h {
                    continue;
                }
                let color = self.surface.pixel(src.x as u32, src.y as u32);
                canvas.blend_pixel(x, y, color);
            }
        }
    }

    /// Composites onto a fresh transparent canvas of the destination size.
    pub fn to_canvas(self) -> RasterSurface {
        let mut canvas = RasterSurface::new(self.canvas_width, self.canvas_height);
        self.composite_onto(&mut canvas);
        canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;

    fn assert_maps(t: &SurfaceToCanvas, from: (f32, f32), to: (f32, f32)) {
        let p = t.transform_point(point2(from.0, from.1));
        assert!(
            (p.x - to.0).abs() < 1e-3 && (p.y - to.1).abs() < 1e-3,
            "{from:?} -> ({}, {}), expected {to:?}",
            p.x,
            p.y
        );
    }

    #[test]
    fn left_to_right_turns_a_quarter() {
        let t = Rotation::for_direction(false).transform(50.0, 200.0);
        for (x, y) in [(0.0, 0.0), (10.0, 3.0), (199.0, 49.0), (120.5, 7.25)] {
            assert_maps(&t, (x, y), (50.0 - y, x));
        }
    }

    #[test]
    fn right_to_left_turns_three_quarters() {
        let t = Rotation::for_direction(true).transform(50.0, 200.0);
        for (x, y) in [(0.0, 0.0), (10.0, 3.0), (199.0, 49.0), (120.5, 7.25)] {
            assert_maps(&t, (x, y), (y, 200.0 - x));
        }
    }

    fn marked_surface() -> RasterSurface {
        // 4 wide, 2 tall with distinct corners
        let mut surface = RasterSurface::new(4, 2);
        surface.set_pixel(0, 0, Rgba::new(255, 0, 0, 255));
        surface.set_pixel(3, 0, Rgba::new(0, 255, 0, 255));
        surface.set_pixel(0, 1, Rgba::new(0, 0, 255, 255));
        surface.set_pixel(3, 1, Rgba::WHITE);
        surface
    }

    #[test]
    fn quarter_composite_moves_pixels_exactly() {
        let image = RotatedImage::new(marked_surface(), Rotation::Quarter);
        assert_eq!((image.canvas_width, image.canvas_height), (2, 4));

        let canvas = image.to_canvas();
        // pixel (x, y) lands on (canvas_width - 1 - y, x)
        assert_eq!(canvas.pixel(1, 0), Rgba::new(255, 0, 0, 255));
        assert_eq!(canvas.pixel(1, 3), Rgba::new(0, 255, 0, 255));
        assert_eq!(canvas.pixel(0, 0), Rgba::new(0, 0, 255, 255));
        assert_eq!(canvas.pixel(0, 3), Rgba::WHITE);
        assert_eq!(canvas.pixel(0, 1), Rgba::TRANSPARENT);
    }

    #[test]
    fn three_quarters_composite_moves_pixels_exactly() {
        let canvas = RotatedImage::new(marked_surface(), Rotation::ThreeQuarters).to_canvas();
        // pixel (x, y) lands on (y, canvas_height - 1 - x)
        assert_eq!(canvas.pixel(0, 3), Rgba::new(255, 0, 0, 255));
        assert_eq!(canvas.pixel(0, 0), Rgba::new(0, 255, 0, 255));
        assert_eq!(canvas.pixel(1, 3), Rgba::new(0, 0, 255, 255));
        assert_eq!(canvas.pixel(1, 0), Rgba::WHITE);
    }

    #[test]
    fn composite_blends_over_existing_canvas() {
        let mut canvas = RasterSurface::new(2, 4);
        canvas.fill(Rgba::new(9, 9, 9, 255));
        RotatedImage::new(marked_surface(), Rotation::Quarter).composite_onto(&mut canvas);
        assert_eq!(canvas.pixel(1, 0), Rgba::new(255, 0, 0, 255));
        // transparent source pixels leave the background alone
        assert_eq!(canvas.pixel(0, 1), Rgba::new(9, 9, 9, 255));
    }

    #[test]
    fn smaller_surface_covers_part_of_the_canvas() {
        let image = RotatedImage::with_canvas_size(marked_surface(), Rotation::Quarter, 6, 10);
        let canvas = image.to_canvas();
        assert_eq!((canvas.width(), canvas.height()), (6, 10));
        assert_eq!(canvas.pixel(5, 0), Rgba::new(255, 0, 0, 255));
        assert_eq!(canvas.pixel(4, 3), Rgba::WHITE);
        assert_eq!(canvas.pixel(0, 0), Rgba::TRANSPARENT);
    }
}
