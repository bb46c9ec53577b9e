use crate::{
    color::Rgba,
    compose::{RotatedImage, Rotation},
    error::{RenderError, Result},
    fit::{FitConfig, FittedLayout, fit_text},
    raster::{HeapAllocator, RasterSurface, SurfaceAllocator, allocate_with_fallback, rasterize},
    text::TextShaper,
};

/// Everything one render call needs. Built fresh for each call.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderRequest {
    pub text: String,
    /// Width of the text box in reading orientation.
    pub box_width: i32,
    /// Height of the text box in reading orientation.
    pub box_height: i32,
    pub start_font_size: f32,
    pub color: Rgba,
    pub font_id: fontdb::ID,
    pub right_to_left: bool,
}

impl RenderRequest {
    /// Checks the box and size, returning the box as unsigned dimensions.
    pub fn validate(&self) -> Result<(u32, u32)> {
        if self.box_width <= 0 || self.box_height <= 0 {
            return Err(RenderError::InvalidDimensions {
                width: self.box_width,
                height: self.box_height,
            });
        }
        if !self.start_font_size.is_finite() || self.start_font_size <= 0.0 {
            return Err(RenderError::InvalidFontSize(self.start_font_size));
        }
        Ok((self.box_width as u32, self.box_height as u32))
    }

    pub fn rotation(&self) -> Rotation {
        Rotation::for_direction(self.right_to_left)
    }
}

/// Configuration for [`AutoFitRotatedTextRenderer`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RendererConfig {
    pub fit: FitConfig,
    /// Upper bound on allocation requests per render, halving each time.
    pub max_alloc_attempts: u32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            fit: FitConfig::default(),
            max_alloc_attempts: 32,
        }
    }
}

/// Fits, rasterizes and rotates text for vertical strips.
///
/// The renderer holds no per-request state: every call shapes, allocates and
/// draws from scratch, and the off-screen surface never outlives the call
/// that composites it.
pub struct AutoFitRotatedTextRenderer<S, A = HeapAllocator> {
    shaper: S,
    allocator: A,
    config: RendererConfig,
}

impl<S: TextShaper> AutoFitRotatedTextRenderer<S> {
    pub fn new(shaper: S) -> Self {
        Self::with_allocator(shaper, HeapAllocator::default(), RendererConfig::default())
    }
}

impl<S: TextShaper, A: SurfaceAllocator> AutoFitRotatedTextRenderer<S, A> {
    pub fn with_allocator(shaper: S, allocator: A, config: RendererConfig) -> Self {
        Self {
            shaper,
            allocator,
            config,
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: RendererConfig) {
        self.config = config;
    }

    pub fn shaper(&self) -> &S {
        &self.shaper
    }

    pub fn shaper_mut(&mut self) -> &mut S {
        &mut self.shaper
    }

    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    /// Runs the shrink search for `request`.
    pub fn fit(&mut self, request: &RenderRequest) -> Result<FittedLayout> {
        let (box_width, box_height) = request.validate()?;
        fit_text(
            &mut self.shaper,
            &request.text,
            request.font_id,
            request.start_font_size,
            box_width,
            box_height,
            &self.config.fit,
        )
    }

    /// Draws a fitted layout into a freshly allocated box-sized surface.
    pub fn rasterize(
        &mut self,
        request: &RenderRequest,
        fitted: &FittedLayout,
    ) -> Result<RasterSurface> {
        let (box_width, box_height) = request.validate()?;
        let mut surface = allocate_with_fallback(
            &mut self.allocator,
            box_width,
            box_height,
            self.config.max_alloc_attempts,
        )?;
        rasterize(
            &mut self.shaper,
            fitted,
            &mut surface,
            box_height,
            request.color,
        );
        Ok(surface)
    }

    /// Full pipeline: fit, rasterize, and attach the rotation for the
    /// transposed destination.
    pub fn render(&mut self, request: &RenderRequest) -> Result<RotatedImage> {
        let (box_width, box_height) = request.validate()?;
        let fitted = self.fit(request)?;
        let surface = self.rasterize(request, &fitted)?;

        // destination is the transposed box, even if the surface was degraded
        Ok(RotatedImage::with_canvas_size(
            surface,
            request.rotation(),
            box_height,
            box_width,
        ))
    }

    /// Renders `request` and composites it onto `canvas`.
    pub fn render_onto(
        &mut self,
        request: &RenderRequest,
        canvas: &mut RasterSurface,
    ) -> Result<()> {
        self.render(request)?.composite_onto(canvas);
        Ok(())
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockShaper, ScriptedAllocator};

    fn request(text: &str, w: i32, h: i32, size: f32) -> RenderRequest {
        RenderRequest {
            text: text.to_string(),
            box_width: w,
            box_height: h,
            start_font_size: size,
            color: Rgba::BLACK,
            font_id: MockShaper::font(),
            right_to_left: false,
        }
    }

    #[test]
    fn rejects_non_positive_boxes_before_shaping() {
        let mut renderer = AutoFitRotatedTextRenderer::new(MockShaper::default());
        for (w, h) in [(200, 0), (200, -5), (0, 50), (-1, -1)] {
            let err = renderer.render(&request("Hi", w, h, 100.0)).unwrap_err();
            assert_eq!(
                err,
                RenderError::InvalidDimensions {
                    width: w,
                    height: h
                }
            );
        }
        assert!(matches!(
            renderer.render(&request("Hi", 10, 10, -3.0)),
            Err(RenderError::InvalidFontSize(_))
        ));
        assert_eq!(renderer.shaper().shape_calls, 0);
    }

    #[test]
    fn hi_in_a_short_box_shrinks() {
        let mut renderer = AutoFitRotatedTextRenderer::new(MockShaper::default());
        let fitted = renderer.fit(&request("Hi", 200, 50, 100.0)).unwrap();
        assert!(fitted.font_size < 100.0);
        assert!(fitted.measured_height <= 50);
    }

    #[test]
    fn output_is_transposed_and_rotated() {
        let mut renderer = AutoFitRotatedTextRenderer::new(MockShaper::default());
        let image = renderer.render(&request("HI", 100, 60, 20.0)).unwrap();
        assert_eq!((image.surface.width(), image.surface.height()), (100, 60));
        assert_eq!((image.canvas_width, image.canvas_height), (60, 100));

        let canvas = image.to_canvas();
        // surface ink spans x 40..=57, y 22..=37; a quarter turn maps (x, y) to (59 - y, x)
        assert_eq!(canvas.ink_bounds(), Some((22, 40, 37, 57)));
    }

    #[test]
    fn right_to_left_mirrors_the_strip() {
        let mut renderer = AutoFitRotatedTextRenderer::new(MockShaper::default());
        let mut req = request("HI", 100, 60, 20.0);
        req.right_to_left = true;
        let canvas = renderer.render(&req).unwrap().to_canvas();
        // (x, y) maps to (y, 99 - x)
        assert_eq!(canvas.ink_bounds(), Some((22, 42, 37, 59)));
    }

    #[test]
    fn rendering_twice_is_pixel_identical() {
        let mut renderer = AutoFitRotatedTextRenderer::new(MockShaper::default());
        let req = request("Hello, World!", 300, 80, 100.0);
        let first = renderer.render(&req).unwrap().to_canvas();
        let second = renderer.render(&req).unwrap().to_canvas();
        assert!(!first.is_transparent());
        assert_eq!(first, second);
    }

    #[test]
    fn empty_text_renders_nothing_without_error() {
        let mut renderer = AutoFitRotatedTextRenderer::new(MockShaper::default());
        let req = request("", 100, 40, 30.0);
        let fitted = renderer.fit(&req).unwrap();
        assert_eq!(fitted.measured_height, 30);
        let canvas = renderer.render(&req).unwrap().to_canvas();
        assert!(canvas.is_transparent());
    }

    #[test]
    fn degraded_allocation_still_composites() {
        let mut renderer = AutoFitRotatedTextRenderer::with_allocator(
            MockShaper::default(),
            ScriptedAllocator::failing_above(50, 30),
            RendererConfig::default(),
        );
        let image = renderer.render(&request("HI", 100, 60, 20.0)).unwrap();
        assert_eq!((image.surface.width(), image.surface.height()), (50, 30));
        assert_eq!((image.canvas_width, image.canvas_height), (60, 100));
        assert_eq!(renderer.allocator().requests, vec![(100, 60), (50, 30)]);
    }

    #[test]
    fn allocation_failure_surfaces_as_error() {
        let mut renderer = AutoFitRotatedTextRenderer::with_allocator(
            MockShaper::default(),
            ScriptedAllocator::always_failing(),
            RendererConfig::default(),
        );
        let err = renderer.render(&request("HI", 4, 4, 2.0)).unwrap_err();
        assert_eq!(err, RenderError::AllocationFailed { width: 1, height: 1 });
    }

    #[test]
    fn render_onto_draws_into_the_callers_canvas() {
        let mut renderer = AutoFitRotatedTextRenderer::new(MockShaper::default());
        let mut canvas = RasterSurface::new(60, 100);
        canvas.fill(Rgba::WHITE);
        renderer
            .render_onto(&request("HI", 100, 60, 20.0), &mut canvas)
            .unwrap();
        assert_eq!(canvas.pixel(0, 0), Rgba::WHITE);
        assert_eq!(canvas.pixel(30, 45), Rgba::BLACK);
    }
}
