//! # rotated-text
//!
//! Renders a string sideways into a vertical strip, shrinking the font until
//! the text fits.
//!
//! ## Overview
//!
//! A render call runs three steps:
//!
//! 1. [`fit::fit_text`] shapes the text at decreasing sizes until the
//!    paragraph is no taller than the box.
//! 2. [`raster::rasterize`] draws the fitted lines, vertically centered, into
//!    an off-screen [`RasterSurface`] the size of the box.
//! 3. [`compose::RotatedImage`] turns the surface a quarter (left-to-right)
//!    or three quarters (right-to-left) onto the transposed destination.
//!
//! [`AutoFitRotatedTextRenderer`] wires the steps together and
//! [`RotatedTextView`] keeps the properties a host widget exposes.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rotated_text::{
//!     AutoFitRotatedTextRenderer, FontdueShaper, RasterSurface, Rgba, RotatedTextView,
//! };
//!
//! let mut renderer = AutoFitRotatedTextRenderer::new(FontdueShaper::with_system_fonts());
//!
//! let mut view = RotatedTextView::new();
//! view.set_text_color(Rgba::BLACK);
//! view.set_text("Hello, World!");
//! view.set_text_size(100.0);
//!
//! let (width, height) = view.measure(300, 800);
//! let mut canvas = RasterSurface::new(width, height);
//! view.draw(&mut renderer, &mut canvas).expect("render failed");
//! ```

pub mod color;
pub mod compose;
pub mod error;
pub mod fit;
pub mod font_storage;
pub mod glyph_cache;
pub mod glyph_key;
pub mod raster;
pub mod renderer;
pub mod text;
pub mod view;

#[cfg(test)]
mod testing;

// common re-exports
pub use color::Rgba;
pub use compose::{RotatedImage, Rotation};
pub use error::{RenderError, Result};
pub use fit::{FitConfig, FitStrategy, FittedLayout, OverflowPolicy};
pub use font_storage::{FontFamily, FontStorage};
pub use glyph_cache::CoverageCache;
pub use raster::{HeapAllocator, RasterSurface, SurfaceAllocator};
pub use renderer::{AutoFitRotatedTextRenderer, RenderRequest, RendererConfig};
pub use text::{FontdueShaper, TextShaper};
pub use view::{RotatedTextView, ViewAttributes};

// re-export dependencies
pub use euclid;
pub use fontdb;
pub use fontdue;
pub use parking_lot;
