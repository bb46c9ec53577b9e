//! Property holder for a vertical text strip.
//!
//! The view keeps the latest property values and a dirty flag. Drawing
//! snapshots those values into a [`RenderRequest`] and runs the whole
//! pipeline; nothing from a previous draw is reused.

use crate::{
    color::Rgba,
    error::{RenderError, Result},
    font_storage::FontFamily,
    raster::{RasterSurface, SurfaceAllocator},
    renderer::{AutoFitRotatedTextRenderer, RenderRequest},
    text::TextShaper,
};

/// Initial property values, as read from layout markup.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewAttributes {
    pub text: String,
    pub text_color: Rgba,
    pub text_size: f32,
    pub font_family: FontFamily,
}

/// A view that shows its text turned sideways, shrunk to fit its strip.
#[derive(Clone, Debug, PartialEq)]
pub struct RotatedTextView {
    text: String,
    text_color: Rgba,
    text_size: f32,
    font_family: FontFamily,
    right_to_left: bool,
    size: (u32, u32),
    dirty: bool,
}

impl Default for RotatedTextView {
    fn default() -> Self {
        Self::from_attributes(ViewAttributes::default())
    }
}

impl RotatedTextView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_attributes(attrs: ViewAttributes) -> Self {
        Self {
            text: attrs.text,
            text_color: attrs.text_color,
            text_size: attrs.text_size,
            font_family: attrs.font_family,
            right_to_left: false,
            size: (0, 0),
            dirty: true,
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.dirty = true;
    }

    pub fn set_text_color(&mut self, color: Rgba) {
        self.text_color = color;
        self.dirty = true;
    }

    pub fn set_text_size(&mut self, size: f32) {
        self.text_size = size;
        self.dirty = true;
    }

    pub fn set_font_family(&mut self, family: FontFamily) {
        self.font_family = family;
        self.dirty = true;
    }

    pub fn set_right_to_left(&mut self, right_to_left: bool) {
        self.right_to_left = right_to_left;
        self.dirty = true;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn text_color(&self) -> Rgba {
        self.text_color
    }

    pub fn text_size(&self) -> f32 {
        self.text_size
    }

    pub fn font_family(&self) -> &FontFamily {
        &self.font_family
    }

    pub fn is_right_to_left(&self) -> bool {
        self.right_to_left
    }

    /// Whether a property changed since the last successful draw.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Takes the space the parent offers and returns the measured size.
    ///
    /// The view fills its strip as given; the long axis becomes the text
    /// flow axis when the request is built, not here.
    pub fn measure(&mut self, available_width: u32, available_height: u32) -> (u32, u32) {
        let size = (available_width, available_height);
        if size != self.size {
            self.size = size;
            self.dirty = true;
        }
        size
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Text box in reading orientation: the strip's height becomes the box
    /// width and its width the box height.
    pub fn text_box(&self) -> (i32, i32) {
        let to_i32 = |v: u32| v.min(i32::MAX as u32) as i32;
        (to_i32(self.size.1), to_i32(self.size.0))
    }

    /// Snapshot of the current properties as a render request.
    ///
    /// Returns `None` when the shaper has no face for the family.
    pub fn render_request<S: TextShaper + ?Sized>(&self, shaper: &S) -> Option<RenderRequest> {
        let font_id = shaper.resolve_font(&self.font_family)?;
        let (box_width, box_height) = self.text_box();
        Some(RenderRequest {
            text: self.text.clone(),
            box_width,
            box_height,
            start_font_size: self.text_size,
            color: self.text_color,
            font_id,
            right_to_left: self.right_to_left,
        })
    }

    /// Renders the view onto `canvas`, which must match the measured size.
    ///
    /// Fails with [`RenderError::NoFace`] when the shaper has no face for
    /// the family. The dirty flag is only cleared when the draw succeeds.
    pub fn draw<S: TextShaper, A: SurfaceAllocator>(
        &mut self,
        renderer: &mut AutoFitRotatedTextRenderer<S, A>,
        canvas: &mut RasterSurface,
    ) -> Result<()> {
        let Some(request) = self.render_request(renderer.shaper()) else {
            log::warn!("no face for {:?}; nothing drawn", self.font_family);
            return Err(RenderError::NoFace(self.font_family.clone()));
        };

        renderer.render_onto(&request, canvas)?;
        self.dirty = false;
        Ok(())
    }
}
