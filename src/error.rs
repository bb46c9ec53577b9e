//! Error types for the render pipeline.

use thiserror::Error;

use crate::font_storage::FontFamily;

/// Result type alias for render operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors that can occur while fitting, rasterizing or compositing text.
///
/// Every error is local to the render call that produced it; nothing is
/// cached between calls, so a failed render never poisons the next one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// The target box has a zero or negative side.
    #[error("invalid box dimensions {width}x{height}: both sides must be positive")]
    InvalidDimensions { width: i32, height: i32 },

    /// The fit search was handed a box with a zero side.
    #[error("empty box {width}x{height}: both sides must be non-zero")]
    EmptyBox { width: u32, height: u32 },

    /// The starting font size is not a finite positive number.
    #[error("invalid font size {0}: must be finite and positive")]
    InvalidFontSize(f32),

    /// A fit or allocation setting is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// The requested face is not available in the font storage.
    #[error("font {0:?} could not be loaded")]
    FontNotFound(fontdb::ID),

    /// No installed face matches the family, and there is no face to fall
    /// back to.
    #[error("no face available for {0:?}")]
    NoFace(FontFamily),

    /// The text does not fit even at the minimum font size.
    ///
    /// Only produced when the fit search is configured to fail on overflow.
    #[error(
        "text does not fit: {measured_height}px tall at size {font_size}, box is {box_height}px"
    )]
    TextDoesNotFit {
        font_size: f32,
        measured_height: u32,
        box_height: u32,
    },

    /// The allocator refused every surface size down to the minimum.
    #[error("could not allocate a {width}x{height} surface")]
    AllocationFailed { width: u32, height: u32 },
}
