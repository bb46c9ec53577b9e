/// Shaped paragraph output and the style it is shaped with.
pub mod paragraph;
/// The shaping seam and its `fontdue` implementation.
pub mod shaper;

pub use paragraph::{HorizontalAlign, Paragraph, ParagraphStyle, PlacedGlyph, ShapedLine};
pub use shaper::{FontdueShaper, TextShaper};
