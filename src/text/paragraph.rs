use std::collections::HashSet;

use crate::glyph_key::GlyphKey;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Horizontal placement of each line inside the paragraph width.
pub enum HorizontalAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl HorizontalAlign {
    /// Offset that places a line of `line_width` inside `max_width`.
    ///
    /// Lines wider than the paragraph get a negative offset and overhang
    /// both edges evenly when centered.
    pub fn offset(self, max_width: f32, line_width: f32) -> f32 {
        match self {
            Self::Left => 0.0,
            Self::Center => (max_width - line_width) / 2.0,
            Self::Right => max_width - line_width,
        }
    }
}

/// How a string is broken into lines and placed.
///
/// The default matches what the rotated view needs: centered lines, no extra
/// spacing, wrapping at spaces and tabs, forced breaks at `\n`.
#[derive(Clone, Debug, PartialEq)]
pub struct ParagraphStyle {
    /// Wrap width in pixels.
    pub max_width: f32,
    pub horizontal_align: HorizontalAlign,
    /// Pixels added between consecutive lines.
    pub line_spacing_extra: f32,
    /// Multiplier applied to each line's natural height before the extra.
    pub line_spacing_mult: f32,
    pub word_separators: HashSet<char, fxhash::FxBuildHasher>,
    pub linebreak_chars: HashSet<char, fxhash::FxBuildHasher>,
}

impl Default for ParagraphStyle {
    fn default() -> Self {
        Self::centered(0.0)
    }
}

impl ParagraphStyle {
    /// Centered paragraph wrapping at `max_width`.
    pub fn centered(max_width: f32) -> Self {
        let mut word_separators = HashSet::with_hasher(fxhash::FxBuildHasher::default());
        word_separators.insert(' ');
        word_separators.insert('\t');

        let mut linebreak_chars = HashSet::with_hasher(fxhash::FxBuildHasher::default());
        linebreak_chars.insert('\n');

        Self {
            max_width,
            horizontal_align: HorizontalAlign::Center,
            line_spacing_extra: 0.0,
            line_spacing_mult: 1.0,
            word_separators,
            linebreak_chars,
        }
    }

    /// Vertical advance past a line of `natural_height`.
    ///
    /// Spacing is only applied between lines, never after the last one.
    pub(crate) fn line_advance(&self, natural_height: f32, is_last: bool) -> f32 {
        if is_last {
            natural_height
        } else {
            (natural_height * self.line_spacing_mult + self.line_spacing_extra).max(0.0)
        }
    }
}

/// **Y-axis goes down.** `x`/`y` is the top-left corner of the glyph's
/// coverage mask in paragraph coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedGlyph {
    pub key: GlyphKey,
    pub x: f32,
    pub y: f32,
}

/// One row of positioned glyphs.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapedLine {
    pub top: f32,
    pub height: f32,
    /// Advance width of the visible glyphs, trailing separators excluded.
    pub width: f32,
    pub baseline: f32,
    pub glyphs: Vec<PlacedGlyph>,
}

/// Output of a [`TextShaper`](super::TextShaper): a block of lines laid out
/// inside `style.max_width`, starting at `y = 0`.
#[derive(Clone, Debug, PartialEq)]
pub struct Paragraph {
    pub font_id: fontdb::ID,
    pub font_size: f32,
    pub max_width: f32,
    pub height: f32,
    pub lines: Vec<ShapedLine>,
}

impl Paragraph {
    /// Height rounded up to whole pixels, the value fit decisions use.
    ///
    /// Sums of line heights pick up float noise, so anything within a
    /// thousandth of a pixel rounds down.
    pub fn measured_height(&self) -> u32 {
        (self.height - 1.0e-3).ceil().max(0.0) as u32
    }

    /// Widest line in the paragraph.
    pub fn measured_width(&self) -> f32 {
        self.lines.iter().map(|line| line.width).fold(0.0, f32::max)
    }

    pub fn glyph_count(&self) -> usize {
        self.lines.iter().map(|line| line.glyphs.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignment_offsets() {
        assert_eq!(HorizontalAlign::Left.offset(100.0, 40.0), 0.0);
        assert_eq!(HorizontalAlign::Center.offset(100.0, 40.0), 30.0);
        assert_eq!(HorizontalAlign::Right.offset(100.0, 40.0), 60.0);
        assert_eq!(HorizontalAlign::Center.offset(10.0, 30.0), -10.0);
    }

    #[test]
    fn default_style_is_centered_without_spacing() {
        let style = ParagraphStyle::centered(120.0);
        assert_eq!(style.max_width, 120.0);
        assert_eq!(style.horizontal_align, HorizontalAlign::Center);
        assert!(style.word_separators.contains(&' '));
        assert!(style.linebreak_chars.contains(&'\n'));
        assert_eq!(style.line_advance(20.0, false), 20.0);
        assert_eq!(style.line_advance(20.0, true), 20.0);
    }

    #[test]
    fn spacing_skips_last_line() {
        let style = ParagraphStyle {
            line_spacing_extra: 4.0,
            line_spacing_mult: 1.5,
            ..ParagraphStyle::centered(50.0)
        };
        assert_eq!(style.line_advance(10.0, false), 19.0);
        assert_eq!(style.line_advance(10.0, true), 10.0);
    }

    #[test]
    fn measured_height_rounds_up() {
        let mut paragraph = Paragraph {
            font_id: fontdb::ID::dummy(),
            font_size: 10.0,
            max_width: 100.0,
            height: 12.2,
            lines: vec![],
        };
        assert_eq!(paragraph.measured_height(), 13);
        paragraph.height = 0.0;
        assert_eq!(paragraph.measured_height(), 0);
        paragraph.height = 50.000_01;
        assert_eq!(paragraph.measured_height(), 50);
    }
}
