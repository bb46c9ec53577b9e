//! Deterministic stand-ins for fonts and allocators used by unit tests.

use std::sync::Arc;

use crate::{
    error::{RenderError, Result},
    font_storage::FontFamily,
    glyph_key::{GlyphCoverage, GlyphKey},
    raster::{OutOfMemory, RasterSurface, SurfaceAllocator},
    text::{Paragraph, ParagraphStyle, PlacedGlyph, ShapedLine, TextShaper},
};

/// Monospace shaper with exact metrics.
///
/// Every char advances `size / 2`, every line is `size` tall, and inked
/// glyphs are solid `size * 2/5` by `size * 4/5` boxes starting `size / 10`
/// below the line top. Words wrap greedily at spaces; overlong words are
/// left to overhang.
#[derive(Default)]
pub struct MockShaper {
    pub shape_calls: u32,
}

impl MockShaper {
    pub fn font() -> fontdb::ID {
        fontdb::ID::dummy()
    }
}

impl TextShaper for MockShaper {
    fn resolve_font(&self, _family: &FontFamily) -> Option<fontdb::ID> {
        Some(Self::font())
    }

    fn shape(
        &mut self,
        text: &str,
        font_id: fontdb::ID,
        font_size: f32,
        style: &ParagraphStyle,
    ) -> Result<Paragraph> {
        if font_size <= 0.0 {
            return Err(RenderError::InvalidFontSize(font_size));
        }
        self.shape_calls += 1;

        let advance = font_size / 2.0;
        let mut rows: Vec<Vec<char>> = Vec::new();

        for segment in text.split('\n') {
            let mut row: Vec<char> = Vec::new();
            for word in segment.split(' ') {
                let needed = if row.is_empty() {
                    word.chars().count()
                } else {
                    row.len() + 1 + word.chars().count()
                };
                if !row.is_empty() && needed as f32 * advance > style.max_width {
                    rows.push(std::mem::take(&mut row));
                } else if !row.is_empty() {
                    row.push(' ');
                }
                row.extend(word.chars());
            }
            rows.push(row);
        }

        let lines: Vec<ShapedLine> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let top = i as f32 * font_size;
                let width = row.len() as f32 * advance;
                let offset = style.horizontal_align.offset(style.max_width, width);
                let glyphs = row
                    .iter()
                    .enumerate()
                    .filter(|(_, ch)| **ch != ' ')
                    .map(|(j, ch)| PlacedGlyph {
                        key: GlyphKey::new(font_id, *ch as u16, font_size),
                        x: offset + j as f32 * advance,
                        y: top + font_size / 10.0,
                    })
                    .collect();
                ShapedLine {
                    top,
                    height: font_size,
                    width,
                    baseline: top + font_size,
                    glyphs,
                }
            })
            .collect();

        Ok(Paragraph {
            font_id,
            font_size,
            max_width: style.max_width,
            height: lines.len() as f32 * font_size,
            lines,
        })
    }

    fn coverage(&mut self, key: GlyphKey) -> Option<Arc<GlyphCoverage>> {
        let size = key.font_size();
        let width = (size * 2.0 / 5.0).ceil() as usize;
        let height = (size * 4.0 / 5.0).ceil() as usize;
        (width > 0 && height > 0).then(|| {
            Arc::new(GlyphCoverage {
                width,
                height,
                data: vec![255; width * height],
            })
        })
    }
}

/// Allocator that fails every request larger than a threshold and records
/// what it was asked for.
pub struct ScriptedAllocator {
    max: Option<(u32, u32)>,
    pub requests: Vec<(u32, u32)>,
}

impl ScriptedAllocator {
    pub fn failing_above(width: u32, height: u32) -> Self {
        Self {
            max: Some((width, height)),
            requests: Vec::new(),
        }
    }

    pub fn always_failing() -> Self {
        Self {
            max: None,
            requests: Vec::new(),
        }
    }
}

impl SurfaceAllocator for ScriptedAllocator {
    fn allocate(
        &mut self,
        width: u32,
        height: u32,
    ) -> std::result::Result<RasterSurface, OutOfMemory> {
        self.requests.push((width, height));
        match self.max {
            Some((max_w, max_h)) if width <= max_w && height <= max_h => {
                Ok(RasterSurface::new(width, height))
            }
            _ => Err(OutOfMemory { width, height }),
        }
    }
}
