use std::{num::NonZeroUsize, sync::Arc};

use parking_lot::Mutex;

use crate::{
    error::{RenderError, Result},
    font_storage::{FontFamily, FontStorage},
    glyph_cache::CoverageCache,
    glyph_key::{GlyphCoverage, GlyphKey},
    text::{Paragraph, ParagraphStyle, PlacedGlyph, ShapedLine},
};

/// Turns strings into measured, drawable paragraphs.
///
/// The fit search calls [`TextShaper::shape`] once per candidate size, and
/// the rasterizer asks for glyph coverage through [`TextShaper::coverage`].
/// Implementations must be deterministic: the same input produces the same
/// paragraph, and a smaller font size never produces a taller one.
pub trait TextShaper {
    /// Resolves a family to a face this shaper can use.
    fn resolve_font(&self, family: &FontFamily) -> Option<fontdb::ID>;

    /// Lays out `text` at `font_size` according to `style`.
    fn shape(
        &mut self,
        text: &str,
        font_id: fontdb::ID,
        font_size: f32,
        style: &ParagraphStyle,
    ) -> Result<Paragraph>;

    /// Coverage mask for a glyph produced by [`TextShaper::shape`].
    ///
    /// `None` means the glyph has no ink (whitespace, missing face).
    fn coverage(&mut self, key: GlyphKey) -> Option<Arc<GlyphCoverage>>;
}

/// [`TextShaper`] backed by `fontdue` metrics and rasterization.
///
/// Lines are filled greedily: words move to the next line when they would
/// cross `max_width`, words wider than a whole line are broken between
/// glyphs. Separators before a wrap stay at the end of the line they follow
/// and do not count toward its width, so a wrapped line never starts with
/// one.
/// Coverage masks are kept in a fixed-capacity LRU keyed by [`GlyphKey`].
pub struct FontdueShaper {
    fonts: Arc<Mutex<FontStorage>>,
    glyph_cache: CoverageCache,
}

impl FontdueShaper {
    pub fn new(fonts: Arc<Mutex<FontStorage>>) -> Self {
        Self {
            fonts,
            glyph_cache: CoverageCache::default(),
        }
    }

    /// Shaper whose glyph cache holds at most `capacity` masks.
    pub fn with_cache_capacity(fonts: Arc<Mutex<FontStorage>>, capacity: NonZeroUsize) -> Self {
        Self {
            fonts,
            glyph_cache: CoverageCache::new(capacity),
        }
    }

    /// Shaper over a fresh storage holding the system fonts.
    pub fn with_system_fonts() -> Self {
        let mut storage = FontStorage::new();
        storage.load_system_fonts();
        Self::new(Arc::new(Mutex::new(storage)))
    }

    /// Shared handle to the underlying storage.
    pub fn font_storage(&self) -> &Arc<Mutex<FontStorage>> {
        &self.fonts
    }

    pub fn cached_glyphs(&self) -> usize {
        self.glyph_cache.len()
    }

    pub fn cache_capacity(&self) -> usize {
        self.glyph_cache.capacity()
    }

    pub fn clear_cache(&mut self) {
        self.glyph_cache.clear();
    }
}

impl TextShaper for FontdueShaper {
    fn resolve_font(&self, family: &FontFamily) -> Option<fontdb::ID> {
        self.fonts.lock().resolve(family)
    }

    fn shape(
        &mut self,
        text: &str,
        font_id: fontdb::ID,
        font_size: f32,
        style: &ParagraphStyle,
    ) -> Result<Paragraph> {
        if !font_size.is_finite() || font_size <= 0.0 {
            return Err(RenderError::InvalidFontSize(font_size));
        }

        let font = self
            .fonts
            .lock()
            .font(font_id)
            .ok_or(RenderError::FontNotFound(font_id))?;

        let (ascent, descent) = font
            .horizontal_line_metrics(font_size)
            .map(|m| (m.ascent, m.descent))
            .unwrap_or((font_size, 0.0));

        let mut breaker = LineBreaker {
            font: font.as_ref(),
            font_size,
            max_width: style.max_width,
            rows: Vec::new(),
            line: LineBuilder::default(),
        };
        let mut word: Vec<u16> = Vec::new();

        for ch in text.chars() {
            if style.linebreak_chars.contains(&ch) {
                breaker.place_word(&word);
                word.clear();
                breaker.break_line();
                continue;
            }

            if style.word_separators.contains(&ch) {
                breaker.place_word(&word);
                word.clear();
                breaker.place_separator(font.lookup_glyph_index(ch));
                continue;
            }

            word.push(font.lookup_glyph_index(ch));
        }
        breaker.place_word(&word);
        breaker.break_line();

        let natural_height = ascent - descent;
        let row_count = breaker.rows.len();
        let mut lines = Vec::with_capacity(row_count);
        let mut cursor_y = 0.0;

        for (index, row) in breaker.rows.into_iter().enumerate() {
            let baseline = cursor_y + ascent;
            let offset = style
                .horizontal_align
                .offset(style.max_width, row.visible_width);

            let glyphs = row
                .glyphs
                .iter()
                .filter(|g| g.metrics.width > 0 && g.metrics.height > 0)
                .map(|g| PlacedGlyph {
                    key: GlyphKey::new(font_id, g.glyph_index, font_size),
                    x: offset + g.origin_x + g.metrics.xmin as f32,
                    y: baseline - (g.metrics.ymin as f32 + g.metrics.height as f32),
                })
                .collect();

            lines.push(ShapedLine {
                top: cursor_y,
                height: natural_height,
                width: row.visible_width,
                baseline,
                glyphs,
            });

            cursor_y += style.line_advance(natural_height, index + 1 == row_count);
        }

        Ok(Paragraph {
            font_id,
            font_size,
            max_width: style.max_width,
            height: cursor_y,
            lines,
        })
    }

    fn coverage(&mut self, key: GlyphKey) -> Option<Arc<GlyphCoverage>> {
        if self.glyph_cache.contains(&key) {
            return self.glyph_cache.get_or_insert_with(key, || None);
        }

        // a face that fails to load is not cached, so a later load can succeed
        let font = self.fonts.lock().font(key.font_id())?;
        self.glyph_cache.get_or_insert_with(key, || {
            let (metrics, data) = font.rasterize_indexed(key.glyph_index(), key.font_size());
            (metrics.width > 0 && metrics.height > 0).then(|| {
                Arc::new(GlyphCoverage {
                    width: metrics.width,
                    height: metrics.height,
                    data,
                })
            })
        })
    }
}

/// Glyph waiting for its line to be aligned, origin on the baseline.
struct PendingGlyph {
    glyph_index: u16,
    origin_x: f32,
    metrics: fontdue::Metrics,
}

#[derive(Default)]
struct LineBuilder {
    glyphs: Vec<PendingGlyph>,
    pen_x: f32,
    /// Pen position after the last non-separator glyph.
    visible_width: f32,
    last_glyph: Option<u16>,
}

impl LineBuilder {
    fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    fn kerning(&self, font: &fontdue::Font, glyph_index: u16, font_size: f32) -> f32 {
        self.last_glyph
            .and_then(|prev| font.horizontal_kern_indexed(prev, glyph_index, font_size))
            .unwrap_or(0.0)
    }

    /// Visible width the line would have after appending `word`.
    fn projected_width(&self, font: &fontdue::Font, font_size: f32, word: &[u16]) -> f32 {
        let mut pen = self.pen_x;
        let mut last = self.last_glyph;
        for &glyph_index in word {
            if let Some(prev) = last {
                pen += font
                    .horizontal_kern_indexed(prev, glyph_index, font_size)
                    .unwrap_or(0.0);
            }
            pen += font.metrics_indexed(glyph_index, font_size).advance_width;
            last = Some(glyph_index);
        }
        pen
    }

    fn push(&mut self, font: &fontdue::Font, font_size: f32, glyph_index: u16, visible: bool) {
        let origin_x = self.pen_x + self.kerning(font, glyph_index, font_size);
        let metrics = font.metrics_indexed(glyph_index, font_size);

        self.pen_x = origin_x + metrics.advance_width;
        if visible {
            self.visible_width = self.pen_x;
        }
        self.last_glyph = Some(glyph_index);
        self.glyphs.push(PendingGlyph {
            glyph_index,
            origin_x,
            metrics,
        });
    }
}

/// Greedy line filling state for one `shape` call.
struct LineBreaker<'a> {
    font: &'a fontdue::Font,
    font_size: f32,
    max_width: f32,
    rows: Vec<LineBuilder>,
    line: LineBuilder,
}

impl LineBreaker<'_> {
    fn break_line(&mut self) {
        self.rows.push(std::mem::take(&mut self.line));
    }

    fn place_separator(&mut self, glyph_index: u16) {
        self.line.push(self.font, self.font_size, glyph_index, false);
    }

    fn place_word(&mut self, word: &[u16]) {
        if word.is_empty() {
            return;
        }

        if !self.line.is_empty()
            && self.line.projected_width(self.font, self.font_size, word) > self.max_width
        {
            self.break_line();
        }

        if self.line.is_empty()
            && self.line.projected_width(self.font, self.font_size, word) > self.max_width
        {
            // The word is wider than a whole line: break it between glyphs.
            for &glyph_index in word {
                if !self.line.is_empty()
                    && self
                        .line
                        .projected_width(self.font, self.font_size, &[glyph_index])
                        > self.max_width
                {
                    self.break_line();
                }
                self.line.push(self.font, self.font_size, glyph_index, true);
            }
            return;
        }

        for &glyph_index in word {
            self.line.push(self.font, self.font_size, glyph_index, true);
        }
    }
}
