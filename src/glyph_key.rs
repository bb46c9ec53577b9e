/// Font sizes are stored in 1/256 px steps so keys stay hashable.
pub const SUB_PIXEL_QUANTIZE: f32 = 256f32;

/// Identifies one rasterized glyph: face, glyph index and size.
///
/// Keys are only meaningful within the process that produced them; face ids
/// are assigned by `fontdb` at load time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GlyphKey {
    font_id: fontdb::ID,
    glyph_index: u16,
    quantized_size: u32,
}

impl GlyphKey {
    pub fn new(font_id: fontdb::ID, glyph_index: u16, font_size: f32) -> Self {
        Self {
            font_id,
            glyph_index,
            quantized_size: (font_size.max(0.0) * SUB_PIXEL_QUANTIZE).round() as u32,
        }
    }

    pub fn font_id(&self) -> fontdb::ID {
        self.font_id
    }

    pub fn glyph_index(&self) -> u16 {
        self.glyph_index
    }

    pub fn font_size(&self) -> f32 {
        self.quantized_size as f32 / SUB_PIXEL_QUANTIZE
    }
}

/// 8-bit coverage mask of a single glyph, row-major, top-left origin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphCoverage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GlyphCoverage {
    /// Coverage at `(x, y)`, zero outside the mask.
    pub fn at(&self, x: usize, y: usize) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.data.get(y * self.width + x).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}
