//! Glyph rasterizers.
//!
//! A [`GlyphRasterizer`] draws a line of text, centered, white onto a black
//! RGB canvas. Two faces are provided:
//!
//! - [`BitmapFont`]: the built-in 8x8 bitmap face. Always available, covers
//!   Basic Latin, Latin-1, Greek, Hiragana, box drawing and block elements.
//! - [`OutlineFont`]: any TrueType/OpenType face, either a file on disk or
//!   a bold sans-serif face found among the installed system fonts. This is
//!   the face for scripts the bitmap face lacks (CJK in particular).
//!
//! Characters a face has no glyph for still take up their advance but light
//! no pixels, so a string made only of unsupported characters rasterizes to
//! an empty field.

use crate::config::FontSource;
use crate::error::FontError;
use ab_glyph::{point, Font, FontVec, GlyphId, PxScale, ScaleFont};
use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use font8x8::{UnicodeFonts, BASIC_FONTS, BLOCK_FONTS, BOX_FONTS, GREEK_FONTS, HIRAGANA_FONTS, LATIN_FONTS};
use image::{Rgb, RgbImage};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Something that can draw text onto a canvas.
pub trait GlyphRasterizer: Send + Sync {
    /// Draw `text` at `size` pixels, centered horizontally and vertically.
    fn draw_centered(&self, canvas: &mut RgbImage, text: &str, size: f32);
}

/// Raise a pixel to at least `value` on every channel.
#[inline]
fn lighten(canvas: &mut RgbImage, x: i64, y: i64, value: u8) {
    if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
        return;
    }
    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    if pixel[0] < value {
        *pixel = Rgb([value, value, value]);
    }
}

// ============================================================================
// Bitmap face
// ============================================================================

/// Horizontal advance of a bitmap glyph as a fraction of the font size.
///
/// Narrower than the 8x8 cell so the face has the proportions of a bold sans
/// and the width-fit heuristics of the sampler hold.
const BITMAP_ADVANCE: f32 = 0.625;

/// The built-in 8x8 bitmap face, scaled to the requested size.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitmapFont;

impl BitmapFont {
    /// Row bitmaps for a character, bit 0 leftmost.
    pub fn glyph(c: char) -> Option<[u8; 8]> {
        BASIC_FONTS
            .get(c)
            .or_else(|| LATIN_FONTS.get(c))
            .or_else(|| GREEK_FONTS.get(c))
            .or_else(|| HIRAGANA_FONTS.get(c))
            .or_else(|| BOX_FONTS.get(c))
            .or_else(|| BLOCK_FONTS.get(c))
    }
}

impl GlyphRasterizer for BitmapFont {
    fn draw_centered(&self, canvas: &mut RgbImage, text: &str, size: f32) {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() || size <= 0.0 {
            return;
        }

        let advance = size * BITMAP_ADVANCE;
        let cell_w = advance / 8.0;
        let cell_h = size / 8.0;
        let left = canvas.width() as f32 / 2.0 - advance * chars.len() as f32 / 2.0;
        let top = canvas.height() as f32 / 2.0 - size / 2.0;

        for (i, &c) in chars.iter().enumerate() {
            let Some(rows) = Self::glyph(c) else {
                continue;
            };
            let origin_x = left + advance * i as f32;

            for (row, bits) in rows.iter().enumerate() {
                let y0 = (top + row as f32 * cell_h).round() as i64;
                let y1 = (top + (row + 1) as f32 * cell_h).round() as i64;
                for col in 0..8 {
                    if bits & (1 << col) == 0 {
                        continue;
                    }
                    let x0 = (origin_x + col as f32 * cell_w).round() as i64;
                    let x1 = (origin_x + (col + 1) as f32 * cell_w).round() as i64;
                    for y in y0..y1 {
                        for x in x0..x1 {
                            lighten(canvas, x, y, 255);
                        }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Outline face
// ============================================================================

/// Installed families tried for [`FontSource::System`], most preferred first.
///
/// CJK families lead because they also carry Latin glyphs.
const SYSTEM_FAMILIES: &[&str] = &[
    "Noto Sans CJK SC",
    "Noto Sans SC",
    "Source Han Sans SC",
    "Source Han Sans CN",
    "PingFang SC",
    "Hiragino Sans GB",
    "Microsoft YaHei",
    "WenQuanYi Zen Hei",
    "WenQuanYi Micro Hei",
    "Noto Sans",
    "DejaVu Sans",
    "Liberation Sans",
    "Helvetica",
    "Arial",
];

/// A scalable face parsed from a TrueType/OpenType file.
pub struct OutlineFont {
    font: FontVec,
}

impl OutlineFont {
    /// Parse a face from raw font bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, FontError> {
        Self::from_bytes_and_index(data, 0)
    }

    /// Parse face `index` of a font file or collection (`.ttc`).
    pub fn from_bytes_and_index(data: Vec<u8>, index: u32) -> Result<Self, FontError> {
        Ok(Self {
            font: FontVec::try_from_vec_and_index(data, index)?,
        })
    }

    /// Read and parse a face from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FontError> {
        Self::from_bytes(std::fs::read(path)?)
    }

    /// The boldest upright sans-serif face among the installed fonts.
    pub fn system() -> Result<Self, FontError> {
        let mut db = Database::new();
        db.load_system_fonts();
        Self::from_database(&db)
    }

    /// The best bold sans-serif match in `db`.
    ///
    /// The preferred families are tried in order, then the
    /// database's generic sans-serif family.
    pub fn from_database(db: &Database) -> Result<Self, FontError> {
        let families: Vec<Family<'_>> = SYSTEM_FAMILIES
            .iter()
            .map(|name| Family::Name(*name))
            .chain(std::iter::once(Family::SansSerif))
            .collect();
        let query = Query {
            families: &families,
            weight: Weight::BOLD,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };

        let id = db.query(&query).ok_or(FontError::NoSystemFace)?;
        if let Some(face) = db.face(id) {
            debug!(
                family = face.families.first().map(|(name, _)| name.as_str()).unwrap_or_default(),
                weight = face.weight.0,
                "matched system font"
            );
        }
        db.with_face_data(id, |data, index| Self::from_bytes_and_index(data.to_vec(), index))
            .ok_or(FontError::NoSystemFace)?
    }

    /// Whether the face has a glyph for `c`.
    pub fn covers(&self, c: char) -> bool {
        self.font.glyph_id(c).0 != 0
    }
}

impl std::fmt::Debug for OutlineFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutlineFont")
            .field("glyphs", &self.font.glyph_count())
            .finish()
    }
}

impl GlyphRasterizer for OutlineFont {
    fn draw_centered(&self, canvas: &mut RgbImage, text: &str, size: f32) {
        if text.is_empty() || size <= 0.0 {
            return;
        }

        let scale = PxScale::from(size);
        let scaled = self.font.as_scaled(scale);

        // Lay out once to measure, then draw.
        let mut caret = 0.0;
        let mut previous: Option<GlyphId> = None;
        let mut placed = Vec::with_capacity(text.len());
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            placed.push((id, caret));
            caret += scaled.h_advance(id);
            previous = Some(id);
        }

        let left = canvas.width() as f32 / 2.0 - caret / 2.0;
        // Middle of the em box sits on the canvas center line.
        let baseline = canvas.height() as f32 / 2.0 + (scaled.ascent() + scaled.descent()) / 2.0;

        for (id, offset) in placed {
            // Glyph 0 is .notdef, the face has nothing for this character.
            if id.0 == 0 {
                continue;
            }
            let glyph = id.with_scale_and_position(scale, point(left + offset, baseline));
            let Some(outlined) = self.font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let value = (coverage.clamp(0.0, 1.0) * 255.0) as u8;
                lighten(
                    canvas,
                    bounds.min.x as i64 + gx as i64,
                    bounds.min.y as i64 + gy as i64,
                    value,
                );
            });
        }
    }
}

/// Resolve a configured font source into a rasterizer.
///
/// A face that cannot be loaded is logged and replaced by the bitmap face.
pub fn load_rasterizer(source: &FontSource) -> Arc<dyn GlyphRasterizer> {
    match source {
        FontSource::System => match OutlineFont::system() {
            Ok(font) => {
                info!(glyphs = font.font.glyph_count(), "loaded system font");
                Arc::new(font)
            }
            Err(e) => {
                warn!(error = %e, "falling back to bitmap font");
                Arc::new(BitmapFont)
            }
        },
        FontSource::Builtin => Arc::new(BitmapFont),
        FontSource::File { path } => match OutlineFont::from_file(path) {
            Ok(font) => {
                info!(path = %path.display(), "loaded outline font");
                Arc::new(font)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "falling back to bitmap font");
                Arc::new(BitmapFont)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Cantarell Regular, SIL Open Font License 1.1. Covers Latin only.
    const CANTARELL: &[u8] = include_bytes!("../tests/fixtures/Cantarell-Regular.ttf");

    fn lit_count(canvas: &RgbImage) -> usize {
        canvas.pixels().filter(|p| p[0] > 128).count()
    }

    /// Bounding box of lit pixels as `(min_x, max_x, min_y, max_y)`.
    fn lit_bounds(canvas: &RgbImage) -> (u32, u32, u32, u32) {
        let (mut min_x, mut max_x, mut min_y, mut max_y) = (u32::MAX, 0, u32::MAX, 0);
        for (x, y, p) in canvas.enumerate_pixels() {
            if p[0] > 128 {
                min_x = min_x.min(x);
                max_x = max_x.max(x);
                min_y = min_y.min(y);
                max_y = max_y.max(y);
            }
        }
        (min_x, max_x, min_y, max_y)
    }

    fn cantarell() -> OutlineFont {
        OutlineFont::from_bytes(CANTARELL.to_vec()).unwrap()
    }

    #[test]
    fn test_bitmap_coverage() {
        assert!(BitmapFont::glyph('A').is_some());
        assert!(BitmapFont::glyph('é').is_some());
        assert!(BitmapFont::glyph('あ').is_some());
        assert!(BitmapFont::glyph('南').is_none());
    }

    #[test]
    fn test_bitmap_draws_centered() {
        let mut canvas = RgbImage::new(400, 200);
        BitmapFont.draw_centered(&mut canvas, "I", 80.0);
        assert!(lit_count(&canvas) > 0);

        let (mut min_x, mut max_x) = (u32::MAX, 0);
        for (x, _, p) in canvas.enumerate_pixels() {
            if p[0] > 128 {
                min_x = min_x.min(x);
                max_x = max_x.max(x);
            }
        }
        let mid = (min_x + max_x) as f32 / 2.0;
        assert!((mid - 200.0).abs() < 20.0, "glyph centered at {mid}");
    }

    #[test]
    fn test_unsupported_glyphs_light_nothing() {
        let mut canvas = RgbImage::new(400, 200);
        BitmapFont.draw_centered(&mut canvas, "南航", 80.0);
        assert_eq!(lit_count(&canvas), 0);
    }

    #[test]
    fn test_drawing_clips_to_canvas() {
        let mut canvas = RgbImage::new(64, 32);
        BitmapFont.draw_centered(&mut canvas, "WWWWWWWW", 200.0);
        assert!(lit_count(&canvas) > 0);
    }

    #[test]
    fn test_missing_font_falls_back() {
        let source = FontSource::File {
            path: "/nonexistent/font.ttf".into(),
        };
        let rasterizer = load_rasterizer(&source);
        let mut canvas = RgbImage::new(400, 200);
        rasterizer.draw_centered(&mut canvas, "HI", 80.0);
        assert!(lit_count(&canvas) > 0);
    }

    #[test]
    fn test_outline_draws_centered() {
        let mut canvas = RgbImage::new(400, 200);
        cantarell().draw_centered(&mut canvas, "HI", 80.0);
        assert!(lit_count(&canvas) > 100);

        let (min_x, max_x, min_y, max_y) = lit_bounds(&canvas);
        let (cx, cy) = ((min_x + max_x) as f32 / 2.0, (min_y + max_y) as f32 / 2.0);
        assert!((cx - 200.0).abs() < 10.0, "text centered at x = {cx}");
        assert!((cy - 100.0).abs() < 12.0, "text centered at y = {cy}");
    }

    #[test]
    fn test_outline_missing_glyphs_light_nothing() {
        let font = cantarell();
        assert!(font.covers('H'));
        assert!(!font.covers('南'));

        let mut canvas = RgbImage::new(400, 200);
        font.draw_centered(&mut canvas, "南航", 80.0);
        assert_eq!(lit_count(&canvas), 0);

        // Unsupported characters still advance the caret.
        let mut plain = RgbImage::new(400, 200);
        let mut spaced = RgbImage::new(400, 200);
        font.draw_centered(&mut plain, "II", 80.0);
        font.draw_centered(&mut spaced, "I南I", 80.0);
        let (plain_left, plain_right, ..) = lit_bounds(&plain);
        let (spaced_left, spaced_right, ..) = lit_bounds(&spaced);
        assert!(spaced_right - spaced_left > plain_right - plain_left + 10);
    }

    #[test]
    fn test_font_file_source_uses_outline_face() {
        let path = std::env::temp_dir().join(format!("celestial-hands-{}-font.ttf", std::process::id()));
        std::fs::write(&path, CANTARELL).unwrap();
        let rasterizer = load_rasterizer(&FontSource::File { path: path.clone() });
        let _ = std::fs::remove_file(&path);

        let mut loaded = RgbImage::new(400, 200);
        rasterizer.draw_centered(&mut loaded, "HI", 80.0);
        let mut direct = RgbImage::new(400, 200);
        cantarell().draw_centered(&mut direct, "HI", 80.0);
        let mut bitmap = RgbImage::new(400, 200);
        BitmapFont.draw_centered(&mut bitmap, "HI", 80.0);

        assert_eq!(loaded, direct);
        assert_ne!(loaded, bitmap);
    }

    #[test]
    fn test_system_face_query() {
        let mut db = Database::new();
        assert!(matches!(OutlineFont::from_database(&db), Err(FontError::NoSystemFace)));

        // Only reachable as the generic sans-serif family.
        db.load_font_data(CANTARELL.to_vec());
        db.set_sans_serif_family("Cantarell");
        let font = OutlineFont::from_database(&db).unwrap();
        let mut canvas = RgbImage::new(400, 200);
        font.draw_centered(&mut canvas, "HI", 80.0);
        assert!(lit_count(&canvas) > 0);
    }

    #[test]
    fn test_invalid_font_bytes() {
        let err = OutlineFont::from_bytes(vec![0u8; 16]).unwrap_err();
        assert!(matches!(err, FontError::InvalidFont(_)));
    }
}
