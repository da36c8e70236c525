//! Text to point-field sampling.
//!
//! The sampler draws a string onto an off-screen raster, scans it at a fixed
//! stride for lit pixels, maps those into a world-space rectangle centered on
//! the origin, and deals the lit points out to exactly `count` particles.
//!
//! # Size policy
//!
//! The font size is the smallest of three bounds:
//!
//! - width: `raster_width * margin / len * width_fit`, so long strings shrink,
//! - height: `raster_height * height_fraction`, so short wide viewports fit,
//! - the absolute cap `max_font_size`.
//!
//! Compact mode uses tighter margins and maps onto a narrower world span.
//!
//! # Dealing
//!
//! Lit points are shuffled before being dealt so that particles do not take
//! their targets in raster order, then repeated cyclically until every
//! particle has one. Each target gets its own small depth jitter. Sampling
//! the same text twice gives the same silhouette with a different
//! particle-to-point assignment.

use crate::config::SamplerConfig;
use crate::font::{BitmapFont, GlyphRasterizer};
use glam::{Vec2, Vec3};
use image::{ImageResult, RgbImage};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::path::Path;
use std::sync::Arc;

/// Largest raster height the sampler will allocate.
const MAX_RASTER_HEIGHT: u32 = 16_384;

/// Turns text into target point fields.
#[derive(Clone)]
pub struct GlyphFieldSampler {
    rasterizer: Arc<dyn GlyphRasterizer>,
    config: SamplerConfig,
}

impl GlyphFieldSampler {
    pub fn new(rasterizer: Arc<dyn GlyphRasterizer>, config: SamplerConfig) -> Self {
        Self { rasterizer, config }
    }

    /// A sampler using the built-in bitmap face and default parameters.
    pub fn builtin() -> Self {
        Self::new(Arc::new(BitmapFont), SamplerConfig::default())
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Raster dimensions for an aspect ratio, or `None` when no usable
    /// surface exists for it.
    pub fn raster_size(&self, aspect_ratio: f32) -> Option<(u32, u32)> {
        if !aspect_ratio.is_finite() || aspect_ratio <= 0.0 {
            return None;
        }
        let width = self.config.raster_width;
        let height = (width as f32 / aspect_ratio).round();
        if width == 0 || height < 1.0 || height > MAX_RASTER_HEIGHT as f32 {
            return None;
        }
        Some((width, height as u32))
    }

    /// Font size in raster pixels for `text` on a `width` x `height` raster.
    pub fn font_size(&self, text: &str, width: u32, height: u32, compact: bool) -> f32 {
        let profile = self.config.profile(compact);
        let len = text.chars().count().max(1) as f32;
        let by_width = width as f32 * profile.width_margin / len * self.config.width_fit;
        let by_height = height as f32 * profile.height_fraction;
        by_width.min(by_height).min(self.config.max_font_size)
    }

    /// Draw `text` white on black, centered, sized by the size policy.
    ///
    /// Returns `None` when no raster can be allocated for `aspect_ratio`.
    pub fn rasterize(&self, text: &str, aspect_ratio: f32, compact: bool) -> Option<RgbImage> {
        let (width, height) = self.raster_size(aspect_ratio)?;
        let mut canvas = RgbImage::new(width, height);
        let size = self.font_size(text, width, height, compact);
        self.rasterizer.draw_centered(&mut canvas, text, size);
        Some(canvas)
    }

    /// Write the raster for `text` to a PNG file.
    ///
    /// Writes nothing when no raster can be allocated.
    pub fn write_raster(&self, text: &str, aspect_ratio: f32, compact: bool, path: impl AsRef<Path>) -> ImageResult<()> {
        match self.rasterize(text, aspect_ratio, compact) {
            Some(canvas) => canvas.save(path),
            None => Ok(()),
        }
    }

    /// Lit pixels of the raster in world coordinates, in raster order.
    ///
    /// Empty when the text lights nothing or no raster is available.
    pub fn lit_points(&self, text: &str, aspect_ratio: f32, compact: bool) -> Vec<Vec2> {
        let Some(canvas) = self.rasterize(text, aspect_ratio, compact) else {
            return Vec::new();
        };

        let (width, height) = canvas.dimensions();
        let target_width = self.config.profile(compact).target_width;
        let target_height = target_width / aspect_ratio;
        let stride = self.config.stride.max(1) as usize;

        let mut points = Vec::new();
        for y in (0..height).step_by(stride) {
            for x in (0..width).step_by(stride) {
                if canvas.get_pixel(x, y)[0] > self.config.threshold {
                    points.push(Vec2::new(
                        (x as f32 / width as f32 - 0.5) * target_width,
                        -(y as f32 / height as f32 - 0.5) * target_height,
                    ));
                }
            }
        }
        points
    }

    /// Sample `count` target positions for `text`.
    pub fn sample(&self, text: &str, count: usize, aspect_ratio: f32, compact: bool) -> Vec<Vec3> {
        let mut rng = SmallRng::from_entropy();
        self.sample_with_rng(text, count, aspect_ratio, compact, &mut rng)
    }

    /// [`sample`](Self::sample) with a caller-provided random source.
    pub fn sample_with_rng<R: Rng + ?Sized>(
        &self,
        text: &str,
        count: usize,
        aspect_ratio: f32,
        compact: bool,
        rng: &mut R,
    ) -> Vec<Vec3> {
        let mut points = self.lit_points(text, aspect_ratio, compact);
        if points.is_empty() {
            return vec![Vec3::ZERO; count];
        }

        points.shuffle(rng);

        let jitter = self.config.depth_jitter;
        (0..count)
            .map(|i| {
                let p = points[i % points.len()];
                let z = (rng.gen::<f32>() - 0.5) * jitter;
                p.extend(z)
            })
            .collect()
    }
}

impl std::fmt::Debug for GlyphFieldSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphFieldSampler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn silhouette(points: &[Vec3]) -> HashSet<(u32, u32)> {
        points.iter().map(|p| (p.x.to_bits(), p.y.to_bits())).collect()
    }

    #[test]
    fn test_sample_length_matches_count() {
        let sampler = GlyphFieldSampler::builtin();
        let mut rng = SmallRng::seed_from_u64(7);
        for count in [1, 2, 17, 100, 5000] {
            let points = sampler.sample_with_rng("HELLO", count, 2.0, false, &mut rng);
            assert_eq!(points.len(), count);
        }
    }

    #[test]
    fn test_zero_lit_pixels_gives_origin_field() {
        let sampler = GlyphFieldSampler::builtin();
        for text in ["", "   ", "南航"] {
            let points = sampler.sample(text, 64, 2.0, false);
            assert_eq!(points.len(), 64);
            assert!(points.iter().all(|p| *p == Vec3::ZERO), "{text:?}");
        }
    }

    #[test]
    fn test_unusable_surface_gives_origin_field() {
        let sampler = GlyphFieldSampler::builtin();
        for aspect in [0.0, -1.0, f32::NAN, f32::INFINITY, 1.0e6] {
            assert!(sampler.raster_size(aspect).is_none());
            let points = sampler.sample("HI", 10, aspect, false);
            assert_eq!(points.len(), 10);
            assert!(points.iter().all(|p| *p == Vec3::ZERO));
        }
    }

    #[test]
    fn test_resample_keeps_silhouette() {
        let sampler = GlyphFieldSampler::builtin();
        let lit = sampler.lit_points("HI", 2.0, false).len();
        assert!(lit > 0);

        // Enough particles that every lit point is used at least once.
        let count = lit * 2;
        let a = sampler.sample_with_rng("HI", count, 2.0, false, &mut SmallRng::seed_from_u64(1));
        let b = sampler.sample_with_rng("HI", count, 2.0, false, &mut SmallRng::seed_from_u64(2));

        assert_eq!(silhouette(&a), silhouette(&b));
        assert_eq!(silhouette(&a).len(), lit);
        assert_ne!(a, b);
    }

    #[test]
    fn test_points_within_target_area() {
        let sampler = GlyphFieldSampler::builtin();
        let half_w = sampler.config().regular.target_width / 2.0;
        let half_h = half_w / 2.0;
        let jitter = sampler.config().depth_jitter / 2.0;
        for p in sampler.sample("I LOVE YOU", 2000, 2.0, false) {
            assert!(p.x >= -half_w && p.x <= half_w);
            assert!(p.y >= -half_h && p.y <= half_h);
            assert!(p.z >= -jitter && p.z < jitter);
        }
    }

    #[test]
    fn test_compact_mode_is_narrower() {
        let sampler = GlyphFieldSampler::builtin();
        let extent = |compact| {
            sampler
                .lit_points("HELLO", 2.0, compact)
                .iter()
                .fold(0.0f32, |m, p| m.max(p.x.abs()))
        };
        let regular = extent(false);
        let compact = extent(true);
        assert!(regular > 0.0);
        assert!(compact < regular);
        assert!(compact <= sampler.config().compact.target_width / 2.0);
    }

    #[test]
    fn test_font_size_policy() {
        let sampler = GlyphFieldSampler::builtin();
        // Short text on a tall raster: capped.
        assert_eq!(sampler.font_size("HI", 2048, 2048, false), 400.0);
        // Wide, short raster: height bound.
        let size = sampler.font_size("HI", 2048, 400, false);
        assert!((size - 240.0).abs() < 1e-3);
        let compact = sampler.font_size("HI", 2048, 400, true);
        assert!((compact - 200.0).abs() < 1e-3);
        // Long text: width bound shrinks with length.
        let long = sampler.font_size(&"A".repeat(30), 2048, 1024, false);
        assert!((long - 2048.0 * 0.85 / 30.0 * 1.6).abs() < 1e-3);
    }

    #[test]
    fn test_long_text_stays_on_raster() {
        let sampler = GlyphFieldSampler::builtin();
        let text = "W".repeat(30);
        let canvas = sampler.rasterize(&text, 2.0, true).unwrap();
        let (w, _) = canvas.dimensions();
        // Nothing lit in the outermost columns.
        for y in 0..canvas.height() {
            assert!(canvas.get_pixel(0, y)[0] == 0);
            assert!(canvas.get_pixel(w - 1, y)[0] == 0);
        }
    }
}
