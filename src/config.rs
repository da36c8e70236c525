//! Configuration for the sculpture.
//!
//! Everything tunable lives in [`SculptureConfig`], which round-trips through
//! pretty-printed JSON. Every section carries `#[serde(default)]` so a config
//! file only needs the keys it wants to change.
//!
//! The three user texts are persisted separately by [`TextStore`], since they
//! change at runtime while the rest of the config does not.

use crate::error::ConfigError;
use crate::hand::Handedness;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Number of selectable target texts.
pub const TEXT_SLOTS: usize = 3;

/// Longest text a slot accepts, in characters.
pub const MAX_TEXT_CHARS: usize = 30;

/// Viewports narrower than this (logical pixels) use the compact layout.
pub const COMPACT_BREAKPOINT: f32 = 768.0;

/// Texts shown before the user customizes anything.
pub fn default_texts() -> [String; TEXT_SLOTS] {
    ["HELLO".to_string(), "南航".to_string(), "I LOVE YOU".to_string()]
}

/// Truncate a user-entered text to [`MAX_TEXT_CHARS`] characters.
pub fn clamp_text(text: &str) -> String {
    text.chars().take(MAX_TEXT_CHARS).collect()
}

/// Size of the drawable area in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width over height. Degenerate sizes fall back to 2:1.
    pub fn aspect_ratio(&self) -> f32 {
        if self.width > 0.0 && self.height > 0.0 {
            self.width / self.height
        } else {
            2.0
        }
    }

    /// Whether the viewport is narrow enough for the compact layout.
    pub fn is_compact(&self) -> bool {
        self.width < COMPACT_BREAKPOINT
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// Constants of the per-tick particle update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicsConfig {
    /// Fraction of the remaining distance to the target added to velocity each tick.
    pub return_speed: f32,
    /// Velocity multiplier applied each tick.
    pub damping: f32,
    /// World-space radius of the steering hand's influence.
    pub interaction_radius: f32,
    /// Strength of the open-hand repulsion.
    pub push_strength: f32,
    /// Strength of the fist attraction.
    pub pull_strength: f32,
    /// World-space extent covered by the camera frame, horizontally and vertically.
    pub hand_span: [f32; 2],
    /// World units per unit of landmark depth.
    pub hand_depth_scale: f32,
    /// Half-extents of the box particles start in.
    pub spawn_extent: [f32; 3],
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            return_speed: 0.8,
            damping: 0.65,
            interaction_radius: 3.5,
            push_strength: 0.4,
            pull_strength: 0.3,
            hand_span: [20.0, 12.0],
            hand_depth_scale: 10.0,
            spawn_extent: [10.0, 5.0, 2.5],
        }
    }
}

/// Margins and world extent for one layout mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutProfile {
    /// Fraction of the raster width the text may occupy.
    pub width_margin: f32,
    /// Fraction of the raster height the font size may reach.
    pub height_fraction: f32,
    /// World-space width the raster maps onto.
    pub target_width: f32,
}

/// Rasterization and sampling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Raster width in pixels; height follows the aspect ratio.
    pub raster_width: u32,
    /// Sample every `stride`-th pixel in both axes.
    pub stride: u32,
    /// Red-channel value a pixel must exceed to count as lit.
    pub threshold: u8,
    /// Absolute cap on the font size in pixels.
    pub max_font_size: f32,
    /// Average glyph advance relative to the font size, used to fit by width.
    pub width_fit: f32,
    /// Full extent of the random depth jitter (centered on zero).
    pub depth_jitter: f32,
    pub regular: LayoutProfile,
    pub compact: LayoutProfile,
}

impl SamplerConfig {
    /// The layout profile for a mode.
    pub fn profile(&self, compact: bool) -> &LayoutProfile {
        if compact {
            &self.compact
        } else {
            &self.regular
        }
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            raster_width: 2048,
            stride: 4,
            threshold: 128,
            max_font_size: 400.0,
            width_fit: 1.6,
            depth_jitter: 0.2,
            regular: LayoutProfile {
                width_margin: 0.85,
                height_fraction: 0.6,
                target_width: 14.0,
            },
            compact: LayoutProfile {
                width_margin: 0.7,
                height_fraction: 0.5,
                target_width: 10.0,
            },
        }
    }
}

/// Where glyph shapes come from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FontSource {
    /// A bold sans-serif face installed on the system, preferring CJK families.
    #[default]
    System,
    /// The built-in 8x8 bitmap face.
    Builtin,
    /// A TrueType/OpenType file on disk.
    File { path: PathBuf },
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SculptureConfig {
    pub particle_count: usize,
    pub texts: [String; TEXT_SLOTS],
    /// Detector label of the hand that selects the text. The other hand steers.
    pub selection_hand: Handedness,
    pub dynamics: DynamicsConfig,
    pub sampler: SamplerConfig,
    pub font: FontSource,
}

impl Default for SculptureConfig {
    fn default() -> Self {
        Self {
            particle_count: 8000,
            texts: default_texts(),
            selection_hand: Handedness::Right,
            dynamics: DynamicsConfig::default(),
            sampler: SamplerConfig::default(),
            font: FontSource::System,
        }
    }
}

impl SculptureConfig {
    /// Load a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&json)?;
        config.texts = config.texts.map(|t| clamp_text(&t));
        Ok(config)
    }

    /// Save the config as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a config, falling back to defaults when the file is missing or bad.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                debug!(path = %path.display(), "loaded config");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "using default config");
                Self::default()
            }
        }
    }
}

/// Persistent storage for the user's texts.
#[derive(Debug, Clone)]
pub struct TextStore {
    path: PathBuf,
}

impl TextStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored texts, or the defaults when nothing usable is stored.
    pub fn load(&self) -> [String; TEXT_SLOTS] {
        match self.try_load() {
            Ok(texts) => texts,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "no stored texts");
                default_texts()
            }
        }
    }

    fn try_load(&self) -> Result<[String; TEXT_SLOTS], ConfigError> {
        let json = fs::read_to_string(&self.path)?;
        let texts: [String; TEXT_SLOTS] = serde_json::from_str(&json)?;
        Ok(texts.map(|t| clamp_text(&t)))
    }

    /// Write the texts, replacing whatever was stored.
    pub fn save(&self, texts: &[String; TEXT_SLOTS]) -> Result<(), ConfigError> {
        let json = serde_json::to_string(texts)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("celestial-hands-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_viewport_layout() {
        let desktop = Viewport::new(1600.0, 800.0);
        assert!((desktop.aspect_ratio() - 2.0).abs() < 1e-6);
        assert!(!desktop.is_compact());

        let phone = Viewport::new(390.0, 844.0);
        assert!(phone.is_compact());

        let collapsed = Viewport::new(0.0, 0.0);
        assert_eq!(collapsed.aspect_ratio(), 2.0);
    }

    #[test]
    fn test_clamp_text_counts_characters() {
        let long = "南".repeat(40);
        assert_eq!(clamp_text(&long).chars().count(), MAX_TEXT_CHARS);
        assert_eq!(clamp_text("HI"), "HI");
    }

    #[test]
    fn test_config_round_trip() {
        let path = temp_path("config.json");
        let mut config = SculptureConfig::default();
        config.particle_count = 1234;
        config.font = FontSource::File { path: PathBuf::from("/fonts/bold.ttf") };
        config.save(&path).unwrap();

        let loaded = SculptureConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: SculptureConfig =
            serde_json::from_str(r#"{ "particle_count": 50, "dynamics": { "damping": 0.5 } }"#).unwrap();
        assert_eq!(config.particle_count, 50);
        assert_eq!(config.dynamics.damping, 0.5);
        assert_eq!(config.dynamics.return_speed, 0.8);
        assert_eq!(config.texts, default_texts());
        assert_eq!(config.selection_hand, Handedness::Right);
        assert_eq!(config.font, FontSource::System);
    }

    #[test]
    fn test_font_source_tags() {
        let system: FontSource = serde_json::from_str(r#"{ "kind": "system" }"#).unwrap();
        assert_eq!(system, FontSource::System);
        let builtin: FontSource = serde_json::from_str(r#"{ "kind": "builtin" }"#).unwrap();
        assert_eq!(builtin, FontSource::Builtin);
    }

    #[test]
    fn test_missing_config_falls_back() {
        let config = SculptureConfig::load_or_default(temp_path("does-not-exist.json"));
        assert_eq!(config, SculptureConfig::default());
    }

    #[test]
    fn test_text_store_round_trip() {
        let store = TextStore::new(temp_path("texts.json"));
        let texts = ["ONE".to_string(), "二".to_string(), "THREE".to_string()];
        store.save(&texts).unwrap();
        assert_eq!(store.load(), texts);
        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn test_text_store_corrupt_file_gives_defaults() {
        let store = TextStore::new(temp_path("corrupt-texts.json"));
        fs::write(store.path(), "not json").unwrap();
        assert_eq!(store.load(), default_texts());
        let _ = fs::remove_file(store.path());
    }
}
