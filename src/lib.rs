//! # Celestial Hands - particle text sculpture
//!
//! A cloud of particles that forms the silhouette of a chosen text and is
//! steered in real time by two tracked hands.
//!
//! One hand picks the text by holding up one, two or three fingers. The other
//! hand pushes particles away when open and pulls them in when closed into a
//! fist. When the hands leave the frame the particles settle back into the
//! text.
//!
//! ## Quick Start
//!
//! ```ignore
//! use celestial_hands::prelude::*;
//!
//! let mut sculpture = Sculpture::new(SculptureConfig::default(), Viewport::new(1280.0, 720.0));
//!
//! // Once per detector callback
//! sculpture.on_detection(&hands);
//!
//! // Once per rendered frame
//! sculpture.tick();
//! upload(sculpture.positions());
//! ```
//!
//! ## Core Concepts
//!
//! ### Target fields
//!
//! The active text is drawn into an off-screen raster, every fourth lit pixel
//! becomes a candidate point, and the candidates are shuffled and repeated
//! until every particle has a target. See [`GlyphFieldSampler`]. Sampling
//! runs on a background worker ([`FieldRegenerator`]); a finished
//! [`TargetField`] replaces the old one as a whole.
//!
//! ### Gestures
//!
//! Each [`HandObservation`] carries 21 landmarks. [`classify`] counts
//! extended fingers and detects a fist; [`InteractionRouter`] turns the
//! per-hand results into the selected text and the steering hand.
//!
//! ### Dynamics
//!
//! [`ParticleField::tick`] pulls every particle toward its target, applies
//! the steering hand's force inside its radius, damps and integrates. All
//! constants live in [`DynamicsConfig`].
//!
//! ## Feature Overview
//!
//! | Module | Provides |
//! |--------|----------|
//! | [`hand`], [`gesture`] | Landmarks, handedness, finger counting |
//! | [`interaction`] | Selection index and steering hand |
//! | [`font`], [`sampler`] | Glyph rasterizers and point sampling |
//! | [`target`] | Shared target fields and background regeneration |
//! | [`simulation`] | The spring-damped particle update |
//! | [`sculpture`] | Everything above behind `on_detection` / `tick` |
//! | [`config`], [`greeting`] | JSON config, persisted texts, greeting line |
//! | [`input`], [`gpu`], [`shader`] | Keyboard/mouse hands and the wgpu viewer |

pub mod config;
pub mod error;
pub mod font;
pub mod gesture;
pub mod gpu;
pub mod greeting;
pub mod hand;
pub mod input;
pub mod interaction;
pub mod sampler;
pub mod sculpture;
pub mod shader;
pub mod simulation;
pub mod synthetic;
pub mod target;

pub use config::{
    DynamicsConfig, FontSource, SamplerConfig, SculptureConfig, TextStore, Viewport, TEXT_SLOTS,
};
pub use error::{ConfigError, FontError, GpuError, GreetingError, ViewerError};
pub use font::{BitmapFont, GlyphRasterizer, OutlineFont};
pub use gesture::{classify, GestureResult};
pub use glam::{Vec2, Vec3};
pub use greeting::{resolve_greeting, GreetingSource, FALLBACK_GREETING, PLACEHOLDER_GREETING};
pub use hand::{HandObservation, Handedness, Landmark};
pub use interaction::{InteractionRouter, InteractionState, SteeringHand, SteeringMode};
pub use sampler::GlyphFieldSampler;
pub use sculpture::Sculpture;
pub use simulation::ParticleField;
pub use target::{FieldRegenerator, FieldRequest, TargetField};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use celestial_hands::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{SculptureConfig, Viewport};
    pub use crate::gesture::classify;
    pub use crate::hand::{HandObservation, Handedness};
    pub use crate::interaction::SteeringMode;
    pub use crate::sculpture::Sculpture;
    pub use crate::synthetic::HandPose;
    pub use crate::{Vec2, Vec3};
}
