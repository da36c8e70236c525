//! The sculpture: everything the render loop and the hand detector talk to.
//!
//! [`Sculpture`] owns the interaction state, the particle field and the
//! current target field. It has two entry points with independent cadences:
//!
//! - [`on_detection`](Sculpture::on_detection), called once per detector
//!   callback, routes hands and asks for a new target field when the
//!   selected text changes;
//! - [`tick`](Sculpture::tick), called once per rendered frame, installs any
//!   finished target field and advances the particles.
//!
//! Neither blocks on the other. Until the first target field is ready the
//! particles stay where they spawned.

use crate::config::{clamp_text, SculptureConfig, Viewport, TEXT_SLOTS};
use crate::font::load_rasterizer;
use crate::hand::HandObservation;
use crate::interaction::{InteractionRouter, InteractionState, RouteOutcome};
use crate::sampler::GlyphFieldSampler;
use crate::simulation::ParticleField;
use crate::target::{FieldRegenerator, FieldRequest, TargetField};
use tracing::{debug, info};

pub struct Sculpture {
    config: SculptureConfig,
    router: InteractionRouter,
    interaction: InteractionState,
    viewport: Viewport,
    particles: ParticleField,
    target: Option<TargetField>,
    regenerator: FieldRegenerator,
}

impl Sculpture {
    /// A sculpture sampling its target fields on a background worker.
    pub fn new(config: SculptureConfig, viewport: Viewport) -> Self {
        let sampler = GlyphFieldSampler::new(load_rasterizer(&config.font), config.sampler);
        let particles = ParticleField::new(config.particle_count, config.dynamics);
        Self::with_parts(config, viewport, particles, FieldRegenerator::spawn(sampler))
    }

    /// A sculpture sampling its target fields synchronously.
    pub fn new_inline(config: SculptureConfig, viewport: Viewport) -> Self {
        let sampler = GlyphFieldSampler::new(load_rasterizer(&config.font), config.sampler);
        let particles = ParticleField::new(config.particle_count, config.dynamics);
        Self::with_parts(config, viewport, particles, FieldRegenerator::inline(sampler))
    }

    /// Assemble a sculpture from prepared parts.
    ///
    /// The particle field's length is authoritative for the particle count.
    pub fn with_parts(
        mut config: SculptureConfig,
        viewport: Viewport,
        particles: ParticleField,
        regenerator: FieldRegenerator,
    ) -> Self {
        config.particle_count = particles.len();
        let mut sculpture = Self {
            router: InteractionRouter::new(config.selection_hand),
            interaction: InteractionState::default(),
            config,
            viewport,
            particles,
            target: None,
            regenerator,
        };
        info!(
            particles = sculpture.particles.len(),
            threaded = sculpture.regenerator.is_threaded(),
            "sculpture created"
        );
        sculpture.request_field();
        sculpture
    }

    pub fn config(&self) -> &SculptureConfig {
        &self.config
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn particles(&self) -> &ParticleField {
        &self.particles
    }

    /// The field particles are currently chasing, once one is ready.
    pub fn target(&self) -> Option<&TargetField> {
        self.target.as_ref()
    }

    /// Flat `x, y, z` position buffer for drawing.
    pub fn positions(&self) -> &[f32] {
        self.particles.position_buffer()
    }

    pub fn texts(&self) -> &[String; TEXT_SLOTS] {
        &self.config.texts
    }

    /// The text the particles are forming (or heading toward).
    pub fn active_text(&self) -> &str {
        &self.config.texts[self.interaction.text_slot()]
    }

    /// Fold one detector callback into the interaction state.
    pub fn on_detection(&mut self, hands: &[HandObservation]) -> RouteOutcome {
        let outcome = self.router.route(&mut self.interaction, hands);
        if outcome.selection_changed {
            debug!(index = self.interaction.left_gesture_index(), "selection changed");
            self.request_field();
        }
        outcome
    }

    /// Replace the text in `slot` (zero-based). Out-of-range slots are ignored.
    pub fn set_text(&mut self, slot: usize, text: &str) {
        let Some(current) = self.config.texts.get_mut(slot) else {
            return;
        };
        *current = clamp_text(text);
        if slot == self.interaction.text_slot() {
            self.request_field();
        }
    }

    /// Track a resized viewport. Regenerates when the layout changes.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        let changed = viewport.aspect_ratio() != self.viewport.aspect_ratio()
            || viewport.is_compact() != self.viewport.is_compact();
        self.viewport = viewport;
        if changed {
            self.request_field();
        }
    }

    /// Advance one frame. Returns `false` while no target field is ready.
    pub fn tick(&mut self) -> bool {
        if let Some(field) = self.regenerator.poll() {
            debug!(points = field.len(), "target field installed");
            self.target = Some(field);
        }
        let Some(target) = &self.target else {
            return false;
        };
        self.particles.tick(target, self.interaction.steering_hand());
        true
    }

    /// Block until the pending target field is installed, up to `timeout`.
    pub fn wait_for_field(&mut self, timeout: std::time::Duration) -> bool {
        if let Some(field) = self.regenerator.wait(timeout) {
            self.target = Some(field);
        }
        self.target.is_some()
    }

    fn request_field(&mut self) {
        self.regenerator.request(FieldRequest {
            text: self.active_text().to_string(),
            count: self.particles.len(),
            aspect_ratio: self.viewport.aspect_ratio(),
            compact: self.viewport.is_compact(),
        });
    }
}
