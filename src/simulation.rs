//! Particle field simulation.
//!
//! Every particle chases its own target point with a proportional pull,
//! optionally pushed or pulled by the steering hand, then damped and
//! integrated with one implicit unit step per tick:
//!
//! ```text
//! v += (target - p) * return_speed
//! v += (p - hand) * falloff * push     (open hand, within radius)
//! v -= (p - hand) * falloff * pull     (fist, within radius)
//! v *= damping
//! p += v
//! ```
//!
//! `falloff` is `1 - distance / radius`. There is no mass, no fixed timestep
//! and no coupling between particles, so the update is frame-rate dependent
//! and every particle is independent of the others.
//!
//! Particle `i` always chases `target[i]`. Swapping in a new target field
//! retargets every particle on the next tick without touching its position
//! or velocity, which gives the cross-morph between texts.

use crate::config::DynamicsConfig;
use crate::interaction::SteeringHand;
use crate::target::TargetField;
use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Position and velocity state for every particle.
#[derive(Debug, Clone)]
pub struct ParticleField {
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    dynamics: DynamicsConfig,
}

impl ParticleField {
    /// `count` particles scattered over the spawn box, at rest.
    pub fn new(count: usize, dynamics: DynamicsConfig) -> Self {
        Self::with_rng(count, dynamics, &mut SmallRng::from_entropy())
    }

    /// [`new`](Self::new) with a caller-provided random source.
    pub fn with_rng<R: Rng + ?Sized>(count: usize, dynamics: DynamicsConfig, rng: &mut R) -> Self {
        let [ex, ey, ez] = dynamics.spawn_extent;
        let positions = (0..count)
            .map(|_| {
                Vec3::new(
                    (rng.gen::<f32>() - 0.5) * 2.0 * ex,
                    (rng.gen::<f32>() - 0.5) * 2.0 * ey,
                    (rng.gen::<f32>() - 0.5) * 2.0 * ez,
                )
            })
            .collect();
        Self::from_positions(positions, dynamics)
    }

    /// Particles at the given positions, at rest.
    pub fn from_positions(positions: Vec<Vec3>, dynamics: DynamicsConfig) -> Self {
        let velocities = vec![Vec3::ZERO; positions.len()];
        Self {
            positions,
            velocities,
            dynamics,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn dynamics(&self) -> &DynamicsConfig {
        &self.dynamics
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    /// Positions as a flat `x, y, z` buffer of length `3 * len()`, ready for
    /// upload as a vertex buffer.
    pub fn position_buffer(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Map a normalized, mirrored camera-space point into world space.
    ///
    /// The camera image is mirrored, so `x` is flipped; `y` grows downward
    /// in the image and upward in the world; depth is scaled and flipped.
    pub fn hand_to_world(&self, landmark: Vec3) -> Vec3 {
        let [span_x, span_y] = self.dynamics.hand_span;
        Vec3::new(
            (1.0 - landmark.x - 0.5) * span_x,
            -(landmark.y - 0.5) * span_y,
            -landmark.z * self.dynamics.hand_depth_scale,
        )
    }

    /// Advance one frame toward `target`, steered by `hand` if present.
    pub fn tick(&mut self, target: &TargetField, hand: Option<&SteeringHand>) {
        debug_assert_eq!(target.len(), self.len(), "target field must cover every particle");

        let DynamicsConfig {
            return_speed,
            damping,
            interaction_radius: radius,
            push_strength,
            pull_strength,
            ..
        } = self.dynamics;

        // Positive pushes away from the hand, negative pulls toward it.
        let hand = hand.map(|h| {
            let strength = if h.is_fist { -pull_strength } else { push_strength };
            (self.hand_to_world(h.position), strength)
        });

        for ((p, v), &goal) in self
            .positions
            .iter_mut()
            .zip(self.velocities.iter_mut())
            .zip(target.points())
        {
            *v += (goal - *p) * return_speed;

            if let Some((hand_pos, strength)) = hand {
                let offset = *p - hand_pos;
                let dist = offset.length();
                if dist < radius {
                    let falloff = 1.0 - dist / radius;
                    *v += offset * falloff * strength;
                }
            }

            *v *= damping;
            *p += *v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand_at_world(field: &ParticleField, world: Vec3, is_fist: bool) -> SteeringHand {
        // Invert hand_to_world.
        let [sx, sy] = field.dynamics().hand_span;
        let landmark = Vec3::new(
            0.5 - world.x / sx,
            0.5 - world.y / sy,
            -world.z / field.dynamics().hand_depth_scale,
        );
        SteeringHand { position: landmark, is_fist }
    }

    #[test]
    fn test_spawn_within_extent() {
        let dynamics = DynamicsConfig::default();
        let field = ParticleField::with_rng(1000, dynamics, &mut SmallRng::seed_from_u64(3));
        assert_eq!(field.len(), 1000);
        for (p, v) in field.positions().iter().zip(field.velocities()) {
            assert!(p.x.abs() <= 10.0 && p.y.abs() <= 5.0 && p.z.abs() <= 2.5);
            assert_eq!(*v, Vec3::ZERO);
        }
    }

    #[test]
    fn test_position_buffer_layout() {
        let field = ParticleField::from_positions(
            vec![Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)],
            DynamicsConfig::default(),
        );
        assert_eq!(field.position_buffer(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_converges_to_stationary_target() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut field = ParticleField::with_rng(500, DynamicsConfig::default(), &mut rng);
        let target = TargetField::new(
            (0..500)
                .map(|_| Vec3::new(rng.gen_range(-7.0..7.0), rng.gen_range(-3.5..3.5), 0.0))
                .collect(),
        );

        for _ in 0..200 {
            field.tick(&target, None);
        }
        for (p, t) in field.positions().iter().zip(target.points()) {
            assert!(p.distance(*t) < 1e-4, "{p} vs {t}");
        }
    }

    #[test]
    fn test_first_tick_matches_update_rule() {
        let dynamics = DynamicsConfig::default();
        let mut field = ParticleField::from_positions(vec![Vec3::ZERO], dynamics);
        let target = TargetField::new(vec![Vec3::new(1.0, 0.0, 0.0)]);
        field.tick(&target, None);
        // v = (1 * 0.8) * 0.65, p = v
        let expected = 0.8 * 0.65;
        assert!((field.positions()[0].x - expected).abs() < 1e-6);
        assert!((field.velocities()[0].x - expected).abs() < 1e-6);
    }

    #[test]
    fn test_hand_to_world_mapping() {
        let field = ParticleField::from_positions(Vec::new(), DynamicsConfig::default());
        assert_eq!(field.hand_to_world(Vec3::new(0.5, 0.5, 0.0)), Vec3::ZERO);
        let corner = field.hand_to_world(Vec3::new(0.0, 0.0, 0.1));
        assert!((corner - Vec3::new(10.0, 6.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_open_hand_pushes_and_fist_pulls() {
        let dynamics = DynamicsConfig::default();
        let start = Vec3::new(1.0, 0.0, 0.0);
        let target = TargetField::new(vec![start]);

        let mut idle = ParticleField::from_positions(vec![start], dynamics);
        idle.tick(&target, None);
        assert_eq!(idle.positions()[0], start);

        let mut pushed = ParticleField::from_positions(vec![start], dynamics);
        let open = hand_at_world(&pushed, Vec3::ZERO, false);
        pushed.tick(&target, Some(&open));
        assert!(pushed.positions()[0].x > start.x);

        let mut pulled = ParticleField::from_positions(vec![start], dynamics);
        let fist = hand_at_world(&pulled, Vec3::ZERO, true);
        pulled.tick(&target, Some(&fist));
        assert!(pulled.positions()[0].x < start.x);

        // Linear falloff: 1 - 1/3.5 at distance 1.
        let falloff = 1.0 - 1.0 / 3.5;
        let expected_push = start.x + falloff * 0.4 * 0.65;
        assert!((pushed.positions()[0].x - expected_push).abs() < 1e-5);
    }

    #[test]
    fn test_hand_outside_radius_has_no_effect() {
        let dynamics = DynamicsConfig::default();
        let start = Vec3::new(5.0, 0.0, 0.0);
        let target = TargetField::new(vec![start]);
        let mut field = ParticleField::from_positions(vec![start], dynamics);
        let hand = hand_at_world(&field, Vec3::ZERO, false);
        field.tick(&target, Some(&hand));
        assert_eq!(field.positions()[0], start);
    }

    #[test]
    fn test_retarget_keeps_motion() {
        let dynamics = DynamicsConfig::default();
        let mut field = ParticleField::from_positions(vec![Vec3::ZERO; 3], dynamics);
        let first = TargetField::new(vec![Vec3::X; 3]);
        field.tick(&first, None);
        let velocity_before = field.velocities()[0];
        assert!(velocity_before.x > 0.0);

        let second = TargetField::new(vec![-Vec3::X; 3]);
        let position_before = field.positions()[0];
        field.tick(&second, None);
        // Carries its velocity into the new pull rather than restarting.
        let expected = (velocity_before + (-Vec3::X - position_before) * 0.8) * 0.65;
        assert!((field.velocities()[0] - expected).length() < 1e-6);

        for _ in 0..200 {
            field.tick(&second, None);
        }
        assert!(field.positions()[0].distance(-Vec3::X) < 1e-4);
    }
}
