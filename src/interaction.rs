//! Routing classified hands into interaction state.
//!
//! One hand selects which text the particles form, the other steers them.
//! Which is which is decided by the detector's handedness label, configured
//! as the *selection hand*; every hand with the other label is a steering
//! hand.
//!
//! Each detection callback replaces the whole [`InteractionState`]. A
//! callback without a steering hand clears the steering hand, so the field
//! never reacts to a stale position after the hand leaves the frame.

use crate::gesture::{classify, GestureResult};
use crate::hand::{HandObservation, Handedness};
use glam::{Vec2, Vec3};
use std::fmt;

/// Lowest and highest selectable text index.
pub const SELECTION_RANGE: (u8, u8) = (1, 3);

/// Pose of the hand steering the particles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringHand {
    /// Anchor landmark in normalized camera space.
    pub position: Vec3,
    /// A fist attracts particles, an open hand repels them.
    pub is_fist: bool,
}

impl SteeringHand {
    pub fn mode(&self) -> SteeringMode {
        if self.is_fist {
            SteeringMode::Attracting
        } else {
            SteeringMode::Repelling
        }
    }

    /// Position as a fraction of the screen, un-mirrored for display.
    pub fn screen_fraction(&self) -> Vec2 {
        Vec2::new(1.0 - self.position.x, self.position.y)
    }
}

/// What the steering hand is doing to the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SteeringMode {
    Idle,
    Attracting,
    Repelling,
}

impl fmt::Display for SteeringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SteeringMode::Idle => write!(f, "Idle"),
            SteeringMode::Attracting => write!(f, "Attracting"),
            SteeringMode::Repelling => write!(f, "Repelling"),
        }
    }
}

/// Latest routed interaction, replaced once per detection callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionState {
    left_gesture_index: u8,
    steering_hand: Option<SteeringHand>,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self {
            left_gesture_index: SELECTION_RANGE.0,
            steering_hand: None,
        }
    }
}

impl InteractionState {
    /// Selected text, `1..=3`.
    pub fn left_gesture_index(&self) -> u8 {
        self.left_gesture_index
    }

    /// Zero-based slot of the selected text.
    pub fn text_slot(&self) -> usize {
        (self.left_gesture_index - SELECTION_RANGE.0) as usize
    }

    pub fn steering_hand(&self) -> Option<&SteeringHand> {
        self.steering_hand.as_ref()
    }

    pub fn steering_mode(&self) -> SteeringMode {
        self.steering_hand.map_or(SteeringMode::Idle, |h| h.mode())
    }
}

/// Result of routing one detection callback.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteOutcome {
    /// Whether the selected text changed.
    pub selection_changed: bool,
    /// Every hand's classification, in detector order.
    pub gestures: Vec<(Handedness, GestureResult)>,
}

/// Folds per-frame hand observations into [`InteractionState`].
#[derive(Debug, Clone, Copy)]
pub struct InteractionRouter {
    selection_hand: Handedness,
}

impl Default for InteractionRouter {
    fn default() -> Self {
        Self::new(Handedness::Right)
    }
}

impl InteractionRouter {
    /// A router treating hands labelled `selection_hand` as the selecting hand.
    pub fn new(selection_hand: Handedness) -> Self {
        Self { selection_hand }
    }

    pub fn selection_hand(&self) -> Handedness {
        self.selection_hand
    }

    /// Route one detection callback.
    ///
    /// When several hands share a label, the last one wins. With no
    /// selecting hand the selection is kept; with no steering hand the
    /// steering hand is cleared.
    pub fn route(&self, state: &mut InteractionState, hands: &[HandObservation]) -> RouteOutcome {
        let mut next = InteractionState {
            left_gesture_index: state.left_gesture_index,
            steering_hand: None,
        };
        let mut gestures = Vec::with_capacity(hands.len());

        for hand in hands {
            let gesture = classify(hand);
            if hand.handedness() == self.selection_hand {
                let (lo, hi) = SELECTION_RANGE;
                next.left_gesture_index = gesture.extended_finger_count.clamp(lo, hi);
            } else {
                next.steering_hand = Some(SteeringHand {
                    position: gesture.anchor_point,
                    is_fist: gesture.is_fist,
                });
            }
            gestures.push((hand.handedness(), gesture));
        }

        let selection_changed = next.left_gesture_index != state.left_gesture_index;
        *state = next;

        RouteOutcome {
            selection_changed,
            gestures,
        }
    }
}
