//! Finger counting and fist detection from hand landmarks.
//!
//! Both tests are cheap geometric heuristics on normalized coordinates, not a
//! trained pose classifier:
//!
//! - A finger counts as extended when its tip sits clearly above its base
//!   knuckle. The thumb splays sideways, so it is tested on the horizontal
//!   axis with a direction that depends on the handedness label.
//! - A hand is a fist when the fingertips crowd the wrist.

use crate::hand::{
    HandObservation, Handedness, Landmark, FINGER_BASES, FINGER_TIPS, MIDDLE_BASE, THUMB_IP,
    THUMB_TIP, WRIST,
};
use std::fmt;

/// How far past its knuckle a tip must be before the finger counts.
pub const EXTENSION_MARGIN: f32 = 0.05;

/// Mean wrist-to-fingertip distance below which the hand is a fist.
pub const FIST_RADIUS: f32 = 0.15;

/// What the classifier derived from one hand observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureResult {
    /// Number of extended fingers, thumb included (0..=5).
    pub extended_finger_count: u8,
    /// Whether the fingertips are curled in toward the wrist.
    pub is_fist: bool,
    /// Middle-finger base landmark, the hand's reference position.
    pub anchor_point: Landmark,
}

impl GestureResult {
    /// Human-readable description, e.g. `"Finger Count: 3"`.
    pub fn descriptor(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for GestureResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Finger Count: {}", self.extended_finger_count)
    }
}

/// Classify a single observed hand.
pub fn classify(hand: &HandObservation) -> GestureResult {
    let fingers = FINGER_TIPS
        .iter()
        .zip(FINGER_BASES.iter())
        .filter(|&(&tip, &base)| hand.landmark(tip).y < hand.landmark(base).y - EXTENSION_MARGIN)
        .count();

    let thumb = thumb_extended(hand.landmark(THUMB_TIP), hand.landmark(THUMB_IP), hand.handedness());

    GestureResult {
        extended_finger_count: (fingers + thumb as usize) as u8,
        is_fist: is_fist(hand),
        anchor_point: hand.landmark(MIDDLE_BASE),
    }
}

fn thumb_extended(tip: Landmark, ip: Landmark, handedness: Handedness) -> bool {
    match handedness {
        Handedness::Left => tip.x > ip.x + EXTENSION_MARGIN,
        Handedness::Right => tip.x < ip.x - EXTENSION_MARGIN,
    }
}

/// Mean planar distance from the wrist to the four non-thumb tips.
fn is_fist(hand: &HandObservation) -> bool {
    let wrist = hand.landmark(WRIST).truncate();
    let total: f32 = FINGER_TIPS
        .iter()
        .map(|&tip| hand.landmark(tip).truncate().distance(wrist))
        .sum();
    total / (FINGER_TIPS.len() as f32) < FIST_RADIUS
}
