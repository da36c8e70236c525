//! Synthetic hand observations.
//!
//! Builds well-formed 21-landmark hands for a requested pose, laid out the
//! way the detector indexes them. The viewer uses these to stand in for the
//! camera detector (keyboard and mouse drive the pose), and tests use them
//! as fixtures.
//!
//! ```ignore
//! let hand = HandPose::open(3)
//!     .with_anchor(Vec3::new(0.3, 0.5, 0.0))
//!     .build(Handedness::Right);
//! assert_eq!(classify(&hand).extended_finger_count, 3);
//! ```

use crate::hand::{HandObservation, Handedness, FINGER_BASES, FINGER_TIPS, LANDMARK_COUNT, MIDDLE_BASE, THUMB_IP, THUMB_TIP, WRIST};
use glam::Vec3;

/// Offsets of the four base knuckles from the middle-finger base.
const BASE_OFFSETS: [Vec3; 4] = [
    Vec3::new(-0.05, 0.01, 0.0),
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(0.05, 0.01, 0.0),
    Vec3::new(0.09, 0.03, 0.0),
];

/// Wrist position relative to the middle-finger base.
const WRIST_OFFSET: Vec3 = Vec3::new(0.0, 0.3, 0.0);

/// Fingertip offsets from the wrist when the hand is closed.
const FIST_TIPS: [Vec3; 4] = [
    Vec3::new(-0.03, -0.06, 0.0),
    Vec3::new(0.0, -0.07, 0.0),
    Vec3::new(0.03, -0.06, 0.0),
    Vec3::new(0.05, -0.05, 0.0),
];

/// Vertical tip-to-knuckle distance for a straight or a curled finger.
const FINGER_REACH: f32 = 0.1;

/// Horizontal thumb splay.
const THUMB_SPLAY: f32 = 0.1;

/// A hand pose to synthesize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandPose {
    extended: u8,
    fist: bool,
    anchor: Vec3,
}

impl HandPose {
    /// An open hand with `extended` fingers straight.
    ///
    /// The thumb is extended first, then index, middle, ring and pinky.
    /// Values above five are clamped.
    pub fn open(extended: u8) -> Self {
        Self {
            extended: extended.min(5),
            fist: false,
            anchor: Vec3::new(0.5, 0.5, 0.0),
        }
    }

    /// A closed fist: no finger extended, tips crowding the wrist.
    pub fn fist() -> Self {
        Self {
            extended: 0,
            fist: true,
            anchor: Vec3::new(0.5, 0.5, 0.0),
        }
    }

    /// Place the middle-finger base (the anchor landmark) at `anchor`.
    pub fn with_anchor(mut self, anchor: Vec3) -> Self {
        self.anchor = anchor;
        self
    }

    /// Lay the pose out as a detector observation.
    pub fn build(&self, handedness: Handedness) -> HandObservation {
        let mut landmarks = [self.anchor; LANDMARK_COUNT];
        let wrist = self.anchor + WRIST_OFFSET;
        landmarks[WRIST] = wrist;

        // Thumb: CMC and MCP sit between the wrist and the IP joint.
        let side = match handedness {
            Handedness::Left => 1.0,
            Handedness::Right => -1.0,
        };
        let thumb_ip = self.anchor + Vec3::new(-0.1 * side, 0.12, 0.0);
        let thumb_tip = if self.extended >= 1 {
            thumb_ip + Vec3::new(THUMB_SPLAY * side, -0.02, 0.0)
        } else {
            thumb_ip + Vec3::new(0.0, -0.03, 0.0)
        };
        landmarks[1] = wrist.lerp(thumb_ip, 0.33);
        landmarks[2] = wrist.lerp(thumb_ip, 0.66);
        landmarks[THUMB_IP] = thumb_ip;
        landmarks[THUMB_TIP] = thumb_tip;

        for (finger, (&base_idx, &tip_idx)) in FINGER_BASES.iter().zip(FINGER_TIPS.iter()).enumerate() {
            let base = self.anchor + BASE_OFFSETS[finger];
            let tip = if self.fist {
                wrist + FIST_TIPS[finger]
            } else if (finger as u8) + 1 < self.extended {
                base - Vec3::new(0.0, FINGER_REACH, 0.0)
            } else {
                base + Vec3::new(0.0, FINGER_REACH, 0.0)
            };
            landmarks[base_idx] = base;
            landmarks[base_idx + 1] = base.lerp(tip, 0.4);
            landmarks[base_idx + 2] = base.lerp(tip, 0.7);
            landmarks[tip_idx] = tip;
        }

        debug_assert_eq!(landmarks[MIDDLE_BASE], self.anchor);
        HandObservation::new(landmarks, handedness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::classify;

    #[test]
    fn test_fist_pose_classifies_as_fist() {
        for handedness in [Handedness::Left, Handedness::Right] {
            let result = classify(&HandPose::fist().build(handedness));
            assert!(result.is_fist);
            assert_eq!(result.extended_finger_count, 0);
        }
    }

    #[test]
    fn test_open_poses_are_not_fists() {
        for count in 0..=5 {
            let result = classify(&HandPose::open(count).build(Handedness::Left));
            assert!(!result.is_fist, "open({count}) read as fist");
        }
    }

    #[test]
    fn test_count_is_clamped() {
        let result = classify(&HandPose::open(9).build(Handedness::Right));
        assert_eq!(result.extended_finger_count, 5);
    }

    #[test]
    fn test_open_pose_anchor() {
        let anchor = Vec3::new(0.2, 0.7, -0.05);
        let hand = HandPose::open(5).with_anchor(anchor).build(Handedness::Left);
        assert_eq!(hand.landmark(MIDDLE_BASE), anchor);
    }
}
