//! Hand observations as delivered by the external landmark detector.
//!
//! The detector reports each hand as 21 landmarks in normalized camera space
//! plus a handedness label. The label is the detector's own, taken from a
//! mirrored camera image, so it does not necessarily name the user's
//! anatomical hand.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of landmarks in one hand observation.
pub const LANDMARK_COUNT: usize = 21;

/// Wrist landmark.
pub const WRIST: usize = 0;
/// Thumb interphalangeal joint.
pub const THUMB_IP: usize = 3;
/// Thumb tip.
pub const THUMB_TIP: usize = 4;
/// Index, middle, ring and pinky fingertips.
pub const FINGER_TIPS: [usize; 4] = [8, 12, 16, 20];
/// Index, middle, ring and pinky base knuckles, paired with [`FINGER_TIPS`].
pub const FINGER_BASES: [usize; 4] = [5, 9, 13, 17];
/// Middle-finger base, used as the hand's anchor point.
pub const MIDDLE_BASE: usize = 9;

/// A point in normalized camera space.
///
/// `x` and `y` lie in `[0, 1]` with `y` growing downward; `z` is relative
/// depth, negative toward the camera.
pub type Landmark = Vec3;

/// Handedness label as reported by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    /// The other label.
    pub fn opposite(self) -> Self {
        match self {
            Handedness::Left => Handedness::Right,
            Handedness::Right => Handedness::Left,
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handedness::Left => write!(f, "Left"),
            Handedness::Right => write!(f, "Right"),
        }
    }
}

/// One detected hand: 21 landmarks in detector order plus its label.
#[derive(Debug, Clone, PartialEq)]
pub struct HandObservation {
    landmarks: [Landmark; LANDMARK_COUNT],
    handedness: Handedness,
}

impl HandObservation {
    /// Build an observation from a fixed-size landmark array.
    pub fn new(landmarks: [Landmark; LANDMARK_COUNT], handedness: Handedness) -> Self {
        Self { landmarks, handedness }
    }

    /// Build an observation from a detector slice.
    ///
    /// Returns `None` unless the slice holds exactly [`LANDMARK_COUNT`]
    /// points, so malformed frames never reach the classifier.
    pub fn from_slice(landmarks: &[Landmark], handedness: Handedness) -> Option<Self> {
        let landmarks: [Landmark; LANDMARK_COUNT] = landmarks.try_into().ok()?;
        Some(Self::new(landmarks, handedness))
    }

    /// All landmarks in detector order.
    pub fn landmarks(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.landmarks
    }

    /// Landmark at a detector index.
    #[inline]
    pub fn landmark(&self, index: usize) -> Landmark {
        self.landmarks[index]
    }

    pub fn handedness(&self) -> Handedness {
        self.handedness
    }
}
