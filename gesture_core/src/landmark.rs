//! Hand landmark data model.
//!
//! A [`HandFrame`] is what the external detector reports for one video frame:
//! 21 normalized points in the detector's fixed index order.  The core only
//! ever reads them.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Caller-supplied wall-clock timestamp in milliseconds.
pub type Millis = u64;

/// Points per detected hand.
pub const LANDMARK_COUNT: usize = 21;

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// One tracked point: x/y in 0..1 relative to the frame, z relative depth.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Landmark { x, y, z }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Joint — named indices into a hand frame
// ════════════════════════════════════════════════════════════════════════════

/// The landmark indices the interpreters care about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Joint {
    Wrist     = 0,
    ThumbTip  = 4,
    IndexTip  = 8,
    MiddleTip = 12,
    RingTip   = 16,
    PinkyTip  = 20,
}

impl Joint {
    /// Thumb, index, middle, ring, pinky.
    pub const FINGERTIPS: [Joint; 5] = [
        Joint::ThumbTip,
        Joint::IndexTip,
        Joint::MiddleTip,
        Joint::RingTip,
        Joint::PinkyTip,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Skeleton edges in detector index space, for drawing.
pub const HAND_CONNECTIONS: [(usize, usize); 23] = [
    (0, 1),  (1, 2),   (2, 3),   (3, 4),
    (0, 5),  (5, 6),   (6, 7),   (7, 8),
    (0, 9),  (9, 10),  (10, 11), (11, 12),
    (0, 13), (13, 14), (14, 15), (15, 16),
    (0, 17), (17, 18), (18, 19), (19, 20),
    (5, 9),  (9, 13),  (13, 17),
];

// ════════════════════════════════════════════════════════════════════════════
// HandFrame
// ════════════════════════════════════════════════════════════════════════════

/// The landmark set for one detected hand in one video frame.
///
/// Construction does not validate the length: a live detector can hand over
/// truncated frames and the interpreters decide what to do with them (they
/// treat them as "no hand").  Use [`HandFrame::validate`] to check.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandFrame {
    landmarks: Vec<Landmark>,
}

impl HandFrame {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        HandFrame { landmarks }
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// True when every index of the detector convention is present.
    pub fn is_complete(&self) -> bool {
        self.landmarks.len() >= LANDMARK_COUNT
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_complete() {
            Ok(())
        } else {
            Err(Error::short_hand(self.landmarks.len()))
        }
    }

    pub fn joint(&self, joint: Joint) -> Option<Landmark> {
        self.landmarks.get(joint.index()).copied()
    }

    pub fn wrist(&self) -> Option<Landmark> {
        self.joint(Joint::Wrist)
    }
}

impl From<Vec<Landmark>> for HandFrame {
    fn from(landmarks: Vec<Landmark>) -> Self {
        HandFrame::new(landmarks)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_frame_fails_validation() {
        let frame = HandFrame::new(vec![Landmark::default(); 5]);
        assert!(!frame.is_complete());
        match frame.validate() {
            Err(Error::InvalidInput { expected, actual }) => {
                assert_eq!(expected, LANDMARK_COUNT);
                assert_eq!(actual, 5);
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn joint_lookup_uses_detector_indices() {
        let pts: Vec<Landmark> = (0..LANDMARK_COUNT)
            .map(|i| Landmark::new(i as f32, 0.0, 0.0))
            .collect();
        let frame = HandFrame::new(pts);
        assert_eq!(frame.joint(Joint::IndexTip).unwrap().x, 8.0);
        assert_eq!(frame.wrist().unwrap().x, 0.0);
        assert!(frame.validate().is_ok());
    }

    #[test]
    fn joint_lookup_out_of_range_is_none() {
        let frame = HandFrame::new(vec![Landmark::default(); 3]);
        assert!(frame.joint(Joint::PinkyTip).is_none());
    }

    #[test]
    fn empty_frame_from_an_empty_vec() {
        let frame: HandFrame = Vec::new().into();
        assert!(frame.is_empty());
        assert!(frame.wrist().is_none());
        assert!(frame.validate().is_err());

        let full: HandFrame = vec![Landmark::default(); LANDMARK_COUNT].into();
        assert!(!full.is_empty());
        assert!(full.is_complete());
    }

    #[test]
    fn landmark_z_defaults_when_missing() {
        let lm: Landmark = serde_json::from_str(r#"{"x":0.25,"y":0.5}"#).unwrap();
        assert_eq!(lm, Landmark::new(0.25, 0.5, 0.0));
    }
}
