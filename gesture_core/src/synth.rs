//! Synthetic hand frames.
//!
//! Builds plausible 21-point hands from a wrist position and a coarse shape,
//! so the interpreters can be driven without a camera: by the lab's keyboard
//! hand and by the tests in this crate.

use crate::landmark::{HandFrame, Landmark, LANDMARK_COUNT};

/// Coarse hand shape, as far as the classifiers are concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HandShape {
    /// Fingers spread; neither pinch classifier fires.
    #[default]
    Open,
    /// All five fingertips gathered together.
    FivePinch,
    /// Thumb and index tips touching, the other three fingers open.
    Grip,
}

/// Wrist position (normalized, raw camera orientation) plus shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandPose {
    pub x:     f32,
    pub y:     f32,
    pub shape: HandShape,
}

// Fingertip offsets from the wrist for an open hand, thumb first.  y grows
// downward in image space, so fingers point toward negative y.
const OPEN_TIPS: [(f32, f32); 5] = [
    (-0.12, -0.06),
    (-0.05, -0.20),
    ( 0.00, -0.25),
    ( 0.07, -0.22),
    ( 0.13, -0.17),
];

// Where the five tips gather for a five-finger pinch.
const GATHER_POINT: (f32, f32) = (0.0, -0.12);
const GATHER_JITTER: [(f32, f32); 5] = [
    (-0.004,  0.002),
    ( 0.003, -0.004),
    ( 0.000,  0.004),
    ( 0.004,  0.001),
    (-0.003, -0.003),
];

// Thumb and index tips for the grip chord.
const GRIP_THUMB: (f32, f32) = (-0.050, -0.13);
const GRIP_INDEX: (f32, f32) = (-0.045, -0.13);

impl HandPose {
    pub fn new(x: f32, y: f32, shape: HandShape) -> Self {
        HandPose { x, y, shape }
    }

    /// Fingertip offsets from the wrist for this pose's shape.
    fn tip_offsets(&self) -> [(f32, f32); 5] {
        match self.shape {
            HandShape::Open => OPEN_TIPS,
            HandShape::FivePinch => {
                let mut tips = [GATHER_POINT; 5];
                for (tip, j) in tips.iter_mut().zip(GATHER_JITTER) {
                    tip.0 += j.0;
                    tip.1 += j.1;
                }
                tips
            }
            HandShape::Grip => {
                let mut tips = OPEN_TIPS;
                tips[0] = GRIP_THUMB;
                tips[1] = GRIP_INDEX;
                tips
            }
        }
    }

    /// Lay out all 21 landmarks.  Each finger's four joints sit evenly on
    /// the segment from the wrist to its tip.
    pub fn frame(&self) -> HandFrame {
        let mut points = Vec::with_capacity(LANDMARK_COUNT);
        points.push(Landmark::new(self.x, self.y, 0.0));
        for (dx, dy) in self.tip_offsets() {
            for step in 1..=4 {
                let t = step as f32 / 4.0;
                points.push(Landmark::new(self.x + dx * t, self.y + dy * t, -0.01 * t));
            }
        }
        HandFrame::new(points)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::Joint;

    #[test]
    fn frame_is_complete_and_anchored_at_wrist() {
        let f = HandPose::new(0.3, 0.7, HandShape::Open).frame();
        assert_eq!(f.len(), LANDMARK_COUNT);
        assert_eq!(f.wrist().unwrap(), Landmark::new(0.3, 0.7, 0.0));
    }

    #[test]
    fn tips_land_on_their_offsets() {
        let f = HandPose::new(0.5, 0.5, HandShape::Open).frame();
        let index = f.joint(Joint::IndexTip).unwrap();
        assert!((index.x - 0.45).abs() < 1e-6);
        assert!((index.y - 0.30).abs() < 1e-6);
    }

    #[test]
    fn moving_the_pose_translates_every_point() {
        let a = HandPose::new(0.4, 0.5, HandShape::Grip).frame();
        let b = HandPose::new(0.5, 0.5, HandShape::Grip).frame();
        for (p, q) in a.landmarks().iter().zip(b.landmarks()) {
            assert!((q.x - p.x - 0.1).abs() < 1e-5);
            assert_eq!(p.y, q.y);
        }
    }
}
