//! Geometric primitives and the two pinch classifiers.
//!
//! Everything here is pure.  Classifiers never fail: a frame too short to
//! hold the fingertips is simply "not pinching".

use crate::config::PinchConfig;
use crate::error::{Error, Result};
use crate::landmark::{Joint, Landmark, LANDMARK_COUNT};

/// Euclidean distance in 3D.
pub fn distance(a: &Landmark, b: &Landmark) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = a.z - b.z;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Per-axis arithmetic mean.
///
/// An empty slice is a caller bug and is reported as
/// [`Error::EmptyCentroidInput`] rather than answered with the origin.
pub fn centroid(points: &[Landmark]) -> Result<Landmark> {
    if points.is_empty() {
        return Err(Error::EmptyCentroidInput);
    }
    let n = points.len() as f32;
    let (sx, sy, sz) = points
        .iter()
        .fold((0.0, 0.0, 0.0), |(x, y, z), p| (x + p.x, y + p.y, z + p.z));
    Ok(Landmark::new(sx / n, sy / n, sz / n))
}

/// Mean distance of the five fingertips to their own centroid, or `None`
/// when the frame is too short to contain them.
pub fn fingertip_spread(landmarks: &[Landmark]) -> Option<f32> {
    if landmarks.len() < LANDMARK_COUNT {
        return None;
    }
    let tips = Joint::FINGERTIPS.map(|j| landmarks[j.index()]);
    let center = centroid(&tips).ok()?;
    let total: f32 = tips.iter().map(|t| distance(t, &center)).sum();
    Some(total / tips.len() as f32)
}

/// All five fingertips drawn together, default threshold.
pub fn is_five_finger_pinch(landmarks: &[Landmark]) -> bool {
    PinchConfig::default().is_five_finger_pinch(landmarks)
}

/// Thumb tip touching index tip, default threshold.
pub fn is_two_finger_pinch(landmarks: &[Landmark]) -> bool {
    PinchConfig::default().is_two_finger_pinch(landmarks)
}

impl PinchConfig {
    pub fn is_five_finger_pinch(&self, landmarks: &[Landmark]) -> bool {
        fingertip_spread(landmarks).map_or(false, |spread| spread < self.five_finger_threshold)
    }

    pub fn is_two_finger_pinch(&self, landmarks: &[Landmark]) -> bool {
        if landmarks.len() < LANDMARK_COUNT {
            return false;
        }
        let thumb = &landmarks[Joint::ThumbTip.index()];
        let index = &landmarks[Joint::IndexTip.index()];
        distance(thumb, index) < self.two_finger_threshold
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
