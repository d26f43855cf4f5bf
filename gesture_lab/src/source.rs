//! Hand sources for the lab.
//!
//! Two [`LandmarkDetector`]s stand in for a camera and a hand landmark model:
//!
//! * [`SimDetector`] turns the [`KeyboardHand`]'s pose into a synthetic
//!   21-point frame.
//! * [`ReplayDetector`] plays back a JSON-lines recording against the
//!   session's video clock.
//!
//! Both consume the same [`LabFrame`], so the session type does not change
//! between modes.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::info;

use gesture_core::{
    read_recording, Error, HandFrame, HandPose, HandShape, LandmarkDetector, Millis, RecordedFrame,
};

// ════════════════════════════════════════════════════════════════════════════
// LabFrame
// ════════════════════════════════════════════════════════════════════════════

/// What the lab feeds its detector each display frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabFrame {
    pub pose:    HandPose,
    /// False while the user has hidden the hand (simulated dropout).
    pub visible: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// KeyboardHand
// ════════════════════════════════════════════════════════════════════════════

/// Keyboard keys held this frame, as far as the hand is concerned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HandKeys {
    pub pinch:       bool,
    pub grip:        bool,
    pub toggle_hide: bool,
}

/// Mouse-steered synthetic hand.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardHand {
    x:      f32,
    y:      f32,
    shape:  HandShape,
    hidden: bool,
}

impl Default for KeyboardHand {
    fn default() -> Self {
        KeyboardHand { x: 0.5, y: 0.6, shape: HandShape::Open, hidden: false }
    }
}

impl KeyboardHand {
    /// `pointer` is the mouse position in the hand pane as normalized
    /// display coordinates (already mirrored, see [`screen_to_raw`]).
    /// A pointer outside the pane leaves the wrist where it was.
    pub fn update(&mut self, pointer: Option<(f32, f32)>, keys: HandKeys) {
        if let Some((x, y)) = pointer {
            self.x = x;
            self.y = y;
        }
        if keys.toggle_hide {
            self.hidden = !self.hidden;
            info!(hidden = self.hidden, "lab: hand visibility toggled");
        }
        self.shape = if keys.pinch {
            HandShape::FivePinch
        } else if keys.grip {
            HandShape::Grip
        } else {
            HandShape::Open
        };
    }

    pub fn is_hidden(&self) -> bool { self.hidden }

    pub fn frame(&self) -> LabFrame {
        LabFrame {
            pose:    HandPose::new(self.x, self.y, self.shape),
            visible: !self.hidden,
        }
    }
}

/// Pixel position in a `w`×`h` mirrored display pane to raw camera
/// coordinates.  `None` when the pointer is outside the pane.
pub fn screen_to_raw(sx: f32, sy: f32, w: f32, h: f32) -> Option<(f32, f32)> {
    if sx < 0.0 || sy < 0.0 || sx >= w || sy >= h {
        return None;
    }
    Some((1.0 - sx / w, sy / h))
}

// ════════════════════════════════════════════════════════════════════════════
// SimDetector
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
pub struct SimDetector;

impl LandmarkDetector for SimDetector {
    type Frame = LabFrame;

    fn detect(&mut self, frame: &LabFrame, _timestamp: Millis) -> Option<HandFrame> {
        frame.visible.then(|| frame.pose.frame())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ReplayDetector
// ════════════════════════════════════════════════════════════════════════════

/// How long the last recorded frame stays on screen before the replay
/// reports no hand.
const TAIL_HOLD_MS: Millis = 100;

pub struct ReplayDetector {
    frames:   Vec<RecordedFrame>,
    base:     Millis,
    finished: bool,
}

impl ReplayDetector {
    /// Recorded times are rebased so that the first frame plays at video
    /// time 0.
    pub fn new(mut frames: Vec<RecordedFrame>) -> gesture_core::Result<Self> {
        if frames.is_empty() {
            return Err(Error::DetectorInit("recording contains no frames".into()));
        }
        frames.sort_by_key(|f| f.t);
        let base = frames[0].t;
        Ok(ReplayDetector { frames, base, finished: false })
    }

    pub fn open(path: &Path) -> gesture_core::Result<Self> {
        let file = File::open(path)
            .map_err(|e| Error::DetectorInit(format!("{}: {}", path.display(), e)))?;
        let frames = read_recording(BufReader::new(file))?;
        info!(path = %path.display(), frames = frames.len(), "lab: replay loaded");
        Self::new(frames)
    }

    /// Video time of the last recorded frame.
    pub fn duration(&self) -> Millis {
        self.frames.last().map_or(0, |f| f.t - self.base)
    }

    fn relative(&self, f: &RecordedFrame) -> Millis {
        f.t - self.base
    }
}

impl LandmarkDetector for ReplayDetector {
    type Frame = LabFrame;

    /// Hiding the hand masks the recording without pausing it.
    fn detect(&mut self, frame: &LabFrame, timestamp: Millis) -> Option<HandFrame> {
        if !frame.visible {
            return None;
        }
        let played = self.frames.partition_point(|f| self.relative(f) <= timestamp);
        let current = played.checked_sub(1).map(|i| &self.frames[i])?;
        if played == self.frames.len() && timestamp.saturating_sub(self.relative(current)) > TAIL_HOLD_MS {
            if !self.finished {
                info!(duration_ms = self.duration(), "lab: replay finished");
                self.finished = true;
            }
            return None;
        }
        current.hand.clone()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
