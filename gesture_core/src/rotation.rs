//! Rotation gesture interpreter.
//!
//! Gesture-driven rotation of a 3D model, gated by a lock ritual:
//!
//! ```text
//!            five-finger pinch          held > hold_ms
//!   IDLE ─────────────────────▶ SYNCING ──────────────▶ LOCKED
//!     ▲                            │                      │
//!     └─ released / hand lost ─────┘                      │
//!     └──────────────────── reset() ──────────────────────┘
//! ```
//!
//! There is no grace period here: a syncing hand that disappears starts over.
//! Once locked the lock survives hand loss; only an explicit [`reset`] drops
//! it.
//!
//! While locked, the thumb-to-index grip chord engages rotation.  The wrist
//! position is run through an EMA before differencing, and horizontal travel
//! becomes yaw (sign inverted for the mirrored feed) while vertical travel
//! becomes pitch.
//!
//! [`reset`]: RotationInterpreter::reset

use std::ops::{Add, AddAssign, Mul, Sub};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{PinchConfig, RotationConfig};
use crate::landmark::{HandFrame, Joint, Millis};
use crate::session::FrameInterpreter;

// ════════════════════════════════════════════════════════════════════════════
// Rotation — a pitch/yaw pair
// ════════════════════════════════════════════════════════════════════════════

/// Rotation about the horizontal (`x`) and vertical (`y`) axes, radians.
/// Accumulates without wrapping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub x: f32,
    pub y: f32,
}

impl Rotation {
    pub const ZERO: Rotation = Rotation { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Rotation { x, y }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl Add for Rotation {
    type Output = Rotation;
    fn add(self, rhs: Rotation) -> Rotation {
        Rotation::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Rotation {
    fn add_assign(&mut self, rhs: Rotation) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Rotation {
    type Output = Rotation;
    fn sub(self, rhs: Rotation) -> Rotation {
        Rotation::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Rotation {
    type Output = Rotation;
    fn mul(self, k: f32) -> Rotation {
        Rotation::new(self.x * k, self.y * k)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Lock status and snapshot
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LockStatus {
    #[default]
    Idle,
    Syncing,
    Locked,
}

impl LockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LockStatus::Idle    => "IDLE",
            LockStatus::Syncing => "SYNCING",
            LockStatus::Locked  => "LOCKED",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RotationSnapshot {
    pub status:   LockStatus,
    /// Grip chord held while locked.
    pub rotating: bool,
    /// Sum of every delta produced since the last reset.
    pub target:   Rotation,
}

// ════════════════════════════════════════════════════════════════════════════
// RotationInterpreter
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
struct Planar {
    x: f32,
    y: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
struct RotationState {
    status:      LockStatus,
    pinch_start: Option<Millis>,
    smoothed:    Option<Planar>,
    previous:    Option<Planar>,
    rotating:    bool,
    target:      Rotation,
}

pub struct RotationInterpreter {
    config: RotationConfig,
    pinch:  PinchConfig,
    state:  RotationState,
}

impl Default for RotationInterpreter {
    fn default() -> Self {
        RotationInterpreter::new(RotationConfig::default(), PinchConfig::default())
    }
}

impl RotationInterpreter {
    pub fn new(config: RotationConfig, pinch: PinchConfig) -> Self {
        RotationInterpreter { config, pinch, state: RotationState::default() }
    }

    pub fn status(&self) -> LockStatus { self.state.status }
    pub fn is_rotating(&self) -> bool { self.state.rotating }
    pub fn target(&self) -> Rotation { self.state.target }

    pub fn snapshot(&self) -> RotationSnapshot {
        RotationSnapshot {
            status:   self.state.status,
            rotating: self.state.rotating,
            target:   self.state.target,
        }
    }

    /// External unlock: back to `Idle` with the filter and target cleared.
    pub fn reset(&mut self) {
        if self.state.status != LockStatus::Idle {
            info!("rotation: unlocked");
        }
        self.state = RotationState::default();
    }

    /// Feed one frame; returns the rotation delta it produced (zero unless
    /// locked and gripping with a known previous position).
    pub fn process_frame(&mut self, hand: Option<&HandFrame>, now: Millis) -> Rotation {
        let hand = hand.filter(|h| match h.validate() {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "rotation: treating malformed frame as no hand");
                false
            }
        });

        match hand {
            Some(h) => self.track_hand(h, now),
            None => {
                self.track_absence();
                Rotation::ZERO
            }
        }
    }

    fn track_hand(&mut self, hand: &HandFrame, now: Millis) -> Rotation {
        let landmarks = hand.landmarks();
        // engagement is judged against the status this frame started with
        let status = self.state.status;

        if status != LockStatus::Locked {
            let pinching = self.pinch.is_five_finger_pinch(landmarks);
            self.track_lock(pinching, now);
            return Rotation::ZERO;
        }

        let wrist = landmarks[Joint::Wrist.index()];
        let current = self.smooth(Planar { x: wrist.x, y: wrist.y });

        if !self.pinch.is_two_finger_pinch(landmarks) {
            if self.state.rotating {
                debug!("rotation: grip released");
            }
            self.state.rotating = false;
            self.state.previous = None;
            return Rotation::ZERO;
        }

        if !self.state.rotating {
            debug!("rotation: grip engaged");
        }
        self.state.rotating = true;

        let delta = match self.state.previous {
            Some(prev) => {
                let dx = current.x - prev.x;
                let dy = current.y - prev.y;
                Rotation::new(dy * self.config.gain, -dx * self.config.gain)
            }
            None => Rotation::ZERO,
        };
        self.state.previous = Some(current);
        self.state.target += delta;
        delta
    }

    fn track_lock(&mut self, pinching: bool, now: Millis) {
        let hold = self.config.hold_ms;
        let s = &mut self.state;

        if !pinching {
            if s.status == LockStatus::Syncing {
                debug!("rotation: pinch released before lock");
            }
            s.pinch_start = None;
            s.status = LockStatus::Idle;
            return;
        }

        let start = *s.pinch_start.get_or_insert(now);
        if s.status != LockStatus::Syncing {
            debug!("rotation: syncing");
            s.status = LockStatus::Syncing;
        }
        let elapsed = now.saturating_sub(start);
        if elapsed > hold {
            info!(held_ms = elapsed, "rotation: locked");
            s.status = LockStatus::Locked;
            s.pinch_start = None;
        }
    }

    fn track_absence(&mut self) {
        let s = &mut self.state;
        if s.status == LockStatus::Syncing {
            debug!("rotation: hand lost while syncing");
            s.pinch_start = None;
            s.status = LockStatus::Idle;
        }
        s.rotating = false;
        s.previous = None;
        s.smoothed = None;
    }

    /// EMA over the wrist position; the first sample seeds the filter.
    fn smooth(&mut self, raw: Planar) -> Planar {
        let alpha = self.config.smoothing_alpha;
        let next = match self.state.smoothed {
            Some(s) => Planar {
                x: s.x * (1.0 - alpha) + raw.x * alpha,
                y: s.y * (1.0 - alpha) + raw.y * alpha,
            },
            None => raw,
        };
        self.state.smoothed = Some(next);
        next
    }
}

impl FrameInterpreter for RotationInterpreter {
    type Output = Rotation;

    fn process_frame(&mut self, hand: Option<&HandFrame>, now: Millis) -> Rotation {
        RotationInterpreter::process_frame(self, hand, now)
    }

    fn reset(&mut self) {
        RotationInterpreter::reset(self)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::Landmark;
    use crate::synth::{HandPose, HandShape};

    fn frame(x: f32, y: f32, shape: HandShape) -> HandFrame {
        HandPose::new(x, y, shape).frame()
    }

    /// Pinch from t = 0 until lock at t = 1100.
    fn locked() -> RotationInterpreter {
        let mut r = RotationInterpreter::default();
        for t in (0..=1100).step_by(100) {
            r.process_frame(Some(&frame(0.5, 0.5, HandShape::FivePinch)), t);
        }
        assert_eq!(r.status(), LockStatus::Locked);
        r
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn hold_locks_after_threshold() {
        let mut r = RotationInterpreter::default();
        let pinch = frame(0.5, 0.5, HandShape::FivePinch);
        r.process_frame(Some(&pinch), 0);
        assert_eq!(r.status(), LockStatus::Syncing);
        r.process_frame(Some(&pinch), 1000);
        assert_eq!(r.status(), LockStatus::Syncing);
        r.process_frame(Some(&pinch), 1001);
        assert_eq!(r.status(), LockStatus::Locked);
    }

    #[test]
    fn early_release_returns_to_idle() {
        let mut r = RotationInterpreter::default();
        r.process_frame(Some(&frame(0.5, 0.5, HandShape::FivePinch)), 0);
        r.process_frame(Some(&frame(0.5, 0.5, HandShape::FivePinch)), 700);
        r.process_frame(Some(&frame(0.5, 0.5, HandShape::Open)), 800);
        assert_eq!(r.status(), LockStatus::Idle);
        // timer restarted
        r.process_frame(Some(&frame(0.5, 0.5, HandShape::FivePinch)), 900);
        r.process_frame(Some(&frame(0.5, 0.5, HandShape::FivePinch)), 1500);
        assert_eq!(r.status(), LockStatus::Syncing);
    }

    #[test]
    fn hand_loss_while_syncing_has_no_grace() {
        let mut r = RotationInterpreter::default();
        r.process_frame(Some(&frame(0.5, 0.5, HandShape::FivePinch)), 0);
        r.process_frame(None, 16);
        assert_eq!(r.status(), LockStatus::Idle);
        r.process_frame(Some(&frame(0.5, 0.5, HandShape::FivePinch)), 32);
        r.process_frame(Some(&frame(0.5, 0.5, HandShape::FivePinch)), 1000);
        assert_eq!(r.status(), LockStatus::Syncing);
    }

    #[test]
    fn lock_survives_hand_loss_until_reset() {
        let mut r = locked();
        for t in (1200..5000).step_by(100) {
            assert!(r.process_frame(None, t).is_zero());
        }
        assert_eq!(r.status(), LockStatus::Locked);
        r.reset();
        assert_eq!(r.status(), LockStatus::Idle);
        assert_eq!(r.snapshot(), RotationSnapshot::default());
    }

    #[test]
    fn grip_drag_rotates_with_mirrored_yaw() {
        let mut r = locked();
        // first grip frame seeds the filter, no delta
        let d = r.process_frame(Some(&frame(0.5, 0.5, HandShape::Grip)), 1200);
        assert!(d.is_zero());
        assert!(r.is_rotating());

        // raw x +0.1 → smoothed +0.03 → yaw −0.15
        let first = r.process_frame(Some(&frame(0.6, 0.5, HandShape::Grip)), 1300);
        assert!(close(first.y, -0.15), "yaw {}", first.y);
        assert!(close(first.x, 0.0));

        // raw y +0.1 → pitch +
        let second = r.process_frame(Some(&frame(0.6, 0.6, HandShape::Grip)), 1400);
        assert!(second.x > 0.0);
        assert!(second.y < 0.0, "filter still catching up in x");
        assert_eq!(r.target(), first + second);
    }

    #[test]
    fn nothing_rotates_without_the_grip() {
        let mut r = locked();
        let mut x = 0.5;
        for t in (1200..2000).step_by(50) {
            x += 0.02;
            assert!(r.process_frame(Some(&frame(x, 0.5, HandShape::Open)), t).is_zero());
        }
        assert!(r.target().is_zero());
        assert!(!r.is_rotating());
    }

    #[test]
    fn regrip_does_not_jump() {
        let mut r = locked();
        r.process_frame(Some(&frame(0.5, 0.5, HandShape::Grip)), 1200);
        r.process_frame(Some(&frame(0.52, 0.5, HandShape::Grip)), 1250);
        // release and travel far away
        for (i, t) in (1300..1800).step_by(50).enumerate() {
            let x = 0.52 + 0.03 * i as f32;
            r.process_frame(Some(&frame(x, 0.4, HandShape::Open)), t);
        }
        assert!(!r.is_rotating());
        let before = r.target();
        let d = r.process_frame(Some(&frame(0.9, 0.3, HandShape::Grip)), 1800);
        assert!(d.is_zero());
        assert_eq!(r.target(), before);
    }

    #[test]
    fn rotation_waits_for_the_frame_after_locking() {
        let mut r = RotationInterpreter::default();
        for t in (0..=1000).step_by(100) {
            r.process_frame(Some(&frame(0.5, 0.5, HandShape::FivePinch)), t);
        }
        // this frame locks; engagement is still judged as syncing
        let d = r.process_frame(Some(&frame(0.5, 0.5, HandShape::FivePinch)), 1100);
        assert!(d.is_zero());
        assert!(!r.is_rotating());
        assert_eq!(r.status(), LockStatus::Locked);
    }

    #[test]
    fn smoothing_damps_jitter() {
        let mut r = locked();
        r.process_frame(Some(&frame(0.50, 0.5, HandShape::Grip)), 1200);
        let mut worst = 0.0f32;
        for (i, t) in (1250..2250).step_by(50).enumerate() {
            let x = if i % 2 == 0 { 0.52 } else { 0.50 };
            let d = r.process_frame(Some(&frame(x, 0.5, HandShape::Grip)), t);
            worst = worst.max(d.y.abs());
        }
        // a raw 0.02 step would be 0.1 of yaw
        assert!(worst < 0.1 * 0.5, "worst yaw step {}", worst);
    }

    #[test]
    fn truncated_frame_counts_as_no_hand() {
        let stub = HandFrame::new(vec![Landmark::new(0.5, 0.5, 0.0); 8]);

        // syncing: no grace, back to idle
        let mut r = RotationInterpreter::default();
        r.process_frame(Some(&frame(0.5, 0.5, HandShape::FivePinch)), 0);
        assert_eq!(r.status(), LockStatus::Syncing);
        assert!(r.process_frame(Some(&stub), 16).is_zero());
        assert_eq!(r.status(), LockStatus::Idle);

        // locked and gripping: lock kept, grip and filter dropped
        let mut r = locked();
        r.process_frame(Some(&frame(0.5, 0.5, HandShape::Grip)), 1200);
        assert!(r.is_rotating());
        assert!(r.process_frame(Some(&stub), 1250).is_zero());
        assert_eq!(r.status(), LockStatus::Locked);
        assert!(!r.is_rotating());
        assert!(r.state.smoothed.is_none());
        assert!(r.state.previous.is_none());

        // the filter reseeds on the next full frame
        let d = r.process_frame(Some(&frame(0.9, 0.5, HandShape::Grip)), 1300);
        assert!(d.is_zero());
    }

    #[test]
    fn hand_loss_clears_the_filter() {
        let mut r = locked();
        r.process_frame(Some(&frame(0.5, 0.5, HandShape::Grip)), 1200);
        r.process_frame(None, 1250);
        assert!(!r.is_rotating());
        // filter reseeds at the new position: no delta on return
        let d = r.process_frame(Some(&frame(0.8, 0.5, HandShape::Grip)), 1300);
        assert!(d.is_zero());
        let d = r.process_frame(Some(&frame(0.8, 0.5, HandShape::Grip)), 1350);
        assert!(d.is_zero());
    }

    #[test]
    fn no_hand_from_idle_is_idempotent() {
        let mut r = RotationInterpreter::default();
        let before = r.state.clone();
        for t in [0, 50, 10_000] {
            assert!(r.process_frame(None, t).is_zero());
            assert_eq!(r.state, before);
        }
    }

    #[test]
    fn rotation_arithmetic() {
        let a = Rotation::new(1.0, 2.0);
        let b = Rotation::new(0.5, -1.0);
        assert_eq!(a + b, Rotation::new(1.5, 1.0));
        assert_eq!(a - b, Rotation::new(0.5, 3.0));
        assert_eq!(b * 2.0, Rotation::new(1.0, -2.0));
        let mut c = a;
        c += b;
        assert_eq!(c, a + b);
    }
}
