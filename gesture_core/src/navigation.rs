//! Navigation gesture interpreter.
//!
//! Turns the per-frame hand stream into three discrete events: [`Gesture::Left`],
//! [`Gesture::Right`] and [`Gesture::DoublePinch`].
//!
//! ## Activation
//!
//! ```text
//!            five-finger pinch            held > hold_ms
//!   IDLE ───────────────────────▶ PINCHING ───────────────▶ ACTIVE
//!     ▲                              │                        │
//!     └──────── released early ──────┘                        │
//!     └──────────────── hand gone longer than grace ──────────┘
//! ```
//!
//! While the hand is missing but still inside the grace period the mode and
//! progress are frozen: nothing advances, nothing regresses.
//!
//! ## Swipes (ACTIVE, hand open)
//!
//! The wrist x delta between consecutive frames drives a three-phase detector:
//! `Idle` fires once when the delta passes the movement threshold, `Firing`
//! holds the committed direction for a fixed time, and `WaitingForReset`
//! re-arms only once the hand is nearly stationary again.  The gap between
//! the two thresholds is what stops one long sweep from firing twice.
//!
//! Direction follows the mirrored-camera convention: raw x increasing means
//! the user moved toward screen-left, so a positive delta is `Left`.  This is
//! an integration contract with the video source, not something the
//! interpreter can check.
//!
//! ## Double pinch
//!
//! Two pinch rising edges closer than the window but further apart than the
//! floor emit `DoublePinch` and take over the display for a while, muting
//! swipe detection.  It runs in every mode.
//!
//! Every delivery to the sink passes one global debounce, whichever path
//! produced it.

use std::sync::mpsc::Sender;

use tracing::{debug, info};

use crate::config::{NavigationConfig, PinchConfig};
use crate::landmark::{HandFrame, Joint, Millis};
use crate::session::FrameInterpreter;

// ════════════════════════════════════════════════════════════════════════════
// Public vocabulary
// ════════════════════════════════════════════════════════════════════════════

/// An event delivered to the sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Gesture {
    /// Swipe toward screen-left (raw wrist x increased).
    Left,
    /// Swipe toward screen-right (raw wrist x decreased).
    Right,
    DoublePinch,
}

impl Gesture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gesture::Left        => "LEFT",
            Gesture::Right       => "RIGHT",
            Gesture::DoublePinch => "DOUBLE_PINCH",
        }
    }
}

/// Primary activation mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NavMode {
    #[default]
    Idle,
    /// Pinch seen, hold timer running.
    Pinching,
    /// Lock acquired, tracking swipes.
    Active,
}

impl NavMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NavMode::Idle     => "IDLE",
            NavMode::Pinching => "PINCHING",
            NavMode::Active   => "ACTIVE",
        }
    }
}

/// What the UI should currently show.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    None,
    /// Tracking, but paused or waiting for the hand to settle.
    Stationary,
    Left,
    Right,
    DoublePinch,
}

impl From<Gesture> for Direction {
    fn from(g: Gesture) -> Self {
        match g {
            Gesture::Left        => Direction::Left,
            Gesture::Right       => Direction::Right,
            Gesture::DoublePinch => Direction::DoublePinch,
        }
    }
}

/// Swipe detector phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SwipePhase {
    #[default]
    Idle,
    Firing,
    WaitingForReset,
}

/// Display state, refreshed on every frame whether or not anything fired.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NavigationSnapshot {
    pub mode:           NavMode,
    /// Hold progress toward activation, 0–100.
    pub pinch_progress: u8,
    pub direction:      Direction,
}

// ════════════════════════════════════════════════════════════════════════════
// GestureSink
// ════════════════════════════════════════════════════════════════════════════

/// Receiver of debounced navigation events.
pub trait GestureSink {
    fn on_gesture(&mut self, gesture: Gesture);
}

impl<F: FnMut(Gesture)> GestureSink for F {
    fn on_gesture(&mut self, gesture: Gesture) {
        self(gesture)
    }
}

/// Channel delivery; a dropped receiver is ignored.
impl GestureSink for Sender<Gesture> {
    fn on_gesture(&mut self, gesture: Gesture) {
        let _ = self.send(gesture);
    }
}

/// Collects every event, in order.
impl GestureSink for Vec<Gesture> {
    fn on_gesture(&mut self, gesture: Gesture) {
        self.push(gesture);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// NavState — everything the interpreter remembers between frames
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default, PartialEq)]
struct NavState {
    mode:             NavMode,
    pinch_progress:   u8,
    direction:        Direction,
    pinch_start:      Option<Millis>,
    previous_x:       Option<f32>,
    last_hand_seen:   Option<Millis>,

    // ── swipe ──────────────────────────────────────────────────────────────
    swipe_phase:      SwipePhase,
    swipe_direction:  Direction,
    swipe_end:        Millis,

    // ── double pinch ───────────────────────────────────────────────────────
    was_pinching:     bool,
    last_pinch_start: Option<Millis>,

    last_emit:        Option<Millis>,
}

// ════════════════════════════════════════════════════════════════════════════
// NavigationInterpreter
// ════════════════════════════════════════════════════════════════════════════

pub struct NavigationInterpreter<S: GestureSink> {
    config: NavigationConfig,
    pinch:  PinchConfig,
    sink:   S,
    state:  NavState,
}

impl<S: GestureSink> NavigationInterpreter<S> {
    pub fn new(config: NavigationConfig, pinch: PinchConfig, sink: S) -> Self {
        NavigationInterpreter { config, pinch, sink, state: NavState::default() }
    }

    /// Default thresholds.
    pub fn with_sink(sink: S) -> Self {
        Self::new(NavigationConfig::default(), PinchConfig::default(), sink)
    }

    pub fn snapshot(&self) -> NavigationSnapshot {
        NavigationSnapshot {
            mode:           self.state.mode,
            pinch_progress: self.state.pinch_progress,
            direction:      self.state.direction,
        }
    }

    pub fn mode(&self) -> NavMode { self.state.mode }
    pub fn swipe_phase(&self) -> SwipePhase { self.state.swipe_phase }
    pub fn sink(&self) -> &S { &self.sink }

    /// Drop all tracking state and start over from `Idle`.
    pub fn reset(&mut self) {
        self.state = NavState::default();
    }

    /// Feed one frame.  `hand` is `None` when the detector saw nothing;
    /// frames with fewer than 21 landmarks are treated the same way.
    pub fn process_frame(&mut self, hand: Option<&HandFrame>, now: Millis) -> NavigationSnapshot {
        let hand = hand.filter(|h| match h.validate() {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "navigation: treating malformed frame as no hand");
                false
            }
        });

        let mut direction = self.double_pinch_display(now);

        direction = match hand {
            Some(h) => self.track_hand(h, now, direction),
            None    => self.track_absence(now, direction),
        };

        self.state.direction = direction;
        self.snapshot()
    }

    /// `DoublePinch` while its display window is open; clears the window
    /// once it has run out.
    fn double_pinch_display(&mut self, now: Millis) -> Direction {
        let s = &mut self.state;
        if s.swipe_phase == SwipePhase::Firing && s.swipe_direction == Direction::DoublePinch {
            if now < s.swipe_end {
                return Direction::DoublePinch;
            }
            s.swipe_phase = SwipePhase::Idle;
            s.swipe_direction = Direction::None;
        }
        Direction::None
    }

    // ── hand present ──────────────────────────────────────────────────────

    fn track_hand(&mut self, hand: &HandFrame, now: Millis, mut direction: Direction) -> Direction {
        self.state.last_hand_seen = Some(now);

        let landmarks = hand.landmarks();
        let pinching = self.pinch.is_five_finger_pinch(landmarks);
        let wrist_x = landmarks[Joint::Wrist.index()].x;

        if pinching && !self.state.was_pinching && self.pinch_rising_edge(now) {
            direction = Direction::DoublePinch;
        }
        self.state.was_pinching = pinching;

        if self.state.mode == NavMode::Active {
            self.track_active(pinching, wrist_x, now, direction)
        } else {
            self.track_activation(pinching, wrist_x, now);
            direction
        }
    }

    /// Returns true when this edge completed a double pinch.
    fn pinch_rising_edge(&mut self, now: Millis) -> bool {
        if let Some(previous) = self.state.last_pinch_start {
            let gap = now.saturating_sub(previous);
            if gap < self.config.double_pinch_window_ms && gap > self.config.double_pinch_floor_ms {
                debug!(gap_ms = gap, "navigation: double pinch");
                let s = &mut self.state;
                s.swipe_phase = SwipePhase::Firing;
                s.swipe_direction = Direction::DoublePinch;
                s.swipe_end = now.saturating_add(self.config.double_pinch_display_ms);
                // a third pinch must start a fresh pair
                s.last_pinch_start = None;
                self.emit(Gesture::DoublePinch, now);
                return true;
            }
        }
        self.state.last_pinch_start = Some(now);
        false
    }

    fn track_activation(&mut self, pinching: bool, wrist_x: f32, now: Millis) {
        let hold = self.config.hold_ms;
        let s = &mut self.state;

        if !pinching {
            if s.mode == NavMode::Pinching {
                debug!("navigation: pinch released before hold completed");
            }
            s.pinch_start = None;
            s.mode = NavMode::Idle;
            s.pinch_progress = 0;
            return;
        }

        let start = *s.pinch_start.get_or_insert(now);
        let elapsed = now.saturating_sub(start);
        s.pinch_progress = hold_progress(elapsed, hold);

        if elapsed > hold {
            info!(held_ms = elapsed, "navigation: lock acquired");
            s.mode = NavMode::Active;
            s.pinch_progress = 100;
            s.previous_x = Some(wrist_x);
            s.swipe_phase = SwipePhase::Idle;
            s.swipe_direction = Direction::None;
        } else {
            if s.mode == NavMode::Idle {
                debug!("navigation: calibrating");
            }
            s.mode = NavMode::Pinching;
        }
    }

    fn track_active(
        &mut self,
        pinching: bool,
        wrist_x: f32,
        now: Millis,
        mut direction: Direction,
    ) -> Direction {
        self.state.pinch_progress = 100;
        let event_active = direction == Direction::DoublePinch;

        if pinching {
            // paused: no swiping while the fingers are gathered
            if !event_active {
                direction = Direction::Stationary;
                self.state.swipe_phase = SwipePhase::Idle;
            }
            self.state.previous_x = Some(wrist_x);
            return direction;
        }

        if let (Some(previous), false) = (self.state.previous_x, event_active) {
            let delta = wrist_x - previous;
            direction = self.advance_swipe(delta, now, direction);
        }
        self.state.previous_x = Some(wrist_x);
        direction
    }

    fn advance_swipe(&mut self, delta: f32, now: Millis, mut direction: Direction) -> Direction {
        let magnitude = delta.abs();
        match self.state.swipe_phase {
            SwipePhase::Idle => {
                if magnitude > self.config.movement_threshold {
                    let gesture = if delta > 0.0 { Gesture::Left } else { Gesture::Right };
                    let s = &mut self.state;
                    s.swipe_phase = SwipePhase::Firing;
                    s.swipe_direction = gesture.into();
                    s.swipe_end = now.saturating_add(self.config.swipe_firing_ms);
                    direction = gesture.into();
                    self.emit(gesture, now);
                }
            }
            SwipePhase::Firing => {
                direction = self.state.swipe_direction;
                if now > self.state.swipe_end {
                    self.state.swipe_phase = SwipePhase::WaitingForReset;
                }
            }
            SwipePhase::WaitingForReset => {
                direction = Direction::Stationary;
                if magnitude < self.config.reset_threshold {
                    self.state.swipe_phase = SwipePhase::Idle;
                    self.state.swipe_direction = Direction::None;
                }
            }
        }
        direction
    }

    // ── hand absent ───────────────────────────────────────────────────────

    fn track_absence(&mut self, now: Millis, direction: Direction) -> Direction {
        let grace = self.config.grace_period_ms;
        let s = &mut self.state;
        s.was_pinching = false;

        let within_grace = s
            .last_hand_seen
            .map_or(false, |seen| now.saturating_sub(seen) < grace);

        if !within_grace {
            if s.mode != NavMode::Idle {
                info!(mode = s.mode.as_str(), "navigation: hand lost, lock released");
            }
            s.pinch_start = None;
            s.mode = NavMode::Idle;
            s.pinch_progress = 0;
            s.previous_x = None;
            s.swipe_phase = SwipePhase::Idle;
            s.swipe_direction = Direction::None;
        }
        direction
    }

    fn emit(&mut self, gesture: Gesture, now: Millis) {
        let window = self.config.emit_debounce_ms;
        let open = self
            .state
            .last_emit
            .map_or(true, |last| now.saturating_sub(last) > window);
        if !open {
            debug!(gesture = gesture.as_str(), "navigation: suppressed inside debounce window");
            return;
        }
        self.state.last_emit = Some(now);
        info!(gesture = gesture.as_str(), "navigation: gesture");
        self.sink.on_gesture(gesture);
    }
}

impl<S: GestureSink> FrameInterpreter for NavigationInterpreter<S> {
    type Output = NavigationSnapshot;

    fn process_frame(&mut self, hand: Option<&HandFrame>, now: Millis) -> NavigationSnapshot {
        NavigationInterpreter::process_frame(self, hand, now)
    }

    fn reset(&mut self) {
        NavigationInterpreter::reset(self)
    }
}

/// Integer percentage of the hold completed, capped at 100.
fn hold_progress(elapsed: Millis, hold: Millis) -> u8 {
    (elapsed.saturating_mul(100) / hold.max(1)).min(100) as u8
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
