//! # gesture_core
//!
//! Hand gesture interpretation over a per-frame stream of 21-point hand
//! landmarks.  No camera, no model, no rendering: a host supplies frames and
//! timestamps and reads back events, snapshots and rotation deltas.
//!
//! ## Interpreters
//!
//! | Interpreter | Lock ritual | While locked | Output |
//! |---|---|---|---|
//! | [`NavigationInterpreter`] | five-finger pinch held 1.5 s | open-hand wrist swipes, double pinch | `Left` / `Right` / `DoublePinch` to a [`GestureSink`], 500 ms debounce |
//! | [`RotationInterpreter`] | five-finger pinch held 1 s | thumb + index grip drags | per-frame [`Rotation`] delta |
//!
//! Navigation keeps its lock through a 500 ms dropout; rotation keeps its
//! lock until the host calls `reset`.
//!
//! ## Pieces
//!
//! * [`geometry`] — distance, centroid and the two pinch classifiers.
//! * [`config`] — every tunable, loadable from TOML.
//! * [`rig`] — damped model pose a renderer draws from.
//! * [`session`] — owns a detector and interpreters, one `tick` per frame.
//! * [`recording`] — JSON-lines capture and replay of landmark streams.
//! * [`synth`] — synthetic hands for simulation and tests.
//!
//! ## Coordinates
//!
//! Landmarks are normalized to the raw (unmirrored) camera frame.  Hosts are
//! expected to display the feed mirrored, which is why a wrist moving toward
//! larger x reads as a swipe to the *left*.

pub mod error;
pub mod landmark;
pub mod config;
pub mod geometry;
pub mod synth;
pub mod navigation;
pub mod rotation;
pub mod rig;
pub mod session;
pub mod recording;

pub use error::{Error, Result};
pub use landmark::{HandFrame, Joint, Landmark, Millis, HAND_CONNECTIONS, LANDMARK_COUNT};
pub use config::{GestureConfig, NavigationConfig, PinchConfig, RigConfig, RotationConfig};
pub use geometry::{centroid, distance, fingertip_spread, is_five_finger_pinch, is_two_finger_pinch};
pub use navigation::{
    Direction, Gesture, GestureSink, NavMode, NavigationInterpreter, NavigationSnapshot, SwipePhase,
};
pub use rotation::{LockStatus, Rotation, RotationInterpreter, RotationSnapshot};
pub use rig::{ModelRig, RotationTarget};
pub use session::{FrameInterpreter, GestureSession, LandmarkDetector, Tick};
pub use recording::{read_recording, RecordedFrame, RecordingWriter};
pub use synth::{HandPose, HandShape};
