//! # gesture_lab
//!
//! Desktop test bench for `gesture_core`.  A synthetic hand steered by the
//! mouse (or a replayed recording) feeds one session running both
//! interpreters side by side; a `minifb` window shows what they make of it.
//!
//! ## Keyboard hand
//!
//! | Input | Effect |
//! |---|---|
//! | mouse over the camera pane | moves the wrist (pane is mirrored) |
//! | `P` held | five-finger pinch |
//! | `G` held | thumb + index grip |
//! | `H` | hide / show the hand (simulated dropout) |
//! | `U` | unlock the rotation interpreter |
//! | `C` | gestures off / on (on starts both interpreters from idle) |
//! | right mouse drag | rotate the model directly |
//! | `Q` / `Esc` | quit |
//!
//! Hold `P` for 1.5 s to activate navigation, then sweep the mouse for
//! swipes; two quick `P` taps make a double pinch.  The same hold locks
//! rotation after 1 s, after which `G` + mouse turns the model.

pub mod source;
pub mod app;
pub mod visualizer;
