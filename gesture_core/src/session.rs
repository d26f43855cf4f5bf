//! Per-frame pipeline: detector in, interpreter out.
//!
//! A [`GestureSession`] owns exactly one landmark detector and one
//! interpreter (or a pair of them, see the tuple impl of
//! [`FrameInterpreter`]).  Each display frame the host calls
//! [`GestureSession::tick`]; the session runs detection only when the video
//! time has moved, then hands the result to the interpreter.
//!
//! The detector is released exactly once: by [`GestureSession::stop`] or,
//! failing that, when the session is dropped.  Interpreter state goes with
//! the session, so a new session always starts from `Idle`.

use tracing::{debug, info};

use crate::landmark::{HandFrame, Millis};

// ════════════════════════════════════════════════════════════════════════════
// Seams
// ════════════════════════════════════════════════════════════════════════════

/// An external hand landmark model.
///
/// `detect` is synchronous and returns at most one hand.  Construction is
/// the implementor's business; a failure there should surface as
/// [`Error::DetectorInit`](crate::Error::DetectorInit) before a session is
/// ever started.
pub trait LandmarkDetector {
    /// Whatever the detector consumes: a video frame, a simulated pose, ...
    type Frame: ?Sized;

    fn detect(&mut self, frame: &Self::Frame, timestamp: Millis) -> Option<HandFrame>;

    /// Release underlying resources.  Called once when the session ends.
    fn close(&mut self) {}
}

impl<D: LandmarkDetector + ?Sized> LandmarkDetector for Box<D> {
    type Frame = D::Frame;

    fn detect(&mut self, frame: &Self::Frame, timestamp: Millis) -> Option<HandFrame> {
        (**self).detect(frame, timestamp)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// A frame-driven state machine over the hand stream.
pub trait FrameInterpreter {
    type Output;

    fn process_frame(&mut self, hand: Option<&HandFrame>, now: Millis) -> Self::Output;

    /// Back to the initial state.
    fn reset(&mut self);
}

/// Two interpreters fed the same frames, outputs paired.
impl<A: FrameInterpreter, B: FrameInterpreter> FrameInterpreter for (A, B) {
    type Output = (A::Output, B::Output);

    fn process_frame(&mut self, hand: Option<&HandFrame>, now: Millis) -> Self::Output {
        (self.0.process_frame(hand, now), self.1.process_frame(hand, now))
    }

    fn reset(&mut self) {
        self.0.reset();
        self.1.reset();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureSession
// ════════════════════════════════════════════════════════════════════════════

/// Result of one processed frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Tick<O> {
    /// What the detector saw, for drawing.
    pub hand:   Option<HandFrame>,
    pub output: O,
}

pub struct GestureSession<D: LandmarkDetector, I: FrameInterpreter> {
    detector:        D,
    interpreter:     I,
    last_video_time: Option<Millis>,
    frames:          u64,
    closed:          bool,
}

impl<D: LandmarkDetector, I: FrameInterpreter> GestureSession<D, I> {
    pub fn start(detector: D, interpreter: I) -> Self {
        info!("session: started");
        GestureSession {
            detector,
            interpreter,
            last_video_time: None,
            frames:          0,
            closed:          false,
        }
    }

    /// Run one frame through detection and interpretation.
    ///
    /// `video_time` is the source's own clock and is used only to skip
    /// frames already seen; `now` is the wall clock the interpreter times
    /// its holds against.  Returns `None` for a skipped frame.
    pub fn tick(&mut self, frame: &D::Frame, video_time: Millis, now: Millis) -> Option<Tick<I::Output>> {
        if self.last_video_time == Some(video_time) {
            return None;
        }
        self.last_video_time = Some(video_time);
        self.frames += 1;

        let hand = self.detector.detect(frame, video_time);
        let output = self.interpreter.process_frame(hand.as_ref(), now);
        Some(Tick { hand, output })
    }

    pub fn interpreter(&self) -> &I { &self.interpreter }
    pub fn interpreter_mut(&mut self) -> &mut I { &mut self.interpreter }

    /// Frames actually processed (skipped duplicates not counted).
    pub fn frames_processed(&self) -> u64 { self.frames }

    /// End the session, releasing the detector.  Interpreter state is
    /// discarded.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.detector.close();
        debug!(frames = self.frames, "session: detector released");
    }
}

impl<D: LandmarkDetector, I: FrameInterpreter> Drop for GestureSession<D, I> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::navigation::{Gesture, NavMode, NavigationInterpreter};
    use crate::rotation::{LockStatus, RotationInterpreter};
    use crate::synth::{HandPose, HandShape};

    /// Poses in, frames out; counts detections and closes.
    struct FakeDetector {
        detections: Rc<Cell<u32>>,
        closes:     Rc<Cell<u32>>,
    }

    impl LandmarkDetector for FakeDetector {
        type Frame = Option<HandPose>;

        fn detect(&mut self, frame: &Option<HandPose>, _timestamp: Millis) -> Option<HandFrame> {
            self.detections.set(self.detections.get() + 1);
            frame.map(|p| p.frame())
        }

        fn close(&mut self) {
            self.closes.set(self.closes.get() + 1);
        }
    }

    fn fake() -> (FakeDetector, Rc<Cell<u32>>, Rc<Cell<u32>>) {
        let detections = Rc::new(Cell::new(0));
        let closes = Rc::new(Cell::new(0));
        let d = FakeDetector { detections: detections.clone(), closes: closes.clone() };
        (d, detections, closes)
    }

    #[test]
    fn duplicate_video_time_is_skipped() {
        let (d, detections, _) = fake();
        let mut s = GestureSession::start(d, RotationInterpreter::default());
        let pose = Some(HandPose::new(0.5, 0.5, HandShape::Open));
        assert!(s.tick(&pose, 33, 1000).is_some());
        assert!(s.tick(&pose, 33, 1016).is_none());
        assert!(s.tick(&pose, 66, 1032).is_some());
        assert_eq!(detections.get(), 2);
        assert_eq!(s.frames_processed(), 2);
    }

    #[test]
    fn stop_closes_detector_exactly_once() {
        let (d, _, closes) = fake();
        let s = GestureSession::start(d, RotationInterpreter::default());
        s.stop();
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn drop_closes_detector() {
        let (d, _, closes) = fake();
        {
            let _s = GestureSession::start(d, RotationInterpreter::default());
        }
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn boxed_detector_forwards() {
        let (d, detections, closes) = fake();
        let boxed: Box<dyn LandmarkDetector<Frame = Option<HandPose>>> = Box::new(d);
        let mut s = GestureSession::start(boxed, RotationInterpreter::default());
        s.tick(&None, 0, 0);
        s.stop();
        assert_eq!(detections.get(), 1);
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn paired_interpreters_see_the_same_frames() {
        let (d, _, _) = fake();
        let pair = (NavigationInterpreter::with_sink(Vec::<Gesture>::new()), RotationInterpreter::default());
        let mut s = GestureSession::start(d, pair);
        let pinch = Some(HandPose::new(0.5, 0.5, HandShape::FivePinch));
        let mut last = None;
        for t in (0..=1600).step_by(100) {
            last = s.tick(&pinch, t, t);
        }
        let tick = last.expect("processed");
        assert!(tick.hand.is_some());
        let (nav, delta) = tick.output;
        assert_eq!(nav.mode, NavMode::Active);
        assert!(delta.is_zero());
        assert_eq!(s.interpreter().1.status(), LockStatus::Locked);

        s.interpreter_mut().reset();
        assert_eq!(s.interpreter().0.mode(), NavMode::Idle);
        assert_eq!(s.interpreter().1.status(), LockStatus::Idle);
    }

    #[test]
    fn missing_hand_reaches_interpreter_as_none() {
        let (d, _, _) = fake();
        let mut s = GestureSession::start(d, RotationInterpreter::default());
        let tick = s.tick(&None, 0, 0).expect("processed");
        assert!(tick.hand.is_none());
        assert!(tick.output.is_zero());
    }
}
