//! Top-level lab state.
//!
//! `LabState` owns the gesture session (detector plus both interpreters),
//! the model rig and an optional recorder.  Each display frame `run` feeds it
//! the keyboard hand, and the visualizer reads everything back out of it.
//!
//! Gestures can be switched off and on at runtime.  Off releases the
//! detector and throws the interpreters away; the rig keeps animating.  On
//! opens a fresh detector, so both interpreters start over from `Idle`.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::time::Instant;

use anyhow::Context;
use tracing::{info, warn};

use gesture_core::{
    Gesture, GestureConfig, GestureSession, HandFrame, LandmarkDetector, Millis, ModelRig,
    NavigationInterpreter, NavigationSnapshot, RecordingWriter, RotationInterpreter,
    RotationSnapshot, RotationTarget,
};

use crate::source::{KeyboardHand, LabFrame, ReplayDetector, SimDetector};
use crate::visualizer::Visualizer;

// ════════════════════════════════════════════════════════════════════════════
// LabConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default)]
pub struct LabConfig {
    pub gestures: GestureConfig,
    /// Play this recording instead of the keyboard hand.
    pub replay:   Option<PathBuf>,
    /// Capture every processed frame here.
    pub record:   Option<PathBuf>,
}

/// How long the last emitted gesture stays on the HUD.
pub const BANNER_MS: Millis = 2000;

pub type LabDetector = Box<dyn LandmarkDetector<Frame = LabFrame>>;
pub type LabInterpreters = (NavigationInterpreter<Sender<Gesture>>, RotationInterpreter);
type Recorder = RecordingWriter<BufWriter<File>>;

// ════════════════════════════════════════════════════════════════════════════
// LabState
// ════════════════════════════════════════════════════════════════════════════

pub struct LabState {
    // ── pipeline ─────────────────────────────────────────────────────────
    config:     GestureConfig,
    session:    Option<GestureSession<LabDetector, LabInterpreters>>,
    gesture_rx: Receiver<Gesture>,
    recorder:   Option<Recorder>,

    // ── display state ────────────────────────────────────────────────────
    rig:        ModelRig,
    nav:        NavigationSnapshot,
    rotation:   RotationSnapshot,
    last_hand:  Option<HandFrame>,
    banner:     Option<(Gesture, Millis)>,
    now:        Millis,

    pub status: String,
}

impl LabState {
    pub fn new(config: &GestureConfig, detector: LabDetector) -> Self {
        let (session, gesture_rx) = open_session(config, detector);

        LabState {
            config:    config.clone(),
            session:   Some(session),
            gesture_rx,
            recorder:  None,
            rig:       ModelRig::new(config.rig.clone()),
            nav:       NavigationSnapshot::default(),
            rotation:  RotationSnapshot::default(),
            last_hand: None,
            banner:    None,
            now:       0,
            status:    "Ready. Hold P to pinch.".to_string(),
        }
    }

    pub fn with_recorder(mut self, recorder: Recorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    // ── per-frame tick ────────────────────────────────────────────────────

    /// One display frame: detection and interpretation (skipped if the video
    /// time has not moved), gesture delivery, rig animation.
    pub fn tick(&mut self, frame: &LabFrame, video_time: Millis, now: Millis) {
        self.now = now;

        let processed = self.session.as_mut().and_then(|s| {
            let tick = s.tick(frame, video_time, now)?;
            Some((tick, s.interpreter().1.snapshot()))
        });

        if let Some((tick, rotation)) = processed {
            let (nav, delta) = tick.output;
            self.nav = nav;
            self.rotation = rotation;
            self.rig.apply_rotation(delta);
            self.record(video_time, tick.hand.as_ref());
            self.last_hand = tick.hand;
        }

        loop {
            match self.gesture_rx.try_recv() {
                Ok(g) => self.handle_gesture(g, now),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        self.rig.tick(self.rotation.rotating);
    }

    fn handle_gesture(&mut self, gesture: Gesture, now: Millis) {
        self.banner = Some((gesture, now));
        self.status = match gesture {
            Gesture::Left        => "Swipe LEFT".to_string(),
            Gesture::Right       => "Swipe RIGHT".to_string(),
            Gesture::DoublePinch => "DOUBLE PINCH".to_string(),
        };
    }

    fn record(&mut self, t: Millis, hand: Option<&HandFrame>) {
        let Some(rec) = self.recorder.as_mut() else {
            return;
        };
        if let Err(e) = rec.write_frame(t, hand) {
            warn!(error = %e, "lab: recording stopped");
            self.recorder = None;
        }
    }

    /// The external unlock for the rotation interpreter.
    pub fn unlock(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.interpreter_mut().1.reset();
        self.rotation = session.interpreter().1.snapshot();
        self.status = "Rotation unlocked".to_string();
    }

    // ── gestures on / off ─────────────────────────────────────────────────

    pub fn gestures_enabled(&self) -> bool { self.session.is_some() }

    /// Release the detector and drop both interpreters.  The rig is left
    /// alone, so an idle spin carries on.
    pub fn stop_gestures(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        session.stop();
        self.nav = NavigationSnapshot::default();
        self.rotation = RotationSnapshot::default();
        self.last_hand = None;
        self.status = "Gestures off".to_string();
        info!("lab: gestures off");
    }

    /// Start a new session on `detector` with fresh interpreters.
    pub fn start_gestures(&mut self, detector: LabDetector) {
        self.stop_gestures();
        let (session, gesture_rx) = open_session(&self.config, detector);
        self.session = Some(session);
        self.gesture_rx = gesture_rx;
        self.status = "Gestures on".to_string();
        info!("lab: gestures on");
    }

    pub fn rig_mut(&mut self) -> &mut ModelRig { &mut self.rig }

    /// End the session: flush the recording and release the detector.
    pub fn finish(self) -> anyhow::Result<()> {
        let LabState { session, recorder, .. } = self;
        if let Some(session) = session {
            session.stop();
        }
        if let Some(mut rec) = recorder {
            rec.flush().context("flushing recording")?;
            info!(frames = rec.frames_written(), "lab: recording saved");
        }
        Ok(())
    }

    // ── accessors for the render loop ─────────────────────────────────────

    pub fn nav(&self)       -> &NavigationSnapshot { &self.nav }
    pub fn rotation(&self)  -> &RotationSnapshot   { &self.rotation }
    pub fn rig(&self)       -> &ModelRig           { &self.rig }
    pub fn last_hand(&self) -> Option<&HandFrame>  { self.last_hand.as_ref() }

    /// The most recent gesture while it is still fresh.
    pub fn banner(&self) -> Option<Gesture> {
        self.banner
            .filter(|&(_, at)| self.now.saturating_sub(at) < BANNER_MS)
            .map(|(g, _)| g)
    }
}

fn open_session(
    config: &GestureConfig,
    detector: LabDetector,
) -> (GestureSession<LabDetector, LabInterpreters>, Receiver<Gesture>) {
    let (tx, gesture_rx) = mpsc::channel();
    let nav = NavigationInterpreter::new(config.navigation.clone(), config.pinch.clone(), tx);
    let rot = RotationInterpreter::new(config.rotation.clone(), config.pinch.clone());
    (GestureSession::start(detector, (nav, rot)), gesture_rx)
}

/// The replay if one was asked for, otherwise the keyboard hand.
fn open_detector(cfg: &LabConfig) -> gesture_core::Result<LabDetector> {
    Ok(match &cfg.replay {
        Some(path) => Box::new(ReplayDetector::open(path)?),
        None       => Box::new(SimDetector),
    })
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main loop
// ════════════════════════════════════════════════════════════════════════════

/// Open the window and drive the lab at ~60 fps until it is closed.
pub fn run(cfg: LabConfig) -> anyhow::Result<()> {
    let detector = open_detector(&cfg)?;

    let mut app = LabState::new(&cfg.gestures, detector);
    if let Some(path) = &cfg.record {
        let file = File::create(path)
            .with_context(|| format!("creating recording {}", path.display()))?;
        app = app.with_recorder(RecordingWriter::new(BufWriter::new(file)));
        info!(path = %path.display(), "lab: recording");
    }

    let mut vis = Visualizer::new()?;
    let mut hand = KeyboardHand::default();
    let start = Instant::now();
    // video time restarts with every session so a replay plays from the top
    let mut session_start = Instant::now();

    while vis.is_open() {
        // 1. Poll window input
        let input = vis.poll_input();
        if input.quit { break; }

        hand.update(input.pointer, input.keys);
        if input.unlock { app.unlock(); }

        if input.toggle_gestures {
            if app.gestures_enabled() {
                app.stop_gestures();
            } else {
                match open_detector(&cfg) {
                    Ok(detector) => {
                        app.start_gestures(detector);
                        session_start = Instant::now();
                    }
                    Err(e) => {
                        warn!(error = %e, "lab: could not restart gestures");
                        app.status = format!("Gestures off: {}", e);
                    }
                }
            }
        }

        // 2. Mouse drag straight onto the rig
        match input.drag {
            Some((x, y)) if app.rig().is_dragging() => app.rig_mut().drag_to(x, y),
            Some((x, y)) => app.rig_mut().begin_drag(x, y),
            None         => app.rig_mut().end_drag(),
        }

        // 3. Gesture pipeline
        let now = start.elapsed().as_millis() as Millis;
        let video_time = session_start.elapsed().as_millis() as Millis;
        app.tick(&hand.frame(), video_time, now);

        // 4. Render
        vis.render(&app, hand.is_hidden());
    }

    app.finish()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
