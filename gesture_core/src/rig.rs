//! Renderer-side model pose.
//!
//! The rotation interpreter produces deltas; something has to turn them into
//! a displayed orientation.  [`ModelRig`] keeps a target pose that deltas and
//! mouse drags write into, and a current pose that chases the target with a
//! fixed damping factor every frame.  When nothing is steering, the target
//! drifts slowly around the vertical axis.
//!
//! The rig knows nothing about drawing; hosts read [`ModelRig::current`] and
//! [`ModelRig::propellers`] each frame.

use crate::config::RigConfig;
use crate::rotation::Rotation;

/// Anything that can absorb rotation deltas.
pub trait RotationTarget {
    fn apply_rotation(&mut self, delta: Rotation);
}

impl RotationTarget for Rotation {
    fn apply_rotation(&mut self, delta: Rotation) {
        *self += delta;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModelRig {
    config:          RigConfig,
    current:         Rotation,
    target:          Rotation,
    drag_anchor:     Option<(f32, f32)>,
    propeller_left:  f32,
    propeller_right: f32,
}

impl Default for ModelRig {
    fn default() -> Self {
        ModelRig::new(RigConfig::default())
    }
}

impl ModelRig {
    pub fn new(config: RigConfig) -> Self {
        let initial = config.initial;
        ModelRig {
            config,
            current:         initial,
            target:          initial,
            drag_anchor:     None,
            propeller_left:  0.0,
            propeller_right: 0.0,
        }
    }

    pub fn current(&self) -> Rotation { self.current }
    pub fn target(&self) -> Rotation { self.target }
    pub fn is_dragging(&self) -> bool { self.drag_anchor.is_some() }

    /// Left and right propeller angles, radians.  They turn in opposite
    /// directions.
    pub fn propellers(&self) -> (f32, f32) {
        (self.propeller_left, self.propeller_right)
    }

    // ── mouse drag ────────────────────────────────────────────────────────

    pub fn begin_drag(&mut self, x: f32, y: f32) {
        self.drag_anchor = Some((x, y));
    }

    /// Pointer moved to (`x`, `y`) pixels.  No-op unless a drag is in
    /// progress.
    pub fn drag_to(&mut self, x: f32, y: f32) {
        let Some((ax, ay)) = self.drag_anchor else {
            return;
        };
        let gain = self.config.drag_gain;
        self.target.y -= (x - ax) * gain;
        self.target.x -= (y - ay) * gain;
        self.drag_anchor = Some((x, y));
    }

    pub fn end_drag(&mut self) {
        self.drag_anchor = None;
    }

    /// Advance one display frame.  `gesture_rotating` suppresses idle drift
    /// while a hand is steering.
    pub fn tick(&mut self, gesture_rotating: bool) {
        let spin = self.config.propeller_spin;
        self.propeller_left += spin;
        self.propeller_right -= spin;

        self.current += (self.target - self.current) * self.config.damping;

        if !self.is_dragging() && !gesture_rotating {
            self.target.y += self.config.idle_spin;
        }
    }
}

impl RotationTarget for ModelRig {
    fn apply_rotation(&mut self, delta: Rotation) {
        self.target += delta;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn still() -> RigConfig {
        RigConfig { idle_spin: 0.0, initial: Rotation::ZERO, ..RigConfig::default() }
    }

    #[test]
    fn starts_at_initial_pose() {
        let rig = ModelRig::default();
        assert_eq!(rig.current(), Rotation::new(0.5, -0.5));
        assert_eq!(rig.target(), rig.current());
    }

    #[test]
    fn current_chases_target_with_damping() {
        let mut rig = ModelRig::new(still());
        rig.apply_rotation(Rotation::new(1.0, 0.0));
        rig.tick(true);
        assert!((rig.current().x - 0.1).abs() < 1e-6);
        for _ in 0..200 {
            rig.tick(true);
        }
        assert!((rig.current().x - 1.0).abs() < 1e-4);
    }

    #[test]
    fn idle_spin_only_when_unsteered() {
        let mut rig = ModelRig::new(RigConfig { initial: Rotation::ZERO, ..RigConfig::default() });
        rig.tick(false);
        assert!((rig.target().y - 0.002).abs() < 1e-7);

        rig.tick(true);
        assert!((rig.target().y - 0.002).abs() < 1e-7);

        rig.begin_drag(10.0, 10.0);
        rig.tick(false);
        assert!((rig.target().y - 0.002).abs() < 1e-7);
    }

    #[test]
    fn drag_moves_target_against_pointer() {
        let mut rig = ModelRig::new(still());
        rig.drag_to(50.0, 50.0);
        assert_eq!(rig.target(), Rotation::ZERO);

        rig.begin_drag(100.0, 100.0);
        rig.drag_to(120.0, 90.0);
        let t = rig.target();
        assert!((t.y - (-0.1)).abs() < 1e-6);
        assert!((t.x - 0.05).abs() < 1e-6);

        // deltas are relative to the last pointer position
        rig.drag_to(120.0, 90.0);
        assert_eq!(rig.target(), t);

        rig.end_drag();
        rig.drag_to(0.0, 0.0);
        assert_eq!(rig.target(), t);
    }

    #[test]
    fn propellers_counter_rotate() {
        let mut rig = ModelRig::default();
        for _ in 0..10 {
            rig.tick(false);
        }
        let (l, r) = rig.propellers();
        assert!((l - 3.0).abs() < 1e-4);
        assert!((r + 3.0).abs() < 1e-4);
    }

    #[test]
    fn rotation_itself_is_a_target() {
        let mut r = Rotation::new(1.0, 1.0);
        r.apply_rotation(Rotation::new(0.5, -0.5));
        assert_eq!(r, Rotation::new(1.5, 0.5));
    }
}
