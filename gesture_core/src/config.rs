//! Tunable thresholds for the classifiers, both interpreters and the rig.
//!
//! Every value here was tuned by hand against a webcam-grade landmark model,
//! not derived.  All structs deserialize with `#[serde(default)]`, so a TOML
//! file only needs to name what it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::landmark::Millis;
use crate::rotation::Rotation;

// ════════════════════════════════════════════════════════════════════════════
// PinchConfig
// ════════════════════════════════════════════════════════════════════════════

/// Distance thresholds for the pinch classifiers, in normalized units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinchConfig {
    /// Mean fingertip-to-centroid distance below which all five tips count
    /// as drawn together.
    pub five_finger_threshold: f32,
    /// Thumb-tip to index-tip distance below which the grip chord is held.
    pub two_finger_threshold: f32,
}

impl Default for PinchConfig {
    fn default() -> Self {
        PinchConfig {
            five_finger_threshold: 0.06,
            two_finger_threshold:  0.05,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// NavigationConfig
// ════════════════════════════════════════════════════════════════════════════

/// Timing and movement thresholds for the navigation interpreter.
///
/// Swipe direction assumes the upstream video is mirrored for display: a
/// wrist moving toward larger raw x reads as `Left` on screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Five-finger pinch hold needed to go from calibrating to active.
    pub hold_ms: Millis,
    /// How long the hand may vanish before an active lock is dropped.
    pub grace_period_ms: Millis,
    /// Per-frame wrist x delta that starts a swipe.
    pub movement_threshold: f32,
    /// Per-frame wrist x delta under which the swipe detector re-arms.
    pub reset_threshold: f32,
    /// How long a committed swipe stays in its firing phase.
    pub swipe_firing_ms: Millis,
    /// Upper bound on the gap between two pinch rising edges.
    pub double_pinch_window_ms: Millis,
    /// Lower bound on that gap; faster edges are detector flicker.
    pub double_pinch_floor_ms: Millis,
    /// How long a double pinch owns the display and blocks swipes.
    pub double_pinch_display_ms: Millis,
    /// Minimum spacing between two deliveries to the sink.
    pub emit_debounce_ms: Millis,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        NavigationConfig {
            hold_ms:                 1500,
            grace_period_ms:         500,
            movement_threshold:      0.015,
            reset_threshold:         0.003,
            swipe_firing_ms:         500,
            double_pinch_window_ms:  500,
            double_pinch_floor_ms:   100,
            double_pinch_display_ms: 1000,
            emit_debounce_ms:        500,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// RotationConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Five-finger pinch hold needed to lock.
    pub hold_ms: Millis,
    /// EMA factor applied to the wrist position; lower is smoother but lags.
    pub smoothing_alpha: f32,
    /// Radians of rotation per normalized unit of smoothed hand travel.
    pub gain: f32,
}

impl Default for RotationConfig {
    fn default() -> Self {
        RotationConfig {
            hold_ms:         1000,
            smoothing_alpha: 0.3,
            gain:            5.0,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// RigConfig
// ════════════════════════════════════════════════════════════════════════════

/// Renderer-side constants: how the displayed pose chases its target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    /// Fraction of the remaining gap closed per frame.
    pub damping: f32,
    /// Target yaw added per frame when nothing is steering the model.
    pub idle_spin: f32,
    /// Radians per pixel of mouse drag.
    pub drag_gain: f32,
    /// Propeller advance per frame, radians.
    pub propeller_spin: f32,
    /// Pose the model starts in.
    pub initial: Rotation,
}

impl Default for RigConfig {
    fn default() -> Self {
        RigConfig {
            damping:        0.1,
            idle_spin:      0.002,
            drag_gain:      0.005,
            propeller_spin: 0.3,
            initial:        Rotation::new(0.5, -0.5),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureConfig — the whole file
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub pinch:      PinchConfig,
    pub navigation: NavigationConfig,
    pub rotation:   RotationConfig,
    pub rig:        RigConfig,
}

impl GestureConfig {
    /// Reject combinations the state machines cannot run sensibly with.
    pub fn validate(&self) -> Result<()> {
        let p = &self.pinch;
        positive("pinch.five_finger_threshold", p.five_finger_threshold)?;
        positive("pinch.two_finger_threshold", p.two_finger_threshold)?;

        let n = &self.navigation;
        nonzero("navigation.hold_ms", n.hold_ms)?;
        positive("navigation.movement_threshold", n.movement_threshold)?;
        positive("navigation.reset_threshold", n.reset_threshold)?;
        if n.reset_threshold >= n.movement_threshold {
            return Err(Error::Config(format!(
                "navigation.reset_threshold ({}) must be below movement_threshold ({})",
                n.reset_threshold, n.movement_threshold
            )));
        }
        if n.double_pinch_floor_ms >= n.double_pinch_window_ms {
            return Err(Error::Config(format!(
                "navigation.double_pinch_floor_ms ({}) must be below double_pinch_window_ms ({})",
                n.double_pinch_floor_ms, n.double_pinch_window_ms
            )));
        }

        let r = &self.rotation;
        nonzero("rotation.hold_ms", r.hold_ms)?;
        unit_interval("rotation.smoothing_alpha", r.smoothing_alpha)?;

        unit_interval("rig.damping", self.rig.damping)?;
        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}

fn positive(name: &str, value: f32) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(Error::Config(format!("{} must be positive, got {}", name, value)))
    }
}

fn nonzero(name: &str, value: Millis) -> Result<()> {
    if value > 0 {
        Ok(())
    } else {
        Err(Error::Config(format!("{} must be non-zero", name)))
    }
}

/// (0, 1]
fn unit_interval(name: &str, value: f32) -> Result<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(Error::Config(format!("{} must be in (0, 1], got {}", name, value)))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_are_the_tuned_constants() {
        let c = GestureConfig::default();
        assert_eq!(c.navigation.hold_ms, 1500);
        assert_eq!(c.rotation.hold_ms, 1000);
        assert_eq!(c.navigation.grace_period_ms, 500);
        assert_eq!(c.navigation.movement_threshold, 0.015);
        assert_eq!(c.navigation.reset_threshold, 0.003);
        assert_eq!(c.navigation.swipe_firing_ms, 500);
        assert_eq!(c.navigation.double_pinch_window_ms, 500);
        assert_eq!(c.navigation.double_pinch_floor_ms, 100);
        assert_eq!(c.pinch.five_finger_threshold, 0.06);
        assert_eq!(c.pinch.two_finger_threshold, 0.05);
        assert_eq!(c.rotation.smoothing_alpha, 0.3);
        assert_eq!(c.rig.damping, 0.1);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn toml_round_trip() {
        let mut c = GestureConfig::default();
        c.navigation.hold_ms = 1200;
        c.rig.initial = Rotation::new(0.0, 0.0);
        let text = c.to_toml().expect("serialize");
        let back = GestureConfig::from_toml_str(&text).expect("deserialize");
        assert_eq!(back, c);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let c = GestureConfig::from_toml_str(
            "[navigation]\nmovement_threshold = 0.02\n\n[pinch]\ntwo_finger_threshold = 0.04\n",
        )
        .expect("partial config");
        assert_eq!(c.navigation.movement_threshold, 0.02);
        assert_eq!(c.navigation.hold_ms, 1500);
        assert_eq!(c.pinch.two_finger_threshold, 0.04);
        assert_eq!(c.pinch.five_finger_threshold, 0.06);
        assert_eq!(c.rotation, RotationConfig::default());
    }

    #[test]
    fn rejects_reset_threshold_above_movement() {
        let err = GestureConfig::from_toml_str(
            "[navigation]\nmovement_threshold = 0.01\nreset_threshold = 0.02\n",
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_inverted_double_pinch_window() {
        let mut c = GestureConfig::default();
        c.navigation.double_pinch_floor_ms = 600;
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_alpha_out_of_range() {
        let mut c = GestureConfig::default();
        c.rotation.smoothing_alpha = 0.0;
        assert!(c.validate().is_err());
        c.rotation.smoothing_alpha = 1.5;
        assert!(c.validate().is_err());
        c.rotation.smoothing_alpha = 1.0;
        assert!(c.validate().is_ok());
    }

    #[test]
    fn rejects_zero_hold() {
        let mut c = GestureConfig::default();
        c.navigation.hold_ms = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = GestureConfig::from_toml_str("[navigation\nhold_ms = ").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("gestures.toml");
        std::fs::write(&path, "[rotation]\nhold_ms = 800\n").unwrap();
        let c = GestureConfig::load(&path).expect("load");
        assert_eq!(c.rotation.hold_ms, 800);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = TempDir::new().expect("tempdir");
        let err = GestureConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
