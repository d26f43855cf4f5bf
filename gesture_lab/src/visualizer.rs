//! Software-rendered lab window using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────┬─────────────────────────┐
//! │  mirrored camera pane                │  MODEL                  │
//! │                                      │                         │
//! │     hand skeleton                    │     wireframe body      │
//! │     gesture banner                   │     + two propellers    │
//! │                                      │                         │
//! ├──────────────────────────────────────┤                         │
//! │  HUD: nav mode, hold bar, direction  │                         │
//! │       rotation lock, status          │  key legend             │
//! └──────────────────────────────────────┴─────────────────────────┘
//! ```

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use gesture_core::{
    Direction, Gesture, HandFrame, LockStatus, NavMode, Rotation, HAND_CONNECTIONS,
};

use crate::app::LabState;
use crate::source::{screen_to_raw, HandKeys};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:    usize = 1120;
pub const WIN_H:    usize = 560;
pub const HAND_W:   usize = 640;
pub const HAND_H:   usize = 480;
const MODEL_X:      usize = HAND_W;
const MODEL_W:      usize = WIN_W - HAND_W;
const HUD_Y:        usize = HAND_H;
const MODEL_SCALE:  f32   = 150.0;
const BAR_W:        usize = 200;
const HAND_BG:      u32   = 0xFF101418;
const HUD_BG:       u32   = 0xFF0F3460;
const MODEL_BG:     u32   = 0xFF16213E;
const IDLE_COLOR:   u32   = 0xFFCCCCCC;
const PINCH_COLOR:  u32   = 0xFFFFB000;
const ACTIVE_COLOR: u32   = 0xFF40E080;
const BANNER_COLOR: u32   = 0xFFFFD700;
const WIRE_COLOR:   u32   = 0xFFAADDFF;
const PROP_COLOR:   u32   = 0xFFFFBBAA;

// ════════════════════════════════════════════════════════════════════════════
// Input
// ════════════════════════════════════════════════════════════════════════════

/// Everything the lab needs from the window in one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LabInput {
    pub quit:    bool,
    pub unlock:  bool,
    /// Switch the gesture session off or back on.
    pub toggle_gestures: bool,
    pub keys:    HandKeys,
    /// Mouse over the camera pane, in raw (unmirrored) normalized coords.
    pub pointer: Option<(f32, f32)>,
    /// Mouse position in pixels while the right button is held.
    pub drag:    Option<(f32, f32)>,
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    buf:    Vec<u32>,
}

impl Visualizer {
    pub fn new() -> anyhow::Result<Self> {
        let mut window = Window::new(
            "Gesture Lab",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| anyhow::anyhow!("cannot open window: {}", e))?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![HAND_BG; WIN_W * WIN_H],
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    pub fn poll_input(&mut self) -> LabInput {
        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        let held     = |k: Key| self.window.is_key_down(k);

        let keys = HandKeys {
            pinch:       held(Key::P),
            grip:        held(Key::G),
            toggle_hide: one_shot(Key::H),
        };
        let quit   = one_shot(Key::Q) || one_shot(Key::Escape) || !self.window.is_open();
        let unlock = one_shot(Key::U);
        let toggle_gestures = one_shot(Key::C);

        let mouse = self.window.get_mouse_pos(MouseMode::Discard);
        let pointer = mouse.and_then(|(x, y)| screen_to_raw(x, y, HAND_W as f32, HAND_H as f32));
        let drag = mouse.filter(|_| self.window.get_mouse_down(MouseButton::Right));

        LabInput { quit, unlock, toggle_gestures, keys, pointer, drag }
    }

    /// Render one frame.
    pub fn render(&mut self, app: &LabState, hand_hidden: bool) {
        self.buf.fill(HAND_BG);

        // ── Panes ─────────────────────────────────────────────────────────
        self.fill_rect(MODEL_X, 0, MODEL_W, WIN_H, MODEL_BG);
        self.fill_rect(0, HUD_Y, HAND_W, WIN_H - HUD_Y, HUD_BG);

        // ── Hand ──────────────────────────────────────────────────────────
        let mode_color = match app.nav().mode {
            NavMode::Idle     => IDLE_COLOR,
            NavMode::Pinching => PINCH_COLOR,
            NavMode::Active   => ACTIVE_COLOR,
        };
        if let Some(hand) = app.last_hand() {
            self.draw_hand(hand, mode_color);
        }
        if !app.gestures_enabled() {
            self.draw_label("GESTURES OFF", 10, 10, 0xFF888888);
        } else if hand_hidden {
            self.draw_label("HAND HIDDEN", 10, 10, 0xFF888888);
        }

        // ── Gesture banner ────────────────────────────────────────────────
        if let Some(g) = app.banner() {
            let text = match g {
                Gesture::Left        => "<< LEFT",
                Gesture::Right       => "RIGHT >>",
                Gesture::DoublePinch => "DOUBLE PINCH",
            };
            let w = text.len() * 4 * 4;
            self.draw_label_scaled(text, HAND_W.saturating_sub(w) / 2, 40, BANNER_COLOR, 4);
        }

        // ── HUD ───────────────────────────────────────────────────────────
        self.draw_hud(app, mode_color);

        // ── Model ─────────────────────────────────────────────────────────
        let rig = app.rig();
        self.draw_model(rig.current(), rig.propellers());
        self.draw_label("MODEL", MODEL_X + 10, 10, 0xFFFFD700);

        // ── Key legend ────────────────────────────────────────────────────
        self.draw_label(
            "P=pinch  G=grip  H=hide  U=unlock  C=gestures  right drag=rotate  Q=quit",
            MODEL_X + 10, WIN_H - 16, 0xFF888888,
        );

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    // ── Hand skeleton ─────────────────────────────────────────────────────

    fn draw_hand(&mut self, hand: &HandFrame, color: u32) {
        let points: Vec<(isize, isize)> = hand.landmarks().iter()
            .map(|p| (((1.0 - p.x) * HAND_W as f32) as isize, (p.y * HAND_H as f32) as isize))
            .collect();

        for &(a, b) in HAND_CONNECTIONS.iter() {
            if let (Some(&pa), Some(&pb)) = (points.get(a), points.get(b)) {
                self.draw_line(pa, pb, color, HAND_H);
            }
        }
        for &(x, y) in &points {
            if x >= 1 && y >= 1 && (x as usize) < HAND_W && (y as usize) < HAND_H {
                self.fill_rect(x as usize - 1, y as usize - 1, 3, 3, 0xFFFFFFFF);
            }
        }
    }

    // ── HUD ───────────────────────────────────────────────────────────────

    fn draw_hud(&mut self, app: &LabState, mode_color: u32) {
        let nav = app.nav();
        let x = 10;
        let y = HUD_Y + 10;

        self.draw_label(&format!("NAV  {}", nav.mode.as_str()), x, y, mode_color);

        // hold progress bar
        let bar_x = x + 100;
        let filled = BAR_W * nav.pinch_progress as usize / 100;
        self.fill_rect(bar_x, y, BAR_W, 6, 0xFF222222);
        self.fill_rect(bar_x, y, filled, 6, mode_color);
        self.draw_border(bar_x, y, BAR_W, 6, 0xFF888888);
        self.draw_label(&format!("{}", nav.pinch_progress), bar_x + BAR_W + 8, y, IDLE_COLOR);

        let dir = match nav.direction {
            Direction::None        => "",
            Direction::Stationary  => "STATIONARY",
            Direction::Left        => "<< LEFT",
            Direction::Right       => "RIGHT >>",
            Direction::DoublePinch => "DOUBLE PINCH",
        };
        self.draw_label(dir, bar_x + BAR_W + 40, y, BANNER_COLOR);

        let rot = app.rotation();
        let rot_color = match rot.status {
            LockStatus::Idle    => IDLE_COLOR,
            LockStatus::Syncing => PINCH_COLOR,
            LockStatus::Locked  => ACTIVE_COLOR,
        };
        let grip = if rot.rotating { "  GRIP" } else { "" };
        self.draw_label(&format!("ROT  {}{}", rot.status.as_str(), grip), x, y + 20, rot_color);

        self.draw_label(&app.status, x, y + 44, 0xFFEEEEEE);
    }

    // ── Model ─────────────────────────────────────────────────────────────

    fn draw_model(&mut self, rot: Rotation, propellers: (f32, f32)) {
        let center = (
            (MODEL_X + MODEL_W / 2) as f32,
            (WIN_H / 2) as f32,
        );
        let to_screen = |p: [f32; 3]| {
            let q = rotate(p, rot);
            ((center.0 + q[0] * MODEL_SCALE) as isize, (center.1 - q[1] * MODEL_SCALE) as isize)
        };

        for (a, b) in body_edges() {
            self.draw_line(to_screen(a), to_screen(b), WIRE_COLOR, WIN_H);
        }

        for (hub, angle) in [(PROP_HUBS[0], propellers.0), (PROP_HUBS[1], propellers.1)] {
            for (a, b) in propeller_blades(hub, angle) {
                self.draw_line(to_screen(a), to_screen(b), PROP_COLOR, WIN_H);
            }
        }
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y+h).min(WIN_H) {
            for col in x..(x+w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 { return; }
        for col in x..(x+w).min(WIN_W) {
            if y < WIN_H           { self.buf[y           * WIN_W + col] = color; }
            if y+h-1 < WIN_H       { self.buf[(y+h-1)     * WIN_W + col] = color; }
        }
        for row in y..(y+h).min(WIN_H) {
            if x < WIN_W           { self.buf[row * WIN_W + x    ] = color; }
            if x+w-1 < WIN_W       { self.buf[row * WIN_W + x+w-1] = color; }
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < WIN_W && y < WIN_H {
            self.buf[y * WIN_W + x] = color;
        }
    }

    /// Bresenham, clipped to rows above `max_y`.
    fn draw_line(&mut self, from: (isize, isize), to: (isize, isize), color: u32, max_y: usize) {
        let (mut x, mut y) = from;
        let dx = (to.0 - x).abs();
        let dy = -(to.1 - y).abs();
        let sx = if x < to.0 { 1 } else { -1 };
        let sy = if y < to.1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            if x >= 0 && y >= 0 && (y as usize) < max_y {
                self.set_pixel(x as usize, y as usize, color);
            }
            if x == to.0 && y == to.1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x += sx; }
            if e2 <= dx { err += dx; y += sy; }
        }
    }

    /// Minimal bitmap font — 3×5 characters.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        self.draw_label_scaled(text, x, y, color, 1);
    }

    fn draw_label_scaled(&mut self, text: &str, x: usize, y: usize, color: u32, scale: usize) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
            if cx + 4 * scale > WIN_W { break; }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Model geometry
// ────────────────────────────────────────────────────────────────────────────

/// Body half extents: a flat box.
const BODY: [f32; 3] = [0.6, 0.12, 0.35];
const PROP_HUBS: [[f32; 3]; 2] = [[-0.85, 0.15, 0.0], [0.85, 0.15, 0.0]];
const BLADE_LEN: f32 = 0.3;

fn body_edges() -> Vec<([f32; 3], [f32; 3])> {
    let [bx, by, bz] = BODY;
    let corner = |i: usize| [
        if i & 1 == 0 { -bx } else { bx },
        if i & 2 == 0 { -by } else { by },
        if i & 4 == 0 { -bz } else { bz },
    ];
    let mut edges = Vec::with_capacity(14);
    for i in 0..8usize {
        for bit in [1usize, 2, 4] {
            if i & bit == 0 {
                edges.push((corner(i), corner(i | bit)));
            }
        }
    }
    // arms out to the propeller hubs
    for hub in PROP_HUBS {
        let attach = [hub[0].signum() * bx, hub[1], 0.0];
        edges.push((attach, hub));
    }
    edges
}

/// Two crossed blades spinning in the model's horizontal plane.
fn propeller_blades(hub: [f32; 3], angle: f32) -> [([f32; 3], [f32; 3]); 2] {
    let blade = |a: f32| {
        let (s, c) = a.sin_cos();
        (
            [hub[0] - c * BLADE_LEN, hub[1], hub[2] - s * BLADE_LEN],
            [hub[0] + c * BLADE_LEN, hub[1], hub[2] + s * BLADE_LEN],
        )
    };
    [blade(angle), blade(angle + std::f32::consts::FRAC_PI_2)]
}

/// Yaw about Y, then pitch about X.
pub fn rotate(p: [f32; 3], r: Rotation) -> [f32; 3] {
    let (sy, cy) = r.y.sin_cos();
    let x = p[0] * cy + p[2] * sy;
    let z = -p[0] * sy + p[2] * cy;

    let (sx, cx) = r.x.sin_cos();
    let y = p[1] * cx - z * sx;
    let z = p[1] * sx + z * cx;
    [x, y, z]
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '<' => [0b001, 0b010, 0b100, 0b010, 0b001],
        '>' => [0b100, 0b010, 0b001, 0b010, 0b100],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn zero_rotation_is_identity() {
        let p = [0.3, -0.2, 0.7];
        assert!(close(rotate(p, Rotation::ZERO), p));
    }

    #[test]
    fn yaw_turns_x_toward_minus_z() {
        assert!(close(rotate([1.0, 0.0, 0.0], Rotation::new(0.0, FRAC_PI_2)), [0.0, 0.0, -1.0]));
    }

    #[test]
    fn pitch_turns_y_toward_z() {
        assert!(close(rotate([0.0, 1.0, 0.0], Rotation::new(FRAC_PI_2, 0.0)), [0.0, 0.0, 1.0]));
    }

    #[test]
    fn body_is_a_closed_box_with_two_arms() {
        assert_eq!(body_edges().len(), 12 + 2);
    }

    #[test]
    fn blades_are_centered_on_the_hub() {
        let hub = PROP_HUBS[1];
        for (a, b) in propeller_blades(hub, 0.7) {
            let mid = [(a[0] + b[0]) / 2.0, (a[1] + b[1]) / 2.0, (a[2] + b[2]) / 2.0];
            assert!(close(mid, hub));
        }
    }

    #[test]
    fn every_hud_glyph_is_defined() {
        let fallback = char_glyph('\u{1}');
        for c in "NAV ROT IDLE PINCHING ACTIVE SYNCING LOCKED GRIP <<>> 0123456789".chars() {
            if c != ' ' {
                assert_ne!(char_glyph(c), fallback, "glyph for {:?}", c);
            }
        }
    }
}
