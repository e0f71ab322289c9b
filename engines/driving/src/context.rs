use glam::DVec2;

use crate::input::{KeyCode, KeyState, KeyTable, Mouse};

const MIN_TIME_COEF: f64 = 0.001;
const MAX_TIME_COEF: f64 = 100.0;
const FALLBACK_WINDOW_EDGE: u32 = 100;

/// Process-wide game state that is not part of the scene: frame timing,
/// window dimensions and the input tables. Constructed once by the host and
/// handed to the game loop by value; everything that needs it receives a
/// reference.
#[derive(Debug)]
pub struct GameContext {
    delta_time: f64,
    time_coef: f64,
    window_width: u32,
    window_height: u32,
    pub(crate) keys: KeyTable,
    pub(crate) mouse: Mouse,
}

impl GameContext {
    #[must_use]
    pub fn new(window_width: i64, window_height: i64) -> Self {
        let mut context = Self {
            delta_time: 0.0,
            time_coef: 1.0,
            window_width: FALLBACK_WINDOW_EDGE,
            window_height: FALLBACK_WINDOW_EDGE,
            keys: KeyTable::new(),
            mouse: Mouse::new(DVec2::ZERO),
        };
        context.set_window_size(window_width, window_height);
        context.mouse = Mouse::new(DVec2::new(
            f64::from(context.window_width) / 2.0,
            f64::from(context.window_height) / 2.0,
        ));
        context
    }

    /// Raw frame duration in seconds. Negative durations are rejected and
    /// leave the previous value in place.
    pub fn set_delta_time(&mut self, delta_time: f64) {
        if delta_time >= 0.0 {
            self.delta_time = delta_time;
        }
    }

    /// Frame duration scaled by the time coefficient; this is what the
    /// simulation integrates with.
    #[must_use]
    pub fn delta_time(&self) -> f64 {
        self.delta_time * self.time_coef
    }

    pub fn set_time_coef(&mut self, coefficient: f64) {
        self.time_coef = coefficient.clamp(MIN_TIME_COEF, MAX_TIME_COEF);
    }

    pub fn change_time_coef(&mut self, delta: f64) {
        self.set_time_coef(self.time_coef + delta);
    }

    #[must_use]
    pub fn time_coef(&self) -> f64 {
        self.time_coef
    }

    /// Non-positive dimensions fall back to a small but valid window edge.
    pub fn set_window_size(&mut self, width: i64, height: i64) {
        self.window_width = u32::try_from(width).ok().filter(|&edge| edge > 0).unwrap_or(FALLBACK_WINDOW_EDGE);
        self.window_height = u32::try_from(height).ok().filter(|&edge| edge > 0).unwrap_or(FALLBACK_WINDOW_EDGE);
    }

    #[must_use]
    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    pub fn set_key_state(&mut self, key: KeyCode, state: KeyState) {
        self.keys.set(key, state);
    }

    #[must_use]
    pub fn key_state(&self, key: KeyCode) -> KeyState {
        self.keys.state(key)
    }

    #[must_use]
    pub fn mouse(&self) -> &Mouse {
        &self.mouse
    }

    pub fn update_mouse_position(&mut self, position: DVec2) {
        self.mouse.update_position(position);
    }

    pub fn set_mouse_scroll(&mut self, offset: DVec2) {
        self.mouse.set_scroll_offset(offset);
    }

    /// Time-scale hotkeys: J slows the simulation down, L speeds it up,
    /// K resets to real time.
    pub(crate) fn process_time_keys(&mut self) {
        if self.keys.is_pressed(KeyCode::J) {
            self.change_time_coef(-0.05);
        }
        if self.keys.is_pressed(KeyCode::K) {
            self.set_time_coef(1.0);
        }
        if self.keys.is_pressed(KeyCode::L) {
            self.change_time_coef(0.05);
        }
    }

    /// End-of-tick upkeep: mouse deltas are consumed and released keys age
    /// out of their one-tick `Release` state.
    pub(crate) fn end_frame(&mut self) {
        self.mouse.reset_offsets();
        self.keys.decay();
    }
}
