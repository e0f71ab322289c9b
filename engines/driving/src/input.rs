//! Plain-data input state as seen by the simulation.
//!
//! The host window layer owns polling; it forwards key transitions and
//! mouse deltas as [`crate::EngineEvent`]s which the game loop folds into
//! these tables once per tick.

use glam::DVec2;

/// Every key the simulation reacts to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum KeyCode {
    W,
    S,
    A,
    D,
    E,
    F,
    V,
    J,
    K,
    L,
    Up,
    Down,
    Left,
    Right,
    Space,
    Escape,
    Enter,
}

impl KeyCode {
    pub(crate) const COUNT: usize = 17;
}

/// Per-key state. `Press` is held, `Release` lasts for exactly one tick
/// after the key goes up, `Unpress` is idle.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum KeyState {
    Press,
    Release,
    #[default]
    Unpress,
}

/// The per-key state table.
#[derive(Debug)]
pub(crate) struct KeyTable {
    states: [KeyState; KeyCode::COUNT],
}

impl KeyTable {
    pub(crate) fn new() -> Self {
        Self {
            states: [KeyState::Unpress; KeyCode::COUNT],
        }
    }

    pub(crate) fn set(&mut self, key: KeyCode, state: KeyState) {
        self.states[key as usize] = state;
    }

    pub(crate) fn state(&self, key: KeyCode) -> KeyState {
        self.states[key as usize]
    }

    pub(crate) fn is_pressed(&self, key: KeyCode) -> bool {
        self.state(key) == KeyState::Press
    }

    /// Ages `Release` into `Unpress` once the tick that observed the
    /// release is over.
    pub(crate) fn decay(&mut self) {
        for state in &mut self.states {
            if *state == KeyState::Release {
                *state = KeyState::Unpress;
            }
        }
    }
}

/// Mouse position and the deltas accumulated since the last tick.
#[derive(Debug, Clone)]
pub struct Mouse {
    position: DVec2,
    offset: DVec2,
    scroll_offset: DVec2,
}

impl Mouse {
    pub(crate) fn new(position: DVec2) -> Self {
        Self {
            position,
            offset: DVec2::ZERO,
            scroll_offset: DVec2::ZERO,
        }
    }

    pub(crate) fn update_position(&mut self, position: DVec2) {
        self.offset = position - self.position;
        self.position = position;
    }

    pub(crate) fn set_scroll_offset(&mut self, offset: DVec2) {
        self.scroll_offset = offset;
    }

    #[must_use]
    pub fn position(&self) -> DVec2 {
        self.position
    }

    #[must_use]
    pub fn offset(&self) -> DVec2 {
        self.offset
    }

    #[must_use]
    pub fn scroll_offset(&self) -> DVec2 {
        self.scroll_offset
    }

    pub(crate) fn reset_offsets(&mut self) {
        self.offset = DVec2::ZERO;
        self.scroll_offset = DVec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_decays_to_unpress() {
        let mut keys = KeyTable::new();
        keys.set(KeyCode::A, KeyState::Press);
        keys.decay();
        assert!(keys.is_pressed(KeyCode::A), "held keys must not decay");

        keys.set(KeyCode::A, KeyState::Release);
        assert_eq!(keys.state(KeyCode::A), KeyState::Release);
        keys.decay();
        assert_eq!(keys.state(KeyCode::A), KeyState::Unpress);
    }

    #[test]
    fn mouse_offset_tracks_position_delta() {
        let mut mouse = Mouse::new(DVec2::new(640.0, 360.0));
        mouse.update_position(DVec2::new(650.0, 350.0));
        assert_eq!(mouse.offset(), DVec2::new(10.0, -10.0));

        mouse.reset_offsets();
        assert_eq!(mouse.offset(), DVec2::ZERO);
        assert_eq!(mouse.position(), DVec2::new(650.0, 350.0));
    }
}
