use glam::DVec2;

use crate::input::{KeyCode, KeyState};

/// Everything the host window layer can tell the game loop. The loop drains
/// these once per tick before stepping the simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Key { code: KeyCode, state: KeyState },
    MouseMoved { position: DVec2 },
    MouseScrolled { offset: DVec2 },
    WindowResized { width: i64, height: i64 },
    Exit,
}
