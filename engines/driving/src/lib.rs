// TODO remove and fix before release
#![allow(missing_docs)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::missing_panics_doc)]

mod camera;
mod config;
mod context;
mod events;
mod game_loop;
mod game_state;
mod input;
mod model;
mod render_state;

pub use camera::{Camera, CameraMode};
pub use config::GameProperties;
pub use context::GameContext;
pub use events::EngineEvent;
pub use game_loop::GameLoop;
pub use game_state::{
    Attenuation, Body, Car, Driver, Entity, EntityId, Force, GameState, Light, LightId,
    LightKind, Map, Particle, ParticleSystem, Role, Tick, GEAR_RATIO_1, GEAR_RATIO_2,
    GEAR_RATIO_3, GEAR_RATIO_4, GEAR_RATIO_5, GEAR_RATIO_6, GEAR_RATIO_REVERSE,
    MAX_SCENE_LIGHTS,
};
pub use input::{KeyCode, KeyState, Mouse};
pub use model::{ModelId, ModelLibrary, ModelSource};
pub use render_state::{LightUniform, ModelInstance, RenderState};
