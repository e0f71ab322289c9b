use crate::config::GameProperties;
use crate::context::GameContext;

mod body;
mod bot;
mod car;
mod light;
mod map;
mod particles;

pub use body::{Body, Driver, Entity, EntityId, Force, Role};
pub use car::{
    Car, GEAR_RATIO_1, GEAR_RATIO_2, GEAR_RATIO_3, GEAR_RATIO_4, GEAR_RATIO_5, GEAR_RATIO_6,
    GEAR_RATIO_REVERSE,
};
pub use light::{Attenuation, Light, LightId, LightKind};
pub use map::{Map, MAX_SCENE_LIGHTS};
pub use particles::{Particle, ParticleSystem};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub struct Tick(pub u64);

/// Contains every information about the current state of the game.
/// This is what needs to be stored/loaded if the game need to be suspended.
pub struct GameState {
    /// ever increasing counter representing the number of game loop iterations so far
    pub(crate) tick: Tick,
    /// the scene: entities, lights, particles, camera
    pub map: Map,
}

impl GameState {
    #[must_use]
    pub fn new(properties: GameProperties) -> Self {
        Self {
            tick: Tick::default(),
            map: Map::initialize(properties),
        }
    }

    #[must_use]
    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// One simulation step: input, then entity physics, then bot decisions,
    /// then scene upkeep, matching one iteration of the outer loop.
    pub fn update(&mut self, context: &mut GameContext) {
        let delta_time = context.delta_time();
        self.tick.0 += 1;

        self.map.process_input(context, delta_time);
        context.process_time_keys();
        context.end_frame();

        self.map.update_objects(delta_time);
        self.map.act_bots();
        self.map.update();
    }
}
