use std::time::Instant;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::game_state::{GameState, Light, LightKind, MAX_SCENE_LIGHTS};
use crate::model::ModelId;

const LIGHT_KIND_DIRECTIONAL: f32 = 0.0;
const LIGHT_KIND_POINT: f32 = 1.0;
const LIGHT_KIND_SPOT: f32 = 2.0;

/// One light as the shader stage consumes it, std140-friendly.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct LightUniform {
    /// xyz = world position (unused for directional), w = kind tag.
    pub position: [f32; 4],
    /// xyz = direction (unused for point), w unused.
    pub direction: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    /// constant, linear, quadratic falloff; w unused.
    pub attenuation: [f32; 4],
    /// x = inner cone cosine, y = outer cone cosine (spot only).
    pub cone: [f32; 4],
}

fn vec4(xyz: Vec3, w: f32) -> [f32; 4] {
    [xyz.x, xyz.y, xyz.z, w]
}

impl LightUniform {
    fn from_light(light: &Light) -> Self {
        let kind = match light.kind {
            LightKind::Directional { .. } => LIGHT_KIND_DIRECTIONAL,
            LightKind::Point { .. } => LIGHT_KIND_POINT,
            LightKind::Spot { .. } => LIGHT_KIND_SPOT,
        };
        let attenuation = light
            .attenuation()
            .map_or([0.0; 4], |attenuation| {
                [
                    attenuation.constant,
                    attenuation.linear,
                    attenuation.quadratic,
                    0.0,
                ]
            });
        let cone = light
            .cut_offs()
            .map_or([0.0; 4], |(cut_off, outer_cut_off)| {
                [cut_off, outer_cut_off, 0.0, 0.0]
            });
        Self {
            position: vec4(light.position().unwrap_or(Vec3::ZERO), kind),
            direction: vec4(light.direction().unwrap_or(Vec3::ZERO), 0.0),
            ambient: vec4(light.ambient(), 0.0),
            diffuse: vec4(light.diffuse(), 0.0),
            specular: vec4(light.specular(), 0.0),
            attenuation,
            cone,
        }
    }
}

/// One "set model transform, draw" request.
#[derive(Clone, Copy, Debug)]
pub struct ModelInstance {
    pub model: ModelId,
    pub transform: Mat4,
    pub opacity: f32,
}

/// Contains every game information that is required to render the scene.
///
/// The renderer never reaches into [`GameState`]; it works off this
/// snapshot, refreshed once per frame via [`Self::update`].
pub struct RenderState {
    /// Time stamp of the creation. Used to animate visual effects that run
    /// independently of the game loop.
    start_time: Instant,

    pub view: Mat4,
    pub projection: Mat4,
    pub camera_position: Vec3,
    pub fov: f32,
    /// Every entity and particle with a model, world-transformed.
    pub instances: Vec<ModelInstance>,
    /// Drawn first, depth test off, pinned to the camera.
    pub skybox: Option<ModelInstance>,
    /// The fixed-capacity light array; only the first `light_count` entries
    /// are meaningful.
    pub lights: [LightUniform; MAX_SCENE_LIGHTS],
    pub light_count: u32,
    /// Light-space matrix of the sun for the shadow pass, if a directional
    /// light is active.
    pub sun_shadow_matrix: Option<Mat4>,
    pub gamma_correction: bool,
}

impl RenderState {
    #[must_use]
    pub fn new(game_state: &GameState) -> Self {
        let mut render_state = Self {
            start_time: Instant::now(),
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            camera_position: Vec3::ZERO,
            fov: 45.0,
            instances: Vec::new(),
            skybox: None,
            lights: [LightUniform::zeroed(); MAX_SCENE_LIGHTS],
            light_count: 0,
            sun_shadow_matrix: None,
            gamma_correction: true,
        };
        render_state.update(game_state);
        render_state
    }

    /// Seconds since this snapshot was created, for camera-independent
    /// effects.
    #[must_use]
    pub fn effect_time(&self) -> f32 {
        self.start_time.elapsed().as_secs_f32()
    }

    pub fn update(&mut self, game_state: &GameState) {
        let map = &game_state.map;
        let camera = map.camera();

        self.view = camera.view_matrix();
        self.projection = camera.projection_matrix();
        self.camera_position = camera.position;
        self.fov = camera.fov();
        self.gamma_correction = map.properties().gamma_correction;

        self.instances.clear();
        for (id, entity) in map.entities() {
            if Some(id) == map.skybox() {
                continue;
            }
            let Some(model_id) = entity.body.model() else {
                continue;
            };
            let base_scale = map.models().get(model_id).scale;
            self.instances.push(ModelInstance {
                model: model_id,
                transform: entity.body.model_matrix() * Mat4::from_scale(base_scale),
                opacity: 1.0,
            });
        }
        for system in map.particle_systems() {
            for particle in system.particles() {
                if !particle.is_alive() {
                    continue;
                }
                let Some(model_id) = particle.model else {
                    continue;
                };
                let base_scale = map.models().get(model_id).scale;
                self.instances.push(ModelInstance {
                    model: model_id,
                    transform: Mat4::from_translation(particle.position)
                        * Mat4::from_scale(particle.scale * base_scale),
                    opacity: particle.opacity(),
                });
            }
        }

        self.skybox = map.skybox().and_then(|id| {
            map.entity(id).body.model().map(|model_id| ModelInstance {
                model: model_id,
                transform: Mat4::from_translation(camera.position),
                opacity: 1.0,
            })
        });

        self.lights = [LightUniform::zeroed(); MAX_SCENE_LIGHTS];
        self.light_count = 0;
        for (slot, light_id) in map.active_lights().iter().enumerate() {
            self.lights[slot] = LightUniform::from_light(map.light(*light_id));
            self.light_count += 1;
        }

        let shadow_anchor = map.player_position().unwrap_or(camera.position);
        self.sun_shadow_matrix = map
            .active_lights()
            .iter()
            .map(|light_id| map.light(*light_id))
            .find(|light| matches!(light.kind, LightKind::Directional { .. }))
            .and_then(|sun| {
                let sun_direction = sun.direction().unwrap_or(-Vec3::Y);
                sun.light_space_matrix(shadow_anchor - sun_direction * 20.0)
            });
    }
}
