use std::cmp::Ordering;

use glam::{Mat3, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::body::{Body, Driver, Entity, EntityId, Role};
use super::bot;
use super::car::Car;
use super::light::{Attenuation, Light, LightId};
use super::particles::ParticleSystem;
use crate::camera::{Camera, CameraMode};
use crate::config::GameProperties;
use crate::context::GameContext;
use crate::model::{ModelId, ModelLibrary};

pub(crate) const ROAD_TILE_WIDTH: f32 = 7.0;
pub(crate) const ROAD_TILE_COUNT: u32 = 30;
/// Total length of the looping road strip along X.
pub(crate) const ROAD_SPAN: f32 = ROAD_TILE_WIDTH * ROAD_TILE_COUNT as f32;

const STREET_LIGHT_PAIRS: u32 = 16;
const STREET_LIGHT_SPACING: f32 = 14.0;

const LIGHT_CULL_DISTANCE: f32 = 35.0;
const LIGHT_CULL_ANGLE_DEG: f32 = 110.0;
const LIGHT_KEEP_DISTANCE: f32 = 5.0;
/// Capacity of the light array the shader stage consumes.
pub const MAX_SCENE_LIGHTS: usize = 16;

const BASE_FOV: f32 = 45.0;

/// The whole scene: entity and light arenas, the model registry, the camera
/// and the per-frame working sets. Owns everything it creates; teardown is
/// a plain drop.
pub struct Map {
    entities: Vec<Entity>,
    lights: Vec<Light>,
    models: ModelLibrary,
    /// Entities that take part in the world wrap (road, terrain, street
    /// lights, trees).
    road_objects: Vec<EntityId>,
    bots: Vec<EntityId>,
    particle_systems: Vec<ParticleSystem>,
    player: Option<EntityId>,
    skybox: Option<EntityId>,
    camera: Camera,
    active_lights: Vec<LightId>,
    properties: GameProperties,
    rng: StdRng,
}

impl Map {
    /// An empty scene; [`Self::initialize`] populates the demo world.
    #[must_use]
    pub fn new(properties: GameProperties) -> Self {
        Self::new_seeded(properties, rand::thread_rng().gen())
    }

    #[must_use]
    pub fn new_seeded(properties: GameProperties, seed: u64) -> Self {
        Self {
            entities: Vec::new(),
            lights: Vec::new(),
            models: ModelLibrary::new(),
            road_objects: Vec::new(),
            bots: Vec::new(),
            particle_systems: Vec::new(),
            player: None,
            skybox: None,
            camera: Camera::new(
                CameraMode::ThirdPerson { radius: 5.0 },
                Vec3::new(0.0, 0.0, 2.0),
            ),
            active_lights: Vec::new(),
            properties,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Builds the demo scene: the looping road strip with terrain, street
    /// lights and trees, the player car with headlights, the bot traffic,
    /// the skybox, the global sun and the rain emitter.
    #[must_use]
    pub fn initialize(properties: GameProperties) -> Self {
        let mut map = Self::new(properties);
        map.populate();
        map
    }

    fn populate(&mut self) {
        let road_model = self
            .models
            .insert("road_section", "models/road/asphalt_road.obj", Vec3::ONE);
        let terrain_models = [
            self.models
                .insert("terrain1", "models/terrain/terrain.obj", Vec3::ONE),
            self.models
                .insert("terrain2", "models/terrain/terrain2.obj", Vec3::ONE),
            self.models
                .insert("terrain3", "models/terrain/terrain3.obj", Vec3::ONE),
        ];
        for index in 0..ROAD_TILE_COUNT {
            let along = (index as f32 - ROAD_TILE_COUNT as f32 / 2.0) * ROAD_TILE_WIDTH;

            let mut road = Body::new(Vec3::new(along, 0.0, 0.0), Vec3::Z, Vec3::ONE);
            road.set_model(road_model);
            let road_id = self.add_entity(Entity {
                body: road,
                role: Role::Scenery,
            });
            self.mark_road_object(road_id);

            let mut terrain = Body::new(Vec3::new(along, -0.01, 0.0), Vec3::Z, Vec3::ONE);
            terrain.set_model(terrain_models[index as usize % terrain_models.len()]);
            let terrain_id = self.add_entity(Entity {
                body: terrain,
                role: Role::Scenery,
            });
            self.mark_road_object(terrain_id);
        }

        let street_light_model = self.models.insert(
            "street_light",
            "models/street_light/street_light.obj",
            Vec3::splat(0.085),
        );
        for index in 0..STREET_LIGHT_PAIRS {
            let along =
                (index as f32 - STREET_LIGHT_PAIRS as f32 / 2.0) * STREET_LIGHT_SPACING;
            self.place_street_light(
                street_light_model,
                Vec3::new(along, -0.1, -3.7),
                Vec3::X,
                22.5_f32.to_radians().cos(),
            );
            self.place_street_light(
                street_light_model,
                Vec3::new(along, -0.1, 3.7),
                -Vec3::X,
                28.5_f32.to_radians().cos(),
            );
        }

        let tree_models = [
            self.models.insert(
                "tree1",
                "models/trees/eastern_red_cedar.obj",
                Vec3::splat(0.0035),
            ),
            self.models
                .insert("tree2", "models/trees/fraser_fir.obj", Vec3::splat(0.01)),
        ];
        let mut side = 1.0_f32;
        for _ in 0..self.properties.trees_count {
            let direction = Vec3::new(
                self.rng.gen_range(0..=10) as f32 / 10.0,
                0.0,
                self.rng.gen_range(0..=10) as f32 / 10.0,
            );
            let position = Vec3::new(
                self.rng.gen_range(-15..15) as f32 * ROAD_TILE_WIDTH,
                0.0,
                side * self.rng.gen_range(4..64) as f32,
            );
            let mut tree = Body::new(position, direction, Vec3::ONE);
            tree.set_model(tree_models[self.rng.gen_range(0..tree_models.len())]);
            let tree_id = self.add_entity(Entity {
                body: tree,
                role: Role::Scenery,
            });
            self.mark_road_object(tree_id);
            side = -side;
        }

        let player_model =
            self.models
                .insert("vaz_2107", "models/vaz_2107/2107.obj", Vec3::splat(0.45));
        let mut player_body = Body::new(Vec3::ZERO, Vec3::X, Vec3::ONE);
        player_body.set_model(player_model);
        let player_id = self.add_entity(Entity {
            body: player_body,
            role: Role::Car {
                car: Car::new(216.0, 2000.0, 50.0, 50.0),
                driver: Driver::Player,
            },
        });
        self.set_player(player_id);
        self.place_headlight(player_id, "headlight_left", Vec3::new(0.8, -0.3, -0.1), Vec3::new(1.0, 0.3, -0.28));
        self.place_headlight(player_id, "headlight_right", Vec3::new(0.8, -0.3, 0.25), Vec3::new(1.0, 0.3, 0.28));
        self.camera.bind_to_target(player_id);
        self.camera.offset = Vec3::new(0.0, 0.2, 0.0);

        let bot_models = [
            self.models.insert(
                "volkswagen",
                "models/vw_golf/1997_vw_golf_5door.obj",
                Vec3::splat(0.52),
            ),
            self.models
                .insert("camry", "models/camry/toyota_camry.obj", Vec3::splat(0.83)),
            self.models
                .insert("nissan", "models/nissan_240sx/240sx.obj", Vec3::splat(0.55)),
        ];
        let bots_count = self.properties.bots_count;
        for index in 0..bots_count {
            let side = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            let position = Vec3::new(
                (index as f32 - bots_count as f32 / 2.0) * 2.5 * ROAD_TILE_WIDTH
                    + self.rng.gen_range(-4..5) as f32,
                0.0,
                side * (1.0 + self.rng.gen_range(0..2) as f32 * 1.5)
                    + self.rng.gen_range(-3..=0) as f32 / 10.0,
            );
            let mut bot_body = Body::new(position, Vec3::new(side, 0.0, 0.0), Vec3::ONE);
            bot_body.set_model(bot_models[index as usize % bot_models.len()]);
            let bot_id = self.add_entity(Entity {
                body: bot_body,
                role: Role::Car {
                    car: Car::new(216.0, 2000.0, 60.0, 50.0),
                    driver: Driver::Bot,
                },
            });
            self.bots.push(bot_id);
        }

        let skybox_model = self
            .models
            .insert("skybox", "textures/skybox/field", Vec3::ONE);
        let mut skybox_body = Body::new(Vec3::new(0.0, 1.0, 0.0), Vec3::X, Vec3::ONE);
        skybox_body.set_model(skybox_model);
        let skybox_id = self.add_entity(Entity {
            body: skybox_body,
            role: Role::Scenery,
        });
        self.skybox = Some(skybox_id);

        self.add_light(Light::directional(
            Vec3::new(0.0, -0.3, -0.9),
            Vec3::new(0.25, 0.15, 0.15),
            Vec3::new(0.9, 0.8, 0.8),
            Vec3::new(1.0, 0.8, 0.8),
        ));

        let rain_model = self
            .models
            .insert("rain_drop", "models/rain/raindrop.obj", Vec3::ONE);
        let mut rain =
            ParticleSystem::new(0.05, 10, 300, true, false, Vec3::new(6.0, 0.0, 6.0), 100.0);
        rain.set_particles_scale(Vec3::splat(0.08));
        rain.add_particle_model(rain_model);
        rain.bind_to_camera(Vec3::new(5.0, 2.0, 0.0));
        self.particle_systems.push(rain);
    }

    fn place_street_light(
        &mut self,
        model: ModelId,
        position: Vec3,
        facing: Vec3,
        outer_cut_off: f32,
    ) {
        let mut body = Body::new(position, facing, Vec3::ONE);
        body.set_model(model);
        let entity_id = self.add_entity(Entity {
            body,
            role: Role::Scenery,
        });
        self.mark_road_object(entity_id);

        let mut lamp = Light::spot(
            Vec3::ZERO,
            Vec3::new(0.0, -1.0, 0.1),
            Vec3::splat(0.04),
            Vec3::splat(0.7),
            Vec3::ONE,
            Attenuation::new(1.0, 0.01, 0.06),
            12.5_f32.to_radians().cos(),
            outer_cut_off,
        );
        lamp.set_offset(Vec3::new(0.0, 5.0, 1.0));
        let lamp_id = self.add_light(lamp);
        self.bind_light(entity_id, "lamp", lamp_id);
    }

    fn place_headlight(&mut self, car: EntityId, name: &str, direction: Vec3, offset: Vec3) {
        let mut headlight = Light::spot(
            Vec3::ZERO,
            direction,
            Vec3::splat(0.04),
            Vec3::splat(0.9),
            Vec3::ONE,
            Attenuation::new(1.0, 0.09, 0.2),
            12.5_f32.to_radians().cos(),
            28.5_f32.to_radians().cos(),
        );
        headlight.set_offset(offset);
        let headlight_id = self.add_light(headlight);
        self.bind_light(car, name, headlight_id);
    }

    pub fn add_entity(&mut self, entity: Entity) -> EntityId {
        let id = EntityId(self.entities.len());
        self.entities.push(entity);
        id
    }

    #[must_use]
    pub fn entity(&self, id: EntityId) -> &Entity {
        &self.entities[id.0]
    }

    pub fn entity_mut(&mut self, id: EntityId) -> &mut Entity {
        &mut self.entities[id.0]
    }

    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities
            .iter()
            .enumerate()
            .map(|(index, entity)| (EntityId(index), entity))
    }

    pub fn add_light(&mut self, light: Light) -> LightId {
        let id = LightId(self.lights.len());
        self.lights.push(light);
        id
    }

    #[must_use]
    pub fn light(&self, id: LightId) -> &Light {
        &self.lights[id.0]
    }

    pub fn light_mut(&mut self, id: LightId) -> &mut Light {
        &mut self.lights[id.0]
    }

    /// Attaches a light to an entity: from now on the entity's transform
    /// drives the light's position (and a spot's aim). Already-bound lights
    /// and taken names are rejected.
    pub fn bind_light(&mut self, entity_id: EntityId, name: &str, light_id: LightId) {
        let light = &mut self.lights[light_id.0];
        let entity = &mut self.entities[entity_id.0];
        if light.is_bound() || entity.body.lights.contains_key(name) {
            return;
        }
        light.set_bound(true);
        entity.body.lights.insert(name.to_owned(), light_id);
    }

    pub fn unbind_light(&mut self, entity_id: EntityId, name: &str) {
        let entity = &mut self.entities[entity_id.0];
        if let Some(light_id) = entity.body.lights.remove(name) {
            let light = &mut self.lights[light_id.0];
            light.set_bound(false);
            light.reset_start_direction();
        }
    }

    pub fn mark_road_object(&mut self, id: EntityId) {
        self.road_objects.push(id);
    }

    pub fn set_player(&mut self, id: EntityId) {
        self.player = Some(id);
    }

    #[must_use]
    pub fn player(&self) -> Option<EntityId> {
        self.player
    }

    #[must_use]
    pub fn skybox(&self) -> Option<EntityId> {
        self.skybox
    }

    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    #[must_use]
    pub fn models(&self) -> &ModelLibrary {
        &self.models
    }

    #[must_use]
    pub fn active_lights(&self) -> &[LightId] {
        &self.active_lights
    }

    #[must_use]
    pub fn particle_systems(&self) -> &[ParticleSystem] {
        &self.particle_systems
    }

    #[must_use]
    pub fn properties(&self) -> &GameProperties {
        &self.properties
    }

    #[must_use]
    pub fn player_position(&self) -> Option<Vec3> {
        self.player.map(|id| self.entities[id.0].body.position())
    }

    #[must_use]
    pub fn player_speed(&self) -> Option<f64> {
        self.player
            .map(|id| self.entities[id.0].body.velocity().length())
    }

    /// Routes the frame's input: camera first, then the player car.
    pub(crate) fn process_input(&mut self, context: &GameContext, delta_time: f64) {
        self.camera
            .process_input(&context.keys, &context.mouse, delta_time);

        let Some(player_id) = self.player else {
            return;
        };
        let entity = &mut self.entities[player_id.0];
        let Role::Car {
            car,
            driver: Driver::Player,
        } = &mut entity.role
        else {
            return;
        };
        let toggle_headlights = car.process_input(&mut entity.body, &context.keys, delta_time);
        if toggle_headlights {
            let headlights: Vec<LightId> = ["headlight_left", "headlight_right"]
                .iter()
                .filter_map(|name| entity.body.lights.get(*name).copied())
                .collect();
            for light_id in headlights {
                let light = &mut self.lights[light_id.0];
                light.enable(!light.is_enabled());
            }
        }
    }

    /// Steps every entity's physics, drags bound lights along, and ages the
    /// particle systems.
    pub fn update_objects(&mut self, delta_time: f64) {
        for entity in &mut self.entities {
            if let Role::Car { car, .. } = &mut entity.role {
                car.move_step(&mut entity.body, delta_time);
            }
        }

        for entity in &self.entities {
            if entity.body.lights.is_empty() {
                continue;
            }
            let matrix = entity.body.model_matrix();
            let rotation = Mat3::from_mat4(matrix);
            for &light_id in entity.body.lights.values() {
                let light = &mut self.lights[light_id.0];
                if let Some(offset) = light.offset() {
                    light.set_position(matrix.transform_point3(offset));
                }
                if let Some(start_direction) = light.start_direction() {
                    light.set_direction(rotation * start_direction);
                }
            }
        }

        let camera = &self.camera;
        for system in &mut self.particle_systems {
            system.update(delta_time, Some(camera), &mut self.rng);
        }
    }

    /// Lets every bot make its per-tick drive decision.
    pub fn act_bots(&mut self) {
        for index in 0..self.bots.len() {
            let id = self.bots[index];
            let entity = &mut self.entities[id.0];
            if let Role::Car {
                car,
                driver: Driver::Bot,
            } = &entity.role
            {
                bot::act(&mut entity.body, car);
            }
        }
    }

    /// Per-frame scene upkeep: the speed-driven fov cue, the world wrap
    /// that keeps the finite road strip under the player, and the active
    /// light selection for the renderer.
    pub fn update(&mut self) {
        if let Some(player_id) = self.player {
            let player = &self.entities[player_id.0];
            let speed = player.body.velocity().length() as f32;
            self.camera.set_fov(BASE_FOV + speed);
            let player_position = player.body.position();
            self.camera.update_vectors(Some(player_position));

            for &id in self.road_objects.iter().chain(self.bots.iter()) {
                let body = &mut self.entities[id.0].body;
                let distance = player_position.x - body.position().x;
                if distance.abs() > ROAD_SPAN / 2.0 {
                    let shifted =
                        body.position() + Vec3::new(distance.signum() * ROAD_SPAN, 0.0, 0.0);
                    body.set_position(shifted);
                }
            }
        } else {
            self.camera.update_vectors(None);
        }

        self.select_active_lights();
    }

    /// Directional lights always make the cut; point and spot lights must
    /// be near the camera or inside its forward cone. The result is sorted
    /// nearest-first because the shader array drops the tail.
    fn select_active_lights(&mut self) {
        let camera_position = self.camera.position;
        let camera_direction = self.camera.front.normalize_or(Vec3::Z);

        self.active_lights.clear();
        for (index, light) in self.lights.iter().enumerate() {
            if !light.is_enabled() {
                continue;
            }
            let Some(position) = light.position() else {
                // directional
                self.active_lights.push(LightId(index));
                continue;
            };
            let distance = position.distance(camera_position);
            let to_light = (position - camera_position).normalize_or(camera_direction);
            let angle = to_light
                .dot(camera_direction)
                .clamp(-1.0, 1.0)
                .acos()
                .to_degrees();
            if (distance <= LIGHT_CULL_DISTANCE && angle < LIGHT_CULL_ANGLE_DEG)
                || distance < LIGHT_KEEP_DISTANCE
            {
                self.active_lights.push(LightId(index));
            }
        }

        let lights = &self.lights;
        self.active_lights.sort_by(|left, right| {
            let distance_of = |id: &LightId| {
                lights[id.0]
                    .position()
                    .map_or(0.0, |position| position.distance(camera_position))
            };
            distance_of(left)
                .partial_cmp(&distance_of(right))
                .unwrap_or(Ordering::Equal)
        });
        self.active_lights.truncate(MAX_SCENE_LIGHTS);
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec3;

    use super::*;

    fn empty_map() -> Map {
        Map::new_seeded(GameProperties::default(), 7)
    }

    fn scenery(map: &mut Map, position: Vec3) -> EntityId {
        map.add_entity(Entity {
            body: Body::new(position, Vec3::X, Vec3::ONE),
            role: Role::Scenery,
        })
    }

    #[test]
    fn road_objects_wrap_by_exactly_one_span() {
        let mut map = empty_map();
        let player = scenery(&mut map, Vec3::ZERO);
        map.set_player(player);

        // half span is 7 * 30 / 2 = 105
        let behind = scenery(&mut map, Vec3::new(-110.0, 0.0, 0.0));
        map.mark_road_object(behind);
        map.update();
        assert_eq!(map.entity(behind).body.position().x, 100.0);

        let distance = (map.entity(behind).body.position().x
            - map.entity(player).body.position().x)
            .abs();
        assert!(distance <= ROAD_SPAN / 2.0);
    }

    #[test]
    fn wrap_works_in_both_directions() {
        let mut map = empty_map();
        let player = scenery(&mut map, Vec3::ZERO);
        map.set_player(player);

        let ahead = scenery(&mut map, Vec3::new(110.0, 0.0, 0.0));
        map.mark_road_object(ahead);
        map.update();
        assert_eq!(map.entity(ahead).body.position().x, -100.0);
    }

    #[test]
    fn objects_inside_the_half_span_stay_put() {
        let mut map = empty_map();
        let player = scenery(&mut map, Vec3::ZERO);
        map.set_player(player);

        let near = scenery(&mut map, Vec3::new(-104.0, 0.0, 0.0));
        map.mark_road_object(near);
        map.update();
        assert_eq!(map.entity(near).body.position().x, -104.0);
    }

    #[test]
    fn bots_wrap_like_road_objects() {
        let mut map = empty_map();
        let player = scenery(&mut map, Vec3::ZERO);
        map.set_player(player);

        let bot_id = map.add_entity(Entity {
            body: Body::new(Vec3::new(-120.0, 0.0, 2.0), Vec3::X, Vec3::ONE),
            role: Role::Car {
                car: Car::new(216.0, 2000.0, 60.0, 50.0),
                driver: Driver::Bot,
            },
        });
        map.bots.push(bot_id);
        map.update();
        assert_eq!(map.entity(bot_id).body.position().x, 90.0);
        assert_eq!(map.entity(bot_id).body.position().z, 2.0, "wrap is X only");
    }

    #[test]
    fn disabled_lights_are_never_active() {
        let mut map = empty_map();
        let player = scenery(&mut map, Vec3::ZERO);
        map.set_player(player);

        let near_but_disabled = map.add_light(Light::point(
            map.camera().position + Vec3::X,
            Vec3::ZERO,
            Vec3::ONE,
            Vec3::ONE,
            Attenuation::new(1.0, 0.01, 0.06),
        ));
        map.light_mut(near_but_disabled).enable(false);

        let disabled_sun = map.add_light(Light::directional(
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::ZERO,
            Vec3::ONE,
            Vec3::ONE,
        ));
        map.light_mut(disabled_sun).enable(false);

        map.update();
        assert!(map.active_lights().is_empty());
    }

    #[test]
    fn directional_lights_are_always_active() {
        let mut map = empty_map();
        map.add_light(Light::directional(
            Vec3::new(0.0, -0.3, -0.9),
            Vec3::ZERO,
            Vec3::ONE,
            Vec3::ONE,
        ));
        map.update();
        assert_eq!(map.active_lights().len(), 1);
    }

    #[test]
    fn far_lights_are_culled_and_close_ones_kept() {
        let mut map = empty_map();
        let player = scenery(&mut map, Vec3::ZERO);
        map.set_player(player);
        map.update(); // settle the camera

        let camera_position = map.camera().position;
        let behind = map.camera().front * -3.0;
        let close_behind = map.add_light(Light::point(
            camera_position + behind,
            Vec3::ZERO,
            Vec3::ONE,
            Vec3::ONE,
            Attenuation::new(1.0, 0.01, 0.06),
        ));
        let far_away = map.add_light(Light::point(
            camera_position + Vec3::new(500.0, 0.0, 0.0),
            Vec3::ZERO,
            Vec3::ONE,
            Vec3::ONE,
            Attenuation::new(1.0, 0.01, 0.06),
        ));

        map.update();
        // behind the camera but inside the keep radius
        assert!(map.active_lights().contains(&close_behind));
        assert!(!map.active_lights().contains(&far_away));
    }

    #[test]
    fn active_lights_are_sorted_and_capped() {
        let mut map = empty_map();
        let player = scenery(&mut map, Vec3::ZERO);
        map.set_player(player);
        map.update();

        let camera_position = map.camera().position;
        let forward = map.camera().front;
        for index in 0..24 {
            map.add_light(Light::point(
                camera_position + forward * (2.0 + index as f32),
                Vec3::ZERO,
                Vec3::ONE,
                Vec3::ONE,
                Attenuation::new(1.0, 0.01, 0.06),
            ));
        }

        map.update();
        assert_eq!(map.active_lights().len(), MAX_SCENE_LIGHTS);
        let distances: Vec<f32> = map
            .active_lights()
            .iter()
            .map(|id| {
                map.light(*id)
                    .position()
                    .map_or(0.0, |position| position.distance(camera_position))
            })
            .collect();
        assert!(
            distances.windows(2).all(|pair| pair[0] <= pair[1]),
            "nearest lights come first"
        );
        // the dropped ones are the farthest
        assert!(distances.iter().all(|&distance| distance <= 2.0 + 15.0 + 1e-3));
    }

    #[test]
    fn camera_fov_widens_with_speed_until_the_limit() {
        let mut map = empty_map();
        let player = scenery(&mut map, Vec3::ZERO);
        map.set_player(player);

        map.entity_mut(player)
            .body
            .set_velocity(DVec3::new(30.0, 0.0, 0.0));
        map.update();
        assert_eq!(map.camera().fov(), 75.0);

        // beyond the valid fov range the cue saturates at the last value
        map.entity_mut(player)
            .body
            .set_velocity(DVec3::new(200.0, 0.0, 0.0));
        map.update();
        assert_eq!(map.camera().fov(), 75.0);
    }

    #[test]
    fn bound_lights_follow_their_entity() {
        let mut map = empty_map();
        let carrier = scenery(&mut map, Vec3::ZERO);
        let lamp = map.add_light(Light::point(
            Vec3::ZERO,
            Vec3::ZERO,
            Vec3::ONE,
            Vec3::ONE,
            Attenuation::new(1.0, 0.01, 0.06),
        ));
        map.light_mut(lamp).set_offset(Vec3::new(0.0, 5.0, 1.0));
        map.bind_light(carrier, "lamp", lamp);
        assert!(map.light(lamp).is_bound());

        map.entity_mut(carrier)
            .body
            .set_position(Vec3::new(10.0, 0.0, 0.0));
        map.update_objects(0.0);
        assert!(map
            .light(lamp)
            .position()
            .unwrap()
            .abs_diff_eq(Vec3::new(10.0, 5.0, 1.0), 1e-5));
    }

    #[test]
    fn binding_rejects_taken_names_and_bound_lights() {
        let mut map = empty_map();
        let first = scenery(&mut map, Vec3::ZERO);
        let second = scenery(&mut map, Vec3::X);
        let lamp = map.add_light(Light::point(
            Vec3::ZERO,
            Vec3::ZERO,
            Vec3::ONE,
            Vec3::ONE,
            Attenuation::new(1.0, 0.01, 0.06),
        ));

        map.bind_light(first, "lamp", lamp);
        // the light already follows `first`, so `second` must not steal it
        map.bind_light(second, "lamp", lamp);
        assert!(map.entity(second).body.lights.is_empty());

        map.unbind_light(first, "lamp");
        assert!(!map.light(lamp).is_bound());
        map.bind_light(second, "lamp", lamp);
        assert!(map.entity(second).body.lights.contains_key("lamp"));
    }

    #[test]
    fn the_demo_scene_is_fully_populated() {
        let properties = GameProperties::default();
        let map = Map::initialize(properties.clone());

        assert!(map.player().is_some());
        assert!(map.skybox().is_some());
        // 30 road + 30 terrain + 32 street lights + trees
        assert_eq!(
            map.road_objects.len(),
            60 + 32 + properties.trees_count as usize
        );
        assert_eq!(map.bots.len(), properties.bots_count as usize);
        // 32 street lamps + 2 headlights + the sun
        assert_eq!(map.lights.len(), 35);
        assert_eq!(map.particle_systems().len(), 1);
        // the player's headlights are bound to the car
        let player = map.entity(map.player().unwrap());
        assert_eq!(player.body.lights.len(), 2);
    }
}
