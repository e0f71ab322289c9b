use std::f32::consts::PI;

use glam::{Mat3, Quat, Vec3};
use rand::Rng;

use crate::camera::Camera;
use crate::model::ModelId;

/// Every spawned particle lives exactly this long.
const PARTICLE_LIFETIME: f32 = 5.0;
const GRAVITY_BIAS: Vec3 = Vec3::new(0.0, -1.8, 0.0);

/// One short-lived rain drop.
#[derive(Debug, Clone)]
pub struct Particle {
    pub position: Vec3,
    velocity: Vec3,
    acceleration: Vec3,
    pub scale: Vec3,
    opacity: f32,
    elapsed: f32,
    lifetime: f32,
    alive: bool,
    pub model: Option<ModelId>,
}

impl Particle {
    fn new(position: Vec3, acceleration: Vec3, lifetime: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            acceleration,
            scale: Vec3::ONE,
            opacity: 1.0,
            elapsed: 0.0,
            lifetime: lifetime.max(0.0),
            alive: true,
            model: None,
        }
    }

    /// Ages the particle; once the lifetime is reached it dies on the spot
    /// and is not integrated any further.
    fn update(&mut self, delta_time: f32) {
        self.elapsed += delta_time;
        if self.elapsed >= self.lifetime {
            self.alive = false;
            return;
        }
        self.velocity += self.acceleration * delta_time;
        self.position += self.velocity * delta_time;
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }
}

/// Spawns, ages and retires particles in bursts at a fixed interval,
/// optionally glued to the camera so the rain never falls anywhere else.
#[derive(Debug)]
pub struct ParticleSystem {
    pub(crate) position: Vec3,
    spawn_interval: f32,
    spawn_count: u32,
    max_count: usize,
    gravitation: bool,
    /// Reserved for wind and similar influences; carried in the config but
    /// not applied to any force yet.
    external_factors: bool,
    offset: Vec3,
    offset_random: f32,
    particles_scale: Vec3,
    particles_accel: Vec3,
    camera_offset: Option<Vec3>,
    models: Vec<ModelId>,
    particles: Vec<Particle>,
    timer: f64,
}

impl ParticleSystem {
    #[must_use]
    pub fn new(
        spawn_interval: f32,
        spawn_count: u32,
        max_count: usize,
        gravitation: bool,
        external_factors: bool,
        offset: Vec3,
        offset_random: f32,
    ) -> Self {
        Self {
            position: Vec3::ZERO,
            spawn_interval,
            spawn_count,
            max_count,
            gravitation,
            external_factors,
            offset,
            offset_random: offset_random.clamp(0.0, 1.0),
            particles_scale: Vec3::ONE,
            particles_accel: Vec3::ZERO,
            camera_offset: None,
            models: Vec::new(),
            particles: Vec::new(),
            timer: 0.0,
        }
    }

    pub fn set_offset_random(&mut self, offset_random: f32) {
        self.offset_random = offset_random.clamp(0.0, 1.0);
    }

    /// A scale with any negative component is replaced by 1.
    pub fn set_particles_scale(&mut self, scale: Vec3) {
        self.particles_scale = if scale.cmpge(Vec3::ZERO).all() {
            scale
        } else {
            Vec3::ONE
        };
    }

    pub fn set_particles_acceleration(&mut self, acceleration: Vec3) {
        self.particles_accel = acceleration;
    }

    pub fn add_particle_model(&mut self, model: ModelId) {
        self.models.push(model);
    }

    pub fn reset_particle_models(&mut self) {
        self.models.clear();
    }

    /// Glues the emitter to the camera at a yaw-aligned offset.
    pub fn bind_to_camera(&mut self, system_offset: Vec3) {
        self.camera_offset = Some(system_offset);
    }

    pub fn unbind_from_camera(&mut self) {
        self.camera_offset = None;
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[must_use]
    pub fn external_factors(&self) -> bool {
        self.external_factors
    }

    fn follow_camera(&mut self, camera: &Camera) {
        let Some(system_offset) = self.camera_offset else {
            return;
        };
        let mut rotation = Mat3::IDENTITY;
        if system_offset.length() != 0.0 {
            let mut flat_front = camera.front;
            flat_front.y = 0.0;
            flat_front = flat_front.normalize_or(Vec3::X);
            let cross = Vec3::X.cross(flat_front);
            if cross != Vec3::ZERO {
                let angle = Vec3::X.dot(flat_front).clamp(-1.0, 1.0).acos();
                rotation = Mat3::from_quat(Quat::from_axis_angle(cross.normalize(), angle));
            } else if flat_front == -Vec3::X {
                rotation = Mat3::from_quat(Quat::from_axis_angle(Vec3::Y, PI));
            }
        }
        self.position = camera.position + camera.front + rotation * system_offset;
    }

    /// One tick: follow the camera, retire the dead, spawn the next burst
    /// if the interval elapsed, drop the oldest surplus, then age everyone.
    pub fn update(&mut self, delta_time: f64, camera: Option<&Camera>, rng: &mut impl Rng) {
        if let Some(camera) = camera {
            self.follow_camera(camera);
        }

        self.particles.retain(Particle::is_alive);

        self.timer += delta_time;
        if self.timer >= f64::from(self.spawn_interval) {
            self.timer -= f64::from(self.spawn_interval);
            self.spawn_burst(rng);
        }

        if self.particles.len() > self.max_count {
            let excess = self.particles.len() - self.max_count;
            self.particles.drain(..excess);
        }

        for particle in &mut self.particles {
            particle.update(delta_time as f32);
        }
    }

    fn spawn_burst(&mut self, rng: &mut impl Rng) {
        fn jitter<R: Rng>(rng: &mut R, extent: f32, randomness: f32) -> f32 {
            let factor = rng.gen_range((1.0 - randomness)..=1.0);
            let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            extent * factor * sign
        }

        let gravity = if self.gravitation {
            GRAVITY_BIAS
        } else {
            Vec3::ZERO
        };
        for _ in 0..self.spawn_count {
            let spawn_offset = Vec3::new(
                jitter(rng, self.offset.x, self.offset_random),
                jitter(rng, self.offset.y, self.offset_random),
                jitter(rng, self.offset.z, self.offset_random),
            );
            let mut particle = Particle::new(
                self.position + spawn_offset,
                self.particles_accel + gravity,
                PARTICLE_LIFETIME,
            );
            particle.scale = self.particles_scale;
            if !self.models.is_empty() {
                particle.model = Some(self.models[rng.gen_range(0..self.models.len())]);
            }
            self.particles.push(particle);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn rain() -> ParticleSystem {
        ParticleSystem::new(0.05, 10, 300, true, false, Vec3::new(6.0, 0.0, 6.0), 100.0)
    }

    #[test]
    fn particle_is_alive_strictly_below_its_lifetime() {
        let mut particle = Particle::new(Vec3::ZERO, Vec3::ZERO, 5.0);
        for _ in 0..49 {
            particle.update(0.1);
            assert!(particle.is_alive());
        }
        // elapsed reaches 5.0 exactly here
        particle.update(0.1 + 1e-4);
        assert!(!particle.is_alive());
    }

    #[test]
    fn dead_particles_never_integrate() {
        let mut particle = Particle::new(Vec3::ZERO, Vec3::new(0.0, -1.8, 0.0), 1.0);
        particle.update(2.0);
        assert!(!particle.is_alive());
        assert_eq!(particle.position, Vec3::ZERO);
    }

    #[test]
    fn offset_randomness_is_clamped() {
        let system = rain();
        assert_eq!(system.offset_random, 1.0);
    }

    #[test]
    fn bursts_spawn_on_the_interval() {
        let mut system = rain();
        let mut rng = StdRng::seed_from_u64(7);

        system.update(0.01, None, &mut rng);
        assert_eq!(system.particles().len(), 0, "interval not reached yet");

        system.update(0.05, None, &mut rng);
        assert_eq!(system.particles().len(), 10);
    }

    #[test]
    fn the_oldest_surplus_is_dropped() {
        let mut system = ParticleSystem::new(0.05, 10, 15, false, false, Vec3::ZERO, 0.0);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..4 {
            system.update(0.05, None, &mut rng);
        }
        assert_eq!(system.particles().len(), 15);
    }

    #[test]
    fn dead_particles_are_culled_before_the_next_burst() {
        let mut system = ParticleSystem::new(5.0, 3, 300, false, false, Vec3::ZERO, 0.0);
        let mut rng = StdRng::seed_from_u64(7);

        // the burst spawns and immediately ages to the end of its lifetime
        system.update(5.0, None, &mut rng);
        assert_eq!(system.particles().len(), 3);
        assert!(system.particles().iter().all(|particle| !particle.is_alive()));

        // a step too short to spawn sweeps the dead batch out
        system.update(0.1, None, &mut rng);
        assert!(system.particles().is_empty());

        // the next full interval delivers a fresh, living burst
        system.update(4.9, None, &mut rng);
        assert_eq!(system.particles().len(), 3);
        assert!(system.particles().iter().all(Particle::is_alive));
    }

    #[test]
    fn gravity_pulls_spawned_particles_down() {
        let mut system = ParticleSystem::new(0.05, 1, 10, true, false, Vec3::ZERO, 0.0);
        let mut rng = StdRng::seed_from_u64(7);
        system.update(0.05, None, &mut rng);
        for _ in 0..20 {
            system.update(0.01, None, &mut rng);
        }
        assert!(system.particles()[0].position.y < 0.0);
    }
}
