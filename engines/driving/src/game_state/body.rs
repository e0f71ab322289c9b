use std::collections::BTreeMap;
use std::f32::consts::PI;

use glam::{DVec3, Mat4, Quat, Vec3};

use super::car::Car;
use super::light::LightId;
use crate::model::ModelId;

/// A single force contribution for one tick. The per-body list is summed
/// into the net force once per step and then discarded.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Force(Vec3);

impl Force {
    #[must_use]
    pub fn new(vector: Vec3) -> Self {
        Self(vector)
    }

    #[must_use]
    pub fn vector(self) -> Vec3 {
        self.0
    }
}

/// Arena handle of an entity inside [`super::Map`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct EntityId(pub(crate) usize);

/// Who is steering a car entity.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Driver {
    Player,
    Bot,
}

/// What an entity is, beyond its transform.
#[derive(Debug)]
pub enum Role {
    /// Road tiles, terrain, street lights, trees, the skybox.
    Scenery,
    Car { car: Car, driver: Driver },
}

/// One scene entity: a body plus its role.
#[derive(Debug)]
pub struct Entity {
    pub body: Body,
    pub role: Role,
}

/// Transform and accumulated physics state shared by every entity.
///
/// The direction is kept unit-length; assigning a zero vector resets it to
/// +X. Velocity is double precision: the force model produces large
/// intermediate magnitudes.
#[derive(Debug)]
pub struct Body {
    pub(crate) position: Vec3,
    pub(crate) direction: Vec3,
    pub(crate) up: Vec3,
    pub(crate) world_up: Vec3,
    start_direction: Vec3,
    scale: Vec3,
    pub(crate) velocity: DVec3,
    pub(crate) force: Vec3,
    forces: Vec<Force>,
    /// Lights whose position follows this body's transform, by name.
    pub(crate) lights: BTreeMap<String, LightId>,
    pub(crate) model: Option<ModelId>,
}

impl Body {
    #[must_use]
    pub fn new(position: Vec3, direction: Vec3, scale: Vec3) -> Self {
        let mut body = Self {
            position,
            direction: Vec3::X,
            up: Vec3::Y,
            world_up: Vec3::Y,
            start_direction: Vec3::X,
            scale: Vec3::ONE,
            velocity: DVec3::ZERO,
            force: Vec3::ZERO,
            forces: Vec::new(),
            lights: BTreeMap::new(),
            model: None,
        };
        body.set_direction(direction);
        body.set_scale(scale);
        body.start_direction = body.direction;
        body
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    #[must_use]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Zero vectors reset the direction to +X instead of poisoning the
    /// basis with NaNs.
    pub fn set_direction(&mut self, direction: Vec3) {
        self.direction = if direction.length() == 0.0 {
            Vec3::X
        } else {
            direction.normalize()
        };
        self.update_vectors();
    }

    #[must_use]
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// A scale with any negative component is replaced by 1.
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = if scale.cmpge(Vec3::ZERO).all() {
            scale
        } else {
            Vec3::ONE
        };
    }

    #[must_use]
    pub fn velocity(&self) -> DVec3 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: DVec3) {
        self.velocity = velocity;
    }

    #[must_use]
    pub fn model(&self) -> Option<ModelId> {
        self.model
    }

    pub fn set_model(&mut self, model: ModelId) {
        self.model = Some(model);
    }

    pub fn add_force(&mut self, force: Vec3) {
        self.forces.push(Force::new(force));
    }

    /// Folds the pending contributions into the net force.
    pub fn sum_forces(&mut self) {
        for force in &self.forces {
            self.force += force.vector();
        }
    }

    pub fn clear_forces(&mut self) {
        self.force = Vec3::ZERO;
        self.forces.clear();
    }

    /// Velocity component along the current heading.
    #[must_use]
    pub fn longitudinal_velocity(&self) -> DVec3 {
        self.velocity.project_onto(self.direction.as_dvec3())
    }

    /// Rotation from the spawn heading to the current one, plus translation
    /// and scale. The antiparallel case has no unique rotation axis; the
    /// local up axis is used.
    #[must_use]
    pub fn model_matrix(&self) -> Mat4 {
        let mut matrix = Mat4::from_translation(self.position);
        let cross = self.start_direction.cross(self.direction);
        if cross != Vec3::ZERO {
            let angle = self.start_direction.dot(self.direction).clamp(-1.0, 1.0).acos();
            matrix *= Mat4::from_quat(Quat::from_axis_angle(cross.normalize(), angle));
        } else if self.direction == -self.start_direction {
            matrix *= Mat4::from_quat(Quat::from_axis_angle(self.up, PI));
        }
        matrix * Mat4::from_scale(self.scale)
    }

    /// Recomputes the local right/up basis from direction and world up.
    pub fn update_vectors(&mut self) {
        let right = self.direction.cross(self.world_up).normalize_or(Vec3::X);
        self.up = right.cross(self.direction).normalize_or(Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_direction_resets_to_x_axis() {
        let mut body = Body::new(Vec3::ZERO, Vec3::Z, Vec3::ONE);
        body.set_direction(Vec3::ZERO);
        assert_eq!(body.direction(), Vec3::X);
    }

    #[test]
    fn direction_is_normalized() {
        let body = Body::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0), Vec3::ONE);
        assert!((body.direction().length() - 1.0).abs() < 1e-6);
        assert_eq!(body.direction(), Vec3::Z);
    }

    #[test]
    fn negative_scale_is_replaced() {
        let mut body = Body::new(Vec3::ZERO, Vec3::X, Vec3::new(2.0, -1.0, 2.0));
        assert_eq!(body.scale(), Vec3::ONE);
        body.set_scale(Vec3::splat(0.5));
        assert_eq!(body.scale(), Vec3::splat(0.5));
    }

    #[test]
    fn forces_sum_and_clear() {
        let mut body = Body::new(Vec3::ZERO, Vec3::X, Vec3::ONE);
        body.add_force(Vec3::new(1.0, 0.0, 0.0));
        body.add_force(Vec3::new(2.0, 3.0, 0.0));
        body.sum_forces();
        assert_eq!(body.force, Vec3::new(3.0, 3.0, 0.0));
        body.clear_forces();
        assert_eq!(body.force, Vec3::ZERO);
    }

    #[test]
    fn longitudinal_velocity_projects_onto_heading() {
        let mut body = Body::new(Vec3::ZERO, Vec3::X, Vec3::ONE);
        body.set_velocity(DVec3::new(3.0, 0.0, 4.0));
        assert_eq!(body.longitudinal_velocity(), DVec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn model_matrix_turns_with_the_heading() {
        let mut body = Body::new(Vec3::new(1.0, 0.0, 0.0), Vec3::X, Vec3::ONE);
        body.set_direction(Vec3::Z);
        let rotated = body.model_matrix().transform_vector3(Vec3::X);
        assert!(rotated.abs_diff_eq(Vec3::Z, 1e-5));
    }

    #[test]
    fn model_matrix_handles_a_full_reversal() {
        let mut body = Body::new(Vec3::ZERO, Vec3::X, Vec3::ONE);
        body.set_direction(-Vec3::X);
        let rotated = body.model_matrix().transform_vector3(Vec3::X);
        assert!(rotated.abs_diff_eq(-Vec3::X, 1e-5));
    }
}
