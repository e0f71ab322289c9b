use std::f64::consts::FRAC_PI_2;

use glam::{DQuat, Quat, Vec3};

use super::body::Body;
use crate::input::{KeyCode, KeyTable};

pub const GEAR_RATIO_1: f32 = 2.66;
pub const GEAR_RATIO_2: f32 = 1.78;
pub const GEAR_RATIO_3: f32 = 1.30;
pub const GEAR_RATIO_4: f32 = 1.0;
pub const GEAR_RATIO_5: f32 = 0.74;
pub const GEAR_RATIO_6: f32 = 0.50;
pub const GEAR_RATIO_REVERSE: f32 = 2.90;

const DRAG_COEF: f32 = 0.42;
const RUBBING_COEF: f32 = DRAG_COEF * 30.0;
const GRAVITY: f32 = 9.81;
/// Steering approaches its target exponentially with this rate.
const STEER_RESPONSE: f64 = 3.0;
const BRAKE_MULTIPLIER: f32 = 2.7;

/// Drivetrain and steering state of one vehicle. The positional state lives
/// in the entity's [`Body`]; `Car` adds what the force model needs.
///
/// The force magnitudes are empirically tuned, not derived; changing any of
/// the constants changes how the car feels, nothing else.
#[derive(Debug, Clone)]
pub struct Car {
    mass: f32,
    wheels_axis_dist: f32,
    wheels_radius: f32,
    gear_ratio: f32,
    diff_ratio: f32,
    trans_efficiency: f32,
    max_torque: f32,
    /// Heading change rate in degrees per second, derived by [`Self::turn`].
    angular_vel: f64,
    max_turn_angle: f64,
    current_turn_angle: f64,
}

impl Car {
    #[must_use]
    pub fn new(max_torque: f32, mass: f32, wheels_axis_dist: f32, max_turn_angle: f64) -> Self {
        Self {
            mass,
            wheels_axis_dist,
            wheels_radius: 0.42,
            gear_ratio: GEAR_RATIO_1,
            diff_ratio: 3.42,
            trans_efficiency: 0.7,
            max_torque,
            angular_vel: 0.0,
            max_turn_angle,
            current_turn_angle: 0.0,
        }
    }

    #[must_use]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[must_use]
    pub fn wheels_axis_dist(&self) -> f32 {
        self.wheels_axis_dist
    }

    #[must_use]
    pub fn current_turn_angle(&self) -> f64 {
        self.current_turn_angle
    }

    #[must_use]
    pub fn max_turn_angle(&self) -> f64 {
        self.max_turn_angle
    }

    #[must_use]
    pub fn gear_ratio(&self) -> f32 {
        self.gear_ratio
    }

    /// Gear ratios are magnitudes; a negative input is folded, not rejected.
    pub fn set_gear_ratio(&mut self, ratio: f32) {
        self.gear_ratio = ratio.abs();
    }

    /// Traction force at the wheels for the current gear.
    #[must_use]
    pub fn drive_force(&self) -> f32 {
        self.max_torque * self.gear_ratio * self.diff_ratio * self.trans_efficiency
            / self.wheels_radius
    }

    /// Steers toward `angle` (degrees, clamped to the mechanical limit) and
    /// re-derives the angular velocity from the kinematic bicycle model.
    pub fn turn(&mut self, body: &Body, angle: f64, delta_time: f64) {
        let target = angle.clamp(-self.max_turn_angle, self.max_turn_angle);
        let step = (target - self.current_turn_angle) * delta_time * STEER_RESPONSE;
        self.current_turn_angle = (self.current_turn_angle + step)
            .clamp(-self.max_turn_angle, self.max_turn_angle);

        let speed_abs = body.velocity().length();
        self.angular_vel = (speed_abs / f64::from(self.wheels_axis_dist)
            * self.current_turn_angle.to_radians().sin())
        .to_degrees();
    }

    /// Advances the body by one explicit Euler step: resistance forces,
    /// acceleration, velocity/position integration, then rotating both the
    /// heading and the velocity about world up so they stay consistent.
    pub fn move_step(&mut self, body: &mut Body, delta_time: f64) {
        self.add_resistance_forces(body);
        body.sum_forces();

        let acceleration = (body.force / self.mass).as_dvec3();
        body.velocity += acceleration * delta_time;
        body.position += (body.velocity * delta_time).as_vec3();

        let yaw = (self.angular_vel * delta_time).to_radians();
        body.direction =
            (Quat::from_rotation_y(yaw as f32) * body.direction).normalize_or(Vec3::X);
        body.velocity = DQuat::from_rotation_y(yaw) * body.velocity;

        body.clear_forces();
        body.update_vectors();
    }

    fn add_resistance_forces(&self, body: &mut Body) {
        let longitudinal = body.longitudinal_velocity();
        let velocity = body.velocity();
        let mut velocity_dir = velocity.as_vec3();
        if velocity_dir.length() != 0.0 {
            velocity_dir = velocity_dir.normalize();
        }

        // Aerodynamic drag, quadratic in speed.
        body.add_force((-velocity * velocity.length()).as_vec3() * DRAG_COEF);

        // Rolling resistance along the heading.
        body.add_force((-longitudinal).as_vec3() * RUBBING_COEF);

        // Tire grip: strongest when the velocity leaves the heading.
        let slip = 1.1 - velocity_dir.dot(body.direction()).abs();
        body.add_force(-velocity_dir * self.mass * GRAVITY * 0.25 * slip);

        // Centrifugal pseudo-force while steering. The radius grows without
        // bound as the angle approaches zero; only the exact zero is skipped.
        if self.current_turn_angle != 0.0 {
            let radius = f64::from(self.wheels_axis_dist)
                / self.current_turn_angle.abs().to_radians().sin();
            let outward =
                DQuat::from_rotation_y(-FRAC_PI_2 * self.current_turn_angle.signum())
                    * longitudinal;
            body.add_force(
                (outward * longitudinal.length() * f64::from(self.mass) / radius).as_vec3(),
            );
        }
    }

    /// Maps the held keys to drive, brake and steering commands. Returns
    /// whether the headlights should be toggled this tick.
    pub(crate) fn process_input(
        &mut self,
        body: &mut Body,
        keys: &KeyTable,
        delta_time: f64,
    ) -> bool {
        if keys.is_pressed(KeyCode::W) {
            self.set_gear_ratio(GEAR_RATIO_1);
            body.add_force(body.direction() * self.drive_force());
        }
        if keys.is_pressed(KeyCode::S) {
            self.set_gear_ratio(GEAR_RATIO_REVERSE);
            body.add_force(-body.direction() * self.drive_force());
        }
        if keys.is_pressed(KeyCode::A) {
            let target = 40.0 / (body.longitudinal_velocity().length() / 2.0 + 0.001);
            self.turn(body, target, delta_time);
        }
        if keys.is_pressed(KeyCode::D) {
            let target = -40.0 / (body.longitudinal_velocity().length() / 2.0 + 0.001);
            self.turn(body, target, delta_time);
        }
        if keys.is_pressed(KeyCode::Space) {
            let mut braking_dir = body.longitudinal_velocity().as_vec3();
            if braking_dir.length() != 0.0 {
                braking_dir = braking_dir.normalize();
            }
            body.add_force(-braking_dir * self.drive_force() * BRAKE_MULTIPLIER);
        }
        if !keys.is_pressed(KeyCode::A) && !keys.is_pressed(KeyCode::D) {
            self.turn(body, 0.0, delta_time);
        }

        keys.is_pressed(KeyCode::F)
    }
}

#[cfg(test)]
mod tests {
    use glam::{DVec3, Vec3};

    use super::*;

    fn test_car() -> Car {
        Car::new(216.0, 2000.0, 50.0, 50.0)
    }

    fn test_body() -> Body {
        Body::new(Vec3::ZERO, Vec3::X, Vec3::ONE)
    }

    #[test]
    fn turn_angle_never_exceeds_the_mechanical_limit() {
        let mut car = test_car();
        let mut body = test_body();
        body.set_velocity(DVec3::new(30.0, 0.0, 0.0));

        for target in [1e6, -1e6, 49.0, -3000.0, 0.0, 400.0] {
            for _ in 0..200 {
                car.turn(&body, target, 0.016);
                assert!(car.current_turn_angle().abs() <= car.max_turn_angle());
            }
        }
    }

    #[test]
    fn steering_approaches_its_target() {
        let mut car = test_car();
        let body = test_body();
        car.turn(&body, 30.0, 0.1);
        let first = car.current_turn_angle();
        assert!(first > 0.0);
        car.turn(&body, 30.0, 0.1);
        assert!(car.current_turn_angle() > first);
        assert!(car.current_turn_angle() < 30.0);
    }

    #[test]
    fn no_phantom_forces_at_rest() {
        let mut car = test_car();
        let mut body = test_body();

        for _ in 0..1000 {
            car.move_step(&mut body, 1.0 / 240.0);
        }
        assert_eq!(body.position(), Vec3::ZERO);
        assert_eq!(body.velocity(), DVec3::ZERO);
    }

    #[test]
    fn drive_force_follows_the_drivetrain() {
        let car = test_car();
        let expected = 216.0 * GEAR_RATIO_1 * 3.42 * 0.7 / 0.42;
        assert!((car.drive_force() - expected).abs() < 1e-3);
    }

    #[test]
    fn gear_ratio_sign_is_folded() {
        let mut car = test_car();
        car.set_gear_ratio(-GEAR_RATIO_REVERSE);
        assert_eq!(car.gear_ratio(), GEAR_RATIO_REVERSE);
    }

    #[test]
    fn drag_slows_a_coasting_car() {
        let mut car = test_car();
        let mut body = test_body();
        body.set_velocity(DVec3::new(20.0, 0.0, 0.0));

        let initial = body.velocity().length();
        for _ in 0..240 {
            car.move_step(&mut body, 1.0 / 240.0);
        }
        let remaining = body.velocity().length();
        assert!(remaining < initial);
        assert!(body.position().x > 0.0, "the car still coasts forward");
    }

    #[test]
    fn driving_forward_accelerates_along_the_heading() {
        let mut car = test_car();
        let mut body = test_body();

        for _ in 0..240 {
            body.add_force(body.direction() * car.drive_force());
            car.move_step(&mut body, 1.0 / 240.0);
        }
        assert!(body.longitudinal_velocity().x > 0.0);
        assert!(body.position().x > 0.0);
    }

    #[test]
    fn turning_rotates_the_velocity_with_the_heading() {
        let mut car = test_car();
        let mut body = test_body();
        body.set_velocity(DVec3::new(25.0, 0.0, 0.0));

        for _ in 0..240 {
            car.turn(&body, 40.0, 1.0 / 240.0);
            car.move_step(&mut body, 1.0 / 240.0);
        }
        // heading and velocity stay roughly aligned while steering
        let alignment = body
            .velocity()
            .normalize()
            .dot(body.direction().as_dvec3());
        assert!(alignment > 0.8, "velocity should follow the heading, got {alignment}");
        assert!(!body.direction().abs_diff_eq(Vec3::X, 1e-6));
    }
}
