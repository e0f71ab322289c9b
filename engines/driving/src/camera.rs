use glam::{Mat4, Vec3};

use crate::game_state::EntityId;
use crate::input::{KeyCode, KeyTable, Mouse};

const MIN_FOV: f32 = 1.0;
const MAX_FOV: f32 = 120.0;
const MIN_ORBIT_RADIUS: f32 = 2.0;
const MAX_ORBIT_RADIUS: f32 = 5.0;

/// How the camera derives its position each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraMode {
    /// Glued to the target; looks where the mouse points.
    FirstPerson,
    /// Orbits the target at `radius`, always looking at it.
    ThirdPerson { radius: f32 },
    /// Unanchored fly camera.
    Free,
}

/// View/projection source for the renderer and the anchor for
/// camera-relative effects (rain, skybox, light culling).
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub front: Vec3,
    pub up: Vec3,
    pub right: Vec3,
    pub world_up: Vec3,
    /// Extra displacement applied on top of the target position.
    pub offset: Vec3,
    yaw: f32,
    pitch: f32,
    fov: f32,
    aspect_ratio: f32,
    z_near: f32,
    z_far: f32,
    speed: f32,
    sensitivity: f32,
    mode: CameraMode,
    target: Option<EntityId>,
    /// Last resolved target position; keeps the view stable when the
    /// target is unbound mid-run.
    last_target: Vec3,
}

impl Camera {
    #[must_use]
    pub fn new(mode: CameraMode, position: Vec3) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::Z,
            up: Vec3::Y,
            right: Vec3::X,
            world_up: Vec3::Y,
            offset: Vec3::ZERO,
            yaw: 90.0,
            pitch: 0.0,
            fov: 45.0,
            aspect_ratio: 16.0 / 9.0,
            z_near: 0.1,
            z_far: 1000.0,
            speed: 5.0,
            sensitivity: 0.2,
            mode,
            target: None,
            last_target: Vec3::ZERO,
        };
        camera.update_vectors(None);
        camera
    }

    #[must_use]
    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    #[must_use]
    pub fn fov(&self) -> f32 {
        self.fov
    }

    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov.to_radians(),
            self.aspect_ratio,
            self.z_near,
            self.z_far,
        )
    }

    pub fn bind_to_target(&mut self, target: EntityId) {
        self.target = Some(target);
    }

    /// The camera keeps looking at wherever the target last was.
    pub fn unbind_from_target(&mut self) {
        self.target = None;
    }

    #[must_use]
    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    pub fn rotate(&mut self, x_offset: f32, y_offset: f32, pitch_limit: Option<f32>) {
        self.yaw += x_offset * self.sensitivity;
        self.pitch += y_offset * self.sensitivity;
        if let Some(limit) = pitch_limit {
            if limit > 0.0 {
                self.pitch = self.pitch.clamp(-limit, limit);
            }
        }
    }

    pub fn change_fov(&mut self, value: f32) {
        self.fov = (self.fov - value).clamp(MIN_FOV, MAX_FOV);
    }

    /// Out-of-range values are ignored, not clamped: the previous fov stays.
    pub fn set_fov(&mut self, value: f32) {
        if (MIN_FOV..=MAX_FOV).contains(&value) {
            self.fov = value;
        }
    }

    fn change_radius(&mut self, offset: f32) {
        if let CameraMode::ThirdPerson { radius } = &mut self.mode {
            *radius = (*radius + offset * self.sensitivity)
                .clamp(MIN_ORBIT_RADIUS, MAX_ORBIT_RADIUS);
        }
    }

    fn yaw_pitch_direction(&self) -> Vec3 {
        let (yaw_sin, yaw_cos) = self.yaw.to_radians().sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.to_radians().sin_cos();
        Vec3::new(yaw_cos * pitch_cos, pitch_sin, yaw_sin * pitch_cos)
    }

    /// Recomputes position, front and the local basis. `target` is the
    /// current position of the bound entity, if any.
    pub fn update_vectors(&mut self, target: Option<Vec3>) {
        if let Some(position) = target {
            self.last_target = position;
        }
        let target = self.last_target;

        match self.mode {
            CameraMode::FirstPerson => {
                self.position = target + self.offset;
                self.front = self.yaw_pitch_direction().normalize();
            }
            CameraMode::ThirdPerson { radius } => {
                self.position = target + self.offset + self.yaw_pitch_direction() * radius;
                self.front = (target - self.position).normalize_or(Vec3::Z);
            }
            CameraMode::Free => {
                self.front = self.yaw_pitch_direction().normalize();
            }
        }
        self.right = self.front.cross(self.world_up).normalize_or(Vec3::X);
        self.up = self.right.cross(self.front).normalize_or(Vec3::Y);
    }

    fn fly(&mut self, keys: &KeyTable, delta_time: f32) {
        let axis = |positive: KeyCode, negative: KeyCode| {
            f32::from(keys.is_pressed(positive)) - f32::from(keys.is_pressed(negative))
        };
        let mut dir = Vec3::new(
            axis(KeyCode::Right, KeyCode::Left),
            0.0,
            axis(KeyCode::Up, KeyCode::Down),
        );
        if dir != Vec3::ZERO {
            dir = dir.normalize();
        }

        self.position += self.front * dir.z * self.speed * delta_time;
        self.position += self.right * dir.x * self.speed * delta_time;
        self.position += self.up * dir.y * self.speed * delta_time;
    }

    pub(crate) fn process_input(&mut self, keys: &KeyTable, mouse: &Mouse, delta_time: f64) {
        let offset = mouse.offset();
        match self.mode {
            CameraMode::FirstPerson => {
                if offset != glam::DVec2::ZERO {
                    self.rotate(offset.x as f32, -offset.y as f32, None);
                }
            }
            CameraMode::ThirdPerson { .. } => {
                if offset != glam::DVec2::ZERO {
                    self.rotate(offset.x as f32, -offset.y as f32, None);
                }
                let scroll = mouse.scroll_offset();
                if scroll.y != 0.0 {
                    self.change_radius(scroll.y as f32);
                }
            }
            CameraMode::Free => {
                self.fly(keys, delta_time as f32);
                if offset != glam::DVec2::ZERO {
                    self.rotate(offset.x as f32, -offset.y as f32, None);
                }
                let scroll = mouse.scroll_offset();
                if scroll.y != 0.0 {
                    self.change_fov(scroll.y as f32);
                }
            }
        }
    }
}
