use glam::{Mat4, Vec3};

/// Arena handle of a light inside [`super::Map`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct LightId(pub(crate) usize);

/// Distance falloff constants, each clamped to `[0, 1]`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Attenuation {
    #[must_use]
    pub fn new(constant: f32, linear: f32, quadratic: f32) -> Self {
        Self {
            constant: constant.clamp(0.0, 1.0),
            linear: linear.clamp(0.0, 1.0),
            quadratic: quadratic.clamp(0.0, 1.0),
        }
    }
}

/// The per-kind geometry of a light. Only the fields each kind needs.
#[derive(Clone, PartialEq, Debug)]
pub enum LightKind {
    Directional {
        direction: Vec3,
    },
    Point {
        position: Vec3,
        /// Placement relative to the owning entity while bound.
        offset: Vec3,
        attenuation: Attenuation,
        bound: bool,
    },
    Spot {
        position: Vec3,
        offset: Vec3,
        attenuation: Attenuation,
        bound: bool,
        direction: Vec3,
        /// Direction at bind time; bound spots are re-aimed relative to it.
        start_direction: Vec3,
        /// Cosine of the inner cone angle.
        cut_off: f32,
        /// Cosine of the outer cone angle.
        outer_cut_off: f32,
    },
}

/// A scene light. Color channels are clamped to `[0, 1]` on every write.
#[derive(Clone, PartialEq, Debug)]
pub struct Light {
    ambient: Vec3,
    diffuse: Vec3,
    specular: Vec3,
    enabled: bool,
    pub(crate) kind: LightKind,
}

fn clamp_color(color: Vec3) -> Vec3 {
    color.clamp(Vec3::ZERO, Vec3::ONE)
}

fn up_direction(direction: Vec3, world_up: Vec3) -> Vec3 {
    let right = direction.cross(world_up).normalize_or(Vec3::X);
    right.cross(direction).normalize_or(Vec3::Y)
}

impl Light {
    #[must_use]
    pub fn directional(direction: Vec3, ambient: Vec3, diffuse: Vec3, specular: Vec3) -> Self {
        let mut light = Self {
            ambient: clamp_color(ambient),
            diffuse: clamp_color(diffuse),
            specular: clamp_color(specular),
            enabled: true,
            kind: LightKind::Directional { direction: Vec3::X },
        };
        light.set_direction(direction);
        light
    }

    #[must_use]
    pub fn point(
        position: Vec3,
        ambient: Vec3,
        diffuse: Vec3,
        specular: Vec3,
        attenuation: Attenuation,
    ) -> Self {
        Self {
            ambient: clamp_color(ambient),
            diffuse: clamp_color(diffuse),
            specular: clamp_color(specular),
            enabled: true,
            kind: LightKind::Point {
                position,
                offset: Vec3::ZERO,
                attenuation,
                bound: false,
            },
        }
    }

    #[must_use]
    #[allow(clippy::too_many_arguments, reason = "mirrors the light's full parameter set")]
    pub fn spot(
        position: Vec3,
        direction: Vec3,
        ambient: Vec3,
        diffuse: Vec3,
        specular: Vec3,
        attenuation: Attenuation,
        cut_off: f32,
        outer_cut_off: f32,
    ) -> Self {
        let direction = if direction.length() == 0.0 {
            Vec3::X
        } else {
            direction.normalize()
        };
        Self {
            ambient: clamp_color(ambient),
            diffuse: clamp_color(diffuse),
            specular: clamp_color(specular),
            enabled: true,
            kind: LightKind::Spot {
                position,
                offset: Vec3::ZERO,
                attenuation,
                bound: false,
                direction,
                start_direction: direction,
                cut_off: cut_off.clamp(-1.0, 1.0),
                outer_cut_off: outer_cut_off.clamp(-1.0, 1.0),
            },
        }
    }

    #[must_use]
    pub fn ambient(&self) -> Vec3 {
        self.ambient
    }

    #[must_use]
    pub fn diffuse(&self) -> Vec3 {
        self.diffuse
    }

    #[must_use]
    pub fn specular(&self) -> Vec3 {
        self.specular
    }

    pub fn set_ambient(&mut self, ambient: Vec3) {
        self.ambient = clamp_color(ambient);
    }

    pub fn set_diffuse(&mut self, diffuse: Vec3) {
        self.diffuse = clamp_color(diffuse);
    }

    pub fn set_specular(&mut self, specular: Vec3) {
        self.specular = clamp_color(specular);
    }

    pub fn set_colors(&mut self, ambient: Vec3, diffuse: Vec3, specular: Vec3) {
        self.set_ambient(ambient);
        self.set_diffuse(diffuse);
        self.set_specular(specular);
    }

    pub fn enable(&mut self, enable: bool) {
        self.enabled = enable;
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// World position for point and spot lights; directional lights have
    /// none.
    #[must_use]
    pub fn position(&self) -> Option<Vec3> {
        match self.kind {
            LightKind::Directional { .. } => None,
            LightKind::Point { position, .. } | LightKind::Spot { position, .. } => {
                Some(position)
            }
        }
    }

    pub fn set_position(&mut self, new_position: Vec3) {
        match &mut self.kind {
            LightKind::Directional { .. } => {}
            LightKind::Point { position, .. } | LightKind::Spot { position, .. } => {
                *position = new_position;
            }
        }
    }

    #[must_use]
    pub fn offset(&self) -> Option<Vec3> {
        match self.kind {
            LightKind::Directional { .. } => None,
            LightKind::Point { offset, .. } | LightKind::Spot { offset, .. } => Some(offset),
        }
    }

    pub fn set_offset(&mut self, new_offset: Vec3) {
        match &mut self.kind {
            LightKind::Directional { .. } => {}
            LightKind::Point { offset, .. } | LightKind::Spot { offset, .. } => {
                *offset = new_offset;
            }
        }
    }

    #[must_use]
    pub fn direction(&self) -> Option<Vec3> {
        match self.kind {
            LightKind::Directional { direction } | LightKind::Spot { direction, .. } => {
                Some(direction)
            }
            LightKind::Point { .. } => None,
        }
    }

    /// Zero vectors are ignored; the previous direction stays.
    pub fn set_direction(&mut self, new_direction: Vec3) {
        if new_direction.length() == 0.0 {
            return;
        }
        match &mut self.kind {
            LightKind::Directional { direction } | LightKind::Spot { direction, .. } => {
                *direction = new_direction.normalize();
            }
            LightKind::Point { .. } => {}
        }
    }

    #[must_use]
    pub fn attenuation(&self) -> Option<Attenuation> {
        match self.kind {
            LightKind::Directional { .. } => None,
            LightKind::Point { attenuation, .. } | LightKind::Spot { attenuation, .. } => {
                Some(attenuation)
            }
        }
    }

    /// Inner and outer cone cosines of a spot light.
    #[must_use]
    pub fn cut_offs(&self) -> Option<(f32, f32)> {
        match self.kind {
            LightKind::Spot {
                cut_off,
                outer_cut_off,
                ..
            } => Some((cut_off, outer_cut_off)),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        match self.kind {
            LightKind::Directional { .. } => false,
            LightKind::Point { bound, .. } | LightKind::Spot { bound, .. } => bound,
        }
    }

    pub(crate) fn set_bound(&mut self, is_bound: bool) {
        match &mut self.kind {
            LightKind::Directional { .. } => {}
            LightKind::Point { bound, .. } | LightKind::Spot { bound, .. } => {
                *bound = is_bound;
            }
        }
    }

    #[must_use]
    pub fn start_direction(&self) -> Option<Vec3> {
        match self.kind {
            LightKind::Spot { start_direction, .. } => Some(start_direction),
            _ => None,
        }
    }

    /// Re-anchors a spot's bind-time direction to wherever it points now.
    pub fn reset_start_direction(&mut self) {
        if let LightKind::Spot {
            direction,
            start_direction,
            ..
        } = &mut self.kind
        {
            *start_direction = *direction;
        }
    }

    /// Projection used when rendering this light's shadow map.
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        match self.kind {
            LightKind::Directional { .. } => {
                Mat4::orthographic_rh(-25.0, 25.0, -25.0, 25.0, 1.0, 50.0)
            }
            LightKind::Point { .. } | LightKind::Spot { .. } => {
                Mat4::perspective_rh(90.0_f32.to_radians(), 1.0, 0.1, 25.0)
            }
        }
    }

    /// View matrix for a directional light anchored at `anchor` (parallel
    /// light has no position of its own), or for a spot along its own
    /// direction. Point lights use [`Self::cube_view_matrices`].
    #[must_use]
    pub fn view_matrix(&self, anchor: Vec3) -> Option<Mat4> {
        match self.kind {
            LightKind::Directional { direction } => {
                Some(Mat4::look_at_rh(anchor, anchor + direction, Vec3::Y))
            }
            LightKind::Spot {
                position,
                direction,
                ..
            } => Some(Mat4::look_at_rh(
                position,
                position + direction,
                up_direction(direction, Vec3::Y),
            )),
            LightKind::Point { .. } => None,
        }
    }

    /// One view per cube-map face, for omnidirectional shadow maps.
    #[must_use]
    pub fn cube_view_matrices(&self) -> Option<[Mat4; 6]> {
        let LightKind::Point { position, .. } = self.kind else {
            return None;
        };
        let face = |forward: Vec3, up: Vec3| Mat4::look_at_rh(position, position + forward, up);
        Some([
            face(Vec3::X, -Vec3::Y),
            face(-Vec3::X, -Vec3::Y),
            face(Vec3::Y, Vec3::Z),
            face(-Vec3::Y, -Vec3::Z),
            face(Vec3::Z, -Vec3::Y),
            face(-Vec3::Z, -Vec3::Y),
        ])
    }

    /// Combined projection · view, ready for the shadow pass.
    #[must_use]
    pub fn light_space_matrix(&self, anchor: Vec3) -> Option<Mat4> {
        self.view_matrix(anchor)
            .map(|view| self.projection_matrix() * view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_channels_are_clamped_on_write() {
        let mut light = Light::point(
            Vec3::ZERO,
            Vec3::splat(0.5),
            Vec3::splat(0.5),
            Vec3::splat(0.5),
            Attenuation::new(1.0, 0.01, 0.06),
        );
        light.set_colors(
            Vec3::new(-1.0, 0.5, 2.0),
            Vec3::splat(7.0),
            Vec3::new(0.2, -0.2, 1.5),
        );
        assert_eq!(light.ambient(), Vec3::new(0.0, 0.5, 1.0));
        assert_eq!(light.diffuse(), Vec3::ONE);
        assert_eq!(light.specular(), Vec3::new(0.2, 0.0, 1.0));
    }

    #[test]
    fn attenuation_constants_are_clamped() {
        let attenuation = Attenuation::new(2.0, -0.5, 0.06);
        assert_eq!(attenuation.constant, 1.0);
        assert_eq!(attenuation.linear, 0.0);
        assert_eq!(attenuation.quadratic, 0.06);
    }

    #[test]
    fn zero_direction_is_ignored() {
        let mut light =
            Light::directional(Vec3::new(0.0, -1.0, 0.0), Vec3::ZERO, Vec3::ONE, Vec3::ONE);
        light.set_direction(Vec3::ZERO);
        assert_eq!(light.direction(), Some(Vec3::new(0.0, -1.0, 0.0)));
    }

    #[test]
    fn spot_remembers_its_start_direction() {
        let mut light = Light::spot(
            Vec3::ZERO,
            Vec3::new(0.0, -1.0, 0.1),
            Vec3::splat(0.04),
            Vec3::splat(0.7),
            Vec3::ONE,
            Attenuation::new(1.0, 0.01, 0.06),
            12.5_f32.to_radians().cos(),
            22.5_f32.to_radians().cos(),
        );
        let initial = light.start_direction().unwrap();
        light.set_direction(Vec3::X);
        assert_eq!(light.start_direction(), Some(initial));
        light.reset_start_direction();
        assert_eq!(light.start_direction(), Some(Vec3::X));
    }

    #[test]
    fn directional_lights_have_no_position() {
        let light = Light::directional(Vec3::new(0.0, -0.3, -0.9), Vec3::ZERO, Vec3::ONE, Vec3::ONE);
        assert_eq!(light.position(), None);
        assert!(light.view_matrix(Vec3::ZERO).is_some());
        assert!(light.cube_view_matrices().is_none());
    }

    #[test]
    fn point_lights_project_to_six_faces() {
        let light = Light::point(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::ZERO,
            Vec3::ONE,
            Vec3::ONE,
            Attenuation::new(1.0, 0.01, 0.06),
        );
        assert!(light.cube_view_matrices().is_some());
        assert!(light.view_matrix(Vec3::ZERO).is_none());
    }
}
