use super::camera_utils::{convert_matrix4_to_array, Camera, CameraUniform};
use crate::config::{CameraConfig, ControlsConfig};
use cgmath::*;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Keeps the polar angle off the poles so `look_at` never degenerates.
const POLAR_EPSILON: f32 = 1.0e-6;

/// Camera orbiting a target point on a sphere.
///
/// `azimuth` is the horizontal angle around +Y measured from +Z, `polar` the
/// angle down from +Y. Every setter clamps into [`OrbitCameraBounds`] and
/// recomputes `eye`.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub distance: f32,
    pub polar: f32,
    pub azimuth: f32,
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub uniform: CameraUniform,
}

impl Camera for OrbitCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let proj =
            OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar);
        proj * self.build_view_matrix()
    }
}

impl OrbitCamera {
    pub fn new(
        distance: f32,
        polar: f32,
        azimuth: f32,
        target: Vector3<f32>,
        aspect: f32,
        bounds: OrbitCameraBounds,
    ) -> Self {
        let mut camera = Self {
            distance,
            polar,
            azimuth,
            eye: Vector3::zero(), // Will be auto-calculated in `update()` nevertheless.
            target,
            up: Vector3::unit_y(),
            bounds,
            aspect,
            fovy: Rad(std::f32::consts::FRAC_PI_4),
            znear: 0.1,
            zfar: 100.0,
            uniform: CameraUniform::default(),
        };
        camera.set_orbit(distance, azimuth, polar);
        camera
    }

    /// Creates a camera placed at `eye` looking at `target`.
    ///
    /// The spherical coordinates are derived from the offset and then clamped,
    /// so an out-of-envelope starting position is pulled onto the boundary.
    pub fn looking_at(
        eye: Vector3<f32>,
        target: Vector3<f32>,
        aspect: f32,
        bounds: OrbitCameraBounds,
    ) -> Self {
        let (distance, azimuth, polar) = cartesian_to_spherical(eye - target);
        Self::new(distance, polar, azimuth, target, aspect, bounds)
    }

    /// Builds the startup camera from configuration.
    pub fn from_config(camera: &CameraConfig, controls: &ControlsConfig, aspect: f32) -> Self {
        let mut orbit = Self::looking_at(
            Vector3::from(camera.position),
            Vector3::from(camera.target),
            aspect,
            OrbitCameraBounds::from(controls),
        );
        orbit.fovy = Deg(camera.fovy).into();
        orbit.znear = camera.znear;
        orbit.zfar = camera.zfar;
        orbit.update_view_proj();
        orbit
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = self.bounds.clamp_distance(distance);
        self.update();
    }

    pub fn set_azimuth(&mut self, azimuth: f32) {
        self.azimuth = self.bounds.clamp_azimuth(azimuth);
        self.update();
    }

    pub fn set_polar(&mut self, polar: f32) {
        self.polar = self.bounds.clamp_polar(polar);
        self.update();
    }

    /// Applies all three orbit parameters at once with a single eye update.
    pub fn set_orbit(&mut self, distance: f32, azimuth: f32, polar: f32) {
        self.distance = self.bounds.clamp_distance(distance);
        self.azimuth = self.bounds.clamp_azimuth(azimuth);
        self.polar = self.bounds.clamp_polar(polar);
        self.update();
    }

    /// Camera-space right and up axes in world space, used for panning.
    pub fn screen_axes(&self) -> (Vector3<f32>, Vector3<f32>) {
        let forward = (self.target - self.eye).normalize();
        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward).normalize();
        (right, up)
    }

    /// Updates the camera after changing `distance`, `polar` or `azimuth`.
    fn update(&mut self) {
        self.eye =
            calculate_cartesian_eye_position(self.polar, self.azimuth, self.distance, self.target);
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn build_view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(
            Point3::from_vec(self.eye),
            Point3::from_vec(self.target),
            self.up,
        )
    }

    pub fn update_view_proj(&mut self) {
        let view_proj = self.build_view_projection_matrix();
        self.uniform.view_position = [self.eye.x, self.eye.y, self.eye.z, 1.0];
        self.uniform.view_proj = convert_matrix4_to_array(view_proj);
        self.uniform.view = convert_matrix4_to_array(self.build_view_matrix());
        self.uniform.inv_view_proj =
            convert_matrix4_to_array(view_proj.invert().unwrap_or_else(Matrix4::identity));
    }
}

/// Allowed orbit envelope. Out-of-range values are pinned to the nearest bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCameraBounds {
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_azimuth: f32,
    pub max_azimuth: f32,
    pub min_polar: f32,
    pub max_polar: f32,
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_azimuth: f32::NEG_INFINITY,
            max_azimuth: f32::INFINITY,
            min_polar: 0.0,
            max_polar: std::f32::consts::PI,
        }
    }
}

impl From<&ControlsConfig> for OrbitCameraBounds {
    fn from(config: &ControlsConfig) -> Self {
        Self {
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            min_azimuth: config.min_azimuth,
            max_azimuth: config.max_azimuth,
            min_polar: config.min_polar,
            max_polar: config.max_polar,
        }
    }
}

impl OrbitCameraBounds {
    pub fn clamp_distance(&self, distance: f32) -> f32 {
        distance
            .max(self.min_distance)
            .min(self.max_distance)
            .max(f32::EPSILON)
    }

    pub fn clamp_azimuth(&self, azimuth: f32) -> f32 {
        azimuth.max(self.min_azimuth).min(self.max_azimuth)
    }

    pub fn clamp_polar(&self, polar: f32) -> f32 {
        polar
            .max(self.min_polar)
            .min(self.max_polar)
            .clamp(POLAR_EPSILON, std::f32::consts::PI - POLAR_EPSILON)
    }

    pub fn contains(&self, distance: f32, azimuth: f32, polar: f32) -> bool {
        (self.min_distance..=self.max_distance).contains(&distance)
            && (self.min_azimuth..=self.max_azimuth).contains(&azimuth)
            && (self.min_polar..=self.max_polar).contains(&polar)
    }
}

fn calculate_cartesian_eye_position(
    polar: f32,
    azimuth: f32,
    distance: f32,
    target: Vector3<f32>,
) -> Vector3<f32> {
    Vector3::new(
        distance * polar.sin() * azimuth.sin(),
        distance * polar.cos(),
        distance * polar.sin() * azimuth.cos(),
    ) + target
}

/// Returns `(distance, azimuth, polar)` for an offset from the target.
fn cartesian_to_spherical(offset: Vector3<f32>) -> (f32, f32, f32) {
    let distance = offset.magnitude();
    if distance == 0.0 {
        return (0.0, 0.0, 0.0);
    }
    let azimuth = offset.x.atan2(offset.z);
    let polar = (offset.y / distance).clamp(-1.0, 1.0).acos();
    (distance, azimuth, polar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    fn envelope() -> OrbitCameraBounds {
        OrbitCameraBounds {
            min_distance: 2.0,
            max_distance: 10.0,
            min_azimuth: -FRAC_PI_4,
            max_azimuth: FRAC_PI_4,
            min_polar: 0.3,
            max_polar: FRAC_PI_2,
        }
    }

    #[test]
    fn distance_beyond_max_is_pinned() {
        let mut camera = OrbitCamera::new(5.0, 1.0, 0.0, Vector3::zero(), 1.0, envelope());
        camera.set_distance(15.0);
        assert_eq!(camera.distance, 10.0);
        assert!(((camera.eye - camera.target).magnitude() - 10.0).abs() < 1e-4);

        camera.set_distance(0.5);
        assert_eq!(camera.distance, 2.0);
    }

    #[test]
    fn angles_are_clamped_without_wraparound() {
        let mut camera = OrbitCamera::new(5.0, 1.0, 0.0, Vector3::zero(), 1.0, envelope());
        camera.set_azimuth(3.0 * std::f32::consts::PI);
        assert_eq!(camera.azimuth, FRAC_PI_4);
        camera.set_azimuth(-7.0);
        assert_eq!(camera.azimuth, -FRAC_PI_4);
        camera.set_polar(3.0);
        assert_eq!(camera.polar, FRAC_PI_2);
        camera.set_polar(-1.0);
        assert_eq!(camera.polar, 0.3);
    }

    #[test]
    fn looking_at_recovers_spherical_coordinates() {
        let eye = Vector3::new(1.0, 1.0, 2.0);
        let camera = OrbitCamera::looking_at(eye, Vector3::zero(), 1.5, envelope());
        assert!((camera.distance - 6.0f32.sqrt()).abs() < 1e-5);
        assert!((camera.azimuth - 0.5f32.atan()).abs() < 1e-5);
        assert!((camera.eye - eye).magnitude() < 1e-5);
    }

    #[test]
    fn eye_sits_on_positive_z_at_zero_azimuth() {
        let camera = OrbitCamera::new(3.0, FRAC_PI_2, 0.0, Vector3::zero(), 1.0, envelope());
        assert!((camera.eye - Vector3::new(0.0, 0.0, 3.0)).magnitude() < 1e-5);
    }

    #[test]
    fn resize_updates_aspect_and_ignores_zero_height() {
        let mut camera = OrbitCamera::new(3.0, 1.0, 0.0, Vector3::zero(), 1.0, envelope());
        camera.resize_projection(1920, 1080);
        assert_eq!(camera.aspect, 1920.0 / 1080.0);
        camera.resize_projection(800, 0);
        assert_eq!(camera.aspect, 1920.0 / 1080.0);
    }

    #[test]
    fn config_camera_starts_inside_envelope() {
        let controls = ControlsConfig::default();
        let camera = OrbitCamera::from_config(&CameraConfig::default(), &controls, 1.5);
        let bounds = OrbitCameraBounds::from(&controls);
        assert!(bounds.contains(camera.distance, camera.azimuth, camera.polar));
        assert!((camera.fovy.0 - 75f32.to_radians()).abs() < 1e-6);
        assert_eq!(camera.uniform.view_position[3], 1.0);
    }
}
