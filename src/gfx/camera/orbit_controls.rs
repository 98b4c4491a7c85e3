use cgmath::{InnerSpace, Vector3, Zero};
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

use super::orbit_camera::OrbitCamera;
use crate::config::ControlsConfig;

/// Below this, pending damped motion is treated as settled.
const SETTLE_EPSILON: f32 = 1.0e-6;

/// Pixels of a trackpad scroll that count as one wheel line.
const PIXELS_PER_LINE: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragMode {
    Rotate,
    Pan,
}

/// Pointer-driven orbit controls.
///
/// Input handlers only accumulate deltas; nothing touches the camera until
/// [`OrbitControls::update`], which must run once per frame so damped motion
/// keeps decaying after the pointer goes idle.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub enable_pan: bool,
    delta_azimuth: f32,
    delta_polar: f32,
    scale: f32,
    pan_offset: Vector3<f32>,
    drag: Option<DragMode>,
    cursor: Option<PhysicalPosition<f64>>,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new(&ControlsConfig::default())
    }
}

impl OrbitControls {
    pub fn new(config: &ControlsConfig) -> Self {
        Self {
            enable_damping: config.enable_damping,
            damping_factor: config.damping_factor.clamp(0.0, 1.0),
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            pan_speed: config.pan_speed,
            enable_pan: config.enable_pan,
            delta_azimuth: 0.0,
            delta_polar: 0.0,
            scale: 1.0,
            pan_offset: Vector3::zero(),
            drag: None,
            cursor: None,
        }
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.delta_azimuth -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.delta_polar -= angle;
    }

    /// Moves the camera toward the target by `dolly_scale` (< 1 zooms in).
    pub fn dolly_in(&mut self, dolly_scale: f32) {
        self.scale *= dolly_scale;
    }

    pub fn dolly_out(&mut self, dolly_scale: f32) {
        self.scale /= dolly_scale;
    }

    fn zoom_scale(&self) -> f32 {
        0.95f32.powf(self.zoom_speed)
    }

    /// Screen-space pan by a pixel delta, scaled so the target tracks the cursor.
    pub fn pan(&mut self, dx: f32, dy: f32, viewport_height: f32, camera: &OrbitCamera) {
        if viewport_height <= 0.0 {
            return;
        }
        let target_distance = camera.distance * (camera.fovy.0 / 2.0).tan();
        let (right, up) = camera.screen_axes();
        let scale = 2.0 * target_distance / viewport_height * self.pan_speed;
        self.pan_offset += right * (-dx * scale) + up * (dy * scale);
    }

    pub fn pointer_down(&mut self, button: MouseButton, position: Option<PhysicalPosition<f64>>) {
        self.drag = match button {
            MouseButton::Left => Some(DragMode::Rotate),
            MouseButton::Right if self.enable_pan => Some(DragMode::Pan),
            _ => return,
        };
        if position.is_some() {
            self.cursor = position;
        }
    }

    pub fn pointer_up(&mut self, button: MouseButton) {
        let released = match button {
            MouseButton::Left => DragMode::Rotate,
            MouseButton::Right => DragMode::Pan,
            _ => return,
        };
        if self.drag == Some(released) {
            self.drag = None;
        }
    }

    /// Cursor moved to `position`; drags are measured against the previous position.
    pub fn pointer_move(
        &mut self,
        position: PhysicalPosition<f64>,
        viewport_height: f32,
        camera: &OrbitCamera,
    ) {
        let previous = self.cursor.replace(position);
        let (Some(mode), Some(previous)) = (self.drag, previous) else {
            return;
        };
        let dx = (position.x - previous.x) as f32;
        let dy = (position.y - previous.y) as f32;

        match mode {
            DragMode::Rotate if viewport_height > 0.0 => {
                let per_pixel = std::f32::consts::TAU / viewport_height * self.rotate_speed;
                self.rotate_left(dx * per_pixel);
                self.rotate_up(dy * per_pixel);
            }
            DragMode::Rotate => {}
            DragMode::Pan => self.pan(dx, dy, viewport_height, camera),
        }
    }

    /// Wheel input in lines; positive values (scrolling up) zoom in.
    pub fn wheel(&mut self, lines: f32) {
        if lines == 0.0 {
            return;
        }
        let step = self.zoom_scale().powf(lines.abs());
        if lines > 0.0 {
            self.dolly_in(step);
        } else {
            self.dolly_out(step);
        }
    }

    /// Feeds a winit window event into the controls.
    ///
    /// Returns `true` if the event was consumed as camera input.
    pub fn process_window_event(
        &mut self,
        event: &WindowEvent,
        viewport_height: f32,
        camera: &OrbitCamera,
    ) -> bool {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                match state {
                    ElementState::Pressed => self.pointer_down(*button, None),
                    ElementState::Released => self.pointer_up(*button),
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_move(*position, viewport_height, camera);
                self.drag.is_some()
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => {
                        *y as f32 / PIXELS_PER_LINE
                    }
                };
                self.wheel(lines);
                true
            }
            _ => false,
        }
    }

    /// Applies pending input to the camera, clamped to the camera's bounds.
    ///
    /// Returns `true` if the camera moved.
    pub fn update(&mut self, camera: &mut OrbitCamera) -> bool {
        let before = (camera.distance, camera.azimuth, camera.polar, camera.target);
        let weight = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };

        camera.target += self.pan_offset * weight;
        camera.set_orbit(
            camera.distance * self.scale,
            camera.azimuth + self.delta_azimuth * weight,
            camera.polar + self.delta_polar * weight,
        );

        if self.enable_damping {
            let decay = 1.0 - self.damping_factor;
            self.delta_azimuth *= decay;
            self.delta_polar *= decay;
            self.pan_offset *= decay;
            if self.delta_azimuth.abs() < SETTLE_EPSILON {
                self.delta_azimuth = 0.0;
            }
            if self.delta_polar.abs() < SETTLE_EPSILON {
                self.delta_polar = 0.0;
            }
            if self.pan_offset.magnitude2() < SETTLE_EPSILON * SETTLE_EPSILON {
                self.pan_offset = Vector3::zero();
            }
        } else {
            self.delta_azimuth = 0.0;
            self.delta_polar = 0.0;
            self.pan_offset = Vector3::zero();
        }
        self.scale = 1.0;

        (camera.distance - before.0).abs() > SETTLE_EPSILON
            || (camera.azimuth - before.1).abs() > SETTLE_EPSILON
            || (camera.polar - before.2).abs() > SETTLE_EPSILON
            || (camera.target - before.3).magnitude2() > SETTLE_EPSILON * SETTLE_EPSILON
    }

    /// True while any damped motion is still pending.
    pub fn is_settling(&self) -> bool {
        self.delta_azimuth != 0.0 || self.delta_polar != 0.0 || self.pan_offset != Vector3::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::orbit_camera::OrbitCameraBounds;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    fn bounds() -> OrbitCameraBounds {
        OrbitCameraBounds {
            min_distance: 2.0,
            max_distance: 10.0,
            min_azimuth: -FRAC_PI_4,
            max_azimuth: FRAC_PI_4,
            min_polar: 0.3,
            max_polar: FRAC_PI_2,
        }
    }

    fn camera() -> OrbitCamera {
        OrbitCamera::looking_at(
            Vector3::new(1.0, 1.0, 2.0),
            Vector3::zero(),
            1.5,
            bounds(),
        )
    }

    fn undamped() -> OrbitControls {
        OrbitControls::new(&ControlsConfig {
            enable_damping: false,
            ..ControlsConfig::default()
        })
    }

    #[test]
    fn zoom_past_max_distance_stops_at_bound() {
        let mut camera = camera();
        let mut controls = undamped();
        // 15 / current distance worth of dolly-out in one frame.
        controls.dolly_out(camera.distance / 15.0);
        controls.update(&mut camera);
        assert_eq!(camera.distance, 10.0);
    }

    #[test]
    fn wheel_down_moves_camera_away() {
        let mut camera = camera();
        let start = camera.distance;
        let mut controls = undamped();
        controls.wheel(-3.0);
        assert!(controls.update(&mut camera));
        assert!(camera.distance > start);
    }

    #[test]
    fn update_without_input_leaves_camera_still() {
        let mut camera = camera();
        let before = camera.eye;
        let mut controls = OrbitControls::default();
        assert!(!controls.update(&mut camera));
        assert_eq!(camera.eye, before);
    }

    #[test]
    fn damping_spreads_a_rotation_over_frames() {
        let mut camera = camera();
        let start = camera.azimuth;
        let mut controls = OrbitControls::default();
        controls.rotate_left(-0.2);

        assert!(controls.update(&mut camera));
        let first_step = camera.azimuth - start;
        assert!((first_step - 0.2 * controls.damping_factor).abs() < 1e-5);
        assert!(controls.is_settling());

        // Idle frames keep moving the camera as the inertia decays.
        assert!(controls.update(&mut camera));
        assert!(camera.azimuth - start > first_step);
    }

    #[test]
    fn drag_rotates_by_full_turn_per_viewport_height() {
        let mut camera = OrbitCamera::new(5.0, 1.0, 0.0, Vector3::zero(), 1.0, OrbitCameraBounds::default());
        let mut controls = undamped();
        controls.pointer_down(MouseButton::Left, Some(PhysicalPosition::new(100.0, 100.0)));
        controls.pointer_move(PhysicalPosition::new(110.0, 100.0), 400.0, &camera);
        controls.update(&mut camera);
        let expected = -std::f32::consts::TAU * 10.0 / 400.0;
        assert!((camera.azimuth - expected).abs() < 1e-5);
    }

    #[test]
    fn moves_without_button_do_nothing() {
        let mut camera = camera();
        let before = camera.eye;
        let mut controls = undamped();
        controls.pointer_move(PhysicalPosition::new(0.0, 0.0), 400.0, &camera);
        controls.pointer_move(PhysicalPosition::new(300.0, 300.0), 400.0, &camera);
        controls.update(&mut camera);
        assert_eq!(camera.eye, before);
    }

    #[test]
    fn right_drag_pans_target_unless_disabled() {
        let mut camera = camera();
        let mut controls = undamped();
        controls.pointer_down(MouseButton::Right, Some(PhysicalPosition::new(0.0, 0.0)));
        controls.pointer_move(PhysicalPosition::new(50.0, 0.0), 400.0, &camera);
        controls.update(&mut camera);
        assert!(camera.target.magnitude() > 0.0);

        let mut camera = self::camera();
        let mut controls = OrbitControls::new(&ControlsConfig {
            enable_damping: false,
            enable_pan: false,
            ..ControlsConfig::default()
        });
        controls.pointer_down(MouseButton::Right, Some(PhysicalPosition::new(0.0, 0.0)));
        controls.pointer_move(PhysicalPosition::new(50.0, 0.0), 400.0, &camera);
        controls.update(&mut camera);
        assert_eq!(camera.target, Vector3::zero());
    }

    #[test]
    fn random_input_never_escapes_bounds() {
        let mut rng = StdRng::seed_from_u64(0xB0B);
        for damping in [true, false] {
            let mut camera = camera();
            let mut controls = OrbitControls::new(&ControlsConfig {
                enable_damping: damping,
                ..ControlsConfig::default()
            });
            let mut cursor = PhysicalPosition::new(0.0, 0.0);
            for _ in 0..2000 {
                match rng.random_range(0..4) {
                    0 => controls.pointer_down(MouseButton::Left, Some(cursor)),
                    1 => controls.pointer_up(MouseButton::Left),
                    2 => controls.wheel(rng.random_range(-10.0..10.0)),
                    _ => {
                        cursor = PhysicalPosition::new(
                            cursor.x + rng.random_range(-400.0..400.0),
                            cursor.y + rng.random_range(-400.0..400.0),
                        );
                        controls.pointer_move(cursor, 600.0, &camera);
                    }
                }
                controls.update(&mut camera);
                assert!(
                    bounds().contains(camera.distance, camera.azimuth, camera.polar),
                    "escaped: d={} az={} polar={}",
                    camera.distance,
                    camera.azimuth,
                    camera.polar
                );
            }
        }
    }
}
