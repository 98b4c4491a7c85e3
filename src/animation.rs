//! Per-frame animation.
//!
//! Every group spins about its own axis at a fixed rate. The angle is
//! assigned from the elapsed time rather than accumulated, so replaying the
//! same instant always yields the same pose.

use std::time::Instant;

use cgmath::Rad;

use crate::gfx::scene::Scene;

/// Spin rate of every group, radians per second.
pub const SPIN_SPEED: f32 = 0.5;

/// Monotonic seconds since creation.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    start: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Sets each group's spin angle for `elapsed` seconds.
///
/// Only the group's spin axis is written; the other two angles keep the
/// values they were scattered with.
pub fn animate(scene: &mut Scene, elapsed: f32) {
    let angle = Rad(SPIN_SPEED * elapsed);
    for group in scene.groups_mut() {
        let axis = group.kind.spin_axis();
        for object in group.objects_mut() {
            axis.set_angle(&mut object.rotation, angle);
        }
    }
}

/// Drives the scene forward once per redraw.
#[derive(Debug, Default)]
pub struct AnimationDriver {
    clock: Clock,
    frames: u64,
}

impl AnimationDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed(&self) -> f32 {
        self.clock.elapsed()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Rotates the groups and applies pending camera input.
    ///
    /// Returns the elapsed time the frame was posed at. Drawing and
    /// scheduling the next redraw are left to the caller.
    pub fn tick(&mut self, scene: &mut Scene) -> f32 {
        let elapsed = self.clock.elapsed();
        animate(scene, elapsed);
        scene.update();
        self.frames += 1;
        elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::{
        object::{Axis, GeometryId, GroupKind, MaterialId},
        scene::tests::test_scene,
    };
    use rand::{rngs::StdRng, SeedableRng};

    fn scattered_scene() -> Scene {
        let mut scene = test_scene();
        let mut rng = StdRng::seed_from_u64(11);
        for (i, kind) in GroupKind::ALL.into_iter().enumerate() {
            scene.scatter(kind, GeometryId(i), MaterialId(0), 25, &mut rng);
        }
        scene
    }

    #[test]
    fn only_the_spin_axis_changes() {
        let mut scene = scattered_scene();
        let before: Vec<_> = scene
            .groups()
            .iter()
            .map(|g| g.objects().to_vec())
            .collect();

        animate(&mut scene, 3.0);

        for (group, original) in scene.groups().iter().zip(&before) {
            let spin = group.kind.spin_axis();
            for (now, was) in group.objects().iter().zip(original) {
                assert_eq!(spin.angle(&now.rotation), Rad(1.5));
                for axis in [Axis::X, Axis::Y, Axis::Z] {
                    if axis != spin {
                        assert_eq!(axis.angle(&now.rotation), axis.angle(&was.rotation));
                    }
                }
                assert_eq!(now.position, was.position);
                assert_eq!(now.scale, was.scale);
            }
        }
    }

    #[test]
    fn animation_is_idempotent_in_elapsed_time() {
        let mut once = scattered_scene();
        animate(&mut once, 7.25);

        let mut replayed = scattered_scene();
        animate(&mut replayed, 2.0);
        animate(&mut replayed, 100.0);
        animate(&mut replayed, 7.25);
        animate(&mut replayed, 7.25);

        for (a, b) in once.groups().iter().zip(replayed.groups()) {
            assert_eq!(a.objects(), b.objects());
        }
    }

    #[test]
    fn start_of_time_zeroes_spin() {
        let mut scene = scattered_scene();
        animate(&mut scene, 0.0);
        let donuts = scene.group(GroupKind::Donuts).unwrap();
        assert!(donuts.objects().iter().all(|o| o.rotation.x == Rad(0.0)));
        let cubes = scene.group(GroupKind::Cubes).unwrap();
        assert!(cubes.objects().iter().all(|o| o.rotation.z == Rad(0.0)));
    }

    #[test]
    fn tick_counts_frames_and_moves_forward() {
        let mut scene = scattered_scene();
        let mut driver = AnimationDriver::new();
        let first = driver.tick(&mut scene);
        let second = driver.tick(&mut scene);
        assert!(second >= first);
        assert_eq!(driver.frames(), 2);
    }

    #[test]
    fn damped_orbit_keeps_moving_between_ticks() {
        let mut scene = scattered_scene();
        let mut driver = AnimationDriver::new();
        assert!(scene.camera_manager.controls.enable_damping);

        let start = scene.camera_manager.camera.azimuth;
        scene.camera_manager.controls.rotate_left(0.5);

        driver.tick(&mut scene);
        let after_first = scene.camera_manager.camera.azimuth;
        let first_eye = scene.camera_manager.camera.uniform.view_position;
        assert!(after_first < start);

        driver.tick(&mut scene);
        let camera = &scene.camera_manager.camera;
        assert!(camera.azimuth < after_first);
        assert_ne!(camera.uniform.view_position, first_eye);
        assert_eq!(
            camera.uniform.view_position,
            [camera.eye.x, camera.eye.y, camera.eye.z, 1.0]
        );
        assert!(scene.camera_manager.controls.is_settling());
    }
}
