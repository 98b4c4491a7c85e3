//! Random placement of decorative objects.

use std::f32::consts::PI;

use cgmath::{Euler, Rad, Vector3};
use rand::Rng;

use super::object::{GeometryId, GroupKind, MaterialId, ObjectGroup, SceneObject};
use super::scene::Scene;

/// Side length of the cube objects are scattered in, centered on the origin.
pub const SCATTER_EXTENT: f32 = 10.0;

/// One randomly placed object.
///
/// Each position component lands in `[-5, 5)`, the x and y rotations in
/// `[0, π)` with z left at zero, and one scale draw in `[0, 1)` is used for
/// all three axes.
pub fn scatter_object<R: Rng>(rng: &mut R) -> SceneObject {
    let mut coordinate = || (rng.random::<f32>() - 0.5) * SCATTER_EXTENT;
    let position = Vector3::new(coordinate(), coordinate(), coordinate());
    let rotation = Euler::new(
        Rad(rng.random::<f32>() * PI),
        Rad(rng.random::<f32>() * PI),
        Rad(0.0),
    );
    let scale = rng.random::<f32>();

    SceneObject {
        position,
        rotation,
        scale,
    }
}

pub fn scatter_objects<R: Rng>(rng: &mut R, count: usize) -> Vec<SceneObject> {
    (0..count).map(|_| scatter_object(rng)).collect()
}

impl Scene {
    /// Scatters `count` objects sharing `geometry` and `material` and
    /// registers them as a group.
    pub fn scatter<R: Rng>(
        &mut self,
        kind: GroupKind,
        geometry: GeometryId,
        material: MaterialId,
        count: usize,
        rng: &mut R,
    ) -> &ObjectGroup {
        let objects = scatter_objects(rng, count);
        log::debug!("scattered {} {}", objects.len(), kind.label());
        self.add_group(ObjectGroup::new(kind, geometry, material, objects))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::scene::tests::test_scene;
    use rand::{rngs::StdRng, SeedableRng};

    fn assert_within_invariants(object: &SceneObject) {
        for component in [object.position.x, object.position.y, object.position.z] {
            assert!((-5.0..5.0).contains(&component), "position {component}");
        }
        assert!((0.0..PI).contains(&object.rotation.x.0));
        assert!((0.0..PI).contains(&object.rotation.y.0));
        assert_eq!(object.rotation.z, Rad(0.0));
        assert!((0.0..1.0).contains(&object.scale));
    }

    #[test]
    fn scatter_produces_requested_count() {
        let mut rng = StdRng::seed_from_u64(40);
        let objects = scatter_objects(&mut rng, 40);
        assert_eq!(objects.len(), 40);
        objects.iter().for_each(assert_within_invariants);
    }

    #[test]
    fn zero_count_is_empty() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(scatter_objects(&mut rng, 0).is_empty());
    }

    #[test]
    fn invariants_hold_over_many_draws() {
        let mut rng = StdRng::seed_from_u64(0xba0b1e);
        scatter_objects(&mut rng, 5_000)
            .iter()
            .for_each(assert_within_invariants);
    }

    #[test]
    fn same_seed_same_layout() {
        let a = scatter_objects(&mut StdRng::seed_from_u64(9), 12);
        let b = scatter_objects(&mut StdRng::seed_from_u64(9), 12);
        assert_eq!(a, b);
    }

    #[test]
    fn scene_scatter_registers_group() {
        let mut scene = test_scene();
        let mut rng = StdRng::seed_from_u64(3);
        let group = scene.scatter(GroupKind::Donuts, GeometryId(0), MaterialId(0), 40, &mut rng);
        assert_eq!(group.kind, GroupKind::Donuts);
        assert_eq!(group.len(), 40);

        scene.scatter(GroupKind::Cubes, GeometryId(1), MaterialId(0), 0, &mut rng);
        assert_eq!(scene.groups().len(), 2);
        assert!(scene.group(GroupKind::Cubes).is_some_and(ObjectGroup::is_empty));
    }
}
