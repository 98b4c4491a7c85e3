//! Scene objects and the groups they are scattered in.

use cgmath::{Euler, Matrix4, Rad, Vector3, Zero};

/// Index of a mesh in [`Scene::meshes`](super::Scene).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryId(pub usize);

/// Index of a material in [`Scene::materials`](super::Scene).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub usize);

/// Position, rotation and uniform scale of one rendered instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneObject {
    pub position: Vector3<f32>,
    pub rotation: Euler<Rad<f32>>,
    pub scale: f32,
}

impl Default for SceneObject {
    fn default() -> Self {
        Self {
            position: Vector3::zero(),
            rotation: Euler::new(Rad(0.0), Rad(0.0), Rad(0.0)),
            scale: 1.0,
        }
    }
}

impl SceneObject {
    /// Model matrix: translation, then X, Y, Z rotations, then scale.
    pub fn model_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from_angle_x(self.rotation.x)
            * Matrix4::from_angle_y(self.rotation.y)
            * Matrix4::from_angle_z(self.rotation.z)
            * Matrix4::from_scale(self.scale)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn angle(self, rotation: &Euler<Rad<f32>>) -> Rad<f32> {
        match self {
            Axis::X => rotation.x,
            Axis::Y => rotation.y,
            Axis::Z => rotation.z,
        }
    }

    pub fn set_angle(self, rotation: &mut Euler<Rad<f32>>, angle: Rad<f32>) {
        match self {
            Axis::X => rotation.x = angle,
            Axis::Y => rotation.y = angle,
            Axis::Z => rotation.z = angle,
        }
    }
}

/// Which scattered group a set of objects belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKind {
    Donuts,
    Cubes,
    Pyramids,
}

impl GroupKind {
    pub const ALL: [GroupKind; 3] = [GroupKind::Donuts, GroupKind::Cubes, GroupKind::Pyramids];

    /// The axis the animation spins this group around.
    pub fn spin_axis(self) -> Axis {
        match self {
            GroupKind::Donuts => Axis::X,
            GroupKind::Cubes => Axis::Z,
            GroupKind::Pyramids => Axis::Y,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GroupKind::Donuts => "donuts",
            GroupKind::Cubes => "cubes",
            GroupKind::Pyramids => "pyramids",
        }
    }
}

/// Objects sharing one mesh and material, produced by one scatter call.
///
/// The number of objects is fixed when the group is created; only their
/// transforms can change afterwards.
#[derive(Debug, Clone)]
pub struct ObjectGroup {
    pub kind: GroupKind,
    pub geometry: GeometryId,
    pub material: MaterialId,
    objects: Box<[SceneObject]>,
}

impl ObjectGroup {
    pub fn new(
        kind: GroupKind,
        geometry: GeometryId,
        material: MaterialId,
        objects: Vec<SceneObject>,
    ) -> Self {
        Self {
            kind,
            geometry,
            material,
            objects: objects.into_boxed_slice(),
        }
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut [SceneObject] {
        &mut self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// The extruded text, a single object with its own mesh.
#[derive(Debug, Clone)]
pub struct TextMesh {
    pub geometry: GeometryId,
    pub material: MaterialId,
    pub object: SceneObject,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector4};
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn spin_axes_match_groups() {
        assert_eq!(GroupKind::Donuts.spin_axis(), Axis::X);
        assert_eq!(GroupKind::Cubes.spin_axis(), Axis::Z);
        assert_eq!(GroupKind::Pyramids.spin_axis(), Axis::Y);
    }

    #[test]
    fn axis_reads_back_what_it_set() {
        let mut rotation = Euler::new(Rad(0.1), Rad(0.2), Rad(0.3));
        Axis::Y.set_angle(&mut rotation, Rad(1.5));
        assert_eq!(Axis::Y.angle(&rotation), Rad(1.5));
        assert_eq!(rotation.x, Rad(0.1));
        assert_eq!(rotation.z, Rad(0.3));
    }

    #[test]
    fn model_matrix_scales_then_rotates_then_translates() {
        let object = SceneObject {
            position: Vector3::new(1.0, 2.0, 3.0),
            rotation: Euler::new(Rad(0.0), Rad(0.0), Rad(FRAC_PI_2)),
            scale: 2.0,
        };
        let moved = object.model_matrix() * Vector4::new(1.0, 0.0, 0.0, 1.0);
        // (1,0,0) scaled to (2,0,0), turned a quarter about Z to (0,2,0)
        assert!((moved.truncate() - Vector3::new(1.0, 4.0, 3.0)).magnitude() < 1e-5);
    }

    #[test]
    fn zero_scale_collapses_to_position() {
        let object = SceneObject {
            position: Vector3::new(-1.0, 0.5, 4.0),
            scale: 0.0,
            ..SceneObject::default()
        };
        let moved = object.model_matrix() * Vector4::new(3.0, -2.0, 7.0, 1.0);
        assert_eq!(moved.truncate(), object.position);
    }

    #[test]
    fn group_length_is_fixed_but_objects_are_mutable() {
        let mut group = ObjectGroup::new(
            GroupKind::Cubes,
            GeometryId(1),
            MaterialId(0),
            vec![SceneObject::default(); 3],
        );
        assert_eq!(group.len(), 3);
        group.objects_mut()[2].scale = 0.5;
        assert_eq!(group.objects()[2].scale, 0.5);
    }
}
