use std::sync::Arc;

use wgpu::Device;

use crate::assets::DecodedImage;
use crate::gfx::{
    camera::camera_utils::CameraManager,
    resources::material::{Material, MaterialBindings},
};

use super::mesh::Mesh;
use super::object::{GeometryId, GroupKind, MaterialId, ObjectGroup, TextMesh};

/// Equirectangular background and reflection source.
///
/// Starts empty; the revision tells the renderer when to re-upload.
#[derive(Debug, Default)]
pub struct Environment {
    image: Option<Arc<DecodedImage>>,
    revision: u64,
}

impl Environment {
    pub fn image(&self) -> Option<&Arc<DecodedImage>> {
        self.image.as_ref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_loaded(&self) -> bool {
        self.image.is_some()
    }
}

/// Main scene containing meshes, materials, object groups and camera
pub struct Scene {
    pub camera_manager: CameraManager,
    meshes: Vec<Mesh>,
    materials: Vec<Material>,
    groups: Vec<ObjectGroup>,
    text: Option<TextMesh>,
    environment: Environment,
}

impl Scene {
    /// Creates an empty scene viewed through `camera_manager`
    pub fn new(camera_manager: CameraManager) -> Self {
        Self {
            camera_manager,
            meshes: Vec::new(),
            materials: Vec::new(),
            groups: Vec::new(),
            text: None,
            environment: Environment::default(),
        }
    }

    /// Per-frame camera update: applies pending control input and refreshes
    /// the camera uniform. Returns `true` if the camera moved.
    pub fn update(&mut self) -> bool {
        self.camera_manager.update()
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> GeometryId {
        self.meshes.push(mesh);
        GeometryId(self.meshes.len() - 1)
    }

    pub fn mesh(&self, id: GeometryId) -> Option<&Mesh> {
        self.meshes.get(id.0)
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    pub fn material_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(id.0)
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Registers a group and hands it back.
    pub fn add_group(&mut self, group: ObjectGroup) -> &ObjectGroup {
        self.groups.push(group);
        &self.groups[self.groups.len() - 1]
    }

    pub fn groups(&self) -> &[ObjectGroup] {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut [ObjectGroup] {
        &mut self.groups
    }

    /// The first group of the given kind, if any.
    pub fn group(&self, kind: GroupKind) -> Option<&ObjectGroup> {
        self.groups.iter().find(|group| group.kind == kind)
    }

    pub fn text(&self) -> Option<&TextMesh> {
        self.text.as_ref()
    }

    /// Sets the text mesh, replacing any previous one.
    pub fn set_text(&mut self, text: TextMesh) {
        self.text = Some(text);
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn set_environment(&mut self, image: Arc<DecodedImage>) {
        self.environment.image = Some(image);
        self.environment.revision += 1;
    }

    /// Uploads meshes that have no buffers yet and refreshes stale materials.
    ///
    /// Cheap when nothing changed, so it runs every frame; meshes and
    /// textures that arrive from asset loads are picked up this way.
    pub fn init_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        material_bindings: &MaterialBindings,
    ) {
        for mesh in self.meshes.iter_mut() {
            mesh.init_gpu_resources(device);
        }

        for material in self.materials.iter_mut() {
            material.sync_gpu_resources(device, queue, material_bindings);
        }
    }

    /// Gets statistics about the scene
    pub fn get_statistics(&self) -> SceneStatistics {
        let mut object_count: usize = self.groups.iter().map(ObjectGroup::len).sum();
        let mut total_triangles: u64 = 0;
        let mut total_vertices: u64 = 0;

        for group in &self.groups {
            if let Some(mesh) = self.mesh(group.geometry) {
                total_triangles += u64::from(mesh.index_count() / 3) * group.len() as u64;
                total_vertices += u64::from(mesh.vertex_count()) * group.len() as u64;
            }
        }

        if let Some(mesh) = self.text.as_ref().and_then(|text| self.mesh(text.geometry)) {
            object_count += 1;
            total_triangles += u64::from(mesh.index_count() / 3);
            total_vertices += u64::from(mesh.vertex_count());
        }

        SceneStatistics {
            object_count,
            material_count: self.materials.len(),
            total_triangles,
            total_vertices,
        }
    }
}

/// Scene statistics for debugging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneStatistics {
    pub object_count: usize,
    pub material_count: usize,
    pub total_triangles: u64,
    pub total_vertices: u64,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::ControlsConfig;
    use crate::gfx::camera::{
        orbit_camera::{OrbitCamera, OrbitCameraBounds},
        orbit_controls::OrbitControls,
    };
    use crate::gfx::geometry::generate_box;
    use crate::gfx::scene::object::SceneObject;
    use cgmath::Vector3;

    pub(crate) fn test_scene() -> Scene {
        let camera = OrbitCamera::looking_at(
            Vector3::new(1.0, 1.0, 2.0),
            Vector3::new(0.0, 0.0, 0.0),
            1.5,
            OrbitCameraBounds::default(),
        );
        let controls = OrbitControls::new(&ControlsConfig::default());
        Scene::new(CameraManager::new(camera, controls))
    }

    #[test]
    fn ids_index_registration_order() {
        let mut scene = test_scene();
        let first = scene.add_mesh(Mesh::from_geometry("a", &generate_box(1.0, 1.0, 1.0)));
        let second = scene.add_mesh(Mesh::from_geometry("b", &generate_box(1.0, 1.0, 1.0)));
        assert_eq!((first, second), (GeometryId(0), GeometryId(1)));
        assert_eq!(scene.mesh(second).map(|m| m.label.as_str()), Some("b"));
        assert!(scene.mesh(GeometryId(7)).is_none());

        let material = scene.add_material(Material::new("matcap"));
        assert_eq!(material, MaterialId(0));
        assert_eq!(scene.material(material).map(|m| m.name.as_str()), Some("matcap"));
    }

    #[test]
    fn environment_changes_bump_revision() {
        let mut scene = test_scene();
        assert!(!scene.environment().is_loaded());
        assert_eq!(scene.environment().revision(), 0);

        scene.set_environment(Arc::new(DecodedImage::solid([0, 0, 0, 255])));
        assert!(scene.environment().is_loaded());
        assert_eq!(scene.environment().revision(), 1);
    }

    #[test]
    fn statistics_count_instances_and_text() {
        let mut scene = test_scene();
        let cube = scene.add_mesh(Mesh::from_geometry("cube", &generate_box(1.0, 1.0, 1.0)));
        let material = scene.add_material(Material::new("matcap"));
        scene.add_group(ObjectGroup::new(
            GroupKind::Cubes,
            cube,
            material,
            vec![SceneObject::default(); 3],
        ));
        scene.set_text(TextMesh {
            geometry: cube,
            material,
            object: SceneObject::default(),
        });

        let stats = scene.get_statistics();
        assert_eq!(stats.object_count, 4);
        assert_eq!(stats.material_count, 1);
        assert_eq!(stats.total_triangles, 12 * 4);
        assert_eq!(stats.total_vertices, 24 * 4);
        assert!(scene.group(GroupKind::Cubes).is_some());
        assert!(scene.group(GroupKind::Donuts).is_none());
    }
}
