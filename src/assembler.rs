//! Scene assembly.
//!
//! Builds the scattered groups synchronously at startup, then kicks off the
//! slow loads (typeface, matcap, environment map) and folds their results
//! into the scene as they arrive. A failed load only costs its own visual
//! element.

use std::sync::Arc;

use rand::Rng;

use crate::assets::{
    decode_environment, decode_matcap, AssetLoader, DecodedImage, PendingAsset, Typeface,
};
use crate::config::{AssetConfig, GeometryConfig, ScatterConfig, SceneConfig};
use crate::error::AssetError;
use crate::gfx::geometry::{
    generate_box, generate_cone, generate_text, generate_torus, TextGeometryOptions,
};
use crate::gfx::resources::material::Material;
use crate::gfx::scene::{GroupKind, MaterialId, Mesh, Scene, SceneObject, TextMesh};

pub struct SceneAssembler {
    scatter: ScatterConfig,
    geometry: GeometryConfig,
    text: String,
    text_options: TextGeometryOptions,
    material: Option<MaterialId>,
    font: Option<PendingAsset<Typeface>>,
    matcap: Option<PendingAsset<DecodedImage>>,
    environment: Option<PendingAsset<DecodedImage>>,
}

impl SceneAssembler {
    pub fn new(config: &SceneConfig) -> Self {
        Self {
            scatter: config.scatter.clone(),
            geometry: config.geometry.clone(),
            text: config.text.content.clone(),
            text_options: TextGeometryOptions::from(&config.text),
            material: None,
            font: None,
            matcap: None,
            environment: None,
        }
    }

    /// The shared matcap material, once [`populate`](Self::populate) ran.
    pub fn material(&self) -> Option<MaterialId> {
        self.material
    }

    /// Adds the three meshes, the shared material and the scattered groups.
    pub fn populate<R: Rng>(&mut self, scene: &mut Scene, rng: &mut R) {
        let g = &self.geometry;
        let material = scene.add_material(Material::new("Matcap"));
        self.material = Some(material);

        let donut = scene.add_mesh(Mesh::from_geometry(
            "Donut",
            &generate_torus(
                g.torus_radius,
                g.torus_tube,
                g.torus_radial_segments,
                g.torus_tubular_segments,
            ),
        ));
        let cube = scene.add_mesh(Mesh::from_geometry(
            "Cube",
            &generate_box(g.cube_size, g.cube_size, g.cube_size),
        ));
        let pyramid = scene.add_mesh(Mesh::from_geometry(
            "Pyramid",
            &generate_cone(g.pyramid_radius, g.pyramid_height, g.pyramid_sides),
        ));

        scene.scatter(GroupKind::Donuts, donut, material, self.scatter.donuts, rng);
        scene.scatter(GroupKind::Cubes, cube, material, self.scatter.cubes, rng);
        scene.scatter(GroupKind::Pyramids, pyramid, material, self.scatter.pyramids, rng);

        let stats = scene.get_statistics();
        log::info!(
            "scene populated: {} objects, {} triangles",
            stats.object_count,
            stats.total_triangles
        );
    }

    /// Starts the background loads for every asset named in `assets`.
    pub fn start_loads(&mut self, loader: &AssetLoader, assets: &AssetConfig) {
        self.font = Some(loader.load("font", &assets.font, Typeface::from_json));
        self.matcap = Some(loader.load("matcap", &assets.matcap, decode_matcap));
        self.environment = Some(loader.load("environment", &assets.environment, decode_environment));
    }

    /// True once every started load has been applied or has failed.
    pub fn is_settled(&self) -> bool {
        self.font.is_none() && self.matcap.is_none() && self.environment.is_none()
    }

    /// Applies whatever loads have finished since the last call.
    ///
    /// Never blocks. Returns `true` if the scene changed.
    pub fn poll(&mut self, scene: &mut Scene) -> bool {
        let mut changed = false;

        if let Some(result) = take_finished(&mut self.font) {
            changed |= self.apply_font(scene, result);
        }
        if let Some(result) = take_finished(&mut self.matcap) {
            changed |= self.apply_matcap(scene, result);
        }
        if let Some(result) = take_finished(&mut self.environment) {
            changed |= apply_environment(scene, result);
        }

        changed
    }

    /// Builds the text mesh from a loaded typeface.
    pub fn apply_font(&self, scene: &mut Scene, result: Result<Typeface, AssetError>) -> bool {
        let font = match result {
            Ok(font) => font,
            Err(err) => {
                log::warn!("font failed to load, skipping text: {err}");
                return false;
            }
        };
        let Some(material) = self.material else {
            log::warn!("font arrived before the scene was populated");
            return false;
        };

        let geometry = generate_text(&font, &self.text, &self.text_options);
        if geometry.is_empty() {
            log::warn!("text {:?} produced no geometry", self.text);
            return false;
        }

        let geometry = scene.add_mesh(Mesh::from_geometry("Text", &geometry));
        scene.set_text(TextMesh {
            geometry,
            material,
            object: SceneObject::default(),
        });
        log::info!("text ready: {:?} in {}", self.text, font.family_name);
        true
    }

    pub fn apply_matcap(
        &self,
        scene: &mut Scene,
        result: Result<DecodedImage, AssetError>,
    ) -> bool {
        let image = match result {
            Ok(image) => image,
            Err(err) => {
                log::warn!("matcap failed to load, keeping the placeholder: {err}");
                return false;
            }
        };
        let Some(material) = self.material.and_then(|id| scene.material_mut(id)) else {
            return false;
        };

        log::info!("matcap ready: {}x{}", image.width, image.height);
        material.set_matcap(Arc::new(image));
        true
    }
}

pub fn apply_environment(scene: &mut Scene, result: Result<DecodedImage, AssetError>) -> bool {
    match result {
        Ok(image) => {
            log::info!("environment map ready: {}x{}", image.width, image.height);
            scene.set_environment(Arc::new(image));
            true
        }
        Err(err) => {
            log::warn!("environment map failed to load, keeping the clear color: {err}");
            false
        }
    }
}

/// Polls a pending load, dropping it once its result has been taken.
fn take_finished<T>(slot: &mut Option<PendingAsset<T>>) -> Option<Result<T, AssetError>> {
    let result = slot.as_mut()?.poll()?;
    *slot = None;
    Some(result)
}
