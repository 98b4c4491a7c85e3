//! Scene configuration with TOML file support.
//!
//! Every section uses `#[serde(default)]`, so a partial `bauble.toml` that only
//! overrides, say, `[controls]` leaves everything else at its default.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BaubleError, Result};

/// Top-level configuration container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct SceneConfig {
    pub window: WindowConfig,
    pub scatter: ScatterConfig,
    pub geometry: GeometryConfig,
    pub text: TextConfig,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub assets: AssetConfig,
}

impl SceneConfig {
    /// Load configuration from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| BaubleError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration if the file exists, otherwise fall back to defaults.
    ///
    /// A file that exists but fails to parse is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            log::info!("Loading scene config from {}", path.display());
            Self::load(path)
        } else {
            log::info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    /// Initial logical width.
    pub width: u32,
    /// Initial logical height.
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "bauble".to_string(),
            width: 1200,
            height: 800,
        }
    }
}

/// How many objects each group receives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScatterConfig {
    /// Fixed seed for reproducible layouts; `None` draws from OS entropy.
    pub seed: Option<u64>,
    pub donuts: usize,
    pub cubes: usize,
    pub pyramids: usize,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            seed: None,
            donuts: 100,
            cubes: 60,
            pyramids: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeometryConfig {
    pub torus_radius: f32,
    pub torus_tube: f32,
    pub torus_radial_segments: u32,
    pub torus_tubular_segments: u32,
    pub cube_size: f32,
    pub pyramid_radius: f32,
    pub pyramid_height: f32,
    pub pyramid_sides: u32,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            torus_radius: 0.3,
            torus_tube: 0.2,
            torus_radial_segments: 20,
            torus_tubular_segments: 45,
            cube_size: 0.4,
            pyramid_radius: 0.3,
            pyramid_height: 0.5,
            pyramid_sides: 4,
        }
    }
}

/// Content and extrusion parameters of the 3D text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TextConfig {
    pub content: String,
    pub size: f32,
    pub depth: f32,
    pub curve_segments: u32,
    pub bevel_enabled: bool,
    pub bevel_thickness: f32,
    pub bevel_size: f32,
    pub bevel_offset: f32,
    pub bevel_segments: u32,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            content: "Hello Rust".to_string(),
            size: 0.5,
            depth: 0.2,
            curve_segments: 5,
            bevel_enabled: true,
            bevel_thickness: 0.03,
            bevel_size: 0.02,
            bevel_offset: 0.0,
            bevel_segments: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fovy: 75.0,
            znear: 0.1,
            zfar: 100.0,
            position: [1.0, 1.0, 2.0],
            target: [0.0, 0.0, 0.0],
        }
    }
}

/// Orbit envelope and interaction tuning. Angles are radians.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControlsConfig {
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_azimuth: f32,
    pub max_azimuth: f32,
    pub min_polar: f32,
    pub max_polar: f32,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub enable_pan: bool,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            min_distance: 2.0,
            max_distance: 10.0,
            min_azimuth: -FRAC_PI_4,
            max_azimuth: FRAC_PI_4,
            min_polar: 0.3,
            max_polar: FRAC_PI_2,
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            enable_pan: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    pub font: PathBuf,
    pub matcap: PathBuf,
    pub environment: PathBuf,
    /// How strongly the environment map shows up in surface reflections.
    pub environment_intensity: f32,
    /// Background color used until (or unless) the environment map loads.
    pub clear_color: [f64; 3],
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            font: PathBuf::from("assets/fonts/helvetiker_regular.typeface.json"),
            matcap: PathBuf::from("assets/textures/matcaps/8.png"),
            environment: PathBuf::from("assets/textures/environment/2k.hdr"),
            environment_intensity: 0.15,
            clear_color: [0.1, 0.1, 0.12],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let config = SceneConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: SceneConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
[controls]
max_distance = 6.0

[scatter]
seed = 7
donuts = 40
"#;
        let config: SceneConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.controls.max_distance, 6.0);
        assert_eq!(config.controls.min_distance, 2.0);
        assert_eq!(config.scatter.seed, Some(7));
        assert_eq!(config.scatter.donuts, 40);
        assert_eq!(config.scatter.cubes, ScatterConfig::default().cubes);
        assert_eq!(config.text, TextConfig::default());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = Path::new("definitely/not/here/bauble.toml");
        let config = SceneConfig::load_or_default(path).unwrap();
        assert_eq!(config, SceneConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("bauble-bad-{}.toml", std::process::id()));
        std::fs::write(&path, "[controls]\nmax_distance = \"far\"\n").unwrap();
        let result = SceneConfig::load(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(BaubleError::Config { .. })));
    }
}
