use cgmath::{Matrix4, SquareMatrix};

use super::{orbit_camera::OrbitCamera, orbit_controls::OrbitControls};

/// Couples the orbit camera with the pointer controls that drive it.
pub struct CameraManager {
    pub camera: OrbitCamera,
    pub controls: OrbitControls,
}

impl CameraManager {
    pub fn new(camera: OrbitCamera, controls: OrbitControls) -> Self {
        Self { camera, controls }
    }

    /// Per-frame controls update followed by a uniform refresh.
    ///
    /// Returns `true` if the camera moved this frame.
    pub fn update(&mut self) -> bool {
        let moved = self.controls.update(&mut self.camera);
        self.camera.update_view_proj();
        moved
    }
}

pub trait Camera: Sized {
    fn build_view_projection_matrix(&self) -> Matrix4<f32>;
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct CameraUniform {
    /// The eye position of the camera in homogenous coordinates.
    ///
    /// Homogenous coordinates are used to fullfill the 16 byte alignment requirement.
    pub view_position: [f32; 4],

    /// Contains the view projection matrix.
    pub view_proj: [[f32; 4]; 4],

    /// World-to-view matrix, needed for view-space matcap normals.
    pub view: [[f32; 4]; 4],

    /// Inverse of `view_proj`, used to reconstruct background view rays.
    pub inv_view_proj: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    /// Creates a default [CameraUniform].
    fn default() -> Self {
        let identity = convert_matrix4_to_array(Matrix4::identity());
        Self {
            view_position: [0.0; 4],
            view_proj: identity,
            view: identity,
            inv_view_proj: identity,
        }
    }
}

pub fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    matrix4.into()
}
