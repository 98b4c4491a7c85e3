//! Global uniform bindings for camera and environment data
//!
//! Everything shared by all draws in a frame lives in bind group 0: the
//! camera matrices, the environment map and the parameters that say how
//! strongly it shows up in reflections.

use crate::{
    gfx::{camera::camera_utils::CameraUniform, resources::texture_resource::TextureResource},
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Global uniform buffer content structure
///
/// MUST match the `Globals` struct in the shaders exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    inv_view_proj: [[f32; 4]; 4],
    // x: reflection intensity, y: 1.0 when an environment map is bound
    environment: [f32; 4],
}

/// How the environment map contributes to the frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EnvironmentParams {
    pub intensity: f32,
    pub enabled: bool,
}

impl Default for EnvironmentParams {
    fn default() -> Self {
        Self {
            intensity: 0.0,
            enabled: false,
        }
    }
}

impl GlobalUBOContent {
    pub fn new(camera: &CameraUniform, environment: EnvironmentParams) -> Self {
        let enabled = if environment.enabled { 1.0 } else { 0.0 };
        Self {
            view_position: camera.view_position,
            view_proj: camera.view_proj,
            view: camera.view,
            inv_view_proj: camera.inv_view_proj,
            environment: [environment.intensity * enabled, enabled, 0.0, 0.0],
        }
    }
}

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

/// Writes this frame's camera and environment state to the global buffer.
pub fn update_global_ubo(
    ubo: &mut GlobalUBO,
    queue: &wgpu::Queue,
    camera: &CameraUniform,
    environment: EnvironmentParams,
) {
    ubo.update_content(queue, GlobalUBOContent::new(camera, environment));
}

/// Manages the bind group layout and bind group for global data
///
/// Bound to slot 0 in every scene pipeline.
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: Option<wgpu::BindGroup>,
}

impl GlobalBindings {
    /// Sets up the layout; the bind group itself is created by
    /// [`create_bind_group`](Self::create_bind_group).
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform::<GlobalUBOContent>())
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(device, "Globals Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group: None,
        }
    }

    /// (Re)creates the bind group, e.g. after the environment map changed.
    pub fn create_bind_group(
        &mut self,
        device: &wgpu::Device,
        ubo: &GlobalUBO,
        environment: &TextureResource,
    ) {
        self.bind_group = Some(
            BindGroupBuilder::new(&self.bind_group_layout)
                .resource(ubo.binding_resource())
                .texture(&environment.view)
                .sampler(&environment.sampler)
                .create(device, "Global Bind Group"),
        );
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    /// `None` until [`create_bind_group`](Self::create_bind_group) has run.
    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }
}
