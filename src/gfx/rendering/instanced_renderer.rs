//! Per-group instance buffers
//!
//! Every scattered group shares one mesh and one material, so it is drawn
//! with a single instanced call. The model matrices are streamed into a
//! vertex buffer each frame.

use wgpu::{Buffer, Device, Queue};

use crate::gfx::scene::{mesh::DrawMesh, mesh::Mesh, object::SceneObject};

/// Instance data for a single rendered instance
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceData {
    /// Model matrix, column major
    pub transform: [[f32; 4]; 4],
}

impl InstanceData {
    pub fn from_object(object: &SceneObject) -> Self {
        Self {
            transform: object.model_matrix().into(),
        }
    }

    /// Get vertex buffer layout for instance data
    pub fn vertex_buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
            // After position(0) and normal(1)
            2 => Float32x4,
            3 => Float32x4,
            4 => Float32x4,
            5 => Float32x4
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceData>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

/// A fixed-capacity instance buffer for one group
pub struct InstanceBatch {
    instance_buffer: Buffer,
    max_instances: u32,
    current_instance_count: u32,
    scratch: Vec<InstanceData>,
}

impl InstanceBatch {
    pub fn new(device: &Device, max_instances: u32, label: &str) -> Self {
        let max_instances = max_instances.max(1);
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label} Instance Buffer")),
            size: (max_instances as u64) * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            instance_buffer,
            max_instances,
            current_instance_count: 0,
            scratch: Vec::with_capacity(max_instances as usize),
        }
    }

    pub fn capacity(&self) -> u32 {
        self.max_instances
    }

    /// Rewrites the buffer from the objects' current transforms
    pub fn update(&mut self, queue: &Queue, objects: &[SceneObject]) {
        self.scratch.clear();
        self.scratch.extend(
            objects
                .iter()
                .take(self.max_instances as usize)
                .map(InstanceData::from_object),
        );
        self.current_instance_count = self.scratch.len() as u32;

        if self.current_instance_count > 0 {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&self.scratch));
        }
    }

    /// Draws `mesh` once per instance
    pub fn render<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>, mesh: &'a Mesh) {
        if self.current_instance_count == 0 {
            return;
        }
        render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        render_pass.draw_mesh_instanced(mesh, 0..self.current_instance_count);
    }

    pub fn instance_count(&self) -> u32 {
        self.current_instance_count
    }
}
