//! Matcap materials
//!
//! A material is a tint plus a matcap texture. The texture is swapped in
//! when its asynchronous load completes, so every change bumps a revision
//! that tells the GPU side to rebuild its bind group.

use std::sync::Arc;

use wgpu::Device;

use super::texture_resource::{fits_texture_limits, TextureResource};
use crate::assets::DecodedImage;
use crate::wgpu_utils::{
    binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc,
    UniformBuffer,
};

/// GPU uniform data for materials
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub tint: [f32; 4],
}

type MaterialUBO = UniformBuffer<MaterialUniform>;

/// Bind group layout shared by every material: tint, matcap, sampler.
pub struct MaterialBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    sampler: wgpu::Sampler,
}

impl MaterialBindings {
    pub fn new(device: &Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::uniform::<MaterialUniform>())
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(device, "Material Bind Group Layout");

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Matcap Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        MaterialBindings {
            bind_group_layout,
            sampler,
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }
}

struct MaterialGpu {
    ubo: MaterialUBO,
    _matcap: TextureResource,
    bind_group: wgpu::BindGroup,
    revision: u64,
}

pub struct Material {
    pub name: String,
    tint: [f32; 4],
    matcap: Option<Arc<DecodedImage>>,
    revision: u64,
    gpu: Option<MaterialGpu>,
}

impl Material {
    /// Mid-grey matcap used until a real one arrives.
    pub const PLACEHOLDER_MATCAP: [u8; 4] = [200, 200, 200, 255];

    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tint: [1.0, 1.0, 1.0, 1.0],
            matcap: None,
            revision: 0,
            gpu: None,
        }
    }

    pub fn with_tint(mut self, tint: [f32; 4]) -> Self {
        self.tint = tint;
        self
    }

    pub fn tint(&self) -> [f32; 4] {
        self.tint
    }

    pub fn set_tint(&mut self, tint: [f32; 4]) {
        self.tint = tint;
        self.revision += 1;
    }

    pub fn matcap(&self) -> Option<&Arc<DecodedImage>> {
        self.matcap.as_ref()
    }

    pub fn set_matcap(&mut self, matcap: Arc<DecodedImage>) {
        self.matcap = Some(matcap);
        self.revision += 1;
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// True when the GPU copy is missing or older than the material.
    pub fn needs_sync(&self) -> bool {
        self.gpu
            .as_ref()
            .map_or(true, |gpu| gpu.revision != self.revision)
    }

    /// Creates or refreshes the uniform buffer, texture and bind group.
    pub fn sync_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        bindings: &MaterialBindings,
    ) {
        if !self.needs_sync() {
            return;
        }

        let placeholder = DecodedImage::solid(Self::PLACEHOLDER_MATCAP);
        let image = self.matcap_for_upload(device.limits().max_texture_dimension_2d);
        let image = image.unwrap_or(&placeholder);
        let matcap = TextureResource::from_image(device, queue, image, &format!("{} Matcap", self.name));

        let mut ubo = match self.gpu.take() {
            Some(gpu) => gpu.ubo,
            None => MaterialUBO::new(device),
        };
        ubo.update_content(queue, MaterialUniform { tint: self.tint });

        let bind_group = BindGroupBuilder::new(&bindings.bind_group_layout)
            .resource(ubo.binding_resource())
            .texture(&matcap.view)
            .sampler(&bindings.sampler)
            .create(device, &format!("{} Material Bind Group", self.name));

        self.gpu = Some(MaterialGpu {
            ubo,
            _matcap: matcap,
            bind_group,
            revision: self.revision,
        });
    }

    /// The matcap to upload, or `None` when the placeholder should be used
    /// instead because none is set or it exceeds `max_side`.
    fn matcap_for_upload(&self, max_side: u32) -> Option<&DecodedImage> {
        let matcap = self.matcap.as_deref()?;
        if fits_texture_limits(matcap, max_side) {
            return Some(matcap);
        }
        log::warn!(
            "matcap for {} is {}x{}, above the {} texel limit, keeping the placeholder",
            self.name,
            matcap.width,
            matcap.height,
            max_side
        );
        None
    }

    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu.as_ref().map(|gpu| &gpu.bind_group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_material_needs_upload() {
        let material = Material::new("matcap");
        assert!(material.needs_sync());
        assert!(material.matcap().is_none());
        assert!(material.bind_group().is_none());
    }

    #[test]
    fn changes_bump_revision() {
        let mut material = Material::new("matcap").with_tint([1.0, 0.5, 0.5, 1.0]);
        assert_eq!(material.revision(), 0);
        material.set_matcap(Arc::new(DecodedImage::solid([1, 2, 3, 255])));
        material.set_tint([1.0; 4]);
        assert_eq!(material.revision(), 2);
        assert_eq!(material.matcap().unwrap().pixels, vec![1, 2, 3, 255]);
    }

    #[test]
    fn oversized_matcap_falls_back_to_placeholder() {
        let mut material = Material::new("matcap");
        assert!(material.matcap_for_upload(4096).is_none());

        material.set_matcap(Arc::new(DecodedImage {
            width: 4,
            height: 2,
            pixels: vec![255; 4 * 2 * 4],
        }));
        assert_eq!(material.matcap_for_upload(4).map(|m| m.width), Some(4));
        assert!(material.matcap_for_upload(3).is_none());
    }
}
