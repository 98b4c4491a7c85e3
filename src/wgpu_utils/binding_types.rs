//! Shorthands for the binding types the scene's layouts are built from

/// Uniform buffer binding holding one `T`.
///
/// The minimum binding size lets wgpu validate the bound buffer when the
/// bind group is created instead of at draw time.
pub fn uniform<T>() -> wgpu::BindingType {
    wgpu::BindingType::Buffer {
        ty: wgpu::BufferBindingType::Uniform,
        has_dynamic_offset: false,
        min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<T>() as u64),
    }
}

pub fn sampler(filtering: wgpu::SamplerBindingType) -> wgpu::BindingType {
    wgpu::BindingType::Sampler(filtering)
}

/// Filterable float 2D texture, as every color image here is.
pub fn texture_2d() -> wgpu::BindingType {
    wgpu::BindingType::Texture {
        sample_type: wgpu::TextureSampleType::Float { filterable: true },
        view_dimension: wgpu::TextureViewDimension::D2,
        multisampled: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_carries_its_size() {
        match uniform::<[f32; 4]>() {
            wgpu::BindingType::Buffer {
                min_binding_size, ..
            } => assert_eq!(min_binding_size.map(|s| s.get()), Some(16)),
            other => panic!("unexpected binding {other:?}"),
        }
    }
}
