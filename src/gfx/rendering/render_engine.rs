//! WGPU-based rendering engine
//!
//! The scene is drawn into an offscreen color target sized by the
//! [`Viewport`]'s drawing buffer (logical size times the clamped pixel
//! ratio) and then blitted onto the window surface. Per frame:
//!
//! 1. background pass: the equirectangular environment, if loaded
//! 2. matcap pass: one instanced draw per object group, then the text
//! 3. blit pass: drawing buffer onto the surface texture

use std::sync::Arc;
use wgpu::{CompareFunction, Device, TextureFormat};

use crate::{
    assets::DecodedImage,
    config::AssetConfig,
    error::{BaubleError, Result},
    gfx::{
        resources::{
            global_bindings::{update_global_ubo, EnvironmentParams, GlobalBindings, GlobalUBO},
            material::MaterialBindings,
            texture_resource::{fits_texture_limits, TextureResource},
        },
        scene::{scene::Scene, vertex::Vertex3D},
    },
    wgpu_utils::{binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
};

use super::instanced_renderer::{InstanceBatch, InstanceData};
use super::pipeline_manager::{PipelineConfig, PipelineManager};
use super::viewport::Viewport;

/// Format of the offscreen drawing buffer.
pub const COLOR_FORMAT: TextureFormat = TextureFormat::Rgba8UnormSrgb;

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    viewport: Viewport,
    color_target: TextureResource,
    depth_texture: TextureResource,
    blit_layout: BindGroupLayoutWithDesc,
    blit_bind_group: wgpu::BindGroup,
    pub pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    material_bindings: MaterialBindings,
    environment_texture: TextureResource,
    environment_revision: u64,
    environment: EnvironmentParams,
    environment_intensity: f32,
    group_batches: Vec<InstanceBatch>,
    text_batch: Option<InstanceBatch>,
    clear_color: wgpu::Color,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// `surface_size` is the window's physical size; the offscreen buffers
    /// follow `viewport` instead.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        surface_size: (u32, u32),
        viewport: Viewport,
        assets: &AssetConfig,
    ) -> Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits::downlevel_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;
        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or(BaubleError::UnsupportedSurface)?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: surface_size.0.max(1),
            height: surface_size.1.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!(
            "surface configured: {}x{} {:?} on {}",
            config.width,
            config.height,
            format,
            adapter.get_info().name
        );

        let (buffer_width, buffer_height) = clamp_to_limits(&device, viewport.drawing_buffer_size());
        let color_target = TextureResource::create_render_target(
            &device,
            buffer_width,
            buffer_height,
            COLOR_FORMAT,
            "Drawing Buffer",
        );
        let depth_texture =
            TextureResource::create_depth_texture(&device, buffer_width, buffer_height, "Depth Buffer");

        let blit_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(&device, "Blit Bind Group Layout");
        let blit_bind_group = create_blit_bind_group(&device, &blit_layout, &color_target);

        let global_ubo = GlobalUBO::new(&device);
        let mut global_bindings = GlobalBindings::new(&device);
        let environment_texture = TextureResource::from_image(
            &device,
            &queue,
            &DecodedImage::solid([0, 0, 0, 255]),
            "Environment Placeholder",
        );
        global_bindings.create_bind_group(&device, &global_ubo, &environment_texture);

        let material_bindings = MaterialBindings::new(&device);

        let mut pipeline_manager = PipelineManager::new(device.clone());
        register_pipelines(
            &mut pipeline_manager,
            &global_bindings,
            &material_bindings,
            &blit_layout.layout,
            format,
        );
        pipeline_manager
            .create_all_pipelines()
            .map_err(BaubleError::Pipeline)?;

        let [r, g, b] = assets.clear_color;

        Ok(Self {
            surface,
            device,
            queue,
            config,
            viewport,
            color_target,
            depth_texture,
            blit_layout,
            blit_bind_group,
            pipeline_manager,
            global_ubo,
            global_bindings,
            material_bindings,
            environment_texture,
            environment_revision: 0,
            environment: EnvironmentParams::default(),
            environment_intensity: assets.environment_intensity,
            group_batches: Vec::new(),
            text_batch: None,
            clear_color: wgpu::Color { r, g, b, a: 1.0 },
        })
    }

    /// Brings GPU state in line with the scene before drawing.
    ///
    /// Uploads meshes and materials that are new or changed, swaps in a
    /// newly loaded environment map, streams instance transforms and writes
    /// the global uniforms.
    pub fn update(&mut self, scene: &mut Scene) {
        scene.init_gpu_resources(&self.device, &self.queue, &self.material_bindings);
        self.sync_environment(scene);

        for (index, group) in scene.groups().iter().enumerate() {
            if index == self.group_batches.len() {
                self.group_batches.push(InstanceBatch::new(
                    &self.device,
                    group.len() as u32,
                    group.kind.label(),
                ));
            }
            self.group_batches[index].update(&self.queue, group.objects());
        }

        if let Some(text) = scene.text() {
            let batch = self
                .text_batch
                .get_or_insert_with(|| InstanceBatch::new(&self.device, 1, "Text"));
            batch.update(&self.queue, std::slice::from_ref(&text.object));
        }

        update_global_ubo(
            &mut self.global_ubo,
            &self.queue,
            &scene.camera_manager.camera.uniform,
            self.environment,
        );
    }

    fn sync_environment(&mut self, scene: &Scene) {
        let environment = scene.environment();
        if environment.revision() == self.environment_revision {
            return;
        }
        self.environment_revision = environment.revision();

        let Some(image) = environment.image() else {
            return;
        };

        let max_side = self.device.limits().max_texture_dimension_2d;
        if !fits_texture_limits(image, max_side) {
            log::warn!(
                "environment map {}x{} exceeds the {} texel limit, keeping the clear color",
                image.width,
                image.height,
                max_side
            );
            return;
        }

        self.environment_texture =
            TextureResource::from_image(&self.device, &self.queue, image, "Environment Map");
        self.global_bindings
            .create_bind_group(&self.device, &self.global_ubo, &self.environment_texture);
        self.environment = EnvironmentParams {
            intensity: self.environment_intensity,
            enabled: true,
        };
        log::debug!("environment map uploaded: {}x{}", image.width, image.height);
    }

    /// Draws one frame and presents it.
    ///
    /// Surface errors are handed back so the caller can reconfigure on
    /// `Lost`/`Outdated` and stop on `OutOfMemory`.
    pub fn render_frame(&mut self, scene: &Scene) -> std::result::Result<(), wgpu::SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.color_target.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(globals) = self.global_bindings.bind_group() {
                render_pass.set_bind_group(0, globals, &[]);

                if self.environment.enabled {
                    if let Some(pipeline) = self.pipeline_manager.get_pipeline("Background") {
                        render_pass.set_pipeline(pipeline);
                        render_pass.draw(0..3, 0..1);
                    }
                }

                if let Some(pipeline) = self.pipeline_manager.get_pipeline("Matcap") {
                    render_pass.set_pipeline(pipeline);

                    for (group, batch) in scene.groups().iter().zip(&self.group_batches) {
                        let (Some(mesh), Some(material)) =
                            (scene.mesh(group.geometry), scene.material(group.material))
                        else {
                            continue;
                        };
                        if let Some(material_bind_group) = material.bind_group() {
                            render_pass.set_bind_group(1, material_bind_group, &[]);
                            batch.render(&mut render_pass, mesh);
                        }
                    }

                    if let (Some(text), Some(batch)) = (scene.text(), &self.text_batch) {
                        let mesh = scene.mesh(text.geometry);
                        let material = scene.material(text.material).and_then(|m| m.bind_group());
                        if let (Some(mesh), Some(material_bind_group)) = (mesh, material) {
                            render_pass.set_bind_group(1, material_bind_group, &[]);
                            batch.render(&mut render_pass, mesh);
                        }
                    }
                }
            }
        }

        {
            let mut blit_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Blit Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(pipeline) = self.pipeline_manager.get_pipeline("Blit") {
                blit_pass.set_pipeline(pipeline);
                blit_pass.set_bind_group(0, &self.blit_bind_group, &[]);
                blit_pass.draw(0..3, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Applies a new window size.
    ///
    /// `surface_width`/`surface_height` are physical pixels; the drawing
    /// buffer is rebuilt from `viewport`. Zero-sized surfaces are ignored.
    pub fn resize(&mut self, surface_width: u32, surface_height: u32, viewport: Viewport) {
        if surface_width == 0 || surface_height == 0 {
            return;
        }

        self.config.width = surface_width;
        self.config.height = surface_height;
        self.surface.configure(&self.device, &self.config);

        if viewport.drawing_buffer_size() != self.viewport.drawing_buffer_size() {
            let (width, height) = clamp_to_limits(&self.device, viewport.drawing_buffer_size());
            self.color_target = TextureResource::create_render_target(
                &self.device,
                width,
                height,
                COLOR_FORMAT,
                "Drawing Buffer",
            );
            self.depth_texture =
                TextureResource::create_depth_texture(&self.device, width, height, "Depth Buffer");
            self.blit_bind_group =
                create_blit_bind_group(&self.device, &self.blit_layout, &self.color_target);
        }
        self.viewport = viewport;

        log::debug!(
            "resized: surface {}x{}, drawing buffer {:?} at pixel ratio {}",
            surface_width,
            surface_height,
            self.viewport.drawing_buffer_size(),
            self.viewport.pixel_ratio()
        );
    }

    /// Reconfigures the surface at its current size, e.g. after it was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }
}

fn register_pipelines(
    pipeline_manager: &mut PipelineManager,
    global_bindings: &GlobalBindings,
    material_bindings: &MaterialBindings,
    blit_layout: &wgpu::BindGroupLayout,
    surface_format: TextureFormat,
) {
    pipeline_manager.load_shader("background", include_str!("shaders/background.wgsl"));
    pipeline_manager.load_shader("matcap", include_str!("shaders/matcap.wgsl"));
    pipeline_manager.load_shader("blit", include_str!("shaders/blit.wgsl"));

    // Drawn first without depth writes, so every mesh lands in front of it
    pipeline_manager.register_pipeline(
        "Background",
        PipelineConfig::default()
            .with_label("Background Pipeline")
            .with_shader("background")
            .with_bind_group_layouts(vec![global_bindings.bind_group_layout().clone()])
            .with_no_vertex_buffers()
            .with_cull_mode(None)
            .with_depth(TextureResource::DEPTH_FORMAT, false, CompareFunction::Always)
            .with_color_format(COLOR_FORMAT),
    );

    // Text caps and scattered meshes are seen from both sides
    pipeline_manager.register_pipeline(
        "Matcap",
        PipelineConfig::default()
            .with_label("Matcap Pipeline")
            .with_shader("matcap")
            .with_bind_group_layouts(vec![
                global_bindings.bind_group_layout().clone(),
                material_bindings.bind_group_layout().clone(),
            ])
            .with_vertex_buffers(vec![Vertex3D::desc(), InstanceData::vertex_buffer_layout()])
            .with_cull_mode(None)
            .with_depth(TextureResource::DEPTH_FORMAT, true, CompareFunction::Less)
            .with_color_format(COLOR_FORMAT),
    );

    pipeline_manager.register_pipeline(
        "Blit",
        PipelineConfig::default()
            .with_label("Blit Pipeline")
            .with_shader("blit")
            .with_bind_group_layouts(vec![blit_layout.clone()])
            .with_no_vertex_buffers()
            .with_cull_mode(None)
            .with_color_format(surface_format),
    );
}

fn create_blit_bind_group(
    device: &Device,
    layout: &BindGroupLayoutWithDesc,
    source: &TextureResource,
) -> wgpu::BindGroup {
    BindGroupBuilder::new(layout)
        .texture(&source.view)
        .sampler(&source.sampler)
        .create(device, "Blit Bind Group")
}

fn clamp_to_limits(device: &Device, (width, height): (u32, u32)) -> (u32, u32) {
    let max_side = device.limits().max_texture_dimension_2d;
    (width.clamp(1, max_side), height.clamp(1, max_side))
}
