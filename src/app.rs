use std::sync::Arc;

use rand::{rngs::StdRng, SeedableRng};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    animation::AnimationDriver,
    assembler::SceneAssembler,
    assets::AssetLoader,
    config::SceneConfig,
    error::Result,
    gfx::{
        camera::{camera_utils::CameraManager, orbit_camera::OrbitCamera, orbit_controls::OrbitControls},
        rendering::{render_engine::RenderEngine, viewport::Viewport},
        scene::Scene,
    },
};

/// Window, renderer and scene wired to a winit event loop.
pub struct BaubleApp {
    event_loop: EventLoop<()>,
    app_state: AppState,
}

struct AppState {
    config: SceneConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    viewport: Viewport,
    scene: Scene,
    assembler: SceneAssembler,
    loader: AssetLoader,
    driver: AnimationDriver,
}

impl BaubleApp {
    /// Builds the scene from `config`; asset loads start once the window exists.
    pub fn new(config: SceneConfig) -> Result<Self> {
        let event_loop = EventLoop::new()?;

        let viewport = Viewport::new(config.window.width, config.window.height, 1.0);
        let camera = OrbitCamera::from_config(&config.camera, &config.controls, viewport.aspect());
        let controls = OrbitControls::new(&config.controls);
        let mut scene = Scene::new(CameraManager::new(camera, controls));

        let mut rng = match config.scatter.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut assembler = SceneAssembler::new(&config);
        assembler.populate(&mut scene, &mut rng);

        Ok(Self {
            event_loop,
            app_state: AppState {
                config,
                window: None,
                render_engine: None,
                viewport,
                scene,
                assembler,
                loader: AssetLoader::new(),
                driver: AnimationDriver::new(),
            },
        })
    }

    /// Resolves relative asset paths against `root` instead of the working
    /// directory.
    pub fn with_asset_root(mut self, root: impl Into<std::path::PathBuf>) -> Self {
        self.app_state.loader = AssetLoader::with_root(root);
        self
    }

    /// Run the application (consumes self and starts the event loop)
    pub fn run(mut self) -> Result<()> {
        self.event_loop.set_control_flow(ControlFlow::Wait);
        self.event_loop.run_app(&mut self.app_state)?;
        Ok(())
    }
}

impl AppState {
    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(render_engine), Some(window)) = (self.render_engine.as_mut(), self.window.as_ref())
        else {
            return;
        };

        self.assembler.poll(&mut self.scene);
        self.driver.tick(&mut self.scene);
        render_engine.update(&mut self.scene);

        match render_engine.render_frame(&self.scene) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost, reconfiguring");
                render_engine.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("out of GPU memory, exiting");
                event_loop.exit();
                return;
            }
            Err(err) => log::warn!("dropped frame: {err}"),
        }

        window.request_redraw();
    }

    fn resize(&mut self) {
        let (Some(render_engine), Some(window)) = (self.render_engine.as_mut(), self.window.as_ref())
        else {
            return;
        };

        let size = window.inner_size();
        if !self.viewport.resize_physical(size, window.scale_factor()) {
            return;
        }

        let (width, height) = self.viewport.logical_size();
        self.scene
            .camera_manager
            .camera
            .resize_projection(width, height);
        render_engine.resize(size.width, size.height, self.viewport);
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = WindowAttributes::default()
            .with_title(self.config.window.title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.viewport = Viewport::from_physical(size, window.scale_factor());
        self.scene
            .camera_manager
            .camera
            .resize_projection(self.viewport.logical_size().0, self.viewport.logical_size().1);

        let renderer = pollster::block_on(RenderEngine::new(
            window.clone(),
            (size.width, size.height),
            self.viewport,
            &self.config.assets,
        ));
        match renderer {
            Ok(renderer) => self.render_engine = Some(renderer),
            Err(err) => {
                log::error!("failed to initialize renderer: {err}");
                event_loop.exit();
                return;
            }
        }

        self.assembler.start_loads(&self.loader, &self.config.assets);
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let (_, viewport_height) = self.viewport.logical_size();
        let camera_manager = &mut self.scene.camera_manager;
        if camera_manager.controls.process_window_event(
            &event,
            viewport_height as f32,
            &camera_manager.camera,
        ) {
            if let Some(window) = self.window.as_ref() {
                window.request_redraw();
            }
            return;
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            }
            | WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                self.resize();
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => (),
        }
    }
}
