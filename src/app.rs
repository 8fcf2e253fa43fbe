use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::event::{TouchPhase, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::assets::Photo;
use crate::config::{ConfigError, FieldConfig, DISPLACEMENT_SCALE, TIME_STEP};
use crate::gpu::{FieldTexture, FrameUniforms, GpuContext, PhotoTexture, RenderPipeline};
use crate::simulation::{PointerSource, PointerTracker, VelocityField};

/// Application state
pub struct App {
    config: FieldConfig,
    image_paths: Vec<PathBuf>,
    image_index: usize,
    field: VelocityField,
    pointer: PointerTracker,
    time: f32,
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    field_texture: Option<FieldTexture>,
    photo_texture: Option<PhotoTexture>,
    uniforms: Option<FrameUniforms>,
    render_pipeline: Option<RenderPipeline>,
    bind_group: Option<wgpu::BindGroup>,
    fps_counter: FpsCounter,
}

impl App {
    /// Validate the configuration and allocate the velocity field. GPU
    /// resources are created later, once the event loop hands us a window.
    pub fn new(config: FieldConfig, image_paths: Vec<PathBuf>) -> Result<Self, ConfigError> {
        let field = VelocityField::new(config)?;
        Ok(Self {
            config,
            image_paths,
            image_index: 0,
            field,
            pointer: PointerTracker::new(1.0, 1.0),
            time: 0.0,
            window: None,
            gpu: None,
            field_texture: None,
            photo_texture: None,
            uniforms: None,
            render_pipeline: None,
            bind_group: None,
            fps_counter: FpsCounter::new(),
        })
    }

    /// Load the photo at `image_index`, falling back to the generated
    /// pattern when no paths were supplied.
    fn load_current_photo(&self) -> Photo {
        match self.image_paths.get(self.image_index) {
            Some(path) => match Photo::load(path) {
                Ok(photo) => photo,
                Err(err) => {
                    log::error!("{err}");
                    Photo::checkerboard(1024, 1024)
                }
            },
            None => Photo::checkerboard(1024, 1024),
        }
    }

    /// Swap in a new photo texture and rebuild the bind group around it.
    fn set_photo(&mut self, photo: &Photo) {
        let (Some(gpu), Some(pipeline), Some(field_texture), Some(uniforms)) = (
            self.gpu.as_ref(),
            self.render_pipeline.as_ref(),
            self.field_texture.as_ref(),
            self.uniforms.as_ref(),
        ) else {
            return;
        };
        log::info!("Displaying {}", photo.label);
        let photo_texture = PhotoTexture::new(&gpu.device, &gpu.queue, photo);
        self.bind_group =
            Some(pipeline.create_bind_group(&gpu.device, &photo_texture, field_texture, uniforms));
        self.photo_texture = Some(photo_texture);
    }

    fn render(&mut self) {
        let Some(gpu) = self.gpu.as_ref() else {
            return;
        };

        // Advance the simulation exactly once per rendered frame.
        self.field.tick(self.pointer.state_mut());
        self.time += TIME_STEP;

        if self.field.take_dirty() {
            if let Some(field_texture) = &self.field_texture {
                field_texture.upload(&gpu.queue, self.field.as_slice());
            }
        }

        let image_aspect = self.photo_texture.as_ref().map_or(1.0, |p| p.aspect);
        if let Some(uniforms) = &self.uniforms {
            uniforms.update(
                &gpu.queue,
                (gpu.config.width as f32, gpu.config.height as f32),
                image_aspect,
                self.time,
                DISPLACEMENT_SCALE,
            );
        }

        let output = match gpu.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                log::error!("Surface error: {:?}", e);
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        if let (Some(pipeline), Some(bind_group)) = (&self.render_pipeline, &self.bind_group) {
            pipeline.draw(&mut encoder, &view, bind_group);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if let Some(fps) = self.fps_counter.tick() {
            if let Some(window) = &self.window {
                window.set_title(&format!("Warpfield - {:.0} FPS", fps));
            }
        }
    }

    fn handle_key(&mut self, key_code: KeyCode) {
        match key_code {
            // Cycle through the supplied images.
            KeyCode::Tab | KeyCode::ArrowRight => {
                if self.image_paths.len() > 1 {
                    self.image_index = (self.image_index + 1) % self.image_paths.len();
                    log::info!("Switching to image {}", self.image_index + 1);
                    let photo = self.load_current_photo();
                    self.set_photo(&photo);
                }
            }
            KeyCode::ArrowLeft => {
                if self.image_paths.len() > 1 {
                    self.image_index =
                        (self.image_index + self.image_paths.len() - 1) % self.image_paths.len();
                    log::info!("Switching to image {}", self.image_index + 1);
                    let photo = self.load_current_photo();
                    self.set_photo(&photo);
                }
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        log::info!("Initializing warpfield...");
        log::info!(
            "Field grid: {}x{}, decay {}, radius W/{}, amplification {}",
            self.config.grid_width,
            self.config.grid_height,
            self.config.decay,
            self.config.radius_divisor,
            self.config.amplification
        );

        let window_attrs = Window::default_attributes()
            .with_title("Warpfield")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 800));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .expect("Failed to create window"),
        );

        log::info!("Creating GPU context...");
        let gpu = match pollster::block_on(GpuContext::new(window.clone())) {
            Ok(gpu) => gpu,
            Err(err) => {
                log::error!("GPU setup failed: {err}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.pointer
            .set_viewport(size.width as f32, size.height as f32);

        log::info!("Creating render pipeline...");
        let render_pipeline = RenderPipeline::new(&gpu.device, gpu.format());

        let field_texture =
            FieldTexture::new(&gpu.device, self.field.width(), self.field.height());
        field_texture.upload(&gpu.queue, self.field.as_slice());
        self.field.take_dirty();

        let uniforms = FrameUniforms::new(&gpu.device);

        let photo = self.load_current_photo();
        log::info!("Displaying {}", photo.label);
        let photo_texture = PhotoTexture::new(&gpu.device, &gpu.queue, &photo);
        let bind_group =
            render_pipeline.create_bind_group(&gpu.device, &photo_texture, &field_texture, &uniforms);

        log::info!("Initialization complete!");
        log::info!("Controls:");
        log::info!("  Move the mouse (or drag a finger) to distort the image");
        log::info!("  Tab / Arrow keys: Cycle images");
        log::info!("  Escape: Quit");

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.field_texture = Some(field_texture);
        self.photo_texture = Some(photo_texture);
        self.uniforms = Some(uniforms);
        self.render_pipeline = Some(render_pipeline);
        self.bind_group = Some(bind_group);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting...");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed() {
                    if let PhysicalKey::Code(key_code) = event.physical_key {
                        if key_code == KeyCode::Escape {
                            log::info!("Escape pressed, exiting...");
                            event_loop.exit();
                        } else {
                            self.handle_key(key_code);
                        }
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer
                    .handle_event(PointerSource::Mouse, position.x, position.y);
            }
            WindowEvent::Touch(touch) => {
                if matches!(touch.phase, TouchPhase::Started | TouchPhase::Moved) {
                    self.pointer.handle_event(
                        PointerSource::Touch,
                        touch.location.x,
                        touch.location.y,
                    );
                }
            }
            WindowEvent::Resized(new_size) => {
                // Display parameters only; the field grid never resizes.
                if let Some(gpu) = &mut self.gpu {
                    log::info!("Window resized to {}x{}", new_size.width, new_size.height);
                    gpu.resize(new_size);
                }
                self.pointer
                    .set_viewport(new_size.width as f32, new_size.height as f32);
            }
            WindowEvent::RedrawRequested => {
                self.render();
                // Request another frame immediately
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Simple FPS counter
struct FpsCounter {
    last_update: Instant,
    frame_count: u32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last_update: Instant::now(),
            frame_count: 0,
        }
    }

    /// Tick the counter, returns Some(fps) every second
    fn tick(&mut self) -> Option<f64> {
        self.frame_count += 1;
        let elapsed = self.last_update.elapsed();

        if elapsed.as_secs_f64() >= 1.0 {
            let fps = self.frame_count as f64 / elapsed.as_secs_f64();
            self.frame_count = 0;
            self.last_update = Instant::now();
            Some(fps)
        } else {
            None
        }
    }
}
