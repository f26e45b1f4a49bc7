use anyhow::Result;
use clap::Parser;
use egui::Context as EguiContext;
use flagline_common::{SceneConfig, WindParams};
use flagline_render::{DebugTextRenderer, RenderView, Renderer};
use flagline_render_wgpu::{SceneCamera, WgpuRenderer};
use flagline_scene::{AnimationClock, FlagScene};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "flagline-desktop", about = "Animated prayer-flag line renderer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene configuration file (YAML); defaults to the built-in scene
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Application state.
struct AppState {
    scene: FlagScene,
    clock: AnimationClock,
    show_inspector: bool,
    last_frame: Instant,
    frame_ms: f32,
}

impl AppState {
    fn new(scene: FlagScene) -> Self {
        Self {
            scene,
            clock: AnimationClock::new(),
            show_inspector: false,
            last_frame: Instant::now(),
            frame_ms: 0.0,
        }
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if !pressed {
            return;
        }
        match key {
            KeyCode::F1 => {
                self.show_inspector = !self.show_inspector;
            }
            KeyCode::Space => {
                self.clock.toggle_pause();
                tracing::info!(paused = self.clock.is_paused(), "animation clock toggled");
            }
            _ => {}
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_inspector {
            return;
        }

        egui::SidePanel::left("inspector")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Flagline");
                ui.separator();
                ui.label(format!("t: {:.2}s", self.scene.time()));
                ui.label(format!("frame: {:.1} ms", self.frame_ms));

                let mut paused = self.clock.is_paused();
                if ui.checkbox(&mut paused, "Pause (Space)").changed() {
                    self.clock.toggle_pause();
                }

                ui.separator();
                ui.heading("Wind");
                let mut wind = self.scene.config().wind;
                let before = wind;
                ui.horizontal(|ui| {
                    ui.label("gust");
                    ui.add(egui::DragValue::new(&mut wind.gust_amplitude).speed(0.005));
                    ui.add(egui::DragValue::new(&mut wind.gust_speed).speed(0.05));
                });
                ui.horizontal(|ui| {
                    ui.label("ripple");
                    ui.add(egui::DragValue::new(&mut wind.ripple_amplitude).speed(0.005));
                    ui.add(egui::DragValue::new(&mut wind.ripple_speed).speed(0.05));
                });
                ui.horizontal(|ui| {
                    ui.label("cross");
                    ui.add(egui::DragValue::new(&mut wind.cross_amplitude).speed(0.005));
                    ui.add(egui::DragValue::new(&mut wind.cross_speed).speed(0.05));
                });
                ui.horizontal(|ui| {
                    ui.label("sway");
                    ui.add(egui::DragValue::new(&mut wind.sway_amplitude).speed(0.002));
                    ui.add(egui::DragValue::new(&mut wind.sway_speed).speed(0.05));
                });
                if wind != before {
                    self.scene.set_wind(wind);
                }
                if ui.button("Reset wind").clicked() {
                    self.scene.set_wind(WindParams::default());
                }

                ui.separator();
                ui.heading("Flags");
                for (i, flag) in self.scene.flags().iter().enumerate() {
                    ui.label(format!(
                        "{i}: x={:+.2} phase={:.2}",
                        flag.x_offset(),
                        flag.phase()
                    ));
                }

                ui.separator();
                ui.small("F1: Toggle Inspector | Space: Pause");
            });
    }
}

struct GpuApp {
    state: AppState,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    config: Option<wgpu::SurfaceConfiguration>,
    renderer: Option<WgpuRenderer>,
    camera: Option<SceneCamera>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
}

impl GpuApp {
    fn new(scene: FlagScene) -> Self {
        Self {
            state: AppState::new(scene),
            window: None,
            surface: None,
            device: None,
            queue: None,
            config: None,
            renderer: None,
            camera: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("Flagline")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).expect("create window"));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .expect("create surface");

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("find adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("flagline_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .expect("create device");

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let camera = SceneCamera::from_pose(self.state.scene.camera(), size.width, size.height);
        let renderer = WgpuRenderer::new(
            &device,
            surface_format,
            size.width,
            size.height,
            &self.state.scene,
        );

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        self.window = Some(window);
        self.surface = Some(surface);
        self.device = Some(device);
        self.queue = Some(queue);
        self.config = Some(config);
        self.renderer = Some(renderer);
        self.camera = Some(camera);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(egui_winit) = &mut self.egui_winit {
            let response = egui_winit.on_window_event(self.window.as_ref().unwrap(), &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let (Some(surface), Some(device), Some(config)) =
                    (&self.surface, &self.device, &mut self.config)
                {
                    config.width = new_size.width.max(1);
                    config.height = new_size.height.max(1);
                    surface.configure(device, config);
                    if let Some(camera) = &mut self.camera {
                        camera.set_aspect(config.width, config.height);
                    }
                    if let Some(renderer) = &mut self.renderer {
                        renderer.resize(device, config.width, config.height);
                    }
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                if key == KeyCode::Escape {
                    event_loop.exit();
                    return;
                }
                self.state
                    .handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                self.state.frame_ms =
                    (now - self.state.last_frame).as_secs_f32().min(0.1) * 1000.0;
                self.state.last_frame = now;

                // Deform every flag for this frame's elapsed time before
                // anything is submitted.
                let t = self.state.clock.elapsed();
                self.state.scene.advance(t);

                let (Some(surface), Some(device), Some(queue)) =
                    (&self.surface, &self.device, &self.queue)
                else {
                    return;
                };

                let output = match surface.get_current_texture() {
                    Ok(t) => t,
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        if let Some(config) = &self.config {
                            surface.configure(device, config);
                        }
                        return;
                    }
                    Err(e) => {
                        tracing::error!("surface error: {e}");
                        return;
                    }
                };

                let view = output
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());

                if let (Some(renderer), Some(camera)) = (&self.renderer, &self.camera) {
                    renderer.render(device, queue, &view, camera, &self.state.scene);
                }

                let raw_input = self
                    .egui_winit
                    .as_mut()
                    .unwrap()
                    .take_egui_input(self.window.as_ref().unwrap());
                let full_output = self.egui_ctx.run(raw_input, |ctx| {
                    self.state.draw_ui(ctx);
                });

                self.egui_winit.as_mut().unwrap().handle_platform_output(
                    self.window.as_ref().unwrap(),
                    full_output.platform_output,
                );

                let paint_jobs = self
                    .egui_ctx
                    .tessellate(full_output.shapes, full_output.pixels_per_point);

                let screen_descriptor = egui_wgpu::ScreenDescriptor {
                    size_in_pixels: [
                        self.config.as_ref().unwrap().width,
                        self.config.as_ref().unwrap().height,
                    ],
                    pixels_per_point: full_output.pixels_per_point,
                };

                {
                    let egui_renderer = self.egui_renderer.as_mut().unwrap();
                    for (id, image_delta) in &full_output.textures_delta.set {
                        egui_renderer.update_texture(device, queue, *id, image_delta);
                    }
                    let mut encoder =
                        device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                            label: Some("egui_encoder"),
                        });
                    egui_renderer.update_buffers(
                        device,
                        queue,
                        &mut encoder,
                        &paint_jobs,
                        &screen_descriptor,
                    );
                    {
                        let mut pass = encoder
                            .begin_render_pass(&wgpu::RenderPassDescriptor {
                                label: Some("egui_pass"),
                                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                                    view: &view,
                                    resolve_target: None,
                                    ops: wgpu::Operations {
                                        load: wgpu::LoadOp::Load,
                                        store: wgpu::StoreOp::Store,
                                    },
                                })],
                                depth_stencil_attachment: None,
                                ..Default::default()
                            })
                            .forget_lifetime();
                        egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
                    }
                    queue.submit(std::iter::once(encoder.finish()));
                    for id in &full_output.textures_delta.free {
                        egui_renderer.free_texture(id);
                    }
                }

                output.present();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("flagline-desktop starting");

    let config = match &cli.config {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };
    let scene = FlagScene::new(config)?;
    tracing::debug!(
        "\n{}",
        DebugTextRenderer::new().render(&scene, &RenderView::from(*scene.camera()))
    );

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(scene);
    event_loop.run_app(&mut app)?;

    Ok(())
}
