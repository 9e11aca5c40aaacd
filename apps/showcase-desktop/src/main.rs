use anyhow::{Context as _, Result, anyhow};
use clap::Parser;
use egui::Context as EguiContext;
use showcase_assets::AssetLoader;
use showcase_panel::ParameterPanel;
use showcase_render::{DebugTextRenderer, Renderer};
use showcase_render_wgpu::{FrameState, WgpuRenderer};
use showcase_scene::SceneState;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Longest frame step fed to animations; larger gaps (window drag, breakpoint)
/// are treated as this.
const MAX_FRAME_DT: f32 = 0.1;
/// How long headless runs wait for the font before ticking.
const HEADLESS_FONT_WAIT: Duration = Duration::from_secs(2);

#[derive(Parser)]
#[command(name = "showcase-desktop", about = "Matcap geometry showcase")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Initial window width in logical pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Initial window height in logical pixels
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Run without a window and print the scene as text
    #[arg(long)]
    headless: bool,

    /// Number of ticks to run in headless mode
    #[arg(long, default_value_t = 60)]
    frames: u32,
}

fn frame_dt(last: Instant, now: Instant) -> f32 {
    (now - last).as_secs_f32().min(MAX_FRAME_DT)
}

fn is_left_release(event: &WindowEvent) -> bool {
    matches!(
        event,
        WindowEvent::MouseInput {
            button: MouseButton::Left,
            state: ElementState::Released,
            ..
        }
    )
}

/// Application state shared by the windowed and headless runs.
struct AppState {
    scene: SceneState,
    frame: FrameState,
    panel: ParameterPanel,
    last_frame: Instant,
    dragging: bool,
}

impl AppState {
    fn new(width: u32, height: u32, device_pixel_ratio: f32) -> Self {
        Self {
            scene: SceneState::load(AssetLoader::default()),
            frame: FrameState::new(width, height, device_pixel_ratio),
            panel: ParameterPanel::new(),
            last_frame: Instant::now(),
            dragging: false,
        }
    }

    /// One render-loop tick before drawing: scene animation, then camera damping.
    fn tick(&mut self, dt: f32) {
        self.scene.update(dt);
        self.frame.camera.update();
    }

    /// Apply a window resize and return the drawing-buffer size.
    fn resize(&mut self, physical: PhysicalSize<u32>, scale_factor: f64) -> (u32, u32) {
        let logical: LogicalSize<f64> = physical.to_logical(scale_factor);
        self.frame.resize(
            logical.width.round() as u32,
            logical.height.round() as u32,
            scale_factor as f32,
        );
        self.frame.viewport.drawing_buffer_size()
    }

    fn end_drag_on_release(&mut self, event: &WindowEvent) {
        if is_left_release(event) {
            self.dragging = false;
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        if key == KeyCode::KeyH {
            self.panel.toggle_visible();
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        for action in self.panel.draw(ctx, &self.scene) {
            action.apply(&mut self.scene);
        }
    }
}

/// Window plus everything that only exists once a GPU surface does.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(
        event_loop: &ActiveEventLoop,
        egui_ctx: &EguiContext,
        state: &mut AppState,
    ) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Geometry Showcase")
            .with_inner_size(LogicalSize::new(
                state.frame.viewport.width,
                state.frame.viewport.height,
            ));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no suitable GPU adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("showcase_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface reports no formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let (width, height) = state.resize(window.inner_size(), window.scale_factor());
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(&device, &queue, surface_format, width, height);

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(width: u32, height: u32) -> Self {
        Self {
            state: AppState::new(width, height, 1.0),
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let dt = frame_dt(self.state.last_frame, now);
        self.state.last_frame = now;
        self.state.tick(dt);

        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
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

        gpu.renderer.render(
            &gpu.device,
            &gpu.queue,
            &view,
            &self.state.frame,
            &self.state.scene,
        );

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx);
        });

        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        // The drawing buffer may be smaller than the window when the device
        // pixel ratio is clamped.
        let buffer_scale =
            self.state.frame.viewport.pixel_ratio / gpu.window.scale_factor() as f32;
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point * buffer_scale,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
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
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match Gpu::new(event_loop, &self.egui_ctx, &mut self.state) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                tracing::error!("failed to initialize graphics: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // A release over the panel is consumed by egui but must still end the drag.
        self.state.end_drag_on_release(&event);

        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    let (width, height) = self.state.resize(new_size, gpu.window.scale_factor());
                    gpu.config.width = width;
                    gpu.config.height = height;
                    gpu.surface.configure(&gpu.device, &gpu.config);
                    gpu.renderer.resize(&gpu.device, width, height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.state.handle_key(key);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: btn_state,
                ..
            } => {
                self.state.dragging = btn_state == ElementState::Pressed;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 50.0,
                };
                self.state.frame.camera.zoom(amount);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.state.dragging {
                self.state.frame.camera.rotate(delta.0 as f32, delta.1 as f32);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

/// Tick the scene without a window and print it through the text renderer.
fn run_headless(cli: &Cli) -> String {
    let mut state = AppState::new(cli.width, cli.height, 1.0);

    let deadline = Instant::now() + HEADLESS_FONT_WAIT;
    while state.scene.font_pending() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(10));
        state.scene.poll_assets();
    }

    for _ in 0..cli.frames {
        state.tick(1.0 / 60.0);
    }

    DebugTextRenderer::new().render(&state.scene, &state.frame.view(), &state.frame.viewport)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("showcase-desktop starting");

    if cli.headless {
        print!("{}", run_headless(&cli));
        return Ok(());
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(cli.width, cli.height);
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_dt_is_clamped() {
        let start = Instant::now();
        assert_eq!(frame_dt(start, start + Duration::from_secs(5)), MAX_FRAME_DT);
        let dt = frame_dt(start, start + Duration::from_millis(16));
        assert!((dt - 0.016).abs() < 1e-4);
    }

    #[test]
    fn resize_converts_physical_to_logical() {
        let mut state = AppState::new(1280, 720, 1.0);
        let buffer = state.resize(PhysicalSize::new(2000, 1000), 2.0);
        assert_eq!((state.frame.viewport.width, state.frame.viewport.height), (1000, 500));
        assert_eq!(buffer, (2000, 1000));
        assert_eq!(state.frame.camera.aspect, 2.0);

        let buffer = state.resize(PhysicalSize::new(3000, 1500), 3.0);
        assert_eq!(state.frame.viewport.pixel_ratio, 2.0);
        assert_eq!(buffer, (2000, 1000));
    }

    #[test]
    fn headless_run_ticks_requested_frames() {
        let cli = Cli::parse_from(["showcase-desktop", "--headless", "--frames", "3"]);
        let output = run_headless(&cli);
        assert!(output.contains("tick=3"));
        assert!(output.contains("Shapes: 15"));
    }

    #[test]
    fn left_release_ends_drag() {
        let mut state = AppState::new(800, 600, 1.0);
        state.dragging = true;
        // SAFETY: the dummy id is only carried in the event, never dereferenced.
        let device_id = unsafe { winit::event::DeviceId::dummy() };
        state.end_drag_on_release(&WindowEvent::MouseInput {
            device_id,
            state: ElementState::Pressed,
            button: MouseButton::Left,
        });
        assert!(state.dragging);
        state.end_drag_on_release(&WindowEvent::MouseInput {
            device_id,
            state: ElementState::Released,
            button: MouseButton::Left,
        });
        assert!(!state.dragging);
    }

    #[test]
    fn h_toggles_panel() {
        let mut state = AppState::new(800, 600, 1.0);
        assert!(state.panel.visible);
        state.handle_key(KeyCode::KeyH);
        assert!(!state.panel.visible);
    }
}
