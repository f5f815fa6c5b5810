use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use gpc_canvas::device::{Gpu, GpuInit, SurfaceErrorAction};
use gpc_canvas::{Canvas, CanvasConfig, RasterizedFont, RenderTarget, YAxis};

use crate::scene::{Assets, Scene};

/// Window and canvas settings for the studio.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub y_axis: YAxis,
    pub gpu: GpuInit,
    pub font: Option<RasterizedFont>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            title: "gpc studio".to_string(),
            initial_size: LogicalSize::new(960.0, 640.0),
            y_axis: YAxis::Down,
            gpu: GpuInit::default(),
            font: None,
        }
    }
}

pub struct Runtime;

impl Runtime {
    pub fn run(config: StudioConfig) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState {
            config,
            window: None,
            exit_requested: false,
        };

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        Ok(())
    }
}

#[self_referencing]
struct WindowEntry {
    canvas: Canvas,
    scene: Scene,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState {
    config: StudioConfig,
    window: Option<WindowEntry>,
    exit_requested: bool,
}

impl AppState {
    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let size = window.inner_size();
        let gpu_init = self.config.gpu.clone();
        let canvas = Canvas::new(CanvasConfig {
            y_axis: self.config.y_axis,
            ..CanvasConfig::default()
        });

        let mut entry = WindowEntryTryBuilder {
            canvas,
            scene: Scene::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, (size.width, size.height), gpu_init)),
        }
        .try_build()?;

        let font = self.config.font.clone();
        entry.with_mut(|fields| -> Result<()> {
            let gpu = &*fields.gpu;
            fields
                .canvas
                .init(gpu.device(), gpu.queue(), gpu.surface_format())?;
            *fields.scene = Scene::new(Assets::register(fields.canvas, font)?);
            Ok(())
        })?;

        self.window = Some(entry);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(entry) = self.window.as_mut() else { return };

        let fatal = entry.with_mut(|fields| {
            let frame = fields.gpu.begin_frame();
            let mut frame = match frame {
                Ok(frame) => frame,
                Err(e) => return fields.gpu.handle_surface_error(e) == SurfaceErrorAction::Fatal,
            };

            let (width, height) = (frame.width, frame.height);
            let canvas = &mut *fields.canvas;
            canvas.define_viewport(0, 0, width, height);
            canvas.enter_context();
            if let Err(e) = fields.scene.draw(canvas, width as i32, height as i32) {
                log::error!("scene draw failed: {e}");
            }
            if let Err(e) = canvas.leave_context(&mut RenderTarget::from_frame(&mut frame)) {
                log::error!("canvas encode failed: {e}");
            }

            fields.gpu.submit(frame);
            false
        });

        if fatal {
            log::error!("unrecoverable surface error");
            self.exit_requested = true;
            event_loop.exit();
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop) {
            log::error!("failed to create window: {e:#}");
            self.exit_requested = true;
            event_loop.exit();
            return;
        }

        if let Some(entry) = &self.window {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);
        if let Some(entry) = &self.window {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.window = None;
                self.exit_requested = true;
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = self.window.as_mut() {
                    entry.with_gpu_mut(|gpu| gpu.resize((new_size.width, new_size.height)));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.window.as_mut() {
                    let new_size = entry.with_window(|w| w.inner_size());
                    entry.with_gpu_mut(|gpu| gpu.resize((new_size.width, new_size.height)));
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }
}
