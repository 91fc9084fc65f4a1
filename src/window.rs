//! Window and frame loop.
//!
//! Three canvas layers are drawn on the CPU each frame and composited, back
//! to front, over the page background:
//!
//! | Layer | Drawn by | Cleared |
//! |-------|----------|---------|
//! | rain | [`DigitalRain`](crate::effects::DigitalRain) | never, fades by overdraw |
//! | neural | [`NeuralField`](crate::effects::NeuralField) | by the effect, every frame |
//! | ui | [`View`] | every frame |
//!
//! Layers, the session and hit regions all live in logical pixels. The
//! composited frame is handed to [`GpuState`], which stretches it over the
//! physical surface.

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowId};

use crate::canvas::{Canvas, Rgba};
use crate::config::DeckConfig;
use crate::effects::{EffectCanvases, EffectKind};
use crate::error::AppError;
use crate::gpu::GpuState;
use crate::input::{Gesture, Input, Key};
use crate::presentation::Presentation;
use crate::raster::PixelCanvas;
use crate::time::Clock;
use crate::view::{HitRegion, View};

/// Frames between window title refreshes.
const TITLE_INTERVAL: u64 = 60;

/// Logical size of a physical window size, at least 1x1.
pub fn logical_extent(size: winit::dpi::PhysicalSize<u32>, scale_factor: f64) -> (u32, u32) {
    let scale_factor = if scale_factor.is_finite() && scale_factor > 0.0 {
        scale_factor
    } else {
        1.0
    };
    let logical = size.to_logical::<f64>(scale_factor);
    (
        (logical.width.round() as u32).max(1),
        (logical.height.round() as u32).max(1),
    )
}

/// The CPU-side canvases, one per page layer.
pub struct Layers {
    neural: Option<PixelCanvas>,
    rain: Option<PixelCanvas>,
    ui: PixelCanvas,
    frame: PixelCanvas,
}

impl Layers {
    /// Layers for `config`; backdrop canvases the deck disables are absent.
    pub fn new(config: &DeckConfig, width: u32, height: u32) -> Self {
        Self {
            neural: config
                .effects
                .neural_canvas
                .then(|| PixelCanvas::new(width, height)),
            rain: config
                .effects
                .rain_canvas
                .then(|| PixelCanvas::new(width, height)),
            ui: PixelCanvas::new(width, height),
            frame: PixelCanvas::new(width, height),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        for layer in [self.neural.as_mut(), self.rain.as_mut()].into_iter().flatten() {
            layer.resize(width, height);
        }
        self.ui.resize(width, height);
        self.frame.resize(width, height);
    }

    pub fn ui(&mut self) -> &mut PixelCanvas {
        &mut self.ui
    }

    /// Flatten every layer onto an opaque frame.
    pub fn compose(&mut self, background: Rgba, neural_opacity: f32, rain_opacity: f32) -> &PixelCanvas {
        self.frame.fill(background);
        if let Some(rain) = &self.rain {
            self.frame.composite(rain, rain_opacity);
        }
        if let Some(neural) = &self.neural {
            self.frame.composite(neural, neural_opacity);
        }
        self.frame.composite(&self.ui, 1.0);
        &self.frame
    }
}

impl EffectCanvases for Layers {
    fn canvas(&mut self, kind: EffectKind) -> Option<&mut dyn Canvas> {
        let layer = match kind {
            EffectKind::NeuralField => self.neural.as_mut(),
            EffectKind::DigitalRain => self.rain.as_mut(),
        };
        layer.map(|c| c as &mut dyn Canvas)
    }
}

pub struct App {
    config: DeckConfig,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    show: Option<Presentation>,
    layers: Option<Layers>,
    view: View,
    clock: Clock,
    input: Input,
    hits: Vec<HitRegion>,
    background: Rgba,
    error: Option<AppError>,
}

impl App {
    pub fn new(config: DeckConfig) -> Self {
        let background = Rgba::from_hex(&config.window.background).unwrap_or_else(|| {
            log::warn!("Invalid background color {:?}", config.window.background);
            Rgba::BLACK
        });
        Self {
            view: View::new(&config),
            config,
            window: None,
            gpu: None,
            show: None,
            layers: None,
            clock: Clock::new(),
            input: Input::new(),
            hits: Vec::new(),
            background,
            error: None,
        }
    }

    /// The error that stopped the event loop, if any.
    pub fn take_error(&mut self) -> Option<AppError> {
        self.error.take()
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let scale_factor = window.scale_factor();
        let (width, height) = logical_extent(window.inner_size(), scale_factor);
        self.input.set_scale_factor(scale_factor);

        let gpu = pollster::block_on(GpuState::new(window.clone(), width, height))?;
        let show = Presentation::new(self.config.clone(), width, height)?;

        self.layers = Some(Layers::new(&self.config, width, height));
        self.window = Some(window);
        self.gpu = Some(gpu);
        self.show = Some(show);
        self.clock = Clock::new();
        Ok(())
    }

    fn resize(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        let (width, height) = logical_extent(size, self.input.scale_factor());
        log::debug!(
            "Resize to {}x{} ({}x{} logical)",
            size.width,
            size.height,
            width,
            height
        );
        if let Some(gpu) = &mut self.gpu {
            gpu.resize(size, width, height);
        }
        if let Some(layers) = &mut self.layers {
            layers.resize(width, height);
        }
        if let Some(show) = &mut self.show {
            show.resize(width, height);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(show), Some(layers), Some(gpu)) =
            (self.show.as_mut(), self.layers.as_mut(), self.gpu.as_mut())
        else {
            return;
        };

        self.clock.tick();
        let now_ms = self.clock.now_ms();
        show.advance_to(now_ms);
        show.render_effects(self.clock.elapsed_ms(), layers);
        self.hits = self.view.draw(show, now_ms, layers.ui());

        let effects = &self.config.effects;
        let frame = layers.compose(self.background, effects.neural_opacity, effects.rain_opacity);
        let (width, height) = frame.size();
        match gpu.render(frame.as_bytes(), width, height) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                event_loop.exit();
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }

        if let Some(window) = &self.window {
            if self.clock.frame() % TITLE_INTERVAL == 0 {
                window.set_title(&format!(
                    "{} - {:.0} fps",
                    self.config.window.title,
                    self.clock.fps()
                ));
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                log::error!("{}", e);
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(show) = &mut self.show {
                    show.teardown();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => self.resize(physical_size),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.input.set_scale_factor(scale_factor);
                if let Some(size) = self.window.as_ref().map(|w| w.inner_size()) {
                    self.resize(size);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            ref other => {
                if let Some(gesture) = self.input.handle_event(other) {
                    if gesture == Gesture::Key(Key::Escape) {
                        if let Some(show) = &mut self.show {
                            show.teardown();
                        }
                        event_loop.exit();
                    } else if let Some(show) = &mut self.show {
                        show.gesture(gesture, &self.hits);
                    }
                }
            }
        }
    }
}
