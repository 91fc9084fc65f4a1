//! Window surface and frame presentation.
//!
//! All drawing happens on the CPU; the GPU only shows the finished frame.
//! [`GpuState`] owns the surface, device and queue, and the [`BlitState`]
//! that copies the frame onto the surface.

mod blit;

use std::sync::Arc;

use winit::window::Window;

pub use blit::BlitState;

use crate::error::GpuError;

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    blit: BlitState,
}

impl GpuState {
    /// Surface sized to the window in physical pixels, presenting frames of
    /// `frame_width` x `frame_height`.
    pub async fn new(
        window: Arc<Window>,
        frame_width: u32,
        frame_height: u32,
    ) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::NoSurfaceFormat)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!(
            "Surface {}x{} {:?} on {}",
            config.width,
            config.height,
            surface_format,
            adapter.get_info().name
        );

        let blit = BlitState::new(&device, frame_width, frame_height, surface_format);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            blit,
        })
    }

    /// Resize the surface to `new_size` and the frame texture to
    /// `frame_width` x `frame_height`.
    pub fn resize(
        &mut self,
        new_size: winit::dpi::PhysicalSize<u32>,
        frame_width: u32,
        frame_height: u32,
    ) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.blit.resize(&self.device, frame_width, frame_height);
        }
    }

    /// Reconfigure the surface at its current size, after it was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Present one frame of tightly packed RGBA8 pixels.
    pub fn render(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<(), wgpu::SurfaceError> {
        self.blit.upload(&self.queue, pixels, width, height);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        self.blit.render(&mut encoder, &view);

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}
