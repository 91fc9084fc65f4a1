//! Error types for neuroslide.
//!
//! The presentation core itself never fails at runtime: missing optional
//! elements are skipped and malformed data attributes simply render as
//! absent. Errors only come from the edges: loading a deck, bringing up the
//! GPU, and creating the window.

use thiserror::Error;

/// Errors that can occur while loading or validating a deck.
#[derive(Debug, Error)]
pub enum DeckError {
    /// Failed to read the deck file from disk.
    #[error("Failed to read deck file: {0}")]
    Io(#[from] std::io::Error),
    /// The deck file is not valid TOML or does not match the deck schema.
    #[error("Failed to parse deck: {0}")]
    Parse(#[from] toml::de::Error),
    /// The deck could not be written back out.
    #[error("Failed to serialize deck: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// A deck needs at least one slide.
    #[error("Deck has no slides")]
    EmptyDeck,
    /// `start_slide` points past the end of the deck.
    #[error("Start slide {index} is out of range for a deck of {len} slides")]
    StartOutOfRange { index: usize, len: usize },
    /// A counter trigger whose target is NaN or infinite would never finish.
    #[error("Counter #{element} on slide {slide} has non-finite target {target}")]
    CounterTarget {
        slide: usize,
        element: String,
        target: f64,
    },
}

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("Failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("No compatible GPU adapter found: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),
    /// Failed to create GPU device.
    #[error("Failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// The surface reports no usable texture format.
    #[error("Surface supports no texture formats")]
    NoSurfaceFormat,
}

/// Errors that can occur when running the presentation window.
#[derive(Debug, Error)]
pub enum AppError {
    /// Failed to create or run the event loop.
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create the window.
    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    /// The deck could not be loaded.
    #[error("Deck error: {0}")]
    Deck(#[from] DeckError),
}
