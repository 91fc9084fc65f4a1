//! # neuroslide
//!
//! A full-screen slide presentation with two animated backdrops: a drifting
//! "neural network" of linked particles and falling binary digital rain.
//!
//! Everything is drawn on the CPU into canvas layers and presented through
//! wgpu. The presentation logic is independent of the window, so a session
//! can be driven from tests with a virtual clock and a recording canvas.
//!
//! ## Quick Start
//!
//! ```ignore
//! use neuroslide::{App, DeckConfig};
//! use winit::event_loop::EventLoop;
//!
//! let event_loop = EventLoop::new()?;
//! let mut app = App::new(DeckConfig::default());
//! event_loop.run_app(&mut app)?;
//! ```
//!
//! ## Core Concepts
//!
//! ### Decks
//!
//! A [`DeckConfig`] lists slides, their elements and their [`Trigger`]s.
//! Decks load from TOML; the default deck is built in.
//!
//! ### Transitions
//!
//! [`SlideDeck`] moves between slides in timed phases: the outgoing slide
//! fades, the target becomes active after a short settle delay, and
//! navigation stays locked until an unlock delay has passed. Requests made
//! while locked are dropped.
//!
//! ### Triggers
//!
//! When a slide becomes active its triggers run: staggered entrance delays,
//! data-to-style binds, counter ramps, tab and highlight resets, and the
//! backdrop effects. See [`dispatch`](dispatch::dispatch).
//!
//! ### Headless driving
//!
//! ```ignore
//! let mut show = Presentation::new(DeckConfig::default(), 1280, 720)?;
//! show.handle(Command::GoTo(5));
//! show.advance_to(50);
//! assert_eq!(show.deck().current(), 5);
//! ```

pub mod canvas;
pub mod config;
pub mod deck;
pub mod dispatch;
pub mod effects;
pub mod error;
pub mod font;
mod gpu;
pub mod input;
pub mod presentation;
pub mod raster;
pub mod stage;
pub mod time;
pub mod timer;
pub mod view;
mod window;

pub use glam::Vec2;

pub use canvas::{Canvas, DrawCommand, Recorder, Rgba};
pub use config::{DeckConfig, ElementConfig, SlideConfig, Trigger};
pub use deck::{normalize, SlideDeck, SlideState};
pub use effects::{DigitalRain, Effect, EffectKind, EffectSet, LoopHandle, NeuralField};
pub use error::{AppError, DeckError, GpuError};
pub use input::{Gesture, Key, SwipeTracker};
pub use presentation::{Command, Presentation};
pub use raster::PixelCanvas;
pub use stage::Stage;
pub use time::Clock;
pub use timer::{TimerId, TimerQueue};
pub use view::{HitRegion, View};
pub use window::App;
