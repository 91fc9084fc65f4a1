//! Decorative canvas effects and the frame loops that drive them.
//!
//! An [`Effect`] draws one frame at a time onto its own canvas. Once started
//! it keeps running every frame until its [`LoopHandle`] is cancelled; the
//! slide controller never has to tick it again.
//!
//! | Effect | Canvas |
//! |--------|--------|
//! | [`NeuralField`] | `neural-canvas`, cleared every frame |
//! | [`DigitalRain`] | `digital-rain`, never cleared, fades by overdraw |

mod neural;
mod rain;

pub use neural::{particle_count, pulse_phase, NeuralField, Particle, CONNECTION_DISTANCE, PARTICLE_AREA};
pub use rain::{column_count, DigitalRain, RainColumn, FONT_SIZE, RESET_CHANCE};

use std::cell::Cell;
use std::rc::Rc;

use crate::canvas::{Canvas, Recorder};

/// Something that renders itself once per display frame.
pub trait Effect {
    /// Advance the simulation one step and draw it. `time_ms` is wall-clock
    /// milliseconds since the presentation started.
    fn frame(&mut self, canvas: &mut dyn Canvas, time_ms: f64);

    /// The canvas changed size.
    fn resize(&mut self, width: u32, height: u32);
}

/// Lookup of the canvas each effect draws onto.
///
/// Returning `None` means the canvas element is absent from the page; the
/// effect is skipped for that frame.
pub trait EffectCanvases {
    fn canvas(&mut self, kind: EffectKind) -> Option<&mut dyn Canvas>;
}

/// A single recorder standing in for every canvas.
impl EffectCanvases for Recorder {
    fn canvas(&mut self, _kind: EffectKind) -> Option<&mut dyn Canvas> {
        Some(self)
    }
}

/// Which canvas an effect draws onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    NeuralField,
    DigitalRain,
}

impl EffectKind {
    /// Element id of the canvas the effect draws onto.
    pub fn canvas_id(self) -> &'static str {
        match self {
            EffectKind::NeuralField => "neural-canvas",
            EffectKind::DigitalRain => "digital-rain",
        }
    }
}

/// Cancellation handle for a running frame loop.
///
/// Clones share the same flag; cancelling any of them stops the loop before
/// its next frame.
#[derive(Debug, Clone, Default)]
pub struct LoopHandle(Rc<Cell<bool>>);

impl LoopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

struct Running {
    kind: EffectKind,
    effect: Box<dyn Effect>,
    handle: LoopHandle,
}

/// The set of effects currently looping.
#[derive(Default)]
pub struct EffectSet {
    running: Vec<Running>,
}

impl EffectSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an effect of `kind` is running.
    pub fn is_running(&self, kind: EffectKind) -> bool {
        self.running
            .iter()
            .any(|r| r.kind == kind && !r.handle.is_cancelled())
    }

    /// Start `effect` unless one of the same kind is already running.
    ///
    /// Returns the handle of the running loop either way.
    pub fn start_once(
        &mut self,
        kind: EffectKind,
        make: impl FnOnce() -> Box<dyn Effect>,
    ) -> LoopHandle {
        self.prune();
        if let Some(r) = self.running.iter().find(|r| r.kind == kind) {
            return r.handle.clone();
        }
        let handle = LoopHandle::new();
        log::info!("Starting {:?} on #{}", kind, kind.canvas_id());
        self.running.push(Running {
            kind,
            effect: make(),
            handle: handle.clone(),
        });
        handle
    }

    /// Run one frame of every live effect on its canvas. Effects whose
    /// canvas is absent are skipped.
    pub fn frame(&mut self, time_ms: f64, canvases: &mut dyn EffectCanvases) {
        self.prune();
        for r in &mut self.running {
            if let Some(canvas) = canvases.canvas(r.kind) {
                r.effect.frame(canvas, time_ms);
            }
        }
    }

    /// Forward a viewport resize to every live effect.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.prune();
        for r in &mut self.running {
            r.effect.resize(width, height);
        }
    }

    /// Cancel every loop. Called when the view is torn down.
    pub fn cancel_all(&mut self) {
        for r in &self.running {
            r.handle.cancel();
        }
        self.prune();
    }

    /// Number of live loops.
    pub fn len(&self) -> usize {
        self.running
            .iter()
            .filter(|r| !r.handle.is_cancelled())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn prune(&mut self) {
        self.running.retain(|r| {
            let live = !r.handle.is_cancelled();
            if !live {
                log::info!("Stopped {:?}", r.kind);
            }
            live
        });
    }
}

impl Drop for EffectSet {
    fn drop(&mut self) {
        for r in &self.running {
            r.handle.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counting(Rc<Cell<u32>>);

    impl Effect for Counting {
        fn frame(&mut self, _canvas: &mut dyn Canvas, _time_ms: f64) {
            self.0.set(self.0.get() + 1);
        }

        fn resize(&mut self, _width: u32, _height: u32) {}
    }

    #[test]
    fn test_start_once_is_idempotent() {
        let frames = Rc::new(Cell::new(0));
        let mut set = EffectSet::new();
        let f = frames.clone();
        let h1 = set.start_once(EffectKind::NeuralField, move || Box::new(Counting(f)));
        let h2 = set.start_once(EffectKind::NeuralField, || unreachable!());
        assert_eq!(set.len(), 1);

        h2.cancel();
        assert!(h1.is_cancelled());
    }

    #[test]
    fn test_cancel_stops_frames() {
        let frames = Rc::new(Cell::new(0));
        let mut set = EffectSet::new();
        let f = frames.clone();
        let handle = set.start_once(EffectKind::DigitalRain, move || Box::new(Counting(f)));

        let mut canvas = Recorder::new(10, 10);
        set.frame(0.0, &mut canvas);
        set.frame(16.0, &mut canvas);
        assert_eq!(frames.get(), 2);

        handle.cancel();
        set.frame(32.0, &mut canvas);
        assert_eq!(frames.get(), 2);
        assert!(set.is_empty());
        assert!(!set.is_running(EffectKind::DigitalRain));
    }

    struct NoCanvases;

    impl EffectCanvases for NoCanvases {
        fn canvas(&mut self, _kind: EffectKind) -> Option<&mut dyn Canvas> {
            None
        }
    }

    #[test]
    fn test_missing_canvas_skips_effect() {
        let frames = Rc::new(Cell::new(0));
        let mut set = EffectSet::new();
        let f = frames.clone();
        set.start_once(EffectKind::NeuralField, move || Box::new(Counting(f)));
        set.frame(0.0, &mut NoCanvases);
        assert_eq!(frames.get(), 0);
        assert!(set.is_running(EffectKind::NeuralField));
    }

    #[test]
    fn test_cancel_all() {
        let mut set = EffectSet::new();
        let a = set.start_once(EffectKind::NeuralField, || {
            Box::new(Counting(Rc::new(Cell::new(0))))
        });
        let b = set.start_once(EffectKind::DigitalRain, || {
            Box::new(Counting(Rc::new(Cell::new(0))))
        });
        set.cancel_all();
        assert!(a.is_cancelled() && b.is_cancelled());
        assert!(set.is_empty());
    }

    #[test]
    fn test_restart_after_cancel() {
        let mut set = EffectSet::new();
        let first = set.start_once(EffectKind::DigitalRain, || {
            Box::new(Counting(Rc::new(Cell::new(0))))
        });
        first.cancel();
        let second = set.start_once(EffectKind::DigitalRain, || {
            Box::new(Counting(Rc::new(Cell::new(0))))
        });
        assert!(!second.is_cancelled());
        assert_eq!(set.len(), 1);
    }
}
