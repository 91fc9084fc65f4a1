//! The presentation session.
//!
//! [`Presentation`] owns everything that used to be page-global state: the
//! slide controller, the live markup, the timer queue, running counter ramps,
//! backdrop effect loops and the swipe tracker. The host feeds it gestures
//! and the current time; it never reads a clock itself, so the whole session
//! can be driven deterministically.
//!
//! ```ignore
//! let mut show = Presentation::new(DeckConfig::default(), 1280, 720)?;
//! show.handle(Command::Next);
//! show.advance_to(50);   // next slide active, its triggers ran
//! show.advance_to(550);  // navigation unlocked
//! ```

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::DeckConfig;
use crate::deck::{DeckTimer, SlideDeck, TransitionTiming};
use crate::dispatch::{dispatch, CounterRamp, CounterRequest};
use crate::effects::{DigitalRain, EffectCanvases, EffectKind, EffectSet, NeuralField};
use crate::error::DeckError;
use crate::input::{Gesture, Key, SwipeTracker};
use crate::stage::Stage;
use crate::timer::{TimerId, TimerQueue};
use crate::view::HitRegion;

/// Something the user asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Next,
    Prev,
    GoTo(usize),
    /// Select a tab on the current slide by its `data-tab`.
    SelectTab(String),
    /// Toggle entity highlighting on the current slide.
    ToggleHighlight(String),
}

/// Payload of every timer the session schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Deck(DeckTimer),
    /// One step of the counter ramp with this id.
    CounterTick(u64),
}

impl From<DeckTimer> for TimerEvent {
    fn from(timer: DeckTimer) -> Self {
        TimerEvent::Deck(timer)
    }
}

#[derive(Debug)]
struct ActiveRamp {
    id: u64,
    slide: usize,
    element: String,
    timer: TimerId,
    ramp: CounterRamp,
}

pub struct Presentation {
    config: DeckConfig,
    deck: SlideDeck,
    stage: Stage,
    timers: TimerQueue<TimerEvent>,
    ramps: Vec<ActiveRamp>,
    next_ramp: u64,
    effects: EffectSet,
    swipe: SwipeTracker,
    viewport: (u32, u32),
    rng: SmallRng,
}

impl Presentation {
    /// Build a session and enter the start slide at time zero.
    pub fn new(config: DeckConfig, width: u32, height: u32) -> Result<Self, DeckError> {
        config.validate()?;
        let timing = TransitionTiming {
            settle_delay_ms: config.timing.settle_delay_ms,
            unlock_delay_ms: config.timing.unlock_delay_ms,
        };
        let deck = SlideDeck::new(config.slides.len(), config.start_slide, timing)?;
        let rng = match config.effects.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let mut show = Self {
            stage: Stage::from_config(&config),
            swipe: SwipeTracker::new(config.timing.swipe_threshold),
            deck,
            timers: TimerQueue::new(),
            ramps: Vec::new(),
            next_ramp: 0,
            effects: EffectSet::new(),
            viewport: (width, height),
            rng,
            config,
        };
        show.enter(show.deck.current());
        Ok(show)
    }

    // ========== Accessors ==========

    pub fn config(&self) -> &DeckConfig {
        &self.config
    }

    pub fn deck(&self) -> &SlideDeck {
        &self.deck
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn effects(&self) -> &EffectSet {
        &self.effects
    }

    /// Presentation time of the last [`advance_to`](Self::advance_to).
    pub fn now_ms(&self) -> u64 {
        self.timers.now()
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Number of counter ramps still counting.
    pub fn running_counters(&self) -> usize {
        self.ramps.len()
    }

    // ========== Commands ==========

    /// Apply a command. Returns true if it changed anything.
    pub fn handle(&mut self, command: Command) -> bool {
        let current = self.deck.current();
        match command {
            Command::Next => self.deck.next(&mut self.timers),
            Command::Prev => self.deck.prev(&mut self.timers),
            Command::GoTo(index) => {
                let target = i64::try_from(index).unwrap_or(i64::MAX);
                self.deck.go_to(target, &mut self.timers)
            }
            Command::SelectTab(tab) => self.stage.select_tab(current, &tab),
            Command::ToggleHighlight(entity) => {
                self.stage.toggle_highlight(current, &entity).is_some()
            }
        }
    }

    /// Apply a gesture, resolving clicks against the hit regions of the last
    /// drawn frame.
    pub fn gesture(&mut self, gesture: Gesture, hits: &[HitRegion]) -> bool {
        match gesture {
            Gesture::Key(Key::Left) => self.handle(Command::Prev),
            Gesture::Key(Key::Right) => self.handle(Command::Next),
            Gesture::Key(_) => false,
            Gesture::Click(point) => {
                // Later regions are drawn on top.
                match hits.iter().rev().find(|h| h.contains(point)) {
                    Some(hit) => self.handle(hit.command.clone()),
                    None => false,
                }
            }
            Gesture::TouchStart(x) => {
                self.swipe.start(x);
                false
            }
            Gesture::TouchEnd(x) => match self.swipe.end(x) {
                Some(swipe) => {
                    let target = self.deck.current() as i64 + swipe.offset();
                    self.deck.go_to(target, &mut self.timers)
                }
                None => false,
            },
        }
    }

    // ========== Clock ==========

    /// Fire every timer due at or before `now_ms`, in order.
    pub fn advance_to(&mut self, now_ms: u64) {
        while let Some((_, event)) = self.timers.pop_due(now_ms) {
            match event {
                TimerEvent::Deck(timer) => {
                    if let Some(index) = self.deck.on_timer(timer, &mut self.timers) {
                        self.enter(index);
                    }
                }
                TimerEvent::CounterTick(id) => self.tick_counter(id),
            }
        }
        self.timers.settle_clock(now_ms);
    }

    // ========== Effects ==========

    /// Draw one frame of every running backdrop effect.
    pub fn render_effects(&mut self, time_ms: f64, canvases: &mut dyn EffectCanvases) {
        self.effects.frame(time_ms, canvases);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
        self.effects.resize(width, height);
    }

    /// Stop every loop and pending counter. The session stays navigable.
    pub fn teardown(&mut self) {
        self.effects.cancel_all();
        for ramp in self.ramps.drain(..) {
            self.timers.cancel(ramp.timer);
        }
        log::info!("Presentation torn down");
    }

    // ========== Internal ==========

    /// Slide `index` just became active: restart its entrance animations,
    /// update progress and run its triggers.
    fn enter(&mut self, index: usize) {
        let now = self.timers.now();
        if let Some(slide) = self.stage.slide_mut(index) {
            slide.entered_at_ms = Some(now);
        }
        let progress = self.deck.progress();
        self.stage.set_progress(progress.fraction, progress.label);

        let triggers = &self.config.slides[index].triggers;
        let started = dispatch(index, triggers, &mut self.stage);
        for request in started.counters {
            self.start_counter(index, request);
        }
        for kind in started.effects {
            self.start_effect(kind);
        }
    }

    fn start_counter(&mut self, slide: usize, request: CounterRequest) {
        // A re-entered slide restarts its counter from zero.
        if let Some(pos) = self
            .ramps
            .iter()
            .position(|r| r.slide == slide && r.element == request.element)
        {
            let old = self.ramps.remove(pos);
            self.timers.cancel(old.timer);
        }
        if let Some(el) = self
            .stage
            .slide_mut(slide)
            .and_then(|s| s.by_id_mut(&request.element))
        {
            el.text = request.ramp.label();
        }
        let id = self.next_ramp;
        self.next_ramp += 1;
        let timer = self
            .timers
            .schedule_repeating(request.interval_ms, TimerEvent::CounterTick(id));
        self.ramps.push(ActiveRamp {
            id,
            slide,
            element: request.element,
            timer,
            ramp: request.ramp,
        });
    }

    fn tick_counter(&mut self, id: u64) {
        let Some(pos) = self.ramps.iter().position(|r| r.id == id) else {
            return;
        };
        let active = &mut self.ramps[pos];
        let done = active.ramp.tick();
        let label = active.ramp.label();
        if let Some(el) = self
            .stage
            .slide_mut(active.slide)
            .and_then(|s| s.by_id_mut(&active.element))
        {
            el.text = label;
        }
        if done {
            let finished = self.ramps.remove(pos);
            self.timers.cancel(finished.timer);
            log::debug!(
                "Counter #{} finished after {} ticks",
                finished.element,
                finished.ramp.ticks()
            );
        }
    }

    fn start_effect(&mut self, kind: EffectKind) {
        let (width, height) = self.viewport;
        let rng = &mut self.rng;
        self.effects.start_once(kind, || match kind {
            EffectKind::NeuralField => Box::new(NeuralField::new(width, height, rng)),
            EffectKind::DigitalRain => Box::new(DigitalRain::new(width, height, rng.gen())),
        });
    }
}
