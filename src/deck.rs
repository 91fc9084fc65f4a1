//! Slide transition controller.
//!
//! Exactly one slide is active outside a transition. A transition is three
//! phases on the presentation clock:
//!
//! 1. `go_to` marks the outgoing slide [`SlideState::Prev`], moves the
//!    indicator to the target and locks navigation.
//! 2. After the settle delay the target becomes [`SlideState::Active`] and
//!    the outgoing slide goes back to [`SlideState::Inactive`]. Progress
//!    updates and the target's triggers are due.
//! 3. After the unlock delay navigation is accepted again.
//!
//! Navigation requested while locked is dropped, not queued.

use crate::error::DeckError;
use crate::timer::TimerQueue;

/// Visual state of a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideState {
    Active,
    /// Fading out during a transition.
    Prev,
    Inactive,
}

/// Delays of the two transition phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionTiming {
    pub settle_delay_ms: u64,
    pub unlock_delay_ms: u64,
}

impl Default for TransitionTiming {
    fn default() -> Self {
        Self {
            settle_delay_ms: 50,
            unlock_delay_ms: 500,
        }
    }
}

/// Timer events the controller schedules on the presentation queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckTimer {
    Settle { from: usize, to: usize },
    Unlock,
}

/// Progress through the deck after a slide settles.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    /// `(current + 1) / total`.
    pub fraction: f32,
    /// `current/total`, one-based.
    pub label: String,
}

/// Clamp a navigation target onto `0..len` the way paging wraps: anything
/// below zero goes to the last slide, anything past the end to the first.
/// `len` must be non-zero.
pub fn normalize(target: i64, len: usize) -> usize {
    if target < 0 {
        len - 1
    } else if target as u64 >= len as u64 {
        0
    } else {
        target as usize
    }
}

#[derive(Debug, Clone)]
pub struct SlideDeck {
    states: Vec<SlideState>,
    indicators: Vec<bool>,
    current: usize,
    animating: bool,
    timing: TransitionTiming,
}

impl SlideDeck {
    /// A deck of `len` slides with `start` active.
    pub fn new(len: usize, start: usize, timing: TransitionTiming) -> Result<Self, DeckError> {
        if len == 0 {
            return Err(DeckError::EmptyDeck);
        }
        if start >= len {
            return Err(DeckError::StartOutOfRange { index: start, len });
        }
        let mut states = vec![SlideState::Inactive; len];
        states[start] = SlideState::Active;
        let indicators = (0..len).map(|i| i == start).collect();
        Ok(Self {
            states,
            indicators,
            current: start,
            animating: false,
            timing,
        })
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Whether a transition holds the navigation lock.
    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn state(&self, index: usize) -> Option<SlideState> {
        self.states.get(index).copied()
    }

    pub fn states(&self) -> &[SlideState] {
        &self.states
    }

    /// Whether indicator `index` is lit. Indicators follow the latest
    /// accepted target, ahead of the settle.
    pub fn indicator(&self, index: usize) -> bool {
        self.indicators.get(index).copied().unwrap_or(false)
    }

    pub fn progress(&self) -> Progress {
        let total = self.len();
        Progress {
            fraction: (self.current + 1) as f32 / total as f32,
            label: format!("{}/{}", self.current + 1, total),
        }
    }

    /// Start a transition to `target`, wrapped onto the deck.
    ///
    /// Returns false and changes nothing while a transition is running.
    /// Targeting the current slide runs a full transition onto itself.
    pub fn go_to<E>(&mut self, target: i64, timers: &mut TimerQueue<E>) -> bool
    where
        E: Clone + From<DeckTimer>,
    {
        if self.animating {
            log::debug!("Navigation to {} dropped: transition running", target);
            return false;
        }
        let to = normalize(target, self.len());
        let from = self.current;
        self.animating = true;
        self.states[from] = SlideState::Prev;
        for (i, lit) in self.indicators.iter_mut().enumerate() {
            *lit = i == to;
        }
        timers.schedule_once(
            self.timing.settle_delay_ms,
            DeckTimer::Settle { from, to }.into(),
        );
        log::debug!("Transition {} -> {}", from, to);
        true
    }

    /// Step forward by one, wrapping past the last slide.
    pub fn next<E>(&mut self, timers: &mut TimerQueue<E>) -> bool
    where
        E: Clone + From<DeckTimer>,
    {
        self.go_to(self.current as i64 + 1, timers)
    }

    /// Step back by one, wrapping before the first slide.
    pub fn prev<E>(&mut self, timers: &mut TimerQueue<E>) -> bool
    where
        E: Clone + From<DeckTimer>,
    {
        self.go_to(self.current as i64 - 1, timers)
    }

    /// Handle a fired [`DeckTimer`]. Returns the slide that just became
    /// active, whose triggers must now run.
    pub fn on_timer<E>(&mut self, timer: DeckTimer, timers: &mut TimerQueue<E>) -> Option<usize>
    where
        E: Clone + From<DeckTimer>,
    {
        match timer {
            DeckTimer::Settle { from, to } => {
                // Clear the outgoing slide first so a self-transition ends active.
                if let Some(state) = self.states.get_mut(from) {
                    *state = SlideState::Inactive;
                }
                self.states[to] = SlideState::Active;
                self.current = to;
                timers.schedule_once(self.timing.unlock_delay_ms, DeckTimer::Unlock.into());
                log::info!("Slide {}/{}", to + 1, self.len());
                Some(to)
            }
            DeckTimer::Unlock => {
                self.animating = false;
                None
            }
        }
    }
}
