//! Per-slide trigger dispatch.
//!
//! When a slide becomes active its triggers run in order. Triggers that only
//! rewrite markup (stagger delays, custom-property binds, tab and highlight
//! resets) are applied to the [`Stage`] directly. Triggers that need a clock
//! or a canvas come back as [`Started`] work for the presentation to run.

use crate::config::Trigger;
use crate::effects::EffectKind;
use crate::stage::Stage;

/// Timed work a slide's triggers asked for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Started {
    pub counters: Vec<CounterRequest>,
    pub effects: Vec<EffectKind>,
}

/// A counter ramp to start on the element with id `element`.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterRequest {
    pub element: String,
    pub ramp: CounterRamp,
    pub interval_ms: u64,
}

/// Run `triggers` against slide `index` of `stage`.
///
/// Unknown slides and triggers naming absent elements do nothing.
pub fn dispatch(index: usize, triggers: &[Trigger], stage: &mut Stage) -> Started {
    log::debug!("Slide {}: {} triggers", index, triggers.len());
    let mut started = Started::default();
    for trigger in triggers {
        match trigger {
            Trigger::Stagger { class, step_secs } => {
                if let Some(slide) = stage.slide_mut(index) {
                    for (i, el) in slide.by_class_mut(class).enumerate() {
                        el.style.animation_delay = Some(i as f64 * step_secs);
                    }
                }
            }
            Trigger::Bind {
                class,
                attribute,
                property,
            } => {
                if let Some(slide) = stage.slide_mut(index) {
                    for el in slide.by_class_mut(class) {
                        // Missing attributes bind as empty, which reads as no value.
                        let value = el.data(attribute).unwrap_or_default().to_string();
                        el.style.properties.insert(property.clone(), value);
                    }
                }
            }
            Trigger::Counter {
                element,
                target,
                duration_ms,
                interval_ms,
                suffix,
            } => {
                let exists = stage
                    .slide(index)
                    .is_some_and(|s| s.by_id(element).is_some());
                if exists {
                    started.counters.push(CounterRequest {
                        element: element.clone(),
                        ramp: CounterRamp::new(*target, *duration_ms, *interval_ms, suffix),
                        interval_ms: (*interval_ms).max(1),
                    });
                } else {
                    log::debug!("Counter #{} not on slide {}", element, index);
                }
            }
            Trigger::Tabs => stage.reset_tabs(index),
            Trigger::Highlights => stage.clear_highlights(index),
            Trigger::NeuralField => started.effects.push(EffectKind::NeuralField),
            Trigger::DigitalRain => started.effects.push(EffectKind::DigitalRain),
        }
    }
    started
}

/// A number counting up from 0 to a target in equal steps.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterRamp {
    target: f64,
    increment: f64,
    count: f64,
    ticks: u32,
    suffix: String,
}

impl CounterRamp {
    /// A ramp taking `duration_ms / interval_ms` ticks to reach `target`.
    /// Durations shorter than one interval reach it in a single tick.
    pub fn new(target: f64, duration_ms: u64, interval_ms: u64, suffix: &str) -> Self {
        let steps = (duration_ms as f64 / interval_ms.max(1) as f64).max(1.0);
        Self {
            target,
            increment: target / steps,
            count: 0.0,
            ticks: 0,
            suffix: suffix.to_string(),
        }
    }

    /// Advance one step, snapping to the target once reached.
    /// Returns true when the ramp is finished.
    pub fn tick(&mut self) -> bool {
        if self.is_done() {
            return true;
        }
        self.ticks += 1;
        self.count += self.increment;
        if self.count >= self.target {
            self.count = self.target;
        }
        self.is_done()
    }

    pub fn is_done(&self) -> bool {
        self.ticks > 0 && self.count >= self.target
    }

    pub fn value(&self) -> f64 {
        self.count
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Text shown in the element: the rounded count and the suffix.
    pub fn label(&self) -> String {
        format!("{}{}", self.count.round(), self.suffix)
    }
}
