//! Integration tests driving a whole presentation with a virtual clock.
//!
//! Time only moves through `advance_to`, and every canvas is a `Recorder`,
//! so each test is deterministic.

use neuroslide::canvas::DrawCommand;
use neuroslide::effects::{column_count, particle_count};
use neuroslide::{
    Command, DeckConfig, EffectKind, Gesture, Presentation, Recorder, SlideState, Trigger, Vec2,
    View,
};

// ============================================================================
// Helpers
// ============================================================================

fn config() -> DeckConfig {
    let mut config = DeckConfig::default();
    config.effects.seed = Some(42);
    config
}

fn show() -> Presentation {
    Presentation::new(config(), 1400, 800).unwrap()
}

fn active(show: &Presentation) -> Vec<usize> {
    show.deck()
        .states()
        .iter()
        .enumerate()
        .filter(|(_, s)| **s == SlideState::Active)
        .map(|(i, _)| i)
        .collect()
}

fn counter_text(show: &Presentation) -> String {
    show.stage()
        .slide(5)
        .unwrap()
        .by_id("similarity-counter")
        .unwrap()
        .text
        .clone()
}

// ============================================================================
// Navigation
// ============================================================================

#[test]
fn test_navigation_wraps_both_ways() {
    let mut show = show();
    show.handle(Command::Prev);
    show.advance_to(600);
    assert_eq!(show.deck().current(), 7);

    show.handle(Command::Next);
    show.advance_to(1200);
    assert_eq!(show.deck().current(), 0);
}

#[test]
fn test_exactly_one_active_after_each_settle() {
    let mut show = show();
    let mut now = 0;
    for target in [3, 3, 7, 0, 5, 2] {
        show.handle(Command::GoTo(target));
        now += 50;
        show.advance_to(now);
        assert_eq!(active(&show), vec![target]);
        for i in 0..show.deck().len() {
            assert_eq!(show.deck().indicator(i), i == target);
        }
        now += 500;
        show.advance_to(now);
    }
}

#[test]
fn test_reentrant_navigation_is_dropped() {
    let mut show = show();
    assert!(show.handle(Command::Next));
    // Every request until unlock is ignored.
    for t in [0, 10, 49, 50, 300, 549] {
        show.advance_to(t);
        assert!(!show.handle(Command::GoTo(6)));
    }
    show.advance_to(550);
    assert_eq!(show.deck().current(), 1);
    assert!(show.handle(Command::GoTo(6)));
}

#[test]
fn test_outgoing_slide_is_prev_until_settle() {
    let mut show = show();
    show.handle(Command::GoTo(2));
    show.advance_to(49);
    assert_eq!(show.deck().state(0), Some(SlideState::Prev));
    assert!(active(&show).is_empty());
    show.advance_to(50);
    assert_eq!(show.deck().state(0), Some(SlideState::Inactive));
    assert_eq!(active(&show), vec![2]);
}

#[test]
fn test_progress_and_counter_label() {
    let mut show = show();
    show.handle(Command::GoTo(2));
    show.advance_to(50);
    assert_eq!(show.stage().chrome.counter.as_deref(), Some("3/8"));
    let fraction = show.stage().chrome.progress.unwrap();
    assert!((fraction - 0.375).abs() < 1e-6);
}

#[test]
fn test_swipe_threshold() {
    let mut show = show();
    show.gesture(Gesture::TouchStart(200.0), &[]);
    assert!(!show.gesture(Gesture::TouchEnd(150.0), &[]));
    show.advance_to(600);
    assert_eq!(show.deck().current(), 0);

    show.gesture(Gesture::TouchStart(200.0), &[]);
    assert!(show.gesture(Gesture::TouchEnd(149.0), &[]));
    show.advance_to(1200);
    assert_eq!(show.deck().current(), 1);
}

#[test]
fn test_click_through_view_hit_regions() {
    let mut show = show();
    let view = View::new(show.config());
    let mut canvas = Recorder::new(1400, 800);
    let hits = view.draw(&show, 0, &mut canvas);

    let next = hits
        .iter()
        .find(|h| h.command == Command::Next)
        .expect("next button");
    let p = next.rect.origin + next.rect.size / 2.0;
    assert!(show.gesture(Gesture::Click(p), &hits));
    show.advance_to(600);
    assert_eq!(show.deck().current(), 1);

    // Empty space does nothing.
    assert!(!show.gesture(Gesture::Click(Vec2::new(700.0, 5.0)), &hits));
}

// ============================================================================
// Triggers
// ============================================================================

#[test]
fn test_counter_ramp_on_matching_slide() {
    let mut show = show();
    show.handle(Command::GoTo(5));
    show.advance_to(50);
    assert_eq!(counter_text(&show), "0%");

    let mut last = 0;
    let mut t = 50;
    while t < 50 + 2200 {
        t += 20;
        show.advance_to(t);
        let text = counter_text(&show);
        let value: u32 = text.trim_end_matches('%').parse().unwrap();
        assert!(value >= last, "counter went backwards at {} ms", t);
        assert!(value <= 89);
        last = value;
    }
    assert_eq!(counter_text(&show), "89%");
    assert_eq!(show.running_counters(), 0);
}

#[test]
fn test_counter_survives_leaving_the_slide() {
    let mut show = show();
    show.handle(Command::GoTo(5));
    show.advance_to(600);
    show.handle(Command::Next);
    show.advance_to(3_000);
    assert_eq!(show.deck().current(), 6);
    assert_eq!(counter_text(&show), "89%");
}

#[test]
fn test_binds_and_staggers_apply_on_entry() {
    let mut show = show();
    show.handle(Command::GoTo(2));
    show.advance_to(50);
    let slide = show.stage().slide(2).unwrap();
    let values: Vec<_> = slide
        .by_class("metric-bar")
        .map(|e| e.numeric_property("value").unwrap())
        .collect();
    assert_eq!(values, vec![95.0, 80.0, 90.0, 75.0]);

    show.advance_to(600);
    show.handle(Command::GoTo(7));
    show.advance_to(650);
    let delays: Vec<_> = show
        .stage()
        .slide(7)
        .unwrap()
        .by_class("flow-step")
        .map(|e| e.style.animation_delay.unwrap())
        .collect();
    assert_eq!(delays.len(), 5);
    assert!((delays[4] - 0.8).abs() < 1e-9);
}

#[test]
fn test_tabs_reset_on_reentry() {
    let mut show = show();
    show.handle(Command::GoTo(5));
    show.advance_to(600);
    show.handle(Command::SelectTab("embeddings".into()));
    show.handle(Command::Next);
    show.advance_to(1200);
    show.handle(Command::Prev);
    show.advance_to(1800);

    let active_tab = show
        .stage()
        .slide(5)
        .unwrap()
        .by_class("tab-button")
        .find(|b| b.has_state("active"))
        .and_then(|b| b.data("tab"))
        .map(str::to_string);
    assert_eq!(active_tab.as_deref(), Some("tfidf"));
}

#[test]
fn test_highlights_cleared_on_reentry() {
    let mut show = show();
    show.handle(Command::GoTo(3));
    show.advance_to(600);
    show.handle(Command::ToggleHighlight("SKILL".into()));
    show.handle(Command::GoTo(3));
    show.advance_to(650);
    assert!(show
        .stage()
        .slide(3)
        .unwrap()
        .by_class("ner-token")
        .all(|t| !t.has_state("highlight")));
}

#[test]
fn test_effects_start_once() {
    let mut show = show();
    assert_eq!(show.effects().len(), 2);
    for _ in 0..3 {
        show.handle(Command::GoTo(0));
        let now = show.now_ms() + 600;
        show.advance_to(now);
    }
    assert_eq!(show.effects().len(), 2);
}

#[test]
fn test_missing_counter_element_is_skipped() {
    let mut config = config();
    config.slides[5].triggers.push(Trigger::Counter {
        element: "nowhere".into(),
        target: 10.0,
        duration_ms: 100,
        interval_ms: 10,
        suffix: String::new(),
    });
    let mut show = Presentation::new(config, 800, 600).unwrap();
    show.handle(Command::GoTo(5));
    show.advance_to(50);
    assert_eq!(show.running_counters(), 1);
}

#[test]
fn test_deck_without_effect_triggers_runs_no_loops() {
    let mut config = config();
    config.slides[0].triggers.clear();
    let show = Presentation::new(config, 800, 600).unwrap();
    assert!(show.effects().is_empty());
}

// ============================================================================
// Effects
// ============================================================================

#[test]
fn test_backdrop_sizes() {
    assert_eq!(particle_count(1400, 800), 74);
    assert_eq!(column_count(1400), 100);
}

#[test]
fn test_effects_draw_every_frame_until_teardown() {
    let mut show = show();
    let mut canvas = Recorder::new(1400, 800);
    show.render_effects(0.0, &mut canvas);
    let first = canvas.take();
    assert!(first.contains(&DrawCommand::Clear));
    assert!(first.iter().any(|c| matches!(c, DrawCommand::Glyph { .. })));

    show.teardown();
    show.render_effects(16.0, &mut canvas);
    assert!(canvas.take().is_empty());
    assert!(!show.effects().is_running(EffectKind::NeuralField));
}

#[test]
fn test_resize_reaches_effects() {
    let mut show = show();
    show.resize(700, 400);
    assert_eq!(show.viewport(), (700, 400));
    let mut canvas = Recorder::new(700, 400);
    show.render_effects(0.0, &mut canvas);
    let rain_glyphs = canvas
        .commands
        .iter()
        .filter(|c| matches!(c, DrawCommand::Glyph { .. }))
        .count();
    assert_eq!(rain_glyphs, column_count(700));
}

// ============================================================================
// Deck files
// ============================================================================

#[test]
fn test_deck_from_toml_drives_presentation() {
    let deck = DeckConfig::from_toml_str(
        r#"
        [timing]
        settle_delay_ms = 10
        unlock_delay_ms = 100

        [effects]
        neural_canvas = false
        rain_canvas = false
        seed = 1

        [[slides]]
        title = "One"

        [[slides]]
        title = "Two"

        [[slides.elements]]
        class = "step"
        text = "a"

        [[slides.elements]]
        class = "step"
        text = "b"

        [[slides.triggers]]
        kind = "stagger"
        class = "step"
        step_secs = 0.5
        "#,
    )
    .unwrap();
    let mut show = Presentation::new(deck, 640, 480).unwrap();
    show.handle(Command::Next);
    show.advance_to(10);
    assert_eq!(show.deck().current(), 1);
    assert_eq!(show.stage().chrome.counter.as_deref(), Some("2/2"));
    let delays: Vec<_> = show
        .stage()
        .slide(1)
        .unwrap()
        .by_class("step")
        .map(|e| e.style.animation_delay)
        .collect();
    assert_eq!(delays, vec![Some(0.0), Some(0.5)]);
    assert!(!show.handle(Command::Next));
    show.advance_to(110);
    assert!(show.handle(Command::Next));
}
