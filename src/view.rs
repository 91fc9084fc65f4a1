//! Slide and chrome rendering.
//!
//! [`View`] draws the current state of a [`Presentation`] onto a canvas and
//! reports where the clickable parts ended up as [`HitRegion`]s. It keeps no
//! state between frames; entrance animations are computed from each slide's
//! `entered_at_ms` and each element's animation delay.
//!
//! Element rendering is chosen by markup, not by slide:
//!
//! | Element | Drawn as |
//! |---------|----------|
//! | any element with a bound custom property | labelled bar, fill from the property |
//! | `tab-button`, `highlight-button` | button row |
//! | `ner-token` | inline token, tinted when highlighted |
//! | `tab-content` | panel, only when active |
//! | element with an `id` and no class role | large centered figure |
//! | anything else | wrapped text line |

use glam::Vec2;

use crate::canvas::{Canvas, Rgba};
use crate::config::DeckConfig;
use crate::deck::SlideState;
use crate::font;
use crate::presentation::{Command, Presentation};
use crate::stage::{
    Element, StageSlide, ACTIVE, HIGHLIGHT, HIGHLIGHT_BUTTON, NER_TOKEN, TAB_BUTTON, TAB_CONTENT,
};

const TITLE_SIZE: f32 = 36.0;
const SUBTITLE_SIZE: f32 = 18.0;
const BODY_SIZE: f32 = 20.0;
const SMALL_SIZE: f32 = 16.0;
const FIGURE_SIZE: f32 = 72.0;
const BAR_HEIGHT: f32 = 12.0;
const ROW_GAP: f32 = 14.0;
const BUTTON_PAD: Vec2 = Vec2::new(14.0, 8.0);
/// Vertical travel of an element while it fades in.
const REVEAL_RISE: f32 = 20.0;
/// Opacity of the outgoing slide during a transition.
const PREV_OPACITY: f32 = 0.35;
const PROGRESS_HEIGHT: f32 = 4.0;
const INDICATOR_RADIUS: f32 = 5.0;
const INDICATOR_SPACING: f32 = 20.0;
const NAV_RADIUS: f32 = 22.0;

/// Axis-aligned rectangle in window pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    pub fn centered(center: Vec2, half: Vec2) -> Self {
        Self::new(center - half, half * 2.0)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        let max = self.origin + self.size;
        p.x >= self.origin.x && p.y >= self.origin.y && p.x <= max.x && p.y <= max.y
    }
}

/// A clickable area and what clicking it does.
#[derive(Debug, Clone, PartialEq)]
pub struct HitRegion {
    pub rect: Rect,
    pub command: Command,
}

impl HitRegion {
    pub fn contains(&self, p: Vec2) -> bool {
        self.rect.contains(p)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub accent: Rgba,
    pub text: Rgba,
    pub muted: Rgba,
    pub panel: Rgba,
}

impl Theme {
    fn from_config(config: &DeckConfig) -> Self {
        let accent = Rgba::from_hex(&config.chrome.accent).unwrap_or(Rgba::rgb(100, 200, 255));
        let text = Rgba::from_hex(&config.chrome.text).unwrap_or(Rgba::WHITE);
        Self {
            accent,
            text,
            muted: text.with_alpha(0.45),
            panel: Rgba::new(255, 255, 255, 0.06),
        }
    }
}

/// How an element is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Role {
    Bar,
    Button,
    Token,
    Pane,
    Figure,
    Line,
}

fn role(el: &Element) -> Role {
    match el.class.as_str() {
        TAB_BUTTON | HIGHLIGHT_BUTTON => Role::Button,
        NER_TOKEN => Role::Token,
        TAB_CONTENT => Role::Pane,
        _ if !el.style.properties.is_empty() => Role::Bar,
        _ if el.id.is_some() => Role::Figure,
        _ => Role::Line,
    }
}

/// Fill fraction for a bar. Values up to 1 are fractions, larger values
/// percentages. Missing or non-numeric values give `None`.
pub fn bar_fraction(el: &Element) -> Option<f32> {
    let value = el
        .style
        .properties
        .keys()
        .find_map(|name| el.numeric_property(name))?;
    let percent = if value <= 1.0 { value * 100.0 } else { value };
    Some((percent / 100.0).clamp(0.0, 1.0) as f32)
}

/// Progress of an element's entrance animation in `[0, 1]`.
pub fn reveal(slide: &StageSlide, el: &Element, now_ms: u64, reveal_ms: u64) -> f32 {
    let Some(entered) = slide.entered_at_ms else {
        return 1.0;
    };
    let delay_ms = el.style.animation_delay.unwrap_or(0.0) * 1000.0;
    let t = now_ms as f64 - entered as f64 - delay_ms;
    (t / reveal_ms.max(1) as f64).clamp(0.0, 1.0) as f32
}

/// Greedy word wrap to lines no wider than `max_width`.
pub fn wrap(text: &str, size: f32, max_width: f32) -> Vec<String> {
    let per_line = ((max_width + font::pixel_size(size)) / font::advance(size)).floor() as usize;
    let per_line = per_line.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let needed = if line.is_empty() {
            word.chars().count()
        } else {
            line.chars().count() + 1 + word.chars().count()
        };
        if needed > per_line && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

pub struct View {
    theme: Theme,
    reveal_ms: u64,
}

/// Per-slide drawing state.
struct Pass<'a> {
    canvas: &'a mut dyn Canvas,
    hits: Option<&'a mut Vec<HitRegion>>,
    alpha: f32,
    left: f32,
    right: f32,
    y: f32,
}

impl View {
    pub fn new(config: &DeckConfig) -> Self {
        Self {
            theme: Theme::from_config(config),
            reveal_ms: config.timing.reveal_ms,
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Draw the presentation at `now_ms` and return the clickable regions,
    /// topmost last.
    pub fn draw(&self, show: &Presentation, now_ms: u64, canvas: &mut dyn Canvas) -> Vec<HitRegion> {
        canvas.clear();
        let mut hits = Vec::new();
        let deck = show.deck();
        let stage = show.stage();

        for (index, state) in deck.states().iter().enumerate() {
            let alpha = match state {
                SlideState::Active => 1.0,
                SlideState::Prev => PREV_OPACITY,
                SlideState::Inactive => continue,
            };
            if let Some(slide) = stage.slide(index) {
                let interactive = *state == SlideState::Active;
                let hits = if interactive { Some(&mut hits) } else { None };
                self.draw_slide(slide, now_ms, alpha, canvas, hits);
            }
        }

        self.draw_chrome(show, canvas, &mut hits);
        hits
    }

    fn draw_slide<'a>(
        &self,
        slide: &StageSlide,
        now_ms: u64,
        alpha: f32,
        canvas: &'a mut dyn Canvas,
        hits: Option<&'a mut Vec<HitRegion>>,
    ) {
        let extent = canvas.extent();
        let margin = (extent.x * 0.08).max(24.0);
        let mut pass = Pass {
            canvas,
            hits,
            alpha,
            left: margin,
            right: extent.x - margin,
            y: extent.y * 0.12,
        };

        let title_width = font::text_width(&slide.title, TITLE_SIZE);
        let x = ((extent.x - title_width) / 2.0).max(margin);
        pass.canvas.text(
            &slide.title,
            Vec2::new(x, pass.y),
            TITLE_SIZE,
            self.theme.text.fade(alpha),
        );
        pass.y += TITLE_SIZE + ROW_GAP;
        if let Some(subtitle) = &slide.subtitle {
            let w = font::text_width(subtitle, SUBTITLE_SIZE);
            let x = ((extent.x - w) / 2.0).max(margin);
            pass.canvas.text(
                subtitle,
                Vec2::new(x, pass.y),
                SUBTITLE_SIZE,
                self.theme.accent.fade(alpha),
            );
            pass.y += SUBTITLE_SIZE + ROW_GAP;
        }
        pass.y += ROW_GAP * 2.0;

        let mut row_x: Option<f32> = None;
        let mut row_role = None;
        for el in &slide.elements {
            let role = role(el);
            let inline = matches!(role, Role::Button | Role::Token);
            if row_x.is_some() && (!inline || row_role != Some(role)) {
                pass.y += SMALL_SIZE + BUTTON_PAD.y * 2.0 + ROW_GAP;
                row_x = None;
            }
            let shown = reveal(slide, el, now_ms, self.reveal_ms);
            let lift = (1.0 - shown) * REVEAL_RISE;
            match role {
                Role::Button | Role::Token => {
                    let x = row_x.unwrap_or(pass.left);
                    row_role = Some(role);
                    row_x = Some(self.draw_chip(&mut pass, el, role, x, lift, shown));
                }
                Role::Bar => self.draw_bar(&mut pass, el, lift, shown),
                Role::Pane => self.draw_pane(&mut pass, el),
                Role::Figure => self.draw_figure(&mut pass, el, lift, shown),
                Role::Line => self.draw_line(&mut pass, el, lift, shown),
            }
        }
    }

    /// Draw a button or token at `x` on the current row, wrapping when full.
    /// Returns where the next chip starts.
    fn draw_chip(&self, pass: &mut Pass<'_>, el: &Element, role: Role, x: f32, lift: f32, shown: f32) -> f32 {
        let label_w = font::text_width(&el.text, SMALL_SIZE);
        let size = Vec2::new(label_w, SMALL_SIZE) + BUTTON_PAD * 2.0;
        let mut x = x;
        if x + size.x > pass.right && x > pass.left {
            x = pass.left;
            pass.y += size.y + ROW_GAP / 2.0;
        }
        let origin = Vec2::new(x, pass.y + lift);
        let alpha = pass.alpha * shown;

        let (fill, ink) = match role {
            Role::Token if el.has_state(HIGHLIGHT) => {
                (self.theme.accent.with_alpha(0.35), self.theme.text)
            }
            Role::Button if el.has_state(ACTIVE) => (self.theme.accent, Rgba::BLACK),
            _ => (self.theme.panel, self.theme.text),
        };
        pass.canvas.fill_rect(origin, size, fill.fade(alpha));
        pass.canvas
            .text(&el.text, origin + BUTTON_PAD, SMALL_SIZE, ink.fade(alpha));

        if role == Role::Button {
            if let Some(hits) = pass.hits.as_mut() {
                let command = if el.class == TAB_BUTTON {
                    el.data("tab").map(|t| Command::SelectTab(t.to_string()))
                } else {
                    el.data("entity").map(|e| Command::ToggleHighlight(e.to_string()))
                };
                if let Some(command) = command {
                    hits.push(HitRegion {
                        rect: Rect::new(Vec2::new(x, pass.y), size),
                        command,
                    });
                }
            }
        }
        x + size.x + BUTTON_PAD.x
    }

    fn draw_bar(&self, pass: &mut Pass<'_>, el: &Element, lift: f32, shown: f32) {
        let alpha = pass.alpha * shown;
        let y = pass.y + lift;
        pass.canvas.text(
            &el.text,
            Vec2::new(pass.left, y),
            SMALL_SIZE,
            self.theme.text.fade(alpha),
        );
        let track_y = y + SMALL_SIZE + 4.0;
        let width = pass.right - pass.left;
        pass.canvas.fill_rect(
            Vec2::new(pass.left, track_y),
            Vec2::new(width, BAR_HEIGHT),
            self.theme.panel.fade(alpha),
        );
        // Unreadable values leave the track empty.
        if let Some(fraction) = bar_fraction(el) {
            pass.canvas.fill_rect(
                Vec2::new(pass.left, track_y),
                Vec2::new(width * fraction * shown, BAR_HEIGHT),
                self.theme.accent.fade(alpha),
            );
        }
        pass.y += SMALL_SIZE + 4.0 + BAR_HEIGHT + ROW_GAP;
    }

    fn draw_pane(&self, pass: &mut Pass<'_>, el: &Element) {
        if !el.has_state(ACTIVE) {
            return;
        }
        let lines = wrap(&el.text, SMALL_SIZE, pass.right - pass.left - BUTTON_PAD.x * 2.0);
        let height = lines.len() as f32 * (SMALL_SIZE + 6.0) + BUTTON_PAD.y * 2.0;
        pass.canvas.fill_rect(
            Vec2::new(pass.left, pass.y),
            Vec2::new(pass.right - pass.left, height),
            self.theme.panel.fade(pass.alpha),
        );
        let mut y = pass.y + BUTTON_PAD.y;
        for line in &lines {
            pass.canvas.text(
                line,
                Vec2::new(pass.left + BUTTON_PAD.x, y),
                SMALL_SIZE,
                self.theme.text.fade(pass.alpha),
            );
            y += SMALL_SIZE + 6.0;
        }
        pass.y += height + ROW_GAP;
    }

    fn draw_figure(&self, pass: &mut Pass<'_>, el: &Element, lift: f32, shown: f32) {
        let w = font::text_width(&el.text, FIGURE_SIZE);
        let x = (pass.left + pass.right - w) / 2.0;
        pass.canvas.text(
            &el.text,
            Vec2::new(x, pass.y + lift),
            FIGURE_SIZE,
            self.theme.accent.fade(pass.alpha * shown),
        );
        pass.y += FIGURE_SIZE + ROW_GAP;
    }

    fn draw_line(&self, pass: &mut Pass<'_>, el: &Element, lift: f32, shown: f32) {
        let color = self.theme.text.fade(pass.alpha * shown);
        for line in wrap(&el.text, BODY_SIZE, pass.right - pass.left) {
            pass.canvas
                .text(&line, Vec2::new(pass.left, pass.y + lift), BODY_SIZE, color);
            pass.y += BODY_SIZE + 6.0;
        }
        pass.y += ROW_GAP;
    }

    fn draw_chrome(&self, show: &Presentation, canvas: &mut dyn Canvas, hits: &mut Vec<HitRegion>) {
        let extent = canvas.extent();
        let deck = show.deck();
        let chrome = &show.stage().chrome;

        if let Some(fraction) = chrome.progress {
            canvas.fill_rect(
                Vec2::ZERO,
                Vec2::new(extent.x * fraction.clamp(0.0, 1.0), PROGRESS_HEIGHT),
                self.theme.accent,
            );
        }

        // Indicators, one per slide, centered along the bottom.
        let n = deck.len();
        let row_width = (n.saturating_sub(1)) as f32 * INDICATOR_SPACING;
        let y = extent.y - 30.0;
        let start = (extent.x - row_width) / 2.0;
        for i in 0..n {
            let center = Vec2::new(start + i as f32 * INDICATOR_SPACING, y);
            let color = if deck.indicator(i) {
                self.theme.accent
            } else {
                self.theme.muted
            };
            canvas.fill_circle(center, INDICATOR_RADIUS, color);
            hits.push(HitRegion {
                rect: Rect::centered(center, Vec2::splat(INDICATOR_SPACING / 2.0)),
                command: Command::GoTo(i),
            });
        }

        // Previous and next buttons.
        let mid = extent.y / 2.0;
        for (center, ch, command) in [
            (Vec2::new(40.0, mid), '<', Command::Prev),
            (Vec2::new(extent.x - 40.0, mid), '>', Command::Next),
        ] {
            canvas.fill_circle(center, NAV_RADIUS, self.theme.panel);
            let glyph_origin = center - Vec2::new(font::advance(BODY_SIZE), BODY_SIZE) / 2.0;
            canvas.glyph(ch, glyph_origin, BODY_SIZE, self.theme.text);
            hits.push(HitRegion {
                rect: Rect::centered(center, Vec2::splat(NAV_RADIUS)),
                command,
            });
        }

        if let Some(label) = &chrome.counter {
            let w = font::text_width(label, SMALL_SIZE);
            canvas.text(
                label,
                Vec2::new(extent.x - 40.0 - w, extent.y - 30.0 - SMALL_SIZE / 2.0),
                SMALL_SIZE,
                self.theme.muted,
            );
        }
    }
}
