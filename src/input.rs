//! Input handling for the presentation window.
//!
//! [`Input`] folds raw winit window events into the handful of [`Gesture`]s
//! the presentation understands: navigation keys, pointer clicks at a
//! position, and touch starts and ends. Turning a touch pair into a swipe is
//! the job of [`SwipeTracker`], which the presentation owns.
//!
//! winit reports positions in physical pixels. Gestures carry logical
//! pixels, divided by the window's scale factor, so layout and thresholds
//! stay the same on high-DPI displays.
//!
//! ```ignore
//! if let Some(gesture) = input.handle_event(&event) {
//!     presentation.gesture(gesture, &hits);
//! }
//! ```

use glam::Vec2;
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton, TouchPhase, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

/// Keys the presentation reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Escape,
    Other,
}

impl From<WinitKeyCode> for Key {
    fn from(key: WinitKeyCode) -> Self {
        match key {
            WinitKeyCode::ArrowLeft => Key::Left,
            WinitKeyCode::ArrowRight => Key::Right,
            WinitKeyCode::Escape => Key::Escape,
            _ => Key::Other,
        }
    }
}

/// One user action, already stripped of window-system detail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Key(Key),
    /// Primary button released over this point, in window pixels.
    Click(Vec2),
    /// Finger down at this horizontal position.
    TouchStart(f64),
    /// Finger up at this horizontal position.
    TouchEnd(f64),
}

/// Direction of a completed swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    /// Finger moved left: show the next slide.
    Left,
    /// Finger moved right: show the previous slide.
    Right,
}

impl Swipe {
    /// Slide offset the swipe navigates by.
    pub fn offset(self) -> i64 {
        match self {
            Swipe::Left => 1,
            Swipe::Right => -1,
        }
    }
}

/// Horizontal swipe detection from a touch start/end pair.
#[derive(Debug, Clone)]
pub struct SwipeTracker {
    start_x: Option<f64>,
    threshold: f64,
}

impl SwipeTracker {
    pub fn new(threshold: f64) -> Self {
        Self {
            start_x: None,
            threshold,
        }
    }

    pub fn start(&mut self, x: f64) {
        self.start_x = Some(x);
    }

    /// Finish the touch. A swipe needs strictly more than the threshold of
    /// horizontal travel; an end without a start is ignored.
    pub fn end(&mut self, x: f64) -> Option<Swipe> {
        let start = self.start_x.take()?;
        let diff = start - x;
        if diff.abs() <= self.threshold {
            None
        } else if diff > 0.0 {
            Some(Swipe::Left)
        } else {
            Some(Swipe::Right)
        }
    }
}

/// Pointer state tracker.
#[derive(Debug)]
pub struct Input {
    cursor: Vec2,
    pressed: bool,
    scale_factor: f64,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            cursor: Vec2::ZERO,
            pressed: false,
            scale_factor: 1.0,
        }
    }
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the window's physical-to-logical ratio. Non-positive or
    /// non-finite factors fall back to 1.
    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        self.scale_factor = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor
        } else {
            1.0
        };
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Convert a physical window position to logical pixels.
    pub fn to_logical(&self, position: PhysicalPosition<f64>) -> Vec2 {
        let logical = position.to_logical::<f64>(self.scale_factor);
        Vec2::new(logical.x as f32, logical.y as f32)
    }

    // ========== Queries ==========

    /// Last cursor position in logical pixels.
    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    /// Whether the primary button is down.
    pub fn pressed(&self) -> bool {
        self.pressed
    }

    // ========== Event Folding ==========

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) -> Option<Gesture> {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return None;
                }
                match event.physical_key {
                    PhysicalKey::Code(code) => match Key::from(code) {
                        Key::Other => None,
                        key => Some(Gesture::Key(key)),
                    },
                    PhysicalKey::Unidentified(_) => None,
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = self.to_logical(*position);
                None
            }

            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => {
                    self.pressed = true;
                    None
                }
                ElementState::Released => {
                    let was_pressed = std::mem::replace(&mut self.pressed, false);
                    was_pressed.then_some(Gesture::Click(self.cursor))
                }
            },

            WindowEvent::Touch(touch) => match touch.phase {
                TouchPhase::Started => {
                    Some(Gesture::TouchStart(touch.location.x / self.scale_factor))
                }
                TouchPhase::Ended => Some(Gesture::TouchEnd(touch.location.x / self.scale_factor)),
                TouchPhase::Moved | TouchPhase::Cancelled => None,
            },

            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_are_logical() {
        let mut input = Input::new();
        input.set_scale_factor(2.0);
        let p = input.to_logical(PhysicalPosition::new(300.0, 120.0));
        assert_eq!(p, Vec2::new(150.0, 60.0));

        // A 60 logical px swipe is 120 physical px on a 2x display.
        let mut swipe = SwipeTracker::new(50.0);
        swipe.start(400.0 / input.scale_factor());
        assert_eq!(swipe.end(280.0 / input.scale_factor()), Some(Swipe::Left));
        swipe.start(400.0 / input.scale_factor());
        assert_eq!(swipe.end(320.0 / input.scale_factor()), None);
    }

    #[test]
    fn test_bad_scale_factor_is_ignored() {
        let mut input = Input::new();
        input.set_scale_factor(0.0);
        assert_eq!(input.scale_factor(), 1.0);
        input.set_scale_factor(f64::NAN);
        assert_eq!(input.scale_factor(), 1.0);
        input.set_scale_factor(1.5);
        assert_eq!(input.to_logical(PhysicalPosition::new(3.0, 0.0)).x, 2.0);
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(Key::from(WinitKeyCode::ArrowLeft), Key::Left);
        assert_eq!(Key::from(WinitKeyCode::ArrowRight), Key::Right);
        assert_eq!(Key::from(WinitKeyCode::Escape), Key::Escape);
        assert_eq!(Key::from(WinitKeyCode::KeyA), Key::Other);
    }

    #[test]
    fn test_swipe_left_goes_forward() {
        let mut swipe = SwipeTracker::new(50.0);
        swipe.start(300.0);
        assert_eq!(swipe.end(200.0), Some(Swipe::Left));
        assert_eq!(Swipe::Left.offset(), 1);
    }

    #[test]
    fn test_swipe_right_goes_back() {
        let mut swipe = SwipeTracker::new(50.0);
        swipe.start(100.0);
        assert_eq!(swipe.end(180.0), Some(Swipe::Right));
        assert_eq!(Swipe::Right.offset(), -1);
    }

    #[test]
    fn test_swipe_threshold_is_strict() {
        let mut swipe = SwipeTracker::new(50.0);
        swipe.start(100.0);
        assert_eq!(swipe.end(50.0), None);
        swipe.start(100.0);
        assert_eq!(swipe.end(49.0), Some(Swipe::Left));
    }

    #[test]
    fn test_end_without_start_is_ignored() {
        let mut swipe = SwipeTracker::new(50.0);
        assert_eq!(swipe.end(0.0), None);
        swipe.start(500.0);
        swipe.end(0.0);
        // The start is consumed.
        assert_eq!(swipe.end(0.0), None);
    }

    #[test]
    fn test_cursor_tracks_moves() {
        let mut input = Input::new();
        assert_eq!(input.cursor(), Vec2::ZERO);
        input.cursor = Vec2::new(12.0, 34.0);
        assert_eq!(input.cursor(), Vec2::new(12.0, 34.0));
        assert!(!input.pressed());
    }
}
