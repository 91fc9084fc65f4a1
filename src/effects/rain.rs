//! Falling binary "digital rain".
//!
//! Each column has a head that moves down one row per frame, printing a
//! random `0` or `1` where it lands. The canvas is never cleared; instead a
//! nearly transparent black wash is painted over it every frame, so older
//! glyphs fade into trails.

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::Effect;
use crate::canvas::{Canvas, Rgba};

/// Glyph cell size in pixels; also the column width and row height.
pub const FONT_SIZE: f32 = 14.0;
/// Chance per frame that a column past the bottom restarts at the top.
pub const RESET_CHANCE: f64 = 0.025;

const GLYPHS: [char; 2] = ['0', '1'];
const FADE: Rgba = Rgba::new(0, 0, 0, 0.05);
const GLYPH_COLOR: Rgba = Rgba::new(0, 255, 70, 1.0);
/// Heads start up to this many rows above the top edge.
const MAX_START_OFFSET: i32 = 20;

/// One vertical stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RainColumn {
    /// Row of the next glyph; negative rows are above the canvas.
    pub head: i32,
}

/// The digital rain backdrop.
#[derive(Debug, Clone)]
pub struct DigitalRain {
    columns: Vec<RainColumn>,
    width: u32,
    height: u32,
    rng: SmallRng,
}

/// Number of columns for a canvas `width` pixels wide.
pub fn column_count(width: u32) -> usize {
    (width as f32 / FONT_SIZE).floor() as usize
}

impl DigitalRain {
    /// One column per [`FONT_SIZE`] pixels of width, each starting a few
    /// rows above the top.
    pub fn new(width: u32, height: u32, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let columns = (0..column_count(width))
            .map(|_| RainColumn::random(&mut rng))
            .collect::<Vec<_>>();
        log::debug!("Digital rain {}x{}: {} columns", width, height, columns.len());
        Self {
            columns,
            width,
            height,
            rng,
        }
    }

    pub fn columns(&self) -> &[RainColumn] {
        &self.columns
    }

    /// Canvas size the rain was last laid out for.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Advance every column one row, drawing its glyph first.
    fn step(&mut self, canvas: &mut dyn Canvas) {
        let bottom = self.height as f32;
        for (i, column) in self.columns.iter_mut().enumerate() {
            let ch = GLYPHS[self.rng.gen_range(0..GLYPHS.len())];
            let origin = Vec2::new(i as f32 * FONT_SIZE, column.head as f32 * FONT_SIZE);
            canvas.glyph(ch, origin, FONT_SIZE, GLYPH_COLOR);

            if column.head as f32 * FONT_SIZE > bottom && self.rng.gen_bool(RESET_CHANCE) {
                column.head = 0;
            }
            column.head += 1;
        }
    }
}

impl RainColumn {
    fn random(rng: &mut impl Rng) -> Self {
        Self {
            head: -rng.gen_range(0..=MAX_START_OFFSET),
        }
    }
}

impl Effect for DigitalRain {
    fn frame(&mut self, canvas: &mut dyn Canvas, _time_ms: f64) {
        let extent = canvas.extent();
        canvas.fill_rect(Vec2::ZERO, extent, FADE);
        self.step(canvas);
    }

    /// Rebuild the column set for the new width. Existing columns keep their
    /// heads; new ones start like a fresh rain.
    fn resize(&mut self, width: u32, height: u32) {
        let count = column_count(width);
        if count < self.columns.len() {
            self.columns.truncate(count);
        } else {
            while self.columns.len() < count {
                let column = RainColumn::random(&mut self.rng);
                self.columns.push(column);
            }
        }
        self.width = width;
        self.height = height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawCommand, Recorder};
    use crate::raster::PixelCanvas;

    #[test]
    fn test_column_count() {
        assert_eq!(column_count(1400), 100);
        assert_eq!(column_count(1413), 100);
        assert_eq!(column_count(13), 0);
        assert_eq!(DigitalRain::new(280, 100, 1).columns().len(), 20);
    }

    #[test]
    fn test_heads_start_above_top() {
        let rain = DigitalRain::new(1400, 800, 9);
        assert!(rain
            .columns()
            .iter()
            .all(|c| (-MAX_START_OFFSET..=0).contains(&c.head)));
    }

    #[test]
    fn test_frame_fades_then_draws_one_glyph_per_column() {
        let mut rain = DigitalRain::new(140, 140, 5);
        let mut canvas = Recorder::new(140, 140);
        rain.frame(&mut canvas, 0.0);

        match &canvas.commands[0] {
            DrawCommand::Rect { origin, size, color } => {
                assert_eq!(*origin, Vec2::ZERO);
                assert_eq!(*size, Vec2::new(140.0, 140.0));
                assert_eq!(*color, FADE);
            }
            other => panic!("expected fade rect, got {:?}", other),
        }
        let glyphs: Vec<_> = canvas.glyphs().collect();
        assert_eq!(glyphs.len(), 10);
        for (i, g) in glyphs.iter().enumerate() {
            match g {
                DrawCommand::Glyph { ch, origin, .. } => {
                    assert!(*ch == '0' || *ch == '1');
                    assert_eq!(origin.x, i as f32 * FONT_SIZE);
                }
                _ => unreachable!(),
            }
        }
    }

    #[test]
    fn test_heads_advance_one_row() {
        let mut rain = DigitalRain::new(140, 10_000, 5);
        let before: Vec<i32> = rain.columns().iter().map(|c| c.head).collect();
        let mut canvas = Recorder::new(140, 10_000);
        rain.frame(&mut canvas, 0.0);
        let after: Vec<i32> = rain.columns().iter().map(|c| c.head).collect();
        for (b, a) in before.iter().zip(&after) {
            assert_eq!(*a, b + 1);
        }
    }

    #[test]
    fn test_columns_past_bottom_eventually_reset() {
        let mut rain = DigitalRain::new(14 * 50, 140, 11);
        let mut canvas = Recorder::new(14 * 50, 140);
        let mut reset_seen = false;
        for _ in 0..400 {
            let before: Vec<i32> = rain.columns().iter().map(|c| c.head).collect();
            rain.frame(&mut canvas, 0.0);
            canvas.take();
            for (b, c) in before.iter().zip(rain.columns()) {
                if c.head == 1 {
                    // Reset only happens past the bottom edge.
                    assert!(*b as f32 * FONT_SIZE > 140.0 || *b == 0);
                    if *b != 0 {
                        reset_seen = true;
                    }
                }
            }
        }
        assert!(reset_seen);
    }

    #[test]
    fn test_trail_fades_on_pixels() {
        let mut rain = DigitalRain::new(14, 14 * 40, 2);
        // Put the only head on the first visible row.
        rain.columns[0].head = 0;
        let mut canvas = PixelCanvas::new(14, 14 * 40);
        rain.frame(&mut canvas, 0.0);

        let lit = |c: &PixelCanvas| (0..14).map(|x| c.pixel(x, 2).unwrap()[1] as u32).sum::<u32>();
        let first = lit(&canvas);
        assert!(first > 0);
        rain.frame(&mut canvas, 0.0);
        assert!(lit(&canvas) < first);
    }

    #[test]
    fn test_resize_rebuilds_columns_keeping_heads() {
        let mut rain = DigitalRain::new(140, 100, 4);
        let kept: Vec<i32> = rain.columns().iter().map(|c| c.head).collect();
        rain.resize(280, 100);
        assert_eq!(rain.columns().len(), 20);
        let heads: Vec<i32> = rain.columns()[..10].iter().map(|c| c.head).collect();
        assert_eq!(heads, kept);
        rain.resize(70, 100);
        assert_eq!(rain.columns().len(), 5);
    }
}
