//! Neural-network particle field.
//!
//! Drifting nodes joined by fading links, with a pulse dot travelling along
//! each link. Links are decided once, from the starting positions, and never
//! recomputed: as nodes drift apart a link simply stops drawing once its
//! current length reaches the cutoff, and nodes that drift together never
//! gain a link. That keeps the per-frame cost proportional to the initial
//! link count instead of quadratic in the node count.

use glam::Vec2;
use rand::Rng;

use super::Effect;
use crate::canvas::{Canvas, Rgba};

/// Viewport pixels per particle.
pub const PARTICLE_AREA: f32 = 15_000.0;
/// Links are recorded, and drawn, only below this distance.
pub const CONNECTION_DISTANCE: f32 = 150.0;

const MAX_SPEED: f32 = 0.25;
const LINK_COLOR: Rgba = Rgba::new(100, 200, 255, 1.0);
const LINK_WIDTH: f32 = 0.5;
const LINK_MAX_ALPHA: f32 = 0.5;
const PULSE_COLOR: Rgba = Rgba::new(180, 235, 255, 0.8);
const PULSE_RADIUS: f32 = 1.5;
/// Radians per millisecond of the pulse oscillation.
const PULSE_RATE: f64 = 0.002;
const HALO_SCALE: f32 = 3.0;
const HALO_ALPHA: f32 = 0.15;

/// One node of the field.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub color: Rgba,
    /// Indices of the particles that were within [`CONNECTION_DISTANCE`] at
    /// creation time.
    pub connections: Vec<usize>,
}

impl Particle {
    fn random(rng: &mut impl Rng, width: f32, height: f32) -> Self {
        let color = Rgba::new(
            rng.gen_range(64..128),
            rng.gen_range(150..230),
            255,
            rng.gen_range(0.3..0.8),
        );
        Self {
            position: Vec2::new(
                rng.gen_range(0.0..=width.max(0.0)),
                rng.gen_range(0.0..=height.max(0.0)),
            ),
            velocity: Vec2::new(
                rng.gen_range(-MAX_SPEED..=MAX_SPEED),
                rng.gen_range(-MAX_SPEED..=MAX_SPEED),
            ),
            radius: rng.gen_range(1.0..3.0),
            color,
            connections: Vec::new(),
        }
    }

    /// Integrate one step and bounce off the edges of `bounds`.
    fn step(&mut self, bounds: Vec2) {
        self.position += self.velocity;
        if self.position.x < 0.0 || self.position.x > bounds.x {
            self.velocity.x = -self.velocity.x;
        }
        if self.position.y < 0.0 || self.position.y > bounds.y {
            self.velocity.y = -self.velocity.y;
        }
    }
}

/// Number of particles for a viewport: one per [`PARTICLE_AREA`] pixels.
pub fn particle_count(width: u32, height: u32) -> usize {
    ((width as f64 * height as f64) / PARTICLE_AREA as f64).floor() as usize
}

/// The neural-network backdrop.
#[derive(Debug, Clone)]
pub struct NeuralField {
    particles: Vec<Particle>,
    bounds: Vec2,
}

impl NeuralField {
    /// Scatter `floor(width * height / 15000)` particles over the viewport
    /// and link every pair closer than [`CONNECTION_DISTANCE`].
    pub fn new(width: u32, height: u32, rng: &mut impl Rng) -> Self {
        let bounds = Vec2::new(width as f32, height as f32);
        let count = particle_count(width, height);
        let mut particles: Vec<Particle> = (0..count)
            .map(|_| Particle::random(rng, bounds.x, bounds.y))
            .collect();
        link_neighbors(&mut particles);

        let links: usize = particles.iter().map(|p| p.connections.len()).sum();
        log::debug!(
            "Neural field {}x{}: {} particles, {} directed links",
            width,
            height,
            count,
            links
        );

        Self { particles, bounds }
    }

    /// Build a field from explicit particles; links are computed here.
    pub fn from_particles(mut particles: Vec<Particle>, width: u32, height: u32) -> Self {
        link_neighbors(&mut particles);
        Self {
            particles,
            bounds: Vec2::new(width as f32, height as f32),
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    /// Draw links and pulses between still-close linked pairs.
    fn draw_links(&self, canvas: &mut dyn Canvas, time_ms: f64) {
        for (i, p) in self.particles.iter().enumerate() {
            for &j in &p.connections {
                let q = &self.particles[j];
                let distance = p.position.distance(q.position);
                if distance >= CONNECTION_DISTANCE {
                    continue;
                }
                let strength = 1.0 - distance / CONNECTION_DISTANCE;
                canvas.line(
                    p.position,
                    q.position,
                    LINK_WIDTH,
                    LINK_COLOR.with_alpha(strength * LINK_MAX_ALPHA),
                );

                let t = pulse_phase(time_ms, i, j);
                canvas.fill_circle(
                    p.position.lerp(q.position, t),
                    PULSE_RADIUS,
                    PULSE_COLOR.fade(strength),
                );
            }
        }
    }
}

/// Where along the link `i -> j` the pulse sits at `time_ms`, in `0..=1`.
pub fn pulse_phase(time_ms: f64, i: usize, j: usize) -> f32 {
    (((time_ms * PULSE_RATE + i as f64 + j as f64).sin() + 1.0) * 0.5) as f32
}

/// Record `j` as a neighbor of `i` for every ordered pair closer than
/// [`CONNECTION_DISTANCE`].
fn link_neighbors(particles: &mut [Particle]) {
    let positions: Vec<Vec2> = particles.iter().map(|p| p.position).collect();
    for (i, p) in particles.iter_mut().enumerate() {
        p.connections = positions
            .iter()
            .enumerate()
            .filter(|&(j, q)| j != i && p.position.distance(*q) < CONNECTION_DISTANCE)
            .map(|(j, _)| j)
            .collect();
    }
}

impl Effect for NeuralField {
    fn frame(&mut self, canvas: &mut dyn Canvas, time_ms: f64) {
        canvas.clear();
        self.draw_links(canvas, time_ms);

        let bounds = self.bounds;
        for p in &mut self.particles {
            p.step(bounds);
            canvas.fill_circle(
                p.position,
                p.radius * HALO_SCALE,
                p.color.fade(HALO_ALPHA),
            );
            canvas.fill_circle(p.position, p.radius, p.color);
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.bounds = Vec2::new(width as f32, height as f32);
    }
}
