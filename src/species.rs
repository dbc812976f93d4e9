//! Per-species motion and shape rules.
//!
//! Every major group is tagged with a [`Species`]; particles drawn from an
//! active group adopt that species until their next reset. The rules live in
//! one table so the behaviour of a species is defined in a single place.

use crate::constants::*;
use glam::Vec3;
use noise::{NoiseFn, Perlin};
use std::fmt;

/// Visual species of a particle or burst.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Species {
    /// Default when no group is active.
    Ambience,
    /// Alignment/cohesion/separation with nearby flockmates.
    Flock,
    /// Gentle sinking that relaxes back toward the base drift.
    Water,
    /// Noise-driven lateral gusts with a speed cap.
    Wind,
    /// Fast straight-line travel.
    Machine,
    /// Rhythmic speed and size pulsation.
    Pulse,
}

/// Render primitive suggested for a species.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    Orb,
    Cube,
    Glider,
    Rod,
}

/// Perlin fields behind the wind species, one per axis.
#[derive(Clone)]
pub struct WindField {
    seed: u32,
    axes: [Perlin; 3],
}

impl fmt::Debug for WindField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindField").field("seed", &self.seed).finish()
    }
}

impl WindField {
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            axes: [
                Perlin::new(seed),
                Perlin::new(seed.wrapping_add(1)),
                Perlin::new(seed.wrapping_add(2)),
            ],
        }
    }

    #[inline]
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Gust at `position` on `frame`. Each axis samples its own field along
    /// that coordinate and time, so every component stays within
    /// `±WIND_STRENGTH / 2`. `with_depth == false` leaves z at 0.
    pub fn force(&self, position: Vec3, frame: u64, with_depth: bool) -> Vec3 {
        let scale = WIND_NOISE_SCALE as f64;
        let t = frame as f64 * scale;
        let sample = |axis: usize, coord: f32| {
            let n = self.axes[axis].get([coord as f64 * scale, t]).clamp(-1.0, 1.0);
            (n * 0.5) as f32
        };
        let fz = if with_depth { sample(2, position.z) } else { 0.0 };
        Vec3::new(sample(0, position.x), sample(1, position.y), fz) * WIND_STRENGTH
    }
}

/// Read-only context handed to the steering functions.
#[derive(Clone, Copy, Debug)]
pub struct SteerContext<'a> {
    pub position: Vec3,
    pub base_velocity: Vec3,
    pub flock_influence: Vec3,
    pub frame: u64,
    pub wind: &'a WindField,
}

/// Behaviour table entry for one species.
pub struct SpeciesRule {
    /// Velocity perturbation for ambient particles, applied before integration.
    pub steer: fn(&mut Vec3, &SteerContext<'_>),
    /// Velocity rule for burst entities fired from the origin.
    pub burst: fn(&mut Vec3, &SteerContext<'_>),
    /// Shape and effective size given base size, frame and a per-instance phase.
    pub shape: fn(f32, u64, f32) -> (Shape, f32),
    /// Launch speed range for a random 3D direction; `None` draws each axis from ±BASE_SPEED.
    pub launch_speed: Option<(f32, f32)>,
    /// Whether the field computes flockmate influence for this species.
    pub flocks: bool,
}

fn steer_none(_: &mut Vec3, _: &SteerContext<'_>) {}

fn steer_flock(v: &mut Vec3, ctx: &SteerContext<'_>) {
    *v = v.lerp(ctx.base_velocity + ctx.flock_influence, FLOCK_BLEND);
}

fn steer_water(v: &mut Vec3, ctx: &SteerContext<'_>) {
    v.y += WATER_SINK;
    *v = v.lerp(ctx.base_velocity, WATER_RELAX);
}

fn steer_wind(v: &mut Vec3, ctx: &SteerContext<'_>) {
    *v += ctx.wind.force(ctx.position, ctx.frame, false);
    *v = v.clamp_length_max(WIND_SPEED_LIMIT);
}

fn steer_pulse(v: &mut Vec3, ctx: &SteerContext<'_>) {
    *v *= 1.0 + (ctx.frame as f32 * PULSE_RATE).sin() * PULSE_DEPTH;
}

fn burst_glide(v: &mut Vec3, _: &SteerContext<'_>) {
    *v *= 0.99;
}

fn burst_water(v: &mut Vec3, _: &SteerContext<'_>) {
    v.y -= 0.02;
    *v *= 0.995;
}

fn burst_wind(v: &mut Vec3, ctx: &SteerContext<'_>) {
    *v += ctx.wind.force(ctx.position, ctx.frame, true);
    *v = v.clamp_length_max(BURST_WIND_LIMIT);
}

fn shape_orb(size: f32, _: u64, _: f32) -> (Shape, f32) {
    (Shape::Orb, size)
}

fn shape_glider(size: f32, _: u64, _: f32) -> (Shape, f32) {
    (Shape::Glider, size * 1.5)
}

fn shape_rod(size: f32, _: u64, _: f32) -> (Shape, f32) {
    (Shape::Rod, size)
}

fn shape_cube(size: f32, _: u64, _: f32) -> (Shape, f32) {
    (Shape::Cube, size * 1.5)
}

fn shape_pulse(size: f32, frame: u64, phase: f32) -> (Shape, f32) {
    (
        Shape::Orb,
        size * (1.0 + (frame as f32 * PULSE_RATE + phase).sin() * 0.2),
    )
}

// Indexed by `Species as usize`.
static RULES: [SpeciesRule; 6] = [
    SpeciesRule {
        steer: steer_none,
        burst: burst_glide,
        shape: shape_orb,
        launch_speed: None,
        flocks: false,
    },
    SpeciesRule {
        steer: steer_flock,
        burst: burst_glide,
        shape: shape_glider,
        launch_speed: None,
        flocks: true,
    },
    SpeciesRule {
        steer: steer_water,
        burst: burst_water,
        shape: shape_orb,
        launch_speed: None,
        flocks: false,
    },
    SpeciesRule {
        steer: steer_wind,
        burst: burst_wind,
        shape: shape_rod,
        launch_speed: None,
        flocks: false,
    },
    SpeciesRule {
        steer: steer_none,
        burst: burst_glide,
        shape: shape_cube,
        launch_speed: Some((MACHINE_SPEED_MIN, MACHINE_SPEED_MAX)),
        flocks: false,
    },
    SpeciesRule {
        steer: steer_pulse,
        burst: steer_pulse,
        shape: shape_pulse,
        launch_speed: None,
        flocks: false,
    },
];

impl Species {
    pub const ALL: [Species; 6] = [
        Species::Ambience,
        Species::Flock,
        Species::Water,
        Species::Wind,
        Species::Machine,
        Species::Pulse,
    ];

    #[inline]
    pub fn rule(self) -> &'static SpeciesRule {
        &RULES[self as usize]
    }

    pub fn name(self) -> &'static str {
        match self {
            Species::Ambience => "ambience",
            Species::Flock => "flock",
            Species::Water => "water",
            Species::Wind => "wind",
            Species::Machine => "machine",
            Species::Pulse => "pulse",
        }
    }
}
