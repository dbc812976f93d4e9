//! Fixed pool of ambient particles driven by bass energy and hue state.
//!
//! The pool never grows or shrinks. A particle whose lifespan runs out or
//! which escapes the field is reinitialised in place with a fresh identity:
//! position, velocity, species and target hue are all redrawn.

use crate::constants::*;
use crate::hue::HueState;
use crate::render::ParticleSprite;
use crate::species::{Species, SteerContext, WindField};
use crate::taxonomy::{CategoryTaxonomy, GroupId};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Region where particles are (re)born.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldShape {
    /// Spherical shell between two radii, uniform in direction.
    Shell { inner: f32, outer: f32 },
    /// Square in the z = 0 plane, `-half..half` on both axes.
    Square { half: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldConfig {
    pub count: usize,
    pub shape: FieldShape,
    /// Particles farther than this from the origin are reset.
    pub escape_radius: f32,
    pub vel_smooth: f32,
    pub push_coef: f32,
    /// Bass level at which the speed multiplier saturates at its maximum.
    pub bass_ref: f32,
    pub speed_multiplier_max: f32,
    pub lifespan: (f32, f32),
    pub hue_change: (f32, f32),
    pub size: (f32, f32),
    /// Displayed size grows by `bass * size_bass_coef`.
    pub size_bass_coef: f32,
    /// Brightness at bass 0 and bass 1.
    pub brightness: (f32, f32),
    pub saturation: f32,
    pub alpha_max: f32,
    pub rotation_speed: f32,
    pub flock_radius: f32,
}

impl FieldConfig {
    /// 3D field on a shell around the camera target.
    pub fn shell(count: usize, bounds: f32) -> Self {
        Self {
            count,
            shape: FieldShape::Shell {
                inner: bounds * 0.5,
                outer: bounds * 1.2,
            },
            escape_radius: bounds * ESCAPE_FACTOR,
            vel_smooth: VEL_SMOOTH,
            push_coef: PUSH_COEF,
            bass_ref: BASS_REF,
            speed_multiplier_max: SPEED_MULTIPLIER_MAX,
            lifespan: (PARTICLE_LIFESPAN_MIN, PARTICLE_LIFESPAN_MAX),
            hue_change: (HUE_CHANGE_MIN, HUE_CHANGE_MAX),
            size: (1.0, 5.0),
            size_bass_coef: 50.0,
            brightness: (90.0, 120.0),
            saturation: 80.0,
            alpha_max: 0.8,
            rotation_speed: 0.01,
            flock_radius: FLOCK_RADIUS,
        }
    }

    /// Flat field centred on the screen.
    pub fn plane(count: usize, bounds: f32) -> Self {
        Self {
            shape: FieldShape::Square { half: bounds },
            push_coef: 0.3,
            size: (2.0, 6.0),
            size_bass_coef: 10.0,
            brightness: (60.0, 100.0),
            alpha_max: 0.7,
            rotation_speed: 0.02,
            ..Self::shell(count, bounds)
        }
    }

    pub fn is_flat(&self) -> bool {
        matches!(self.shape, FieldShape::Square { .. })
    }
}

#[derive(Clone, Debug)]
pub struct AmbientParticle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub base_velocity: Vec3,
    pub species: Species,
    /// Group the species was drawn from; `None` for ambience.
    pub group: Option<GroupId>,
    /// Target hue while in balanced mode, fixed until the next reset.
    pub individual_hue: f32,
    /// Continuously chases the individual or global hue.
    pub display_hue: f32,
    pub hue_change_speed: f32,
    pub hue_offset: f32,
    pub lifespan: f32,
    pub max_lifespan: f32,
    pub size: f32,
    pub rotation: Vec3,
    pub rotation_speed: Vec3,
    pub flock_influence: Vec3,
    pub phase: f32,
}

/// Inputs for one field update.
#[derive(Clone, Copy, Debug)]
pub struct FieldContext<'a> {
    pub taxonomy: &'a CategoryTaxonomy,
    pub hue: &'a HueState,
    pub bass: f32,
    pub frame: u64,
    pub wind: &'a WindField,
}

pub struct ParticleField {
    config: FieldConfig,
    particles: Vec<AmbientParticle>,
    rng: StdRng,
    frame: u64,
}

fn map_clamped(v: f32, in_lo: f32, in_hi: f32, out_lo: f32, out_hi: f32) -> f32 {
    let t = ((v - in_lo) / (in_hi - in_lo)).clamp(0.0, 1.0);
    out_lo + (out_hi - out_lo) * t
}

fn random_unit<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let z: f32 = rng.gen_range(-1.0..=1.0);
    let theta = rng.gen_range(0.0..TAU);
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * theta.cos(), r * theta.sin(), z)
}

impl ParticleField {
    /// Creates the pool. `taxonomy` and `hue` seed the first identities.
    pub fn new(config: FieldConfig, taxonomy: &CategoryTaxonomy, hue: &HueState, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut particles = Vec::with_capacity(config.count);
        for _ in 0..config.count {
            let mut p = AmbientParticle {
                position: Vec3::ZERO,
                velocity: Vec3::ZERO,
                base_velocity: Vec3::ZERO,
                species: Species::Ambience,
                group: None,
                individual_hue: hue.current_hue,
                display_hue: rng.gen_range(0.0..360.0),
                hue_change_speed: rng.gen_range(config.hue_change.0..=config.hue_change.1),
                hue_offset: 0.0,
                lifespan: 0.0,
                max_lifespan: 1.0,
                size: 1.0,
                rotation: Vec3::ZERO,
                rotation_speed: Vec3::ZERO,
                flock_influence: Vec3::ZERO,
                phase: rng.gen_range(0.0..TAU),
            };
            Self::reset(&config, &mut rng, &mut p, taxonomy, hue);
            particles.push(p);
        }
        log::debug!("[field] {} particles, shape {:?}", config.count, config.shape);
        Self {
            config,
            particles,
            rng,
            frame: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[AmbientParticle] {
        &self.particles
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    fn reset(
        config: &FieldConfig,
        rng: &mut StdRng,
        p: &mut AmbientParticle,
        taxonomy: &CategoryTaxonomy,
        hue: &HueState,
    ) {
        let flat = config.is_flat();
        p.position = match config.shape {
            FieldShape::Shell { inner, outer } => random_unit(rng) * rng.gen_range(inner..=outer),
            FieldShape::Square { half } => Vec3::new(
                rng.gen_range(-half..=half),
                rng.gen_range(-half..=half),
                0.0,
            ),
        };

        let group = if hue.active_groups.is_empty() {
            None
        } else {
            Some(hue.active_groups[rng.gen_range(0..hue.active_groups.len())])
        };
        p.group = group;
        p.species = group.map_or(Species::Ambience, |g| taxonomy.group(g).species);

        p.velocity = match p.species.rule().launch_speed {
            Some((lo, hi)) => random_unit(rng) * rng.gen_range(lo..=hi),
            None => Vec3::new(
                rng.gen_range(-BASE_SPEED..=BASE_SPEED),
                rng.gen_range(-BASE_SPEED..=BASE_SPEED),
                rng.gen_range(-BASE_SPEED..=BASE_SPEED),
            ),
        };
        if flat {
            p.velocity.z = 0.0;
        }
        p.base_velocity = p.velocity;

        p.size = rng.gen_range(config.size.0..=config.size.1);
        p.lifespan = rng.gen_range(config.lifespan.0..=config.lifespan.1);
        p.max_lifespan = p.lifespan;
        p.hue_offset = rng.gen_range(-HUE_OFFSET_SPREAD..=HUE_OFFSET_SPREAD);
        let spin = config.rotation_speed;
        p.rotation = Vec3::new(rng.gen_range(0.0..TAU), rng.gen_range(0.0..TAU), rng.gen_range(0.0..TAU));
        p.rotation_speed = Vec3::new(
            rng.gen_range(-spin..=spin),
            rng.gen_range(-spin..=spin),
            rng.gen_range(-spin..=spin),
        );
        p.flock_influence = Vec3::ZERO;
        p.individual_hue = if hue.active_hues.is_empty() {
            hue.current_hue
        } else {
            hue.active_hues[rng.gen_range(0..hue.active_hues.len())]
        };
    }

    /// Alignment, cohesion and separation toward same-species flockmates.
    fn compute_flocking(&mut self) {
        let radius = self.config.flock_radius;
        let n = self.particles.len();
        for i in 0..n {
            let species = self.particles[i].species;
            if !species.rule().flocks {
                continue;
            }
            let me = self.particles[i].position;
            let mut alignment = Vec3::ZERO;
            let mut cohesion = Vec3::ZERO;
            let mut separation = Vec3::ZERO;
            let mut neighbours = 0u32;
            for (j, other) in self.particles.iter().enumerate() {
                if i == j || other.species != species {
                    continue;
                }
                let d = me.distance(other.position);
                if d >= radius {
                    continue;
                }
                alignment += other.velocity;
                cohesion += other.position;
                if d < radius / 2.0 && d > 0.0 {
                    separation += (me - other.position) / (d * d);
                }
                neighbours += 1;
            }
            self.particles[i].flock_influence = if neighbours > 0 {
                let n = neighbours as f32;
                (alignment / n).normalize_or_zero()
                    + (cohesion / n - me).normalize_or_zero()
                    + separation.normalize_or_zero()
            } else {
                Vec3::ZERO
            };
        }
    }

    /// Advances every particle by one frame.
    pub fn update(&mut self, ctx: &FieldContext<'_>) {
        self.frame = ctx.frame;
        self.compute_flocking();
        let c = &self.config;
        let speed_multiplier = map_clamped(ctx.bass, 0.0, c.bass_ref, 1.0, c.speed_multiplier_max);
        let mut resets = 0usize;
        for p in &mut self.particles {
            let push = p.position.normalize_or_zero() * ctx.bass * c.push_coef;
            let target = p.base_velocity * speed_multiplier + push;
            p.velocity = p.velocity.lerp(target, c.vel_smooth);

            let steer = SteerContext {
                position: p.position,
                base_velocity: p.base_velocity,
                flock_influence: p.flock_influence,
                frame: ctx.frame,
                wind: ctx.wind,
            };
            (p.species.rule().steer)(&mut p.velocity, &steer);
            if c.is_flat() {
                p.velocity.z = 0.0;
            }

            p.position += p.velocity;
            p.rotation += p.rotation_speed;
            p.lifespan -= 1.0;

            if p.lifespan < 0.0 || p.position.length() > c.escape_radius {
                Self::reset(c, &mut self.rng, p, ctx.taxonomy, ctx.hue);
                resets += 1;
            }

            let target = if ctx.hue.is_balanced_mode {
                p.individual_hue
            } else {
                ctx.hue.current_hue
            };
            p.display_hue += (target - p.display_hue) * p.hue_change_speed;
        }
        if resets > 0 {
            log::trace!("[field] frame {} reset {} particles", ctx.frame, resets);
        }
    }

    /// Render attributes of every particle at the given bass level.
    pub fn display(&self, bass: f32) -> Vec<ParticleSprite> {
        let c = &self.config;
        let brightness = map_clamped(bass, 0.0, 1.0, c.brightness.0, c.brightness.1);
        let frame = self.frame;
        self.particles
            .iter()
            .map(|p| {
                let (shape, size) =
                    (p.species.rule().shape)(p.size + bass * c.size_bass_coef, frame, p.phase);
                ParticleSprite {
                    position: p.position,
                    hue: (p.display_hue + p.hue_offset).rem_euclid(360.0),
                    saturation: c.saturation,
                    brightness,
                    alpha: map_clamped(p.lifespan, 0.0, p.max_lifespan / 2.0, 0.0, c.alpha_max),
                    size,
                    shape,
                    rotation: p.rotation,
                }
            })
            .collect()
    }
}
