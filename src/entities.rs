//! Short-lived spawned entities: icons, text, bursts, stamps and ripples.
//!
//! Spawn events become entities through an [`EntityFactory`] configured with
//! the profile's [`EntityStyle`]. The [`TransientEntityManager`] owns them,
//! advances their motion each frame and drops the ones that expire or leave
//! the bounds.

use crate::constants::*;
use crate::energy::PlaybackClock;
use crate::integration::StampLayout;
use crate::render::{Connector, EntitySprite};
use crate::species::{Species, SteerContext, WindField};
use crate::spawn::{SpawnAnchor, SpawnEvent};
use crate::taxonomy::{CategoryTaxonomy, GroupId, LabelId};
use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Lifespan {
    /// Counts down once per frame; the entity is removed below zero.
    Frames { remaining: f32, total: f32 },
    /// Lives until it leaves the bounds or its motion finishes.
    Persistent,
}

/// Per-entity motion rule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Motion {
    /// Advances along +z while swaying vertically around `home_y`.
    Drift {
        home_y: f32,
        sway_range: f32,
        phase: f32,
        speed: f32,
    },
    /// Lateral screen-space flow with a slight vertical wobble.
    Flow { velocity: Vec2, wobble_phase: f32 },
    /// Falls straight down.
    Fall { speed: f32 },
    /// Fired from the origin; damped by its species' burst rule.
    Burst { species: Species, velocity: Vec3 },
    /// Label text advancing along +z.
    Text { speed: f32 },
    /// Anchored to a playback time; does not move.
    Stamp {
        time_sec: f64,
        y_norm: f32,
        strength: f32,
    },
    /// Ring expanding around a fresh stamp.
    Ripple {
        radius: f32,
        max_radius: f32,
        growth: f32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Icon,
    Text,
    Burst,
    Stamp,
    Ripple,
}

impl Motion {
    pub fn kind(&self) -> EntityKind {
        match self {
            Motion::Drift { .. } | Motion::Flow { .. } | Motion::Fall { .. } => EntityKind::Icon,
            Motion::Text { .. } => EntityKind::Text,
            Motion::Burst { .. } => EntityKind::Burst,
            Motion::Stamp { .. } => EntityKind::Stamp,
            Motion::Ripple { .. } => EntityKind::Ripple,
        }
    }
}

impl EntityKind {
    /// Kinds that carry a detected label and count for duplicate suppression.
    #[inline]
    pub fn is_labelled(self) -> bool {
        matches!(self, EntityKind::Icon | EntityKind::Text | EntityKind::Stamp)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TransientEntity {
    pub label: LabelId,
    pub group: GroupId,
    pub position: Vec3,
    pub motion: Motion,
    pub lifespan: Lifespan,
    pub size: f32,
    /// Window-average strength, stamps only.
    pub strength: Option<f32>,
}

impl TransientEntity {
    #[inline]
    pub fn kind(&self) -> EntityKind {
        self.motion.kind()
    }

    fn advance(&mut self, frame: u64, wind: &WindField) {
        let f = frame as f32;
        match &mut self.motion {
            Motion::Drift {
                home_y,
                sway_range,
                phase,
                speed,
            } => {
                self.position.z += *speed;
                self.position.y = *home_y + ((f + *phase) * 0.0025).sin() * *sway_range;
            }
            Motion::Flow {
                velocity,
                wobble_phase,
            } => {
                let wobble = ((f + *wobble_phase) * 0.02).sin() * 0.5 * (velocity.x / 4.0);
                self.position.x += velocity.x;
                self.position.y += velocity.y + wobble;
            }
            Motion::Fall { speed } => self.position.y += *speed,
            Motion::Burst { species, velocity } => {
                let ctx = SteerContext {
                    position: self.position,
                    base_velocity: Vec3::ZERO,
                    flock_influence: Vec3::ZERO,
                    frame,
                    wind,
                };
                (species.rule().burst)(velocity, &ctx);
                self.position += *velocity;
            }
            Motion::Text { speed } => self.position.z += *speed,
            Motion::Stamp { .. } => {}
            Motion::Ripple { radius, growth, .. } => *radius += *growth,
        }
        if let Lifespan::Frames { remaining, .. } = &mut self.lifespan {
            *remaining -= 1.0;
        }
    }

    fn is_finished(&self) -> bool {
        if let Lifespan::Frames { remaining, .. } = self.lifespan {
            if remaining < 0.0 {
                return true;
            }
        }
        matches!(self.motion, Motion::Ripple { radius, max_radius, .. } if radius > max_radius)
    }

    fn alpha(&self) -> f32 {
        match (self.motion, self.lifespan) {
            (Motion::Ripple { radius, max_radius, .. }, _) => {
                RIPPLE_ALPHA_MAX * (1.0 - radius / max_radius).clamp(0.0, 1.0)
            }
            (Motion::Fall { .. } | Motion::Burst { .. }, Lifespan::Frames { remaining, total }) => {
                (remaining / total).clamp(0.0, 1.0)
            }
            (_, Lifespan::Frames { remaining, .. }) => (remaining / FADE_FRAMES).clamp(0.0, 1.0),
            (_, Lifespan::Persistent) => 1.0,
        }
    }
}

/// Axis-aligned region entities may occupy. An entity is removed once it is
/// entirely outside, allowing for its size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntityBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl EntityBounds {
    pub fn contains(&self, position: Vec3, margin: f32) -> bool {
        let m = Vec3::splat(margin.max(0.0));
        position.cmpge(self.min - m).all() && position.cmple(self.max + m).all()
    }
}

#[derive(Clone, Debug)]
pub struct TransientEntityManager {
    entities: Vec<TransientEntity>,
    pub bounds: EntityBounds,
}

impl TransientEntityManager {
    pub fn new(bounds: EntityBounds) -> Self {
        Self {
            entities: Vec::new(),
            bounds,
        }
    }

    pub fn add(&mut self, entity: TransientEntity) {
        self.entities.push(entity);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> &[TransientEntity] {
        &self.entities
    }

    /// Advances every entity and removes finished or out-of-bounds ones.
    /// Returns the number removed.
    pub fn update(&mut self, frame: u64, wind: &WindField) -> usize {
        let before = self.entities.len();
        for i in (0..self.entities.len()).rev() {
            let e = &mut self.entities[i];
            e.advance(frame, wind);
            if e.is_finished() || !self.bounds.contains(e.position, e.size) {
                self.entities.remove(i);
            }
        }
        before - self.entities.len()
    }

    /// Label of the most recently added live icon, text or stamp.
    pub fn last_label(&self) -> Option<LabelId> {
        self.entities
            .iter()
            .rev()
            .find(|e| e.kind().is_labelled())
            .map(|e| e.label)
    }

    /// (time, y_norm) of every live stamp.
    pub fn stamps(&self) -> Vec<(f64, f32)> {
        self.entities
            .iter()
            .filter_map(|e| match e.motion {
                Motion::Stamp { time_sec, y_norm, .. } => Some((time_sec, y_norm)),
                _ => None,
            })
            .collect()
    }

    /// Same-group icon and text pairs closer than `max_distance`.
    pub fn connectors(&self, max_distance: f32) -> Vec<Connector> {
        let mut out = Vec::new();
        let linked: Vec<&TransientEntity> = self
            .entities
            .iter()
            .filter(|e| matches!(e.kind(), EntityKind::Icon | EntityKind::Text))
            .collect();
        for (i, a) in linked.iter().enumerate() {
            for b in &linked[i + 1..] {
                if a.group != b.group {
                    continue;
                }
                let d = a.position.distance(b.position);
                if d < max_distance {
                    let t = d / max_distance;
                    out.push(Connector {
                        from: a.position,
                        to: b.position,
                        group: a.group,
                        alpha: 1.0 + (CONNECTOR_ALPHA_MIN - 1.0) * t,
                    });
                }
            }
        }
        out
    }

    pub fn sprites(&self, taxonomy: &CategoryTaxonomy) -> Vec<EntitySprite> {
        self.entities
            .iter()
            .map(|e| EntitySprite {
                kind: e.kind(),
                label: e.label,
                group: e.group,
                position: e.position,
                hue: taxonomy.hue(e.group),
                alpha: e.alpha(),
                size: match e.motion {
                    Motion::Ripple { radius, .. } => radius,
                    _ => e.size,
                },
            })
            .collect()
    }
}

/// How spawn events are turned into entities.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EntityStyle {
    /// 3D icons drifting toward the camera.
    DriftingIcons,
    /// 2D icons flowing in from the left edge.
    FlowingIcons,
    /// 2D icons falling from the top edge.
    FallingIcons,
    /// 3D label text; on frames divisible by `burst_every` a burst particle of
    /// the group's species is fired as well.
    TextWithBursts { burst_every: u64 },
    /// Timeline stamps, each with a ripple.
    Stamps,
}

/// Inputs needed to place new entities.
#[derive(Clone, Copy, Debug)]
pub struct PlacementContext<'a> {
    pub taxonomy: &'a CategoryTaxonomy,
    pub frame: u64,
    pub playback: Option<PlaybackClock>,
    /// Width and height of the 2D viewport in pixels.
    pub viewport: Vec2,
}

pub struct EntityFactory {
    pub style: EntityStyle,
    pub stamp_layout: StampLayout,
    rng: StdRng,
}

impl EntityFactory {
    pub fn new(style: EntityStyle, seed: u64) -> Self {
        Self {
            style,
            stamp_layout: StampLayout::default(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Replaces the default timeline layout used by [`EntityStyle::Stamps`].
    pub fn with_stamp_layout(mut self, layout: StampLayout) -> Self {
        self.stamp_layout = layout;
        self
    }

    /// Creates the entities for `event` and adds them to `manager`.
    pub fn realize(
        &mut self,
        event: &SpawnEvent,
        ctx: &PlacementContext<'_>,
        manager: &mut TransientEntityManager,
    ) {
        let rng = &mut self.rng;
        let base = |position, motion, lifespan, size| TransientEntity {
            label: event.label,
            group: event.group,
            position,
            motion,
            lifespan,
            size,
            strength: None,
        };
        let icon_life = Lifespan::Frames {
            remaining: ICON_LIFESPAN,
            total: ICON_LIFESPAN,
        };
        match self.style {
            EntityStyle::DriftingIcons => {
                let home_y = rng.gen_range(-1000.0..=1000.0);
                let position = Vec3::new(
                    rng.gen_range(-3500.0..=-2500.0),
                    home_y,
                    rng.gen_range(-1600.0..=-1400.0),
                );
                let motion = Motion::Drift {
                    home_y,
                    sway_range: rng.gen_range(50.0..=500.0),
                    phase: rng.gen_range(0.0..=2000.0),
                    speed: 8.5,
                };
                let size = rng.gen_range(50.0..=150.0);
                manager.add(base(position, motion, icon_life, size));
            }
            EntityStyle::FlowingIcons => {
                let h = ctx.viewport.y;
                let position = Vec3::new(-100.0, rng.gen_range(h * 0.2..=h * 0.8), 0.0);
                let motion = Motion::Flow {
                    velocity: Vec2::new(rng.gen_range(3.0..=6.0), rng.gen_range(-0.5..=0.5)),
                    wobble_phase: rng.gen_range(0.0..=1000.0),
                };
                let size = rng.gen_range(50.0..=120.0);
                manager.add(base(position, motion, Lifespan::Persistent, size));
            }
            EntityStyle::FallingIcons => {
                let size: f32 = rng.gen_range(40.0..=100.0);
                let w = ctx.viewport.x.max(2.0 * size);
                let position = Vec3::new(rng.gen_range(size..=w - size), -size, 0.0);
                let motion = Motion::Fall {
                    speed: rng.gen_range(1.0..=2.5),
                };
                // Alpha fades by 1/200 per frame.
                let life = Lifespan::Frames {
                    remaining: 200.0,
                    total: 200.0,
                };
                manager.add(base(position, motion, life, size));
            }
            EntityStyle::TextWithBursts { burst_every } => {
                let position = Vec3::new(-500.0, rng.gen_range(-200.0..=1000.0), -1400.0);
                let size = 24.0 + 40.0 * event.strength.clamp(0.0, 1.0);
                manager.add(base(position, Motion::Text { speed: 10.0 }, icon_life, size));
                if burst_every > 0 && ctx.frame % burst_every == 0 {
                    let species = ctx.taxonomy.group(event.group).species;
                    let velocity = random_direction(rng)
                        * rng.gen_range(BURST_SPEED_MIN..=BURST_SPEED_MAX);
                    let total = rng.gen_range(BURST_LIFESPAN_MIN..=BURST_LIFESPAN_MAX);
                    let life = Lifespan::Frames {
                        remaining: total,
                        total,
                    };
                    let size = rng.gen_range(5.0..=15.0);
                    log::debug!("[entities] burst for {}", ctx.taxonomy.group(event.group).name);
                    manager.add(base(Vec3::ZERO, Motion::Burst { species, velocity }, life, size));
                }
            }
            EntityStyle::Stamps => {
                let time_sec = match event.anchor {
                    SpawnAnchor::Timeline { time_sec } => time_sec,
                    SpawnAnchor::Frame => ctx.playback.map_or(0.0, |c| c.position_sec),
                };
                let duration = ctx.playback.map_or(time_sec.max(1.0), |c| c.duration_sec);
                let existing = manager.stamps();
                let placement =
                    self.stamp_layout
                        .place(time_sec, event.strength, duration, &existing, rng);
                let w = ctx.viewport.x;
                let position = Vec3::new(
                    (placement.x_norm * w + placement.x_jitter).clamp(0.0, w),
                    placement.y_norm * ctx.viewport.y,
                    0.0,
                );
                let strength = event.strength.clamp(0.0, 1.0);
                manager.add(TransientEntity {
                    strength: Some(strength),
                    ..base(
                        position,
                        Motion::Stamp {
                            time_sec: placement.time_sec,
                            y_norm: placement.y_norm,
                            strength,
                        },
                        Lifespan::Persistent,
                        placement.size,
                    )
                });
                let ripple = Motion::Ripple {
                    radius: 0.0,
                    max_radius: placement.size * RIPPLE_RADIUS_FACTOR,
                    growth: RIPPLE_GROWTH_PX,
                };
                manager.add(base(position, ripple, Lifespan::Persistent, placement.size));
            }
        }
    }
}

fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let z: f32 = rng.gen_range(-1.0..=1.0);
    let theta = rng.gen_range(0.0..TAU);
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * theta.cos(), r * theta.sin(), z)
}
