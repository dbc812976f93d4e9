//! Named tuning profiles, one per scene mood.

use crate::constants::*;
use crate::entities::{EntityBounds, EntityStyle};
use crate::error::ProfileError;
use crate::hue::HueTuning;
use crate::integration::{StampLayout, WindowTuning};
use crate::particles::{FieldConfig, FieldShape};
use crate::score::ScoreEnvelope;
use crate::spawn::{CooldownScope, SpawnPick, SpawnTuning};
use glam::{Vec2, Vec3};

/// How detections turn into spawn events.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpawnMode {
    /// Per-frame threshold crossing with cooldowns.
    Instant(SpawnTuning),
    /// Playback-time windows averaged into stamps.
    Windowed(WindowTuning),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Profile {
    pub name: &'static str,
    pub envelope: ScoreEnvelope,
    pub hue: HueTuning,
    pub spawn: SpawnMode,
    pub entity_style: EntityStyle,
    /// Timeline layout for [`EntityStyle::Stamps`].
    pub stamp_layout: StampLayout,
    pub field: FieldConfig,
    pub bass_smoothing: f32,
    pub waveform_smoothing: f32,
    pub connect_distance: f32,
    pub bounds: EntityBounds,
    /// 2D viewport in pixels, used by screen-space entity styles.
    pub viewport: Vec2,
}

const VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);

fn world_bounds(extent: f32) -> EntityBounds {
    EntityBounds {
        min: Vec3::splat(-extent),
        max: Vec3::splat(extent),
    }
}

fn screen_bounds(viewport: Vec2) -> EntityBounds {
    EntityBounds {
        min: Vec3::new(-200.0, -200.0, -1.0),
        max: Vec3::new(viewport.x + 50.0, viewport.y + 50.0, 1.0),
    }
}

impl Profile {
    pub const NAMES: [&'static str; 6] = ["immersive", "flat", "mobile", "mic", "stamp", "cinema"];

    /// 3D field with icons drifting toward the camera.
    pub fn immersive() -> Self {
        Self {
            name: "immersive",
            envelope: ScoreEnvelope::default(),
            hue: HueTuning::default(),
            spawn: SpawnMode::Instant(SpawnTuning::default()),
            entity_style: EntityStyle::DriftingIcons,
            stamp_layout: StampLayout::default(),
            field: FieldConfig::shell(PARTICLE_COUNT, 5000.0),
            bass_smoothing: 0.3,
            waveform_smoothing: WAVEFORM_SMOOTHING,
            connect_distance: CONNECT_DISTANCE,
            bounds: world_bounds(6000.0),
            viewport: VIEWPORT,
        }
    }

    /// 2D canvas with icons flowing across the screen.
    pub fn flat() -> Self {
        Self {
            name: "flat",
            entity_style: EntityStyle::FlowingIcons,
            field: FieldConfig::plane(PARTICLE_COUNT, 600.0),
            bass_smoothing: 0.1,
            bounds: screen_bounds(VIEWPORT),
            ..Self::immersive()
        }
    }

    /// Phone layout: falling icons, fewer particles, random pick among
    /// qualifying labels on raw-scale display.
    pub fn mobile() -> Self {
        Self {
            name: "mobile",
            spawn: SpawnMode::Instant(SpawnTuning {
                display_max: 1.0,
                cooldown_frames: 20,
                pick: SpawnPick::RandomCandidate,
                ..SpawnTuning::default()
            }),
            entity_style: EntityStyle::FallingIcons,
            field: FieldConfig::plane(60, 600.0),
            viewport: Vec2::new(390.0, 844.0),
            bounds: screen_bounds(Vec2::new(390.0, 844.0)),
            ..Self::flat()
        }
    }

    /// Live microphone input; a stricter threshold rejects room noise.
    pub fn mic() -> Self {
        Self {
            name: "mic",
            spawn: SpawnMode::Instant(SpawnTuning {
                detection_threshold: 0.5,
                ..SpawnTuning::default()
            }),
            ..Self::flat()
        }
    }

    /// Timeline stamps integrated over playback-time windows.
    pub fn stamp() -> Self {
        Self {
            name: "stamp",
            spawn: SpawnMode::Windowed(WindowTuning::default()),
            entity_style: EntityStyle::Stamps,
            ..Self::flat()
        }
    }

    /// Film soundtrack: label text plus burst particles, one shared cooldown.
    pub fn cinema() -> Self {
        Self {
            name: "cinema",
            spawn: SpawnMode::Instant(SpawnTuning {
                detection_threshold: 0.2,
                display_max: 0.5,
                cooldown_frames: 10,
                scope: CooldownScope::Global,
                pick: SpawnPick::FirstInOrder,
            }),
            entity_style: EntityStyle::TextWithBursts { burst_every: 10 },
            field: FieldConfig::shell(300, 2500.0),
            ..Self::immersive()
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "immersive" => Some(Self::immersive()),
            "flat" => Some(Self::flat()),
            "mobile" => Some(Self::mobile()),
            "mic" => Some(Self::mic()),
            "stamp" => Some(Self::stamp()),
            "cinema" => Some(Self::cinema()),
            _ => None,
        }
    }

    /// Rejects values that would make the engine misbehave.
    pub fn validate(&self) -> Result<(), ProfileError> {
        unit("envelope.attack", self.envelope.attack)?;
        unit("envelope.decay", self.envelope.decay)?;
        positive("envelope.boost", self.envelope.boost)?;
        unit("hue.smoothing", self.hue.smoothing)?;
        unit("bass_smoothing", self.bass_smoothing)?;
        unit("waveform_smoothing", self.waveform_smoothing)?;
        positive("connect_distance", self.connect_distance)?;
        match &self.spawn {
            SpawnMode::Instant(t) => {
                unit("spawn.detection_threshold", t.detection_threshold)?;
                positive("spawn.display_max", t.display_max)?;
            }
            SpawnMode::Windowed(t) => {
                if t.window_seconds.is_nan() || t.window_seconds <= 0.0 {
                    return Err(ProfileError::NotPositive {
                        field: "window.window_seconds",
                        value: t.window_seconds,
                    });
                }
                unit("window.stamp_threshold", t.stamp_threshold)?;
                positive("window.display_max", t.display_max)?;
            }
        }
        let f = &self.field;
        positive("field.escape_radius", f.escape_radius)?;
        positive("field.bass_ref", f.bass_ref)?;
        unit("field.vel_smooth", f.vel_smooth)?;
        match f.shape {
            FieldShape::Shell { inner, outer } => {
                positive("field.shell.inner", inner)?;
                ordered("field.shell", inner, outer)?;
            }
            FieldShape::Square { half } => positive("field.square.half", half)?,
        }
        non_negative("field.push_coef", f.push_coef)?;
        non_negative("field.rotation_speed", f.rotation_speed)?;
        non_negative("field.flock_radius", f.flock_radius)?;
        ordered("field.lifespan", f.lifespan.0, f.lifespan.1)?;
        positive("field.lifespan", f.lifespan.0)?;
        ordered("field.hue_change", f.hue_change.0, f.hue_change.1)?;
        non_negative("field.hue_change", f.hue_change.0)?;
        ordered("field.size", f.size.0, f.size.1)?;

        let s = &self.stamp_layout;
        unit("stamp.y_top", s.y_top)?;
        unit("stamp.y_bottom", s.y_bottom)?;
        ordered("stamp.y_band", s.y_top, s.y_bottom)?;
        positive("stamp.y_separation", s.y_separation)?;
        if !s.time_neighborhood_sec.is_finite() || s.time_neighborhood_sec < 0.0 {
            return Err(ProfileError::OutOfRange {
                field: "stamp.time_neighborhood_sec",
                value: s.time_neighborhood_sec,
                min: 0.0,
                max: f64::INFINITY,
            });
        }
        ordered("stamp.size", s.size_min, s.size_max)?;
        non_negative("stamp.size_min", s.size_min)?;
        ordered("stamp.jitter", s.jitter_min, s.jitter_max)?;
        positive("viewport.width", self.viewport.x)?;
        positive("viewport.height", self.viewport.y)?;
        Ok(())
    }
}

fn unit(field: &'static str, value: f32) -> Result<(), ProfileError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ProfileError::OutOfRange {
            field,
            value: value as f64,
            min: 0.0,
            max: 1.0,
        })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ProfileError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ProfileError::NotPositive {
            field,
            value: value as f64,
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ProfileError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ProfileError::OutOfRange {
            field,
            value: value as f64,
            min: 0.0,
            max: f64::INFINITY,
        })
    }
}

// Both bounds feed `gen_range`, which panics on non-finite or inverted ranges.
fn ordered(field: &'static str, low: f32, high: f32) -> Result<(), ProfileError> {
    if low.is_finite() && high.is_finite() && low <= high {
        Ok(())
    } else {
        Err(ProfileError::InvertedRange {
            field,
            low: low as f64,
            high: high as f64,
        })
    }
}
