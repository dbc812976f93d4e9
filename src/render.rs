//! Render attributes handed to an external renderer.
//!
//! Nothing here draws. Sprites describe what to draw in HSB terms; the
//! packed [`SpriteInstance`] is what a GPU renderer uploads with
//! `bytemuck::cast_slice`.

use crate::entities::EntityKind;
use crate::species::Shape;
use crate::taxonomy::{GroupId, LabelId};
use glam::Vec3;

/// Per-particle render attributes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleSprite {
    pub position: Vec3,
    /// Degrees, 0..360.
    pub hue: f32,
    /// 0..=100.
    pub saturation: f32,
    /// 0..=100 nominal; values above 100 saturate when converted.
    pub brightness: f32,
    pub alpha: f32,
    pub size: f32,
    pub shape: Shape,
    pub rotation: Vec3,
}

/// Per-entity render attributes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntitySprite {
    pub kind: EntityKind,
    pub label: LabelId,
    pub group: GroupId,
    pub position: Vec3,
    /// Group hue in degrees.
    pub hue: f32,
    pub alpha: f32,
    pub size: f32,
}

/// A line between two same-group entities.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Connector {
    pub from: Vec3,
    pub to: Vec3,
    pub group: GroupId,
    pub alpha: f32,
}

/// Converts hue in degrees plus saturation and brightness in 0..=100 to
/// linear RGB in 0..=1.
pub fn hsb_to_rgb(hue: f32, saturation: f32, brightness: f32) -> [f32; 3] {
    let h = hue.rem_euclid(360.0) / 60.0;
    let s = (saturation / 100.0).clamp(0.0, 1.0);
    let v = (brightness / 100.0).clamp(0.0, 1.0);
    let c = v * s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = v - c;
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    [r + m, g + m, b + m]
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpriteInstance {
    pub position: [f32; 3],
    pub size: f32,
    pub color: [f32; 4],
}

impl SpriteInstance {
    pub fn from_particle(sprite: &ParticleSprite) -> Self {
        let [r, g, b] = hsb_to_rgb(sprite.hue, sprite.saturation, sprite.brightness);
        Self {
            position: sprite.position.to_array(),
            size: sprite.size,
            color: [r, g, b, sprite.alpha],
        }
    }

    // Entities use the group hue at a fixed saturation and brightness.
    pub fn from_entity(sprite: &EntitySprite) -> Self {
        let [r, g, b] = hsb_to_rgb(sprite.hue, 80.0, 100.0);
        Self {
            position: sprite.position.to_array(),
            size: sprite.size,
            color: [r, g, b, sprite.alpha],
        }
    }
}
