// Spectral energy tracking, wind gusts and sprite packing.

use glam::Vec3;
use soundfield::constants::WIND_STRENGTH;
use soundfield::{
    hsb_to_rgb, BassTracker, ParticleSprite, Shape, SpectralFrame, SpriteInstance,
    WaveformSmoother, WindField,
};

fn frame(bass: f32, mid: f32, treble: f32) -> SpectralFrame<'static> {
    SpectralFrame {
        bass,
        mid,
        treble,
        waveform: &[],
    }
}

#[test]
fn bass_sums_normalised_bands_and_clamps() {
    let mut tracker = BassTracker::new(1.0);
    assert!((tracker.feed(Some(&frame(255.0, 255.0, 255.0))) - 3.0).abs() < 1e-6);
    assert!((tracker.feed(Some(&frame(510.0, -10.0, 0.0))) - 1.0).abs() < 1e-6);
}

#[test]
fn bass_smoothing_lags_behind_raw_level() {
    let mut tracker = BassTracker::new(0.5);
    let first = tracker.feed(Some(&frame(255.0, 0.0, 0.0)));
    assert!((first - 0.5).abs() < 1e-6);
    let second = tracker.feed(Some(&frame(255.0, 0.0, 0.0)));
    assert!((second - 0.75).abs() < 1e-6);
}

#[test]
fn silence_decays_raw_level_geometrically() {
    let mut tracker = BassTracker::new(1.0);
    tracker.feed(Some(&frame(255.0, 0.0, 0.0)));
    tracker.feed(None);
    assert!((tracker.raw - 0.95).abs() < 1e-6);
    tracker.feed(None);
    assert!((tracker.raw - 0.9025).abs() < 1e-6);
}

#[test]
fn waveform_blends_and_restarts_on_length_change() {
    let mut smoother = WaveformSmoother::new(0.1);
    smoother.feed(&[1.0, -1.0]);
    assert_eq!(smoother.samples(), &[1.0, -1.0]);
    smoother.feed(&[0.0, 0.0]);
    assert!((smoother.samples()[0] - 0.9).abs() < 1e-6);
    assert!((smoother.samples()[1] + 0.9).abs() < 1e-6);
    smoother.feed(&[0.25; 4]);
    assert_eq!(smoother.samples(), &[0.25; 4]);
}

#[test]
fn wind_force_is_bounded_deterministic_and_continuous() {
    let wind = WindField::new(7);
    let limit = WIND_STRENGTH * 0.5 + 1e-6;
    let mut prev = wind.force(Vec3::new(0.0, 300.0, -40.0), 0, true);
    for frame in 1..2000u64 {
        let position = Vec3::new(frame as f32, 300.0, -40.0);
        let f = wind.force(position, frame, true);
        for c in f.to_array() {
            assert!(c.abs() <= limit, "{c} out of range at frame {frame}");
        }
        assert!((f - prev).length() < 0.01, "gust jumped at frame {frame}");
        prev = f;
    }

    let at = Vec3::new(123.4, -56.7, 89.0);
    assert_eq!(wind.force(at, 42, true), WindField::new(7).force(at, 42, true));
    assert_eq!(wind.force(at, 42, false).z, 0.0, "flat gusts stay in the plane");

    let other = WindField::new(8);
    let differs = (0..50u64).any(|frame| wind.force(at, frame * 13, true) != other.force(at, frame * 13, true));
    assert!(differs, "seed has no effect");
}

#[test]
fn hsb_primaries() {
    let close = |a: [f32; 3], b: [f32; 3]| a.iter().zip(&b).all(|(x, y)| (x - y).abs() < 1e-5);
    assert!(close(hsb_to_rgb(0.0, 100.0, 100.0), [1.0, 0.0, 0.0]));
    assert!(close(hsb_to_rgb(120.0, 100.0, 100.0), [0.0, 1.0, 0.0]));
    assert!(close(hsb_to_rgb(240.0, 100.0, 100.0), [0.0, 0.0, 1.0]));
    assert!(close(hsb_to_rgb(360.0, 100.0, 100.0), [1.0, 0.0, 0.0]));
    assert!(close(hsb_to_rgb(75.0, 0.0, 50.0), [0.5, 0.5, 0.5]));
    assert!(close(hsb_to_rgb(200.0, 100.0, 0.0), [0.0, 0.0, 0.0]));
}

#[test]
fn sprite_instance_is_tightly_packed() {
    assert_eq!(std::mem::size_of::<SpriteInstance>(), 32);
    let sprite = ParticleSprite {
        position: Vec3::new(1.0, 2.0, 3.0),
        hue: 0.0,
        saturation: 100.0,
        brightness: 150.0,
        alpha: 0.4,
        size: 6.0,
        shape: Shape::Orb,
        rotation: Vec3::ZERO,
    };
    let instance = SpriteInstance::from_particle(&sprite);
    let bytes: &[u8] = bytemuck::bytes_of(&instance);
    assert_eq!(bytes.len(), 32);
    let floats: &[f32] = bytemuck::cast_slice(bytes);
    assert_eq!(&floats[..4], &[1.0, 2.0, 3.0, 6.0]);
    assert_eq!(&floats[4..], &[1.0, 0.0, 0.0, 0.4], "brightness clamps to 1");
}
