// Transient entity lifecycle, connectors and factory placement.

use glam::{Vec2, Vec3};
use soundfield::{
    CategoryTaxonomy, EntityBounds, EntityFactory, EntityKind, EntityStyle, Lifespan, Motion,
    PlacementContext, PlaybackClock, SpawnAnchor, SpawnEvent, TransientEntity,
    TransientEntityManager, WindField,
};

fn bounds() -> EntityBounds {
    EntityBounds {
        min: Vec3::splat(-1000.0),
        max: Vec3::splat(1000.0),
    }
}

fn icon(tax: &CategoryTaxonomy, label: &str, position: Vec3, frames: f32) -> TransientEntity {
    let label = tax.lookup(label).unwrap();
    TransientEntity {
        label,
        group: tax.group_of(label),
        position,
        motion: Motion::Text { speed: 0.0 },
        lifespan: Lifespan::Frames {
            remaining: frames,
            total: frames,
        },
        size: 10.0,
        strength: None,
    }
}

fn event(tax: &CategoryTaxonomy, label: &str, anchor: SpawnAnchor) -> SpawnEvent {
    let label = tax.lookup(label).unwrap();
    SpawnEvent {
        label,
        group: tax.group_of(label),
        strength: 0.5,
        anchor,
    }
}

#[test]
fn entity_is_removed_once_lifespan_goes_negative() {
    let wind = WindField::new(0);
    let tax = CategoryTaxonomy::ambient_default().unwrap();
    let mut m = TransientEntityManager::new(bounds());
    m.add(icon(&tax, "Bird", Vec3::ZERO, 2.0));
    m.update(1, &wind);
    m.update(2, &wind);
    assert_eq!(m.len(), 1, "lifespan 0 is still alive");
    assert_eq!(m.update(3, &wind), 1);
    assert!(m.is_empty());
}

#[test]
fn removal_keeps_survivor_order() {
    let wind = WindField::new(0);
    let tax = CategoryTaxonomy::ambient_default().unwrap();
    let mut m = TransientEntityManager::new(bounds());
    m.add(icon(&tax, "Bird", Vec3::ZERO, 10.0));
    m.add(icon(&tax, "Ocean", Vec3::ZERO, 0.0));
    m.add(icon(&tax, "Wind", Vec3::ZERO, 10.0));
    m.add(icon(&tax, "Car", Vec3::ZERO, 0.0));
    m.update(1, &wind);
    let names: Vec<&str> = m.entities().iter().map(|e| tax.label_name(e.label)).collect();
    assert_eq!(names, vec!["Bird", "Wind"]);
}

#[test]
fn entities_leaving_bounds_are_removed() {
    let wind = WindField::new(0);
    let tax = CategoryTaxonomy::extended().unwrap();
    let mut m = TransientEntityManager::new(bounds());
    let mut e = icon(&tax, "Bird", Vec3::new(1000.0, 0.0, 0.0), 1.0);
    e.motion = Motion::Flow {
        velocity: Vec2::new(6.0, 0.0),
        wobble_phase: 0.0,
    };
    e.lifespan = Lifespan::Persistent;
    m.add(e);
    m.update(1, &wind);
    assert_eq!(m.len(), 1, "still overlapping the edge");
    m.update(2, &wind);
    assert!(m.is_empty(), "fully past the edge");
}

#[test]
fn ripple_expires_when_it_outgrows_its_radius() {
    let wind = WindField::new(0);
    let tax = CategoryTaxonomy::extended().unwrap();
    let mut m = TransientEntityManager::new(bounds());
    let mut e = icon(&tax, "Rain", Vec3::ZERO, 1.0);
    e.motion = Motion::Ripple {
        radius: 0.0,
        max_radius: 10.0,
        growth: 2.0,
    };
    e.lifespan = Lifespan::Persistent;
    m.add(e);
    for frame in 1..=5 {
        m.update(frame, &wind);
    }
    assert_eq!(m.len(), 1);
    m.update(6, &wind);
    assert!(m.is_empty());
}

#[test]
fn connectors_link_close_same_group_entities() {
    let tax = CategoryTaxonomy::ambient_default().unwrap();
    let mut m = TransientEntityManager::new(bounds());
    m.add(icon(&tax, "Bird", Vec3::ZERO, 100.0));
    m.add(icon(&tax, "Rustling leaves", Vec3::new(50.0, 0.0, 0.0), 100.0));
    m.add(icon(&tax, "Ocean", Vec3::new(10.0, 0.0, 0.0), 100.0));
    m.add(icon(&tax, "Stream", Vec3::new(500.0, 0.0, 0.0), 100.0));
    let links = m.connectors(100.0);
    assert_eq!(links.len(), 1, "only the two forest entities are close");
    assert!((links[0].alpha - 0.55).abs() < 1e-5, "alpha {}", links[0].alpha);
    assert_eq!(tax.group(links[0].group).name, "Forest & Life");
}

#[test]
fn last_label_ignores_bursts_and_ripples() {
    let tax = CategoryTaxonomy::ambient_default().unwrap();
    let mut m = TransientEntityManager::new(bounds());
    assert_eq!(m.last_label(), None);
    m.add(icon(&tax, "Bird", Vec3::ZERO, 100.0));
    let mut burst = icon(&tax, "Ocean", Vec3::ZERO, 100.0);
    burst.motion = Motion::Burst {
        species: soundfield::Species::Water,
        velocity: Vec3::X,
    };
    m.add(burst);
    assert_eq!(m.last_label(), tax.lookup("Bird"));
}

#[test]
fn sprites_fade_over_the_last_frames() {
    let tax = CategoryTaxonomy::ambient_default().unwrap();
    let mut m = TransientEntityManager::new(bounds());
    m.add(icon(&tax, "Ocean", Vec3::ZERO, 400.0));
    m.add(icon(&tax, "Wind", Vec3::ZERO, 50.0));
    let sprites = m.sprites(&tax);
    assert_eq!(sprites[0].alpha, 1.0);
    assert!((sprites[1].alpha - 0.5).abs() < 1e-6);
    assert_eq!(sprites[0].hue, 190.0);
    assert_eq!(sprites[1].kind, EntityKind::Text);
}

#[test]
fn stamps_come_with_a_ripple_inside_the_viewport() {
    let wind = WindField::new(0);
    let tax = CategoryTaxonomy::extended().unwrap();
    let mut m = TransientEntityManager::new(EntityBounds {
        min: Vec3::new(-200.0, -200.0, -1.0),
        max: Vec3::new(1330.0, 770.0, 1.0),
    });
    let mut factory = EntityFactory::new(EntityStyle::Stamps, 8);
    let ctx = PlacementContext {
        taxonomy: &tax,
        frame: 1,
        playback: Some(PlaybackClock {
            position_sec: 12.0,
            duration_sec: 60.0,
        }),
        viewport: Vec2::new(1280.0, 720.0),
    };
    factory.realize(&event(&tax, "Rain", SpawnAnchor::Timeline { time_sec: 7.5 }), &ctx, &mut m);
    assert_eq!(m.len(), 2);
    let stamp = &m.entities()[0];
    assert_eq!(stamp.kind(), EntityKind::Stamp);
    assert_eq!(stamp.strength, Some(0.5));
    assert!((0.0..=1280.0).contains(&stamp.position.x));
    assert!((180.0..=540.0).contains(&stamp.position.y));
    assert_eq!(m.entities()[1].kind(), EntityKind::Ripple);
    assert_eq!(m.stamps().len(), 1);
    assert_eq!(m.stamps()[0].0, 7.5);

    // stamps persist; the ripple grows out and disappears
    for frame in 2..200 {
        m.update(frame, &wind);
    }
    assert_eq!(m.len(), 1);
    assert_eq!(m.entities()[0].kind(), EntityKind::Stamp);
}

#[test]
fn text_spawns_a_burst_on_every_tenth_frame() {
    let tax = CategoryTaxonomy::ambient_default().unwrap();
    let mut m = TransientEntityManager::new(bounds());
    let mut factory = EntityFactory::new(EntityStyle::TextWithBursts { burst_every: 10 }, 9);
    let mut ctx = PlacementContext {
        taxonomy: &tax,
        frame: 11,
        playback: None,
        viewport: Vec2::new(1280.0, 720.0),
    };
    factory.realize(&event(&tax, "Wind", SpawnAnchor::Frame), &ctx, &mut m);
    assert_eq!(m.len(), 1);
    ctx.frame = 20;
    factory.realize(&event(&tax, "Fire", SpawnAnchor::Frame), &ctx, &mut m);
    assert_eq!(m.len(), 3);
    let burst = &m.entities()[2];
    assert_eq!(burst.kind(), EntityKind::Burst);
    assert_eq!(burst.position, Vec3::ZERO);
    match burst.motion {
        Motion::Burst { species, velocity } => {
            assert_eq!(species, soundfield::Species::Wind);
            let speed = velocity.length();
            assert!((7.99..=15.01).contains(&speed), "speed {speed}");
        }
        other => panic!("expected burst, got {other:?}"),
    }
}

#[test]
fn drifting_icons_start_far_left_and_advance_in_depth() {
    let wind = WindField::new(0);
    let tax = CategoryTaxonomy::ambient_default().unwrap();
    let mut m = TransientEntityManager::new(EntityBounds {
        min: Vec3::splat(-6000.0),
        max: Vec3::splat(6000.0),
    });
    let mut factory = EntityFactory::new(EntityStyle::DriftingIcons, 10);
    let ctx = PlacementContext {
        taxonomy: &tax,
        frame: 1,
        playback: None,
        viewport: Vec2::new(1280.0, 720.0),
    };
    factory.realize(&event(&tax, "Car", SpawnAnchor::Frame), &ctx, &mut m);
    let start = m.entities()[0].position;
    assert!((-3500.0..=-2500.0).contains(&start.x));
    assert!((-1600.0..=-1400.0).contains(&start.z));
    m.update(2, &wind);
    assert!((m.entities()[0].position.z - start.z - 8.5).abs() < 1e-3);
    for frame in 3..=402 {
        m.update(frame, &wind);
    }
    assert!(m.is_empty(), "icon lifespan is 400 frames");
}

#[test]
fn falling_icons_fade_and_fall() {
    let wind = WindField::new(0);
    let tax = CategoryTaxonomy::extended().unwrap();
    let mut m = TransientEntityManager::new(EntityBounds {
        min: Vec3::new(-200.0, -200.0, -1.0),
        max: Vec3::new(440.0, 894.0, 1.0),
    });
    let mut factory = EntityFactory::new(EntityStyle::FallingIcons, 11);
    let ctx = PlacementContext {
        taxonomy: &tax,
        frame: 1,
        playback: None,
        viewport: Vec2::new(390.0, 844.0),
    };
    factory.realize(&event(&tax, "Piano", SpawnAnchor::Frame), &ctx, &mut m);
    let e = &m.entities()[0];
    assert!((e.size..=390.0 - e.size).contains(&e.position.x));
    assert_eq!(e.position.y, -e.size);
    let y0 = e.position.y;
    m.update(2, &wind);
    let after = &m.entities()[0];
    assert!(after.position.y > y0);
    assert!(m.sprites(&tax)[0].alpha < 1.0);
}
