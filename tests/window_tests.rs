// Time-windowed stamp integration and placement.

use rand::rngs::StdRng;
use rand::SeedableRng;
use soundfield::{
    display_score, CategoryTaxonomy, IntegrationTable, IntegrationWindow, ScoreTable,
    SpawnAnchor, SpawnEvent, StampLayout,
};

struct Rig {
    tax: CategoryTaxonomy,
    scores: ScoreTable,
    table: IntegrationTable,
    window: IntegrationWindow,
}

fn rig() -> Rig {
    let tax = CategoryTaxonomy::extended().unwrap();
    Rig {
        scores: ScoreTable::new(&tax),
        table: IntegrationTable::new(&tax),
        window: IntegrationWindow::default(),
        tax,
    }
}

impl Rig {
    fn sample(&mut self, label: &str, current: f32, t: f64) -> Vec<SpawnEvent> {
        self.scores.set_current(self.tax.lookup(label).unwrap(), current);
        let mut out = Vec::new();
        self.window
            .advance(&self.tax, &self.scores, &mut self.table, t, &mut out);
        out
    }
}

#[test]
fn stamp_strength_is_the_mean_display_score_of_the_window() {
    let mut r = rig();
    let currents = [0.03, 0.06, 0.09, 0.12];
    for (i, &c) in currents.iter().enumerate() {
        assert!(r.sample("Bird", c, i as f64).is_empty(), "no stamp mid-window");
    }
    let expected: f32 =
        currents.iter().map(|&c| display_score(c, 0.3)).sum::<f32>() / currents.len() as f32;

    let events = r.sample("Bird", 0.0, 5.5);
    assert_eq!(events.len(), 1, "only Bird had any score");
    let ev = events[0];
    assert_eq!(r.tax.label_name(ev.label), "Bird");
    assert!((ev.strength - expected).abs() < 1e-6, "{} vs {expected}", ev.strength);
    assert!((ev.strength - 0.25).abs() < 1e-5);
    assert_eq!(ev.anchor, SpawnAnchor::Timeline { time_sec: 2.5 });
}

#[test]
fn at_most_one_stamp_per_label_per_bucket_even_when_looping() {
    let mut r = rig();
    let mut stamped = Vec::new();
    let mut play = |r: &mut Rig, from: f64, to: f64| {
        let mut t = from;
        while t < to {
            for ev in r.sample("Ocean", 0.3, t) {
                if let SpawnAnchor::Timeline { time_sec } = ev.anchor {
                    stamped.push(time_sec);
                }
            }
            t += 1.0 / 60.0;
        }
    };
    play(&mut r, 0.0, 12.0);
    // loop back to the start and play the first two windows again
    play(&mut r, 0.0, 12.0);

    let mut buckets: Vec<i64> = stamped.iter().map(|t| (t / 5.0).floor() as i64).collect();
    let total = buckets.len();
    buckets.sort_unstable();
    buckets.dedup();
    assert_eq!(buckets.len(), total, "a bucket was stamped twice: {stamped:?}");
    assert_eq!(buckets, vec![0, 1, 2]);
}

#[test]
fn weak_windows_are_dropped() {
    let mut r = rig();
    // 0.01 / 0.3 = 0.033 display, below 0.05
    for i in 0..300 {
        assert!(r.sample("Rain", 0.01, i as f64 / 60.0).is_empty());
    }
    assert!(r.sample("Rain", 0.01, 6.0).is_empty());
}

#[test]
fn accumulator_tracks_window_and_sample_count() {
    let mut r = rig();
    for i in 0..10 {
        r.sample("Wind", 0.3, 5.0 + i as f64 * 0.1);
    }
    let acc = r.table.accumulator(r.tax.lookup("Wind").unwrap());
    assert_eq!(acc.window_index, 1);
    assert_eq!(acc.sample_count, 10);
    assert!((acc.sum_score - 10.0).abs() < 1e-5);
}

#[test]
fn placement_maps_time_and_strength() {
    let layout = StampLayout::default();
    let mut rng = StdRng::seed_from_u64(3);
    let p = layout.place(30.0, 0.5, 120.0, &[], &mut rng);
    assert!((p.x_norm - 0.25).abs() < 1e-6);
    assert!((p.size - 55.0).abs() < 1e-4);
    assert!((0.25..=0.75).contains(&p.y_norm));
    assert!((-20.0..=80.0).contains(&p.x_jitter));

    let late = layout.place(500.0, 2.0, 120.0, &[], &mut rng);
    assert_eq!(late.x_norm, 1.0, "anchor is clamped into the track");
    assert_eq!(late.size, 100.0, "strength is clamped to 1");
}

#[test]
fn placement_avoids_nearby_stamps() {
    let layout = StampLayout::default();
    let existing = [(10.0, 0.5)];
    let mut collisions = 0;
    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let y = layout.pick_y_norm(10.5, &existing, &mut rng);
        if (y - 0.5).abs() < 0.1 {
            collisions += 1;
        }
    }
    assert!(collisions <= 1, "{collisions} placements collided");
}

#[test]
fn crowded_band_still_places_a_stamp() {
    let layout = StampLayout::default();
    let existing: Vec<(f64, f32)> = (0..=10).map(|i| (10.0, 0.25 + i as f32 * 0.05)).collect();
    let mut rng = StdRng::seed_from_u64(1);
    let y = layout.pick_y_norm(10.0, &existing, &mut rng);
    assert!((0.25..=0.75).contains(&y));
}
