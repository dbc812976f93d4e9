// Hue aggregation and balanced mode.

use soundfield::{CategoryTaxonomy, HueAggregator, HueState, ScoreTable, Species};

fn set(tax: &CategoryTaxonomy, table: &mut ScoreTable, label: &str, value: f32) {
    table.set_current(tax.lookup(label).unwrap(), value);
}

#[test]
fn weighted_hue_of_water_and_music() {
    let tax = CategoryTaxonomy::ambient_default().unwrap();
    let mut table = ScoreTable::new(&tax);
    let mut hue = HueState::new(&tax);
    set(&tax, &mut table, "Ocean", 0.2);
    set(&tax, &mut table, "Drum machine", 0.1);
    HueAggregator::default().recompute(&tax, &table, &mut hue);

    let expected = (190.0 * 0.2 + 30.0 * 0.1) / (0.2 + 0.1);
    assert!((hue.target_hue - expected).abs() < 1e-3, "target {}", hue.target_hue);
    assert!((hue.target_hue - 136.67).abs() < 0.01);
    let smoothed = 210.0 + (expected - 210.0) * 0.1;
    assert!((hue.current_hue - smoothed).abs() < 1e-3);
    assert_eq!(hue.active_hues.as_slice(), &[190.0, 30.0]);
}

#[test]
fn hues_across_the_wrap_average_linearly() {
    let tax = CategoryTaxonomy::builder()
        .group("Low red", 350.0, Species::Ambience, &["a"])
        .group("High red", 10.0, Species::Ambience, &["b"])
        .build()
        .unwrap();
    let mut table = ScoreTable::new(&tax);
    let mut hue = HueState::new(&tax);
    set(&tax, &mut table, "a", 0.5);
    set(&tax, &mut table, "b", 0.5);
    HueAggregator::default().recompute(&tax, &table, &mut hue);
    assert!(
        (hue.target_hue - 180.0).abs() < 1e-3,
        "linear mean of 350 and 10 is 180, got {}",
        hue.target_hue
    );
}

#[test]
fn balanced_mode_boundary_at_three_groups() {
    let tax = CategoryTaxonomy::ambient_default().unwrap();
    let one_label_per_group = ["Bird", "Ocean", "Wind", "Car"];
    for active in 2..=4 {
        let mut table = ScoreTable::new(&tax);
        let mut hue = HueState::new(&tax);
        for label in &one_label_per_group[..active] {
            set(&tax, &mut table, label, 0.2);
        }
        HueAggregator::default().recompute(&tax, &table, &mut hue);
        assert_eq!(hue.active_group_count, active);
        assert_eq!(
            hue.is_balanced_mode,
            active >= 3,
            "{active} active groups"
        );
    }
}

#[test]
fn scores_between_eps_and_threshold_colour_but_do_not_count() {
    let tax = CategoryTaxonomy::ambient_default().unwrap();
    let mut table = ScoreTable::new(&tax);
    let mut hue = HueState::new(&tax);
    set(&tax, &mut table, "Bird", 0.05);
    set(&tax, &mut table, "Ocean", 0.05);
    set(&tax, &mut table, "Wind", 0.05);
    HueAggregator::default().recompute(&tax, &table, &mut hue);
    assert_eq!(hue.active_hues.len(), 3);
    assert_eq!(hue.active_group_count, 0);
    assert!(!hue.is_balanced_mode);
    assert!(hue.active_groups.is_empty(), "0.05 is below the species threshold");
}

#[test]
fn silence_keeps_previous_target() {
    let tax = CategoryTaxonomy::ambient_default().unwrap();
    let mut table = ScoreTable::new(&tax);
    let mut hue = HueState::new(&tax);
    let agg = HueAggregator::default();
    set(&tax, &mut table, "Ocean", 0.5);
    agg.recompute(&tax, &table, &mut hue);
    assert!((hue.target_hue - 190.0).abs() < 1e-4);

    set(&tax, &mut table, "Ocean", 0.0);
    for _ in 0..100 {
        agg.recompute(&tax, &table, &mut hue);
    }
    assert!((hue.target_hue - 190.0).abs() < 1e-4, "target must not reset");
    assert!((hue.current_hue - 190.0).abs() < 0.01, "current keeps easing toward it");
    assert!(hue.active_hues.is_empty());
}

#[test]
fn initial_hue_is_blue() {
    let tax = CategoryTaxonomy::ambient_default().unwrap();
    let hue = HueState::new(&tax);
    assert_eq!(hue.current_hue, 210.0);
    assert_eq!(hue.target_hue, 210.0);
}

#[test]
fn active_groups_list_species_sources() {
    let tax = CategoryTaxonomy::ambient_default().unwrap();
    let mut table = ScoreTable::new(&tax);
    let mut hue = HueState::new(&tax);
    set(&tax, &mut table, "Stream", 0.3);
    set(&tax, &mut table, "Synthesizer", 0.3);
    HueAggregator::default().recompute(&tax, &table, &mut hue);
    let names: Vec<&str> = hue
        .active_groups
        .iter()
        .map(|&g| tax.group(g).name.as_str())
        .collect();
    assert_eq!(names, vec!["Water", "Music"]);
}
