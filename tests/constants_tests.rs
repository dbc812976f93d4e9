// Host-side tests for constants and their mathematical relationships.

use soundfield::constants::*;

#[test]
#[allow(clippy::assertions_on_constants)]
fn envelope_constants_are_within_reasonable_bounds() {
    assert!(SCORE_BOOST > 0.0);
    assert!(ATTACK > 0.0 && ATTACK <= 1.0);
    // decay must actually fall, but not instantly
    assert!(DECAY > 0.0 && DECAY < 1.0);
    assert!(MODULATION_FACTOR >= 0.0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn hue_thresholds_are_ordered() {
    assert!(ACTIVE_EPS < ACTIVE_THRESHOLD);
    assert!(MIN_ACTIVE_GROUPS >= 1);
    assert!(HUE_SMOOTH > 0.0 && HUE_SMOOTH <= 1.0);
    assert!((0.0..=360.0).contains(&INITIAL_HUE));
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn spawn_and_window_thresholds_fit_display_scale() {
    assert!(DETECTION_THRESHOLD > 0.0 && DETECTION_THRESHOLD <= 1.0);
    assert!(SCORE_DISPLAY_MAX > 0.0);
    assert!(COOLDOWN_FRAMES > 0);
    assert!(WINDOW_SECONDS > 0.0);
    assert!(STAMP_THRESHOLD < DETECTION_THRESHOLD);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn stamp_band_has_room_for_separated_rows() {
    assert!(STAMP_Y_TOP < STAMP_Y_BOTTOM);
    let rows = ((STAMP_Y_BOTTOM - STAMP_Y_TOP) / STAMP_Y_SEPARATION) as usize;
    assert!(rows >= 3, "only {rows} rows fit in the stamp band");
    assert!(STAMP_SIZE_MIN < STAMP_SIZE_MAX);
    assert!(STAMP_JITTER_MIN_PX < STAMP_JITTER_MAX_PX);
    assert!(STAMP_PLACEMENT_ATTEMPTS > 0);
    assert!(RIPPLE_ALPHA_MAX <= 1.0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn particle_ranges_are_ordered() {
    assert!(PARTICLE_LIFESPAN_MIN < PARTICLE_LIFESPAN_MAX);
    assert!(HUE_CHANGE_MIN < HUE_CHANGE_MAX);
    assert!(MACHINE_SPEED_MIN < MACHINE_SPEED_MAX);
    assert!(BURST_SPEED_MIN < BURST_SPEED_MAX);
    assert!(BURST_LIFESPAN_MIN < BURST_LIFESPAN_MAX);
    assert!(ESCAPE_FACTOR > 1.0);
    assert!(SPEED_MULTIPLIER_MAX >= 1.0);
    assert!(BASS_SILENCE_DECAY > 0.0 && BASS_SILENCE_DECAY < 1.0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn entity_fade_fits_inside_icon_lifespan() {
    assert!(FADE_FRAMES > 0.0 && FADE_FRAMES < ICON_LIFESPAN);
    assert!(CONNECTOR_ALPHA_MIN < 1.0);
    assert!(CONNECT_DISTANCE > 0.0);
}
