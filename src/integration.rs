//! Playback-time windows that integrate display scores into timeline stamps.
//!
//! Instead of reacting to a single frame crossing a threshold, each label's
//! display score is averaged over fixed playback-time buckets. When playback
//! moves into a new bucket the finished one is summarised into at most one
//! stamp, independent of frame rate.

use crate::constants::*;
use crate::score::ScoreTable;
use crate::spawn::{SpawnAnchor, SpawnEvent};
use crate::taxonomy::{CategoryTaxonomy, LabelId};
use fnv::FnvHashSet;
use rand::Rng;

/// Running accumulator for one label.
#[derive(Clone, Debug, Default)]
pub struct WindowAccumulator {
    pub window_index: i64,
    pub sum_score: f32,
    pub sample_count: u32,
    stamped: FnvHashSet<i64>,
}

impl WindowAccumulator {
    /// Whether a stamp was already emitted for `window`.
    pub fn was_stamped(&self, window: i64) -> bool {
        self.stamped.contains(&window)
    }
}

/// Accumulators for every label of a taxonomy.
#[derive(Clone, Debug)]
pub struct IntegrationTable {
    accumulators: Vec<WindowAccumulator>,
}

impl IntegrationTable {
    pub fn new(taxonomy: &CategoryTaxonomy) -> Self {
        Self {
            accumulators: vec![WindowAccumulator::default(); taxonomy.label_count()],
        }
    }

    #[inline]
    pub fn accumulator(&self, label: LabelId) -> &WindowAccumulator {
        &self.accumulators[label.index()]
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowTuning {
    pub window_seconds: f64,
    pub stamp_threshold: f32,
    pub display_max: f32,
}

impl Default for WindowTuning {
    fn default() -> Self {
        Self {
            window_seconds: WINDOW_SECONDS,
            stamp_threshold: STAMP_THRESHOLD,
            display_max: SCORE_DISPLAY_MAX,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct IntegrationWindow {
    pub tuning: WindowTuning,
}

impl IntegrationWindow {
    pub fn new(tuning: WindowTuning) -> Self {
        Self { tuning }
    }

    #[inline]
    pub fn window_index(&self, playback_sec: f64) -> i64 {
        (playback_sec / self.tuning.window_seconds).floor() as i64
    }

    /// Folds this frame's display scores into the windows at `playback_sec`,
    /// finalising any window playback has just left.
    pub fn advance(
        &self,
        taxonomy: &CategoryTaxonomy,
        scores: &ScoreTable,
        table: &mut IntegrationTable,
        playback_sec: f64,
        out: &mut Vec<SpawnEvent>,
    ) {
        let t = &self.tuning;
        let index = self.window_index(playback_sec);
        for (group, label) in taxonomy.pairs() {
            let acc = &mut table.accumulators[label.index()];
            if acc.window_index != index {
                let finished = acc.window_index;
                if acc.sample_count > 0 && !acc.stamped.contains(&finished) {
                    let avg = acc.sum_score / acc.sample_count as f32;
                    if avg > t.stamp_threshold {
                        let anchor = (finished as f64 + 0.5) * t.window_seconds;
                        log::debug!(
                            "[window] {} window {} avg {:.3} -> stamp at {:.1}s",
                            taxonomy.label_name(label),
                            finished,
                            avg,
                            anchor
                        );
                        out.push(SpawnEvent {
                            label,
                            group,
                            strength: avg.clamp(0.0, 1.0),
                            anchor: SpawnAnchor::Timeline { time_sec: anchor },
                        });
                        acc.stamped.insert(finished);
                    }
                }
                acc.window_index = index;
                acc.sum_score = 0.0;
                acc.sample_count = 0;
            }
            acc.sum_score += scores.display_score(label, t.display_max);
            acc.sample_count += 1;
        }
    }
}

/// Placement of a stamp on the timeline viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StampPlacement {
    /// Anchor time clamped into the track.
    pub time_sec: f64,
    /// Anchor time over track duration, 0..=1.
    pub x_norm: f32,
    /// Vertical position as a fraction of the viewport height.
    pub y_norm: f32,
    pub size: f32,
    pub x_jitter: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StampLayout {
    pub y_top: f32,
    pub y_bottom: f32,
    pub y_separation: f32,
    pub time_neighborhood_sec: f64,
    pub attempts: usize,
    pub size_min: f32,
    pub size_max: f32,
    pub jitter_min: f32,
    pub jitter_max: f32,
}

impl Default for StampLayout {
    fn default() -> Self {
        Self {
            y_top: STAMP_Y_TOP,
            y_bottom: STAMP_Y_BOTTOM,
            y_separation: STAMP_Y_SEPARATION,
            time_neighborhood_sec: STAMP_TIME_NEIGHBORHOOD_SEC,
            attempts: STAMP_PLACEMENT_ATTEMPTS,
            size_min: STAMP_SIZE_MIN,
            size_max: STAMP_SIZE_MAX,
            jitter_min: STAMP_JITTER_MIN_PX,
            jitter_max: STAMP_JITTER_MAX_PX,
        }
    }
}

impl StampLayout {
    /// Picks a vertical position that avoids stamps within the time
    /// neighbourhood. After `attempts` collisions the last candidate is
    /// accepted anyway.
    pub fn pick_y_norm<R: Rng + ?Sized>(
        &self,
        time_sec: f64,
        existing: &[(f64, f32)],
        rng: &mut R,
    ) -> f32 {
        let mut chosen = rng.gen_range(self.y_top..=self.y_bottom);
        for _ in 0..self.attempts {
            let conflict = existing.iter().any(|&(t, y)| {
                (t - time_sec).abs() < self.time_neighborhood_sec
                    && (y - chosen).abs() < self.y_separation
            });
            if !conflict {
                return chosen;
            }
            chosen = rng.gen_range(self.y_top..=self.y_bottom);
        }
        chosen
    }

    /// Lays out a stamp anchored at `time_sec` on a track of `duration_sec`.
    /// `existing` holds (time, y_norm) of stamps already on the timeline.
    pub fn place<R: Rng + ?Sized>(
        &self,
        time_sec: f64,
        strength: f32,
        duration_sec: f64,
        existing: &[(f64, f32)],
        rng: &mut R,
    ) -> StampPlacement {
        let duration = if duration_sec > 0.0 { duration_sec } else { 1.0 };
        let time_sec = time_sec.clamp(0.0, duration);
        let y_norm = self.pick_y_norm(time_sec, existing, rng);
        let strength = strength.clamp(0.0, 1.0);
        StampPlacement {
            time_sec,
            x_norm: (time_sec / duration) as f32,
            y_norm,
            size: self.size_min + (self.size_max - self.size_min) * strength,
            x_jitter: rng.gen_range(self.jitter_min..=self.jitter_max),
        }
    }
}
