//! Group score aggregation into a dominant hue and a balanced-mode flag.
//!
//! Hues are averaged linearly, not on the circle. Active hues on both sides
//! of the wrap (say 350 and 10) average to ~180 rather than ~0. The default
//! palette is tuned around this, so the approximation is kept on purpose.

use crate::constants::*;
use crate::score::ScoreTable;
use crate::taxonomy::{CategoryTaxonomy, GroupId};
use smallvec::SmallVec;

/// Process-wide colour state recomputed every frame.
#[derive(Clone, Debug)]
pub struct HueState {
    /// Score-weighted mean of active group hues; held across silence.
    pub target_hue: f32,
    /// Exponentially smoothed toward `target_hue`.
    pub current_hue: f32,
    /// Distinct hues of groups whose sum exceeds the activity epsilon.
    pub active_hues: SmallVec<[f32; 8]>,
    /// Groups with at least one label above the species threshold.
    pub active_groups: SmallVec<[GroupId; 8]>,
    /// Per-group sum of current scores, indexed by `GroupId::index`.
    pub group_scores: Vec<f32>,
    pub active_group_count: usize,
    pub is_balanced_mode: bool,
}

impl HueState {
    pub fn new(taxonomy: &CategoryTaxonomy) -> Self {
        Self {
            target_hue: INITIAL_HUE,
            current_hue: INITIAL_HUE,
            active_hues: SmallVec::new(),
            active_groups: SmallVec::new(),
            group_scores: vec![0.0; taxonomy.group_count()],
            active_group_count: 0,
            is_balanced_mode: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HueTuning {
    pub active_eps: f32,
    pub active_threshold: f32,
    pub min_active_groups: usize,
    pub smoothing: f32,
    pub species_threshold: f32,
}

impl Default for HueTuning {
    fn default() -> Self {
        Self {
            active_eps: ACTIVE_EPS,
            active_threshold: ACTIVE_THRESHOLD,
            min_active_groups: MIN_ACTIVE_GROUPS,
            smoothing: HUE_SMOOTH,
            species_threshold: SPECIES_THRESHOLD,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct HueAggregator {
    pub tuning: HueTuning,
}

impl HueAggregator {
    pub fn new(tuning: HueTuning) -> Self {
        Self { tuning }
    }

    /// Recomputes `hue` from the current scores. Call after the smoother step.
    pub fn recompute(&self, taxonomy: &CategoryTaxonomy, scores: &ScoreTable, hue: &mut HueState) {
        let t = &self.tuning;
        hue.active_hues.clear();
        hue.active_groups.clear();
        hue.group_scores.resize(taxonomy.group_count(), 0.0);

        let mut weighted = 0.0f32;
        let mut total = 0.0f32;
        let mut active_count = 0usize;

        for group in taxonomy.group_ids() {
            let major = taxonomy.group(group);
            let sum = scores.group_sum(taxonomy, group);
            hue.group_scores[group.index()] = sum;

            if sum > t.active_eps {
                weighted += major.hue * sum;
                total += sum;
                if !hue.active_hues.contains(&major.hue) {
                    hue.active_hues.push(major.hue);
                }
            }
            if sum > t.active_threshold {
                active_count += 1;
            }
            if major
                .labels
                .iter()
                .any(|&l| scores.current(l) > t.species_threshold)
            {
                hue.active_groups.push(group);
            }
        }

        if total > 0.0 {
            hue.target_hue = weighted / total;
        }
        hue.current_hue += (hue.target_hue - hue.current_hue) * t.smoothing;
        hue.active_group_count = active_count;

        let balanced = active_count >= t.min_active_groups;
        if balanced != hue.is_balanced_mode {
            log::debug!("[hue] balanced mode {} ({} active groups)", balanced, active_count);
        }
        hue.is_balanced_mode = balanced;
    }
}
