//! Per-label attack/decay envelope over raw classifier confidence.

use crate::constants::{ATTACK, DECAY, SCORE_BOOST};
use crate::mailbox::ClassifierBatch;
use crate::taxonomy::{CategoryTaxonomy, GroupId, LabelId};

/// Envelope state of one minor label.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CategoryScoreState {
    /// Raw confidence from the most recent batch; 0 when the label was absent.
    pub target_score: f32,
    /// Smoothed, boosted score consumed by the rest of the engine. Never negative.
    pub current_score: f32,
}

/// Scores for every label of a taxonomy plus the modulator's sentinel score.
#[derive(Clone, Debug)]
pub struct ScoreTable {
    states: Vec<CategoryScoreState>,
    sentinel_target: f32,
}

impl ScoreTable {
    pub fn new(taxonomy: &CategoryTaxonomy) -> Self {
        Self {
            states: vec![CategoryScoreState::default(); taxonomy.label_count()],
            sentinel_target: 0.0,
        }
    }

    #[inline]
    pub fn state(&self, label: LabelId) -> &CategoryScoreState {
        &self.states[label.index()]
    }

    #[inline]
    pub fn current(&self, label: LabelId) -> f32 {
        self.states[label.index()].current_score
    }

    #[inline]
    pub fn target(&self, label: LabelId) -> f32 {
        self.states[label.index()].target_score
    }

    /// Raw score of the modulator's sentinel class from the latest batch.
    #[inline]
    pub fn sentinel_target(&self) -> f32 {
        self.sentinel_target
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryScoreState> {
        self.states.iter()
    }

    /// Sum of current scores over a group's labels.
    pub fn group_sum(&self, taxonomy: &CategoryTaxonomy, group: GroupId) -> f32 {
        taxonomy
            .group(group)
            .labels
            .iter()
            .map(|&l| self.current(l))
            .sum()
    }

    /// Current score linearly rescaled from `0..display_max` and clamped to 0..=1.
    #[inline]
    pub fn display_score(&self, label: LabelId, display_max: f32) -> f32 {
        display_score(self.current(label), display_max)
    }

    /// Overwrites a label's smoothed score, e.g. to seed a scene. Negative
    /// and non-finite values read as 0.
    pub fn set_current(&mut self, label: LabelId, value: f32) {
        let value = if value.is_finite() { value.max(0.0) } else { 0.0 };
        self.states[label.index()].current_score = value;
    }

    /// Zeroes every target, as if an empty batch had arrived.
    pub fn clear_targets(&mut self) {
        for s in &mut self.states {
            s.target_score = 0.0;
        }
        self.sentinel_target = 0.0;
    }
}

#[inline]
pub fn display_score(current: f32, display_max: f32) -> f32 {
    (current / display_max).clamp(0.0, 1.0)
}

/// Attack/decay parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreEnvelope {
    pub boost: f32,
    pub attack: f32,
    pub decay: f32,
}

impl Default for ScoreEnvelope {
    fn default() -> Self {
        Self {
            boost: SCORE_BOOST,
            attack: ATTACK,
            decay: DECAY,
        }
    }
}

/// Turns raw per-batch confidence into the smoothed per-frame score.
///
/// [`apply_batch`](Self::apply_batch) runs once per classifier batch;
/// [`step`](Self::step) runs once per render frame.
#[derive(Clone, Debug, Default)]
pub struct ScoreSmoother {
    pub envelope: ScoreEnvelope,
}

impl ScoreSmoother {
    pub fn new(envelope: ScoreEnvelope) -> Self {
        Self { envelope }
    }

    /// Resets every target to 0 and then writes the scores present in `batch`.
    ///
    /// Unknown class names are ignored. Non-finite scores are skipped and
    /// negative ones read as 0. A repeated label keeps its last score.
    pub fn apply_batch(
        &self,
        taxonomy: &CategoryTaxonomy,
        table: &mut ScoreTable,
        batch: &ClassifierBatch,
    ) {
        table.clear_targets();
        let sentinel = taxonomy.modulator().map(|m| m.sentinel.as_str());
        let mut matched = 0usize;
        for c in &batch.categories {
            if !c.score.is_finite() {
                continue;
            }
            let score = c.score.max(0.0);
            if sentinel == Some(c.label.as_str()) {
                table.sentinel_target = score;
            }
            if let Some(id) = taxonomy.lookup(&c.label) {
                table.states[id.index()].target_score = score;
                matched += 1;
            }
        }
        log::trace!(
            "[score] batch of {} entries, {} matched the taxonomy",
            batch.categories.len(),
            matched
        );
    }

    /// 1.0 for ordinary groups; `1 + sentinel * factor` for the modulated group.
    #[inline]
    pub fn group_multiplier(
        &self,
        taxonomy: &CategoryTaxonomy,
        table: &ScoreTable,
        group: GroupId,
    ) -> f32 {
        match taxonomy.modulator() {
            Some(m) if m.group == group => 1.0 + table.sentinel_target * m.factor,
            _ => 1.0,
        }
    }

    #[inline]
    pub fn boosted_target(
        &self,
        taxonomy: &CategoryTaxonomy,
        table: &ScoreTable,
        label: LabelId,
    ) -> f32 {
        let boost = self.envelope.boost * taxonomy.boost(label);
        let multiplier = self.group_multiplier(taxonomy, table, taxonomy.group_of(label));
        table.target(label) * boost * multiplier
    }

    /// Advances every label's envelope by one render frame.
    pub fn step(&self, taxonomy: &CategoryTaxonomy, table: &mut ScoreTable) {
        for (_, label) in taxonomy.pairs() {
            let boosted = self.boosted_target(taxonomy, table, label);
            let state = &mut table.states[label.index()];
            if boosted > state.current_score {
                state.current_score += (boosted - state.current_score) * self.envelope.attack;
            } else {
                state.current_score *= self.envelope.decay;
            }
        }
    }
}
