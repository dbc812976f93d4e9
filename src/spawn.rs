//! Threshold-triggered spawning with cooldown and duplicate suppression.

use crate::constants::{COOLDOWN_FRAMES, DETECTION_THRESHOLD, SCORE_DISPLAY_MAX};
use crate::score::ScoreTable;
use crate::taxonomy::{CategoryTaxonomy, GroupId, LabelId};
use rand::Rng;
use smallvec::SmallVec;

/// Where a spawned entity is anchored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpawnAnchor {
    /// Spawned at the current frame, placed in space by the entity style.
    Frame,
    /// Anchored to a playback time in seconds (timeline stamps).
    Timeline { time_sec: f64 },
}

/// Request to create one transient entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnEvent {
    pub label: LabelId,
    pub group: GroupId,
    /// Display score at the spawning frame, or the window average for stamps.
    pub strength: f32,
    pub anchor: SpawnAnchor,
}

/// Which counter a spawn resets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CooldownScope {
    PerGroup,
    /// One counter shared by all groups.
    Global,
}

/// How a label is chosen when several in one group qualify.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnPick {
    /// First qualifying label in the group's declaration order.
    FirstInOrder,
    /// Uniformly among the qualifying labels.
    RandomCandidate,
}

/// Frame counters that block spawning while positive.
#[derive(Clone, Debug)]
pub struct GroupCooldowns {
    per_group: Vec<u32>,
    global: u32,
}

impl GroupCooldowns {
    pub fn new(taxonomy: &CategoryTaxonomy) -> Self {
        Self {
            per_group: vec![0; taxonomy.group_count()],
            global: 0,
        }
    }

    /// Decrements every positive counter by one. Call once per frame.
    pub fn tick(&mut self) {
        for c in &mut self.per_group {
            *c = c.saturating_sub(1);
        }
        self.global = self.global.saturating_sub(1);
    }

    #[inline]
    pub fn remaining(&self, group: GroupId, scope: CooldownScope) -> u32 {
        match scope {
            CooldownScope::PerGroup => self.per_group[group.index()],
            CooldownScope::Global => self.global,
        }
    }

    #[inline]
    pub fn is_ready(&self, group: GroupId, scope: CooldownScope) -> bool {
        self.remaining(group, scope) == 0
    }

    pub fn trigger(&mut self, group: GroupId, scope: CooldownScope, frames: u32) {
        match scope {
            CooldownScope::PerGroup => self.per_group[group.index()] = frames,
            CooldownScope::Global => self.global = frames,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnTuning {
    pub detection_threshold: f32,
    pub display_max: f32,
    pub cooldown_frames: u32,
    pub scope: CooldownScope,
    pub pick: SpawnPick,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            detection_threshold: DETECTION_THRESHOLD,
            display_max: SCORE_DISPLAY_MAX,
            cooldown_frames: COOLDOWN_FRAMES,
            scope: CooldownScope::PerGroup,
            pick: SpawnPick::FirstInOrder,
        }
    }
}

/// Emits at most one spawn per group per frame.
#[derive(Clone, Debug, Default)]
pub struct SpawnController {
    pub tuning: SpawnTuning,
}

impl SpawnController {
    pub fn new(tuning: SpawnTuning) -> Self {
        Self { tuning }
    }

    /// Checks every group whose cooldown has expired.
    ///
    /// `last_label` is the label of the most recently spawned live entity; a
    /// label equal to it is skipped so one sustained detection cannot spawn
    /// back to back. Events emitted this frame update it as they go.
    pub fn try_spawn<R: Rng + ?Sized>(
        &self,
        taxonomy: &CategoryTaxonomy,
        scores: &ScoreTable,
        cooldowns: &mut GroupCooldowns,
        mut last_label: Option<LabelId>,
        rng: &mut R,
        out: &mut Vec<SpawnEvent>,
    ) {
        let t = &self.tuning;
        for group in taxonomy.group_ids() {
            if !cooldowns.is_ready(group, t.scope) {
                continue;
            }
            let mut candidates: SmallVec<[(LabelId, f32); 8]> = SmallVec::new();
            for &label in &taxonomy.group(group).labels {
                let display = scores.display_score(label, t.display_max);
                if display > t.detection_threshold && last_label != Some(label) {
                    candidates.push((label, display));
                    if t.pick == SpawnPick::FirstInOrder {
                        break;
                    }
                }
            }
            let picked = match t.pick {
                SpawnPick::FirstInOrder => candidates.first().copied(),
                SpawnPick::RandomCandidate if candidates.is_empty() => None,
                SpawnPick::RandomCandidate => Some(candidates[rng.gen_range(0..candidates.len())]),
            };
            let Some((label, strength)) = picked else {
                continue;
            };
            log::debug!(
                "[spawn] {} / {} at {:.2}",
                taxonomy.group(group).name,
                taxonomy.label_name(label),
                strength
            );
            out.push(SpawnEvent {
                label,
                group,
                strength,
                anchor: SpawnAnchor::Frame,
            });
            cooldowns.trigger(group, t.scope, t.cooldown_frames);
            last_label = Some(label);
        }
    }
}
