//! The per-frame controller tying every component together.

use crate::energy::{BassTracker, PlaybackClock, SpectralFrame, WaveformSmoother};
use crate::entities::{EntityFactory, PlacementContext, TransientEntityManager};
use crate::error::ProfileError;
use crate::hue::{HueAggregator, HueState};
use crate::integration::{IntegrationTable, IntegrationWindow};
use crate::lifecycle::InitState;
use crate::mailbox::{BatchSender, ClassifierBatch, Mailbox};
use crate::particles::{FieldContext, ParticleField};
use crate::profile::{Profile, SpawnMode};
use crate::render::{Connector, EntitySprite, ParticleSprite, SpriteInstance};
use crate::score::{ScoreSmoother, ScoreTable};
use crate::spawn::{GroupCooldowns, SpawnController, SpawnEvent};
use crate::species::WindField;
use crate::taxonomy::CategoryTaxonomy;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Mutable state shared by the components, owned by one [`Visualizer`].
#[derive(Clone, Debug)]
pub struct VisualizerState {
    pub scores: ScoreTable,
    pub cooldowns: GroupCooldowns,
    pub hue: HueState,
    pub bass: BassTracker,
    pub waveform: WaveformSmoother,
    pub windows: IntegrationTable,
    pub frame: u64,
}

impl VisualizerState {
    pub fn new(taxonomy: &CategoryTaxonomy, profile: &Profile) -> Self {
        Self {
            scores: ScoreTable::new(taxonomy),
            cooldowns: GroupCooldowns::new(taxonomy),
            hue: HueState::new(taxonomy),
            bass: BassTracker::new(profile.bass_smoothing),
            waveform: WaveformSmoother::new(profile.waveform_smoothing),
            windows: IntegrationTable::new(taxonomy),
            frame: 0,
        }
    }
}

/// External inputs for one frame. `None` means the feed is absent this frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput<'a> {
    pub spectral: Option<SpectralFrame<'a>>,
    pub playback: Option<PlaybackClock>,
}

pub struct Visualizer {
    profile: Profile,
    taxonomy: CategoryTaxonomy,
    state: VisualizerState,
    init: InitState,
    mailbox: Mailbox,
    smoother: ScoreSmoother,
    aggregator: HueAggregator,
    field: ParticleField,
    entities: TransientEntityManager,
    factory: EntityFactory,
    rng: StdRng,
    wind: WindField,
    events: Vec<SpawnEvent>,
}

impl Visualizer {
    /// Builds a visualizer in the `Uninitialized` state. Every random draw
    /// derives from `seed`.
    pub fn new(profile: Profile, taxonomy: CategoryTaxonomy, seed: u64) -> Result<Self, ProfileError> {
        profile.validate()?;
        let state = VisualizerState::new(&taxonomy, &profile);
        let field = ParticleField::new(profile.field, &taxonomy, &state.hue, seed);
        log::info!(
            "[visualizer] profile `{}`: {} groups, {} labels, {} particles",
            profile.name,
            taxonomy.group_count(),
            taxonomy.label_count(),
            field.len()
        );
        Ok(Self {
            smoother: ScoreSmoother::new(profile.envelope),
            aggregator: HueAggregator::new(profile.hue),
            entities: TransientEntityManager::new(profile.bounds),
            factory: EntityFactory::new(profile.entity_style, seed ^ 0x5EED_F00D)
                .with_stamp_layout(profile.stamp_layout),
            rng: StdRng::seed_from_u64(seed.wrapping_add(1)),
            wind: WindField::new((seed as u32) ^ (seed >> 32) as u32),
            events: Vec::new(),
            init: InitState::default(),
            mailbox: Mailbox::new(),
            profile,
            taxonomy,
            state,
            field,
        })
    }

    // Lifecycle

    pub fn init_state(&self) -> &InitState {
        &self.init
    }

    pub fn begin_loading(&mut self) {
        self.init.begin_loading();
    }

    pub fn mark_ready(&mut self) {
        self.init.mark_ready();
    }

    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        self.init.mark_failed(reason);
    }

    // Classifier hand-off

    pub fn sender(&self) -> BatchSender {
        self.mailbox.sender()
    }

    pub fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    pub fn set_playing(&self, playing: bool) {
        self.mailbox.set_playing(playing);
    }

    /// Applies a batch immediately, bypassing the mailbox. Ignored unless the
    /// classifier is ready.
    pub fn apply_batch(&mut self, batch: &ClassifierBatch) {
        if self.init.is_ready() {
            self.smoother
                .apply_batch(&self.taxonomy, &mut self.state.scores, batch);
        }
    }

    /// Runs one render frame and returns the spawn events it produced.
    pub fn tick(&mut self, input: &FrameInput<'_>) -> &[SpawnEvent] {
        self.events.clear();
        self.state.frame += 1;
        let frame = self.state.frame;

        if let Some(batch) = self.mailbox.take() {
            if self.init.is_ready() {
                self.smoother
                    .apply_batch(&self.taxonomy, &mut self.state.scores, &batch);
            } else {
                log::trace!("[visualizer] classifier not ready, batch discarded");
            }
        }

        self.state.cooldowns.tick();
        let bass = self.state.bass.feed(input.spectral.as_ref());
        if let Some(spectral) = &input.spectral {
            self.state.waveform.feed(spectral.waveform);
        }

        self.smoother.step(&self.taxonomy, &mut self.state.scores);
        self.aggregator
            .recompute(&self.taxonomy, &self.state.scores, &mut self.state.hue);

        match self.profile.spawn {
            SpawnMode::Instant(tuning) => SpawnController::new(tuning).try_spawn(
                &self.taxonomy,
                &self.state.scores,
                &mut self.state.cooldowns,
                self.entities.last_label(),
                &mut self.rng,
                &mut self.events,
            ),
            SpawnMode::Windowed(tuning) => {
                if let Some(clock) = input.playback {
                    IntegrationWindow::new(tuning).advance(
                        &self.taxonomy,
                        &self.state.scores,
                        &mut self.state.windows,
                        clock.position_sec,
                        &mut self.events,
                    );
                }
            }
        }

        let placement = PlacementContext {
            taxonomy: &self.taxonomy,
            frame,
            playback: input.playback,
            viewport: self.profile.viewport,
        };
        for event in &self.events {
            self.factory.realize(event, &placement, &mut self.entities);
        }

        self.field.update(&FieldContext {
            taxonomy: &self.taxonomy,
            hue: &self.state.hue,
            bass,
            frame,
            wind: &self.wind,
        });
        self.entities.update(frame, &self.wind);

        if frame % 600 == 0 {
            log::trace!(
                "[visualizer] frame {} hue {:.1} balanced {} entities {} bass {:.2}",
                frame,
                self.state.hue.current_hue,
                self.state.hue.is_balanced_mode,
                self.entities.len(),
                bass
            );
        }
        &self.events
    }

    // Outputs

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn taxonomy(&self) -> &CategoryTaxonomy {
        &self.taxonomy
    }

    pub fn state(&self) -> &VisualizerState {
        &self.state
    }

    /// Mutable access for scene seeding and tests.
    pub fn state_mut(&mut self) -> &mut VisualizerState {
        &mut self.state
    }

    pub fn frame(&self) -> u64 {
        self.state.frame
    }

    pub fn hue(&self) -> &HueState {
        &self.state.hue
    }

    pub fn scores(&self) -> &ScoreTable {
        &self.state.scores
    }

    pub fn bass_level(&self) -> f32 {
        self.state.bass.smoothed
    }

    pub fn waveform(&self) -> &[f32] {
        self.state.waveform.samples()
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn entities(&self) -> &TransientEntityManager {
        &self.entities
    }

    pub fn particle_sprites(&self) -> Vec<ParticleSprite> {
        self.field.display(self.state.bass.smoothed)
    }

    pub fn entity_sprites(&self) -> Vec<EntitySprite> {
        self.entities.sprites(&self.taxonomy)
    }

    pub fn connectors(&self) -> Vec<Connector> {
        self.entities.connectors(self.profile.connect_distance)
    }

    /// Particles followed by entities, packed for GPU upload.
    pub fn instances(&self) -> Vec<SpriteInstance> {
        let mut out: Vec<SpriteInstance> = self
            .particle_sprites()
            .iter()
            .map(SpriteInstance::from_particle)
            .collect();
        out.extend(self.entity_sprites().iter().map(SpriteInstance::from_entity));
        out
    }
}
