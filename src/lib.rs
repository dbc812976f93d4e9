//! Audio-reactive visual engine driven by sound-category classification.
//!
//! Classifier batches flow through a per-label attack/decay envelope into a
//! dominant hue, spawn events and a fixed pool of ambient particles. Drawing
//! is left to the caller; see [`render`] for the attributes handed over.

pub mod constants;
pub mod energy;
pub mod entities;
pub mod error;
pub mod frame;
pub mod hue;
pub mod integration;
pub mod lifecycle;
pub mod mailbox;
pub mod particles;
pub mod profile;
pub mod render;
pub mod score;
pub mod spawn;
pub mod species;
pub mod taxonomy;

pub use energy::{BassTracker, PlaybackClock, SpectralFrame, WaveformSmoother};
pub use entities::{
    EntityBounds, EntityFactory, EntityKind, EntityStyle, Lifespan, Motion, PlacementContext,
    TransientEntity, TransientEntityManager,
};
pub use error::{ProfileError, TaxonomyError};
pub use frame::{FrameInput, Visualizer, VisualizerState};
pub use hue::{HueAggregator, HueState, HueTuning};
pub use integration::{IntegrationTable, IntegrationWindow, StampLayout, StampPlacement, WindowTuning};
pub use lifecycle::InitState;
pub use mailbox::{BatchSender, Classification, ClassifierBatch, Mailbox};
pub use particles::{AmbientParticle, FieldConfig, FieldContext, FieldShape, ParticleField};
pub use profile::{Profile, SpawnMode};
pub use render::{hsb_to_rgb, Connector, EntitySprite, ParticleSprite, SpriteInstance};
pub use score::{display_score, CategoryScoreState, ScoreEnvelope, ScoreSmoother, ScoreTable};
pub use spawn::{
    CooldownScope, GroupCooldowns, SpawnAnchor, SpawnController, SpawnEvent, SpawnPick, SpawnTuning,
};
pub use species::{Shape, Species, SteerContext, WindField};
pub use taxonomy::{CategoryTaxonomy, GroupId, LabelId, MajorGroup, Modulator, TaxonomyBuilder};
