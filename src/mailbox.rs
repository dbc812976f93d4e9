//! Hand-off of classifier batches from the audio callback to the render loop.
//!
//! The classifier runs on its own cadence (a few batches per second) while the
//! render loop ticks at ~60 Hz. Batches are deposited whole into a single
//! latest-wins slot and drained at most once per tick, so the smoother never
//! observes a partially written batch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// One classifier result entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Classification {
    pub label: String,
    pub score: f32,
}

impl Classification {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// A complete classification batch. An empty batch means "nothing detected".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClassifierBatch {
    pub categories: Vec<Classification>,
}

impl ClassifierBatch {
    pub fn new(categories: Vec<Classification>) -> Self {
        Self { categories }
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, f32)>) -> Self {
        Self {
            categories: pairs
                .into_iter()
                .map(|(label, score)| Classification::new(label, score))
                .collect(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

type Slot = Arc<Mutex<Option<ClassifierBatch>>>;

// The slot only ever holds plain data, so a poisoned lock is still usable.
fn lock(slot: &Slot) -> MutexGuard<'_, Option<ClassifierBatch>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Consumer side, owned by the render loop.
#[derive(Debug, Default)]
pub struct Mailbox {
    slot: Slot,
    playing: Arc<AtomicBool>,
}

impl Mailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Producer handle for the classifier callback. Cheap to clone.
    pub fn sender(&self) -> BatchSender {
        BatchSender {
            slot: Arc::clone(&self.slot),
            playing: Arc::clone(&self.playing),
        }
    }

    /// Toggles the playing guard. Deposits made while paused are discarded.
    pub fn set_playing(&self, playing: bool) {
        self.playing.store(playing, Ordering::Release);
        log::debug!("[mailbox] playing={playing}");
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    /// Drains the pending batch, if any.
    pub fn take(&self) -> Option<ClassifierBatch> {
        lock(&self.slot).take()
    }

    pub fn has_pending(&self) -> bool {
        lock(&self.slot).is_some()
    }
}

/// Producer side, moved into the classifier callback or thread.
#[derive(Clone, Debug)]
pub struct BatchSender {
    slot: Slot,
    playing: Arc<AtomicBool>,
}

impl BatchSender {
    /// Replaces any undrained batch with `batch`. Returns `false` when the
    /// batch was dropped because playback is paused.
    pub fn deposit(&self, batch: ClassifierBatch) -> bool {
        if !self.playing.load(Ordering::Acquire) {
            log::trace!("[mailbox] dropped batch while paused");
            return false;
        }
        let replaced = lock(&self.slot).replace(batch).is_some();
        if replaced {
            log::trace!("[mailbox] overwrote undrained batch");
        }
        true
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }
}
