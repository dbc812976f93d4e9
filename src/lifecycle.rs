//! Initialization lifecycle of the classifier and its assets.

/// The visualizer only processes classifier output in [`InitState::Ready`].
/// In [`InitState::Failed`] it keeps rendering particles from spectral
/// energy alone.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum InitState {
    #[default]
    Uninitialized,
    LoadingAssets,
    Ready,
    Failed(String),
}

impl InitState {
    pub fn begin_loading(&mut self) {
        match self {
            InitState::Uninitialized => {
                log::info!("[init] loading classifier assets");
                *self = InitState::LoadingAssets;
            }
            other => log::warn!("[init] begin_loading ignored in state {:?}", other),
        }
    }

    pub fn mark_ready(&mut self) {
        match self {
            InitState::LoadingAssets => {
                log::info!("[init] classifier ready");
                *self = InitState::Ready;
            }
            other => log::warn!("[init] mark_ready ignored in state {:?}", other),
        }
    }

    /// Records a load failure. Allowed from any state except `Ready`.
    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        if *self == InitState::Ready {
            log::warn!("[init] mark_failed ignored, classifier already ready");
            return;
        }
        let reason = reason.into();
        log::warn!("[init] classifier unavailable, spectral-only mode: {reason}");
        *self = InitState::Failed(reason);
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(self, InitState::Ready)
    }

    #[inline]
    pub fn is_failed(&self) -> bool {
        matches!(self, InitState::Failed(_))
    }
}
