//! Spectral energy tracking: bass level and waveform smoothing.

use crate::constants::{BAND_ENERGY_MAX, BASS_SILENCE_DECAY, WAVEFORM_SMOOTHING};

/// One frame of analyser output. Band energies use the analyser's 0..=255
/// scale; `waveform` holds time-domain samples in -1..=1.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpectralFrame<'a> {
    pub bass: f32,
    pub mid: f32,
    pub treble: f32,
    pub waveform: &'a [f32],
}

/// Position of the playback clock, used by windowed integration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackClock {
    pub position_sec: f64,
    pub duration_sec: f64,
}

/// Combined band energy with silence decay and exponential smoothing.
///
/// `raw` is the sum of the three bands mapped to 0..=1 each, so it spans
/// 0..=3. Without a spectrum (paused or no analyser) it decays toward 0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BassTracker {
    pub raw: f32,
    pub smoothed: f32,
    pub smoothing: f32,
}

impl BassTracker {
    pub fn new(smoothing: f32) -> Self {
        Self {
            raw: 0.0,
            smoothed: 0.0,
            smoothing,
        }
    }

    pub fn feed(&mut self, frame: Option<&SpectralFrame<'_>>) -> f32 {
        match frame {
            Some(f) => {
                let band = |e: f32| (e / BAND_ENERGY_MAX).clamp(0.0, 1.0);
                self.raw = band(f.bass) + band(f.mid) + band(f.treble);
            }
            None => self.raw *= BASS_SILENCE_DECAY,
        }
        self.smoothed += (self.raw - self.smoothed) * self.smoothing;
        self.smoothed
    }
}

/// Per-sample exponential smoothing of the analyser waveform.
#[derive(Clone, Debug)]
pub struct WaveformSmoother {
    samples: Vec<f32>,
    pub smoothing: f32,
}

impl Default for WaveformSmoother {
    fn default() -> Self {
        Self::new(WAVEFORM_SMOOTHING)
    }
}

impl WaveformSmoother {
    pub fn new(smoothing: f32) -> Self {
        Self {
            samples: Vec::new(),
            smoothing,
        }
    }

    /// Blends `waveform` into the stored samples. A length change restarts
    /// from the incoming samples.
    pub fn feed(&mut self, waveform: &[f32]) {
        if self.samples.len() != waveform.len() {
            self.samples.clear();
            self.samples.extend_from_slice(waveform);
            return;
        }
        for (s, &w) in self.samples.iter_mut().zip(waveform) {
            *s += (w - *s) * self.smoothing;
        }
    }

    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}
