use std::ops::RangeInclusive;
use std::time::Duration;

use crate::error::LooperError;

/// Tempos accepted from user input
pub const BPM_RANGE: RangeInclusive<u32> = 1..=400;

/// Fixed beat grid in frames, shared by every track of a session.
///
/// All positions are global frame indices; beat `n` spans
/// `[n * len_beat, (n + 1) * len_beat)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeatGrid {
    len_beat: usize,
}

impl BeatGrid {
    /// Create a grid from a beat length in frames (must be positive)
    pub fn new(len_beat: usize) -> Self {
        assert!(len_beat > 0, "beat length must be positive");
        Self { len_beat }
    }

    /// Derive the grid from tempo: `len_beat = round(60 * sample_rate / bpm)`
    pub fn from_bpm(bpm: u32, sample_rate: u32) -> Result<Self, LooperError> {
        if sample_rate == 0 {
            return Err(LooperError::InvalidArgument(
                "sample rate must be positive".into(),
            ));
        }
        if bpm == 0 {
            return Err(LooperError::InvalidBpm(bpm));
        }
        let len_beat = (60.0 * sample_rate as f64 / bpm as f64).round() as usize;
        if len_beat == 0 {
            return Err(LooperError::InvalidBpm(bpm));
        }
        Ok(Self { len_beat })
    }

    /// Frames in one beat
    #[inline]
    pub fn len_beat(&self) -> usize {
        self.len_beat
    }

    /// Half a beat, rounded down
    #[inline]
    pub fn half(&self) -> usize {
        self.len_beat / 2
    }

    /// Offset of `frame` inside its beat
    #[inline]
    pub fn position_in_beat(&self, frame: u64) -> usize {
        (frame % self.len_beat as u64) as usize
    }

    /// True when `frame` lies in the first half of its beat (midpoint included)
    #[inline]
    pub fn in_first_half(&self, frame: u64) -> bool {
        self.position_in_beat(frame) <= self.half()
    }

    /// True when a window of `frames` starting at `frame` reaches the next beat boundary
    #[inline]
    pub fn crosses_boundary(&self, frame: u64, frames: usize) -> bool {
        self.position_in_beat(frame) + frames >= self.len_beat
    }

    /// Frames left until the next boundary (a full beat when already on one)
    #[inline]
    pub fn frames_to_next_beat(&self, frame: u64) -> usize {
        self.len_beat - self.position_in_beat(frame)
    }

    /// Wall-clock length of one beat
    pub fn duration(&self, sample_rate: u32) -> Duration {
        Duration::from_secs_f64(self.len_beat as f64 / sample_rate as f64)
    }
}
