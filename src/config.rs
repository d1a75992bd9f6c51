//! Engine configuration.

use std::path::PathBuf;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{error::LooperError, sequencing::BeatGrid, MAX_BLOCK_SIZE};

pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
pub const DEFAULT_BLOCK_SIZE: usize = 100;
pub const DEFAULT_METRONOME_PATH: &str = "assets/metronome.wav";

/// Settings shared by the coordinator, the stream manager and the drivers
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct LooperConfig {
    /// Device and resource sample rate (Hz)
    pub sample_rate: u32,
    /// Frames per processing cycle
    pub block_size: usize,
    /// Metronome click, trimmed or padded to one beat
    pub metronome_path: PathBuf,
    /// Capacity of the Start/Stop queue into the audio context
    pub command_queue_capacity: usize,
    /// Capacity of the finished-recording queue out of the audio context
    pub handoff_capacity: usize,
    /// Frames reserved up front for each new take, in seconds
    pub recording_reserve_seconds: u32,
    /// Extra wait on top of one beat before a stop gives up
    pub handoff_grace_ms: u64,
    /// Named input device, default device when `None`
    pub input_device: Option<String>,
    /// Named output device, default device when `None`
    pub output_device: Option<String>,
}

impl Default for LooperConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            block_size: DEFAULT_BLOCK_SIZE,
            metronome_path: PathBuf::from(DEFAULT_METRONOME_PATH),
            command_queue_capacity: 16,
            handoff_capacity: 4,
            recording_reserve_seconds: 30,
            handoff_grace_ms: 2_000,
            input_device: None,
            output_device: None,
        }
    }
}

impl LooperConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn metronome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.metronome_path = path.into();
        self
    }

    pub fn recording_reserve_seconds(mut self, seconds: u32) -> Self {
        self.recording_reserve_seconds = seconds;
        self
    }

    pub fn handoff_grace(mut self, grace: Duration) -> Self {
        self.handoff_grace_ms = grace.as_millis() as u64;
        self
    }

    pub fn input_device(mut self, name: impl Into<String>) -> Self {
        self.input_device = Some(name.into());
        self
    }

    pub fn output_device(mut self, name: impl Into<String>) -> Self {
        self.output_device = Some(name.into());
        self
    }

    /// Frames reserved for a fresh capture
    pub fn reserve_frames(&self) -> usize {
        self.recording_reserve_seconds as usize * self.sample_rate as usize
    }

    /// How long a stop waits for the audio context to hand over the take.
    ///
    /// A stop in the second half of a beat drains until the next boundary,
    /// so the bound is one beat plus the configured grace.
    pub fn handoff_timeout(&self, grid: &BeatGrid) -> Duration {
        grid.duration(self.sample_rate) + Duration::from_millis(self.handoff_grace_ms)
    }

    /// Check the settings against a beat grid before anything starts
    pub fn validate(&self, grid: &BeatGrid) -> Result<(), LooperError> {
        if self.sample_rate == 0 {
            return Err(LooperError::InvalidArgument(
                "sample rate must be positive".into(),
            ));
        }
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(LooperError::InvalidArgument(format!(
                "block size {} outside 1..={}",
                self.block_size, MAX_BLOCK_SIZE
            )));
        }
        if self.block_size > grid.len_beat() {
            return Err(LooperError::InvalidArgument(format!(
                "block size {} exceeds beat length {}",
                self.block_size,
                grid.len_beat()
            )));
        }
        if self.command_queue_capacity == 0 || self.handoff_capacity == 0 {
            return Err(LooperError::InvalidArgument(
                "queue capacities must be positive".into(),
            ));
        }
        Ok(())
    }
}
