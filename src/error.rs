//! Looper error types

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by the looper engine and its session layer
#[derive(Error, Debug)]
pub enum LooperError {
    /// Audio resource sample rate differs from the engine's
    #[error("Sample rate mismatch: expected {expected}Hz, resource has {found}Hz")]
    InvalidSampleRate { expected: u32, found: u32 },

    /// Audio resource could not be opened or decoded
    #[error("Audio resource unavailable at {}: {source}", path.display())]
    ResourceUnavailable {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    /// Audio resource has more channels than the engine can fold to stereo
    #[error("Unsupported channel count: {0}")]
    UnsupportedChannelCount(u16),

    /// Quantization was handed a capture with missing timestamps or no data
    #[error("Recorded track is incomplete")]
    IncompleteTrack,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid BPM: {0}")]
    InvalidBpm(u32),

    #[error("Track index {index} out of range ({count} tracks)")]
    TrackIndexOutOfRange { index: usize, count: usize },

    /// Command queue towards the audio context is full
    #[error("Command queue is full")]
    QueueFull,

    #[error("Stream already started")]
    StreamAlreadyStarted,

    #[error("Stream is not running")]
    StreamNotRunning,

    /// No recording hand-off arrived in time
    #[error("Timed out after {0:?} waiting for the recording to finish")]
    HandoffTimeout(Duration),

    /// Audio device or stream failure
    #[error("Audio device error: {0}")]
    Device(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Result type for looper operations
pub type Result<T> = std::result::Result<T, LooperError>;
