//! Loop tracks - a take being captured, and a take being played back
//!
//! Two phases, two types:
//! - [`RecordedTrack`] grows by appending and carries the timestamps needed
//!   to snap it to the beat grid.
//! - [`PlayingTrack`] is fixed-length, shares its frames behind an `Arc`
//!   and reads circularly from a global frame position.

mod playing;
mod recorded;

pub use playing::{PlayingTrack, TrackSet, Window};
pub use recorded::RecordedTrack;

/// Fixed-width signed sample
pub type Sample = i16;

/// Channels per frame
pub const CHANNELS: usize = 2;

/// One sample per channel at a single instant
pub type Frame = [Sample; CHANNELS];

pub const SILENCE: Frame = [0; CHANNELS];
