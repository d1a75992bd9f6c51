//! Benchmarks for the realtime engine.

mod cycle;
mod mix;
mod slice;

pub use cycle::bench_cycle;
pub use mix::bench_mix;
pub use slice::bench_slice;

use lem::track::{Frame, PlayingTrack};

/// A loop of `beats` beats filled with a slow ramp
pub fn ramp_track(beats: usize, playing_from_frame: u64) -> PlayingTrack {
    let data: Vec<Frame> = (0..beats * crate::LEN_BEAT)
        .map(|i| {
            let s = (i % 4096) as i16 - 2048;
            [s, -s]
        })
        .collect();
    PlayingTrack::new(data, playing_from_frame).expect("non-empty track")
}
