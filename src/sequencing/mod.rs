// Purpose - musical timing expressed in frames

pub mod beat;

pub use beat::{BeatGrid, BPM_RANGE};
