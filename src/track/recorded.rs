use super::{Frame, SILENCE};

/// A take being captured by the audio context.
///
/// Timestamps are global frame indices. `first_frame_time` may predate
/// `start_rec_time` because the capture is seeded with pre-roll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordedTrack {
    data: Vec<Frame>,
    /// Global frame at which `data[0]` was heard
    pub first_frame_time: Option<u64>,
    /// Global frame at which Start was applied
    pub start_rec_time: Option<u64>,
    /// Global frame at which Stop was applied
    pub stop_rec_time: Option<u64>,
}

impl RecordedTrack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty capture with room for `frames` frames
    pub fn with_capacity(frames: usize) -> Self {
        Self {
            data: Vec::with_capacity(frames),
            ..Self::default()
        }
    }

    /// Build a capture from existing frames (tests and offline tools)
    pub fn from_frames(data: Vec<Frame>) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    pub fn append(&mut self, frames: &[Frame]) {
        self.data.extend_from_slice(frames);
    }

    pub fn append_silence(&mut self, frames: usize) {
        self.data.resize(self.data.len() + frames, SILENCE);
    }

    /// Empty the capture and its timestamps, keeping the allocation
    pub fn clear(&mut self) {
        self.data.clear();
        self.first_frame_time = None;
        self.start_rec_time = None;
        self.stop_rec_time = None;
    }

    /// Drop frames past the last whole beat
    pub fn trim_to_whole_beats(&mut self, len_beat: usize) {
        let whole = self.data.len() - self.data.len() % len_beat;
        self.data.truncate(whole);
    }

    pub fn data(&self) -> &[Frame] {
        &self.data
    }

    pub fn into_data(self) -> Vec<Frame> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Frames that fit without reallocating
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// All three timestamps set and at least one frame captured
    pub fn is_complete(&self) -> bool {
        self.first_frame_time.is_some()
            && self.start_rec_time.is_some()
            && self.stop_rec_time.is_some()
            && !self.data.is_empty()
    }
}
