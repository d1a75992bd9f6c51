use std::sync::Arc;

use super::Frame;

/// Immutable track set published to the audio context
pub type TrackSet = Vec<PlayingTrack>;

/// A loop being played back.
///
/// The frames never change once built; cloning only bumps the `Arc`, so a
/// track can sit in several published snapshots at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayingTrack {
    data: Arc<[Frame]>,
    /// Global frame at which the loop's first frame is heard
    playing_from_frame: u64,
}

impl PlayingTrack {
    /// Build a track; `None` when `data` is empty (an empty loop has no period)
    pub fn new(data: impl Into<Arc<[Frame]>>, playing_from_frame: u64) -> Option<Self> {
        let data = data.into();
        if data.is_empty() {
            return None;
        }
        Some(Self {
            data,
            playing_from_frame,
        })
    }

    pub fn data(&self) -> &[Frame] {
        &self.data
    }

    /// Length of one loop cycle in frames (never zero)
    pub fn loop_len(&self) -> usize {
        self.data.len()
    }

    pub fn playing_from_frame(&self) -> u64 {
        self.playing_from_frame
    }

    pub fn set_playing_from_frame(&mut self, playing_from_frame: u64) {
        self.playing_from_frame = playing_from_frame;
    }

    /// Index into `data` heard at global frame `frame`
    #[inline]
    pub fn offset_at(&self, frame: u64) -> usize {
        let relative = frame as i128 - self.playing_from_frame as i128;
        relative.rem_euclid(self.data.len() as i128) as usize
    }

    /// Contiguous pieces covering `frames` frames from global frame `from_frame`.
    ///
    /// Allocation-free; safe to call from the audio context.
    pub fn window(&self, from_frame: u64, frames: usize) -> Window<'_> {
        Window {
            data: &self.data,
            pos: self.offset_at(from_frame),
            remaining: frames,
        }
    }

    /// Copy of the window, tail and head concatenated when it wraps
    pub fn slice(&self, from_frame: u64, frames: usize) -> Vec<Frame> {
        let mut out = Vec::with_capacity(frames);
        for piece in self.window(from_frame, frames) {
            out.extend_from_slice(piece);
        }
        out
    }
}

/// Iterator over the contiguous runs of a circular read
pub struct Window<'a> {
    data: &'a [Frame],
    pos: usize,
    remaining: usize,
}

impl<'a> Iterator for Window<'a> {
    type Item = &'a [Frame];

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let take = self.remaining.min(self.data.len() - self.pos);
        let piece = &self.data[self.pos..self.pos + take];
        self.pos = (self.pos + take) % self.data.len();
        self.remaining -= take;
        Some(piece)
    }
}
