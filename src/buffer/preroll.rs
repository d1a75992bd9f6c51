use crate::{
    error::LooperError,
    track::{Frame, SILENCE},
};

/// Fixed-capacity ring holding the most recent beat of input.
///
/// Writes wrap silently; overwriting the oldest frames is the point.
/// Capacity is allocated once, so writes never allocate.
pub struct PrerollBuffer {
    buffer: Vec<Frame>,
    index: usize,
}

impl PrerollBuffer {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "pre-roll capacity must be positive");
        Self {
            buffer: vec![SILENCE; capacity],
            index: 0,
        }
    }

    /// Write up to `capacity` frames, wrapping past the end
    pub fn write(&mut self, frames: &[Frame]) -> Result<(), LooperError> {
        let capacity = self.buffer.len();
        if frames.len() > capacity {
            return Err(LooperError::InvalidArgument(format!(
                "cannot write {} frames into a pre-roll of {}",
                frames.len(),
                capacity
            )));
        }

        let left = capacity - self.index;
        if frames.len() > left {
            let (tail, head) = frames.split_at(left);
            self.buffer[self.index..].copy_from_slice(tail);
            self.buffer[..head.len()].copy_from_slice(head);
        } else {
            self.buffer[self.index..self.index + frames.len()].copy_from_slice(frames);
        }
        self.index = (self.index + frames.len()) % capacity;
        Ok(())
    }

    /// Current write cursor
    pub fn position(&self) -> usize {
        self.index
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Frames written since the cursor last passed index 0, oldest first
    pub fn start_to_index(&self) -> &[Frame] {
        &self.buffer[..self.index]
    }
}
