//! Recording state machine
//!
//! Runs inside the audio context. Start seeds a capture with the pre-roll,
//! Stop either finalizes at once (first half of a beat, padded with silence
//! to the boundary) or drains until the running beat ends. Every Stop is
//! answered with exactly one [`Handoff`].

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crossbeam::channel::{bounded, Receiver, Sender, TrySendError};

use crate::{
    buffer::PrerollBuffer,
    sequencing::BeatGrid,
    track::{Frame, RecordedTrack},
};

use super::command::RecordingCommand;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
    /// Stop requested, waiting for the next beat boundary
    Draining,
}

impl From<u8> for RecorderState {
    fn from(val: u8) -> Self {
        match val {
            1 => RecorderState::Recording,
            2 => RecorderState::Draining,
            _ => RecorderState::Idle,
        }
    }
}

/// Recorder state mirrored for the control context
#[derive(Clone, Default)]
pub struct SharedRecorderState {
    state: Arc<AtomicU8>,
}

impl SharedRecorderState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> RecorderState {
        self.state.load(Ordering::Relaxed).into()
    }

    fn set(&self, state: RecorderState) {
        self.state.store(state as u8, Ordering::Relaxed);
    }
}

/// Answer to a Stop, sent from the audio context to the control context
pub enum Handoff {
    /// Capture finished on a beat boundary
    Finished(RecordedTrack),
    /// A draining capture was replaced by a new Start
    Discarded,
    /// Stop arrived with no capture waiting for one
    NothingRecorded,
}

impl std::fmt::Debug for Handoff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Handoff::Finished(track) => write!(f, "Finished({} frames)", track.len()),
            Handoff::Discarded => write!(f, "Discarded"),
            Handoff::NothingRecorded => write!(f, "NothingRecorded"),
        }
    }
}

pub struct Recorder {
    grid: BeatGrid,
    state: RecorderState,
    capture: RecordedTrack,
    /// Pre-reserved buffer swapped in when a take is handed off
    spare: Option<RecordedTrack>,
    /// Replacement spares allocated by the control context
    spares: Receiver<RecordedTrack>,
    spare_sender: Sender<RecordedTrack>,
    finished: Sender<Handoff>,
    shared: SharedRecorderState,
}

impl Recorder {
    /// Both the first capture and its spare reserve `reserve` frames here,
    /// outside the audio context.
    pub fn new(grid: BeatGrid, reserve: usize, finished: Sender<Handoff>) -> Self {
        let (spare_sender, spares) = bounded(1);
        Self {
            grid,
            state: RecorderState::Idle,
            capture: RecordedTrack::with_capacity(reserve),
            spare: Some(RecordedTrack::with_capacity(reserve)),
            spares,
            spare_sender,
            finished,
            shared: SharedRecorderState::new(),
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    /// Handle for observing the state from another thread
    pub fn shared_state(&self) -> SharedRecorderState {
        self.shared.clone()
    }

    /// Where the control context returns a fresh spare after each finished take
    pub fn spare_sender(&self) -> Sender<RecordedTrack> {
        self.spare_sender.clone()
    }

    /// The capture in progress
    pub fn capture(&self) -> &RecordedTrack {
        &self.capture
    }

    pub fn apply(&mut self, command: RecordingCommand, current_frame: u64, preroll: &PrerollBuffer) {
        match command {
            RecordingCommand::Start => self.start(current_frame, preroll),
            RecordingCommand::Stop => self.stop(current_frame),
        }
    }

    /// Append this cycle's input; finalize a draining capture on the boundary
    pub fn capture_input(&mut self, input: &[Frame], current_frame: u64) {
        if self.spare.is_none() {
            self.spare = self.spares.try_recv().ok();
        }
        if self.state == RecorderState::Idle {
            return;
        }
        self.capture.append(input);

        if self.state == RecorderState::Draining
            && self.grid.crosses_boundary(current_frame, input.len())
        {
            self.capture.trim_to_whole_beats(self.grid.len_beat());
            self.finalize();
        }
    }

    fn start(&mut self, current_frame: u64, preroll: &PrerollBuffer) {
        match self.state {
            RecorderState::Draining => {
                log::debug!("Start while draining, discarding the unfinished take");
                self.reset();
                self.send(Handoff::Discarded);
            }
            RecorderState::Recording => {
                log::debug!("Start while recording, restarting the take");
                self.reset();
            }
            RecorderState::Idle => {}
        }
        if self.capture.capacity() == 0 {
            if let Some(spare) = self.spare.take() {
                self.capture = spare;
            }
        }

        let preroll_frames = preroll.start_to_index();
        self.capture.first_frame_time = Some(current_frame - preroll_frames.len() as u64);
        self.capture.start_rec_time = Some(current_frame);
        self.capture.append(preroll_frames);
        self.set_state(RecorderState::Recording);
        log::debug!(
            "Recording started at frame {} with {} frames of pre-roll",
            current_frame,
            preroll_frames.len()
        );
    }

    fn stop(&mut self, current_frame: u64) {
        if self.state != RecorderState::Recording {
            log::debug!("Stop while {:?}, nothing to finish", self.state);
            self.send(Handoff::NothingRecorded);
            return;
        }

        self.capture.stop_rec_time = Some(current_frame);
        if self.grid.in_first_half(current_frame) {
            log::debug!("Stop in the first half of a beat, finishing now");
            self.capture
                .append_silence(self.grid.frames_to_next_beat(current_frame));
            self.finalize();
        } else {
            log::debug!("Stop in the second half of a beat, draining to the boundary");
            self.set_state(RecorderState::Draining);
        }
    }

    fn finalize(&mut self) {
        // An empty Vec does not allocate; without a spare the next take grows
        let next = self.spare.take().unwrap_or_default();
        let track = std::mem::replace(&mut self.capture, next);
        self.set_state(RecorderState::Idle);
        self.send(Handoff::Finished(track));
    }

    /// Forget the capture in progress, keeping its allocation
    fn reset(&mut self) {
        self.capture.clear();
        self.set_state(RecorderState::Idle);
    }

    fn set_state(&mut self, state: RecorderState) {
        self.state = state;
        self.shared.set(state);
    }

    fn send(&self, handoff: Handoff) {
        match self.finished.try_send(handoff) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                log::warn!("Recording hand-off queue full, dropping {:?}", dropped);
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}
