use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam::channel::Sender;

use crate::{
    buffer::PrerollBuffer,
    error::LooperError,
    sequencing::BeatGrid,
    track::{Frame, RecordedTrack, CHANNELS, SILENCE},
    MAX_BLOCK_SIZE,
};

use super::{
    command::CommandReceiver,
    mixer::{self, Accumulator},
    recorder::{Handoff, Recorder, RecorderState, SharedRecorderState},
    SharedTrackSet,
};

/// Device conditions reported for one cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStatus {
    pub output_underflow: bool,
}

/// Everything the audio context owns.
///
/// The only ways in are the command queue and the track-set snapshot; the
/// only ways out are the hand-off channel and the published frame counter.
pub struct LoopProcessor {
    grid: BeatGrid,
    current_frame: u64,
    commands: CommandReceiver,
    recorder: Recorder,
    preroll: PrerollBuffer,
    tracks: SharedTrackSet,
    position: Arc<AtomicU64>,
    scratch: Vec<Accumulator>,
}

impl LoopProcessor {
    pub fn new(
        grid: BeatGrid,
        commands: CommandReceiver,
        finished: Sender<Handoff>,
        tracks: SharedTrackSet,
        reserve_frames: usize,
    ) -> Self {
        Self {
            grid,
            current_frame: 0,
            commands,
            recorder: Recorder::new(grid, reserve_frames, finished),
            preroll: PrerollBuffer::new(grid.len_beat()),
            tracks,
            position: Arc::new(AtomicU64::new(0)),
            scratch: vec![[0; CHANNELS]; MAX_BLOCK_SIZE],
        }
    }

    /// Run one cycle: commands, capture, pre-roll, mix, advance.
    ///
    /// Rejects windows longer than a beat or `MAX_BLOCK_SIZE` before touching
    /// any state.
    pub fn process(
        &mut self,
        input: &[Frame],
        output: &mut [Frame],
        status: CycleStatus,
    ) -> Result<(), LooperError> {
        let frames = input.len();
        if output.len() != frames {
            return Err(LooperError::InvalidArgument(format!(
                "input has {} frames, output {}",
                frames,
                output.len()
            )));
        }
        if frames > self.scratch.len() || frames > self.grid.len_beat() {
            return Err(LooperError::InvalidArgument(format!(
                "cycle of {} frames exceeds the block limit",
                frames
            )));
        }

        // Catching up beats command latency
        if status.output_underflow {
            output.fill(SILENCE);
            return Ok(());
        }

        if let Some(command) = self.commands.pop() {
            log::debug!("{:?} at frame {}", command, self.current_frame);
            self.recorder
                .apply(command, self.current_frame, &self.preroll);
        }
        self.recorder.capture_input(input, self.current_frame);
        self.preroll.write(input)?;

        {
            // Guard released before the counter moves; see StreamManager::update_tracks
            let tracks = self.tracks.load();
            mixer::mix_tracks(input, &tracks, self.current_frame, &mut self.scratch, output);
        }

        self.current_frame += frames as u64;
        self.position.store(self.current_frame, Ordering::Release);
        Ok(())
    }

    pub fn current_frame(&self) -> u64 {
        self.current_frame
    }

    pub fn grid(&self) -> BeatGrid {
        self.grid
    }

    pub fn recorder_state(&self) -> RecorderState {
        self.recorder.state()
    }

    /// Frame counter as seen from other threads
    pub fn position_handle(&self) -> Arc<AtomicU64> {
        self.position.clone()
    }

    pub fn shared_recorder_state(&self) -> SharedRecorderState {
        self.recorder.shared_state()
    }

    /// Return path for pre-reserved capture buffers
    pub fn spare_captures(&self) -> Sender<RecordedTrack> {
        self.recorder.spare_sender()
    }
}
