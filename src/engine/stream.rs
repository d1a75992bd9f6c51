//! Stream orchestrator: owns the processing thread and the control-side ends
//! of every cross-context channel.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use crossbeam::channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};

use crate::{
    audio::{AudioDriver, DriverControl},
    config::LooperConfig,
    error::{LooperError, Result},
    sequencing::BeatGrid,
    track::{PlayingTrack, RecordedTrack, TrackSet},
};

use super::{
    command::{command_queue, CommandSender, RecordingCommand},
    processor::LoopProcessor,
    quantize::post_production,
    recorder::{Handoff, RecorderState, SharedRecorderState},
    SharedTrackSet,
};

pub struct StreamManager {
    grid: BeatGrid,
    handoff_timeout: Duration,
    commands: CommandSender,
    finished: Receiver<Handoff>,
    tracks: SharedTrackSet,
    /// Replaced snapshots and the frame counter at replacement
    retired: Vec<(u64, Arc<TrackSet>)>,
    spare_captures: Sender<RecordedTrack>,
    reserve_frames: usize,
    position: Arc<AtomicU64>,
    recorder_state: SharedRecorderState,
    running: Arc<AtomicBool>,
    /// Handed to the driver thread on start
    processor: Option<LoopProcessor>,
    thread: Option<JoinHandle<()>>,
}

impl StreamManager {
    /// Wire the queues and the processor for one stream
    pub fn new(grid: BeatGrid, config: &LooperConfig) -> Result<Self> {
        config.validate(&grid)?;

        let (commands, receiver) = command_queue(config.command_queue_capacity);
        let (handoff_tx, finished) = bounded(config.handoff_capacity);
        let tracks: SharedTrackSet = Arc::new(ArcSwap::from_pointee(TrackSet::new()));
        let processor = LoopProcessor::new(
            grid,
            receiver,
            handoff_tx,
            tracks.clone(),
            config.reserve_frames(),
        );

        Ok(Self {
            grid,
            handoff_timeout: config.handoff_timeout(&grid),
            commands,
            finished,
            tracks,
            retired: Vec::new(),
            spare_captures: processor.spare_captures(),
            reserve_frames: config.reserve_frames(),
            position: processor.position_handle(),
            recorder_state: processor.shared_recorder_state(),
            running: Arc::new(AtomicBool::new(false)),
            processor: Some(processor),
            thread: None,
        })
    }

    /// Spawn the processing thread and wait for the driver to come up
    pub fn start_stream(&mut self, driver: Box<dyn AudioDriver>) -> Result<()> {
        let processor = self
            .processor
            .take()
            .ok_or(LooperError::StreamAlreadyStarted)?;
        let (ready_tx, ready_rx) = bounded(1);
        self.running.store(true, Ordering::Release);
        let control = DriverControl::new(self.running.clone(), ready_tx);

        let handle = thread::Builder::new()
            .name("lem-audio".into())
            .spawn(move || driver.run(processor, control))
            .map_err(|e| {
                self.running.store(false, Ordering::Release);
                LooperError::Device(format!("failed to spawn audio thread: {}", e))
            })?;

        let started = ready_rx
            .recv()
            .unwrap_or_else(|_| Err(LooperError::Device("audio driver exited before starting".into())));
        match started {
            Ok(()) => {
                log::info!("Audio stream started, beat length {} frames", self.grid.len_beat());
                self.thread = Some(handle);
                Ok(())
            }
            Err(e) => {
                log::error!("Audio stream failed to start: {}", e);
                self.running.store(false, Ordering::Release);
                if handle.join().is_err() {
                    log::error!("Audio thread panicked during startup");
                }
                Err(e)
            }
        }
    }

    /// Signal the processing thread and wait for it. No-op when not started.
    pub fn end_stream(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                log::error!("Audio thread panicked");
            }
            log::info!("Audio stream ended at frame {}", self.current_frame());
        }
        self.retired.clear();
    }

    /// Publish a new track set; the next cycle mixes it.
    ///
    /// The replaced set is kept here until the audio context has finished a
    /// cycle after the swap, so its last reference is never dropped on the
    /// audio thread.
    pub fn update_tracks(&mut self, tracks: TrackSet) {
        let old = self.tracks.swap(Arc::new(tracks));
        let frame = self.current_frame();
        self.retired.retain(|(retired_at, _)| *retired_at >= frame);
        self.retired.push((frame, old));
    }

    pub fn start_recording(&mut self) -> Result<()> {
        self.ensure_running()?;
        self.commands.push(RecordingCommand::Start)
    }

    /// Stop the take and wait for the audio context to hand it over.
    ///
    /// Returns `Ok(None)` when nothing was recording or the rounded take is
    /// empty.
    pub fn stop_recording(&mut self) -> Result<Option<PlayingTrack>> {
        self.ensure_running()?;

        while let Ok(stale) = self.finished.try_recv() {
            log::warn!("Dropping stale recording hand-off {:?}", stale);
            if matches!(stale, Handoff::Finished(_)) {
                self.replace_spare();
            }
        }
        self.commands.push(RecordingCommand::Stop)?;

        let deadline = Instant::now() + self.handoff_timeout;
        loop {
            match self.finished.recv_deadline(deadline) {
                Ok(Handoff::Finished(track)) => {
                    self.replace_spare();
                    return post_production(track, &self.grid);
                }
                Ok(Handoff::NothingRecorded) => return Ok(None),
                // Answer to an earlier Start, not to this Stop
                Ok(Handoff::Discarded) => continue,
                Err(RecvTimeoutError::Timeout) => {
                    log::error!("No recording hand-off after {:?}", self.handoff_timeout);
                    return Err(LooperError::HandoffTimeout(self.handoff_timeout));
                }
                Err(RecvTimeoutError::Disconnected) => return Err(LooperError::StreamNotRunning),
            }
        }
    }

    /// Last frame counter published by the audio context
    pub fn current_frame(&self) -> u64 {
        self.position.load(Ordering::Acquire)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
            && self.thread.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn recorder_state(&self) -> RecorderState {
        self.recorder_state.get()
    }

    pub fn grid(&self) -> BeatGrid {
        self.grid
    }

    /// The audio context used its spare for the take just handed over
    fn replace_spare(&self) {
        let spare = RecordedTrack::with_capacity(self.reserve_frames);
        if let Err(TrySendError::Full(_)) = self.spare_captures.try_send(spare) {
            log::debug!("Spare capture still pending, dropping the new one");
        }
    }

    fn ensure_running(&self) -> Result<()> {
        if self.is_running() {
            Ok(())
        } else {
            Err(LooperError::StreamNotRunning)
        }
    }
}

impl Drop for StreamManager {
    fn drop(&mut self) {
        self.end_stream();
    }
}
