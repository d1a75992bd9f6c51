//! Loop session: a metronome plus the user's committed takes.
//!
//! Track 0 is always the metronome. User-facing track indices start at 0 for
//! the first recording, so deleting index `i` removes list position `i + 1`.
//! Every change republishes the whole list to the stream.

use crate::{
    audio::{AudioDriver, CpalDriver},
    config::LooperConfig,
    engine::{RecorderState, StreamManager},
    error::{LooperError, Result},
    io::wav,
    sequencing::BeatGrid,
    track::PlayingTrack,
};

pub struct Looper {
    bpm: u32,
    grid: BeatGrid,
    stream: StreamManager,
    tracks: Vec<PlayingTrack>,
}

impl Looper {
    /// Load the metronome and start audio on the configured cpal devices
    pub fn configure(bpm: u32, config: &LooperConfig) -> Result<Self> {
        let driver = CpalDriver::new(config);
        Self::configure_with_driver(bpm, config, Box::new(driver))
    }

    /// Same as [`Looper::configure`] with a caller-supplied driver
    pub fn configure_with_driver(
        bpm: u32,
        config: &LooperConfig,
        driver: Box<dyn AudioDriver>,
    ) -> Result<Self> {
        let grid = BeatGrid::from_bpm(bpm, config.sample_rate)?;
        config.validate(&grid)?;

        let click = wav::load_frames(&config.metronome_path, config.sample_rate)?;
        let click = wav::fit_to_length(click, grid.len_beat());
        let metronome = PlayingTrack::new(click, 0).ok_or_else(|| {
            LooperError::Unexpected("metronome is empty after fitting to one beat".into())
        })?;

        let mut stream = StreamManager::new(grid, config)?;
        let tracks = vec![metronome];
        stream.update_tracks(tracks.clone());
        stream.start_stream(driver)?;

        log::info!(
            "Looper configured at {} BPM ({} frames per beat)",
            bpm,
            grid.len_beat()
        );
        Ok(Self {
            bpm,
            grid,
            stream,
            tracks,
        })
    }

    pub fn start_recording(&mut self) -> Result<()> {
        self.stream.start_recording()
    }

    /// Stop the take and commit it. `Ok(true)` iff a track was added.
    pub fn stop_recording(&mut self) -> Result<bool> {
        let Some(track) = self.stream.stop_recording()? else {
            log::info!("Recording produced no whole beat, nothing committed");
            return Ok(false);
        };
        log::info!(
            "Committed track {} ({} beats)",
            self.tracks.len() - 1,
            track.loop_len() / self.grid.len_beat()
        );
        self.tracks.push(track);
        self.publish();
        Ok(true)
    }

    /// Remove user track `index` (0 is the first recording)
    pub fn delete_track(&mut self, index: usize) -> Result<()> {
        let count = self.track_count();
        if index >= count {
            return Err(LooperError::TrackIndexOutOfRange { index, count });
        }
        self.tracks.remove(index + 1);
        self.publish();
        log::info!("Deleted track {}", index);
        Ok(())
    }

    /// End the stream. Safe to call more than once.
    pub fn terminate(&mut self) {
        self.stream.end_stream();
    }

    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    pub fn grid(&self) -> BeatGrid {
        self.grid
    }

    /// Number of user tracks, metronome excluded
    pub fn track_count(&self) -> usize {
        self.tracks.len() - 1
    }

    /// User tracks in commit order
    pub fn tracks(&self) -> &[PlayingTrack] {
        &self.tracks[1..]
    }

    pub fn metronome(&self) -> &PlayingTrack {
        &self.tracks[0]
    }

    pub fn current_frame(&self) -> u64 {
        self.stream.current_frame()
    }

    pub fn is_running(&self) -> bool {
        self.stream.is_running()
    }

    pub fn recorder_state(&self) -> RecorderState {
        self.stream.recorder_state()
    }

    fn publish(&mut self) {
        self.stream.update_tracks(self.tracks.clone());
    }
}

impl Drop for Looper {
    fn drop(&mut self) {
        self.terminate();
    }
}
