//! Keyboard front-end for the looper.
//!
//! No rendering: each action prints a single status line.

use std::io::{stdout, Write};
use std::time::Duration;

use color_eyre::eyre::{bail, Result as EyreResult};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use lem::{Looper, LooperError};

const HELP: &str = "[r/space] record/stop  [1-9] delete track  [q/esc] quit";

pub struct LooperApp {
    looper: Looper,
    recording: bool,
    should_quit: bool,
}

impl LooperApp {
    pub fn new(looper: Looper) -> Self {
        Self {
            looper,
            recording: false,
            should_quit: false,
        }
    }

    /// Run the key loop until quit
    pub fn run(mut self) -> EyreResult<()> {
        let _raw = RawMode::enable()?;
        status(&format!(
            "lem at {} BPM ({} frames per beat)",
            self.looper.bpm(),
            self.looper.grid().len_beat()
        ))?;
        status(HELP)?;

        while !self.should_quit {
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code)?;
                    }
                }
            }
            if !self.looper.is_running() {
                bail!("audio stream stopped");
            }
        }

        self.looper.terminate();
        status("bye")?;
        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode) -> EyreResult<()> {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('r') | KeyCode::Char('R') | KeyCode::Char(' ') => {
                self.toggle_recording()?;
            }
            KeyCode::Char(digit @ '1'..='9') => {
                let index = digit as usize - '1' as usize;
                match self.looper.delete_track(index) {
                    Ok(()) => status(&format!(
                        "deleted track {}, {} left",
                        digit,
                        self.looper.track_count()
                    ))?,
                    Err(LooperError::TrackIndexOutOfRange { .. }) => {
                        status(&format!("no track {}", digit))?
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn toggle_recording(&mut self) -> EyreResult<()> {
        if !self.recording {
            self.looper.start_recording()?;
            self.recording = true;
            return status("recording...");
        }

        self.recording = false;
        match self.looper.stop_recording() {
            Ok(true) => status(&format!("track {} added", self.looper.track_count())),
            Ok(false) => status("too short, nothing added"),
            Err(e @ LooperError::HandoffTimeout(_)) => status(&format!("stop failed: {}", e)),
            Err(e) => Err(e.into()),
        }
    }
}

/// Raw terminal mode for the lifetime of the guard
struct RawMode;

impl RawMode {
    fn enable() -> EyreResult<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

fn status(line: &str) -> EyreResult<()> {
    let mut out = stdout();
    write!(out, "{}\r\n", line)?;
    out.flush()?;
    Ok(())
}
