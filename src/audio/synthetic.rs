//! Hardware-free driver.
//!
//! Cycles the processor on its own thread with generated input. Free-running
//! by default; `paced` sleeps one block duration per cycle to mimic a device.

use std::time::{Duration, Instant};

use crossbeam::channel::{Sender, TrySendError};

use crate::{
    engine::{CycleStatus, LoopProcessor},
    track::{Frame, SILENCE},
};

use super::{AudioDriver, DriverControl};

type InputFn = Box<dyn FnMut(u64, &mut [Frame]) + Send>;
type UnderflowFn = Box<dyn FnMut(u64) -> bool + Send>;

pub struct SyntheticDriver {
    block_size: usize,
    input: InputFn,
    underflow: Option<UnderflowFn>,
    cycle_duration: Option<Duration>,
    tap: Option<Sender<Vec<Frame>>>,
}

impl SyntheticDriver {
    /// Silent input, free-running
    pub fn new(block_size: usize) -> Self {
        Self {
            block_size,
            input: Box::new(|_: u64, frames: &mut [Frame]| frames.fill(SILENCE)),
            underflow: None,
            cycle_duration: None,
            tap: None,
        }
    }

    /// Generate each cycle's input from the global frame it starts at
    pub fn input(mut self, input: impl FnMut(u64, &mut [Frame]) + Send + 'static) -> Self {
        self.input = Box::new(input);
        self
    }

    /// Sleep one block duration per cycle at `sample_rate`
    pub fn paced(mut self, sample_rate: u32) -> Self {
        let secs = self.block_size as f64 / sample_rate.max(1) as f64;
        self.cycle_duration = Some(Duration::from_secs_f64(secs));
        self
    }

    /// Flag a cycle as an output underflow when `underflow(cycle)` is true
    pub fn underflow(mut self, underflow: impl FnMut(u64) -> bool + Send + 'static) -> Self {
        self.underflow = Some(Box::new(underflow));
        self
    }

    /// Copy every produced block into `tap`; full taps drop blocks
    pub fn output_tap(mut self, tap: Sender<Vec<Frame>>) -> Self {
        self.tap = Some(tap);
        self
    }
}

impl AudioDriver for SyntheticDriver {
    fn run(self: Box<Self>, mut processor: LoopProcessor, mut control: DriverControl) {
        let SyntheticDriver {
            block_size,
            mut input,
            mut underflow,
            cycle_duration,
            mut tap,
        } = *self;

        let mut input_buf = vec![SILENCE; block_size];
        let mut output_buf = vec![SILENCE; block_size];
        control.notify_ready(Ok(()));
        log::debug!("Synthetic driver running, {} frames per cycle", block_size);

        let mut cycle = 0u64;
        let mut next_wake = Instant::now();
        while control.is_running() {
            let status = CycleStatus {
                output_underflow: underflow.as_mut().is_some_and(|f| f(cycle)),
            };
            input(processor.current_frame(), &mut input_buf);
            if let Err(e) = processor.process(&input_buf, &mut output_buf, status) {
                log::error!("Processing cycle failed: {}", e);
                break;
            }

            if let Some(sender) = &tap {
                if let Err(TrySendError::Disconnected(_)) = sender.try_send(output_buf.clone()) {
                    log::debug!("Output tap closed");
                    tap = None;
                }
            }

            cycle += 1;
            match cycle_duration {
                Some(period) => {
                    next_wake += period;
                    let now = Instant::now();
                    if next_wake > now {
                        std::thread::sleep(next_wake - now);
                    }
                }
                None => std::thread::yield_now(),
            }
        }
        log::debug!("Synthetic driver stopped after {} cycles", cycle);
    }
}
