// Purpose - drivers that run the processing context against a device

pub mod cpal_driver;
pub mod synthetic;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::Sender;

use crate::{engine::LoopProcessor, error::LooperError};

pub use cpal_driver::CpalDriver;
pub use synthetic::SyntheticDriver;

/// Something that can drive a [`LoopProcessor`] cycle after cycle.
///
/// `run` is called on a dedicated thread. It must call
/// [`DriverControl::notify_ready`] once, then keep cycling until
/// [`DriverControl::is_running`] turns false.
pub trait AudioDriver: Send + 'static {
    fn run(self: Box<Self>, processor: LoopProcessor, control: DriverControl);
}

/// Lifecycle handle passed to a running driver
pub struct DriverControl {
    running: Arc<AtomicBool>,
    ready: Option<Sender<Result<(), LooperError>>>,
}

impl DriverControl {
    pub fn new(running: Arc<AtomicBool>, ready: Sender<Result<(), LooperError>>) -> Self {
        Self {
            running,
            ready: Some(ready),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Report startup success or failure. Only the first report counts.
    pub fn notify_ready(&mut self, result: Result<(), LooperError>) {
        if let Some(ready) = self.ready.take() {
            let _ = ready.send(result);
        }
    }

    /// Park the driver thread until the stream is ended
    pub fn wait_while_running(&self, poll: Duration) {
        while self.is_running() {
            std::thread::sleep(poll);
        }
    }
}
