use rtrb::{Consumer, Producer, RingBuffer};

use crate::error::LooperError;

/// User commands travelling from the control context to the audio context
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RecordingCommand {
    Start,
    Stop,
}

/// Control-side end of the command queue
pub struct CommandSender {
    tx: Producer<RecordingCommand>,
}

/// Audio-side end of the command queue
pub struct CommandReceiver {
    rx: Consumer<RecordingCommand>,
}

/// Lock-free SPSC FIFO of recording commands
pub fn command_queue(capacity: usize) -> (CommandSender, CommandReceiver) {
    let (tx, rx) = RingBuffer::new(capacity);
    (CommandSender { tx }, CommandReceiver { rx })
}

impl CommandSender {
    /// Enqueue without blocking
    pub fn push(&mut self, command: RecordingCommand) -> Result<(), LooperError> {
        self.tx.push(command).map_err(|_| LooperError::QueueFull)
    }
}

impl CommandReceiver {
    /// Take the oldest pending command, if any
    pub fn pop(&mut self) -> Option<RecordingCommand> {
        self.rx.pop().ok()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
