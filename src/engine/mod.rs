// Purpose - realtime recording, quantization and mixing

pub mod command;
pub mod mixer;
pub mod processor;
pub mod quantize;
pub mod recorder;
pub mod stream;

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::track::TrackSet;

pub use command::{command_queue, CommandReceiver, CommandSender, RecordingCommand};
pub use processor::{CycleStatus, LoopProcessor};
pub use quantize::post_production;
pub use recorder::{Handoff, Recorder, RecorderState, SharedRecorderState};
pub use stream::StreamManager;

/// Track set published by the control context, read lock-free each cycle
pub type SharedTrackSet = Arc<ArcSwap<TrackSet>>;
