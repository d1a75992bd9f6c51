pub mod audio; // Device drivers that run the processing context
pub mod buffer;
pub mod config;
pub mod engine; // Realtime recording + mixing
pub mod error;
pub mod io;
pub mod looper; // Session layer: metronome + committed takes
pub mod sequencing; // Beat grid timing
pub mod track;

pub use config::LooperConfig;
pub use error::{LooperError, Result};
pub use looper::Looper;

/// Upper bound on frames handled in one processing cycle.
pub const MAX_BLOCK_SIZE: usize = 2048;
