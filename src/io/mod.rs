// Purpose - external interfaces, format conversions

pub mod converter;
pub mod wav;

pub use wav::{fit_to_length, load_frames};
