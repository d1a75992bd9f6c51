// Purpose - fixed-size audio buffers that are safe to touch from the audio context

pub mod preroll;

pub use preroll::PrerollBuffer;
