//! Sample buffers and audio asset I/O

mod buffer;
mod io;

pub use buffer::SampleBuffer;
pub use io::{load_wav, save_wav, save_wav_with_depth};
