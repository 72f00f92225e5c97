//! Circuit Sound - hear what passive components do to audio
//!
//! Three labs turn circuit values into sound:
//! 1. Low-pass: an RC network's cutoff, 1/(2πRC), filters a sample
//! 2. Resonance: an LC tank's resonance, 1/(2π√(LC)), band-passes a sample
//! 3. Thermal: a temperature-dependent RLC circuit rings at a drive note
//!
//! # Architecture
//!
//! - `circuit`: the physical formulas
//! - `dsp`: Butterworth design, biquad cascades, damped-oscillator synthesis
//! - `processor`: `SignalProcessor` turns a `ParameterSet` into a `SampleBuffer`
//! - `playback`: sinks that play finished buffers (mixer, optional device)

pub mod audio;
pub mod circuit;
pub mod cli;
pub mod config;
pub mod dsp;
pub mod error;
pub mod params;
pub mod playback;
pub mod processor;

pub use audio::SampleBuffer;
pub use error::{LabError, Result};
pub use params::{LabMode, ParameterSet};
pub use processor::{CircuitReport, SignalProcessor};
