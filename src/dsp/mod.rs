//! Signal processing building blocks
//!
//! Butterworth filter design, biquad cascades and damped-oscillator
//! synthesis used by the circuit labs.

pub mod design;
mod filter;
mod synth;

pub use design::{butter_bandpass, butter_lowpass};
pub use filter::{BiquadCoeffs, SosFilter};
pub use synth::{DampedOscillator, SYNTH_DURATION_SECS, SYNTH_SAMPLE_RATE};
