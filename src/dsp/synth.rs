//! Damped oscillator synthesis
//!
//! Generates the tone of a driven RLC circuit: a sine at the drive
//! frequency, scaled by how close the drive sits to resonance and decaying
//! with the circuit's damping.

use crate::audio::SampleBuffer;
use crate::error::{LabError, Result};
use std::f64::consts::PI;

/// Sample rate of synthesized tones (Hz)
pub const SYNTH_SAMPLE_RATE: u32 = 44_100;

/// Length of synthesized tones (seconds)
pub const SYNTH_DURATION_SECS: u32 = 4;

/// A decaying sine voice
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DampedOscillator {
    /// Drive frequency in Hz
    pub frequency: f64,
    /// Initial amplitude (the resonance effect)
    pub amplitude: f64,
    /// Exponential decay rate in 1/s
    pub damping: f64,
}

impl DampedOscillator {
    /// Amplitude of the envelope at time `t` seconds
    pub fn envelope(&self, t: f64) -> f64 {
        (-self.damping * t).exp() * self.amplitude
    }

    /// Value at time `t` seconds
    pub fn sample_at(&self, t: f64) -> f64 {
        self.envelope(t) * (2.0 * PI * self.frequency * t).sin()
    }

    /// Render `duration_secs` of mono audio at `sample_rate`
    pub fn render(&self, duration_secs: u32, sample_rate: u32) -> Result<SampleBuffer> {
        let num_samples = duration_secs as usize * sample_rate as usize;
        if num_samples == 0 {
            return Err(LabError::invalid(
                "duration",
                duration_secs,
                "a non-empty render length",
            ));
        }

        let rate = sample_rate as f64;
        let samples = (0..num_samples)
            .map(|n| self.sample_at(n as f64 / rate) as f32)
            .collect();
        SampleBuffer::mono(samples, sample_rate)
    }
}
