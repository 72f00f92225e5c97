//! Cascaded second-order sections
//!
//! Designed filters are stored as a chain of biquads and run causally with
//! zero initial state, so one call filters one buffer from silence.

use crate::audio::SampleBuffer;
use crate::error::Result;
use num_complex::Complex64;
use std::f64::consts::PI;

/// Biquad filter coefficients
/// Transfer function: H(z) = (b0 + b1*z^-1 + b2*z^-2) / (1 + a1*z^-1 + a2*z^-2)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl BiquadCoeffs {
    /// Pass-through section
    pub const IDENTITY: BiquadCoeffs = BiquadCoeffs {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Complex response of this section at `z^-1`
    fn response(&self, z_inv: Complex64) -> Complex64 {
        let z_inv2 = z_inv * z_inv;
        let num = self.b0 + z_inv * self.b1 + z_inv2 * self.b2;
        let den = 1.0 + z_inv * self.a1 + z_inv2 * self.a2;
        num / den
    }
}

/// Biquad filter state for one channel
#[derive(Debug, Clone, Copy, Default)]
struct BiquadState {
    x1: f64, // x[n-1]
    x2: f64, // x[n-2]
    y1: f64, // y[n-1]
    y2: f64, // y[n-2]
}

impl BiquadState {
    /// Direct Form I
    fn process(&mut self, input: f64, coeffs: &BiquadCoeffs) -> f64 {
        let output = coeffs.b0 * input + coeffs.b1 * self.x1 + coeffs.b2 * self.x2
            - coeffs.a1 * self.y1
            - coeffs.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }
}

/// A digital IIR filter as a cascade of biquad sections
#[derive(Debug, Clone, PartialEq)]
pub struct SosFilter {
    sections: Vec<BiquadCoeffs>,
}

impl SosFilter {
    /// Build a filter from its sections (an empty cascade passes audio through)
    pub fn new(sections: Vec<BiquadCoeffs>) -> Self {
        Self { sections }
    }

    /// The biquad sections, in processing order
    pub fn sections(&self) -> &[BiquadCoeffs] {
        &self.sections
    }

    /// Filter one channel of samples, starting from rest
    pub fn process(&self, input: &[f32]) -> Vec<f32> {
        let mut states = vec![BiquadState::default(); self.sections.len()];
        input
            .iter()
            .map(|&x| {
                let mut y = x as f64;
                for (state, coeffs) in states.iter_mut().zip(&self.sections) {
                    y = state.process(y, coeffs);
                }
                y as f32
            })
            .collect()
    }

    /// Filter every channel of a buffer independently along time
    pub fn apply(&self, buffer: &SampleBuffer) -> Result<SampleBuffer> {
        let channels = buffer
            .deinterleave()
            .iter()
            .map(|channel| self.process(channel))
            .collect();
        SampleBuffer::from_channels(channels, buffer.sample_rate())
    }

    /// Linear magnitude response at `frequency` Hz
    pub fn magnitude_at(&self, frequency: f64, sample_rate: f64) -> f64 {
        let omega = 2.0 * PI * frequency / sample_rate;
        let z_inv = Complex64::from_polar(1.0, -omega);
        self.sections
            .iter()
            .fold(Complex64::new(1.0, 0.0), |acc, s| acc * s.response(z_inv))
            .norm()
    }

    /// Magnitude response in dB at `frequency` Hz
    pub fn magnitude_db(&self, frequency: f64, sample_rate: f64) -> f64 {
        20.0 * self.magnitude_at(frequency, sample_rate).log10()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn one_pole_smoother() -> SosFilter {
        // y[n] = 0.5 x[n] + 0.5 y[n-1]
        SosFilter::new(vec![BiquadCoeffs {
            b0: 0.5,
            a1: -0.5,
            ..Default::default()
        }])
    }

    #[test]
    fn test_empty_cascade_is_passthrough() {
        let buffer = SampleBuffer::sine_wave(440.0, 0.1, 44100).unwrap();
        let output = SosFilter::new(Vec::new()).apply(&buffer).unwrap();
        assert!(buffer.is_identical_to(&output));
    }

    #[test]
    fn test_impulse_response_starts_from_rest() {
        let filter = one_pole_smoother();
        let output = filter.process(&[1.0, 0.0, 0.0, 0.0]);
        assert_eq!(output, vec![0.5, 0.25, 0.125, 0.0625]);

        // A second call does not inherit state from the first
        assert_eq!(filter.process(&[1.0, 0.0]), vec![0.5, 0.25]);
    }

    #[test]
    fn test_channels_are_filtered_independently() {
        // Impulse on the left channel only
        let buffer = SampleBuffer::new(vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0], 2, 44100).unwrap();
        let output = one_pole_smoother().apply(&buffer).unwrap();

        assert_eq!(output.channels(), 2);
        assert_eq!(output.channel_samples(0), vec![0.5, 0.25, 0.125]);
        assert_eq!(output.channel_samples(1), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_identity_response_is_flat() {
        let filter = SosFilter::new(vec![BiquadCoeffs::IDENTITY]);
        for f in [0.0, 100.0, 10_000.0, 22_050.0] {
            assert_relative_eq!(filter.magnitude_at(f, 44100.0), 1.0);
        }
    }

    #[test]
    fn test_one_pole_response() {
        let filter = one_pole_smoother();
        // DC gain 0.5 / (1 - 0.5) = 1, Nyquist gain 0.5 / 1.5
        assert_relative_eq!(filter.magnitude_at(0.0, 48000.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(filter.magnitude_at(24000.0, 48000.0), 1.0 / 3.0, epsilon = 1e-12);
    }
}
