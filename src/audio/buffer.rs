//! Sample buffer implementation
//!
//! SampleBuffer is the unit of audio handed between the asset loader,
//! the signal processor and the playback sinks.

use crate::error::{LabError, Result};

/// Audio sample data with metadata
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    /// Interleaved audio samples, nominally in -1.0..1.0
    samples: Vec<f32>,
    /// Number of audio channels (1 = mono, 2 = stereo)
    channels: u16,
    /// Sample rate in Hz
    sample_rate: u32,
}

impl SampleBuffer {
    /// Create a new sample buffer with the given parameters
    pub fn new(samples: Vec<f32>, channels: u16, sample_rate: u32) -> Result<Self> {
        if samples.is_empty() {
            return Err(LabError::UnsupportedFormat {
                details: "audio contains no samples".to_string(),
            });
        }
        if channels == 0 || channels > 2 {
            return Err(LabError::UnsupportedFormat {
                details: format!("{}-channel audio (only mono/stereo supported)", channels),
            });
        }
        if samples.len() % channels as usize != 0 {
            return Err(LabError::UnsupportedFormat {
                details: format!(
                    "Sample count {} is not divisible by channel count {}",
                    samples.len(),
                    channels
                ),
            });
        }
        if sample_rate == 0 {
            return Err(LabError::UnsupportedFormat {
                details: "sample rate must be non-zero".to_string(),
            });
        }
        Ok(Self {
            samples,
            channels,
            sample_rate,
        })
    }

    /// Create a mono buffer from a single channel of samples
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        Self::new(samples, 1, sample_rate)
    }

    /// Interleave separate channel vectors into one buffer
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        let num_channels = channels.len();
        let frames = channels.first().map_or(0, Vec::len);
        if channels.iter().any(|c| c.len() != frames) {
            return Err(LabError::UnsupportedFormat {
                details: "channels have different lengths".to_string(),
            });
        }

        let mut samples = Vec::with_capacity(frames * num_channels);
        for frame in 0..frames {
            for channel in &channels {
                samples.push(channel[frame]);
            }
        }

        Self::new(samples, num_channels as u16, sample_rate)
    }

    /// Create a mono sine wave test tone
    pub fn sine_wave(frequency: f32, duration_secs: f32, sample_rate: u32) -> Result<Self> {
        let num_samples = (duration_secs * sample_rate as f32) as usize;
        let samples = (0..num_samples)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                (2.0 * std::f32::consts::PI * frequency * t).sin()
            })
            .collect();
        Self::mono(samples, sample_rate)
    }

    /// Get a reference to the samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Consume the buffer, returning the interleaved samples
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Get the number of channels
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Get the sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Nyquist frequency in Hz
    pub fn nyquist(&self) -> f64 {
        self.sample_rate as f64 / 2.0
    }

    /// Get the number of frames (samples per channel)
    pub fn num_frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Get the duration in seconds
    pub fn duration(&self) -> f32 {
        self.num_frames() as f32 / self.sample_rate as f32
    }

    /// Get samples for a specific channel (0-indexed)
    pub fn channel_samples(&self, channel: u16) -> Vec<f32> {
        if channel >= self.channels {
            return Vec::new();
        }
        self.samples
            .iter()
            .skip(channel as usize)
            .step_by(self.channels as usize)
            .copied()
            .collect()
    }

    /// Split into one vector per channel
    pub fn deinterleave(&self) -> Vec<Vec<f32>> {
        (0..self.channels).map(|c| self.channel_samples(c)).collect()
    }

    /// Peak absolute amplitude
    pub fn peak(&self) -> f32 {
        self.samples.iter().map(|s| s.abs()).fold(0.0, f32::max)
    }

    /// Interleaved stereo `f32`, duplicating mono to both channels
    pub fn to_stereo_f32(&self) -> Vec<f32> {
        match self.channels {
            1 => self.samples.iter().flat_map(|&s| [s, s]).collect(),
            _ => self.samples.clone(),
        }
    }

    /// Convert to `target_rate` with linear interpolation
    pub fn resample(&self, target_rate: u32) -> Result<SampleBuffer> {
        if target_rate == self.sample_rate {
            return Ok(self.clone());
        }
        let ratio = target_rate as f64 / self.sample_rate as f64;
        let channels = self
            .deinterleave()
            .iter()
            .map(|channel| resample_linear(channel, ratio))
            .collect();
        SampleBuffer::from_channels(channels, target_rate)
    }

    /// Check if buffers are identical (bit-perfect comparison)
    pub fn is_identical_to(&self, other: &SampleBuffer) -> bool {
        self.channels == other.channels
            && self.sample_rate == other.sample_rate
            && self.samples == other.samples
    }

    /// Check if buffers are approximately equal within tolerance
    pub fn is_approx_equal(&self, other: &SampleBuffer, tolerance: f32) -> bool {
        if self.channels != other.channels || self.sample_rate != other.sample_rate {
            return false;
        }
        if self.samples.len() != other.samples.len() {
            return false;
        }
        self.samples
            .iter()
            .zip(other.samples.iter())
            .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

/// Linear interpolation resampling
///
/// TODO: switch to a windowed-sinc resampler; linear interpolation aliases
/// when a 48 kHz sample is played on a 44.1 kHz device.
fn resample_linear(samples: &[f32], ratio: f64) -> Vec<f32> {
    let source_len = samples.len();
    let target_len = ((source_len as f64) * ratio).ceil() as usize;

    (0..target_len)
        .map(|i| {
            let src_pos = i as f64 / ratio;
            let src_idx = src_pos.floor() as usize;
            let frac = (src_pos - src_idx as f64) as f32;

            if src_idx + 1 < source_len {
                samples[src_idx] * (1.0 - frac) + samples[src_idx + 1] * frac
            } else if src_idx < source_len {
                samples[src_idx]
            } else {
                0.0
            }
        })
        .collect()
}
