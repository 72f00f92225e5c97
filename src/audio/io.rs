//! Audio asset I/O
//!
//! Loads and saves WAV files using the hound crate.

use crate::audio::SampleBuffer;
use crate::error::{LabError, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::debug;
use std::path::Path;

/// Load a WAV file into a SampleBuffer
///
/// # Errors
/// * `AssetNotFound` - the file is missing, unreadable or not a WAV file
/// * `UnsupportedFormat` - the file decodes but holds no usable audio
pub fn load_wav<P: AsRef<Path>>(path: P) -> Result<SampleBuffer> {
    let path = path.as_ref();
    let not_found = |e: hound::Error| LabError::AssetNotFound {
        path: path.display().to_string(),
        source: Some(e),
    };

    let reader = WavReader::open(path).map_err(not_found)?;

    let spec = reader.spec();
    let channels = spec.channels;
    let sample_rate = spec.sample_rate;

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map_err(not_found))
            .collect::<Result<Vec<f32>>>()?,
        SampleFormat::Int => {
            let bits = spec.bits_per_sample;
            let max_val = (1u64 << (bits - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val).map_err(not_found))
                .collect::<Result<Vec<f32>>>()?
        }
    };

    debug!(
        "Loaded {}: {} samples, {} ch @ {} Hz",
        path.display(),
        samples.len(),
        channels,
        sample_rate
    );

    SampleBuffer::new(samples, channels, sample_rate)
}

/// Save a SampleBuffer to a WAV file (32-bit float)
pub fn save_wav<P: AsRef<Path>>(buffer: &SampleBuffer, path: P) -> Result<()> {
    save_wav_with_depth(buffer, path, 32)
}

/// Save a SampleBuffer to a WAV file with specific bit depth (16, 24 or 32)
pub fn save_wav_with_depth<P: AsRef<Path>>(
    buffer: &SampleBuffer,
    path: P,
    bits: u16,
) -> Result<()> {
    let path = path.as_ref();
    let write_err = |e: hound::Error| LabError::Playback {
        details: format!("failed to write {}: {}", path.display(), e),
    };

    let sample_format = match bits {
        32 => SampleFormat::Float,
        16 | 24 => SampleFormat::Int,
        other => {
            return Err(LabError::invalid("bit_depth", other, "16, 24 or 32"));
        }
    };

    let spec = WavSpec {
        channels: buffer.channels(),
        sample_rate: buffer.sample_rate(),
        bits_per_sample: bits,
        sample_format,
    };

    let mut writer = WavWriter::create(path, spec).map_err(write_err)?;

    if sample_format == SampleFormat::Float {
        for &sample in buffer.samples() {
            writer.write_sample(sample).map_err(write_err)?;
        }
    } else {
        let max_val = ((1u32 << (bits - 1)) - 1) as f32;
        for &sample in buffer.samples() {
            let int_sample = (sample.clamp(-1.0, 1.0) * max_val) as i32;
            writer.write_sample(int_sample).map_err(write_err)?;
        }
    }

    writer.finalize().map_err(write_err)?;

    debug!("Wrote {} ({}-bit)", path.display(), bits);
    Ok(())
}
