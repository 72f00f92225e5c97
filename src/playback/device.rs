//! Audio device output using cpal
//!
//! Opens the default output device once and mixes voices on the audio
//! callback thread. Dropping the `DeviceOutput` closes the stream.

use super::mixer::Voice;
use super::{Mixer, PlaybackSink, VoiceId};
use crate::audio::SampleBuffer;
use crate::error::{LabError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{debug, error, info};
use std::sync::{Arc, Mutex};

/// Stereo frames rendered per scratch allocation in the callback
const SCRATCH_FRAMES: usize = 4096;

/// Plays buffers on the default output device
pub struct DeviceOutput {
    mixer: Arc<Mutex<Mixer>>,
    /// Kept alive for the lifetime of the output
    _stream: cpal::Stream,
    sample_rate: u32,
}

impl DeviceOutput {
    /// Open the default output device and start an (initially silent) stream
    pub fn open() -> Result<Self> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or_else(|| LabError::Playback {
            details: "no audio output device available".to_string(),
        })?;

        let config = device
            .default_output_config()
            .map_err(|e| playback_error("failed to get default output config", e))?;

        let sample_rate = config.sample_rate().0;
        let channels = config.channels() as usize;
        let mixer = Arc::new(Mutex::new(Mixer::new(sample_rate)));

        let format = config.sample_format();
        let config: cpal::StreamConfig = config.into();
        let stream = match format {
            cpal::SampleFormat::F32 => build_stream(&device, &config, channels, &mixer, |s| s)?,
            cpal::SampleFormat::I16 => {
                build_stream(&device, &config, channels, &mixer, |s| (s * 32767.0) as i16)?
            }
            cpal::SampleFormat::U16 => build_stream(&device, &config, channels, &mixer, |s| {
                (s * 32767.0 + 32768.0) as u16
            })?,
            other => {
                return Err(LabError::Playback {
                    details: format!("unsupported sample format: {:?}", other),
                });
            }
        };

        stream
            .play()
            .map_err(|e| playback_error("failed to start audio stream", e))?;

        info!("Audio output open: {} ch @ {} Hz", channels, sample_rate);

        Ok(Self {
            mixer,
            _stream: stream,
            sample_rate,
        })
    }

    /// Device sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of voices still sounding
    pub fn active_voices(&self) -> usize {
        self.mixer.lock().map(|m| m.active_voices()).unwrap_or(0)
    }

    fn with_mixer<T>(&self, f: impl FnOnce(&mut Mixer) -> T) -> Result<T> {
        let mut mixer = self.mixer.lock().map_err(|_| LabError::Playback {
            details: "mixer lock poisoned".to_string(),
        })?;
        Ok(f(&mut mixer))
    }
}

impl PlaybackSink for DeviceOutput {
    fn play(&mut self, buffer: SampleBuffer, exclusive: bool) -> Result<VoiceId> {
        // Resample and convert before locking so the callback never waits on it
        let voice = Voice::prepare(buffer, self.sample_rate)?;
        let id = voice.id();
        let retired = self.with_mixer(|mixer| mixer.enqueue(voice, exclusive))?;
        drop(retired);
        Ok(id)
    }

    fn stop(&mut self) {
        match self.with_mixer(Mixer::drain) {
            Ok(retired) => drop(retired),
            Err(_) => error!("Could not stop playback: mixer lock poisoned"),
        }
    }
}

fn playback_error(context: &str, e: impl std::fmt::Display) -> LabError {
    LabError::Playback {
        details: format!("{}: {}", context, e),
    }
}

/// Build an output stream that renders the mixer into `T` samples
fn build_stream<T, F>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    mixer: &Arc<Mutex<Mixer>>,
    convert: F,
) -> Result<cpal::Stream>
where
    T: cpal::SizedSample + Send + 'static,
    F: Fn(f32) -> T + Send + 'static,
{
    let mixer = Arc::clone(mixer);
    let channels = channels.max(1);
    let mut stereo: Vec<f32> = vec![0.0; SCRATCH_FRAMES * 2];
    let silence = convert(0.0);

    let stream = device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let frames = data.len() / channels;
                if stereo.len() < frames * 2 {
                    stereo.resize(frames * 2, 0.0);
                }
                let stereo = &mut stereo[..frames * 2];

                match mixer.lock() {
                    Ok(mut mixer) => mixer.render(stereo),
                    Err(_) => stereo.fill(0.0),
                }

                for (frame, lr) in data.chunks_mut(channels).zip(stereo.chunks(2)) {
                    match frame.len() {
                        1 => frame[0] = convert((lr[0] + lr[1]) * 0.5),
                        _ => {
                            frame[0] = convert(lr[0]);
                            frame[1] = convert(lr[1]);
                            for extra in &mut frame[2..] {
                                *extra = silence;
                            }
                        }
                    }
                }
            },
            |err| error!("Audio stream error: {}", err),
            None,
        )
        .map_err(|e| playback_error("failed to build audio stream", e))?;

    debug!("Audio stream built");
    Ok(stream)
}
