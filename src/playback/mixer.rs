//! In-process voice mixer
//!
//! Holds every sound that is currently playing and renders their sum as
//! interleaved stereo. Exclusive plays cut everything else; overlapping
//! plays stack up to a fixed voice count.

use super::{PlaybackSink, VoiceId};
use crate::audio::SampleBuffer;
use crate::error::{LabError, Result};
use log::{debug, warn};
use uuid::Uuid;

/// Default number of simultaneous voices
pub const DEFAULT_MAX_VOICES: usize = 32;

/// One playing sound
#[derive(Debug, Clone)]
pub(super) struct Voice {
    id: VoiceId,
    /// Interleaved stereo at the mixer rate
    frames: Vec<f32>,
    /// Read position in `frames` (samples, not frames)
    position: usize,
}

impl Voice {
    /// Convert `buffer` to interleaved stereo at `sample_rate`.
    ///
    /// This walks the whole buffer, so callers sharing the mixer with an
    /// audio thread run it before taking the lock.
    pub(super) fn prepare(buffer: SampleBuffer, sample_rate: u32) -> Result<Self> {
        let buffer = buffer.resample(sample_rate)?;
        if buffer.num_frames() == 0 {
            return Err(LabError::Playback {
                details: "nothing to play".to_string(),
            });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            frames: buffer.to_stereo_f32(),
            position: 0,
        })
    }

    pub(super) fn id(&self) -> VoiceId {
        self.id
    }

    fn is_finished(&self) -> bool {
        self.position >= self.frames.len()
    }
}

/// Sums active voices into a stereo output stream
#[derive(Debug, Clone)]
pub struct Mixer {
    sample_rate: u32,
    max_voices: usize,
    voices: Vec<Voice>,
}

impl Mixer {
    /// Create a mixer that renders at `sample_rate`
    pub fn new(sample_rate: u32) -> Self {
        Self::with_max_voices(sample_rate, DEFAULT_MAX_VOICES)
    }

    /// Create a mixer with a custom voice limit
    pub fn with_max_voices(sample_rate: u32, max_voices: usize) -> Self {
        Self {
            sample_rate,
            max_voices: max_voices.max(1),
            voices: Vec::new(),
        }
    }

    /// Output sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of voices still playing
    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Whether the voice is still playing
    pub fn is_playing(&self, id: VoiceId) -> bool {
        self.voices.iter().any(|v| v.id == id)
    }

    /// Mix the next `out.len() / 2` stereo frames into `out`.
    ///
    /// Finished voices are dropped. Output is clamped to [-1, 1].
    pub fn render(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        for voice in &mut self.voices {
            let available = voice.frames.len() - voice.position;
            let count = available.min(out.len());
            let source = &voice.frames[voice.position..voice.position + count];
            for (o, s) in out.iter_mut().zip(source) {
                *o += s;
            }
            voice.position += count;
        }
        for sample in out.iter_mut() {
            *sample = sample.clamp(-1.0, 1.0);
        }
        self.voices.retain(|v| !v.is_finished());
    }
}

impl Mixer {
    /// Queue a prepared voice.
    ///
    /// Returns the voices it cut (all of them when exclusive, the oldest at
    /// the voice limit) so the caller can free them outside any lock.
    pub(super) fn enqueue(&mut self, voice: Voice, exclusive: bool) -> Vec<Voice> {
        let retired = if exclusive {
            self.drain()
        } else if self.voices.len() >= self.max_voices {
            let stolen = self.voices.remove(0);
            warn!("Voice limit {} reached, cutting {}", self.max_voices, stolen.id);
            vec![stolen]
        } else {
            Vec::new()
        };

        debug!(
            "Playing voice {} ({} active, exclusive: {})",
            voice.id,
            self.voices.len() + 1,
            exclusive
        );
        self.voices.push(voice);
        retired
    }

    /// Remove every voice
    pub(super) fn drain(&mut self) -> Vec<Voice> {
        if !self.voices.is_empty() {
            debug!("Stopping {} voice(s)", self.voices.len());
        }
        std::mem::take(&mut self.voices)
    }
}

impl PlaybackSink for Mixer {
    fn play(&mut self, buffer: SampleBuffer, exclusive: bool) -> Result<VoiceId> {
        let voice = Voice::prepare(buffer, self.sample_rate)?;
        let id = voice.id();
        self.enqueue(voice, exclusive);
        Ok(id)
    }

    fn stop(&mut self) {
        self.drain();
    }
}
