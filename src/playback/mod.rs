//! Playback sinks
//!
//! The signal processor never plays audio itself. It hands finished
//! buffers to a [`PlaybackSink`], which decides how they reach the ears.

#[cfg(feature = "device")]
mod device;
mod mixer;

#[cfg(feature = "device")]
pub use device::DeviceOutput;
pub use mixer::{Mixer, DEFAULT_MAX_VOICES};

use crate::audio::SampleBuffer;
use crate::error::Result;
use crate::params::ParameterSet;
use crate::processor::SignalProcessor;
use uuid::Uuid;

/// Handle for a sound handed to a sink
pub type VoiceId = Uuid;

/// Destination for processed audio
pub trait PlaybackSink {
    /// Start playing `buffer`.
    ///
    /// With `exclusive` set, every other sound is stopped first; otherwise
    /// the buffer plays on top of whatever is already sounding.
    fn play(&mut self, buffer: SampleBuffer, exclusive: bool) -> Result<VoiceId>;

    /// Halt all current playback immediately
    fn stop(&mut self);
}

/// Process `params` and play the result with the lab's playback policy.
///
/// Nothing reaches the sink when processing fails, so a rejected parameter
/// set never interrupts sounds that are already playing.
pub fn play_lab<S: PlaybackSink + ?Sized>(
    sink: &mut S,
    processor: &SignalProcessor,
    params: &ParameterSet,
) -> Result<VoiceId> {
    let buffer = processor.process(params)?;
    sink.play(buffer, params.exclusive_playback())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LabError;
    use std::path::PathBuf;

    fn tone(drive_frequency: f64) -> ParameterSet {
        ParameterSet::Thermal {
            base_resistance: 1.0,
            inductance: 0.01,
            capacitance: 1e-6,
            temperature: 24.0,
            drive_frequency,
        }
    }

    #[test]
    fn test_thermal_tones_overlap() {
        let processor = SignalProcessor::new();
        let mut mixer = Mixer::new(44100);

        let first = play_lab(&mut mixer, &processor, &tone(261.63)).unwrap();
        let second = play_lab(&mut mixer, &processor, &tone(329.63)).unwrap();

        assert!(mixer.is_playing(first));
        assert!(mixer.is_playing(second));
    }

    #[test]
    fn test_failed_processing_keeps_current_sound() {
        let processor = SignalProcessor::new();
        let mut mixer = Mixer::new(44100);
        let playing = play_lab(&mut mixer, &processor, &tone(440.0)).unwrap();

        let bad = ParameterSet::LowPass {
            resistance: 1000.0,
            capacitance: 1e-6,
            source: PathBuf::from("does/not/exist.wav"),
        };
        let result = play_lab(&mut mixer, &processor, &bad);

        assert!(matches!(result, Err(LabError::AssetNotFound { .. })));
        assert!(mixer.is_playing(playing));
    }
}
