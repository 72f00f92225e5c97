//! Signal processor
//!
//! Turns a [`ParameterSet`] into a [`SampleBuffer`] ready for playback:
//! filters a loaded sample for the low-pass and resonance labs, or
//! synthesizes a damped tone for the thermal lab. Each call is independent
//! and leaves no state behind.

use crate::audio::{self, SampleBuffer};
use crate::circuit;
use crate::dsp::{self, DampedOscillator, SYNTH_DURATION_SECS, SYNTH_SAMPLE_RATE};
use crate::error::{LabError, Result};
use crate::params::ParameterSet;
use log::{debug, info};
use std::fmt;
use std::path::{Path, PathBuf};

/// Order of the RC low-pass filter
const LOWPASS_ORDER: usize = 1;

/// Prototype order of the LC band-pass filter
const BANDPASS_ORDER: usize = 2;

/// Quantities derived from a parameter set
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CircuitReport {
    LowPass {
        cutoff: f64,
    },
    Resonance {
        resonance: f64,
        low_cutoff: f64,
        high_cutoff: f64,
    },
    Thermal {
        drive_frequency: f64,
        effective_resistance: f64,
        resonance: f64,
        bandwidth: f64,
        damping: f64,
        resonance_effect: f64,
    },
}

impl CircuitReport {
    /// Every derived quantity, by name
    fn quantities(&self) -> Vec<(&'static str, f64)> {
        match *self {
            CircuitReport::LowPass { cutoff } => vec![("cutoff", cutoff)],
            CircuitReport::Resonance {
                resonance,
                low_cutoff,
                high_cutoff,
            } => vec![
                ("resonance", resonance),
                ("low_cutoff", low_cutoff),
                ("high_cutoff", high_cutoff),
            ],
            CircuitReport::Thermal {
                effective_resistance,
                resonance,
                bandwidth,
                damping,
                resonance_effect,
                ..
            } => vec![
                ("effective_resistance", effective_resistance),
                ("resonance", resonance),
                ("bandwidth", bandwidth),
                ("damping", damping),
                ("resonance_effect", resonance_effect),
            ],
        }
    }
}

impl fmt::Display for CircuitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitReport::LowPass { cutoff } => write!(f, "cutoff {:.2} Hz", cutoff),
            CircuitReport::Resonance {
                resonance,
                low_cutoff,
                high_cutoff,
            } => write!(
                f,
                "resonance {:.2} Hz, band {:.2}..{:.2} Hz",
                resonance, low_cutoff, high_cutoff
            ),
            CircuitReport::Thermal {
                drive_frequency,
                effective_resistance,
                resonance,
                bandwidth,
                damping,
                resonance_effect,
            } => write!(
                f,
                "drive {:.2} Hz, R {:.4} Ω, resonance {:.2} Hz (bw {:.2} Hz), \
                 damping {:.2} /s, effect {:.4}",
                drive_frequency,
                effective_resistance,
                resonance,
                bandwidth,
                damping,
                resonance_effect
            ),
        }
    }
}

/// Applies the circuit labs to audio
#[derive(Debug, Clone, Default)]
pub struct SignalProcessor {
    /// Directory that relative sources are resolved against
    asset_root: Option<PathBuf>,
}

impl SignalProcessor {
    /// Create a processor that resolves sources relative to the working directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a processor that resolves relative sources against `root`
    pub fn with_asset_root<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            asset_root: Some(root.into()),
        }
    }

    /// Resolve a source reference to a file path
    pub fn resolve(&self, source: &Path) -> PathBuf {
        match &self.asset_root {
            Some(root) if source.is_relative() => root.join(source),
            _ => source.to_path_buf(),
        }
    }

    /// Validate `params` and compute the derived circuit quantities.
    ///
    /// Does not touch audio, so the resonance range check against the
    /// sample's Nyquist frequency is left to [`process`](Self::process).
    pub fn analyze(&self, params: &ParameterSet) -> Result<CircuitReport> {
        params.validate()?;

        let report = match *params {
            ParameterSet::LowPass {
                resistance,
                capacitance,
                ..
            } => CircuitReport::LowPass {
                cutoff: circuit::rc_cutoff(resistance, capacitance),
            },
            ParameterSet::Resonance {
                inductance,
                capacitance,
                ..
            } => {
                let resonance = circuit::lc_resonance(inductance, capacitance);
                let (low_cutoff, high_cutoff) = circuit::resonance_band(resonance);
                CircuitReport::Resonance {
                    resonance,
                    low_cutoff,
                    high_cutoff,
                }
            }
            ParameterSet::Thermal {
                base_resistance,
                inductance,
                capacitance,
                temperature,
                drive_frequency,
            } => {
                let effective_resistance = circuit::thermal_resistance(base_resistance, temperature);
                let resonance = circuit::lc_resonance(inductance, capacitance);
                let bandwidth = circuit::resonance_bandwidth(resonance);
                CircuitReport::Thermal {
                    drive_frequency,
                    effective_resistance,
                    resonance,
                    bandwidth,
                    damping: circuit::damping_factor(effective_resistance, inductance),
                    resonance_effect: circuit::resonance_effect(
                        drive_frequency,
                        resonance,
                        bandwidth,
                    ),
                }
            }
        };

        for (name, value) in report.quantities() {
            if !value.is_finite() {
                return Err(LabError::invalid(
                    name,
                    value,
                    "a finite value; the component values are too extreme",
                ));
            }
        }

        debug!("{} lab: {}", params.mode(), report);
        Ok(report)
    }

    /// Produce the buffer for one play action
    ///
    /// # Errors
    /// * `InvalidParameter` - a component value is missing or non-positive,
    ///   or the filter cannot be designed (cutoff at or above Nyquist)
    /// * `OutOfRange` / `InvalidBand` - the resonance is below 20 Hz, above
    ///   Nyquist, or its band is empty
    /// * `AssetNotFound` - the source audio cannot be read
    pub fn process(&self, params: &ParameterSet) -> Result<SampleBuffer> {
        let report = self.analyze(params)?;

        let buffer = match report {
            CircuitReport::LowPass { cutoff } => {
                let input = self.load(params)?;
                let filter =
                    dsp::butter_lowpass(LOWPASS_ORDER, cutoff, input.sample_rate() as f64)?;
                filter.apply(&input)?
            }
            CircuitReport::Resonance {
                resonance,
                low_cutoff,
                high_cutoff,
            } => {
                let input = self.load(params)?;
                let nyquist = input.nyquist();
                if !(circuit::MIN_AUDIBLE_HZ..=nyquist).contains(&resonance) {
                    return Err(LabError::OutOfRange {
                        frequency: resonance,
                        min: circuit::MIN_AUDIBLE_HZ,
                        max: nyquist,
                    });
                }
                if low_cutoff >= high_cutoff {
                    return Err(LabError::InvalidBand {
                        low: low_cutoff,
                        high: high_cutoff,
                    });
                }
                let filter = dsp::butter_bandpass(
                    BANDPASS_ORDER,
                    low_cutoff,
                    high_cutoff,
                    input.sample_rate() as f64,
                )?;
                filter.apply(&input)?
            }
            CircuitReport::Thermal {
                drive_frequency,
                damping,
                resonance_effect,
                ..
            } => DampedOscillator {
                frequency: drive_frequency,
                amplitude: resonance_effect,
                damping,
            }
            .render(SYNTH_DURATION_SECS, SYNTH_SAMPLE_RATE)?,
        };

        info!(
            "{} lab produced {:.2}s of audio ({} ch @ {} Hz)",
            params.mode(),
            buffer.duration(),
            buffer.channels(),
            buffer.sample_rate()
        );
        Ok(buffer)
    }

    fn load(&self, params: &ParameterSet) -> Result<SampleBuffer> {
        let source = params.source().ok_or_else(|| {
            LabError::invalid("source", params.mode(), "a lab that filters a sample")
        })?;
        audio::load_wav(self.resolve(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_resolve_relative_sources() {
        let processor = SignalProcessor::with_asset_root("assets");
        assert_eq!(
            processor.resolve(Path::new("audio/violin.wav")),
            PathBuf::from("assets/audio/violin.wav")
        );

        let absolute = std::env::temp_dir().join("drums.wav");
        assert_eq!(processor.resolve(&absolute), absolute);
        assert_eq!(
            SignalProcessor::new().resolve(Path::new("song.wav")),
            PathBuf::from("song.wav")
        );
    }

    #[test]
    fn test_analyze_low_pass() {
        let report = SignalProcessor::new()
            .analyze(&ParameterSet::LowPass {
                resistance: 1000.0,
                capacitance: 1e-6,
                source: PathBuf::from("violin.wav"),
            })
            .unwrap();
        match report {
            CircuitReport::LowPass { cutoff } => assert_relative_eq!(cutoff, 159.15, epsilon = 0.01),
            other => panic!("unexpected report {:?}", other),
        }
    }

    #[test]
    fn test_analyze_thermal() {
        let report = SignalProcessor::new()
            .analyze(&ParameterSet::Thermal {
                base_resistance: 1.0,
                inductance: 0.01,
                capacitance: 1e-6,
                temperature: 24.0,
                drive_frequency: 261.63,
            })
            .unwrap();
        match report {
            CircuitReport::Thermal {
                drive_frequency,
                effective_resistance,
                resonance,
                bandwidth,
                damping,
                resonance_effect,
            } => {
                assert_eq!(drive_frequency, 261.63);
                assert_relative_eq!(effective_resistance, 1.096, epsilon = 1e-12);
                assert_relative_eq!(resonance, 1591.549, epsilon = 1e-3);
                assert_relative_eq!(bandwidth, resonance / 10.0);
                assert_relative_eq!(damping, 54.8, epsilon = 1e-9);
                // 261.63 Hz sits about 8.4 bandwidths below resonance
                assert_relative_eq!(resonance_effect, 0.014_119, epsilon = 1e-5);
            }
            other => panic!("unexpected report {:?}", other),
        }
    }

    #[test]
    fn test_invalid_parameters_fail_before_loading() {
        // The source does not exist; validation must fail first
        let result = SignalProcessor::new().process(&ParameterSet::LowPass {
            resistance: -5.0,
            capacitance: 1e-6,
            source: PathBuf::from("missing.wav"),
        });
        assert!(matches!(result, Err(LabError::InvalidParameter { .. })));
    }

    #[test]
    fn test_analyze_rejects_overflowing_quantities() {
        // L*C underflows to zero, so the resonance would be infinite
        let tiny = ParameterSet::Thermal {
            base_resistance: 1.0,
            inductance: 1e-200,
            capacitance: 1e-200,
            temperature: 24.0,
            drive_frequency: 261.63,
        };
        let err = SignalProcessor::new().process(&tiny).unwrap_err();
        assert!(matches!(err, LabError::InvalidParameter { ref param, .. } if param == "resonance"));

        let result = SignalProcessor::new().analyze(&ParameterSet::LowPass {
            resistance: 1e-200,
            capacitance: 1e-200,
            source: PathBuf::from("missing.wav"),
        });
        assert!(matches!(result, Err(LabError::InvalidParameter { ref param, .. }) if param == "cutoff"));
    }

    #[test]
    fn test_missing_source() {
        let result = SignalProcessor::new().process(&ParameterSet::Resonance {
            inductance: 2.5e-3,
            capacitance: 1e-6,
            source: PathBuf::from("missing.wav"),
        });
        assert!(matches!(result, Err(LabError::AssetNotFound { .. })));
    }

    #[test]
    fn test_report_display() {
        let report = CircuitReport::Resonance {
            resonance: 3183.1,
            low_cutoff: 2864.79,
            high_cutoff: 3501.41,
        };
        assert_eq!(
            report.to_string(),
            "resonance 3183.10 Hz, band 2864.79..3501.41 Hz"
        );
    }
}
