//! Lab parameter sets
//!
//! One variant per lab, each carrying exactly the component values that lab
//! needs, in SI units (ohms, farads, henries, °C, Hz).

use crate::circuit;
use crate::error::{LabError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// The three labs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabMode {
    /// RC low-pass filter applied to a sample
    LowPass,
    /// LC band-pass around the resonance applied to a sample
    Resonance,
    /// Temperature-dependent RLC tone synthesis
    Thermal,
}

impl fmt::Display for LabMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabMode::LowPass => write!(f, "Low-pass"),
            LabMode::Resonance => write!(f, "Resonance"),
            LabMode::Thermal => write!(f, "Thermal"),
        }
    }
}

/// Parameters for one play action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ParameterSet {
    LowPass {
        resistance: f64,
        capacitance: f64,
        source: PathBuf,
    },
    Resonance {
        inductance: f64,
        capacitance: f64,
        source: PathBuf,
    },
    Thermal {
        base_resistance: f64,
        inductance: f64,
        capacitance: f64,
        temperature: f64,
        drive_frequency: f64,
    },
}

impl ParameterSet {
    /// Parse a JSON preset such as `{"mode": "low_pass", ...}`.
    ///
    /// A missing field, wrong type or unknown mode is an `InvalidParameter`;
    /// malformed JSON stays a `Serialization` error.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| {
            if e.is_data() {
                LabError::invalid("preset", e, "every field of its lab mode")
            } else {
                LabError::Serialization(e)
            }
        })
    }

    /// Which lab these parameters belong to
    pub fn mode(&self) -> LabMode {
        match self {
            ParameterSet::LowPass { .. } => LabMode::LowPass,
            ParameterSet::Resonance { .. } => LabMode::Resonance,
            ParameterSet::Thermal { .. } => LabMode::Thermal,
        }
    }

    /// Source audio reference, for the labs that filter a sample
    pub fn source(&self) -> Option<&Path> {
        match self {
            ParameterSet::LowPass { source, .. } | ParameterSet::Resonance { source, .. } => {
                Some(source)
            }
            ParameterSet::Thermal { .. } => None,
        }
    }

    /// Whether playback should stop other sounds first.
    ///
    /// Thermal tones are played like notes on a keyboard and may overlap;
    /// the filter labs replace whatever is playing.
    pub fn exclusive_playback(&self) -> bool {
        !matches!(self, ParameterSet::Thermal { .. })
    }

    /// Check that every component value is usable
    pub fn validate(&self) -> Result<()> {
        match self {
            ParameterSet::LowPass {
                resistance,
                capacitance,
                source,
            } => {
                positive("resistance", *resistance, "Ω")?;
                positive("capacitance", *capacitance, "F")?;
                non_empty_source(source)
            }
            ParameterSet::Resonance {
                inductance,
                capacitance,
                source,
            } => {
                positive("inductance", *inductance, "H")?;
                positive("capacitance", *capacitance, "F")?;
                non_empty_source(source)
            }
            ParameterSet::Thermal {
                base_resistance,
                inductance,
                capacitance,
                temperature,
                drive_frequency,
            } => {
                positive("base_resistance", *base_resistance, "Ω")?;
                positive("inductance", *inductance, "H")?;
                positive("capacitance", *capacitance, "F")?;
                positive("drive_frequency", *drive_frequency, "Hz")?;
                if !temperature.is_finite() {
                    return Err(LabError::invalid("temperature", temperature, "a finite °C value"));
                }
                let effective = circuit::thermal_resistance(*base_resistance, *temperature);
                if effective <= 0.0 {
                    return Err(LabError::invalid(
                        "temperature",
                        temperature,
                        &format!(
                            "above {:.1} °C so the resistance stays positive",
                            -1.0 / circuit::TEMPERATURE_COEFFICIENT
                        ),
                    ));
                }
                Ok(())
            }
        }
    }
}

fn positive(param: &str, value: f64, unit: &str) -> Result<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(LabError::invalid(param, value, &format!("> 0 {}", unit)));
    }
    Ok(())
}

fn non_empty_source(source: &Path) -> Result<()> {
    if source.as_os_str().is_empty() {
        return Err(LabError::invalid("source", "\"\"", "a path to an audio file"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thermal(base_resistance: f64, temperature: f64) -> ParameterSet {
        ParameterSet::Thermal {
            base_resistance,
            inductance: 0.01,
            capacitance: 1e-6,
            temperature,
            drive_frequency: 261.63,
        }
    }

    #[test]
    fn test_mode_and_playback_policy() {
        let low = ParameterSet::LowPass {
            resistance: 1000.0,
            capacitance: 1e-6,
            source: PathBuf::from("audio/violin.wav"),
        };
        assert_eq!(low.mode(), LabMode::LowPass);
        assert!(low.exclusive_playback());
        assert_eq!(low.source(), Some(Path::new("audio/violin.wav")));

        let tone = thermal(1.0, 24.0);
        assert_eq!(tone.mode(), LabMode::Thermal);
        assert!(!tone.exclusive_playback());
        assert_eq!(tone.source(), None);
    }

    #[test]
    fn test_rejects_non_positive_components() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let params = ParameterSet::Resonance {
                inductance: bad,
                capacitance: 1e-6,
                source: PathBuf::from("drums.wav"),
            };
            let err = params.validate().unwrap_err();
            assert!(matches!(err, LabError::InvalidParameter { ref param, .. } if param == "inductance"));
        }
    }

    #[test]
    fn test_preset_missing_field() {
        let preset = r#"{ "mode": "low_pass", "resistance": 1000.0, "source": "a.wav" }"#;
        let err = ParameterSet::from_json(preset).unwrap_err();
        match err {
            LabError::InvalidParameter { param, value, .. } => {
                assert_eq!(param, "preset");
                assert!(value.contains("capacitance"));
            }
            other => panic!("unexpected error {:?}", other),
        }

        let unknown = ParameterSet::from_json(r#"{ "mode": "high_pass" }"#);
        assert!(matches!(unknown, Err(LabError::InvalidParameter { .. })));

        let broken = ParameterSet::from_json("{ not json");
        assert!(matches!(broken, Err(LabError::Serialization(_))));
    }

    #[test]
    fn test_rejects_empty_source() {
        let params = ParameterSet::LowPass {
            resistance: 1000.0,
            capacitance: 1e-6,
            source: PathBuf::new(),
        };
        assert!(matches!(params.validate(), Err(LabError::InvalidParameter { .. })));
    }

    #[test]
    fn test_thermal_temperature_limits() {
        assert!(thermal(1.0, 24.0).validate().is_ok());
        assert!(thermal(1.0, -40.0).validate().is_ok());
        // Resistance crosses zero at -250 °C
        assert!(thermal(1.0, -300.0).validate().is_err());
        assert!(thermal(1.0, f64::NAN).validate().is_err());
    }

    #[test]
    fn test_preset_json_shape() {
        let json = r#"{
            "mode": "resonance",
            "inductance": 0.0025,
            "capacitance": 1e-6,
            "source": "audio/violin.wav"
        }"#;
        let params: ParameterSet = serde_json::from_str(json).unwrap();
        assert_eq!(
            params,
            ParameterSet::Resonance {
                inductance: 0.0025,
                capacitance: 1e-6,
                source: PathBuf::from("audio/violin.wav"),
            }
        );

        let missing = r#"{ "mode": "low_pass", "resistance": 1000.0, "source": "a.wav" }"#;
        assert!(serde_json::from_str::<ParameterSet>(missing).is_err());
    }
}
