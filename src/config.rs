//! Lab configuration
//!
//! Default component values for each lab, the named sample library and the
//! directory samples live in. Stored as JSON; any field left out of the file
//! falls back to its default.

use crate::error::Result;
use crate::processor::SignalProcessor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Defaults for the RC low-pass lab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LowPassDefaults {
    /// Ohms
    pub resistance: f64,
    /// Farads
    pub capacitance: f64,
    /// Sample name from the library
    pub sample: String,
}

impl Default for LowPassDefaults {
    fn default() -> Self {
        Self {
            resistance: 1000.0,
            capacitance: 1e-6,
            sample: "violin".to_string(),
        }
    }
}

/// Defaults for the LC resonance lab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResonanceDefaults {
    /// Henries
    pub inductance: f64,
    /// Farads
    pub capacitance: f64,
    /// Sample name from the library
    pub sample: String,
}

impl Default for ResonanceDefaults {
    fn default() -> Self {
        Self {
            inductance: 2.5e-3,
            capacitance: 1e-6,
            sample: "violin".to_string(),
        }
    }
}

/// Defaults for the thermal synthesizer lab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermalDefaults {
    /// Resistance at 0 °C, ohms
    pub base_resistance: f64,
    /// Henries
    pub inductance: f64,
    /// Farads
    pub capacitance: f64,
    /// Degrees Celsius
    pub temperature: f64,
}

impl Default for ThermalDefaults {
    fn default() -> Self {
        Self {
            base_resistance: 1.0,
            inductance: 0.01,
            capacitance: 1e-6,
            temperature: 24.0,
        }
    }
}

/// Complete lab configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    /// Directory relative sample paths are resolved against
    pub asset_root: Option<PathBuf>,
    /// Named samples, keyed by lower-case name
    pub samples: BTreeMap<String, PathBuf>,
    pub low_pass: LowPassDefaults,
    pub resonance: ResonanceDefaults,
    pub thermal: ThermalDefaults,
}

impl Default for LabConfig {
    fn default() -> Self {
        let samples = [
            ("violin", "audio/violin.wav"),
            ("drum", "audio/drums.wav"),
            ("song", "audio/song.wav"),
        ]
        .into_iter()
        .map(|(name, path)| (name.to_string(), PathBuf::from(path)))
        .collect();

        Self {
            asset_root: None,
            samples,
            low_pass: LowPassDefaults::default(),
            resonance: ResonanceDefaults::default(),
            thermal: ThermalDefaults::default(),
        }
    }
}

impl LabConfig {
    /// Load a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Load `path` if given, otherwise use the defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Look up a named sample, ignoring case
    pub fn sample_path(&self, name: &str) -> Option<&Path> {
        self.samples
            .get(&name.to_lowercase())
            .map(PathBuf::as_path)
    }

    /// Treat `reference` as a sample name, or else as a path
    pub fn resolve_sample(&self, reference: &str) -> PathBuf {
        self.sample_path(reference)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(reference))
    }

    /// A processor that resolves sources against the configured asset root
    pub fn processor(&self) -> SignalProcessor {
        match &self.asset_root {
            Some(root) => SignalProcessor::with_asset_root(root),
            None => SignalProcessor::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LabError;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_match_lab_panels() {
        let config = LabConfig::default();
        assert_eq!(config.low_pass.resistance, 1000.0);
        assert_eq!(config.resonance.inductance, 2.5e-3);
        assert_eq!(config.thermal.temperature, 24.0);
        assert_eq!(config.sample_path("Violin"), Some(Path::new("audio/violin.wav")));
        assert_eq!(config.sample_path("cello"), None);
    }

    #[test]
    fn test_resolve_sample_falls_back_to_path() {
        let config = LabConfig::default();
        assert_eq!(config.resolve_sample("drum"), PathBuf::from("audio/drums.wav"));
        assert_eq!(config.resolve_sample("my/take.wav"), PathBuf::from("my/take.wav"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lab.json");
        fs::write(&path, r#"{ "asset_root": "/srv/lab", "thermal": { "temperature": 80.0 } }"#)
            .unwrap();

        let config = LabConfig::load(&path).unwrap();
        assert_eq!(config.asset_root, Some(PathBuf::from("/srv/lab")));
        assert_eq!(config.thermal.temperature, 80.0);
        assert_eq!(config.thermal.inductance, 0.01);
        assert_eq!(config.low_pass, LowPassDefaults::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lab.json");

        let mut config = LabConfig::default();
        config.resonance.capacitance = 2.2e-6;
        config.save(&path).unwrap();

        assert_eq!(LabConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_errors() {
        assert!(matches!(LabConfig::load("/no/such/lab.json"), Err(LabError::Io(_))));

        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(LabConfig::load(&path), Err(LabError::Serialization(_))));
    }
}
