//! Error handling for the circuit labs
//!
//! Every failure aborts the current play action without producing audio.
//! Errors carry an error code and a recovery hint for the front end.

use thiserror::Error;

/// Result type alias for circuit lab operations
pub type Result<T> = std::result::Result<T, LabError>;

/// Main error type for circuit lab operations
#[derive(Error, Debug)]
pub enum LabError {
    // Parameter errors
    #[error("Invalid parameter: {param} = {value} (expected {expected})")]
    InvalidParameter {
        param: String,
        value: String,
        expected: String,
    },

    #[error("Frequency {frequency:.2} Hz is out of range ({min:.2}..{max:.2} Hz)")]
    OutOfRange { frequency: f64, min: f64, max: f64 },

    #[error("Invalid band: low edge {low:.2} Hz must be below high edge {high:.2} Hz")]
    InvalidBand { low: f64, high: f64 },

    // Asset errors
    #[error("Audio asset not found or unreadable: {path}")]
    AssetNotFound {
        path: String,
        #[source]
        source: Option<hound::Error>,
    },

    #[error("Unsupported audio format: {details}")]
    UnsupportedFormat { details: String },

    // Output errors
    #[error("Playback error: {details}")]
    Playback { details: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LabError {
    /// Shorthand for an `InvalidParameter` error
    pub fn invalid(param: &str, value: impl ToString, expected: &str) -> Self {
        LabError::InvalidParameter {
            param: param.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            LabError::InvalidParameter { .. } => "INVALID_PARAMETER",
            LabError::OutOfRange { .. } => "OUT_OF_RANGE",
            LabError::InvalidBand { .. } => "INVALID_BAND",
            LabError::AssetNotFound { .. } => "ASSET_NOT_FOUND",
            LabError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            LabError::Playback { .. } => "PLAYBACK_ERROR",
            LabError::Io(_) => "IO_ERROR",
            LabError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// True for the resonance range failures (frequency window or band ordering)
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, LabError::OutOfRange { .. } | LabError::InvalidBand { .. })
    }

    /// Returns a suggested recovery action for this error
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::InvalidParameter { .. } => {
                "Use positive component values; keep the cutoff below half the sample rate"
            }
            Self::OutOfRange { .. } => {
                "Change L or C so the resonance lands between 20 Hz and half the sample rate"
            }
            Self::InvalidBand { .. } => "Change L or C to move the resonance band",
            Self::AssetNotFound { .. } => "Check that the audio file exists and is a valid WAV file",
            Self::UnsupportedFormat { .. } => "Convert to a mono or stereo WAV file",
            Self::Playback { .. } => "Check the audio output device, or render to a file instead",
            _ => "Check the error details and try again",
        }
    }
}
