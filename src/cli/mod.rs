//! CLI Module
//!
//! Command-line front end for the circuit labs.

pub mod commands;

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Circuit Sound - hear how R, L and C shape audio
#[derive(Parser, Debug)]
#[command(name = "circuit-sound")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Lab configuration file (JSON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where processed audio goes
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Write to this WAV file instead of the audio device
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Bit depth for --output (16, 24 or 32)
    #[arg(long, default_value_t = 16)]
    pub bits: u16,
}

/// Thermal synthesizer components; unset values come from the config
#[derive(Args, Debug, Clone, Default)]
pub struct ThermalArgs {
    /// Temperature in °C
    #[arg(short, long, allow_negative_numbers = true)]
    pub temperature: Option<f64>,

    /// Base resistance in Ω
    #[arg(short, long)]
    pub resistance: Option<f64>,

    /// Inductance in H
    #[arg(long)]
    pub inductance: Option<f64>,

    /// Capacitance in µF
    #[arg(long = "capacitance-uf")]
    pub capacitance_uf: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// RC low-pass filter applied to a sample
    #[command(name = "low-pass")]
    LowPass {
        /// Sample name from the library, or a path to a WAV file
        #[arg(short, long)]
        sample: Option<String>,

        /// Resistance in Ω
        #[arg(short, long)]
        resistance: Option<f64>,

        /// Capacitance in µF
        #[arg(long = "capacitance-uf")]
        capacitance_uf: Option<f64>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// LC band-pass around the resonance applied to a sample
    #[command(name = "resonance")]
    Resonance {
        /// Sample name from the library, or a path to a WAV file
        #[arg(short, long)]
        sample: Option<String>,

        /// Inductance in mH
        #[arg(long = "inductance-mh")]
        inductance_mh: Option<f64>,

        /// Capacitance in µF
        #[arg(long = "capacitance-uf")]
        capacitance_uf: Option<f64>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Synthesize one damped RLC tone
    #[command(name = "thermal")]
    Thermal {
        #[command(flatten)]
        circuit: ThermalArgs,

        /// Drive note (defaults to red)
        #[arg(short, long, value_enum, conflicts_with = "frequency")]
        note: Option<Note>,

        /// Drive frequency in Hz
        #[arg(short, long)]
        frequency: Option<f64>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Play a run of thermal tones from keyboard keys (z x c v b n m)
    #[command(name = "keys")]
    Keys {
        /// Keys to play, in order
        keys: String,

        /// Milliseconds between key presses
        #[arg(long, default_value_t = 250)]
        interval_ms: u64,

        #[command(flatten)]
        circuit: ThermalArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Process a parameter preset (JSON)
    #[command(name = "run")]
    Run {
        /// Preset file
        preset: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List the drive notes and their keys
    #[command(name = "notes")]
    Notes,

    /// Write the default lab configuration
    #[command(name = "init-config")]
    InitConfig {
        /// Destination file
        path: PathBuf,
    },
}

/// Rainbow note palette used to pick a drive frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Note {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Indigo,
    Violet,
}

impl Note {
    pub const ALL: [Note; 7] = [
        Note::Red,
        Note::Orange,
        Note::Yellow,
        Note::Green,
        Note::Blue,
        Note::Indigo,
        Note::Violet,
    ];

    /// Drive frequency in Hz (C4 through B4)
    pub fn frequency(self) -> f64 {
        match self {
            Note::Red => 261.63,
            Note::Orange => 293.66,
            Note::Yellow => 329.63,
            Note::Green => 349.23,
            Note::Blue => 392.00,
            Note::Indigo => 440.00,
            Note::Violet => 493.88,
        }
    }

    /// Keyboard key bound to this note
    pub fn key(self) -> char {
        match self {
            Note::Red => 'z',
            Note::Orange => 'x',
            Note::Yellow => 'c',
            Note::Green => 'v',
            Note::Blue => 'b',
            Note::Indigo => 'n',
            Note::Violet => 'm',
        }
    }

    /// Note bound to a keyboard key, ignoring case
    pub fn from_key(key: char) -> Option<Note> {
        let key = key.to_ascii_lowercase();
        Note::ALL.into_iter().find(|note| note.key() == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(Note::from_key('z'), Some(Note::Red));
        assert_eq!(Note::from_key('M'), Some(Note::Violet));
        assert_eq!(Note::from_key('q'), None);
        for note in Note::ALL {
            assert_eq!(Note::from_key(note.key()), Some(note));
        }
    }

    #[test]
    fn test_notes_ascend() {
        assert!(Note::ALL
            .windows(2)
            .all(|pair| pair[0].frequency() < pair[1].frequency()));
        assert_eq!(Note::Indigo.frequency(), 440.0);
    }

    #[test]
    fn test_parse_thermal_command() {
        let cli = Cli::try_parse_from([
            "circuit-sound",
            "thermal",
            "--temperature",
            "-10",
            "--note",
            "blue",
            "-o",
            "tone.wav",
        ])
        .unwrap();
        match cli.command {
            Commands::Thermal {
                circuit,
                note,
                frequency,
                output,
            } => {
                assert_eq!(circuit.temperature, Some(-10.0));
                assert_eq!(note, Some(Note::Blue));
                assert_eq!(frequency, None);
                assert_eq!(output.output, Some(PathBuf::from("tone.wav")));
                assert_eq!(output.bits, 16);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_note_and_frequency_conflict() {
        let result = Cli::try_parse_from([
            "circuit-sound",
            "thermal",
            "--note",
            "red",
            "--frequency",
            "300",
        ]);
        assert!(result.is_err());
    }
}
