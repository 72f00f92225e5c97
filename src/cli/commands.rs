//! CLI Command Implementations
//!
//! Each lab command builds a parameter set from its flags (falling back to
//! the configuration), runs it through the signal processor and delivers
//! the result to a WAV file or the audio device.

use std::path::Path;

use log::{info, warn};

use super::{Note, OutputArgs, ThermalArgs};
use crate::audio::{save_wav_with_depth, SampleBuffer};
use crate::config::LabConfig;
use crate::dsp::{SYNTH_DURATION_SECS, SYNTH_SAMPLE_RATE};
use crate::error::{LabError, Result};
use crate::params::ParameterSet;
use crate::playback::{Mixer, PlaybackSink};

const MICROFARAD: f64 = 1e-6;
const MILLIHENRY: f64 = 1e-3;

/// Run the RC low-pass lab.
pub fn low_pass(
    config: &LabConfig,
    sample: Option<&str>,
    resistance: Option<f64>,
    capacitance_uf: Option<f64>,
    output: &OutputArgs,
) -> Result<()> {
    let defaults = &config.low_pass;
    let params = ParameterSet::LowPass {
        resistance: resistance.unwrap_or(defaults.resistance),
        capacitance: capacitance_uf.map_or(defaults.capacitance, |c| c * MICROFARAD),
        source: config.resolve_sample(sample.unwrap_or(defaults.sample.as_str())),
    };
    run_params(config, &params, output)
}

/// Run the LC resonance lab.
pub fn resonance(
    config: &LabConfig,
    sample: Option<&str>,
    inductance_mh: Option<f64>,
    capacitance_uf: Option<f64>,
    output: &OutputArgs,
) -> Result<()> {
    let defaults = &config.resonance;
    let params = ParameterSet::Resonance {
        inductance: inductance_mh.map_or(defaults.inductance, |l| l * MILLIHENRY),
        capacitance: capacitance_uf.map_or(defaults.capacitance, |c| c * MICROFARAD),
        source: config.resolve_sample(sample.unwrap_or(defaults.sample.as_str())),
    };
    run_params(config, &params, output)
}

/// Synthesize a single thermal tone.
pub fn thermal(
    config: &LabConfig,
    circuit: &ThermalArgs,
    note: Option<Note>,
    frequency: Option<f64>,
    output: &OutputArgs,
) -> Result<()> {
    let drive_frequency = frequency.unwrap_or_else(|| note.unwrap_or(Note::Red).frequency());
    let params = thermal_params(config, circuit, drive_frequency);
    run_params(config, &params, output)
}

/// Play thermal tones for a run of keys, letting them ring over each other.
pub fn keys(
    config: &LabConfig,
    keys: &str,
    interval_ms: u64,
    circuit: &ThermalArgs,
    output: &OutputArgs,
) -> Result<()> {
    let notes: Vec<Note> = keys
        .chars()
        .filter(|c| !c.is_whitespace())
        .filter_map(|c| {
            let note = Note::from_key(c);
            if note.is_none() {
                warn!("Ignoring unmapped key '{}'", c);
            }
            note
        })
        .collect();
    if notes.is_empty() {
        return Err(LabError::invalid("keys", keys, "at least one of z x c v b n m"));
    }

    let processor = config.processor();
    let tones = notes
        .iter()
        .map(|note| processor.process(&thermal_params(config, circuit, note.frequency())))
        .collect::<Result<Vec<SampleBuffer>>>()?;

    info!("Playing {} tone(s) every {} ms", tones.len(), interval_ms);
    match &output.output {
        Some(path) => {
            let mixed = render_offline(tones, interval_ms)?;
            write_output(&mixed, path, output.bits)
        }
        None => play_sequence_on_device(tones, interval_ms),
    }
}

/// Run a preset file.
pub fn run_preset(config: &LabConfig, preset: &Path, output: &OutputArgs) -> Result<()> {
    info!("Loading preset: {}", preset.display());
    let text = std::fs::read_to_string(preset)?;
    let params = ParameterSet::from_json(&text)?;
    run_params(config, &params, output)
}

/// Print the note palette.
pub fn list_notes() -> Result<()> {
    println!("Key  Note     Frequency");
    for note in Note::ALL {
        println!(
            " {}   {:<8} {:>7.2} Hz",
            note.key(),
            format!("{:?}", note),
            note.frequency()
        );
    }
    Ok(())
}

/// Write the default configuration.
pub fn init_config(path: &Path) -> Result<()> {
    LabConfig::default().save(path)?;
    println!("Configuration written: {}", path.display());
    Ok(())
}

fn thermal_params(config: &LabConfig, circuit: &ThermalArgs, drive_frequency: f64) -> ParameterSet {
    let defaults = &config.thermal;
    ParameterSet::Thermal {
        base_resistance: circuit.resistance.unwrap_or(defaults.base_resistance),
        inductance: circuit.inductance.unwrap_or(defaults.inductance),
        capacitance: circuit
            .capacitance_uf
            .map_or(defaults.capacitance, |c| c * MICROFARAD),
        temperature: circuit.temperature.unwrap_or(defaults.temperature),
        drive_frequency,
    }
}

fn run_params(config: &LabConfig, params: &ParameterSet, output: &OutputArgs) -> Result<()> {
    let processor = config.processor();
    let report = processor.analyze(params)?;
    println!("{} lab: {}", params.mode(), report);

    let buffer = processor.process(params)?;
    match &output.output {
        Some(path) => write_output(&buffer, path, output.bits),
        None => play_on_device(buffer, params.exclusive_playback()),
    }
}

fn write_output(buffer: &SampleBuffer, path: &Path, bits: u16) -> Result<()> {
    save_wav_with_depth(buffer, path, bits)?;
    println!(
        "Wrote {} ({:.2}s, {} ch @ {} Hz)",
        path.display(),
        buffer.duration(),
        buffer.channels(),
        buffer.sample_rate()
    );
    Ok(())
}

/// Mix tones started `interval_ms` apart into one stereo buffer
fn render_offline(tones: Vec<SampleBuffer>, interval_ms: u64) -> Result<SampleBuffer> {
    let mut mixer = Mixer::new(SYNTH_SAMPLE_RATE);
    let step = (SYNTH_SAMPLE_RATE as u64 * interval_ms / 1000) as usize * 2;
    let tail = (SYNTH_SAMPLE_RATE * SYNTH_DURATION_SECS) as usize * 2;

    let mut mixed = Vec::new();
    let mut block = vec![0.0; step];
    let count = tones.len();
    for (i, tone) in tones.into_iter().enumerate() {
        mixer.play(tone, false)?;
        if i + 1 < count {
            mixer.render(&mut block);
            mixed.extend_from_slice(&block);
        }
    }

    let mut rest = vec![0.0; tail];
    mixer.render(&mut rest);
    mixed.extend_from_slice(&rest);

    SampleBuffer::new(mixed, 2, SYNTH_SAMPLE_RATE)
}

#[cfg(feature = "device")]
fn play_on_device(buffer: SampleBuffer, exclusive: bool) -> Result<()> {
    let mut device = crate::playback::DeviceOutput::open()?;
    let seconds = buffer.duration();
    device.play(buffer, exclusive)?;
    std::thread::sleep(std::time::Duration::from_secs_f32(seconds));
    Ok(())
}

#[cfg(feature = "device")]
fn play_sequence_on_device(tones: Vec<SampleBuffer>, interval_ms: u64) -> Result<()> {
    let mut device = crate::playback::DeviceOutput::open()?;
    for tone in tones {
        device.play(tone, false)?;
        std::thread::sleep(std::time::Duration::from_millis(interval_ms));
    }
    std::thread::sleep(std::time::Duration::from_secs(SYNTH_DURATION_SECS as u64));
    Ok(())
}

#[cfg(not(feature = "device"))]
fn play_on_device(_buffer: SampleBuffer, _exclusive: bool) -> Result<()> {
    Err(no_device())
}

#[cfg(not(feature = "device"))]
fn play_sequence_on_device(_tones: Vec<SampleBuffer>, _interval_ms: u64) -> Result<()> {
    Err(no_device())
}

#[cfg(not(feature = "device"))]
fn no_device() -> LabError {
    LabError::Playback {
        details: "built without the `device` feature; pass --output to write a WAV file"
            .to_string(),
    }
}
