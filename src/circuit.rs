//! Circuit formulas
//!
//! Pure functions mapping component values (SI units) to the quantities
//! that drive the filters and the synthesizer.

use std::f64::consts::PI;

/// Temperature coefficient of resistance used by the thermal lab (per °C)
pub const TEMPERATURE_COEFFICIENT: f64 = 0.004;

/// Lowest resonance the resonance lab accepts (Hz)
pub const MIN_AUDIBLE_HZ: f64 = 20.0;

/// RC low-pass cutoff: 1 / (2πRC)
pub fn rc_cutoff(resistance: f64, capacitance: f64) -> f64 {
    1.0 / (2.0 * PI * resistance * capacitance)
}

/// LC resonance: 1 / (2π√(LC))
pub fn lc_resonance(inductance: f64, capacitance: f64) -> f64 {
    1.0 / (2.0 * PI * (inductance * capacitance).sqrt())
}

/// Bandwidth used around a resonance (a tenth of the resonance)
pub fn resonance_bandwidth(resonance: f64) -> f64 {
    resonance / 10.0
}

/// Band edges `(resonance - bw, resonance + bw)`
pub fn resonance_band(resonance: f64) -> (f64, f64) {
    let bandwidth = resonance_bandwidth(resonance);
    (resonance - bandwidth, resonance + bandwidth)
}

/// Resistance at `temperature` °C: R0·(1 + α·T)
pub fn thermal_resistance(base_resistance: f64, temperature: f64) -> f64 {
    base_resistance * (1.0 + TEMPERATURE_COEFFICIENT * temperature)
}

/// Envelope decay rate of a series RLC: R / 2L (1/s)
pub fn damping_factor(resistance: f64, inductance: f64) -> f64 {
    resistance / (2.0 * inductance)
}

/// Lorentzian response of a resonance to a drive frequency.
///
/// Equals 1 at the resonance and falls toward 0 away from it.
pub fn resonance_effect(drive_frequency: f64, resonance: f64, bandwidth: f64) -> f64 {
    let detune = (drive_frequency - resonance) / bandwidth;
    1.0 / (1.0 + detune * detune)
}
