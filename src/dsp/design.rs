//! Butterworth filter design
//!
//! Filters are designed the classic way: an analog Butterworth prototype is
//! frequency-transformed to the requested low-pass or band-pass shape at
//! pre-warped edges, then mapped to the z-plane with the bilinear transform.
//! Critical frequencies are normalized to Nyquist and must satisfy
//! `0 < Wn < 1`.

use super::filter::{BiquadCoeffs, SosFilter};
use crate::error::{LabError, Result};
use log::debug;
use num_complex::Complex64;
use std::f64::consts::PI;

/// Roots closer than this to the real axis are treated as real
const REAL_EPSILON: f64 = 1e-10;

/// Bilinear transform rate for Nyquist-normalized frequencies (fs = 2)
const NORMALIZED_FS: f64 = 2.0;

/// Zeros, poles and gain of a transfer function
#[derive(Debug, Clone)]
struct Zpk {
    zeros: Vec<Complex64>,
    poles: Vec<Complex64>,
    gain: f64,
}

impl Zpk {
    /// Analog Butterworth low-pass prototype with a 1 rad/s cutoff
    fn butterworth_prototype(order: usize) -> Self {
        let n = order as f64;
        let poles = (0..order)
            .map(|k| {
                let m = 2.0 * k as f64 - n + 1.0;
                -Complex64::from_polar(1.0, PI * m / (2.0 * n))
            })
            .collect();
        Zpk {
            zeros: Vec::new(),
            poles,
            gain: 1.0,
        }
    }

    fn relative_degree(&self) -> usize {
        self.poles.len() - self.zeros.len()
    }

    /// Move the prototype cutoff to `wo` rad/s
    fn to_lowpass(self, wo: f64) -> Self {
        let degree = self.relative_degree();
        Zpk {
            zeros: self.zeros.iter().map(|z| *z * wo).collect(),
            poles: self.poles.iter().map(|p| *p * wo).collect(),
            gain: self.gain * wo.powi(degree as i32),
        }
    }

    /// Turn the prototype into a band-pass centred on `wo` with width `bw`
    fn to_bandpass(self, wo: f64, bw: f64) -> Self {
        let degree = self.relative_degree();
        let split = |roots: &[Complex64]| -> Vec<Complex64> {
            let scaled: Vec<Complex64> = roots.iter().map(|r| *r * (bw / 2.0)).collect();
            let offsets: Vec<Complex64> = scaled.iter().map(|r| (*r * *r - wo * wo).sqrt()).collect();
            scaled
                .iter()
                .zip(&offsets)
                .map(|(r, d)| *r + *d)
                .chain(scaled.iter().zip(&offsets).map(|(r, d)| *r - *d))
                .collect()
        };

        let mut zeros = split(&self.zeros);
        zeros.extend(std::iter::repeat(Complex64::new(0.0, 0.0)).take(degree));

        Zpk {
            zeros,
            poles: split(&self.poles),
            gain: self.gain * bw.powi(degree as i32),
        }
    }

    /// Map the analog filter to the z-plane
    fn bilinear(self, fs: f64) -> Self {
        let fs2 = 2.0 * fs;
        let degree = self.relative_degree();

        let numer: Complex64 = self.zeros.iter().map(|z| fs2 - *z).product();
        let denom: Complex64 = self.poles.iter().map(|p| fs2 - *p).product();

        let mut zeros: Vec<Complex64> = self.zeros.iter().map(|z| (fs2 + *z) / (fs2 - *z)).collect();
        zeros.extend(std::iter::repeat(Complex64::new(-1.0, 0.0)).take(degree));

        Zpk {
            zeros,
            poles: self.poles.iter().map(|p| (fs2 + *p) / (fs2 - *p)).collect(),
            gain: self.gain * (numer / denom).re,
        }
    }

    /// Factor into biquads, keeping conjugate pairs together
    fn into_sections(self) -> SosFilter {
        let zero_groups = group_roots(&self.zeros);
        let pole_groups = group_roots(&self.poles);
        let count = zero_groups.len().max(pole_groups.len());

        let mut sections: Vec<BiquadCoeffs> = (0..count)
            .map(|i| {
                let b = monic_quadratic(zero_groups.get(i).map_or(&[][..], Vec::as_slice));
                let a = monic_quadratic(pole_groups.get(i).map_or(&[][..], Vec::as_slice));
                BiquadCoeffs {
                    b0: b[0],
                    b1: b[1],
                    b2: b[2],
                    a1: a[1],
                    a2: a[2],
                }
            })
            .collect();

        if sections.is_empty() {
            sections.push(BiquadCoeffs::IDENTITY);
        }
        let first = &mut sections[0];
        first.b0 *= self.gain;
        first.b1 *= self.gain;
        first.b2 *= self.gain;

        SosFilter::new(sections)
    }
}

/// Group roots into conjugate pairs, then pairs of real roots, then a lone real root
fn group_roots(roots: &[Complex64]) -> Vec<Vec<Complex64>> {
    let mut groups: Vec<Vec<Complex64>> = roots
        .iter()
        .filter(|r| r.im > REAL_EPSILON)
        .map(|r| vec![*r, r.conj()])
        .collect();

    let mut reals: Vec<Complex64> = roots
        .iter()
        .filter(|r| r.im.abs() <= REAL_EPSILON)
        .map(|r| Complex64::new(r.re, 0.0))
        .collect();
    reals.sort_by(|a, b| a.re.total_cmp(&b.re));
    groups.extend(reals.chunks(2).map(<[Complex64]>::to_vec));

    groups
}

/// Coefficients of `(1 - r1 z^-1)(1 - r2 z^-1)` for up to two roots
fn monic_quadratic(roots: &[Complex64]) -> [f64; 3] {
    match roots {
        [] => [1.0, 0.0, 0.0],
        [r] => [1.0, -r.re, 0.0],
        [r1, r2, ..] => [1.0, -(*r1 + *r2).re, (*r1 * *r2).re],
    }
}

/// Pre-warp a Nyquist-normalized frequency for the bilinear transform
fn prewarp(wn: f64) -> f64 {
    2.0 * NORMALIZED_FS * (PI * wn / NORMALIZED_FS).tan()
}

/// Normalize `frequency` to Nyquist and check `0 < Wn < 1`
fn normalize(param: &str, frequency: f64, sample_rate: f64) -> Result<f64> {
    let wn = frequency / (sample_rate / 2.0);
    if !(wn > 0.0 && wn < 1.0) {
        return Err(LabError::invalid(
            param,
            format!("{:.2} Hz (Wn = {:.4})", frequency, wn),
            &format!("0 < Wn < 1, i.e. between 0 and {:.1} Hz", sample_rate / 2.0),
        ));
    }
    Ok(wn)
}

fn check_order(order: usize) -> Result<()> {
    if order == 0 {
        return Err(LabError::invalid("order", order, ">= 1"));
    }
    Ok(())
}

/// Design a Butterworth low-pass filter
///
/// # Errors
/// `InvalidParameter` if the order is zero or the cutoff is not strictly
/// between 0 Hz and Nyquist.
pub fn butter_lowpass(order: usize, cutoff_hz: f64, sample_rate: f64) -> Result<SosFilter> {
    check_order(order)?;
    let wn = normalize("cutoff", cutoff_hz, sample_rate)?;
    debug!("Butterworth low-pass: order {}, Wn = {:.6}", order, wn);

    Ok(Zpk::butterworth_prototype(order)
        .to_lowpass(prewarp(wn))
        .bilinear(NORMALIZED_FS)
        .into_sections())
}

/// Design a Butterworth band-pass filter
///
/// The result has `2 * order` poles, like the textbook band-pass
/// transformation of an `order`-pole prototype.
///
/// # Errors
/// `InvalidParameter` if the order is zero, an edge is not strictly between
/// 0 Hz and Nyquist, or the edges are not increasing.
pub fn butter_bandpass(
    order: usize,
    low_hz: f64,
    high_hz: f64,
    sample_rate: f64,
) -> Result<SosFilter> {
    check_order(order)?;
    let low = normalize("low_cutoff", low_hz, sample_rate)?;
    let high = normalize("high_cutoff", high_hz, sample_rate)?;
    if low >= high {
        return Err(LabError::invalid(
            "band",
            format!("{:.2}..{:.2} Hz", low_hz, high_hz),
            "low edge below high edge",
        ));
    }
    debug!(
        "Butterworth band-pass: order {}, Wn = [{:.6}, {:.6}]",
        order, low, high
    );

    let (w1, w2) = (prewarp(low), prewarp(high));
    Ok(Zpk::butterworth_prototype(order)
        .to_bandpass((w1 * w2).sqrt(), w2 - w1)
        .bilinear(NORMALIZED_FS)
        .into_sections())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const FS: f64 = 44100.0;

    #[test]
    fn test_first_order_lowpass_coefficients() {
        // Closed form: K = tan(pi * Wn / 2), b = K/(1+K) * [1, 1], a1 = (K-1)/(K+1)
        let cutoff = 1000.0;
        let k = (PI * cutoff / FS).tan();
        let filter = butter_lowpass(1, cutoff, FS).unwrap();

        assert_eq!(filter.sections().len(), 1);
        let s = filter.sections()[0];
        assert_relative_eq!(s.b0, k / (1.0 + k), epsilon = 1e-12);
        assert_relative_eq!(s.b1, k / (1.0 + k), epsilon = 1e-12);
        assert_relative_eq!(s.b2, 0.0);
        assert_relative_eq!(s.a1, (k - 1.0) / (k + 1.0), epsilon = 1e-12);
        assert_relative_eq!(s.a2, 0.0);
    }

    #[test]
    fn test_lowpass_response_shape() {
        for cutoff in [50.0, 159.15, 1000.0, 8000.0] {
            let filter = butter_lowpass(1, cutoff, FS).unwrap();
            assert_relative_eq!(filter.magnitude_at(0.0, FS), 1.0, epsilon = 1e-9);
            assert_relative_eq!(
                filter.magnitude_at(cutoff, FS),
                std::f64::consts::FRAC_1_SQRT_2,
                epsilon = 1e-9
            );
            assert!(filter.magnitude_at(cutoff, FS) < filter.magnitude_at(cutoff / 10.0, FS));
            assert!(filter.magnitude_at(FS / 2.0, FS) < 1e-6);
        }
    }

    #[test]
    fn test_higher_order_lowpass_is_steeper() {
        let first = butter_lowpass(1, 1000.0, FS).unwrap();
        let fourth = butter_lowpass(4, 1000.0, FS).unwrap();
        assert_eq!(fourth.sections().len(), 2);
        assert_relative_eq!(fourth.magnitude_at(1000.0, FS), first.magnitude_at(1000.0, FS), epsilon = 1e-9);
        assert!(fourth.magnitude_at(4000.0, FS) < first.magnitude_at(4000.0, FS));
    }

    #[test]
    fn test_lowpass_rejects_cutoff_at_or_above_nyquist() {
        for cutoff in [22050.0, 30000.0, 0.0, -5.0, f64::NAN] {
            let result = butter_lowpass(1, cutoff, FS);
            assert!(
                matches!(result, Err(LabError::InvalidParameter { .. })),
                "cutoff {} should be rejected",
                cutoff
            );
        }
    }

    #[test]
    fn test_bandpass_response_shape() {
        let (low, high) = (2864.79, 3501.41);
        let filter = butter_bandpass(2, low, high, FS).unwrap();
        assert_eq!(filter.sections().len(), 2);

        // Unity gain at the centre of the pre-warped band
        let t1 = (PI * low / FS).tan();
        let t2 = (PI * high / FS).tan();
        let centre = FS / PI * (t1 * t2).sqrt().atan();
        assert_relative_eq!(filter.magnitude_at(centre, FS), 1.0, epsilon = 1e-6);

        // Edges sit at the half-power point
        assert_relative_eq!(
            filter.magnitude_at(low, FS),
            std::f64::consts::FRAC_1_SQRT_2,
            epsilon = 1e-6
        );
        assert_relative_eq!(
            filter.magnitude_at(high, FS),
            std::f64::consts::FRAC_1_SQRT_2,
            epsilon = 1e-6
        );

        assert!(filter.magnitude_at(0.0, FS) < 1e-9);
        assert!(filter.magnitude_at(FS / 2.0, FS) < 1e-9);
        assert!(filter.magnitude_db(300.0, FS) < -30.0);
    }

    #[test]
    fn test_bandpass_is_stable() {
        let filter = butter_bandpass(2, 18.0, 22.0, FS).unwrap();
        for s in filter.sections() {
            // Poles of 1 + a1 z^-1 + a2 z^-2 lie inside the unit circle
            assert!(s.a2.abs() < 1.0);
            assert!(s.a1.abs() < 1.0 + s.a2);
        }
    }

    #[test]
    fn test_bandpass_rejects_edges_past_nyquist() {
        let result = butter_bandpass(2, 20000.0, 24000.0, FS);
        assert!(matches!(result, Err(LabError::InvalidParameter { .. })));
    }

    #[test]
    fn test_bandpass_rejects_inverted_band() {
        let result = butter_bandpass(2, 3000.0, 1000.0, FS);
        assert!(matches!(result, Err(LabError::InvalidParameter { .. })));
    }

    #[test]
    fn test_zero_order_rejected() {
        assert!(butter_lowpass(0, 1000.0, FS).is_err());
        assert!(butter_bandpass(0, 900.0, 1100.0, FS).is_err());
    }
}
