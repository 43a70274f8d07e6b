//! Cross/auto spectral accumulation and the H1 estimator
//!
//! Every hit contributes one-sided density spectra Pxx (force), Pyy (response)
//! and Pxy (force against response). These are *summed* over hits into
//! Gxx/Gyy/Gxy; the H1 ratio and the coherence are invariant to the choice of
//! sum or mean, but the sums are exposed through [`SpectralSums`] so their
//! scale is pinned down.
//!
//! A bin whose denominator is exactly zero yields NaN for that bin. Callers
//! must mask NaN bins (see [`FrfEstimate::valid_bins`]) rather than treat them
//! as data.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use super::fft::FftEngine;
use super::windowing::apply_window;
use crate::config::EstimatorConfig;
use crate::error::{ModalError, Result};

/// Per-hit density spectra
#[derive(Debug, Clone, PartialEq)]
pub struct HitSpectra {
    /// Force auto-spectrum
    pub pxx: Vec<f64>,
    /// Response auto-spectrum
    pub pyy: Vec<f64>,
    /// Cross-spectrum conj(X)·Y
    pub pxy: Vec<Complex64>,
}

/// Spectra summed across hits, before the H1/coherence ratios
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralSums {
    pub frequencies: Vec<f64>,
    pub gxx: Vec<f64>,
    pub gyy: Vec<f64>,
    pub gxy: Vec<Complex64>,
    /// Number of hits summed
    pub averages: usize,
}

/// H1 frequency-response estimate of one point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrfEstimate {
    /// One-sided frequency axis in Hz
    pub frequencies: Vec<f64>,

    /// H1 = Gxy / Gxx (NaN where Gxx == 0)
    pub h1: Vec<Complex64>,

    /// |Gxy|² / (Gxx·Gyy) clamped to [0, 1] (NaN where the denominator is 0)
    pub coherence: Vec<f64>,

    /// Number of hits the estimate was averaged over
    pub averages: usize,
}

impl FrfEstimate {
    pub fn num_bins(&self) -> usize {
        self.frequencies.len()
    }

    /// Spacing of the frequency axis in Hz
    pub fn resolution_hz(&self) -> f64 {
        match self.frequencies.get(1) {
            Some(&f1) => f1 - self.frequencies[0],
            None => 0.0,
        }
    }

    /// Indices of bins where both H1 and coherence are defined
    pub fn valid_bins(&self) -> Vec<usize> {
        (0..self.num_bins())
            .filter(|&k| !self.h1[k].is_nan() && !self.coherence[k].is_nan())
            .collect()
    }

    /// FRF magnitude in dB, NaN bins stay NaN
    pub fn magnitude_db(&self) -> Vec<f64> {
        self.h1
            .iter()
            .map(|h| {
                if h.is_nan() {
                    f64::NAN
                } else {
                    20.0 * h.norm().max(1e-12).log10()
                }
            })
            .collect()
    }
}

/// One-sided density scaling for bin `k` of an `n`-point record
///
/// DC (and Nyquist for even n) have no mirror image, every other bin folds in
/// its negative-frequency twin.
fn one_sided_scale(k: usize, n: usize, sample_rate: f64) -> f64 {
    let base = 1.0 / (sample_rate * n as f64);
    let is_nyquist = n % 2 == 0 && k == n / 2;
    if k == 0 || is_nyquist {
        base
    } else {
        2.0 * base
    }
}

fn validate_pair(force: &[f64], response: &[f64], expected_len: usize) -> Result<()> {
    if force.is_empty() || response.is_empty() {
        return Err(ModalError::invalid("force and response must be non-empty"));
    }
    if force.len() != response.len() {
        return Err(ModalError::invalid(format!(
            "force length {} does not match response length {}",
            force.len(),
            response.len()
        )));
    }
    if force.len() != expected_len {
        return Err(ModalError::invalid(format!(
            "segment length {} differs from first segment length {}",
            force.len(),
            expected_len
        )));
    }
    Ok(())
}

fn spectra_with_engine(
    engine: &mut FftEngine,
    force: &[f64],
    response: &[f64],
    sample_rate: u32,
    config: &EstimatorConfig,
) -> Result<HitSpectra> {
    let n = engine.fft_size();
    let x = engine.compute_spectrum(&apply_window(force, config.force_window))?;
    let y = engine.compute_spectrum(&apply_window(response, config.response_window))?;

    let fs = sample_rate as f64;
    let mut spectra = HitSpectra {
        pxx: Vec::with_capacity(x.len()),
        pyy: Vec::with_capacity(x.len()),
        pxy: Vec::with_capacity(x.len()),
    };

    for (k, (xk, yk)) in x.iter().zip(y.iter()).enumerate() {
        let scale = one_sided_scale(k, n, fs);
        spectra.pxx.push(xk.norm_sqr() * scale);
        spectra.pyy.push(yk.norm_sqr() * scale);
        spectra.pxy.push(xk.conj() * yk * scale);
    }

    Ok(spectra)
}

fn check_sample_rate(sample_rate: u32) -> Result<()> {
    if sample_rate == 0 {
        return Err(ModalError::invalid("sample rate must be positive"));
    }
    Ok(())
}

/// Density spectra of a single (force, response) pair
pub fn hit_spectra(
    force: &[f64],
    response: &[f64],
    sample_rate: u32,
    config: &EstimatorConfig,
) -> Result<HitSpectra> {
    check_sample_rate(sample_rate)?;
    config.validate()?;
    validate_pair(force, response, force.len())?;

    let mut engine = FftEngine::new(force.len());
    spectra_with_engine(&mut engine, force, response, sample_rate, config)
}

/// Sum the density spectra of every pair
///
/// The first pair's length is the segment length; every other pair must match
/// it exactly.
pub fn accumulate(
    pairs: &[(&[f64], &[f64])],
    sample_rate: u32,
    config: &EstimatorConfig,
) -> Result<SpectralSums> {
    check_sample_rate(sample_rate)?;
    config.validate()?;

    let Some(&(first_force, _)) = pairs.first() else {
        return Err(ModalError::EmptyInput("no (force, response) pairs to accumulate".into()));
    };

    let segment_len = first_force.len();
    for (force, response) in pairs {
        validate_pair(force, response, segment_len)?;
    }

    let mut engine = FftEngine::new(segment_len);
    let num_bins = engine.num_bins();

    let mut sums = SpectralSums {
        frequencies: engine.frequency_axis_hz(sample_rate),
        gxx: vec![0.0; num_bins],
        gyy: vec![0.0; num_bins],
        gxy: vec![Complex64::new(0.0, 0.0); num_bins],
        averages: 0,
    };

    for (force, response) in pairs {
        let spectra = spectra_with_engine(&mut engine, force, response, sample_rate, config)?;

        for k in 0..num_bins {
            sums.gxx[k] += spectra.pxx[k];
            sums.gyy[k] += spectra.pyy[k];
            sums.gxy[k] += spectra.pxy[k];
        }
        sums.averages += 1;
    }

    Ok(sums)
}

impl SpectralSums {
    /// Form H1 and coherence from the accumulated spectra
    pub fn estimate(&self) -> FrfEstimate {
        let nan = Complex64::new(f64::NAN, f64::NAN);

        let h1 = self
            .gxy
            .iter()
            .zip(self.gxx.iter())
            .map(|(&gxy, &gxx)| if gxx == 0.0 { nan } else { gxy / gxx })
            .collect();

        let coherence = (0..self.gxy.len())
            .map(|k| {
                let denom = self.gxx[k] * self.gyy[k];
                if denom == 0.0 {
                    f64::NAN
                } else {
                    (self.gxy[k].norm_sqr() / denom).clamp(0.0, 1.0)
                }
            })
            .collect();

        FrfEstimate {
            frequencies: self.frequencies.clone(),
            h1,
            coherence,
            averages: self.averages,
        }
    }
}

/// H1 estimate and coherence over all pairs
pub fn estimate(
    pairs: &[(&[f64], &[f64])],
    sample_rate: u32,
    config: &EstimatorConfig,
) -> Result<FrfEstimate> {
    Ok(accumulate(pairs, sample_rate, config)?.estimate())
}
