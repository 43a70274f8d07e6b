//! FFT engine using realfft for real-valued signals
//!
//! Produces the one-sided complex spectrum of an exact-length record. Hit
//! records are never zero-padded or truncated here: a length mismatch would
//! silently change the frequency resolution of the estimate.

use num_complex::Complex64;
use realfft::{RealFftPlanner, RealToComplex};
use std::sync::Arc;

use crate::error::{ModalError, Result};

/// FFT engine for real-valued signals
pub struct FftEngine {
    /// FFT size (number of samples)
    fft_size: usize,

    /// Real FFT processor
    r2c: Arc<dyn RealToComplex<f64>>,

    /// Reusable input buffer (realfft scrambles its input)
    input_buffer: Vec<f64>,

    /// Reusable scratch space
    scratch: Vec<Complex64>,
}

impl FftEngine {
    /// Create new FFT engine
    ///
    /// # Arguments
    /// * `fft_size` - FFT size (number of samples)
    pub fn new(fft_size: usize) -> Self {
        let mut planner = RealFftPlanner::<f64>::new();
        let r2c = planner.plan_fft_forward(fft_size);
        let scratch = r2c.make_scratch_vec();

        Self {
            fft_size,
            r2c,
            input_buffer: vec![0.0; fft_size],
            scratch,
        }
    }

    /// Compute the one-sided complex spectrum X[k], k = 0..=N/2
    pub fn compute_spectrum(&mut self, signal: &[f64]) -> Result<Vec<Complex64>> {
        if signal.len() != self.fft_size {
            return Err(ModalError::invalid(format!(
                "signal length {} does not match FFT size {}",
                signal.len(),
                self.fft_size
            )));
        }

        self.input_buffer.copy_from_slice(signal);
        let mut output = self.r2c.make_output_vec();

        self.r2c
            .process_with_scratch(&mut self.input_buffer, &mut output, &mut self.scratch)
            .map_err(|e| ModalError::Fft(e.to_string()))?;

        Ok(output)
    }

    /// Get FFT size
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Get number of frequency bins (fft_size/2 + 1 for real FFT)
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Frequency resolution in Hz
    pub fn resolution_hz(&self, sample_rate: u32) -> f64 {
        sample_rate as f64 / self.fft_size as f64
    }

    /// One-sided frequency axis in Hz: k * fs / N for k = 0..=N/2
    pub fn frequency_axis_hz(&self, sample_rate: u32) -> Vec<f64> {
        let df = self.resolution_hz(sample_rate);
        (0..self.num_bins()).map(|k| k as f64 * df).collect()
    }
}
