//! Window functions for transient (impact) measurements
//!
//! Impact testing uses two windows: the force channel is left untouched so the
//! short hammer pulse keeps its full energy, and the response channel gets a
//! decaying exponential that forces the ringdown towards zero by the end of
//! the record.

use serde::{Deserialize, Serialize};

use crate::error::{ModalError, Result};

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WindowType {
    /// Rectangular (boxcar) window: w[n] = 1
    Rectangular,

    /// One-sided exponential window: w[n] = end_value^(n/(M-1))
    ///
    /// Starts at 1.0 on the first sample and decays to `end_value` on the last.
    Exponential { end_value: f64 },
}

impl WindowType {
    /// Check window parameters
    pub fn validate(&self) -> Result<()> {
        match *self {
            WindowType::Rectangular => Ok(()),
            WindowType::Exponential { end_value } => {
                if end_value > 0.0 && end_value <= 1.0 {
                    Ok(())
                } else {
                    Err(ModalError::invalid(format!(
                        "exponential window end value must be in (0, 1], got {}",
                        end_value
                    )))
                }
            }
        }
    }

    /// Time constant of the exponential window in samples (infinite for boxcar)
    pub fn time_constant_samples(&self, length: usize) -> f64 {
        match *self {
            WindowType::Rectangular => f64::INFINITY,
            WindowType::Exponential { end_value } => {
                if length < 2 || end_value >= 1.0 {
                    f64::INFINITY
                } else {
                    (length - 1) as f64 / -end_value.ln()
                }
            }
        }
    }
}

/// Generate window coefficients
///
/// # Arguments
/// * `window_type` - Type of window function
/// * `length` - Number of samples (M)
///
/// # Returns
/// Vector of window coefficients w[n] for n = 0..M-1
pub fn generate_window(window_type: WindowType, length: usize) -> Vec<f64> {
    match window_type {
        WindowType::Rectangular => vec![1.0; length],

        WindowType::Exponential { .. } => {
            let tau = window_type.time_constant_samples(length);
            (0..length).map(|n| (-(n as f64) / tau).exp()).collect()
        }
    }
}

/// Apply window to signal
///
/// # Returns
/// Windowed copy of `signal`
pub fn apply_window(signal: &[f64], window_type: WindowType) -> Vec<f64> {
    if window_type == WindowType::Rectangular {
        return signal.to_vec();
    }

    let window = generate_window(window_type, signal.len());

    signal
        .iter()
        .zip(window.iter())
        .map(|(&s, &w)| s * w)
        .collect()
}
