//! Explicit configuration values
//!
//! Every setting is passed by value to whoever needs it; there is no global
//! settings store behind these types.

use serde::{Deserialize, Serialize};

use crate::error::{ModalError, Result};
use crate::spectrum::WindowType;

/// Windowing applied per channel before the spectra are formed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Window on the hammer (force) channel
    pub force_window: WindowType,

    /// Window on the structural response channel
    pub response_window: WindowType,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            force_window: WindowType::Rectangular,
            response_window: WindowType::Exponential { end_value: 0.01 },
        }
    }
}

impl EstimatorConfig {
    pub fn validate(&self) -> Result<()> {
        self.force_window.validate()?;
        self.response_window.validate()
    }
}

/// Settings handed to the capture collaborator for one recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Input device name, `None` for the host default
    pub device: Option<String>,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Recording length per hit in seconds
    pub duration_secs: f64,

    /// Number of interleaved channels in a captured frame
    pub channels: usize,

    /// Channel index carrying the instrumented hammer
    pub force_channel: usize,

    /// Channel index carrying the response sensor
    pub response_channel: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: 48000,
            duration_secs: 1.0,
            channels: 2,
            force_channel: 0,
            response_channel: 1,
        }
    }
}

impl CaptureConfig {
    /// Number of samples per channel in one recording
    pub fn num_samples(&self) -> usize {
        (self.sample_rate as f64 * self.duration_secs).round() as usize
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(ModalError::invalid("sample rate must be positive"));
        }
        if !(self.duration_secs > 0.0) || !self.duration_secs.is_finite() {
            return Err(ModalError::invalid(format!(
                "capture duration must be positive (got {})",
                self.duration_secs
            )));
        }
        if self.force_channel >= self.channels || self.response_channel >= self.channels {
            return Err(ModalError::invalid(format!(
                "channel map ({}, {}) out of range for {} channels",
                self.force_channel, self.response_channel, self.channels
            )));
        }
        if self.force_channel == self.response_channel {
            return Err(ModalError::invalid("force and response must use different channels"));
        }
        Ok(())
    }
}
