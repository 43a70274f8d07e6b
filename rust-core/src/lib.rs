//! Modal Hammer - Impact-Test FRF Estimation Core
//! 
//! Averages repeated hammer strikes at a measurement point into an H1
//! frequency-response estimate and its coherence, with Python bindings.

// Suppress PyO3 non-local impl warnings (harmless macro-generated code)
#![cfg_attr(feature = "python", allow(non_local_definitions))]

pub mod capture;
pub mod config;
pub mod error;
pub mod measurement;
pub mod spectrum;

#[cfg(feature = "python")]
pub mod python_bindings;

pub use config::{CaptureConfig, EstimatorConfig};
pub use error::{ModalError, Result};
pub use measurement::{Hit, HitSamples, MeasurementSession, PointMeasurement};
pub use spectrum::{FrfEstimate, WindowType};
