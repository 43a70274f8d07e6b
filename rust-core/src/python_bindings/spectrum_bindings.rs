//! Python bindings for the stateless estimator

use numpy::{Complex64, PyArray1, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::config::EstimatorConfig;
use crate::spectrum::{estimate, WindowType};

/// Window type enum exposed to Python
#[pyclass(name = "WindowType")]
#[derive(Clone)]
pub enum PyWindowType {
    Rectangular,
    Exponential,
}

impl PyWindowType {
    pub(super) fn to_window(&self, end_value: f64) -> WindowType {
        match self {
            PyWindowType::Rectangular => WindowType::Rectangular,
            PyWindowType::Exponential => WindowType::Exponential { end_value },
        }
    }
}

/// H1 estimate from lists of force and response arrays
///
/// Args:
///     forces: List of force arrays, one per hit
///     responses: List of response arrays, one per hit
///     sample_rate: Sample rate in Hz
///     response_window: Window on the response channel
///     end_value: Final gain of the exponential window
///
/// Returns:
///     Tuple of (frequencies, h1, coherence) numpy arrays
#[pyfunction]
#[pyo3(signature = (
    forces,
    responses,
    sample_rate,
    response_window = PyWindowType::Exponential,
    end_value = 0.01
))]
pub fn estimate_frf<'py>(
    py: Python<'py>,
    forces: Vec<PyReadonlyArray1<'py, f64>>,
    responses: Vec<PyReadonlyArray1<'py, f64>>,
    sample_rate: u32,
    response_window: PyWindowType,
    end_value: f64,
) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<Complex64>, &'py PyArray1<f64>)> {
    if forces.len() != responses.len() {
        return Err(PyValueError::new_err(format!(
            "{} force arrays but {} response arrays",
            forces.len(),
            responses.len()
        )));
    }

    let forces: Vec<Vec<f64>> = forces.iter().map(|a| a.as_array().to_vec()).collect();
    let responses: Vec<Vec<f64>> = responses.iter().map(|a| a.as_array().to_vec()).collect();
    let pairs: Vec<(&[f64], &[f64])> = forces
        .iter()
        .zip(responses.iter())
        .map(|(f, r)| (f.as_slice(), r.as_slice()))
        .collect();

    let config = EstimatorConfig {
        response_window: response_window.to_window(end_value),
        ..EstimatorConfig::default()
    };
    let result = estimate(&pairs, sample_rate, &config)?;

    Ok((
        PyArray1::from_slice(py, &result.frequencies),
        PyArray1::from_slice(py, &result.h1),
        PyArray1::from_slice(py, &result.coherence),
    ))
}
