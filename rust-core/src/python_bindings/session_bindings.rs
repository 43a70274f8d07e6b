//! Python bindings for the measurement session

use numpy::{Complex64, PyArray1, PyReadonlyArray1};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use super::spectrum_bindings::PyWindowType;
use crate::config::EstimatorConfig;
use crate::measurement::{Coordinates, MeasurementSession, DEFAULT_OVERLOAD_LIMIT};
use crate::spectrum::FrfEstimate;

type FrfArrays<'py> = (&'py PyArray1<f64>, &'py PyArray1<Complex64>, &'py PyArray1<f64>);

fn frf_arrays<'py>(py: Python<'py>, result: &FrfEstimate) -> FrfArrays<'py> {
    (
        PyArray1::from_slice(py, &result.frequencies),
        PyArray1::from_slice(py, &result.h1),
        PyArray1::from_slice(py, &result.coherence),
    )
}

/// Read-only summary of one hit
#[pyclass(name = "HitInfo")]
#[derive(Clone)]
pub struct PyHitInfo {
    #[pyo3(get)]
    pub id: u32,
    #[pyo3(get)]
    pub is_valid: bool,
    #[pyo3(get)]
    pub is_overloaded: bool,
    #[pyo3(get)]
    pub peak_force: f64,
    #[pyo3(get)]
    pub duration: f64,
}

/// Measurement session exposed to Python
#[pyclass(name = "MeasurementSession")]
pub struct PyMeasurementSession {
    session: MeasurementSession,
}

#[pymethods]
impl PyMeasurementSession {
    /// Create a new session
    ///
    /// Args:
    ///     subject_name: Structure under test
    ///     author: Who ran the test
    ///     date: Free-form date string
    ///     sample_rate: Nominal sample rate in Hz
    #[new]
    #[pyo3(signature = (subject_name, author, date, sample_rate=48000))]
    fn new(subject_name: &str, author: &str, date: &str, sample_rate: u32) -> PyResult<Self> {
        Ok(Self {
            session: MeasurementSession::new(subject_name, author, date, sample_rate)?,
        })
    }

    #[getter]
    fn subject_name(&self) -> String {
        self.session.subject_name().to_string()
    }

    #[getter]
    fn sample_rate(&self) -> u32 {
        self.session.sample_rate()
    }

    /// Create a point if it does not exist yet
    #[pyo3(signature = (name, x=0.0, y=0.0, z=0.0))]
    fn create_point(&mut self, name: &str, x: f64, y: f64, z: f64) {
        self.session
            .get_or_create_point(name, Some(Coordinates::new(x, y, z)));
    }

    fn point_names(&self) -> Vec<String> {
        self.session.point_names().iter().map(|n| n.to_string()).collect()
    }

    /// Record one strike
    ///
    /// Returns:
    ///     The new hit id
    fn record_hit(
        &mut self,
        point_name: &str,
        force: PyReadonlyArray1<f64>,
        response: PyReadonlyArray1<f64>,
    ) -> PyResult<u32> {
        let force = force.as_array().to_vec();
        let response = response.as_array().to_vec();
        Ok(self.session.record_hit(point_name, force, response)?)
    }

    fn set_hit_validity(
        &mut self,
        point_name: &str,
        hit_id: u32,
        is_valid: bool,
    ) -> PyResult<bool> {
        Ok(self.session.set_hit_validity(point_name, hit_id, is_valid)?)
    }

    /// Summaries of every hit at a point
    #[pyo3(signature = (point_name, overload_limit=DEFAULT_OVERLOAD_LIMIT))]
    fn hits(&self, point_name: &str, overload_limit: f64) -> PyResult<Vec<PyHitInfo>> {
        let point = self.session.point(point_name)?;
        Ok(point
            .hits()
            .iter()
            .map(|hit| PyHitInfo {
                id: hit.id(),
                is_valid: hit.is_valid(),
                is_overloaded: hit.is_overloaded(overload_limit),
                peak_force: hit.peak_force(),
                duration: hit.duration(),
            })
            .collect())
    }

    /// Raw (force, response) arrays of one hit
    fn hit_data<'py>(
        &self,
        py: Python<'py>,
        point_name: &str,
        hit_id: u32,
    ) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<f64>)> {
        let hit = self.session.point(point_name)?.hit(hit_id)?;
        Ok((
            PyArray1::from_slice(py, hit.force()),
            PyArray1::from_slice(py, hit.response()),
        ))
    }

    /// Change the response window used by every point
    #[pyo3(signature = (response_window, end_value=0.01))]
    fn set_response_window(
        &mut self,
        response_window: PyWindowType,
        end_value: f64,
    ) -> PyResult<()> {
        let estimator = EstimatorConfig {
            response_window: response_window.to_window(end_value),
            ..*self.session.estimator()
        };
        Ok(self.session.set_estimator(estimator)?)
    }

    /// FRF of one point
    ///
    /// Returns:
    ///     Tuple of (frequencies, h1, coherence) numpy arrays
    fn compute_point<'py>(
        &mut self,
        py: Python<'py>,
        point_name: &str,
    ) -> PyResult<FrfArrays<'py>> {
        let result = self.session.compute_point(point_name)?;
        Ok(frf_arrays(py, &result))
    }

    /// Dict of point name to (frequencies, h1, coherence) for points with data
    fn all_results<'py>(&mut self, py: Python<'py>) -> PyResult<&'py PyDict> {
        let dict = PyDict::new(py);
        for (name, result) in self.session.all_results()? {
            dict.set_item(name, frf_arrays(py, &result))?;
        }
        Ok(dict)
    }
}
