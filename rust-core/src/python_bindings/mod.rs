//! PyO3 bindings for the Python front end

use pyo3::exceptions::{PyKeyError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::error::ModalError;

mod session_bindings;
mod spectrum_bindings;

impl From<ModalError> for PyErr {
    fn from(err: ModalError) -> Self {
        match &err {
            ModalError::NotFound(_) => PyKeyError::new_err(err.to_string()),
            ModalError::InvalidInput(_) | ModalError::EmptyInput(_) => {
                PyValueError::new_err(err.to_string())
            }
            ModalError::Fft(_) | ModalError::LockPoisoned => {
                PyRuntimeError::new_err(err.to_string())
            }
        }
    }
}

/// Python module definition
#[pymodule]
fn modal_hammer(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<session_bindings::PyMeasurementSession>()?;
    m.add_class::<session_bindings::PyHitInfo>()?;
    m.add_class::<spectrum_bindings::PyWindowType>()?;
    m.add_function(wrap_pyfunction!(spectrum_bindings::estimate_frf, m)?)?;

    Ok(())
}
