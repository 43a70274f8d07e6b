//! Thread-safe access to a session
//!
//! One mutex guards the whole session, so adding a hit, toggling a flag and
//! reading a cached result are each atomic with respect to one another.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{ModalError, Result};
use crate::measurement::{HitId, HitSamples, MeasurementSession};
use crate::spectrum::FrfEstimate;

/// Cloneable handle shared between the capture worker and the presentation side
#[derive(Debug, Clone)]
pub struct SessionHandle {
    session: Arc<Mutex<MeasurementSession>>,
}

impl SessionHandle {
    pub fn new(session: MeasurementSession) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, MeasurementSession>> {
        self.session.lock().map_err(|_| ModalError::LockPoisoned)
    }

    /// Run `f` with exclusive access to the session
    pub fn with_session<T>(&self, f: impl FnOnce(&mut MeasurementSession) -> T) -> Result<T> {
        let mut session = self.lock()?;
        Ok(f(&mut *session))
    }

    pub fn record_hit(
        &self,
        point_name: &str,
        force: Vec<f64>,
        response: Vec<f64>,
    ) -> Result<HitId> {
        self.lock()?.record_hit(point_name, force, response)
    }

    pub fn add_samples(&self, point_name: &str, samples: HitSamples) -> Result<HitId> {
        self.lock()?.add_samples(point_name, samples)
    }

    pub fn set_hit_validity(
        &self,
        point_name: &str,
        hit_id: HitId,
        is_valid: bool,
    ) -> Result<bool> {
        self.lock()?.set_hit_validity(point_name, hit_id, is_valid)
    }

    pub fn compute_point(&self, point_name: &str) -> Result<Arc<FrfEstimate>> {
        self.lock()?.compute_point(point_name)
    }

    pub fn all_results(&self) -> Result<BTreeMap<String, Arc<FrfEstimate>>> {
        self.lock()?.all_results()
    }

    /// Copy of the current session state (caches included)
    pub fn snapshot(&self) -> Result<MeasurementSession> {
        Ok(self.lock()?.clone())
    }
}
