//! A measurement project: every point measured on one structure

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::hit::{HitId, HitSamples};
use super::point::{Coordinates, PointMeasurement};
use crate::config::EstimatorConfig;
use crate::error::{ModalError, Result};
use crate::spectrum::FrfEstimate;

/// Test project state
///
/// Points keep their creation order for presentation; lookups are by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "StoredSession")]
pub struct MeasurementSession {
    subject_name: String,
    author: String,
    date: String,

    /// Nominal sample rate for hits recorded through the session
    sample_rate: u32,

    #[serde(default)]
    estimator: EstimatorConfig,

    points: Vec<PointMeasurement>,
}

/// Session as written to disk, checked before it becomes a [`MeasurementSession`]
#[derive(Deserialize)]
struct StoredSession {
    subject_name: String,
    author: String,
    date: String,
    sample_rate: u32,
    #[serde(default)]
    estimator: EstimatorConfig,
    points: Vec<PointMeasurement>,
}

impl TryFrom<StoredSession> for MeasurementSession {
    type Error = ModalError;

    fn try_from(stored: StoredSession) -> Result<Self> {
        let mut session = MeasurementSession::new(
            stored.subject_name,
            stored.author,
            stored.date,
            stored.sample_rate,
        )?;
        session.set_estimator(stored.estimator)?;

        for point in stored.points {
            if session.point(point.name()).is_ok() {
                return Err(ModalError::invalid(format!(
                    "point '{}' appears more than once",
                    point.name()
                )));
            }
            if let Some(hit) = point.hits().iter().find(|h| h.sample_rate() != stored.sample_rate) {
                return Err(ModalError::invalid(format!(
                    "hit {} of point '{}' was recorded at {} Hz in a {} Hz session",
                    hit.id(),
                    point.name(),
                    hit.sample_rate(),
                    stored.sample_rate
                )));
            }
            session.points.push(point);
        }

        Ok(session)
    }
}

impl MeasurementSession {
    pub fn new(
        subject_name: impl Into<String>,
        author: impl Into<String>,
        date: impl Into<String>,
        sample_rate: u32,
    ) -> Result<Self> {
        if sample_rate == 0 {
            return Err(ModalError::invalid("session sample rate must be positive"));
        }

        let session = Self {
            subject_name: subject_name.into(),
            author: author.into(),
            date: date.into(),
            sample_rate,
            estimator: EstimatorConfig::default(),
            points: Vec::new(),
        };
        info!(subject = %session.subject_name, sample_rate, "measurement session created");
        Ok(session)
    }

    pub fn subject_name(&self) -> &str {
        &self.subject_name
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn estimator(&self) -> &EstimatorConfig {
        &self.estimator
    }

    /// Replace the window configuration; cached results become stale
    pub fn set_estimator(&mut self, estimator: EstimatorConfig) -> Result<()> {
        estimator.validate()?;
        if estimator != self.estimator {
            self.estimator = estimator;
            self.points.iter_mut().for_each(PointMeasurement::invalidate_cache);
        }
        Ok(())
    }

    /// Points in creation order
    pub fn points(&self) -> &[PointMeasurement] {
        &self.points
    }

    pub fn point_names(&self) -> Vec<&str> {
        self.points.iter().map(|p| p.name()).collect()
    }

    pub fn point(&self, name: &str) -> Result<&PointMeasurement> {
        self.points
            .iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| missing_point(name))
    }

    pub fn point_mut(&mut self, name: &str) -> Result<&mut PointMeasurement> {
        self.points
            .iter_mut()
            .find(|p| p.name() == name)
            .ok_or_else(|| missing_point(name))
    }

    /// Existing point, or a new one at `coordinates` (default origin)
    ///
    /// Coordinates of an existing point are never overwritten.
    pub fn get_or_create_point(
        &mut self,
        name: &str,
        coordinates: Option<Coordinates>,
    ) -> &mut PointMeasurement {
        let index = match self.points.iter().position(|p| p.name() == name) {
            Some(index) => index,
            None => {
                info!(point = name, "measurement point created");
                self.points
                    .push(PointMeasurement::new(name, coordinates.unwrap_or_default()));
                self.points.len() - 1
            }
        };
        &mut self.points[index]
    }

    pub fn remove_point(&mut self, name: &str) -> Result<PointMeasurement> {
        let index = self
            .points
            .iter()
            .position(|p| p.name() == name)
            .ok_or_else(|| missing_point(name))?;

        info!(point = name, "measurement point removed");
        Ok(self.points.remove(index))
    }

    /// Record one strike at `point_name` using the session sample rate
    pub fn record_hit(
        &mut self,
        point_name: &str,
        force: Vec<f64>,
        response: Vec<f64>,
    ) -> Result<HitId> {
        let samples = HitSamples::new(force, response, self.sample_rate)?;
        self.add_samples(point_name, samples)
    }

    /// Record already-validated samples at `point_name`
    ///
    /// Samples captured at a rate other than the session's are refused.
    pub fn add_samples(&mut self, point_name: &str, samples: HitSamples) -> Result<HitId> {
        if samples.sample_rate() != self.sample_rate {
            return Err(ModalError::invalid(format!(
                "hit recorded at {} Hz in a {} Hz session",
                samples.sample_rate(),
                self.sample_rate
            )));
        }

        let id = self.get_or_create_point(point_name, None).add_hit(samples);
        debug!(point = point_name, hit = id, "hit recorded");
        Ok(id)
    }

    pub fn set_hit_validity(
        &mut self,
        point_name: &str,
        hit_id: HitId,
        is_valid: bool,
    ) -> Result<bool> {
        self.point_mut(point_name)?.set_hit_validity(hit_id, is_valid)
    }

    pub fn compute_point(&mut self, point_name: &str) -> Result<Arc<FrfEstimate>> {
        let sample_rate = self.sample_rate;
        let estimator = self.estimator;
        self.point_mut(point_name)?
            .compute_frf_with(sample_rate, &estimator)
    }

    /// Results for every point with at least one valid hit
    ///
    /// Points without valid hits are left out; any other failure is returned.
    pub fn all_results(&mut self) -> Result<BTreeMap<String, Arc<FrfEstimate>>> {
        let sample_rate = self.sample_rate;
        let estimator = self.estimator;
        let mut results = BTreeMap::new();

        for point in self.points.iter_mut() {
            match point.compute_frf_with(sample_rate, &estimator) {
                Ok(estimate) => {
                    results.insert(point.name().to_string(), estimate);
                }
                Err(ModalError::EmptyInput(_)) => continue,
                Err(err) => return Err(err),
            }
        }

        Ok(results)
    }
}

fn missing_point(name: &str) -> ModalError {
    ModalError::not_found(format!("point '{}'", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::PointState;

    fn impact(len: usize, gain: f64) -> (Vec<f64>, Vec<f64>) {
        let mut force = vec![0.0; len];
        force[0] = 0.6;
        force[1] = 0.2;
        let response = (0..len)
            .map(|n| gain * (-(n as f64) / 40.0).exp() * (n as f64 * 0.3).cos())
            .collect();
        (force, response)
    }

    fn session() -> MeasurementSession {
        MeasurementSession::new("Violin #7", "J. Doe", "2024-05-01", 48000).unwrap()
    }

    #[test]
    fn test_rejects_zero_sample_rate() {
        assert!(matches!(
            MeasurementSession::new("x", "y", "z", 0),
            Err(ModalError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_get_or_create_keeps_coordinates() {
        let mut session = session();
        session.get_or_create_point("bridge", Some(Coordinates::new(1.0, 2.0, 3.0)));
        let point = session.get_or_create_point("bridge", Some(Coordinates::new(9.0, 9.0, 9.0)));

        assert_eq!(point.coordinates(), Coordinates::new(1.0, 2.0, 3.0));
        assert_eq!(session.points().len(), 1);
    }

    #[test]
    fn test_record_hit_creates_point() {
        let mut session = session();
        let (force, response) = impact(128, 1.0);

        assert_eq!(session.record_hit("top", force.clone(), response.clone()).unwrap(), 1);
        assert_eq!(session.record_hit("top", force, response).unwrap(), 2);
        assert_eq!(session.point("top").unwrap().hits().len(), 2);
        assert_eq!(session.point("top").unwrap().coordinates(), Coordinates::default());
    }

    #[test]
    fn test_record_hit_rejects_bad_arrays() {
        let mut session = session();
        let result = session.record_hit("top", vec![0.0; 10], vec![0.0; 9]);

        assert!(matches!(result, Err(ModalError::InvalidInput(_))));
        // No phantom point is left behind
        assert!(session.point("top").is_err());
    }

    #[test]
    fn test_add_samples_rejects_foreign_rate() {
        let mut session = session();
        let (force, response) = impact(32, 1.0);
        let samples = HitSamples::new(force, response, 44100).unwrap();

        assert!(matches!(
            session.add_samples("top", samples),
            Err(ModalError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_unknown_point_is_not_found() {
        let mut session = session();
        assert!(matches!(session.compute_point("nope"), Err(ModalError::NotFound(_))));
        assert!(matches!(
            session.set_hit_validity("nope", 1, false),
            Err(ModalError::NotFound(_))
        ));
        assert!(session.point("nope").is_err());
        assert!(session.points().is_empty());
    }

    #[test]
    fn test_all_results_skips_empty_points() {
        let mut session = session();
        let (force, response) = impact(128, 1.0);
        session.record_hit("a", force.clone(), response.clone()).unwrap();
        session.record_hit("b", force, response).unwrap();
        session.get_or_create_point("c", None);
        session.set_hit_validity("b", 1, false).unwrap();

        let results = session.all_results().unwrap();

        assert_eq!(results.len(), 1);
        assert!(results.contains_key("a"));
    }

    #[test]
    fn test_all_results_reuses_cache() {
        let mut session = session();
        let (force, response) = impact(64, 1.0);
        session.record_hit("a", force, response).unwrap();

        let direct = session.compute_point("a").unwrap();
        let results = session.all_results().unwrap();
        assert!(Arc::ptr_eq(&direct, &results["a"]));
    }

    #[test]
    fn test_all_results_propagates_invalid_input() {
        let mut session = session();
        let (f1, r1) = impact(64, 1.0);
        let (f2, r2) = impact(32, 1.0);
        session.record_hit("a", f1, r1).unwrap();
        session.record_hit("a", f2, r2).unwrap();

        assert!(matches!(session.all_results(), Err(ModalError::InvalidInput(_))));
    }

    #[test]
    fn test_set_estimator_invalidates_points() {
        let mut session = session();
        let (force, response) = impact(64, 1.0);
        session.record_hit("a", force, response).unwrap();
        session.compute_point("a").unwrap();
        assert_eq!(session.point("a").unwrap().state(), PointState::Fresh);

        session
            .set_estimator(EstimatorConfig {
                response_window: crate::spectrum::WindowType::Exponential { end_value: 0.1 },
                ..EstimatorConfig::default()
            })
            .unwrap();
        assert_eq!(session.point("a").unwrap().state(), PointState::Dirty);
    }

    #[test]
    fn test_remove_point_and_order() {
        let mut session = session();
        for name in ["nut", "bridge", "tail"] {
            session.get_or_create_point(name, None);
        }
        assert_eq!(session.point_names(), vec!["nut", "bridge", "tail"]);

        let removed = session.remove_point("bridge").unwrap();
        assert_eq!(removed.name(), "bridge");
        assert_eq!(session.point_names(), vec!["nut", "tail"]);
        assert!(matches!(session.remove_point("bridge"), Err(ModalError::NotFound(_))));
    }

    #[test]
    fn test_serde_roundtrip_drops_cache() {
        let mut session = session();
        let (force, response) = impact(64, 1.0);
        session.record_hit("a", force, response).unwrap();
        session.set_hit_validity("a", 1, false).unwrap();
        session.record_hit("a", vec![0.5; 64], vec![0.1; 64]).unwrap();
        session.compute_point("a").unwrap();

        let json = serde_json::to_string(&session).unwrap();
        let restored: MeasurementSession = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.subject_name(), "Violin #7");
        let point = restored.point("a").unwrap();
        assert_eq!(point.hits().len(), 2);
        assert!(!point.hit(1).unwrap().is_valid());
        assert_eq!(point.state(), PointState::Dirty);
    }

    fn saved_session() -> serde_json::Value {
        let mut session = session();
        let (force, response) = impact(32, 1.0);
        session.record_hit("a", force.clone(), response.clone()).unwrap();
        session.record_hit("a", force, response).unwrap();
        serde_json::to_value(&session).unwrap()
    }

    #[test]
    fn test_load_rejects_duplicate_point_names() {
        let mut value = saved_session();
        let points = value["points"].as_array_mut().unwrap();
        let copy = points[0].clone();
        points.push(copy);

        let result = serde_json::from_value::<MeasurementSession>(value);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_rejects_zero_sample_rate() {
        let mut value = saved_session();
        value["sample_rate"] = serde_json::json!(0);

        assert!(serde_json::from_value::<MeasurementSession>(value).is_err());
    }

    #[test]
    fn test_load_rejects_foreign_hit_rate() {
        let mut value = saved_session();
        value["points"][0]["hits"][1]["sample_rate"] = serde_json::json!(44100);

        assert!(serde_json::from_value::<MeasurementSession>(value).is_err());
    }

    #[test]
    fn test_load_rejects_unequal_hit_arrays() {
        let mut value = saved_session();
        value["points"][0]["hits"][0]["response"] = serde_json::json!([0.1]);

        assert!(serde_json::from_value::<MeasurementSession>(value).is_err());
    }

    #[test]
    fn test_recording_after_load_with_id_gap() {
        let mut value = saved_session();
        value["points"][0]["hits"].as_array_mut().unwrap().remove(0);

        let mut session: MeasurementSession = serde_json::from_value(value).unwrap();
        let (force, response) = impact(32, 1.0);
        let id = session.record_hit("a", force, response).unwrap();

        assert_eq!(id, 3);
        let ids: Vec<HitId> = session.point("a").unwrap().hits().iter().map(|h| h.id()).collect();
        assert_eq!(ids, vec![2, 3]);
    }
}
