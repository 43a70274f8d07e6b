//! A single hammer strike

use serde::{Deserialize, Serialize};

use crate::error::{ModalError, Result};

/// 1-based hit number, assigned in insertion order within a point
pub type HitId = u32;

/// Peak force above which the hammer channel is considered clipped
pub const DEFAULT_OVERLOAD_LIMIT: f64 = 0.95;

/// Validated raw data of one strike, as delivered by the capture side
///
/// Construction enforces equal, non-empty lengths and a positive sample rate,
/// so everything downstream can trust the arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct HitSamples {
    force: Vec<f64>,
    response: Vec<f64>,
    sample_rate: u32,
}

impl HitSamples {
    pub fn new(force: Vec<f64>, response: Vec<f64>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(ModalError::invalid("sample rate must be positive"));
        }
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

        Ok(Self {
            force,
            response,
            sample_rate,
        })
    }

    pub fn len(&self) -> usize {
        self.force.len()
    }

    pub fn is_empty(&self) -> bool {
        self.force.is_empty()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn force(&self) -> &[f64] {
        &self.force
    }

    pub fn response(&self) -> &[f64] {
        &self.response
    }
}

/// One captured strike. Only `is_valid` changes after capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredHit")]
pub struct Hit {
    id: HitId,
    force: Vec<f64>,
    response: Vec<f64>,
    sample_rate: u32,
    is_valid: bool,
}

/// Hit as written to disk, checked before it becomes a [`Hit`]
#[derive(Deserialize)]
struct StoredHit {
    id: HitId,
    force: Vec<f64>,
    response: Vec<f64>,
    sample_rate: u32,
    is_valid: bool,
}

impl TryFrom<StoredHit> for Hit {
    type Error = ModalError;

    fn try_from(stored: StoredHit) -> Result<Self> {
        if stored.id == 0 {
            return Err(ModalError::invalid("hit ids start at 1"));
        }

        let samples = HitSamples::new(stored.force, stored.response, stored.sample_rate)
            .map_err(|e| ModalError::invalid(format!("hit {}: {}", stored.id, e)))?;

        let mut hit = Hit::new(stored.id, samples);
        hit.is_valid = stored.is_valid;
        Ok(hit)
    }
}

impl Hit {
    pub(crate) fn new(id: HitId, samples: HitSamples) -> Self {
        Self {
            id,
            force: samples.force,
            response: samples.response,
            sample_rate: samples.sample_rate,
            is_valid: true,
        }
    }

    pub fn id(&self) -> HitId {
        self.id
    }

    pub fn force(&self) -> &[f64] {
        &self.force
    }

    pub fn response(&self) -> &[f64] {
        &self.response
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.force.len()
    }

    pub fn is_empty(&self) -> bool {
        self.force.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Returns true if the flag changed
    pub(crate) fn set_valid(&mut self, is_valid: bool) -> bool {
        let changed = self.is_valid != is_valid;
        self.is_valid = is_valid;
        changed
    }

    /// Record length in seconds, from the hit's own sample rate
    pub fn duration(&self) -> f64 {
        self.force.len() as f64 / self.sample_rate as f64
    }

    /// Largest absolute force sample
    pub fn peak_force(&self) -> f64 {
        self.force.iter().fold(0.0_f64, |peak, &f| peak.max(f.abs()))
    }

    /// True if the hammer channel clipped (peak above `limit` of full scale)
    ///
    /// This is advisory: an overloaded hit stays valid until the user rejects it.
    pub fn is_overloaded(&self, limit: f64) -> bool {
        self.peak_force() > limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit_with_force(force: Vec<f64>) -> Hit {
        let response = vec![0.0; force.len()];
        Hit::new(1, HitSamples::new(force, response, 48000).unwrap())
    }

    #[test]
    fn test_overload_detection() {
        let mut force = vec![0.1; 256];
        force[40] = -0.97;
        assert!(hit_with_force(force).is_overloaded(DEFAULT_OVERLOAD_LIMIT));

        let mut force = vec![0.0; 256];
        force[3] = 0.5;
        assert!(!hit_with_force(force).is_overloaded(DEFAULT_OVERLOAD_LIMIT));
    }

    #[test]
    fn test_duration_uses_own_rate() {
        let hit = hit_with_force(vec![0.0; 24000]);
        assert!((hit.duration() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_new_hit_is_valid() {
        let mut hit = hit_with_force(vec![0.2; 8]);
        assert!(hit.is_valid());
        assert!(!hit.set_valid(true));
        assert!(hit.set_valid(false));
        assert!(!hit.is_valid());
    }

    #[test]
    fn test_load_rejects_broken_hits() {
        let unequal =
            r#"{"id":1,"force":[0.1,0.2],"response":[0.1],"sample_rate":48000,"is_valid":true}"#;
        assert!(serde_json::from_str::<Hit>(unequal).is_err());

        let zero_rate =
            r#"{"id":1,"force":[0.1],"response":[0.1],"sample_rate":0,"is_valid":true}"#;
        assert!(serde_json::from_str::<Hit>(zero_rate).is_err());

        let empty = r#"{"id":1,"force":[],"response":[],"sample_rate":48000,"is_valid":true}"#;
        assert!(serde_json::from_str::<Hit>(empty).is_err());

        let zero_id =
            r#"{"id":0,"force":[0.1],"response":[0.1],"sample_rate":48000,"is_valid":true}"#;
        assert!(serde_json::from_str::<Hit>(zero_id).is_err());
    }

    #[test]
    fn test_load_keeps_validity_flag() {
        let json = r#"{"id": 3, "force": [0.5, 0.0], "response": [0.1, 0.2],
                       "sample_rate": 8000, "is_valid": false}"#;
        let hit: Hit = serde_json::from_str(json).unwrap();

        assert_eq!(hit.id(), 3);
        assert!(!hit.is_valid());
        assert_eq!(hit.sample_rate(), 8000);
    }

    #[test]
    fn test_samples_validation() {
        assert!(matches!(
            HitSamples::new(vec![0.0; 4], vec![0.0; 5], 48000),
            Err(ModalError::InvalidInput(_))
        ));
        assert!(HitSamples::new(vec![], vec![], 48000).is_err());
        assert!(HitSamples::new(vec![0.0; 4], vec![0.0; 4], 0).is_err());

        let samples = HitSamples::new(vec![0.0; 4], vec![1.0; 4], 44100).unwrap();
        assert_eq!(samples.len(), 4);
        assert_eq!(samples.sample_rate(), 44100);
    }
}
