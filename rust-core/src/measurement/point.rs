//! One physical measurement point and its memoized FRF
//!
//! The cache is an explicit field. Every mutation that can change the set of
//! valid hits clears it in the same `&mut self` call, so a reader sees either
//! the old result or no result, never a half-updated one.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::hit::{Hit, HitId, HitSamples};
use crate::config::EstimatorConfig;
use crate::error::{ModalError, Result};
use crate::spectrum::{estimate, FrfEstimate};

/// Position of the point on the structure (x, y, z)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Coordinates {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Cache state of a point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointState {
    /// No valid hits
    Empty,
    /// Valid hits present, no current result
    Dirty,
    /// Cached result matches the current valid hits
    Fresh,
}

#[derive(Debug, Clone)]
struct CachedFrf {
    sample_rate: u32,
    config: EstimatorConfig,
    estimate: Arc<FrfEstimate>,
}

/// All hits recorded at one point
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "StoredPoint")]
pub struct PointMeasurement {
    name: String,
    coordinates: Coordinates,
    hits: Vec<Hit>,

    #[serde(skip)]
    cache: Option<CachedFrf>,
}

/// Point as written to disk, checked before it becomes a [`PointMeasurement`]
#[derive(Deserialize)]
struct StoredPoint {
    name: String,
    coordinates: Coordinates,
    hits: Vec<Hit>,
}

impl TryFrom<StoredPoint> for PointMeasurement {
    type Error = ModalError;

    fn try_from(stored: StoredPoint) -> Result<Self> {
        let mut ids: Vec<HitId> = stored.hits.iter().map(Hit::id).collect();
        ids.sort_unstable();
        if let Some(pair) = ids.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(ModalError::invalid(format!(
                "point '{}' holds hit {} more than once",
                stored.name, pair[0]
            )));
        }

        Ok(Self {
            name: stored.name,
            coordinates: stored.coordinates,
            hits: stored.hits,
            cache: None,
        })
    }
}

impl PointMeasurement {
    pub fn new(name: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            name: name.into(),
            coordinates,
            hits: Vec::new(),
            cache: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    pub fn hit(&self, hit_id: HitId) -> Result<&Hit> {
        self.hits
            .iter()
            .find(|h| h.id() == hit_id)
            .ok_or_else(|| missing_hit(&self.name, hit_id))
    }

    pub fn valid_hits(&self) -> impl Iterator<Item = &Hit> {
        self.hits.iter().filter(|h| h.is_valid())
    }

    pub fn valid_hit_count(&self) -> usize {
        self.valid_hits().count()
    }

    pub fn state(&self) -> PointState {
        if self.valid_hit_count() == 0 {
            PointState::Empty
        } else if self.cache.is_some() {
            PointState::Fresh
        } else {
            PointState::Dirty
        }
    }

    /// Append a hit and return its id (one past the highest id in use)
    pub fn add_hit(&mut self, samples: HitSamples) -> HitId {
        let id = self.hits.iter().map(Hit::id).max().unwrap_or(0) + 1;
        self.hits.push(Hit::new(id, samples));
        self.invalidate_cache();

        debug!(point = %self.name, hit = id, "hit added");
        id
    }

    /// Accept or reject a hit
    ///
    /// Returns whether the flag changed. The cache is only cleared on an
    /// actual change.
    pub fn set_hit_validity(&mut self, hit_id: HitId, is_valid: bool) -> Result<bool> {
        let name = &self.name;
        let hit = self
            .hits
            .iter_mut()
            .find(|h| h.id() == hit_id)
            .ok_or_else(|| missing_hit(name, hit_id))?;

        let changed = hit.set_valid(is_valid);
        if changed {
            self.invalidate_cache();
            debug!(point = %self.name, hit = hit_id, is_valid, "hit validity changed");
        }
        Ok(changed)
    }

    /// Drop every hit; numbering restarts at 1
    pub fn clear_hits(&mut self) {
        self.hits.clear();
        self.invalidate_cache();
    }

    /// Forget the memoized result. Idempotent.
    pub fn invalidate_cache(&mut self) {
        self.cache = None;
    }

    /// H1 estimate over valid hits with the default windows
    pub fn compute_frf(&mut self, sample_rate: u32) -> Result<Arc<FrfEstimate>> {
        self.compute_frf_with(sample_rate, &EstimatorConfig::default())
    }

    /// H1 estimate over valid hits
    ///
    /// Returns the cached result when it was computed for the same rate and
    /// configuration; otherwise recomputes and replaces the cache. On error the
    /// previous cache is left as it was.
    pub fn compute_frf_with(
        &mut self,
        sample_rate: u32,
        config: &EstimatorConfig,
    ) -> Result<Arc<FrfEstimate>> {
        if let Some(cached) = &self.cache {
            if cached.sample_rate == sample_rate && cached.config == *config {
                debug!(point = %self.name, "FRF cache hit");
                return Ok(Arc::clone(&cached.estimate));
            }
        }

        let valid: Vec<&Hit> = self.valid_hits().collect();
        if valid.is_empty() {
            return Err(ModalError::EmptyInput(format!("point '{}'", self.name)));
        }

        if let Some(hit) = valid.iter().find(|h| h.sample_rate() != sample_rate) {
            return Err(ModalError::invalid(format!(
                "hit {} of point '{}' was recorded at {} Hz, not {} Hz",
                hit.id(),
                self.name,
                hit.sample_rate(),
                sample_rate
            )));
        }

        let pairs: Vec<(&[f64], &[f64])> =
            valid.iter().map(|h| (h.force(), h.response())).collect();

        debug!(point = %self.name, hits = pairs.len(), "recomputing FRF");
        let result = Arc::new(estimate(&pairs, sample_rate, config)?);

        self.cache = Some(CachedFrf {
            sample_rate,
            config: *config,
            estimate: Arc::clone(&result),
        });

        Ok(result)
    }

}

fn missing_hit(point_name: &str, hit_id: HitId) -> ModalError {
    ModalError::not_found(format!("hit {} in point '{}'", hit_id, point_name))
}
