//! Queue carrying completed hits from a capture worker
//!
//! A worker only ever sends whole hits. A capture that failed simply sends
//! nothing.

use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, warn};

use super::handle::SessionHandle;
use crate::error::{ModalError, Result};
use crate::measurement::{HitId, HitSamples};

/// One completed strike addressed to a point
#[derive(Debug, Clone)]
pub struct CapturedHit {
    pub point_name: String,
    pub samples: HitSamples,
}

/// Sending end, owned by the capture worker
#[derive(Debug, Clone)]
pub struct HitSender {
    tx: Sender<CapturedHit>,
}

/// Receiving end, drained on the side that owns the session
#[derive(Debug)]
pub struct HitReceiver {
    rx: Receiver<CapturedHit>,
}

pub fn delivery_channel() -> (HitSender, HitReceiver) {
    let (tx, rx) = mpsc::channel();
    (HitSender { tx }, HitReceiver { rx })
}

impl HitSender {
    /// Hand a completed hit over. Returns false if the receiver is gone.
    pub fn send(&self, point_name: impl Into<String>, samples: HitSamples) -> bool {
        self.tx
            .send(CapturedHit {
                point_name: point_name.into(),
                samples,
            })
            .is_ok()
    }
}

impl HitReceiver {
    /// Record every pending hit into the session
    ///
    /// Hits the session refuses (e.g. a foreign sample rate) are logged and
    /// skipped; a poisoned session lock stops the drain. Returns the number
    /// of hits recorded.
    pub fn drain_into(&self, handle: &SessionHandle) -> Result<usize> {
        let mut recorded = 0;

        for hit in self.rx.try_iter() {
            match handle.add_samples(&hit.point_name, hit.samples) {
                Ok(id) => {
                    debug!(point = %hit.point_name, hit = id, "delivered hit recorded");
                    recorded += 1;
                }
                Err(ModalError::LockPoisoned) => return Err(ModalError::LockPoisoned),
                Err(err) => warn!(point = %hit.point_name, error = %err, "delivered hit rejected"),
            }
        }

        Ok(recorded)
    }

    /// Block until one hit arrives and record it
    ///
    /// Returns `Ok(None)` once every sender has been dropped.
    pub fn recv_into(&self, handle: &SessionHandle) -> Result<Option<HitId>> {
        match self.rx.recv() {
            Ok(hit) => handle.add_samples(&hit.point_name, hit.samples).map(Some),
            Err(_) => Ok(None),
        }
    }
}
