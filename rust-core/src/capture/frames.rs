//! Splitting an interleaved recording into force and response channels

use crate::config::CaptureConfig;
use crate::error::{ModalError, Result};
use crate::measurement::HitSamples;

/// Split an interleaved `frames × channels` buffer into one hit
///
/// The buffer must hold a whole number of frames. Samples are widened to
/// `f64`; no resampling, trimming or padding takes place.
pub fn deinterleave(interleaved: &[f32], config: &CaptureConfig) -> Result<HitSamples> {
    config.validate()?;

    if interleaved.len() % config.channels != 0 {
        return Err(ModalError::invalid(format!(
            "buffer of {} samples is not a whole number of {}-channel frames",
            interleaved.len(),
            config.channels
        )));
    }

    let (force, response): (Vec<f64>, Vec<f64>) = interleaved
        .chunks_exact(config.channels)
        .map(|frame| {
            (
                frame[config.force_channel] as f64,
                frame[config.response_channel] as f64,
            )
        })
        .unzip();

    HitSamples::new(force, response, config.sample_rate)
}
