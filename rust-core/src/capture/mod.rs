//! Boundary with the capture side
//!
//! Device I/O lives outside this crate. What arrives here is a completed
//! recording per hit, either as an interleaved multi-channel buffer or as
//! ready-made [`HitSamples`], delivered from a capture worker thread.

pub mod delivery;
pub mod frames;
pub mod handle;

pub use delivery::{delivery_channel, CapturedHit, HitReceiver, HitSender};
pub use frames::deinterleave;
pub use handle::SessionHandle;
