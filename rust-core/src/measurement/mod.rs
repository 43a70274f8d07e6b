//! Hit / point / session data model

pub mod hit;
pub mod point;
pub mod session;

pub use hit::{Hit, HitId, HitSamples, DEFAULT_OVERLOAD_LIMIT};
pub use point::{Coordinates, PointMeasurement, PointState};
pub use session::MeasurementSession;
