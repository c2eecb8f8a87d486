//! Four-point touch calibration.
//!
//! The operator releases four crosshairs in turn. The raw readings are fitted
//! to a per-axis Q17 scale and offset, trying a landscape mounting first and
//! a portrait one second. A run that fits neither falls back to the factory
//! constants.

mod engine;
mod machine;
mod session;
mod solve;
mod types;

pub use engine::CalibrationEngine;
pub use machine::{CalibrationPhase, CalibrationStatus};
pub use session::{CalibrationPrompt, CalibrationSession, CalibrationView};
pub use solve::{solve, validate_precision};
pub use types::{CalibrationResult, CalibrationSample, Corner, Orientation, Q17, Q17_SHIFT};
