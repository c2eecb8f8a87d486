#![no_std]

//! Touch-calibration and auto-leveling logic for a printer touchscreen.
//!
//! Both engines are driven from the UI refresh loop: events in, host
//! commands out. Rendering, the motion planner and the heaters stay behind
//! the traits in [`host`].

#[cfg(test)]
extern crate std;

pub mod calibration;
pub mod config;
pub mod error;
pub mod host;
pub mod leveling;
pub mod navigation;
pub mod telemetry;
pub mod types;
pub mod ui;

pub use calibration::{CalibrationEngine, CalibrationResult, CalibrationSession, Orientation};
pub use error::UiError;
pub use leveling::{LevelingPhase, LevelingSequencer, LevelingSession};
pub use ui::{ButtonAction, TouchUi, UiButton, UiEvent};
