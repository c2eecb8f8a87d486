use crate::config::CalibrationConfig;
use crate::error::CalibrationError;
use crate::host::{CalibrationHost, Navigation, SettingsStore, TouchInput};
use crate::telemetry;
use crate::types::{RawPoint, ScreenId};

use super::engine::CalibrationEngine;
use super::machine::{CalibrationPhase, CalibrationStatus};
use super::types::{CalibrationResult, Corner};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalibrationPrompt {
    Point1,
    Point2,
    Point3,
    Point4,
}

/// What the calibration screen shows after the latest refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalibrationView {
    pub phase: CalibrationPhase,
    pub crosshair: Option<Corner>,
    pub prompt: Option<CalibrationPrompt>,
    pub failure_visible: bool,
}

/// Owns the calibration screen and the live touch calibration.
pub struct CalibrationSession {
    engine: CalibrationEngine,
    pending_raw: RawPoint,
    failure_visible: bool,
}

impl Default for CalibrationSession {
    fn default() -> Self {
        Self::new(CalibrationConfig::default_const())
    }
}

impl CalibrationSession {
    pub fn new(config: CalibrationConfig) -> Self {
        Self {
            engine: CalibrationEngine::new(config),
            pending_raw: RawPoint::default(),
            failure_visible: false,
        }
    }

    pub fn engine(&self) -> &CalibrationEngine {
        &self.engine
    }

    pub fn result(&self) -> CalibrationResult {
        self.engine.current()
    }

    pub fn start<N: Navigation>(&mut self, nav: &mut N) {
        if nav.current() != Some(ScreenId::TouchCalibration) {
            nav.enter(ScreenId::TouchCalibration);
        }
        self.pending_raw = RawPoint::default();
        self.failure_visible = false;
        let _ = self.engine.start();
        telemetry::record_calibration_start();
        log::info!("calibration: start");
    }

    /// Samples the controller while the crosshair is held down.
    pub fn press<T: TouchInput>(&mut self, touch: &mut T) {
        self.pending_raw = touch.read_raw_point().unwrap_or_default();
    }

    /// Records the crosshair release for `corner_index`.
    pub fn submit<H: CalibrationHost>(
        &mut self,
        corner_index: u8,
        host: &mut H,
    ) -> Result<CalibrationStatus, CalibrationError> {
        let corner =
            Corner::from_index(corner_index).ok_or(CalibrationError::InvalidCorner(corner_index))?;
        if self.engine.phase().awaiting_slot().is_none() {
            return Err(CalibrationError::NotActive);
        }

        let raw = core::mem::take(&mut self.pending_raw);
        let status = self.engine.touch(corner, raw);
        log::debug!(
            "calibration: point corner={} raw=({}, {})",
            corner.index(),
            raw.x,
            raw.y
        );

        match status {
            CalibrationStatus::Success(result) => {
                telemetry::record_calibration_result(true);
                log_result(&result);
                host.apply_calibration(&result);
                save_best_effort(host);
            }
            CalibrationStatus::Fail => {
                telemetry::record_calibration_result(false);
                log::warn!("calibration: touch calibration fail");
                host.apply_calibration(&self.engine.current());
            }
            _ => {}
        }
        Ok(status)
    }

    /// Screen follow-up after a touch: retry after failure, close after
    /// success.
    pub fn refresh<N: Navigation>(&mut self, nav: &mut N) {
        match self.engine.phase() {
            CalibrationPhase::Fail => {
                self.failure_visible = true;
                let _ = self.engine.start();
            }
            CalibrationPhase::AwaitingPoint2 => self.failure_visible = false,
            CalibrationPhase::Success => {
                nav.leave();
                let _ = self.engine.end();
            }
            _ => {}
        }
    }

    pub fn view(&self) -> CalibrationView {
        let phase = self.engine.phase();
        let slot = phase.awaiting_slot();
        CalibrationView {
            phase,
            crosshair: slot.and_then(|slot| Corner::from_index(slot as u8)),
            prompt: slot.map(|slot| match slot {
                0 => CalibrationPrompt::Point1,
                1 => CalibrationPrompt::Point2,
                2 => CalibrationPrompt::Point3,
                _ => CalibrationPrompt::Point4,
            }),
            failure_visible: self.failure_visible,
        }
    }
}

fn log_result(result: &CalibrationResult) {
    log::info!("calibration: touch screen calibration completed");
    log::info!("TOUCH_CALIBRATION_X {}", result.scale_x.to_bits());
    log::info!("TOUCH_CALIBRATION_Y {}", result.scale_y.to_bits());
    log::info!("TOUCH_OFFSET_X {}", result.offset_x);
    log::info!("TOUCH_OFFSET_Y {}", result.offset_y);
    log::info!("TOUCH_ORIENTATION {}", result.orientation.as_str());
}

fn save_best_effort<S: SettingsStore>(store: &mut S) {
    if let Err(err) = store.save() {
        telemetry::record_settings_save_failure();
        log::warn!("calibration: settings save failed err={}", err);
    }
}
