//! Composition root for the two touchscreen procedures.

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::Channel;

use crate::calibration::{
    CalibrationPhase, CalibrationResult, CalibrationSession, CalibrationStatus, CalibrationView,
};
use crate::config::{CalibrationConfig, LevelingConfig, UI_EVENT_QUEUE_DEPTH};
use crate::error::{CalibrationError, LevelingError, UiError};
use crate::host::{CalibrationHost, LevelingHost, Navigation, TouchInput};
use crate::leveling::{LevelingPhase, LevelingSession, LevelingView};
use crate::navigation::ScreenStack;
use crate::types::ScreenId;

/// Everything the shell needs to drive both screens from one button handler.
pub trait UiHost: LevelingHost + CalibrationHost {}

impl<T: LevelingHost + CalibrationHost> UiHost for T {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiButton {
    Return,
    Stop,
    /// Calibration crosshair 0..=3.
    Point(u8),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonAction {
    Pressed,
    Released,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiEvent {
    LevelingPhaseChanged {
        from: LevelingPhase,
        to: LevelingPhase,
    },
    CalibrationProgress(CalibrationPhase),
    CalibrationSucceeded(CalibrationResult),
    Error(UiError),
}

pub type UiEvents = Channel<NoopRawMutex, UiEvent, UI_EVENT_QUEUE_DEPTH>;

pub struct TouchUi {
    leveling: LevelingSession,
    calibration: CalibrationSession,
    screens: ScreenStack,
    events: UiEvents,
}

impl Default for TouchUi {
    fn default() -> Self {
        Self::new(LevelingConfig::default_const(), CalibrationConfig::default_const())
    }
}

impl TouchUi {
    pub fn new(leveling: LevelingConfig, calibration: CalibrationConfig) -> Self {
        Self {
            leveling: LevelingSession::new(leveling),
            calibration: CalibrationSession::new(calibration),
            screens: ScreenStack::new(ScreenId::Main),
            events: Channel::new(),
        }
    }

    pub fn screens(&self) -> &ScreenStack {
        &self.screens
    }

    pub fn current_screen(&self) -> Option<ScreenId> {
        self.screens.current()
    }

    pub fn leveling_view(&self) -> LevelingView {
        self.leveling.view()
    }

    pub fn calibration_view(&self) -> CalibrationView {
        self.calibration.view()
    }

    pub fn next_event(&self) -> Option<UiEvent> {
        self.events.try_receive().ok()
    }

    pub fn start_leveling<H: LevelingHost>(&mut self, host: &mut H) -> Result<LevelingPhase, UiError> {
        let before = self.leveling.phase();
        let outcome = self.leveling.start(host, &mut self.screens);
        self.report_leveling(before, outcome)
    }

    pub fn tick_leveling<H: LevelingHost>(&mut self, host: &mut H) -> Result<LevelingPhase, UiError> {
        let before = self.leveling.phase();
        let outcome = self.leveling.tick(host, &mut self.screens);
        self.report_leveling(before, outcome)
    }

    pub fn stop_leveling<H: LevelingHost>(&mut self, host: &mut H) -> Result<LevelingPhase, UiError> {
        let before = self.leveling.phase();
        let outcome = self.leveling.stop(host, &mut self.screens);
        self.report_leveling(before, outcome)
    }

    pub fn exit_leveling<H: LevelingHost>(&mut self, host: &mut H) -> Result<LevelingPhase, UiError> {
        let before = self.leveling.phase();
        let outcome = self.leveling.exit(host, &mut self.screens);
        self.report_leveling(before, outcome)
    }

    pub fn start_calibration(&mut self) {
        self.calibration.start(&mut self.screens);
        self.publish(UiEvent::CalibrationProgress(self.calibration.view().phase));
    }

    pub fn press_calibration_point<T: TouchInput>(&mut self, touch: &mut T) {
        self.calibration.press(touch);
    }

    /// Records the release and runs the screen refresh that follows it.
    pub fn submit_calibration_point<H: CalibrationHost>(
        &mut self,
        corner: u8,
        host: &mut H,
    ) -> Result<CalibrationStatus, UiError> {
        let status = match self.calibration.submit(corner, host) {
            Ok(status) => status,
            Err(err) => return Err(self.report_error(err.into())),
        };
        match status {
            CalibrationStatus::Success(result) => {
                self.publish(UiEvent::CalibrationSucceeded(result))
            }
            CalibrationStatus::Fail => {
                self.publish(UiEvent::Error(CalibrationError::PrecisionFailure.into()))
            }
            CalibrationStatus::Recorded { next } => {
                self.publish(UiEvent::CalibrationProgress(next))
            }
            _ => {}
        }
        self.calibration.refresh(&mut self.screens);
        Ok(status)
    }

    pub fn get_calibration_result(&self) -> CalibrationResult {
        self.calibration.result()
    }

    /// Button dispatch; disabled buttons are ignored.
    pub fn handle_button<H: UiHost>(
        &mut self,
        button: UiButton,
        action: ButtonAction,
        host: &mut H,
    ) -> Result<(), UiError> {
        match (button, action) {
            (UiButton::Point(_), ButtonAction::Pressed) => {
                if self.calibration.view().crosshair.is_some() {
                    self.press_calibration_point(host);
                }
            }
            (UiButton::Point(corner), ButtonAction::Released) => {
                if self.calibration.view().crosshair.is_some() {
                    self.submit_calibration_point(corner, host)?;
                }
            }
            (UiButton::Return, ButtonAction::Released) => {
                if self.leveling.view().return_enabled {
                    self.exit_leveling(host)?;
                } else {
                    log::debug!("ui: return disabled");
                }
            }
            (UiButton::Stop, ButtonAction::Released) => {
                if self.leveling.view().stop_enabled {
                    self.stop_leveling(host)?;
                } else {
                    log::debug!("ui: stop disabled");
                }
            }
            (UiButton::Return | UiButton::Stop, ButtonAction::Pressed) => {}
        }
        Ok(())
    }

    fn report_leveling(
        &self,
        before: LevelingPhase,
        outcome: Result<LevelingPhase, LevelingError>,
    ) -> Result<LevelingPhase, UiError> {
        let after = self.leveling.phase();
        if after != before {
            self.publish(UiEvent::LevelingPhaseChanged {
                from: before,
                to: after,
            });
        }
        outcome.map_err(|err| self.report_error(err.into()))
    }

    fn report_error(&self, err: UiError) -> UiError {
        log::warn!("ui: {}", err);
        self.publish(UiEvent::Error(err));
        err
    }

    fn publish(&self, event: UiEvent) {
        if self.events.try_send(event).is_err() {
            log::warn!("ui: event queue full, dropped {:?}", event);
        }
    }
}
