use statig::blocking::IntoStateMachineExt as _;

use crate::config::CalibrationConfig;
use crate::types::RawPoint;

use super::machine::{
    CalibrationCommand, CalibrationMachine, CalibrationPhase, CalibrationStatus, DispatchContext,
};
use super::types::{CalibrationResult, CalibrationSample, Corner};

/// Four-point touch calibration, free of any UI or driver concerns.
pub struct CalibrationEngine {
    machine: statig::blocking::StateMachine<CalibrationMachine>,
}

impl Default for CalibrationEngine {
    fn default() -> Self {
        Self::new(CalibrationConfig::default_const())
    }
}

impl CalibrationEngine {
    pub fn new(config: CalibrationConfig) -> Self {
        Self {
            machine: CalibrationMachine::new(config).state_machine(),
        }
    }

    pub fn phase(&self) -> CalibrationPhase {
        self.machine.inner().phase
    }

    /// Last successful fit, or the configured fallback.
    pub fn current(&self) -> CalibrationResult {
        self.machine.inner().current
    }

    pub fn samples(&self) -> &[CalibrationSample; 4] {
        &self.machine.inner().samples
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.machine.inner().config
    }

    pub fn start(&mut self) -> CalibrationStatus {
        self.apply(CalibrationCommand::Start)
    }

    pub fn touch(&mut self, corner: Corner, raw: RawPoint) -> CalibrationStatus {
        self.apply(CalibrationCommand::Touch { corner, raw })
    }

    pub fn end(&mut self) -> CalibrationStatus {
        self.apply(CalibrationCommand::End)
    }

    fn apply(&mut self, command: CalibrationCommand) -> CalibrationStatus {
        let mut context = DispatchContext::default();
        self.machine.handle_with_context(&command, &mut context);
        context.status
    }
}
