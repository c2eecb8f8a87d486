use statig::blocking::IntoStateMachineExt as _;

use crate::config::LevelingConfig;

use super::actions::{LevelingActions, LevelingApplyStatus};
use super::events::{LevelingCommand, TickInput};
use super::machine::{DispatchContext, LevelingMachine};
use super::types::{LevelingBackups, LevelingPhase, LevelingView};

#[derive(Clone, Debug)]
pub struct LevelingApplyResult {
    pub before: LevelingPhase,
    pub after: LevelingPhase,
    pub status: LevelingApplyStatus,
    pub actions: LevelingActions,
}

impl LevelingApplyResult {
    pub fn changed(&self) -> bool {
        matches!(self.status, LevelingApplyStatus::Applied)
    }

    pub fn phase_changed(&self) -> bool {
        self.before != self.after
    }
}

/// Tick-driven auto-leveling sequence. Pure: every side effect comes back
/// as a [`LevelingAction`](super::LevelingAction) for the caller to run.
pub struct LevelingSequencer {
    machine: statig::blocking::StateMachine<LevelingMachine>,
}

impl Default for LevelingSequencer {
    fn default() -> Self {
        Self::new(LevelingConfig::default_const())
    }
}

impl LevelingSequencer {
    pub fn new(config: LevelingConfig) -> Self {
        Self {
            machine: LevelingMachine::new(config).state_machine(),
        }
    }

    pub fn phase(&self) -> LevelingPhase {
        self.machine.inner().phase
    }

    pub fn config(&self) -> &LevelingConfig {
        &self.machine.inner().config
    }

    pub fn backups(&self) -> LevelingBackups {
        self.machine.inner().backups
    }

    pub fn force_stop(&self) -> bool {
        self.machine.inner().force_stop
    }

    pub fn aborted_early(&self) -> bool {
        self.machine.inner().aborted_early
    }

    pub fn done(&self) -> bool {
        self.machine.inner().done
    }

    pub fn view(&self) -> LevelingView {
        let machine = self.machine.inner();
        LevelingView {
            phase: machine.phase,
            message: machine.message,
            indicators: machine.indicators,
            temperatures: machine.temperatures,
            return_enabled: machine.phase.return_enabled(),
            stop_enabled: machine.phase.stop_enabled(),
            force_stop: machine.force_stop,
            done: machine.done,
        }
    }

    pub fn start(&mut self, backups: LevelingBackups) -> LevelingApplyResult {
        self.apply(LevelingCommand::Start(backups))
    }

    pub fn tick(&mut self, input: TickInput) -> LevelingApplyResult {
        self.apply(LevelingCommand::Tick(input))
    }

    pub fn stop(&mut self) -> LevelingApplyResult {
        self.apply(LevelingCommand::Stop)
    }

    pub fn exit(&mut self) -> LevelingApplyResult {
        self.apply(LevelingCommand::Exit)
    }

    /// Marks the homing command as refused by the host. Only meaningful in
    /// `Home` before any point has been reported.
    pub fn reject_home(&mut self) -> LevelingApplyResult {
        self.apply(LevelingCommand::HomeRejected)
    }

    fn apply(&mut self, command: LevelingCommand) -> LevelingApplyResult {
        let before = self.phase();
        let mut context = DispatchContext::default();
        self.machine.handle_with_context(&command, &mut context);
        LevelingApplyResult {
            before,
            after: self.phase(),
            status: context.status,
            actions: context.actions,
        }
    }
}
