use crate::config::LevelingConfig;
use crate::error::LevelingError;
use crate::host::{LevelingHost, Navigation};
use crate::telemetry;
use crate::types::{HeaterChannel, HeaterReading, ScreenId};

use super::actions::{LevelingAction, LevelingApplyStatus};
use super::commands::GcodeCommand;
use super::engine::{LevelingApplyResult, LevelingSequencer};
use super::events::TickInput;
use super::types::{LevelingBackups, LevelingPhase, LevelingView, TemperatureReadout};

/// Runs the sequencer against the printer and the screen stack.
pub struct LevelingSession {
    sequencer: LevelingSequencer,
}

impl Default for LevelingSession {
    fn default() -> Self {
        Self::new(LevelingConfig::default_const())
    }
}

impl LevelingSession {
    pub fn new(config: LevelingConfig) -> Self {
        Self {
            sequencer: LevelingSequencer::new(config),
        }
    }

    pub fn sequencer(&self) -> &LevelingSequencer {
        &self.sequencer
    }

    pub fn phase(&self) -> LevelingPhase {
        self.sequencer.phase()
    }

    pub fn view(&self) -> LevelingView {
        self.sequencer.view()
    }

    pub fn start<H, N>(&mut self, host: &mut H, nav: &mut N) -> Result<LevelingPhase, LevelingError>
    where
        H: LevelingHost,
        N: Navigation,
    {
        let backups = self.capture_backups(host);
        let result = self.sequencer.start(backups);
        if !result.changed() {
            log::debug!("leveling: start ignored phase={}", result.before.as_str());
            return Ok(result.after);
        }
        nav.enter(ScreenId::AutoLeveling);
        telemetry::record_leveling_start();
        log::info!(
            "leveling: start hotend_target={} bed_target={} z_offset={}",
            backups.hotend_target,
            backups.bed_target,
            backups.z_offset
        );
        finish(result, host, nav)
    }

    pub fn tick<H, N>(&mut self, host: &mut H, nav: &mut N) -> Result<LevelingPhase, LevelingError>
    where
        H: LevelingHost,
        N: Navigation,
    {
        let input = self.read_input(host);
        let result = self.sequencer.tick(input);
        if result.status == LevelingApplyStatus::InvalidTransition {
            return Err(LevelingError::NotActive);
        }
        if result.after == LevelingPhase::Saved && result.before != LevelingPhase::Saved {
            telemetry::record_leveling_complete();
        }
        let homing = result.actions.iter().any(|action| {
            matches!(
                action,
                LevelingAction::Enqueue {
                    command: GcodeCommand::HomeAndProbe,
                    ..
                }
            )
        });
        let outcome = finish(result, host, nav);
        if homing && outcome.is_err() {
            log::warn!("leveling: homing command refused, stop will not wait for the probing loop");
            self.sequencer.reject_home();
        }
        outcome
    }

    pub fn stop<H, N>(&mut self, host: &mut H, nav: &mut N) -> Result<LevelingPhase, LevelingError>
    where
        H: LevelingHost,
        N: Navigation,
    {
        let result = self.sequencer.stop();
        match result.status {
            LevelingApplyStatus::InvalidTransition => return Err(LevelingError::NotActive),
            LevelingApplyStatus::Applied => {
                telemetry::record_leveling_force_stop();
                log::info!(
                    "leveling: force stop phase={} aborted_early={}",
                    result.before.as_str(),
                    self.sequencer.aborted_early()
                );
            }
            LevelingApplyStatus::Unchanged => {}
        }
        finish(result, host, nav)
    }

    pub fn exit<H, N>(&mut self, host: &mut H, nav: &mut N) -> Result<LevelingPhase, LevelingError>
    where
        H: LevelingHost,
        N: Navigation,
    {
        let result = self.sequencer.exit();
        if result.status == LevelingApplyStatus::InvalidTransition {
            return Err(LevelingError::NotActive);
        }
        finish(result, host, nav)
    }

    fn capture_backups<H: LevelingHost>(&self, host: &H) -> LevelingBackups {
        let hotend = HeaterChannel::Hotend(self.sequencer.config().hotend);
        LevelingBackups {
            hotend_target: host.target(hotend),
            bed_target: host.target(HeaterChannel::Bed),
            z_offset: host.z_offset(),
            leveling_type: host.leveling_type(),
        }
    }

    fn read_input<H: LevelingHost>(&self, host: &H) -> TickInput {
        let config = self.sequencer.config();
        let reading = |channel: HeaterChannel| HeaterReading {
            current: host.current_temperature(channel),
            target: host.target(channel),
        };
        TickInput {
            temperatures: TemperatureReadout {
                hotend: reading(HeaterChannel::Hotend(config.hotend)),
                bed: config.heated_bed.then(|| reading(HeaterChannel::Bed)),
            },
            progress: host.progress(),
        }
    }
}

/// Runs every requested action; the first rejection is reported after the
/// rest have been attempted.
fn finish<H, N>(
    result: LevelingApplyResult,
    host: &mut H,
    nav: &mut N,
) -> Result<LevelingPhase, LevelingError>
where
    H: LevelingHost,
    N: Navigation,
{
    if result.phase_changed() {
        log::info!(
            "leveling: phase {} -> {}",
            result.before.as_str(),
            result.after.as_str()
        );
    }

    let mut outcome = Ok(result.after);
    for action in &result.actions {
        if let Err(err) = run_action(*action, host, nav) {
            if outcome.is_ok() {
                outcome = Err(err);
            }
        }
    }
    outcome
}

fn run_action<H, N>(action: LevelingAction, host: &mut H, nav: &mut N) -> Result<(), LevelingError>
where
    H: LevelingHost,
    N: Navigation,
{
    match action {
        LevelingAction::SetTarget(channel, celsius) => host.set_target(channel, celsius),
        LevelingAction::BeginWatch(channel) => host.begin_watch(channel),
        LevelingAction::SetZOffset(z) => host.set_z_offset(z),
        LevelingAction::PrepareForHoming => host.prepare_for_homing(),
        LevelingAction::Enqueue { command, immediate } => enqueue(host, command, immediate)?,
        LevelingAction::RequestAbort => host.request_abort(),
        LevelingAction::SignalLed => host.signal_led(),
        LevelingAction::SetLevelingType(leveling_type) => host.set_leveling_type(leveling_type),
        LevelingAction::LeaveScreen => nav.leave(),
        LevelingAction::OpenZOffsetSettings => {
            nav.leave();
            nav.enter(ScreenId::ZOffsetSettings);
        }
    }
    Ok(())
}

fn enqueue<H: LevelingHost>(
    host: &mut H,
    command: GcodeCommand,
    immediate: bool,
) -> Result<(), LevelingError> {
    let line = command.render().map_err(|_| LevelingError::CommandOverflow)?;
    let queued = if immediate {
        host.enqueue_immediate(&line)
    } else {
        host.enqueue(&line)
    };
    queued.map_err(|err| {
        telemetry::record_command_rejected();
        log::warn!("leveling: command rejected line={:?} err={}", line.as_str(), err);
        LevelingError::from(err)
    })
}
