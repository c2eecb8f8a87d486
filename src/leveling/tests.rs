use std::string::{String, ToString};
use std::vec::Vec;

use crate::config::{LevelingConfig, Preheat, LEVELING_POINT_COUNT};
use crate::error::{LevelingError, QueueFull};
use crate::host::{CommandQueue, HeaterControl, Navigation, ProbeControl, ProbeProgress};
use crate::navigation::ScreenStack;
use crate::types::{HeaterChannel, HeaterReading, LevelingType, ScreenId};

use super::*;

const HOTEND: HeaterChannel = HeaterChannel::Hotend(0);

fn backups() -> LevelingBackups {
    LevelingBackups {
        hotend_target: 200,
        bed_target: 55,
        z_offset: -1.25,
        leveling_type: LevelingType::Manual,
    }
}

fn temps(hotend: f32, bed: f32) -> TickInput {
    TickInput {
        temperatures: TemperatureReadout {
            hotend: HeaterReading {
                current: hotend,
                target: 150,
            },
            bed: Some(HeaterReading {
                current: bed,
                target: 60,
            }),
        },
        progress: ProbeProgress::default(),
    }
}

fn progress(point: u8, complete: bool, halted: bool) -> TickInput {
    TickInput {
        progress: ProbeProgress {
            point,
            complete,
            halted,
        },
        ..temps(150.0, 60.0)
    }
}

fn heated() -> LevelingSequencer {
    let mut sequencer = LevelingSequencer::default();
    let _ = sequencer.start(backups());
    let _ = sequencer.tick(temps(150.0, 60.0));
    assert_eq!(sequencer.phase(), LevelingPhase::Home);
    sequencer
}

fn completed() -> LevelingSequencer {
    let mut sequencer = heated();
    for point in 1..=LEVELING_POINT_COUNT as u8 {
        let _ = sequencer.tick(progress(point, false, false));
    }
    let _ = sequencer.tick(progress(9, true, false));
    sequencer
}

fn count_actions(result: &LevelingApplyResult, wanted: impl Fn(&LevelingAction) -> bool) -> usize {
    result.actions.iter().filter(|action| wanted(action)).count()
}

#[test]
fn start_captures_backups_and_preheats() {
    let mut sequencer = LevelingSequencer::default();
    let result = sequencer.start(backups());

    assert_eq!(result.after, LevelingPhase::Heat);
    assert_eq!(sequencer.backups(), backups());
    assert_eq!(
        result.actions.as_slice(),
        &[
            LevelingAction::SetZOffset(0.0),
            LevelingAction::SetTarget(HOTEND, 150),
            LevelingAction::BeginWatch(HOTEND),
            LevelingAction::SetTarget(HeaterChannel::Bed, 60),
            LevelingAction::BeginWatch(HeaterChannel::Bed),
        ]
    );
    let view = sequencer.view();
    assert_eq!(view.message, Some(LevelingMessage::Heating));
    assert!(view.return_enabled);
    assert!(!view.stop_enabled);
}

#[test]
fn heat_waits_then_homes_at_preheat() {
    let mut sequencer = LevelingSequencer::default();
    let _ = sequencer.start(backups());

    let cold = sequencer.tick(temps(20.0, 20.0));
    assert_eq!(cold.after, LevelingPhase::Heat);
    assert!(cold.actions.is_empty());

    let hot = sequencer.tick(temps(150.0, 60.0));
    assert_eq!(hot.after, LevelingPhase::Home);
    assert_eq!(
        hot.actions.as_slice(),
        &[
            LevelingAction::PrepareForHoming,
            LevelingAction::Enqueue {
                command: GcodeCommand::HomeAndProbe,
                immediate: true,
            },
        ]
    );
    assert_eq!(sequencer.view().message, Some(LevelingMessage::Homing));
}

#[test]
fn hotend_window_is_symmetric_and_bed_accepts_overshoot() {
    let cases = [
        (147.9, 60.0, true),
        (153.0, 60.0, true),
        (146.9, 60.0, false),
        (154.0, 60.0, false),
        (150.0, 59.0, true),
        (150.0, 58.9, false),
        (150.0, 85.0, true),
    ];
    for (hotend, bed, homes) in cases {
        let mut sequencer = LevelingSequencer::default();
        let _ = sequencer.start(backups());
        let result = sequencer.tick(temps(hotend, bed));
        assert_eq!(
            result.after == LevelingPhase::Home,
            homes,
            "hotend={hotend} bed={bed}"
        );
    }
}

#[test]
fn without_preheat_heat_passes_immediately() {
    let config = LevelingConfig {
        preheat: None,
        ..LevelingConfig::default_const()
    };
    let mut sequencer = LevelingSequencer::new(config);
    let start = sequencer.start(backups());
    assert_eq!(start.actions.as_slice(), &[LevelingAction::SetZOffset(0.0)]);

    let result = sequencer.tick(temps(20.0, 20.0));
    assert_eq!(result.after, LevelingPhase::Home);
}

#[test]
fn bed_is_ignored_without_heated_bed() {
    let config = LevelingConfig {
        heated_bed: false,
        preheat: Some(Preheat {
            hotend_c: 150,
            bed_c: 60,
        }),
        ..LevelingConfig::default_const()
    };
    let mut sequencer = LevelingSequencer::new(config);
    let start = sequencer.start(backups());
    assert_eq!(
        count_actions(&start, |action| matches!(
            action,
            LevelingAction::SetTarget(HeaterChannel::Bed, _)
        )),
        0
    );
    let result = sequencer.tick(temps(150.0, 20.0));
    assert_eq!(result.after, LevelingPhase::Home);
    assert_eq!(sequencer.view().temperatures.bed, None);
}

#[test]
fn points_advance_and_blink() {
    let mut sequencer = heated();

    let _ = sequencer.tick(progress(1, false, false));
    assert_eq!(sequencer.phase(), LevelingPhase::Point(1));
    let first = sequencer.view().indicators[0];
    let _ = sequencer.tick(progress(1, false, false));
    let second = sequencer.view().indicators[0];
    assert!(matches!(first, IndicatorState::Active { .. }));
    assert_ne!(first, second);

    let _ = sequencer.tick(progress(3, false, false));
    let view = sequencer.view();
    assert_eq!(view.phase, LevelingPhase::Point(3));
    assert_eq!(view.indicators[0], IndicatorState::Settled);
    assert_eq!(view.indicators[1], IndicatorState::Settled);
    assert!(matches!(view.indicators[2], IndicatorState::Active { .. }));
    assert_eq!(view.indicators[3], IndicatorState::Idle);
    assert_eq!(view.message, Some(LevelingMessage::NextPoint));
    assert!(view.stop_enabled);
    assert!(!view.return_enabled);
}

#[test]
fn point_counter_never_goes_back() {
    let mut sequencer = heated();
    let _ = sequencer.tick(progress(4, false, false));
    let _ = sequencer.tick(progress(2, false, false));
    assert_eq!(sequencer.phase(), LevelingPhase::Point(4));
    let _ = sequencer.tick(progress(12, false, false));
    assert_eq!(sequencer.phase(), LevelingPhase::Point(4));
}

#[test]
fn completion_settles_everything_and_saves() {
    let mut sequencer = heated();
    for point in 1..=LEVELING_POINT_COUNT as u8 {
        let _ = sequencer.tick(progress(point, false, false));
    }
    let result = sequencer.tick(progress(9, true, false));

    assert_eq!(result.after, LevelingPhase::Saved);
    assert!(result
        .actions
        .contains(&LevelingAction::SetLevelingType(LevelingType::Auto)));
    assert!(result.actions.contains(&LevelingAction::SignalLed));
    let view = sequencer.view();
    assert!(view.done);
    assert_eq!(view.message, Some(LevelingMessage::Done));
    assert!(view
        .indicators
        .iter()
        .all(|indicator| *indicator == IndicatorState::Settled));
    assert!(!view.stop_enabled);
}

#[test]
fn saved_parks_nozzle_then_hands_off_on_27th_tick() {
    let mut sequencer = completed();

    let first = sequencer.tick(progress(9, true, false));
    assert_eq!(
        first.actions.as_slice(),
        &[
            LevelingAction::Enqueue {
                command: GcodeCommand::CenterNozzle {
                    x_mm: 110.0,
                    y_mm: 110.0,
                    feedrate: 5000,
                },
                immediate: false,
            },
            LevelingAction::Enqueue {
                command: GcodeCommand::ZeroZ,
                immediate: false,
            },
        ]
    );
    assert_eq!(sequencer.view().message, Some(LevelingMessage::ZOffsetCenter));

    for _ in 1..26 {
        let result = sequencer.tick(progress(9, true, false));
        assert_eq!(result.after, LevelingPhase::Saved);
        assert!(result.actions.is_empty());
    }

    let handoff = sequencer.tick(progress(9, true, false));
    assert_eq!(handoff.after, LevelingPhase::ZOffsetPrompt);
    assert_eq!(
        handoff.actions.as_slice(),
        &[
            LevelingAction::SetTarget(HOTEND, 200),
            LevelingAction::BeginWatch(HOTEND),
            LevelingAction::SetTarget(HeaterChannel::Bed, 55),
            LevelingAction::BeginWatch(HeaterChannel::Bed),
            LevelingAction::OpenZOffsetSettings,
        ]
    );

    // Leaving the prompt does not restore anything twice.
    let exit = sequencer.exit();
    assert_eq!(exit.after, LevelingPhase::Idle);
    assert!(exit.actions.is_empty());
}

#[test]
fn stop_during_heat_restores_z_offset_and_exit_restores_rest() {
    let mut sequencer = LevelingSequencer::default();
    let _ = sequencer.start(backups());

    let stop = sequencer.stop();
    assert_eq!(stop.after, LevelingPhase::Stopped);
    assert!(stop.actions.contains(&LevelingAction::SetZOffset(-1.25)));
    assert!(sequencer.force_stop());
    assert!(sequencer.aborted_early());
    assert_eq!(sequencer.view().message, Some(LevelingMessage::StopOver));
    assert!(sequencer.view().return_enabled);

    let exit = sequencer.exit();
    assert_eq!(
        exit.actions.as_slice(),
        &[
            LevelingAction::SetTarget(HOTEND, 200),
            LevelingAction::BeginWatch(HOTEND),
            LevelingAction::SetTarget(HeaterChannel::Bed, 55),
            LevelingAction::BeginWatch(HeaterChannel::Bed),
            LevelingAction::SetLevelingType(LevelingType::Manual),
            LevelingAction::LeaveScreen,
        ]
    );
    assert_eq!(sequencer.phase(), LevelingPhase::Idle);
}

#[test]
fn second_stop_changes_nothing() {
    let mut sequencer = heated();
    let _ = sequencer.tick(progress(2, false, false));

    let first = sequencer.stop();
    assert_eq!(first.status, LevelingApplyStatus::Applied);
    let view_after_first = sequencer.view();

    let second = sequencer.stop();
    assert_eq!(second.status, LevelingApplyStatus::Unchanged);
    assert!(second.actions.is_empty());
    assert_eq!(sequencer.view(), view_after_first);
}

#[test]
fn stop_while_probing_waits_for_halt() {
    let mut sequencer = heated();
    let _ = sequencer.tick(progress(3, false, false));

    let stop = sequencer.stop();
    assert_eq!(stop.after, LevelingPhase::Point(3));
    assert!(stop.actions.contains(&LevelingAction::RequestAbort));
    assert!(stop.actions.contains(&LevelingAction::SignalLed));
    assert_eq!(
        count_actions(&stop, |action| matches!(action, LevelingAction::SetZOffset(_))),
        0
    );
    assert!(!sequencer.aborted_early());
    let view = sequencer.view();
    assert_eq!(view.message, Some(LevelingMessage::ForceStop));
    assert!(view
        .indicators
        .iter()
        .all(|indicator| *indicator == IndicatorState::Idle));

    // Progress is frozen while the probing loop winds down.
    let _ = sequencer.tick(progress(5, false, false));
    assert_eq!(sequencer.phase(), LevelingPhase::Point(3));

    let halted = sequencer.tick(progress(5, false, true));
    assert_eq!(halted.after, LevelingPhase::Stopped);
    assert_eq!(sequencer.view().message, Some(LevelingMessage::StopOver));

    let exit = sequencer.exit();
    assert!(exit.actions.contains(&LevelingAction::SetZOffset(-1.25)));
    assert_eq!(
        count_actions(&exit, |action| matches!(action, LevelingAction::SetLevelingType(_))),
        0
    );
}

#[test]
fn stop_before_first_point_restores_z_offset_at_once() {
    let mut sequencer = heated();
    let stop = sequencer.stop();
    assert!(sequencer.aborted_early());
    assert!(stop.actions.contains(&LevelingAction::SetZOffset(-1.25)));

    let _ = sequencer.tick(progress(0, false, true));
    let exit = sequencer.exit();
    assert_eq!(
        count_actions(&exit, |action| matches!(action, LevelingAction::SetZOffset(_))),
        0
    );
}

#[test]
fn stop_after_refused_homing_skips_the_wait() {
    let mut sequencer = heated();
    assert_eq!(sequencer.reject_home().status, LevelingApplyStatus::Applied);
    assert_eq!(sequencer.phase(), LevelingPhase::Home);

    let stop = sequencer.stop();
    assert_eq!(stop.after, LevelingPhase::Stopped);
    assert!(!stop.actions.contains(&LevelingAction::RequestAbort));
    assert!(stop.actions.contains(&LevelingAction::SetZOffset(-1.25)));
    assert!(sequencer.aborted_early());
    let view = sequencer.view();
    assert!(view.return_enabled);
    assert_eq!(view.message, Some(LevelingMessage::StopOver));

    let exit = sequencer.exit();
    assert_eq!(exit.after, LevelingPhase::Idle);
    assert!(exit.actions.contains(&LevelingAction::LeaveScreen));
    assert!(!exit.actions.contains(&LevelingAction::RequestAbort));
}

#[test]
fn exit_after_refused_homing_does_not_abort() {
    let mut sequencer = heated();
    let _ = sequencer.reject_home();
    let exit = sequencer.exit();
    assert_eq!(exit.after, LevelingPhase::Idle);
    assert!(!exit.actions.contains(&LevelingAction::RequestAbort));
}

#[test]
fn homing_refusal_after_first_point_is_ignored() {
    let mut sequencer = heated();
    let _ = sequencer.tick(progress(2, false, false));
    assert_eq!(sequencer.reject_home().status, LevelingApplyStatus::Unchanged);

    let stop = sequencer.stop();
    assert_eq!(stop.after, LevelingPhase::Point(2));
    assert!(stop.actions.contains(&LevelingAction::RequestAbort));
}

#[test]
fn commands_outside_a_run_are_rejected() {
    let mut sequencer = LevelingSequencer::default();
    assert_eq!(
        sequencer.tick(temps(20.0, 20.0)).status,
        LevelingApplyStatus::InvalidTransition
    );
    assert_eq!(sequencer.stop().status, LevelingApplyStatus::InvalidTransition);
    assert_eq!(sequencer.exit().status, LevelingApplyStatus::InvalidTransition);
    assert_eq!(
        sequencer.reject_home().status,
        LevelingApplyStatus::InvalidTransition
    );

    let _ = sequencer.start(backups());
    assert_eq!(
        sequencer.start(backups()).status,
        LevelingApplyStatus::InvalidTransition
    );
}

#[derive(Default)]
struct FakePrinter {
    hotend_target: i16,
    bed_target: i16,
    hotend_c: f32,
    bed_c: f32,
    z_offset: f32,
    leveling_type: Option<LevelingType>,
    progress: ProbeProgress,
    queued: Vec<String>,
    reject_commands: bool,
    aborts: u32,
}

impl HeaterControl for FakePrinter {
    fn set_target(&mut self, channel: HeaterChannel, celsius: i16) {
        match channel {
            HeaterChannel::Hotend(_) => self.hotend_target = celsius,
            HeaterChannel::Bed => self.bed_target = celsius,
        }
    }

    fn target(&self, channel: HeaterChannel) -> i16 {
        match channel {
            HeaterChannel::Hotend(_) => self.hotend_target,
            HeaterChannel::Bed => self.bed_target,
        }
    }

    fn current_temperature(&self, channel: HeaterChannel) -> f32 {
        match channel {
            HeaterChannel::Hotend(_) => self.hotend_c,
            HeaterChannel::Bed => self.bed_c,
        }
    }

    fn begin_watch(&mut self, _channel: HeaterChannel) {}
}

impl CommandQueue for FakePrinter {
    fn enqueue(&mut self, command: &str) -> Result<(), QueueFull> {
        if self.reject_commands {
            return Err(QueueFull);
        }
        self.queued.push(command.to_string());
        Ok(())
    }

    fn enqueue_immediate(&mut self, command: &str) -> Result<(), QueueFull> {
        self.enqueue(command)
    }
}

impl ProbeControl for FakePrinter {
    fn z_offset(&self) -> f32 {
        self.z_offset
    }

    fn set_z_offset(&mut self, z: f32) {
        self.z_offset = z;
    }

    fn progress(&self) -> ProbeProgress {
        self.progress
    }

    fn prepare_for_homing(&mut self) {}

    fn request_abort(&mut self) {
        self.aborts += 1;
    }

    fn signal_led(&mut self) {}

    fn leveling_type(&self) -> LevelingType {
        self.leveling_type.unwrap_or(LevelingType::Manual)
    }

    fn set_leveling_type(&mut self, leveling_type: LevelingType) {
        self.leveling_type = Some(leveling_type);
    }
}

fn printer() -> FakePrinter {
    FakePrinter {
        hotend_target: 200,
        bed_target: 55,
        hotend_c: 22.0,
        bed_c: 21.0,
        z_offset: -1.25,
        ..FakePrinter::default()
    }
}

#[test]
fn session_start_enters_screen_and_zeroes_offset() {
    let mut host = printer();
    let mut nav = ScreenStack::default();
    let mut session = LevelingSession::default();

    assert_eq!(session.start(&mut host, &mut nav), Ok(LevelingPhase::Heat));
    assert_eq!(nav.current(), Some(ScreenId::AutoLeveling));
    assert_eq!(host.z_offset, 0.0);
    assert_eq!((host.hotend_target, host.bed_target), (150, 60));
}

#[test]
fn session_rejected_home_command_is_reported_once() {
    let mut host = printer();
    let mut nav = ScreenStack::default();
    let mut session = LevelingSession::default();
    let _ = session.start(&mut host, &mut nav);

    host.reject_commands = true;
    host.hotend_c = 150.0;
    host.bed_c = 60.0;
    assert_eq!(
        session.tick(&mut host, &mut nav),
        Err(LevelingError::QueueFull(QueueFull))
    );
    assert_eq!(session.phase(), LevelingPhase::Home);

    // No retry on the following tick.
    host.reject_commands = false;
    assert_eq!(session.tick(&mut host, &mut nav), Ok(LevelingPhase::Home));
    assert!(host.queued.is_empty());

    // Stop does not wait for a probing loop that never started.
    assert_eq!(session.stop(&mut host, &mut nav), Ok(LevelingPhase::Stopped));
    assert_eq!(host.aborts, 0);
    assert_eq!(host.z_offset, -1.25);
    assert!(session.view().return_enabled);
    assert_eq!(session.exit(&mut host, &mut nav), Ok(LevelingPhase::Idle));
    assert_eq!(nav.current(), Some(ScreenId::Main));
    assert_eq!((host.hotend_target, host.bed_target), (200, 55));
}

#[test]
fn session_tick_when_idle_is_not_active() {
    let mut host = printer();
    let mut nav = ScreenStack::default();
    let mut session = LevelingSession::default();
    assert_eq!(
        session.tick(&mut host, &mut nav),
        Err(LevelingError::NotActive)
    );
}

#[test]
fn session_exit_while_probing_aborts_motion() {
    let mut host = printer();
    let mut nav = ScreenStack::default();
    let mut session = LevelingSession::default();
    let _ = session.start(&mut host, &mut nav);
    host.hotend_c = 150.0;
    host.bed_c = 60.0;
    let _ = session.tick(&mut host, &mut nav);

    assert_eq!(session.exit(&mut host, &mut nav), Ok(LevelingPhase::Idle));
    assert_eq!(host.aborts, 1);
    assert_eq!((host.hotend_target, host.bed_target), (200, 55));
    assert_eq!(host.z_offset, -1.25);
    assert_eq!(nav.current(), Some(ScreenId::Main));
}
