use statig::prelude::*;

use crate::config::{LevelingConfig, LEVELING_POINT_COUNT};
use crate::types::{HeaterChannel, LevelingType};

use super::actions::{LevelingAction, LevelingActions, LevelingApplyStatus};
use super::commands::GcodeCommand;
use super::events::{LevelingCommand, TickInput};
use super::types::{
    IndicatorState, Indicators, LevelingBackups, LevelingMessage, LevelingPhase,
    TemperatureReadout,
};

pub(super) struct DispatchContext {
    pub(super) status: LevelingApplyStatus,
    pub(super) actions: LevelingActions,
}

impl Default for DispatchContext {
    fn default() -> Self {
        Self {
            status: LevelingApplyStatus::Unchanged,
            actions: LevelingActions::new(),
        }
    }
}

impl DispatchContext {
    fn push(&mut self, action: LevelingAction) {
        if self.actions.push(action).is_err() {
            log::warn!("leveling: action buffer full, dropped {:?}", action);
        }
    }

    fn enqueue(&mut self, command: GcodeCommand, immediate: bool) {
        self.push(LevelingAction::Enqueue { command, immediate });
    }

    fn applied(&mut self) {
        self.status = LevelingApplyStatus::Applied;
    }

    fn invalid(&mut self) -> Outcome<State> {
        self.status = LevelingApplyStatus::InvalidTransition;
        Handled
    }
}

pub(super) struct LevelingMachine {
    pub(super) config: LevelingConfig,
    pub(super) phase: LevelingPhase,
    pub(super) message: Option<LevelingMessage>,
    pub(super) indicators: Indicators,
    pub(super) temperatures: TemperatureReadout,
    pub(super) backups: LevelingBackups,
    pub(super) force_stop: bool,
    pub(super) aborted_early: bool,
    pub(super) done: bool,
    reached_home: bool,
    home_rejected: bool,
    z_offset_restored: bool,
    temperatures_restored: bool,
    last_point: u8,
    blink_on: bool,
    settle_count: u8,
}

impl LevelingMachine {
    pub(super) fn new(config: LevelingConfig) -> Self {
        Self {
            config,
            phase: LevelingPhase::Idle,
            message: None,
            indicators: [IndicatorState::Idle; LEVELING_POINT_COUNT],
            temperatures: TemperatureReadout::default(),
            backups: LevelingBackups::default(),
            force_stop: false,
            aborted_early: false,
            done: false,
            reached_home: false,
            home_rejected: false,
            z_offset_restored: false,
            temperatures_restored: false,
            last_point: 0,
            blink_on: false,
            settle_count: 0,
        }
    }

    fn hotend(&self) -> HeaterChannel {
        HeaterChannel::Hotend(self.config.hotend)
    }

    fn begin(&mut self, context: &mut DispatchContext, backups: LevelingBackups) -> Outcome<State> {
        *self = Self::new(self.config);
        self.backups = backups;
        self.phase = LevelingPhase::Start;

        context.push(LevelingAction::SetZOffset(0.0));
        if let Some(preheat) = self.config.preheat {
            let hotend = self.hotend();
            context.push(LevelingAction::SetTarget(hotend, preheat.hotend_c));
            context.push(LevelingAction::BeginWatch(hotend));
            if self.config.heated_bed {
                context.push(LevelingAction::SetTarget(HeaterChannel::Bed, preheat.bed_c));
                context.push(LevelingAction::BeginWatch(HeaterChannel::Bed));
            }
        }

        self.phase = LevelingPhase::Heat;
        self.message = Some(LevelingMessage::Heating);
        context.applied();
        Transition(State::heat())
    }

    fn observe(&mut self, input: &TickInput) {
        self.temperatures = input.temperatures;
        if !self.config.heated_bed {
            self.temperatures.bed = None;
        }
    }

    fn heat_reached(&self) -> bool {
        let Some(preheat) = self.config.preheat else {
            return true;
        };
        let hotend = self.temperatures.hotend.current as i32;
        let hotend_ok = (hotend - i32::from(preheat.hotend_c)).abs() <= self.config.hotend_tolerance_c;
        if !self.config.heated_bed {
            return hotend_ok;
        }
        let bed_target = i32::from(preheat.bed_c);
        let bed_ok = self.temperatures.bed.is_some_and(|reading| {
            let bed = reading.current as i32;
            (bed - bed_target).abs() <= self.config.bed_tolerance_c || bed > bed_target
        });
        hotend_ok && bed_ok
    }

    fn home(&mut self, context: &mut DispatchContext) -> Outcome<State> {
        context.push(LevelingAction::PrepareForHoming);
        context.enqueue(GcodeCommand::HomeAndProbe, true);
        self.phase = LevelingPhase::Home;
        self.reached_home = true;
        self.message = Some(LevelingMessage::Homing);
        context.applied();
        Transition(State::probing())
    }

    /// Moves the indicators forward; a counter that goes backwards is ignored.
    fn advance(&mut self, point: u8, context: &mut DispatchContext) {
        let count = LEVELING_POINT_COUNT as u8;
        if point > self.last_point && point <= count {
            self.last_point = point;
            self.phase = LevelingPhase::Point(point);
            context.applied();
        }

        let active = self.last_point;
        if active == 0 {
            self.message = Some(LevelingMessage::Homing);
            return;
        }
        for (index, indicator) in self.indicators.iter_mut().enumerate() {
            let number = index as u8 + 1;
            if number < active {
                *indicator = IndicatorState::Settled;
            } else if number == active {
                *indicator = IndicatorState::Active {
                    blink_on: self.blink_on,
                };
            }
        }
        self.blink_on = !self.blink_on;
        self.message = Some(LevelingMessage::NextPoint);
    }

    fn complete(&mut self, context: &mut DispatchContext) -> Outcome<State> {
        self.phase = LevelingPhase::Done;
        self.indicators = [IndicatorState::Settled; LEVELING_POINT_COUNT];
        self.message = Some(LevelingMessage::Done);
        self.done = true;
        context.push(LevelingAction::SetLevelingType(LevelingType::Auto));
        context.push(LevelingAction::SignalLed);

        self.phase = LevelingPhase::Saved;
        self.settle_count = 0;
        context.applied();
        Transition(State::saved())
    }

    fn settle(&mut self, context: &mut DispatchContext) -> Outcome<State> {
        if self.settle_count < self.config.settle_ticks {
            if self.settle_count == 0 {
                let (bed_x, bed_y) = self.config.bed_size_mm;
                self.message = Some(LevelingMessage::ZOffsetCenter);
                context.enqueue(
                    GcodeCommand::CenterNozzle {
                        x_mm: bed_x / 2.0,
                        y_mm: bed_y / 2.0,
                        feedrate: self.config.center_feedrate,
                    },
                    false,
                );
                context.enqueue(GcodeCommand::ZeroZ, false);
                context.applied();
            }
            self.settle_count += 1;
            return Handled;
        }

        self.restore_temperatures(context);
        context.push(LevelingAction::OpenZOffsetSettings);
        self.phase = LevelingPhase::ZOffsetPrompt;
        context.applied();
        Transition(State::zoffset_prompt())
    }

    fn stop_before_motion(&mut self, context: &mut DispatchContext) -> Outcome<State> {
        self.force_stop = true;
        self.aborted_early = true;
        context.push(LevelingAction::SignalLed);
        self.restore_z_offset(context);
        self.phase = LevelingPhase::Stopped;
        self.message = Some(LevelingMessage::StopOver);
        context.applied();
        Transition(State::stopped())
    }

    fn stop_motion(&mut self, context: &mut DispatchContext) -> Outcome<State> {
        // No probing loop to wait for.
        if self.home_rejected {
            return self.stop_before_motion(context);
        }
        self.force_stop = true;
        context.push(LevelingAction::RequestAbort);
        context.push(LevelingAction::SignalLed);
        // Nothing probed yet, so the old offset is still the right one.
        if self.phase == LevelingPhase::Home {
            self.aborted_early = true;
            self.restore_z_offset(context);
        }
        self.release_indicators();
        context.applied();
        Transition(State::stopping())
    }

    fn release_indicators(&mut self) {
        self.indicators = [IndicatorState::Idle; LEVELING_POINT_COUNT];
        self.message = Some(LevelingMessage::ForceStop);
    }

    fn restore_z_offset(&mut self, context: &mut DispatchContext) {
        if !self.z_offset_restored {
            self.z_offset_restored = true;
            context.push(LevelingAction::SetZOffset(self.backups.z_offset));
        }
    }

    fn restore_temperatures(&mut self, context: &mut DispatchContext) {
        if self.temperatures_restored {
            return;
        }
        self.temperatures_restored = true;
        let hotend = self.hotend();
        context.push(LevelingAction::SetTarget(hotend, self.backups.hotend_target));
        context.push(LevelingAction::BeginWatch(hotend));
        if self.config.heated_bed {
            context.push(LevelingAction::SetTarget(HeaterChannel::Bed, self.backups.bed_target));
            context.push(LevelingAction::BeginWatch(HeaterChannel::Bed));
        }
    }

    fn exit(&mut self, context: &mut DispatchContext) -> Outcome<State> {
        if self.phase.motion_active() && !self.force_stop && !self.home_rejected {
            self.force_stop = true;
            context.push(LevelingAction::RequestAbort);
        }
        self.restore_temperatures(context);
        if !self.done {
            self.restore_z_offset(context);
        }
        if !self.reached_home {
            context.push(LevelingAction::SetLevelingType(self.backups.leveling_type));
        }
        context.push(LevelingAction::LeaveScreen);
        self.phase = LevelingPhase::Idle;
        self.message = None;
        context.applied();
        Transition(State::idle())
    }
}

#[state_machine(initial = "State::idle()")]
impl LevelingMachine {
    #[state]
    fn idle(&mut self, context: &mut DispatchContext, event: &LevelingCommand) -> Outcome<State> {
        match event {
            LevelingCommand::Start(backups) => self.begin(context, *backups),
            _ => context.invalid(),
        }
    }

    #[state]
    fn heat(&mut self, context: &mut DispatchContext, event: &LevelingCommand) -> Outcome<State> {
        match event {
            LevelingCommand::Tick(input) => {
                self.observe(input);
                if self.heat_reached() {
                    self.home(context)
                } else {
                    Handled
                }
            }
            LevelingCommand::Stop => self.stop_before_motion(context),
            LevelingCommand::Exit => self.exit(context),
            LevelingCommand::HomeRejected => Handled,
            LevelingCommand::Start(_) => context.invalid(),
        }
    }

    /// `Home` and every `Point(n)`: the probing loop drives the counter.
    #[state]
    fn probing(&mut self, context: &mut DispatchContext, event: &LevelingCommand) -> Outcome<State> {
        match event {
            LevelingCommand::Tick(input) => {
                self.observe(input);
                if input.progress.complete {
                    self.complete(context)
                } else {
                    self.advance(input.progress.point, context);
                    Handled
                }
            }
            LevelingCommand::Stop => self.stop_motion(context),
            LevelingCommand::Exit => self.exit(context),
            LevelingCommand::HomeRejected => {
                if self.phase == LevelingPhase::Home && self.last_point == 0 {
                    self.home_rejected = true;
                    context.applied();
                }
                Handled
            }
            LevelingCommand::Start(_) => context.invalid(),
        }
    }

    /// Force-stop requested, waiting for the probing loop to halt.
    #[state]
    fn stopping(&mut self, context: &mut DispatchContext, event: &LevelingCommand) -> Outcome<State> {
        match event {
            LevelingCommand::Tick(input) => {
                self.observe(input);
                if input.progress.halted {
                    self.phase = LevelingPhase::Stopped;
                    self.message = Some(LevelingMessage::StopOver);
                    context.applied();
                    Transition(State::stopped())
                } else {
                    self.release_indicators();
                    Handled
                }
            }
            LevelingCommand::Stop | LevelingCommand::HomeRejected => Handled,
            LevelingCommand::Exit => self.exit(context),
            LevelingCommand::Start(_) => context.invalid(),
        }
    }

    #[state]
    fn saved(&mut self, context: &mut DispatchContext, event: &LevelingCommand) -> Outcome<State> {
        match event {
            LevelingCommand::Tick(input) => {
                self.observe(input);
                self.settle(context)
            }
            LevelingCommand::Stop | LevelingCommand::HomeRejected => Handled,
            LevelingCommand::Exit => self.exit(context),
            LevelingCommand::Start(_) => context.invalid(),
        }
    }

    #[state]
    fn stopped(&mut self, context: &mut DispatchContext, event: &LevelingCommand) -> Outcome<State> {
        match event {
            LevelingCommand::Tick(input) => {
                self.observe(input);
                Handled
            }
            LevelingCommand::Stop | LevelingCommand::HomeRejected => Handled,
            LevelingCommand::Exit => self.exit(context),
            LevelingCommand::Start(_) => context.invalid(),
        }
    }

    /// Hand-off done; the Z-offset screen owns navigation from here.
    #[state]
    fn zoffset_prompt(
        &mut self,
        context: &mut DispatchContext,
        event: &LevelingCommand,
    ) -> Outcome<State> {
        match event {
            LevelingCommand::Start(backups) => self.begin(context, *backups),
            LevelingCommand::Exit => {
                self.phase = LevelingPhase::Idle;
                self.message = None;
                context.applied();
                Transition(State::idle())
            }
            LevelingCommand::Tick(_) | LevelingCommand::Stop | LevelingCommand::HomeRejected => {
                Handled
            }
        }
    }
}
