use statig::prelude::*;

use crate::config::CalibrationConfig;
use crate::types::RawPoint;

use super::solve::solve;
use super::types::{CalibrationResult, CalibrationSample, Corner};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalibrationPhase {
    Idle,
    AwaitingPoint1,
    AwaitingPoint2,
    AwaitingPoint3,
    AwaitingPoint4,
    Success,
    Fail,
}

impl CalibrationPhase {
    pub const fn awaiting_slot(self) -> Option<usize> {
        match self {
            Self::AwaitingPoint1 => Some(0),
            Self::AwaitingPoint2 => Some(1),
            Self::AwaitingPoint3 => Some(2),
            Self::AwaitingPoint4 => Some(3),
            Self::Idle | Self::Success | Self::Fail => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum CalibrationCommand {
    Start,
    Touch { corner: Corner, raw: RawPoint },
    End,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalibrationStatus {
    Started,
    Recorded { next: CalibrationPhase },
    Success(CalibrationResult),
    Fail,
    Ended,
    Ignored,
}

#[derive(Clone, Copy, Debug)]
pub(super) struct DispatchContext {
    pub(super) status: CalibrationStatus,
}

impl Default for DispatchContext {
    fn default() -> Self {
        Self {
            status: CalibrationStatus::Ignored,
        }
    }
}

pub(super) struct CalibrationMachine {
    pub(super) config: CalibrationConfig,
    pub(super) phase: CalibrationPhase,
    pub(super) samples: [CalibrationSample; 4],
    pub(super) current: CalibrationResult,
}

impl CalibrationMachine {
    pub(super) fn new(config: CalibrationConfig) -> Self {
        Self {
            config,
            phase: CalibrationPhase::Idle,
            samples: [CalibrationSample::default(); 4],
            current: config.fallback,
        }
    }

    fn begin(&mut self, context: &mut DispatchContext) -> Outcome<State> {
        self.samples = [CalibrationSample::default(); 4];
        self.phase = CalibrationPhase::AwaitingPoint1;
        context.status = CalibrationStatus::Started;
        Transition(State::awaiting_point1())
    }

    fn end(&mut self, context: &mut DispatchContext) -> Outcome<State> {
        self.phase = CalibrationPhase::Idle;
        context.status = CalibrationStatus::Ended;
        Transition(State::idle())
    }

    /// The slot follows the sequence; the reference follows the crosshair
    /// that was actually released.
    fn record(
        &mut self,
        context: &mut DispatchContext,
        slot: usize,
        corner: Corner,
        raw: RawPoint,
        next: CalibrationPhase,
    ) {
        self.samples[slot] = CalibrationSample::new(raw, corner.reference(self.config.screen));
        self.phase = next;
        context.status = CalibrationStatus::Recorded { next };
    }

    fn finish(&mut self, context: &mut DispatchContext) -> Outcome<State> {
        match solve(&self.samples, self.config.precision) {
            Some(result) => {
                self.current = result;
                self.phase = CalibrationPhase::Success;
                context.status = CalibrationStatus::Success(result);
                Transition(State::success())
            }
            None => {
                self.current = self.config.fallback;
                self.phase = CalibrationPhase::Fail;
                context.status = CalibrationStatus::Fail;
                Transition(State::fail())
            }
        }
    }
}

#[state_machine(initial = "State::idle()")]
impl CalibrationMachine {
    #[state]
    fn idle(
        &mut self,
        context: &mut DispatchContext,
        event: &CalibrationCommand,
    ) -> Outcome<State> {
        match event {
            CalibrationCommand::Start => self.begin(context),
            _ => {
                context.status = CalibrationStatus::Ignored;
                Handled
            }
        }
    }

    #[state]
    fn awaiting_point1(
        &mut self,
        context: &mut DispatchContext,
        event: &CalibrationCommand,
    ) -> Outcome<State> {
        match event {
            CalibrationCommand::Touch { corner, raw } => {
                self.record(context, 0, *corner, *raw, CalibrationPhase::AwaitingPoint2);
                Transition(State::awaiting_point2())
            }
            CalibrationCommand::Start => self.begin(context),
            CalibrationCommand::End => self.end(context),
        }
    }

    #[state]
    fn awaiting_point2(
        &mut self,
        context: &mut DispatchContext,
        event: &CalibrationCommand,
    ) -> Outcome<State> {
        match event {
            CalibrationCommand::Touch { corner, raw } => {
                self.record(context, 1, *corner, *raw, CalibrationPhase::AwaitingPoint3);
                Transition(State::awaiting_point3())
            }
            CalibrationCommand::Start => self.begin(context),
            CalibrationCommand::End => self.end(context),
        }
    }

    #[state]
    fn awaiting_point3(
        &mut self,
        context: &mut DispatchContext,
        event: &CalibrationCommand,
    ) -> Outcome<State> {
        match event {
            CalibrationCommand::Touch { corner, raw } => {
                self.record(context, 2, *corner, *raw, CalibrationPhase::AwaitingPoint4);
                Transition(State::awaiting_point4())
            }
            CalibrationCommand::Start => self.begin(context),
            CalibrationCommand::End => self.end(context),
        }
    }

    #[state]
    fn awaiting_point4(
        &mut self,
        context: &mut DispatchContext,
        event: &CalibrationCommand,
    ) -> Outcome<State> {
        match event {
            CalibrationCommand::Touch { corner, raw } => {
                self.record(context, 3, *corner, *raw, CalibrationPhase::AwaitingPoint4);
                self.finish(context)
            }
            CalibrationCommand::Start => self.begin(context),
            CalibrationCommand::End => self.end(context),
        }
    }

    #[state]
    fn success(
        &mut self,
        context: &mut DispatchContext,
        event: &CalibrationCommand,
    ) -> Outcome<State> {
        match event {
            CalibrationCommand::Start => self.begin(context),
            CalibrationCommand::End => self.end(context),
            CalibrationCommand::Touch { .. } => {
                context.status = CalibrationStatus::Ignored;
                Handled
            }
        }
    }

    #[state]
    fn fail(
        &mut self,
        context: &mut DispatchContext,
        event: &CalibrationCommand,
    ) -> Outcome<State> {
        match event {
            CalibrationCommand::Start => self.begin(context),
            CalibrationCommand::End => self.end(context),
            CalibrationCommand::Touch { .. } => {
                context.status = CalibrationStatus::Ignored;
                Handled
            }
        }
    }
}
