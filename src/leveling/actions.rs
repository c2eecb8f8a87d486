use heapless::Vec;

use crate::types::{HeaterChannel, LevelingType};

use super::commands::GcodeCommand;

pub const LEVELING_ACTION_CAP: usize = 12;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LevelingApplyStatus {
    Applied,
    Unchanged,
    InvalidTransition,
}

/// Side effects requested by the sequencer, in the order they must run.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum LevelingAction {
    SetTarget(HeaterChannel, i16),
    BeginWatch(HeaterChannel),
    SetZOffset(f32),
    PrepareForHoming,
    Enqueue {
        command: GcodeCommand,
        immediate: bool,
    },
    RequestAbort,
    SignalLed,
    SetLevelingType(LevelingType),
    LeaveScreen,
    OpenZOffsetSettings,
}

pub type LevelingActions = Vec<LevelingAction, LEVELING_ACTION_CAP>;
