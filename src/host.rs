//! Narrow contracts onto the surrounding firmware.
//!
//! Implementations must not block: the engines call these from the UI
//! refresh loop and expect fire-and-forget semantics.

use crate::calibration::CalibrationResult;
use crate::error::{QueueFull, SettingsError};
use crate::types::{HeaterChannel, LevelingType, RawPoint, ScreenId};

pub trait HeaterControl {
    fn set_target(&mut self, channel: HeaterChannel, celsius: i16);
    fn target(&self, channel: HeaterChannel) -> i16;
    fn current_temperature(&self, channel: HeaterChannel) -> f32;
    fn begin_watch(&mut self, channel: HeaterChannel);
}

pub trait CommandQueue {
    fn enqueue(&mut self, command: &str) -> Result<(), QueueFull>;
    /// Jumps ahead of commands already queued.
    fn enqueue_immediate(&mut self, command: &str) -> Result<(), QueueFull>;
}

/// Progress published by the probing loop (`G29`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProbeProgress {
    /// 0 before the first point, then 1..=9.
    pub point: u8,
    pub complete: bool,
    /// Set once the loop has honoured an abort request.
    pub halted: bool,
}

pub trait ProbeControl {
    fn z_offset(&self) -> f32;
    fn set_z_offset(&mut self, z: f32);
    fn progress(&self) -> ProbeProgress;
    /// Clears homed axes and resets the probe before `G28`.
    fn prepare_for_homing(&mut self);
    fn request_abort(&mut self);
    fn signal_led(&mut self);
    fn leveling_type(&self) -> LevelingType;
    fn set_leveling_type(&mut self, leveling_type: LevelingType);
}

pub trait SettingsStore {
    fn save(&mut self) -> Result<(), SettingsError>;
}

pub trait TouchInput {
    fn read_raw_point(&mut self) -> Option<RawPoint>;
    fn apply_calibration(&mut self, calibration: &CalibrationResult);
}

pub trait Navigation {
    fn enter(&mut self, screen: ScreenId);
    fn leave(&mut self);
    fn current(&self) -> Option<ScreenId>;
}

/// Everything the leveling screen touches.
pub trait LevelingHost: HeaterControl + CommandQueue + ProbeControl {}

impl<T: HeaterControl + CommandQueue + ProbeControl> LevelingHost for T {}

/// Everything the calibration screen touches.
pub trait CalibrationHost: TouchInput + SettingsStore {}

impl<T: TouchInput + SettingsStore> CalibrationHost for T {}
