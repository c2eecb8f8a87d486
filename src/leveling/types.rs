use crate::config::LEVELING_POINT_COUNT;
use crate::types::{HeaterReading, LevelingType};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelingPhase {
    Idle,
    Start,
    Heat,
    Home,
    /// Probing point 1..=9.
    Point(u8),
    Done,
    Saved,
    ZOffsetPrompt,
    /// Force-stop acknowledged by the probing loop.
    Stopped,
}

impl LevelingPhase {
    pub const fn return_enabled(self) -> bool {
        matches!(self, Self::Heat | Self::Stopped)
    }

    pub const fn stop_enabled(self) -> bool {
        matches!(self, Self::Home | Self::Point(_))
    }

    /// Whether `G28`/`G29` has been issued and is still running.
    pub const fn motion_active(self) -> bool {
        matches!(self, Self::Home | Self::Point(_))
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Start => "start",
            Self::Heat => "heat",
            Self::Home => "home",
            Self::Point(_) => "point",
            Self::Done => "done",
            Self::Saved => "saved",
            Self::ZOffsetPrompt => "zoffset_prompt",
            Self::Stopped => "stopped",
        }
    }
}

/// Info line on the leveling screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelingMessage {
    Heating,
    Homing,
    NextPoint,
    Done,
    ForceStop,
    StopOver,
    ZOffsetCenter,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IndicatorState {
    #[default]
    Idle,
    Active {
        blink_on: bool,
    },
    Settled,
}

pub type Indicators = [IndicatorState; LEVELING_POINT_COUNT];

/// Values captured at start and put back on the way out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelingBackups {
    pub hotend_target: i16,
    pub bed_target: i16,
    pub z_offset: f32,
    pub leveling_type: LevelingType,
}

impl Default for LevelingBackups {
    fn default() -> Self {
        Self {
            hotend_target: 0,
            bed_target: 0,
            z_offset: 0.0,
            leveling_type: LevelingType::Manual,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TemperatureReadout {
    pub hotend: HeaterReading,
    /// `None` on machines without a heated bed.
    pub bed: Option<HeaterReading>,
}

/// Everything the leveling screen draws.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelingView {
    pub phase: LevelingPhase,
    pub message: Option<LevelingMessage>,
    pub indicators: Indicators,
    pub temperatures: TemperatureReadout,
    pub return_enabled: bool,
    pub stop_enabled: bool,
    pub force_stop: bool,
    pub done: bool,
}
