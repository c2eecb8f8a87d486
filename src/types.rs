/// Unprocessed touch-controller reading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawPoint {
    pub x: i32,
    pub y: i32,
}

impl RawPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaterChannel {
    Hotend(u8),
    Bed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelingType {
    Manual,
    Auto,
}

/// Display-state identifiers pushed on the screen stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScreenId {
    Main,
    Settings,
    AutoLeveling,
    TouchCalibration,
    ZOffsetSettings,
    Other(u8),
}

/// One heater's readout for the on-screen labels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HeaterReading {
    pub current: f32,
    pub target: i16,
}
