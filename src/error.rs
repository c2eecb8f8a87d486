use thiserror::Error;

/// Rejection from the firmware command queue.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("command queue full")]
pub struct QueueFull;

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("settings storage write failed")]
    WriteFailed,
    #[error("settings storage unavailable")]
    Unavailable,
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum CalibrationError {
    #[error("touch calibration precision check failed")]
    PrecisionFailure,
    #[error("calibration corner {0} out of range")]
    InvalidCorner(u8),
    #[error("calibration is not waiting for a point")]
    NotActive,
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum LevelingError {
    #[error("leveling command rejected: {0}")]
    QueueFull(#[from] QueueFull),
    /// Never raised: the heat phase has no timeout.
    #[error("target temperature unreachable")]
    TemperatureUnreachable,
    #[error("gcode line does not fit the command buffer")]
    CommandOverflow,
    #[error("leveling session is not running")]
    NotActive,
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum UiError {
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
    #[error(transparent)]
    Leveling(#[from] LevelingError),
}
