use crate::host::ProbeProgress;

use super::types::{LevelingBackups, TemperatureReadout};

/// Per-tick view of the outside world.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickInput {
    pub temperatures: TemperatureReadout,
    pub progress: ProbeProgress,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum LevelingCommand {
    Start(LevelingBackups),
    Tick(TickInput),
    Stop,
    Exit,
    /// The host refused the homing command, so the probing loop never ran.
    HomeRejected,
}
