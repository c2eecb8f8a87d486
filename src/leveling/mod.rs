//! Auto-leveling sequence: preheat, home and probe nine points, park the
//! nozzle at the bed centre, then hand over to the Z-offset screen.

mod actions;
mod commands;
mod engine;
mod events;
mod machine;
mod session;
#[cfg(test)]
mod tests;
mod types;

pub use actions::{LevelingAction, LevelingActions, LevelingApplyStatus};
pub use commands::GcodeCommand;
pub use engine::{LevelingApplyResult, LevelingSequencer};
pub use events::TickInput;
pub use session::LevelingSession;
pub use types::{
    IndicatorState, Indicators, LevelingBackups, LevelingMessage, LevelingPhase, LevelingView,
    TemperatureReadout,
};
