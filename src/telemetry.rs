use core::sync::atomic::{AtomicU32, Ordering};

static CALIBRATION_RUNS: AtomicU32 = AtomicU32::new(0);
static CALIBRATION_SUCCESSES: AtomicU32 = AtomicU32::new(0);
static CALIBRATION_FAILURES: AtomicU32 = AtomicU32::new(0);
static LEVELING_RUNS: AtomicU32 = AtomicU32::new(0);
static LEVELING_COMPLETIONS: AtomicU32 = AtomicU32::new(0);
static LEVELING_FORCE_STOPS: AtomicU32 = AtomicU32::new(0);
static COMMANDS_REJECTED: AtomicU32 = AtomicU32::new(0);
static SETTINGS_SAVE_FAILURES: AtomicU32 = AtomicU32::new(0);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    pub calibration_runs: u32,
    pub calibration_successes: u32,
    pub calibration_failures: u32,
    pub leveling_runs: u32,
    pub leveling_completions: u32,
    pub leveling_force_stops: u32,
    pub commands_rejected: u32,
    pub settings_save_failures: u32,
}

pub fn snapshot() -> TelemetrySnapshot {
    TelemetrySnapshot {
        calibration_runs: CALIBRATION_RUNS.load(Ordering::Relaxed),
        calibration_successes: CALIBRATION_SUCCESSES.load(Ordering::Relaxed),
        calibration_failures: CALIBRATION_FAILURES.load(Ordering::Relaxed),
        leveling_runs: LEVELING_RUNS.load(Ordering::Relaxed),
        leveling_completions: LEVELING_COMPLETIONS.load(Ordering::Relaxed),
        leveling_force_stops: LEVELING_FORCE_STOPS.load(Ordering::Relaxed),
        commands_rejected: COMMANDS_REJECTED.load(Ordering::Relaxed),
        settings_save_failures: SETTINGS_SAVE_FAILURES.load(Ordering::Relaxed),
    }
}

pub(crate) fn record_calibration_start() {
    saturating_inc(&CALIBRATION_RUNS);
    log::trace!("telemetry calibration_start");
}

pub(crate) fn record_calibration_result(success: bool) {
    if success {
        saturating_inc(&CALIBRATION_SUCCESSES);
    } else {
        saturating_inc(&CALIBRATION_FAILURES);
    }
    log::trace!("telemetry calibration_result success={}", success);
}

pub(crate) fn record_leveling_start() {
    saturating_inc(&LEVELING_RUNS);
}

pub(crate) fn record_leveling_complete() {
    saturating_inc(&LEVELING_COMPLETIONS);
}

pub(crate) fn record_leveling_force_stop() {
    saturating_inc(&LEVELING_FORCE_STOPS);
    log::trace!("telemetry leveling_force_stop");
}

pub(crate) fn record_command_rejected() {
    saturating_inc(&COMMANDS_REJECTED);
}

pub(crate) fn record_settings_save_failure() {
    saturating_inc(&SETTINGS_SAVE_FAILURES);
}

fn saturating_inc(counter: &AtomicU32) {
    let _ = counter.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
        Some(current.saturating_add(1))
    });
}
