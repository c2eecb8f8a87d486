//! Compile-time configuration for the GTM32 LCD35 A10 board.

use embedded_graphics::prelude::Size;
use fixed::types::I15F17;

use crate::calibration::{CalibrationResult, Orientation};

pub const SCREEN_WIDTH: u32 = 480;
pub const SCREEN_HEIGHT: u32 = 320;

pub const X_BED_SIZE_MM: f32 = 220.0;
pub const Y_BED_SIZE_MM: f32 = 220.0;

/// `EN_LEVELING_PREHEAT` on this board.
pub const LEVELING_PREHEAT_ENABLED: bool = true;
pub const HAS_HEATED_BED: bool = true;

pub const LEVELING_PREHEAT_HOTEND_C: i16 = 150;
pub const LEVELING_PREHEAT_BED_C: i16 = 60;
pub const LEVELING_HOTEND_TOLERANCE_C: i32 = 3;
pub const LEVELING_BED_TOLERANCE_C: i32 = 1;
pub const LEVELING_SETTLE_TICKS: u8 = 26;
pub const LEVELING_CENTER_FEEDRATE: u16 = 5000;
pub const LEVELING_POINT_COUNT: usize = 9;

pub const TOUCH_CALIBRATION_PRECISION: i32 = 80;
pub const TOUCH_CALIBRATION_INSET_NEAR: i32 = 50;
pub const TOUCH_CALIBRATION_INSET_FAR: i32 = 51;

pub const XPT2046_X_CALIBRATION: i32 = 17880;
pub const XPT2046_Y_CALIBRATION: i32 = -12234;
pub const XPT2046_X_OFFSET: i16 = -45;
pub const XPT2046_Y_OFFSET: i16 = 349;

pub const SCREEN_STACK_DEPTH: usize = 16;
pub const UI_EVENT_QUEUE_DEPTH: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Preheat {
    pub hotend_c: i16,
    pub bed_c: i16,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelingConfig {
    /// `None` skips the heat phase entirely.
    pub preheat: Option<Preheat>,
    pub heated_bed: bool,
    pub hotend: u8,
    pub hotend_tolerance_c: i32,
    pub bed_tolerance_c: i32,
    pub settle_ticks: u8,
    pub bed_size_mm: (f32, f32),
    pub center_feedrate: u16,
}

impl LevelingConfig {
    pub const fn default_const() -> Self {
        Self {
            preheat: if LEVELING_PREHEAT_ENABLED {
                Some(Preheat {
                    hotend_c: LEVELING_PREHEAT_HOTEND_C,
                    bed_c: LEVELING_PREHEAT_BED_C,
                })
            } else {
                None
            },
            heated_bed: HAS_HEATED_BED,
            hotend: 0,
            hotend_tolerance_c: LEVELING_HOTEND_TOLERANCE_C,
            bed_tolerance_c: LEVELING_BED_TOLERANCE_C,
            settle_ticks: LEVELING_SETTLE_TICKS,
            bed_size_mm: (X_BED_SIZE_MM, Y_BED_SIZE_MM),
            center_feedrate: LEVELING_CENTER_FEEDRATE,
        }
    }
}

impl Default for LevelingConfig {
    fn default() -> Self {
        Self::default_const()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalibrationConfig {
    pub screen: Size,
    pub precision: i32,
    pub fallback: CalibrationResult,
}

impl CalibrationConfig {
    pub const fn default_const() -> Self {
        Self {
            screen: Size::new(SCREEN_WIDTH, SCREEN_HEIGHT),
            precision: TOUCH_CALIBRATION_PRECISION,
            fallback: default_calibration(),
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self::default_const()
    }
}

/// Factory calibration restored whenever a calibration run fails.
pub const fn default_calibration() -> CalibrationResult {
    CalibrationResult {
        scale_x: I15F17::from_bits(XPT2046_X_CALIBRATION),
        scale_y: I15F17::from_bits(XPT2046_Y_CALIBRATION),
        offset_x: XPT2046_X_OFFSET,
        offset_y: XPT2046_Y_OFFSET,
        orientation: Orientation::Landscape,
    }
}
