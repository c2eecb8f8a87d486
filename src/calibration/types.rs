use embedded_graphics::prelude::{Point, Size};
use fixed::types::I15F17;

use crate::config::{TOUCH_CALIBRATION_INSET_FAR, TOUCH_CALIBRATION_INSET_NEAR};
use crate::types::RawPoint;

/// Scale factor with a 17-bit fractional part.
pub type Q17 = I15F17;

pub const Q17_SHIFT: u32 = 17;
/// The driver applies the scale to a single raw reading, while the solver
/// fits it against the sum of two readings; hence one bit less.
const APPLY_SHIFT: u32 = Q17_SHIFT - 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    None,
    Landscape,
    Portrait,
}

impl Orientation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "TOUCH_ORIENTATION_NONE",
            Self::Landscape => "TOUCH_LANDSCAPE",
            Self::Portrait => "TOUCH_PORTRAIT",
        }
    }
}

/// Calibration crosshairs in the order they are shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    BottomLeft,
    TopRight,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::BottomLeft,
        Corner::TopRight,
        Corner::BottomRight,
    ];

    pub const fn index(self) -> usize {
        match self {
            Self::TopLeft => 0,
            Self::BottomLeft => 1,
            Self::TopRight => 2,
            Self::BottomRight => 3,
        }
    }

    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::TopLeft),
            1 => Some(Self::BottomLeft),
            2 => Some(Self::TopRight),
            3 => Some(Self::BottomRight),
            _ => None,
        }
    }

    /// Crosshair centre on a `screen`-sized panel.
    pub fn reference(self, screen: Size) -> Point {
        let near = TOUCH_CALIBRATION_INSET_NEAR;
        let far_x = screen.width as i32 - TOUCH_CALIBRATION_INSET_FAR;
        let far_y = screen.height as i32 - TOUCH_CALIBRATION_INSET_FAR;
        match self {
            Self::TopLeft => Point::new(near, near),
            Self::BottomLeft => Point::new(near, far_y),
            Self::TopRight => Point::new(far_x, near),
            Self::BottomRight => Point::new(far_x, far_y),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CalibrationSample {
    pub raw_x: i32,
    pub raw_y: i32,
    pub ref_x: i32,
    pub ref_y: i32,
}

impl CalibrationSample {
    pub fn new(raw: RawPoint, reference: Point) -> Self {
        Self {
            raw_x: raw.x,
            raw_y: raw.y,
            ref_x: reference.x,
            ref_y: reference.y,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalibrationResult {
    pub scale_x: Q17,
    pub scale_y: Q17,
    pub offset_x: i16,
    pub offset_y: i16,
    pub orientation: Orientation,
}

impl CalibrationResult {
    /// Raw controller reading to screen pixels.
    pub fn map_raw(&self, raw: RawPoint) -> Point {
        let (along_x, along_y) = match self.orientation {
            Orientation::Portrait => (raw.y, raw.x),
            Orientation::Landscape | Orientation::None => (raw.x, raw.y),
        };
        Point::new(
            apply_axis(along_x, self.scale_x, self.offset_x),
            apply_axis(along_y, self.scale_y, self.offset_y),
        )
    }
}

fn apply_axis(raw: i32, scale: Q17, offset: i16) -> i32 {
    let scaled = (i64::from(raw) * i64::from(scale.to_bits())) >> APPLY_SHIFT;
    i32::from(scaled as i16) + i32::from(offset)
}
