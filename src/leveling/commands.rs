use core::fmt::{self, Write as _};

use heapless::String;

pub const GCODE_LINE_CAP: usize = 64;

/// Motion commands issued by the leveling screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GcodeCommand {
    HomeAndProbe,
    CenterNozzle { x_mm: f32, y_mm: f32, feedrate: u16 },
    ZeroZ,
}

impl GcodeCommand {
    pub fn render(&self) -> Result<String<GCODE_LINE_CAP>, fmt::Error> {
        let mut line = String::new();
        write!(line, "{}", self)?;
        Ok(line)
    }
}

impl fmt::Display for GcodeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HomeAndProbe => f.write_str("G28\nG29"),
            Self::CenterNozzle {
                x_mm,
                y_mm,
                feedrate,
            } => write!(f, "G1 F{} X{:4.1} Y{:4.1}", feedrate, x_mm, y_mm),
            Self::ZeroZ => f.write_str("G1 Z0"),
        }
    }
}
