use serde::{Deserialize, Serialize};
use std::fmt;

/// Generator output shape, tagged on the wire as `SINE`/`TRI`/`SQR`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WaveShape {
    Sine,
    Triangle,
    Square,
}

impl WaveShape {
    pub fn wire_tag(&self) -> &'static str {
        match self {
            WaveShape::Sine => "SINE",
            WaveShape::Triangle => "TRI",
            WaveShape::Square => "SQR",
        }
    }
}

impl fmt::Display for WaveShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_tag())
    }
}

/// Host-to-device command.
///
/// Every encoded form is printable ASCII terminated by CR LF, so commands
/// travel the line path of the wire format and can never collide with the
/// binary frame sentinel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Command {
    /// Configure the function generator and enable/disable its output.
    Generator {
        freq_hz: u32,
        /// Output amplitude as a percentage of full scale, 0-100.
        amplitude_pct: u8,
        shape: WaveShape,
        enable: bool,
    },
    /// Disable the generator output (`EN:0`).
    Stop,
    /// Request a ground-resistance measurement (`MEAS:R`).
    MeasureResistance,
    /// Request a capacitance measurement (`MEAS:C`).
    MeasureCapacitance,
}

impl Command {
    /// Encode to the wire form, including the CR LF terminator.
    pub fn encode(&self) -> String {
        match self {
            Command::Generator {
                freq_hz,
                amplitude_pct,
                shape,
                enable,
            } => format!(
                "FREQ:{},AMP:{},WAVE:{},EN:{}\r\n",
                freq_hz,
                amplitude_pct,
                shape,
                u8::from(*enable)
            ),
            Command::Stop => "EN:0\r\n".to_string(),
            Command::MeasureResistance => "MEAS:R\r\n".to_string(),
            Command::MeasureCapacitance => "MEAS:C\r\n".to_string(),
        }
    }
}
